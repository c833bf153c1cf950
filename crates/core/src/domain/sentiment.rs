use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_CONFIDENCE: f64 = 0.5;
pub const MAX_CONFIDENCE: f64 = 0.95;
pub const MAX_KEYWORDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Output of a single scoring call. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentVerdict {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub keywords: Vec<String>,
}

impl SentimentVerdict {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::BlankText);
        }
        if !self.confidence.is_finite()
            || !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&self.confidence)
        {
            return Err(ValidationError::ConfidenceOutOfRange(self.confidence));
        }
        if self.keywords.len() > MAX_KEYWORDS {
            return Err(ValidationError::TooManyKeywords(self.keywords.len()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisLogEntry {
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub stakeholder: String,
    pub verdict: SentimentVerdict,
}

impl AnalysisLogEntry {
    /// Validates the parts and builds an entry with the stakeholder name trimmed.
    pub fn try_new(
        verdict: SentimentVerdict,
        stakeholder: &str,
        timestamp: f64,
    ) -> Result<Self, ValidationError> {
        verdict.validate()?;

        let stakeholder = stakeholder.trim();
        if stakeholder.is_empty() {
            return Err(ValidationError::BlankStakeholder);
        }

        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(ValidationError::InvalidTimestamp(timestamp));
        }

        Ok(Self {
            timestamp,
            stakeholder: stakeholder.to_string(),
            verdict,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        Self::try_new(self.verdict.clone(), &self.stakeholder, self.timestamp).map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeholderRecord {
    pub name: String,
    pub sentiment: Sentiment,
    pub score: u8,
    pub trend: Trend,
    pub recent_mentions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalSummary {
    pub positive_pct: u8,
    pub neutral_pct: u8,
    pub negative_pct: u8,
    pub total_analyses: usize,
}
