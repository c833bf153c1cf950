pub mod derive;

use crate::config::Settings;
use crate::domain::sentiment::{
    AnalysisLogEntry, GlobalSummary, SentimentVerdict, StakeholderRecord,
};
use crate::error::ValidationError;

pub const DEFAULT_TREND_WINDOW: usize = 5;

/// Stakeholder groups shown on the dashboard before any analysis is attributed to them.
pub const DEFAULT_ROSTER: &[&str] = &["고객", "투자자", "직원", "언론", "정부", "파트너"];

#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    /// Number of a stakeholder's most recent verdicts compared against the window before them.
    pub window: usize,

    /// Stakeholders always listed (in this order), even with no verdicts yet.
    pub roster: Vec<String>,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_TREND_WINDOW,
            roster: DEFAULT_ROSTER.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AggregatorOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        let mut out = Self::default();

        if let Some(window) = settings.trend_window {
            out.window = window;
        }

        if let Some(roster) = &settings.stakeholders {
            out.roster = roster.clone();
        }

        out
    }
}

/// Append-only analysis log plus the records derived from it.
///
/// The cached summary and stakeholder records are recomputed from the log on every append,
/// never updated incrementally, so they cannot drift from it.
#[derive(Debug, Clone)]
pub struct Aggregator {
    options: AggregatorOptions,
    log: Vec<AnalysisLogEntry>,
    stakeholders: Vec<StakeholderRecord>,
    summary: GlobalSummary,
}

impl Aggregator {
    pub fn new(mut options: AggregatorOptions) -> Self {
        options.window = options.window.max(1);

        let mut roster: Vec<String> = Vec::with_capacity(options.roster.len());
        for name in &options.roster {
            let name = name.trim();
            if !name.is_empty() && !roster.iter().any(|r| r == name) {
                roster.push(name.to_string());
            }
        }
        options.roster = roster;

        let mut out = Self {
            options,
            log: Vec::new(),
            stakeholders: Vec::new(),
            summary: GlobalSummary::default(),
        };
        out.rebuild();
        out
    }

    /// Rebuilds state from a previously persisted log. Entries must already be in
    /// chronological (insertion) order.
    pub fn from_entries(
        options: AggregatorOptions,
        entries: Vec<AnalysisLogEntry>,
    ) -> Result<Self, ValidationError> {
        let mut out = Self::new(options);
        for entry in &entries {
            entry.validate()?;
        }
        out.log = entries;
        out.rebuild();
        Ok(out)
    }

    pub fn record(
        &mut self,
        verdict: SentimentVerdict,
        stakeholder: &str,
        timestamp: f64,
    ) -> Result<(), ValidationError> {
        let entry = AnalysisLogEntry::try_new(verdict, stakeholder, timestamp)?;
        self.commit(entry);
        Ok(())
    }

    /// Appends an entry that has already passed `AnalysisLogEntry::try_new`.
    pub(crate) fn commit(&mut self, entry: AnalysisLogEntry) {
        let name = entry.stakeholder.clone();
        self.log.push(entry);

        let record = derive::stakeholder_record(&name, &self.log, self.options.window);
        match self.stakeholders.iter_mut().find(|r| r.name == name) {
            Some(existing) => *existing = record,
            None => self.stakeholders.push(record),
        }
        self.summary = derive::summarize(&self.log);
    }

    pub fn summary(&self) -> GlobalSummary {
        self.summary
    }

    /// Roster stakeholders first, then others in order of first appearance in the log.
    pub fn stakeholders(&self) -> &[StakeholderRecord] {
        &self.stakeholders
    }

    pub fn stakeholder(&self, name: &str) -> Option<&StakeholderRecord> {
        self.stakeholders.iter().find(|r| r.name == name)
    }

    /// The last `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<AnalysisLogEntry> {
        self.log.iter().rev().take(n).cloned().collect()
    }

    pub fn entries(&self) -> &[AnalysisLogEntry] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn options(&self) -> &AggregatorOptions {
        &self.options
    }

    fn rebuild(&mut self) {
        let mut names: Vec<&str> = self.options.roster.iter().map(String::as_str).collect();
        for entry in &self.log {
            if !names.contains(&entry.stakeholder.as_str()) {
                names.push(&entry.stakeholder);
            }
        }

        self.stakeholders = names
            .into_iter()
            .map(|name| derive::stakeholder_record(name, &self.log, self.options.window))
            .collect();
        self.summary = derive::summarize(&self.log);
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(AggregatorOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sentiment::{Sentiment, Trend};
    use crate::scoring::score;

    fn empty_roster() -> AggregatorOptions {
        AggregatorOptions {
            window: 5,
            roster: Vec::new(),
        }
    }

    fn snapshot(agg: &Aggregator) -> (GlobalSummary, Vec<StakeholderRecord>, Vec<AnalysisLogEntry>) {
        (agg.summary(), agg.stakeholders().to_vec(), agg.recent(100))
    }

    #[test]
    fn default_roster_is_listed_before_any_analysis() {
        let agg = Aggregator::default();
        let names: Vec<&str> = agg.stakeholders().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, DEFAULT_ROSTER.to_vec());
        for r in agg.stakeholders() {
            assert_eq!(r.score, 50);
            assert_eq!(r.sentiment, Sentiment::Neutral);
            assert_eq!(r.trend, Trend::Flat);
            assert_eq!(r.recent_mentions, 0);
        }
        assert_eq!(agg.summary(), GlobalSummary::default());
    }

    #[test]
    fn new_stakeholders_follow_roster_in_first_seen_order() {
        let mut agg = Aggregator::new(AggregatorOptions {
            window: 5,
            roster: vec!["고객".to_string(), " 고객 ".to_string(), "".to_string()],
        });
        agg.record(score("좋아요").unwrap(), "general", 1.0).unwrap();
        agg.record(score("문제").unwrap(), "투자자", 2.0).unwrap();
        agg.record(score("보통").unwrap(), "general", 3.0).unwrap();

        let names: Vec<&str> = agg.stakeholders().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["고객", "general", "투자자"]);
    }

    #[test]
    fn record_updates_summary_and_stakeholder() {
        let mut agg = Aggregator::new(empty_roster());
        agg.record(score("정말 좋습니다 추천해요").unwrap(), "고객", 10.0)
            .unwrap();
        agg.record(score("실망스럽고 별로입니다").unwrap(), "고객", 11.0)
            .unwrap();
        agg.record(score("만족합니다").unwrap(), "고객", 12.0).unwrap();

        let s = agg.summary();
        assert_eq!(s.total_analyses, 3);
        assert_eq!((s.positive_pct, s.neutral_pct, s.negative_pct), (67, 0, 33));

        let customer = agg.stakeholder("고객").unwrap();
        assert_eq!(customer.recent_mentions, 3);
        assert!(customer.score > 50);
        assert_eq!(customer.trend, Trend::Flat);
    }

    #[test]
    fn recent_is_newest_first_and_bounded() {
        let mut agg = Aggregator::new(empty_roster());
        for (i, text) in ["하나", "둘", "셋"].iter().enumerate() {
            agg.record(score(text).unwrap(), "고객", i as f64).unwrap();
        }

        let recent = agg.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].verdict.text, "셋");
        assert_eq!(recent[1].verdict.text, "둘");
        assert_eq!(agg.recent(10).len(), 3);
        assert!(agg.recent(0).is_empty());
    }

    #[test]
    fn mentions_count_only_the_current_window() {
        let mut agg = Aggregator::new(empty_roster());
        for i in 0..8 {
            agg.record(score("좋아요").unwrap(), "직원", i as f64).unwrap();
        }
        assert_eq!(agg.stakeholder("직원").unwrap().recent_mentions, 5);
    }

    #[test]
    fn trend_turns_down_when_latest_window_worsens() {
        let mut agg = Aggregator::new(empty_roster());
        for i in 0..5 {
            agg.record(score("훌륭합니다").unwrap(), "언론", i as f64).unwrap();
        }
        for i in 5..10 {
            agg.record(score("실망입니다").unwrap(), "언론", i as f64).unwrap();
        }
        assert_eq!(agg.stakeholder("언론").unwrap().trend, Trend::Down);
    }

    #[test]
    fn positive_never_lowers_and_negative_never_raises_score() {
        let texts = ["좋아요", "보통", "문제가 많다", "추천합니다", "실망과 불만"];
        let mut agg = Aggregator::new(empty_roster());
        for (i, text) in texts.iter().cycle().take(40).enumerate() {
            agg.record(score(text).unwrap(), "파트너", i as f64).unwrap();

            let before = agg.stakeholder("파트너").unwrap().score;

            let mut with_pos = agg.clone();
            with_pos
                .record(score("우수하고 훌륭하다").unwrap(), "파트너", 100.0)
                .unwrap();
            assert!(with_pos.stakeholder("파트너").unwrap().score >= before);

            let mut with_neg = agg.clone();
            with_neg
                .record(score("실패").unwrap(), "파트너", 100.0)
                .unwrap();
            assert!(with_neg.stakeholder("파트너").unwrap().score <= before);
        }
    }

    #[test]
    fn rejected_record_leaves_state_unchanged() {
        let mut agg = Aggregator::default();
        agg.record(score("좋아요").unwrap(), "고객", 1.0).unwrap();
        let before = snapshot(&agg);

        let good = score("실망").unwrap();
        assert_eq!(
            agg.record(good.clone(), "  ", 2.0),
            Err(ValidationError::BlankStakeholder)
        );
        assert!(agg.record(good.clone(), "고객", -5.0).is_err());

        let mut bad = good;
        bad.confidence = 1.5;
        assert!(agg.record(bad, "고객", 2.0).is_err());

        assert_eq!(snapshot(&agg), before);
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn from_entries_matches_incremental_recording() {
        let mut incremental = Aggregator::default();
        let texts = ["좋아요", "문제", "보통", "추천", "우려", "좋다"];
        for (i, text) in texts.iter().enumerate() {
            let who = if i % 2 == 0 { "고객" } else { "투자자" };
            incremental.record(score(text).unwrap(), who, i as f64).unwrap();
        }

        let rebuilt = Aggregator::from_entries(
            AggregatorOptions::default(),
            incremental.entries().to_vec(),
        )
        .unwrap();

        assert_eq!(snapshot(&rebuilt), snapshot(&incremental));
    }

    #[test]
    fn from_entries_rejects_malformed_entries() {
        let entry = AnalysisLogEntry {
            timestamp: 1.0,
            stakeholder: "".to_string(),
            verdict: score("좋아요").unwrap(),
        };
        assert!(Aggregator::from_entries(AggregatorOptions::default(), vec![entry]).is_err());
    }
}
