use crate::domain::sentiment::{
    AnalysisLogEntry, GlobalSummary, Sentiment, SentimentVerdict, StakeholderRecord, Trend,
};

// Pseudo-count (in confidence hundredths) that pulls thin histories toward 50.
const PRIOR_WEIGHT: u64 = 100;

const POSITIVE_ABOVE: u8 = 60;
const NEGATIVE_BELOW: u8 = 40;

/// Global sentiment mix over the full log. Percentages always sum to 100 once the log is
/// non-empty; an empty log yields all zeros.
pub fn summarize(log: &[AnalysisLogEntry]) -> GlobalSummary {
    let total = log.len();
    if total == 0 {
        return GlobalSummary::default();
    }

    // positive, neutral, negative
    let mut counts = [0usize; 3];
    for entry in log {
        counts[bucket(entry.verdict.sentiment)] += 1;
    }

    let mut pct = counts.map(|c| round_ratio(c as u64 * 100, total as u64) as i64);

    let drift = 100 - pct.iter().sum::<i64>();
    if drift != 0 {
        // Largest bucket by count; ties resolve to the earlier bucket.
        let mut largest = 0;
        for i in 1..counts.len() {
            if counts[i] > counts[largest] {
                largest = i;
            }
        }
        pct[largest] += drift;
    }

    GlobalSummary {
        positive_pct: pct[0] as u8,
        neutral_pct: pct[1] as u8,
        negative_pct: pct[2] as u8,
        total_analyses: total,
    }
}

/// Recomputes one stakeholder's record from every log entry attributed to it.
pub fn stakeholder_record(name: &str, log: &[AnalysisLogEntry], window: usize) -> StakeholderRecord {
    let verdicts: Vec<&SentimentVerdict> = log
        .iter()
        .filter(|e| e.stakeholder == name)
        .map(|e| &e.verdict)
        .collect();

    let score = blended_score(&verdicts);

    StakeholderRecord {
        name: name.to_string(),
        sentiment: classify_score(score),
        score,
        trend: trend(&verdicts, window),
        recent_mentions: verdicts.len().min(window),
    }
}

/// Confidence-weighted polarity ratio mapped onto 0..=100:
/// `50 + 50 * (P - N) / (P + N + U + prior)`, with P/N/U the summed confidences (in
/// hundredths) of positive/negative/neutral verdicts.
///
/// Another positive verdict never lowers the result and another negative verdict never
/// raises it. Integer arithmetic keeps that exact after rounding.
pub fn blended_score(verdicts: &[&SentimentVerdict]) -> u8 {
    let (mut positive, mut negative, mut neutral) = (0u64, 0u64, 0u64);
    for v in verdicts {
        let weight = confidence_hundredths(v.confidence);
        match v.sentiment {
            Sentiment::Positive => positive += weight,
            Sentiment::Negative => negative += weight,
            Sentiment::Neutral => neutral += weight,
        }
    }

    let denom = positive + negative + neutral + PRIOR_WEIGHT;
    // 50 * (denom + P - N) / denom; denom + P - N >= 0 because denom >= N.
    let numer = 50 * (denom + positive - negative);
    round_ratio(numer, denom).min(100) as u8
}

pub fn classify_score(score: u8) -> Sentiment {
    if score > POSITIVE_ABOVE {
        Sentiment::Positive
    } else if score < NEGATIVE_BELOW {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Compares the newest `window` verdicts against the `window` before them. Flat until two
/// full windows exist.
pub fn trend(verdicts: &[&SentimentVerdict], window: usize) -> Trend {
    if window == 0 || verdicts.len() < window * 2 {
        return Trend::Flat;
    }

    let split = verdicts.len() - window;
    let current = blended_score(&verdicts[split..]);
    let prior = blended_score(&verdicts[split - window..split]);

    match current.cmp(&prior) {
        std::cmp::Ordering::Greater => Trend::Up,
        std::cmp::Ordering::Less => Trend::Down,
        std::cmp::Ordering::Equal => Trend::Flat,
    }
}

fn bucket(sentiment: Sentiment) -> usize {
    match sentiment {
        Sentiment::Positive => 0,
        Sentiment::Neutral => 1,
        Sentiment::Negative => 2,
    }
}

fn confidence_hundredths(confidence: f64) -> u64 {
    (confidence * 100.0).round().max(0.0) as u64
}

// Round-half-up integer division.
fn round_ratio(numer: u64, denom: u64) -> u64 {
    (2 * numer + denom) / (2 * denom)
}
