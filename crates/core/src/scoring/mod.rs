//! Rule-based sentiment scorer.
//!
//! Matching is plain substring containment over the lowercased input, so a stem also hits
//! inside longer words ("만족" inside "불만족"). That over-matching is part of the contract.

pub mod lexicon;

use crate::domain::sentiment::{
    Sentiment, SentimentVerdict, MAX_CONFIDENCE, MAX_KEYWORDS, MIN_CONFIDENCE,
};
use crate::error::EmptyInputError;

const POLAR_BASE_CONFIDENCE: f64 = 0.7;
const CONFIDENCE_PER_HIT: f64 = 0.1;

pub fn score(text: &str) -> Result<SentimentVerdict, EmptyInputError> {
    if text.trim().is_empty() {
        return Err(EmptyInputError);
    }

    let normalized = text.to_lowercase();
    let positive = matched(&normalized, lexicon::POSITIVE);
    let negative = matched(&normalized, lexicon::NEGATIVE);

    let (sentiment, confidence) = classify(positive.len(), negative.len());

    let keywords = positive
        .into_iter()
        .chain(negative)
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect();

    Ok(SentimentVerdict {
        text: text.to_string(),
        sentiment,
        confidence,
        keywords,
    })
}

fn matched<'a>(normalized: &str, lexicon: &[&'a str]) -> Vec<&'a str> {
    lexicon
        .iter()
        .copied()
        .filter(|entry| normalized.contains(entry))
        .collect()
}

fn classify(positive_hits: usize, negative_hits: usize) -> (Sentiment, f64) {
    if positive_hits > negative_hits {
        (Sentiment::Positive, polar_confidence(positive_hits))
    } else if negative_hits > positive_hits {
        (Sentiment::Negative, polar_confidence(negative_hits))
    } else {
        (Sentiment::Neutral, MIN_CONFIDENCE)
    }
}

fn polar_confidence(hits: usize) -> f64 {
    let raw = (POLAR_BASE_CONFIDENCE + CONFIDENCE_PER_HIT * hits as f64).min(MAX_CONFIDENCE);
    // Two decimals, so 0.7 + 0.1 reports as 0.8 rather than 0.7999999999999999.
    ((raw * 100.0).round() / 100.0).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_matches_is_neutral_with_base_confidence() {
        let v = score("보통입니다").unwrap();
        assert_eq!(v.sentiment, Sentiment::Neutral);
        assert_eq!(v.confidence, 0.5);
        assert!(v.keywords.is_empty());
    }

    #[test]
    fn positive_text_reports_matched_keywords() {
        let v = score("정말 좋습니다 추천해요").unwrap();
        assert_eq!(v.sentiment, Sentiment::Positive);
        assert_eq!(v.keywords, vec!["좋".to_string(), "추천".to_string()]);
        assert_eq!(v.confidence, 0.9);
        assert!(v.confidence > 0.5);
    }

    #[test]
    fn negative_text_is_negative() {
        let v = score("실망스럽고 별로입니다").unwrap();
        assert_eq!(v.sentiment, Sentiment::Negative);
        assert!(v.confidence > 0.5);
        assert_eq!(v.keywords, vec!["실망".to_string(), "별로".to_string()]);
    }

    #[test]
    fn single_hit_rounds_to_two_decimals() {
        let v = score("개선되었어요").unwrap();
        assert_eq!(v.sentiment, Sentiment::Positive);
        assert_eq!(v.confidence, 0.8);
    }

    #[test]
    fn equal_hits_tie_to_neutral() {
        let v = score("만족스럽지만 우려도 있다").unwrap();
        assert_eq!(v.sentiment, Sentiment::Neutral);
        assert_eq!(v.confidence, 0.5);
        assert_eq!(v.keywords, vec!["만족".to_string(), "우려".to_string()]);
    }

    #[test]
    fn substring_matching_over_matches_inside_words() {
        // "불만족" contains both "불만" and "만족".
        let v = score("불만족").unwrap();
        assert_eq!(v.sentiment, Sentiment::Neutral);
        assert_eq!(v.keywords, vec!["만족".to_string(), "불만".to_string()]);
    }

    #[test]
    fn repeated_entries_count_once() {
        let v = score("실망 실망 실망").unwrap();
        assert_eq!(v.confidence, 0.8);
        assert_eq!(v.keywords, vec!["실망".to_string()]);
    }

    #[test]
    fn confidence_caps_and_keywords_truncate() {
        let v = score("훌륭하고 만족스럽고 추천하며 성공적이고 우수하다").unwrap();
        assert_eq!(v.sentiment, Sentiment::Positive);
        assert_eq!(v.confidence, 0.95);
        assert_eq!(
            v.keywords,
            vec!["훌륭".to_string(), "만족".to_string(), "추천".to_string()]
        );
    }

    #[test]
    fn keywords_list_positive_before_negative() {
        let v = score("문제가 있지만 개선과 발전이 있고 성공했다").unwrap();
        assert_eq!(v.sentiment, Sentiment::Positive);
        assert_eq!(
            v.keywords,
            vec!["성공".to_string(), "발전".to_string(), "개선".to_string()]
        );
    }

    #[test]
    fn matching_ignores_case_but_preserves_original_text() {
        let v = score("Product is 좋아요 OK").unwrap();
        assert_eq!(v.text, "Product is 좋아요 OK");
        assert_eq!(v.sentiment, Sentiment::Positive);
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(score(""), Err(EmptyInputError));
        assert_eq!(score("   "), Err(EmptyInputError));
        assert_eq!(score("\n\t"), Err(EmptyInputError));
    }

    #[test]
    fn scoring_is_deterministic_and_bounded() {
        let inputs = [
            "보통입니다",
            "정말 좋습니다 추천해요",
            "실망스럽고 별로입니다",
            "문제 불만 실패 악화 부족",
            "x",
        ];
        for text in inputs {
            let a = score(text).unwrap();
            let b = score(text).unwrap();
            assert_eq!(a, b);
            assert_eq!(a.confidence.to_bits(), b.confidence.to_bits());
            assert!((0.5..=0.95).contains(&a.confidence));
            assert!(a.keywords.len() <= 3);
        }
    }
}
