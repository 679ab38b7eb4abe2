//! Lexicon-based text polarity scoring and sentiment classification.
//!
//! Maps free text to a continuous polarity score in [-1.0, 1.0] using
//! positive/negative word lists, then to a discrete label via fixed
//! thresholds. No external ML dependencies.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

/// Discrete sentiment label attached to each review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

// Words that push a review's polarity up
static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "good", "great", "excellent", "amazing", "wonderful", "fantastic", "superb",
        "outstanding", "brilliant", "love", "loved", "best", "better", "perfect",
        "awesome", "incredible", "delightful", "pleasant", "satisfying", "satisfied",
        "recommend", "recommended", "impressive", "exceptional", "remarkable",
        "sturdy", "solid", "reliable", "durable", "comfortable", "beautiful",
        "value", "bargain", "exceeded", "happy", "pleased", "works", "decent",
        "fast", "quick", "easy", "smooth", "crisp", "helpful", "responsive",
    ]
    .into_iter()
    .collect()
});

// Words that push it down
static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "bad", "terrible", "awful", "horrible", "poor", "worst", "worse", "hate",
        "hated", "dislike", "disappointing", "disappointed", "disappoints",
        "failure", "failed", "fail", "broken", "broke", "stopped", "crashed",
        "defective", "damaged", "cracked", "scratched", "flimsy", "cheap",
        "useless", "waste", "wasted", "scam", "fraud", "fake", "unreliable",
        "slow", "laggy", "difficult", "complicated", "confusing", "expensive",
        "overpriced", "worthless", "garbage", "trash", "mediocre", "subpar",
        "inferior", "returned", "refund", "leaked", "noisy", "uncomfortable",
    ]
    .into_iter()
    .collect()
});

const POSITIVE_THRESHOLD: f64 = 0.15;
const NEGATIVE_THRESHOLD: f64 = -0.15;

/// Score the polarity of a text span in [-1.0, 1.0].
///
/// Counts lexicon hits among the alphabetic tokens; the score is the signed
/// ratio of positive to negative hits. Text with no sentiment-bearing word
/// (including empty or garbled input) scores 0.0 rather than failing.
pub fn polarity(text: &str) -> f64 {
    let lowercase = text.to_lowercase();
    let words: Vec<&str> = lowercase
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| w.len() > 2)
        .collect();

    let positive = words.iter().filter(|w| POSITIVE_WORDS.contains(*w)).count();
    let negative = words.iter().filter(|w| NEGATIVE_WORDS.contains(*w)).count();
    let total = positive + negative;

    if total == 0 {
        return 0.0;
    }

    (positive as f64 - negative as f64) / total as f64
}

// Both boundaries are exclusive: a score of exactly +/-0.15 stays Neutral.
fn classify_score(score: f64) -> Sentiment {
    if score > POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else if score < NEGATIVE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Classify a review text into one of the three dashboard labels.
pub fn classify(text: &str) -> Sentiment {
    classify_score(polarity(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_text() {
        let text = "This product is amazing and wonderful. I love it so much. Best purchase ever!";
        assert_eq!(classify(text), Sentiment::Positive);
    }

    #[test]
    fn test_negative_text() {
        let text = "This is terrible and horrible. I hate it. Worst experience ever, total failure.";
        assert_eq!(classify(text), Sentiment::Negative);
    }

    #[test]
    fn test_neutral_text() {
        let text = "The item arrived on time. It does what the listing says.";
        assert_eq!(classify(text), Sentiment::Neutral);
    }

    #[test]
    fn test_empty_and_garbled_input_degrades_to_neutral() {
        assert_eq!(classify(""), Sentiment::Neutral);
        assert_eq!(classify("1234 $$ ~~ !!"), Sentiment::Neutral);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        assert_eq!(classify_score(0.15), Sentiment::Neutral);
        assert_eq!(classify_score(-0.15), Sentiment::Neutral);
        assert_eq!(classify_score(0.16), Sentiment::Positive);
        assert_eq!(classify_score(-0.16), Sentiment::Negative);
    }

    #[test]
    fn test_polarity_stays_bounded() {
        for text in [
            "great great great great",
            "broken broken awful",
            "mixed: great but broken",
            "nothing relevant here",
        ] {
            let score = polarity(text);
            assert!((-1.0..=1.0).contains(&score), "score {} out of range", score);
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let text = "Sturdy build, great value, but the app is confusing.";
        assert_eq!(classify(text), classify(text));
    }
}
