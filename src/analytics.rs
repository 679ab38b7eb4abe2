//! Aggregation engine: turns a small batch of raw reviews into the full
//! dashboard payload.
//!
//! The handful of sampled reviews is deliberately amplified by fixed
//! presentation multipliers so the dashboard reads like a popular product
//! rather than an eight-row table. The scaling is cosmetic, not a
//! statistical projection.

use crate::crawler::RawReview;
use crate::sentiment::{classify, Sentiment};
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

/// Presentation multiplier applied to the sampled review count.
const SCALE_MULTIPLIER: u64 = 50;
/// Display multiplier applied to word-frequency counts.
const WORD_COUNT_MULTIPLIER: u64 = 10;
/// Tokens shorter than this never make the frequency list.
const MIN_WORD_LEN: usize = 5;
/// How many ranked words the payload carries.
const WORD_FREQUENCY_CAP: usize = 5;
/// How many classified reviews the payload carries.
const REVIEW_SAMPLE_CAP: usize = 8;
/// Fixed provenance label attached to every classified review.
const REVIEW_DATE_LABEL: &str = "Verified Amazon Review";

const TREND_MONTHS: [&str; 5] = ["Jan", "Feb", "Mar", "Apr", "May"];

static STOP_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["this", "that", "with", "have"].into_iter().collect());

/// A review annotated for dashboard display. `id` is the 1-based position
/// in the input batch, not a durable identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClassifiedReview {
    pub id: usize,
    pub text: String,
    pub sentiment: Sentiment,
    pub rating: u8,
    pub date: String,
}

/// Scaled per-label counts. Each value is rounded independently, so the
/// three need not sum to `totalReviews` exactly; that discrepancy is an
/// accepted presentation approximation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SentimentCounts {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

/// One synthesized monthly bucket of the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrendPoint {
    pub month: String,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WordFrequency {
    pub word: String,
    pub count: u64,
}

/// The terminal artifact of one request. Field names are a contract surface
/// consumed by the dashboard front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub total_reviews: u64,
    pub average_rating: f64,
    pub sentiment_counts: SentimentCounts,
    pub trend_data: Vec<TrendPoint>,
    pub word_frequency: Vec<WordFrequency>,
    pub reviews: Vec<ClassifiedReview>,
    pub product_name: String,
    pub is_fallback: bool,
}

/// Aggregate a batch of raw reviews into dashboard statistics.
///
/// Precondition: `reviews` is non-empty. The orchestrator guarantees this
/// by substituting the synthetic corpus before calling. `product_name` and
/// `is_fallback` are left at their defaults for the caller to fill in.
pub fn aggregate(reviews: &[RawReview]) -> DashboardPayload {
    debug_assert!(!reviews.is_empty(), "aggregate requires at least one review");

    let mut classified = Vec::with_capacity(reviews.len());
    let mut positive: u64 = 0;
    let mut neutral: u64 = 0;
    let mut negative: u64 = 0;
    let mut rating_sum: u64 = 0;

    for (i, review) in reviews.iter().enumerate() {
        let sentiment = classify(&review.text);
        match sentiment {
            Sentiment::Positive => positive += 1,
            Sentiment::Neutral => neutral += 1,
            Sentiment::Negative => negative += 1,
        }
        rating_sum += review.rating as u64;

        classified.push(ClassifiedReview {
            id: i + 1,
            text: review.text.clone(),
            sentiment,
            rating: review.rating,
            date: REVIEW_DATE_LABEL.to_string(),
        });
    }

    let count = reviews.len() as u64;
    let average_rating = round1(rating_sum as f64 / count as f64);
    let total_reviews = count * SCALE_MULTIPLIER;

    let pos_ratio = positive as f64 / count as f64;
    let neu_ratio = neutral as f64 / count as f64;
    let neg_ratio = negative as f64 / count as f64;

    let sentiment_counts = SentimentCounts {
        positive: (total_reviews as f64 * pos_ratio).round() as u64,
        neutral: (total_reviews as f64 * neu_ratio).round() as u64,
        negative: (total_reviews as f64 * neg_ratio).round() as u64,
    };

    let trend_data = synth_trend(total_reviews, pos_ratio, neg_ratio, neu_ratio);
    let word_frequency = rank_words(reviews);

    classified.truncate(REVIEW_SAMPLE_CAP);

    DashboardPayload {
        total_reviews,
        average_rating,
        sentiment_counts,
        trend_data,
        word_frequency,
        reviews: classified,
        product_name: String::new(),
        is_fallback: false,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Synthesize a 5-month trend line from the static snapshot. The jitter
/// keeps the chart from rendering flat; it is presentation noise drawn
/// fresh per bucket per label, not temporal data.
fn synth_trend(total: u64, pos_ratio: f64, neg_ratio: f64, neu_ratio: f64) -> Vec<TrendPoint> {
    let mut rng = rand::thread_rng();
    let base = total as f64 / TREND_MONTHS.len() as f64;

    TREND_MONTHS
        .iter()
        .map(|month| TrendPoint {
            month: month.to_string(),
            positive: (base * pos_ratio * rng.gen_range(0.9..1.1)) as u64,
            negative: (base * neg_ratio * rng.gen_range(0.9..1.1)) as u64,
            neutral: (base * neu_ratio * rng.gen_range(0.9..1.1)) as u64,
        })
        .collect()
}

/// Rank the most frequent meaningful words across all review texts.
/// Ties keep first-encountered order (the sort is stable).
fn rank_words(reviews: &[RawReview]) -> Vec<WordFrequency> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for review in reviews {
        for word in review.text.to_lowercase().split_whitespace() {
            if word.len() < MIN_WORD_LEN || STOP_WORDS.contains(word) {
                continue;
            }
            let entry = counts.entry(word.to_string()).or_insert(0);
            if *entry == 0 {
                order.push(word.to_string());
            }
            *entry += 1;
        }
    }

    order.sort_by(|a, b| counts[b].cmp(&counts[a]));

    let ranked: Vec<WordFrequency> = order
        .into_iter()
        .take(WORD_FREQUENCY_CAP)
        .map(|word| WordFrequency {
            count: counts[&word] * WORD_COUNT_MULTIPLIER,
            word: title_case(&word),
        })
        .collect();

    if ranked.is_empty() {
        // Nothing survived the filters; the chart still needs one bar.
        return vec![WordFrequency { word: "Quality".to_string(), count: 100 }];
    }
    ranked
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::generate_fallback_reviews;
    use pretty_assertions::assert_eq;

    fn review(text: &str, rating: u8) -> RawReview {
        RawReview { text: text.to_string(), rating }
    }

    #[test]
    fn test_total_reviews_is_count_times_fifty() {
        let payload = aggregate(&generate_fallback_reviews("Widget X"));
        assert_eq!(payload.total_reviews, 8 * 50);

        let payload = aggregate(&[review("A perfectly reasonable kettle overall.", 4)]);
        assert_eq!(payload.total_reviews, 50);
    }

    #[test]
    fn test_average_rating_rounds_to_one_decimal() {
        // Fallback ratings sum to 27 over 8 reviews: 3.375 -> 3.4
        let payload = aggregate(&generate_fallback_reviews("Widget X"));
        assert_eq!(payload.average_rating, 3.4);
        assert!((0.0..=5.0).contains(&payload.average_rating));
    }

    #[test]
    fn test_sentiment_counts_cover_all_labels() {
        let payload = aggregate(&generate_fallback_reviews("Widget X"));
        // The struct guarantees the three keys; the scaled values must not
        // exceed the scaled total per label.
        assert!(payload.sentiment_counts.positive <= payload.total_reviews);
        assert!(payload.sentiment_counts.neutral <= payload.total_reviews);
        assert!(payload.sentiment_counts.negative <= payload.total_reviews);
    }

    #[test]
    fn test_classification_preserves_order_and_positional_ids() {
        let payload = aggregate(&generate_fallback_reviews("Widget X"));
        let ids: Vec<usize> = payload.reviews.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(payload.reviews[0].text.starts_with("I bought the Widget X"));
        assert_eq!(payload.reviews[0].date, "Verified Amazon Review");
    }

    #[test]
    fn test_reviews_truncated_to_eight() {
        let many: Vec<RawReview> = (0..12)
            .map(|i| review(&format!("Review number {} with plenty of text.", i), 4))
            .collect();
        let payload = aggregate(&many);
        assert_eq!(payload.reviews.len(), 8);
        assert_eq!(payload.total_reviews, 12 * 50);
    }

    #[test]
    fn test_trend_has_five_labeled_buckets_within_jitter_envelope() {
        let reviews = vec![
            review("Amazing product, works great, love the excellent design.", 5),
            review("Wonderful value and fantastic quality, highly recommend.", 5),
        ];
        let payload = aggregate(&reviews);

        let months: Vec<&str> = payload.trend_data.iter().map(|t| t.month.as_str()).collect();
        assert_eq!(months, vec!["Jan", "Feb", "Mar", "Apr", "May"]);

        // Both reviews classify Positive, so base share = 100 * 2 / 5 = 40
        // per bucket and the jitter envelope is [0.9, 1.1).
        let base = payload.total_reviews as f64 / 5.0;
        for bucket in &payload.trend_data {
            assert!((bucket.positive as f64) >= (base * 0.9).floor() - 1.0);
            assert!((bucket.positive as f64) <= base * 1.1);
            assert_eq!(bucket.negative, 0);
            assert_eq!(bucket.neutral, 0);
        }
    }

    #[test]
    fn test_word_frequency_ranks_and_scales() {
        let reviews = vec![review(
            "excellent excellent excellent product product camera",
            5,
        )];
        let payload = aggregate(&reviews);
        assert_eq!(
            payload.word_frequency,
            vec![
                WordFrequency { word: "Excellent".to_string(), count: 30 },
                WordFrequency { word: "Product".to_string(), count: 20 },
                WordFrequency { word: "Camera".to_string(), count: 10 },
            ]
        );
    }

    #[test]
    fn test_word_frequency_tie_break_keeps_first_encountered() {
        let reviews = vec![review("zebra apple mango", 3)];
        let payload = aggregate(&reviews);
        let words: Vec<&str> = payload
            .word_frequency
            .iter()
            .map(|w| w.word.as_str())
            .collect();
        assert_eq!(words, vec!["Zebra", "Apple", "Mango"]);
    }

    #[test]
    fn test_word_frequency_placeholder_when_nothing_survives() {
        // Every token is either a stop word or too short.
        let reviews = vec![review("this that with have ok no yes", 3)];
        let payload = aggregate(&reviews);
        assert_eq!(
            payload.word_frequency,
            vec![WordFrequency { word: "Quality".to_string(), count: 100 }]
        );
    }

    #[test]
    fn test_word_frequency_capped_at_five() {
        let reviews = vec![review(
            "alpha1x bravo2x charlie3x delta4x echo5x foxtrot6x golfy7x",
            3,
        )];
        let payload = aggregate(&reviews);
        assert!(payload.word_frequency.len() <= 5);
        assert!(!payload.word_frequency.is_empty());
    }

    #[test]
    fn test_aggregate_idempotent_except_trend() {
        let corpus = generate_fallback_reviews("Widget X");
        let first = aggregate(&corpus);
        let second = aggregate(&corpus);

        assert_eq!(first.total_reviews, second.total_reviews);
        assert_eq!(first.average_rating, second.average_rating);
        assert_eq!(first.sentiment_counts, second.sentiment_counts);
        assert_eq!(first.word_frequency, second.word_frequency);
        assert_eq!(first.reviews, second.reviews);

        // Trend is jitter-dependent: same shape, values within the shared
        // envelope rather than exactly equal.
        assert_eq!(first.trend_data.len(), second.trend_data.len());
        let base = first.total_reviews as f64 / 5.0;
        for (a, b) in first.trend_data.iter().zip(second.trend_data.iter()) {
            assert_eq!(a.month, b.month);
            for value in [a.positive, a.negative, a.neutral, b.positive, b.negative, b.neutral] {
                assert!((value as f64) <= base * 1.1);
            }
        }
    }

    #[test]
    fn test_rating_zero_counts_toward_average() {
        // Unknown ratings drag the average down rather than being dropped.
        let reviews = vec![
            review("Plenty of characters in this review body.", 0),
            review("Another review body with plenty of characters.", 4),
        ];
        assert_eq!(aggregate(&reviews).average_rating, 2.0);
    }
}
