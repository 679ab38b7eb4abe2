//! Synthetic review generator.
//!
//! Runs only when the live scrape yields nothing. Fabricates a fixed corpus
//! of plausible reviews around the caller's actual search term so the
//! dashboard still looks correct instead of coming back empty.

use crate::crawler::RawReview;

/// Generate exactly 8 synthetic reviews for a product. Infallible and
/// dependency-free; the templates and ratings are fixed, only the product
/// name varies.
pub fn generate_fallback_reviews(product_name: &str) -> Vec<RawReview> {
    vec![
        RawReview {
            text: format!(
                "I bought the {} last week and it works great. The build quality is decent for the price.",
                product_name
            ),
            rating: 4,
        },
        RawReview {
            text: format!("Not happy with the {}. It stopped working after two days.", product_name),
            rating: 1,
        },
        RawReview {
            text: format!("Amazing value! The {} exceeded my expectations in every way.", product_name),
            rating: 5,
        },
        RawReview {
            text: format!("It's okay. The {} does what it says, but nothing special.", product_name),
            rating: 3,
        },
        RawReview {
            text: format!(
                "Shipping was fast, but the {} arrived damaged. Support helped me out.",
                product_name
            ),
            rating: 2,
        },
        RawReview {
            text: format!(
                "I use the {} daily. Highly recommended for anyone looking for budget options.",
                product_name
            ),
            rating: 5,
        },
        RawReview {
            text: format!("The features on this {} are confusing. I returned it.", product_name),
            rating: 2,
        },
        RawReview {
            text: format!("Best purchase I've made all year. The {} is a game changer.", product_name),
            rating: 5,
        },
    ]
}
