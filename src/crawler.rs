//! Live review acquisition via Headless Chrome.
//!
//! Drives a real browser through search -> product page -> reviews page and
//! parses the rendered markup with `scraper`. The upstream layout changes
//! without notice and blocks automated clients, so every failure mode here
//! collapses into an empty result; the caller falls back to synthetic data.

use anyhow::{anyhow, Result};
use headless_chrome::{Browser, LaunchOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// A single review as captured from either acquisition source.
/// Rating 0 means the star marker was missing entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReview {
    pub text: String,
    pub rating: u8,
}

// Standard desktop identity. A bare headless UA string gets rejected before
// the first selector ever matches.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Product-link locator strategies, most specific first. Later entries are
/// the increasingly generic fallbacks for when the search layout drifts.
const PRODUCT_LINK_SELECTORS: &[&str] = &[
    "a.a-link-normal.s-underline-text.s-underline-link-text.s-link-style.a-text-normal",
    "div[data-component-type='s-search-result'] h2 a",
    "div.s-result-item h2 a",
];

const REVIEW_CONTAINER_SELECTOR: &str = "div[data-hook='review']";
const REVIEW_BODY_SELECTOR: &str = "span[data-hook='review-body'] span";
const REVIEW_STAR_SELECTOR: &str = "i[data-hook='review-star-rating'] span";
const SEE_ALL_REVIEWS_SELECTOR: &str = "a[data-hook='see-all-reviews-link-foot']";

/// Bounded wait applied to each locator strategy.
const LOCATOR_TIMEOUT: Duration = Duration::from_secs(5);
/// Pause after navigation so client-side rendering settles.
const RENDER_PAUSE: Duration = Duration::from_secs(2);

/// Review bodies at or below this length are noise, not reviews.
const MIN_REVIEW_CHARS: usize = 10;

static STAR_NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)").unwrap());

/// Immutable scrape session configuration, built once per acquisition call.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub headless: bool,
    pub window_size: (u32, u32),
    pub user_agent: String,
}

impl ScrapeConfig {
    /// Read overrides from the environment, defaulting to a headless
    /// desktop session against the real review site.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("REVIEW_SOURCE_BASE")
                .unwrap_or_else(|_| "https://www.amazon.com".to_string()),
            headless: std::env::var("SCRAPER_HEADLESS")
                .map(|v| v != "false")
                .unwrap_or(true),
            window_size: (1920, 1080),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Acquire live reviews for a search query.
///
/// Never an error: launch failures, locator timeouts, blocked requests and
/// zero qualifying reviews all come back as an empty list. The cause is
/// logged here; the caller only needs to know that it must fall back.
pub async fn acquire_reviews(query: &str) -> Vec<RawReview> {
    let config = ScrapeConfig::from_env();
    info!("🔎 Starting live review scrape for: {}", query);

    match scrape_reviews(query, &config).await {
        Ok(reviews) => {
            info!("✅ Scrape finished with {} qualifying reviews", reviews.len());
            reviews
        }
        Err(e) => {
            warn!("⚠️ Scrape failed for '{}': {:#}. Treating as no results.", query, e);
            Vec::new()
        }
    }
}

async fn scrape_reviews(query: &str, config: &ScrapeConfig) -> Result<Vec<RawReview>> {
    let mut args = vec![
        std::ffi::OsStr::new("--disable-gpu"),
        std::ffi::OsStr::new("--no-sandbox"),
        std::ffi::OsStr::new("--disable-dev-shm-usage"),
        std::ffi::OsStr::new("--ignore-certificate-errors"),
    ];
    let ua_arg = format!("--user-agent={}", config.user_agent);
    args.push(std::ffi::OsStr::new(&ua_arg));
    if config.headless {
        args.push(std::ffi::OsStr::new("--headless=new"));
    }

    // Dropping `browser` reaps the Chrome process, so every exit path below
    // (including `?` bail-outs) still tears the session down.
    let browser = Browser::new(LaunchOptions {
        headless: false, // new headless mode is passed via args
        window_size: Some(config.window_size),
        args,
        ..Default::default()
    })?;
    let tab = browser.new_tab()?;

    // 1. Search
    let search_url = format!("{}/s?k={}", config.base_url, urlencoding::encode(query));
    debug!("Navigating to search: {}", search_url);
    tab.navigate_to(&search_url)?;
    tab.wait_until_navigated()?;

    // 2. Resolve the first product link, cascading through the strategies
    let mut product_link: Option<String> = None;
    for &selector in PRODUCT_LINK_SELECTORS {
        debug!("Trying product link selector: {}", selector);
        // Each strategy is independent: any failure inside it (timeout,
        // stale element, attribute read) just moves on to the next one.
        match tab.wait_for_element_with_custom_timeout(selector, LOCATOR_TIMEOUT) {
            Ok(element) => match element.get_attribute_value("href") {
                Ok(Some(href)) if !href.is_empty() => {
                    info!("Found product link via: {}", selector);
                    product_link = Some(absolute_url(&config.base_url, &href));
                    break;
                }
                Ok(_) => debug!("Selector '{}' matched an element without href", selector),
                Err(e) => debug!("Selector '{}' href read failed: {}", selector, e),
            },
            Err(e) => debug!("Selector '{}' gave up: {}", selector, e),
        }
    }
    let product_link =
        product_link.ok_or_else(|| anyhow!("no product link found for '{}'", query))?;

    // 3. Product page
    debug!("Navigating to product: {}", product_link);
    tab.navigate_to(&product_link)?;
    tab.wait_until_navigated()?;
    sleep(RENDER_PAUSE).await;

    // 4. "See all reviews" is best-effort; without it we scrape whatever
    // reviews the product page itself shows.
    match tab.find_element(SEE_ALL_REVIEWS_SELECTOR) {
        Ok(link) => {
            if let Ok(Some(href)) = link.get_attribute_value("href") {
                let all_reviews_url = absolute_url(&config.base_url, &href);
                info!("Navigating to all reviews: {}", all_reviews_url);
                tab.navigate_to(&all_reviews_url)?;
                tab.wait_until_navigated()?;
                sleep(RENDER_PAUSE).await;
            }
        }
        Err(_) => debug!("No 'see all reviews' link, scraping product page"),
    }

    // 5. Review markup can lag behind navigation. A timeout here is
    // tolerated: some reviews may already be present.
    if let Err(e) =
        tab.wait_for_element_with_custom_timeout(REVIEW_CONTAINER_SELECTOR, LOCATOR_TIMEOUT)
    {
        debug!("Review container wait timed out: {}", e);
    }

    // 6. Extract from the rendered page source, not the live DOM
    let html = tab.get_content()?;
    Ok(extract_reviews(&html))
}

/// Collect (text, rating) pairs from every review container in rendered
/// markup. A malformed container skips only itself, never the batch.
pub fn extract_reviews(html: &str) -> Vec<RawReview> {
    let document = Html::parse_document(html);
    let container_sel = Selector::parse(REVIEW_CONTAINER_SELECTOR).unwrap();
    let body_sel = Selector::parse(REVIEW_BODY_SELECTOR).unwrap();
    let star_sel = Selector::parse(REVIEW_STAR_SELECTOR).unwrap();

    let mut reviews = Vec::new();
    for container in document.select(&container_sel) {
        let body = match container.select(&body_sel).next() {
            Some(body) => body,
            None => continue,
        };
        let text = body.text().collect::<String>().trim().to_string();
        if text.chars().count() <= MIN_REVIEW_CHARS {
            debug!("Skipping too-short review body ({} chars)", text.chars().count());
            continue;
        }

        let rating = match container.select(&star_sel).next() {
            Some(label) => parse_star_rating(&label.text().collect::<String>()),
            // Star marker missing entirely: rating unknown
            None => 0,
        };

        reviews.push(RawReview { text, rating });
    }

    debug!("Extracted {} qualifying reviews from markup", reviews.len());
    reviews
}

/// Parse the leading numeral of a star label like "4.0 out of 5 stars".
/// A label that is present but unparsable still counts as rated: default 3.
pub fn parse_star_rating(label: &str) -> u8 {
    match STAR_NUMERAL
        .captures(label)
        .and_then(|c| c[1].parse::<f64>().ok())
    {
        Some(value) => (value as u8).min(5),
        None => 3,
    }
}

fn absolute_url(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", base.trim_end_matches('/'), href)
    }
}
