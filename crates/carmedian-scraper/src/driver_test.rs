use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use carmedian_core::Target;

use super::*;
use crate::resolve::plan_work;

/// Scripted page contents keyed by URL.
#[derive(Clone, Default)]
struct FakeDoc {
    cards: Vec<String>,
    body: String,
    nav_fails: bool,
}

struct FakeBrowser {
    docs: Arc<HashMap<String, FakeDoc>>,
    pages_opened: Arc<AtomicUsize>,
}

impl FakeBrowser {
    fn new(docs: HashMap<String, FakeDoc>) -> Self {
        Self {
            docs: Arc::new(docs),
            pages_opened: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>, ScrapeError> {
        self.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            docs: Arc::clone(&self.docs),
            current: None,
        }))
    }
}

struct FakePage {
    docs: Arc<HashMap<String, FakeDoc>>,
    current: Option<FakeDoc>,
}

#[async_trait]
impl Page for FakePage {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), ScrapeError> {
        let doc = self.docs.get(url).cloned().unwrap_or_default();
        if doc.nav_fails {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        self.current = Some(doc);
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<bool, ScrapeError> {
        Ok(self.current.as_ref().is_some_and(|d| !d.cards.is_empty()))
    }

    async fn body_text(&self) -> Result<String, ScrapeError> {
        Ok(self.current.as_ref().map(|d| d.body.clone()).unwrap_or_default())
    }

    async fn extract_cards(
        &self,
        _card_selector: &str,
        _price_selectors: &[String],
        _attribute: Option<&str>,
        max_cards: usize,
    ) -> Result<Vec<String>, ScrapeError> {
        let mut cards = self.current.as_ref().map(|d| d.cards.clone()).unwrap_or_default();
        cards.truncate(max_cards);
        Ok(cards)
    }

    async fn scroll_and_height(&mut self) -> Result<u64, ScrapeError> {
        Ok(1_000)
    }
}

fn test_config() -> AppConfig {
    let mut config = carmedian_core::load_config_from_env().unwrap();
    config.url_template = "https://x.test/{modelSlug}".to_string();
    config.rate_limit_ms = 0;
    config.scroll_rounds = 1;
    config.min_prices = 12;
    config
}

fn target(model: &str) -> Target {
    Target {
        year: 2020,
        make: "Honda".to_string(),
        model: model.to_string(),
    }
}

/// 15 plausibly spread prices that clear the uniformity guard.
fn spread_prices() -> Vec<String> {
    (0..15)
        .map(|i| format!("${},{:03}", 12 + i, (i * 137) % 1000))
        .collect()
}

#[tokio::test]
async fn end_to_end_one_good_one_sparse_one_bot_walled() {
    let config = test_config();
    let targets = vec![target("Accord"), target("Civic"), target("Pilot")];
    let work = plan_work(
        &targets,
        &config.url_template,
        0,
        99,
        &std::collections::HashSet::new(),
    );

    let mut docs = HashMap::new();
    // Target A: plenty of valid, spread prices.
    docs.insert(
        "https://x.test/accord".to_string(),
        FakeDoc {
            cards: spread_prices(),
            ..FakeDoc::default()
        },
    );
    // Target B: only 3 prices, below minPrices.
    docs.insert(
        "https://x.test/civic".to_string(),
        FakeDoc {
            cards: vec!["$12,500".to_string(), "$13,000".to_string(), "$14,250".to_string()],
            ..FakeDoc::default()
        },
    );
    // Target C: no cards, captcha phrasing.
    docs.insert(
        "https://x.test/pilot".to_string(),
        FakeDoc {
            body: "Verify you are not a robot: captcha".to_string(),
            ..FakeDoc::default()
        },
    );

    let browser = FakeBrowser::new(docs);
    let report = run(&browser, &config, &work).await.unwrap();

    assert_eq!(report.attempted, 3);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].model, "Accord");
    assert_eq!(report.rows[0].n, 15);
    assert!(report.rows[0].p25 <= report.rows[0].median);
    assert!(report.rows[0].median <= report.rows[0].p75);
}

#[tokio::test]
async fn placeholder_and_out_of_range_samples_are_dropped_before_aggregation() {
    let mut config = test_config();
    config.min_prices = 3;

    let mut cards = vec![
        "Call for price".to_string(),
        "—".to_string(),
        "$500,000".to_string(), // above maxPrice
        String::new(),
    ];
    cards.extend(vec![
        "$12,500".to_string(),
        "$15,900".to_string(),
        "$19,000".to_string(),
        "$22,750".to_string(),
    ]);

    let mut docs = HashMap::new();
    docs.insert(
        "https://x.test/accord".to_string(),
        FakeDoc {
            cards,
            ..FakeDoc::default()
        },
    );

    let work = plan_work(
        &[target("Accord")],
        &config.url_template,
        0,
        99,
        &std::collections::HashSet::new(),
    );
    let browser = FakeBrowser::new(docs);
    let report = run(&browser, &config, &work).await.unwrap();

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].n, 4);
}

#[tokio::test]
async fn navigation_failure_opens_a_fresh_page_and_skips_the_target() {
    let config = test_config();
    let mut docs = HashMap::new();
    docs.insert(
        "https://x.test/accord".to_string(),
        FakeDoc {
            nav_fails: true,
            ..FakeDoc::default()
        },
    );

    let work = plan_work(
        &[target("Accord")],
        &config.url_template,
        0,
        99,
        &std::collections::HashSet::new(),
    );
    let browser = FakeBrowser::new(docs);
    let pages_opened = Arc::clone(&browser.pages_opened);
    let report = run(&browser, &config, &work).await.unwrap();

    assert!(report.rows.is_empty());
    // Initial page plus the retry's replacement context.
    assert_eq!(pages_opened.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn uniform_prices_produce_no_row() {
    let mut config = test_config();
    config.min_prices = 12;

    let mut docs = HashMap::new();
    docs.insert(
        "https://x.test/accord".to_string(),
        FakeDoc {
            cards: vec!["$20,000".to_string(); 15],
            ..FakeDoc::default()
        },
    );

    let work = plan_work(
        &[target("Accord")],
        &config.url_template,
        0,
        99,
        &std::collections::HashSet::new(),
    );
    let browser = FakeBrowser::new(docs);
    let report = run(&browser, &config, &work).await.unwrap();
    assert!(report.rows.is_empty());
}

#[tokio::test]
async fn persisted_rows_carry_display_normalized_names() {
    let mut config = test_config();
    config.min_prices = 3;

    let mut docs = HashMap::new();
    docs.insert(
        "https://x.test/grand-cherokee".to_string(),
        FakeDoc {
            cards: vec![
                "$21,000".to_string(),
                "$24,500".to_string(),
                "$28,900".to_string(),
                "$33,000".to_string(),
            ],
            ..FakeDoc::default()
        },
    );

    let work = plan_work(
        &[Target {
            year: 2019,
            make: "jeep".to_string(),
            model: "grand_cherokee".to_string(),
        }],
        &config.url_template,
        0,
        99,
        &std::collections::HashSet::new(),
    );
    let browser = FakeBrowser::new(docs);
    let report = run(&browser, &config, &work).await.unwrap();

    assert_eq!(report.rows[0].make, "Jeep");
    assert_eq!(report.rows[0].model, "Grand Cherokee");
}
