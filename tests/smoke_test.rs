//! Live smoke test against a running marketplace backend.
//!
//! Set `WASTEMARKET_API` to the backend base URL (defaults to the public
//! API) and optionally `OPENAI_API_KEY` to exercise the assistant. Run with:
//! ```sh
//! cargo test --test smoke_test -- --ignored --nocapture
//! ```

use wastemarket_sdk::config;
use wastemarket_sdk::models::{Role, Tier};
use wastemarket_sdk::queries::TransactionFilter;
use wastemarket_sdk::{Conversation, MarketSdk};

fn section(name: &str) {
    eprintln!("\n{}", "=".repeat(60));
    eprintln!("  {}", name);
    eprintln!("{}", "=".repeat(60));
}

#[derive(Default)]
struct Tally {
    pass: usize,
    fail: usize,
}

impl Tally {
    fn check(&mut self, label: &str, ok: bool, detail: String) {
        if ok {
            self.pass += 1;
        } else {
            self.fail += 1;
        }
        eprintln!("  [{}] {} {}", if ok { "PASS" } else { "FAIL" }, label, detail);
    }
}

#[test]
#[ignore]
fn smoke_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let api = std::env::var("WASTEMARKET_API").unwrap_or_else(|_| config::API_BASE.to_string());
    let tmp = tempfile::tempdir().unwrap();
    let mut builder = MarketSdk::builder()
        .cache_dir(tmp.path())
        .api_base(&api)
        .remote_margins(true);
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        builder = builder.openai_key(key);
    }
    let sdk = builder.build().unwrap();
    let mut t = Tally::default();

    section("Meta");
    let meta = sdk.meta();
    t.check("meta loads", meta.is_ok(), format!("{:?}", meta.map(|m| m.get("version").cloned())));
    let margins = sdk.margins().snapshot();
    t.check(
        "margins loaded",
        margins.config.validate().is_ok(),
        format!("{:?} v{}", margins.config, margins.version),
    );

    section("Catalog and prices");
    let items = sdk.catalog().list(None).unwrap();
    t.check("catalog not empty", !items.is_empty(), format!("{} items", items.len()));
    let table = sdk.prices().table(None).unwrap();
    let monotone = table.iter().all(|row| {
        let p = row.prices.as_array();
        p[0] >= p[1] && p[1] >= p[2] && p[2] >= p[3]
    });
    t.check("prices non-increasing down the chain", monotone, String::new());
    let consumer = sdk.prices().for_tier(Tier::Consumer, None).unwrap();
    t.check("consumer view", consumer.len() == items.len(), String::new());

    section("Drop points");
    match sdk.drop_points().nearest(-6.2, 106.8166, 5) {
        Ok(nearby) => t.check("nearest", true, format!("{} found", nearby.len())),
        Err(e) => t.check("nearest", false, e.to_string()),
    }

    section("Transactions");
    match sdk.transactions().list(&TransactionFilter::default()) {
        Ok(all) => {
            t.check("list", true, format!("{} transactions", all.len()));
            if let Some(first) = all.first() {
                let value = sdk.transaction_value(first, Tier::Consumer).unwrap();
                t.check("value first", value.total >= 0.0, format!("{}", value.total));
            }
        }
        Err(e) => t.check("list", false, e.to_string()),
    }

    section("Margins (read-only role)");
    let denied = sdk.set_margin(Role::Nasabah, wastemarket_sdk::models::MarginStage::Tier1To2, 0.1);
    t.check("nasabah rejected", denied.is_err(), String::new());

    section("Assistant");
    let mut conversation = Conversation::new();
    let reply = sdk.ask(&mut conversation, "Berapa harga kardus per kg di tingkat nasabah?");
    t.check("ask", !reply.text.is_empty(), format!("fallback={}", reply.is_fallback()));

    section("Refresh");
    t.check("refresh", sdk.refresh().is_ok(), String::new());

    eprintln!("\n{}\n  PASS: {}  FAIL: {}\n  {}", "=".repeat(60), t.pass, t.fail, sdk);
    assert_eq!(t.fail, 0);
}
