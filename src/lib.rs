//! Waste marketplace SDK for Rust.
//!
//! Prices for recyclable waste cascade through four trading tiers: the
//! aggregator (pelapak) sets a base price and each handoff down to the
//! collection center, the local collection point and finally the household
//! seller marks it down by a margin ratio. This crate computes that cascade,
//! values transactions and photo scans with it, and wraps the marketplace
//! backend (catalog, drop points, transactions, margin config) plus the
//! optional vision and chat services.
//!
//! # Quick start
//!
//! ```no_run
//! use wastemarket_sdk::models::{MarginStage, Role, Tier};
//! use wastemarket_sdk::MarketSdk;
//!
//! let sdk = MarketSdk::builder().offline(true).build().unwrap();
//!
//! // Consumer-tier prices for every catalog item
//! let prices = sdk.prices().for_tier(Tier::Consumer, None).unwrap();
//!
//! // A collection-center operator raises the first margin
//! sdk.set_margin(Role::BankSampahInduk, MarginStage::Tier1To2, 0.18).unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod aggregate;
pub mod assistant;
pub mod cache;
pub mod cascade;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod error;
pub mod format;
pub mod margins;
pub mod models;
pub mod queries;
pub mod sql_builder;
pub mod vision;

#[cfg(feature = "async")]
pub use async_client::AsyncMarketSdk;
pub use aggregate::{aggregate, total_value, Aggregate};
pub use assistant::{Assistant, ChatModel, Conversation, Reply};
pub use cache::CacheManager;
pub use cascade::cascade;
pub use catalog::Catalog;
pub use connection::Connection;
pub use error::{MarketError, Result};
pub use margins::{MarginSnapshot, MarginSource, MarginStore};
pub use sql_builder::SqlBuilder;
pub use vision::{ScanOutcome, Scanner, UnmatchedCodePolicy, VisionClassifier};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::models::{
    DropPoint, MarginConfig, MarginStage, Notice, Role, Tier, TransactionRecord,
};

// ---------------------------------------------------------------------------
// MarketSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for [`MarketSdk`]. Obtain one with [`MarketSdk::builder()`].
pub struct MarketSdkBuilder {
    cache_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
    api_base: String,
    margins: MarginConfig,
    remote_margins: bool,
    margin_source: Option<Box<dyn MarginSource>>,
    vision: Option<Box<dyn VisionClassifier>>,
    chat: Option<Box<dyn ChatModel>>,
    openai_key: Option<String>,
    unmatched_policy: UnmatchedCodePolicy,
}

impl Default for MarketSdkBuilder {
    fn default() -> Self {
        Self {
            cache_dir: None,
            offline: false,
            timeout: Duration::from_secs(120),
            api_base: config::API_BASE.to_string(),
            margins: MarginConfig::default(),
            remote_margins: false,
            margin_source: None,
            vision: None,
            chat: None,
            openai_key: None,
            unmatched_policy: UnmatchedCodePolicy::default(),
        }
    }
}

impl MarketSdkBuilder {
    /// Set a custom cache directory. Defaults to
    /// [`config::default_cache_dir`].
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Never contact the backend; use cached files (and the built-in
    /// catalog) only. Defaults to `false`.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// HTTP timeout for every outbound call. Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL of the marketplace REST backend.
    pub fn api_base(mut self, url: &str) -> Self {
        self.api_base = url.to_string();
        self
    }

    /// Initial margin ratios, used until a remote source is read.
    pub fn margins(mut self, margins: MarginConfig) -> Self {
        self.margins = margins;
        self
    }

    /// Read and write margins through the REST backend.
    pub fn remote_margins(mut self, enabled: bool) -> Self {
        self.remote_margins = enabled;
        self
    }

    /// Use a custom margin backing store. Takes precedence over
    /// [`remote_margins`](Self::remote_margins).
    pub fn margin_source(mut self, source: Box<dyn MarginSource>) -> Self {
        self.margin_source = Some(source);
        self
    }

    pub fn vision(mut self, classifier: Box<dyn VisionClassifier>) -> Self {
        self.vision = Some(classifier);
        self
    }

    pub fn chat(mut self, model: Box<dyn ChatModel>) -> Self {
        self.chat = Some(model);
        self
    }

    /// Use OpenAI-hosted vision and chat models with the given key, for
    /// whichever of the two has not been set explicitly.
    pub fn openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_key = Some(key.into());
        self
    }

    pub fn unmatched_policy(mut self, policy: UnmatchedCodePolicy) -> Self {
        self.unmatched_policy = policy;
        self
    }

    /// Build the SDK.
    ///
    /// Data files are fetched lazily on first query. When a margin source is
    /// configured it is read once here; if that fails the initial margins
    /// stay in effect.
    pub fn build(self) -> Result<MarketSdk> {
        let cache = CacheManager::new(self.cache_dir, &self.api_base, self.offline, self.timeout)?;
        let conn = Connection::new(cache)?;

        let source = match self.margin_source {
            Some(source) => Some(source),
            None if self.remote_margins && !self.offline => Some(Box::new(
                margins::HttpMarginSource::new(&self.api_base, self.timeout)?,
            ) as Box<dyn MarginSource>),
            None => None,
        };
        let margins = match source {
            Some(source) => {
                let store = MarginStore::with_source(self.margins, source);
                if let Err(e) = store.refresh() {
                    warn!("could not load margins, using initial values: {}", e);
                }
                store
            }
            None => MarginStore::new(self.margins),
        };

        let mut vision = self.vision;
        let mut chat = self.chat;
        if let Some(key) = self.openai_key {
            if vision.is_none() {
                vision = Some(Box::new(vision::OpenAiVisionClassifier::new(
                    config::VISION_ENDPOINT,
                    config::VISION_MODEL,
                    Some(key.clone()),
                    self.timeout,
                )?));
            }
            if chat.is_none() {
                chat = Some(Box::new(assistant::OpenAiChatModel::new(
                    config::CHAT_ENDPOINT,
                    config::CHAT_MODEL,
                    Some(key),
                    self.timeout,
                )?));
            }
        }

        Ok(MarketSdk {
            conn,
            margins: Arc::new(margins),
            vision,
            chat,
            unmatched_policy: self.unmatched_policy,
        })
    }
}

// ---------------------------------------------------------------------------
// MarketSdk
// ---------------------------------------------------------------------------

/// Main entry point.
///
/// Owns the DuckDB [`Connection`] (and through it the [`CacheManager`]), the
/// shared [`MarginStore`] and the optional service clients. Query accessors
/// return lightweight wrappers borrowing the connection.
pub struct MarketSdk {
    conn: Connection,
    margins: Arc<MarginStore>,
    vision: Option<Box<dyn VisionClassifier>>,
    chat: Option<Box<dyn ChatModel>>,
    unmatched_policy: UnmatchedCodePolicy,
}

impl MarketSdk {
    pub fn builder() -> MarketSdkBuilder {
        MarketSdkBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    pub fn catalog(&self) -> queries::CatalogQuery<'_> {
        queries::CatalogQuery::new(&self.conn)
    }

    /// Price queries bound to the margins current at the time of the call.
    pub fn prices(&self) -> queries::PriceQuery<'_> {
        queries::PriceQuery::new(&self.conn, self.margins.current())
    }

    pub fn drop_points(&self) -> queries::DropPointQuery<'_> {
        queries::DropPointQuery::new(&self.conn)
    }

    pub fn transactions(&self) -> queries::TransactionQuery<'_> {
        queries::TransactionQuery::new(&self.conn)
    }

    // -- Margins -----------------------------------------------------------

    pub fn margins(&self) -> &MarginStore {
        &self.margins
    }

    /// Shared handle to the margin store, for readers on other threads.
    pub fn margin_handle(&self) -> Arc<MarginStore> {
        Arc::clone(&self.margins)
    }

    /// Change one margin ratio on behalf of `role`.
    pub fn set_margin(&self, role: Role, stage: MarginStage, value: f64) -> Result<MarginSnapshot> {
        self.margins.set(role, stage, value)
    }

    // -- Valuation ---------------------------------------------------------

    /// Load the catalog into a validated in-memory index.
    pub fn catalog_snapshot(&self) -> Result<Catalog> {
        self.catalog().snapshot()
    }

    /// Value a transaction at a tier under the current margins.
    pub fn transaction_value(&self, transaction: &TransactionRecord, tier: Tier) -> Result<Aggregate> {
        let catalog = self.catalog_snapshot()?;
        Ok(queries::transactions::value_of(
            transaction,
            &catalog,
            &self.margins.current(),
            tier,
        ))
    }

    // -- Services ----------------------------------------------------------

    /// Recognize waste in a photo. Never fails; see [`Scanner::scan`].
    pub fn scan(&self, image: &[u8], mime_type: &str) -> ScanOutcome {
        let catalog = match self.catalog_snapshot() {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("catalog unavailable for scan: {}", e);
                return ScanOutcome::fallback(Notice::error("The price list could not be loaded."));
            }
        };
        let classifier = self.vision.as_ref().map(|v| v.as_ref() as &dyn VisionClassifier);
        Scanner::new(classifier, &catalog, self.unmatched_policy).scan(image, mime_type)
    }

    /// Build the assistant's system context from current data.
    ///
    /// Drop points are omitted if they cannot be loaded.
    pub fn assistant_context(&self) -> Result<String> {
        let catalog = self.catalog_snapshot()?;
        let drop_points: Vec<DropPoint> = self.drop_points().list(None).unwrap_or_else(|e| {
            warn!("drop points unavailable for assistant context: {}", e);
            Vec::new()
        });
        Ok(assistant::build_context(
            &catalog,
            &self.margins.current(),
            &drop_points,
        ))
    }

    /// Ask the assistant a question. Never fails; see [`Assistant::ask`].
    pub fn ask(&self, conversation: &mut Conversation, query: &str) -> Reply {
        let assistant = Assistant::new(self.chat.as_ref().map(|m| m.as_ref() as &dyn ChatModel));
        match self.assistant_context() {
            Ok(context) => assistant.ask(conversation, &context, query),
            Err(e) => {
                warn!("assistant context unavailable: {}", e);
                Reply {
                    text: assistant::FALLBACK_REPLY.to_string(),
                    notice: Some(Notice::warning("The price list could not be loaded.")),
                }
            }
        }
    }

    // -- Metadata and utility methods --------------------------------------

    /// Backend `meta.json` contents.
    pub fn meta(&self) -> Result<serde_json::Value> {
        self.conn.cache.borrow_mut().load_json("meta")
    }

    /// Names of the tables registered so far.
    pub fn views(&self) -> Vec<String> {
        self.conn.views()
    }

    /// Run raw SQL against the registered tables.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Re-check the backend data version and margins.
    ///
    /// Returns `true` if the cached data was stale; the cache is then
    /// cleared and tables reload on next access. A failed margin fetch is
    /// logged and the data check still runs. Offline, nothing can be
    /// fetched again, so the cache is always kept and this returns `false`.
    pub fn refresh(&self) -> Result<bool> {
        if let Err(e) = self.margins.refresh() {
            warn!("could not refresh margins, keeping current values: {}", e);
        }

        let stale = {
            let mut cache = self.conn.cache.borrow_mut();
            if cache.offline {
                return Ok(false);
            }
            cache.forget_remote_version();
            cache.is_stale()?
        };
        if stale {
            self.conn.cache.borrow().clear()?;
            self.conn.reset_views();
            info!("marketplace data was stale; cache cleared and tables reset");
        }
        Ok(stale)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl fmt::Display for MarketSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.conn.cache.borrow();
        write!(
            f,
            "MarketSdk(cache_dir={}, views=[{}], offline={}, margins_version={})",
            cache.cache_dir.display(),
            self.conn.views().join(", "),
            cache.offline,
            self.margins.version()
        )
    }
}
