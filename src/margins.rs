//! Shared margin configuration.
//!
//! [`MarginStore`] owns the single active [`MarginConfig`]. Reads return a
//! copy of the whole config and writes swap in a new value under a write
//! lock, so readers never observe a half-applied update. Writers are
//! serialized across the remote write and the local swap, so the backend
//! record and the local copy end on the same last write.

use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config;
use crate::error::{MarketError, Result};
use crate::models::margin::check_ratio;
use crate::models::{MarginConfig, MarginStage, Role};

// ---------------------------------------------------------------------------
// MarginSource: remote read/write port
// ---------------------------------------------------------------------------

/// Backing store for the margin configuration.
pub trait MarginSource: Send + Sync {
    /// Fetch the current ratios.
    fn load(&self) -> Result<MarginConfig>;

    /// Persist one ratio.
    fn store(&self, stage: MarginStage, value: f64) -> Result<()>;
}

/// [`MarginSource`] backed by the marketplace REST API.
///
/// Reads `GET {base}/margins/{id}` and writes `PATCH {base}/margins/{id}`
/// with a single-key JSON body such as `{"tier1to2": 0.2}`.
pub struct HttpMarginSource {
    client: Client,
    url: String,
}

impl HttpMarginSource {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!(
                "{}/margins/{}",
                api_base.trim_end_matches('/'),
                config::MARGIN_CONFIG_ID
            ),
        })
    }
}

impl MarginSource for HttpMarginSource {
    fn load(&self) -> Result<MarginConfig> {
        let resp = self.client.get(&self.url).send()?.error_for_status()?;
        Ok(resp.json()?)
    }

    fn store(&self, stage: MarginStage, value: f64) -> Result<()> {
        let mut body = serde_json::Map::new();
        body.insert(stage.key().to_string(), serde_json::Value::from(value));
        self.client
            .patch(&self.url)
            .json(&body)
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MarginStore
// ---------------------------------------------------------------------------

/// A margin config together with the number of writes applied so far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginSnapshot {
    pub config: MarginConfig,
    pub version: u64,
}

pub struct MarginStore {
    current: RwLock<MarginSnapshot>,
    source: Option<Box<dyn MarginSource>>,
    /// Held from the remote write until the local swap.
    write_lock: Mutex<()>,
}

impl MarginStore {
    /// In-memory store seeded with `initial`.
    pub fn new(initial: MarginConfig) -> Self {
        Self {
            current: RwLock::new(MarginSnapshot {
                config: initial,
                version: 0,
            }),
            source: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Store that writes through to `source` before updating locally.
    pub fn with_source(initial: MarginConfig, source: Box<dyn MarginSource>) -> Self {
        Self {
            source: Some(source),
            ..Self::new(initial)
        }
    }

    pub fn current(&self) -> MarginConfig {
        self.snapshot().config
    }

    pub fn snapshot(&self) -> MarginSnapshot {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    /// Replace one ratio on behalf of `role`.
    ///
    /// Rejects roles below the collection-center tier and ratios outside
    /// `[0, 1)`. When a source is attached the remote write happens first;
    /// if it fails the local value is left unchanged.
    pub fn set(&self, role: Role, stage: MarginStage, value: f64) -> Result<MarginSnapshot> {
        if !role.can_edit_margins() {
            warn!(%role, %stage, "rejected margin write from read-only role");
            return Err(MarketError::Unauthorized(format!(
                "role '{}' may not change margins",
                role
            )));
        }
        check_ratio(stage, value)?;

        let _writer = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(source) = &self.source {
            source.store(stage, value)?;
        }

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = MarginSnapshot {
            config: guard.config.with(stage, value),
            version: guard.version + 1,
        };
        *guard = next;
        info!(%role, %stage, value, version = next.version, "margin updated");
        Ok(next)
    }

    /// Pull the current config from the attached source, if any.
    ///
    /// Remote values are taken as-is; out-of-range ratios are logged but
    /// not rejected. Returns `None` when no source is attached.
    pub fn refresh(&self) -> Result<Option<MarginSnapshot>> {
        let Some(source) = &self.source else {
            return Ok(None);
        };
        let _writer = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let loaded = source.load()?;
        if let Err(e) = loaded.validate() {
            warn!("remote margin config out of range: {}", e);
        }

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if guard.config != loaded {
            *guard = MarginSnapshot {
                config: loaded,
                version: guard.version + 1,
            };
        }
        Ok(Some(*guard))
    }
}

impl Default for MarginStore {
    fn default() -> Self {
        Self::new(MarginConfig::default())
    }
}
