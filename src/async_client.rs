//! Async wrapper around [`MarketSdk`] for Tokio applications.
//!
//! SDK calls block on DuckDB and HTTP, so every operation runs on Tokio's
//! blocking pool via [`tokio::task::spawn_blocking`].
//!
//! ```no_run
//! # use wastemarket_sdk::models::Tier;
//! # use wastemarket_sdk::{AsyncMarketSdk, MarketSdk};
//! # async fn example() -> wastemarket_sdk::Result<()> {
//! let sdk = AsyncMarketSdk::new(MarketSdk::builder().offline(true)).await?;
//! let prices = sdk.run(|s| s.prices().for_tier(Tier::Consumer, None)).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex};

use crate::assistant::{Conversation, Reply};
use crate::error::{MarketError, Result};
use crate::margins::{MarginSnapshot, MarginStore};
use crate::models::{MarginConfig, MarginStage, Role};
use crate::vision::ScanOutcome;
use crate::{MarketSdk, MarketSdkBuilder};

/// Async handle to a [`MarketSdk`].
///
/// The SDK sits behind a [`Mutex`] because its connection uses `RefCell`
/// internally. The margin store is shared separately so reads never wait
/// on a running query.
pub struct AsyncMarketSdk {
    inner: Arc<Mutex<MarketSdk>>,
    margins: Arc<MarginStore>,
}

fn join_error(e: tokio::task::JoinError) -> MarketError {
    MarketError::InvalidArgument(format!("Task join error: {e}"))
}

impl AsyncMarketSdk {
    /// Build the SDK on the blocking pool.
    pub async fn new(builder: MarketSdkBuilder) -> Result<Self> {
        let sdk = tokio::task::spawn_blocking(move || builder.build())
            .await
            .map_err(join_error)??;
        Ok(Self {
            margins: sdk.margin_handle(),
            inner: Arc::new(Mutex::new(sdk)),
        })
    }

    /// Run a sync SDK operation on the blocking pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&MarketSdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sdk = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let guard = sdk
                .lock()
                .map_err(|_| MarketError::InvalidArgument("SDK lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(join_error)?
    }

    /// Current margins, read without touching the SDK lock.
    pub fn current_margins(&self) -> MarginConfig {
        self.margins.current()
    }

    pub async fn set_margin(&self, role: Role, stage: MarginStage, value: f64) -> Result<MarginSnapshot> {
        let margins = Arc::clone(&self.margins);
        tokio::task::spawn_blocking(move || margins.set(role, stage, value))
            .await
            .map_err(join_error)?
    }

    pub async fn scan(&self, image: Vec<u8>, mime_type: String) -> Result<ScanOutcome> {
        self.run(move |s| Ok(s.scan(&image, &mime_type))).await
    }

    /// Ask the assistant; the updated conversation is handed back.
    pub async fn ask(&self, mut conversation: Conversation, query: String) -> Result<(Conversation, Reply)> {
        self.run(move |s| {
            let reply = s.ask(&mut conversation, &query);
            Ok((conversation, reply))
        })
        .await
    }

    pub async fn refresh(&self) -> Result<bool> {
        self.run(|s| s.refresh()).await
    }
}
