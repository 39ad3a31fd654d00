//! Version-aware download and local file cache for marketplace data.
//!
//! Catalog, drop-point and transaction snapshots are fetched from the REST
//! backend as JSON and kept on disk. `meta.json` carries a data version; when
//! it changes the cached files are considered stale and fetched again.
//! In offline mode only files already on disk are used.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config;
use crate::error::{MarketError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Downloads and caches marketplace JSON files from the backend.
pub struct CacheManager {
    /// Directory where cached files are stored.
    pub cache_dir: PathBuf,
    /// If true, never contact the backend.
    pub offline: bool,
    api_base: String,
    timeout: Duration,
    client: Option<Client>,
    remote_ver: Option<String>,
}

impl CacheManager {
    /// Create a cache manager, creating the cache directory if needed.
    ///
    /// `cache_dir` defaults to [`config::default_cache_dir`].
    pub fn new(
        cache_dir: Option<PathBuf>,
        api_base: &str,
        offline: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            cache_dir: dir,
            offline,
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
            client: None,
            remote_ver: None,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Lazy HTTP client, created on first use.
    pub fn client(&mut self) -> Result<&Client> {
        if self.client.is_none() {
            let client = Client::builder()
                .timeout(self.timeout)
                .redirect(reqwest::redirect::Policy::limited(10))
                .build()?;
            self.client = Some(client);
        }
        self.client
            .as_ref()
            .ok_or_else(|| MarketError::InvalidArgument("HTTP client unavailable".into()))
    }

    fn local_version(&self) -> Option<String> {
        fs::read_to_string(self.cache_dir.join("version.txt"))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn save_version(&self, version: &str) {
        if let Err(e) = fs::write(self.cache_dir.join("version.txt"), version) {
            warn!("could not record cache version: {}", e);
        }
    }

    /// Fetch the data version from the backend's `meta.json`.
    ///
    /// Returns `None` when offline or when the backend is unreachable. The
    /// answer is memoized for the life of the manager.
    pub fn remote_version(&mut self) -> Result<Option<String>> {
        if self.remote_ver.is_some() {
            return Ok(self.remote_ver.clone());
        }
        if self.offline {
            return Ok(None);
        }
        let url = format!("{}/{}", self.api_base, config::META_FILE);
        let client = self.client()?.clone();
        match client.get(&url).send() {
            Ok(resp) => {
                let data: Value = resp.error_for_status()?.json()?;
                let version = data
                    .get("version")
                    .or_else(|| data.get("data").and_then(|d| d.get("version")))
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                self.remote_ver = version.clone();
                Ok(version)
            }
            Err(e) => {
                warn!("failed to fetch data version from {}: {}", url, e);
                Ok(None)
            }
        }
    }

    /// True if nothing is cached yet or the backend reports a newer version.
    /// An unreachable backend counts as fresh.
    pub fn is_stale(&mut self) -> Result<bool> {
        match self.local_version() {
            None => Ok(true),
            Some(local) => match self.remote_version()? {
                None => Ok(false),
                Some(remote) => Ok(local != remote),
            },
        }
    }

    /// Forget the memoized remote version so the next check asks again.
    pub fn forget_remote_version(&mut self) {
        self.remote_ver = None;
    }

    /// Download one file to `dest` through a temp file so a failed transfer
    /// never leaves a truncated copy behind.
    fn download_file(&mut self, filename: &str, dest: &Path) -> Result<()> {
        let url = format!("{}/{}", self.api_base, filename);
        info!("downloading {}", url);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_dest = dest.with_extension("part");

        let client = self.client()?.clone();
        let result = (|| -> Result<()> {
            let bytes = client.get(&url).send()?.error_for_status()?.bytes()?;
            fs::write(&tmp_dest, &bytes)?;
            fs::rename(&tmp_dest, dest)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_dest);
        }
        result
    }

    /// Ensure a JSON file is cached locally, downloading it if missing or stale.
    ///
    /// `name` is a logical name from [`config::json_files`] such as
    /// `"catalog"`. Returns the local path.
    pub fn ensure_json(&mut self, name: &str) -> Result<PathBuf> {
        let files = config::json_files();
        let filename = files
            .get(name)
            .ok_or_else(|| MarketError::NotFound(format!("Unknown data file: {}", name)))?;
        let local_path = self.cache_dir.join(filename);

        if local_path.exists() && (self.offline || !self.is_stale()?) {
            return Ok(local_path);
        }
        if self.offline {
            return Err(MarketError::NotFound(format!(
                "{} is not cached and offline mode is enabled",
                filename
            )));
        }

        self.download_file(filename, &local_path)?;
        if let Ok(Some(version)) = self.remote_version() {
            self.save_version(&version);
        }
        Ok(local_path)
    }

    /// Load and parse a cached JSON file. Gzip-compressed content is
    /// detected by its magic bytes and inflated transparently.
    ///
    /// A file that fails to parse is deleted so the next call fetches it again.
    pub fn load_json(&mut self, name: &str) -> Result<Value> {
        let path = self.ensure_json(name)?;
        let raw = fs::read(&path)?;

        let parsed = if raw.starts_with(&GZIP_MAGIC) {
            let mut contents = String::new();
            GzDecoder::new(raw.as_slice()).read_to_string(&mut contents)?;
            serde_json::from_str(&contents)
        } else {
            serde_json::from_slice(&raw)
        };

        parsed.map_err(|e| {
            warn!("corrupt cache file {}: {} -- removing", path.display(), e);
            let _ = fs::remove_file(&path);
            MarketError::NotFound(format!(
                "Cache file '{}' was corrupt and has been removed. Retry to re-download. \
                 Original error: {}",
                path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown"),
                e
            ))
        })
    }

    /// Load a cached file holding a list of records.
    ///
    /// Accepts either a bare JSON array or an object with a `data` array.
    pub fn load_records<T: DeserializeOwned>(&mut self, name: &str) -> Result<Vec<T>> {
        let value = self.load_json(name)?;
        let rows = match value {
            Value::Array(rows) => rows,
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(rows)) => rows,
                _ => {
                    debug!("{} has no data array", name);
                    Vec::new()
                }
            },
            _ => Vec::new(),
        };
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(MarketError::from))
            .collect()
    }

    /// Remove all cached files and recreate the cache directory.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Drop the HTTP client, if open.
    pub fn close(&mut self) {
        self.client = None;
    }
}
