//! Directory loaders: cache, retrying fetch, normalization and fallback
//!
//! Lookup order on every [`DirectoryLoader::load`]:
//! fresh cache entry → remote document → bundled fallback dataset.

use crate::cache::CacheCell;
use crate::config::SourceConfig;
use crate::directory::Directory;
use crate::fetch::{FetchError, RetryingFetcher};
use crate::normalizer::{self, ShapeError, DEFAULT_VENDOR_SOURCE};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// How long a fallback directory is served before the remote source is retried
pub const FALLBACK_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Which directory a loader serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKind {
    /// General company directory; core data, an empty fallback is fatal
    Companies,
    /// Security vendor directory; supplementary, an empty fallback is tolerated
    Vendors,
}

impl DirectoryKind {
    fn normalize(self, document: serde_json::Value, source_url: &str) -> Result<Directory, ShapeError> {
        match self {
            DirectoryKind::Companies => normalizer::normalize_company_document(document, source_url),
            DirectoryKind::Vendors => normalizer::normalize_vendor_document(document),
        }
    }

    fn empty_fallback_is_fatal(self) -> bool {
        matches!(self, DirectoryKind::Companies)
    }
}

impl fmt::Display for DirectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryKind::Companies => write!(f, "company"),
            DirectoryKind::Vendors => write!(f, "vendor"),
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("No {0} data available (remote or fallback)")]
    NoDataAvailable(DirectoryKind),
}

/// Where the directory returned by [`DirectoryLoader::load`] came from
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// Fetched from the remote source during this call
    Fresh(Arc<Directory>),
    /// Served from the cache without network I/O
    Cached(Arc<Directory>),
    /// Remote source unreachable; bundled dataset substituted
    Fallback(Arc<Directory>),
}

impl LoadOutcome {
    pub fn directory(&self) -> &Arc<Directory> {
        match self {
            LoadOutcome::Fresh(d) | LoadOutcome::Cached(d) | LoadOutcome::Fallback(d) => d,
        }
    }

    pub fn into_directory(self) -> Arc<Directory> {
        match self {
            LoadOutcome::Fresh(d) | LoadOutcome::Cached(d) | LoadOutcome::Fallback(d) => d,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadOutcome::Fallback(_))
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, LoadOutcome::Cached(_))
    }
}

/// Loads one directory, owning its cache cell.
///
/// The cache lock is held for the whole check → fetch → store sequence, so
/// concurrent callers never race each other to the network.
#[derive(Debug)]
pub struct DirectoryLoader {
    kind: DirectoryKind,
    fetcher: RetryingFetcher,
    fallback_data: serde_json::Value,
    cache: Mutex<CacheCell<Directory>>,
}

impl DirectoryLoader {
    pub fn new(kind: DirectoryKind, config: &SourceConfig) -> Result<Self, FetchError> {
        Ok(Self {
            kind,
            fetcher: RetryingFetcher::new(config)?,
            fallback_data: config.fallback_data.clone(),
            cache: Mutex::new(CacheCell::new(config.cache_ttl)),
        })
    }

    /// Loader for the general company directory.
    pub fn companies(config: &SourceConfig) -> Result<Self, FetchError> {
        Self::new(DirectoryKind::Companies, config)
    }

    /// Loader for the security vendor directory.
    pub fn vendors(config: &SourceConfig) -> Result<Self, FetchError> {
        Self::new(DirectoryKind::Vendors, config)
    }

    pub fn kind(&self) -> DirectoryKind {
        self.kind
    }

    /// Return the directory, from cache when fresh, otherwise from the network
    /// and, failing that, from the fallback dataset.
    ///
    /// A fallback result is cached for at most [`FALLBACK_CACHE_TTL`], so a
    /// transient outage does not pin offline data for a whole cache period.
    ///
    /// Network failures never surface here. The only error is
    /// [`LoadError::NoDataAvailable`] for a company directory whose fallback
    /// dataset is empty.
    pub async fn load(&self) -> Result<LoadOutcome, LoadError> {
        let mut cache = self.cache.lock().await;

        if let Some(directory) = cache.get() {
            info!("Using cached {} data ({} entries)", self.kind, directory.len());
            return Ok(LoadOutcome::Cached(directory));
        }

        let url = self.fetcher.url();
        match self.fetcher.fetch_with_retry(|document| self.kind.normalize(document, url)).await {
            Ok(directory) => {
                info!("Loaded {} {} entries from {}", directory.len(), self.kind, url);
                let directory = Arc::new(directory);
                cache.store(directory.clone());
                Ok(LoadOutcome::Fresh(directory))
            }
            Err(e) => {
                warn!("Failed to load remote {} data: {}", self.kind, e);
                info!("Using {} fallback data", self.kind);
                let directory = Arc::new(self.fallback_directory()?);
                cache.store_for(directory.clone(), FALLBACK_CACHE_TTL);
                Ok(LoadOutcome::Fallback(directory))
            }
        }
    }

    /// The offline dataset as a normalized directory.
    pub fn fallback_directory(&self) -> Result<Directory, LoadError> {
        let directory = match self.kind.normalize(self.fallback_data.clone(), self.fetcher.url()) {
            Ok(directory) => directory,
            Err(e) => {
                warn!("Unusable {} fallback dataset: {}", self.kind, e);
                self.empty_directory()
            }
        };

        if directory.is_empty() && self.kind.empty_fallback_is_fatal() {
            return Err(LoadError::NoDataAvailable(self.kind));
        }

        debug!("{} fallback dataset holds {} entries", self.kind, directory.len());
        Ok(directory)
    }

    fn empty_directory(&self) -> Directory {
        let source = match self.kind {
            DirectoryKind::Companies => self.fetcher.url(),
            DirectoryKind::Vendors => DEFAULT_VENDOR_SOURCE,
        };
        Directory::new(source, chrono::Utc::now().date_naive())
    }

    /// Drop the cached directory; the next [`load`](Self::load) hits the network.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
        debug!("Cleared {} cache", self.kind);
    }

    pub async fn is_cache_valid(&self) -> bool {
        self.cache.lock().await.is_valid()
    }
}
