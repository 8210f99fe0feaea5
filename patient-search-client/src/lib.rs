pub mod cache;
pub mod deduplication;
mod error;
mod key;
pub mod latency;
mod patient;
mod search;
pub mod source;
pub mod transport;

#[cfg(test)]
mod tests;

use cache::{CacheConfig, SearchCache, SharedSearchCache};
pub use error::Error;
pub use error::ErrorKind;
use futures::future::join_all;
pub use key::LookupKey;
use latency::LatencyRecorder;
pub use patient::Patient;
pub use search::PatientSearch;
use source::{FileLineSource, LineSource};
use std::path::Path;
use std::sync::Arc;
use transport::InstrumentedTransport;

// Re-export cache and latency types
pub use cache::CacheStats;
pub use latency::LatencySnapshot;

/// Settings for a [`PatientClient`]
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub cache: CacheConfig,
    /// Log every remote request with its time cost and the running average
    pub log_requests: bool,
}

#[derive(Clone)]
pub struct PatientClient {
    cache: SharedSearchCache,
    recorder: Arc<LatencyRecorder>,
    lines: Arc<dyn LineSource>,
}

impl PatientClient {
    /// Create a new PatientClient with a 30 second cache and file-backed batch lookups
    pub fn new(search: impl PatientSearch + 'static) -> Self {
        Self::with_config(search, ClientConfig::default())
    }

    pub fn with_config(search: impl PatientSearch + 'static, config: ClientConfig) -> Self {
        let recorder = Arc::new(LatencyRecorder::new());
        let transport =
            InstrumentedTransport::new(Arc::new(search), recorder.clone(), config.log_requests);

        Self {
            cache: Arc::new(SearchCache::new(config.cache, transport)),
            recorder,
            lines: Arc::new(FileLineSource),
        }
    }

    /// Replace where [`PatientClient::lookup_many`] reads its keys from
    pub fn with_line_source(mut self, lines: impl LineSource + 'static) -> Self {
        self.lines = Arc::new(lines);
        self
    }

    /// Patients with the given family name, sorted by given name
    pub async fn lookup_one<'a>(&self, family_name: impl Into<Option<&'a str>>) -> Vec<Patient> {
        let Ok(key) = LookupKey::parse(family_name.into()) else {
            return vec![];
        };

        let mut patients = self.cache.get_key(&key).await;
        patients.sort_by(Patient::cmp_given_name);
        patients
    }

    /// Patients for every family name listed in `path`, sorted by family then given name
    pub async fn lookup_many<'a>(&self, path: impl Into<Option<&'a Path>>) -> Vec<Patient> {
        let Some(path) = path.into() else {
            return vec![];
        };
        log::info!("Looking up patients from file: {}", path.display());

        let family_names = self.lines.read_lines(path);
        let results = join_all(family_names.iter().map(|name| self.cache.get(name))).await;

        let mut patients: Vec<Patient> = results.into_iter().flatten().collect();
        patients.sort_by(Patient::cmp_full_name);
        patients
    }

    /// Average remote call time in milliseconds since the last reset
    pub fn average_latency(&self) -> f64 {
        self.recorder.average()
    }

    pub fn reset_latency(&self) {
        self.recorder.reset();
    }

    pub fn latency_snapshot(&self) -> LatencySnapshot {
        self.recorder.snapshot()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop expired entries now instead of waiting for them to be reloaded
    pub fn evict_expired_cache(&self) {
        self.cache.evict_expired();
    }
}
