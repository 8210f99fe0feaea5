use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use getset::Getters;
use log::LevelFilter;
use patient_search_client::Patient;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "patient-lookup.yaml";
const ENV_PREFIX: &str = "PATIENT_LOOKUP_";

#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
#[get = "pub"]
pub struct Config {
    names_file: PathBuf,
    cache_ttl_secs: u64,
    log_requests: bool,
    log_level: String,
    simulated_latency_ms: u64,
    roster: Vec<Patient>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            names_file: PathBuf::from("names.txt"),
            cache_ttl_secs: 30,
            log_requests: false,
            log_level: "info".to_string(),
            simulated_latency_ms: 150,
            roster: vec![
                Patient::new("John", "Smith").with_id("pat2"),
                Patient::new("Anna", "Smith").with_id("pat7"),
                Patient::new("Maria", "Garcia").with_id("pat11"),
            ],
        }
    }
}

impl Config {
    /// Defaults, overlaid by the YAML file at `path` (if present), overlaid by
    /// `PATIENT_LOOKUP_*` environment variables.
    pub fn load(path: &Path) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
    }

    pub fn level_filter(&self) -> Result<LevelFilter, log::ParseLevelError> {
        LevelFilter::from_str(&self.log_level)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}
