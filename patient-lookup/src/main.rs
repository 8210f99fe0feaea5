mod config;
mod roster;

use config::{Config, DEFAULT_CONFIG_FILE};
use log::info;
use patient_search_client::cache::CacheConfig;
use patient_search_client::{ClientConfig, Patient, PatientClient};
use roster::RosterSearch;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = Config::load(&config_path)?;

    TermLogger::init(
        config.level_filter().map_err(|e| e.to_string())?,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let client_config = ClientConfig {
        cache: CacheConfig::new(chrono::Duration::from_std(config.cache_ttl())?),
        log_requests: *config.log_requests(),
    };
    let search = RosterSearch::new(config.roster().clone(), config.simulated_latency());
    let client = PatientClient::with_config(search, client_config);

    info!(
        "Initialized PatientClient with caching (TTL: {}s, roster: {} patients)",
        config.cache_ttl_secs(),
        config.roster().len()
    );

    run_pass(&client, &config, "first").await;
    run_pass(&client, &config, "second").await;

    info!("sleep {} seconds till cache invalidated", config.cache_ttl_secs());
    tokio::time::sleep(config.cache_ttl()).await;

    let patients = run_pass(&client, &config, "third").await;
    println!("{}", serde_json::to_string_pretty(&patients)?);

    Ok(())
}

async fn run_pass(client: &PatientClient, config: &Config, label: &str) -> Vec<Patient> {
    let patients = client.lookup_many(config.names_file().as_path()).await;
    let latency = client.latency_snapshot();
    info!(
        "average time cost for {} loop: {} millis ({} remote calls, {} patients)",
        label,
        latency.average_ms,
        latency.call_count,
        patients.len()
    );
    client.reset_latency();
    patients
}
