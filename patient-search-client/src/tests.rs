use crate::cache::CacheConfig;
use crate::source::LineSource;
use crate::{ClientConfig, Error, Patient, PatientClient, PatientSearch};
use async_trait::async_trait;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempdir::TempDir;

const NAMES: [&str; 20] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin",
];

#[derive(Default)]
struct FakeDirectory {
    calls: AtomicUsize,
}

#[async_trait]
impl PatientSearch for FakeDirectory {
    async fn search(&self, family_name: &str) -> Result<Vec<Patient>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        match family_name {
            "Smith" => Ok(vec![
                Patient::new("Mary", "Smith"),
                Patient::new("John", "Smith"),
            ]),
            "Offline" => Err(Error::remote(family_name, "connection refused")),
            _ => Ok(vec![]),
        }
    }
}

struct StaticLines(Vec<&'static str>);

impl LineSource for StaticLines {
    fn read_lines(&self, _path: &Path) -> Vec<String> {
        self.0.iter().map(|s| s.to_string()).collect()
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn client() -> (Arc<FakeDirectory>, PatientClient) {
    let directory = Arc::new(FakeDirectory::default());
    (directory.clone(), PatientClient::new(directory))
}

fn names_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("names.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    for name in NAMES {
        writeln!(file, "{}", name).unwrap();
    }
    path
}

#[tokio::test]
async fn test_lookup_one_sorts_by_given_name() {
    let (_, client) = client();

    let patients = client.lookup_one("Smith").await;

    let given: Vec<_> = patients.iter().map(|p| p.given_name().as_str()).collect();
    assert_eq!(given, vec!["John", "Mary"]);
    assert!(client.average_latency() > 0.0);
}

#[tokio::test]
async fn test_lookup_one_blank_or_missing_key() {
    let (directory, client) = client();

    assert!(client.lookup_one(None).await.is_empty());
    assert!(client.lookup_one("").await.is_empty());
    assert!(client.lookup_one(" \t ").await.is_empty());

    assert_eq!(client.average_latency(), 0.0);
    assert_eq!(client.latency_snapshot().call_count, 0);
    assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_lookup_one_failure_degrades_to_empty() {
    let (directory, client) = client();

    assert!(client.lookup_one("Offline").await.is_empty());
    assert!(client.lookup_one("Offline").await.is_empty());

    assert_eq!(directory.calls.load(Ordering::SeqCst), 2);
    assert_eq!(client.cache_stats().total_entries, 0);
}

#[tokio::test]
async fn test_lookup_many_from_file() {
    init_logging();
    let dir = TempDir::new("patients").unwrap();
    let path = names_file(&dir);
    let (directory, client) = client();

    let first = client.lookup_many(path.as_path()).await;

    assert_eq!(first.len(), 2);
    assert_eq!(first[0].given_name(), "John");
    assert_eq!(first[1].given_name(), "Mary");
    assert_eq!(directory.calls.load(Ordering::SeqCst), 20);
    assert_eq!(client.latency_snapshot().samples, 20);

    client.reset_latency();
    let second = client.lookup_many(path.as_path()).await;

    assert_eq!(second, first);
    assert_eq!(directory.calls.load(Ordering::SeqCst), 20);
    assert_eq!(client.average_latency(), 0.0);
    assert_eq!(client.latency_snapshot().call_count, 0);
}

#[tokio::test]
async fn test_lookup_many_unreadable_source() {
    let dir = TempDir::new("patients").unwrap();
    let (directory, client) = client();

    assert!(client.lookup_many(dir.path().join("names1.txt").as_path()).await.is_empty());
    assert!(client.lookup_many(None).await.is_empty());

    assert_eq!(client.average_latency(), 0.0);
    assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_lookup_many_sorts_by_family_then_given_name() {
    struct TwoFamilies;

    #[async_trait]
    impl PatientSearch for TwoFamilies {
        async fn search(&self, family_name: &str) -> Result<Vec<Patient>, Error> {
            Ok(vec![
                Patient::new("Zoe", family_name),
                Patient::new("Adam", family_name),
            ])
        }
    }

    let client = PatientClient::new(TwoFamilies).with_line_source(StaticLines(vec![
        "Smith", "  ", "Brown",
    ]));

    let patients = client.lookup_many(Path::new("ignored")).await;

    let names: Vec<_> = patients
        .iter()
        .map(|p| format!("{} {}", p.given_name(), p.family_name()))
        .collect();
    assert_eq!(names, vec!["Adam Brown", "Zoe Brown", "Adam Smith", "Zoe Smith"]);
}

#[tokio::test]
async fn test_duplicate_keys_in_batch_share_one_call() {
    let directory = Arc::new(FakeDirectory::default());
    let client = PatientClient::new(directory.clone())
        .with_line_source(StaticLines(vec!["Smith", "Smith", " Smith"]));

    let patients = client.lookup_many(Path::new("ignored")).await;

    assert_eq!(patients.len(), 6);
    assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_lookup_after_ttl_reloads() {
    init_logging();
    let directory = Arc::new(FakeDirectory::default());
    let config = ClientConfig {
        cache: CacheConfig::new(chrono::Duration::milliseconds(100)),
        log_requests: true,
    };
    let client = PatientClient::with_config(directory.clone(), config);

    client.lookup_one("Smith").await;
    client.lookup_one("Smith").await;
    assert_eq!(directory.calls.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(150)).await;
    client.reset_latency();
    let patients = client.lookup_one("Smith").await;

    assert_eq!(patients.len(), 2);
    assert_eq!(directory.calls.load(Ordering::SeqCst), 2);
    assert_eq!(client.latency_snapshot().samples, 1);
}

#[tokio::test]
async fn test_concurrent_clients_calls_single_flight() {
    let (directory, client) = client();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.lookup_one("Smith").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().len(), 2);
    }
    assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
}
