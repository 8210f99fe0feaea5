use async_trait::async_trait;
use patient_search_client::{Error, Patient, PatientSearch};
use std::time::Duration;

/// Search collaborator backed by a fixed list of patients, answering after
/// a configurable delay to stand in for a remote directory.
pub struct RosterSearch {
    patients: Vec<Patient>,
    latency: Duration,
}

impl RosterSearch {
    pub fn new(patients: Vec<Patient>, latency: Duration) -> Self {
        Self { patients, latency }
    }
}

#[async_trait]
impl PatientSearch for RosterSearch {
    async fn search(&self, family_name: &str) -> Result<Vec<Patient>, Error> {
        tokio::time::sleep(self.latency).await;
        Ok(self
            .patients
            .iter()
            .filter(|p| p.family_name().eq_ignore_ascii_case(family_name))
            .cloned()
            .collect())
    }
}
