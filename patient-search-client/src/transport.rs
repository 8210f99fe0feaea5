use crate::{latency::LatencyRecorder, Error, LookupKey, Patient, PatientSearch};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Wraps the search collaborator and feeds every real call into a
/// [`LatencyRecorder`].
pub struct InstrumentedTransport {
    search: Arc<dyn PatientSearch>,
    recorder: Arc<LatencyRecorder>,
    log_requests: bool,
}

impl InstrumentedTransport {
    pub fn new(
        search: Arc<dyn PatientSearch>,
        recorder: Arc<LatencyRecorder>,
        log_requests: bool,
    ) -> Self {
        Self {
            search,
            recorder,
            log_requests,
        }
    }

    pub fn recorder(&self) -> &Arc<LatencyRecorder> {
        &self.recorder
    }

    pub async fn call(&self, key: &LookupKey) -> Result<Vec<Patient>, Error> {
        let (request_number, started) = self.on_request(key);
        let result = self.search.search(key.as_str()).await;
        self.on_response(key, request_number, started, &result);
        result
    }

    fn on_request(&self, key: &LookupKey) -> (u64, Instant) {
        let request_number = self.recorder.begin_request();
        if self.log_requests {
            log::info!("request number: {} started: {}", request_number, key);
        }
        (request_number, Instant::now())
    }

    fn on_response(
        &self,
        key: &LookupKey,
        request_number: u64,
        started: Instant,
        result: &Result<Vec<Patient>, Error>,
    ) {
        let elapsed: Option<Duration> = Instant::now().checked_duration_since(started);
        self.recorder.record(elapsed);

        match result {
            Ok(patients) if self.log_requests => {
                log::info!(
                    "request number: {}, ended with {} patients for {}",
                    request_number,
                    patients.len(),
                    key
                );
            }
            Ok(_) => {}
            Err(e) => log::warn!("request number: {} failed: {}", request_number, e),
        }

        if self.log_requests {
            log::info!(
                "request number: {}, time cost: {:?} millis",
                request_number,
                elapsed.map(|d| d.as_millis())
            );
            log::info!(
                "total requests: {}, average time cost: {} millis",
                self.recorder.call_count(),
                self.recorder.average()
            );
        }
    }
}
