use parking_lot::Mutex;
use serde::Serialize;
use std::time::Duration;

#[derive(Default)]
struct LatencySamples {
    call_count: u64,
    durations: Vec<Duration>,
}

impl LatencySamples {
    fn average_ms(&self) -> f64 {
        if self.durations.is_empty() {
            return 0.0;
        }
        let total: f64 = self.durations.iter().map(|d| d.as_secs_f64() * 1000.0).sum();
        total / self.durations.len() as f64
    }
}

/// Point-in-time view of a [`LatencyRecorder`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencySnapshot {
    pub call_count: u64,
    pub samples: usize,
    pub average_ms: f64,
}

/// Running average of remote call durations.
///
/// The call counter and the samples live behind one lock, so `reset` never
/// interleaves with a `record` or an `average`.
#[derive(Default)]
pub struct LatencyRecorder {
    state: Mutex<LatencySamples>,
}

impl LatencyRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request that is about to be issued and return its number.
    pub fn begin_request(&self) -> u64 {
        let mut state = self.state.lock();
        state.call_count += 1;
        state.call_count
    }

    /// Append a sample. A missing duration is ignored rather than counted as zero.
    pub fn record(&self, duration: Option<Duration>) {
        if let Some(duration) = duration {
            self.state.lock().durations.push(duration);
        }
    }

    /// Mean of the recorded samples in milliseconds, `0.0` when there are none.
    pub fn average(&self) -> f64 {
        self.state.lock().average_ms()
    }

    pub fn call_count(&self) -> u64 {
        self.state.lock().call_count
    }

    pub fn sample_count(&self) -> usize {
        self.state.lock().durations.len()
    }

    pub fn snapshot(&self) -> LatencySnapshot {
        let state = self.state.lock();
        LatencySnapshot {
            call_count: state.call_count,
            samples: state.durations.len(),
            average_ms: state.average_ms(),
        }
    }

    /// Clear the counter and all samples, starting a new measurement window.
    /// A call still in flight lands its sample in the new window without being counted there.
    pub fn reset(&self) {
        *self.state.lock() = LatencySamples::default();
    }
}
