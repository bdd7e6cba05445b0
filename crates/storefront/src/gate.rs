//! Backend connectivity gate.
//!
//! Polls a readiness endpoint on a fixed interval until it first answers
//! with a success status, then stops for good. The shell stays blocked
//! until then. Probe failures are never fatal, there is no backoff, and a
//! probe is always awaited before the next tick so requests never overlap.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument};
use url::Url;

/// Default readiness endpoint.
pub const DEFAULT_HEALTH_URL: &str = "http://localhost:5000/api/health";

/// Default polling interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

/// Observable gate state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Connectivity {
    /// The backend has answered successfully at least once.
    pub connected: bool,
    /// Retries made after the initial probe.
    pub attempts: u32,
}

/// A readiness check.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// `true` when the backend reports ready.
    async fn check(&self) -> bool;
}

/// `GET` a URL and treat any 2xx as ready.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
    url: Url,
}

impl HttpHealthProbe {
    /// Probe `url` with `client`.
    #[must_use]
    pub const fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }

    /// The probed URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check(&self) -> bool {
        match self.client.get(self.url.clone()).send().await {
            Ok(response) => {
                let ready = response.status().is_success();
                debug!(status = %response.status(), ready, "Health probe answered");
                ready
            }
            Err(e) => {
                debug!(error = %e, "Health probe failed");
                false
            }
        }
    }
}

/// Background poller. Dropping the gate cancels polling.
#[derive(Debug)]
pub struct ConnectivityGate {
    state: watch::Receiver<Connectivity>,
    task: JoinHandle<()>,
}

impl ConnectivityGate {
    /// Start polling `probe` every `interval`. The first probe runs
    /// immediately.
    #[must_use]
    pub fn spawn(probe: Arc<dyn HealthProbe>, interval: Duration) -> Self {
        let (tx, state) = watch::channel(Connectivity::default());
        let task = tokio::spawn(poll(probe, interval, tx));
        Self { state, task }
    }

    /// Current state.
    #[must_use]
    pub fn current(&self) -> Connectivity {
        *self.state.borrow()
    }

    /// Whether the backend has been reached.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.borrow().connected
    }

    /// Receive every attempt and the final transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.state.clone()
    }

    /// Wait for the first successful probe.
    ///
    /// Returns early, with `connected == false`, only if the poller has
    /// stopped without ever succeeding.
    pub async fn wait_until_ready(&self) -> Connectivity {
        let mut rx = self.state.clone();
        if rx.wait_for(|c| c.connected).await.is_err() {
            debug!("Connectivity poller stopped before the backend was ready");
        }
        *rx.borrow()
    }
}

impl Drop for ConnectivityGate {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[instrument(skip_all, fields(interval = ?interval))]
async fn poll(probe: Arc<dyn HealthProbe>, interval: Duration, tx: watch::Sender<Connectivity>) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut initial = true;

    loop {
        ticker.tick().await;
        if !initial {
            tx.send_modify(|state| state.attempts = state.attempts.saturating_add(1));
        }
        initial = false;

        if probe.check().await {
            tx.send_modify(|state| state.connected = true);
            info!(attempts = tx.borrow().attempts, "Backend is ready");
            return;
        }
        debug!(attempts = tx.borrow().attempts, "Backend not ready yet");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::Instant;

    use super::*;

    /// Fails until the `succeed_on`-th call (1-based).
    struct ScriptedProbe {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        succeed_on: Option<usize>,
        latency: Duration,
    }

    impl ScriptedProbe {
        fn new(succeed_on: Option<usize>, latency: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                succeed_on,
                latency,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HealthProbe for ScriptedProbe {
        async fn check(&self) -> bool {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.succeed_on.is_some_and(|n| call >= n)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_retries() {
        let probe = Arc::new(ScriptedProbe::new(Some(4), Duration::ZERO));
        let start = Instant::now();
        let gate = ConnectivityGate::spawn(probe.clone(), DEFAULT_INTERVAL);

        let state = gate.wait_until_ready().await;
        assert!(state.connected);
        assert_eq!(state.attempts, 3);
        assert_eq!(start.elapsed(), Duration::from_secs(6));
        assert!(gate.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_first_success() {
        let probe = Arc::new(ScriptedProbe::new(Some(1), Duration::ZERO));
        let gate = ConnectivityGate::spawn(probe.clone(), DEFAULT_INTERVAL);

        let state = gate.wait_until_ready().await;
        assert_eq!(state.attempts, 0);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(probe.calls(), 1);
        assert_eq!(gate.current().attempts, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probes_never_overlap() {
        let probe = Arc::new(ScriptedProbe::new(Some(3), Duration::from_secs(5)));
        let gate = ConnectivityGate::spawn(probe.clone(), DEFAULT_INTERVAL);

        gate.wait_until_ready().await;
        assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_are_observable() {
        let probe = Arc::new(ScriptedProbe::new(None, Duration::ZERO));
        let gate = ConnectivityGate::spawn(probe, DEFAULT_INTERVAL);
        let mut rx = gate.subscribe();

        rx.wait_for(|c| c.attempts >= 2).await.unwrap();
        assert!(!gate.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_polling() {
        let probe = Arc::new(ScriptedProbe::new(None, Duration::ZERO));
        let gate = ConnectivityGate::spawn(probe.clone(), DEFAULT_INTERVAL);

        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(gate);
        let calls = probe.calls();
        assert!(calls >= 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(probe.calls(), calls);
    }

    #[tokio::test]
    async fn test_http_probe_unreachable_is_not_ready() {
        let probe = HttpHealthProbe::new(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9/api/health").unwrap(),
        );
        assert!(!probe.check().await);
    }
}
