//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use loginpage_core::{
    ApiClient, Clock, LoginFormController, MemoryTokenStore, RecordingNavigator, TokenStore,
};
use tokio::sync::oneshot;

/// Clock that only moves when the test calls `advance`.
///
/// Tokio's paused time cannot be used together with a real HTTP server: the
/// runtime would auto-advance past the client's timeout while waiting on I/O.
#[derive(Default)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    sleepers: Vec<(Duration, oneshot::Sender<()>)>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Move time forward and wake every sleeper whose deadline has passed.
    pub async fn advance(&self, by: Duration) {
        let due = {
            let mut state = self.state.lock().unwrap();
            state.now += by;
            let now = state.now;
            let (due, pending): (Vec<_>, Vec<_>) =
                state.sleepers.drain(..).partition(|(deadline, _)| *deadline <= now);
            state.sleepers = pending;
            due
        };
        for (_, tx) in due {
            let _ = tx.send(());
        }
        settle().await;
    }

    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .sleepers
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .count()
    }
}

impl Clock for ManualClock {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.lock().unwrap();
        let deadline = state.now + duration;
        state.sleepers.push((deadline, tx));
        async move {
            if rx.await.is_err() {
                futures::future::pending::<()>().await;
            }
        }
        .boxed()
    }
}

/// Give spawned tasks a chance to run.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub store: Arc<dyn TokenStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub controller: LoginFormController,
}

pub fn harness(base_url: &str) -> Harness {
    harness_with_store(base_url, Arc::new(MemoryTokenStore::new()))
}

pub fn harness_with_store(base_url: &str, store: Arc<dyn TokenStore>) -> Harness {
    let clock = ManualClock::new();
    let navigator = Arc::new(RecordingNavigator::new());
    let api = ApiClient::new(base_url).expect("client builds");
    let controller =
        LoginFormController::new(Arc::new(api), store.clone(), navigator.clone(), clock.clone());
    Harness {
        clock,
        store,
        navigator,
        controller,
    }
}
