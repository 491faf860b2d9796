//! Stopping the event loop.
//!
//! A [`StopSignal`] is a latch: once tripped it stays tripped, so a
//! [`StopReceiver`] created afterwards still sees it and the loop never misses
//! a stop request that raced its startup.

use tokio::sync::watch;

pub struct StopSignal {
    tripped: watch::Sender<bool>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tripped, _) = watch::channel(false);
        Self { tripped }
    }

    pub fn receiver(&self) -> StopReceiver {
        StopReceiver(self.tripped.subscribe())
    }

    pub fn is_tripped(&self) -> bool {
        *self.tripped.borrow()
    }

    /// Trip the latch. Later trips are no-ops.
    pub fn trip(&self, cause: &str) {
        if !self.tripped.send_replace(true) {
            tracing::info!(cause, "stop requested, draining in-flight events");
        }
    }

    /// Trip the latch on the first SIGINT or SIGTERM.
    pub async fn trip_on_os_signal(&self) {
        let cause = os_signal().await;
        self.trip(cause);
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// The listening end of a [`StopSignal`].
#[derive(Clone)]
pub struct StopReceiver(watch::Receiver<bool>);

impl StopReceiver {
    /// Resolves once the signal is tripped. Never resolves if the signal was
    /// dropped untripped.
    pub async fn tripped(&mut self) {
        if self.0.wait_for(|tripped| *tripped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(unix)]
async fn os_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => tokio::select! {
            _ = tokio::signal::ctrl_c() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        },
        Err(e) => {
            tracing::warn!("SIGTERM unavailable, stopping on SIGINT only: {e}");
            let _ = tokio::signal::ctrl_c().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn os_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "ctrl-c"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn every_receiver_sees_the_trip() {
        let stop = StopSignal::new();
        let mut early = stop.receiver();
        stop.trip("test");
        let mut late = stop.receiver();

        early.tripped().await;
        late.tripped().await;
        assert!(stop.is_tripped());
    }

    #[tokio::test]
    async fn untripped_receiver_keeps_waiting() {
        let stop = StopSignal::new();
        let mut receiver = stop.receiver();
        let waited = tokio::time::timeout(Duration::from_millis(20), receiver.tripped()).await;
        assert!(waited.is_err());
        assert!(!stop.is_tripped());
    }

    #[tokio::test]
    async fn dropped_signal_never_trips() {
        let stop = StopSignal::new();
        let mut receiver = stop.receiver();
        drop(stop);
        let waited = tokio::time::timeout(Duration::from_millis(20), receiver.tripped()).await;
        assert!(waited.is_err());
    }
}
