//! Cancellation Module
//!
//! A cloneable cancellation signal built on a `watch` channel.

use std::future::Future;

use tokio::sync::watch;

use crate::error::{CacheError, Result};

// == Cancellation Source ==
/// Owner side of a cancellation signal.
#[derive(Debug)]
pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

impl CancellationSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Returns a signal observing this source.
    pub fn token(&self) -> Cancellation {
        Cancellation {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Fires the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

// == Cancellation ==
/// Observer side of a cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    rx: Option<watch::Receiver<bool>>,
}

impl Cancellation {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once the signal fires. Pending forever if the source is
    /// dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };

        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }

    /// Runs `fut` unless the signal fires first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        if self.is_cancelled() {
            return Err(CacheError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(CacheError::Cancelled),
            output = fut => Ok(output),
        }
    }
}
