//! One-second phase re-evaluation
//!
//! While a dashboard is mounted the countdown must track wall-clock time;
//! there is no push signal for phase changes. The ticker re-evaluates the
//! phase every second and publishes it on a watch channel. Dropping the
//! ticker aborts the task - the dismount cancellation semantic.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::Challenge;

use super::window::{self, ChallengePhase};
use super::Clock;

/// Periodic evaluator for one challenge's phase
pub struct WindowTicker {
    rx: watch::Receiver<ChallengePhase>,
    handle: JoinHandle<()>,
}

impl WindowTicker {
    /// Start ticking for `challenge`, re-evaluating every second
    pub fn start(challenge: Challenge) -> Self {
        Self::with_period(challenge, Duration::from_secs(1))
    }

    /// Start with a custom period (tests)
    pub fn with_period(challenge: Challenge, period: Duration) -> Self {
        let (tx, rx) = watch::channel(window::evaluate(&challenge, Clock::system().wall));

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick fires immediately; skip it, the channel
            // already carries the initial evaluation
            interval.tick().await;
            loop {
                interval.tick().await;
                let phase = window::evaluate(&challenge, Clock::system().wall);
                // Receivers gone means the dashboard is no longer listening
                if tx.send(phase).is_err() {
                    break;
                }
            }
        });

        Self { rx, handle }
    }

    /// Subscribe to phase updates
    pub fn subscribe(&self) -> watch::Receiver<ChallengePhase> {
        self.rx.clone()
    }

    /// The most recently published phase
    pub fn current(&self) -> ChallengePhase {
        *self.rx.borrow()
    }
}

impl Drop for WindowTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
