//! Level advancement
//!
//! Moves a user from a completed challenge at level N to the active
//! challenge at level N+1. Preconditions are checked locally before any
//! store call; the two row updates themselves run as one status-guarded
//! store transaction, so a racing advancement from another tab or device
//! loses with a conflict instead of half-applying.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use crate::domain::{Challenge, ChallengeParticipant, ChallengeStatus, User};
use crate::store::{Advancement, Store, StoreError};

/// Why an advancement request was refused
#[derive(Debug, thiserror::Error)]
pub enum AdvanceError {
    /// An advancement is already running in this session; the call is a no-op
    #[error("a level transition is already in progress")]
    AlreadyInFlight,

    /// The next challenge is not exactly one level above the current one
    #[error("next challenge is level {found}, expected level {expected}")]
    LevelMismatch { expected: u32, found: u32 },

    /// One of the two challenges is not active
    #[error("challenge {0} is not active")]
    ChallengeNotActive(String),

    /// The participant has not completed the current challenge
    #[error("current challenge is not completed yet")]
    ParticipantNotCompleted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drives the level-advancement operation, one at a time per session.
///
/// The in-flight flag only serializes callers sharing this instance;
/// cross-session races are handled by the store's guarded transaction.
#[derive(Debug, Default)]
pub struct LevelAdvancer {
    in_flight: AtomicBool,
}

impl LevelAdvancer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an advancement is currently running
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Advance `user` from `current` (completed by `participant`) to `next`.
    ///
    /// On success the caller is expected to reload its dashboard state;
    /// this method does not patch any local copies.
    pub async fn advance(
        &self,
        store: &dyn Store,
        user: &User,
        current: &Challenge,
        participant: &ChallengeParticipant,
        next: &Challenge,
        now: DateTime<Utc>,
    ) -> Result<(), AdvanceError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AdvanceError::AlreadyInFlight);
        }
        let _guard = InFlightReset(&self.in_flight);

        if next.level != current.level + 1 {
            return Err(AdvanceError::LevelMismatch {
                expected: current.level + 1,
                found: next.level,
            });
        }
        if current.status != ChallengeStatus::Active {
            return Err(AdvanceError::ChallengeNotActive(current.id.clone()));
        }
        if next.status != ChallengeStatus::Active {
            return Err(AdvanceError::ChallengeNotActive(next.id.clone()));
        }
        if participant.challenge_id != current.id || !participant.is_completed() {
            return Err(AdvanceError::ParticipantNotCompleted);
        }

        tracing::info!(
            "advancing user {} from level {} to level {}",
            user.id,
            current.level,
            next.level
        );

        store
            .advance_user(&Advancement {
                user_id: user.id.clone(),
                challenge_id: current.id.clone(),
                next_level: next.level,
                accepted_at: now,
            })
            .await?;

        Ok(())
    }
}

/// Releases the in-flight flag on every exit path
struct InFlightReset<'a>(&'a AtomicBool);

impl Drop for InFlightReset<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
