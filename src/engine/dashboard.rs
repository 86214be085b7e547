//! Participant dashboard state
//!
//! One load fetches everything the dashboard shows: the user's profile,
//! the active challenge at their level, its rewards and their progress
//! record, and - once that record is completed - the next level's active
//! challenge. State is refetched after every mutation rather than patched.

use chrono::NaiveDateTime;

use crate::domain::{Challenge, ChallengeParticipant, Reward, User};
use crate::store::{Store, StoreError};

use super::window::{self, ChallengePhase};

/// Everything a participant dashboard renders, loaded in one pass
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub user: User,
    /// Active challenge at the user's current level, if any
    pub challenge: Option<Challenge>,
    /// The user's progress record for that challenge, if engaged
    pub participation: Option<ChallengeParticipant>,
    /// Rewards of the active challenge, ascending by threshold
    pub rewards: Vec<Reward>,
    /// Active challenge at the next level, fetched once the current one
    /// is completed
    pub next_challenge: Option<Challenge>,
    /// Phase of the active challenge at load time
    pub phase: Option<ChallengePhase>,
}

impl Dashboard {
    /// Load the dashboard for `user_id` as of `now` (local wall-clock)
    pub async fn load(
        store: &dyn Store,
        user_id: &str,
        now: NaiveDateTime,
    ) -> Result<Self, StoreError> {
        let user = store.get_user(user_id).await?;
        let challenge = store.active_challenge_for_level(user.current_level).await?;

        let mut dashboard = Dashboard {
            user,
            challenge,
            participation: None,
            rewards: Vec::new(),
            next_challenge: None,
            phase: None,
        };

        if let Some(challenge) = &dashboard.challenge {
            dashboard.rewards = store.list_rewards(&challenge.id).await?;
            dashboard.participation = store
                .get_participant(&dashboard.user.id, &challenge.id)
                .await?;
            dashboard.phase = Some(window::evaluate(challenge, now));

            // The level-up button appears once a next-level challenge runs;
            // its absence is not an error
            if dashboard
                .participation
                .as_ref()
                .is_some_and(|p| p.is_completed())
            {
                dashboard.next_challenge =
                    store.active_challenge_for_level(challenge.level + 1).await?;
            }
        }

        Ok(dashboard)
    }

    /// Re-evaluate the phase against a newer wall-clock instant
    pub fn refresh_phase(&mut self, now: NaiveDateTime) {
        self.phase = self
            .challenge
            .as_ref()
            .map(|challenge| window::evaluate(challenge, now));
    }

    /// Whether the "start next level" action is offered
    pub fn show_next_challenge_button(&self) -> bool {
        self.next_challenge.is_some()
            && self
                .participation
                .as_ref()
                .is_some_and(|p| p.is_completed())
    }

    /// Whether filing a new submission is currently possible
    pub fn submit_enabled(&self) -> bool {
        !self.show_next_challenge_button()
            && self.phase.as_ref().is_some_and(|phase| phase.is_open())
    }

    /// Points accumulated on the active challenge
    pub fn current_points(&self) -> u32 {
        self.participation.as_ref().map_or(0, |p| p.current_points)
    }

    /// Progress toward the point target, clamped to 0.0..=1.0
    pub fn progress(&self) -> f32 {
        let Some(challenge) = &self.challenge else {
            return 0.0;
        };
        if challenge.min_points == 0 {
            return 1.0;
        }
        (self.current_points() as f32 / challenge.min_points as f32).min(1.0)
    }

    /// Rewards already unlocked by the accumulated points
    pub fn unlocked_rewards(&self) -> Vec<&Reward> {
        let points = self.current_points();
        self.rewards
            .iter()
            .filter(|r| r.unlocked_by(points))
            .collect()
    }
}
