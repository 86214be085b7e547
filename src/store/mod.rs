//! Data access for the contest store
//!
//! The engine talks to storage through the [`Store`] trait; the SQLite
//! implementation is [`SqliteStore`] on top of [`MatrixDb`]. Multi-row mutations
//! (level advancement, submission review) are single transactions with
//! status-guarded updates, so concurrent callers lose with
//! [`StoreError::Conflict`] instead of corrupting state.

mod db;
mod sqlite;

pub use db::MatrixDb;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Challenge, ChallengeDraft, ChallengeId, ChallengeParticipant, ChallengeStatus,
    MatrixSubmission, Office, ReviewDecision, Reward, RewardDraft, Role, SubmissionStatus, User,
    UserId,
};
use crate::ranking::{ParticipantPoints, Standing};

/// Errors reported by the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested row does not exist
    #[error("not found")]
    NotFound,

    /// A guarded update matched no rows, or a uniqueness rule was violated
    #[error("conflicting concurrent update")]
    Conflict,

    /// A stored value could not be decoded into a domain type
    #[error("malformed row: {0}")]
    Malformed(String),

    /// Anything else the database reported
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Conflict
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Registration payload for a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub longrich_code: String,
    pub office: Office,
    pub role: Role,
}

/// Payload of the atomic level-advancement transaction
#[derive(Debug, Clone)]
pub struct Advancement {
    pub user_id: UserId,
    /// The just-completed challenge at the user's current level
    pub challenge_id: ChallengeId,
    /// The level the user moves to (current level + 1)
    pub next_level: u32,
    /// Recorded as the terms acceptance instant
    pub accepted_at: DateTime<Utc>,
}

/// A pending submission joined with its author, for the review queue
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub submission: MatrixSubmission,
    pub full_name: String,
    pub office: Office,
}

/// What a review transaction did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub status: SubmissionStatus,
    /// Points credited to the participant (0 on rejection)
    pub points_awarded: u32,
    /// Whether the credit pushed the participant over the target
    pub participant_completed: bool,
}

/// The contest data store.
///
/// Read operations return snapshots; callers refetch after mutations
/// instead of patching local copies.
#[async_trait]
pub trait Store: Send + Sync {
    // --- users ---

    async fn create_user(&self, new: NewUser, now: DateTime<Utc>) -> Result<User, StoreError>;

    async fn get_user(&self, user_id: &str) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Unconditional level/terms update (admin repair path); level
    /// advancement goes through [`Store::advance_user`] instead.
    async fn update_user_level(
        &self,
        user_id: &str,
        current_level: u32,
        accepted_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    // --- challenges ---

    async fn create_challenge(
        &self,
        draft: &ChallengeDraft,
        now: DateTime<Utc>,
    ) -> Result<Challenge, StoreError>;

    async fn update_challenge(
        &self,
        challenge_id: &str,
        draft: &ChallengeDraft,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn get_challenge(&self, challenge_id: &str) -> Result<Challenge, StoreError>;

    /// All challenges, ordered by ascending level
    async fn list_challenges(&self) -> Result<Vec<Challenge>, StoreError>;

    async fn active_challenge_for_level(&self, level: u32)
    -> Result<Option<Challenge>, StoreError>;

    /// Guarded status transition; `Conflict` when the challenge is not in
    /// `from` anymore (or does not exist). Activation can also conflict
    /// with the one-active-challenge-per-level index.
    async fn update_challenge_status(
        &self,
        challenge_id: &str,
        from: ChallengeStatus,
        to: ChallengeStatus,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    // --- rewards ---

    /// Rewards of a challenge, ordered by ascending point threshold
    async fn list_rewards(&self, challenge_id: &str) -> Result<Vec<Reward>, StoreError>;

    /// Replace a challenge's reward list wholesale (admin edit semantics)
    async fn replace_rewards(
        &self,
        challenge_id: &str,
        rewards: &[RewardDraft],
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    // --- participants ---

    async fn get_participant(
        &self,
        user_id: &str,
        challenge_id: &str,
    ) -> Result<Option<ChallengeParticipant>, StoreError>;

    /// Fetch the participant row, creating it (implicit engagement) if the
    /// user has not engaged this challenge yet
    async fn ensure_participant(
        &self,
        user_id: &str,
        challenge_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ChallengeParticipant, StoreError>;

    // --- level advancement ---

    /// Atomically complete the current challenge and move the user to the
    /// next level. Both updates are status-guarded; either guard matching
    /// zero rows aborts the whole transaction with `Conflict`, so a racing
    /// second advancement cannot half-apply.
    async fn advance_user(&self, advancement: &Advancement) -> Result<(), StoreError>;

    // --- submissions ---

    async fn create_submission(&self, submission: &MatrixSubmission) -> Result<(), StoreError>;

    /// One user's submissions, newest first
    async fn submission_history(&self, user_id: &str)
    -> Result<Vec<MatrixSubmission>, StoreError>;

    /// The admin review queue, newest first
    async fn pending_submissions(&self) -> Result<Vec<PendingSubmission>, StoreError>;

    /// Apply an admin verdict to a pending submission. On validation the
    /// submission's stored total is credited to the participant and, when
    /// the target is reached, the participant is marked completed - all in
    /// one transaction. `Conflict` when the submission is not pending.
    async fn finalize_submission(
        &self,
        submission_id: &str,
        decision: ReviewDecision,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome, StoreError>;

    // --- rankings ---

    /// Points and office of every participant row, for office aggregation
    async fn aggregate_participant_points(&self) -> Result<Vec<ParticipantPoints>, StoreError>;

    /// Name, office and points of every participant row, for the
    /// individual leaderboard
    async fn participant_standings(&self) -> Result<Vec<Standing>, StoreError>;
}
