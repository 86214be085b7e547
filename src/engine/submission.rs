//! Submission intake and review
//!
//! Intake gates on the submission window, pre-validates and uploads the
//! screenshot, then records the report against the user's active
//! challenge. Review applies the admin verdict and credits points in one
//! store transaction.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{MatrixScores, MatrixSubmission, ReviewDecision, SubmissionStatus};
use crate::storage::{self, FileStorage, SCREENSHOTS_BUCKET, UploadError};
use crate::store::{PendingSubmission, ReviewOutcome, Store, StoreError};

use super::window::{self, ChallengePhase, WindowStatus};
use super::Clock;

/// An image attached to a submission, already read into memory
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Why a submission was refused
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// No active challenge exists at the user's level
    #[error("no active challenge at your level")]
    NoActiveChallenge,

    /// The challenge has not started or is already over
    #[error("the challenge is not running")]
    ChallengeNotRunning,

    /// Outside the daily submission window
    #[error("the submission window is closed")]
    WindowClosed {
        opens_at: chrono::NaiveDateTime,
    },

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// File a matrix report for the user's active challenge.
///
/// The participant record is created on first engagement; the submission
/// lands as `pending` with the derived `mx_global` total stored alongside
/// the branch scores.
pub async fn submit_matrix(
    store: &dyn Store,
    storage: &dyn FileStorage,
    user_id: &str,
    scores: MatrixScores,
    screenshot: &Screenshot,
    clock: Clock,
) -> Result<MatrixSubmission, SubmitError> {
    let user = store.get_user(user_id).await?;
    let challenge = store
        .active_challenge_for_level(user.current_level)
        .await?
        .ok_or(SubmitError::NoActiveChallenge)?;

    match window::evaluate(&challenge, clock.wall) {
        ChallengePhase::Active(WindowStatus::Open { .. }) => {}
        ChallengePhase::Active(WindowStatus::Closed { opens_at }) => {
            return Err(SubmitError::WindowClosed { opens_at });
        }
        ChallengePhase::NotStarted { .. } | ChallengePhase::Ended => {
            return Err(SubmitError::ChallengeNotRunning);
        }
    }

    storage::validate_screenshot(screenshot.bytes.len(), &screenshot.content_type)?;
    let ext = storage::extension_for(&screenshot.content_type)
        .ok_or_else(|| UploadError::UnsupportedType(screenshot.content_type.clone()))?;
    let path = format!("{}/{}.{}", user.id, clock.instant.timestamp_millis(), ext);
    let screenshot_url = storage
        .upload(
            SCREENSHOTS_BUCKET,
            &path,
            &screenshot.bytes,
            &screenshot.content_type,
        )
        .await?;

    store
        .ensure_participant(&user.id, &challenge.id, clock.instant)
        .await?;

    let submission = MatrixSubmission {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        challenge_id: challenge.id.clone(),
        scores,
        mx_global: scores.global(),
        screenshot_url,
        submitted_at: clock.instant,
        status: SubmissionStatus::Pending,
        created_at: clock.instant,
    };
    store.create_submission(&submission).await?;

    tracing::info!(
        "submission {} filed by {} for challenge {} (total {})",
        submission.id,
        user.id,
        challenge.id,
        submission.mx_global
    );
    Ok(submission)
}

/// The admin review queue, newest first
pub async fn pending_submissions(
    store: &dyn Store,
) -> Result<Vec<PendingSubmission>, StoreError> {
    store.pending_submissions().await
}

/// Apply an admin verdict to a pending submission
pub async fn review_submission(
    store: &dyn Store,
    submission_id: &str,
    decision: ReviewDecision,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome, StoreError> {
    let outcome = store
        .finalize_submission(submission_id, decision, now)
        .await?;
    tracing::info!(
        "submission {} {} ({} points credited)",
        submission_id,
        outcome.status,
        outcome.points_awarded
    );
    Ok(outcome)
}
