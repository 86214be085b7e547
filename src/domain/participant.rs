use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChallengeId, UserId};

pub type ParticipantId = String;

/// The status of a participant's progress record within one challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    /// Still accumulating points
    Active,
    /// Point target reached; precondition for level advancement
    Completed,
    /// Challenge ended before the target was reached
    Failed,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Active => "active",
            ParticipantStatus::Completed => "completed",
            ParticipantStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ParticipantStatus::Active),
            "completed" => Some(ParticipantStatus::Completed),
            "failed" => Some(ParticipantStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-user, per-challenge progress record.
///
/// Created implicitly when a user first engages a challenge (their first
/// submission). `current_points` never decreases; it is credited only by
/// submission review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeParticipant {
    pub id: ParticipantId,
    pub user_id: UserId,
    pub challenge_id: ChallengeId,
    pub current_points: u32,
    pub status: ParticipantStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChallengeParticipant {
    pub fn is_completed(&self) -> bool {
        self.status == ParticipantStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ParticipantStatus::Active,
            ParticipantStatus::Completed,
            ParticipantStatus::Failed,
        ] {
            assert_eq!(ParticipantStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ParticipantStatus::parse("done"), None);
    }
}
