use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChallengeId, UserId};

pub type SubmissionId = String;

/// The review status of a matrix submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Waiting for admin review
    Pending,
    /// Accepted; points were credited to the participant
    Validated,
    /// Refused; no points credited
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Validated => "validated",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SubmissionStatus::Pending),
            "validated" => Some(SubmissionStatus::Validated),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The admin's verdict on a pending submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Validate,
    Reject,
}

impl ReviewDecision {
    /// Status a pending submission transitions to under this decision
    pub fn resulting_status(&self) -> SubmissionStatus {
        match self {
            ReviewDecision::Validate => SubmissionStatus::Validated,
            ReviewDecision::Reject => SubmissionStatus::Rejected,
        }
    }
}

/// The three branch scores of one matrix report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixScores {
    /// Strong branch
    pub mxf: u32,
    /// First payment leg
    pub mxm: u32,
    /// Last payment leg
    pub mx: u32,
}

impl MatrixScores {
    /// Derived global total, the value credited on validation
    pub fn global(&self) -> u32 {
        self.mxf + self.mxm + self.mx
    }
}

/// A point-in-time performance report filed by a participant.
///
/// Immutable once created except for the status transition performed by
/// admin review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixSubmission {
    pub id: SubmissionId,
    pub user_id: UserId,
    pub challenge_id: ChallengeId,
    #[serde(flatten)]
    pub scores: MatrixScores,
    /// Stored derived total (`mxf + mxm + mx`)
    pub mx_global: u32,
    pub screenshot_url: String,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_is_sum_of_branches() {
        let scores = MatrixScores {
            mxf: 40,
            mxm: 25,
            mx: 10,
        };
        assert_eq!(scores.global(), 75);
        assert_eq!(MatrixScores::default().global(), 0);
    }

    #[test]
    fn test_decision_resulting_status() {
        assert_eq!(
            ReviewDecision::Validate.resulting_status(),
            SubmissionStatus::Validated
        );
        assert_eq!(
            ReviewDecision::Reject.resulting_status(),
            SubmissionStatus::Rejected
        );
    }

    #[test]
    fn test_scores_flatten_on_the_wire() {
        let submission = MatrixSubmission {
            id: "s1".to_string(),
            user_id: "u1".to_string(),
            challenge_id: "c1".to_string(),
            scores: MatrixScores {
                mxf: 1,
                mxm: 2,
                mx: 3,
            },
            mx_global: 6,
            screenshot_url: "u1/1.png".to_string(),
            submitted_at: Utc::now(),
            status: SubmissionStatus::Pending,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["mxf"], 1);
        assert_eq!(json["mx_global"], 6);
        assert_eq!(json["status"], "pending");
    }
}
