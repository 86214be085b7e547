use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ChallengeId;

pub type RewardId = String;

/// What kind of reward a threshold unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardType {
    Product,
    Badge,
    Bonus,
}

impl RewardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardType::Product => "product",
            RewardType::Badge => "badge",
            RewardType::Bonus => "bonus",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "product" => Some(RewardType::Product),
            "badge" => Some(RewardType::Badge),
            "bonus" => Some(RewardType::Bonus),
            _ => None,
        }
    }
}

impl std::fmt::Display for RewardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reward unlocked at a point threshold within one challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    pub id: RewardId,
    pub challenge_id: ChallengeId,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub kind: RewardType,
    pub min_points: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reward {
    /// Whether a participant with the given points has unlocked this reward
    pub fn unlocked_by(&self, points: u32) -> bool {
        points >= self.min_points
    }
}

/// Fields an admin provides per reward when editing a challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardDraft {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub kind: RewardType,
    pub min_points: u32,
}
