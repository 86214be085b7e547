use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

pub type ChallengeId = String;

/// The status of a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    /// Challenge has been created but is not visible to participants
    Draft,
    /// Challenge is running; participants accumulate points against it
    Active,
    /// Challenge is over (ended by an admin or by level advancement)
    Completed,
}

impl ChallengeStatus {
    /// Get the status token used in the store and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeStatus::Draft => "draft",
            ChallengeStatus::Active => "active",
            ChallengeStatus::Completed => "completed",
        }
    }

    /// Parse a status token, returning None for unknown values
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ChallengeStatus::Draft),
            "active" => Some(ChallengeStatus::Active),
            "completed" => Some(ChallengeStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChallengeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A leveled, time-boxed contest instance with a point target.
///
/// Calendar bounds (`start_date`..=`end_date`) are date-only and both
/// inclusive. The submission window is a recurring daily time-of-day
/// interval, optionally restricted to a set of weekdays; an empty
/// `submission_days` set allows every day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub title: String,
    pub description: String,
    /// Contest level this challenge belongs to (1-based)
    pub level: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub submission_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub submission_end: NaiveTime,
    #[serde(with = "weekday_tokens")]
    pub submission_days: Vec<Weekday>,
    /// Point target a participant must reach to complete the challenge
    pub min_points: u32,
    pub status: ChallengeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Challenge {
    /// Whether submissions are allowed on the given weekday
    pub fn allows_day(&self, day: Weekday) -> bool {
        self.submission_days.is_empty() || self.submission_days.contains(&day)
    }
}

/// Fields an admin provides when creating or editing a challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeDraft {
    pub title: String,
    pub description: String,
    pub level: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub submission_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub submission_end: NaiveTime,
    #[serde(with = "weekday_tokens")]
    pub submission_days: Vec<Weekday>,
    pub min_points: u32,
}

/// Get the uppercase weekday token used in the store and on the wire
pub fn weekday_token(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}

/// Parse an uppercase weekday token, returning None for unknown values
pub fn parse_weekday(token: &str) -> Option<Weekday> {
    match token {
        "MONDAY" => Some(Weekday::Mon),
        "TUESDAY" => Some(Weekday::Tue),
        "WEDNESDAY" => Some(Weekday::Wed),
        "THURSDAY" => Some(Weekday::Thu),
        "FRIDAY" => Some(Weekday::Fri),
        "SATURDAY" => Some(Weekday::Sat),
        "SUNDAY" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Serde helpers for the `HH:MM` time-of-day wire format
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(time: &NaiveTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(de)?;
        // Accept HH:MM and HH:MM:SS
        NaiveTime::parse_from_str(&s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
            .map_err(|e| D::Error::custom(format!("invalid time of day {s:?}: {e}")))
    }
}

/// Serde helpers for the uppercase weekday token list
mod weekday_tokens {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de::Error, ser::SerializeSeq};

    pub fn serialize<S: Serializer>(days: &[Weekday], ser: S) -> Result<S::Ok, S::Error> {
        let mut seq = ser.serialize_seq(Some(days.len()))?;
        for day in days {
            seq.serialize_element(super::weekday_token(*day))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Weekday>, D::Error> {
        let tokens = Vec::<String>::deserialize(de)?;
        tokens
            .iter()
            .map(|t| {
                super::parse_weekday(t).ok_or_else(|| D::Error::custom(format!("unknown weekday {t:?}")))
            })
            .collect()
    }
}
