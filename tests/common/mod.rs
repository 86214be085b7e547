//! Shared test fixtures for the contest store

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};

use challenge_matrix::domain::{
    Challenge, ChallengeDraft, ChallengeStatus, Office, Role, User,
};
use challenge_matrix::store::{NewUser, SqliteStore, Store};

/// Open a fresh in-memory store
pub fn open_store() -> SqliteStore {
    SqliteStore::open_in_memory().expect("Failed to open in-memory store")
}

/// Create a regular participant
pub async fn create_user(store: &SqliteStore, name: &str, office: Office) -> User {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    store
        .create_user(
            NewUser {
                full_name: name.to_string(),
                email,
                longrich_code: "LR123456".to_string(),
                office,
                role: Role::User,
            },
            Utc::now(),
        )
        .await
        .expect("Failed to create user")
}

/// A draft challenge whose window is open all day, every day, so tests
/// that are not about window arithmetic stay time-independent
pub fn challenge_draft(level: u32) -> ChallengeDraft {
    ChallengeDraft {
        title: format!("Level {level}"),
        description: "Reach the point target".to_string(),
        level,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
        submission_start: NaiveTime::MIN,
        submission_end: NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
        submission_days: Vec::new(),
        min_points: 100,
    }
}

/// Create a challenge and activate it
pub async fn create_active_challenge(store: &SqliteStore, level: u32) -> Challenge {
    let challenge = store
        .create_challenge(&challenge_draft(level), Utc::now())
        .await
        .expect("Failed to create challenge");
    store
        .update_challenge_status(
            &challenge.id,
            ChallengeStatus::Draft,
            ChallengeStatus::Active,
            Utc::now(),
        )
        .await
        .expect("Failed to activate challenge");
    store
        .get_challenge(&challenge.id)
        .await
        .expect("Failed to reload challenge")
}

/// A wall-clock instant safely inside the fixture challenge's calendar
/// bounds and daily window (2025-06-02 is a Monday)
pub fn midday() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}
