//! Status command implementation

use anyhow::Result;
use std::path::Path;

use challenge_matrix::engine::{ChallengePhase, Clock, WindowStatus, evaluate};
use challenge_matrix::store::Store;

use super::open_store;

/// List challenges with their status and current phase
pub async fn status_command(config_path: &Path) -> Result<()> {
    let (_config, store) = open_store(config_path)?;
    let challenges = store.list_challenges().await?;

    if challenges.is_empty() {
        println!("No challenges found.");
        return Ok(());
    }

    let now = Clock::system().wall;
    println!("Challenges ({}):\n", challenges.len());

    for challenge in &challenges {
        let phase = match evaluate(challenge, now) {
            ChallengePhase::NotStarted { starts_at } => {
                format!("not started (begins {starts_at})")
            }
            ChallengePhase::Active(WindowStatus::Open { closes_at }) => {
                format!("window open until {closes_at}")
            }
            ChallengePhase::Active(WindowStatus::Closed { opens_at }) => {
                format!("window opens {opens_at}")
            }
            ChallengePhase::Ended => "ended".to_string(),
        };

        println!(
            "  level {} [{}] {} - target {} pts, {}",
            challenge.level, challenge.status, challenge.title, challenge.min_points, phase
        );
        println!(
            "    {} to {}, daily {} - {}",
            challenge.start_date,
            challenge.end_date,
            challenge.submission_start.format("%H:%M"),
            challenge.submission_end.format("%H:%M"),
        );
        println!();
    }

    Ok(())
}
