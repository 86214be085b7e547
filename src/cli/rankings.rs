//! Rankings command implementation

use anyhow::Result;
use std::path::Path;

use challenge_matrix::ranking;
use challenge_matrix::store::Store;

use super::open_store;

/// Print the office ranking and the top-10 individual leaderboard
pub async fn rankings_command(config_path: &Path) -> Result<()> {
    let (_config, store) = open_store(config_path)?;

    let (points, standings) = futures::try_join!(
        store.aggregate_participant_points(),
        store.participant_standings(),
    )?;
    let offices = ranking::office_ranking(&points);

    if offices.is_empty() {
        println!("No participants yet.");
        return Ok(());
    }

    println!("Office ranking:\n");
    for (i, entry) in offices.iter().enumerate() {
        println!(
            "  {}. {} - {} pts ({} participants, avg {})",
            i + 1,
            entry.office.label(),
            entry.total_points,
            entry.participants,
            entry.average_points
        );
    }

    let top = ranking::top_participants(standings, 10);

    println!("\nTop {} participants:\n", top.len());
    for (i, entry) in top.iter().enumerate() {
        println!(
            "  {}. {} ({}) - {} pts",
            i + 1,
            entry.full_name,
            entry.office.label(),
            entry.points
        );
    }

    Ok(())
}
