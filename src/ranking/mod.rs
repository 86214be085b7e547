//! Ranking aggregation for the dashboard leaderboards
//!
//! Pure functions over participant rows supplied by the store: an office
//! ranking (totals, counts, rounded averages) and a top-N individual
//! leaderboard. Ties are broken deterministically (office token / name).

use serde::{Deserialize, Serialize};

use crate::domain::Office;

/// One participant's points together with their office, as read from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantPoints {
    pub points: u32,
    pub office: Office,
}

/// One row of the individual leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub full_name: String,
    pub office: Office,
    pub points: u32,
}

/// Aggregated ranking entry for one office
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeStanding {
    pub office: Office,
    pub total_points: u32,
    pub participants: u32,
    /// Integer-rounded average points per participant
    pub average_points: u32,
}

/// Group participant points by office, sum and average them, and sort
/// descending by total (ties: office token ascending).
pub fn office_ranking(rows: &[ParticipantPoints]) -> Vec<OfficeStanding> {
    let mut standings: Vec<OfficeStanding> = Vec::new();

    for row in rows {
        match standings.iter_mut().find(|s| s.office == row.office) {
            Some(entry) => {
                entry.total_points += row.points;
                entry.participants += 1;
            }
            None => standings.push(OfficeStanding {
                office: row.office,
                total_points: row.points,
                participants: 1,
                average_points: 0,
            }),
        }
    }

    for entry in &mut standings {
        entry.average_points =
            (entry.total_points as f64 / entry.participants as f64).round() as u32;
    }

    standings.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.office.as_str().cmp(b.office.as_str()))
    });
    standings
}

/// Sort participants descending by points (ties: name ascending) and keep
/// the first `limit` entries.
pub fn top_participants(mut rows: Vec<Standing>, limit: usize) -> Vec<Standing> {
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| a.full_name.cmp(&b.full_name))
    });
    rows.truncate(limit);
    rows
}
