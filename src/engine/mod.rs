//! Challenge progression engine
//!
//! Everything that turns store rows and the current time into contest
//! behavior: phase/window evaluation, the participant dashboard, level
//! advancement, submission intake and review, and the one-second ticker.

mod advancement;
mod dashboard;
mod submission;
mod ticker;
mod window;

pub use advancement::{AdvanceError, LevelAdvancer};
pub use dashboard::Dashboard;
pub use submission::{Screenshot, SubmitError, pending_submissions, review_submission, submit_matrix};
pub use ticker::WindowTicker;
pub use window::{ChallengePhase, WindowStatus, evaluate, next_window};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// One observation of "now", in both views the engine needs: a UTC instant
/// for persisted timestamps and the local wall-clock for window arithmetic.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    pub instant: DateTime<Utc>,
    pub wall: NaiveDateTime,
}

impl Clock {
    /// Observe the system clock
    pub fn system() -> Self {
        let now = Local::now();
        Self {
            instant: now.with_timezone(&Utc),
            wall: now.naive_local(),
        }
    }

    /// Fixed clock for tests: the wall-clock is taken as UTC
    pub fn fixed(wall: NaiveDateTime) -> Self {
        Self {
            instant: Utc.from_utc_datetime(&wall),
            wall,
        }
    }
}
