//! Submission-window and challenge-phase evaluation
//!
//! Pure wall-clock arithmetic, no I/O. The dashboard ticker calls
//! [`evaluate`] once per second with the current local time; tests call it
//! with fixed instants. The daily window is always evaluated as its *next
//! occurrence* at or after `now` - once today's end has passed, both bounds
//! move to the next allowed day. It never wraps overnight.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};

use crate::domain::Challenge;

/// Lifecycle phase of a challenge relative to a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengePhase {
    /// Calendar start not reached; countdown runs to start-of-day
    NotStarted { starts_at: NaiveDateTime },
    /// Inside the calendar bounds; carries the daily window state
    Active(WindowStatus),
    /// Calendar end passed; no countdown
    Ended,
}

/// State of the recurring daily submission window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStatus {
    /// Submissions are accepted; countdown runs to the window end
    Open { closes_at: NaiveDateTime },
    /// Submissions are gated; countdown runs to the next window start
    Closed { opens_at: NaiveDateTime },
}

impl ChallengePhase {
    /// The instant the dashboard counts down to, if any
    pub fn countdown_target(&self) -> Option<NaiveDateTime> {
        match self {
            ChallengePhase::NotStarted { starts_at } => Some(*starts_at),
            ChallengePhase::Active(WindowStatus::Open { closes_at }) => Some(*closes_at),
            ChallengePhase::Active(WindowStatus::Closed { opens_at }) => Some(*opens_at),
            ChallengePhase::Ended => None,
        }
    }

    /// Whether the submission window is currently open
    pub fn is_open(&self) -> bool {
        matches!(self, ChallengePhase::Active(WindowStatus::Open { .. }))
    }
}

/// Classify a challenge against `now` (local wall-clock).
///
/// Calendar bounds are date-only and both inclusive: the challenge runs
/// through the whole of `end_date`.
pub fn evaluate(challenge: &Challenge, now: NaiveDateTime) -> ChallengePhase {
    if now.date() < challenge.start_date {
        return ChallengePhase::NotStarted {
            starts_at: challenge.start_date.and_time(NaiveTime::MIN),
        };
    }
    if now.date() > challenge.end_date {
        return ChallengePhase::Ended;
    }
    ChallengePhase::Active(next_window(
        now,
        challenge.submission_start,
        challenge.submission_end,
        &challenge.submission_days,
    ))
}

/// Locate the next occurrence of the daily `[start, end]` window at or
/// after `now` and test it for openness (inclusive at both bounds).
///
/// An empty `days` set allows every weekday. `start == end` is a zero-width
/// window, open only at exactly that instant; `end < start` never opens.
pub fn next_window(
    now: NaiveDateTime,
    start: NaiveTime,
    end: NaiveTime,
    days: &[Weekday],
) -> WindowStatus {
    let mut date = now.date();

    // Past today's end: the window under evaluation becomes tomorrow's
    if now > date.and_time(end) {
        date = date.succ_opt().unwrap_or(date);
    }

    // Roll forward to the next allowed weekday (at most one week)
    for _ in 0..7 {
        if day_allowed(days, date.weekday()) {
            break;
        }
        date = date.succ_opt().unwrap_or(date);
    }

    let opens_at = date.and_time(start);
    let closes_at = date.and_time(end);

    if opens_at <= now && now <= closes_at {
        WindowStatus::Open { closes_at }
    } else {
        WindowStatus::Closed { opens_at }
    }
}

fn day_allowed(days: &[Weekday], day: Weekday) -> bool {
    days.is_empty() || days.contains(&day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    use crate::domain::ChallengeStatus;

    fn challenge() -> Challenge {
        Challenge {
            id: "c1".to_string(),
            title: "Level 1".to_string(),
            description: String::new(),
            level: 1,
            start_date: ymd(2025, 3, 1),
            end_date: ymd(2025, 3, 31),
            submission_start: hm(9, 0),
            submission_end: hm(10, 0),
            submission_days: Vec::new(),
            min_points: 100,
            status: ChallengeStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        ymd(y, m, d).and_hms_opt(h, min, s).unwrap()
    }

    #[test]
    fn test_phase_not_started_before_start_date() {
        let phase = evaluate(&challenge(), at(2025, 2, 28, 23, 59, 59));
        assert_eq!(
            phase,
            ChallengePhase::NotStarted {
                starts_at: at(2025, 3, 1, 0, 0, 0)
            }
        );
        assert_eq!(phase.countdown_target(), Some(at(2025, 3, 1, 0, 0, 0)));
    }

    #[test]
    fn test_phase_ended_after_end_date() {
        let phase = evaluate(&challenge(), at(2025, 4, 1, 0, 0, 0));
        assert_eq!(phase, ChallengePhase::Ended);
        assert_eq!(phase.countdown_target(), None);
    }

    #[test]
    fn test_phase_active_through_end_day() {
        // The end day itself is still inside the challenge
        let phase = evaluate(&challenge(), at(2025, 3, 31, 23, 0, 0));
        assert!(matches!(phase, ChallengePhase::Active(_)));
    }

    #[test]
    fn test_window_open_at_start_boundary() {
        let phase = evaluate(&challenge(), at(2025, 3, 10, 9, 0, 0));
        assert_eq!(
            phase,
            ChallengePhase::Active(WindowStatus::Open {
                closes_at: at(2025, 3, 10, 10, 0, 0)
            })
        );
        assert!(phase.is_open());
    }

    #[test]
    fn test_window_closed_one_second_before_start() {
        let phase = evaluate(&challenge(), at(2025, 3, 10, 8, 59, 59));
        assert_eq!(
            phase,
            ChallengePhase::Active(WindowStatus::Closed {
                opens_at: at(2025, 3, 10, 9, 0, 0)
            })
        );
        assert!(!phase.is_open());
    }

    #[test]
    fn test_window_open_at_end_boundary_inclusive() {
        let phase = evaluate(&challenge(), at(2025, 3, 10, 10, 0, 0));
        assert_eq!(
            phase,
            ChallengePhase::Active(WindowStatus::Open {
                closes_at: at(2025, 3, 10, 10, 0, 0)
            })
        );
    }

    #[test]
    fn test_window_rolls_to_tomorrow_after_end() {
        // One second past the end, the countdown targets tomorrow's start
        let phase = evaluate(&challenge(), at(2025, 3, 10, 10, 0, 1));
        assert_eq!(
            phase,
            ChallengePhase::Active(WindowStatus::Closed {
                opens_at: at(2025, 3, 11, 9, 0, 0)
            })
        );
    }

    #[test]
    fn test_inverted_bounds_never_open() {
        // end < start is evaluated as-is, never as an overnight wrap
        let status = next_window(at(2025, 3, 10, 23, 0, 0), hm(22, 0), hm(6, 0), &[]);
        assert_eq!(
            status,
            WindowStatus::Closed {
                opens_at: at(2025, 3, 11, 22, 0, 0)
            }
        );

        let status = next_window(at(2025, 3, 10, 12, 0, 0), hm(22, 0), hm(6, 0), &[]);
        assert_eq!(
            status,
            WindowStatus::Closed {
                opens_at: at(2025, 3, 11, 22, 0, 0)
            }
        );
    }

    #[test]
    fn test_zero_width_window_open_only_at_instant() {
        let status = next_window(at(2025, 3, 10, 9, 0, 0), hm(9, 0), hm(9, 0), &[]);
        assert_eq!(
            status,
            WindowStatus::Open {
                closes_at: at(2025, 3, 10, 9, 0, 0)
            }
        );

        let status = next_window(at(2025, 3, 10, 9, 0, 1), hm(9, 0), hm(9, 0), &[]);
        assert_eq!(
            status,
            WindowStatus::Closed {
                opens_at: at(2025, 3, 11, 9, 0, 0)
            }
        );
    }

    #[test]
    fn test_weekday_restriction_rolls_to_next_allowed_day() {
        // 2025-03-08 is a Saturday; only Mondays are allowed
        let days = [Weekday::Mon];
        let status = next_window(at(2025, 3, 8, 9, 30, 0), hm(9, 0), hm(10, 0), &days);
        assert_eq!(
            status,
            WindowStatus::Closed {
                opens_at: at(2025, 3, 10, 9, 0, 0)
            }
        );
    }

    #[test]
    fn test_weekday_restriction_open_on_allowed_day() {
        // 2025-03-10 is a Monday
        let days = [Weekday::Mon];
        let status = next_window(at(2025, 3, 10, 9, 30, 0), hm(9, 0), hm(10, 0), &days);
        assert_eq!(
            status,
            WindowStatus::Open {
                closes_at: at(2025, 3, 10, 10, 0, 0)
            }
        );
    }

    #[test]
    fn test_weekday_restriction_after_end_skips_disallowed_days() {
        // Monday past the window end: next Monday, not Tuesday
        let days = [Weekday::Mon];
        let status = next_window(at(2025, 3, 10, 11, 0, 0), hm(9, 0), hm(10, 0), &days);
        assert_eq!(
            status,
            WindowStatus::Closed {
                opens_at: at(2025, 3, 17, 9, 0, 0)
            }
        );
    }
}
