//! SQLite implementation of the contest store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Row, params};
use uuid::Uuid;

use crate::domain::{
    Challenge, ChallengeDraft, ChallengeParticipant, ChallengeStatus, MatrixScores,
    MatrixSubmission, Office, ParticipantStatus, ReviewDecision, Reward, RewardDraft, RewardType,
    Role, SubmissionStatus, User,
};
use crate::ranking::{ParticipantPoints, Standing};

use super::db::{
    MatrixDb, fmt_date, fmt_days, fmt_time, fmt_timestamp, parse_date, parse_days, parse_time,
    parse_timestamp,
};
use super::{Advancement, NewUser, PendingSubmission, ReviewOutcome, Store, StoreError};

const USER_COLS: &str = "id, full_name, email, longrich_code, office, role, current_level, \
     terms_accepted, terms_accepted_at, created_at, updated_at";

const CHALLENGE_COLS: &str = "id, title, description, level, start_date, end_date, \
     submission_start, submission_end, submission_days, min_points, status, created_at, updated_at";

const PARTICIPANT_COLS: &str =
    "id, user_id, challenge_id, current_points, status, completed_at, created_at, updated_at";

const SUBMISSION_COLS: &str = "id, user_id, challenge_id, mxf, mxm, mx, mx_global, \
     screenshot_url, submitted_at, status, created_at";

const REWARD_COLS: &str =
    "id, challenge_id, title, description, image_url, kind, min_points, created_at, updated_at";

/// Contest store backed by [`MatrixDb`]
#[derive(Clone)]
pub struct SqliteStore {
    db: MatrixDb,
}

impl SqliteStore {
    pub fn new(db: MatrixDb) -> Self {
        Self { db }
    }

    /// Open a throwaway in-memory store (tests, dry runs)
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(MatrixDb::open_in_memory()?))
    }
}

// --- row decoding ---

fn user_from_row(row: &Row<'_>) -> Result<User, StoreError> {
    let office: String = row.get(4)?;
    let role: String = row.get(5)?;
    let terms_at: Option<String> = row.get(8)?;
    Ok(User {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        longrich_code: row.get(3)?,
        office: Office::parse(&office)
            .ok_or_else(|| StoreError::Malformed(format!("unknown office {office:?}")))?,
        role: Role::parse(&role)
            .ok_or_else(|| StoreError::Malformed(format!("unknown role {role:?}")))?,
        current_level: row.get(6)?,
        terms_accepted: row.get(7)?,
        terms_accepted_at: terms_at.as_deref().map(parse_timestamp).transpose()?,
        created_at: parse_timestamp(&row.get::<_, String>(9)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(10)?)?,
    })
}

fn challenge_from_row(row: &Row<'_>) -> Result<Challenge, StoreError> {
    let status: String = row.get(10)?;
    Ok(Challenge {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        level: row.get(3)?,
        start_date: parse_date(&row.get::<_, String>(4)?)?,
        end_date: parse_date(&row.get::<_, String>(5)?)?,
        submission_start: parse_time(&row.get::<_, String>(6)?)?,
        submission_end: parse_time(&row.get::<_, String>(7)?)?,
        submission_days: parse_days(&row.get::<_, String>(8)?)?,
        min_points: row.get(9)?,
        status: ChallengeStatus::parse(&status)
            .ok_or_else(|| StoreError::Malformed(format!("unknown challenge status {status:?}")))?,
        created_at: parse_timestamp(&row.get::<_, String>(11)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(12)?)?,
    })
}

fn participant_from_row(row: &Row<'_>) -> Result<ChallengeParticipant, StoreError> {
    let status: String = row.get(4)?;
    let completed_at: Option<String> = row.get(5)?;
    Ok(ChallengeParticipant {
        id: row.get(0)?,
        user_id: row.get(1)?,
        challenge_id: row.get(2)?,
        current_points: row.get(3)?,
        status: ParticipantStatus::parse(&status).ok_or_else(|| {
            StoreError::Malformed(format!("unknown participant status {status:?}"))
        })?,
        completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
        created_at: parse_timestamp(&row.get::<_, String>(6)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(7)?)?,
    })
}

fn submission_from_row(row: &Row<'_>) -> Result<MatrixSubmission, StoreError> {
    let status: String = row.get(9)?;
    Ok(MatrixSubmission {
        id: row.get(0)?,
        user_id: row.get(1)?,
        challenge_id: row.get(2)?,
        scores: MatrixScores {
            mxf: row.get(3)?,
            mxm: row.get(4)?,
            mx: row.get(5)?,
        },
        mx_global: row.get(6)?,
        screenshot_url: row.get(7)?,
        submitted_at: parse_timestamp(&row.get::<_, String>(8)?)?,
        status: SubmissionStatus::parse(&status).ok_or_else(|| {
            StoreError::Malformed(format!("unknown submission status {status:?}"))
        })?,
        created_at: parse_timestamp(&row.get::<_, String>(10)?)?,
    })
}

fn reward_from_row(row: &Row<'_>) -> Result<Reward, StoreError> {
    let kind: String = row.get(5)?;
    Ok(Reward {
        id: row.get(0)?,
        challenge_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        image_url: row.get(4)?,
        kind: RewardType::parse(&kind)
            .ok_or_else(|| StoreError::Malformed(format!("unknown reward type {kind:?}")))?,
        min_points: row.get(6)?,
        created_at: parse_timestamp(&row.get::<_, String>(7)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(8)?)?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_user(&self, new: NewUser, now: DateTime<Utc>) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            full_name: new.full_name,
            email: new.email,
            longrich_code: new.longrich_code,
            office: new.office,
            role: new.role,
            current_level: 1,
            terms_accepted: false,
            terms_accepted_at: None,
            created_at: now,
            updated_at: now,
        };

        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO users (id, full_name, email, longrich_code, office, role, \
             current_level, terms_accepted, terms_accepted_at, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, NULL, ?8, ?8)",
            params![
                user.id,
                user.full_name,
                user.email,
                user.longrich_code,
                user.office.as_str(),
                user.role.as_str(),
                user.current_level,
                fmt_timestamp(now),
            ],
        )?;
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<User, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!("SELECT {USER_COLS} FROM users WHERE id = ?1"))?;
        let mut rows = stmt.query(params![user_id])?;
        match rows.next()? {
            Some(row) => user_from_row(row),
            None => Err(StoreError::NotFound),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!("SELECT {USER_COLS} FROM users WHERE email = ?1"))?;
        let mut rows = stmt.query(params![email])?;
        match rows.next()? {
            Some(row) => Ok(Some(user_from_row(row)?)),
            None => Ok(None),
        }
    }

    async fn update_user_level(
        &self,
        user_id: &str,
        current_level: u32,
        accepted_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let conn = self.db.conn();
        let updated = conn.execute(
            "UPDATE users SET current_level = ?1, terms_accepted = 1, terms_accepted_at = ?2, \
             updated_at = ?2 WHERE id = ?3",
            params![current_level, fmt_timestamp(accepted_at), user_id],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_challenge(
        &self,
        draft: &ChallengeDraft,
        now: DateTime<Utc>,
    ) -> Result<Challenge, StoreError> {
        let id = Uuid::new_v4().to_string();
        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO challenges (id, title, description, level, start_date, end_date, \
             submission_start, submission_end, submission_days, min_points, status, \
             created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 'draft', ?11, ?11)",
            params![
                id,
                draft.title,
                draft.description,
                draft.level,
                fmt_date(draft.start_date),
                fmt_date(draft.end_date),
                fmt_time(draft.submission_start),
                fmt_time(draft.submission_end),
                fmt_days(&draft.submission_days),
                draft.min_points,
                fmt_timestamp(now),
            ],
        )?;

        Ok(Challenge {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            level: draft.level,
            start_date: draft.start_date,
            end_date: draft.end_date,
            submission_start: draft.submission_start,
            submission_end: draft.submission_end,
            submission_days: draft.submission_days.clone(),
            min_points: draft.min_points,
            status: ChallengeStatus::Draft,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_challenge(
        &self,
        challenge_id: &str,
        draft: &ChallengeDraft,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let conn = self.db.conn();
        let updated = conn.execute(
            "UPDATE challenges SET title = ?1, description = ?2, level = ?3, start_date = ?4, \
             end_date = ?5, submission_start = ?6, submission_end = ?7, submission_days = ?8, \
             min_points = ?9, updated_at = ?10 WHERE id = ?11",
            params![
                draft.title,
                draft.description,
                draft.level,
                fmt_date(draft.start_date),
                fmt_date(draft.end_date),
                fmt_time(draft.submission_start),
                fmt_time(draft.submission_end),
                fmt_days(&draft.submission_days),
                draft.min_points,
                fmt_timestamp(now),
                challenge_id,
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_challenge(&self, challenge_id: &str) -> Result<Challenge, StoreError> {
        let conn = self.db.conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {CHALLENGE_COLS} FROM challenges WHERE id = ?1"))?;
        let mut rows = stmt.query(params![challenge_id])?;
        match rows.next()? {
            Some(row) => challenge_from_row(row),
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_challenges(&self) -> Result<Vec<Challenge>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CHALLENGE_COLS} FROM challenges ORDER BY level ASC"
        ))?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(challenge_from_row(row)?);
        }
        Ok(out)
    }

    async fn active_challenge_for_level(
        &self,
        level: u32,
    ) -> Result<Option<Challenge>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CHALLENGE_COLS} FROM challenges WHERE status = 'active' AND level = ?1"
        ))?;
        let mut rows = stmt.query(params![level])?;
        match rows.next()? {
            Some(row) => Ok(Some(challenge_from_row(row)?)),
            None => Ok(None),
        }
    }

    async fn update_challenge_status(
        &self,
        challenge_id: &str,
        from: ChallengeStatus,
        to: ChallengeStatus,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let conn = self.db.conn();
        let updated = conn.execute(
            "UPDATE challenges SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
            params![
                to.as_str(),
                fmt_timestamp(now),
                challenge_id,
                from.as_str()
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::Conflict);
        }
        Ok(())
    }

    async fn list_rewards(&self, challenge_id: &str) -> Result<Vec<Reward>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {REWARD_COLS} FROM rewards WHERE challenge_id = ?1 ORDER BY min_points ASC"
        ))?;
        let mut rows = stmt.query(params![challenge_id])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(reward_from_row(row)?);
        }
        Ok(out)
    }

    async fn replace_rewards(
        &self,
        challenge_id: &str,
        rewards: &[RewardDraft],
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM rewards WHERE challenge_id = ?1",
            params![challenge_id],
        )?;
        for reward in rewards {
            tx.execute(
                "INSERT INTO rewards (id, challenge_id, title, description, image_url, kind, \
                 min_points, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    Uuid::new_v4().to_string(),
                    challenge_id,
                    reward.title,
                    reward.description,
                    reward.image_url,
                    reward.kind.as_str(),
                    reward.min_points,
                    fmt_timestamp(now),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    async fn get_participant(
        &self,
        user_id: &str,
        challenge_id: &str,
    ) -> Result<Option<ChallengeParticipant>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PARTICIPANT_COLS} FROM challenge_participants \
             WHERE user_id = ?1 AND challenge_id = ?2"
        ))?;
        let mut rows = stmt.query(params![user_id, challenge_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(participant_from_row(row)?)),
            None => Ok(None),
        }
    }

    async fn ensure_participant(
        &self,
        user_id: &str,
        challenge_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ChallengeParticipant, StoreError> {
        {
            let conn = self.db.conn();
            conn.execute(
                "INSERT OR IGNORE INTO challenge_participants \
                 (id, user_id, challenge_id, current_points, status, completed_at, \
                  created_at, updated_at) \
                 VALUES (?1, ?2, ?3, 0, 'active', NULL, ?4, ?4)",
                params![
                    Uuid::new_v4().to_string(),
                    user_id,
                    challenge_id,
                    fmt_timestamp(now),
                ],
            )?;
        }

        self.get_participant(user_id, challenge_id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn advance_user(&self, advancement: &Advancement) -> Result<(), StoreError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;
        let now = fmt_timestamp(advancement.accepted_at);

        let completed = tx.execute(
            "UPDATE challenges SET status = 'completed', updated_at = ?1 \
             WHERE id = ?2 AND status = 'active'",
            params![now, advancement.challenge_id],
        )?;
        if completed != 1 {
            return Err(StoreError::Conflict);
        }

        let advanced = tx.execute(
            "UPDATE users SET current_level = ?1, terms_accepted = 1, terms_accepted_at = ?2, \
             updated_at = ?2 WHERE id = ?3 AND current_level = ?4",
            params![
                advancement.next_level,
                now,
                advancement.user_id,
                advancement.next_level.saturating_sub(1),
            ],
        )?;
        if advanced != 1 {
            return Err(StoreError::Conflict);
        }

        tx.commit()?;
        Ok(())
    }

    async fn create_submission(&self, submission: &MatrixSubmission) -> Result<(), StoreError> {
        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO matrix_submissions (id, user_id, challenge_id, mxf, mxm, mx, \
             mx_global, screenshot_url, submitted_at, status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                submission.id,
                submission.user_id,
                submission.challenge_id,
                submission.scores.mxf,
                submission.scores.mxm,
                submission.scores.mx,
                submission.mx_global,
                submission.screenshot_url,
                fmt_timestamp(submission.submitted_at),
                submission.status.as_str(),
                fmt_timestamp(submission.created_at),
            ],
        )?;
        Ok(())
    }

    async fn submission_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<MatrixSubmission>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUBMISSION_COLS} FROM matrix_submissions \
             WHERE user_id = ?1 ORDER BY submitted_at DESC"
        ))?;
        let mut rows = stmt.query(params![user_id])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(submission_from_row(row)?);
        }
        Ok(out)
    }

    async fn pending_submissions(&self) -> Result<Vec<PendingSubmission>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT s.id, s.user_id, s.challenge_id, s.mxf, s.mxm, s.mx, s.mx_global, \
             s.screenshot_url, s.submitted_at, s.status, s.created_at, u.full_name, u.office \
             FROM matrix_submissions s JOIN users u ON u.id = s.user_id \
             WHERE s.status = 'pending' ORDER BY s.submitted_at DESC",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let office: String = row.get(12)?;
            out.push(PendingSubmission {
                submission: submission_from_row(row)?,
                full_name: row.get(11)?,
                office: Office::parse(&office)
                    .ok_or_else(|| StoreError::Malformed(format!("unknown office {office:?}")))?,
            });
        }
        Ok(out)
    }

    async fn finalize_submission(
        &self,
        submission_id: &str,
        decision: ReviewDecision,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome, StoreError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;
        let stamp = fmt_timestamp(now);

        let mut stmt = tx.prepare(
            "SELECT user_id, challenge_id, mx_global, status \
             FROM matrix_submissions WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![submission_id])?;
        let (user_id, challenge_id, mx_global, status): (String, String, u32, String) =
            match rows.next()? {
                Some(row) => (row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?),
                None => return Err(StoreError::NotFound),
            };
        drop(rows);
        drop(stmt);

        if status != SubmissionStatus::Pending.as_str() {
            return Err(StoreError::Conflict);
        }

        tx.execute(
            "UPDATE matrix_submissions SET status = ?1 WHERE id = ?2",
            params![decision.resulting_status().as_str(), submission_id],
        )?;

        let mut outcome = ReviewOutcome {
            status: decision.resulting_status(),
            points_awarded: 0,
            participant_completed: false,
        };

        if decision == ReviewDecision::Validate {
            let credited = tx.execute(
                "UPDATE challenge_participants \
                 SET current_points = current_points + ?1, updated_at = ?2 \
                 WHERE user_id = ?3 AND challenge_id = ?4",
                params![mx_global, stamp, user_id, challenge_id],
            )?;
            if credited != 1 {
                return Err(StoreError::NotFound);
            }
            outcome.points_awarded = mx_global;

            // Close out the participant once the target is reached
            let reached = tx.execute(
                "UPDATE challenge_participants SET status = 'completed', completed_at = ?1, \
                 updated_at = ?1 \
                 WHERE user_id = ?2 AND challenge_id = ?3 AND status = 'active' \
                 AND current_points >= \
                   (SELECT min_points FROM challenges WHERE id = challenge_id)",
                params![stamp, user_id, challenge_id],
            )?;
            outcome.participant_completed = reached == 1;
        }

        tx.commit()?;
        Ok(outcome)
    }

    async fn aggregate_participant_points(&self) -> Result<Vec<ParticipantPoints>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT cp.current_points, u.office \
             FROM challenge_participants cp JOIN users u ON u.id = cp.user_id",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let office: String = row.get(1)?;
            out.push(ParticipantPoints {
                points: row.get(0)?,
                office: Office::parse(&office)
                    .ok_or_else(|| StoreError::Malformed(format!("unknown office {office:?}")))?,
            });
        }
        Ok(out)
    }

    async fn participant_standings(&self) -> Result<Vec<Standing>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT u.full_name, u.office, cp.current_points \
             FROM challenge_participants cp JOIN users u ON u.id = cp.user_id \
             ORDER BY cp.current_points DESC",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let office: String = row.get(1)?;
            out.push(Standing {
                full_name: row.get(0)?,
                office: Office::parse(&office)
                    .ok_or_else(|| StoreError::Malformed(format!("unknown office {office:?}")))?,
                points: row.get(2)?,
            });
        }
        Ok(out)
    }
}
