//! Database repository for CRUD operations.
//!
//! Uses prepared statements; every successful write bumps the revision.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    MemberFields, NewStatus, RagStatus, RevisionInfo, StatusChanges, TeamMember, WeeklyStatus,
};

/// Roster inserted on first start when seeding is enabled.
const DEFAULT_MEMBERS: [(&str, &str, &str); 3] = [
    (
        "a1b2c3d4-e5f6-7890-abcd-ef1234567890",
        "Alex Johnson",
        "Frontend Developer",
    ),
    (
        "b2c3d4e5-f6a7-8901-bcde-f12345678901",
        "Sam Williams",
        "Backend Developer",
    ),
    (
        "c3d4e5f6-a7b8-9012-cdef-123456789012",
        "Jordan Lee",
        "Product Manager",
    ),
];

const STATUS_COLUMNS: &str = "id, member_id, member_name, week_start, rag_status, work_activities, customer_activities, submitted_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(timestamp(Utc::now()))
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    // ==================== MEMBER OPERATIONS ====================

    /// List all members in the order they joined.
    pub async fn list_members(&self) -> Result<Vec<TeamMember>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, role, avatar FROM team_members ORDER BY created_at ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// Get a member by ID.
    pub async fn get_member(&self, id: &str) -> Result<Option<TeamMember>, AppError> {
        let row = sqlx::query("SELECT id, name, role, avatar FROM team_members WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    /// Create a new member.
    pub async fn create_member(&self, fields: &MemberFields) -> Result<TeamMember, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp(Utc::now());

        sqlx::query(
            "INSERT INTO team_members (id, name, role, avatar, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&fields.name)
        .bind(&fields.role)
        .bind(&fields.avatar)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(TeamMember {
            id,
            name: fields.name.clone(),
            role: fields.role.clone(),
            avatar: fields.avatar.clone(),
        })
    }

    /// Replace a member's name, role and avatar.
    pub async fn update_member(
        &self,
        id: &str,
        fields: &MemberFields,
    ) -> Result<TeamMember, AppError> {
        let result = sqlx::query(
            "UPDATE team_members SET name = ?, role = ?, avatar = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(&fields.role)
        .bind(&fields.avatar)
        .bind(timestamp(Utc::now()))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Team member {} not found", id)));
        }

        self.increment_revision().await?;

        Ok(TeamMember {
            id: id.to_string(),
            name: fields.name.clone(),
            role: fields.role.clone(),
            avatar: fields.avatar.clone(),
        })
    }

    /// Delete a member. Their statuses are left in place.
    pub async fn delete_member(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM team_members WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Team member {} not found", id)));
        }

        self.increment_revision().await?;
        Ok(())
    }

    /// Insert the default roster, skipping members that already exist.
    ///
    /// Returns the number of members inserted.
    pub async fn seed_default_members(&self) -> Result<u64, AppError> {
        let mut inserted = 0;
        for (id, name, role) in DEFAULT_MEMBERS {
            let now = timestamp(Utc::now());
            let result = sqlx::query(
                "INSERT OR IGNORE INTO team_members (id, name, role, avatar, created_at, updated_at) VALUES (?, ?, ?, NULL, ?, ?)",
            )
            .bind(id)
            .bind(name)
            .bind(role)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }

        if inserted > 0 {
            self.increment_revision().await?;
        }
        Ok(inserted)
    }

    // ==================== STATUS OPERATIONS ====================

    /// List statuses newest first, optionally limited to weeks starting on or after `since`.
    pub async fn list_statuses(
        &self,
        since: Option<NaiveDate>,
    ) -> Result<Vec<WeeklyStatus>, AppError> {
        let rows = match since {
            Some(date) => {
                let sql = format!(
                    "SELECT {} FROM weekly_statuses WHERE week_start >= ? ORDER BY submitted_at DESC, rowid DESC",
                    STATUS_COLUMNS
                );
                sqlx::query(&sql)
                    .bind(format_date(date))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM weekly_statuses ORDER BY submitted_at DESC, rowid DESC",
                    STATUS_COLUMNS
                );
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };

        rows.iter().map(status_from_row).collect()
    }

    /// Get a status by ID.
    pub async fn get_status(&self, id: &str) -> Result<Option<WeeklyStatus>, AppError> {
        let sql = format!("SELECT {} FROM weekly_statuses WHERE id = ?", STATUS_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(status_from_row).transpose()
    }

    /// Insert a validated status, assigning its id and submission time.
    pub async fn create_status(&self, status: &NewStatus) -> Result<WeeklyStatus, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let submitted_at = Utc::now();
        let week_start = format_date(status.week_start);

        sqlx::query(
            "INSERT INTO weekly_statuses (id, member_id, member_name, week_start, rag_status, work_activities, customer_activities, submitted_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&status.member_id)
        .bind(&status.member_name)
        .bind(&week_start)
        .bind(status.rag_status.as_str())
        .bind(&status.work_activities)
        .bind(&status.customer_activities)
        .bind(timestamp(submitted_at))
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(WeeklyStatus {
            id,
            member_id: status.member_id.clone(),
            member_name: status.member_name.clone(),
            week_start,
            rag_status: status.rag_status,
            work_activities: status.work_activities.clone(),
            customer_activities: status.customer_activities.clone(),
            submitted_at,
        })
    }

    /// Apply an edit to the RAG value and activity text of a status.
    pub async fn update_status(
        &self,
        id: &str,
        changes: &StatusChanges,
    ) -> Result<WeeklyStatus, AppError> {
        let result = sqlx::query(
            "UPDATE weekly_statuses SET rag_status = ?, work_activities = ?, customer_activities = ? WHERE id = ?",
        )
        .bind(changes.rag_status.as_str())
        .bind(&changes.work_activities)
        .bind(&changes.customer_activities)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Status {} not found", id)));
        }

        self.increment_revision().await?;

        self.get_status(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Status {} not found", id)))
    }

    /// Delete a single status.
    pub async fn delete_status(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM weekly_statuses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Status {} not found", id)));
        }

        self.increment_revision().await?;
        Ok(())
    }

    /// Delete every status. Returns the number removed.
    pub async fn clear_statuses(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM weekly_statuses")
            .execute(&self.pool)
            .await?;

        self.increment_revision().await?;
        Ok(result.rows_affected())
    }
}

// Helper functions for row conversion

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> TeamMember {
    TeamMember {
        id: row.get("id"),
        name: row.get("name"),
        role: row.get("role"),
        avatar: row.get("avatar"),
    }
}

fn status_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<WeeklyStatus, AppError> {
    let rag_str: String = row.get("rag_status");
    let rag_status = RagStatus::from_str(&rag_str)
        .ok_or_else(|| AppError::Internal(format!("Unknown RAG status in store: {}", rag_str)))?;
    let submitted_str: String = row.get("submitted_at");
    let submitted_at = DateTime::parse_from_rfc3339(&submitted_str)?.with_timezone(&Utc);

    Ok(WeeklyStatus {
        id: row.get("id"),
        member_id: row.get("member_id"),
        member_name: row.get("member_name"),
        week_start: row.get("week_start"),
        rag_status,
        work_activities: row.get("work_activities"),
        customer_activities: row.get("customer_activities"),
        submitted_at,
    })
}

/// Fixed-width UTC timestamp so that text ordering matches time ordering.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
