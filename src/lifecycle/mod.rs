//! Status and member lifecycle.
//!
//! Requests are validated here before anything reaches the repository, so an
//! invalid request never causes a write.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::analytics;
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{
    AnalyticsSummary, CreateStatusRequest, MemberFields, MemberRequest, NewStatus, RagStatus,
    StatusChanges, TeamMember, TimeRange, UpdateStatusRequest, WeeklyStatus,
};

/// Validating front for the record store.
#[derive(Clone)]
pub struct Lifecycle {
    repo: Arc<Repository>,
}

impl Lifecycle {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    // ==================== MEMBERS ====================

    pub async fn list_members(&self) -> Result<Vec<TeamMember>, AppError> {
        self.repo.list_members().await
    }

    pub async fn get_member(&self, id: &str) -> Result<TeamMember, AppError> {
        self.repo
            .get_member(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team member {} not found", id)))
    }

    pub async fn create_member(&self, request: &MemberRequest) -> Result<TeamMember, AppError> {
        let fields = validate_member(request)?;
        let member = self.repo.create_member(&fields).await?;
        tracing::info!(member_id = %member.id, "Created team member");
        Ok(member)
    }

    pub async fn update_member(
        &self,
        id: &str,
        request: &MemberRequest,
    ) -> Result<TeamMember, AppError> {
        let fields = validate_member(request)?;
        self.repo.update_member(id, &fields).await
    }

    /// Remove a member from the roster. Their submitted statuses are kept.
    pub async fn delete_member(&self, id: &str) -> Result<(), AppError> {
        self.repo.delete_member(id).await?;
        tracing::info!(member_id = %id, "Deleted team member");
        Ok(())
    }

    // ==================== STATUSES ====================

    /// List statuses newest first, restricted to weeks starting inside `range` relative to `today`.
    pub async fn list_statuses(
        &self,
        range: TimeRange,
        today: NaiveDate,
    ) -> Result<Vec<WeeklyStatus>, AppError> {
        let since = range_start(range, today);
        tracing::debug!(range = range.as_str(), ?since, "Listing statuses");
        self.repo.list_statuses(since).await
    }

    pub async fn get_status(&self, id: &str) -> Result<WeeklyStatus, AppError> {
        self.repo
            .get_status(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Status {} not found", id)))
    }

    pub async fn create_status(
        &self,
        request: &CreateStatusRequest,
    ) -> Result<WeeklyStatus, AppError> {
        let new_status = validate_new_status(request)?;
        let status = self.repo.create_status(&new_status).await?;
        tracing::info!(
            status_id = %status.id,
            member_id = %status.member_id,
            week_start = %status.week_start,
            rag = status.rag_status.as_str(),
            "Status submitted"
        );
        Ok(status)
    }

    pub async fn update_status(
        &self,
        id: &str,
        request: &UpdateStatusRequest,
    ) -> Result<WeeklyStatus, AppError> {
        let changes = validate_status_changes(request)?;
        self.repo.update_status(id, &changes).await
    }

    pub async fn delete_status(&self, id: &str) -> Result<(), AppError> {
        self.repo.delete_status(id).await
    }

    /// Delete every status. Returns how many were removed.
    pub async fn clear_statuses(&self) -> Result<u64, AppError> {
        let removed = self.repo.clear_statuses().await?;
        tracing::warn!(removed, "Cleared all statuses");
        Ok(removed)
    }

    /// Dashboard analytics over every stored status.
    pub async fn analytics(
        &self,
        range: TimeRange,
        as_of: DateTime<Utc>,
    ) -> Result<AnalyticsSummary, AppError> {
        let statuses = self.repo.list_statuses(None).await?;
        Ok(analytics::summarize(&statuses, range, as_of))
    }
}

/// First `week_start` date included by a listing range, or `None` for no filter.
pub fn range_start(range: TimeRange, today: NaiveDate) -> Option<NaiveDate> {
    match range {
        TimeRange::Week => {
            let offset = i64::from(today.weekday().num_days_from_sunday());
            Some(today - Duration::days(offset))
        }
        TimeRange::Month => today.with_day(1),
        TimeRange::Quarter => {
            let quarter_month = (today.month0() / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(today.year(), quarter_month, 1)
        }
        TimeRange::All => None,
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Request field text, with an absent or `null` value read as empty.
fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn parse_rag(value: &str) -> Result<RagStatus, AppError> {
    RagStatus::from_str(value).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid RAG status '{}': expected red, amber or green",
            value
        ))
    })
}

pub fn validate_new_status(request: &CreateStatusRequest) -> Result<NewStatus, AppError> {
    let missing: Vec<&str> = [
        ("memberId", &request.member_id),
        ("memberName", &request.member_name),
        ("weekStart", &request.week_start),
        ("ragStatus", &request.rag_status),
        ("workActivities", &request.work_activities),
        ("customerActivities", &request.customer_activities),
    ]
    .into_iter()
    .filter(|(_, value)| is_blank(text(value)))
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "All fields are required; missing: {}",
            missing.join(", ")
        )));
    }

    let rag_status = parse_rag(text(&request.rag_status))?;
    let week_start_text = text(&request.week_start);
    let week_start = NaiveDate::parse_from_str(week_start_text.trim(), "%Y-%m-%d")
        .map_err(|_| {
            AppError::Validation(format!(
                "Invalid weekStart '{}': expected YYYY-MM-DD",
                week_start_text
            ))
        })?;

    Ok(NewStatus {
        member_id: text(&request.member_id).to_string(),
        member_name: text(&request.member_name).to_string(),
        week_start,
        rag_status,
        work_activities: text(&request.work_activities).to_string(),
        customer_activities: text(&request.customer_activities).to_string(),
    })
}

pub fn validate_status_changes(request: &UpdateStatusRequest) -> Result<StatusChanges, AppError> {
    let rag_status = text(&request.rag_status);
    let work_activities = text(&request.work_activities);
    let customer_activities = text(&request.customer_activities);

    if is_blank(rag_status) || is_blank(work_activities) || is_blank(customer_activities) {
        return Err(AppError::Validation(
            "ragStatus, workActivities and customerActivities are required".to_string(),
        ));
    }

    Ok(StatusChanges {
        rag_status: parse_rag(rag_status)?,
        work_activities: work_activities.to_string(),
        customer_activities: customer_activities.to_string(),
    })
}

pub fn validate_member(request: &MemberRequest) -> Result<MemberFields, AppError> {
    let name = text(&request.name);
    let role = text(&request.role);
    if is_blank(name) || is_blank(role) {
        return Err(AppError::Validation(
            "Name and role are required".to_string(),
        ));
    }

    Ok(MemberFields {
        name: name.to_string(),
        role: role.to_string(),
        avatar: request.avatar.clone().filter(|a| !is_blank(a)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn lifecycle() -> (Lifecycle, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (Lifecycle::new(Arc::new(Repository::new(pool))), temp_dir)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn status_request(week_start: &str, rag: &str) -> CreateStatusRequest {
        CreateStatusRequest {
            member_id: Some("m1".to_string()),
            member_name: Some("Alex Johnson".to_string()),
            week_start: Some(week_start.to_string()),
            rag_status: Some(rag.to_string()),
            work_activities: Some("Reviewed PRs".to_string()),
            customer_activities: Some("Escalation call".to_string()),
        }
    }

    fn update_request(rag: &str, work: &str, customer: &str) -> UpdateStatusRequest {
        UpdateStatusRequest {
            rag_status: Some(rag.to_string()),
            work_activities: Some(work.to_string()),
            customer_activities: Some(customer.to_string()),
        }
    }

    fn member_request(name: &str, role: &str) -> MemberRequest {
        MemberRequest {
            name: Some(name.to_string()),
            role: Some(role.to_string()),
            avatar: None,
        }
    }

    #[test]
    fn test_range_start_week_is_sunday_aligned() {
        // 2024-03-13 is a Wednesday
        assert_eq!(
            range_start(TimeRange::Week, date("2024-03-13")),
            Some(date("2024-03-10"))
        );
        // Sunday maps to itself
        assert_eq!(
            range_start(TimeRange::Week, date("2024-03-10")),
            Some(date("2024-03-10"))
        );
        // Crosses a month boundary
        assert_eq!(
            range_start(TimeRange::Week, date("2024-03-01")),
            Some(date("2024-02-25"))
        );
    }

    #[test]
    fn test_range_start_month_and_quarter() {
        assert_eq!(
            range_start(TimeRange::Month, date("2024-03-13")),
            Some(date("2024-03-01"))
        );
        assert_eq!(
            range_start(TimeRange::Quarter, date("2024-03-13")),
            Some(date("2024-01-01"))
        );
        assert_eq!(
            range_start(TimeRange::Quarter, date("2024-08-31")),
            Some(date("2024-07-01"))
        );
        assert_eq!(
            range_start(TimeRange::Quarter, date("2024-12-01")),
            Some(date("2024-10-01"))
        );
        assert_eq!(range_start(TimeRange::All, date("2024-03-13")), None);
    }

    #[test]
    fn test_validate_new_status_reports_missing_fields() {
        let mut request = status_request("2024-03-10", "green");
        request.member_name = Some("  ".to_string());
        request.customer_activities = None;

        match validate_new_status(&request) {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("memberName"));
                assert!(msg.contains("customerActivities"));
                assert!(!msg.contains("memberId"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_new_status_rejects_bad_week_start() {
        let request = status_request("last week", "green");
        assert!(matches!(
            validate_new_status(&request),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_member_drops_blank_avatar() {
        let fields = validate_member(&MemberRequest {
            avatar: Some("".to_string()),
            ..member_request("Jordan Lee", "Product Manager")
        })
        .unwrap();
        assert_eq!(fields.avatar, None);

        assert!(validate_member(&member_request("Jordan Lee", " ")).is_err());
        assert!(validate_member(&MemberRequest {
            role: None,
            ..member_request("Jordan Lee", "Product Manager")
        })
        .is_err());
    }

    #[tokio::test]
    async fn test_invalid_rag_status_is_rejected_without_write() {
        let (lifecycle, _dir) = lifecycle().await;

        let result = lifecycle
            .create_status(&status_request("2024-03-10", "blue"))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        let stored = lifecycle
            .list_statuses(TimeRange::All, date("2024-03-13"))
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_create_status_assigns_id_and_submitted_at() {
        let (lifecycle, _dir) = lifecycle().await;
        let before = Utc::now();

        let status = lifecycle
            .create_status(&status_request("2024-03-10", "green"))
            .await
            .unwrap();

        assert!(!status.id.is_empty());
        assert!(status.submitted_at >= before);
        assert_eq!(status.week_start, "2024-03-10");
        assert_eq!(status.rag_status, RagStatus::Green);
        assert_eq!(status.member_name, "Alex Johnson");
    }

    #[tokio::test]
    async fn test_delete_missing_status_is_not_found_and_store_unchanged() {
        let (lifecycle, _dir) = lifecycle().await;
        lifecycle
            .create_status(&status_request("2024-03-10", "amber"))
            .await
            .unwrap();

        let result = lifecycle.delete_status("does-not-exist").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        let stored = lifecycle
            .list_statuses(TimeRange::All, date("2024-03-13"))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_week_listing_excludes_older_weeks() {
        let (lifecycle, _dir) = lifecycle().await;
        let today = date("2024-03-13");

        let current = lifecycle
            .create_status(&status_request("2024-03-10", "green"))
            .await
            .unwrap();
        lifecycle
            .create_status(&status_request("2024-02-25", "red"))
            .await
            .unwrap();

        let week = lifecycle.list_statuses(TimeRange::Week, today).await.unwrap();
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].id, current.id);

        let all = lifecycle.list_statuses(TimeRange::All, today).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].week_start, "2024-02-25");
    }

    #[tokio::test]
    async fn test_update_status_keeps_member_and_week() {
        let (lifecycle, _dir) = lifecycle().await;
        let created = lifecycle
            .create_status(&status_request("2024-03-10", "green"))
            .await
            .unwrap();

        let updated = lifecycle
            .update_status(
                &created.id,
                &update_request("red", "Firefighting", "Outage comms"),
            )
            .await
            .unwrap();

        assert_eq!(updated.rag_status, RagStatus::Red);
        assert_eq!(updated.work_activities, "Firefighting");
        assert_eq!(updated.member_id, created.member_id);
        assert_eq!(updated.week_start, created.week_start);
        assert_eq!(updated.submitted_at, created.submitted_at);

        let missing = lifecycle
            .update_status("nope", &update_request("red", "x", "y"))
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_status_with_invalid_rag_leaves_row_unchanged() {
        let (lifecycle, _dir) = lifecycle().await;
        let created = lifecycle
            .create_status(&status_request("2024-03-10", "green"))
            .await
            .unwrap();

        let result = lifecycle
            .update_status(&created.id, &update_request("blue", "Firefighting", "Outage comms"))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(lifecycle.get_status(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_status_with_blank_activities_leaves_row_unchanged() {
        let (lifecycle, _dir) = lifecycle().await;
        let created = lifecycle
            .create_status(&status_request("2024-03-10", "amber"))
            .await
            .unwrap();

        let result = lifecycle
            .update_status(&created.id, &update_request("red", "   ", "Outage comms"))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = lifecycle
            .update_status(
                &created.id,
                &UpdateStatusRequest {
                    work_activities: None,
                    ..update_request("red", "x", "y")
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        assert_eq!(lifecycle.get_status(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_clear_then_list_is_empty() {
        let (lifecycle, _dir) = lifecycle().await;
        lifecycle
            .create_status(&status_request("2024-03-10", "green"))
            .await
            .unwrap();

        lifecycle.clear_statuses().await.unwrap();

        let stored = lifecycle
            .list_statuses(TimeRange::All, date("2024-03-13"))
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_delete_member_keeps_statuses() {
        let (lifecycle, _dir) = lifecycle().await;
        let member = lifecycle
            .create_member(&member_request("Sam Williams", "Backend Developer"))
            .await
            .unwrap();

        let mut request = status_request("2024-03-10", "amber");
        request.member_id = Some(member.id.clone());
        request.member_name = Some(member.name.clone());
        lifecycle.create_status(&request).await.unwrap();

        lifecycle.delete_member(&member.id).await.unwrap();

        assert!(matches!(
            lifecycle.get_member(&member.id).await,
            Err(AppError::NotFound(_))
        ));
        let stored = lifecycle
            .list_statuses(TimeRange::All, date("2024-03-13"))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].member_id, member.id);
        assert_eq!(stored[0].member_name, "Sam Williams");
    }

    #[tokio::test]
    async fn test_update_member_not_found() {
        let (lifecycle, _dir) = lifecycle().await;
        let result = lifecycle
            .update_member("missing", &member_request("A", "B"))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_analytics_reads_all_stored_statuses() {
        let (lifecycle, _dir) = lifecycle().await;
        lifecycle
            .create_status(&status_request("2024-03-10", "green"))
            .await
            .unwrap();
        lifecycle
            .create_status(&status_request("2024-03-10", "amber"))
            .await
            .unwrap();

        let summary = lifecycle.analytics(TimeRange::Week, Utc::now()).await.unwrap();

        assert_eq!(summary.total_submissions, 2);
        assert_eq!(summary.unique_members, 1);
        assert_eq!(summary.health_score, 2.5);
        assert_eq!(summary.trend.len(), 1);
    }
}
