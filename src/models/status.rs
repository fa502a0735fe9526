//! Weekly status model and the enums shared by listing and analytics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Red/amber/green workload indicator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RagStatus {
    Red,
    Amber,
    Green,
}

impl RagStatus {
    /// Display order used by the distribution chart.
    pub const ALL: [RagStatus; 3] = [RagStatus::Green, RagStatus::Amber, RagStatus::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            RagStatus::Red => "red",
            RagStatus::Amber => "amber",
            RagStatus::Green => "green",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "red" => Some(RagStatus::Red),
            "amber" => Some(RagStatus::Amber),
            "green" => Some(RagStatus::Green),
            _ => None,
        }
    }

    /// Human label shown on badges and charts.
    pub fn label(&self) -> &'static str {
        match self {
            RagStatus::Red => "High Load",
            RagStatus::Amber => "Moderate",
            RagStatus::Green => "On Track",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RagStatus::Red => "hsl(0, 72%, 51%)",
            RagStatus::Amber => "hsl(38, 92%, 50%)",
            RagStatus::Green => "hsl(142, 71%, 45%)",
        }
    }

    /// Weight used by the health score (green is healthiest).
    pub fn weight(&self) -> u32 {
        match self {
            RagStatus::Red => 1,
            RagStatus::Amber => 2,
            RagStatus::Green => 3,
        }
    }
}

/// Time window selector for listing and analytics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Week,
    Month,
    Quarter,
    #[default]
    All,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Quarter => "quarter",
            TimeRange::All => "all",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "week" => Some(TimeRange::Week),
            "month" => Some(TimeRange::Month),
            "quarter" => Some(TimeRange::Quarter),
            "all" => Some(TimeRange::All),
            _ => None,
        }
    }

    /// Parse a query parameter, treating absent or unrecognized values as `All`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            None => TimeRange::All,
            Some(s) => TimeRange::from_str(s).unwrap_or_else(|| {
                tracing::debug!("Unrecognized time range {:?}, using all", s);
                TimeRange::All
            }),
        }
    }
}

/// A weekly RAG status report.
///
/// `member_name` is a snapshot taken at submission time and is not joined
/// against the roster, so renamed or deleted members keep their history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStatus {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub week_start: String,
    pub rag_status: RagStatus,
    pub work_activities: String,
    pub customer_activities: String,
    pub submitted_at: DateTime<Utc>,
}

/// Request body for submitting a status.
///
/// Fields are optional so that a missing key and a JSON `null` are both
/// reported by validation as missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStatusRequest {
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default)]
    pub member_name: Option<String>,
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default)]
    pub rag_status: Option<String>,
    #[serde(default)]
    pub work_activities: Option<String>,
    #[serde(default)]
    pub customer_activities: Option<String>,
}

/// Request body for editing a status. Member and week are fixed once submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub rag_status: Option<String>,
    #[serde(default)]
    pub work_activities: Option<String>,
    #[serde(default)]
    pub customer_activities: Option<String>,
}

/// Validated status ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatus {
    pub member_id: String,
    pub member_name: String,
    pub week_start: NaiveDate,
    pub rag_status: RagStatus,
    pub work_activities: String,
    pub customer_activities: String,
}

/// Validated edit of an existing status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChanges {
    pub rag_status: RagStatus,
    pub work_activities: String,
    pub customer_activities: String,
}
