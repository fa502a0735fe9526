//! Dashboard analytics payload.

use serde::Serialize;

use super::{RagStatus, TimeRange};

/// One slice of the RAG distribution chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RagSlice {
    pub status: RagStatus,
    pub name: &'static str,
    pub value: u64,
    pub color: &'static str,
}

/// Per-week RAG counts for the trend chart.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrendPoint {
    /// Raw `weekStart` key the bucket was grouped on.
    pub week_start: String,
    /// Short display label, e.g. "Mar 3".
    pub week: String,
    pub green: u64,
    pub amber: u64,
    pub red: u64,
}

/// Raw counts per RAG value.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RagCounts {
    pub green: u64,
    pub amber: u64,
    pub red: u64,
}

impl RagCounts {
    pub fn get(&self, rag: RagStatus) -> u64 {
        match rag {
            RagStatus::Green => self.green,
            RagStatus::Amber => self.amber,
            RagStatus::Red => self.red,
        }
    }

    pub fn increment(&mut self, rag: RagStatus) {
        match rag {
            RagStatus::Green => self.green += 1,
            RagStatus::Amber => self.amber += 1,
            RagStatus::Red => self.red += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.green + self.amber + self.red
    }
}

/// Aggregated dashboard view over a time window.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub time_range: TimeRange,
    pub rag_distribution: Vec<RagSlice>,
    pub trend: Vec<WeeklyTrendPoint>,
    pub total_submissions: u64,
    pub unique_members: u64,
    /// Weighted average (green=3, amber=2, red=1), one decimal, 0 when empty.
    pub health_score: f64,
    pub rag_counts: RagCounts,
}
