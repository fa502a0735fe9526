//! Dashboard analytics over weekly statuses.
//!
//! Everything here is a pure function of its inputs. The reference instant is
//! always passed in, never sampled, so results are reproducible.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};

use crate::models::{
    AnalyticsSummary, RagCounts, RagSlice, RagStatus, TimeRange, WeeklyStatus, WeeklyTrendPoint,
};

const WEEK_START_FORMAT: &str = "%Y-%m-%d";

/// Earliest `submitted_at` included in the window, or `None` for all time.
pub fn cutoff(range: TimeRange, as_of: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match range {
        TimeRange::Week => Some(as_of - Duration::days(7)),
        TimeRange::Month => as_of.checked_sub_months(Months::new(1)),
        TimeRange::Quarter => as_of.checked_sub_months(Months::new(3)),
        TimeRange::All => None,
    }
}

/// Build the dashboard summary for `statuses` within `range` ending at `as_of`.
pub fn summarize(
    statuses: &[WeeklyStatus],
    range: TimeRange,
    as_of: DateTime<Utc>,
) -> AnalyticsSummary {
    let cutoff = cutoff(range, as_of);
    let filtered: Vec<&WeeklyStatus> = statuses
        .iter()
        .filter(|s| cutoff.map_or(true, |c| s.submitted_at >= c))
        .collect();

    let mut counts = RagCounts::default();
    for status in &filtered {
        counts.increment(status.rag_status);
    }

    let unique_members = filtered
        .iter()
        .map(|s| s.member_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;

    AnalyticsSummary {
        time_range: range,
        rag_distribution: distribution(&counts),
        trend: weekly_trend(&filtered),
        total_submissions: filtered.len() as u64,
        unique_members,
        health_score: health_score(&counts),
        rag_counts: counts,
    }
}

/// Non-empty RAG buckets in chart order (green, amber, red).
fn distribution(counts: &RagCounts) -> Vec<RagSlice> {
    RagStatus::ALL
        .iter()
        .filter(|rag| counts.get(**rag) > 0)
        .map(|rag| RagSlice {
            status: *rag,
            name: rag.label(),
            value: counts.get(*rag),
            color: rag.color(),
        })
        .collect()
}

/// Group by the exact `week_start` string and order buckets by date.
fn weekly_trend(statuses: &[&WeeklyStatus]) -> Vec<WeeklyTrendPoint> {
    let mut buckets: BTreeMap<&str, RagCounts> = BTreeMap::new();
    for status in statuses {
        buckets
            .entry(status.week_start.as_str())
            .or_default()
            .increment(status.rag_status);
    }

    let mut keyed: Vec<(Option<NaiveDate>, &str, RagCounts)> = buckets
        .into_iter()
        .map(|(week, counts)| {
            let date = NaiveDate::parse_from_str(week, WEEK_START_FORMAT).ok();
            (date, week, counts)
        })
        .collect();

    // Unparseable keys sort first; ties fall back to the raw string.
    keyed.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    keyed
        .into_iter()
        .map(|(date, week, counts)| WeeklyTrendPoint {
            week_start: week.to_string(),
            week: date
                .map(|d| d.format("%b %-d").to_string())
                .unwrap_or_else(|| week.to_string()),
            green: counts.green,
            amber: counts.amber,
            red: counts.red,
        })
        .collect()
}

fn health_score(counts: &RagCounts) -> f64 {
    let total = counts.total();
    if total == 0 {
        return 0.0;
    }

    let weighted: u64 = RagStatus::ALL
        .iter()
        .map(|rag| counts.get(*rag) * u64::from(rag.weight()))
        .sum();

    let score = weighted as f64 / total as f64;
    (score * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> DateTime<Utc> {
        "2024-03-15T12:00:00Z".parse().unwrap()
    }

    fn status(
        id: &str,
        member: &str,
        week: &str,
        rag: RagStatus,
        submitted: &str,
    ) -> WeeklyStatus {
        WeeklyStatus {
            id: id.to_string(),
            member_id: member.to_string(),
            member_name: format!("Member {}", member),
            week_start: week.to_string(),
            rag_status: rag,
            work_activities: "work".to_string(),
            customer_activities: "customers".to_string(),
            submitted_at: submitted.parse().unwrap(),
        }
    }

    fn sample() -> Vec<WeeklyStatus> {
        vec![
            status("1", "m1", "2024-03-10", RagStatus::Green, "2024-03-14T09:00:00Z"),
            status("2", "m2", "2024-03-10", RagStatus::Red, "2024-03-13T09:00:00Z"),
            status("3", "m1", "2024-03-03", RagStatus::Amber, "2024-03-05T09:00:00Z"),
            status("4", "m3", "2024-02-25", RagStatus::Green, "2024-02-26T09:00:00Z"),
            status("5", "m2", "2023-12-31", RagStatus::Red, "2024-01-02T09:00:00Z"),
        ]
    }

    #[test]
    fn test_empty_input_yields_zeroes() {
        let summary = summarize(&[], TimeRange::Week, as_of());

        assert_eq!(summary.total_submissions, 0);
        assert_eq!(summary.unique_members, 0);
        assert_eq!(summary.health_score, 0.0);
        assert!(summary.rag_distribution.is_empty());
        assert!(summary.trend.is_empty());
    }

    #[test]
    fn test_week_window_filters_on_submitted_at() {
        let summary = summarize(&sample(), TimeRange::Week, as_of());

        // Cutoff is 2024-03-08T12:00:00Z
        assert_eq!(summary.total_submissions, 2);
        assert_eq!(summary.unique_members, 2);
        assert_eq!(summary.rag_counts.green, 1);
        assert_eq!(summary.rag_counts.red, 1);
        assert_eq!(summary.health_score, 2.0);
    }

    #[test]
    fn test_month_and_quarter_windows() {
        let month = summarize(&sample(), TimeRange::Month, as_of());
        assert_eq!(month.total_submissions, 4);

        let quarter = summarize(&sample(), TimeRange::Quarter, as_of());
        assert_eq!(quarter.total_submissions, 5);
        assert_eq!(quarter.unique_members, 3);
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let boundary = status("b", "m1", "2024-03-03", RagStatus::Green, "2024-03-08T12:00:00Z");
        let summary = summarize(&[boundary], TimeRange::Week, as_of());
        assert_eq!(summary.total_submissions, 1);
    }

    #[test]
    fn test_all_range_has_no_cutoff() {
        assert_eq!(cutoff(TimeRange::All, as_of()), None);
        let old = status("o", "m1", "2020-01-05", RagStatus::Red, "2020-01-06T00:00:00Z");
        let summary = summarize(&[old], TimeRange::All, as_of());
        assert_eq!(summary.total_submissions, 1);
    }

    #[test]
    fn test_month_cutoff_clamps_to_month_end() {
        let as_of: DateTime<Utc> = "2024-03-31T08:00:00Z".parse().unwrap();
        let expected: DateTime<Utc> = "2024-02-29T08:00:00Z".parse().unwrap();
        assert_eq!(cutoff(TimeRange::Month, as_of), Some(expected));
    }

    #[test]
    fn test_distribution_omits_empty_buckets_and_labels_values() {
        let summary = summarize(&sample(), TimeRange::Week, as_of());
        let names: Vec<&str> = summary.rag_distribution.iter().map(|s| s.name).collect();

        assert_eq!(names, vec!["On Track", "High Load"]);
        assert_eq!(summary.rag_distribution[0].color, "hsl(142, 71%, 45%)");
        assert_eq!(summary.rag_distribution[1].color, "hsl(0, 72%, 51%)");
    }

    #[test]
    fn test_distribution_sums_to_total() {
        for range in [TimeRange::Week, TimeRange::Month, TimeRange::Quarter, TimeRange::All] {
            let summary = summarize(&sample(), range, as_of());
            let sum: u64 = summary.rag_distribution.iter().map(|s| s.value).sum();
            assert_eq!(sum, summary.total_submissions);
            assert!(summary.unique_members <= summary.total_submissions);
        }
    }

    #[test]
    fn test_trend_is_sorted_and_merges_weeks() {
        let summary = summarize(&sample(), TimeRange::Quarter, as_of());
        let weeks: Vec<&str> = summary.trend.iter().map(|p| p.week_start.as_str()).collect();

        assert_eq!(
            weeks,
            vec!["2023-12-31", "2024-02-25", "2024-03-03", "2024-03-10"]
        );
        let last = summary.trend.last().unwrap();
        assert_eq!(last.week, "Mar 10");
        assert_eq!((last.green, last.amber, last.red), (1, 0, 1));
        assert_eq!(summary.trend[0].week, "Dec 31");
    }

    #[test]
    fn test_trend_groups_by_exact_week_string() {
        let statuses = vec![
            status("1", "m1", "2024-03-10", RagStatus::Green, "2024-03-14T09:00:00Z"),
            status("2", "m2", "not-a-date", RagStatus::Amber, "2024-03-14T09:00:00Z"),
        ];
        let summary = summarize(&statuses, TimeRange::Week, as_of());

        assert_eq!(summary.trend.len(), 2);
        assert_eq!(summary.trend[0].week, "not-a-date");
        assert_eq!(summary.trend[1].week, "Mar 10");
    }

    #[test]
    fn test_health_score_rounds_to_one_decimal() {
        let statuses = vec![
            status("1", "m1", "2024-03-10", RagStatus::Green, "2024-03-14T09:00:00Z"),
            status("2", "m2", "2024-03-10", RagStatus::Green, "2024-03-14T09:00:00Z"),
            status("3", "m3", "2024-03-10", RagStatus::Amber, "2024-03-14T09:00:00Z"),
        ];
        let summary = summarize(&statuses, TimeRange::Week, as_of());

        // (3 + 3 + 2) / 3 = 2.666..
        assert_eq!(summary.health_score, 2.7);
    }

    #[test]
    fn test_health_score_bounds() {
        for range in [TimeRange::Week, TimeRange::Month, TimeRange::Quarter] {
            let summary = summarize(&sample(), range, as_of());
            assert!(summary.total_submissions > 0);
            assert!((1.0..=3.0).contains(&summary.health_score));
        }
    }

    #[test]
    fn test_input_is_not_mutated() {
        let statuses = sample();
        let before = statuses.clone();
        let _ = summarize(&statuses, TimeRange::Month, as_of());
        assert_eq!(statuses, before);
    }
}
