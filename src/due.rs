use std::fmt;

use chrono::{DateTime, Utc};

use crate::models::Assignment;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DueStatus {
    Overdue,
    Urgent,
    Soon,
    Normal,
    None,
}

impl DueStatus {
    pub const ALL: [DueStatus; 5] = [
        DueStatus::Overdue,
        DueStatus::Urgent,
        DueStatus::Soon,
        DueStatus::Normal,
        DueStatus::None,
    ];
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Overdue => "overdue",
            Self::Urgent => "urgent",
            Self::Soon => "soon",
            Self::Normal => "normal",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Whole days until `due`, rounded up, so anything due later today counts as one day.
pub fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (due - now).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).ceil() as i64
}

pub fn due_date_status(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DueStatus {
    let Some(due) = due else {
        return DueStatus::None;
    };
    match days_until(due, now) {
        days if days < 0 => DueStatus::Overdue,
        0..=3 => DueStatus::Urgent,
        4..=7 => DueStatus::Soon,
        _ => DueStatus::Normal,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueSummary {
    pub status: DueStatus,
    pub count: usize,
    pub submissions: usize,
}

pub fn summarize_due(assignments: &[Assignment], now: DateTime<Utc>) -> Vec<DueSummary> {
    let mut summaries: Vec<DueSummary> = DueStatus::ALL
        .iter()
        .map(|status| DueSummary {
            status: *status,
            count: 0,
            submissions: 0,
        })
        .collect();

    for assignment in assignments {
        let status = due_date_status(assignment.due_date, now);
        if let Some(summary) = summaries.iter_mut().find(|s| s.status == status) {
            summary.count += 1;
            summary.submissions += assignment.submissions.len();
        }
    }

    summaries.retain(|summary| summary.count > 0);
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn assignment(id: &str, due: Option<DateTime<Utc>>) -> Assignment {
        Assignment {
            id: id.to_string(),
            title: format!("Assignment {id}"),
            description: None,
            league_id: "lg-1".to_string(),
            due_date: due,
            submissions: Vec::new(),
        }
    }

    #[test]
    fn buckets_follow_expected_tiers() {
        let now = now();
        assert_eq!(due_date_status(None, now), DueStatus::None);
        assert_eq!(due_date_status(Some(now + Duration::days(10)), now), DueStatus::Normal);
        assert_eq!(due_date_status(Some(now + Duration::days(3)), now), DueStatus::Urgent);
        assert_eq!(due_date_status(Some(now - Duration::days(1)), now), DueStatus::Overdue);
        assert_eq!(due_date_status(Some(now + Duration::days(7)), now), DueStatus::Soon);
        assert_eq!(due_date_status(Some(now + Duration::days(8)), now), DueStatus::Normal);
    }

    #[test]
    fn partial_days_round_up() {
        let now = now();
        assert_eq!(days_until(now + Duration::hours(2), now), 1);
        assert_eq!(days_until(now + Duration::hours(75), now), 4);
        assert_eq!(due_date_status(Some(now + Duration::hours(75)), now), DueStatus::Soon);
        assert_eq!(days_until(now - Duration::hours(30), now), -1);
    }

    #[test]
    fn summary_counts_each_bucket() {
        let now = now();
        let assignments = vec![
            assignment("a", None),
            assignment("b", Some(now - Duration::days(2))),
            assignment("c", Some(now - Duration::days(5))),
            assignment("d", Some(now + Duration::days(20))),
        ];
        let summary = summarize_due(&assignments, now);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].status, DueStatus::Overdue);
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[2].status, DueStatus::None);
    }
}
