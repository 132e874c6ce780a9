use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::form::{optional_text, require, Draft, FieldErrors};
use crate::models::Assignment;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentDraft {
    pub title: String,
    pub description: String,
    pub league_id: String,
    /// RFC 3339 timestamp or a plain `YYYY-MM-DD` date; blank means no deadline.
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub title: String,
    pub description: Option<String>,
    pub league_id: String,
    pub due_date: Option<DateTime<Utc>>,
}

/// A bare date is due at the last second of that day, UTC.
pub fn parse_due_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

impl Draft for AssignmentDraft {
    type Entity = Assignment;
    type Payload = AssignmentPayload;

    fn from_entity(assignment: &Assignment) -> Self {
        Self {
            title: assignment.title.clone(),
            description: assignment.description.clone().unwrap_or_default(),
            league_id: assignment.league_id.clone(),
            due_date: assignment
                .due_date
                .map(|due| due.to_rfc3339())
                .unwrap_or_default(),
        }
    }

    fn validate(&self) -> Result<AssignmentPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "title", &self.title, "Title is required");
        require(&mut errors, "leagueId", &self.league_id, "League is required");

        let due_date = if self.due_date.trim().is_empty() {
            None
        } else {
            let parsed = parse_due_date(&self.due_date);
            if parsed.is_none() {
                errors.insert("dueDate", "Due date must be YYYY-MM-DD or an RFC 3339 timestamp");
            }
            parsed
        };

        errors.into_result(|| AssignmentPayload {
            title: self.title.trim().to_string(),
            description: optional_text(&self.description),
            league_id: self.league_id.clone(),
            due_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_dates_are_due_at_end_of_day() {
        let due = parse_due_date("2026-04-01").unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2026, 4, 1, 23, 59, 59).unwrap());
    }

    #[test]
    fn accepts_offsets_and_rejects_garbage() {
        let due = parse_due_date("2026-04-01T10:00:00+02:00").unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap());

        let draft = AssignmentDraft {
            title: "Essay".to_string(),
            league_id: "lg-1".to_string(),
            due_date: "next friday".to_string(),
            ..AssignmentDraft::default()
        };
        assert!(draft.validate().unwrap_err().get("dueDate").is_some());
    }

    #[test]
    fn blank_due_date_means_no_deadline() {
        let draft = AssignmentDraft {
            title: "Essay".to_string(),
            league_id: "lg-1".to_string(),
            ..AssignmentDraft::default()
        };
        assert_eq!(draft.validate().unwrap().due_date, None);
    }
}
