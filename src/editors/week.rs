use serde::Serialize;

use crate::form::{optional_text, parse_order, require, Draft, FieldErrors};
use crate::models::Week;

#[derive(Debug, Clone, PartialEq)]
pub struct WeekDraft {
    pub name: String,
    pub description: String,
    pub order: String,
    pub league_id: String,
}

impl Default for WeekDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            order: "1".to_string(),
            league_id: String::new(),
        }
    }
}

impl WeekDraft {
    pub fn in_league(league_id: Option<&str>) -> Self {
        Self {
            league_id: league_id.unwrap_or_default().to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPayload {
    pub name: String,
    pub description: Option<String>,
    pub order: i64,
    pub league_id: String,
}

impl Draft for WeekDraft {
    type Entity = Week;
    type Payload = WeekPayload;

    fn from_entity(week: &Week) -> Self {
        Self {
            name: week.name.clone(),
            description: week.description.clone().unwrap_or_default(),
            order: week.order.to_string(),
            league_id: week.league_id.clone(),
        }
    }

    fn validate(&self) -> Result<WeekPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "name", &self.name, "Week name is required");
        require(&mut errors, "leagueId", &self.league_id, "League is required");
        let order = parse_order(&mut errors, &self.order);
        errors.into_result(|| WeekPayload {
            name: self.name.trim().to_string(),
            description: optional_text(&self.description),
            order,
            league_id: self.league_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_form_inherits_selected_league() {
        let draft = WeekDraft::in_league(Some("lg-1"));
        assert_eq!(draft.league_id, "lg-1");
        assert_eq!(draft.order, "1");
    }

    #[test]
    fn reports_every_missing_field() {
        let draft = WeekDraft {
            order: "0".to_string(),
            ..WeekDraft::default()
        };
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Week name is required"));
        assert_eq!(errors.get("leagueId"), Some("League is required"));
        assert_eq!(errors.get("order"), Some("Order must be a positive integer"));
    }
}
