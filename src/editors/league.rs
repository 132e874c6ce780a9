use serde::Serialize;

use crate::form::{optional_text, require, Draft, FieldErrors};
use crate::models::League;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeagueDraft {
    pub name: String,
    pub description: String,
    pub cohort_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaguePayload {
    pub name: String,
    pub description: Option<String>,
    pub cohort_id: String,
}

impl Draft for LeagueDraft {
    type Entity = League;
    type Payload = LeaguePayload;

    fn from_entity(league: &League) -> Self {
        Self {
            name: league.name.clone(),
            description: league.description.clone().unwrap_or_default(),
            cohort_id: league.cohort_id.clone(),
        }
    }

    fn validate(&self) -> Result<LeaguePayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "name", &self.name, "Name is required");
        require(&mut errors, "cohortId", &self.cohort_id, "Cohort is required");
        errors.into_result(|| LeaguePayload {
            name: self.name.trim().to_string(),
            description: optional_text(&self.description),
            cohort_id: self.cohort_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_needs_a_cohort() {
        let draft = LeagueDraft {
            name: "Finance".to_string(),
            ..LeagueDraft::default()
        };
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.get("cohortId"), Some("Cohort is required"));
        assert_eq!(errors.get("name"), None);
    }
}
