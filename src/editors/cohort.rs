use serde::Serialize;

use crate::form::{optional_text, require, Draft, FieldErrors};
use crate::models::Cohort;

#[derive(Debug, Clone, PartialEq)]
pub struct CohortDraft {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

impl Default for CohortDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortPayload {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl Draft for CohortDraft {
    type Entity = Cohort;
    type Payload = CohortPayload;

    fn from_entity(cohort: &Cohort) -> Self {
        Self {
            name: cohort.name.clone(),
            description: cohort.description.clone().unwrap_or_default(),
            is_active: cohort.is_active,
        }
    }

    fn validate(&self) -> Result<CohortPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "name", &self.name, "Name is required");
        errors.into_result(|| CohortPayload {
            name: self.name.trim().to_string(),
            description: optional_text(&self.description),
            is_active: self.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cohorts_default_to_active() {
        assert!(CohortDraft::default().is_active);
    }

    #[test]
    fn payload_trims_and_drops_blank_description() {
        let draft = CohortDraft {
            name: "  Summer 2026 ".to_string(),
            description: "   ".to_string(),
            is_active: false,
        };
        let payload = draft.validate().unwrap();
        assert_eq!(payload.name, "Summer 2026");
        assert_eq!(payload.description, None);
        assert!(!payload.is_active);
    }
}
