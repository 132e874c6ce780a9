use serde::Serialize;

use crate::form::{optional_text, parse_order, require, Draft, FieldErrors};
use crate::models::Section;

#[derive(Debug, Clone, PartialEq)]
pub struct SectionDraft {
    pub name: String,
    pub description: String,
    pub order: String,
    pub week_id: String,
}

impl Default for SectionDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            order: "1".to_string(),
            week_id: String::new(),
        }
    }
}

impl SectionDraft {
    pub fn in_week(week_id: Option<&str>) -> Self {
        Self {
            week_id: week_id.unwrap_or_default().to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPayload {
    pub name: String,
    pub description: Option<String>,
    pub order: i64,
    pub week_id: String,
}

impl Draft for SectionDraft {
    type Entity = Section;
    type Payload = SectionPayload;

    fn from_entity(section: &Section) -> Self {
        Self {
            name: section.name.clone(),
            description: section.description.clone().unwrap_or_default(),
            order: section.order.to_string(),
            week_id: section.week_id.clone(),
        }
    }

    fn validate(&self) -> Result<SectionPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "name", &self.name, "Section name is required");
        require(&mut errors, "weekId", &self.week_id, "Week is required");
        let order = parse_order(&mut errors, &self.order);
        errors.into_result(|| SectionPayload {
            name: self.name.trim().to_string(),
            description: optional_text(&self.description),
            order,
            week_id: self.week_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_section_serializes_camel_case() {
        let draft = SectionDraft {
            name: "Budgeting".to_string(),
            order: "2".to_string(),
            ..SectionDraft::in_week(Some("w-3"))
        };
        let payload = serde_json::to_value(draft.validate().unwrap()).unwrap();
        assert_eq!(payload["weekId"], "w-3");
        assert_eq!(payload["order"], 2);
    }
}
