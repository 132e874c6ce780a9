use std::collections::{BTreeMap, HashMap};

use reqwest::Url;
use serde::Serialize;

use crate::form::{parse_order, require, Draft, FieldErrors};
use crate::models::{path_segment, Resource, ResourceType};

pub const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDraft {
    pub title: String,
    pub url: String,
    pub kind: ResourceType,
    pub order: String,
    pub section_id: String,
}

impl Default for ResourceDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            kind: ResourceType::default(),
            order: "1".to_string(),
            section_id: String::new(),
        }
    }
}

impl ResourceDraft {
    pub fn in_section(section_id: Option<&str>) -> Self {
        Self {
            section_id: section_id.unwrap_or_default().to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePayload {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub order: i64,
    pub section_id: String,
}

impl Draft for ResourceDraft {
    type Entity = Resource;
    type Payload = ResourcePayload;

    fn from_entity(resource: &Resource) -> Self {
        Self {
            title: resource.title.clone(),
            url: resource.url.clone(),
            kind: resource.kind,
            order: resource.order.to_string(),
            section_id: resource.section_id.clone(),
        }
    }

    fn validate(&self) -> Result<ResourcePayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        let title = self.title.trim();
        if title.is_empty() {
            errors.insert("title", "Title is required");
        } else if title.chars().count() > MAX_TITLE_CHARS {
            errors.insert("title", "Title must be 200 characters or less");
        }

        let url = self.url.trim();
        if url.is_empty() {
            errors.insert("url", "URL is required");
        } else if Url::parse(url).is_err() {
            errors.insert("url", "Please enter a valid URL");
        }

        require(&mut errors, "sectionId", &self.section_id, "Section is required");
        let order = parse_order(&mut errors, &self.order);

        errors.into_result(|| ResourcePayload {
            title: title.to_string(),
            url: url.to_string(),
            kind: self.kind,
            order,
            section_id: self.section_id.clone(),
        })
    }

    fn create_path(&self) -> String {
        format!("/api/sections/{}/resources", path_segment(&self.section_id))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceFilter {
    pub kind: Option<ResourceType>,
    pub search: String,
    pub section_id: Option<String>,
}

impl ResourceFilter {
    pub fn matches(&self, resource: &Resource) -> bool {
        if self.kind.is_some_and(|kind| kind != resource.kind) {
            return false;
        }
        if self
            .section_id
            .as_deref()
            .is_some_and(|section| section != resource.section_id)
        {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty() || resource.title.to_lowercase().contains(&needle)
    }
}

pub fn filter_resources<'a>(resources: &'a [Resource], filter: &ResourceFilter) -> Vec<&'a Resource> {
    resources
        .iter()
        .filter(|resource| filter.matches(resource))
        .collect()
}

/// Buckets resources by section, each bucket in display order.
pub fn group_by_section<'a>(
    resources: impl IntoIterator<Item = &'a Resource>,
) -> BTreeMap<&'a str, Vec<&'a Resource>> {
    let mut groups: BTreeMap<&str, Vec<&Resource>> = BTreeMap::new();
    for resource in resources {
        groups
            .entry(resource.section_id.as_str())
            .or_default()
            .push(resource);
    }
    for members in groups.values_mut() {
        members.sort_by_key(|resource| resource.order);
    }
    groups
}

/// Collapse state per section group. Sections never toggled are expanded.
#[derive(Debug, Clone, Default)]
pub struct SectionExpansion(HashMap<String, bool>);

impl SectionExpansion {
    pub fn is_expanded(&self, section_id: &str) -> bool {
        self.0.get(section_id).copied().unwrap_or(true)
    }

    pub fn toggle(&mut self, section_id: &str) {
        let expanded = self.is_expanded(section_id);
        self.0.insert(section_id.to_string(), !expanded);
    }
}
