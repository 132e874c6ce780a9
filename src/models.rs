use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Anything the API hands back with a stable id.
pub trait Entity: Clone {
    fn id(&self) -> &str;

    /// Human label used in prompts and log lines.
    fn label(&self) -> &str;
}

/// Percent-encodes `id` as a single URL path segment, so `/` and `?` in an
/// id cannot escape into the rest of the path.
pub fn path_segment(id: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return id.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(id);
    }
    url.path().trim_start_matches('/').to_string()
}

/// An entity that lives under a REST collection such as `/api/cohorts`.
pub trait Collection: Entity + serde::de::DeserializeOwned {
    const PATH: &'static str;
    const KIND: &'static str;

    fn member_path(id: &str) -> String {
        format!("{}/{}", Self::PATH, path_segment(id))
    }

    fn delete_warning(&self) -> String {
        format!("Delete {} \"{}\"?", Self::KIND, self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cohort {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cohort_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// One league slot inside a specialization. The API returns either a flat
/// `leagueId` or a nested `league` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecializationLeague {
    #[serde(default)]
    pub league_id: Option<String>,
    #[serde(default)]
    pub league: Option<LeagueRef>,
    #[serde(default)]
    pub order: i64,
}

impl SpecializationLeague {
    pub fn resolved_league_id(&self) -> Option<&str> {
        self.league_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.league.as_ref().map(|league| league.id.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cohort_id: String,
    #[serde(default)]
    pub leagues: Vec<SpecializationLeague>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub order: i64,
    pub league_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub order: i64,
    pub week_id: String,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    #[default]
    Video,
    Article,
    ExternalLink,
    Blog,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "VIDEO",
            Self::Article => "ARTICLE",
            Self::ExternalLink => "EXTERNAL_LINK",
            Self::Blog => "BLOG",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub order: i64,
    pub section_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionUser {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user: Option<SubmissionUser>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub league_id: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Pioneer,
    Pathfinder,
    ChiefPathfinder,
    GrandPathfinder,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pioneer => "PIONEER",
            Self::Pathfinder => "PATHFINDER",
            Self::ChiefPathfinder => "CHIEF_PATHFINDER",
            Self::GrandPathfinder => "GRAND_PATHFINDER",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Pending,
    Active,
    Suspended,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

macro_rules! entity {
    ($ty:ty, $label:ident) => {
        impl Entity for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn label(&self) -> &str {
                &self.$label
            }
        }
    };
}

entity!(Cohort, name);
entity!(League, name);
entity!(Specialization, name);
entity!(Week, name);
entity!(Section, name);
entity!(Resource, title);
entity!(Assignment, title);
entity!(User, email);

impl Collection for Cohort {
    const PATH: &'static str = "/api/cohorts";
    const KIND: &'static str = "cohort";

    fn delete_warning(&self) -> String {
        format!(
            "Delete cohort \"{}\"? Its leagues, specializations and enrollments are removed too.",
            self.name
        )
    }
}

impl Collection for League {
    const PATH: &'static str = "/api/leagues";
    const KIND: &'static str = "league";
}

impl Collection for Specialization {
    const PATH: &'static str = "/api/specializations";
    const KIND: &'static str = "specialization";
}

impl Collection for Week {
    const PATH: &'static str = "/api/weeks";
    const KIND: &'static str = "week";
}

impl Collection for Section {
    const PATH: &'static str = "/api/sections";
    const KIND: &'static str = "section";

    fn delete_warning(&self) -> String {
        format!(
            "Delete section \"{}\"? All of its resources and learner progress are removed too.",
            self.name
        )
    }
}

impl Collection for Resource {
    const PATH: &'static str = "/api/resources";
    const KIND: &'static str = "resource";
}

impl Collection for Assignment {
    const PATH: &'static str = "/api/assignments";
    const KIND: &'static str = "assignment";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specialization_league_accepts_both_shapes() {
        let flat: SpecializationLeague =
            serde_json::from_str(r#"{"leagueId":"lg-1","order":2}"#).unwrap();
        let nested: SpecializationLeague =
            serde_json::from_str(r#"{"league":{"id":"lg-2","name":"Finance"},"order":1}"#)
                .unwrap();
        let empty: SpecializationLeague = serde_json::from_str(r#"{"order":3}"#).unwrap();

        assert_eq!(flat.resolved_league_id(), Some("lg-1"));
        assert_eq!(nested.resolved_league_id(), Some("lg-2"));
        assert_eq!(empty.resolved_league_id(), None);
    }

    #[test]
    fn member_path_encodes_reserved_characters() {
        assert_eq!(Cohort::member_path("c-7"), "/api/cohorts/c-7");
        assert_eq!(Cohort::member_path("a b/c?d"), "/api/cohorts/a%20b%2Fc%3Fd");
    }

    #[test]
    fn resource_type_uses_wire_names() {
        let resource: Resource = serde_json::from_str(
            r#"{"id":"r1","title":"Intro","url":"https://a.io","type":"EXTERNAL_LINK","order":1,"sectionId":"s1"}"#,
        )
        .unwrap();
        assert_eq!(resource.kind, ResourceType::ExternalLink);
        assert_eq!(resource.kind.to_string(), "EXTERNAL_LINK");
    }

    #[test]
    fn section_delete_warns_about_cascade() {
        let section = Section {
            id: "s1".to_string(),
            name: "Basics".to_string(),
            description: None,
            order: 1,
            week_id: "w1".to_string(),
        };
        assert!(section.delete_warning().contains("resources"));
        assert_eq!(Section::member_path("s1"), "/api/sections/s1");
    }
}
