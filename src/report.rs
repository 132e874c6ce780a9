use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::due;
use crate::editors::specialization::LeagueOrder;
use crate::hierarchy;
use crate::models::{Cohort, Resource, ResourceType};
use crate::store::Lists;
use crate::users;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTypeSummary {
    pub kind: ResourceType,
    pub count: usize,
}

pub fn summarize_by_type<'a>(
    resources: impl IntoIterator<Item = &'a Resource>,
) -> Vec<ResourceTypeSummary> {
    let mut map: HashMap<ResourceType, usize> = HashMap::new();
    for resource in resources {
        *map.entry(resource.kind).or_insert(0) += 1;
    }

    let mut summaries: Vec<ResourceTypeSummary> = map
        .into_iter()
        .map(|(kind, count)| ResourceTypeSummary { kind, count })
        .collect();
    summaries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.kind.to_string().cmp(&b.kind.to_string()))
    });
    summaries
}

pub fn build_report(cohort: Option<&Cohort>, lists: &Lists, now: DateTime<Utc>) -> String {
    let mut output = String::new();
    let cohort_label = cohort.map_or("all cohorts", |c| c.name.as_str());
    let leagues = hierarchy::leagues_in(lists.leagues.as_slice(), cohort.map(|c| c.id.as_str()));

    let _ = writeln!(output, "# OpenLearn Content Report");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        cohort_label,
        now.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Leagues");

    let mut in_scope: Vec<&Resource> = Vec::new();
    if leagues.is_empty() {
        let _ = writeln!(output, "No leagues in this cohort.");
    }
    for league in &leagues {
        let weeks = hierarchy::weeks_in(lists.weeks.as_slice(), Some(league.id.as_str()));
        let _ = writeln!(output, "- {} ({} weeks)", league.name, weeks.len());
        for week in weeks {
            let sections = hierarchy::sections_in(lists.sections.as_slice(), Some(week.id.as_str()));
            let resource_count: usize = sections
                .iter()
                .map(|section| {
                    let members: Vec<&Resource> = lists
                        .resources
                        .as_slice()
                        .iter()
                        .filter(|r| r.section_id == section.id)
                        .collect();
                    let count = members.len();
                    in_scope.extend(members);
                    count
                })
                .sum();
            let _ = writeln!(
                output,
                "  - Week {}: {} ({} sections, {} resources)",
                week.order,
                week.name,
                sections.len(),
                resource_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Specializations");
    let specializations: Vec<_> = lists
        .specializations
        .as_slice()
        .iter()
        .filter(|s| cohort.map_or(true, |c| s.cohort_id == c.id))
        .collect();
    if specializations.is_empty() {
        let _ = writeln!(output, "No specializations defined.");
    }
    for specialization in specializations {
        let ordering = LeagueOrder::from_api(&specialization.leagues);
        let names: Vec<&str> = ordering
            .entries()
            .iter()
            .map(|entry| {
                lists
                    .leagues
                    .get(&entry.league_id)
                    .map_or(entry.league_id.as_str(), |league| league.name.as_str())
            })
            .collect();
        let _ = writeln!(
            output,
            "- {}: {}",
            specialization.name,
            if ordering.is_empty() {
                "no leagues".to_string()
            } else {
                names.join(" → ")
            }
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Resource Mix");
    let mix = summarize_by_type(in_scope);
    if mix.is_empty() {
        let _ = writeln!(output, "No resources recorded.");
    }
    for summary in mix {
        let _ = writeln!(output, "- {}: {}", summary.kind, summary.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Assignment Deadlines");
    let assignments: Vec<_> = lists
        .assignments
        .as_slice()
        .iter()
        .filter(|a| leagues.iter().any(|league| league.id == a.league_id))
        .cloned()
        .collect();
    let deadlines = due::summarize_due(&assignments, now);
    if deadlines.is_empty() {
        let _ = writeln!(output, "No assignments loaded.");
    }
    for summary in deadlines {
        let _ = writeln!(
            output,
            "- {}: {} assignments ({} submissions)",
            summary.status, summary.count, summary.submissions
        );
    }

    if !lists.users.is_empty() {
        let counts = users::count_by_status(lists.users.as_slice());
        let _ = writeln!(output);
        let _ = writeln!(output, "## Members");
        let _ = writeln!(
            output,
            "{} members: {} pending, {} active, {} suspended",
            counts.total, counts.pending, counts.active, counts.suspended
        );
    }

    output
}
