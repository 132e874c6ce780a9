//! Drill-down selection shared by the week, section and resource tabs.

use crate::models::{League, Section, Week};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    league_id: Option<String>,
    week_id: Option<String>,
    section_id: Option<String>,
}

impl Selection {
    pub fn league_id(&self) -> Option<&str> {
        self.league_id.as_deref()
    }

    pub fn week_id(&self) -> Option<&str> {
        self.week_id.as_deref()
    }

    pub fn section_id(&self) -> Option<&str> {
        self.section_id.as_deref()
    }

    /// Changing the league invalidates the week and section below it.
    pub fn select_league(&mut self, league_id: Option<String>) {
        if self.league_id != league_id {
            self.week_id = None;
            self.section_id = None;
        }
        self.league_id = league_id;
    }

    pub fn select_week(&mut self, week_id: Option<String>) {
        if self.week_id != week_id {
            self.section_id = None;
        }
        self.week_id = week_id;
    }

    pub fn select_section(&mut self, section_id: Option<String>) {
        self.section_id = section_id;
    }

    /// Drops a deleted entity from the selection, along with everything under it.
    pub fn forget(&mut self, id: &str) {
        if self.league_id.as_deref() == Some(id) {
            self.select_league(None);
        } else if self.week_id.as_deref() == Some(id) {
            self.select_week(None);
        } else if self.section_id.as_deref() == Some(id) {
            self.select_section(None);
        }
    }
}

pub fn leagues_in<'a>(leagues: &'a [League], cohort_id: Option<&str>) -> Vec<&'a League> {
    leagues
        .iter()
        .filter(|league| cohort_id.map_or(true, |id| league.cohort_id == id))
        .collect()
}

pub fn weeks_in<'a>(weeks: &'a [Week], league_id: Option<&str>) -> Vec<&'a Week> {
    let mut matching: Vec<&Week> = weeks
        .iter()
        .filter(|week| league_id.map_or(true, |id| week.league_id == id))
        .collect();
    matching.sort_by_key(|week| week.order);
    matching
}

pub fn sections_in<'a>(sections: &'a [Section], week_id: Option<&str>) -> Vec<&'a Section> {
    let mut matching: Vec<&Section> = sections
        .iter()
        .filter(|section| week_id.map_or(true, |id| section.week_id == id))
        .collect();
    matching.sort_by_key(|section| section.order);
    matching
}

/// Ids of every section that sits under one of `leagues`.
pub fn section_ids_under(leagues: &[&League], weeks: &[Week], sections: &[Section]) -> Vec<String> {
    leagues
        .iter()
        .flat_map(|league| weeks_in(weeks, Some(league.id.as_str())))
        .flat_map(|week| sections_in(sections, Some(week.id.as_str())))
        .map(|section| section.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week(id: &str, league: &str, order: i64) -> Week {
        Week {
            id: id.to_string(),
            name: format!("Week {order}"),
            description: None,
            order,
            league_id: league.to_string(),
        }
    }

    #[test]
    fn changing_league_clears_lower_levels() {
        let mut selection = Selection::default();
        selection.select_league(Some("lg-1".to_string()));
        selection.select_week(Some("w-1".to_string()));
        selection.select_section(Some("s-1".to_string()));

        selection.select_league(Some("lg-1".to_string()));
        assert_eq!(selection.section_id(), Some("s-1"));

        selection.select_league(Some("lg-2".to_string()));
        assert_eq!(selection.league_id(), Some("lg-2"));
        assert_eq!(selection.week_id(), None);
        assert_eq!(selection.section_id(), None);
    }

    #[test]
    fn changing_week_clears_section_only() {
        let mut selection = Selection::default();
        selection.select_league(Some("lg-1".to_string()));
        selection.select_week(Some("w-1".to_string()));
        selection.select_section(Some("s-1".to_string()));
        selection.select_week(Some("w-2".to_string()));
        assert_eq!(selection.league_id(), Some("lg-1"));
        assert_eq!(selection.section_id(), None);
    }

    #[test]
    fn forgetting_a_week_keeps_the_league() {
        let mut selection = Selection::default();
        selection.select_league(Some("lg-1".to_string()));
        selection.select_week(Some("w-1".to_string()));
        selection.forget("w-1");
        assert_eq!(selection.league_id(), Some("lg-1"));
        assert_eq!(selection.week_id(), None);
    }

    #[test]
    fn weeks_filter_by_league_in_order() {
        let weeks = vec![week("w2", "a", 2), week("w1", "a", 1), week("w3", "b", 1)];
        let ids: Vec<&str> = weeks_in(&weeks, Some("a")).iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["w1", "w2"]);
        assert_eq!(weeks_in(&weeks, None).len(), 3);
    }

    #[test]
    fn section_ids_follow_leagues_through_weeks() {
        let league = |id: &str| League {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            cohort_id: "c1".to_string(),
        };
        let section = |id: &str, week: &str, order: i64| Section {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            order,
            week_id: week.to_string(),
        };
        let in_cohort = league("a");
        let weeks = vec![week("w1", "a", 1), week("w2", "a", 2), week("w3", "b", 1)];
        let sections = vec![
            section("s2", "w1", 2),
            section("s1", "w1", 1),
            section("s3", "w2", 1),
            section("s4", "w3", 1),
        ];

        let ids = section_ids_under(&[&in_cohort], &weeks, &sections);
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
        assert!(section_ids_under(&[], &weeks, &sections).is_empty());
    }
}
