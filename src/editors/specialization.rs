use serde::Serialize;

use crate::form::{optional_text, require, Draft, FieldErrors};
use crate::models::{Specialization, SpecializationLeague};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedLeague {
    pub league_id: String,
    pub order: u32,
}

/// The leagues picked for a specialization, in offering order. `order` is
/// always `1..=len` matching position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeagueOrder(Vec<OrderedLeague>);

impl LeagueOrder {
    /// Rebuilds the ordering from what the API returned, accepting both the
    /// flat `leagueId` and the nested `league.id` shape.
    pub fn from_api(leagues: &[SpecializationLeague]) -> Self {
        let mut picked: Vec<(i64, &str)> = leagues
            .iter()
            .filter_map(|entry| entry.resolved_league_id().map(|id| (entry.order, id)))
            .collect();
        picked.sort_by_key(|(order, _)| *order);

        let mut ordering = Self::default();
        for (_, league_id) in picked {
            ordering.add(league_id);
        }
        ordering
    }

    pub fn entries(&self) -> &[OrderedLeague] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, league_id: &str) -> Option<usize> {
        self.0.iter().position(|entry| entry.league_id == league_id)
    }

    pub fn contains(&self, league_id: &str) -> bool {
        self.position(league_id).is_some()
    }

    /// Checkbox handler.
    pub fn toggle(&mut self, league_id: &str, checked: bool) {
        if checked {
            self.add(league_id);
        } else {
            self.remove(league_id);
        }
    }

    pub fn add(&mut self, league_id: &str) {
        if self.contains(league_id) {
            return;
        }
        let order = self.next_order();
        self.0.push(OrderedLeague {
            league_id: league_id.to_string(),
            order,
        });
    }

    pub fn remove(&mut self, league_id: &str) {
        self.0.retain(|entry| entry.league_id != league_id);
        self.renumber();
    }

    /// Returns false when the entry is already first.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.0.len() {
            return false;
        }
        self.0.swap(index, index - 1);
        self.renumber();
        true
    }

    /// Returns false when the entry is already last.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.0.len() {
            return false;
        }
        self.0.swap(index, index + 1);
        self.renumber();
        true
    }

    fn next_order(&self) -> u32 {
        u32::try_from(self.0.len() + 1).unwrap_or(u32::MAX)
    }

    fn renumber(&mut self) {
        for (order, entry) in (1u32..).zip(self.0.iter_mut()) {
            entry.order = order;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecializationDraft {
    pub name: String,
    pub description: String,
    pub cohort_id: String,
    pub leagues: LeagueOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecializationPayload {
    pub name: String,
    pub description: Option<String>,
    pub cohort_id: String,
    pub leagues: Vec<OrderedLeague>,
}

impl Draft for SpecializationDraft {
    type Entity = Specialization;
    type Payload = SpecializationPayload;

    fn from_entity(specialization: &Specialization) -> Self {
        Self {
            name: specialization.name.clone(),
            description: specialization.description.clone().unwrap_or_default(),
            cohort_id: specialization.cohort_id.clone(),
            leagues: LeagueOrder::from_api(&specialization.leagues),
        }
    }

    fn validate(&self) -> Result<SpecializationPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "name", &self.name, "Name is required");
        require(&mut errors, "cohortId", &self.cohort_id, "Cohort is required");
        errors.into_result(|| SpecializationPayload {
            name: self.name.trim().to_string(),
            description: optional_text(&self.description),
            cohort_id: self.cohort_id.clone(),
            leagues: self.leagues.entries().to_vec(),
        })
    }
}
