//! The admin page: owns every list, the drill-down selection and the single
//! page-level error string. Editors never touch the lists directly.

use tracing::{info, warn};

use crate::api::{ApiClient, Transport};
use crate::error::{ApiError, EditorError};
use crate::form::{Draft, Editor, Submission};
use crate::hierarchy::{self, Selection};
use crate::models::{
    Assignment, Cohort, Collection, Entity, League, Resource, Role, Section, Specialization,
    User, UserStatus, Week,
};
use crate::users;

#[derive(Debug, Clone)]
pub struct EntityList<E> {
    items: Vec<E>,
}

impl<E> Default for EntityList<E> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<E: Entity> EntityList<E> {
    pub fn as_slice(&self) -> &[E] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn replace_all(&mut self, items: Vec<E>) {
        self.items = items;
    }

    pub fn append(&mut self, item: E) {
        self.items.push(item);
    }

    pub fn replace(&mut self, item: E) {
        if let Some(slot) = self.items.iter_mut().find(|slot| slot.id() == item.id()) {
            *slot = item;
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.items.retain(|item| item.id() != id);
    }
}

/// Lists held by the admin page.
#[derive(Debug, Clone, Default)]
pub struct Lists {
    pub cohorts: EntityList<Cohort>,
    pub leagues: EntityList<League>,
    pub specializations: EntityList<Specialization>,
    pub weeks: EntityList<Week>,
    pub sections: EntityList<Section>,
    pub resources: EntityList<Resource>,
    pub assignments: EntityList<Assignment>,
    pub users: EntityList<User>,
}

pub trait HasList<E> {
    fn list_mut(&mut self) -> &mut EntityList<E>;
    fn list(&self) -> &EntityList<E>;
}

macro_rules! has_list {
    ($ty:ty, $field:ident) => {
        impl HasList<$ty> for Lists {
            fn list_mut(&mut self) -> &mut EntityList<$ty> {
                &mut self.$field
            }

            fn list(&self) -> &EntityList<$ty> {
                &self.$field
            }
        }
    };
}

has_list!(Cohort, cohorts);
has_list!(League, leagues);
has_list!(Specialization, specializations);
has_list!(Week, weeks);
has_list!(Section, sections);
has_list!(Resource, resources);
has_list!(Assignment, assignments);
has_list!(User, users);

pub struct AdminPage<T> {
    api: ApiClient<T>,
    pub lists: Lists,
    pub selection: Selection,
    error: Option<String>,
}

impl<T: Transport> AdminPage<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            lists: Lists::default(),
            selection: Selection::default(),
            error: None,
        }
    }

    #[cfg(test)]
    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    /// The banner shown for the last failed request.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn record<R>(&mut self, result: Result<R, ApiError>) -> Result<R, ApiError> {
        match &result {
            Ok(_) => self.error = None,
            Err(err) => {
                warn!(error = %err, "admin request failed");
                self.error = Some(err.to_string());
            }
        }
        result
    }

    pub async fn load<E>(&mut self) -> Result<usize, ApiError>
    where
        E: Collection,
        Lists: HasList<E>,
    {
        let fetched = self.api.list::<E>().await;
        let items = self.record(fetched)?;
        let count = items.len();
        HasList::<E>::list_mut(&mut self.lists).replace_all(items);
        Ok(count)
    }

    /// Fetches the resources of the given sections one after another.
    pub async fn load_resources(&mut self, section_ids: &[String]) -> Result<usize, ApiError> {
        let mut resources = Vec::new();
        for section_id in section_ids {
            let fetched = self.api.section_resources(section_id).await;
            resources.extend(self.record(fetched)?);
        }
        let count = resources.len();
        self.lists.resources.replace_all(resources);
        Ok(count)
    }

    pub async fn load_assignments(&mut self, league_ids: &[String]) -> Result<usize, ApiError> {
        let mut assignments = Vec::new();
        for league_id in league_ids {
            let fetched = self.api.league_assignments(league_id).await;
            assignments.extend(self.record(fetched)?);
        }
        let count = assignments.len();
        self.lists.assignments.replace_all(assignments);
        Ok(count)
    }

    pub async fn load_users(&mut self) -> Result<usize, ApiError> {
        let fetched = self.api.users().await;
        let users = self.record(fetched)?;
        let count = users.len();
        self.lists.users.replace_all(users);
        Ok(count)
    }

    /// Sends the open form. On success the list gains or replaces the entity
    /// and the form closes; on failure the list is untouched and the form
    /// stays open with its draft.
    pub async fn submit<D>(&mut self, editor: &mut Editor<D>) -> Result<D::Entity, EditorError>
    where
        D: Draft,
        Lists: HasList<D::Entity>,
    {
        let submission = editor.begin_submit()?;
        let result = match &submission {
            Submission::Create { path, payload } => {
                self.api.create::<D::Entity>(path, payload).await
            }
            Submission::Update { id, payload } => {
                self.api.update::<D::Entity>(id, payload).await
            }
        };
        editor.finish_submit(result.is_ok());
        let entity = self.record(result)?;

        let kind = <D::Entity as Collection>::KIND;
        let list = HasList::<D::Entity>::list_mut(&mut self.lists);
        match submission {
            Submission::Create { .. } => {
                info!(kind, id = entity.id(), "created");
                list.append(entity.clone());
            }
            Submission::Update { .. } => {
                info!(kind, id = entity.id(), "updated");
                list.replace(entity.clone());
            }
        }
        Ok(entity)
    }

    /// Deletes after `confirm` accepts the warning text. Returns false when
    /// the user declined, in which case nothing was sent.
    pub async fn delete<E>(
        &mut self,
        id: &str,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<bool, ApiError>
    where
        E: Collection,
        Lists: HasList<E>,
    {
        let warning = match HasList::<E>::list(&self.lists).get(id) {
            Some(entity) => entity.delete_warning(),
            None => return Err(ApiError::NotFound(format!("{} {id}", E::KIND))),
        };
        if !confirm(&warning) {
            return Ok(false);
        }

        let result = self.api.delete::<E>(id).await;
        self.record(result)?;
        HasList::<E>::list_mut(&mut self.lists).remove(id);
        self.selection.forget(id);
        info!(kind = E::KIND, id, "deleted");
        Ok(true)
    }

    fn visible_user(&self, user_id: &str) -> Result<&User, ApiError> {
        self.lists
            .users
            .get(user_id)
            .filter(|user| users::is_visible(user))
            .ok_or_else(|| ApiError::NotFound(format!("user {user_id}")))
    }

    pub async fn approve_user(&mut self, user_id: &str) -> Result<User, ApiError> {
        self.visible_user(user_id)?;
        let result = self.api.approve_user(user_id).await;
        self.record(result)?;
        self.patch_user(user_id, |user| user.status = UserStatus::Active)
    }

    pub async fn update_role(&mut self, user_id: &str, role: Role) -> Result<User, ApiError> {
        self.visible_user(user_id)?;
        let result = self.api.update_role(user_id, role).await;
        self.record(result)?;
        self.patch_user(user_id, |user| user.role = role)
    }

    pub async fn update_status(
        &mut self,
        user_id: &str,
        status: UserStatus,
    ) -> Result<User, ApiError> {
        self.visible_user(user_id)?;
        let result = self.api.update_status(user_id, status).await;
        self.record(result)?;
        self.patch_user(user_id, |user| user.status = status)
    }

    fn patch_user(
        &mut self,
        user_id: &str,
        change: impl FnOnce(&mut User),
    ) -> Result<User, ApiError> {
        let mut user = self.visible_user(user_id)?.clone();
        change(&mut user);
        info!(id = user_id, role = %user.role, status = %user.status, "user updated");
        self.lists.users.replace(user.clone());
        Ok(user)
    }

    pub fn weeks_for_selection(&self) -> Vec<&Week> {
        hierarchy::weeks_in(self.lists.weeks.as_slice(), self.selection.league_id())
    }

    /// Sections whose resources the current selection shows. A selected
    /// section narrows this to just that section.
    pub fn resource_section_ids(&self) -> Vec<String> {
        match self.selection.section_id() {
            Some(section_id) => vec![section_id.to_string()],
            None => self
                .sections_for_selection()
                .into_iter()
                .map(|section| section.id.clone())
                .collect(),
        }
    }

    pub fn sections_for_selection(&self) -> Vec<&Section> {
        let weeks = self.weeks_for_selection();
        match self.selection.week_id() {
            Some(week_id) => hierarchy::sections_in(self.lists.sections.as_slice(), Some(week_id)),
            None if self.selection.league_id().is_some() => {
                hierarchy::sections_in(self.lists.sections.as_slice(), None)
                    .into_iter()
                    .filter(|section| weeks.iter().any(|week| week.id == section.week_id))
                    .collect()
            }
            None => hierarchy::sections_in(self.lists.sections.as_slice(), None),
        }
    }
}
