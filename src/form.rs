//! Create/edit form state shared by every admin editor.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::EditorError;
use crate::models::{Collection, Entity};

/// Which form, if any, is open. Creating and editing can never be active at
/// the same time.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode<E> {
    Closed,
    Creating,
    Editing(E),
}

impl<E> Mode<E> {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    #[cfg(test)]
    pub fn is_creating(&self) -> bool {
        matches!(self, Self::Creating)
    }

    #[cfg(test)]
    pub fn editing(&self) -> Option<&E> {
        match self {
            Self::Editing(entity) => Some(entity),
            _ => None,
        }
    }
}

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, message)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Editable mirror of an entity.
pub trait Draft: Default + Clone {
    type Entity: Collection;
    type Payload: Serialize;

    fn from_entity(entity: &Self::Entity) -> Self;

    fn validate(&self) -> Result<Self::Payload, FieldErrors>;

    /// Collection path new entities are POSTed to.
    fn create_path(&self) -> String {
        <Self::Entity as Collection>::PATH.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission<P> {
    Create { path: String, payload: P },
    Update { id: String, payload: P },
}

pub struct Editor<D: Draft> {
    mode: Mode<D::Entity>,
    pub draft: D,
    errors: FieldErrors,
    pending: bool,
}

impl<D: Draft> Default for Editor<D> {
    fn default() -> Self {
        Self {
            mode: Mode::Closed,
            draft: D::default(),
            errors: FieldErrors::default(),
            pending: false,
        }
    }
}

impl<D: Draft> Editor<D> {
    #[cfg(test)]
    pub fn mode(&self) -> &Mode<D::Entity> {
        &self.mode
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    #[cfg(test)]
    pub fn start_create(&mut self) {
        self.start_create_with(D::default());
    }

    /// Open the create form with some fields prefilled, such as the parent
    /// picked in the current selection.
    pub fn start_create_with(&mut self, draft: D) {
        self.mode = Mode::Creating;
        self.draft = draft;
        self.errors = FieldErrors::default();
    }

    pub fn start_edit(&mut self, entity: &D::Entity) {
        self.draft = D::from_entity(entity);
        self.mode = Mode::Editing(entity.clone());
        self.errors = FieldErrors::default();
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    pub fn begin_submit(&mut self) -> Result<Submission<D::Payload>, EditorError> {
        if !self.mode.is_open() {
            return Err(EditorError::NotOpen);
        }
        if self.pending {
            return Err(EditorError::InFlight);
        }
        let payload = match self.draft.validate() {
            Ok(payload) => payload,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(EditorError::Invalid(errors));
            }
        };
        let submission = match &self.mode {
            Mode::Closed => return Err(EditorError::NotOpen),
            Mode::Creating => Submission::Create {
                path: self.draft.create_path(),
                payload,
            },
            Mode::Editing(entity) => Submission::Update {
                id: entity.id().to_string(),
                payload,
            },
        };
        self.errors = FieldErrors::default();
        self.pending = true;
        Ok(submission)
    }

    pub fn finish_submit(&mut self, succeeded: bool) {
        self.pending = false;
        if succeeded {
            self.cancel();
        }
    }
}

pub fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

/// Parses a user-entered display order, which must be an integer of at least 1.
pub fn parse_order(errors: &mut FieldErrors, value: &str) -> i64 {
    match value.trim().parse::<i64>() {
        Ok(order) if order >= 1 => order,
        _ => {
            errors.insert("order", "Order must be a positive integer");
            0
        }
    }
}

pub fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editors::cohort::CohortDraft;
    use crate::models::Cohort;

    fn cohort() -> Cohort {
        Cohort {
            id: "c1".to_string(),
            name: "Spring 2026".to_string(),
            description: None,
            is_active: true,
        }
    }

    fn assert_exclusive(editor: &Editor<CohortDraft>) {
        let creating = editor.mode().is_creating();
        let editing = editor.mode().editing().is_some();
        assert!(!(creating && editing));
    }

    #[test]
    fn modes_stay_exclusive_across_transitions() {
        let mut editor = Editor::<CohortDraft>::default();
        let entity = cohort();

        editor.start_create();
        assert_exclusive(&editor);
        assert!(editor.mode().is_creating());

        editor.start_edit(&entity);
        assert_exclusive(&editor);
        assert_eq!(editor.mode().editing(), Some(&entity));

        editor.start_create();
        assert_exclusive(&editor);
        assert!(editor.mode().editing().is_none());

        editor.cancel();
        assert!(!editor.mode().is_open());
    }

    #[test]
    fn edit_prefills_draft_from_entity() {
        let mut editor = Editor::<CohortDraft>::default();
        editor.start_edit(&cohort());
        assert_eq!(editor.draft.name, "Spring 2026");
        assert!(editor.draft.is_active);
    }

    #[test]
    fn submit_requires_open_form() {
        let mut editor = Editor::<CohortDraft>::default();
        editor.draft.name = "Fall".to_string();
        assert!(matches!(editor.begin_submit(), Err(EditorError::NotOpen)));
    }

    #[test]
    fn pending_submission_blocks_second_submit() {
        let mut editor = Editor::<CohortDraft>::default();
        editor.start_create();
        editor.draft.name = "Fall".to_string();

        assert!(editor.begin_submit().is_ok());
        assert!(matches!(editor.begin_submit(), Err(EditorError::InFlight)));

        editor.finish_submit(false);
        assert!(editor.mode().is_creating());
        assert!(editor.begin_submit().is_ok());
    }

    #[test]
    fn validation_failure_records_field_errors() {
        let mut editor = Editor::<CohortDraft>::default();
        editor.start_create();
        let result = editor.begin_submit();
        assert!(matches!(result, Err(EditorError::Invalid(_))));
        assert_eq!(editor.errors().get("name"), Some("Name is required"));
        assert!(!editor.is_pending());
    }

    #[test]
    fn order_must_be_positive_integer() {
        let mut errors = FieldErrors::default();
        assert_eq!(parse_order(&mut errors, "3"), 3);
        assert!(errors.is_empty());

        for input in ["0", "-2", "1.5", "abc", ""] {
            let mut errors = FieldErrors::default();
            parse_order(&mut errors, input);
            assert_eq!(errors.get("order"), Some("Order must be a positive integer"));
        }
    }
}
