//! One draft type per admin tab. Each draft mirrors the editable fields of its
//! entity and validates them into the JSON payload the API expects.

pub mod assignment;
pub mod cohort;
pub mod league;
pub mod resource;
pub mod section;
pub mod specialization;
pub mod week;
