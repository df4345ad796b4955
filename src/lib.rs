//! Domain models for an online assignment platform: loosely-typed records from
//! the server are coerced into validated entities, and canonical assignments
//! are combined with per-student overrides into merged views for grading and
//! display.

pub mod merge;
pub mod models;

pub use merge::{merge_user_problem, merge_user_set, MergeError};
pub use models::{Model, ValidationError};
