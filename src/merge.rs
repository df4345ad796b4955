//! Combines a canonical definition with a per-student override into the
//! merged view consumed by grading and display. Overrides are left-biased:
//! a key present in the override wins, an absent key keeps the base value.

use log::{debug, warn};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{
    parse_merged_user_set, MergedUser, MergedUserProblem, MergedUserSet, Model, ProblemSet,
    SetProblem, UserProblem, UserSet, ValidationError,
};

/// Raised when records asserted to describe the same logical entity fail
/// their relational-key check. Distinct from `ValidationError`: the inputs
/// are well formed, they just do not belong together.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeError {
    #[error("the user set does not belong to the problem set")]
    SetMismatch,
    #[error("the user set and the problem set disagree on the set type")]
    SetTypeMismatch,
    #[error("the user set does not belong to the assignee")]
    AssigneeMismatch,
    #[error("the user problem does not belong to the set problem")]
    ProblemMismatch,
    #[error("the user problem does not belong to the user set")]
    UserSetMismatch,
    #[error("merged record failed validation: {0}")]
    InvalidRecord(#[from] ValidationError),
}

// Left-biased field-wise substitution over two plain param/date objects.
fn overlay(base: Value, overrides: Value) -> Value {
    let mut merged = match base {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Value::Object(overrides) = overrides {
        for (key, value) in overrides {
            if !value.is_null() {
                merged.insert(key, value);
            }
        }
    }
    Value::Object(merged)
}

/// Merge a canonical set, a per-student override, and the assignee identity
/// into a `MergedUserSet`. The inputs must be related by their keys;
/// otherwise a `MergeError` is raised and no partial merge is produced.
pub fn merge_user_set(
    set: &ProblemSet,
    user_set: &UserSet,
    user: &MergedUser,
) -> Result<MergedUserSet, MergeError> {
    if set.set_id() != user_set.set_id() {
        warn!(
            "refusing to merge user set {} into set {}: set ids differ",
            user_set.user_set_id(),
            set.set_id()
        );
        return Err(MergeError::SetMismatch);
    }
    if set.set_type() != user_set.set_type() {
        warn!(
            "refusing to merge user set {}: override is {} but set {} is {}",
            user_set.user_set_id(),
            user_set.set_type(),
            set.set_id(),
            set.set_type()
        );
        return Err(MergeError::SetTypeMismatch);
    }
    if user_set.course_user_id() != user.course_user_id() {
        warn!(
            "refusing to merge user set {}: it belongs to course user {}, not {}",
            user_set.user_set_id(),
            user_set.course_user_id(),
            user.course_user_id()
        );
        return Err(MergeError::AssigneeMismatch);
    }

    let mut merged = Map::new();
    merged.insert("user_id".to_string(), user.user_id().into());
    merged.insert("course_user_id".to_string(), user.course_user_id().into());
    merged.insert(
        "username".to_string(),
        Value::String(user.username().to_string()),
    );
    merged.insert("set_id".to_string(), set.set_id().into());
    merged.insert(
        "set_name".to_string(),
        Value::String(set.set_name().to_string()),
    );
    merged.insert(
        "set_type".to_string(),
        Value::String(set.set_type().as_str().to_string()),
    );
    merged.insert("user_set_id".to_string(), user_set.user_set_id().into());
    merged.insert("set_visible".to_string(), user_set.set_visible().into());
    merged.insert("set_version".to_string(), user_set.set_version().into());
    merged.insert(
        "set_params".to_string(),
        overlay(set.set_params_object(), user_set.set_params_object()),
    );
    merged.insert(
        "set_dates".to_string(),
        overlay(set.set_dates_object(), user_set.set_dates_object()),
    );

    debug!(
        "merged set {} for {} ({})",
        set.set_id(),
        user.username(),
        set.set_type()
    );
    Ok(parse_merged_user_set(&Value::Object(merged))?)
}

/// Merge a set problem, a per-student problem, and the student's merged set
/// into a `MergedUserProblem`. The identical contract keyed on
/// `(problem_id, user_set_id)` instead of `(set_id, course_user_id)`.
pub fn merge_user_problem(
    set_problem: &SetProblem,
    user_problem: &UserProblem,
    user_set: &MergedUserSet,
) -> Result<MergedUserProblem, MergeError> {
    if set_problem.problem_id() != user_problem.problem_id() {
        warn!(
            "refusing to merge user problem {}: problem ids {} and {} differ",
            user_problem.user_problem_id(),
            set_problem.problem_id(),
            user_problem.problem_id()
        );
        return Err(MergeError::ProblemMismatch);
    }
    if user_set.user_set_id() != user_problem.user_set_id() {
        warn!(
            "refusing to merge user problem {}: it belongs to user set {}, not {}",
            user_problem.user_problem_id(),
            user_problem.user_set_id(),
            user_set.user_set_id()
        );
        return Err(MergeError::UserSetMismatch);
    }

    let mut merged = Map::new();
    merged.insert("problem_id".to_string(), user_problem.problem_id().into());
    merged.insert(
        "user_problem_id".to_string(),
        user_problem.user_problem_id().into(),
    );
    merged.insert("user_id".to_string(), user_set.user_id().into());
    merged.insert("set_id".to_string(), user_set.set_id().into());
    merged.insert("user_set_id".to_string(), user_set.user_set_id().into());
    merged.insert(
        "username".to_string(),
        Value::String(user_set.username().to_string()),
    );
    merged.insert(
        "set_name".to_string(),
        Value::String(user_set.set_name().to_string()),
    );
    merged.insert(
        "problem_version".to_string(),
        user_problem.problem_version().into(),
    );
    merged.insert(
        "problem_number".to_string(),
        set_problem.problem_number().into(),
    );
    merged.insert("status".to_string(), user_problem.status().into());
    merged.insert("seed".to_string(), user_problem.seed().into());
    merged.insert(
        "problem_params".to_string(),
        overlay(
            set_problem.problem_params().to_object(),
            user_problem.problem_params().to_object(),
        ),
    );

    debug!(
        "merged problem {} of set {} for {}",
        set_problem.problem_id(),
        user_set.set_id(),
        user_set.username()
    );
    Ok(MergedUserProblem::new(&Value::Object(merged))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overlay_is_left_biased() {
        let merged = overlay(
            json!({ "open": 1, "due": 10, "answer": 20 }),
            json!({ "due": 5, "extra": null }),
        );
        assert_eq!(merged, json!({ "open": 1, "due": 5, "answer": 20 }));
    }

    #[test]
    fn overlay_keeps_base_keys_absent_from_the_override() {
        let merged = overlay(json!({ "timed": true, "quiz_duration": 600 }), json!({}));
        assert_eq!(merged, json!({ "timed": true, "quiz_duration": 600 }));
    }
}
