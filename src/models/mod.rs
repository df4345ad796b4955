pub mod parsers;
pub mod problem_sets;
pub mod problems;
pub mod renderer;
pub mod user_sets;
pub mod users;

pub use parsers::{
    parse_boolean, parse_non_neg_decimal, parse_non_neg_int, parse_username, ValidationError,
};
pub use problem_sets::{
    parse_problem_set, HomeworkSet, HomeworkSetDates, HomeworkSetParams, ProblemSet, Quiz,
    QuizDates, QuizParams, ReviewSet, ReviewSetDates, ReviewSetParams, SetType,
};
pub use problems::{
    parse_problem, LibraryProblem, MergedUserProblem, Problem, ProblemKind, ProblemLocationParams,
    ProblemType, SetProblem, SetProblemParams, UserProblem,
};
pub use renderer::RenderParams;
pub use user_sets::{
    parse_merged_user_set, parse_user_set, MergedUserHomeworkSet, MergedUserQuiz,
    MergedUserReviewSet, MergedUserSet, UserHomeworkSet, UserQuiz, UserReviewSet, UserSet,
};
pub use users::MergedUser;

use serde_json::Value;

/// Contract shared by every entity: serializable field list, partial update
/// from a plain record, and a plain-record snapshot. `Clone` is a deep copy,
/// so mutating a clone never touches the original.
pub trait Model: Clone {
    /// Serializable field names, in record order. Each variant's list begins
    /// with its base hierarchy's list.
    fn all_field_names(&self) -> &'static [&'static str];

    /// The subset of `all_field_names` that serialize as nested objects.
    fn param_fields(&self) -> &'static [&'static str];

    /// Partial update: only keys present (and non-null) in `params` are
    /// applied, through the field coercions. Unknown keys are ignored.
    fn set(&mut self, params: &Value) -> Result<(), ValidationError>;

    /// Plain-record snapshot for transport. Absent optional fields are
    /// omitted, not serialized as null.
    fn to_object(&self) -> Value;
}

// A missing key and an explicit null both mean "absent" in incoming records.
pub(crate) fn field<'a>(params: &'a Value, key: &str) -> Option<&'a Value> {
    match params.get(key) {
        Some(Value::Null) | None => None,
        Some(v) => Some(v),
    }
}

// Name-like fields treat the empty string as absent as well.
pub(crate) fn non_empty<'a>(params: &'a Value, key: &str) -> Option<&'a Value> {
    field(params, key).filter(|v| !matches!(v, Value::String(s) if s.is_empty()))
}

// Entities serialize as the plain record `to_object` produces; construction
// has to run coercion, so there is intentionally no Deserialize counterpart.
macro_rules! impl_serialize_via_object {
    ($($ty:ty),+ $(,)?) => {$(
        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serde::Serialize::serialize(&crate::models::Model::to_object(self), serializer)
            }
        }
    )+};
}
pub(crate) use impl_serialize_via_object;
