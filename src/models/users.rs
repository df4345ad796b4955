use serde_json::{Map, Value};

use super::parsers::{parse_non_neg_int, parse_username, ValidationError};
use super::{field, impl_serialize_via_object, non_empty, Model};

/// The assignee identity supplied by the identity-lookup collaborator; the
/// user side of a set merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedUser {
    pub(crate) user_id: i64,
    pub(crate) course_user_id: i64,
    pub(crate) username: String,
}

impl MergedUser {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut user = Self::default();
        user.set(params)?;
        Ok(user)
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn course_user_id(&self) -> i64 {
        self.course_user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl Model for MergedUser {
    fn all_field_names(&self) -> &'static [&'static str] {
        &["user_id", "course_user_id", "username"]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "user_id") {
            self.user_id = parse_non_neg_int(v).map_err(|e| e.in_field("user_id"))?;
        }
        if let Some(v) = field(params, "course_user_id") {
            self.course_user_id =
                parse_non_neg_int(v).map_err(|e| e.in_field("course_user_id"))?;
        }
        if let Some(v) = non_empty(params, "username") {
            self.username = parse_username(v).map_err(|e| e.in_field("username"))?;
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        map.insert("user_id".to_string(), self.user_id.into());
        map.insert("course_user_id".to_string(), self.course_user_id.into());
        map.insert("username".to_string(), Value::String(self.username.clone()));
        Value::Object(map)
    }
}

impl_serialize_via_object!(MergedUser);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_from_an_identity_record() {
        let user = MergedUser::new(&json!({
            "user_id": "30",
            "course_user_id": 77,
            "username": "bart"
        }))
        .expect("parse");
        assert_eq!(user.user_id(), 30);
        assert_eq!(user.course_user_id(), 77);
        assert_eq!(user.username(), "bart");
    }

    #[test]
    fn rejects_malformed_usernames() {
        assert!(MergedUser::new(&json!({ "username": "9lives" })).is_err());
    }

    #[test]
    fn roundtrips_through_its_snapshot() {
        let user = MergedUser::new(&json!({
            "user_id": 1,
            "course_user_id": 2,
            "username": "marge@springfield.edu"
        }))
        .expect("parse");
        assert_eq!(MergedUser::new(&user.to_object()).expect("rebuild"), user);
    }
}
