use serde_json::{Map, Value};

use super::parsers::{
    parse_boolean, parse_non_neg_int, parse_string, parse_username, ValidationError,
};
use super::problem_sets::{
    set_type_tag, HomeworkSetDates, HomeworkSetParams, QuizDates, QuizParams, ReviewSetDates,
    ReviewSetParams, SetType,
};
use super::{field, impl_serialize_via_object, non_empty, Model};

// Fields every per-student override shares. set_type is carried by the
// variant, not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UserSetCore {
    pub(crate) user_set_id: i64,
    pub(crate) set_id: i64,
    pub(crate) course_user_id: i64,
    pub(crate) set_version: i64,
    pub(crate) set_visible: bool,
}

impl Default for UserSetCore {
    fn default() -> Self {
        Self {
            user_set_id: 0,
            set_id: 0,
            course_user_id: 0,
            set_version: 1,
            set_visible: false,
        }
    }
}

impl UserSetCore {
    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "user_set_id") {
            self.user_set_id = parse_non_neg_int(v).map_err(|e| e.in_field("user_set_id"))?;
        }
        if let Some(v) = field(params, "set_id") {
            self.set_id = parse_non_neg_int(v).map_err(|e| e.in_field("set_id"))?;
        }
        if let Some(v) = field(params, "course_user_id") {
            self.course_user_id =
                parse_non_neg_int(v).map_err(|e| e.in_field("course_user_id"))?;
        }
        if let Some(v) = field(params, "set_version") {
            self.set_version = parse_non_neg_int(v).map_err(|e| e.in_field("set_version"))?;
        }
        if let Some(v) = field(params, "set_visible") {
            self.set_visible = parse_boolean(v).map_err(|e| e.in_field("set_visible"))?;
        }
        Ok(())
    }

    fn write_fields(&self, set_type: SetType, map: &mut Map<String, Value>) {
        map.insert("user_set_id".to_string(), self.user_set_id.into());
        map.insert("set_id".to_string(), self.set_id.into());
        map.insert("course_user_id".to_string(), self.course_user_id.into());
        map.insert("set_version".to_string(), self.set_version.into());
        map.insert("set_visible".to_string(), self.set_visible.into());
        map.insert(
            "set_type".to_string(),
            Value::String(set_type.as_str().to_string()),
        );
    }
}

pub(crate) const USER_SET_FIELDS: &[&str] = &[
    "user_set_id",
    "set_id",
    "course_user_id",
    "set_version",
    "set_visible",
    "set_type",
    "set_params",
    "set_dates",
];

macro_rules! user_set_variant {
    ($name:ident, $set_type:expr, $params_ty:ty, $dates_ty:ty) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            core: UserSetCore,
            set_params: $params_ty,
            set_dates: $dates_ty,
        }

        impl $name {
            pub fn new(params: &Value) -> Result<Self, ValidationError> {
                let mut user_set = Self::default();
                user_set.set(params)?;
                Ok(user_set)
            }

            pub fn set_type(&self) -> SetType {
                $set_type
            }

            pub fn user_set_id(&self) -> i64 {
                self.core.user_set_id
            }

            pub fn set_id(&self) -> i64 {
                self.core.set_id
            }

            pub fn course_user_id(&self) -> i64 {
                self.core.course_user_id
            }

            pub fn set_version(&self) -> i64 {
                self.core.set_version
            }

            pub fn set_visible(&self) -> bool {
                self.core.set_visible
            }

            pub fn set_params(&self) -> &$params_ty {
                &self.set_params
            }

            pub fn set_dates(&self) -> &$dates_ty {
                &self.set_dates
            }
        }

        impl Model for $name {
            fn all_field_names(&self) -> &'static [&'static str] {
                USER_SET_FIELDS
            }

            fn param_fields(&self) -> &'static [&'static str] {
                &["set_params", "set_dates"]
            }

            fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
                self.core.set(params)?;
                if let Some(v) = field(params, "set_params") {
                    self.set_params.set(v).map_err(|e| e.in_field("set_params"))?;
                }
                if let Some(v) = field(params, "set_dates") {
                    self.set_dates.set(v).map_err(|e| e.in_field("set_dates"))?;
                }
                Ok(())
            }

            fn to_object(&self) -> Value {
                let mut map = Map::new();
                self.core.write_fields($set_type, &mut map);
                map.insert("set_params".to_string(), self.set_params.to_object());
                map.insert("set_dates".to_string(), self.set_dates.to_object());
                Value::Object(map)
            }
        }
    };
}

user_set_variant!(UserHomeworkSet, SetType::Homework, HomeworkSetParams, HomeworkSetDates);
user_set_variant!(UserQuiz, SetType::Quiz, QuizParams, QuizDates);
user_set_variant!(UserReviewSet, SetType::Review, ReviewSetParams, ReviewSetDates);

impl UserHomeworkSet {
    pub fn has_valid_dates(&self) -> bool {
        self.set_dates
            .is_valid(self.set_params.enable_reduced_scoring())
    }
}

impl UserQuiz {
    pub fn has_valid_dates(&self) -> bool {
        self.set_dates.is_valid()
    }
}

impl UserReviewSet {
    pub fn has_valid_dates(&self) -> bool {
        self.set_dates.is_valid()
    }
}

/// A sparse per-student override of a canonical assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum UserSet {
    Homework(UserHomeworkSet),
    Quiz(UserQuiz),
    Review(UserReviewSet),
}

impl UserSet {
    pub fn set_type(&self) -> SetType {
        match self {
            UserSet::Homework(_) => SetType::Homework,
            UserSet::Quiz(_) => SetType::Quiz,
            UserSet::Review(_) => SetType::Review,
        }
    }

    pub fn user_set_id(&self) -> i64 {
        match self {
            UserSet::Homework(s) => s.user_set_id(),
            UserSet::Quiz(s) => s.user_set_id(),
            UserSet::Review(s) => s.user_set_id(),
        }
    }

    pub fn set_id(&self) -> i64 {
        match self {
            UserSet::Homework(s) => s.set_id(),
            UserSet::Quiz(s) => s.set_id(),
            UserSet::Review(s) => s.set_id(),
        }
    }

    pub fn course_user_id(&self) -> i64 {
        match self {
            UserSet::Homework(s) => s.course_user_id(),
            UserSet::Quiz(s) => s.course_user_id(),
            UserSet::Review(s) => s.course_user_id(),
        }
    }

    pub fn set_version(&self) -> i64 {
        match self {
            UserSet::Homework(s) => s.set_version(),
            UserSet::Quiz(s) => s.set_version(),
            UserSet::Review(s) => s.set_version(),
        }
    }

    pub fn set_visible(&self) -> bool {
        match self {
            UserSet::Homework(s) => s.set_visible(),
            UserSet::Quiz(s) => s.set_visible(),
            UserSet::Review(s) => s.set_visible(),
        }
    }

    pub fn has_valid_dates(&self) -> bool {
        match self {
            UserSet::Homework(s) => s.has_valid_dates(),
            UserSet::Quiz(s) => s.has_valid_dates(),
            UserSet::Review(s) => s.has_valid_dates(),
        }
    }

    pub fn set_params_object(&self) -> Value {
        match self {
            UserSet::Homework(s) => s.set_params().to_object(),
            UserSet::Quiz(s) => s.set_params().to_object(),
            UserSet::Review(s) => s.set_params().to_object(),
        }
    }

    pub fn set_dates_object(&self) -> Value {
        match self {
            UserSet::Homework(s) => s.set_dates().to_object(),
            UserSet::Quiz(s) => s.set_dates().to_object(),
            UserSet::Review(s) => s.set_dates().to_object(),
        }
    }
}

impl Model for UserSet {
    fn all_field_names(&self) -> &'static [&'static str] {
        USER_SET_FIELDS
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &["set_params", "set_dates"]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        match self {
            UserSet::Homework(s) => s.set(params),
            UserSet::Quiz(s) => s.set(params),
            UserSet::Review(s) => s.set(params),
        }
    }

    fn to_object(&self) -> Value {
        match self {
            UserSet::Homework(s) => s.to_object(),
            UserSet::Quiz(s) => s.to_object(),
            UserSet::Review(s) => s.to_object(),
        }
    }
}

/// Select the override constructor from the record's explicit `set_type` tag.
pub fn parse_user_set(params: &Value) -> Result<UserSet, ValidationError> {
    match set_type_tag(params)? {
        SetType::Homework => UserHomeworkSet::new(params).map(UserSet::Homework),
        SetType::Quiz => UserQuiz::new(params).map(UserSet::Quiz),
        SetType::Review => UserReviewSet::new(params).map(UserSet::Review),
    }
}

// Fields shared by every merged view: the override's keys plus the assignee
// identity and the canonical set's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MergedUserSetCore {
    pub(crate) user_set_id: i64,
    pub(crate) set_id: i64,
    pub(crate) course_user_id: i64,
    pub(crate) user_id: i64,
    pub(crate) set_version: i64,
    pub(crate) set_visible: Option<bool>,
    pub(crate) set_name: String,
    pub(crate) username: String,
}

impl Default for MergedUserSetCore {
    fn default() -> Self {
        Self {
            user_set_id: 0,
            set_id: 0,
            course_user_id: 0,
            user_id: 0,
            set_version: 1,
            set_visible: None,
            set_name: String::new(),
            username: String::new(),
        }
    }
}

impl MergedUserSetCore {
    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "user_set_id") {
            self.user_set_id = parse_non_neg_int(v).map_err(|e| e.in_field("user_set_id"))?;
        }
        if let Some(v) = field(params, "set_id") {
            self.set_id = parse_non_neg_int(v).map_err(|e| e.in_field("set_id"))?;
        }
        if let Some(v) = field(params, "course_user_id") {
            self.course_user_id =
                parse_non_neg_int(v).map_err(|e| e.in_field("course_user_id"))?;
        }
        if let Some(v) = field(params, "user_id") {
            self.user_id = parse_non_neg_int(v).map_err(|e| e.in_field("user_id"))?;
        }
        if let Some(v) = field(params, "set_version") {
            self.set_version = parse_non_neg_int(v).map_err(|e| e.in_field("set_version"))?;
        }
        if let Some(v) = field(params, "set_visible") {
            self.set_visible = Some(parse_boolean(v).map_err(|e| e.in_field("set_visible"))?);
        }
        if let Some(v) = non_empty(params, "set_name") {
            self.set_name = parse_string(v).map_err(|e| e.in_field("set_name"))?;
        }
        if let Some(v) = non_empty(params, "username") {
            self.username = parse_username(v).map_err(|e| e.in_field("username"))?;
        }
        Ok(())
    }

    fn write_fields(&self, set_type: SetType, map: &mut Map<String, Value>) {
        map.insert("user_set_id".to_string(), self.user_set_id.into());
        map.insert("set_id".to_string(), self.set_id.into());
        map.insert("course_user_id".to_string(), self.course_user_id.into());
        map.insert("user_id".to_string(), self.user_id.into());
        map.insert("set_version".to_string(), self.set_version.into());
        if let Some(visible) = self.set_visible {
            map.insert("set_visible".to_string(), visible.into());
        }
        map.insert("set_name".to_string(), Value::String(self.set_name.clone()));
        map.insert("username".to_string(), Value::String(self.username.clone()));
        map.insert(
            "set_type".to_string(),
            Value::String(set_type.as_str().to_string()),
        );
    }
}

pub(crate) const MERGED_USER_SET_FIELDS: &[&str] = &[
    "user_set_id",
    "set_id",
    "course_user_id",
    "user_id",
    "set_version",
    "set_visible",
    "set_name",
    "username",
    "set_type",
    "set_params",
    "set_dates",
];

macro_rules! merged_user_set_variant {
    ($name:ident, $set_type:expr, $params_ty:ty, $dates_ty:ty) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            core: MergedUserSetCore,
            set_params: $params_ty,
            set_dates: $dates_ty,
        }

        impl $name {
            pub fn new(params: &Value) -> Result<Self, ValidationError> {
                let mut merged = Self::default();
                merged.set(params)?;
                Ok(merged)
            }

            pub fn set_type(&self) -> SetType {
                $set_type
            }

            pub fn user_set_id(&self) -> i64 {
                self.core.user_set_id
            }

            pub fn set_id(&self) -> i64 {
                self.core.set_id
            }

            pub fn course_user_id(&self) -> i64 {
                self.core.course_user_id
            }

            pub fn user_id(&self) -> i64 {
                self.core.user_id
            }

            pub fn set_version(&self) -> i64 {
                self.core.set_version
            }

            pub fn set_visible(&self) -> Option<bool> {
                self.core.set_visible
            }

            pub fn set_name(&self) -> &str {
                &self.core.set_name
            }

            pub fn username(&self) -> &str {
                &self.core.username
            }

            pub fn set_params(&self) -> &$params_ty {
                &self.set_params
            }

            pub fn set_dates(&self) -> &$dates_ty {
                &self.set_dates
            }
        }

        impl Model for $name {
            fn all_field_names(&self) -> &'static [&'static str] {
                MERGED_USER_SET_FIELDS
            }

            fn param_fields(&self) -> &'static [&'static str] {
                &["set_params", "set_dates"]
            }

            fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
                self.core.set(params)?;
                if let Some(v) = field(params, "set_params") {
                    self.set_params.set(v).map_err(|e| e.in_field("set_params"))?;
                }
                if let Some(v) = field(params, "set_dates") {
                    self.set_dates.set(v).map_err(|e| e.in_field("set_dates"))?;
                }
                Ok(())
            }

            fn to_object(&self) -> Value {
                let mut map = Map::new();
                self.core.write_fields($set_type, &mut map);
                map.insert("set_params".to_string(), self.set_params.to_object());
                map.insert("set_dates".to_string(), self.set_dates.to_object());
                Value::Object(map)
            }
        }
    };
}

merged_user_set_variant!(
    MergedUserHomeworkSet,
    SetType::Homework,
    HomeworkSetParams,
    HomeworkSetDates
);
merged_user_set_variant!(MergedUserQuiz, SetType::Quiz, QuizParams, QuizDates);
merged_user_set_variant!(
    MergedUserReviewSet,
    SetType::Review,
    ReviewSetParams,
    ReviewSetDates
);

impl MergedUserHomeworkSet {
    pub fn has_valid_dates(&self) -> bool {
        self.set_dates
            .is_valid(self.set_params.enable_reduced_scoring())
    }
}

impl MergedUserQuiz {
    pub fn has_valid_dates(&self) -> bool {
        self.set_dates.is_valid()
    }
}

impl MergedUserReviewSet {
    pub fn has_valid_dates(&self) -> bool {
        self.set_dates.is_valid()
    }
}

/// The computed join of a canonical assignment, a per-student override, and
/// the assignee identity. Ephemeral: recomputed whenever its inputs change,
/// never persisted directly.
#[derive(Debug, Clone, PartialEq)]
pub enum MergedUserSet {
    Homework(MergedUserHomeworkSet),
    Quiz(MergedUserQuiz),
    Review(MergedUserReviewSet),
}

impl MergedUserSet {
    pub fn set_type(&self) -> SetType {
        match self {
            MergedUserSet::Homework(_) => SetType::Homework,
            MergedUserSet::Quiz(_) => SetType::Quiz,
            MergedUserSet::Review(_) => SetType::Review,
        }
    }

    pub fn user_set_id(&self) -> i64 {
        match self {
            MergedUserSet::Homework(s) => s.user_set_id(),
            MergedUserSet::Quiz(s) => s.user_set_id(),
            MergedUserSet::Review(s) => s.user_set_id(),
        }
    }

    pub fn set_id(&self) -> i64 {
        match self {
            MergedUserSet::Homework(s) => s.set_id(),
            MergedUserSet::Quiz(s) => s.set_id(),
            MergedUserSet::Review(s) => s.set_id(),
        }
    }

    pub fn course_user_id(&self) -> i64 {
        match self {
            MergedUserSet::Homework(s) => s.course_user_id(),
            MergedUserSet::Quiz(s) => s.course_user_id(),
            MergedUserSet::Review(s) => s.course_user_id(),
        }
    }

    pub fn user_id(&self) -> i64 {
        match self {
            MergedUserSet::Homework(s) => s.user_id(),
            MergedUserSet::Quiz(s) => s.user_id(),
            MergedUserSet::Review(s) => s.user_id(),
        }
    }

    pub fn set_version(&self) -> i64 {
        match self {
            MergedUserSet::Homework(s) => s.set_version(),
            MergedUserSet::Quiz(s) => s.set_version(),
            MergedUserSet::Review(s) => s.set_version(),
        }
    }

    pub fn set_visible(&self) -> Option<bool> {
        match self {
            MergedUserSet::Homework(s) => s.set_visible(),
            MergedUserSet::Quiz(s) => s.set_visible(),
            MergedUserSet::Review(s) => s.set_visible(),
        }
    }

    pub fn set_name(&self) -> &str {
        match self {
            MergedUserSet::Homework(s) => s.set_name(),
            MergedUserSet::Quiz(s) => s.set_name(),
            MergedUserSet::Review(s) => s.set_name(),
        }
    }

    pub fn username(&self) -> &str {
        match self {
            MergedUserSet::Homework(s) => s.username(),
            MergedUserSet::Quiz(s) => s.username(),
            MergedUserSet::Review(s) => s.username(),
        }
    }

    pub fn has_valid_dates(&self) -> bool {
        match self {
            MergedUserSet::Homework(s) => s.has_valid_dates(),
            MergedUserSet::Quiz(s) => s.has_valid_dates(),
            MergedUserSet::Review(s) => s.has_valid_dates(),
        }
    }

    pub fn set_params_object(&self) -> Value {
        match self {
            MergedUserSet::Homework(s) => s.set_params().to_object(),
            MergedUserSet::Quiz(s) => s.set_params().to_object(),
            MergedUserSet::Review(s) => s.set_params().to_object(),
        }
    }

    pub fn set_dates_object(&self) -> Value {
        match self {
            MergedUserSet::Homework(s) => s.set_dates().to_object(),
            MergedUserSet::Quiz(s) => s.set_dates().to_object(),
            MergedUserSet::Review(s) => s.set_dates().to_object(),
        }
    }
}

impl Model for MergedUserSet {
    fn all_field_names(&self) -> &'static [&'static str] {
        MERGED_USER_SET_FIELDS
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &["set_params", "set_dates"]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        match self {
            MergedUserSet::Homework(s) => s.set(params),
            MergedUserSet::Quiz(s) => s.set(params),
            MergedUserSet::Review(s) => s.set(params),
        }
    }

    fn to_object(&self) -> Value {
        match self {
            MergedUserSet::Homework(s) => s.to_object(),
            MergedUserSet::Quiz(s) => s.to_object(),
            MergedUserSet::Review(s) => s.to_object(),
        }
    }
}

impl_serialize_via_object!(
    UserHomeworkSet,
    UserQuiz,
    UserReviewSet,
    UserSet,
    MergedUserHomeworkSet,
    MergedUserQuiz,
    MergedUserReviewSet,
    MergedUserSet,
);

/// Select the merged-view constructor from the record's explicit `set_type`
/// tag. An unrecognized tag is rejected loudly rather than producing an
/// untyped result.
pub fn parse_merged_user_set(params: &Value) -> Result<MergedUserSet, ValidationError> {
    match set_type_tag(params)? {
        SetType::Homework => MergedUserHomeworkSet::new(params).map(MergedUserSet::Homework),
        SetType::Quiz => MergedUserQuiz::new(params).map(MergedUserSet::Quiz),
        SetType::Review => MergedUserReviewSet::new(params).map(MergedUserSet::Review),
    }
}
