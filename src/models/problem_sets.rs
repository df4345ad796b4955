use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use log::warn;
use serde_json::{Map, Value};

use super::parsers::{
    parse_boolean, parse_non_neg_int, parse_string, ValidationError,
};
use super::{field, impl_serialize_via_object, non_empty, Model};

/// Assignment kind. Assigned once at construction and never reassigned; the
/// wire tag is the `set_type` record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetType {
    Homework,
    Quiz,
    Review,
}

impl SetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetType::Homework => "HW",
            SetType::Quiz => "QUIZ",
            SetType::Review => "REVIEW",
        }
    }

    pub fn from_tag(tag: &str) -> Result<SetType, ValidationError> {
        match tag {
            "HW" => Ok(SetType::Homework),
            "QUIZ" => Ok(SetType::Quiz),
            "REVIEW" => Ok(SetType::Review),
            other => {
                warn!("rejecting record with unrecognized set_type tag `{other}`");
                Err(ValidationError::UnknownSetType(other.to_string()))
            }
        }
    }
}

impl fmt::Display for SetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Reads the dispatch tag for parse_problem_set / parse_user_set /
// parse_merged_user_set. A missing tag is an error of its own.
pub(crate) fn set_type_tag(params: &Value) -> Result<SetType, ValidationError> {
    let Some(v) = field(params, "set_type") else {
        return Err(ValidationError::MissingSetType);
    };
    let tag = parse_string(v).map_err(|e| e.in_field("set_type"))?;
    SetType::from_tag(&tag)
}

// Present values, taken in kind order, must be non-decreasing. Absent fields
// drop out of the chain rather than suppressing their neighbors' comparison.
fn chain_ordered(dates: &[Option<i64>]) -> bool {
    let mut prev: Option<i64> = None;
    for value in dates.iter().flatten() {
        if let Some(p) = prev {
            if p > *value {
                return false;
            }
        }
        prev = Some(*value);
    }
    true
}

fn datetime(timestamp: Option<i64>) -> Option<DateTime<Utc>> {
    timestamp.and_then(|t| Utc.timestamp_opt(t, 0).single())
}

/// Homework assignment parameters. All fields are sparse so the same entity
/// serves as a canonical definition and as a per-student override; the
/// accessors supply the product defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeworkSetParams {
    pub(crate) enable_reduced_scoring: Option<bool>,
    pub(crate) hide_hint: Option<bool>,
    pub(crate) hardcopy_header: Option<String>,
    pub(crate) set_header: Option<String>,
    pub(crate) description: Option<String>,
}

impl HomeworkSetParams {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut set_params = Self::default();
        set_params.set(params)?;
        Ok(set_params)
    }

    pub fn enable_reduced_scoring(&self) -> bool {
        self.enable_reduced_scoring.unwrap_or(false)
    }

    pub fn hide_hint(&self) -> bool {
        self.hide_hint.unwrap_or(false)
    }

    pub fn hardcopy_header(&self) -> Option<&str> {
        self.hardcopy_header.as_deref()
    }

    pub fn set_header(&self) -> Option<&str> {
        self.set_header.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Model for HomeworkSetParams {
    fn all_field_names(&self) -> &'static [&'static str] {
        &[
            "enable_reduced_scoring",
            "hide_hint",
            "hardcopy_header",
            "set_header",
            "description",
        ]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "enable_reduced_scoring") {
            self.enable_reduced_scoring =
                Some(parse_boolean(v).map_err(|e| e.in_field("enable_reduced_scoring"))?);
        }
        if let Some(v) = field(params, "hide_hint") {
            self.hide_hint = Some(parse_boolean(v).map_err(|e| e.in_field("hide_hint"))?);
        }
        if let Some(v) = field(params, "hardcopy_header") {
            self.hardcopy_header = Some(parse_string(v).map_err(|e| e.in_field("hardcopy_header"))?);
        }
        if let Some(v) = field(params, "set_header") {
            self.set_header = Some(parse_string(v).map_err(|e| e.in_field("set_header"))?);
        }
        if let Some(v) = field(params, "description") {
            self.description = Some(parse_string(v).map_err(|e| e.in_field("description"))?);
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        if let Some(enabled) = self.enable_reduced_scoring {
            map.insert("enable_reduced_scoring".to_string(), enabled.into());
        }
        if let Some(hide) = self.hide_hint {
            map.insert("hide_hint".to_string(), hide.into());
        }
        if let Some(header) = &self.hardcopy_header {
            map.insert("hardcopy_header".to_string(), Value::String(header.clone()));
        }
        if let Some(header) = &self.set_header {
            map.insert("set_header".to_string(), Value::String(header.clone()));
        }
        if let Some(description) = &self.description {
            map.insert("description".to_string(), Value::String(description.clone()));
        }
        Value::Object(map)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizParams {
    pub(crate) timed: Option<bool>,
    pub(crate) quiz_duration: Option<i64>,
}

impl QuizParams {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut set_params = Self::default();
        set_params.set(params)?;
        Ok(set_params)
    }

    pub fn timed(&self) -> bool {
        self.timed.unwrap_or(false)
    }

    /// Duration in seconds; 0 means untimed display.
    pub fn quiz_duration(&self) -> i64 {
        self.quiz_duration.unwrap_or(0)
    }
}

impl Model for QuizParams {
    fn all_field_names(&self) -> &'static [&'static str] {
        &["timed", "quiz_duration"]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "timed") {
            self.timed = Some(parse_boolean(v).map_err(|e| e.in_field("timed"))?);
        }
        if let Some(v) = field(params, "quiz_duration") {
            self.quiz_duration =
                Some(parse_non_neg_int(v).map_err(|e| e.in_field("quiz_duration"))?);
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        if let Some(timed) = self.timed {
            map.insert("timed".to_string(), timed.into());
        }
        if let Some(duration) = self.quiz_duration {
            map.insert("quiz_duration".to_string(), duration.into());
        }
        Value::Object(map)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSetParams {
    pub(crate) can_retake: Option<bool>,
}

impl ReviewSetParams {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut set_params = Self::default();
        set_params.set(params)?;
        Ok(set_params)
    }

    pub fn can_retake(&self) -> bool {
        self.can_retake.unwrap_or(false)
    }
}

impl Model for ReviewSetParams {
    fn all_field_names(&self) -> &'static [&'static str] {
        &["can_retake"]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "can_retake") {
            self.can_retake = Some(parse_boolean(v).map_err(|e| e.in_field("can_retake"))?);
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        if let Some(retake) = self.can_retake {
            map.insert("can_retake".to_string(), retake.into());
        }
        Value::Object(map)
    }
}

/// Homework dates: open ≤ reduced_scoring ≤ due ≤ answer among present fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HomeworkSetDates {
    pub(crate) open: Option<i64>,
    pub(crate) reduced_scoring: Option<i64>,
    pub(crate) due: Option<i64>,
    pub(crate) answer: Option<i64>,
}

impl HomeworkSetDates {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut set_dates = Self::default();
        set_dates.set(params)?;
        Ok(set_dates)
    }

    pub fn open(&self) -> Option<i64> {
        self.open
    }

    pub fn reduced_scoring(&self) -> Option<i64> {
        self.reduced_scoring
    }

    pub fn due(&self) -> Option<i64> {
        self.due
    }

    pub fn answer(&self) -> Option<i64> {
        self.answer
    }

    pub fn open_datetime(&self) -> Option<DateTime<Utc>> {
        datetime(self.open)
    }

    pub fn reduced_scoring_datetime(&self) -> Option<DateTime<Utc>> {
        datetime(self.reduced_scoring)
    }

    pub fn due_datetime(&self) -> Option<DateTime<Utc>> {
        datetime(self.due)
    }

    pub fn answer_datetime(&self) -> Option<DateTime<Utc>> {
        datetime(self.answer)
    }

    pub fn is_valid(&self, enable_reduced_scoring: bool) -> bool {
        if enable_reduced_scoring && self.reduced_scoring.is_none() {
            return false;
        }
        chain_ordered(&[self.open, self.reduced_scoring, self.due, self.answer])
    }
}

impl Model for HomeworkSetDates {
    fn all_field_names(&self) -> &'static [&'static str] {
        &["open", "reduced_scoring", "due", "answer"]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "open") {
            self.open = Some(parse_non_neg_int(v).map_err(|e| e.in_field("open"))?);
        }
        if let Some(v) = field(params, "reduced_scoring") {
            self.reduced_scoring =
                Some(parse_non_neg_int(v).map_err(|e| e.in_field("reduced_scoring"))?);
        }
        if let Some(v) = field(params, "due") {
            self.due = Some(parse_non_neg_int(v).map_err(|e| e.in_field("due"))?);
        }
        if let Some(v) = field(params, "answer") {
            self.answer = Some(parse_non_neg_int(v).map_err(|e| e.in_field("answer"))?);
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        if let Some(open) = self.open {
            map.insert("open".to_string(), open.into());
        }
        if let Some(reduced_scoring) = self.reduced_scoring {
            map.insert("reduced_scoring".to_string(), reduced_scoring.into());
        }
        if let Some(due) = self.due {
            map.insert("due".to_string(), due.into());
        }
        if let Some(answer) = self.answer {
            map.insert("answer".to_string(), answer.into());
        }
        Value::Object(map)
    }
}

/// Quiz dates: open ≤ due ≤ answer among present fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuizDates {
    pub(crate) open: Option<i64>,
    pub(crate) due: Option<i64>,
    pub(crate) answer: Option<i64>,
}

impl QuizDates {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut set_dates = Self::default();
        set_dates.set(params)?;
        Ok(set_dates)
    }

    pub fn open(&self) -> Option<i64> {
        self.open
    }

    pub fn due(&self) -> Option<i64> {
        self.due
    }

    pub fn answer(&self) -> Option<i64> {
        self.answer
    }

    pub fn open_datetime(&self) -> Option<DateTime<Utc>> {
        datetime(self.open)
    }

    pub fn due_datetime(&self) -> Option<DateTime<Utc>> {
        datetime(self.due)
    }

    pub fn answer_datetime(&self) -> Option<DateTime<Utc>> {
        datetime(self.answer)
    }

    pub fn is_valid(&self) -> bool {
        chain_ordered(&[self.open, self.due, self.answer])
    }
}

impl Model for QuizDates {
    fn all_field_names(&self) -> &'static [&'static str] {
        &["open", "due", "answer"]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "open") {
            self.open = Some(parse_non_neg_int(v).map_err(|e| e.in_field("open"))?);
        }
        if let Some(v) = field(params, "due") {
            self.due = Some(parse_non_neg_int(v).map_err(|e| e.in_field("due"))?);
        }
        if let Some(v) = field(params, "answer") {
            self.answer = Some(parse_non_neg_int(v).map_err(|e| e.in_field("answer"))?);
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        if let Some(open) = self.open {
            map.insert("open".to_string(), open.into());
        }
        if let Some(due) = self.due {
            map.insert("due".to_string(), due.into());
        }
        if let Some(answer) = self.answer {
            map.insert("answer".to_string(), answer.into());
        }
        Value::Object(map)
    }
}

/// Review dates: open ≤ closed among present fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewSetDates {
    pub(crate) open: Option<i64>,
    pub(crate) closed: Option<i64>,
}

impl ReviewSetDates {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut set_dates = Self::default();
        set_dates.set(params)?;
        Ok(set_dates)
    }

    pub fn open(&self) -> Option<i64> {
        self.open
    }

    pub fn closed(&self) -> Option<i64> {
        self.closed
    }

    pub fn open_datetime(&self) -> Option<DateTime<Utc>> {
        datetime(self.open)
    }

    pub fn closed_datetime(&self) -> Option<DateTime<Utc>> {
        datetime(self.closed)
    }

    pub fn is_valid(&self) -> bool {
        chain_ordered(&[self.open, self.closed])
    }
}

impl Model for ReviewSetDates {
    fn all_field_names(&self) -> &'static [&'static str] {
        &["open", "closed"]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "open") {
            self.open = Some(parse_non_neg_int(v).map_err(|e| e.in_field("open"))?);
        }
        if let Some(v) = field(params, "closed") {
            self.closed = Some(parse_non_neg_int(v).map_err(|e| e.in_field("closed"))?);
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        if let Some(open) = self.open {
            map.insert("open".to_string(), open.into());
        }
        if let Some(closed) = self.closed {
            map.insert("closed".to_string(), closed.into());
        }
        Value::Object(map)
    }
}

// Fields every canonical set shares, regardless of kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ProblemSetCore {
    pub(crate) set_id: i64,
    pub(crate) set_name: String,
    pub(crate) course_id: i64,
    pub(crate) set_visible: bool,
}

impl ProblemSetCore {
    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "set_id") {
            self.set_id = parse_non_neg_int(v).map_err(|e| e.in_field("set_id"))?;
        }
        if let Some(v) = non_empty(params, "set_name") {
            self.set_name = parse_string(v).map_err(|e| e.in_field("set_name"))?;
        }
        if let Some(v) = field(params, "course_id") {
            self.course_id = parse_non_neg_int(v).map_err(|e| e.in_field("course_id"))?;
        }
        if let Some(v) = field(params, "set_visible") {
            self.set_visible = parse_boolean(v).map_err(|e| e.in_field("set_visible"))?;
        }
        Ok(())
    }

    fn write_fields(&self, set_type: SetType, map: &mut Map<String, Value>) {
        map.insert("set_id".to_string(), self.set_id.into());
        map.insert("set_name".to_string(), Value::String(self.set_name.clone()));
        map.insert("course_id".to_string(), self.course_id.into());
        map.insert(
            "set_type".to_string(),
            Value::String(set_type.as_str().to_string()),
        );
        map.insert("set_visible".to_string(), self.set_visible.into());
    }
}

pub(crate) const PROBLEM_SET_FIELDS: &[&str] = &[
    "set_id",
    "set_name",
    "course_id",
    "set_type",
    "set_visible",
    "set_params",
    "set_dates",
];

macro_rules! problem_set_variant {
    ($name:ident, $set_type:expr, $params_ty:ty, $dates_ty:ty) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            core: ProblemSetCore,
            set_params: $params_ty,
            set_dates: $dates_ty,
        }

        impl $name {
            pub fn new(params: &Value) -> Result<Self, ValidationError> {
                let mut problem_set = Self::default();
                problem_set.set(params)?;
                Ok(problem_set)
            }

            pub fn set_type(&self) -> SetType {
                $set_type
            }

            pub fn set_id(&self) -> i64 {
                self.core.set_id
            }

            pub fn set_name(&self) -> &str {
                &self.core.set_name
            }

            pub fn course_id(&self) -> i64 {
                self.core.course_id
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
                PROBLEM_SET_FIELDS
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

problem_set_variant!(HomeworkSet, SetType::Homework, HomeworkSetParams, HomeworkSetDates);
problem_set_variant!(Quiz, SetType::Quiz, QuizParams, QuizDates);
problem_set_variant!(ReviewSet, SetType::Review, ReviewSetParams, ReviewSetDates);

impl HomeworkSet {
    pub fn has_valid_dates(&self) -> bool {
        self.set_dates
            .is_valid(self.set_params.enable_reduced_scoring())
    }
}

impl Quiz {
    pub fn has_valid_dates(&self) -> bool {
        self.set_dates.is_valid()
    }
}

impl ReviewSet {
    pub fn has_valid_dates(&self) -> bool {
        self.set_dates.is_valid()
    }
}

/// A canonical assignment definition, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ProblemSet {
    Homework(HomeworkSet),
    Quiz(Quiz),
    Review(ReviewSet),
}

impl ProblemSet {
    pub fn set_type(&self) -> SetType {
        match self {
            ProblemSet::Homework(_) => SetType::Homework,
            ProblemSet::Quiz(_) => SetType::Quiz,
            ProblemSet::Review(_) => SetType::Review,
        }
    }

    pub fn set_id(&self) -> i64 {
        match self {
            ProblemSet::Homework(s) => s.set_id(),
            ProblemSet::Quiz(s) => s.set_id(),
            ProblemSet::Review(s) => s.set_id(),
        }
    }

    pub fn set_name(&self) -> &str {
        match self {
            ProblemSet::Homework(s) => s.set_name(),
            ProblemSet::Quiz(s) => s.set_name(),
            ProblemSet::Review(s) => s.set_name(),
        }
    }

    pub fn course_id(&self) -> i64 {
        match self {
            ProblemSet::Homework(s) => s.course_id(),
            ProblemSet::Quiz(s) => s.course_id(),
            ProblemSet::Review(s) => s.course_id(),
        }
    }

    pub fn set_visible(&self) -> bool {
        match self {
            ProblemSet::Homework(s) => s.set_visible(),
            ProblemSet::Quiz(s) => s.set_visible(),
            ProblemSet::Review(s) => s.set_visible(),
        }
    }

    pub fn has_valid_dates(&self) -> bool {
        match self {
            ProblemSet::Homework(s) => s.has_valid_dates(),
            ProblemSet::Quiz(s) => s.has_valid_dates(),
            ProblemSet::Review(s) => s.has_valid_dates(),
        }
    }

    pub fn set_params_object(&self) -> Value {
        match self {
            ProblemSet::Homework(s) => s.set_params().to_object(),
            ProblemSet::Quiz(s) => s.set_params().to_object(),
            ProblemSet::Review(s) => s.set_params().to_object(),
        }
    }

    pub fn set_dates_object(&self) -> Value {
        match self {
            ProblemSet::Homework(s) => s.set_dates().to_object(),
            ProblemSet::Quiz(s) => s.set_dates().to_object(),
            ProblemSet::Review(s) => s.set_dates().to_object(),
        }
    }
}

impl Model for ProblemSet {
    fn all_field_names(&self) -> &'static [&'static str] {
        PROBLEM_SET_FIELDS
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &["set_params", "set_dates"]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        match self {
            ProblemSet::Homework(s) => s.set(params),
            ProblemSet::Quiz(s) => s.set(params),
            ProblemSet::Review(s) => s.set(params),
        }
    }

    fn to_object(&self) -> Value {
        match self {
            ProblemSet::Homework(s) => s.to_object(),
            ProblemSet::Quiz(s) => s.to_object(),
            ProblemSet::Review(s) => s.to_object(),
        }
    }
}

impl_serialize_via_object!(
    HomeworkSetParams,
    QuizParams,
    ReviewSetParams,
    HomeworkSetDates,
    QuizDates,
    ReviewSetDates,
    HomeworkSet,
    Quiz,
    ReviewSet,
    ProblemSet,
);

/// Select the constructor from the record's explicit `set_type` tag. An
/// unrecognized or missing tag is an error, never a silently-untyped set.
pub fn parse_problem_set(params: &Value) -> Result<ProblemSet, ValidationError> {
    match set_type_tag(params)? {
        SetType::Homework => HomeworkSet::new(params).map(ProblemSet::Homework),
        SetType::Quiz => Quiz::new(params).map(ProblemSet::Quiz),
        SetType::Review => ReviewSet::new(params).map(ProblemSet::Review),
    }
}
