use std::fmt;

use serde_json::{Map, Value};

use super::parsers::{
    parse_non_neg_decimal, parse_non_neg_int, parse_string, parse_username, ValidationError,
};
use super::renderer::RenderParams;
use super::{field, impl_serialize_via_object, non_empty, Model};

/// Problem discriminant. Fixed by the variant at construction; conveyed out of
/// band (it is not a serialized record field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemType {
    Library,
    Set,
    User,
    MergedUser,
}

impl ProblemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemType::Library => "LIBRARY",
            ProblemType::Set => "SET",
            ProblemType::User => "USER",
            ProblemType::MergedUser => "MERGED_USER",
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller-supplied kind for `parse_problem`. Merged problems are only
/// produced by the merge engine, so they have no parse kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    Library,
    Set,
    User,
}

/// Where a library problem lives in the content library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemLocationParams {
    pub(crate) library_id: Option<i64>,
    pub(crate) file_path: Option<String>,
    pub(crate) problem_pool_id: Option<i64>,
}

impl ProblemLocationParams {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut location_params = Self::default();
        location_params.set(params)?;
        Ok(location_params)
    }

    pub fn library_id(&self) -> Option<i64> {
        self.library_id
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn problem_pool_id(&self) -> Option<i64> {
        self.problem_pool_id
    }
}

impl Model for ProblemLocationParams {
    fn all_field_names(&self) -> &'static [&'static str] {
        &["library_id", "file_path", "problem_pool_id"]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "library_id") {
            self.library_id = Some(parse_non_neg_int(v).map_err(|e| e.in_field("library_id"))?);
        }
        if let Some(v) = field(params, "file_path") {
            self.file_path = Some(parse_string(v).map_err(|e| e.in_field("file_path"))?);
        }
        if let Some(v) = field(params, "problem_pool_id") {
            self.problem_pool_id =
                Some(parse_non_neg_int(v).map_err(|e| e.in_field("problem_pool_id"))?);
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        if let Some(library_id) = self.library_id {
            map.insert("library_id".to_string(), library_id.into());
        }
        if let Some(file_path) = &self.file_path {
            map.insert("file_path".to_string(), Value::String(file_path.clone()));
        }
        if let Some(problem_pool_id) = self.problem_pool_id {
            map.insert("problem_pool_id".to_string(), problem_pool_id.into());
        }
        Value::Object(map)
    }
}

/// Location plus assignment-specific weight. Sparse so a per-student override
/// that says nothing about `weight` keeps the set-level weight through a
/// merge; the accessor default is 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetProblemParams {
    pub(crate) weight: Option<f64>,
    pub(crate) library_id: Option<i64>,
    pub(crate) file_path: Option<String>,
    pub(crate) problem_pool_id: Option<i64>,
}

impl SetProblemParams {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut problem_params = Self::default();
        problem_params.set(params)?;
        Ok(problem_params)
    }

    pub fn weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }

    pub fn library_id(&self) -> Option<i64> {
        self.library_id
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn problem_pool_id(&self) -> Option<i64> {
        self.problem_pool_id
    }
}

impl Model for SetProblemParams {
    fn all_field_names(&self) -> &'static [&'static str] {
        &["weight", "library_id", "file_path", "problem_pool_id"]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "weight") {
            self.weight = Some(parse_non_neg_decimal(v).map_err(|e| e.in_field("weight"))?);
        }
        if let Some(v) = field(params, "library_id") {
            self.library_id = Some(parse_non_neg_int(v).map_err(|e| e.in_field("library_id"))?);
        }
        if let Some(v) = field(params, "file_path") {
            self.file_path = Some(parse_string(v).map_err(|e| e.in_field("file_path"))?);
        }
        if let Some(v) = field(params, "problem_pool_id") {
            self.problem_pool_id =
                Some(parse_non_neg_int(v).map_err(|e| e.in_field("problem_pool_id"))?);
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        if let Some(weight) = self.weight {
            map.insert("weight".to_string(), weight.into());
        }
        if let Some(library_id) = self.library_id {
            map.insert("library_id".to_string(), library_id.into());
        }
        if let Some(file_path) = &self.file_path {
            map.insert("file_path".to_string(), Value::String(file_path.clone()));
        }
        if let Some(problem_pool_id) = self.problem_pool_id {
            map.insert("problem_pool_id".to_string(), problem_pool_id.into());
        }
        Value::Object(map)
    }
}

/// A problem browsed out of the content library (authoring context).
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryProblem {
    render_params: RenderParams,
    location_params: ProblemLocationParams,
    problem_number: i64,
}

impl Default for LibraryProblem {
    fn default() -> Self {
        Self {
            render_params: RenderParams::authoring_defaults(),
            location_params: ProblemLocationParams::default(),
            problem_number: 0,
        }
    }
}

impl LibraryProblem {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut problem = Self::default();
        problem.set(params)?;
        Ok(problem)
    }

    pub fn problem_type(&self) -> ProblemType {
        ProblemType::Library
    }

    pub fn problem_number(&self) -> i64 {
        self.problem_number
    }

    pub fn location_params(&self) -> &ProblemLocationParams {
        &self.location_params
    }

    pub fn render_params(&self) -> &RenderParams {
        &self.render_params
    }

    pub fn path(&self) -> String {
        self.location_params
            .file_path
            .clone()
            .unwrap_or_default()
    }

    pub fn request_params(&self) -> RenderParams {
        let mut request = self.render_params.clone();
        request.source_file_path = self.path();
        request
    }
}

impl Model for LibraryProblem {
    fn all_field_names(&self) -> &'static [&'static str] {
        &["render_params", "location_params", "problem_number"]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &["render_params", "location_params"]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "problem_number") {
            self.problem_number =
                parse_non_neg_int(v).map_err(|e| e.in_field("problem_number"))?;
        }
        if let Some(v) = field(params, "location_params") {
            self.location_params
                .set(v)
                .map_err(|e| e.in_field("location_params"))?;
        }
        if let Some(v) = field(params, "render_params") {
            self.render_params
                .set(v)
                .map_err(|e| e.in_field("render_params"))?;
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        map.insert("render_params".to_string(), self.render_params.to_object());
        map.insert(
            "location_params".to_string(),
            self.location_params.to_object(),
        );
        map.insert("problem_number".to_string(), self.problem_number.into());
        Value::Object(map)
    }
}

/// A library problem attached to an assignment, with the assignment-specific
/// weight and numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct SetProblem {
    render_params: RenderParams,
    problem_params: SetProblemParams,
    problem_id: i64,
    set_id: i64,
    problem_number: i64,
}

impl Default for SetProblem {
    fn default() -> Self {
        Self {
            render_params: RenderParams::authoring_defaults(),
            problem_params: SetProblemParams::default(),
            problem_id: 0,
            set_id: 0,
            problem_number: 0,
        }
    }
}

impl SetProblem {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut problem = Self::default();
        // Scalars first so the default answer prefix sees the problem number.
        problem.apply_fields(params)?;
        problem.render_params.answer_prefix = Some(format!(
            "{}{}_",
            ProblemType::Set,
            problem.problem_number
        ));
        if let Some(v) = field(params, "render_params") {
            problem
                .render_params
                .set(v)
                .map_err(|e| e.in_field("render_params"))?;
        }
        Ok(problem)
    }

    fn apply_fields(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "problem_id") {
            self.problem_id = parse_non_neg_int(v).map_err(|e| e.in_field("problem_id"))?;
        }
        if let Some(v) = field(params, "set_id") {
            self.set_id = parse_non_neg_int(v).map_err(|e| e.in_field("set_id"))?;
        }
        if let Some(v) = field(params, "problem_number") {
            self.problem_number =
                parse_non_neg_int(v).map_err(|e| e.in_field("problem_number"))?;
        }
        if let Some(v) = field(params, "problem_params") {
            self.problem_params
                .set(v)
                .map_err(|e| e.in_field("problem_params"))?;
        }
        Ok(())
    }

    pub fn problem_type(&self) -> ProblemType {
        ProblemType::Set
    }

    pub fn problem_id(&self) -> i64 {
        self.problem_id
    }

    pub fn set_id(&self) -> i64 {
        self.set_id
    }

    pub fn problem_number(&self) -> i64 {
        self.problem_number
    }

    pub fn problem_params(&self) -> &SetProblemParams {
        &self.problem_params
    }

    pub fn render_params(&self) -> &RenderParams {
        &self.render_params
    }

    pub fn path(&self) -> String {
        self.problem_params.file_path.clone().unwrap_or_default()
    }

    pub fn request_params(&self) -> RenderParams {
        let mut request = self.render_params.clone();
        request.source_file_path = self.path();
        request
    }
}

impl Model for SetProblem {
    fn all_field_names(&self) -> &'static [&'static str] {
        &[
            "render_params",
            "problem_id",
            "set_id",
            "problem_number",
            "problem_params",
        ]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &["render_params", "problem_params"]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        self.apply_fields(params)?;
        if let Some(v) = field(params, "render_params") {
            self.render_params
                .set(v)
                .map_err(|e| e.in_field("render_params"))?;
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        map.insert("render_params".to_string(), self.render_params.to_object());
        map.insert("problem_id".to_string(), self.problem_id.into());
        map.insert("set_id".to_string(), self.set_id.into());
        map.insert("problem_number".to_string(), self.problem_number.into());
        map.insert(
            "problem_params".to_string(),
            self.problem_params.to_object(),
        );
        Value::Object(map)
    }
}

/// A per-student instance of a set problem (seed, grading status, version).
#[derive(Debug, Clone, PartialEq)]
pub struct UserProblem {
    render_params: RenderParams,
    problem_params: SetProblemParams,
    user_problem_id: i64,
    problem_id: i64,
    user_set_id: i64,
    seed: i64,
    status: f64,
    problem_version: i64,
}

impl Default for UserProblem {
    fn default() -> Self {
        Self {
            render_params: RenderParams::student_defaults(),
            problem_params: SetProblemParams::default(),
            user_problem_id: 0,
            problem_id: 0,
            user_set_id: 0,
            seed: 0,
            status: 0.0,
            problem_version: 1,
        }
    }
}

impl UserProblem {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut problem = Self::default();
        problem.set(params)?;
        Ok(problem)
    }

    pub fn problem_type(&self) -> ProblemType {
        ProblemType::User
    }

    pub fn user_problem_id(&self) -> i64 {
        self.user_problem_id
    }

    pub fn problem_id(&self) -> i64 {
        self.problem_id
    }

    pub fn user_set_id(&self) -> i64 {
        self.user_set_id
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn status(&self) -> f64 {
        self.status
    }

    pub fn problem_version(&self) -> i64 {
        self.problem_version
    }

    pub fn problem_params(&self) -> &SetProblemParams {
        &self.problem_params
    }

    pub fn render_params(&self) -> &RenderParams {
        &self.render_params
    }

    pub fn path(&self) -> String {
        self.problem_params.file_path.clone().unwrap_or_default()
    }

    pub fn request_params(&self) -> RenderParams {
        let mut request = self.render_params.clone();
        request.source_file_path = self.path();
        request.problem_seed = Some(self.seed);
        request
    }
}

impl Model for UserProblem {
    fn all_field_names(&self) -> &'static [&'static str] {
        &[
            "render_params",
            "user_problem_id",
            "problem_id",
            "user_set_id",
            "seed",
            "status",
            "problem_version",
            "problem_params",
        ]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &["render_params", "problem_params"]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "user_problem_id") {
            self.user_problem_id =
                parse_non_neg_int(v).map_err(|e| e.in_field("user_problem_id"))?;
        }
        if let Some(v) = field(params, "problem_id") {
            self.problem_id = parse_non_neg_int(v).map_err(|e| e.in_field("problem_id"))?;
        }
        if let Some(v) = field(params, "user_set_id") {
            self.user_set_id = parse_non_neg_int(v).map_err(|e| e.in_field("user_set_id"))?;
        }
        if let Some(v) = field(params, "seed") {
            self.seed = parse_non_neg_int(v).map_err(|e| e.in_field("seed"))?;
        }
        if let Some(v) = field(params, "status") {
            self.status = parse_non_neg_decimal(v).map_err(|e| e.in_field("status"))?;
        }
        if let Some(v) = field(params, "problem_version") {
            self.problem_version =
                parse_non_neg_int(v).map_err(|e| e.in_field("problem_version"))?;
        }
        if let Some(v) = field(params, "problem_params") {
            self.problem_params
                .set(v)
                .map_err(|e| e.in_field("problem_params"))?;
        }
        if let Some(v) = field(params, "render_params") {
            self.render_params
                .set(v)
                .map_err(|e| e.in_field("render_params"))?;
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        map.insert("render_params".to_string(), self.render_params.to_object());
        map.insert("user_problem_id".to_string(), self.user_problem_id.into());
        map.insert("problem_id".to_string(), self.problem_id.into());
        map.insert("user_set_id".to_string(), self.user_set_id.into());
        map.insert("seed".to_string(), self.seed.into());
        map.insert("status".to_string(), self.status.into());
        map.insert("problem_version".to_string(), self.problem_version.into());
        map.insert(
            "problem_params".to_string(),
            self.problem_params.to_object(),
        );
        Value::Object(map)
    }
}

/// The computed join of a set problem, a user problem, and the student's
/// merged set. Read-only in spirit: produced by the merge engine and
/// recomputed whenever an input changes.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedUserProblem {
    render_params: RenderParams,
    problem_params: SetProblemParams,
    user_problem_id: i64,
    problem_id: i64,
    user_id: i64,
    user_set_id: i64,
    set_id: i64,
    seed: i64,
    status: f64,
    problem_version: i64,
    problem_number: i64,
    username: String,
    set_name: String,
}

impl Default for MergedUserProblem {
    fn default() -> Self {
        Self {
            render_params: RenderParams::student_defaults(),
            problem_params: SetProblemParams::default(),
            user_problem_id: 0,
            problem_id: 0,
            user_id: 0,
            user_set_id: 0,
            set_id: 0,
            seed: 0,
            status: 0.0,
            problem_version: 1,
            problem_number: 0,
            username: String::new(),
            set_name: String::new(),
        }
    }
}

impl MergedUserProblem {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut problem = Self::default();
        problem.apply_fields(params)?;
        problem.render_params.answer_prefix = Some(format!(
            "{}{}_",
            ProblemType::MergedUser,
            problem.problem_number
        ));
        if let Some(v) = field(params, "render_params") {
            problem
                .render_params
                .set(v)
                .map_err(|e| e.in_field("render_params"))?;
        }
        Ok(problem)
    }

    fn apply_fields(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "user_problem_id") {
            self.user_problem_id =
                parse_non_neg_int(v).map_err(|e| e.in_field("user_problem_id"))?;
        }
        if let Some(v) = field(params, "problem_id") {
            self.problem_id = parse_non_neg_int(v).map_err(|e| e.in_field("problem_id"))?;
        }
        if let Some(v) = field(params, "user_id") {
            self.user_id = parse_non_neg_int(v).map_err(|e| e.in_field("user_id"))?;
        }
        if let Some(v) = field(params, "user_set_id") {
            self.user_set_id = parse_non_neg_int(v).map_err(|e| e.in_field("user_set_id"))?;
        }
        if let Some(v) = field(params, "set_id") {
            self.set_id = parse_non_neg_int(v).map_err(|e| e.in_field("set_id"))?;
        }
        if let Some(v) = field(params, "seed") {
            self.seed = parse_non_neg_int(v).map_err(|e| e.in_field("seed"))?;
        }
        if let Some(v) = field(params, "status") {
            self.status = parse_non_neg_decimal(v).map_err(|e| e.in_field("status"))?;
        }
        if let Some(v) = field(params, "problem_version") {
            self.problem_version =
                parse_non_neg_int(v).map_err(|e| e.in_field("problem_version"))?;
        }
        if let Some(v) = field(params, "problem_number") {
            self.problem_number =
                parse_non_neg_int(v).map_err(|e| e.in_field("problem_number"))?;
        }
        if let Some(v) = non_empty(params, "username") {
            self.username = parse_username(v).map_err(|e| e.in_field("username"))?;
        }
        if let Some(v) = non_empty(params, "set_name") {
            self.set_name = parse_string(v).map_err(|e| e.in_field("set_name"))?;
        }
        if let Some(v) = field(params, "problem_params") {
            self.problem_params
                .set(v)
                .map_err(|e| e.in_field("problem_params"))?;
        }
        Ok(())
    }

    pub fn problem_type(&self) -> ProblemType {
        ProblemType::MergedUser
    }

    pub fn user_problem_id(&self) -> i64 {
        self.user_problem_id
    }

    pub fn problem_id(&self) -> i64 {
        self.problem_id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn user_set_id(&self) -> i64 {
        self.user_set_id
    }

    pub fn set_id(&self) -> i64 {
        self.set_id
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn status(&self) -> f64 {
        self.status
    }

    pub fn problem_version(&self) -> i64 {
        self.problem_version
    }

    pub fn problem_number(&self) -> i64 {
        self.problem_number
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_name(&self) -> &str {
        &self.set_name
    }

    pub fn problem_params(&self) -> &SetProblemParams {
        &self.problem_params
    }

    pub fn render_params(&self) -> &RenderParams {
        &self.render_params
    }

    pub fn path(&self) -> String {
        self.problem_params.file_path.clone().unwrap_or_default()
    }

    pub fn request_params(&self) -> RenderParams {
        let mut request = self.render_params.clone();
        request.source_file_path = self.path();
        request.problem_seed = Some(self.seed);
        request
    }
}

impl Model for MergedUserProblem {
    fn all_field_names(&self) -> &'static [&'static str] {
        &[
            "render_params",
            "user_problem_id",
            "problem_id",
            "user_id",
            "user_set_id",
            "set_id",
            "seed",
            "status",
            "problem_version",
            "problem_number",
            "username",
            "set_name",
            "problem_params",
        ]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &["render_params", "problem_params"]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        self.apply_fields(params)?;
        if let Some(v) = field(params, "render_params") {
            self.render_params
                .set(v)
                .map_err(|e| e.in_field("render_params"))?;
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        map.insert("render_params".to_string(), self.render_params.to_object());
        map.insert("user_problem_id".to_string(), self.user_problem_id.into());
        map.insert("problem_id".to_string(), self.problem_id.into());
        map.insert("user_id".to_string(), self.user_id.into());
        map.insert("user_set_id".to_string(), self.user_set_id.into());
        map.insert("set_id".to_string(), self.set_id.into());
        map.insert("seed".to_string(), self.seed.into());
        map.insert("status".to_string(), self.status.into());
        map.insert("problem_version".to_string(), self.problem_version.into());
        map.insert("problem_number".to_string(), self.problem_number.into());
        map.insert("username".to_string(), Value::String(self.username.clone()));
        map.insert("set_name".to_string(), Value::String(self.set_name.clone()));
        map.insert(
            "problem_params".to_string(),
            self.problem_params.to_object(),
        );
        Value::Object(map)
    }
}

/// A problem of any variant, tagged by `ProblemType`.
#[derive(Debug, Clone, PartialEq)]
pub enum Problem {
    Library(LibraryProblem),
    Set(SetProblem),
    User(UserProblem),
    MergedUser(MergedUserProblem),
}

impl Problem {
    pub fn problem_type(&self) -> ProblemType {
        match self {
            Problem::Library(_) => ProblemType::Library,
            Problem::Set(_) => ProblemType::Set,
            Problem::User(_) => ProblemType::User,
            Problem::MergedUser(_) => ProblemType::MergedUser,
        }
    }

    /// The variant's content-library source location.
    pub fn path(&self) -> String {
        match self {
            Problem::Library(p) => p.path(),
            Problem::Set(p) => p.path(),
            Problem::User(p) => p.path(),
            Problem::MergedUser(p) => p.path(),
        }
    }

    /// The payload sent to the external rendering collaborator.
    pub fn request_params(&self) -> RenderParams {
        match self {
            Problem::Library(p) => p.request_params(),
            Problem::Set(p) => p.request_params(),
            Problem::User(p) => p.request_params(),
            Problem::MergedUser(p) => p.request_params(),
        }
    }

    pub fn render_params(&self) -> &RenderParams {
        match self {
            Problem::Library(p) => p.render_params(),
            Problem::Set(p) => p.render_params(),
            Problem::User(p) => p.render_params(),
            Problem::MergedUser(p) => p.render_params(),
        }
    }
}

impl Model for Problem {
    fn all_field_names(&self) -> &'static [&'static str] {
        match self {
            Problem::Library(p) => p.all_field_names(),
            Problem::Set(p) => p.all_field_names(),
            Problem::User(p) => p.all_field_names(),
            Problem::MergedUser(p) => p.all_field_names(),
        }
    }

    fn param_fields(&self) -> &'static [&'static str] {
        match self {
            Problem::Library(p) => p.param_fields(),
            Problem::Set(p) => p.param_fields(),
            Problem::User(p) => p.param_fields(),
            Problem::MergedUser(p) => p.param_fields(),
        }
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        match self {
            Problem::Library(p) => p.set(params),
            Problem::Set(p) => p.set(params),
            Problem::User(p) => p.set(params),
            Problem::MergedUser(p) => p.set(params),
        }
    }

    fn to_object(&self) -> Value {
        match self {
            Problem::Library(p) => p.to_object(),
            Problem::Set(p) => p.to_object(),
            Problem::User(p) => p.to_object(),
            Problem::MergedUser(p) => p.to_object(),
        }
    }
}

impl_serialize_via_object!(
    ProblemLocationParams,
    SetProblemParams,
    LibraryProblem,
    SetProblem,
    UserProblem,
    MergedUserProblem,
    Problem,
);

/// Select the constructor strictly from the caller's explicit `kind`; nothing
/// inside `params` can change which variant is produced.
pub fn parse_problem(params: &Value, kind: ProblemKind) -> Result<Problem, ValidationError> {
    match kind {
        ProblemKind::Library => LibraryProblem::new(params).map(Problem::Library),
        ProblemKind::Set => SetProblem::new(params).map(Problem::Set),
        ProblemKind::User => UserProblem::new(params).map(Problem::User),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn library_problems_show_every_button_by_default() {
        let problem = LibraryProblem::new(&json!({
            "location_params": { "file_path": "Library/setAlgebra/prob2.pg" }
        }))
        .expect("parse");
        let render_params = problem.render_params();
        assert!(render_params.show_solutions());
        assert!(render_params.show_preview_button());
        assert!(render_params.show_check_answers_button());
        assert!(render_params.show_correct_answers_button());
    }

    #[test]
    fn user_problems_hide_answers_by_default() {
        let problem = UserProblem::new(&json!({ "seed" : 812 })).expect("parse");
        let render_params = problem.render_params();
        assert!(!render_params.show_solutions());
        assert!(!render_params.show_correct_answers_button());
        assert!(render_params.show_preview_button());
        assert!(render_params.show_check_answers_button());
    }

    #[test]
    fn caller_supplied_render_flags_win_over_defaults() {
        let problem = UserProblem::new(&json!({
            "render_params": { "showSolutions": true }
        }))
        .expect("parse");
        assert!(problem.render_params().show_solutions());
    }

    #[test]
    fn set_problem_answer_prefix_uses_type_and_number() {
        let problem = SetProblem::new(&json!({ "problem_number": 3 })).expect("parse");
        assert_eq!(problem.render_params().answer_prefix(), Some("SET3_"));

        let merged = MergedUserProblem::new(&json!({ "problem_number": 7 })).expect("parse");
        assert_eq!(
            merged.render_params().answer_prefix(),
            Some("MERGED_USER7_")
        );
    }

    #[test]
    fn request_params_carry_the_source_path_and_seed() {
        let problem = UserProblem::new(&json!({
            "seed": 42,
            "problem_params": { "file_path": "Library/setDerivatives/prob9.pg" }
        }))
        .expect("parse");
        let request = problem.request_params();
        assert_eq!(
            request.source_file_path(),
            "Library/setDerivatives/prob9.pg"
        );
        assert_eq!(request.problem_seed(), Some(42));

        let set_problem = SetProblem::new(&json!({
            "problem_params": { "file_path": "Library/setLimits/prob1.pg" }
        }))
        .expect("parse");
        // Set problems have no per-student seed.
        assert_eq!(set_problem.request_params().problem_seed(), None);
    }

    #[test]
    fn parse_problem_obeys_only_the_explicit_kind() {
        // A type-like field smuggled into the record must not change dispatch.
        let record = json!({ "problem_type": "LIBRARY", "seed": 5 });
        let problem = parse_problem(&record, ProblemKind::User).expect("parse");
        assert_eq!(problem.problem_type(), ProblemType::User);

        let problem = parse_problem(&json!({}), ProblemKind::Set).expect("parse");
        assert_eq!(problem.problem_type(), ProblemType::Set);
    }

    #[test]
    fn weight_defaults_to_one_but_stays_sparse() {
        let problem_params = SetProblemParams::default();
        assert_eq!(problem_params.weight(), 1.0);
        assert!(problem_params.to_object().get("weight").is_none());

        let problem_params =
            SetProblemParams::new(&json!({ "weight": "2.5" })).expect("parse");
        assert_eq!(problem_params.weight(), 2.5);
    }

    #[test]
    fn status_accepts_partial_credit() {
        let problem = UserProblem::new(&json!({ "status": "0.75" })).expect("parse");
        assert_eq!(problem.status(), 0.75);
        assert!(UserProblem::new(&json!({ "status": -1 })).is_err());
    }

    #[test]
    fn seed_rejects_negative_values() {
        let err = UserProblem::new(&json!({ "seed": -4 })).unwrap_err();
        assert_eq!(err.to_string(), "seed: `-4` is not a non-negative integer");
    }

    #[test]
    fn partial_set_leaves_other_fields_alone() {
        let mut problem = SetProblem::new(&json!({
            "problem_id": 10,
            "set_id": 4,
            "problem_number": 2,
            "problem_params": { "weight": 2 }
        }))
        .expect("parse");
        problem.set(&json!({ "problem_number": 5 })).expect("set");
        assert_eq!(problem.problem_number(), 5);
        assert_eq!(problem.problem_id(), 10);
        assert_eq!(problem.set_id(), 4);
        assert_eq!(problem.problem_params().weight(), 2.0);
    }
}
