use serde_json::{Map, Value};

use super::parsers::{parse_boolean, parse_non_neg_int, parse_string, ValidationError};
use super::{field, impl_serialize_via_object, Model};

/// Payload handed to the external rendering service when a problem is
/// displayed. Keys are camelCase on the wire, unlike the rest of the records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderParams {
    pub(crate) source_file_path: String,
    pub(crate) problem_seed: Option<i64>,
    pub(crate) show_solutions: bool,
    pub(crate) show_preview_button: bool,
    pub(crate) show_check_answers_button: bool,
    pub(crate) show_correct_answers_button: bool,
    pub(crate) answer_prefix: Option<String>,
}

impl RenderParams {
    pub fn new(params: &Value) -> Result<Self, ValidationError> {
        let mut render_params = Self::default();
        render_params.set(params)?;
        Ok(render_params)
    }

    // Authoring contexts (library browser, set editor) show every button.
    pub(crate) fn authoring_defaults() -> Self {
        Self {
            show_solutions: true,
            show_preview_button: true,
            show_check_answers_button: true,
            show_correct_answers_button: true,
            ..Self::default()
        }
    }

    // Student contexts must not leak solutions or correct answers by default.
    pub(crate) fn student_defaults() -> Self {
        Self {
            show_preview_button: true,
            show_check_answers_button: true,
            ..Self::default()
        }
    }

    pub fn source_file_path(&self) -> &str {
        &self.source_file_path
    }

    pub fn problem_seed(&self) -> Option<i64> {
        self.problem_seed
    }

    pub fn show_solutions(&self) -> bool {
        self.show_solutions
    }

    pub fn show_preview_button(&self) -> bool {
        self.show_preview_button
    }

    pub fn show_check_answers_button(&self) -> bool {
        self.show_check_answers_button
    }

    pub fn show_correct_answers_button(&self) -> bool {
        self.show_correct_answers_button
    }

    pub fn answer_prefix(&self) -> Option<&str> {
        self.answer_prefix.as_deref()
    }
}

impl Model for RenderParams {
    fn all_field_names(&self) -> &'static [&'static str] {
        &[
            "sourceFilePath",
            "problemSeed",
            "showSolutions",
            "showPreviewButton",
            "showCheckAnswersButton",
            "showCorrectAnswersButton",
            "answerPrefix",
        ]
    }

    fn param_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn set(&mut self, params: &Value) -> Result<(), ValidationError> {
        if let Some(v) = field(params, "sourceFilePath") {
            self.source_file_path = parse_string(v).map_err(|e| e.in_field("sourceFilePath"))?;
        }
        if let Some(v) = field(params, "problemSeed") {
            self.problem_seed = Some(parse_non_neg_int(v).map_err(|e| e.in_field("problemSeed"))?);
        }
        if let Some(v) = field(params, "showSolutions") {
            self.show_solutions = parse_boolean(v).map_err(|e| e.in_field("showSolutions"))?;
        }
        if let Some(v) = field(params, "showPreviewButton") {
            self.show_preview_button =
                parse_boolean(v).map_err(|e| e.in_field("showPreviewButton"))?;
        }
        if let Some(v) = field(params, "showCheckAnswersButton") {
            self.show_check_answers_button =
                parse_boolean(v).map_err(|e| e.in_field("showCheckAnswersButton"))?;
        }
        if let Some(v) = field(params, "showCorrectAnswersButton") {
            self.show_correct_answers_button =
                parse_boolean(v).map_err(|e| e.in_field("showCorrectAnswersButton"))?;
        }
        if let Some(v) = field(params, "answerPrefix") {
            self.answer_prefix = Some(parse_string(v).map_err(|e| e.in_field("answerPrefix"))?);
        }
        Ok(())
    }

    fn to_object(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            "sourceFilePath".to_string(),
            Value::String(self.source_file_path.clone()),
        );
        if let Some(seed) = self.problem_seed {
            map.insert("problemSeed".to_string(), seed.into());
        }
        map.insert("showSolutions".to_string(), self.show_solutions.into());
        map.insert(
            "showPreviewButton".to_string(),
            self.show_preview_button.into(),
        );
        map.insert(
            "showCheckAnswersButton".to_string(),
            self.show_check_answers_button.into(),
        );
        map.insert(
            "showCorrectAnswersButton".to_string(),
            self.show_correct_answers_button.into(),
        );
        if let Some(prefix) = &self.answer_prefix {
            map.insert("answerPrefix".to_string(), Value::String(prefix.clone()));
        }
        Value::Object(map)
    }
}

impl_serialize_via_object!(RenderParams);
