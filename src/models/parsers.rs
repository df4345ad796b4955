use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Raised when a record field cannot be coerced to its declared type/range.
/// Raised synchronously at the point of assignment; never a silent clamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("`{0}` is not a non-negative integer")]
    NonNegInt(String),
    #[error("`{0}` is not a non-negative decimal")]
    NonNegDecimal(String),
    #[error("`{0}` is not a boolean")]
    Boolean(String),
    #[error("`{0}` is not a valid username")]
    Username(String),
    #[error("expected a string, got `{0}`")]
    NotAString(String),
    #[error("`{0}` is not a recognized set type")]
    UnknownSetType(String),
    #[error("record has no set_type field")]
    MissingSetType,
    #[error("{field}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    pub(crate) fn in_field(self, field: &str) -> ValidationError {
        ValidationError::Field {
            field: field.to_string(),
            source: Box::new(self),
        }
    }
}

static NON_NEG_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\s*$").expect("static regex"));
static NON_NEG_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(\.\d*)?|\.\d+)\s*$").expect("static regex"));
static USERNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9._]*$").expect("static regex"));
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("static regex")
});

fn raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce a JSON number or digit string to a non-negative integer.
pub fn parse_non_neg_int(value: &Value) -> Result<i64, ValidationError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if i >= 0 {
                    return Ok(i);
                }
            } else if let Some(f) = n.as_f64() {
                if f >= 0.0 && f.fract() == 0.0 && f <= i64::MAX as f64 {
                    return Ok(f as i64);
                }
            }
            Err(ValidationError::NonNegInt(raw(value)))
        }
        Value::String(s) if NON_NEG_INT.is_match(s) => s
            .trim()
            .parse()
            .map_err(|_| ValidationError::NonNegInt(s.clone())),
        other => Err(ValidationError::NonNegInt(raw(other))),
    }
}

/// Coerce a JSON number or decimal string to a non-negative decimal.
pub fn parse_non_neg_decimal(value: &Value) -> Result<f64, ValidationError> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f >= 0.0 => Ok(f),
            _ => Err(ValidationError::NonNegDecimal(raw(value))),
        },
        Value::String(s) if NON_NEG_DECIMAL.is_match(s) => s
            .trim()
            .parse()
            .map_err(|_| ValidationError::NonNegDecimal(s.clone())),
        other => Err(ValidationError::NonNegDecimal(raw(other))),
    }
}

/// Coerce a JSON bool, 0/1, or "true"/"false"/"0"/"1" to a boolean.
pub fn parse_boolean(value: &Value) -> Result<bool, ValidationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(ValidationError::Boolean(raw(value))),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            _ => Err(ValidationError::Boolean(s.clone())),
        },
        other => Err(ValidationError::Boolean(raw(other))),
    }
}

/// A username is a simple identifier (leading letter, then letters, digits,
/// `.` or `_`) or an email address.
pub fn parse_username(value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) if USERNAME.is_match(s) || EMAIL.is_match(s) => Ok(s.clone()),
        other => Err(ValidationError::Username(raw(other))),
    }
}

pub(crate) fn parse_string(value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(ValidationError::NotAString(raw(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_neg_int_accepts_numbers_and_digit_strings() {
        assert_eq!(parse_non_neg_int(&json!(0)), Ok(0));
        assert_eq!(parse_non_neg_int(&json!(42)), Ok(42));
        assert_eq!(parse_non_neg_int(&json!("17")), Ok(17));
        assert_eq!(parse_non_neg_int(&json!(" 8 ")), Ok(8));
        assert_eq!(parse_non_neg_int(&json!(3.0)), Ok(3));
    }

    #[test]
    fn non_neg_int_rejects_negatives_and_junk() {
        assert!(parse_non_neg_int(&json!(-1)).is_err());
        assert!(parse_non_neg_int(&json!("-1")).is_err());
        assert!(parse_non_neg_int(&json!(2.5)).is_err());
        assert!(parse_non_neg_int(&json!("2.5")).is_err());
        assert!(parse_non_neg_int(&json!("abc")).is_err());
        assert!(parse_non_neg_int(&json!(true)).is_err());
    }

    #[test]
    fn non_neg_int_is_idempotent() {
        let once = parse_non_neg_int(&json!("123")).expect("coerce");
        let twice = parse_non_neg_int(&json!(once)).expect("coerce again");
        assert_eq!(once, twice);
    }

    #[test]
    fn non_neg_decimal_accepts_numbers_and_strings() {
        assert_eq!(parse_non_neg_decimal(&json!(0.5)), Ok(0.5));
        assert_eq!(parse_non_neg_decimal(&json!("2.75")), Ok(2.75));
        assert_eq!(parse_non_neg_decimal(&json!(".5")), Ok(0.5));
        assert_eq!(parse_non_neg_decimal(&json!(3)), Ok(3.0));
    }

    #[test]
    fn non_neg_decimal_rejects_negatives_and_junk() {
        assert!(parse_non_neg_decimal(&json!(-0.1)).is_err());
        assert!(parse_non_neg_decimal(&json!("-0.1")).is_err());
        assert!(parse_non_neg_decimal(&json!("1.2.3")).is_err());
        assert!(parse_non_neg_decimal(&json!(null)).is_err());
    }

    #[test]
    fn non_neg_decimal_is_idempotent() {
        let once = parse_non_neg_decimal(&json!("0.25")).expect("coerce");
        let twice = parse_non_neg_decimal(&json!(once)).expect("coerce again");
        assert_eq!(once, twice);
    }

    #[test]
    fn boolean_accepts_the_usual_spellings() {
        assert_eq!(parse_boolean(&json!(true)), Ok(true));
        assert_eq!(parse_boolean(&json!(0)), Ok(false));
        assert_eq!(parse_boolean(&json!(1)), Ok(true));
        assert_eq!(parse_boolean(&json!("true")), Ok(true));
        assert_eq!(parse_boolean(&json!("FALSE")), Ok(false));
        assert_eq!(parse_boolean(&json!("1")), Ok(true));
    }

    #[test]
    fn boolean_rejects_other_values() {
        assert!(parse_boolean(&json!(2)).is_err());
        assert!(parse_boolean(&json!("yes")).is_err());
        assert!(parse_boolean(&json!([])).is_err());
    }

    #[test]
    fn username_accepts_identifiers_and_emails() {
        assert_eq!(
            parse_username(&json!("homer")),
            Ok("homer".to_string())
        );
        assert_eq!(
            parse_username(&json!("h.simpson_2")),
            Ok("h.simpson_2".to_string())
        );
        assert_eq!(
            parse_username(&json!("homer@springfield.edu")),
            Ok("homer@springfield.edu".to_string())
        );
    }

    #[test]
    fn username_rejects_bad_identifiers() {
        assert!(parse_username(&json!("2cool")).is_err());
        assert!(parse_username(&json!("")).is_err());
        assert!(parse_username(&json!("has space")).is_err());
        assert!(parse_username(&json!(17)).is_err());
    }

    #[test]
    fn field_errors_name_the_field() {
        let err = parse_non_neg_int(&json!(-3))
            .map_err(|e| e.in_field("seed"))
            .unwrap_err();
        assert_eq!(err.to_string(), "seed: `-3` is not a non-negative integer");
    }
}
