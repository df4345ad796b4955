//! Dispatch is driven by explicit discriminants only: the caller's kind for
//! problems, the record's `set_type` tag for sets. Unknown tags fail loudly.

use anyhow::Result;
use coursebook::models::{
    parse_merged_user_set, parse_problem, parse_problem_set, parse_user_set, Model, ProblemKind,
    ProblemType, SetType, ValidationError,
};
use serde_json::json;

#[test]
fn problem_kind_cannot_be_spoofed_by_the_record() -> Result<()> {
    let record = json!({
        "problem_type": "LIBRARY",
        "set_type": "HW",
        "seed": 3
    });
    for (kind, expected) in [
        (ProblemKind::Library, ProblemType::Library),
        (ProblemKind::Set, ProblemType::Set),
        (ProblemKind::User, ProblemType::User),
    ] {
        let problem = parse_problem(&record, kind)?;
        assert_eq!(problem.problem_type(), expected);
    }
    Ok(())
}

#[test]
fn set_parsers_follow_the_set_type_tag() -> Result<()> {
    for (tag, expected) in [
        ("HW", SetType::Homework),
        ("QUIZ", SetType::Quiz),
        ("REVIEW", SetType::Review),
    ] {
        let record = json!({ "set_type": tag, "set_id": 1 });
        assert_eq!(parse_problem_set(&record)?.set_type(), expected);
        assert_eq!(parse_user_set(&record)?.set_type(), expected);
        assert_eq!(parse_merged_user_set(&record)?.set_type(), expected);
    }
    Ok(())
}

#[test]
fn unknown_tags_are_rejected_by_every_set_parser() {
    let record = json!({ "set_type": "GATEWAY", "set_id": 1 });
    let expected = ValidationError::UnknownSetType("GATEWAY".to_string());
    assert_eq!(parse_problem_set(&record).unwrap_err(), expected);
    assert_eq!(parse_user_set(&record).unwrap_err(), expected);
    assert_eq!(parse_merged_user_set(&record).unwrap_err(), expected);
}

#[test]
fn missing_tags_are_their_own_error() {
    let record = json!({ "set_id": 1 });
    assert_eq!(
        parse_user_set(&record).unwrap_err(),
        ValidationError::MissingSetType
    );
}

#[test]
fn a_non_string_tag_is_a_field_error() {
    let err = parse_user_set(&json!({ "set_type": 3 })).unwrap_err();
    assert_eq!(err.to_string(), "set_type: expected a string, got `3`");
}

#[test]
fn discriminants_never_serialize_for_problems() -> Result<()> {
    // Problem type travels out of band; the record must not carry it.
    let problem = parse_problem(&json!({ "seed": 5 }), ProblemKind::User)?;
    assert!(problem.to_object().get("problem_type").is_none());
    Ok(())
}

#[test]
fn coercion_failures_surface_from_the_dispatched_constructor() {
    let err = parse_user_set(&json!({
        "set_type": "HW",
        "set_dates": { "due": "soon" }
    }))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "set_dates: due: `soon` is not a non-negative integer"
    );
}
