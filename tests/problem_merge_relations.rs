use anyhow::Result;
use coursebook::models::{
    parse_merged_user_set, MergedUserSet, ProblemType, SetProblem, UserProblem,
};
use coursebook::{merge_user_problem, MergeError};
use serde_json::json;

fn set_problem() -> Result<SetProblem> {
    Ok(SetProblem::new(&json!({
        "problem_id": 10,
        "set_id": 3,
        "problem_number": 2,
        "problem_params": {
            "file_path": "Library/setAlgebra/prob2.pg",
            "weight": 2.0
        }
    }))?)
}

fn user_problem() -> Result<UserProblem> {
    Ok(UserProblem::new(&json!({
        "user_problem_id": 55,
        "problem_id": 10,
        "user_set_id": 30,
        "seed": 812,
        "status": 0.5
    }))?)
}

fn merged_set() -> Result<MergedUserSet> {
    Ok(parse_merged_user_set(&json!({
        "set_type": "HW",
        "set_id": 3,
        "user_set_id": 30,
        "course_user_id": 7,
        "user_id": 101,
        "username": "lisa",
        "set_name": "HW #3"
    }))?)
}

#[test]
fn merged_problem_folds_in_set_and_assignee_fields() -> Result<()> {
    let merged = merge_user_problem(&set_problem()?, &user_problem()?, &merged_set()?)?;

    assert_eq!(merged.problem_type(), ProblemType::MergedUser);
    // From the user problem.
    assert_eq!(merged.user_problem_id(), 55);
    assert_eq!(merged.seed(), 812);
    assert_eq!(merged.status(), 0.5);
    assert_eq!(merged.problem_version(), 1);
    // From the set problem.
    assert_eq!(merged.problem_number(), 2);
    // From the merged set.
    assert_eq!(merged.user_id(), 101);
    assert_eq!(merged.set_id(), 3);
    assert_eq!(merged.username(), "lisa");
    assert_eq!(merged.set_name(), "HW #3");
    Ok(())
}

#[test]
fn problem_params_overlay_is_left_biased() -> Result<()> {
    let set_problem = set_problem()?;
    let user_problem = UserProblem::new(&json!({
        "problem_id": 10,
        "user_set_id": 30,
        "problem_params": { "weight": 0.5 }
    }))?;

    let merged = merge_user_problem(&set_problem, &user_problem, &merged_set()?)?;
    // Overridden weight wins; the file path survives from the set problem.
    assert_eq!(merged.problem_params().weight(), 0.5);
    assert_eq!(
        merged.problem_params().file_path(),
        Some("Library/setAlgebra/prob2.pg")
    );
    Ok(())
}

#[test]
fn sparse_user_params_keep_the_set_level_weight() -> Result<()> {
    let merged = merge_user_problem(&set_problem()?, &user_problem()?, &merged_set()?)?;
    assert_eq!(merged.problem_params().weight(), 2.0);
    Ok(())
}

#[test]
fn merged_problem_renders_with_the_student_seed() -> Result<()> {
    let merged = merge_user_problem(&set_problem()?, &user_problem()?, &merged_set()?)?;
    let request = merged.request_params();
    assert_eq!(request.source_file_path(), "Library/setAlgebra/prob2.pg");
    assert_eq!(request.problem_seed(), Some(812));
    // Student view: answers stay hidden.
    assert!(!request.show_solutions());
    assert!(!request.show_correct_answers_button());
    assert_eq!(request.answer_prefix(), Some("MERGED_USER2_"));
    Ok(())
}

#[test]
fn unrelated_problem_ids_refuse_to_merge() -> Result<()> {
    let other_set_problem = SetProblem::new(&json!({
        "problem_id": 11,
        "set_id": 3,
        "problem_number": 3
    }))?;

    // The user-set relation matches; the problem relation alone must fail it.
    let err = merge_user_problem(&other_set_problem, &user_problem()?, &merged_set()?).unwrap_err();
    assert_eq!(err, MergeError::ProblemMismatch);
    Ok(())
}

#[test]
fn unrelated_user_sets_refuse_to_merge() -> Result<()> {
    let foreign_user_problem = UserProblem::new(&json!({
        "problem_id": 10,
        "user_set_id": 99
    }))?;

    let err =
        merge_user_problem(&set_problem()?, &foreign_user_problem, &merged_set()?).unwrap_err();
    assert_eq!(err, MergeError::UserSetMismatch);
    Ok(())
}
