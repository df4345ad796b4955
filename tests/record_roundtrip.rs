//! Every concrete entity must survive `to_object` → construct unchanged.

use anyhow::Result;
use coursebook::models::{
    parse_merged_user_set, parse_problem, parse_problem_set, parse_user_set, LibraryProblem,
    MergedUser, MergedUserProblem, Model, ProblemKind, RenderParams, SetProblem, UserProblem,
};
use serde_json::json;

#[test]
fn problem_sets_roundtrip() -> Result<()> {
    let records = [
        json!({
            "set_type": "HW",
            "set_id": 3,
            "set_name": "HW #3",
            "course_id": 1,
            "set_visible": true,
            "set_params": { "enable_reduced_scoring": true, "set_header": "header.pg" },
            "set_dates": { "open": 1, "reduced_scoring": 5, "due": 10, "answer": 20 }
        }),
        json!({
            "set_type": "QUIZ",
            "set_id": 4,
            "set_name": "Quiz 4",
            "course_id": 1,
            "set_params": { "timed": true, "quiz_duration": 1800 },
            "set_dates": { "open": 100, "due": 200, "answer": 300 }
        }),
        json!({
            "set_type": "REVIEW",
            "set_id": 5,
            "set_name": "Final Review",
            "course_id": 1,
            "set_params": { "can_retake": true },
            "set_dates": { "open": 100, "closed": 400 }
        }),
    ];
    for record in records {
        let problem_set = parse_problem_set(&record)?;
        assert_eq!(parse_problem_set(&problem_set.to_object())?, problem_set);
    }
    Ok(())
}

#[test]
fn user_sets_roundtrip() -> Result<()> {
    let records = [
        json!({
            "set_type": "HW",
            "user_set_id": 30,
            "set_id": 3,
            "course_user_id": 7,
            "set_visible": true,
            "set_dates": { "due": 5 }
        }),
        json!({
            "set_type": "QUIZ",
            "user_set_id": 31,
            "set_id": 4,
            "course_user_id": 7,
            "set_params": { "quiz_duration": 2400 }
        }),
        json!({
            "set_type": "REVIEW",
            "user_set_id": 32,
            "set_id": 5,
            "course_user_id": 7
        }),
    ];
    for record in records {
        let user_set = parse_user_set(&record)?;
        assert_eq!(parse_user_set(&user_set.to_object())?, user_set);
    }
    Ok(())
}

#[test]
fn merged_user_sets_roundtrip() -> Result<()> {
    let records = [
        json!({
            "set_type": "HW",
            "user_set_id": 30,
            "set_id": 3,
            "course_user_id": 7,
            "user_id": 101,
            "username": "lisa",
            "set_name": "HW #3",
            "set_visible": false,
            "set_params": { "enable_reduced_scoring": true },
            "set_dates": { "open": 1, "reduced_scoring": 3, "due": 10, "answer": 20 }
        }),
        json!({
            "set_type": "QUIZ",
            "user_set_id": 31,
            "set_id": 4,
            "user_id": 101,
            "username": "lisa",
            "set_name": "Quiz 4"
        }),
        json!({
            "set_type": "REVIEW",
            "user_set_id": 32,
            "set_id": 5,
            "user_id": 101,
            "username": "lisa",
            "set_name": "Final Review",
            "set_dates": { "open": 100, "closed": 400 }
        }),
    ];
    for record in records {
        let merged = parse_merged_user_set(&record)?;
        assert_eq!(parse_merged_user_set(&merged.to_object())?, merged);
    }
    Ok(())
}

#[test]
fn problems_roundtrip_through_their_kind() -> Result<()> {
    let library = json!({
        "location_params": { "library_id": 9, "file_path": "Library/setAlgebra/prob2.pg" },
        "problem_number": 4,
        "render_params": { "showSolutions": false }
    });
    let problem = parse_problem(&library, ProblemKind::Library)?;
    assert_eq!(
        parse_problem(&problem.to_object(), ProblemKind::Library)?,
        problem
    );

    let set_problem = json!({
        "problem_id": 10,
        "set_id": 3,
        "problem_number": 2,
        "problem_params": { "weight": 2.5, "file_path": "Library/setAlgebra/prob2.pg" }
    });
    let problem = parse_problem(&set_problem, ProblemKind::Set)?;
    assert_eq!(
        parse_problem(&problem.to_object(), ProblemKind::Set)?,
        problem
    );

    let user_problem = json!({
        "user_problem_id": 55,
        "problem_id": 10,
        "user_set_id": 30,
        "seed": 812,
        "status": 0.5,
        "problem_version": 2
    });
    let problem = parse_problem(&user_problem, ProblemKind::User)?;
    assert_eq!(
        parse_problem(&problem.to_object(), ProblemKind::User)?,
        problem
    );
    Ok(())
}

#[test]
fn concrete_problem_types_roundtrip() -> Result<()> {
    let library = LibraryProblem::new(&json!({
        "location_params": { "file_path": "Library/setLimits/prob7.pg" },
        "problem_number": 7
    }))?;
    assert_eq!(LibraryProblem::new(&library.to_object())?, library);

    let set_problem = SetProblem::new(&json!({
        "problem_id": 10,
        "set_id": 3,
        "problem_number": 2
    }))?;
    assert_eq!(SetProblem::new(&set_problem.to_object())?, set_problem);

    let user_problem = UserProblem::new(&json!({
        "problem_id": 10,
        "user_set_id": 30,
        "seed": 812
    }))?;
    assert_eq!(UserProblem::new(&user_problem.to_object())?, user_problem);

    let merged = MergedUserProblem::new(&json!({
        "problem_id": 10,
        "user_problem_id": 55,
        "user_id": 101,
        "user_set_id": 30,
        "set_id": 3,
        "seed": 812,
        "status": 0.5,
        "problem_number": 2,
        "username": "lisa",
        "set_name": "HW #3",
        "problem_params": { "weight": 2.0, "file_path": "Library/setAlgebra/prob2.pg" }
    }))?;
    assert_eq!(MergedUserProblem::new(&merged.to_object())?, merged);
    Ok(())
}

#[test]
fn customized_render_flags_survive_a_roundtrip() -> Result<()> {
    // A user problem whose solutions were deliberately revealed must clone
    // and roundtrip without the defaults stomping the customization.
    let problem = UserProblem::new(&json!({
        "seed": 4,
        "render_params": { "showSolutions": true }
    }))?;
    let rebuilt = UserProblem::new(&problem.to_object())?;
    assert!(rebuilt.render_params().show_solutions());
    assert_eq!(rebuilt, problem);
    Ok(())
}

#[test]
fn identity_records_roundtrip() -> Result<()> {
    let user = MergedUser::new(&json!({
        "user_id": 101,
        "course_user_id": 7,
        "username": "lisa"
    }))?;
    assert_eq!(MergedUser::new(&user.to_object())?, user);

    let render_params = RenderParams::new(&json!({
        "sourceFilePath": "Library/setAlgebra/prob2.pg",
        "problemSeed": 9,
        "showSolutions": true,
        "answerPrefix": "SET2_"
    }))?;
    assert_eq!(RenderParams::new(&render_params.to_object())?, render_params);
    Ok(())
}
