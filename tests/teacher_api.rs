use axum::http::StatusCode;
use diesel::prelude::*;
use sciplay_server::model::teacher::{CourseProgressEntry, StudentOverview};
use sciplay_server::response::ApiResponse;
use sciplay_server::schema;
use serde_json::json;
use uuid::Uuid;

mod helpers;
use helpers::{
    create_test_course, create_test_profile, create_test_progress, sample_questions_json,
    setup_test_environment,
};

// create_course

#[tokio::test]
async fn test_create_course_success() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let teacher_id = create_test_profile(&pool, "Prof", "teacher", 0, 0).await;

    let response = server
        .post("/teacher/create_course")
        .json(&json!({
            "teacher_id": teacher_id,
            "title": "Organic Chemistry",
            "description": "Carbon and friends",
            "category": "chemistry",
            "difficulty_level": "intermediate",
            "content": { "modules": [{ "title": "Alkanes", "duration": 20 }] }
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: ApiResponse<Uuid> = response.json();
    assert_eq!(body.status_code, 200);
    let course_id = body.data.unwrap();

    let conn = pool.get().await.unwrap();
    let owner: Option<Uuid> = conn
        .interact(move |conn| {
            schema::courses::table
                .find(course_id)
                .select(schema::courses::teacher_id)
                .get_result::<Option<Uuid>>(conn)
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(owner, Some(teacher_id));
}

#[tokio::test]
async fn test_create_course_forbidden_for_students() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let student_id = create_test_profile(&pool, "Ada", "student", 0, 0).await;

    let response = server
        .post("/teacher/create_course")
        .json(&json!({
            "teacher_id": student_id,
            "title": "Organic Chemistry",
            "category": "chemistry",
            "difficulty_level": "intermediate"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_course_unknown_profile_not_found() {
    let Some((server, _pool)) = setup_test_environment().await else {
        return;
    };

    let response = server
        .post("/teacher/create_course")
        .json(&json!({
            "teacher_id": Uuid::new_v4(),
            "title": "Organic Chemistry",
            "category": "chemistry",
            "difficulty_level": "intermediate"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// create_quiz

#[tokio::test]
async fn test_create_quiz_success() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let teacher_id = create_test_profile(&pool, "Prof", "teacher", 0, 0).await;
    let course_id = create_test_course(&pool, "Acids and Bases", Some(teacher_id), 5).await;

    let response = server
        .post("/teacher/create_quiz")
        .json(&json!({
            "teacher_id": teacher_id,
            "title": "Chemistry Basics",
            "course_id": course_id,
            "questions": sample_questions_json(),
            "total_points": 30,
            "time_limit": 15
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: ApiResponse<Uuid> = response.json();
    let quiz_id = body.data.unwrap();

    let conn = pool.get().await.unwrap();
    let stored_course: Option<Uuid> = conn
        .interact(move |conn| {
            schema::quizzes::table
                .find(quiz_id)
                .select(schema::quizzes::course_id)
                .get_result::<Option<Uuid>>(conn)
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_course, Some(course_id));
}

#[tokio::test]
async fn test_create_quiz_rejects_malformed_questions() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let teacher_id = create_test_profile(&pool, "Prof", "teacher", 0, 0).await;

    let response = server
        .post("/teacher/create_quiz")
        .json(&json!({
            "teacher_id": teacher_id,
            "title": "Chemistry Basics",
            "questions": [{ "question": "Missing everything else" }],
            "total_points": 30
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_quiz_rejects_empty_question_list() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let teacher_id = create_test_profile(&pool, "Prof", "teacher", 0, 0).await;

    let response = server
        .post("/teacher/create_quiz")
        .json(&json!({
            "teacher_id": teacher_id,
            "title": "Chemistry Basics",
            "questions": [],
            "total_points": 0
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_quiz_rejects_non_positive_time_limit() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let teacher_id = create_test_profile(&pool, "Prof", "teacher", 0, 0).await;

    let response = server
        .post("/teacher/create_quiz")
        .json(&json!({
            "teacher_id": teacher_id,
            "title": "Chemistry Basics",
            "questions": sample_questions_json(),
            "total_points": 30,
            "time_limit": 0
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_quiz_unknown_course_not_found() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let teacher_id = create_test_profile(&pool, "Prof", "teacher", 0, 0).await;

    let response = server
        .post("/teacher/create_quiz")
        .json(&json!({
            "teacher_id": teacher_id,
            "title": "Chemistry Basics",
            "course_id": Uuid::new_v4(),
            "questions": sample_questions_json(),
            "total_points": 30
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// create_badge

#[tokio::test]
async fn test_create_badge_success() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let teacher_id = create_test_profile(&pool, "Prof", "teacher", 0, 0).await;

    let response = server
        .post("/teacher/create_badge")
        .json(&json!({
            "teacher_id": teacher_id,
            "name": "Quiz Whiz",
            "category": "quizzes",
            "icon": "trophy",
            "description": "Ace five quizzes",
            "points_required": 150
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: ApiResponse<Uuid> = response.json();
    assert!(body.data.is_some());
}

#[tokio::test]
async fn test_create_badge_duplicate_name_conflict() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let teacher_id = create_test_profile(&pool, "Prof", "teacher", 0, 0).await;

    let payload = json!({
        "teacher_id": teacher_id,
        "name": "Quiz Whiz",
        "points_required": 150
    });

    let first = server.post("/teacher/create_badge").json(&payload).await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let second = server.post("/teacher/create_badge").json(&payload).await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);
}

// list_students

#[tokio::test]
async fn test_list_students_returns_roster_ordered_by_name() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let teacher_id = create_test_profile(&pool, "Prof", "teacher", 0, 0).await;
    let ben = create_test_profile(&pool, "Ben", "student", 120, 4).await;
    let ada = create_test_profile(&pool, "Ada", "student", 80, 2).await;

    let response = server
        .get("/teacher/list_students")
        .add_query_param("teacher_id", teacher_id)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: ApiResponse<Vec<StudentOverview>> = response.json();
    let students = body.data.unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0].id, ada);
    assert_eq!(students[0].total_points, 80);
    assert_eq!(students[1].id, ben);
    assert_eq!(students[1].streak, 4);
}

#[tokio::test]
async fn test_list_students_forbidden_for_students() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let student_id = create_test_profile(&pool, "Ada", "student", 0, 0).await;

    let response = server
        .get("/teacher/list_students")
        .add_query_param("teacher_id", student_id)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

// get_course_progress

#[tokio::test]
async fn test_get_course_progress_for_owned_course() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let teacher_id = create_test_profile(&pool, "Prof", "teacher", 0, 0).await;
    let ada = create_test_profile(&pool, "Ada", "student", 0, 0).await;
    let ben = create_test_profile(&pool, "Ben", "student", 0, 0).await;
    let course_id = create_test_course(&pool, "Acids and Bases", Some(teacher_id), 5).await;
    create_test_progress(&pool, ada, course_id, 100).await;
    create_test_progress(&pool, ben, course_id, 30).await;

    let response = server
        .get("/teacher/get_course_progress")
        .add_query_param("teacher_id", teacher_id)
        .add_query_param("course_id", course_id)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: ApiResponse<Vec<CourseProgressEntry>> = response.json();
    let entries = body.data.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].student_id, ada);
    assert_eq!(entries[0].progress_percentage, 100);
    assert!(entries[0].completed);
    assert_eq!(entries[1].student_id, ben);
    assert_eq!(entries[1].progress_percentage, 30);
    assert!(!entries[1].completed);
}

#[tokio::test]
async fn test_get_course_progress_forbidden_for_non_owner() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let owner_id = create_test_profile(&pool, "Prof", "teacher", 0, 0).await;
    let other_id = create_test_profile(&pool, "Rival", "teacher", 0, 0).await;
    let course_id = create_test_course(&pool, "Acids and Bases", Some(owner_id), 5).await;

    let response = server
        .get("/teacher/get_course_progress")
        .add_query_param("teacher_id", other_id)
        .add_query_param("course_id", course_id)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_course_progress_unknown_course_not_found() {
    let Some((server, pool)) = setup_test_environment().await else {
        return;
    };
    let teacher_id = create_test_profile(&pool, "Prof", "teacher", 0, 0).await;

    let response = server
        .get("/teacher/get_course_progress")
        .add_query_param("teacher_id", teacher_id)
        .add_query_param("course_id", Uuid::new_v4())
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
