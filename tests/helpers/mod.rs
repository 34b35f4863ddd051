use axum::Router;
pub(crate) use axum_test::TestServer;
use chrono::NaiveDate;
pub(crate) use deadpool_diesel::postgres::{
    Manager as TestManager, Pool as TestPool, Runtime as TestRuntime,
};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use sciplay_server::model::student::{NewStudentBadge, NewStudentProgress};
use sciplay_server::model::teacher::{NewBadge, NewCourse, NewQuiz};
use sciplay_server::{init_test_router, schema};
use serde_json::{Value, json};
use uuid::Uuid;

// test structs

#[derive(Insertable)]
#[diesel(table_name = schema::profiles)]
struct TestNewProfile {
    id: Uuid,
    full_name: String,
    role: String,
    total_points: i32,
    streak: i32,
}

// test infra setup

fn get_test_db_pool(db_url: &str) -> TestPool {
    let manager = TestManager::new(db_url, TestRuntime::Tokio1);
    TestPool::builder(manager)
        .max_size(15)
        .build()
        .expect("Failed to create test database pool")
}

/// Builds a TestServer against a cleaned test database, or `None` when no
/// test database is configured (the suite is skipped in that case).
pub async fn setup_test_environment() -> Option<(TestServer, TestPool)> {
    let Ok(db_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping integration test");
        return None;
    };

    let test_pool = get_test_db_pool(&db_url);
    clear_test_database(&test_pool).await;
    let app: Router = init_test_router(test_pool.clone());
    let server = TestServer::new(app).expect("Failed to create TestServer");
    Some((server, test_pool))
}

async fn clear_test_database(pool: &TestPool) {
    let conn = pool.get().await.expect("Failed to get conn for cleanup");
    conn.interact(|conn| {
        conn.transaction::<_, DieselError, _>(|tx_conn| {
            diesel::delete(schema::quiz_attempts::table).execute(tx_conn)?;
            diesel::delete(schema::student_badges::table).execute(tx_conn)?;
            diesel::delete(schema::student_progress::table).execute(tx_conn)?;
            diesel::delete(schema::quizzes::table).execute(tx_conn)?;
            diesel::delete(schema::badges::table).execute(tx_conn)?;
            diesel::delete(schema::courses::table).execute(tx_conn)?;
            diesel::delete(schema::profiles::table).execute(tx_conn)?;
            Ok(())
        })
    })
    .await
    .expect("Database interaction failed during cleanup")
    .expect("Diesel cleanup transaction failed");
}

// row factories

pub async fn create_test_profile(
    pool: &TestPool,
    name: &str,
    role: &str,
    total_points: i32,
    streak: i32,
) -> Uuid {
    let profile = TestNewProfile {
        id: Uuid::new_v4(),
        full_name: name.to_string(),
        role: role.to_string(),
        total_points,
        streak,
    };
    let conn = pool
        .get()
        .await
        .expect("Failed to get conn for profile insert");
    conn.interact(move |conn| {
        diesel::insert_into(schema::profiles::table)
            .values(&profile)
            .returning(schema::profiles::id)
            .get_result(conn)
    })
    .await
    .expect("Interact failed")
    .expect("Failed to insert test profile")
}

#[allow(dead_code)]
pub async fn set_last_activity(pool: &TestPool, profile_id: Uuid, date: Option<NaiveDate>) {
    let conn = pool
        .get()
        .await
        .expect("Failed to get conn for activity update");
    conn.interact(move |conn| {
        diesel::update(schema::profiles::table.find(profile_id))
            .set(schema::profiles::last_activity_date.eq(date))
            .execute(conn)
    })
    .await
    .expect("Interact failed")
    .expect("Failed to set last activity date");
}

/// Inserts a course with `modules` lessons in its content blob.
pub async fn create_test_course(
    pool: &TestPool,
    title: &str,
    teacher_id: Option<Uuid>,
    modules: usize,
) -> Uuid {
    let lessons: Vec<Value> = (0..modules)
        .map(|i| json!({ "title": format!("Lesson {}", i + 1), "duration": 15 }))
        .collect();
    let new_course = NewCourse {
        title: title.to_string(),
        description: Some("Test Desc".to_string()),
        category: "chemistry".to_string(),
        difficulty_level: "beginner".to_string(),
        content: Some(json!({ "modules": lessons })),
        teacher_id,
    };
    let conn = pool
        .get()
        .await
        .expect("Failed to get conn for course insert");
    conn.interact(move |conn| {
        diesel::insert_into(schema::courses::table)
            .values(&new_course)
            .returning(schema::courses::id)
            .get_result(conn)
    })
    .await
    .expect("Interact failed")
    .expect("Failed to insert test course")
}

/// Three sample questions matching the shape stored in `quizzes.questions`.
pub fn sample_questions_json() -> Value {
    json!([
        {
            "id": 1,
            "question": "What happens when acid and base react together?",
            "options": ["Salt and water", "Only salt", "Only water", "No reaction"],
            "correct": 0,
            "points": 10
        },
        {
            "id": 2,
            "question": "Which is the universal solvent?",
            "options": ["Alcohol", "Oil", "Water", "Vinegar"],
            "correct": 2,
            "points": 10
        },
        {
            "id": 3,
            "question": "What is the pH of pure water?",
            "options": ["6", "7", "8", "9"],
            "correct": 1,
            "points": 10
        }
    ])
}

#[allow(dead_code)]
pub async fn create_test_quiz(
    pool: &TestPool,
    title: &str,
    course_id: Option<Uuid>,
    time_limit: Option<i32>,
) -> Uuid {
    let new_quiz = NewQuiz {
        title: title.to_string(),
        course_id,
        questions: sample_questions_json(),
        total_points: 30,
        time_limit,
    };
    let conn = pool
        .get()
        .await
        .expect("Failed to get conn for quiz insert");
    conn.interact(move |conn| {
        diesel::insert_into(schema::quizzes::table)
            .values(&new_quiz)
            .returning(schema::quizzes::id)
            .get_result(conn)
    })
    .await
    .expect("Interact failed")
    .expect("Failed to insert test quiz")
}

#[allow(dead_code)]
pub async fn create_test_badge(pool: &TestPool, name: &str, points_required: i32) -> Uuid {
    let new_badge = NewBadge {
        name: name.to_string(),
        category: Some("learning".to_string()),
        icon: None,
        description: None,
        points_required: Some(points_required),
    };
    let conn = pool
        .get()
        .await
        .expect("Failed to get conn for badge insert");
    conn.interact(move |conn| {
        diesel::insert_into(schema::badges::table)
            .values(&new_badge)
            .returning(schema::badges::id)
            .get_result(conn)
    })
    .await
    .expect("Interact failed")
    .expect("Failed to insert test badge")
}

#[allow(dead_code)]
pub async fn create_test_progress(
    pool: &TestPool,
    student_id: Uuid,
    course_id: Uuid,
    progress_percentage: i32,
) -> Uuid {
    let new_progress = NewStudentProgress {
        student_id,
        course_id,
        progress_percentage,
        completed: progress_percentage >= 100,
        points_earned: (progress_percentage / 10) * 10,
    };
    let conn = pool
        .get()
        .await
        .expect("Failed to get conn for progress insert");
    conn.interact(move |conn| {
        diesel::insert_into(schema::student_progress::table)
            .values(&new_progress)
            .returning(schema::student_progress::id)
            .get_result(conn)
    })
    .await
    .expect("Interact failed")
    .expect("Failed to insert test progress")
}

#[allow(dead_code)]
pub async fn award_test_badge(pool: &TestPool, student_id: Uuid, badge_id: Uuid) {
    let new_award = NewStudentBadge {
        student_id,
        badge_id,
    };
    let conn = pool
        .get()
        .await
        .expect("Failed to get conn for award insert");
    conn.interact(move |conn| {
        diesel::insert_into(schema::student_badges::table)
            .values(&new_award)
            .execute(conn)
    })
    .await
    .expect("Interact failed")
    .expect("Failed to insert test badge award");
}
