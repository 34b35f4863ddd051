use crate::cli::Args;
use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use deadpool_diesel::Runtime;
use deadpool_diesel::postgres::{Manager, Pool};
use tracing::log::info;

pub mod cli;
pub mod gamify;
pub mod lab;
pub mod model;
pub mod payloads;
pub mod quiz;
pub mod response;
pub mod schema;

mod api;
mod errors;

pub fn init_router(args: &Args) -> anyhow::Result<Router> {
    info!("Initializing database pool...");
    let pool = init_pool(&args.connection_str, args.db_pool_max_size)
        .context("Failed to initialize database pool")?;

    info!("Initializing router...");
    Ok(init_router_internal(pool))
}

pub fn init_test_router(pool: Pool) -> Router {
    init_router_internal(pool)
}

fn init_router_internal(pool: Pool) -> Router {
    let student_api = student_routes();
    let teacher_api = teacher_routes();

    Router::new()
        .nest("/student", student_api)
        .nest("/teacher", teacher_api)
        .with_state(pool)
}

fn init_pool(conn_str: &str, max_size: u32) -> anyhow::Result<Pool> {
    let manager = Manager::new(conn_str, Runtime::Tokio1);
    let pool = Pool::builder(manager).max_size(max_size as usize).build()?;
    Ok(pool)
}

fn student_routes() -> Router<Pool> {
    Router::new()
        .route("/get_courses", get(api::student::get_courses))
        .route("/update_progress", post(api::student::update_progress))
        .route("/get_badges", get(api::student::get_badges))
        .route("/award_badge", post(api::student::award_badge))
        .route("/get_quizzes", get(api::student::get_quizzes))
        .route(
            "/submit_quiz_attempt",
            post(api::student::submit_quiz_attempt),
        )
        .route("/get_leaderboard", get(api::student::get_leaderboard))
        .route("/get_student_stats", get(api::student::get_student_stats))
        .route("/update_streak", post(api::student::update_streak))
}

fn teacher_routes() -> Router<Pool> {
    Router::new()
        .route("/create_course", post(api::teacher::create_course))
        .route("/create_quiz", post(api::teacher::create_quiz))
        .route("/create_badge", post(api::teacher::create_badge))
        .route("/list_students", get(api::teacher::list_students))
        .route(
            "/get_course_progress",
            get(api::teacher::get_course_progress),
        )
}
