use super::helper;
use crate::model::teacher::{CourseProgressEntry, NewBadge, NewCourse, NewQuiz, StudentOverview};
use crate::payloads::teacher::{
    CreateBadgePayload, CreateCoursePayload, CreateQuizPayload, GetCourseProgressParams,
    ListStudentsParams,
};
use crate::quiz::Question;
use crate::{
    errors::AppError,
    response::ApiResponse,
    schema::{
        badges::dsl as badges_dsl, courses::dsl as courses_dsl, profiles::dsl as profiles_dsl,
        quizzes::dsl as quizzes_dsl, student_progress::dsl as sp_dsl,
    },
};
use axum::{
    Json,
    extract::{Query, State},
};
use deadpool_diesel::postgres::Pool;
use diesel::prelude::*;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Confirms the profile exists and carries the teacher role.
///
/// Returns `404 Not Found` for a missing profile and `403 Forbidden` for a
/// non-teacher one.
async fn ensure_teacher(pool: &Pool, teacher_id: Uuid) -> Result<(), AppError> {
    let role: Option<String> = helper::run_query(pool, move |conn_sync| {
        profiles_dsl::profiles
            .find(teacher_id)
            .select(profiles_dsl::role)
            .get_result::<String>(conn_sync)
            .optional()
    })
    .await?;

    match role.as_deref() {
        None => {
            error!("Profile with ID {} not found", teacher_id);
            Err(AppError::NotFound(format!(
                "Profile with ID {} not found.",
                teacher_id
            )))
        }
        Some("teacher") => Ok(()),
        Some(other) => {
            error!(
                "Profile {} has role '{}', teacher required",
                teacher_id, other
            );
            Err(AppError::Forbidden(format!(
                "Profile {} is not a teacher.",
                teacher_id
            )))
        }
    }
}

/// Creates a new course owned by the calling teacher.
///
/// Request Body: `CreateCoursePayload`
///
/// Returns (wrapped in `ApiResponse`)
/// * `Uuid`: The new course ID (200 OK).
/// * `403 Forbidden`: If the caller is not a teacher.
/// * `404 Not Found`: If the caller's profile does not exist.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, payload))]
pub async fn create_course(
    State(pool): State<Pool>,
    Json(payload): Json<CreateCoursePayload>,
) -> Result<ApiResponse<Uuid>, AppError> {
    info!(
        "Creating course '{}' for teacher {}",
        payload.title, payload.teacher_id
    );
    debug!("Create course payload: {:?}", payload);

    ensure_teacher(&pool, payload.teacher_id).await?;

    let new_course = NewCourse {
        title: payload.title,
        description: payload.description,
        category: payload.category,
        difficulty_level: payload.difficulty_level,
        content: payload.content,
        teacher_id: Some(payload.teacher_id),
    };

    let course_id = helper::run_query(&pool, move |conn_sync| {
        diesel::insert_into(courses_dsl::courses)
            .values(&new_course)
            .returning(courses_dsl::id)
            .get_result::<Uuid>(conn_sync)
    })
    .await?;

    info!("Successfully created course {}", course_id);
    Ok(ApiResponse::ok(course_id))
}

/// Creates a new quiz, optionally attached to a course.
///
/// Request Body: `CreateQuizPayload`
///
/// Returns (wrapped in `ApiResponse`)
/// * `Uuid`: The new quiz ID (200 OK).
/// * `400 Bad Request`: If the question list is empty or malformed, or the
///   time limit is non-positive.
/// * `403 Forbidden`: If the caller is not a teacher.
/// * `404 Not Found`: If the caller's profile or the course does not exist.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, payload))]
pub async fn create_quiz(
    State(pool): State<Pool>,
    Json(payload): Json<CreateQuizPayload>,
) -> Result<ApiResponse<Uuid>, AppError> {
    info!(
        "Creating quiz '{}' for teacher {}",
        payload.title, payload.teacher_id
    );
    debug!("Create quiz payload: {:?}", payload);

    ensure_teacher(&pool, payload.teacher_id).await?;

    let questions: Vec<Question> = serde_json::from_value(payload.questions.clone())
        .map_err(|err| AppError::BadRequest(format!("Malformed question list: {}", err)))?;
    if questions.is_empty() {
        return Err(AppError::BadRequest(
            "A quiz needs at least one question.".to_string(),
        ));
    }
    if let Some(minutes) = payload.time_limit {
        if minutes <= 0 {
            return Err(AppError::BadRequest(
                "Time limit must be a positive number of minutes.".to_string(),
            ));
        }
    }

    let new_quiz = NewQuiz {
        title: payload.title,
        course_id: payload.course_id,
        questions: payload.questions,
        total_points: payload.total_points,
        time_limit: payload.time_limit,
    };

    let quiz_id = helper::run_query(&pool, move |conn_sync| {
        diesel::insert_into(quizzes_dsl::quizzes)
            .values(&new_quiz)
            .returning(quizzes_dsl::id)
            .get_result::<Uuid>(conn_sync)
    })
    .await
    .map_err(|err| {
        helper::fk_violation_to_not_found(
            err,
            format!("Course with ID {:?} not found.", payload.course_id),
        )
    })?;

    info!("Successfully created quiz {}", quiz_id);
    Ok(ApiResponse::ok(quiz_id))
}

/// Creates a new badge in the catalog.
///
/// Request Body: `CreateBadgePayload`
///
/// Returns (wrapped in `ApiResponse`)
/// * `Uuid`: The new badge ID (200 OK).
/// * `403 Forbidden`: If the caller is not a teacher.
/// * `404 Not Found`: If the caller's profile does not exist.
/// * `409 Conflict`: If a badge with the same name already exists.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, payload))]
pub async fn create_badge(
    State(pool): State<Pool>,
    Json(payload): Json<CreateBadgePayload>,
) -> Result<ApiResponse<Uuid>, AppError> {
    info!(
        "Creating badge '{}' for teacher {}",
        payload.name, payload.teacher_id
    );
    debug!("Create badge payload: {:?}", payload);

    ensure_teacher(&pool, payload.teacher_id).await?;

    let badge_name = payload.name.clone();
    let new_badge = NewBadge {
        name: payload.name,
        category: payload.category,
        icon: payload.icon,
        description: payload.description,
        points_required: payload.points_required,
    };

    let badge_id = helper::run_query(&pool, move |conn_sync| {
        diesel::insert_into(badges_dsl::badges)
            .values(&new_badge)
            .returning(badges_dsl::id)
            .get_result::<Uuid>(conn_sync)
    })
    .await
    .map_err(|err| {
        helper::unique_violation_to_conflict(
            err,
            format!("A badge named '{}' already exists.", badge_name),
        )
    })?;

    info!("Successfully created badge {}", badge_id);
    Ok(ApiResponse::ok(badge_id))
}

/// Queries the student roster.
///
/// Query Parameters:
/// * `teacher_id`: The calling teacher.
///
/// Returns (wrapped in `ApiResponse`)
/// * `Vec<StudentOverview>`: students ordered by name (200 OK).
/// * `403 Forbidden`: If the caller is not a teacher.
/// * `404 Not Found`: If the caller's profile does not exist.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, params))]
pub async fn list_students(
    State(pool): State<Pool>,
    Query(params): Query<ListStudentsParams>,
) -> Result<ApiResponse<Vec<StudentOverview>>, AppError> {
    info!("Listing students for teacher {}", params.teacher_id);

    ensure_teacher(&pool, params.teacher_id).await?;

    let students = helper::run_query(&pool, |conn_sync| {
        profiles_dsl::profiles
            .filter(profiles_dsl::role.eq("student"))
            .order(profiles_dsl::full_name.asc())
            .select((
                profiles_dsl::id,
                profiles_dsl::full_name,
                profiles_dsl::total_points,
                profiles_dsl::streak,
                profiles_dsl::last_activity_date,
            ))
            .load::<StudentOverview>(conn_sync)
    })
    .await?;

    info!("Successfully listed {} students", students.len());
    Ok(ApiResponse::ok(students))
}

/// Queries per-student progress for one of the teacher's courses.
///
/// Query Parameters:
/// * `teacher_id`: The calling teacher.
/// * `course_id`: The course to inspect.
///
/// Returns (wrapped in `ApiResponse`)
/// * `Vec<CourseProgressEntry>`: one row per enrolled student (200 OK).
/// * `403 Forbidden`: If the caller is not a teacher or does not own the
///   course.
/// * `404 Not Found`: If the caller's profile or the course does not exist.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, params))]
pub async fn get_course_progress(
    State(pool): State<Pool>,
    Query(params): Query<GetCourseProgressParams>,
) -> Result<ApiResponse<Vec<CourseProgressEntry>>, AppError> {
    let course_id = params.course_id;
    info!(
        "Fetching progress for course {} on behalf of teacher {}",
        course_id, params.teacher_id
    );

    ensure_teacher(&pool, params.teacher_id).await?;

    let owner: Option<Option<Uuid>> = helper::run_query(&pool, move |conn_sync| {
        courses_dsl::courses
            .find(course_id)
            .select(courses_dsl::teacher_id)
            .get_result::<Option<Uuid>>(conn_sync)
            .optional()
    })
    .await?;

    match owner {
        None => {
            error!("Course with ID {} not found", course_id);
            return Err(AppError::NotFound(format!(
                "Course with ID {} not found.",
                course_id
            )));
        }
        Some(owner_id) if owner_id != Some(params.teacher_id) => {
            error!(
                "Teacher {} does not own course {}",
                params.teacher_id, course_id
            );
            return Err(AppError::Forbidden(format!(
                "Teacher {} does not own course {}.",
                params.teacher_id, course_id
            )));
        }
        Some(_) => {}
    }

    let entries = helper::run_query(&pool, move |conn_sync| {
        sp_dsl::student_progress
            .inner_join(profiles_dsl::profiles)
            .filter(sp_dsl::course_id.eq(course_id))
            .order(profiles_dsl::full_name.asc())
            .select((
                sp_dsl::student_id,
                profiles_dsl::full_name,
                sp_dsl::progress_percentage,
                sp_dsl::completed,
                sp_dsl::points_earned,
                sp_dsl::last_accessed,
            ))
            .load::<CourseProgressEntry>(conn_sync)
    })
    .await?;

    info!(
        "Successfully fetched {} progress rows for course {}",
        entries.len(),
        course_id
    );
    Ok(ApiResponse::ok(entries))
}
