use super::helper;
use crate::gamify;
use crate::model::student::{
    AwardBadgeResponse, CourseRow, CourseWithProgress, LeaderboardEntry, ModuleProgress,
    NewQuizAttempt, NewStudentBadge, NewStudentProgress, QuizAttemptRow, QuizRow, QuizView,
    QuizzesResponse, RankedProfileRow, StreakResponse, StudentProgressRow, StudentStatsResponse,
    SubmitAttemptResponse,
};
use crate::payloads::student::{
    AwardBadgePayload, GetBadgesParams, GetCoursesParams, GetLeaderboardParams, GetQuizzesParams,
    GetStudentStatsParams, SubmitQuizAttemptPayload, UpdateProgressPayload, UpdateStreakPayload,
};
use crate::quiz::{self, Question};
use crate::{
    errors::AppError,
    model::student::BadgeStatus,
    response::ApiResponse,
    schema::{
        badges::dsl as badges_dsl, courses::dsl as courses_dsl, profiles::dsl as profiles_dsl,
        quiz_attempts::dsl as qa_dsl, quizzes::dsl as quizzes_dsl,
        student_badges::dsl as sb_dsl, student_progress::dsl as sp_dsl,
    },
};
use anyhow::anyhow;
use axum::extract::Query;
use axum::{extract::State, response::Json};
use chrono::{DateTime, NaiveDate, Utc};
use deadpool_diesel::postgres::Pool;
use diesel::dsl::now;
use diesel::prelude::*;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::log::warn;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Number of lessons in a course's `content` blob; missing or malformed
/// module lists count as zero.
fn total_lessons(content: Option<&JsonValue>) -> u32 {
    content
        .and_then(|c| c.get("modules"))
        .and_then(JsonValue::as_array)
        .map(|modules| modules.len() as u32)
        .unwrap_or(0)
}

/// Parses a stored question blob; a malformed blob degrades to an empty
/// list instead of failing the request.
fn parse_questions(quiz_id: Uuid, questions: JsonValue) -> Vec<Question> {
    serde_json::from_value(questions).unwrap_or_else(|err| {
        warn!("Malformed question blob on quiz {}: {}", quiz_id, err);
        Vec::new()
    })
}

/// Queries every course, decorated with the requesting student's progress.
///
/// Query Parameters:
/// * `student_id` (optional): anonymous callers get the zero-progress view.
///
/// Returns (wrapped in `ApiResponse`)
/// * `Vec<CourseWithProgress>`: newest courses first (200 OK). Failed reads
///   degrade to an empty list.
#[instrument(skip(pool, params))]
pub async fn get_courses(
    State(pool): State<Pool>,
    Query(params): Query<GetCoursesParams>,
) -> Result<ApiResponse<Vec<CourseWithProgress>>, AppError> {
    info!("Fetching courses for student: {:?}", params.student_id);

    let courses: Vec<CourseRow> = helper::run_query_or_default(&pool, |conn_sync| {
        courses_dsl::courses
            .order(courses_dsl::created_at.desc())
            .load::<CourseRow>(conn_sync)
    })
    .await;

    let progress_rows: Vec<StudentProgressRow> = match params.student_id {
        Some(student_id) => {
            helper::run_query_or_default(&pool, move |conn_sync| {
                sp_dsl::student_progress
                    .filter(sp_dsl::student_id.eq(student_id))
                    .load::<StudentProgressRow>(conn_sync)
            })
            .await
        }
        None => Vec::new(),
    };

    let by_course: HashMap<Uuid, &StudentProgressRow> =
        progress_rows.iter().map(|p| (p.course_id, p)).collect();

    let decorated: Vec<CourseWithProgress> = courses
        .into_iter()
        .map(|course| {
            let row = by_course.get(&course.id);
            let lessons = total_lessons(course.content.as_ref());
            let pct =
                gamify::clamp_progress(row.map(|p| p.progress_percentage).unwrap_or_default());

            CourseWithProgress {
                id: course.id,
                title: course.title,
                description: course.description,
                category: course.category,
                difficulty_level: course.difficulty_level,
                content: course.content,
                teacher_id: course.teacher_id,
                created_at: course.created_at,
                progress: pct,
                completed: row.map(|p| p.completed).unwrap_or(false),
                total_lessons: lessons,
                completed_lessons: gamify::completed_lessons(pct, lessons),
            }
        })
        .collect();

    info!("Successfully assembled {} course views", decorated.len());
    Ok(ApiResponse::ok(decorated))
}

/// Upserts a student's progress in a course and returns the updated row.
///
/// Request Body: `UpdateProgressPayload`
///
/// The percentage is clamped to [0, 100] at this boundary; `completed` and
/// `points_earned` are derived, never taken from the caller.
///
/// Returns (wrapped in `ApiResponse`)
/// * `StudentProgressRow`: the row after the write (200 OK).
/// * `404 Not Found`: If the student or course does not exist.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, payload))]
pub async fn update_progress(
    State(pool): State<Pool>,
    Json(payload): Json<UpdateProgressPayload>,
) -> Result<ApiResponse<StudentProgressRow>, AppError> {
    info!(
        "Updating progress for student {} in course {}",
        payload.student_id, payload.course_id
    );
    debug!("Update progress payload: {:?}", payload);

    let pct = gamify::clamp_progress(payload.progress_percentage);
    let new_progress = NewStudentProgress {
        student_id: payload.student_id,
        course_id: payload.course_id,
        progress_percentage: pct,
        completed: gamify::is_completed(pct),
        points_earned: gamify::points_for_progress(pct),
    };

    let row = helper::run_query(&pool, move |conn_sync| {
        diesel::insert_into(sp_dsl::student_progress)
            .values(&new_progress)
            .on_conflict((sp_dsl::student_id, sp_dsl::course_id))
            .do_update()
            .set((
                sp_dsl::progress_percentage.eq(pct),
                sp_dsl::completed.eq(gamify::is_completed(pct)),
                sp_dsl::points_earned.eq(gamify::points_for_progress(pct)),
                sp_dsl::last_accessed.eq(now),
            ))
            .get_result::<StudentProgressRow>(conn_sync)
    })
    .await
    .map_err(|err| {
        helper::fk_violation_to_not_found(
            err,
            format!(
                "Student with ID {} or Course with ID {} not found.",
                payload.student_id, payload.course_id
            ),
        )
    })?;

    info!(
        "Progress for student {} in course {} is now {}%",
        payload.student_id, payload.course_id, row.progress_percentage
    );
    Ok(ApiResponse::ok(row))
}

/// Queries the badge catalog decorated with the student's earned overlay.
///
/// Query Parameters:
/// * `student_id` (optional): anonymous callers get `earned = false`
///   everywhere.
///
/// Returns (wrapped in `ApiResponse`)
/// * `Vec<BadgeStatus>`: catalog ordered by ascending points requirement
///   (200 OK). Failed reads degrade to an empty list.
#[instrument(skip(pool, params))]
pub async fn get_badges(
    State(pool): State<Pool>,
    Query(params): Query<GetBadgesParams>,
) -> Result<ApiResponse<Vec<BadgeStatus>>, AppError> {
    info!("Fetching badges for student: {:?}", params.student_id);

    let catalog = helper::run_query_or_default(&pool, |conn_sync| {
        badges_dsl::badges
            .order(badges_dsl::points_required.asc())
            .load(conn_sync)
    })
    .await;

    let earned: Vec<(Uuid, DateTime<Utc>)> = match params.student_id {
        Some(student_id) => {
            helper::run_query_or_default(&pool, move |conn_sync| {
                sb_dsl::student_badges
                    .filter(sb_dsl::student_id.eq(student_id))
                    .select((sb_dsl::badge_id, sb_dsl::earned_at))
                    .load(conn_sync)
            })
            .await
        }
        None => Vec::new(),
    };

    let decorated = gamify::decorate_badges(catalog, &earned);
    info!(
        "Successfully assembled {} badge views ({} earned)",
        decorated.len(),
        decorated.iter().filter(|b| b.earned).count()
    );
    Ok(ApiResponse::ok(decorated))
}

/// Awards a badge to a student. Idempotent: awarding an already-earned
/// badge succeeds and reports the original `earned_at`.
///
/// Request Body: `AwardBadgePayload`
///
/// Returns (wrapped in `ApiResponse`)
/// * `AwardBadgeResponse`: whether the award was new plus the effective
///   timestamp (200 OK).
/// * `404 Not Found`: If the student or badge does not exist.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, payload))]
pub async fn award_badge(
    State(pool): State<Pool>,
    Json(payload): Json<AwardBadgePayload>,
) -> Result<ApiResponse<AwardBadgeResponse>, AppError> {
    info!(
        "Awarding badge {} to student {}",
        payload.badge_id, payload.student_id
    );

    let new_award = NewStudentBadge {
        student_id: payload.student_id,
        badge_id: payload.badge_id,
    };

    let inserted: Option<DateTime<Utc>> = helper::run_query(&pool, move |conn_sync| {
        diesel::insert_into(sb_dsl::student_badges)
            .values(&new_award)
            .on_conflict_do_nothing()
            .returning(sb_dsl::earned_at)
            .get_result::<DateTime<Utc>>(conn_sync)
            .optional()
    })
    .await
    .map_err(|err| {
        helper::fk_violation_to_not_found(
            err,
            format!(
                "Student with ID {} or Badge with ID {} not found.",
                payload.student_id, payload.badge_id
            ),
        )
    })?;

    let response = match inserted {
        Some(earned_at) => {
            info!(
                "Student {} newly earned badge {}",
                payload.student_id, payload.badge_id
            );
            AwardBadgeResponse {
                newly_awarded: true,
                earned_at,
            }
        }
        None => {
            let (student_id, badge_id) = (payload.student_id, payload.badge_id);
            let earned_at = helper::run_query(&pool, move |conn_sync| {
                sb_dsl::student_badges
                    .filter(
                        sb_dsl::student_id
                            .eq(student_id)
                            .and(sb_dsl::badge_id.eq(badge_id)),
                    )
                    .select(sb_dsl::earned_at)
                    .get_result::<DateTime<Utc>>(conn_sync)
            })
            .await?;

            info!(
                "Student {} already held badge {}, award is a no-op",
                payload.student_id, payload.badge_id
            );
            AwardBadgeResponse {
                newly_awarded: false,
                earned_at,
            }
        }
    };

    Ok(ApiResponse::ok(response))
}

/// Queries every quiz with parsed questions, plus the student's attempts.
///
/// Query Parameters:
/// * `student_id` (optional): anonymous callers get no attempt history.
///
/// Returns (wrapped in `ApiResponse`)
/// * `QuizzesResponse`: newest quizzes first, missing time limits default
///   to 10 minutes (200 OK). Failed reads degrade to empty lists.
#[instrument(skip(pool, params))]
pub async fn get_quizzes(
    State(pool): State<Pool>,
    Query(params): Query<GetQuizzesParams>,
) -> Result<ApiResponse<QuizzesResponse>, AppError> {
    info!("Fetching quizzes for student: {:?}", params.student_id);

    let quiz_rows: Vec<QuizRow> = helper::run_query_or_default(&pool, |conn_sync| {
        quizzes_dsl::quizzes
            .order(quizzes_dsl::created_at.desc())
            .load::<QuizRow>(conn_sync)
    })
    .await;

    let quizzes: Vec<QuizView> = quiz_rows
        .into_iter()
        .map(|row| QuizView {
            questions: parse_questions(row.id, row.questions),
            time_limit: match row.time_limit {
                Some(minutes) if minutes > 0 => minutes,
                _ => quiz::DEFAULT_TIME_LIMIT_MINUTES,
            },
            id: row.id,
            title: row.title,
            course_id: row.course_id,
            total_points: row.total_points,
            created_at: row.created_at,
        })
        .collect();

    let attempts: Vec<QuizAttemptRow> = match params.student_id {
        Some(student_id) => {
            helper::run_query_or_default(&pool, move |conn_sync| {
                qa_dsl::quiz_attempts
                    .filter(qa_dsl::student_id.eq(student_id))
                    .order(qa_dsl::completed_at.desc())
                    .load::<QuizAttemptRow>(conn_sync)
            })
            .await
        }
        None => Vec::new(),
    };

    info!(
        "Successfully fetched {} quizzes and {} attempts",
        quizzes.len(),
        attempts.len()
    );
    Ok(ApiResponse::ok(QuizzesResponse { quizzes, attempts }))
}

/// Scores a completed quiz pass against the stored questions and records
/// the attempt.
///
/// Request Body: `SubmitQuizAttemptPayload`
///
/// Scoring is equal-weight: one point per question whose chosen index
/// matches the correct index; partial answer maps score only the
/// answered-and-correct subset.
///
/// Returns (wrapped in `ApiResponse`)
/// * `SubmitAttemptResponse`: score and per-question review (200 OK).
/// * `404 Not Found`: If the quiz or student does not exist.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, payload))]
pub async fn submit_quiz_attempt(
    State(pool): State<Pool>,
    Json(payload): Json<SubmitQuizAttemptPayload>,
) -> Result<ApiResponse<SubmitAttemptResponse>, AppError> {
    info!(
        "Submitting quiz {} attempt for student {}",
        payload.quiz_id, payload.student_id
    );
    debug!("Submit attempt payload: {:?}", payload);

    let quiz_id = payload.quiz_id;
    let quiz_row: Option<QuizRow> = helper::run_query(&pool, move |conn_sync| {
        quizzes_dsl::quizzes
            .find(quiz_id)
            .get_result::<QuizRow>(conn_sync)
            .optional()
    })
    .await?;

    let Some(quiz_row) = quiz_row else {
        error!("Quiz with ID {} not found", quiz_id);
        return Err(AppError::NotFound(format!(
            "Quiz with ID {} not found.",
            quiz_id
        )));
    };

    let questions = parse_questions(quiz_row.id, quiz_row.questions);
    let results = quiz::grade(&questions, &payload.answers);

    let answers_json = serde_json::to_value(&payload.answers)
        .map_err(|err| AppError::InternalServerError(anyhow!("Unserializable answers: {}", err)))?;

    let new_attempt = NewQuizAttempt {
        quiz_id,
        student_id: payload.student_id,
        score: results.score,
        answers: answers_json,
    };

    let attempt = helper::run_query(&pool, move |conn_sync| {
        diesel::insert_into(qa_dsl::quiz_attempts)
            .values(&new_attempt)
            .get_result::<QuizAttemptRow>(conn_sync)
    })
    .await
    .map_err(|err| {
        helper::fk_violation_to_not_found(
            err,
            format!("Student with ID {} not found.", payload.student_id),
        )
    })?;

    info!(
        "Student {} scored {}/{} on quiz {}",
        payload.student_id, results.score, results.total_questions, quiz_id
    );
    Ok(ApiResponse::ok(SubmitAttemptResponse {
        attempt_id: attempt.id,
        quiz_id,
        score: results.score,
        total_questions: results.total_questions,
        completed_at: attempt.completed_at,
        review: results.review,
    }))
}

/// Queries the top-50 student leaderboard.
///
/// Query Parameters:
/// * `student_id` (optional): flags the matching entry as the caller.
///
/// Ordering is total points descending with profile id ascending as the
/// deterministic tie-break; rank is the 1-based position.
///
/// Returns (wrapped in `ApiResponse`)
/// * `Vec<LeaderboardEntry>` (200 OK). Failed reads degrade to an empty
///   list; a failed badge-count read degrades to zero counts.
#[instrument(skip(pool, params))]
pub async fn get_leaderboard(
    State(pool): State<Pool>,
    Query(params): Query<GetLeaderboardParams>,
) -> Result<ApiResponse<Vec<LeaderboardEntry>>, AppError> {
    info!("Fetching leaderboard for student: {:?}", params.student_id);

    let profiles: Vec<RankedProfileRow> = helper::run_query_or_default(&pool, |conn_sync| {
        profiles_dsl::profiles
            .filter(profiles_dsl::role.eq("student"))
            .order((profiles_dsl::total_points.desc(), profiles_dsl::id.asc()))
            .limit(50)
            .select((
                profiles_dsl::id,
                profiles_dsl::full_name,
                profiles_dsl::avatar_url,
                profiles_dsl::total_points,
                profiles_dsl::streak,
            ))
            .load::<RankedProfileRow>(conn_sync)
    })
    .await;

    let badge_owners: Vec<Uuid> = helper::run_query_or_default(&pool, |conn_sync| {
        sb_dsl::student_badges
            .select(sb_dsl::student_id)
            .load::<Uuid>(conn_sync)
    })
    .await;

    let mut badge_counts: HashMap<Uuid, i64> = HashMap::new();
    for owner in badge_owners {
        *badge_counts.entry(owner).or_insert(0) += 1;
    }

    let entries = gamify::rank_leaderboard(profiles, &badge_counts, params.student_id);
    info!("Successfully ranked {} leaderboard entries", entries.len());
    Ok(ApiResponse::ok(entries))
}

/// Queries one student's aggregated dashboard statistics.
///
/// Query Parameters:
/// * `student_id`: the student whose stats to compute.
///
/// A missing profile degrades to the zero-point view rather than failing;
/// rank is computed independently of the leaderboard (count of
/// strictly-greater point totals plus one).
///
/// Returns (wrapped in `ApiResponse`)
/// * `StudentStatsResponse` (200 OK).
#[instrument(skip(pool, params))]
pub async fn get_student_stats(
    State(pool): State<Pool>,
    Query(params): Query<GetStudentStatsParams>,
) -> Result<ApiResponse<StudentStatsResponse>, AppError> {
    let student_id = params.student_id;
    info!("Fetching stats for student: {}", student_id);

    let profile: Option<(i32, i32)> = helper::run_query_or_default(&pool, move |conn_sync| {
        profiles_dsl::profiles
            .find(student_id)
            .select((profiles_dsl::total_points, profiles_dsl::streak))
            .get_result::<(i32, i32)>(conn_sync)
            .optional()
    })
    .await;
    let (total_points, streak) = profile.unwrap_or((0, 0));

    let progress_rows: Vec<StudentProgressRow> =
        helper::run_query_or_default(&pool, move |conn_sync| {
            sp_dsl::student_progress
                .filter(sp_dsl::student_id.eq(student_id))
                .load::<StudentProgressRow>(conn_sync)
        })
        .await;

    let course_titles: Vec<(Uuid, String)> = helper::run_query_or_default(&pool, |conn_sync| {
        courses_dsl::courses
            .select((courses_dsl::id, courses_dsl::title))
            .load(conn_sync)
    })
    .await;
    let titles: HashMap<Uuid, String> = course_titles.into_iter().collect();

    let earned_badges: i64 = helper::run_query_or_default(&pool, move |conn_sync| {
        sb_dsl::student_badges
            .filter(sb_dsl::student_id.eq(student_id))
            .count()
            .get_result::<i64>(conn_sync)
    })
    .await;

    let completed_quizzes: i64 = helper::run_query_or_default(&pool, move |conn_sync| {
        qa_dsl::quiz_attempts
            .filter(qa_dsl::student_id.eq(student_id))
            .count()
            .get_result::<i64>(conn_sync)
    })
    .await;

    let total_students: i64 = helper::run_query_or_default(&pool, |conn_sync| {
        profiles_dsl::profiles
            .filter(profiles_dsl::role.eq("student"))
            .count()
            .get_result::<i64>(conn_sync)
    })
    .await;

    let higher_ranked: i64 = helper::run_query_or_default(&pool, move |conn_sync| {
        profiles_dsl::profiles
            .filter(
                profiles_dsl::role
                    .eq("student")
                    .and(profiles_dsl::total_points.gt(total_points)),
            )
            .count()
            .get_result::<i64>(conn_sync)
    })
    .await;

    let modules: Vec<ModuleProgress> = progress_rows
        .iter()
        .map(|p| ModuleProgress {
            name: titles
                .get(&p.course_id)
                .cloned()
                .unwrap_or_else(|| "Course".to_string()),
            progress: p.progress_percentage,
            points: p.points_earned,
            status: gamify::module_status(p.progress_percentage, p.completed),
        })
        .collect();

    let stats = StudentStatsResponse {
        total_points,
        level: gamify::level_for_points(total_points),
        next_level_points: gamify::next_level_points(total_points),
        streak,
        streak_bonus_available: gamify::streak_bonus_available(streak),
        weekly_goal: gamify::WEEKLY_GOAL_POINTS,
        weekly_progress: gamify::weekly_points(
            progress_rows
                .iter()
                .map(|p| (p.last_accessed, p.points_earned)),
            Utc::now(),
        ),
        rank: higher_ranked + 1,
        total_students,
        completed_courses: progress_rows.iter().filter(|p| p.completed).count() as u32,
        completed_quizzes: completed_quizzes as u32,
        earned_badges: earned_badges as u32,
        modules,
    };

    info!(
        "Stats for student {}: level {}, rank {}",
        student_id, stats.level, stats.rank
    );
    Ok(ApiResponse::ok(stats))
}

/// Records a day of activity and advances the student's streak.
///
/// Request Body: `UpdateStreakPayload`
///
/// Consecutive-day activity increments the streak, same-day activity is a
/// no-op, a gap resets it to 1.
///
/// Returns (wrapped in `ApiResponse`)
/// * `StreakResponse`: the streak after the tick (200 OK).
/// * `404 Not Found`: If the student profile does not exist.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, payload))]
pub async fn update_streak(
    State(pool): State<Pool>,
    Json(payload): Json<UpdateStreakPayload>,
) -> Result<ApiResponse<StreakResponse>, AppError> {
    let student_id = payload.student_id;
    info!("Updating streak for student: {}", student_id);

    let profile: Option<(i32, Option<NaiveDate>)> =
        helper::run_query(&pool, move |conn_sync| {
            profiles_dsl::profiles
                .find(student_id)
                .select((profiles_dsl::streak, profiles_dsl::last_activity_date))
                .get_result::<(i32, Option<NaiveDate>)>(conn_sync)
                .optional()
        })
        .await?;

    let Some((current_streak, last_activity)) = profile else {
        error!("Profile with ID {} not found", student_id);
        return Err(AppError::NotFound(format!(
            "Profile with ID {} not found.",
            student_id
        )));
    };

    let today = Utc::now().date_naive();
    let new_streak = gamify::next_streak(current_streak, last_activity, today);

    let rows_affected = helper::run_query(&pool, move |conn_sync| {
        diesel::update(profiles_dsl::profiles.find(student_id))
            .set((
                profiles_dsl::streak.eq(new_streak),
                profiles_dsl::last_activity_date.eq(today),
            ))
            .execute(conn_sync)
    })
    .await?;

    match rows_affected {
        1 => {
            info!(
                "Streak for student {} is now {} day(s)",
                student_id, new_streak
            );
            Ok(ApiResponse::ok(StreakResponse {
                streak: new_streak,
                streak_bonus_available: gamify::streak_bonus_available(new_streak),
                last_activity_date: today,
            }))
        }
        0 => {
            error!("Profile {} disappeared during streak update", student_id);
            Err(AppError::NotFound(format!(
                "Profile with ID {} not found.",
                student_id
            )))
        }
        n => {
            error!(
                "Expected 1 row to be affected by streak update, but {} rows were affected for student: {}",
                n, student_id
            );
            Err(AppError::InternalServerError(anyhow!(
                "Update affected {} rows, expected 1",
                n
            )))
        }
    }
}
