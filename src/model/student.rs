use crate::quiz::{Question, QuestionReview};
use crate::schema::quiz_attempts;
use crate::schema::student_badges;
use crate::schema::student_progress;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Insertable, Debug)]
#[diesel(table_name = student_progress)]
pub struct NewStudentProgress {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub progress_percentage: i32,
    pub completed: bool,
    pub points_earned: i32,
    // id and last_accessed have DB defaults
}

#[derive(Queryable, Serialize, Deserialize, Debug, Clone)]
pub struct StudentProgressRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub progress_percentage: i32,
    pub completed: bool,
    pub points_earned: i32,
    pub last_accessed: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = quiz_attempts)]
pub struct NewQuizAttempt {
    pub quiz_id: Uuid,
    pub student_id: Uuid,
    pub score: i32,
    pub answers: JsonValue,
    // id and completed_at have DB defaults
}

#[derive(Queryable, Serialize, Deserialize, Debug, Clone)]
pub struct QuizAttemptRow {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub student_id: Uuid,
    pub score: i32,
    pub answers: JsonValue,
    pub completed_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = student_badges)]
pub struct NewStudentBadge {
    pub student_id: Uuid,
    pub badge_id: Uuid,
    // id and earned_at have DB defaults
}

/// Full course catalog row.
#[derive(Queryable, Debug, Clone)]
pub struct CourseRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub difficulty_level: String,
    pub content: Option<JsonValue>,
    pub teacher_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Full quiz row; `questions` stays opaque until parsed.
#[derive(Queryable, Debug, Clone)]
pub struct QuizRow {
    pub id: Uuid,
    pub title: String,
    pub course_id: Option<Uuid>,
    pub questions: JsonValue,
    pub total_points: i32,
    pub time_limit: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Full badge catalog row.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone)]
pub struct BadgeRow {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub points_required: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Profile column subset loaded for ranking.
#[derive(Queryable, Debug, Clone)]
pub struct RankedProfileRow {
    pub id: Uuid,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub total_points: i32,
    pub streak: i32,
}

/// A course decorated with the requesting student's progress (defaults for
/// anonymous callers or courses never started).
#[derive(Serialize, Deserialize, Debug)]
pub struct CourseWithProgress {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub difficulty_level: String,
    pub content: Option<JsonValue>,
    pub teacher_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,

    pub progress: i32,
    pub completed: bool,
    pub total_lessons: u32,
    pub completed_lessons: u32,
}

/// A catalog badge decorated with the requesting student's earned status.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BadgeStatus {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub points_required: Option<i32>,
    pub earned: bool,
    pub earned_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AwardBadgeResponse {
    pub newly_awarded: bool,
    pub earned_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct QuizView {
    pub id: Uuid,
    pub title: String,
    pub course_id: Option<Uuid>,
    pub questions: Vec<Question>,
    pub total_points: i32,
    pub time_limit: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct QuizzesResponse {
    pub quizzes: Vec<QuizView>,
    pub attempts: Vec<QuizAttemptRow>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SubmitAttemptResponse {
    pub attempt_id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub total_questions: u32,
    pub completed_at: DateTime<Utc>,
    pub review: Vec<QuestionReview>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LeaderboardEntry {
    pub profile_id: Uuid,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub total_points: i32,
    pub streak: i32,
    pub badges_count: i64,
    pub rank: u32,
    pub is_current_user: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleStatus {
    Completed,
    InProgress,
    Locked,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ModuleProgress {
    pub name: String,
    pub progress: i32,
    pub points: i32,
    pub status: ModuleStatus,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StudentStatsResponse {
    pub total_points: i32,
    pub level: i32,
    pub next_level_points: i32,
    pub streak: i32,
    pub streak_bonus_available: bool,
    pub weekly_goal: i32,
    pub weekly_progress: i32,
    pub rank: i64,
    pub total_students: i64,
    pub completed_courses: u32,
    pub completed_quizzes: u32,
    pub earned_badges: u32,
    pub modules: Vec<ModuleProgress>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StreakResponse {
    pub streak: i32,
    pub streak_bonus_available: bool,
    pub last_activity_date: NaiveDate,
}
