use crate::schema::badges;
use crate::schema::courses;
use crate::schema::quizzes;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Insertable, Debug)]
#[diesel(table_name = courses)]
pub struct NewCourse {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub difficulty_level: String,
    pub content: Option<JsonValue>,
    pub teacher_id: Option<Uuid>,
    // id and created_at have DB defaults
}

#[derive(Insertable, Debug)]
#[diesel(table_name = quizzes)]
pub struct NewQuiz {
    pub title: String,
    pub course_id: Option<Uuid>,
    pub questions: JsonValue,
    pub total_points: i32,
    pub time_limit: Option<i32>,
    // id and created_at have DB defaults
}

#[derive(Insertable, Debug)]
#[diesel(table_name = badges)]
pub struct NewBadge {
    pub name: String,
    pub category: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub points_required: Option<i32>,
    // id and created_at have DB defaults
}

/// One student row of the class roster.
#[derive(Queryable, Serialize, Deserialize, Debug)]
pub struct StudentOverview {
    pub id: Uuid,
    pub full_name: String,
    pub total_points: i32,
    pub streak: i32,
    pub last_activity_date: Option<NaiveDate>,
}

/// One student's progress in a single course, for the class overview.
#[derive(Queryable, Serialize, Deserialize, Debug)]
pub struct CourseProgressEntry {
    pub student_id: Uuid,
    pub full_name: String,
    pub progress_percentage: i32,
    pub completed: bool,
    pub points_earned: i32,
    pub last_accessed: DateTime<Utc>,
}
