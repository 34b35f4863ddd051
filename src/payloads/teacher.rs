use serde::Deserialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Deserialize, Debug)]
pub struct CreateCoursePayload {
    pub teacher_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub difficulty_level: String,
    pub content: Option<JsonValue>,
}

#[derive(Deserialize, Debug)]
pub struct CreateQuizPayload {
    pub teacher_id: Uuid,
    pub title: String,
    pub course_id: Option<Uuid>,
    pub questions: JsonValue,
    pub total_points: i32,
    pub time_limit: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct CreateBadgePayload {
    pub teacher_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub points_required: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct ListStudentsParams {
    pub teacher_id: Uuid,
}

#[derive(Deserialize, Debug)]
pub struct GetCourseProgressParams {
    pub teacher_id: Uuid,
    pub course_id: Uuid,
}
