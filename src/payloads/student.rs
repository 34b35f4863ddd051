use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Deserialize, Debug)]
pub struct GetCoursesParams {
    pub student_id: Option<Uuid>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateProgressPayload {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub progress_percentage: i32,
}

#[derive(Deserialize, Debug)]
pub struct GetBadgesParams {
    pub student_id: Option<Uuid>,
}

#[derive(Deserialize, Debug)]
pub struct AwardBadgePayload {
    pub student_id: Uuid,
    pub badge_id: Uuid,
}

#[derive(Deserialize, Debug)]
pub struct GetQuizzesParams {
    pub student_id: Option<Uuid>,
}

#[derive(Deserialize, Debug)]
pub struct SubmitQuizAttemptPayload {
    pub student_id: Uuid,
    pub quiz_id: Uuid,
    pub answers: HashMap<i64, u32>,
}

#[derive(Deserialize, Debug)]
pub struct GetLeaderboardParams {
    pub student_id: Option<Uuid>,
}

#[derive(Deserialize, Debug)]
pub struct GetStudentStatsParams {
    pub student_id: Uuid,
}

#[derive(Deserialize, Debug)]
pub struct UpdateStreakPayload {
    pub student_id: Uuid,
}
