//! Quiz session state machine and scoring.
//!
//! A session lives entirely on the client side of the API: it is created
//! from a quiz's question list, collects answers while a countdown runs,
//! and terminates in a single submitted result. The scoring function is
//! shared with the `submit_quiz_attempt` handler so the timeout path, the
//! manual-submit path and the persisted attempt all agree on the score.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Countdown applied when a quiz row carries no time limit, in minutes.
pub const DEFAULT_TIME_LIMIT_MINUTES: i32 = 10;

/// One quiz question as stored in the `quizzes.questions` blob.
///
/// `points` exists in the stored shape but scoring is equal-weight: one
/// point per correctly answered question.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub correct: u32,
    #[serde(default = "default_question_points")]
    pub points: i32,
}

fn default_question_points() -> i32 {
    10
}

/// Per-question entry of the post-submission review.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub question_id: i64,
    pub chosen: Option<u32>,
    pub correct: u32,
    pub is_correct: bool,
}

/// Final result of one quiz pass.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuizResults {
    pub score: i32,
    pub total_questions: u32,
    pub review: Vec<QuestionReview>,
}

/// Counts one point per question whose chosen index equals the correct
/// index. Unanswered questions and stray answer keys score nothing.
pub fn score_answers(questions: &[Question], answers: &HashMap<i64, u32>) -> i32 {
    questions
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&q.correct))
        .count() as i32
}

/// Scores and builds the per-question review in one pass.
pub fn grade(questions: &[Question], answers: &HashMap<i64, u32>) -> QuizResults {
    let review: Vec<QuestionReview> = questions
        .iter()
        .map(|q| {
            let chosen = answers.get(&q.id).copied();
            QuestionReview {
                question_id: q.id,
                chosen,
                correct: q.correct,
                is_correct: chosen == Some(q.correct),
            }
        })
        .collect();

    QuizResults {
        score: review.iter().filter(|r| r.is_correct).count() as i32,
        total_questions: questions.len() as u32,
        review,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    InProgress,
    Submitted,
}

/// An in-flight quiz pass for a single learner.
#[derive(Debug)]
pub struct QuizSession {
    questions: Vec<Question>,
    current: usize,
    answers: HashMap<i64, u32>,
    seconds_remaining: u32,
    phase: QuizPhase,
    results: Option<QuizResults>,
}

impl QuizSession {
    /// Starts a session with the countdown set to `time_limit` minutes
    /// (default 10 when absent or non-positive).
    pub fn new(questions: Vec<Question>, time_limit_minutes: Option<i32>) -> Self {
        let minutes = match time_limit_minutes {
            Some(m) if m > 0 => m,
            _ => DEFAULT_TIME_LIMIT_MINUTES,
        };
        Self::with_countdown(questions, minutes as u32 * 60)
    }

    /// Starts a session with an explicit countdown in seconds.
    pub fn with_countdown(questions: Vec<Question>, seconds: u32) -> Self {
        QuizSession {
            questions,
            current: 0,
            answers: HashMap::new(),
            seconds_remaining: seconds,
            phase: QuizPhase::InProgress,
            results: None,
        }
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    /// Records an answer for the currently displayed question,
    /// overwriting any earlier choice (last write wins). Ignored once
    /// submitted.
    pub fn select_answer(&mut self, choice: u32) {
        if self.phase == QuizPhase::Submitted {
            return;
        }
        if let Some(question) = self.questions.get(self.current) {
            self.answers.insert(question.id, choice);
        }
    }

    /// Moves the displayed question forward. Navigation never mutates
    /// recorded answers.
    pub fn next(&mut self) {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
    }

    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// One second of countdown. Returns the results when the timer hits
    /// zero (the timeout drives the same scoring path as a manual
    /// submit), and `None` otherwise. A submitted session never ticks, so
    /// a driver that reschedules only on `None`-with-time-left cannot
    /// leak across quiz instances.
    pub fn tick(&mut self) -> Option<QuizResults> {
        if self.phase == QuizPhase::Submitted {
            return None;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            debug!("Quiz countdown expired, auto-submitting");
            return Some(self.submit());
        }
        None
    }

    /// Scores the collected answers and ends the session. Idempotent:
    /// repeated calls return the recorded results.
    pub fn submit(&mut self) -> QuizResults {
        if let Some(results) = &self.results {
            return results.clone();
        }
        let results = grade(&self.questions, &self.answers);
        self.phase = QuizPhase::Submitted;
        self.results = Some(results.clone());
        results
    }
}

/// Drives a session's one-second countdown until it expires or the
/// session is submitted elsewhere.
///
/// Returns the results when the timeout fired the submission, `None` when
/// a manual submit won the race. Either way the loop exits, which is the
/// cancellation guarantee for the recurring tick.
pub async fn run_countdown(session: Arc<Mutex<QuizSession>>) -> Option<QuizResults> {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
    interval.tick().await; // first tick resolves immediately
    loop {
        interval.tick().await;
        // a poisoned lock still holds a coherent session; recover the guard
        let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
        if session.phase() == QuizPhase::Submitted {
            return None;
        }
        if let Some(results) = session.tick() {
            return Some(results);
        }
    }
}
