//! Pure gamification derivations shared by the API handlers.
//!
//! Everything in here is synchronous and side-effect free: progress/point
//! formulas, level bands, streak transitions, and the merge/rank helpers
//! that turn raw table rows into the decorated view models.

use crate::model::student::{
    BadgeRow, BadgeStatus, LeaderboardEntry, ModuleStatus, RankedProfileRow,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Width of one level band, in points.
pub const LEVEL_BAND_POINTS: i32 = 200;

/// Consecutive-day streak length required before the streak bonus can be
/// claimed.
pub const STREAK_BONUS_DAYS: i32 = 7;

/// Fixed weekly point goal shown on the student dashboard.
pub const WEEKLY_GOAL_POINTS: i32 = 300;

/// Clamps a progress percentage into [0, 100]. The database is not trusted
/// to enforce the range, so every write path goes through this first.
pub fn clamp_progress(pct: i32) -> i32 {
    pct.clamp(0, 100)
}

/// A course counts as completed exactly when progress reaches 100%.
pub fn is_completed(pct: i32) -> bool {
    pct >= 100
}

/// Points for a progress percentage: 10 points per full 10% band.
pub fn points_for_progress(pct: i32) -> i32 {
    (clamp_progress(pct) / 10) * 10
}

/// Number of lessons counted as done: round(pct/100 × total).
pub fn completed_lessons(pct: i32, total_lessons: u32) -> u32 {
    let fraction = f64::from(clamp_progress(pct)) / 100.0;
    (fraction * f64::from(total_lessons)).round() as u32
}

/// Level for a point total: fixed 200-point bands, starting at level 1.
pub fn level_for_points(total_points: i32) -> i32 {
    total_points.max(0) / LEVEL_BAND_POINTS + 1
}

/// Point total at which the next level starts. Strictly greater than
/// `total_points` for every non-negative input.
pub fn next_level_points(total_points: i32) -> i32 {
    level_for_points(total_points) * LEVEL_BAND_POINTS
}

pub fn streak_bonus_available(streak: i32) -> bool {
    streak >= STREAK_BONUS_DAYS
}

/// Streak transition for an activity recorded `today`: consecutive-day
/// activity increments, same-day activity is a no-op, a gap resets to 1.
pub fn next_streak(current: i32, last_activity: Option<NaiveDate>, today: NaiveDate) -> i32 {
    match last_activity {
        Some(last) if last == today => current,
        Some(last) if today - last == Duration::days(1) => current + 1,
        _ => 1,
    }
}

/// Derived status of one course module row on the student dashboard.
pub fn module_status(pct: i32, completed: bool) -> ModuleStatus {
    if completed {
        ModuleStatus::Completed
    } else if pct > 0 {
        ModuleStatus::InProgress
    } else {
        ModuleStatus::Locked
    }
}

/// Sums points from progress rows touched within the last 7 days.
pub fn weekly_points<I>(entries: I, now: DateTime<Utc>) -> i32
where
    I: IntoIterator<Item = (DateTime<Utc>, i32)>,
{
    let week_ago = now - Duration::days(7);
    entries
        .into_iter()
        .filter(|(last_accessed, _)| *last_accessed > week_ago)
        .map(|(_, points)| points)
        .sum()
}

/// Decorates the badge catalog with a student's earned overlay.
///
/// `earned` holds the student's (badge_id, earned_at) join rows; membership
/// is monotonic because award rows are insert-only. Catalog order is
/// preserved.
pub fn decorate_badges(catalog: Vec<BadgeRow>, earned: &[(Uuid, DateTime<Utc>)]) -> Vec<BadgeStatus> {
    let earned_at: HashMap<Uuid, DateTime<Utc>> = earned.iter().copied().collect();

    catalog
        .into_iter()
        .map(|badge| {
            let earned_at = earned_at.get(&badge.id).copied();
            BadgeStatus {
                id: badge.id,
                name: badge.name,
                category: badge.category,
                icon: badge.icon,
                description: badge.description,
                points_required: badge.points_required,
                earned: earned_at.is_some(),
                earned_at,
            }
        })
        .collect()
}

/// Builds the ranked leaderboard from profile rows and per-student badge
/// counts.
///
/// Ordering is total points descending with profile id ascending as the
/// deterministic tie-break; rank is the 1-based position after that sort.
/// The entry matching `current` (if any) is flagged.
pub fn rank_leaderboard(
    mut profiles: Vec<RankedProfileRow>,
    badge_counts: &HashMap<Uuid, i64>,
    current: Option<Uuid>,
) -> Vec<LeaderboardEntry> {
    profiles.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.id.cmp(&b.id))
    });

    profiles
        .into_iter()
        .enumerate()
        .map(|(index, profile)| LeaderboardEntry {
            is_current_user: current == Some(profile.id),
            badges_count: badge_counts.get(&profile.id).copied().unwrap_or(0),
            rank: index as u32 + 1,
            profile_id: profile.id,
            full_name: profile.full_name,
            avatar_url: profile.avatar_url,
            total_points: profile.total_points,
            streak: profile.streak,
        })
        .collect()
}
