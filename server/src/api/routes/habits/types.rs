//! Habit API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::{Habit, HabitChanges, HabitFilter, NewHabit};
use crate::domain::Progress;

/// Habit DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HabitDto {
    /// Habit id (24 hex characters)
    #[serde(rename = "_id")]
    pub id: String,
    pub user_email: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Completion dates (`YYYY-MM-DD`) in insertion order
    pub completion_history: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Habit> for HabitDto {
    fn from(habit: Habit) -> Self {
        Self {
            id: habit.id.to_hex(),
            user_email: habit.user_email,
            title: habit.title,
            description: habit.description,
            category: habit.category,
            reminder_time: habit.reminder_time,
            image: habit.image,
            completion_history: habit.completion_history,
            created_at: habit.created_at.map(|dt| dt.to_chrono()),
        }
    }
}

/// Query params for listing habits
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListHabitsQuery {
    /// Only habits owned by this email
    #[validate(length(max = 320, message = "userEmail too long"))]
    pub user_email: Option<String>,
    /// Only habits in this category
    #[validate(length(max = 100, message = "category too long"))]
    pub category: Option<String>,
}

impl ListHabitsQuery {
    /// Empty query values mean "no filter"
    pub fn into_filter(self) -> HabitFilter {
        HabitFilter {
            user_email: self.user_email.filter(|v| !v.is_empty()),
            category: self.category.filter(|v| !v.is_empty()),
        }
    }
}

/// Request body for creating a habit
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitRequest {
    /// Owner email
    #[serde(default)]
    #[validate(length(min = 1, max = 320, message = "userEmail required"))]
    pub user_email: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,
    pub category: Option<String>,
    /// Free-form reminder time, e.g. `07:30`
    pub reminder_time: Option<String>,
    /// Image URL
    pub image: Option<String>,
}

impl From<CreateHabitRequest> for NewHabit {
    fn from(req: CreateHabitRequest) -> Self {
        Self {
            user_email: req.user_email,
            title: req.title,
            description: req.description,
            category: req.category,
            reminder_time: req.reminder_time,
            image: req.image,
        }
    }
}

/// Request body for a partial habit update
///
/// Only non-empty provided fields are written.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabitRequest {
    /// Requester email; must match the habit owner
    #[serde(default)]
    #[validate(length(min = 1, message = "userEmail required"))]
    pub user_email: String,

    #[validate(length(max = 200, message = "title must be at most 200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub reminder_time: Option<String>,
    pub image: Option<String>,
}

impl UpdateHabitRequest {
    pub fn into_parts(self) -> (String, HabitChanges) {
        (
            self.user_email,
            HabitChanges {
                title: self.title,
                description: self.description,
                category: self.category,
                reminder_time: self.reminder_time,
                image: self.image,
            },
        )
    }
}

/// Request body identifying the requester (delete, complete)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequesterBody {
    #[serde(default)]
    #[validate(length(min = 1, message = "userEmail required"))]
    pub user_email: String,
}

/// Response for a recorded completion
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    pub message: String,
    pub completion_history: Vec<String>,
}

/// Progress over the trailing 30 days
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub habit: HabitDto,
    /// Percentage of the window completed, 0-100
    pub progress: u32,
    /// Consecutive completed days ending today
    pub streak: u32,
    /// Completed dates inside the window, in history order
    pub completed_in_window: Vec<String>,
}

impl ProgressResponse {
    pub fn new(habit: Habit, progress: Progress) -> Self {
        Self {
            habit: habit.into(),
            progress: progress.progress_percent,
            streak: progress.streak,
            completed_in_window: progress.completed_in_window,
        }
    }
}

/// Plain message response
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
