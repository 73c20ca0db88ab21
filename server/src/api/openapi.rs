//! OpenAPI document

use axum::http::header;
use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{habits, health};
use crate::api::types::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Habitrack API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Habit tracking with daily completions, 30-day progress and streaks"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "habits", description = "Habit management and completion tracking")
    ),
    paths(
        health::health,
        habits::list_habits,
        habits::recent_habits,
        habits::create_habit,
        habits::get_habit,
        habits::update_habit,
        habits::delete_habit,
        habits::complete_habit,
        habits::habit_progress,
    ),
    components(schemas(
        ErrorBody,
        health::HealthResponse,
        habits::types::HabitDto,
        habits::types::ListHabitsQuery,
        habits::types::CreateHabitRequest,
        habits::types::UpdateHabitRequest,
        habits::types::RequesterBody,
        habits::types::CompleteResponse,
        habits::types::ProgressResponse,
        habits::types::MessageResponse,
    ))
)]
pub struct ApiDoc;

/// Serve the OpenAPI JSON document
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}
