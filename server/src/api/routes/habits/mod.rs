//! Habit API endpoints

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;

use crate::api::extractors::{HabitPath, ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, ErrorBody};
use crate::domain::{HabitService, Requester};
use crate::utils::time::today_utc;

use types::{
    CompleteResponse, CreateHabitRequest, HabitDto, ListHabitsQuery, MessageResponse,
    ProgressResponse, RequesterBody, UpdateHabitRequest,
};

/// Source of the current UTC date
pub type Clock = fn() -> NaiveDate;

/// Shared state for Habits API endpoints
#[derive(Clone)]
pub struct HabitsApiState {
    pub habits: HabitService,
    pub clock: Clock,
}

/// Build Habits API routes
pub fn routes(habits: HabitService) -> Router<()> {
    routes_with_clock(habits, today_utc)
}

/// Build Habits API routes with an explicit date source
pub fn routes_with_clock(habits: HabitService, clock: Clock) -> Router<()> {
    let state = HabitsApiState { habits, clock };

    Router::new()
        .route("/", get(list_habits).post(create_habit))
        .route("/recent", get(recent_habits))
        .route(
            "/{habitId}",
            get(get_habit).patch(update_habit).delete(delete_habit),
        )
        .route("/{habitId}/complete", post(complete_habit))
        .route("/{habitId}/progress", get(habit_progress))
        .with_state(state)
}

fn to_dtos(habits: Vec<crate::data::types::Habit>) -> Vec<HabitDto> {
    habits.into_iter().map(HabitDto::from).collect()
}

/// List habits, newest first
#[utoipa::path(
    get,
    path = "/api/v1/habits",
    tag = "habits",
    params(
        ("userEmail" = Option<String>, Query, description = "Only habits owned by this email"),
        ("category" = Option<String>, Query, description = "Only habits in this category")
    ),
    responses(
        (status = 200, description = "Matching habits", body = Vec<HabitDto>),
        (status = 400, description = "Invalid query", body = ErrorBody)
    )
)]
pub async fn list_habits(
    State(state): State<HabitsApiState>,
    ValidatedQuery(query): ValidatedQuery<ListHabitsQuery>,
) -> Result<Json<Vec<HabitDto>>, ApiError> {
    let habits = state.habits.list(&query.into_filter()).await?;
    Ok(Json(to_dtos(habits)))
}

/// Newest habits across all users
#[utoipa::path(
    get,
    path = "/api/v1/habits/recent",
    tag = "habits",
    responses(
        (status = 200, description = "Most recently created habits", body = Vec<HabitDto>)
    )
)]
pub async fn recent_habits(
    State(state): State<HabitsApiState>,
) -> Result<Json<Vec<HabitDto>>, ApiError> {
    let habits = state.habits.recent().await?;
    Ok(Json(to_dtos(habits)))
}

/// Create a habit
#[utoipa::path(
    post,
    path = "/api/v1/habits",
    tag = "habits",
    request_body = CreateHabitRequest,
    responses(
        (status = 201, description = "Habit created", body = HabitDto),
        (status = 400, description = "Invalid request", body = ErrorBody)
    )
)]
pub async fn create_habit(
    State(state): State<HabitsApiState>,
    ValidatedJson(body): ValidatedJson<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitDto>), ApiError> {
    let habit = state.habits.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(HabitDto::from(habit))))
}

/// Get a single habit
#[utoipa::path(
    get,
    path = "/api/v1/habits/{habitId}",
    tag = "habits",
    params(("habitId" = String, Path, description = "Habit id")),
    responses(
        (status = 200, description = "Habit details", body = HabitDto),
        (status = 400, description = "Malformed habit id", body = ErrorBody),
        (status = 404, description = "Habit not found", body = ErrorBody)
    )
)]
pub async fn get_habit(
    State(state): State<HabitsApiState>,
    path: HabitPath,
) -> Result<Json<HabitDto>, ApiError> {
    let habit = state.habits.get(&path.habit_id).await?;
    Ok(Json(HabitDto::from(habit)))
}

/// Update a habit (owner only)
#[utoipa::path(
    patch,
    path = "/api/v1/habits/{habitId}",
    tag = "habits",
    params(("habitId" = String, Path, description = "Habit id")),
    request_body = UpdateHabitRequest,
    responses(
        (status = 200, description = "Habit updated", body = HabitDto),
        (status = 400, description = "Invalid request or no changes", body = ErrorBody),
        (status = 403, description = "Requester is not the owner", body = ErrorBody),
        (status = 404, description = "Habit not found", body = ErrorBody)
    )
)]
pub async fn update_habit(
    State(state): State<HabitsApiState>,
    path: HabitPath,
    ValidatedJson(body): ValidatedJson<UpdateHabitRequest>,
) -> Result<Json<HabitDto>, ApiError> {
    let (email, changes) = body.into_parts();
    let habit = state
        .habits
        .update(&path.habit_id, &Requester::new(email), changes)
        .await?;
    Ok(Json(HabitDto::from(habit)))
}

/// Delete a habit (owner only)
#[utoipa::path(
    delete,
    path = "/api/v1/habits/{habitId}",
    tag = "habits",
    params(("habitId" = String, Path, description = "Habit id")),
    request_body = RequesterBody,
    responses(
        (status = 200, description = "Habit deleted", body = MessageResponse),
        (status = 403, description = "Requester is not the owner", body = ErrorBody),
        (status = 404, description = "Habit not found", body = ErrorBody)
    )
)]
pub async fn delete_habit(
    State(state): State<HabitsApiState>,
    path: HabitPath,
    ValidatedJson(body): ValidatedJson<RequesterBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .habits
        .delete(&path.habit_id, &Requester::new(body.user_email))
        .await?;
    Ok(Json(MessageResponse {
        message: "Habit deleted".to_string(),
    }))
}

/// Mark a habit complete for today (owner only)
#[utoipa::path(
    post,
    path = "/api/v1/habits/{habitId}/complete",
    tag = "habits",
    params(("habitId" = String, Path, description = "Habit id")),
    request_body = RequesterBody,
    responses(
        (status = 200, description = "Completion recorded", body = CompleteResponse),
        (status = 403, description = "Requester is not the owner", body = ErrorBody),
        (status = 404, description = "Habit not found", body = ErrorBody),
        (status = 409, description = "Already completed today", body = ErrorBody),
        (status = 422, description = "Stored history holds a malformed date", body = ErrorBody)
    )
)]
pub async fn complete_habit(
    State(state): State<HabitsApiState>,
    path: HabitPath,
    ValidatedJson(body): ValidatedJson<RequesterBody>,
) -> Result<Json<CompleteResponse>, ApiError> {
    let completion_history = state
        .habits
        .complete(
            &path.habit_id,
            &Requester::new(body.user_email),
            (state.clock)(),
        )
        .await?;
    Ok(Json(CompleteResponse {
        message: "Habit marked complete".to_string(),
        completion_history,
    }))
}

/// Progress and streak over the trailing 30 days
#[utoipa::path(
    get,
    path = "/api/v1/habits/{habitId}/progress",
    tag = "habits",
    params(("habitId" = String, Path, description = "Habit id")),
    responses(
        (status = 200, description = "Habit progress", body = ProgressResponse),
        (status = 404, description = "Habit not found", body = ErrorBody),
        (status = 422, description = "Stored history holds a malformed date", body = ErrorBody)
    )
)]
pub async fn habit_progress(
    State(state): State<HabitsApiState>,
    path: HabitPath,
) -> Result<Json<ProgressResponse>, ApiError> {
    let (habit, progress) = state
        .habits
        .progress(&path.habit_id, (state.clock)())
        .await?;
    Ok(Json(ProgressResponse::new(habit, progress)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request};
    use bson::oid::ObjectId;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::data::types::{Habit, NewHabit};
    use crate::data::{HabitStore, InMemoryHabitStore};

    const OWNER: &str = "owner@example.com";

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    struct TestApp {
        router: Router,
        repo: Arc<InMemoryHabitStore>,
    }

    impl TestApp {
        fn new() -> Self {
            let repo = Arc::new(InMemoryHabitStore::new());
            let service = HabitService::with_email_policy(HabitStore::from_repository(repo.clone()));
            let router = Router::new().nest("/api/v1/habits", routes_with_clock(service, fixed_today));
            Self { router, repo }
        }

        fn seed(&self, email: &str, history: &[&str]) -> Habit {
            let mut habit = Habit::from_new(NewHabit {
                user_email: email.to_string(),
                title: "Meditate".to_string(),
                category: Some("Mindfulness".to_string()),
                ..Default::default()
            });
            habit.completion_history = history.iter().map(|d| d.to_string()).collect();
            self.repo.insert(habit.clone());
            habit
        }

        async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let builder = Request::builder().method(method).uri(uri);
            let request = match body {
                Some(body) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }
    }

    #[tokio::test]
    async fn test_create_and_get_habit() {
        let app = TestApp::new();
        let (status, created) = app
            .send(
                Method::POST,
                "/api/v1/habits",
                Some(json!({ "userEmail": OWNER, "title": "Read", "category": "Study" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "Read");
        assert_eq!(created["completionHistory"], json!([]));

        let id = created["_id"].as_str().unwrap();
        let (status, fetched) = app
            .send(Method::GET, &format!("/api/v1/habits/{}", id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["userEmail"], OWNER);
    }

    #[tokio::test]
    async fn test_create_requires_user_email() {
        let app = TestApp::new();
        let (status, body) = app
            .send(Method::POST, "/api/v1/habits", Some(json!({ "title": "Read" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "userEmail required");
    }

    #[tokio::test]
    async fn test_list_filters() {
        let app = TestApp::new();
        app.seed(OWNER, &[]);
        app.seed("other@example.com", &[]);

        let (status, all) = app.send(Method::GET, "/api/v1/habits", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, mine) = app
            .send(
                Method::GET,
                "/api/v1/habits?userEmail=owner%40example.com&category=Mindfulness",
                None,
            )
            .await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
        assert_eq!(mine[0]["userEmail"], OWNER);

        let (_, none) = app
            .send(Method::GET, "/api/v1/habits?category=Fitness", None)
            .await;
        assert!(none.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_limit() {
        let app = TestApp::new();
        for _ in 0..8 {
            app.seed(OWNER, &[]);
        }
        let (status, recent) = app.send(Method::GET, "/api/v1/habits/recent", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(recent.as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_get_unknown_and_malformed_ids() {
        let app = TestApp::new();
        let (status, body) = app
            .send(
                Method::GET,
                &format!("/api/v1/habits/{}", ObjectId::new().to_hex()),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "HABIT_NOT_FOUND");

        let (status, body) = app.send(Method::GET, "/api/v1/habits/xyz", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_HABIT_ID");
    }

    #[tokio::test]
    async fn test_update_owner_only() {
        let app = TestApp::new();
        let habit = app.seed(OWNER, &[]);
        let uri = format!("/api/v1/habits/{}", habit.id.to_hex());

        let (status, body) = app
            .send(
                Method::PATCH,
                &uri,
                Some(json!({ "userEmail": "intruder@example.com", "title": "Mine now" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "You can only update your own habit");

        let (status, body) = app
            .send(
                Method::PATCH,
                &uri,
                Some(json!({ "userEmail": OWNER, "title": "Meditate daily", "category": "" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Meditate daily");
        assert_eq!(body["category"], "Mindfulness");

        let (status, body) = app
            .send(Method::PATCH, &uri, Some(json!({ "title": "No email" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "userEmail required");
    }

    #[tokio::test]
    async fn test_delete_owner_only() {
        let app = TestApp::new();
        let habit = app.seed(OWNER, &[]);
        let uri = format!("/api/v1/habits/{}", habit.id.to_hex());

        let (status, _) = app
            .send(
                Method::DELETE,
                &uri,
                Some(json!({ "userEmail": "other@example.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .send(Method::DELETE, &uri, Some(json!({ "userEmail": OWNER })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Habit deleted");

        let (status, _) = app.send(Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_complete_then_duplicate() {
        let app = TestApp::new();
        let habit = app.seed(OWNER, &["2024-03-09"]);
        let uri = format!("/api/v1/habits/{}/complete", habit.id.to_hex());

        let (status, body) = app
            .send(Method::POST, &uri, Some(json!({ "userEmail": OWNER })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completionHistory"], json!(["2024-03-09", "2024-03-10"]));

        let (status, body) = app
            .send(Method::POST, &uri, Some(json!({ "userEmail": OWNER })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_COMPLETED");
    }

    #[tokio::test]
    async fn test_complete_checks_owner_before_tracker() {
        let app = TestApp::new();
        let habit = app.seed(OWNER, &["garbage"]);
        let uri = format!("/api/v1/habits/{}/complete", habit.id.to_hex());

        let (status, _) = app
            .send(
                Method::POST,
                &uri,
                Some(json!({ "userEmail": "other@example.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .send(Method::POST, &uri, Some(json!({ "userEmail": OWNER })))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "MALFORMED_DATE");
    }

    #[tokio::test]
    async fn test_complete_missing_habit() {
        let app = TestApp::new();
        let uri = format!("/api/v1/habits/{}/complete", ObjectId::new().to_hex());
        let (status, _) = app
            .send(Method::POST, &uri, Some(json!({ "userEmail": OWNER })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_progress() {
        let app = TestApp::new();
        let habit = app.seed(OWNER, &["2024-03-10", "2024-03-09", "2024-02-01"]);
        let uri = format!("/api/v1/habits/{}/progress", habit.id.to_hex());

        let (status, body) = app.send(Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["progress"], 7);
        assert_eq!(body["streak"], 2);
        assert_eq!(body["completedInWindow"], json!(["2024-03-10", "2024-03-09"]));
        assert_eq!(body["habit"]["_id"], habit.id.to_hex());
    }

    #[tokio::test]
    async fn test_progress_empty_history() {
        let app = TestApp::new();
        let habit = app.seed(OWNER, &[]);
        let uri = format!("/api/v1/habits/{}/progress", habit.id.to_hex());

        let (status, body) = app.send(Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["progress"], 0);
        assert_eq!(body["streak"], 0);
        assert_eq!(body["completedInWindow"], json!([]));
    }
}
