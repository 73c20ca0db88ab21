//! API server initialization

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware;
use super::openapi::openapi_json;
use super::routes::{habits, health};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;

/// Build the full application router
pub fn build_router(app: &CoreApp) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/api/openapi.json", get(openapi_json))
        .nest("/api/v1/health", health::routes(app.store.clone()))
        .nest("/api/v1/habits", habits::routes(app.habits.clone()))
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(middleware::cors(&app.config.server.cors_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
}

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Serve until shutdown; returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;

        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.trim_matches(|c| c == '[' || c == ']');
        let addr = match host {
            "localhost" => SocketAddr::from(([127, 0, 0, 1], app.config.server.port)),
            _ => SocketAddr::new(
                host.parse()
                    .with_context(|| format!("Invalid server.host: {}", app.config.server.host))?,
                app.config.server.port,
            ),
        };

        let router = build_router(&app);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!(%addr, "Listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AppConfig, DatabaseConfig, ServerConfig, StoreBackend};
    use crate::data::HabitStore;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    fn test_app(cors_origins: Vec<String>) -> CoreApp {
        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                cors_origins,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                mongo: None,
            },
        };
        CoreApp::from_parts(config, HabitStore::in_memory())
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_root_liveness() {
        let router = build_router(&test_app(Vec::new()));
        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "App is running");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let router = build_router(&test_app(Vec::new()));
        let response = router
            .oneshot(Request::get("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_habits_and_health_mounted() {
        let router = build_router(&test_app(Vec::new()));
        let response = router
            .clone()
            .oneshot(Request::get("/api/v1/habits").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "[]");

        let response = router
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_openapi_served() {
        let router = build_router(&test_app(Vec::new()));
        let response = router
            .oneshot(
                Request::get("/api/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let doc: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(doc["info"]["title"], "Habitrack API");
    }

    #[tokio::test]
    async fn test_cors_any_origin_by_default() {
        let router = build_router(&test_app(Vec::new()));
        let response = router
            .oneshot(
                Request::get("/api/v1/habits")
                    .header(header::ORIGIN, "https://anywhere.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_restricted_origins() {
        let router = build_router(&test_app(vec!["https://app.example".to_string()]));
        let response = router
            .clone()
            .oneshot(
                Request::get("/api/v1/habits")
                    .header(header::ORIGIN, "https://app.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://app.example"
        );

        let response = router
            .oneshot(
                Request::get("/api/v1/habits")
                    .header(header::ORIGIN, "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }
}
