//! The admin HTTP surface (§6, §9): schedule CRUD and a read-only
//! metrics snapshot, built on `axum` as `gat-mcp-docs`'s thin JSON
//! surface in the retrieval pack does. Holds only a shared handle to
//! the `store` crate — per §5, it is the only state shared between the
//! reconciler and this surface, and the surface never touches
//! `cloudapi` or `engine`.
mod dto;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

pub use dto::{CreateScheduleRequest, ScheduleDto};
pub use handlers::SharedStore;

/// Builds the router: `GET /metrics`, `GET/POST/DELETE /schedules`, 404
/// on anything else.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/metrics", get(handlers::get_metrics))
        .route(
            "/schedules",
            get(handlers::list_schedules)
                .post(handlers::create_schedule)
                .delete(handlers::delete_schedule),
        )
        .fallback(handlers::not_found)
        .layer(axum::Extension(store))
}

/// Binds `addr` and serves the admin surface until the returned future
/// is dropped or errors. Intended to be spawned as its own task from
/// `main` (§5: "runs concurrently on a separate execution context").
pub async fn serve(addr: SocketAddr, store: Arc<dyn store::StatusStore>) -> std::io::Result<()> {
    let app = router(store);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "admin surface listening");
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use store::InMemoryStatusStore;
    use tower::ServiceExt;

    fn store() -> SharedStore {
        Arc::new(InMemoryStatusStore::new())
    }

    #[tokio::test]
    async fn metrics_renders_prometheus_style_lines() {
        let s = store();
        s.store_metrics(store::MetricsSnapshot::from([("spot_capacity".to_string(), 10.0)]))
            .await
            .unwrap();

        let app = router(s);
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text, "spotscaler_spot_capacity{} 10\n");
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let app = router(store());
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn post_then_list_then_delete_schedule() {
        let app = router(store());

        let body = serde_json::json!({
            "StartAt": Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            "EndAt": Utc.timestamp_opt(1_700_003_600, 0).unwrap(),
            "Capacity": 80.0,
        });
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/schedules")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: serde_json::Value =
            serde_json::from_slice(&axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
        let key = created["Key"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/schedules").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/schedules?key={key}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn delete_without_key_is_400() {
        let app = router(store());
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/schedules")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_start_after_end() {
        let app = router(store());
        let body = serde_json::json!({
            "StartAt": Utc.timestamp_opt(1_700_003_600, 0).unwrap(),
            "EndAt": Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            "Capacity": 80.0,
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/schedules")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
