use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info, warn};

use store::{Schedule, StatusStore};

use crate::dto::{CreateScheduleRequest, DeleteScheduleQuery, ScheduleDto};

pub type SharedStore = Arc<dyn StatusStore>;

/// `GET /metrics`: one line per metric, `spotscaler_<name>{} <value>\n`
/// (§6, matching the original's `httpapi.Handler.handleMetrics`).
pub async fn get_metrics(Extension(store): Extension<SharedStore>) -> Response {
    match store.get_metrics().await {
        Ok(metrics) => {
            let mut body = String::new();
            for (name, value) in metrics {
                body.push_str(&format!("spotscaler_{name}{{}} {value}\n"));
            }
            (StatusCode::OK, body).into_response()
        }
        Err(e) => {
            warn!(error = %e, "failed to read metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// `GET /schedules`: JSON array of `{Key, StartAt, EndAt, Capacity}`.
pub async fn list_schedules(Extension(store): Extension<SharedStore>) -> Response {
    match store.list_schedules().await {
        Ok(schedules) => {
            let dtos: Vec<ScheduleDto> = schedules.into_iter().map(ScheduleDto::from).collect();
            Json(dtos).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// `POST /schedules`: server assigns `Key`, returns the created object
/// with HTTP 201. A schema error (including `StartAt >= EndAt`) is 400.
pub async fn create_schedule(
    Extension(store): Extension<SharedStore>,
    Json(req): Json<CreateScheduleRequest>,
) -> Response {
    if req.start_at >= req.end_at {
        return (StatusCode::BAD_REQUEST, "StartAt must be before EndAt").into_response();
    }
    if req.capacity <= 0.0 {
        return (StatusCode::BAD_REQUEST, "Capacity must be positive").into_response();
    }

    let schedule = Schedule::new(req.start_at, req.end_at, req.capacity);
    match store.add_schedule(schedule.clone()).await {
        Ok(()) => {
            info!(key = %schedule.key, "schedule created");
            (StatusCode::CREATED, Json(ScheduleDto::from(schedule))).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// `DELETE /schedules?key=<k>`: 400 if `key` is missing, 200 on success.
/// An unknown key is also reported as 400, mirroring the original's
/// `deleteSchedulesHandler` treating `RemoveSchedule`'s error as a
/// client-facing 400 rather than a 404.
pub async fn delete_schedule(
    Extension(store): Extension<SharedStore>,
    Query(query): Query<DeleteScheduleQuery>,
) -> Response {
    let Some(key) = query.key else {
        return (StatusCode::BAD_REQUEST, "key is not specified").into_response();
    };

    match store.remove_schedule(&key).await {
        Ok(()) => {
            info!(key = %key, "schedule deleted");
            Json(serde_json::json!({ "key": key, "deleted": true })).into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 not found").into_response()
}
