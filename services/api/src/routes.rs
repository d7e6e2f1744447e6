use crate::infra::{seed_service, AppState};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use pollboard::error::AppError;
use pollboard::polls::{
    poll_router, PollCsvImporter, PollRepository, PollService, QuestionId,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct PollImportRequest {
    pub(crate) csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PollImportResponse {
    pub(crate) imported: usize,
    pub(crate) question_ids: Vec<QuestionId>,
}

pub(crate) fn with_poll_routes<R>(service: Arc<PollService<R>>) -> axum::Router
where
    R: PollRepository + 'static,
{
    poll_router(service.clone())
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/polls/import",
            axum::routing::post(poll_import_endpoint::<R>).with_state(service),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn poll_import_endpoint<R>(
    State(service): State<Arc<PollService<R>>>,
    Json(payload): Json<PollImportRequest>,
) -> Result<Json<PollImportResponse>, AppError>
where
    R: PollRepository + 'static,
{
    let reader = Cursor::new(payload.csv.into_bytes());
    let drafts = PollCsvImporter::from_reader(reader)?;
    let records = seed_service(&service, drafts)?;

    let question_ids: Vec<QuestionId> = records
        .iter()
        .map(|record| record.question.id)
        .collect();

    Ok(Json(PollImportResponse {
        imported: question_ids.len(),
        question_ids,
    }))
}
