use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ChoiceId, QuestionDraft, QuestionId};
use super::repository::PollRepository;
use super::service::{PollService, PollServiceError};
use super::views::LatestQuestions;

/// Router builder exposing the public poll surfaces plus administration.
pub fn poll_router<R>(service: Arc<PollService<R>>) -> Router
where
    R: PollRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/polls",
            get(index_handler::<R>).post(create_handler::<R>),
        )
        .route(
            "/api/v1/polls/:question_id",
            get(detail_handler::<R>).delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/polls/:question_id/results",
            get(results_handler::<R>),
        )
        .route("/api/v1/polls/:question_id/vote", post(vote_handler::<R>))
        .with_state(service)
}

/// Read controls shared by the listing and lookup endpoints. `as_of` pins the
/// evaluation instant so a response can be reproduced later; it defaults to
/// the arrival time of the request.
#[derive(Debug, Default, Deserialize)]
pub struct ReadQuery {
    pub as_of: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl ReadQuery {
    fn evaluation_instant(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub choice_id: ChoiceId,
}

pub(crate) async fn index_handler<R>(
    State(service): State<Arc<PollService<R>>>,
    Query(query): Query<ReadQuery>,
) -> Response
where
    R: PollRepository + 'static,
{
    let now = query.evaluation_instant();
    match service.latest(query.limit, now) {
        Ok(records) => {
            let summaries = records.iter().map(|record| record.summary(now)).collect();
            let view = LatestQuestions::new(now, summaries);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn detail_handler<R>(
    State(service): State<Arc<PollService<R>>>,
    Path(question_id): Path<u64>,
    Query(query): Query<ReadQuery>,
) -> Response
where
    R: PollRepository + 'static,
{
    let id = QuestionId(question_id);
    let now = query.evaluation_instant();
    match service.question(id, now) {
        Ok(record) => (StatusCode::OK, axum::Json(record.detail(now))).into_response(),
        Err(error) => not_found_or_internal(error),
    }
}

pub(crate) async fn results_handler<R>(
    State(service): State<Arc<PollService<R>>>,
    Path(question_id): Path<u64>,
    Query(query): Query<ReadQuery>,
) -> Response
where
    R: PollRepository + 'static,
{
    let id = QuestionId(question_id);
    let now = query.evaluation_instant();
    match service.results(id, now) {
        Ok(record) => (StatusCode::OK, axum::Json(record.results_view())).into_response(),
        Err(error) => not_found_or_internal(error),
    }
}

pub(crate) async fn vote_handler<R>(
    State(service): State<Arc<PollService<R>>>,
    Path(question_id): Path<u64>,
    Query(query): Query<ReadQuery>,
    axum::Json(request): axum::Json<VoteRequest>,
) -> Response
where
    R: PollRepository + 'static,
{
    let id = QuestionId(question_id);
    let now = query.evaluation_instant();
    match service.vote(id, request.choice_id, now) {
        Ok(record) => (StatusCode::OK, axum::Json(record.results_view())).into_response(),
        Err(error) => not_found_or_internal(error),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<PollService<R>>>,
    axum::Json(draft): axum::Json<QuestionDraft>,
) -> Response
where
    R: PollRepository + 'static,
{
    match service.create(draft) {
        Ok(record) => {
            let now = Utc::now();
            (StatusCode::CREATED, axum::Json(record.detail(now))).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<PollService<R>>>,
    Path(question_id): Path<u64>,
) -> Response
where
    R: PollRepository + 'static,
{
    let id = QuestionId(question_id);
    match service.delete(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => not_found_or_internal(error),
    }
}

fn not_found_or_internal(error: PollServiceError) -> Response {
    match error {
        PollServiceError::QuestionNotFound(_) | PollServiceError::ChoiceNotFound => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
