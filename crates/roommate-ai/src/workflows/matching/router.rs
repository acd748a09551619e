use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{SuggestionId, SuggestionStatus, UserId};
use super::repository::{CompatibilityScorer, ProfileStore, SuggestionStore, SuggestionStoreError};
use super::service::{GenerationRequest, SuggestionService, SuggestionServiceError};

type SharedService<P, C, S> = Arc<SuggestionService<P, C, S>>;

/// Router builder exposing suggestion generation, retrieval, and status updates.
pub fn matching_router<P, C, S>(service: SharedService<P, C, S>) -> Router
where
    P: ProfileStore + 'static,
    C: CompatibilityScorer + 'static,
    S: SuggestionStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/matching/users/:user_id/suggestions",
            post(generate_handler::<P, C, S>).get(suggestions_handler::<P, C, S>),
        )
        .route(
            "/api/v1/matching/suggestions/:suggestion_id/status",
            post(status_handler::<P, C, S>),
        )
        .with_state(service)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusUpdate {
    pub status: SuggestionStatus,
}

pub(crate) async fn generate_handler<P, C, S>(
    State(service): State<SharedService<P, C, S>>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Response
where
    P: ProfileStore + 'static,
    C: CompatibilityScorer + 'static,
    S: SuggestionStore + 'static,
{
    let request = match parse_generation_request(&body) {
        Ok(request) => request,
        Err(error) => return error_response(error),
    };
    match service.generate(&UserId(user_id), &request) {
        Ok(groups) => (StatusCode::OK, axum::Json(groups)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn suggestions_handler<P, C, S>(
    State(service): State<SharedService<P, C, S>>,
    Path(user_id): Path<String>,
) -> Response
where
    P: ProfileStore + 'static,
    C: CompatibilityScorer + 'static,
    S: SuggestionStore + 'static,
{
    match service.suggestions_with_profiles(&UserId(user_id)) {
        Ok(suggestions) => (StatusCode::OK, axum::Json(suggestions)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<P, C, S>(
    State(service): State<SharedService<P, C, S>>,
    Path(suggestion_id): Path<String>,
    axum::Json(update): axum::Json<StatusUpdate>,
) -> Response
where
    P: ProfileStore + 'static,
    C: CompatibilityScorer + 'static,
    S: SuggestionStore + 'static,
{
    match service.update_status(&SuggestionId(suggestion_id), update.status) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

/// An empty body means "use the defaults"; anything else must parse as a full request.
fn parse_generation_request(body: &[u8]) -> Result<GenerationRequest, SuggestionServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerationRequest::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        SuggestionServiceError::InvalidRequest(format!("malformed request body: {err}"))
    })
}

fn error_response(error: SuggestionServiceError) -> Response {
    let status = match &error {
        SuggestionServiceError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SuggestionServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
        SuggestionServiceError::Suggestions(SuggestionStoreError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        SuggestionServiceError::Suggestions(_) | SuggestionServiceError::Profiles(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
