//! Cadence event endpoints — DAG create/fetch/update/delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use uuid::Uuid;

use cadence_domain::Error;

use crate::runtime::dags::{CadenceEventRequest, RequestType};
use crate::state::AppState;

/// Map a domain error onto the wire envelope
/// `{ "success": false, "message": <text>, "type": <kind> }`.
fn error_response(err: &Error) -> Response {
    let (status, kind, message) = match err {
        Error::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
        Error::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found_error", msg.clone()),
        Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            "file_not_found",
            "File not found".to_string(),
        ),
        Error::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => (
            StatusCode::FORBIDDEN,
            "permission_error",
            "Permission denied".to_string(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error".to_string(),
        ),
    };
    tracing::error!(kind, error = %err, "cadence event request failed");
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "message": message,
            "type": kind,
        })),
    )
        .into_response()
}

/// Parse the `:contract_uuid/:request_type` path pair shared by the
/// fetch, update, and delete routes.
fn parse_path(contract_uuid: &str, request_type: &str) -> Result<RequestType, Response> {
    if Uuid::parse_str(contract_uuid).is_err() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "message": "Invalid UUID format",
            })),
        )
            .into_response());
    }
    RequestType::from_path_segment(request_type).map_err(|e| error_response(&e))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/cadence-event
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CadenceEventRequest>,
) -> Response {
    match state.dags.create(&body).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "success": true,
                "message": "DAG created successfully",
                "data": outcome,
            })),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/cadence-event/:contract_uuid/:request_type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get(
    State(state): State<AppState>,
    Path((contract_uuid, request_type)): Path<(String, String)>,
) -> Response {
    let request_type = match parse_path(&contract_uuid, &request_type) {
        Ok(rt) => rt,
        Err(response) => return response,
    };

    match state.dags.fetch(&contract_uuid, request_type).await {
        Ok(fetched) => Json(serde_json::json!({
            "success": true,
            "data": fetched,
        }))
        .into_response(),
        Err(err) => error_response(&err),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PUT /api/cadence-event/:contract_uuid/:request_type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn update(
    State(state): State<AppState>,
    Path((contract_uuid, request_type)): Path<(String, String)>,
    Json(body): Json<CadenceEventRequest>,
) -> Response {
    let request_type = match parse_path(&contract_uuid, &request_type) {
        Ok(rt) => rt,
        Err(response) => return response,
    };

    if body.request_type != request_type {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "message": "Request type in body must match URL parameter",
            })),
        )
            .into_response();
    }

    match state.dags.update(&contract_uuid, &body).await {
        Ok(outcome) => Json(serde_json::json!({
            "success": true,
            "message": "DAG updated successfully",
            "data": outcome,
        }))
        .into_response(),
        Err(err) => error_response(&err),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /api/cadence-event/:contract_uuid/:request_type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn delete(
    State(state): State<AppState>,
    Path((contract_uuid, request_type)): Path<(String, String)>,
) -> Response {
    let request_type = match parse_path(&contract_uuid, &request_type) {
        Ok(rt) => rt,
        Err(response) => return response,
    };

    match state.dags.remove(&contract_uuid, request_type).await {
        Ok(_) => Json(serde_json::json!({
            "success": true,
            "message": "DAG deleted successfully",
        }))
        .into_response(),
        Err(err) => error_response(&err),
    }
}
