//! HTTP request handlers for the Budget Allocation API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::allocation::distribute;
use crate::error::{EngineError, EngineResult};
use crate::models::Department;
use crate::workflow::{ExportFormat, SavedDraft};

use super::request::{AutoDistributeRequest, DraftRequest, ExportQuery};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/departments", get(list_departments_handler))
        .route("/api/budget/validate", post(validate_handler))
        .route("/api/budget-allocations", post(create_handler))
        .route("/api/budget-allocations/current", get(current_handler))
        .route(
            "/api/budget-allocations/auto-distribute",
            post(auto_distribute_handler),
        )
        .route("/api/budget-allocations/export", get(export_handler))
        .route(
            "/api/budget-allocations/:id",
            get(get_handler).put(update_handler),
        )
        .route("/api/budget-allocations/:id/submit", post(submit_handler))
        .route("/api/budget-allocations/:id/approve", post(approve_handler))
        .route("/api/budget-allocations/:id/reject", post(reject_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn bad_request(error: ApiError) -> Response {
    ApiErrorResponse::new(StatusCode::BAD_REQUEST, error).into_response()
}

fn engine_error(correlation_id: Uuid, err: EngineError, context: &str) -> Response {
    warn!(correlation_id = %correlation_id, error = %err, "{}", context);
    ApiErrorResponse::from(err).into_response()
}

/// Maps a body extraction failure onto the API error format.
fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // serde's message lives in the body text
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    bad_request(error)
}

fn parse_id(correlation_id: Uuid, raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw).map_err(|_| {
        warn!(correlation_id = %correlation_id, id = %raw, "Invalid allocation id");
        bad_request(ApiError::invalid_id(raw))
    })
}

/// Handler for GET /api/departments.
async fn list_departments_handler(State(state): State<AppState>) -> impl IntoResponse {
    let departments = state.config().departments();
    info!(count = departments.len(), "Listing departments");
    json_response(StatusCode::OK, departments)
}

/// Handler for POST /api/budget/validate.
///
/// Validates a posted draft without persisting it.
async fn validate_handler(
    State(state): State<AppState>,
    payload: Result<Json<DraftRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let draft = request.into_draft(None, state.service().departments());
    let result = state.service().validate(&draft);
    info!(
        correlation_id = %correlation_id,
        lines = draft.lines.len(),
        overall_valid = result.overall_valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Draft validated"
    );
    json_response(StatusCode::OK, result)
}

/// Handler for POST /api/budget-allocations/auto-distribute.
///
/// Returns the authoritative distribution of the requested budget.
async fn auto_distribute_handler(
    State(state): State<AppState>,
    payload: Result<Json<AutoDistributeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing auto-distribute request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let config = state.config();
    let departments = match select_departments(config.departments(), request.department_ids) {
        Ok(departments) => departments,
        Err(err) => return engine_error(correlation_id, err, "Unknown department in request"),
    };

    let start_time = Instant::now();
    match distribute(
        request.total_budget,
        &departments,
        request.strategy,
        &request.priorities,
        &config.distribution_settings(),
    ) {
        Ok(distribution) => {
            info!(
                correlation_id = %correlation_id,
                strategy = %request.strategy,
                shares = distribution.shares.len(),
                total_allocated = %distribution.total_allocated(),
                duration_us = start_time.elapsed().as_micros(),
                "Distribution completed successfully"
            );
            json_response(StatusCode::OK, distribution.into_authoritative())
        }
        Err(err) => engine_error(correlation_id, err, "Distribution failed"),
    }
}

fn select_departments(
    registry: &[Department],
    ids: Option<Vec<String>>,
) -> EngineResult<Vec<Department>> {
    let Some(ids) = ids else {
        return Ok(registry.to_vec());
    };
    ids.iter()
        .map(|id| {
            registry
                .iter()
                .find(|d| &d.id == id)
                .cloned()
                .ok_or_else(|| EngineError::DepartmentNotFound { id: id.clone() })
        })
        .collect()
}

/// Handler for POST /api/budget-allocations.
async fn create_handler(
    State(state): State<AppState>,
    payload: Result<Json<DraftRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let draft = request.into_draft(None, state.service().departments());
    match state.service().save_draft(draft) {
        Ok(saved) => {
            log_saved(correlation_id, &saved, "Allocation created");
            json_response(StatusCode::CREATED, saved)
        }
        Err(err) => engine_error(correlation_id, err, "Create failed"),
    }
}

/// Handler for PUT /api/budget-allocations/:id.
async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<DraftRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let id = match parse_id(correlation_id, &id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let draft = request.into_draft(Some(id), state.service().departments());
    match state.service().save_draft(draft) {
        Ok(saved) => {
            log_saved(correlation_id, &saved, "Allocation updated");
            json_response(StatusCode::OK, saved)
        }
        Err(err) => engine_error(correlation_id, err, "Update failed"),
    }
}

fn log_saved(correlation_id: Uuid, saved: &SavedDraft, message: &str) {
    info!(
        correlation_id = %correlation_id,
        allocation_id = ?saved.draft.id,
        version = saved.draft.version,
        status = %saved.draft.status,
        overall_valid = saved.validation.overall_valid,
        "{}",
        message
    );
}

/// Handler for GET /api/budget-allocations/:id.
async fn get_handler(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let id = match parse_id(correlation_id, &id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.service().get(id) {
        Ok(saved) => json_response(StatusCode::OK, saved),
        Err(err) => engine_error(correlation_id, err, "Lookup failed"),
    }
}

/// Handler for GET /api/budget-allocations/current.
async fn current_handler(State(state): State<AppState>) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    match state.service().current(Utc::now().date_naive()) {
        Ok(saved) => json_response(StatusCode::OK, saved),
        Err(err) => engine_error(correlation_id, err, "No current allocation"),
    }
}

#[derive(Clone, Copy)]
enum Transition {
    Submit,
    Approve,
    Reject,
}

async fn transition(state: AppState, raw_id: String, transition: Transition) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = match parse_id(correlation_id, &raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let service = state.service();
    let result = match transition {
        Transition::Submit => service.submit_for_approval(id),
        Transition::Approve => service.approve(id),
        Transition::Reject => service.reject(id),
    };
    match result {
        Ok(saved) => {
            log_saved(correlation_id, &saved, "Allocation status changed");
            json_response(StatusCode::OK, saved)
        }
        Err(err) => engine_error(correlation_id, err, "Status change failed"),
    }
}

/// Handler for POST /api/budget-allocations/:id/submit.
async fn submit_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    transition(state, id, Transition::Submit).await
}

/// Handler for POST /api/budget-allocations/:id/approve.
async fn approve_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    transition(state, id, Transition::Approve).await
}

/// Handler for POST /api/budget-allocations/:id/reject.
async fn reject_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    transition(state, id, Transition::Reject).await
}

/// Handler for GET /api/budget-allocations/export.
///
/// Streams the rendered file back as an attachment.
async fn export_handler(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid export query");
            return bad_request(ApiError::validation_error(rejection.body_text()));
        }
    };

    let file = query
        .format
        .parse::<ExportFormat>()
        .and_then(|format| state.service().export_allocation(query.allocation_id, format));
    match file {
        Ok(file) => {
            info!(
                correlation_id = %correlation_id,
                allocation_id = %query.allocation_id,
                filename = %file.filename,
                bytes = file.bytes.len(),
                "Allocation exported"
            );
            let disposition = format!("attachment; filename=\"{}\"", file.filename);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, file.content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                file.bytes,
            )
                .into_response()
        }
        Err(err) => engine_error(correlation_id, err, "Export failed"),
    }
}
