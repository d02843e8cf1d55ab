use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use keeper_core::dto::{CreateListenerRequest, EditListenerRequest, StatusResponse};
use keeper_core::models::Listener;

use crate::{ApiError, AppState, ErrorResponse};

/// Register a listener on a file
///
/// The listener's `callback_endpoint` receives a POST with the file and all of its content
/// versions whenever a content version of the file changes.
///
/// # Errors
/// - 400 if `name` or `callback_endpoint` is missing, or the endpoint is not an http(s) URL
/// - 404 if the file does not exist
#[utoipa::path(
    post,
    path = "/files/{file_id}/listeners",
    tag = "listeners",
    params(("file_id" = String, Path, description = "File id")),
    request_body = CreateListenerRequest,
    responses(
        (status = 201, description = "Listener created", body = Listener),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn create_listener(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    payload: Result<Json<CreateListenerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Listener>), ApiError> {
    let req = state.body(payload)?;
    let listener = state
        .service
        .create_listener(&file_id, req)
        .await
        .map_err(|e| state.fail(e))?;
    Ok((StatusCode::CREATED, Json(listener)))
}

/// List the listeners of a file, ordered by name
#[utoipa::path(
    get,
    path = "/files/{file_id}/listeners",
    tag = "listeners",
    params(("file_id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "Listeners", body = [Listener]),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_file_listeners(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<Vec<Listener>>, ApiError> {
    state
        .service
        .get_file_listeners(&file_id)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

#[utoipa::path(
    get,
    path = "/listeners/{listener_id}",
    tag = "listeners",
    params(("listener_id" = String, Path, description = "Listener id")),
    responses(
        (status = 200, description = "Listener found", body = Listener),
        (status = 404, description = "Listener not found", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_listener(
    State(state): State<AppState>,
    Path(listener_id): Path<String>,
) -> Result<Json<Listener>, ApiError> {
    state
        .service
        .get_listener(&listener_id)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

#[utoipa::path(
    patch,
    path = "/listeners/{listener_id}",
    tag = "listeners",
    params(("listener_id" = String, Path, description = "Listener id")),
    request_body = EditListenerRequest,
    responses(
        (status = 200, description = "Listener updated", body = Listener),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Listener not found", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn edit_listener(
    State(state): State<AppState>,
    Path(listener_id): Path<String>,
    payload: Result<Json<EditListenerRequest>, JsonRejection>,
) -> Result<Json<Listener>, ApiError> {
    let req = state.body(payload)?;
    state
        .service
        .edit_listener(&listener_id, req)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

#[utoipa::path(
    delete,
    path = "/listeners/{listener_id}",
    tag = "listeners",
    params(("listener_id" = String, Path, description = "Listener id")),
    responses(
        (status = 200, description = "Delete status", body = StatusResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn delete_listener(
    State(state): State<AppState>,
    Path(listener_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state
        .service
        .delete_listener(&listener_id)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(StatusResponse { status }))
}
