use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use keeper_core::dto::{CreateFileRequest, EditFileRequest, StatusResponse};
use keeper_core::models::{File, FileView};

use crate::{ApiError, AppState, ErrorResponse};

/// Create a file
///
/// # Returns
/// The created file with status 201.
///
/// # Errors
/// - 400 if `name` is missing or not valid
/// - 404 if the folder does not exist
/// - 409 if the folder already holds a file with this name
#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    request_body = CreateFileRequest,
    responses(
        (status = 201, description = "File created", body = File),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Folder not found", body = ErrorResponse),
        (status = 409, description = "File already exists", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn create_file(
    State(state): State<AppState>,
    payload: Result<Json<CreateFileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<File>), ApiError> {
    let req = state.body(payload)?;
    let file = state
        .service
        .create_file(req)
        .await
        .map_err(|e| state.fail(e))?;
    Ok((StatusCode::CREATED, Json(file)))
}

/// Get a file with its content versions and aliases
#[utoipa::path(
    get,
    path = "/files/{file_id}",
    tag = "files",
    params(("file_id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "File found", body = FileView),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<FileView>, ApiError> {
    state
        .service
        .get_file(&file_id)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

#[utoipa::path(
    patch,
    path = "/files/{file_id}",
    tag = "files",
    params(("file_id" = String, Path, description = "File id")),
    request_body = EditFileRequest,
    responses(
        (status = 200, description = "File renamed", body = File),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 409, description = "Sibling file has this name", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn edit_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    payload: Result<Json<EditFileRequest>, JsonRejection>,
) -> Result<Json<File>, ApiError> {
    let req = state.body(payload)?;
    state
        .service
        .edit_file(&file_id, req)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

#[utoipa::path(
    delete,
    path = "/files/{file_id}",
    tag = "files",
    params(("file_id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "Delete status", body = StatusResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn delete_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state
        .service
        .delete_file(&file_id)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(StatusResponse { status }))
}
