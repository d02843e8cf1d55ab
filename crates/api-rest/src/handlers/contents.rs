use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use keeper_core::dto::{
    ContentsQuery, CreateFileContentRequest, EditFileContentRequest, StatusResponse,
};
use keeper_core::models::{ContentFormat, FileContent};

use crate::{ApiError, AppState, ErrorResponse};

/// Add a content version to a file
///
/// Listeners registered on the file are notified once the version is stored.
///
/// # Returns
/// The stored content version with status 201.
///
/// # Errors
/// - 400 if `version` or `content` is missing
/// - 404 if the file or the content format does not exist
/// - 409 if the file already has this version
#[utoipa::path(
    post,
    path = "/files/{file_id}/contents",
    tag = "contents",
    params(("file_id" = String, Path, description = "File id")),
    request_body = CreateFileContentRequest,
    responses(
        (status = 201, description = "Content version created", body = FileContent),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "File or format not found", body = ErrorResponse),
        (status = 409, description = "Version already exists", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn create_file_content(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    payload: Result<Json<CreateFileContentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FileContent>), ApiError> {
    let req = state.body(payload)?;
    let content = state
        .service
        .create_file_content(&file_id, req)
        .await
        .map_err(|e| state.fail(e))?;
    Ok((StatusCode::CREATED, Json(content)))
}

/// List the content versions of a file, optionally filtered by `version`
#[utoipa::path(
    get,
    path = "/files/{file_id}/contents",
    tag = "contents",
    params(
        ("file_id" = String, Path, description = "File id"),
        ContentsQuery
    ),
    responses(
        (status = 200, description = "Content versions", body = [FileContent]),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_file_contents(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    Query(query): Query<ContentsQuery>,
) -> Result<Json<Vec<FileContent>>, ApiError> {
    state
        .service
        .get_file_contents(&file_id, &query)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

/// Edit the version label and/or the content of a content version
#[utoipa::path(
    patch,
    path = "/contents/{content_id}",
    tag = "contents",
    params(("content_id" = String, Path, description = "Content version id")),
    request_body = EditFileContentRequest,
    responses(
        (status = 200, description = "Content version updated", body = FileContent),
        (status = 400, description = "Nothing to update", body = ErrorResponse),
        (status = 404, description = "Content version not found", body = ErrorResponse),
        (status = 409, description = "Version already exists", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn edit_file_content(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
    payload: Result<Json<EditFileContentRequest>, JsonRejection>,
) -> Result<Json<FileContent>, ApiError> {
    let req = state.body(payload)?;
    state
        .service
        .edit_file_content(&content_id, req)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

#[utoipa::path(
    delete,
    path = "/contents/{content_id}",
    tag = "contents",
    params(("content_id" = String, Path, description = "Content version id")),
    responses(
        (status = 200, description = "Delete status", body = StatusResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn delete_file_content(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state
        .service
        .delete_file_content(&content_id)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(StatusResponse { status }))
}

/// List the known content formats
#[utoipa::path(
    get,
    path = "/content-formats",
    tag = "contents",
    responses(
        (status = 200, description = "Content formats", body = [ContentFormat])
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_content_formats(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentFormat>>, ApiError> {
    state
        .service
        .content_formats()
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}
