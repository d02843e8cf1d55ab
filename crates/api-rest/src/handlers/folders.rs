use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use keeper_core::dto::{CreateFolderRequest, EditFolderRequest, FolderQuery, StatusResponse};
use keeper_core::models::{Folder, FolderView};

use crate::{ApiError, AppState, ErrorResponse};

/// Create a folder
///
/// A missing `parent_id`, or the id `root`, creates a top-level folder.
///
/// # Returns
/// The created folder with status 201.
///
/// # Errors
/// - 400 if `name` is missing or empty after sanitising
/// - 404 if the parent folder does not exist
/// - 409 if the parent already has a folder with this name
#[utoipa::path(
    post,
    path = "/folders",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 201, description = "Folder created", body = Folder),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Parent folder not found", body = ErrorResponse),
        (status = 409, description = "Folder already exists", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn create_folder(
    State(state): State<AppState>,
    payload: Result<Json<CreateFolderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Folder>), ApiError> {
    let req = state.body(payload)?;
    let folder = state
        .service
        .create_folder(req)
        .await
        .map_err(|e| state.fail(e))?;
    Ok((StatusCode::CREATED, Json(folder)))
}

/// Get a folder with its sub-folders and files
///
/// The id `root` returns the top level. Children are ordered by `order_column`
/// (`name`, `created_at` or `updated_at`) in `order_type` direction.
#[utoipa::path(
    get,
    path = "/folders/{folder_id}",
    tag = "folders",
    params(
        ("folder_id" = String, Path, description = "Folder id, or `root`"),
        FolderQuery
    ),
    responses(
        (status = 200, description = "Folder found", body = FolderView),
        (status = 400, description = "Unsupported order column", body = ErrorResponse),
        (status = 404, description = "Folder not found", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_folder(
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
    Query(query): Query<FolderQuery>,
) -> Result<Json<FolderView>, ApiError> {
    state
        .service
        .get_folder(&folder_id, &query)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

/// Rename a folder
#[utoipa::path(
    patch,
    path = "/folders/{folder_id}",
    tag = "folders",
    params(("folder_id" = String, Path, description = "Folder id")),
    request_body = EditFolderRequest,
    responses(
        (status = 200, description = "Folder renamed", body = Folder),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Folder not found", body = ErrorResponse),
        (status = 409, description = "Sibling folder has this name", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn edit_folder(
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
    payload: Result<Json<EditFolderRequest>, JsonRejection>,
) -> Result<Json<Folder>, ApiError> {
    let req = state.body(payload)?;
    state
        .service
        .edit_folder(&folder_id, req)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

/// Delete a folder together with everything below it
///
/// # Returns
/// `{"status": true}` if the folder was removed, `false` if it did not exist.
#[utoipa::path(
    delete,
    path = "/folders/{folder_id}",
    tag = "folders",
    params(("folder_id" = String, Path, description = "Folder id")),
    responses(
        (status = 200, description = "Delete status", body = StatusResponse),
        (status = 400, description = "The root folder cannot be deleted", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn delete_folder(
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state
        .service
        .delete_folder(&folder_id)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(StatusResponse { status }))
}
