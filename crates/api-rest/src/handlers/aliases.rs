use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use keeper_core::dto::{
    AddedResponse, AliasesQuery, AliasesRequest, CreateAliasRequest, EditAliasRequest,
    RemovedResponse, StatusResponse,
};
use keeper_core::models::Alias;

use crate::{ApiError, AppState, ErrorResponse};

/// Create an alias
///
/// # Errors
/// - 400 if `key`, `value` or `color` is missing
/// - 409 if an alias with the same key and value exists
#[utoipa::path(
    post,
    path = "/aliases",
    tag = "aliases",
    request_body = CreateAliasRequest,
    responses(
        (status = 201, description = "Alias created", body = Alias),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Alias already exists", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn create_alias(
    State(state): State<AppState>,
    payload: Result<Json<CreateAliasRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Alias>), ApiError> {
    let req = state.body(payload)?;
    let alias = state
        .service
        .create_alias(req)
        .await
        .map_err(|e| state.fail(e))?;
    Ok((StatusCode::CREATED, Json(alias)))
}

/// List aliases
///
/// Filters by exact `key` and `value`. Results are paged with `limit` (default 10) and
/// `offset` (default 0) and ordered by `order_by` (default `key`).
#[utoipa::path(
    get,
    path = "/aliases",
    tag = "aliases",
    params(AliasesQuery),
    responses(
        (status = 200, description = "Aliases", body = [Alias]),
        (status = 400, description = "Invalid paging or ordering", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_aliases(
    State(state): State<AppState>,
    Query(query): Query<AliasesQuery>,
) -> Result<Json<Vec<Alias>>, ApiError> {
    state
        .service
        .get_aliases(&query)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

#[utoipa::path(
    get,
    path = "/aliases/{alias_id}",
    tag = "aliases",
    params(("alias_id" = String, Path, description = "Alias id")),
    responses(
        (status = 200, description = "Alias found", body = Alias),
        (status = 404, description = "Alias not found", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_alias(
    State(state): State<AppState>,
    Path(alias_id): Path<String>,
) -> Result<Json<Alias>, ApiError> {
    state
        .service
        .get_alias(&alias_id)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

#[utoipa::path(
    patch,
    path = "/aliases/{alias_id}",
    tag = "aliases",
    params(("alias_id" = String, Path, description = "Alias id")),
    request_body = EditAliasRequest,
    responses(
        (status = 200, description = "Alias updated", body = Alias),
        (status = 400, description = "Nothing to update", body = ErrorResponse),
        (status = 404, description = "Alias not found", body = ErrorResponse),
        (status = 409, description = "Alias already exists", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn edit_alias(
    State(state): State<AppState>,
    Path(alias_id): Path<String>,
    payload: Result<Json<EditAliasRequest>, JsonRejection>,
) -> Result<Json<Alias>, ApiError> {
    let req = state.body(payload)?;
    state
        .service
        .edit_alias(&alias_id, req)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

#[utoipa::path(
    delete,
    path = "/aliases/{alias_id}",
    tag = "aliases",
    params(("alias_id" = String, Path, description = "Alias id")),
    responses(
        (status = 200, description = "Delete status", body = StatusResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn delete_alias(
    State(state): State<AppState>,
    Path(alias_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state
        .service
        .delete_alias(&alias_id)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(StatusResponse { status }))
}

/// Attach aliases to a file
///
/// Aliases already attached to the file are skipped.
///
/// # Returns
/// `{"added": n}` with the number of new links.
///
/// # Errors
/// - 400 if `aliases` is empty
/// - 404 if the file or one of the aliases does not exist
/// - 409 if every alias was already attached
#[utoipa::path(
    post,
    path = "/files/{file_id}/aliases",
    tag = "aliases",
    params(("file_id" = String, Path, description = "File id")),
    request_body = AliasesRequest,
    responses(
        (status = 200, description = "Aliases attached", body = AddedResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "File or alias not found", body = ErrorResponse),
        (status = 409, description = "Aliases already attached", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn add_file_aliases(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    payload: Result<Json<AliasesRequest>, JsonRejection>,
) -> Result<Json<AddedResponse>, ApiError> {
    let req = state.body(payload)?;
    let added = state
        .service
        .add_aliases_to_file(&file_id, req)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(AddedResponse { added }))
}

#[utoipa::path(
    get,
    path = "/files/{file_id}/aliases",
    tag = "aliases",
    params(("file_id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "Aliases of the file", body = [Alias]),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_file_aliases(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<Vec<Alias>>, ApiError> {
    state
        .service
        .get_file_aliases(&file_id)
        .await
        .map(Json)
        .map_err(|e| state.fail(e))
}

/// Detach aliases from a file
///
/// # Returns
/// `{"removed": n}` with the number of links removed.
#[utoipa::path(
    delete,
    path = "/files/{file_id}/aliases",
    tag = "aliases",
    params(("file_id" = String, Path, description = "File id")),
    request_body = AliasesRequest,
    responses(
        (status = 200, description = "Aliases detached", body = RemovedResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub(crate) async fn remove_file_aliases(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    payload: Result<Json<AliasesRequest>, JsonRejection>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let req = state.body(payload)?;
    let removed = state
        .service
        .remove_file_aliases(&file_id, req)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(RemovedResponse { removed }))
}
