//! # API REST
//!
//! REST API for the config keeper.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - The OpenAPI document, served at `/api-docs/openapi.json`
//! - REST-specific concerns (JSON bodies, error rendering, CORS)
//!
//! Business rules live in [`keeper_core::KeeperService`]; handlers only translate between
//! HTTP and service calls.

#![warn(rust_2018_idioms)]

pub mod error;
mod handlers;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::routing::get;
use axum::{Json, Router};
use keeper_core::dto::{
    AddedResponse, AliasesRequest, CreateAliasRequest, CreateFileContentRequest,
    CreateFileRequest, CreateFolderRequest, CreateListenerRequest, EditAliasRequest,
    EditFileContentRequest, EditFileRequest, EditFolderRequest, EditListenerRequest,
    RemovedResponse, StatusResponse,
};
use keeper_core::models::{
    Alias, ContentFormat, File, FileContent, FileView, FileWithAliases, Folder, FolderView,
    FolderWithPath, Listener,
};
use keeper_core::{ErrorCatalog, KeeperError, KeeperService};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};

pub use error::{ApiError, ErrorBody, ErrorResponse};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<KeeperService>,
    pub catalog: Arc<ErrorCatalog>,
}

impl AppState {
    pub fn new(service: KeeperService, catalog: ErrorCatalog) -> Self {
        Self {
            service: Arc::new(service),
            catalog: Arc::new(catalog),
        }
    }

    pub(crate) fn fail(&self, err: KeeperError) -> ApiError {
        ApiError::from_keeper(&self.catalog, err)
    }

    /// Unwrap a JSON body, rendering a missing or malformed body as `BodyRequired`.
    pub(crate) fn body<T>(&self, payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
        match payload {
            Ok(Json(body)) => Ok(body),
            Err(rejection) => {
                tracing::debug!("rejected request body: {}", rejection.body_text());
                Err(ApiError::from_rejection(&self.catalog, rejection))
            }
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        handlers::folders::create_folder,
        handlers::folders::get_folder,
        handlers::folders::edit_folder,
        handlers::folders::delete_folder,
        handlers::files::create_file,
        handlers::files::get_file,
        handlers::files::edit_file,
        handlers::files::delete_file,
        handlers::contents::create_file_content,
        handlers::contents::get_file_contents,
        handlers::contents::edit_file_content,
        handlers::contents::delete_file_content,
        handlers::listeners::create_listener,
        handlers::listeners::get_file_listeners,
        handlers::listeners::get_listener,
        handlers::listeners::edit_listener,
        handlers::listeners::delete_listener,
        handlers::aliases::create_alias,
        handlers::aliases::get_aliases,
        handlers::aliases::get_alias,
        handlers::aliases::edit_alias,
        handlers::aliases::delete_alias,
        handlers::aliases::add_file_aliases,
        handlers::aliases::get_file_aliases,
        handlers::aliases::remove_file_aliases,
        handlers::contents::get_content_formats,
    ),
    components(schemas(
        HealthRes,
        ErrorResponse,
        ErrorBody,
        StatusResponse,
        AddedResponse,
        RemovedResponse,
        CreateFolderRequest,
        EditFolderRequest,
        CreateFileRequest,
        EditFileRequest,
        CreateFileContentRequest,
        EditFileContentRequest,
        CreateListenerRequest,
        EditListenerRequest,
        CreateAliasRequest,
        EditAliasRequest,
        AliasesRequest,
        Folder,
        FolderWithPath,
        FolderView,
        File,
        FileWithAliases,
        FileView,
        FileContent,
        Listener,
        Alias,
        ContentFormat,
    )),
    tags(
        (name = "folders"),
        (name = "files"),
        (name = "contents"),
        (name = "listeners"),
        (name = "aliases"),
    )
)]
pub struct ApiDoc;

/// Build the keeper router with permissive CORS.
pub fn router(state: AppState) -> Router {
    use axum::routing::{patch, post};
    use handlers::{aliases, contents, files, folders, listeners};

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi))
        .route("/folders", post(folders::create_folder))
        .route(
            "/folders/:folder_id",
            get(folders::get_folder)
                .patch(folders::edit_folder)
                .delete(folders::delete_folder),
        )
        .route("/files", post(files::create_file))
        .route(
            "/files/:file_id",
            get(files::get_file)
                .patch(files::edit_file)
                .delete(files::delete_file),
        )
        .route(
            "/files/:file_id/contents",
            post(contents::create_file_content).get(contents::get_file_contents),
        )
        .route(
            "/contents/:content_id",
            patch(contents::edit_file_content).delete(contents::delete_file_content),
        )
        .route(
            "/files/:file_id/listeners",
            post(listeners::create_listener).get(listeners::get_file_listeners),
        )
        .route(
            "/listeners/:listener_id",
            get(listeners::get_listener)
                .patch(listeners::edit_listener)
                .delete(listeners::delete_listener),
        )
        .route(
            "/aliases",
            post(aliases::create_alias).get(aliases::get_aliases),
        )
        .route(
            "/aliases/:alias_id",
            get(aliases::get_alias)
                .patch(aliases::edit_alias)
                .delete(aliases::delete_alias),
        )
        .route(
            "/files/:file_id/aliases",
            post(aliases::add_file_aliases)
                .get(aliases::get_file_aliases)
                .delete(aliases::remove_file_aliases),
        )
        .route("/content-formats", get(contents::get_content_formats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
///
/// Returns the current health status of the REST API service.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthRes)
    )
)]
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "keeper REST API is alive".into(),
    })
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
