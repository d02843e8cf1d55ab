//! Request and response bodies exchanged with API clients.
//!
//! Request fields are optional at the type level so that a missing field is reported as
//! [`crate::KeeperError::RequiredField`] by the service instead of a deserialisation error.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{KeeperError, KeeperResult};

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateFolderRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct EditFolderRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateFileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct EditFileRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateFileContentRequest {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub format_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct EditFileContentRequest {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateListenerRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub callback_endpoint: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct EditListenerRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub callback_endpoint: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateAliasRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct EditAliasRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Alias ids to attach to or detach from a file.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AliasesRequest {
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FolderQuery {
    /// One of `name`, `created_at`, `updated_at`.
    pub order_column: Option<String>,
    /// `asc` or `desc`.
    pub order_type: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContentsQuery {
    pub version: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AliasesQuery {
    pub key: Option<String>,
    pub value: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// One of `key`, `value`, `color`, `created_at`, `updated_at`.
    pub order_by: Option<String>,
    /// `asc` or `desc`.
    pub order_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddedResponse {
    pub added: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RemovedResponse {
    pub removed: u64,
}

/// Check that every named field has a non-blank value.
///
/// # Errors
///
/// Returns [`KeeperError::RequiredField`] naming every missing field, in the order given.
pub fn require_fields(fields: &[(&str, Option<&str>)]) -> KeeperResult<()> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| (*name).to_owned())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(KeeperError::RequiredField(missing))
    }
}
