use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::FileWithAliases;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A folder together with its slash-joined path from the top level, e.g. `configs/prod`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct FolderWithPath {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A folder with its direct children, as returned by a folder read.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FolderView {
    #[serde(flatten)]
    pub folder: FolderWithPath,
    pub folders: Vec<Folder>,
    pub files: Vec<FileWithAliases>,
}
