use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Alias, FileContent};

/// A file record. `folder_id` is `None` for files stored in the root folder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct File {
    pub id: String,
    pub folder_id: Option<String>,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FileWithAliases {
    #[serde(flatten)]
    pub file: File,
    pub aliases: Vec<Alias>,
}

/// A file with every content version and alias attached to it.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FileView {
    #[serde(flatten)]
    pub file: File,
    pub contents: Vec<FileContent>,
    pub aliases: Vec<Alias>,
}
