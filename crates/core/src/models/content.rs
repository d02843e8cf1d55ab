use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One version of a file's content.
///
/// `format` carries the name of the content format (for example `json`), not its id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct FileContent {
    pub id: String,
    pub content: String,
    pub version: String,
    pub file_id: String,
    pub format: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
