//! Persisted records and the composite views returned by [`crate::KeeperService`].
//!
//! Every record derives `sqlx::FromRow` so store queries can map rows directly, and
//! `utoipa::ToSchema` so the REST layer can publish them in its OpenAPI document.

mod alias;
mod content;
mod file;
mod folder;
mod listener;

pub use alias::{Alias, ContentFormat, FileAlias};
pub use content::FileContent;
pub use file::{File, FileView, FileWithAliases};
pub use folder::{Folder, FolderView, FolderWithPath};
pub use listener::Listener;
