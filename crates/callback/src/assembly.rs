//! Builds the payload sent to listeners when a file changes.

use async_trait::async_trait;
use bytes::Bytes;
use keeper_core::models::{File, FileContent, Listener};
use keeper_core::{KeeperResult, Store};
use serde::{Deserialize, Serialize};

use crate::error::{CallbackError, CallbackResult};

/// Read access the pipeline needs to build a notification.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    async fn get_file(&self, file_id: &str) -> KeeperResult<File>;
    async fn get_file_contents(&self, file_id: &str) -> KeeperResult<Vec<FileContent>>;
    /// Listeners of the file, ordered by name.
    async fn get_listeners_for_file(&self, file_id: &str) -> KeeperResult<Vec<Listener>>;
}

#[async_trait]
impl NotificationSource for Store {
    async fn get_file(&self, file_id: &str) -> KeeperResult<File> {
        Store::get_file(self, file_id).await
    }

    async fn get_file_contents(&self, file_id: &str) -> KeeperResult<Vec<FileContent>> {
        self.list_contents(file_id, None).await
    }

    async fn get_listeners_for_file(&self, file_id: &str) -> KeeperResult<Vec<Listener>> {
        self.list_listeners(file_id).await
    }
}

/// The JSON body POSTed to listeners: the file's fields plus all of its content versions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileData {
    #[serde(flatten)]
    pub file: File,
    pub file_contents: Vec<FileContent>,
}

/// Load everything needed to notify the listeners of `file_id`.
///
/// The file, its contents and its listeners are read in that order. Any failure aborts the
/// whole assembly so a partial payload is never sent.
///
/// Returns the listeners together with the serialized [`FileData`].
pub async fn prepare_listeners_data(
    source: &dyn NotificationSource,
    file_id: &str,
) -> CallbackResult<(Vec<Listener>, Bytes)> {
    let file = source
        .get_file(file_id)
        .await
        .map_err(|source| assembly_error(file_id, "file", source))?;

    let file_contents = source
        .get_file_contents(file_id)
        .await
        .map_err(|source| assembly_error(file_id, "file contents", source))?;

    let listeners = source
        .get_listeners_for_file(file_id)
        .await
        .map_err(|source| assembly_error(file_id, "listeners", source))?;

    let payload = serde_json::to_vec(&FileData {
        file,
        file_contents,
    })
    .map_err(|source| CallbackError::Serialize {
        file_id: file_id.to_owned(),
        source,
    })?;

    tracing::debug!(file_id, listeners = listeners.len(), bytes = payload.len(), "notification assembled");
    Ok((listeners, Bytes::from(payload)))
}

fn assembly_error(
    file_id: &str,
    stage: &'static str,
    source: keeper_core::KeeperError,
) -> CallbackError {
    CallbackError::Assembly {
        file_id: file_id.to_owned(),
        stage,
        source,
    }
}
