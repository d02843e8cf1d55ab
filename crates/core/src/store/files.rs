use chrono::Utc;
use keeper_types::EntryName;

use super::{new_id, FolderOrder, Store};
use crate::models::File;
use crate::{KeeperError, KeeperResult};

const FILE_COLUMNS: &str = "id, folder_id, name, created_at, updated_at";

impl Store {
    /// Create a file in `folder_id`, or in the root folder when `folder_id` is `None`.
    ///
    /// # Errors
    ///
    /// * [`KeeperError::NotFound`] if the folder does not exist.
    /// * [`KeeperError::Exists`] if the folder already holds a file with this name.
    pub async fn create_file(&self, name: &EntryName, folder_id: Option<&str>) -> KeeperResult<File> {
        if let Some(folder_id) = folder_id {
            self.get_folder(folder_id).await?;
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM files WHERE name = $1 AND folder_id IS $2)",
        )
        .bind(name.as_str())
        .bind(folder_id)
        .fetch_one(&self.pool)
        .await?;
        if exists {
            return Err(KeeperError::Exists(format!("file {name}")));
        }

        let now = Utc::now();
        let file = sqlx::query_as::<_, File>(&format!(
            "INSERT INTO files (id, folder_id, name, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {FILE_COLUMNS}"
        ))
        .bind(new_id())
        .bind(folder_id)
        .bind(name.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(file)
    }

    pub async fn get_file(&self, id: &str) -> KeeperResult<File> {
        sqlx::query_as::<_, File>(&format!("SELECT {FILE_COLUMNS} FROM files WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| KeeperError::NotFound(format!("file {id}")))
    }

    pub async fn file_exists(&self, id: &str) -> KeeperResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM files WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Files directly inside `folder_id` (the root folder when `None`).
    pub async fn list_files(
        &self,
        folder_id: Option<&str>,
        order: FolderOrder,
    ) -> KeeperResult<Vec<File>> {
        let files = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE folder_id IS $1 ORDER BY {}",
            order.to_sql()
        ))
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(files)
    }

    /// Rename a file, rejecting a name already used by another file in the same folder.
    pub async fn rename_file(&self, id: &str, name: &EntryName) -> KeeperResult<File> {
        let clash = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM files
                WHERE name = $1
                AND id != $2
                AND folder_id IS (SELECT folder_id FROM files WHERE id = $2)
            )",
        )
        .bind(name.as_str())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if clash {
            return Err(KeeperError::Exists(format!("file {name}")));
        }

        sqlx::query_as::<_, File>(&format!(
            "UPDATE files SET name = $1, updated_at = $2 WHERE id = $3 RETURNING {FILE_COLUMNS}"
        ))
        .bind(name.as_str())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| KeeperError::NotFound(format!("file {id}")))
    }

    /// Delete a file with its contents, listeners and alias links.
    pub async fn delete_file(&self, id: &str) -> KeeperResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
