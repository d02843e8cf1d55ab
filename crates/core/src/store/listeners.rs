use chrono::Utc;

use super::{new_id, Store};
use crate::models::Listener;
use crate::{KeeperError, KeeperResult};

const LISTENER_COLUMNS: &str = "id, file_id, name, callback_endpoint, created_at, updated_at";

impl Store {
    /// Register a listener on a file.
    ///
    /// # Errors
    ///
    /// Returns [`KeeperError::NotFound`] if the file does not exist.
    pub async fn create_listener(
        &self,
        file_id: &str,
        name: &str,
        callback_endpoint: &str,
    ) -> KeeperResult<Listener> {
        if !self.file_exists(file_id).await? {
            return Err(KeeperError::NotFound(format!("file {file_id}")));
        }

        let now = Utc::now();
        let listener = sqlx::query_as::<_, Listener>(&format!(
            "INSERT INTO listeners (id, file_id, name, callback_endpoint, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {LISTENER_COLUMNS}"
        ))
        .bind(new_id())
        .bind(file_id)
        .bind(name)
        .bind(callback_endpoint)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(listener)
    }

    pub async fn get_listener(&self, id: &str) -> KeeperResult<Listener> {
        sqlx::query_as::<_, Listener>(&format!(
            "SELECT {LISTENER_COLUMNS} FROM listeners WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| KeeperError::NotFound(format!("listener {id}")))
    }

    /// Listeners registered on a file, ordered by name.
    pub async fn list_listeners(&self, file_id: &str) -> KeeperResult<Vec<Listener>> {
        let listeners = sqlx::query_as::<_, Listener>(&format!(
            "SELECT {LISTENER_COLUMNS} FROM listeners WHERE file_id = $1 ORDER BY name ASC"
        ))
        .bind(file_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(listeners)
    }

    /// Change the name and/or endpoint of a listener.
    ///
    /// The existence check and the update run in one transaction so a concurrent delete
    /// cannot slip in between them.
    pub async fn edit_listener(
        &self,
        id: &str,
        name: Option<&str>,
        callback_endpoint: Option<&str>,
    ) -> KeeperResult<Listener> {
        if name.is_none() && callback_endpoint.is_none() {
            return Err(KeeperError::RequiredField(vec![
                "name or callback_endpoint".into(),
            ]));
        }

        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM listeners WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(KeeperError::NotFound(format!("listener {id}")));
        }

        let listener = sqlx::query_as::<_, Listener>(&format!(
            "UPDATE listeners
             SET name = COALESCE($1, name),
                 callback_endpoint = COALESCE($2, callback_endpoint),
                 updated_at = $3
             WHERE id = $4
             RETURNING {LISTENER_COLUMNS}"
        ))
        .bind(name)
        .bind(callback_endpoint)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(listener)
    }

    pub async fn delete_listener(&self, id: &str) -> KeeperResult<bool> {
        let result = sqlx::query("DELETE FROM listeners WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
