use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use super::{new_id, Store};
use crate::models::FileContent;
use crate::{KeeperError, KeeperResult};

const SELECT_CONTENT: &str = "SELECT c.id, c.content, c.version, c.file_id, cf.name AS format,
        c.created_at, c.updated_at
    FROM file_contents c
    LEFT JOIN content_formats cf ON cf.id = c.format_id";

impl Store {
    /// Add a content version to a file.
    ///
    /// # Errors
    ///
    /// * [`KeeperError::NotFound`] if the file or the content format does not exist.
    /// * [`KeeperError::Exists`] if the file already has this version.
    pub async fn create_content(
        &self,
        file_id: &str,
        version: &str,
        content: &str,
        format_id: Option<&str>,
    ) -> KeeperResult<FileContent> {
        if !self.file_exists(file_id).await? {
            return Err(KeeperError::NotFound(format!("file {file_id}")));
        }
        if let Some(format_id) = format_id {
            if !self.content_format_exists(format_id).await? {
                return Err(KeeperError::NotFound(format!("content format {format_id}")));
            }
        }
        if self.version_taken(file_id, version, None).await? {
            return Err(KeeperError::Exists(format!("file content version {version}")));
        }

        let id = new_id();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO file_contents (id, file_id, version, content, format_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&id)
        .bind(file_id)
        .bind(version)
        .bind(content)
        .bind(format_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_content(&id).await
    }

    pub async fn get_content(&self, id: &str) -> KeeperResult<FileContent> {
        sqlx::query_as::<_, FileContent>(&format!("{SELECT_CONTENT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| KeeperError::NotFound(format!("file content {id}")))
    }

    /// Content versions of a file, oldest first, optionally narrowed to one version.
    pub async fn list_contents(
        &self,
        file_id: &str,
        version: Option<&str>,
    ) -> KeeperResult<Vec<FileContent>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_CONTENT);
        query.push(" WHERE c.file_id = ").push_bind(file_id.to_owned());
        if let Some(version) = version {
            query.push(" AND c.version = ").push_bind(version.to_owned());
        }
        query.push(" ORDER BY c.created_at ASC, c.version ASC");

        let contents = query
            .build_query_as::<FileContent>()
            .fetch_all(&self.pool)
            .await?;
        Ok(contents)
    }

    /// Change the version label and/or the content of a version.
    ///
    /// # Errors
    ///
    /// * [`KeeperError::RequiredField`] if neither `version` nor `content` is given.
    /// * [`KeeperError::NotFound`] if the content version does not exist.
    /// * [`KeeperError::Exists`] if the new version label is already used by the file.
    pub async fn edit_content(
        &self,
        id: &str,
        version: Option<&str>,
        content: Option<&str>,
    ) -> KeeperResult<FileContent> {
        if version.is_none() && content.is_none() {
            return Err(KeeperError::RequiredField(vec!["version or content".into()]));
        }

        let existing = self.get_content(id).await?;
        if let Some(version) = version {
            if self.version_taken(&existing.file_id, version, Some(id)).await? {
                return Err(KeeperError::Exists(format!("file content version {version}")));
            }
        }

        sqlx::query(
            "UPDATE file_contents
             SET version = COALESCE($1, version),
                 content = COALESCE($2, content),
                 updated_at = $3
             WHERE id = $4",
        )
        .bind(version)
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_content(id).await
    }

    /// Delete a content version, returning the id of the file it belonged to.
    ///
    /// Returns `None` if no content version had this id.
    pub async fn delete_content(&self, id: &str) -> KeeperResult<Option<String>> {
        let file_id = sqlx::query_scalar::<_, String>(
            "DELETE FROM file_contents WHERE id = $1 RETURNING file_id",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file_id)
    }

    async fn version_taken(
        &self,
        file_id: &str,
        version: &str,
        exclude_id: Option<&str>,
    ) -> KeeperResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM file_contents
                WHERE file_id = $1 AND version = $2 AND ($3 IS NULL OR id != $3)
            )",
        )
        .bind(file_id)
        .bind(version)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }
}

#[cfg(test)]
mod tests {
    use keeper_types::EntryName;

    use super::super::memory_store;
    use super::*;

    async fn store_with_file() -> (Store, String) {
        let store = memory_store().await;
        let file = store
            .create_file(&EntryName::new("app").unwrap(), None)
            .await
            .unwrap();
        (store, file.id)
    }

    #[tokio::test]
    async fn test_create_content_with_format() {
        let (store, file_id) = store_with_file().await;
        let json = store
            .list_content_formats()
            .await
            .unwrap()
            .into_iter()
            .find(|f| f.name == "json")
            .unwrap();

        let content = store
            .create_content(&file_id, "v1", "{\"a\":1}", Some(&json.id))
            .await
            .unwrap();
        assert_eq!(content.format.as_deref(), Some("json"));
        assert_eq!(content.version, "v1");
        assert_eq!(content.file_id, file_id);
    }

    #[tokio::test]
    async fn test_duplicate_version_is_rejected() {
        let (store, file_id) = store_with_file().await;
        store.create_content(&file_id, "v1", "a", None).await.unwrap();
        let err = store
            .create_content(&file_id, "v1", "b", None)
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::Exists(_)));
    }

    #[tokio::test]
    async fn test_unknown_format_and_file() {
        let (store, file_id) = store_with_file().await;
        let err = store
            .create_content(&file_id, "v1", "a", Some("nope"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = store
            .create_content("missing", "v1", "a", None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_contents_with_version_filter() {
        let (store, file_id) = store_with_file().await;
        store.create_content(&file_id, "v1", "a", None).await.unwrap();
        store.create_content(&file_id, "v2", "b", None).await.unwrap();

        assert_eq!(store.list_contents(&file_id, None).await.unwrap().len(), 2);
        let only = store.list_contents(&file_id, Some("v2")).await.unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].content, "b");
    }

    #[tokio::test]
    async fn test_edit_content() {
        let (store, file_id) = store_with_file().await;
        let v1 = store.create_content(&file_id, "v1", "a", None).await.unwrap();
        store.create_content(&file_id, "v2", "b", None).await.unwrap();

        let err = store.edit_content(&v1.id, None, None).await.unwrap_err();
        assert!(matches!(err, KeeperError::RequiredField(_)));

        let err = store.edit_content(&v1.id, Some("v2"), None).await.unwrap_err();
        assert!(matches!(err, KeeperError::Exists(_)));

        let edited = store
            .edit_content(&v1.id, None, Some("changed"))
            .await
            .unwrap();
        assert_eq!(edited.content, "changed");
        assert_eq!(edited.version, "v1");

        let same_label = store.edit_content(&v1.id, Some("v1"), None).await.unwrap();
        assert_eq!(same_label.version, "v1");

        let err = store
            .edit_content("missing", Some("v9"), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_content_returns_file_id() {
        let (store, file_id) = store_with_file().await;
        let v1 = store.create_content(&file_id, "v1", "a", None).await.unwrap();

        assert_eq!(
            store.delete_content(&v1.id).await.unwrap().as_deref(),
            Some(file_id.as_str())
        );
        assert_eq!(store.delete_content(&v1.id).await.unwrap(), None);
    }
}
