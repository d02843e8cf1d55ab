use chrono::Utc;
use keeper_types::EntryName;

use super::{new_id, FolderOrder, Store};
use crate::models::{Folder, FolderWithPath};
use crate::{KeeperError, KeeperResult};

const FOLDER_COLUMNS: &str = "id, name, parent_id, created_at, updated_at";

const FOLDER_WITH_PATH: &str = "WITH RECURSIVE folder_path AS (
        SELECT id, parent_id, name, name AS path, created_at, updated_at
        FROM folders
        WHERE parent_id IS NULL
        UNION ALL
        SELECT f.id, f.parent_id, f.name, fp.path || '/' || f.name, f.created_at, f.updated_at
        FROM folders f
        JOIN folder_path fp ON f.parent_id = fp.id
    )
    SELECT id, name, parent_id, path, created_at, updated_at
    FROM folder_path
    WHERE id = $1";

impl Store {
    /// Create a folder under `parent_id`, or at the top level when `parent_id` is `None`.
    ///
    /// # Errors
    ///
    /// * [`KeeperError::NotFound`] if the parent folder does not exist.
    /// * [`KeeperError::Exists`] if a sibling folder already has this name.
    pub async fn create_folder(
        &self,
        name: &EntryName,
        parent_id: Option<&str>,
    ) -> KeeperResult<Folder> {
        if let Some(parent_id) = parent_id {
            if !self.folder_exists_by_id(parent_id).await? {
                return Err(KeeperError::NotFound(format!("parent folder {parent_id}")));
            }
        }
        if self.folder_exists(name.as_str(), parent_id).await? {
            return Err(KeeperError::Exists(format!("folder {name}")));
        }

        let now = Utc::now();
        let folder = sqlx::query_as::<_, Folder>(&format!(
            "INSERT INTO folders (id, name, parent_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {FOLDER_COLUMNS}"
        ))
        .bind(new_id())
        .bind(name.as_str())
        .bind(parent_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(folder)
    }

    /// Whether a folder called `name` exists directly under `parent_id`.
    pub async fn folder_exists(&self, name: &str, parent_id: Option<&str>) -> KeeperResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM folders WHERE name = $1 AND parent_id IS $2)",
        )
        .bind(name)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn folder_exists_by_id(&self, id: &str) -> KeeperResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM folders WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Fetch a folder along with its full path.
    pub async fn get_folder(&self, id: &str) -> KeeperResult<FolderWithPath> {
        sqlx::query_as::<_, FolderWithPath>(FOLDER_WITH_PATH)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| KeeperError::NotFound(format!("folder {id}")))
    }

    /// Direct child folders of `parent_id` (top-level folders when `None`).
    pub async fn list_folders(
        &self,
        parent_id: Option<&str>,
        order: FolderOrder,
    ) -> KeeperResult<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE parent_id IS $1 ORDER BY {}",
            order.to_sql()
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(folders)
    }

    /// Rename a folder.
    ///
    /// # Errors
    ///
    /// * [`KeeperError::NotFound`] if the folder does not exist.
    /// * [`KeeperError::Exists`] if another folder with the same parent already has `name`.
    pub async fn rename_folder(&self, id: &str, name: &EntryName) -> KeeperResult<Folder> {
        let clash = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM folders
                WHERE name = $1
                AND id != $2
                AND parent_id IS (SELECT parent_id FROM folders WHERE id = $2)
            )",
        )
        .bind(name.as_str())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if clash {
            return Err(KeeperError::Exists(format!("folder {name}")));
        }

        sqlx::query_as::<_, Folder>(&format!(
            "UPDATE folders SET name = $1, updated_at = $2 WHERE id = $3 RETURNING {FOLDER_COLUMNS}"
        ))
        .bind(name.as_str())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| KeeperError::NotFound(format!("folder {id}")))
    }

    /// Delete a folder and, through cascades, everything inside it.
    ///
    /// Returns `false` if no folder had this id.
    pub async fn delete_folder(&self, id: &str) -> KeeperResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use keeper_types::OrderDirection;

    use super::super::{memory_store, FolderOrderColumn};
    use super::*;

    fn name(value: &str) -> EntryName {
        EntryName::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_nested_folder_path() {
        let store = memory_store().await;
        let apps = store.create_folder(&name("apps"), None).await.unwrap();
        let prod = store
            .create_folder(&name("prod"), Some(&apps.id))
            .await
            .unwrap();
        let api = store
            .create_folder(&name("api"), Some(&prod.id))
            .await
            .unwrap();

        let found = store.get_folder(&api.id).await.unwrap();
        assert_eq!(found.path, "apps/prod/api");
        assert_eq!(found.parent_id.as_deref(), Some(prod.id.as_str()));
    }

    #[tokio::test]
    async fn test_duplicate_sibling_rejected_but_cousin_allowed() {
        let store = memory_store().await;
        let a = store.create_folder(&name("a"), None).await.unwrap();
        let b = store.create_folder(&name("b"), None).await.unwrap();

        store.create_folder(&name("x"), Some(&a.id)).await.unwrap();
        let err = store
            .create_folder(&name("x"), Some(&a.id))
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::Exists(_)));

        store.create_folder(&name("x"), Some(&b.id)).await.unwrap();
        let err = store.create_folder(&name("a"), None).await.unwrap_err();
        assert!(matches!(err, KeeperError::Exists(_)));
    }

    #[tokio::test]
    async fn test_missing_parent_is_not_found() {
        let store = memory_store().await;
        let err = store
            .create_folder(&name("x"), Some("nope"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_folders_respects_order() {
        let store = memory_store().await;
        for n in ["beta", "alpha", "gamma"] {
            store.create_folder(&name(n), None).await.unwrap();
        }

        let asc = store
            .list_folders(None, FolderOrder::default())
            .await
            .unwrap();
        let names: Vec<_> = asc.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta", "gamma"]);

        let desc = store
            .list_folders(
                None,
                FolderOrder {
                    column: FolderOrderColumn::Name,
                    direction: OrderDirection::Desc,
                },
            )
            .await
            .unwrap();
        assert_eq!(desc[0].name, "gamma");
    }

    #[tokio::test]
    async fn test_rename_folder() {
        let store = memory_store().await;
        let a = store.create_folder(&name("a"), None).await.unwrap();
        store.create_folder(&name("b"), None).await.unwrap();

        let err = store.rename_folder(&a.id, &name("b")).await.unwrap_err();
        assert!(matches!(err, KeeperError::Exists(_)));

        let renamed = store.rename_folder(&a.id, &name("c")).await.unwrap();
        assert_eq!(renamed.name, "c");
        assert!(renamed.updated_at >= a.updated_at);

        let err = store.rename_folder("missing", &name("z")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_folder_cascades_to_children() {
        let store = memory_store().await;
        let parent = store.create_folder(&name("p"), None).await.unwrap();
        let child = store
            .create_folder(&name("c"), Some(&parent.id))
            .await
            .unwrap();

        assert!(store.delete_folder(&parent.id).await.unwrap());
        assert!(store.get_folder(&child.id).await.unwrap_err().is_not_found());
        assert!(!store.delete_folder(&parent.id).await.unwrap());
    }
}
