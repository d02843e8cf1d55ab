use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use super::{new_id, AliasOrder, Store};
use crate::constants::{DEFAULT_ALIAS_LIMIT, DEFAULT_ALIAS_OFFSET};
use crate::models::{Alias, FileAlias};
use crate::{KeeperError, KeeperResult};

const ALIAS_COLUMNS: &str = "id, \"key\", \"value\", color, created_at, updated_at";

/// Filters and paging for alias listings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasFilter {
    pub key: Option<String>,
    pub value: Option<String>,
    pub limit: i64,
    pub offset: i64,
    pub order: AliasOrder,
}

impl Default for AliasFilter {
    fn default() -> Self {
        Self {
            key: None,
            value: None,
            limit: DEFAULT_ALIAS_LIMIT,
            offset: DEFAULT_ALIAS_OFFSET,
            order: AliasOrder::default(),
        }
    }
}

impl Store {
    /// Create an alias.
    ///
    /// # Errors
    ///
    /// Returns [`KeeperError::Exists`] if an alias with the same key and value exists.
    pub async fn create_alias(&self, key: &str, value: &str, color: &str) -> KeeperResult<Alias> {
        if self.alias_pair_taken(key, value, None).await? {
            return Err(KeeperError::Exists(format!("alias {key}={value}")));
        }

        let now = Utc::now();
        let alias = sqlx::query_as::<_, Alias>(&format!(
            "INSERT INTO aliases (id, \"key\", \"value\", color, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ALIAS_COLUMNS}"
        ))
        .bind(new_id())
        .bind(key)
        .bind(value)
        .bind(color)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(alias)
    }

    pub async fn get_alias(&self, id: &str) -> KeeperResult<Alias> {
        sqlx::query_as::<_, Alias>(&format!("SELECT {ALIAS_COLUMNS} FROM aliases WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| KeeperError::NotFound(format!("alias {id}")))
    }

    pub async fn list_aliases(&self, filter: &AliasFilter) -> KeeperResult<Vec<Alias>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ALIAS_COLUMNS} FROM aliases WHERE 1 = 1"));
        if let Some(key) = &filter.key {
            query.push(" AND \"key\" = ").push_bind(key.clone());
        }
        if let Some(value) = &filter.value {
            query.push(" AND \"value\" = ").push_bind(value.clone());
        }
        query.push(" ORDER BY ").push(filter.order.to_sql());
        query.push(" LIMIT ").push_bind(filter.limit);
        query.push(" OFFSET ").push_bind(filter.offset);

        let aliases = query.build_query_as::<Alias>().fetch_all(&self.pool).await?;
        Ok(aliases)
    }

    /// Change any of key, value and color on an alias.
    ///
    /// # Errors
    ///
    /// * [`KeeperError::RequiredField`] if no field is given.
    /// * [`KeeperError::NotFound`] if the alias does not exist.
    /// * [`KeeperError::Exists`] if the resulting key/value pair belongs to another alias.
    pub async fn edit_alias(
        &self,
        id: &str,
        key: Option<&str>,
        value: Option<&str>,
        color: Option<&str>,
    ) -> KeeperResult<Alias> {
        if key.is_none() && value.is_none() && color.is_none() {
            return Err(KeeperError::RequiredField(vec![
                "key or value or color".into(),
            ]));
        }

        let existing = self.get_alias(id).await?;
        let new_key = key.unwrap_or(existing.key.as_str());
        let new_value = value.unwrap_or(existing.value.as_str());
        if self.alias_pair_taken(new_key, new_value, Some(id)).await? {
            return Err(KeeperError::Exists(format!("alias {new_key}={new_value}")));
        }

        sqlx::query_as::<_, Alias>(&format!(
            "UPDATE aliases
             SET \"key\" = $1, \"value\" = $2, color = COALESCE($3, color), updated_at = $4
             WHERE id = $5
             RETURNING {ALIAS_COLUMNS}"
        ))
        .bind(new_key)
        .bind(new_value)
        .bind(color)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| KeeperError::NotFound(format!("alias {id}")))
    }

    pub async fn delete_alias(&self, id: &str) -> KeeperResult<bool> {
        let result = sqlx::query("DELETE FROM aliases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach aliases to a file, skipping the ones already attached.
    ///
    /// Returns the number of new links.
    ///
    /// # Errors
    ///
    /// * [`KeeperError::NotFound`] if the file or any alias does not exist.
    /// * [`KeeperError::Exists`] if every alias was already attached.
    pub async fn attach_aliases(&self, file_id: &str, alias_ids: &[String]) -> KeeperResult<u64> {
        if !self.file_exists(file_id).await? {
            return Err(KeeperError::NotFound(format!("file {file_id}")));
        }

        let attached: Vec<String> = self
            .list_file_aliases(file_id)
            .await?
            .into_iter()
            .map(|alias| alias.id)
            .collect();

        let mut pending: Vec<&String> = alias_ids
            .iter()
            .filter(|id| !attached.contains(id))
            .collect();
        pending.dedup();
        if pending.is_empty() {
            return Err(KeeperError::Exists("provided aliases".into()));
        }

        let mut tx = self.pool.begin().await?;
        let mut added = 0;
        for alias_id in pending {
            let exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM aliases WHERE id = $1)")
                    .bind(alias_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Err(KeeperError::NotFound(format!("alias {alias_id}")));
            }

            let result = sqlx::query(
                "INSERT INTO files_aliases (file_id, alias_id) VALUES ($1, $2)
                 ON CONFLICT(file_id, alias_id) DO NOTHING",
            )
            .bind(file_id)
            .bind(alias_id)
            .execute(&mut *tx)
            .await?;
            added += result.rows_affected();
        }
        tx.commit().await?;

        Ok(added)
    }

    /// Detach aliases from a file. Returns the number of links removed.
    pub async fn detach_aliases(&self, file_id: &str, alias_ids: &[String]) -> KeeperResult<u64> {
        if alias_ids.is_empty() {
            return Ok(0);
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("DELETE FROM files_aliases WHERE file_id = ");
        query.push_bind(file_id.to_owned());
        query.push(" AND alias_id IN (");
        let mut ids = query.separated(", ");
        for id in alias_ids {
            ids.push_bind(id.clone());
        }
        ids.push_unseparated(")");

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Aliases attached to one file, ordered by key.
    pub async fn list_file_aliases(&self, file_id: &str) -> KeeperResult<Vec<Alias>> {
        let aliases = sqlx::query_as::<_, Alias>(
            "SELECT a.id, a.\"key\", a.\"value\", a.color, a.created_at, a.updated_at
             FROM aliases a
             INNER JOIN files_aliases fa ON fa.alias_id = a.id
             WHERE fa.file_id = $1
             ORDER BY a.\"key\" ASC, a.\"value\" ASC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(aliases)
    }

    /// Aliases of several files at once, each tagged with the file it belongs to.
    pub async fn list_files_aliases(&self, file_ids: &[String]) -> KeeperResult<Vec<FileAlias>> {
        if file_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT fa.file_id, a.id, a.\"key\", a.\"value\", a.color, a.created_at, a.updated_at
             FROM aliases a
             INNER JOIN files_aliases fa ON fa.alias_id = a.id
             WHERE fa.file_id IN (",
        );
        let mut ids = query.separated(", ");
        for id in file_ids {
            ids.push_bind(id.clone());
        }
        ids.push_unseparated(")");
        query.push(" ORDER BY a.\"key\" ASC, a.\"value\" ASC");

        let aliases = query
            .build_query_as::<FileAlias>()
            .fetch_all(&self.pool)
            .await?;
        Ok(aliases)
    }

    async fn alias_pair_taken(
        &self,
        key: &str,
        value: &str,
        exclude_id: Option<&str>,
    ) -> KeeperResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM aliases
                WHERE \"key\" = $1 AND \"value\" = $2 AND ($3 IS NULL OR id != $3)
            )",
        )
        .bind(key)
        .bind(value)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }
}

#[cfg(test)]
mod tests {
    use keeper_types::{EntryName, OrderDirection};

    use super::super::{memory_store, AliasOrderColumn};
    use super::*;

    #[tokio::test]
    async fn test_duplicate_alias_pair_rejected() {
        let store = memory_store().await;
        store.create_alias("env", "prod", "#f00").await.unwrap();
        let err = store.create_alias("env", "prod", "#0f0").await.unwrap_err();
        assert!(matches!(err, KeeperError::Exists(_)));
        store.create_alias("env", "dev", "#0f0").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_aliases_filters_and_pages() {
        let store = memory_store().await;
        for (k, v) in [("env", "prod"), ("env", "dev"), ("team", "core")] {
            store.create_alias(k, v, "#000").await.unwrap();
        }

        let all = store.list_aliases(&AliasFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].key, "env");

        let env_only = store
            .list_aliases(&AliasFilter {
                key: Some("env".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(env_only.len(), 2);

        let paged = store
            .list_aliases(&AliasFilter {
                limit: 1,
                offset: 1,
                order: AliasOrder {
                    column: AliasOrderColumn::Value,
                    direction: OrderDirection::Asc,
                },
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].value, "dev");
    }

    #[tokio::test]
    async fn test_edit_alias() {
        let store = memory_store().await;
        let a = store.create_alias("env", "prod", "#f00").await.unwrap();
        store.create_alias("env", "dev", "#f00").await.unwrap();

        let err = store
            .edit_alias(&a.id, None, Some("dev"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::Exists(_)));

        let edited = store
            .edit_alias(&a.id, None, None, Some("#00f"))
            .await
            .unwrap();
        assert_eq!(edited.color, "#00f");
        assert_eq!(edited.value, "prod");

        let err = store.edit_alias(&a.id, None, None, None).await.unwrap_err();
        assert!(matches!(err, KeeperError::RequiredField(_)));
    }

    #[tokio::test]
    async fn test_attach_and_detach_aliases() {
        let store = memory_store().await;
        let file = store
            .create_file(&EntryName::new("app").unwrap(), None)
            .await
            .unwrap();
        let a = store.create_alias("env", "prod", "#f00").await.unwrap();
        let b = store.create_alias("team", "core", "#0f0").await.unwrap();

        let added = store
            .attach_aliases(&file.id, &[a.id.clone()])
            .await
            .unwrap();
        assert_eq!(added, 1);

        // The already attached alias is skipped.
        let added = store
            .attach_aliases(&file.id, &[a.id.clone(), b.id.clone()])
            .await
            .unwrap();
        assert_eq!(added, 1);

        let err = store
            .attach_aliases(&file.id, &[a.id.clone(), b.id.clone()])
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::Exists(_)));

        let err = store
            .attach_aliases(&file.id, &["missing".to_string()])
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(store.list_file_aliases(&file.id).await.unwrap().len(), 2);

        let removed = store
            .detach_aliases(&file.id, &[a.id.clone(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.list_file_aliases(&file.id).await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn test_list_files_aliases_tags_file_ids() {
        let store = memory_store().await;
        let f1 = store
            .create_file(&EntryName::new("one").unwrap(), None)
            .await
            .unwrap();
        let f2 = store
            .create_file(&EntryName::new("two").unwrap(), None)
            .await
            .unwrap();
        let alias = store.create_alias("env", "prod", "#f00").await.unwrap();
        store.attach_aliases(&f1.id, &[alias.id.clone()]).await.unwrap();
        store.attach_aliases(&f2.id, &[alias.id.clone()]).await.unwrap();

        let tagged = store
            .list_files_aliases(&[f1.id.clone(), f2.id.clone()])
            .await
            .unwrap();
        assert_eq!(tagged.len(), 2);
        assert!(tagged.iter().all(|fa| fa.alias.id == alias.id));
        assert!(tagged.iter().any(|fa| fa.file_id == f1.id));

        assert!(store.list_files_aliases(&[]).await.unwrap().is_empty());
    }
}
