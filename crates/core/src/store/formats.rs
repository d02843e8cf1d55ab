use super::Store;
use crate::models::ContentFormat;
use crate::KeeperResult;

impl Store {
    pub async fn list_content_formats(&self) -> KeeperResult<Vec<ContentFormat>> {
        let formats = sqlx::query_as::<_, ContentFormat>(
            "SELECT id, name FROM content_formats ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(formats)
    }

    pub(crate) async fn content_format_exists(&self, id: &str) -> KeeperResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM content_formats WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
