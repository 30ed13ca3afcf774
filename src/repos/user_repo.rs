/*
 * Responsibility
 * - users テーブルの読み取り (identity 解決用)
 * - PgPool を受け取り、IdentityLookup として verifier に注入される
 * - DB エラーは RepoError -> LookupError に変換して返す
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::services::identity::{Identity, IdentityLookup, LookupError};

#[derive(Debug, FromRow)]
pub struct UserRow {
    #[sqlx(rename = "userId")]
    pub id: Uuid,
    #[sqlx(rename = "userName")]
    pub user_name: String,
    #[sqlx(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl From<UserRow> for Identity {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.to_string(),
            user_name: row.user_name,
            image_url: row.image_url,
        }
    }
}

#[derive(Clone, Debug)]
pub struct UserRepo {
    db: PgPool,
}

impl UserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<UserRow>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT "userId", "userName", "imageUrl"
            FROM users
            WHERE "userId" = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl IdentityLookup for UserRepo {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn lookup(&self, id: &str) -> Result<Option<Identity>, LookupError> {
        // user ids are UUIDs; anything else cannot exist in the table
        let Ok(user_id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row = self.get(user_id).await.map_err(|e| {
            error!(user_id = %user_id, error = ?e, "Failed to lookup user");
            LookupError::Backend(e.to_string())
        })?;

        Ok(row.map(Identity::from))
    }
}
