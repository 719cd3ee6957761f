use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use nofeed_db::StoreError;
use nofeed_models::{NewPost, Post, PostChanges, PostFilterParams, UserWithRole};

use super::{PostStore, UserStore};

const POST_COLUMNS: &str =
    "id, title, content, auth0_user_id, slug, published, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    #[instrument(skip(self, post), fields(owner = %post.auth0_user_id))]
    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let created = sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (id, title, content, auth0_user_id, slug, published)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {POST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.auth0_user_id)
        .bind(&post.slug)
        .bind(post.published)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &PostFilterParams) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE ($1::boolean IS NULL OR published = $1)
               AND ($2::text IS NULL OR auth0_user_id = $2)
             ORDER BY created_at DESC"
        ))
        .bind(filter.published)
        .bind(filter.author.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    #[instrument(skip(self, changes))]
    async fn update(
        &self,
        id: Uuid,
        owner: &str,
        changes: &PostChanges,
    ) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts
             SET title = COALESCE($3, title),
                 content = COALESCE($4, content),
                 slug = COALESCE($5, slug),
                 published = COALESCE($6, published),
                 updated_at = NOW()
             WHERE id = $1 AND auth0_user_id = $2
             RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .bind(changes.slug.as_deref())
        .bind(changes.published)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid, owner: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND auth0_user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn role_id(conn: &mut PgConnection, role: &str) -> Result<i32, StoreError> {
    sqlx::query_scalar::<_, i32>("SELECT id FROM roles WHERE name = $1")
        .bind(role)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StoreError::UnknownRole(role.to_string()))
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self))]
    async fn ensure_user(&self, subject: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (auth0_user_id) VALUES ($1)
             ON CONFLICT (auth0_user_id) DO NOTHING",
        )
        .bind(subject)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn role_of(&self, subject: &str) -> Result<Option<String>, StoreError> {
        let role = sqlx::query_scalar::<_, String>(
            "SELECT r.name FROM user_roles ur
             JOIN roles r ON r.id = ur.role_id
             WHERE ur.auth0_user_id = $1",
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    #[instrument(skip(self))]
    async fn assign_role_if_absent(&self, subject: &str, role: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let role_id = role_id(&mut tx, role).await?;

        sqlx::query(
            "INSERT INTO user_roles (auth0_user_id, role_id) VALUES ($1, $2)
             ON CONFLICT (auth0_user_id) DO NOTHING",
        )
        .bind(subject)
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_role(&self, subject: &str, role: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let role_id = role_id(&mut tx, role).await?;

        sqlx::query(
            "INSERT INTO user_roles (auth0_user_id, role_id) VALUES ($1, $2)
             ON CONFLICT (auth0_user_id)
             DO UPDATE SET role_id = EXCLUDED.role_id, assigned_at = NOW()",
        )
        .bind(subject)
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn has_role(&self, subject: &str, role: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT 1 FROM user_roles ur
                 JOIN roles r ON r.id = ur.role_id
                 WHERE ur.auth0_user_id = $1 AND r.name = $2
             )",
        )
        .bind(subject)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserWithRole>, StoreError> {
        let users = sqlx::query_as::<_, UserWithRole>(
            "SELECT u.auth0_user_id, r.name AS role, u.created_at
             FROM users u
             LEFT JOIN user_roles ur ON ur.auth0_user_id = u.auth0_user_id
             LEFT JOIN roles r ON r.id = ur.role_id
             ORDER BY u.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, subject: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE auth0_user_id = $1")
            .bind(subject)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
