use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ContentStore, UserStore};
use crate::{
    auth::{
        password::PasswordDigest,
        repo_types::{NewUser, User, DEFAULT_PROFILE_PIC},
    },
    comments::repo_types::{Comment, CommentView, CommentViewRow, NewComment},
    posts::repo_types::{NewPost, Post, PostView, PostViewRow},
};

const USER_COLUMNS: &str =
    "id, full_name, email, salt, password_hash, profile_pic_url, role, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn insert_user(&self, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (full_name, email, salt, password_hash, profile_pic_url, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(new.credentials.salt())
        .bind(new.credentials.hash())
        .bind(new.profile_pic_url.as_deref().unwrap_or(DEFAULT_PROFILE_PIC))
        .bind(new.role)
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    async fn update_password(&self, id: Uuid, credentials: &PasswordDigest) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
               SET salt = $2, password_hash = $3, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(credentials.salt())
        .bind(credentials.hash())
        .execute(&self.db)
        .await
        .context("update password")?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn insert_post(&self, new: NewPost) -> anyhow::Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, body, cover_image_url, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, body, cover_image_url, created_by, created_at, updated_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.body)
        .bind(new.cover_image_url.as_deref())
        .bind(new.created_by)
        .fetch_one(&self.db)
        .await
        .context("insert post")?;
        Ok(post)
    }

    async fn list_posts(&self) -> anyhow::Result<Vec<PostView>> {
        let rows = sqlx::query_as::<_, PostViewRow>(
            r#"
            SELECT p.id, p.title, p.body, p.cover_image_url, p.created_by,
                   u.full_name AS author_name, u.email AS author_email,
                   p.created_at, p.updated_at
              FROM posts p
              JOIN users u ON u.id = p.created_by
             ORDER BY p.created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list posts")?;
        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn find_post(&self, id: Uuid) -> anyhow::Result<Option<PostView>> {
        let row = sqlx::query_as::<_, PostViewRow>(
            r#"
            SELECT p.id, p.title, p.body, p.cover_image_url, p.created_by,
                   u.full_name AS author_name, u.email AS author_email,
                   p.created_at, p.updated_at
              FROM posts p
              JOIN users u ON u.id = p.created_by
             WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find post")?;
        Ok(row.map(PostView::from))
    }

    async fn delete_post(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete post")?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_comment(&self, new: NewComment) -> anyhow::Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (content, post_id, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, content, post_id, created_by, created_at
            "#,
        )
        .bind(&new.content)
        .bind(new.post_id)
        .bind(new.created_by)
        .fetch_one(&self.db)
        .await
        .context("insert comment")?;
        Ok(comment)
    }

    async fn list_comments(&self, post_id: Uuid) -> anyhow::Result<Vec<CommentView>> {
        let rows = sqlx::query_as::<_, CommentViewRow>(
            r#"
            SELECT c.id, c.content, c.post_id, c.created_by,
                   u.full_name AS author_name, u.email AS author_email,
                   c.created_at
              FROM comments c
              JOIN users u ON u.id = c.created_by
             WHERE c.post_id = $1
             ORDER BY c.created_at DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.db)
        .await
        .context("list comments")?;
        Ok(rows.into_iter().map(CommentView::from).collect())
    }

    async fn delete_comments_for_post(&self, post_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&self.db)
            .await
            .context("delete comments")?;
        Ok(res.rows_affected())
    }

    async fn delete_post_cascade(&self, post_id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .context("delete comments")?;
        let res = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .context("delete post")?;
        tx.commit().await.context("commit tx")?;
        Ok(res.rows_affected() > 0)
    }
}
