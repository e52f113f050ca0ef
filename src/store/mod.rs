//! Persistence boundary for users, posts and comments.
//!
//! Services only talk to the [`Store`] trait object; Postgres backs it in
//! production and [`memory::MemoryStore`] in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    auth::{
        password::PasswordDigest,
        repo_types::{NewUser, User},
    },
    comments::repo_types::{Comment, CommentView, NewComment},
    posts::repo_types::{NewPost, Post, PostView},
};

pub mod memory;
pub mod pg;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn insert_user(&self, new: NewUser) -> anyhow::Result<User>;
    async fn update_password(&self, id: Uuid, credentials: &PasswordDigest) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert_post(&self, new: NewPost) -> anyhow::Result<Post>;
    /// All posts, newest first.
    async fn list_posts(&self) -> anyhow::Result<Vec<PostView>>;
    async fn find_post(&self, id: Uuid) -> anyhow::Result<Option<PostView>>;
    /// Returns whether a row was removed.
    async fn delete_post(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn insert_comment(&self, new: NewComment) -> anyhow::Result<Comment>;
    /// Comments on a post, newest first.
    async fn list_comments(&self, post_id: Uuid) -> anyhow::Result<Vec<CommentView>>;
    async fn delete_comments_for_post(&self, post_id: Uuid) -> anyhow::Result<u64>;

    /// Removes a post and its comments.
    ///
    /// Comments go first. If the second step fails the comments stay deleted
    /// while the post remains; stores with transactions override this.
    async fn delete_post_cascade(&self, post_id: Uuid) -> anyhow::Result<bool> {
        self.delete_comments_for_post(post_id).await?;
        self.delete_post(post_id).await
    }
}

pub trait Store: UserStore + ContentStore {}

impl<T: UserStore + ContentStore> Store for T {}
