use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContentStore, UserStore};
use crate::{
    auth::{
        password::PasswordDigest,
        repo_types::{NewUser, User, DEFAULT_PROFILE_PIC},
    },
    comments::repo_types::{Comment, CommentView, NewComment},
    posts::repo_types::{Author, NewPost, Post, PostView},
};

/// Store kept entirely in process memory. Rows are held in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

impl Inner {
    fn author(&self, id: Uuid) -> Option<Author> {
        self.users.iter().find(|u| u.id == id).map(|u| Author {
            id: u.id,
            full_name: u.full_name.clone(),
            email: u.email.clone(),
        })
    }

    fn post_view(&self, p: &Post) -> Option<PostView> {
        let author = self.author(p.created_by)?;
        Some(PostView {
            id: p.id,
            title: p.title.clone(),
            body: p.body.clone(),
            cover_image_url: p.cover_image_url.clone(),
            created_by: author,
            created_at: p.created_at,
            updated_at: p.updated_at,
        })
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, new: NewUser) -> anyhow::Result<User> {
        let mut inner = self.inner.write().await;
        anyhow::ensure!(
            !inner.users.iter().any(|u| u.email == new.email),
            "duplicate email {}",
            new.email
        );
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            full_name: new.full_name,
            email: new.email,
            salt: new.credentials.salt().to_owned(),
            password_hash: new.credentials.hash().to_owned(),
            profile_pic_url: new
                .profile_pic_url
                .unwrap_or_else(|| DEFAULT_PROFILE_PIC.to_string()),
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update_password(&self, id: Uuid, credentials: &PasswordDigest) -> anyhow::Result<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| anyhow::anyhow!("user {} not found", id))?;
        user.salt = credentials.salt().to_owned();
        user.password_hash = credentials.hash().to_owned();
        user.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn insert_post(&self, new: NewPost) -> anyhow::Result<Post> {
        let mut inner = self.inner.write().await;
        anyhow::ensure!(
            inner.users.iter().any(|u| u.id == new.created_by),
            "owner {} does not exist",
            new.created_by
        );
        let now = OffsetDateTime::now_utc();
        let post = Post {
            id: Uuid::new_v4(),
            title: new.title,
            body: new.body,
            cover_image_url: new.cover_image_url,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        inner.posts.push(post.clone());
        Ok(post)
    }

    async fn list_posts(&self) -> anyhow::Result<Vec<PostView>> {
        let inner = self.inner.read().await;
        // reverse insertion order first so equal timestamps stay newest-first
        let mut out: Vec<PostView> = inner
            .posts
            .iter()
            .rev()
            .filter_map(|p| inner.post_view(p))
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn find_post(&self, id: Uuid) -> anyhow::Result<Option<PostView>> {
        let inner = self.inner.read().await;
        Ok(inner
            .posts
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| inner.post_view(p)))
    }

    async fn delete_post(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.posts.len();
        inner.posts.retain(|p| p.id != id);
        Ok(inner.posts.len() != before)
    }

    async fn insert_comment(&self, new: NewComment) -> anyhow::Result<Comment> {
        let mut inner = self.inner.write().await;
        anyhow::ensure!(
            inner.posts.iter().any(|p| p.id == new.post_id),
            "post {} does not exist",
            new.post_id
        );
        let comment = Comment {
            id: Uuid::new_v4(),
            content: new.content,
            post_id: new.post_id,
            created_by: new.created_by,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, post_id: Uuid) -> anyhow::Result<Vec<CommentView>> {
        let inner = self.inner.read().await;
        let mut out: Vec<CommentView> = inner
            .comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                let author = inner.author(c.created_by)?;
                Some(CommentView::from_parts(c.clone(), author))
            })
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn delete_comments_for_post(&self, post_id: Uuid) -> anyhow::Result<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.comments.len();
        inner.comments.retain(|c| c.post_id != post_id);
        Ok((before - inner.comments.len()) as u64)
    }
}
