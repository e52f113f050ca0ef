use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::posts::repo_types::Author;

/// Comment record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub post_id: Uuid,
    pub created_by: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub post_id: Uuid,
    pub created_by: Uuid,
}

/// Comment joined with its author's display fields.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub post_id: Uuid,
    pub created_by: Author,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct CommentViewRow {
    pub id: Uuid,
    pub content: String,
    pub post_id: Uuid,
    pub created_by: Uuid,
    pub author_name: String,
    pub author_email: String,
    pub created_at: OffsetDateTime,
}

impl From<CommentViewRow> for CommentView {
    fn from(r: CommentViewRow) -> Self {
        Self {
            id: r.id,
            content: r.content,
            post_id: r.post_id,
            created_by: Author {
                id: r.created_by,
                full_name: r.author_name,
                email: r.author_email,
            },
            created_at: r.created_at,
        }
    }
}

impl CommentView {
    pub fn from_parts(comment: Comment, author: Author) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            created_by: author,
            created_at: comment.created_at,
        }
    }
}
