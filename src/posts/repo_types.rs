use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Post record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub cover_image_url: Option<String>,
    pub created_by: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub cover_image_url: Option<String>,
    pub created_by: Uuid,
}

/// Display fields of the user behind a post or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

/// Post joined with its owner's display fields.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub cover_image_url: Option<String>,
    pub created_by: Author,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Flat row of the posts ⋈ users query.
#[derive(Debug, FromRow)]
pub struct PostViewRow {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub cover_image_url: Option<String>,
    pub created_by: Uuid,
    pub author_name: String,
    pub author_email: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<PostViewRow> for PostView {
    fn from(r: PostViewRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            body: r.body,
            cover_image_url: r.cover_image_url,
            created_by: Author {
                id: r.created_by,
                full_name: r.author_name,
                email: r.author_email,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
