use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::identity::Identity,
    comments::repo_types::{CommentView, NewComment},
    error::AppError,
    posts::repo_types::Author,
    state::AppState,
};

/// Adds a comment from the caller to an existing post.
#[instrument(skip(st, identity, content))]
pub async fn create(
    st: &AppState,
    identity: &Identity,
    post_id: Uuid,
    content: String,
) -> Result<CommentView, AppError> {
    let who = identity.require()?;
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::validation("Comment cannot be empty"));
    }

    st.store
        .find_post(post_id)
        .await
        .map_err(AppError::Store)?
        .ok_or(AppError::NotFound("Post"))?;

    let comment = st
        .store
        .insert_comment(NewComment {
            content: content.to_string(),
            post_id,
            created_by: who.user_id,
        })
        .await
        .map_err(AppError::Store)?;

    info!(comment_id = %comment.id, %post_id, user_id = %who.user_id, "comment created");
    Ok(CommentView::from_parts(
        comment,
        Author {
            id: who.user_id,
            full_name: who.full_name.clone(),
            email: who.email.clone(),
        },
    ))
}

pub async fn list_for_post(st: &AppState, post_id: Uuid) -> Result<Vec<CommentView>, AppError> {
    st.store
        .list_comments(post_id)
        .await
        .map_err(AppError::Store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{
            identity::IdentityContext,
            password::hash_password,
            repo_types::{NewUser, Role},
        },
        posts::{dto::CreatePostInput, services as post_services},
    };

    async fn setup() -> (AppState, Identity, Uuid) {
        let st = AppState::fake();
        let u = st
            .store
            .insert_user(NewUser {
                full_name: "Commenter".into(),
                email: "c@example.com".into(),
                credentials: hash_password("password123").unwrap(),
                profile_pic_url: None,
                role: Role::User,
            })
            .await
            .unwrap();
        let me = Identity::Authenticated(IdentityContext::from(&u));
        let post = post_services::create(
            &st,
            &me,
            CreatePostInput {
                title: "Post".into(),
                body: "Body".into(),
                cover_image: None,
            },
        )
        .await
        .unwrap();
        (st, me, post.id)
    }

    #[tokio::test]
    async fn requires_identity() {
        let (st, _, post_id) = setup().await;
        assert!(matches!(
            create(&st, &Identity::Anonymous, post_id, "hi".into()).await,
            Err(AppError::AuthRequired)
        ));
    }

    #[tokio::test]
    async fn rejects_whitespace_only() {
        let (st, me, post_id) = setup().await;
        assert!(matches!(
            create(&st, &me, post_id, "  ".into()).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let (st, me, _) = setup().await;
        assert!(matches!(
            create(&st, &me, Uuid::new_v4(), "hello".into()).await,
            Err(AppError::NotFound("Post"))
        ));
    }

    #[tokio::test]
    async fn stores_trimmed_content_with_author() {
        let (st, me, post_id) = setup().await;
        let c = create(&st, &me, post_id, "  great read \n".into()).await.unwrap();
        assert_eq!(c.content, "great read");
        assert_eq!(c.post_id, post_id);
        assert_eq!(c.created_by.full_name, "Commenter");
        assert_eq!(c.created_by.email, "c@example.com");

        let listed = list_for_post(&st, post_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content, "great read");
    }

    #[tokio::test]
    async fn comments_are_listed_newest_first() {
        let (st, me, post_id) = setup().await;
        for text in ["first", "second", "third"] {
            create(&st, &me, post_id, text.into()).await.unwrap();
        }
        let texts: Vec<_> = list_for_post(&st, post_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(texts, ["third", "second", "first"]);
    }
}
