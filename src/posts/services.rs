use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    attachments,
    auth::identity::Identity,
    comments,
    error::AppError,
    posts::{
        dto::{CreatePostInput, PostDetails},
        repo_types::{NewPost, Post, PostView},
    },
    state::AppState,
};

/// Every post, newest first, with owner display fields.
#[instrument(skip(st))]
pub async fn list_all(st: &AppState) -> Result<Vec<PostView>, AppError> {
    let posts = st.store.list_posts().await.map_err(AppError::Store)?;
    info!(count = posts.len(), "posts fetched");
    Ok(posts)
}

/// Creates a post owned by the caller.
///
/// Text fields are checked before the identity, so empty input is a
/// validation error whether or not the caller is signed in. The cover image
/// is stored before the post row; if the insert then fails the file stays
/// behind.
#[instrument(skip(st, identity, input))]
pub async fn create(
    st: &AppState,
    identity: &Identity,
    input: CreatePostInput,
) -> Result<Post, AppError> {
    let title = input.title.trim();
    let body = input.body.trim();
    if title.is_empty() || body.is_empty() {
        return Err(AppError::validation("Title and body are required"));
    }

    let who = identity.require()?;
    if st
        .store
        .find_user_by_id(who.user_id)
        .await
        .map_err(AppError::Store)?
        .is_none()
    {
        warn!(user_id = %who.user_id, "session refers to unknown user");
        return Err(AppError::AuthRequired);
    }

    let cover_image_url = match input.cover_image {
        Some(upload) => Some(attachments::accept(st.storage.as_ref(), upload).await?),
        None => None,
    };

    let post = st
        .store
        .insert_post(NewPost {
            title: title.to_string(),
            body: body.to_string(),
            cover_image_url: cover_image_url.clone(),
            created_by: who.user_id,
        })
        .await
        .map_err(|e| {
            if let Some(orphan) = &cover_image_url {
                error!(error = %e, attachment = %orphan, "post insert failed, attachment orphaned");
            }
            AppError::Store(e)
        })?;

    info!(post_id = %post.id, user_id = %who.user_id, "post created");
    Ok(post)
}

/// A post with owner fields and its comments.
#[instrument(skip(st))]
pub async fn get_by_id(st: &AppState, id: Uuid) -> Result<PostDetails, AppError> {
    let post = st
        .store
        .find_post(id)
        .await
        .map_err(AppError::Store)?
        .ok_or(AppError::NotFound("Post"))?;
    let comments = comments::services::list_for_post(st, id).await?;
    Ok(PostDetails { post, comments })
}

/// Deletes a post owned by the caller together with its comments.
#[instrument(skip(st, identity))]
pub async fn delete(st: &AppState, identity: &Identity, id: Uuid) -> Result<(), AppError> {
    let who = identity.require()?;
    let post = st
        .store
        .find_post(id)
        .await
        .map_err(AppError::Store)?
        .ok_or(AppError::NotFound("Post"))?;

    if post.created_by.id != who.user_id {
        warn!(post_id = %id, user_id = %who.user_id, owner = %post.created_by.id, "delete by non-owner");
        return Err(AppError::Forbidden);
    }

    let removed = st.store.delete_post_cascade(id).await.map_err(|e| {
        error!(error = %e, post_id = %id, "cascade delete failed; comments may already be gone");
        AppError::Store(e)
    })?;
    if !removed {
        // lost a race with another delete
        return Err(AppError::NotFound("Post"));
    }

    info!(post_id = %id, user_id = %who.user_id, "post deleted");
    Ok(())
}
