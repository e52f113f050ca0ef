use serde::Serialize;

use crate::{
    attachments::Upload,
    auth::identity::IdentityContext,
    comments::repo_types::CommentView,
    posts::repo_types::PostView,
};

/// Raw post submission, before trimming and validation.
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub title: String,
    pub body: String,
    pub cover_image: Option<Upload>,
}

/// A post with its comments, newest comment first.
#[derive(Debug, Serialize)]
pub struct PostDetails {
    #[serde(flatten)]
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

/// Home listing along with the viewer, if any.
#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub user: Option<IdentityContext>,
    pub blogs: Vec<PostView>,
}

#[derive(Debug, Serialize)]
pub struct PostPage {
    pub user: Option<IdentityContext>,
    pub blog: PostDetails,
}

#[derive(Debug, Serialize)]
pub struct AddPostPage {
    pub user: IdentityContext,
}
