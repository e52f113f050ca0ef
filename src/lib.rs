pub mod app;
pub mod attachments;
pub mod auth;
pub mod comments;
pub mod config;
pub mod error;
pub mod posts;
pub mod state;
pub mod storage;
pub mod store;
