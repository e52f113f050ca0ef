pub mod services;

pub use services::{accept, Upload, MAX_ATTACHMENT_BYTES, UPLOAD_PREFIX};
