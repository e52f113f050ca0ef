use std::path::Path;

use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::{error::AppError, storage::StorageClient};

/// Largest accepted attachment, 5 MiB.
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// URL prefix under which stored attachments are served.
pub const UPLOAD_PREFIX: &str = "/uploads";

/// A single uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub body: Bytes,
}

/// Validates an upload and stores it under a fresh name.
///
/// Returns the public reference (`/uploads/<name>`) to persist on the post.
pub async fn accept(storage: &dyn StorageClient, upload: Upload) -> Result<String, AppError> {
    if !upload.content_type.starts_with("image/") {
        warn!(content_type = %upload.content_type, "rejected non-image attachment");
        return Err(AppError::validation("Only image files are allowed!"));
    }
    if upload.body.len() > MAX_ATTACHMENT_BYTES {
        warn!(size = upload.body.len(), "rejected oversized attachment");
        return Err(AppError::validation(
            "File size too large. Maximum 5MB allowed.",
        ));
    }

    let name = unique_name(upload.file_name.as_deref(), &upload.content_type);
    let size = upload.body.len();
    storage.put_object(&name, upload.body).await.map_err(|e| {
        error!(error = %e, key = %name, "attachment write failed");
        AppError::Storage(e)
    })?;

    info!(key = %name, size, "attachment stored");
    Ok(format!("{UPLOAD_PREFIX}/{name}"))
}

/// `blog-<unix millis>-<64 random bits>[.ext]`
fn unique_name(file_name: Option<&str>, content_type: &str) -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let random: u64 = rand::random();
    let ext = file_name
        .and_then(ext_from_file_name)
        .or_else(|| ext_from_mime(content_type).map(str::to_owned));
    match ext {
        Some(ext) => format!("blog-{millis}-{random:016x}.{ext}"),
        None => format!("blog-{millis}-{random:016x}"),
    }
}

fn ext_from_file_name(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}
