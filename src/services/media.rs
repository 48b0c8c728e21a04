//! Exercise media uploads.

use chrono::Utc;

use crate::backend::Backend;

pub const IMAGE_FOLDER: &str = "imagens";
pub const VIDEO_FOLDER: &str = "videos";

/// A file received from the exercise form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Keep file names path- and URL-safe.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "arquivo".to_string()
    } else {
        cleaned
    }
}

pub fn object_path(folder: &str, file_name: &str, millis: i64) -> String {
    format!("{}/{}-{}", folder, millis, sanitize_file_name(file_name))
}

/// Upload and return the public URL. Failures are logged and yield `None`
/// so the exercise can still be registered without that media.
pub async fn upload_media(backend: &dyn Backend, folder: &str, upload: Upload) -> Option<String> {
    let path = object_path(folder, &upload.file_name, Utc::now().timestamp_millis());

    match backend
        .upload_object(&path, &upload.content_type, upload.data)
        .await
    {
        Ok(()) => {
            tracing::debug!("Uploaded {}", path);
            Some(backend.public_url(&path))
        }
        Err(e) => {
            tracing::warn!("Upload of {} failed: {}", path, e);
            None
        }
    }
}
