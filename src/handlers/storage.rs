use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::backend::SharedBackend;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct StorageState {
    pub backend: SharedBackend,
}

/// Serves media kept by backends that store objects themselves.
pub async fn fetch(State(state): State<StorageState>, Path(path): Path<String>) -> Result<Response> {
    let object = state
        .backend
        .fetch_object(&path)
        .await?
        .ok_or_else(|| AppError::NotFound("Arquivo não encontrado.".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, object.content_type),
            (header::CACHE_CONTROL, "max-age=3600".to_string()),
        ],
        object.data,
    )
        .into_response())
}
