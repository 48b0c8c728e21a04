use thiserror::Error;

use super::media::{upload_media, Upload, IMAGE_FOLDER, VIDEO_FOLDER};
use crate::backend::{Backend, BackendError};
use crate::models::{Exercise, NewExercise};

#[derive(Error, Debug)]
pub enum ExerciseError {
    #[error("Digite o nome do exercício.")]
    MissingName,

    #[error("Erro ao salvar exercício.")]
    Backend(#[from] BackendError),
}

/// Catalog form as received, files included.
#[derive(Debug, Default)]
pub struct ExerciseForm {
    pub name: String,
    pub muscle_group: String,
    pub image: Option<Upload>,
    pub video: Option<Upload>,
}

/// Uploads the media first, then registers the exercise with whatever
/// URLs the uploads produced.
pub async fn create_exercise(
    backend: &dyn Backend,
    form: ExerciseForm,
) -> Result<Exercise, ExerciseError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ExerciseError::MissingName);
    }

    let image_url = match form.image {
        Some(upload) => upload_media(backend, IMAGE_FOLDER, upload).await,
        None => None,
    };
    let video_url = match form.video {
        Some(upload) => upload_media(backend, VIDEO_FOLDER, upload).await,
        None => None,
    };

    let muscle_group = form.muscle_group.trim();
    let exercise = backend
        .create_exercise(&NewExercise {
            name: name.to_string(),
            muscle_group: (!muscle_group.is_empty()).then(|| muscle_group.to_string()),
            image_url,
            video_url,
        })
        .await?;
    tracing::info!(exercise_id = exercise.id, "Registered exercise {:?}", exercise.name);
    Ok(exercise)
}

pub async fn delete_exercise(backend: &dyn Backend, exercise_id: i64) -> Result<(), ExerciseError> {
    backend.delete_exercise(exercise_id).await?;
    tracing::info!(exercise_id, "Deleted exercise");
    Ok(())
}
