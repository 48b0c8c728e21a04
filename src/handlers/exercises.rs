use askama::Template;
use axum::{
    extract::{multipart::Field, Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::ConfirmTemplate;
use crate::backend::SharedBackend;
use crate::error::{AppError, Result};
use crate::models::Exercise;
use crate::services::exercises::{self, ExerciseError, ExerciseForm};
use crate::services::media::Upload;

#[derive(Clone)]
pub struct ExercisesState {
    pub backend: SharedBackend,
}

#[derive(Template)]
#[template(path = "exercises/list.html")]
struct ExercisesListTemplate {
    exercises: Vec<Exercise>,
    name: String,
    muscle_group: String,
    notice: Option<&'static str>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub treino: Option<String>,
}

async fn render_list(
    state: &ExercisesState,
    form: Option<&ExerciseForm>,
    notice: Option<&'static str>,
    error: Option<String>,
) -> Result<Response> {
    let (exercises, error) = match state.backend.list_exercises().await {
        Ok(exercises) => (exercises, error),
        Err(e) => {
            tracing::warn!("Loading exercises failed: {}", e);
            (Vec::new(), error.or(Some("Erro ao carregar exercícios.".to_string())))
        }
    };

    let template = ExercisesListTemplate {
        exercises,
        name: form.map(|f| f.name.clone()).unwrap_or_default(),
        muscle_group: form.map(|f| f.muscle_group.clone()).unwrap_or_default(),
        notice,
        error,
    };

    Ok(Html(template.render()?).into_response())
}

pub async fn list(
    State(state): State<ExercisesState>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let notice = match query.treino.as_deref() {
        Some("salvo") => Some("Treino salvo com sucesso!"),
        _ => None,
    };
    render_list(&state, None, notice, None).await
}

async fn read_upload(field: Field<'_>) -> Result<Option<Upload>> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    // Browsers send an empty part when no file was chosen.
    if file_name.is_empty() || data.is_empty() {
        return Ok(None);
    }

    Ok(Some(Upload {
        file_name,
        content_type,
        data: data.to_vec(),
    }))
}

async fn read_form(mut multipart: Multipart) -> Result<ExerciseForm> {
    let mut form = ExerciseForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => {
                form.name = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
            }
            "muscle_group" => {
                form.muscle_group = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
            }
            "image" => form.image = read_upload(field).await?,
            "video" => form.video = read_upload(field).await?,
            _ => {}
        }
    }

    Ok(form)
}

pub async fn create(State(state): State<ExercisesState>, multipart: Multipart) -> Result<Response> {
    let form = read_form(multipart).await?;
    let retained = ExerciseForm {
        name: form.name.clone(),
        muscle_group: form.muscle_group.clone(),
        image: None,
        video: None,
    };

    match exercises::create_exercise(state.backend.as_ref(), form).await {
        Ok(_) => Ok(Redirect::to("/exercicios").into_response()),
        Err(e) => {
            if !matches!(e, ExerciseError::MissingName) {
                tracing::warn!("Creating exercise failed: {:?}", e);
            }
            render_list(&state, Some(&retained), None, Some(e.to_string())).await
        }
    }
}

pub async fn delete_page(Path(id): Path<i64>) -> Result<Response> {
    ConfirmTemplate {
        title: "Excluir exercício",
        message: "Tem certeza que deseja excluir este exercício?".to_string(),
        action: format!("/exercicios/{}/excluir", id),
        cancel_url: "/exercicios".to_string(),
        hidden: Vec::new(),
    }
    .into_page()
}

pub async fn delete(State(state): State<ExercisesState>, Path(id): Path<i64>) -> Result<Response> {
    match exercises::delete_exercise(state.backend.as_ref(), id).await {
        Ok(()) => Ok(Redirect::to("/exercicios").into_response()),
        Err(e) => {
            tracing::warn!("Deleting exercise {} failed: {:?}", id, e);
            let message = "Erro ao excluir exercício.".to_string();
            render_list(&state, None, None, Some(message)).await
        }
    }
}
