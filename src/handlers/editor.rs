//! Routine editor screen. Add and remove act on the routine as currently
//! stored and redirect back to it; failures render the page with an alert.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::ConfirmTemplate;
use crate::backend::SharedBackend;
use crate::error::Result;
use crate::models::routine::WEEKDAYS;
use crate::models::{Exercise, RoutineChanges, RoutineItem, Weekday};
use crate::services::editor::{EditorError, RoutineEditor};
use crate::services::routines;

#[derive(Clone)]
pub struct EditorState {
    pub backend: SharedBackend,
}

struct WeekdayOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "routines/edit.html")]
struct EditorTemplate {
    routine_id: i64,
    name: String,
    weekdays: Vec<WeekdayOption>,
    items: Vec<RoutineItem>,
    exercises: Vec<Exercise>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub weekday: String,
}

#[derive(Debug, Deserialize)]
pub struct AddExerciseForm {
    #[serde(default)]
    pub exercise_id: String,
}

fn editor_url(routine_id: i64) -> String {
    format!("/treinos-editar/{}", routine_id)
}

async fn render(
    state: &EditorState,
    editor: RoutineEditor,
    error: Option<String>,
) -> Result<Response> {
    let mut error = error;
    let exercises = match state.backend.list_exercises().await {
        Ok(exercises) => exercises,
        Err(e) => {
            tracing::warn!("Loading exercises failed: {}", e);
            error.get_or_insert_with(|| "Erro ao carregar exercícios.".to_string());
            Vec::new()
        }
    };

    let template = EditorTemplate {
        routine_id: editor.routine_id,
        weekdays: WEEKDAYS
            .iter()
            .map(|day| WeekdayOption {
                value: day.as_str(),
                label: day.label(),
                selected: editor.weekday == Some(*day),
            })
            .collect(),
        name: editor.name,
        items: editor.items,
        exercises,
        error,
    };

    Ok(Html(template.render()?).into_response())
}

/// Load fresh and show `error` on top; used after a failed action.
async fn render_error(state: &EditorState, routine_id: i64, error: String) -> Result<Response> {
    let editor = RoutineEditor::load(state.backend.as_ref(), routine_id).await?;
    render(state, editor, Some(error)).await
}

pub async fn show(State(state): State<EditorState>, Path(id): Path<i64>) -> Result<Response> {
    let editor = RoutineEditor::load(state.backend.as_ref(), id).await?;
    render(&state, editor, None).await
}

pub async fn rename(
    State(state): State<EditorState>,
    Path(id): Path<i64>,
    Form(form): Form<RenameForm>,
) -> Result<Response> {
    let changes = RoutineChanges {
        name: form.name.trim().to_string(),
        weekday: Weekday::parse(&form.weekday),
    };

    match routines::rename_routine(state.backend.as_ref(), id, &changes).await {
        Ok(true) => Ok(Redirect::to(&editor_url(id)).into_response()),
        Ok(false) => render_error(&state, id, "Digite o nome do treino.".to_string()).await,
        Err(e) => {
            tracing::warn!("Updating routine {} failed: {}", id, e);
            render_error(&state, id, "Erro ao atualizar treino.".to_string()).await
        }
    }
}

pub async fn add_exercise(
    State(state): State<EditorState>,
    Path(id): Path<i64>,
    Form(form): Form<AddExerciseForm>,
) -> Result<Response> {
    let mut editor = RoutineEditor::load(state.backend.as_ref(), id).await?;
    let Ok(exercise_id) = form.exercise_id.parse::<i64>() else {
        return render(&state, editor, Some("Selecione um exercício.".to_string())).await;
    };

    match editor.add_exercise(state.backend.as_ref(), exercise_id).await {
        Ok(()) => Ok(Redirect::to(&editor_url(id)).into_response()),
        Err(EditorError::AlreadyPresent) => {
            let message = EditorError::AlreadyPresent.to_string();
            render(&state, editor, Some(message)).await
        }
        Err(EditorError::Backend { action, source }) => {
            tracing::warn!("Adding exercise to routine {} failed: {}", id, source);
            render_error(&state, id, action.to_string()).await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn remove_page(Path((id, item_id)): Path<(i64, i64)>) -> Result<Response> {
    ConfirmTemplate {
        title: "Remover exercício",
        message: "Remover este exercício do treino?".to_string(),
        action: format!("/treinos-editar/{}/itens/{}/remover", id, item_id),
        cancel_url: editor_url(id),
        hidden: Vec::new(),
    }
    .into_page()
}

pub async fn remove_item(
    State(state): State<EditorState>,
    Path((id, item_id)): Path<(i64, i64)>,
) -> Result<Response> {
    let mut editor = RoutineEditor::load(state.backend.as_ref(), id).await?;
    match editor.remove_item(state.backend.as_ref(), item_id).await {
        Ok(()) => Ok(Redirect::to(&editor_url(id)).into_response()),
        Err(EditorError::Backend { action, source }) => {
            tracing::warn!("Removing item {} failed: {}", item_id, source);
            render_error(&state, id, action.to_string()).await
        }
        Err(e) => Err(e.into()),
    }
}
