use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};

use super::ConfirmTemplate;
use crate::backend::SharedBackend;
use crate::error::Result;
use crate::models::RoutineSummary;
use crate::services::routines;

#[derive(Clone)]
pub struct RoutinesState {
    pub backend: SharedBackend,
}

#[derive(Template)]
#[template(path = "routines/list.html")]
struct RoutinesListTemplate {
    routines: Vec<RoutineSummary>,
    error: Option<String>,
}

async fn render_list(state: &RoutinesState, error: Option<String>) -> Result<Response> {
    let (routines, error) = match routines::list_routines(state.backend.as_ref()).await {
        Ok(routines) => (routines, error),
        Err(e) => {
            tracing::warn!("Loading routines failed: {}", e);
            (Vec::new(), error.or(Some("Erro ao carregar treinos.".to_string())))
        }
    };

    let template = RoutinesListTemplate { routines, error };
    Ok(Html(template.render()?).into_response())
}

pub async fn list(State(state): State<RoutinesState>) -> Result<Response> {
    render_list(&state, None).await
}

pub async fn delete_page(Path(id): Path<i64>) -> Result<Response> {
    ConfirmTemplate {
        title: "Excluir treino",
        message: "Excluir este treino e todos os seus exercícios?".to_string(),
        action: format!("/treinos/{}/excluir", id),
        cancel_url: "/treinos".to_string(),
        hidden: Vec::new(),
    }
    .into_page()
}

pub async fn delete(State(state): State<RoutinesState>, Path(id): Path<i64>) -> Result<Response> {
    match routines::delete_routine(state.backend.as_ref(), id).await {
        Ok(()) => Ok(Redirect::to("/treinos").into_response()),
        Err(e) => {
            tracing::warn!("Deleting routine {} failed: {}", id, e);
            render_list(&state, Some("Erro ao excluir treino.".to_string())).await
        }
    }
}
