use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::{ConfirmTemplate, HiddenField};
use crate::backend::{SharedBackend, StudentOrder};
use crate::error::Result;
use crate::models::{CreateStudent, User};
use crate::services::students::{self, StudentError};

#[derive(Clone)]
pub struct StudentsState {
    pub backend: SharedBackend,
}

#[derive(Template)]
#[template(path = "students/list.html")]
struct StudentsListTemplate {
    students: Vec<User>,
    name: String,
    email: String,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteStudentForm {
    #[serde(default)]
    pub auth_id: String,
}

async fn render_list(
    state: &StudentsState,
    form: Option<&CreateStudent>,
    error: Option<String>,
) -> Result<Response> {
    let (students, error) = match state.backend.list_students(StudentOrder::Newest).await {
        Ok(students) => (students, error),
        Err(e) => {
            tracing::warn!("Loading students failed: {}", e);
            (Vec::new(), error.or(Some("Erro ao carregar alunos.".to_string())))
        }
    };

    let template = StudentsListTemplate {
        students,
        name: form.map(|f| f.name.clone()).unwrap_or_default(),
        email: form.map(|f| f.email.clone()).unwrap_or_default(),
        error,
    };

    Ok(Html(template.render()?).into_response())
}

pub async fn list(State(state): State<StudentsState>) -> Result<Response> {
    render_list(&state, None, None).await
}

pub async fn create(
    State(state): State<StudentsState>,
    Form(form): Form<CreateStudent>,
) -> Result<Response> {
    match students::create_student(state.backend.as_ref(), &form).await {
        Ok(_) => Ok(Redirect::to("/alunos").into_response()),
        Err(e) => {
            if !matches!(e, StudentError::MissingFields) {
                tracing::warn!("Creating student failed: {:?}", e);
            }
            render_list(&state, Some(&form), Some(e.to_string())).await
        }
    }
}

pub async fn delete_page(
    Path(id): Path<String>,
    Query(query): Query<DeleteStudentForm>,
) -> Result<Response> {
    ConfirmTemplate {
        title: "Excluir aluno",
        message: "Tem certeza que deseja excluir este aluno?".to_string(),
        action: format!("/alunos/{}/excluir", id),
        cancel_url: "/alunos".to_string(),
        hidden: vec![HiddenField {
            name: "auth_id",
            value: query.auth_id,
        }],
    }
    .into_page()
}

pub async fn delete(
    State(state): State<StudentsState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteStudentForm>,
) -> Result<Response> {
    let auth_id = Some(form.auth_id.as_str()).filter(|s| !s.is_empty());

    match students::delete_student(state.backend.as_ref(), &id, auth_id).await {
        Ok(()) => Ok(Redirect::to("/alunos").into_response()),
        Err(e) => {
            tracing::warn!("Deleting student {} failed: {:?}", id, e);
            render_list(&state, None, Some("Erro ao excluir aluno.".to_string())).await
        }
    }
}
