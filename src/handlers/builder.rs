//! Routine builder screen. The draft lives in the form itself: every
//! submission carries the selection (in order) and the typed fields, and
//! the handler rebuilds the builder from them before applying the action.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};

use crate::backend::{SharedBackend, StudentOrder};
use crate::error::Result;
use crate::models::routine::WEEKDAYS;
use crate::models::{Exercise, User, Weekday};
use crate::services::builder::{DraftItem, ItemField, RoutineBuilder};

#[derive(Clone)]
pub struct BuilderState {
    pub backend: SharedBackend,
}

struct StudentOption {
    id: String,
    name: String,
    selected: bool,
}

struct WeekdayOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

struct ExerciseOption {
    id: i64,
    name: String,
    muscle_group: String,
    selected: bool,
}

#[derive(Template)]
#[template(path = "exercises/builder.html")]
struct BuilderTemplate {
    students: Vec<StudentOption>,
    weekdays: Vec<WeekdayOption>,
    exercises: Vec<ExerciseOption>,
    name: String,
    items: Vec<DraftItem>,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderAction {
    Save,
    Toggle(i64),
    Refresh,
}

impl BuilderAction {
    fn parse(s: &str) -> Self {
        match s.split_once(':') {
            Some(("toggle", id)) => id
                .parse()
                .map(BuilderAction::Toggle)
                .unwrap_or(BuilderAction::Refresh),
            _ if s == "save" => BuilderAction::Save,
            _ => BuilderAction::Refresh,
        }
    }
}

/// Rebuild an open builder from the submitted fields. Selected exercises
/// arrive as repeated `selected=<id>:<name>` pairs in selection order, and
/// their fields as `<field>_<id>`.
pub fn restore(fields: &[(String, String)]) -> (RoutineBuilder, BuilderAction) {
    let mut builder = RoutineBuilder::new();
    builder.open();
    let mut action = BuilderAction::Refresh;

    for (key, value) in fields {
        match key.as_str() {
            "student_id" => builder.select_student(value),
            "name" => builder.set_name(value),
            "weekday" => builder.set_weekday(Weekday::parse(value)),
            "selected" => {
                if let Some((id, name)) = value.split_once(':') {
                    if let Ok(id) = id.parse() {
                        builder.toggle_exercise(id, name);
                    }
                }
            }
            "action" => action = BuilderAction::parse(value),
            _ => {}
        }
    }

    for (key, value) in fields {
        let Some((field, id)) = key.split_once('_') else {
            continue;
        };
        if let (Some(field), Ok(id)) = (ItemField::parse(field), id.parse()) {
            builder.set_field(id, field, value);
        }
    }

    (builder, action)
}

async fn render(
    state: &BuilderState,
    builder: &RoutineBuilder,
    catalog: Option<Vec<Exercise>>,
    error: Option<String>,
) -> Result<Response> {
    let draft = builder.draft();
    let mut error = error;

    let students = match state.backend.list_students(StudentOrder::Name).await {
        Ok(students) => students,
        Err(e) => {
            tracing::warn!("Loading students failed: {}", e);
            error.get_or_insert_with(|| "Erro ao carregar alunos.".to_string());
            Vec::new()
        }
    };
    let catalog = match catalog {
        Some(catalog) => catalog,
        None => match state.backend.list_exercises().await {
            Ok(exercises) => exercises,
            Err(e) => {
                tracing::warn!("Loading exercises failed: {}", e);
                error.get_or_insert_with(|| "Erro ao carregar exercícios.".to_string());
                Vec::new()
            }
        },
    };

    let template = BuilderTemplate {
        students: students
            .into_iter()
            .map(|s: User| StudentOption {
                selected: s.id == draft.student_id,
                id: s.id,
                name: s.name,
            })
            .collect(),
        weekdays: WEEKDAYS
            .iter()
            .map(|day| WeekdayOption {
                value: day.as_str(),
                label: day.label(),
                selected: draft.weekday == Some(*day),
            })
            .collect(),
        exercises: catalog
            .into_iter()
            .map(|e| ExerciseOption {
                selected: draft.is_selected(e.id),
                muscle_group: e.muscle_group_label().to_string(),
                id: e.id,
                name: e.name,
            })
            .collect(),
        name: draft.name.clone(),
        items: draft.items.clone(),
        error,
    };

    Ok(Html(template.render()?).into_response())
}

pub async fn open(State(state): State<BuilderState>) -> Result<Response> {
    let mut builder = RoutineBuilder::new();
    builder.open();
    render(&state, &builder, None, None).await
}

pub async fn submit(
    State(state): State<BuilderState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let (mut builder, action) = restore(&fields);

    match action {
        BuilderAction::Save => match builder.save(state.backend.as_ref()).await {
            Ok(outcome) => {
                tracing::info!(
                    routine_id = outcome.routine_id,
                    created = outcome.created,
                    items = outcome.items,
                    "Saved routine"
                );
                Ok(Redirect::to("/exercicios?treino=salvo").into_response())
            }
            Err(e) => render(&state, &builder, None, Some(e.to_string())).await,
        },
        BuilderAction::Toggle(exercise_id) => {
            let catalog = match state.backend.list_exercises().await {
                Ok(catalog) => catalog,
                Err(e) => {
                    tracing::warn!("Loading exercises failed: {}", e);
                    let message = "Erro ao carregar exercícios.".to_string();
                    return render(&state, &builder, Some(Vec::new()), Some(message)).await;
                }
            };
            if let Some(exercise) = catalog.iter().find(|e| e.id == exercise_id) {
                builder.toggle_exercise(exercise.id, &exercise.name);
            }
            render(&state, &builder, Some(catalog), None).await
        }
        BuilderAction::Refresh => render(&state, &builder, None, None).await,
    }
}
