use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};

use crate::backend::{SharedBackend, StudentOrder};
use crate::error::Result;
use crate::models::RoutineSummary;

const RECENT_ROUTINES: usize = 5;

#[derive(Clone)]
pub struct DashboardState {
    pub backend: SharedBackend,
}

#[derive(Template)]
#[template(path = "dashboard/index.html")]
struct DashboardTemplate {
    student_count: usize,
    exercise_count: usize,
    routine_count: usize,
    recent_routines: Vec<RoutineSummary>,
}

pub async fn index(State(state): State<DashboardState>) -> Result<Response> {
    let students = state.backend.list_students(StudentOrder::Newest).await?;
    let exercises = state.backend.list_exercises().await?;
    let routines = state.backend.list_routines_with_students().await?;

    let template = DashboardTemplate {
        student_count: students.len(),
        exercise_count: exercises.len(),
        routine_count: routines.len(),
        recent_routines: routines.into_iter().take(RECENT_ROUTINES).collect(),
    };

    Ok(Html(template.render()?).into_response())
}
