use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::backend::SharedBackend;
use crate::handlers::{
    builder, dashboard, editor, exercises, health, routines, storage, students,
};

/// Exercise media travel in the catalog form.
const UPLOAD_LIMIT: usize = 50 * 1024 * 1024;

pub fn create_router(backend: SharedBackend) -> Router {
    let dashboard_state = dashboard::DashboardState {
        backend: backend.clone(),
    };
    let students_state = students::StudentsState {
        backend: backend.clone(),
    };
    let exercises_state = exercises::ExercisesState {
        backend: backend.clone(),
    };
    let builder_state = builder::BuilderState {
        backend: backend.clone(),
    };
    let routines_state = routines::RoutinesState {
        backend: backend.clone(),
    };
    let editor_state = editor::EditorState {
        backend: backend.clone(),
    };
    let storage_state = storage::StorageState { backend };

    Router::new()
        // Dashboard
        .route("/", get(dashboard::index))
        .with_state(dashboard_state)
        // Student roster
        .route("/alunos", get(students::list).post(students::create))
        .route(
            "/alunos/{id}/excluir",
            get(students::delete_page).post(students::delete),
        )
        .with_state(students_state)
        // Exercise catalog
        .route(
            "/exercicios",
            get(exercises::list)
                .post(exercises::create)
                .layer(DefaultBodyLimit::max(UPLOAD_LIMIT)),
        )
        .route(
            "/exercicios/{id}/excluir",
            get(exercises::delete_page).post(exercises::delete),
        )
        .with_state(exercises_state)
        // Routine builder
        .route(
            "/exercicios/treino",
            get(builder::open).post(builder::submit),
        )
        .with_state(builder_state)
        // Routine list
        .route("/treinos", get(routines::list))
        .route(
            "/treinos/{id}/excluir",
            get(routines::delete_page).post(routines::delete),
        )
        .with_state(routines_state)
        // Routine editor
        .route(
            "/treinos-editar/{id}",
            get(editor::show).post(editor::rename),
        )
        .route("/treinos-editar/{id}/exercicios", post(editor::add_exercise))
        .route(
            "/treinos-editar/{id}/itens/{item_id}/remover",
            get(editor::remove_page).post(editor::remove_item),
        )
        .with_state(editor_state)
        // Media
        .route("/storage/{*path}", get(storage::fetch))
        .with_state(storage_state)
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
}
