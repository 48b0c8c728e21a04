//! The record and storage API the console runs against.
//!
//! Every screen talks to the backend through [`Backend`]; the concrete
//! implementation is chosen at startup and injected into handler state.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Exercise, NewExercise, NewRoutine, NewRoutineItem, NewStudent, Routine, RoutineChanges,
    RoutineItem, RoutineSummary, User,
};

pub mod rest;
pub mod sqlite;

pub use rest::RestBackend;
pub use sqlite::SqliteBackend;

/// Table names shared by both backends.
pub mod tables {
    pub const USERS: &str = "usuarios";
    pub const EXERCISES: &str = "exercicios";
    pub const ROUTINES: &str = "treinos";
    pub const ROUTINE_ITEMS: &str = "treinos_exercicios";
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("malformed row: {0}")]
    Decode(String),

    #[error("expected at most one row from {table}")]
    MultipleRows { table: &'static str },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("task error: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;

pub type SharedBackend = Arc<dyn Backend>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentOrder {
    /// Most recently created first (roster).
    Newest,
    /// Alphabetical (selection lists).
    Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Vec<u8>,
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_students(&self, order: StudentOrder) -> Result<Vec<User>>;
    async fn create_student(&self, student: &NewStudent) -> Result<User>;
    async fn delete_user(&self, id: &str) -> Result<()>;
    /// Remove an authentication record through the backend's remote procedure.
    async fn delete_auth_user(&self, auth_id: &str) -> Result<()>;

    async fn list_exercises(&self) -> Result<Vec<Exercise>>;
    async fn create_exercise(&self, exercise: &NewExercise) -> Result<Exercise>;
    async fn delete_exercise(&self, id: i64) -> Result<()>;

    async fn find_routine(&self, id: i64) -> Result<Option<Routine>>;
    /// At most one match is expected; several is an error.
    async fn find_routine_by_owner_and_name(
        &self,
        student_id: &str,
        name: &str,
    ) -> Result<Option<Routine>>;
    async fn create_routine(&self, routine: &NewRoutine) -> Result<Routine>;
    async fn update_routine(&self, id: i64, changes: &RoutineChanges) -> Result<()>;
    /// Newest first.
    async fn list_routines(&self) -> Result<Vec<Routine>>;
    async fn delete_routine(&self, id: i64) -> Result<()>;

    async fn list_routines_with_students(&self) -> Result<Vec<RoutineSummary>> {
        let routines = self.list_routines().await?;
        let students = self.list_students(StudentOrder::Name).await?;
        Ok(join_students(routines, &students))
    }

    async fn list_routine_items(&self, routine_id: i64) -> Result<Vec<RoutineItem>>;
    /// Inserts every item in one request.
    async fn insert_routine_items(&self, items: &[NewRoutineItem]) -> Result<()>;
    async fn delete_routine_item(&self, id: i64) -> Result<()>;
    async fn delete_routine_items(&self, routine_id: i64) -> Result<()>;

    /// Items first, then the routine. Not atomic unless overridden.
    async fn delete_routine_cascade(&self, id: i64) -> Result<()> {
        self.delete_routine_items(id).await?;
        self.delete_routine(id).await
    }

    /// Fails if `path` already exists.
    async fn upload_object(&self, path: &str, content_type: &str, data: Vec<u8>) -> Result<()>;
    fn public_url(&self, path: &str) -> String;

    async fn fetch_object(&self, _path: &str) -> Result<Option<StoredObject>> {
        Ok(None)
    }
}

/// Client-side join of routines with their owners' names.
pub fn join_students(routines: Vec<Routine>, students: &[User]) -> Vec<RoutineSummary> {
    let names: HashMap<&str, &str> = students
        .iter()
        .map(|s| (s.id.as_str(), s.name.as_str()))
        .collect();

    routines
        .into_iter()
        .map(|routine| {
            let student_name = routine
                .student_id
                .as_deref()
                .and_then(|id| names.get(id))
                .map(|name| name.to_string());
            RoutineSummary::from_routine(routine, student_name)
        })
        .collect()
}
