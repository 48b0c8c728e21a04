use thiserror::Error;

use crate::backend::{Backend, BackendError};
use crate::models::{NewRoutineItem, RoutineItem, Weekday};

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Treino não encontrado.")]
    NotFound,

    #[error("Este exercício já está neste treino.")]
    AlreadyPresent,

    #[error("Exercício não encontrado neste treino.")]
    ItemNotFound,

    #[error("{action}")]
    Backend {
        action: &'static str,
        #[source]
        source: BackendError,
    },
}

fn failed(action: &'static str) -> impl FnOnce(BackendError) -> EditorError {
    move |source| EditorError::Backend { action, source }
}

/// In-memory view of one routine: its name and joined items.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineEditor {
    pub routine_id: i64,
    pub name: String,
    pub weekday: Option<Weekday>,
    pub items: Vec<RoutineItem>,
}

impl RoutineEditor {
    pub async fn load(backend: &dyn Backend, routine_id: i64) -> Result<Self, EditorError> {
        let mut editor = Self {
            routine_id,
            name: String::new(),
            weekday: None,
            items: Vec::new(),
        };
        editor.reload(backend).await?;
        Ok(editor)
    }

    pub fn contains_exercise(&self, exercise_id: i64) -> bool {
        self.items.iter().any(|i| i.exercise_id == exercise_id)
    }

    /// Re-fetch the name and the full item list from scratch.
    pub async fn reload(&mut self, backend: &dyn Backend) -> Result<(), EditorError> {
        let routine = backend
            .find_routine(self.routine_id)
            .await
            .map_err(failed("Erro ao carregar treino."))?
            .ok_or(EditorError::NotFound)?;
        let items = backend
            .list_routine_items(self.routine_id)
            .await
            .map_err(failed("Erro ao carregar exercícios."))?;

        self.name = routine.name;
        self.weekday = routine.weekday;
        self.items = items;
        Ok(())
    }

    /// Rejected without any request when the exercise is already listed.
    pub async fn add_exercise(
        &mut self,
        backend: &dyn Backend,
        exercise_id: i64,
    ) -> Result<(), EditorError> {
        if self.contains_exercise(exercise_id) {
            return Err(EditorError::AlreadyPresent);
        }

        backend
            .insert_routine_items(&[NewRoutineItem::bare(self.routine_id, exercise_id)])
            .await
            .map_err(failed("Erro ao adicionar exercício."))?;
        tracing::info!(
            routine_id = self.routine_id,
            exercise_id,
            "Added exercise to routine"
        );

        self.reload(backend).await
    }

    /// Only items of this routine can be removed.
    pub async fn remove_item(
        &mut self,
        backend: &dyn Backend,
        item_id: i64,
    ) -> Result<(), EditorError> {
        if !self.items.iter().any(|i| i.id == item_id) {
            return Err(EditorError::ItemNotFound);
        }

        backend
            .delete_routine_item(item_id)
            .await
            .map_err(failed("Erro ao remover exercício."))?;
        tracing::info!(routine_id = self.routine_id, item_id, "Removed routine item");

        self.reload(backend).await
    }
}
