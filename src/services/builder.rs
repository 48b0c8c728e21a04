//! Routine builder: assemble a routine for one student and save it,
//! merging into an existing routine with the same (student, name) pair.
//!
//! The save is three independent requests (look up, create, insert items)
//! and is not transactional. A failure after the routine was created
//! leaves it in place with no items; two concurrent saves of the same
//! pair can both create a routine.

use thiserror::Error;

use crate::backend::{Backend, BackendError};
use crate::models::routine_item::{parse_count, parse_load, parse_rest_minutes};
use crate::models::{NewRoutine, NewRoutineItem, Weekday};

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("Selecione o aluno.")]
    MissingStudent,

    #[error("Digite o nome do treino.")]
    MissingName,

    #[error("Selecione exercícios.")]
    NoExercises,

    #[error("O construtor de treino não está aberto.")]
    NotEditing,

    #[error("Erro ao salvar treino.")]
    Backend(#[from] BackendError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderPhase {
    Closed,
    Editing,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Sets,
    Reps,
    Rest,
    Load,
}

impl ItemField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sets" => Some(ItemField::Sets),
            "reps" => Some(ItemField::Reps),
            "rest" => Some(ItemField::Rest),
            "load" => Some(ItemField::Load),
            _ => None,
        }
    }
}

/// A selected exercise with its prescription as typed (not yet parsed).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftItem {
    pub exercise_id: i64,
    pub exercise_name: String,
    pub sets: String,
    pub reps: String,
    /// Minutes.
    pub rest: String,
    pub load: String,
}

impl DraftItem {
    fn to_new_item(&self, routine_id: i64, order: i32) -> NewRoutineItem {
        NewRoutineItem {
            routine_id,
            exercise_id: self.exercise_id,
            sets: parse_count(&self.sets),
            reps: parse_count(&self.reps),
            rest_seconds: parse_rest_minutes(&self.rest),
            load: parse_load(&self.load),
            order: Some(order),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutineDraft {
    pub student_id: String,
    pub name: String,
    pub weekday: Option<Weekday>,
    /// In selection order.
    pub items: Vec<DraftItem>,
}

impl RoutineDraft {
    pub fn validate(&self) -> Result<(), BuilderError> {
        if self.student_id.is_empty() {
            return Err(BuilderError::MissingStudent);
        }
        if self.name.trim().is_empty() {
            return Err(BuilderError::MissingName);
        }
        if self.items.is_empty() {
            return Err(BuilderError::NoExercises);
        }
        Ok(())
    }

    pub fn is_selected(&self, exercise_id: i64) -> bool {
        self.items.iter().any(|i| i.exercise_id == exercise_id)
    }

    /// Line items for `routine_id`, ordered 1..N by selection position.
    pub fn line_items(&self, routine_id: i64) -> Vec<NewRoutineItem> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| item.to_new_item(routine_id, index as i32 + 1))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub routine_id: i64,
    /// False when an existing routine was extended.
    pub created: bool,
    pub items: usize,
}

/// Persist a validated draft. Items are numbered from 1 regardless of
/// items already present in a reused routine.
pub async fn save_routine(
    backend: &dyn Backend,
    draft: &RoutineDraft,
) -> Result<SaveOutcome, BackendError> {
    let existing = backend
        .find_routine_by_owner_and_name(&draft.student_id, &draft.name)
        .await?;

    let (routine_id, created) = match existing {
        Some(routine) => (routine.id, false),
        None => {
            let routine = backend
                .create_routine(&NewRoutine {
                    student_id: draft.student_id.clone(),
                    name: draft.name.clone(),
                    weekday: draft.weekday,
                })
                .await?;
            tracing::info!(routine_id = routine.id, "Created routine {:?}", routine.name);
            (routine.id, true)
        }
    };

    let items = draft.line_items(routine_id);
    backend.insert_routine_items(&items).await?;

    Ok(SaveOutcome {
        routine_id,
        created,
        items: items.len(),
    })
}

#[derive(Debug, Clone)]
pub struct RoutineBuilder {
    phase: BuilderPhase,
    draft: RoutineDraft,
}

impl Default for RoutineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutineBuilder {
    pub fn new() -> Self {
        Self {
            phase: BuilderPhase::Closed,
            draft: RoutineDraft::default(),
        }
    }

    pub fn phase(&self) -> BuilderPhase {
        self.phase
    }

    pub fn draft(&self) -> &RoutineDraft {
        &self.draft
    }

    /// Open with an empty draft.
    pub fn open(&mut self) {
        self.draft = RoutineDraft::default();
        self.phase = BuilderPhase::Editing;
    }

    /// Returns false while a save is in flight.
    pub fn close(&mut self) -> bool {
        if self.phase == BuilderPhase::Saving {
            return false;
        }
        self.phase = BuilderPhase::Closed;
        true
    }

    fn is_editing(&self) -> bool {
        self.phase == BuilderPhase::Editing
    }

    pub fn select_student(&mut self, student_id: &str) {
        if self.is_editing() {
            self.draft.student_id = student_id.trim().to_string();
        }
    }

    pub fn set_name(&mut self, name: &str) {
        if self.is_editing() {
            self.draft.name = name.to_string();
        }
    }

    pub fn set_weekday(&mut self, weekday: Option<Weekday>) {
        if self.is_editing() {
            self.draft.weekday = weekday;
        }
    }

    /// Add the exercise to the pending selection, or drop it if already there.
    pub fn toggle_exercise(&mut self, exercise_id: i64, exercise_name: &str) {
        if !self.is_editing() {
            return;
        }
        if self.draft.is_selected(exercise_id) {
            self.draft.items.retain(|i| i.exercise_id != exercise_id);
        } else {
            self.draft.items.push(DraftItem {
                exercise_id,
                exercise_name: exercise_name.to_string(),
                ..Default::default()
            });
        }
    }

    pub fn set_field(&mut self, exercise_id: i64, field: ItemField, value: &str) {
        if !self.is_editing() {
            return;
        }
        if let Some(item) = self
            .draft
            .items
            .iter_mut()
            .find(|i| i.exercise_id == exercise_id)
        {
            let target = match field {
                ItemField::Sets => &mut item.sets,
                ItemField::Reps => &mut item.reps,
                ItemField::Rest => &mut item.rest,
                ItemField::Load => &mut item.load,
            };
            *target = value.to_string();
        }
    }

    /// Validate, persist, and close on success. On failure the builder
    /// goes back to editing with the draft intact.
    pub async fn save(&mut self, backend: &dyn Backend) -> Result<SaveOutcome, BuilderError> {
        if !self.is_editing() {
            return Err(BuilderError::NotEditing);
        }
        self.draft.validate()?;

        self.phase = BuilderPhase::Saving;
        match save_routine(backend, &self.draft).await {
            Ok(outcome) => {
                self.draft = RoutineDraft::default();
                self.phase = BuilderPhase::Closed;
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!("Saving routine failed: {}", e);
                self.phase = BuilderPhase::Editing;
                Err(e.into())
            }
        }
    }
}
