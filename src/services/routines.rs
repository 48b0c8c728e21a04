use crate::backend::{Backend, Result};
use crate::models::{RoutineChanges, RoutineSummary};

pub async fn list_routines(backend: &dyn Backend) -> Result<Vec<RoutineSummary>> {
    backend.list_routines_with_students().await
}

/// Items are removed before the routine itself, atomically where the
/// backend supports it.
pub async fn delete_routine(backend: &dyn Backend, routine_id: i64) -> Result<()> {
    backend.delete_routine_cascade(routine_id).await?;
    tracing::info!(routine_id, "Deleted routine");
    Ok(())
}

/// Returns false without touching the backend when the new name is blank.
pub async fn rename_routine(
    backend: &dyn Backend,
    routine_id: i64,
    changes: &RoutineChanges,
) -> Result<bool> {
    if changes.name.trim().is_empty() {
        return Ok(false);
    }
    backend.update_routine(routine_id, changes).await?;
    tracing::info!(routine_id, "Updated routine");
    Ok(true)
}
