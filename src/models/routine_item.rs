use rusqlite::Row;
use serde::Serialize;

use super::FromSqliteRow;

/// Parse a set/rep count typed into a free-text field.
/// Empty, non-numeric and zero entries are absent.
pub fn parse_count(text: &str) -> Option<i32> {
    text.trim().parse::<i32>().ok().filter(|n| *n != 0)
}

/// Parse a load typed into a free-text field.
/// Empty, non-numeric and zero entries are absent.
pub fn parse_load(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n != 0.0)
}

/// Rest is entered in minutes and stored in seconds.
/// `0` stays `0`; empty, non-numeric and out-of-range entries are absent.
pub fn parse_rest_minutes(text: &str) -> Option<i32> {
    let seconds = (text.trim().parse::<f64>().ok()? * 60.0).round();
    (f64::from(i32::MIN)..=f64::from(i32::MAX))
        .contains(&seconds)
        .then_some(seconds as i32)
}

/// A line item joined with its exercise's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineItem {
    pub id: i64,
    pub routine_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub rest_seconds: Option<i32>,
    pub load: Option<f64>,
    pub order: Option<i32>,
}

impl RoutineItem {
    pub fn prescription(&self) -> String {
        let mut parts = Vec::new();
        if let Some(sets) = self.sets {
            parts.push(format!("{} séries", sets));
        }
        if let Some(reps) = self.reps {
            parts.push(format!("{} reps", reps));
        }
        if let Some(rest) = self.rest_seconds {
            if rest % 60 == 0 {
                parts.push(format!("{} min descanso", rest / 60));
            } else {
                parts.push(format!("{} s descanso", rest));
            }
        }
        if let Some(load) = self.load {
            parts.push(format!("{} kg", load));
        }

        if parts.is_empty() {
            "Exercício do treino".to_string()
        } else {
            parts.join(" · ")
        }
    }
}

impl FromSqliteRow for RoutineItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let exercise_name: Option<String> = row.get("exercicio_nome")?;
        Ok(Self {
            id: row.get("id")?,
            routine_id: row.get("treino_id")?,
            exercise_id: row.get("exercicio_id")?,
            exercise_name: exercise_name.unwrap_or_default(),
            sets: row.get("series")?,
            reps: row.get("repeticoes")?,
            rest_seconds: row.get("descanso")?,
            load: row.get("carga")?,
            order: row.get("ordem")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRoutineItem {
    pub routine_id: i64,
    pub exercise_id: i64,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub rest_seconds: Option<i32>,
    pub load: Option<f64>,
    pub order: Option<i32>,
}

impl NewRoutineItem {
    /// Item added from the editor: no prescription and no order.
    pub fn bare(routine_id: i64, exercise_id: i64) -> Self {
        Self {
            routine_id,
            exercise_id,
            sets: None,
            reps: None,
            rest_seconds: None,
            load: None,
            order: None,
        }
    }
}
