use rusqlite::Row;
use serde::Serialize;

use super::FromSqliteRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

pub const WEEKDAYS: &[Weekday] = &[
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

impl Weekday {
    /// Value stored in the `dia` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "segunda",
            Weekday::Tuesday => "terca",
            Weekday::Wednesday => "quarta",
            Weekday::Thursday => "quinta",
            Weekday::Friday => "sexta",
            Weekday::Saturday => "sabado",
            Weekday::Sunday => "domingo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Segunda",
            Weekday::Tuesday => "Terça",
            Weekday::Wednesday => "Quarta",
            Weekday::Thursday => "Quinta",
            Weekday::Friday => "Sexta",
            Weekday::Saturday => "Sábado",
            Weekday::Sunday => "Domingo",
        }
    }

    /// Unknown or empty labels mean "no specific day".
    pub fn parse(s: &str) -> Option<Self> {
        WEEKDAYS.iter().copied().find(|day| day.as_str() == s.trim())
    }
}

fn weekday_label(weekday: Option<Weekday>) -> &'static str {
    weekday.map(|day| day.label()).unwrap_or("Não definido")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Routine {
    pub id: i64,
    pub name: String,
    pub weekday: Option<Weekday>,
    pub student_id: Option<String>,
}

impl Routine {
    pub fn weekday_label(&self) -> &'static str {
        weekday_label(self.weekday)
    }
}

impl FromSqliteRow for Routine {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let weekday: Option<String> = row.get("dia")?;
        Ok(Self {
            id: row.get("id")?,
            name: row.get("nome")?,
            weekday: weekday.as_deref().and_then(Weekday::parse),
            student_id: row.get("aluno_id")?,
        })
    }
}

/// A routine joined with its owner's display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineSummary {
    pub id: i64,
    pub name: String,
    pub weekday: Option<Weekday>,
    pub student_id: Option<String>,
    pub student_name: Option<String>,
}

impl RoutineSummary {
    pub fn from_routine(routine: Routine, student_name: Option<String>) -> Self {
        Self {
            id: routine.id,
            name: routine.name,
            weekday: routine.weekday,
            student_id: routine.student_id,
            student_name,
        }
    }

    pub fn weekday_label(&self) -> &'static str {
        weekday_label(self.weekday)
    }

    pub fn student_label(&self) -> &str {
        self.student_name
            .as_deref()
            .unwrap_or("Aluno não encontrado")
    }
}

impl FromSqliteRow for RoutineSummary {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let routine = Routine::from_row(row)?;
        let student_name: Option<String> = row.get("aluno_nome")?;
        Ok(Self::from_routine(routine, student_name))
    }
}

#[derive(Debug, Clone)]
pub struct NewRoutine {
    pub student_id: String,
    pub name: String,
    pub weekday: Option<Weekday>,
}

#[derive(Debug, Clone)]
pub struct RoutineChanges {
    pub name: String,
    pub weekday: Option<Weekday>,
}
