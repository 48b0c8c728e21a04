use rusqlite::Row;
use serde::Serialize;

use super::FromSqliteRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub muscle_group: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

impl Exercise {
    pub fn muscle_group_label(&self) -> &str {
        match self.muscle_group.as_deref() {
            Some(group) if !group.is_empty() => group,
            _ => "Sem grupo muscular",
        }
    }
}

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("nome")?,
            muscle_group: row.get("musculo")?,
            image_url: row.get("imagem_url")?,
            video_url: row.get("video_url")?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewExercise {
    pub name: String,
    pub muscle_group: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}
