use rusqlite::Row;

/// Builds a model from a row of the local backend's tables.
pub trait FromSqliteRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}
