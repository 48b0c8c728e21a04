//! Embedded migrations for the local SQLite backend.
//!
//! The schema mirrors the hosted backend's tables so both backends speak
//! the same column names.

use crate::db::DbPool;

/// All migrations in order, each as (filename, sql_content)
pub const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_create_usuarios.sql",
        include_str!("../migrations/001_create_usuarios.sql"),
    ),
    (
        "002_create_exercicios.sql",
        include_str!("../migrations/002_create_exercicios.sql"),
    ),
    (
        "003_create_treinos.sql",
        include_str!("../migrations/003_create_treinos.sql"),
    ),
    (
        "004_create_treinos_exercicios.sql",
        include_str!("../migrations/004_create_treinos_exercicios.sql"),
    ),
    (
        "005_create_storage_objects.sql",
        include_str!("../migrations/005_create_storage_objects.sql"),
    ),
];

/// Run all pending migrations, recording applied ones in `_migrations`.
pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    tracing::info!("Running migrations...");

    let conn = pool.get()?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    for (filename, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?",
                [filename],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if already_applied {
            tracing::debug!("Skipping already applied migration: {}", filename);
            continue;
        }

        tracing::info!("Running migration: {}", filename);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO _migrations (name) VALUES (?)", [filename])?;
    }

    tracing::info!("Migrations completed");
    Ok(())
}
