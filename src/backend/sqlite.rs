//! Self-contained backend on a local SQLite database.
//!
//! Media uploads are kept as blobs in `storage_objects` and served back
//! through the console's `/storage` route.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use super::{Backend, BackendError, Result, StoredObject, StudentOrder};
use crate::db::DbPool;
use crate::models::{
    Exercise, FromSqliteRow, NewExercise, NewRoutine, NewRoutineItem, NewStudent, Routine,
    RoutineChanges, RoutineItem, RoutineSummary, User, UserRole,
};

#[derive(Clone)]
pub struct SqliteBackend {
    pool: DbPool,
    public_url: String,
}

impl SqliteBackend {
    /// `public_url` prefixes the URLs handed out for stored objects.
    pub fn new(pool: DbPool, public_url: impl Into<String>) -> Self {
        Self {
            pool,
            public_url: public_url.into(),
        }
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| BackendError::Task(e.to_string()))?
    }
}

const ROUTINE_ITEM_SELECT: &str = "SELECT te.id, te.treino_id, te.exercicio_id, te.series, te.repeticoes,
        te.descanso, te.carga, te.ordem, e.nome AS exercicio_nome
     FROM treinos_exercicios te
     LEFT JOIN exercicios e ON e.id = te.exercicio_id";

#[async_trait]
impl Backend for SqliteBackend {
    async fn list_students(&self, order: StudentOrder) -> Result<Vec<User>> {
        let order_by = match order {
            StudentOrder::Newest => "criado_em DESC",
            StudentOrder::Name => "nome ASC",
        };
        self.run(move |conn| {
            let sql = format!("SELECT * FROM usuarios WHERE tipo = ? ORDER BY {}", order_by);
            let mut stmt = conn.prepare(&sql)?;
            let users = stmt
                .query_map([UserRole::Student.as_str()], User::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(users)
        })
        .await
    }

    async fn create_student(&self, student: &NewStudent) -> Result<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: student.name.clone(),
            email: student.email.clone(),
            role: UserRole::Student,
            auth_id: None,
            created_at: Some(Utc::now()),
        };
        let password_hash = student.password_hash.clone();
        let row = user.clone();

        self.run(move |conn| {
            conn.execute(
                "INSERT INTO usuarios (id, nome, email, senha, tipo, criado_em)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    row.id,
                    row.name,
                    row.email,
                    password_hash,
                    row.role.as_str(),
                    row.created_at
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(user)
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.run(move |conn| {
            conn.execute("DELETE FROM usuarios WHERE id = ?", [&id])?;
            Ok(())
        })
        .await
    }

    async fn delete_auth_user(&self, auth_id: &str) -> Result<()> {
        // No separate auth store locally; clear the link instead.
        let auth_id = auth_id.to_string();
        self.run(move |conn| {
            conn.execute(
                "UPDATE usuarios SET auth_id = NULL WHERE auth_id = ?",
                [&auth_id],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM exercicios ORDER BY nome")?;
            let exercises = stmt
                .query_map([], Exercise::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(exercises)
        })
        .await
    }

    async fn create_exercise(&self, exercise: &NewExercise) -> Result<Exercise> {
        let exercise = exercise.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO exercicios (nome, musculo, imagem_url, video_url) VALUES (?, ?, ?, ?)",
                rusqlite::params![
                    exercise.name,
                    exercise.muscle_group,
                    exercise.image_url,
                    exercise.video_url
                ],
            )?;
            Ok(Exercise {
                id: conn.last_insert_rowid(),
                name: exercise.name,
                muscle_group: exercise.muscle_group,
                image_url: exercise.image_url,
                video_url: exercise.video_url,
            })
        })
        .await
    }

    async fn delete_exercise(&self, id: i64) -> Result<()> {
        self.run(move |conn| {
            conn.execute("DELETE FROM exercicios WHERE id = ?", [id])?;
            Ok(())
        })
        .await
    }

    async fn find_routine(&self, id: i64) -> Result<Option<Routine>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare("SELECT * FROM treinos WHERE id = ?")?;
            let routine = stmt.query_row([id], Routine::from_row).optional()?;
            Ok(routine)
        })
        .await
    }

    async fn find_routine_by_owner_and_name(
        &self,
        student_id: &str,
        name: &str,
    ) -> Result<Option<Routine>> {
        let student_id = student_id.to_string();
        let name = name.to_string();
        let mut matches = self
            .run(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT * FROM treinos WHERE aluno_id = ? AND nome = ? LIMIT 2")?;
                let routines = stmt
                    .query_map([&student_id, &name], Routine::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(routines)
            })
            .await?;

        if matches.len() > 1 {
            return Err(BackendError::MultipleRows {
                table: super::tables::ROUTINES,
            });
        }
        Ok(matches.pop())
    }

    async fn create_routine(&self, routine: &NewRoutine) -> Result<Routine> {
        let routine = routine.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO treinos (nome, dia, aluno_id) VALUES (?, ?, ?)",
                rusqlite::params![
                    routine.name,
                    routine.weekday.map(|d| d.as_str()),
                    routine.student_id
                ],
            )?;
            Ok(Routine {
                id: conn.last_insert_rowid(),
                name: routine.name,
                weekday: routine.weekday,
                student_id: Some(routine.student_id),
            })
        })
        .await
    }

    async fn update_routine(&self, id: i64, changes: &RoutineChanges) -> Result<()> {
        let changes = changes.clone();
        self.run(move |conn| {
            conn.execute(
                "UPDATE treinos SET nome = ?, dia = ? WHERE id = ?",
                rusqlite::params![changes.name, changes.weekday.map(|d| d.as_str()), id],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_routines(&self) -> Result<Vec<Routine>> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM treinos ORDER BY id DESC")?;
            let routines = stmt
                .query_map([], Routine::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(routines)
        })
        .await
    }

    async fn delete_routine(&self, id: i64) -> Result<()> {
        self.run(move |conn| {
            conn.execute("DELETE FROM treinos WHERE id = ?", [id])?;
            Ok(())
        })
        .await
    }

    async fn list_routines_with_students(&self) -> Result<Vec<RoutineSummary>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.nome, t.dia, t.aluno_id, u.nome AS aluno_nome
                 FROM treinos t
                 LEFT JOIN usuarios u ON u.id = t.aluno_id
                 ORDER BY t.id DESC",
            )?;
            let routines = stmt
                .query_map([], RoutineSummary::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(routines)
        })
        .await
    }

    async fn list_routine_items(&self, routine_id: i64) -> Result<Vec<RoutineItem>> {
        self.run(move |conn| {
            let sql = format!("{} WHERE te.treino_id = ? ORDER BY te.id", ROUTINE_ITEM_SELECT);
            let mut stmt = conn.prepare(&sql)?;
            let items = stmt
                .query_map([routine_id], RoutineItem::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(items)
        })
        .await
    }

    async fn insert_routine_items(&self, items: &[NewRoutineItem]) -> Result<()> {
        let items = items.to_vec();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO treinos_exercicios
                        (treino_id, exercicio_id, series, repeticoes, descanso, carga, ordem)
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                )?;
                for item in &items {
                    stmt.execute(rusqlite::params![
                        item.routine_id,
                        item.exercise_id,
                        item.sets,
                        item.reps,
                        item.rest_seconds,
                        item.load,
                        item.order
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn delete_routine_item(&self, id: i64) -> Result<()> {
        self.run(move |conn| {
            conn.execute("DELETE FROM treinos_exercicios WHERE id = ?", [id])?;
            Ok(())
        })
        .await
    }

    async fn delete_routine_items(&self, routine_id: i64) -> Result<()> {
        self.run(move |conn| {
            conn.execute(
                "DELETE FROM treinos_exercicios WHERE treino_id = ?",
                [routine_id],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete_routine_cascade(&self, id: i64) -> Result<()> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM treinos_exercicios WHERE treino_id = ?", [id])?;
            tx.execute("DELETE FROM treinos WHERE id = ?", [id])?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn upload_object(&self, path: &str, content_type: &str, data: Vec<u8>) -> Result<()> {
        let path = path.to_string();
        let content_type = content_type.to_string();
        self.run(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO storage_objects (path, content_type, data, criado_em)
                 VALUES (?, ?, ?, ?)",
                rusqlite::params![path, content_type, data, Utc::now()],
            )?;
            if inserted == 0 {
                return Err(BackendError::Conflict(format!("object already exists: {}", path)));
            }
            Ok(())
        })
        .await
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/storage/{}", self.public_url, path)
    }

    async fn fetch_object(&self, path: &str) -> Result<Option<StoredObject>> {
        let path = path.to_string();
        self.run(move |conn| {
            let object = conn
                .query_row(
                    "SELECT content_type, data FROM storage_objects WHERE path = ?",
                    [&path],
                    |row| {
                        Ok(StoredObject {
                            content_type: row.get(0)?,
                            data: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(object)
        })
        .await
    }
}
