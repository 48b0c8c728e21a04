//! Hosted backend client: PostgREST tables plus object storage.
//!
//! Rows are decoded into wire structs first and converted into models,
//! so a malformed row is rejected here instead of reaching a template.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{tables, Backend, BackendError, Result, StudentOrder};
use crate::models::{
    Exercise, NewExercise, NewRoutine, NewRoutineItem, NewStudent, Routine, RoutineChanges,
    RoutineItem, RoutineSummary, User, UserRole, Weekday,
};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const AUTH_DELETE_RPC: &str = "delete_user";
/// PostgREST code for "no relationship found" between embedded tables.
const MISSING_RELATIONSHIP: &str = "PGRST200";

// =============================================================================
// CLIENT
// =============================================================================

pub struct RestBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl RestBackend {
    pub fn new(
        base_url: &str,
        api_key: &str,
        bucket: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(parse_api_error(status, &body))
    }

    async fn select<R>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<R>>
    where
        R: DeserializeOwned,
    {
        let request = self
            .request(Method::GET, &self.table_url(table))
            .query(query);
        let body = self.send(request).await?.text().await?;
        decode_rows(&body)
    }

    async fn insert_returning<B, R>(&self, table: &'static str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body);
        let text = self.send(request).await?.text().await?;
        let mut rows: Vec<R> = decode_rows(&text)?;
        if rows.len() > 1 {
            return Err(BackendError::MultipleRows { table });
        }
        rows.pop()
            .ok_or_else(|| BackendError::Decode(format!("insert into {} returned no row", table)))
    }

    async fn delete_where(&self, table: &str, column: &str, value: String) -> Result<()> {
        let request = self
            .request(Method::DELETE, &self.table_url(table))
            .query(&[(column, eq(value))]);
        self.send(request).await?;
        Ok(())
    }

    async fn routine_rows(&self, query: &[(&str, String)]) -> Result<Vec<Routine>> {
        let rows: Vec<RoutineRow> = self.select(tables::ROUTINES, query).await?;
        rows.into_iter().map(Routine::try_from).collect()
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

// =============================================================================
// BACKEND
// =============================================================================

#[async_trait]
impl Backend for RestBackend {
    async fn list_students(&self, order: StudentOrder) -> Result<Vec<User>> {
        let order = match order {
            StudentOrder::Newest => "criado_em.desc",
            StudentOrder::Name => "nome.asc",
        };
        let rows: Vec<UserRow> = self
            .select(
                tables::USERS,
                &[
                    ("select", "*".to_string()),
                    ("tipo", eq(UserRole::Student.as_str())),
                    ("order", order.to_string()),
                ],
            )
            .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn create_student(&self, student: &NewStudent) -> Result<User> {
        let body = [InsertUser {
            nome: &student.name,
            email: &student.email,
            senha: &student.password_hash,
            tipo: UserRole::Student.as_str(),
        }];
        let row: UserRow = self.insert_returning(tables::USERS, &body[..]).await?;
        User::try_from(row)
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        self.delete_where(tables::USERS, "id", id.to_string()).await
    }

    async fn delete_auth_user(&self, auth_id: &str) -> Result<()> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, AUTH_DELETE_RPC);
        let request = self
            .request(Method::POST, &url)
            .json(&serde_json::json!({ "uid": auth_id }));
        self.send(request).await?;
        Ok(())
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>> {
        let rows: Vec<ExerciseRow> = self
            .select(
                tables::EXERCISES,
                &[("select", "*".to_string()), ("order", "nome.asc".to_string())],
            )
            .await?;
        rows.into_iter().map(Exercise::try_from).collect()
    }

    async fn create_exercise(&self, exercise: &NewExercise) -> Result<Exercise> {
        let body = [InsertExercise {
            nome: &exercise.name,
            musculo: exercise.muscle_group.as_deref(),
            imagem_url: exercise.image_url.as_deref(),
            video_url: exercise.video_url.as_deref(),
        }];
        let row: ExerciseRow = self.insert_returning(tables::EXERCISES, &body[..]).await?;
        Exercise::try_from(row)
    }

    async fn delete_exercise(&self, id: i64) -> Result<()> {
        self.delete_where(tables::EXERCISES, "id", id.to_string()).await
    }

    async fn find_routine(&self, id: i64) -> Result<Option<Routine>> {
        let mut routines = self
            .routine_rows(&[("select", "*".to_string()), ("id", eq(id))])
            .await?;
        Ok(routines.pop())
    }

    async fn find_routine_by_owner_and_name(
        &self,
        student_id: &str,
        name: &str,
    ) -> Result<Option<Routine>> {
        let mut routines = self
            .routine_rows(&[
                ("select", "*".to_string()),
                ("aluno_id", eq(student_id)),
                ("nome", eq(name)),
            ])
            .await?;
        if routines.len() > 1 {
            return Err(BackendError::MultipleRows {
                table: tables::ROUTINES,
            });
        }
        Ok(routines.pop())
    }

    async fn create_routine(&self, routine: &NewRoutine) -> Result<Routine> {
        let body = [InsertRoutine {
            aluno_id: &routine.student_id,
            nome: &routine.name,
            dia: routine.weekday.map(|d| d.as_str()),
        }];
        let row: RoutineRow = self.insert_returning(tables::ROUTINES, &body[..]).await?;
        Routine::try_from(row)
    }

    async fn update_routine(&self, id: i64, changes: &RoutineChanges) -> Result<()> {
        let request = self
            .request(Method::PATCH, &self.table_url(tables::ROUTINES))
            .query(&[("id", eq(id))])
            .json(&UpdateRoutine {
                nome: &changes.name,
                dia: changes.weekday.map(|d| d.as_str()),
            });
        self.send(request).await?;
        Ok(())
    }

    async fn list_routines(&self) -> Result<Vec<Routine>> {
        self.routine_rows(&[("select", "*".to_string()), ("order", "id.desc".to_string())])
            .await
    }

    async fn delete_routine(&self, id: i64) -> Result<()> {
        self.delete_where(tables::ROUTINES, "id", id.to_string()).await
    }

    async fn list_routines_with_students(&self) -> Result<Vec<RoutineSummary>> {
        let embedded = self
            .select::<RoutineWithStudentRow>(
                tables::ROUTINES,
                &[
                    ("select", "id,nome,dia,aluno_id,usuarios:aluno_id(nome)".to_string()),
                    ("order", "id.desc".to_string()),
                ],
            )
            .await;

        match embedded {
            Ok(rows) => rows.into_iter().map(RoutineSummary::try_from).collect(),
            Err(BackendError::Api { code: Some(code), .. }) if code == MISSING_RELATIONSHIP => {
                tracing::warn!("Relational routine query unavailable, joining client-side");
                let routines = self.list_routines().await?;
                let students = self.list_students(StudentOrder::Name).await?;
                Ok(super::join_students(routines, &students))
            }
            Err(e) => Err(e),
        }
    }

    async fn list_routine_items(&self, routine_id: i64) -> Result<Vec<RoutineItem>> {
        let rows: Vec<RoutineItemRow> = self
            .select(
                tables::ROUTINE_ITEMS,
                &[
                    (
                        "select",
                        "id,treino_id,exercicio_id,series,repeticoes,descanso,carga,ordem,exercicios(nome)"
                            .to_string(),
                    ),
                    ("treino_id", eq(routine_id)),
                    ("order", "id.asc".to_string()),
                ],
            )
            .await?;
        rows.into_iter().map(RoutineItem::try_from).collect()
    }

    async fn insert_routine_items(&self, items: &[NewRoutineItem]) -> Result<()> {
        let body: Vec<InsertRoutineItem> = items.iter().map(InsertRoutineItem::from).collect();
        let request = self
            .request(Method::POST, &self.table_url(tables::ROUTINE_ITEMS))
            .header("Prefer", "return=minimal")
            .json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_routine_item(&self, id: i64) -> Result<()> {
        self.delete_where(tables::ROUTINE_ITEMS, "id", id.to_string())
            .await
    }

    async fn delete_routine_items(&self, routine_id: i64) -> Result<()> {
        self.delete_where(tables::ROUTINE_ITEMS, "treino_id", routine_id.to_string())
            .await
    }

    async fn upload_object(&self, path: &str, content_type: &str, data: Vec<u8>) -> Result<()> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, path
        );
        let request = self
            .request(Method::POST, &url)
            .header("Content-Type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(data);
        self.send(request).await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

fn parse_api_error(status: u16, body: &str) -> BackendError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => BackendError::Api {
            status,
            code: err.code,
            message: err.message.or(err.error).unwrap_or_else(|| body.to_string()),
        },
        Err(_) => BackendError::Api {
            status,
            code: None,
            message: body.to_string(),
        },
    }
}

fn decode_rows<R: DeserializeOwned>(body: &str) -> Result<Vec<R>> {
    serde_json::from_str(body).map_err(|e| BackendError::Decode(e.to_string()))
}

fn required<T>(value: Option<T>, table: &str, field: &str) -> Result<T> {
    value.ok_or_else(|| BackendError::Decode(format!("{} row without {}", table, field)))
}

#[derive(Deserialize)]
struct UserRow {
    id: Option<String>,
    nome: Option<String>,
    email: Option<String>,
    tipo: Option<String>,
    auth_id: Option<String>,
    criado_em: Option<String>,
}

/// Accepts `timestamptz` and plain `timestamp` renderings; anything else is dropped.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|at| at.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|at| at.and_utc())
        })
}

impl TryFrom<UserRow> for User {
    type Error = BackendError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: required(row.id, tables::USERS, "id")?,
            name: row.nome.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            role: row
                .tipo
                .as_deref()
                .map(UserRole::parse)
                .unwrap_or(UserRole::Staff),
            auth_id: row.auth_id.filter(|id| !id.is_empty()),
            created_at: row.criado_em.as_deref().and_then(parse_timestamp),
        })
    }
}

#[derive(Deserialize)]
struct ExerciseRow {
    id: Option<i64>,
    nome: Option<String>,
    musculo: Option<String>,
    imagem_url: Option<String>,
    video_url: Option<String>,
}

impl TryFrom<ExerciseRow> for Exercise {
    type Error = BackendError;

    fn try_from(row: ExerciseRow) -> Result<Self> {
        Ok(Self {
            id: required(row.id, tables::EXERCISES, "id")?,
            name: row.nome.unwrap_or_default(),
            muscle_group: row.musculo,
            image_url: row.imagem_url.filter(|u| !u.is_empty()),
            video_url: row.video_url.filter(|u| !u.is_empty()),
        })
    }
}

#[derive(Deserialize)]
struct RoutineRow {
    id: Option<i64>,
    nome: Option<String>,
    dia: Option<String>,
    aluno_id: Option<String>,
}

impl TryFrom<RoutineRow> for Routine {
    type Error = BackendError;

    fn try_from(row: RoutineRow) -> Result<Self> {
        Ok(Self {
            id: required(row.id, tables::ROUTINES, "id")?,
            name: row.nome.unwrap_or_default(),
            weekday: row.dia.as_deref().and_then(Weekday::parse),
            student_id: row.aluno_id,
        })
    }
}

#[derive(Deserialize)]
struct NameRow {
    nome: Option<String>,
}

/// An embedded to-one relation may come back as an object or a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum Embedded {
    One(NameRow),
    Many(Vec<NameRow>),
}

impl Embedded {
    fn into_name(self) -> Option<String> {
        match self {
            Embedded::One(row) => row.nome,
            Embedded::Many(rows) => rows.into_iter().next().and_then(|row| row.nome),
        }
    }
}

#[derive(Deserialize)]
struct RoutineWithStudentRow {
    #[serde(flatten)]
    routine: RoutineRow,
    usuarios: Option<Embedded>,
}

impl TryFrom<RoutineWithStudentRow> for RoutineSummary {
    type Error = BackendError;

    fn try_from(row: RoutineWithStudentRow) -> Result<Self> {
        let routine = Routine::try_from(row.routine)?;
        let student_name = row.usuarios.and_then(Embedded::into_name);
        Ok(RoutineSummary::from_routine(routine, student_name))
    }
}

#[derive(Deserialize)]
struct RoutineItemRow {
    id: Option<i64>,
    treino_id: Option<i64>,
    exercicio_id: Option<i64>,
    series: Option<i32>,
    repeticoes: Option<i32>,
    descanso: Option<i32>,
    carga: Option<f64>,
    ordem: Option<i32>,
    exercicios: Option<Embedded>,
}

impl TryFrom<RoutineItemRow> for RoutineItem {
    type Error = BackendError;

    fn try_from(row: RoutineItemRow) -> Result<Self> {
        Ok(Self {
            id: required(row.id, tables::ROUTINE_ITEMS, "id")?,
            routine_id: required(row.treino_id, tables::ROUTINE_ITEMS, "treino_id")?,
            exercise_id: required(row.exercicio_id, tables::ROUTINE_ITEMS, "exercicio_id")?,
            exercise_name: row
                .exercicios
                .and_then(Embedded::into_name)
                .unwrap_or_default(),
            sets: row.series,
            reps: row.repeticoes,
            rest_seconds: row.descanso,
            load: row.carga,
            order: row.ordem,
        })
    }
}

#[derive(Serialize)]
struct InsertUser<'a> {
    nome: &'a str,
    email: &'a str,
    senha: &'a str,
    tipo: &'a str,
}

#[derive(Serialize)]
struct InsertExercise<'a> {
    nome: &'a str,
    musculo: Option<&'a str>,
    imagem_url: Option<&'a str>,
    video_url: Option<&'a str>,
}

#[derive(Serialize)]
struct InsertRoutine<'a> {
    aluno_id: &'a str,
    nome: &'a str,
    dia: Option<&'a str>,
}

#[derive(Serialize)]
struct UpdateRoutine<'a> {
    nome: &'a str,
    dia: Option<&'a str>,
}

#[derive(Serialize)]
struct InsertRoutineItem {
    treino_id: i64,
    exercicio_id: i64,
    series: Option<i32>,
    repeticoes: Option<i32>,
    descanso: Option<i32>,
    carga: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ordem: Option<i32>,
}

impl From<&NewRoutineItem> for InsertRoutineItem {
    fn from(item: &NewRoutineItem) -> Self {
        Self {
            treino_id: item.routine_id,
            exercicio_id: item.exercise_id,
            series: item.sets,
            repeticoes: item.reps,
            descanso: item.rest_seconds,
            carga: item.load,
            ordem: item.order,
        }
    }
}
