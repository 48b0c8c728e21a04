#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::Body, Router};
use http::{header, Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;

use academy::backend::{
    Backend, BackendError, Result, SharedBackend, SqliteBackend, StoredObject, StudentOrder,
};
use academy::db::create_memory_pool;
use academy::migrations::run_migrations;
use academy::models::{
    Exercise, NewExercise, NewRoutine, NewRoutineItem, NewStudent, Routine, RoutineChanges,
    RoutineItem, RoutineSummary, User,
};
use academy::services::students::hash_password;

pub const PUBLIC_URL: &str = "http://localhost:3000";

pub fn setup_backend() -> SqliteBackend {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations(&pool).expect("Failed to run migrations");
    SqliteBackend::new(pool, PUBLIC_URL)
}

/// Wraps the local backend, recording every call by operation name and
/// optionally failing one operation.
pub struct RecordingBackend {
    inner: SqliteBackend,
    calls: Mutex<Vec<&'static str>>,
    fail_on: Mutex<Option<&'static str>>,
}

impl RecordingBackend {
    pub fn new(inner: SqliteBackend) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_on: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| **c == op).count()
    }

    /// Calls recorded after the first call to `op`.
    pub fn calls_after(&self, op: &str) -> Vec<&'static str> {
        self.calls()
            .into_iter()
            .skip_while(|c| *c != op)
            .skip(1)
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail_on(&self, op: &'static str) {
        *self.fail_on.lock().unwrap() = Some(op);
    }

    fn record(&self, op: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(op);
        if *self.fail_on.lock().unwrap() == Some(op) {
            return Err(BackendError::Api {
                status: 500,
                code: None,
                message: format!("injected failure in {}", op),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn list_students(&self, order: StudentOrder) -> Result<Vec<User>> {
        self.record("list_students")?;
        self.inner.list_students(order).await
    }

    async fn create_student(&self, student: &NewStudent) -> Result<User> {
        self.record("create_student")?;
        self.inner.create_student(student).await
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        self.record("delete_user")?;
        self.inner.delete_user(id).await
    }

    async fn delete_auth_user(&self, auth_id: &str) -> Result<()> {
        self.record("delete_auth_user")?;
        self.inner.delete_auth_user(auth_id).await
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>> {
        self.record("list_exercises")?;
        self.inner.list_exercises().await
    }

    async fn create_exercise(&self, exercise: &NewExercise) -> Result<Exercise> {
        self.record("create_exercise")?;
        self.inner.create_exercise(exercise).await
    }

    async fn delete_exercise(&self, id: i64) -> Result<()> {
        self.record("delete_exercise")?;
        self.inner.delete_exercise(id).await
    }

    async fn find_routine(&self, id: i64) -> Result<Option<Routine>> {
        self.record("find_routine")?;
        self.inner.find_routine(id).await
    }

    async fn find_routine_by_owner_and_name(
        &self,
        student_id: &str,
        name: &str,
    ) -> Result<Option<Routine>> {
        self.record("find_routine_by_owner_and_name")?;
        self.inner
            .find_routine_by_owner_and_name(student_id, name)
            .await
    }

    async fn create_routine(&self, routine: &NewRoutine) -> Result<Routine> {
        self.record("create_routine")?;
        self.inner.create_routine(routine).await
    }

    async fn update_routine(&self, id: i64, changes: &RoutineChanges) -> Result<()> {
        self.record("update_routine")?;
        self.inner.update_routine(id, changes).await
    }

    async fn list_routines(&self) -> Result<Vec<Routine>> {
        self.record("list_routines")?;
        self.inner.list_routines().await
    }

    async fn delete_routine(&self, id: i64) -> Result<()> {
        self.record("delete_routine")?;
        self.inner.delete_routine(id).await
    }

    async fn list_routines_with_students(&self) -> Result<Vec<RoutineSummary>> {
        self.record("list_routines_with_students")?;
        self.inner.list_routines_with_students().await
    }

    async fn list_routine_items(&self, routine_id: i64) -> Result<Vec<RoutineItem>> {
        self.record("list_routine_items")?;
        self.inner.list_routine_items(routine_id).await
    }

    async fn insert_routine_items(&self, items: &[NewRoutineItem]) -> Result<()> {
        self.record("insert_routine_items")?;
        self.inner.insert_routine_items(items).await
    }

    async fn delete_routine_item(&self, id: i64) -> Result<()> {
        self.record("delete_routine_item")?;
        self.inner.delete_routine_item(id).await
    }

    async fn delete_routine_items(&self, routine_id: i64) -> Result<()> {
        self.record("delete_routine_items")?;
        self.inner.delete_routine_items(routine_id).await
    }

    async fn delete_routine_cascade(&self, id: i64) -> Result<()> {
        self.record("delete_routine_cascade")?;
        self.inner.delete_routine_cascade(id).await
    }

    async fn upload_object(&self, path: &str, content_type: &str, data: Vec<u8>) -> Result<()> {
        self.record("upload_object")?;
        self.inner.upload_object(path, content_type, data).await
    }

    fn public_url(&self, path: &str) -> String {
        self.inner.public_url(path)
    }

    async fn fetch_object(&self, path: &str) -> Result<Option<StoredObject>> {
        self.record("fetch_object")?;
        self.inner.fetch_object(path).await
    }
}

pub struct TestApp {
    pub router: Router,
    pub backend: Arc<RecordingBackend>,
}

pub fn create_test_app() -> TestApp {
    let backend = Arc::new(RecordingBackend::new(setup_backend()));
    let shared: SharedBackend = backend.clone();
    TestApp {
        router: academy::routes::create_router(shared),
        backend,
    }
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    app.router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(app: &TestApp, uri: &str, body: &str) -> Response<Body> {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&body).to_string()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

// Test data creation helpers
pub async fn create_test_student(backend: &dyn Backend, name: &str) -> User {
    backend
        .create_student(&NewStudent {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: hash_password("senha123").unwrap(),
        })
        .await
        .unwrap()
}

pub async fn create_test_exercise(backend: &dyn Backend, name: &str) -> Exercise {
    backend
        .create_exercise(&NewExercise {
            name: name.to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub async fn create_test_routine(backend: &dyn Backend, student_id: &str, name: &str) -> Routine {
    backend
        .create_routine(&NewRoutine {
            student_id: student_id.to_string(),
            name: name.to_string(),
            weekday: None,
        })
        .await
        .unwrap()
}
