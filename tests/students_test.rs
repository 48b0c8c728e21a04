mod common;

use axum::http::StatusCode;
use academy::backend::{Backend, StudentOrder};

#[tokio::test]
async fn test_roster_lists_students() {
    let app = common::create_test_app();
    common::create_test_student(app.backend.as_ref(), "Ana").await;

    let response = common::get(&app, "/alunos").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_string(response).await;
    assert!(body.contains("Ana"));
    assert!(body.contains("ana@example.com"));
}

#[tokio::test]
async fn test_create_student_success() {
    let app = common::create_test_app();

    let response = common::post_form(
        &app,
        "/alunos",
        "name=Ana&email=ana%40example.com&password=segredo",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/alunos");

    let students = app
        .backend
        .list_students(StudentOrder::Newest)
        .await
        .unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].name, "Ana");
}

#[tokio::test]
async fn test_create_student_missing_fields() {
    let app = common::create_test_app();

    let response = common::post_form(&app, "/alunos", "name=Ana&email=&password=x").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_string(response).await;
    assert!(body.contains("Preencha todos os campos!"));
    assert_eq!(app.backend.count("create_student"), 0);
}

#[tokio::test]
async fn test_create_student_backend_failure_shows_alert() {
    let app = common::create_test_app();
    app.backend.fail_on("create_student");

    let response = common::post_form(
        &app,
        "/alunos",
        "name=Ana&email=ana%40example.com&password=segredo",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_string(response).await;
    assert!(body.contains("Erro ao salvar aluno."));
}

#[tokio::test]
async fn test_delete_student_confirmation_page() {
    let app = common::create_test_app();
    let ana = common::create_test_student(app.backend.as_ref(), "Ana").await;

    let response = common::get(&app, &format!("/alunos/{}/excluir?auth_id=auth-1", ana.id)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_string(response).await;
    assert!(body.contains("Tem certeza que deseja excluir este aluno?"));
    assert!(body.contains("auth-1"));
    assert_eq!(app.backend.count("delete_user"), 0);
}

#[tokio::test]
async fn test_delete_student_runs_auth_removal_first() {
    let app = common::create_test_app();
    let ana = common::create_test_student(app.backend.as_ref(), "Ana").await;
    app.backend.clear();

    let response =
        common::post_form(&app, &format!("/alunos/{}/excluir", ana.id), "auth_id=auth-1").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.backend.calls(), vec!["delete_auth_user", "delete_user"]);
}

#[tokio::test]
async fn test_delete_student_without_auth_id() {
    let app = common::create_test_app();
    let ana = common::create_test_student(app.backend.as_ref(), "Ana").await;
    app.backend.clear();

    let response = common::post_form(&app, &format!("/alunos/{}/excluir", ana.id), "auth_id=").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.backend.calls(), vec!["delete_user"]);
}

#[tokio::test]
async fn test_delete_student_aborts_when_auth_removal_fails() {
    let app = common::create_test_app();
    let ana = common::create_test_student(app.backend.as_ref(), "Ana").await;
    app.backend.fail_on("delete_auth_user");

    let response =
        common::post_form(&app, &format!("/alunos/{}/excluir", ana.id), "auth_id=auth-1").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_string(response).await;
    assert!(body.contains("Erro ao excluir aluno."));
    assert_eq!(app.backend.count("delete_user"), 0);
    assert_eq!(
        app.backend
            .list_students(StudentOrder::Newest)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_delete_student_who_owns_a_routine() {
    let app = common::create_test_app();
    let ana = common::create_test_student(app.backend.as_ref(), "Ana").await;
    common::create_test_routine(app.backend.as_ref(), &ana.id, "Treino A").await;

    let response = common::post_form(&app, &format!("/alunos/{}/excluir", ana.id), "auth_id=").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app
        .backend
        .list_students(StudentOrder::Newest)
        .await
        .unwrap()
        .is_empty());

    let body = common::body_string(common::get(&app, "/treinos").await).await;
    assert!(body.contains("Treino A"));
    assert!(body.contains("Aluno não encontrado"));
}
