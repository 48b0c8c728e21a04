mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

use academy::backend::Backend;
use academy::models::NewRoutineItem;

const BOUNDARY: &str = "academy-test-boundary";

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, content_type, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn post_multipart(app: &common::TestApp, parts: &[Part<'_>]) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/exercicios")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(parts)))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_catalog_lists_exercises() {
    let app = common::create_test_app();
    common::create_test_exercise(app.backend.as_ref(), "Agachamento").await;

    let response = common::get(&app, "/exercicios").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_string(response).await;
    assert!(body.contains("Agachamento"));
    assert!(body.contains("Sem grupo muscular"));
}

#[tokio::test]
async fn test_saved_routine_notice() {
    let app = common::create_test_app();

    let response = common::get(&app, "/exercicios?treino=salvo").await;

    let body = common::body_string(response).await;
    assert!(body.contains("Treino salvo com sucesso!"));
}

#[tokio::test]
async fn test_create_exercise_without_media() {
    let app = common::create_test_app();

    let response = post_multipart(
        &app,
        &[
            Part::Text("name", "Supino"),
            Part::Text("muscle_group", "Peito"),
            Part::File("image", "", "application/octet-stream", b""),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/exercicios");
    assert_eq!(app.backend.count("upload_object"), 0);

    let exercises = app.backend.list_exercises().await.unwrap();
    assert_eq!(exercises.len(), 1);
    assert_eq!(exercises[0].muscle_group.as_deref(), Some("Peito"));
    assert_eq!(exercises[0].image_url, None);
}

#[tokio::test]
async fn test_create_exercise_uploads_media_and_serves_it() {
    let app = common::create_test_app();

    let response = post_multipart(
        &app,
        &[
            Part::Text("name", "Agachamento"),
            Part::File("image", "agachamento livre.png", "image/png", b"PNGDATA"),
            Part::File("video", "agachamento.mp4", "video/mp4", b"MP4DATA"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let exercise = app.backend.list_exercises().await.unwrap().remove(0);
    let image_url = exercise.image_url.unwrap();
    let video_url = exercise.video_url.unwrap();
    assert!(image_url.starts_with(&format!("{}/storage/imagens/", common::PUBLIC_URL)));
    assert!(image_url.ends_with("-agachamento_livre.png"));
    assert!(video_url.starts_with(&format!("{}/storage/videos/", common::PUBLIC_URL)));

    let path = image_url.trim_start_matches(common::PUBLIC_URL);
    let response = common::get(&app, path).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    assert_eq!(common::body_string(response).await, "PNGDATA");
}

#[tokio::test]
async fn test_failed_upload_still_creates_exercise() {
    let app = common::create_test_app();
    app.backend.fail_on("upload_object");

    let response = post_multipart(
        &app,
        &[
            Part::Text("name", "Remada"),
            Part::File("image", "remada.png", "image/png", b"PNGDATA"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let exercises = app.backend.list_exercises().await.unwrap();
    assert_eq!(exercises.len(), 1);
    assert_eq!(exercises[0].image_url, None);
}

#[tokio::test]
async fn test_create_exercise_requires_name() {
    let app = common::create_test_app();

    let response = post_multipart(&app, &[Part::Text("name", " "), Part::Text("muscle_group", "Costas")]).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_string(response).await;
    assert!(body.contains("Digite o nome do exercício."));
    assert!(body.contains("Costas"));
    assert_eq!(app.backend.count("create_exercise"), 0);
}

#[tokio::test]
async fn test_missing_storage_object_is_404() {
    let app = common::create_test_app();

    let response = common::get(&app, "/storage/imagens/nada.png").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_exercise_after_confirmation() {
    let app = common::create_test_app();
    let squat = common::create_test_exercise(app.backend.as_ref(), "Agachamento").await;

    let response = common::get(&app, &format!("/exercicios/{}/excluir", squat.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.backend.count("delete_exercise"), 0);

    let response = common::post_form(&app, &format!("/exercicios/{}/excluir", squat.id), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.backend.list_exercises().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_exercise_used_by_routine() {
    let app = common::create_test_app();
    let ana = common::create_test_student(app.backend.as_ref(), "Ana").await;
    let squat = common::create_test_exercise(app.backend.as_ref(), "Agachamento").await;
    let routine = common::create_test_routine(app.backend.as_ref(), &ana.id, "Treino A").await;
    app.backend
        .insert_routine_items(&[NewRoutineItem::bare(routine.id, squat.id)])
        .await
        .unwrap();

    let response = common::post_form(&app, &format!("/exercicios/{}/excluir", squat.id), "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.backend.list_exercises().await.unwrap().is_empty());
    let items = app.backend.list_routine_items(routine.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].exercise_id, squat.id);
}
