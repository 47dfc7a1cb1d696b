#![cfg(feature = "server")]

mod common;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{harness, insert_document, insert_project, Harness};
use cowrite::database::entities::documents;
use cowrite::server::app::create_app;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "cowrite-test-boundary";

fn router(h: &Harness) -> Result<Router> {
    create_app(h.app.clone(), None)
}

fn multipart_body(field: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"backup.zip\"\r\nContent-Type: application/zip\r\n\r\n",
            BOUNDARY, field
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn import_request(user: Option<Uuid>, body: Vec<u8>) -> Result<Request<Body>> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/backups/import")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    Ok(builder.body(Body::from(body))?)
}

async fn json_body(response: axum::response::Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_reports_ok() -> Result<()> {
    let h = harness().await?;
    let response = router(&h)?
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn export_without_identity_is_unauthorized() -> Result<()> {
    let h = harness().await?;
    let project = insert_project(&h.db, Uuid::new_v4(), "Locked").await?;

    let response = router(&h)?
        .oneshot(
            Request::builder()
                .uri(format!("/backups/projects/{}/export", project.id))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await?;
    assert_eq!(body["error"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn export_rejects_malformed_project_ids() -> Result<()> {
    let h = harness().await?;
    let response = router(&h)?
        .oneshot(
            Request::builder()
                .uri("/backups/projects/not-a-uuid/export")
                .header("x-user-id", Uuid::new_v4().to_string())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await?["error"], "VALIDATION_FAILED");
    Ok(())
}

#[tokio::test]
async fn download_then_upload_creates_a_copy() -> Result<()> {
    let h = harness().await?;
    let owner = Uuid::new_v4();
    let project = insert_project(&h.db, owner, "Über Draft").await?;
    insert_document(&h.db, project.id, None, "Opening", Some("Once")).await?;

    let response = router(&h)?
        .oneshot(
            Request::builder()
                .uri(format!("/backups/projects/{}/export", project.id))
                .header("x-user-id", owner.to_string())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str()?,
        "application/zip"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()?
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"_ber_Draft_backup_"));
    assert!(disposition.contains("filename*=UTF-8''%C3%9Cber_Draft_backup_"));
    let archive = to_bytes(response.into_body(), usize::MAX).await?;

    let response = router(&h)?
        .oneshot(import_request(Some(owner), multipart_body("file", &archive))?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["counts"]["documents"], 1);

    let new_id: Uuid = body["projectId"]
        .as_str()
        .expect("projectId is a string")
        .parse()?;
    assert_ne!(new_id, project.id);
    let copied = documents::Entity::find()
        .filter(documents::Column::ProjectId.eq(new_id))
        .count(&h.db)
        .await?;
    assert_eq!(copied, 1);
    Ok(())
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() -> Result<()> {
    let h = harness().await?;
    let response = router(&h)?
        .oneshot(import_request(
            Some(Uuid::new_v4()),
            multipart_body("attachment", b"{}"),
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await?;
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert_eq!(body["message"], "Backup file is required");
    Ok(())
}

#[tokio::test]
async fn upload_of_unknown_format_is_a_bad_bundle() -> Result<()> {
    let h = harness().await?;
    let response = router(&h)?
        .oneshot(import_request(
            Some(Uuid::new_v4()),
            multipart_body("file", b"plain text"),
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await?["error"], "BAD_BUNDLE");
    Ok(())
}
