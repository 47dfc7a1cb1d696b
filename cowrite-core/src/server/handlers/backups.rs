use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use super::{actor_from_headers, ApiError};
use crate::errors::CoreError;
use crate::server::app::AppState;

pub async fn export_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let actor = actor_from_headers(&headers);
    let project_id = Uuid::parse_str(&project_id)
        .map_err(|_| CoreError::validation(format!("Invalid project id: {}", project_id)))?;

    let archive = state.app.export_project_backup(&actor, project_id).await?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(archive.mime_type),
    );
    response_headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&archive.filename))
            .map_err(|e| CoreError::internal(format!("Invalid download header: {}", e)))?,
    );

    Ok((response_headers, archive.bytes))
}

pub async fn import_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let actor = actor_from_headers(&headers);
    let limit = state.app.config().max_upload_bytes;

    let mut file_bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e.status(), limit))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e.status(), limit))?;
            file_bytes = Some(bytes.to_vec());
        }
    }

    let file_bytes =
        file_bytes.ok_or_else(|| CoreError::validation("Backup file is required"))?;
    let summary = state.app.import_project_backup(&actor, &file_bytes).await?;

    Ok(Json(json!({
        "success": summary.success,
        "projectId": summary.project_id,
        "counts": summary.counts,
    })))
}

fn multipart_error(status: StatusCode, limit: usize) -> CoreError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        CoreError::payload_too_large(limit)
    } else {
        CoreError::validation("Malformed multipart upload")
    }
}

/// Attachment header with an ASCII fallback name and the UTF-8 name per RFC 5987.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(filename.len() * 3);
    for byte in filename.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_keeps_non_ascii_names_encodable() {
        let value = content_disposition("소설_backup_20260105093007.zip");
        assert!(value.starts_with("attachment; filename=\"__"));
        assert!(value.contains("filename*=UTF-8''%EC%86%8C"));
        assert!(HeaderValue::from_str(&value).is_ok());
    }
}
