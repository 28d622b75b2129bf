//! HTTP handlers for file upload, download, delete, move and listing.

use super::auth_handlers::CurrentUser;
use crate::{errors::AppError, services::AppState};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// POST `/api/buckets/{bucket_id}/files` — multipart upload.
///
/// The saga runs inside a spawned task so that a client disconnect after the
/// body has been read cannot abandon a quota reservation or a written blob
/// mid-compensation.
pub async fn upload_file(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(bucket_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("malformed multipart body: {}", err)))?
    {
        if field.name() == Some("file") {
            let name = field
                .file_name()
                .ok_or_else(|| AppError::bad_request("file field has no filename"))?
                .to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| AppError::bad_request(format!("failed to read upload: {}", err)))?;
            upload = Some((name, content_type, bytes));
            break;
        }
    }

    let (name, content_type, bytes) =
        upload.ok_or_else(|| AppError::bad_request("missing `file` field"))?;

    let files = state.files.clone();
    let record = tokio::spawn(async move {
        files
            .upload(&user.0, bucket_id, &name, bytes, content_type)
            .await
    })
    .await
    .map_err(|err| AppError::internal(format!("upload task failed: {}", err)))??;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET `/api/buckets/{bucket_id}/files`
pub async fn list_files(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(bucket_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let files = state.files.list(&user.0, bucket_id).await?;
    Ok(Json(files))
}

/// GET `/api/files/{file_id}/download`
pub async fn download_file(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(file_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (record, bytes) = state.files.download(&user.0, file_id).await?;

    let content_type = record
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".into());
    let disposition = attachment_disposition(&record.name);

    let mut response = Response::new(Body::from(bytes));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&record.size_bytes.to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}

/// Build a `Content-Disposition` value for the download response. Name
/// sanitation strips separators but not quotes, so drop anything that would
/// break out of the quoted-string form.
fn attachment_disposition(name: &str) -> String {
    let safe: String = name
        .chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

/// DELETE `/api/files/{file_id}`
pub async fn delete_file(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(file_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.files.delete(&user.0, file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH `/api/files/{file_id}/move/{target_bucket_id}`
pub async fn move_file(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((file_id, target_bucket_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .files
        .move_file(&user.0, file_id, target_bucket_id)
        .await?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::attachment_disposition;

    #[test]
    fn disposition_quotes_plain_names() {
        assert_eq!(
            attachment_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
    }

    #[test]
    fn disposition_strips_quotes_and_control_chars() {
        assert_eq!(
            attachment_disposition("a\"; rm -rf\".txt"),
            "attachment; filename=\"a; rm -rf.txt\""
        );
        assert_eq!(
            attachment_disposition("line\r\nbreak.txt"),
            "attachment; filename=\"linebreak.txt\""
        );
    }
}
