use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;

use super::{ApiError, AppState, RequireAdmin};
use crate::upload::{store_image, IncomingFile, UploadError, UploadedImage, MAX_UPLOAD_BYTES};

const FILE_FIELD: &str = "file";

pub async fn upload_image(_: RequireAdmin, State(s): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadedImage>, ApiError> {
    let file = read_file_field(&mut multipart).await?.ok_or(UploadError::NoFile)?;
    Ok(Json(store_image(s.blobs.as_ref(), file).await?))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Option<IncomingFile>, UploadError> {
    while let Some(field) = multipart.next_field().await.map_err(transport_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(transport_error)?;
        return Ok(Some(IncomingFile { name, content_type, bytes: bytes.to_vec() }));
    }
    Ok(None)
}

// Hitting the body limit means the file was oversize; anything else is a broken upload.
fn transport_error(e: MultipartError) -> UploadError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge(MAX_UPLOAD_BYTES + 1)
    } else {
        UploadError::Storage(std::io::Error::new(std::io::ErrorKind::InvalidData, e.body_text()))
    }
}
