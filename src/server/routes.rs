//! The `/predict` route: multipart upload in, upstream JSON out

use super::AppState;
use crate::error::RelayError;
use crate::payload::{self, UploadedImage};
use actix_multipart::Multipart;
use actix_web::{post, web, Responder};
use futures_util::TryStreamExt;
use tracing::*;

type Result<T> = std::result::Result<T, RelayError>;

/// Name of the multipart field carrying the image
pub const FILE_FIELD: &str = "file";

#[post("/predict")]
pub async fn predict(form: Multipart, state: web::Data<AppState>) -> Result<impl Responder> {
    let upload = read_upload(form, state.max_upload_bytes).await?;
    info!("received {upload:?}");

    // Decoding and resizing is CPU-bound
    let payload = web::block(move || payload::image_to_payload(&upload.bytes)).await??;

    let prediction = state.gateway.invoke(payload).await?;

    info!("finished serving inference request");
    Ok(web::Json(prediction))
}

/// Pull the `file` part out of the form, draining every other part.
/// A `file` part without a filename is a plain form field, not an upload
async fn read_upload(mut form: Multipart, limit: usize) -> Result<UploadedImage> {
    let mut upload: Option<UploadedImage> = None;
    let mut seen_field = false;

    loop {
        let mut field = match form.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            // Not a multipart body at all
            Err(err) if !seen_field => {
                debug!("no multipart form in request: {err}");
                return Err(RelayError::NoFilePart);
            }
            Err(err) => return Err(RelayError::Multipart(err.to_string())),
        };
        seen_field = true;

        let disposition = field.content_disposition();
        let filename = match upload.is_none() && disposition.get_name() == Some(FILE_FIELD) {
            true => disposition.get_filename().map(str::to_owned),
            false => None,
        };

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|err| RelayError::Multipart(err.to_string()))?
        {
            if filename.is_none() {
                continue;
            }
            if bytes.len() + chunk.len() > limit {
                return Err(RelayError::UploadTooLarge { limit });
            }
            bytes.extend_from_slice(&chunk);
        }

        if let Some(filename) = filename {
            upload = Some(UploadedImage { filename, bytes });
        }
    }

    match upload {
        None => Err(RelayError::NoFilePart),
        Some(upload) if upload.filename.is_empty() => Err(RelayError::NoFileSelected),
        Some(upload) => Ok(upload),
    }
}
