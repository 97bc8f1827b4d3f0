use crate::utils::validation::sanitize_filename;
use axum::{
    Json,
    extract::{Multipart, State},
};
use futures::TryStreamExt;
use serde::Serialize;
use std::path::PathBuf;
use tokio_util::io::StreamReader;

#[derive(Serialize)]
pub struct StatusResponse {
    pub message: String,
    pub status: &'static str,
}

impl StatusResponse {
    fn success(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
            status: "success",
        })
    }

    fn error(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
            status: "error",
        })
    }
}

/// Accepts a multipart upload, saves it under the upload directory and queues
/// a background scan of the saved file.
///
/// Client mistakes come back as an error payload, not an HTTP error status;
/// the scan itself is never awaited, so the success payload only means the
/// job was queued.
pub async fn upload_and_execute(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Json<StatusResponse> {
    let mut saved: Option<PathBuf> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return StatusResponse::error(format!("Malformed multipart body: {e}")),
        };

        if field.name() != Some("file") {
            continue;
        }

        let original_filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return StatusResponse::error("No selected file"),
        };

        let filename = match sanitize_filename(&original_filename) {
            Ok(name) => name,
            Err(e) => return StatusResponse::error(e.to_string()),
        };

        let dest = state.config.upload_dir.join(&filename);

        let body_with_io_error =
            field.map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err));
        let mut reader = StreamReader::new(body_with_io_error);

        let mut file = match tokio::fs::File::create(&dest).await {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("Failed to create {}: {}", dest.display(), e);
                return StatusResponse::error("Failed to save file");
            }
        };

        if let Err(e) = tokio::io::copy(&mut reader, &mut file).await {
            tracing::error!("Failed to write {}: {}", dest.display(), e);
            let _ = tokio::fs::remove_file(&dest).await;
            return StatusResponse::error("Failed to save file");
        }

        saved = Some(dest);
        break;
    }

    let Some(file_path) = saved else {
        return StatusResponse::error("No file part");
    };

    tracing::info!("Saved upload to {}", file_path.display());
    state.runner.schedule(file_path);

    StatusResponse::success("File uploaded and script started")
}
