use std::fs::File;
use std::io::Write;
use std::path::Path;

use actix_multipart::Multipart;
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use log::{info, warn};
use uuid::Uuid;

use crate::classifier::Classifier;
use crate::error::AppError;
use crate::page;

/// Read-only per-process state, built before the server binds.
pub struct AppState {
    pub classifier: Box<dyn Classifier>,
    pub upload_dir: String,
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page::render(None, None, None))
}

pub async fn predict(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let stored = save_upload(&mut payload, &state.upload_dir)
        .await
        .map_err(|e| {
            warn!("upload rejected: {}", e);
            e
        })?;
    let disk_path = Path::new(&state.upload_dir).join(&stored);

    let stage = state.classifier.classify(&disk_path).map_err(|e| {
        warn!("could not classify {}: {}", disk_path.display(), e);
        e
    })?;
    info!("classified {} as {}", stored, stage);

    let src = format!("{}/{}", state.upload_dir, stored);
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page::render(Some(&src), Some(stage), None)))
}

/// Streams the `image` multipart field to a server-named file under
/// `upload_dir` and returns the stored filename. The client-supplied name
/// never reaches the filesystem; only an alphanumeric extension survives.
async fn save_upload(payload: &mut Multipart, upload_dir: &str) -> Result<String, AppError> {
    while let Some(item) = payload.next().await {
        let mut field = item?;

        let disposition = field.content_disposition();
        let is_image = disposition.get_name() == Some("image");
        let ext = disposition
            .get_filename()
            .and_then(file_extension)
            .map(str::to_owned);
        if !is_image {
            // Drain unrelated fields so the stream can advance.
            while field.next().await.is_some() {}
            continue;
        }

        let stored = match ext {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let disk_path = Path::new(upload_dir).join(&stored);

        let create_path = disk_path.clone();
        let mut f = web::block(move || File::create(create_path)).await??;

        let mut written = 0usize;
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            written += data.len();
            f = web::block(move || f.write_all(&data).map(|_| f)).await??;
        }

        if written == 0 {
            let _ = std::fs::remove_file(&disk_path);
            return Err(AppError::MissingFile);
        }
        return Ok(stored);
    }

    Err(AppError::MissingFile)
}

fn file_extension(filename: &str) -> Option<&str> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}
