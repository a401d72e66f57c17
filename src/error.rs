//! Request-level error taxonomy. Every variant renders as the form page
//! with an error line; detailed messages go to the log, never the page.

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::page;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("no image file was supplied in the upload form")]
    MissingFile,

    #[error("malformed multipart payload: {0}")]
    Multipart(#[from] actix_multipart::MultipartError),

    #[error("uploaded file could not be decoded as an image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to store uploaded file: {0}")]
    Storage(#[from] std::io::Error),

    #[error("model inference failed: {0}")]
    Inference(String),

    #[error("blocking task was canceled: {0}")]
    Canceled(#[from] actix_web::error::BlockingError),
}

impl AppError {
    fn user_message(&self) -> &'static str {
        match self {
            AppError::MissingFile => "No image file was selected. Choose a file and try again.",
            AppError::Multipart(_) => "The upload was malformed. Choose a file and try again.",
            AppError::Decode(_) => "The uploaded file could not be read as an image.",
            AppError::Storage(_) => "The uploaded file could not be saved.",
            AppError::Inference(_) | AppError::Canceled(_) => {
                "The classifier could not process the image."
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFile | AppError::Multipart(_) | AppError::Decode(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Storage(_) | AppError::Inference(_) | AppError::Canceled(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::html())
            .body(page::render(None, None, Some(self.user_message())))
    }
}
