//! The user-facing JSON web server. It exposes `/predict`, which turns an
//! uploaded image into a serving payload and relays it to the gateway

use crate::error::RelayError;
use crate::gateway::InferenceGateway;
use actix_cors::Cors;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use tracing::*;

pub mod protocol;
pub mod routes;

/// Shared, read-only state handed to every worker
#[derive(Debug)]
pub struct AppState {
    pub gateway: InferenceGateway,
    pub max_upload_bytes: usize,
}

/// Register the relay's routes on an `App`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::predict);
}

/// Cross-origin requests are allowed from anywhere
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
}

impl ResponseError for RelayError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("request failed: {self}");
        } else {
            warn!("rejected request: {self}");
        }

        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .json(protocol::ErrorResponse::new(self.to_string()))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            err if err.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
