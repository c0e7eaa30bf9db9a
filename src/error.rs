//! Every way a relay request (or relay startup) can fail

use thiserror::Error;

/// All errors that can occur while relaying an image to the serving endpoint
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("No file part in the request")]
    NoFilePart,

    #[error("No file selected for uploading")]
    NoFileSelected,

    #[error("upload exceeds the {limit} byte limit")]
    UploadTooLarge { limit: usize },

    #[error("malformed multipart request: {0}")]
    Multipart(String),

    /// The uploaded bytes are not an image we can decode (or re-encode)
    #[error(transparent)]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// The serving endpoint answered with something other than 200
    #[error("Request failed with status {status}, {body}")]
    Upstream { status: u16, body: String },

    #[error("request to serving endpoint failed: {0}")]
    Transport(reqwest::Error),

    #[error("request to serving endpoint timed out: {0}")]
    Timeout(reqwest::Error),

    #[error("serving endpoint returned invalid JSON: {0}")]
    MalformedResponse(reqwest::Error),

    #[error("preprocessing was cancelled: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("DATABRICKS_TOKEN must be set to a non-empty value")]
    MissingToken,
}

impl RelayError {
    /// Classify a failed `send()` as either a timeout or a transport error
    pub fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Timeout(err)
        } else {
            RelayError::Transport(err)
        }
    }

    /// True for errors caused by what the caller sent rather than by us or upstream
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RelayError::NoFilePart
                | RelayError::NoFileSelected
                | RelayError::UploadTooLarge { .. }
                | RelayError::Multipart(_)
        )
    }
}

/// A generic input that cannot be shaped into a serving payload
#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("input `{name}` is not list-like")]
    NotListLike { name: String },

    #[error("payload must be an object or a list, got {kind}")]
    UnsupportedShape { kind: &'static str },
}

pub type Result<T> = std::result::Result<T, RelayError>;
