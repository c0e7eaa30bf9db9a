pub mod error;
pub mod gateway;
pub mod payload;
pub mod server;
pub mod settings;

/// Relay defaults -- anything here can be overridden through `Settings`
pub mod defaults {
    /// The Databricks model serving endpoint that scores the images
    pub const ENDPOINT_URL: &str =
        "https://dbc-bcd7602f-c2b1.cloud.databricks.com/serving-endpoints/predict/invocations";

    /// Default bind address
    pub const HOST: &str = "127.0.0.1";

    /// Default bind port
    pub const PORT: u16 = 5000;

    /// Upper bound on a single upstream call, in seconds
    pub const TIMEOUT_SECS: u64 = 60;

    /// Largest accepted upload
    pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

    /// Log filter used when `RUST_LOG` is not set
    pub const RUST_LOG: &str = "info,actix_web=info";

    /// Images are resized to exactly `WIDTH` x `HEIGHT` before scoring
    pub const WIDTH: u32 = 1000;
    pub const HEIGHT: u32 = 720;

    /// JPEG quality of the re-encoded image
    pub const JPEG_QUALITY: u8 = 75;
}
