use thiserror::Error;

// Main application error type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Address Error: {0}")]
    Address(#[from] AddressError),
    #[error("Backend Error: {0}")]
    Backend(#[from] BackendError),
    #[error("Parse Error: {0}")]
    Parse(#[from] ParseError),
    #[error("Config Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Render Error: {0}")]
    Render(#[from] RenderError),
    #[error("Serialization Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
}

/// Malformed or out-of-range cell identifier. Never silently corrected.
#[derive(Error, Debug)]
pub enum AddressError {
    #[error("row {0} exceeds the single-letter limit of 25")]
    RowOutOfRange(u32),
    #[error("column {0} outside the supported range 1..=26")]
    ColumnOutOfRange(u32),
    #[error("malformed cell label {0:?}")]
    MalformedLabel(String),
}

/// Network, auth, or API-level failure from a vision backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{provider} returned HTTP {status}: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },
    #[error("{provider} response carried no text content")]
    EmptyResponse { provider: &'static str },
}

/// Backend text that is not the expected JSON shape.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("response is not the expected JSON shape: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no JSON object found in response text")]
    MissingObject,
}

/// Raised at construction time, before any network call.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown backend {0:?} (expected \"openai\" or \"anthropic\")")]
    UnknownBackend(String),
    #[error("API key not configured for {0}")]
    MissingApiKey(&'static str),
    #[error("num_passes must be at least 1, got {0}")]
    InvalidPassCount(usize),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
}
