use thiserror::Error;

/// Main error type for the transaction explorer
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// HTTP server start-up and serving errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Server error: {0}")]
    Server(String),
}

/// JSON-RPC transport and protocol errors
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC method error: code={code}, message={message}")]
    Method { code: i32, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Connection failed: {0}")]
    Connection(String),
}

/// Failure of a single event-log decode attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Event signature mismatch: got={0}")]
    SignatureMismatch(String),

    #[error("Missing topics: expected at least {expected}, got {got}")]
    MissingTopics { expected: usize, got: usize },

    #[error("Invalid 32-byte word: {0}")]
    InvalidWord(String),

    #[error("Invalid address word: {0}")]
    InvalidAddress(String),

    #[error("Insufficient log data: expected {expected} bytes, got {got}")]
    InsufficientData { expected: usize, got: usize },
}

/// Errors surfaced to API callers. Messages are fixed strings, internal causes
/// are logged and dropped before one of these is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl ServiceError {
    pub fn bad_request(message: &str) -> Self {
        ServiceError::BadRequest(message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        ServiceError::NotFound(message.to_string())
    }

    pub fn message(&self) -> &str {
        match self {
            ServiceError::BadRequest(message) | ServiceError::NotFound(message) => message,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parsing failed: {0}")]
    Parsing(String),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ExplorerError>;

impl RpcError {
    /// Classify a transport failure the way callers care about it
    pub fn from_transport(error: reqwest::Error, timeout_seconds: u64) -> Self {
        if error.is_timeout() {
            RpcError::Timeout { seconds: timeout_seconds }
        } else if error.is_connect() {
            RpcError::Connection(error.to_string())
        } else {
            RpcError::Http(error)
        }
    }
}
