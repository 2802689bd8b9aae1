use thiserror::Error;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors reported by the bundle loader.
///
/// `Clone` so a memoized failure can be handed to every caller waiting on
/// the same key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Request could not be sent or the body could not be read
    #[error("Request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// Server answered with a non-success status
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Payload is not valid JSON
    #[error("Cannot parse {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// JSON is valid but not a usable bundle
    #[error("Invalid bundle from {source_name}: {message}")]
    Bundle {
        source_name: String,
        message: String,
    },

    #[error("Gist {gist} has no file named {file}")]
    GistFileMissing { gist: String, file: String },

    #[error("Gist {gist} has no files")]
    GistEmpty { gist: String },

    #[error("Cannot read {path}: {message}")]
    Io { path: String, message: String },

    /// Ingestion was asked to load nothing
    #[error("No file to load")]
    NoFile,
}

impl LoadError {
    pub fn http(url: &str, err: impl std::fmt::Display) -> Self {
        Self::Http {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub fn parse(source_name: &str, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            source_name: source_name.to_string(),
            message: err.to_string(),
        }
    }

    /// Split a graph-side error into "not JSON" and "not a bundle"
    pub fn from_graph(source_name: &str, err: stixview_graph::GraphError) -> Self {
        match err {
            stixview_graph::GraphError::Json(json) => Self::parse(source_name, json),
            other => Self::Bundle {
                source_name: source_name.to_string(),
                message: other.to_string(),
            },
        }
    }
}
