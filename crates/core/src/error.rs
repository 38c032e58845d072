use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("{tool} is not installed or not on PATH")]
    MissingDependency { tool: String },

    #[error("Extraction failed for {url}: {reason}")]
    ExtractionFailed { url: String, reason: String },

    #[error("Caption download failed for {video_id}: {reason}")]
    CaptionFetchFailed { video_id: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV write error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl ScribeError {
    /// Map a subprocess spawn failure, turning "binary not found" into a missing dependency.
    pub fn from_spawn(tool: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ScribeError::MissingDependency {
                tool: tool.to_string(),
            }
        } else {
            ScribeError::IoError(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ScribeError>;
