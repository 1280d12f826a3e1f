use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractError {
    #[error("Embedded data not found: {0}")]
    NotFound(String),

    #[error("Embedded data is not valid JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
