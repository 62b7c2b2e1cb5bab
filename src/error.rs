#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("parse error: {reason}")]
    Parse { reason: String },

    #[error("malformed payload: {reason}")]
    Payload { reason: String },

    #[error("source error: {reason}")]
    Source { reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
