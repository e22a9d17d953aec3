#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to decode APOD response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Parse error: {0}")]
    ParseError(&'static str),
}
