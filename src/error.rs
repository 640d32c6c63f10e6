//! Error type shared by the fetch, parse, config and output stages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_yaml::Error> for BoardError {
    fn from(e: serde_yaml::Error) -> Self {
        BoardError::Config(e.to_string())
    }
}

impl From<url::ParseError> for BoardError {
    fn from(e: url::ParseError) -> Self {
        BoardError::Config(format!("invalid endpoint URL: {e}"))
    }
}
