use thiserror::Error;

pub type Result<T> = std::result::Result<T, DigestError>;

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("{command}: {message}")]
    Command { command: String, message: String },
    #[error("parse {what} json: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DigestError {
    pub fn parse(what: &'static str, source: serde_json::Error) -> Self {
        DigestError::Parse { what, source }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, DigestError::Parse { .. })
    }
}
