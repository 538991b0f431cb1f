use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not read {path}: {reason}")]
    SourceRead { path: String, reason: String },

    #[error("No row has content in text_fields; check 'text_fields' in the config. Actual columns: {columns:?}")]
    NoUsableRows { columns: Vec<String> },

    #[error("Vector store failure: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;
