use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("policy for module '{module}' declares field '{key}' more than once")]
    DuplicateField { module: String, key: String },
    #[error("policy field key must not be empty (module '{module}')")]
    EmptyFieldKey { module: String },
    #[error("unknown export format: {0}")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
