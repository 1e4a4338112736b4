use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Other error: {0}")]
    Other(String),
}
