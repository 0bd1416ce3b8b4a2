use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("contact id is required")]
    EmptyContactId,
    #[error("invalid image data: {0}")]
    InvalidImageData(String),
}
