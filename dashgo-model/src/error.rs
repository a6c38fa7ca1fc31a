use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidPage(u32),
    InvalidPageSize(u32),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidPage(page) => {
                write!(f, "invalid page {page}: pages start at 1")
            }
            ModelError::InvalidPageSize(size) => {
                write!(f, "invalid page size {size}: must be at least 1")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
