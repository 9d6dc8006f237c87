use tbgen_refgen::RefgenError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MatrixError>;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("artifact generation failed: {0}")]
    Artifact(#[from] RefgenError),

    #[error("{entity}: configuration name {name:?} is not unique")]
    DuplicateName { entity: String, name: String },

    #[error("{entity}: no file lengths declared for data width {width}")]
    MissingLengths { entity: String, width: i64 },

    #[error("{entity}: generic {generic} must be a non-negative integer")]
    InvalidGeneric { entity: String, generic: String },
}
