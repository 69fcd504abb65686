//! Error Types
//!
//! Fatal-only error handling for the core editor. Input-range conditions
//! (out-of-range targets, undo/redo past the available history) are not
//! represented here: they are saturated in place by the dispatcher and the
//! history, per the editor's contract. Only resource failure and protocol
//! malformation reach this type.

use thiserror::Error;

/// Fatal editor errors.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("malformed command line: {0:?}")]
    MalformedCommand(String),

    #[error("unexpected end of input while reading a payload line")]
    UnexpectedEof,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;
