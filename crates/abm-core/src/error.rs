//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// The base error type for `abm-core` parsing and validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("unknown transport mode {0:?}")]
    UnknownMode(String),

    #[error("invalid time {0:?}: expected seconds or HH:MM[:SS]")]
    InvalidTime(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `abm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
