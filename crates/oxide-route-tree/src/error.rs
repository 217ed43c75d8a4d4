//! Error types for route registration.

use thiserror::Error;

/// Router-specific errors.
///
/// Every variant is raised while the route tree is being built. A request that
/// matches nothing is not an error; dispatch reports it as `None`.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The path spec could not be compiled.
    #[error("invalid path pattern {path:?}: {reason}")]
    InvalidPattern { path: String, reason: String },

    /// A root route with the same path spec already exists.
    #[error("path already defined: {path}")]
    DuplicatePath { path: String },

    /// A method was registered without any handler.
    #[error("no handlers given for {method} on {path}")]
    EmptyChain { method: String, path: String },

    /// Unrecognised HTTP method token.
    #[error("unknown method: {0}")]
    UnknownMethod(String),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
