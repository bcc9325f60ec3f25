//! # Host Runtime Error Types

use shared_bus::BusError;
use thiserror::Error;

/// Errors that abort the controller bootstrap.
///
/// There is no retry anywhere in this layer: the first error out of an
/// initializer ends the whole bootstrap.
#[derive(Debug, Error)]
pub enum InitError {
    /// `get_controller` was called for a name that has not been
    /// initialized yet; a caller-side ordering bug.
    #[error("Controller requested before it was initialized: {0}")]
    RequestedBeforeInit(String),

    /// `get_controller` resolved the name but the registered controller
    /// is not of the requested type.
    #[error("Controller {0} is not of the requested type")]
    ControllerTypeMismatch(String),

    /// Two initializers produced controllers with the same name.
    #[error("Duplicate controller name: {0}")]
    DuplicateControllerName(String),

    /// Two entries resolved to the same aggregate key while strict key
    /// checking was enabled.
    #[error("Duplicate {map} key: {key}")]
    DuplicateKey { map: &'static str, key: String },

    /// A bus operation failed during initialization.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// A controller's own construction failed.
    #[error("Controller {name} failed to initialize: {message}")]
    Controller { name: String, message: String },
}

/// Errors returned by aggregated API methods.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The caller's parameters did not have the expected shape.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The underlying bus operation failed.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// The method failed internally.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
