//! # Bus Error Types

use thiserror::Error;

/// Errors raised by the messenger and its restricted views.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    /// An action was invoked with no handler registered for it.
    #[error("No handler registered for action: {0}")]
    UnhandledAction(String),

    /// A second handler was registered for an action name.
    #[error("Action handler already registered: {0}")]
    HandlerAlreadyRegistered(String),

    /// A restricted view invoked an action outside its allow-list.
    #[error("Action not allowed for {namespace}: {action}")]
    ActionNotAllowed { namespace: String, action: String },

    /// A restricted view subscribed to an event outside its allow-list.
    #[error("Event not allowed for {namespace}: {event}")]
    EventNotAllowed { namespace: String, event: String },

    /// A restricted view tried to register a handler outside its own
    /// namespace.
    #[error("Cannot register action outside the {namespace} namespace: {action}")]
    RegistrationOutsideNamespace { namespace: String, action: String },

    /// A restricted view tried to publish an event outside its own
    /// namespace.
    #[error("Cannot publish event outside the {namespace} namespace: {event}")]
    PublishOutsideNamespace { namespace: String, event: String },

    /// The action handler itself failed.
    #[error("Action {action} failed: {message}")]
    Handler { action: String, message: String },

    /// An action payload or result did not have the expected shape.
    #[error("Invalid payload for {action}: {message}")]
    InvalidPayload { action: String, message: String },
}

impl BusError {
    /// Build a [`BusError::Handler`] for `action`.
    #[must_use]
    pub fn handler(action: &str, message: impl Into<String>) -> Self {
        Self::Handler {
            action: action.to_string(),
            message: message.into(),
        }
    }

    /// Build a [`BusError::InvalidPayload`] for `action`.
    #[must_use]
    pub fn invalid_payload(action: &str, message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            action: action.to_string(),
            message: message.into(),
        }
    }
}
