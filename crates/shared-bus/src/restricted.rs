//! # Restricted Messenger Views
//!
//! Per-controller narrowing of the shared [`Messenger`]. A restricted
//! view carries a static allow-list of foreign action and event names; a
//! controller's own namespace is implicitly granted. The allow-list is
//! fixed when the view is built; there is no per-call privilege
//! negotiation.
//!
//! Each controller gets two disjoint views: one used by the controller at
//! run time, and one used only by its bootstrap adapter (typically to
//! read an already-running controller's state or subscribe to its
//! state-change events). The split keeps one-time bootstrap glue from
//! retaining run-time privileges, and vice versa.

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::BusError;
use crate::events::ControllerEvent;
use crate::messenger::{ActionHandler, Messenger};

/// A static allow-list of foreign action and event names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeSpec {
    /// Foreign actions the holder may call.
    pub actions: &'static [&'static str],
    /// Foreign events the holder may subscribe to.
    pub events: &'static [&'static str],
}

/// The two scopes a controller's adapter declares: one for the
/// controller's run-time view, one for the bootstrap-only view.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessengerScopes {
    /// Scope of the view handed to the controller itself.
    pub runtime: ScopeSpec,
    /// Scope of the view used only during bootstrap wiring.
    pub init: ScopeSpec,
}

/// A narrowed handle onto the shared bus.
#[derive(Clone)]
pub struct RestrictedMessenger {
    base: Arc<Messenger>,
    namespace: &'static str,
    allowed_actions: HashSet<&'static str>,
    allowed_events: HashSet<&'static str>,
}

impl RestrictedMessenger {
    pub(crate) fn new(base: Arc<Messenger>, namespace: &'static str, scope: ScopeSpec) -> Self {
        Self {
            base,
            namespace,
            allowed_actions: scope.actions.iter().copied().collect(),
            allowed_events: scope.events.iter().copied().collect(),
        }
    }

    /// The controller namespace this view was built for.
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Register the handler for an action under this view's namespace.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::RegistrationOutsideNamespace`] for foreign
    /// action names, or [`BusError::HandlerAlreadyRegistered`].
    pub fn register_action_handler(
        &self,
        action: &str,
        handler: ActionHandler,
    ) -> Result<(), BusError> {
        if !in_namespace(action, self.namespace) {
            return Err(BusError::RegistrationOutsideNamespace {
                namespace: self.namespace.to_string(),
                action: action.to_string(),
            });
        }
        self.base.register_action_handler(action, handler)
    }

    /// Invoke `action` and return the raw JSON result.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ActionNotAllowed`] when `action` is neither
    /// allow-listed nor under this view's namespace,
    /// [`BusError::UnhandledAction`] when nothing handles it, or the
    /// handler's own error.
    pub fn call(&self, action: &str, payload: Value) -> Result<Value, BusError> {
        if !self.is_allowed_action(action) {
            return Err(BusError::ActionNotAllowed {
                namespace: self.namespace.to_string(),
                action: action.to_string(),
            });
        }
        self.base.call(action, payload)
    }

    /// Invoke `action` and deserialize its result into `R`.
    ///
    /// # Errors
    ///
    /// As [`RestrictedMessenger::call`], plus
    /// [`BusError::InvalidPayload`] when the result does not deserialize.
    pub fn request<R: DeserializeOwned>(&self, action: &str, payload: Value) -> Result<R, BusError> {
        let result = self.call(action, payload)?;
        serde_json::from_value(result).map_err(|err| BusError::invalid_payload(action, err.to_string()))
    }

    /// Publish an event owned by this view's namespace.
    ///
    /// Returns the number of subscribers that received it.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::PublishOutsideNamespace`] for foreign events.
    pub fn publish(&self, event: &ControllerEvent) -> Result<usize, BusError> {
        if event.namespace() != self.namespace {
            return Err(BusError::PublishOutsideNamespace {
                namespace: self.namespace.to_string(),
                event: event.name().to_string(),
            });
        }
        Ok(self.base.publish(event))
    }

    /// Subscribe to `event_name`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::EventNotAllowed`] when `event_name` is neither
    /// allow-listed nor under this view's namespace.
    pub fn subscribe<F>(&self, event_name: &str, handler: F) -> Result<(), BusError>
    where
        F: Fn(&ControllerEvent) + Send + Sync + 'static,
    {
        if !self.is_allowed_event(event_name) {
            return Err(BusError::EventNotAllowed {
                namespace: self.namespace.to_string(),
                event: event_name.to_string(),
            });
        }
        self.base.subscribe(event_name, Arc::new(handler));
        Ok(())
    }

    fn is_allowed_action(&self, action: &str) -> bool {
        self.allowed_actions.contains(action) || in_namespace(action, self.namespace)
    }

    fn is_allowed_event(&self, event_name: &str) -> bool {
        self.allowed_events.contains(event_name) || in_namespace(event_name, self.namespace)
    }
}

/// Whether `name` is `{namespace}:...`.
fn in_namespace(name: &str, namespace: &str) -> bool {
    name.strip_prefix(namespace)
        .is_some_and(|rest| rest.starts_with(':'))
}
