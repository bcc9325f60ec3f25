//! # Base Messenger
//!
//! The shared, fully privileged bus instance. Holds one action handler
//! per action name (request/response) and any number of event subscribers
//! per event name (publish/subscribe). The base handle is held by the
//! bootstrap caller only; controllers receive [`RestrictedMessenger`]
//! views built by [`Messenger::restricted`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::error::BusError;
use crate::events::ControllerEvent;
use crate::restricted::{RestrictedMessenger, ScopeSpec};

/// Handler for a request/response action.
pub type ActionHandler = Arc<dyn Fn(Value) -> Result<Value, BusError> + Send + Sync>;

/// Callback for a published event.
pub type EventHandler = Arc<dyn Fn(&ControllerEvent) + Send + Sync>;

/// The shared in-process bus.
///
/// Dispatch is synchronous call-through: `call` runs the handler inline
/// and `publish` runs every matching subscriber inline, nested in the
/// caller's stack. Handlers are cloned out of the registry before
/// invocation so a handler may itself call or publish without
/// re-entering a held lock.
#[derive(Default)]
pub struct Messenger {
    /// Action name → single registered handler.
    actions: RwLock<HashMap<String, ActionHandler>>,
    /// Event name → registered subscriber callbacks.
    subscribers: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl Messenger {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a restricted view for `namespace` with the given allow-list.
    ///
    /// The view may register handlers and publish events under its own
    /// namespace, and reach exactly the foreign actions/events named in
    /// `scope`. The allow-list is fixed at construction.
    #[must_use]
    pub fn restricted(self: &Arc<Self>, namespace: &'static str, scope: ScopeSpec) -> RestrictedMessenger {
        RestrictedMessenger::new(Arc::clone(self), namespace, scope)
    }

    /// Register the handler for `action`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::HandlerAlreadyRegistered`] if the action
    /// already has a handler.
    pub fn register_action_handler(
        &self,
        action: &str,
        handler: ActionHandler,
    ) -> Result<(), BusError> {
        let mut actions = self.actions.write();
        if actions.contains_key(action) {
            return Err(BusError::HandlerAlreadyRegistered(action.to_string()));
        }
        debug!(action, "Action handler registered");
        actions.insert(action.to_string(), handler);
        Ok(())
    }

    /// Invoke the handler registered for `action` and return its result.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::UnhandledAction`] when no handler is
    /// registered, or the handler's own error.
    pub fn call(&self, action: &str, payload: Value) -> Result<Value, BusError> {
        let handler = {
            let actions = self.actions.read();
            actions
                .get(action)
                .cloned()
                .ok_or_else(|| BusError::UnhandledAction(action.to_string()))?
        };
        handler(payload)
    }

    /// Subscribe `handler` to events named `event_name`.
    pub fn subscribe(&self, event_name: &str, handler: EventHandler) {
        debug!(event = event_name, "Event subscription added");
        self.subscribers
            .write()
            .entry(event_name.to_string())
            .or_default()
            .push(handler);
    }

    /// Publish `event` to every subscriber of its name, inline.
    ///
    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: &ControllerEvent) -> usize {
        let handlers: Vec<EventHandler> = {
            let subscribers = self.subscribers.read();
            subscribers
                .get(event.name())
                .map(|list| list.to_vec())
                .unwrap_or_default()
        };

        if handlers.is_empty() {
            debug!(event = event.name(), "Event published with no subscribers");
            return 0;
        }

        debug!(
            event = event.name(),
            receivers = handlers.len(),
            "Event published"
        );
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Whether a handler is registered for `action`.
    #[must_use]
    pub fn has_action_handler(&self, action: &str) -> bool {
        self.actions.read().contains_key(action)
    }

    /// Number of subscribers registered for `event_name`.
    #[must_use]
    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.subscribers
            .read()
            .get(event_name)
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::topics;
    use serde_json::json;
    use shared_types::PreferencesState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn call_dispatches_to_registered_handler() {
        let bus = Messenger::new();
        bus.register_action_handler(
            "PreferencesController:getState",
            Arc::new(|_| Ok(json!({ "locale": "en" }))),
        )
        .expect("register");

        let result = bus
            .call("PreferencesController:getState", Value::Null)
            .expect("call");
        assert_eq!(result["locale"], "en");
    }

    #[test]
    fn call_without_handler_is_unhandled() {
        let bus = Messenger::new();
        let err = bus.call("Missing:action", Value::Null).unwrap_err();
        assert_eq!(err, BusError::UnhandledAction("Missing:action".to_string()));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let bus = Messenger::new();
        let handler: ActionHandler = Arc::new(|_| Ok(Value::Null));
        bus.register_action_handler("A:x", Arc::clone(&handler))
            .expect("first");
        let err = bus.register_action_handler("A:x", handler).unwrap_err();
        assert_eq!(err, BusError::HandlerAlreadyRegistered("A:x".to_string()));
    }

    #[test]
    fn publish_runs_subscribers_inline() {
        let bus = Messenger::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_handler = Arc::clone(&hits);
        bus.subscribe(
            topics::PREFERENCES_STATE_CHANGE,
            Arc::new(move |_| {
                hits_in_handler.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let receivers =
            bus.publish(&ControllerEvent::PreferencesStateChange(PreferencesState::default()));
        assert_eq!(receivers, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let bus = Messenger::new();
        let receivers = bus.publish(&ControllerEvent::VaultLocked);
        assert_eq!(receivers, 0);
    }

    #[test]
    fn nested_publish_from_a_subscriber_does_not_deadlock() {
        let bus = Arc::new(Messenger::new());
        let locked_hits = Arc::new(AtomicUsize::new(0));

        let locked_hits_in_handler = Arc::clone(&locked_hits);
        bus.subscribe(
            topics::VAULT_LOCKED,
            Arc::new(move |_| {
                locked_hits_in_handler.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let bus_in_handler = Arc::clone(&bus);
        bus.subscribe(
            topics::PREFERENCES_STATE_CHANGE,
            Arc::new(move |_| {
                bus_in_handler.publish(&ControllerEvent::VaultLocked);
            }),
        );

        bus.publish(&ControllerEvent::PreferencesStateChange(PreferencesState::default()));
        assert_eq!(locked_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn nested_call_from_a_handler_does_not_deadlock() {
        let bus = Arc::new(Messenger::new());
        bus.register_action_handler("B:inner", Arc::new(|_| Ok(json!(21))))
            .expect("register inner");

        let bus_in_handler = Arc::clone(&bus);
        bus.register_action_handler(
            "A:outer",
            Arc::new(move |_| {
                let inner = bus_in_handler.call("B:inner", Value::Null)?;
                let doubled = inner.as_u64().unwrap_or(0) * 2;
                Ok(json!(doubled))
            }),
        )
        .expect("register outer");

        let result = bus.call("A:outer", Value::Null).expect("call");
        assert_eq!(result, json!(42));
    }
}
