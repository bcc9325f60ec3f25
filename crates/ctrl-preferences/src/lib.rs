//! # Preferences Controller
//!
//! Holds the user preference store: locale, smart-routing opt-in, and the
//! external-services switch. Other controllers never read this state
//! directly; they call `PreferencesController:getState` or subscribe to
//! `PreferencesController:stateChange`, which republishes the full state
//! after every mutation.

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::info;

use shared_bus::{BusError, ControllerEvent, RestrictedMessenger};
use shared_types::{Controller, PreferencesState};

/// Action names registered by this controller.
pub mod actions {
    /// Returns the full [`PreferencesState`](shared_types::PreferencesState).
    pub const GET_STATE: &str = "PreferencesController:getState";

    /// Sets the smart-routing opt-in; payload is a JSON boolean.
    pub const SET_SMART_ROUTING_ENABLED: &str = "PreferencesController:setSmartRoutingEnabled";

    /// Sets the UI locale; payload is a JSON string.
    pub const SET_LOCALE: &str = "PreferencesController:setLocale";
}

/// The preference store.
pub struct PreferencesController {
    state: RwLock<PreferencesState>,
    messenger: RestrictedMessenger,
}

impl PreferencesController {
    /// Construct the controller and register its bus actions.
    ///
    /// # Errors
    ///
    /// Fails if an action name is already taken on the bus.
    pub fn new(
        messenger: RestrictedMessenger,
        initial: PreferencesState,
    ) -> Result<Arc<Self>, BusError> {
        let controller = Arc::new(Self {
            state: RwLock::new(initial),
            messenger,
        });
        controller.register_handlers()?;
        Ok(controller)
    }

    fn register_handlers(self: &Arc<Self>) -> Result<(), BusError> {
        let for_get = Arc::clone(self);
        self.messenger.register_action_handler(
            actions::GET_STATE,
            Arc::new(move |_payload| {
                serde_json::to_value(for_get.get_state())
                    .map_err(|err| BusError::handler(actions::GET_STATE, err.to_string()))
            }),
        )?;

        let for_set_routing = Arc::clone(self);
        self.messenger.register_action_handler(
            actions::SET_SMART_ROUTING_ENABLED,
            Arc::new(move |payload| {
                let enabled = payload.as_bool().ok_or_else(|| {
                    BusError::invalid_payload(
                        actions::SET_SMART_ROUTING_ENABLED,
                        "expected boolean",
                    )
                })?;
                for_set_routing.set_smart_routing_enabled(enabled)?;
                Ok(Value::Null)
            }),
        )?;

        let for_set_locale = Arc::clone(self);
        self.messenger.register_action_handler(
            actions::SET_LOCALE,
            Arc::new(move |payload| {
                let locale = payload.as_str().ok_or_else(|| {
                    BusError::invalid_payload(actions::SET_LOCALE, "expected string")
                })?;
                for_set_locale.set_locale(locale.to_string())?;
                Ok(Value::Null)
            }),
        )?;

        Ok(())
    }

    /// Current state snapshot.
    #[must_use]
    pub fn get_state(&self) -> PreferencesState {
        self.state.read().clone()
    }

    /// Update the smart-routing opt-in and publish the new state.
    ///
    /// # Errors
    ///
    /// Propagates a publish failure from the bus.
    pub fn set_smart_routing_enabled(&self, enabled: bool) -> Result<(), BusError> {
        {
            let mut state = self.state.write();
            if state.smart_routing_enabled == enabled {
                return Ok(());
            }
            state.smart_routing_enabled = enabled;
        }
        info!(enabled, "Smart routing preference changed");
        self.publish_state()
    }

    /// Update the locale and publish the new state.
    ///
    /// # Errors
    ///
    /// Propagates a publish failure from the bus.
    pub fn set_locale(&self, locale: String) -> Result<(), BusError> {
        {
            let mut state = self.state.write();
            if state.locale == locale {
                return Ok(());
            }
            state.locale = locale;
        }
        self.publish_state()
    }

    fn publish_state(&self) -> Result<(), BusError> {
        self.messenger
            .publish(&ControllerEvent::PreferencesStateChange(self.get_state()))?;
        Ok(())
    }
}

impl Controller for PreferencesController {
    fn name(&self) -> &'static str {
        "PreferencesController"
    }

    fn state(&self) -> Value {
        serde_json::to_value(self.get_state()).unwrap_or(Value::Null)
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
