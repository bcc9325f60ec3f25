//! Preferences controller initializer.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use ctrl_preferences::PreferencesController;
use shared_bus::MessengerScopes;
use shared_types::{Controller, PreferencesState};

use crate::error::{ApiError, InitError};
use crate::init::{downcast_controller, ApiMap, ApiMethod, ControllerInit, InitRequest};
use crate::messengers::PREFERENCES_SCOPES;

/// Bootstrap adapter for [`PreferencesController`].
pub struct PreferencesControllerInit;

impl ControllerInit for PreferencesControllerInit {
    fn init(&self, request: InitRequest) -> Result<Arc<dyn Controller>, InitError> {
        let mut initial = match request.persisted_for("PreferencesController") {
            Some(blob) => serde_json::from_value(blob.clone()).unwrap_or_else(|err| {
                warn!(error = %err, "Persisted preferences unreadable, using defaults");
                PreferencesState::default()
            }),
            None => PreferencesState::default(),
        };

        if let Some(locale) = &request.environment.hooks.initial_locale {
            initial.locale = locale.clone();
        }

        let controller = PreferencesController::new(request.controller_messenger, initial)?;
        Ok(controller)
    }

    fn api(&self, controller: &Arc<dyn Controller>) -> ApiMap {
        let mut api = ApiMap::new();
        let Some(preferences) = downcast_controller::<PreferencesController>(controller) else {
            return api;
        };

        let for_get = Arc::clone(&preferences);
        api.insert(
            "getPreferences".to_string(),
            Arc::new(move |_params| Ok(serde_json::to_value(for_get.get_state())?)) as ApiMethod,
        );

        let for_set_routing = Arc::clone(&preferences);
        api.insert(
            "setSmartRoutingEnabled".to_string(),
            Arc::new(move |params: Value| {
                let enabled = params
                    .as_bool()
                    .ok_or_else(|| ApiError::InvalidParams("expected boolean".to_string()))?;
                for_set_routing.set_smart_routing_enabled(enabled)?;
                Ok(Value::Null)
            }) as ApiMethod,
        );

        let for_set_locale = preferences;
        api.insert(
            "setLocale".to_string(),
            Arc::new(move |params: Value| {
                let locale = params
                    .as_str()
                    .ok_or_else(|| ApiError::InvalidParams("expected string".to_string()))?;
                for_set_locale.set_locale(locale.to_string())?;
                Ok(Value::Null)
            }) as ApiMethod,
        );

        api
    }

    fn messenger_scopes(&self) -> MessengerScopes {
        PREFERENCES_SCOPES
    }
}
