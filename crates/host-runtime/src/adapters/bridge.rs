//! Bridge controller initializer.
//!
//! Carries the host's cross-controller bootstrap wiring: the routing
//! condition is derived from the preference store at construction time
//! and kept in sync through a state-change subscription. The preference
//! read is best-effort: a failure falls back to the disabled default
//! instead of aborting the bootstrap, because routing availability is a
//! feature toggle, not a startup requirement.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use ctrl_bridge::BridgeController;
use ctrl_metrics::actions as metrics_actions;
use ctrl_preferences::actions as preferences_actions;
use shared_bus::{topics, ControllerEvent, MessengerScopes};
use shared_types::{Controller, PreferencesState};

use crate::error::InitError;
use crate::init::{downcast_controller, ApiMap, ApiMethod, ControllerInit, InitRequest};
use crate::messengers::BRIDGE_SCOPES;

/// Routing condition used when the preference store cannot be read.
const DEFAULT_ENABLED: bool = false;

/// Bootstrap adapter for [`BridgeController`].
pub struct BridgeControllerInit;

impl ControllerInit for BridgeControllerInit {
    fn init(&self, request: InitRequest) -> Result<Arc<dyn Controller>, InitError> {
        let chain_id = (request.environment.get_global_chain_id)();
        let init_messenger = request.init_messenger;

        // Deployment kill switch; absent flag means active.
        let flag_active = (request.environment.get_flat_state)()
            .pointer("/featureFlags/bridgeRouting")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        let opted_in = match init_messenger
            .request::<PreferencesState>(preferences_actions::GET_STATE, Value::Null)
        {
            Ok(state) => state.smart_routing_enabled,
            Err(err) => {
                warn!(
                    error = %err,
                    "Preference read failed, bridge routing falls back to disabled"
                );
                DEFAULT_ENABLED
            }
        };
        let initial_enabled = flag_active && opted_in;

        let controller =
            BridgeController::new(request.controller_messenger, chain_id, initial_enabled)?;

        // Follow preference changes for the rest of the process life.
        // Only the routing flag is diffed; every other preference
        // mutation republishes the full state and must not re-toggle.
        let last_opt_in = Mutex::new(opted_in);
        let wired = Arc::clone(&controller);
        init_messenger.subscribe(topics::PREFERENCES_STATE_CHANGE, move |event| {
            let ControllerEvent::PreferencesStateChange(state) = event else {
                return;
            };
            let mut previous = last_opt_in.lock();
            if *previous == state.smart_routing_enabled {
                return;
            }
            *previous = state.smart_routing_enabled;

            if let Err(err) = wired.set_enabled(flag_active && state.smart_routing_enabled) {
                warn!(error = %err, "Bridge routing toggle failed");
            }
        })?;

        // Best-effort boot metric; dropped when nothing collects yet.
        let metric = (request.environment.new_metrics_request)("Bridge Routing Resolved")
            .with_properties(serde_json::json!({ "enabled": initial_enabled }));
        if let Ok(payload) = serde_json::to_value(&metric) {
            if let Err(err) = init_messenger.call(metrics_actions::TRACK_EVENT, payload) {
                debug!(error = %err, "Boot metric dropped");
            }
        }

        Arc::clone(&controller).spawn_liveness_refresh();
        Ok(controller)
    }

    fn api(&self, controller: &Arc<dyn Controller>) -> ApiMap {
        let mut api = ApiMap::new();
        let Some(bridge) = downcast_controller::<BridgeController>(controller) else {
            return api;
        };

        api.insert(
            "getBridgeStatus".to_string(),
            Arc::new(move |_params| Ok(serde_json::to_value(bridge.status())?)) as ApiMethod,
        );

        api
    }

    fn messenger_scopes(&self) -> MessengerScopes {
        BRIDGE_SCOPES
    }
}
