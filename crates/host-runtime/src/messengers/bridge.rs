//! Scopes for the bridge controller's bus views.

use ctrl_metrics::actions as metrics_actions;
use ctrl_preferences::actions as preferences_actions;
use shared_bus::{topics, MessengerScopes, ScopeSpec};

/// The running bridge stays inside its own namespace. All
/// cross-controller access is bootstrap-only: the initial preference
/// read, the follow-up subscription, and the boot metric.
pub const BRIDGE_SCOPES: MessengerScopes = MessengerScopes {
    runtime: ScopeSpec {
        actions: &[],
        events: &[],
    },
    init: ScopeSpec {
        actions: &[
            preferences_actions::GET_STATE,
            metrics_actions::TRACK_EVENT,
        ],
        events: &[topics::PREFERENCES_STATE_CHANGE],
    },
};
