//! Scopes for the metrics controller's bus views.

use shared_bus::{MessengerScopes, ScopeSpec};

/// Metrics only receives submissions; it initiates nothing.
pub const METRICS_SCOPES: MessengerScopes = MessengerScopes {
    runtime: ScopeSpec {
        actions: &[],
        events: &[],
    },
    init: ScopeSpec {
        actions: &[],
        events: &[],
    },
};
