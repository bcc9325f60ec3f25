//! Scopes for the preferences controller's bus views.

use shared_bus::{MessengerScopes, ScopeSpec};

/// The preference store answers actions and publishes events under its
/// own namespace only; neither view reaches anything foreign.
pub const PREFERENCES_SCOPES: MessengerScopes = MessengerScopes {
    runtime: ScopeSpec {
        actions: &[],
        events: &[],
    },
    init: ScopeSpec {
        actions: &[],
        events: &[],
    },
};
