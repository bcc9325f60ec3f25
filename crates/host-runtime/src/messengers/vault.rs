//! Scopes for the vault controller's bus views.

use shared_bus::{MessengerScopes, ScopeSpec};

/// The vault publishes its lock event under its own namespace and reads
/// nothing from other controllers.
pub const VAULT_SCOPES: MessengerScopes = MessengerScopes {
    runtime: ScopeSpec {
        actions: &[],
        events: &[],
    },
    init: ScopeSpec {
        actions: &[],
        events: &[],
    },
};
