//! # Controller Events
//!
//! Defines all event types that flow through the shared bus. Event names
//! are `Namespace:eventName` strings; the namespace is the publishing
//! controller's name and is what restricted views check publish rights
//! against.

use serde::{Deserialize, Serialize};
use shared_types::{Address, PreferencesState};

/// Event name constants, usable in `const` allow-list declarations.
pub mod topics {
    /// Preference store state changed; payload is the full new state.
    pub const PREFERENCES_STATE_CHANGE: &str = "PreferencesController:stateChange";

    /// The permitted account set changed.
    pub const ACCOUNTS_CHANGED: &str = "AccountTrackerController:accountsChanged";

    /// The vault transitioned to locked.
    pub const VAULT_LOCKED: &str = "VaultController:locked";

    /// Bridge routing was enabled or disabled.
    pub const BRIDGE_STATUS_CHANGE: &str = "BridgeController:statusChange";
}

/// All events that can be published to the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControllerEvent {
    /// The preference store's state after a mutation.
    ///
    /// Carries the full state; subscribers diff the sub-fields they care
    /// about rather than reacting to every publish.
    PreferencesStateChange(PreferencesState),

    /// The permitted account set after a change.
    AccountsChanged(Vec<Address>),

    /// The vault locked; session-scoped secrets are gone.
    VaultLocked,

    /// Bridge routing availability after a toggle.
    BridgeStatusChange {
        /// Whether routing is now active.
        enabled: bool,
    },
}

impl ControllerEvent {
    /// The event's bus name, e.g. `PreferencesController:stateChange`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::PreferencesStateChange(_) => topics::PREFERENCES_STATE_CHANGE,
            Self::AccountsChanged(_) => topics::ACCOUNTS_CHANGED,
            Self::VaultLocked => topics::VAULT_LOCKED,
            Self::BridgeStatusChange { .. } => topics::BRIDGE_STATUS_CHANGE,
        }
    }

    /// The publishing controller's namespace (the part before `:`).
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        let name = self.name();
        name.split(':').next().unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_carry_the_publisher_namespace() {
        let event = ControllerEvent::PreferencesStateChange(PreferencesState::default());
        assert_eq!(event.name(), topics::PREFERENCES_STATE_CHANGE);
        assert_eq!(event.namespace(), "PreferencesController");
    }

    #[test]
    fn unit_events_have_names() {
        assert_eq!(ControllerEvent::VaultLocked.name(), topics::VAULT_LOCKED);
        assert_eq!(ControllerEvent::VaultLocked.namespace(), "VaultController");
    }
}
