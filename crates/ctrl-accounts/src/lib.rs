//! # Account Tracker Controller
//!
//! Tracks the account set the host origin is permitted to see on the
//! global chain. The set is resolved once at construction from the
//! host's permission layer; later changes arrive through
//! [`AccountTrackerController::replace_accounts`].
//!
//! Balances and permission grants live elsewhere; everything here is
//! session-scoped, so the controller exposes memory state only.

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared_bus::{BusError, ControllerEvent, RestrictedMessenger};
use shared_types::{Address, ChainId, Controller};

/// Action names registered by this controller.
pub mod actions {
    /// Returns the tracked account list.
    pub const LIST_ACCOUNTS: &str = "AccountTrackerController:listAccounts";
}

/// Live account-tracking state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountTrackerState {
    /// Chain the accounts are tracked on.
    pub chain_id: ChainId,
    /// Accounts the host origin may see.
    pub accounts: Vec<Address>,
}

/// The account tracker.
pub struct AccountTrackerController {
    chain_id: ChainId,
    accounts: RwLock<Vec<Address>>,
    messenger: RestrictedMessenger,
}

impl AccountTrackerController {
    /// Construct the controller and register its bus actions.
    ///
    /// # Errors
    ///
    /// Fails if an action name is already taken on the bus.
    pub fn new(
        messenger: RestrictedMessenger,
        chain_id: ChainId,
        accounts: Vec<Address>,
    ) -> Result<Arc<Self>, BusError> {
        let controller = Arc::new(Self {
            chain_id,
            accounts: RwLock::new(accounts),
            messenger,
        });

        let for_list = Arc::clone(&controller);
        controller.messenger.register_action_handler(
            actions::LIST_ACCOUNTS,
            Arc::new(move |_payload| {
                serde_json::to_value(for_list.accounts())
                    .map_err(|err| BusError::handler(actions::LIST_ACCOUNTS, err.to_string()))
            }),
        )?;

        Ok(controller)
    }

    /// Accounts currently tracked.
    #[must_use]
    pub fn accounts(&self) -> Vec<Address> {
        self.accounts.read().clone()
    }

    /// Replace the tracked set and publish the change.
    ///
    /// # Errors
    ///
    /// Propagates a publish failure from the bus.
    pub fn replace_accounts(&self, accounts: Vec<Address>) -> Result<(), BusError> {
        {
            let mut current = self.accounts.write();
            if *current == accounts {
                return Ok(());
            }
            *current = accounts;
        }
        self.messenger
            .publish(&ControllerEvent::AccountsChanged(self.accounts()))?;
        Ok(())
    }
}

impl Controller for AccountTrackerController {
    fn name(&self) -> &'static str {
        "AccountTrackerController"
    }

    fn state(&self) -> Value {
        let snapshot = AccountTrackerState {
            chain_id: self.chain_id.clone(),
            accounts: self.accounts(),
        };
        serde_json::to_value(snapshot).unwrap_or(Value::Null)
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
