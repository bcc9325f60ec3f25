//! Vault controller initializer.

use std::sync::Arc;

use serde_json::{json, Value};

use ctrl_vault::VaultController;
use shared_bus::MessengerScopes;
use shared_types::Controller;

use crate::error::InitError;
use crate::init::{downcast_controller, ApiMap, ApiMethod, ControllerInit, InitRequest, StateKey};
use crate::messengers::VAULT_SCOPES;

/// Bootstrap adapter for [`VaultController`].
///
/// The vault is where the platform hooks land: keyring overrides, the
/// snapshot encryptor, and the lock-session callback all come straight
/// out of the environment.
pub struct VaultControllerInit;

impl ControllerInit for VaultControllerInit {
    fn init(&self, request: InitRequest) -> Result<Arc<dyn Controller>, InitError> {
        let hooks = &request.environment.hooks;
        let controller = VaultController::new(
            request.controller_messenger,
            hooks.keyring_builders.clone(),
            hooks.encryptor.clone(),
            hooks.lock_session.clone(),
        );
        Ok(controller)
    }

    fn api(&self, controller: &Arc<dyn Controller>) -> ApiMap {
        let mut api = ApiMap::new();
        let Some(vault) = downcast_controller::<VaultController>(controller) else {
            return api;
        };

        let for_lock = Arc::clone(&vault);
        api.insert(
            "setLocked".to_string(),
            Arc::new(move |_params: Value| {
                for_lock.lock()?;
                Ok(Value::Null)
            }) as ApiMethod,
        );

        api.insert(
            "isLocked".to_string(),
            Arc::new(move |_params| Ok(json!(vault.is_locked()))) as ApiMethod,
        );

        api
    }

    /// Session lock state never leaves the process.
    fn mem_state_key(&self, _controller: &Arc<dyn Controller>) -> StateKey {
        StateKey::Skip
    }

    fn messenger_scopes(&self) -> MessengerScopes {
        VAULT_SCOPES
    }
}
