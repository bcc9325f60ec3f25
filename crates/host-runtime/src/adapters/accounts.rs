//! Account tracker initializer.
//!
//! Function-shaped: the tracker has no optional hooks beyond its state
//! keys, so the plain-function variant of the contract is enough. It
//! declares no messenger scopes and stays inside its own namespace.

use std::sync::Arc;

use serde_json::Value;

use ctrl_accounts::AccountTrackerController;

use crate::error::InitError;
use crate::init::{ApiMap, ApiMethod, InitRequest, InitResult, StateKey};

/// Origin the host itself queries permissions under.
pub const HOST_ORIGIN: &str = "host";

/// Bootstrap adapter for [`AccountTrackerController`].
///
/// Tracking data is session-scoped: the memory-state entry registers
/// under the controller's own name while persistence is suppressed.
///
/// # Errors
///
/// Fails when the controller cannot register its bus actions.
pub fn account_tracker_init(request: InitRequest) -> Result<InitResult, InitError> {
    let chain_id = (request.environment.get_global_chain_id)();
    let accounts = (request.environment.get_permitted_accounts)(HOST_ORIGIN);

    let controller =
        AccountTrackerController::new(request.controller_messenger, chain_id, accounts)?;

    let mut api = ApiMap::new();
    let for_list = Arc::clone(&controller);
    api.insert(
        "listAccounts".to_string(),
        Arc::new(move |_params: Value| Ok(serde_json::to_value(for_list.accounts())?)) as ApiMethod,
    );

    Ok(InitResult::new(controller)
        .with_api(api)
        .persisted_under(StateKey::Skip))
}
