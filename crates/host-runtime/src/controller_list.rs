//! # Default Controller List
//!
//! The ordered name → initializer entries the host binary boots with.
//! Order is load-bearing: a later entry may read an earlier one through
//! the bus or `get_controller`, never the other way around. The
//! orchestrator does not check this; declaring a sound order here is
//! this module's job.

use crate::adapters::{
    account_tracker_init, BridgeControllerInit, MetricsControllerInit, PreferencesControllerInit,
    VaultControllerInit,
};
use crate::init::Initializer;

/// The default entries, in initialization order:
///
/// 1. Preferences: no upstream dependencies; everything else may read
///    it.
/// 2. Metrics: collects from later entries.
/// 3. Vault: platform hooks only.
/// 4. AccountTracker: environment accessors only.
/// 5. Bridge: reads Preferences and submits to Metrics during
///    bootstrap, so both must already be live.
#[must_use]
pub fn default_entries() -> Vec<(&'static str, Initializer)> {
    vec![
        (
            "PreferencesController",
            Initializer::object(PreferencesControllerInit),
        ),
        (
            "MetricsController",
            Initializer::object(MetricsControllerInit),
        ),
        ("VaultController", Initializer::object(VaultControllerInit)),
        (
            "AccountTrackerController",
            Initializer::function(account_tracker_init),
        ),
        ("BridgeController", Initializer::object(BridgeControllerInit)),
    ]
}
