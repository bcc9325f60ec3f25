//! # Controller Initializer Adapters
//!
//! One adapter per controller, each translating the generic
//! [`InitRequest`](crate::init::InitRequest) into that controller's
//! concrete constructor call and declaring its state-key and API
//! exposure. Adapters are the only place bootstrap-time cross-controller
//! wiring lives.

pub mod accounts;
pub mod bridge;
pub mod metrics;
pub mod preferences;
pub mod vault;

pub use accounts::account_tracker_init;
pub use bridge::BridgeControllerInit;
pub use metrics::MetricsControllerInit;
pub use preferences::PreferencesControllerInit;
pub use vault::VaultControllerInit;
