//! # Host Runtime Entry Point
//!
//! One-shot bootstrap: load configuration, construct every controller in
//! the default order, report the aggregates, exit. The external layers
//! that consume the aggregates (request routing, durable storage, the
//! live UI projection) attach where this binary logs its summary.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use host_runtime::init::PlatformHooks;
use host_runtime::{
    default_entries, init_controllers, Environment, HostConfig, InitInput, InitOptions,
};
use shared_bus::Messenger;
use shared_types::{Address, MetricsRequest};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = HostConfig::from_env();
    config.validate().context("invalid host configuration")?;
    info!(chain_id = %config.network.chain_id, "Booting controller host");

    let chain_id = config.network.chain_id.clone();
    let environment = Environment {
        get_global_chain_id: Arc::new(move || chain_id.clone()),
        get_permitted_accounts: Arc::new(permitted_accounts),
        get_flat_state: Arc::new(|| serde_json::Value::Null),
        new_metrics_request: Arc::new(|event| MetricsRequest::new(event)),
        hooks: PlatformHooks {
            initial_locale: config.ui.initial_locale.clone(),
            ..PlatformHooks::default()
        },
    };

    let output = init_controllers(InitInput {
        base_messenger: Arc::new(Messenger::new()),
        initializers: default_entries(),
        persisted_state: BTreeMap::new(),
        environment,
        options: InitOptions {
            strict_keys: config.bootstrap.strict_keys,
        },
    })
    .context("controller bootstrap failed")?;

    info!("===========================================");
    info!("  CONTROLLER REGISTRY");
    info!("===========================================");
    for (name, controller) in &output.controllers_by_name {
        let persisted = output.controller_persisted_state.values().any(|entry| Arc::ptr_eq(entry, controller));
        let mem = output.controller_mem_state.values().any(|entry| Arc::ptr_eq(entry, controller));
        info!("  {name:28} persisted={persisted} mem={mem}");
    }
    info!(methods = output.controller_api.len(), "API surface aggregated");
    info!("===========================================");

    Ok(())
}

/// Permission layer stand-in for the demo binary: the host origin sees a
/// fixed development account.
fn permitted_accounts(origin: &str) -> Vec<Address> {
    if origin == host_runtime::adapters::accounts::HOST_ORIGIN {
        vec![Address::from("0x0000000000000000000000000000000000000001")]
    } else {
        Vec::new()
    }
}
