//! End-to-end bootstrap tests over the real controller list.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use ctrl_bridge::BridgeController;
use ctrl_metrics::MetricsController;
use ctrl_preferences::PreferencesController;
use ctrl_vault::{StateEncryptor, VaultError};
use host_runtime::init::{downcast_controller, PlatformHooks};
use host_runtime::{
    default_entries, init_controllers, Environment, InitInput, InitOptions, InitOutput,
    InitResult, Initializer,
};
use shared_bus::{BusError, Messenger};
use shared_types::{Controller, PreferencesState};

fn call_api(output: &InitOutput, method: &str, params: Value) -> Value {
    let callable = output
        .controller_api
        .get(method)
        .unwrap_or_else(|| panic!("missing api method {method}"));
    callable.as_ref()(params).unwrap_or_else(|err| panic!("{method} failed: {err}"))
}

fn boot(
    persisted_state: BTreeMap<String, Value>,
    environment: Environment,
) -> InitOutput {
    init_controllers(InitInput {
        base_messenger: Arc::new(Messenger::new()),
        initializers: default_entries(),
        persisted_state,
        environment,
        options: InitOptions::default(),
    })
    .expect("bootstrap")
}

fn persisted_preferences(smart_routing_enabled: bool) -> BTreeMap<String, Value> {
    let mut blob = BTreeMap::new();
    blob.insert(
        "PreferencesController".to_string(),
        json!({
            "locale": "en",
            "smart_routing_enabled": smart_routing_enabled,
            "use_external_services": true,
        }),
    );
    blob
}

#[tokio::test]
async fn default_boot_produces_the_full_registry() {
    let output = boot(BTreeMap::new(), Environment::default());

    let names: Vec<&str> = output
        .controllers_by_name
        .values()
        .map(|controller| controller.name())
        .collect();
    assert_eq!(output.controllers_by_name.len(), 5);
    for name in [
        "PreferencesController",
        "MetricsController",
        "VaultController",
        "AccountTrackerController",
        "BridgeController",
    ] {
        assert!(names.contains(&name), "missing {name}");
    }

    // Persisted: accounts suppressed, metrics under its legacy key.
    assert!(output.controller_persisted_state.contains_key("PreferencesController"));
    assert!(output.controller_persisted_state.contains_key("AnalyticsController"));
    assert!(output.controller_persisted_state.contains_key("VaultController"));
    assert!(output.controller_persisted_state.contains_key("BridgeController"));
    assert!(!output.controller_persisted_state.contains_key("AccountTrackerController"));
    assert!(!output.controller_persisted_state.contains_key("MetricsController"));

    // Memory: vault suppressed, everything else under its own name.
    assert!(output.controller_mem_state.contains_key("PreferencesController"));
    assert!(output.controller_mem_state.contains_key("MetricsController"));
    assert!(output.controller_mem_state.contains_key("AccountTrackerController"));
    assert!(output.controller_mem_state.contains_key("BridgeController"));
    assert!(!output.controller_mem_state.contains_key("VaultController"));

    // Both maps reference the same instance.
    assert!(Arc::ptr_eq(
        &output.controller_persisted_state["PreferencesController"],
        &output.controller_mem_state["PreferencesController"],
    ));

    for method in [
        "getPreferences",
        "setSmartRoutingEnabled",
        "setLocale",
        "setParticipateInMetrics",
        "setLocked",
        "isLocked",
        "listAccounts",
        "getBridgeStatus",
    ] {
        assert!(output.controller_api.contains_key(method), "missing {method}");
    }
}

#[tokio::test]
async fn bridge_follows_the_routing_preference() {
    let output = boot(BTreeMap::new(), Environment::default());
    let bridge = downcast_controller::<BridgeController>(
        &output.controllers_by_name["BridgeController"],
    )
    .expect("typed bridge");

    assert!(!bridge.is_enabled());

    call_api(&output, "setSmartRoutingEnabled", Value::Bool(true));
    assert!(bridge.is_enabled());
    assert_eq!(bridge.activation_count(), 1);

    // Re-applying the same preference must not re-toggle.
    call_api(&output, "setSmartRoutingEnabled", Value::Bool(true));
    assert_eq!(bridge.activation_count(), 1);

    // Unrelated preference churn republishes the full state; the wiring
    // diffs only the routing flag and must stay quiet.
    call_api(&output, "setLocale", Value::String("fr".to_string()));
    assert_eq!(bridge.activation_count(), 1);
    assert_eq!(bridge.deactivation_count(), 0);

    call_api(&output, "setSmartRoutingEnabled", Value::Bool(false));
    assert!(!bridge.is_enabled());
    assert_eq!(bridge.deactivation_count(), 1);
}

#[tokio::test]
async fn bridge_survives_a_failing_preference_read() {
    // Stand-in preference store whose getState always fails.
    struct BrokenPreferences;
    impl Controller for BrokenPreferences {
        fn name(&self) -> &'static str {
            "PreferencesController"
        }
        fn state(&self) -> Value {
            Value::Null
        }
        fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    let broken_preferences = Initializer::function(|request| {
        request.controller_messenger.register_action_handler(
            ctrl_preferences::actions::GET_STATE,
            Arc::new(|_| {
                Err(BusError::handler(
                    ctrl_preferences::actions::GET_STATE,
                    "capability check failed",
                ))
            }),
        )?;
        Ok(InitResult::new(Arc::new(BrokenPreferences)))
    });

    let mut initializers = default_entries();
    initializers[0] = ("PreferencesController", broken_preferences);

    let output = init_controllers(InitInput {
        base_messenger: Arc::new(Messenger::new()),
        initializers,
        persisted_state: BTreeMap::new(),
        environment: Environment::default(),
        options: InitOptions::default(),
    })
    .expect("bootstrap must survive the failed read");

    let bridge = downcast_controller::<BridgeController>(
        &output.controllers_by_name["BridgeController"],
    )
    .expect("typed bridge");
    assert!(!bridge.is_enabled(), "fallback condition is disabled");
}

#[tokio::test]
async fn persisted_opt_in_enables_routing_and_lands_a_boot_metric() {
    let output = boot(persisted_preferences(true), Environment::default());

    let bridge = downcast_controller::<BridgeController>(
        &output.controllers_by_name["BridgeController"],
    )
    .expect("typed bridge");
    assert!(bridge.is_enabled());

    let metrics = downcast_controller::<MetricsController>(
        &output.controllers_by_name["MetricsController"],
    )
    .expect("typed metrics");
    assert_eq!(metrics.events_tracked(), 1);
    let event = metrics.last_event().expect("boot metric");
    assert_eq!(event.event, "Bridge Routing Resolved");
    assert_eq!(event.properties["enabled"], json!(true));
}

#[tokio::test]
async fn flat_state_kill_switch_overrides_the_opt_in() {
    let environment = Environment {
        get_flat_state: Arc::new(|| json!({ "featureFlags": { "bridgeRouting": false } })),
        ..Environment::default()
    };
    let output = boot(persisted_preferences(true), environment);

    let bridge = downcast_controller::<BridgeController>(
        &output.controllers_by_name["BridgeController"],
    )
    .expect("typed bridge");
    assert!(!bridge.is_enabled());

    // Toggling the preference keeps the switch dark.
    call_api(&output, "setSmartRoutingEnabled", Value::Bool(false));
    call_api(&output, "setSmartRoutingEnabled", Value::Bool(true));
    assert!(!bridge.is_enabled());
    assert_eq!(bridge.activation_count(), 0);
}

#[tokio::test]
async fn platform_hooks_reach_their_controllers() {
    struct PrefixEncryptor;
    impl StateEncryptor for PrefixEncryptor {
        fn encrypt(&self, plaintext: &Value) -> Result<String, VaultError> {
            Ok(format!("sealed:{plaintext}"))
        }
    }

    let lock_calls = Arc::new(AtomicUsize::new(0));
    let hook_calls = Arc::clone(&lock_calls);

    let environment = Environment {
        hooks: PlatformHooks {
            initial_locale: Some("de".to_string()),
            lock_session: Some(Arc::new(move || {
                hook_calls.fetch_add(1, Ordering::SeqCst);
            })),
            encryptor: Some(Arc::new(PrefixEncryptor)),
            keyring_builders: Vec::new(),
        },
        ..Environment::default()
    };
    let output = boot(BTreeMap::new(), environment);

    let preferences = downcast_controller::<PreferencesController>(
        &output.controllers_by_name["PreferencesController"],
    )
    .expect("typed preferences");
    assert_eq!(preferences.get_state().locale, "de");

    // The persisted vault snapshot goes through the injected encryptor.
    let vault_state = output.controller_persisted_state["VaultController"].state();
    let ciphertext = vault_state["vault"].as_str().expect("ciphertext");
    assert!(ciphertext.starts_with("sealed:"));

    let state: PreferencesState =
        serde_json::from_value(call_api(&output, "getPreferences", Value::Null)).expect("state");
    assert_eq!(state.locale, "de");

    // Locking through the aggregated API reaches the host callback.
    // The vault boots locked, so unlock first.
    let vault = downcast_controller::<ctrl_vault::VaultController>(
        &output.controllers_by_name["VaultController"],
    )
    .expect("typed vault");
    vault.unlock();
    call_api(&output, "setLocked", Value::Null);
    assert_eq!(lock_calls.load(Ordering::SeqCst), 1);
}
