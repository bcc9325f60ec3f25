//! # Vault Controller
//!
//! Owns the keyrings holding account secrets and the locked/unlocked
//! session state. The host injects the pieces that vary per platform:
//! extra keyring builders beyond the built-in set, an optional state
//! encryptor for the persisted snapshot, and a lock-session callback the
//! host uses to tear down session UI when the vault locks.
//!
//! Only the (optionally encrypted) vault snapshot is persisted; nothing
//! here is exposed as live memory state.

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use shared_bus::{BusError, ControllerEvent, RestrictedMessenger};
use shared_types::{Address, Controller};

/// Callback the host supplies to be told when the session locks.
pub type LockSessionHook = Arc<dyn Fn() + Send + Sync>;

/// Errors raised by vault operations.
#[derive(Debug, Clone, Error)]
pub enum VaultError {
    /// The injected encryptor failed.
    #[error("Vault encryption failed: {0}")]
    Encryption(String),
}

/// Encrypts the persisted vault snapshot.
pub trait StateEncryptor: Send + Sync {
    /// Encrypt `plaintext` into an opaque ciphertext string.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Encryption`] when the backend fails.
    fn encrypt(&self, plaintext: &Value) -> Result<String, VaultError>;
}

/// A keyring: one signing backend holding zero or more accounts.
pub trait Keyring: Send + Sync {
    /// Backend kind, e.g. `HD Key Tree`.
    fn kind(&self) -> &'static str;

    /// Accounts currently derived by this keyring.
    fn accounts(&self) -> Vec<Address>;
}

/// Builds one keyring kind on demand.
#[derive(Clone)]
pub struct KeyringBuilder {
    /// Kind of the keyring this builder produces.
    pub kind: &'static str,
    /// Constructor for a fresh keyring of this kind.
    pub build: Arc<dyn Fn() -> Box<dyn Keyring> + Send + Sync>,
}

impl KeyringBuilder {
    /// Builder for the built-in software keyring.
    #[must_use]
    pub fn hd_key_tree() -> Self {
        Self {
            kind: HdKeyring::KIND,
            build: Arc::new(|| Box::new(HdKeyring::default())),
        }
    }
}

/// Built-in software keyring.
#[derive(Default)]
struct HdKeyring {
    accounts: Vec<Address>,
}

impl HdKeyring {
    const KIND: &'static str = "HD Key Tree";
}

impl Keyring for HdKeyring {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn accounts(&self) -> Vec<Address> {
        self.accounts.clone()
    }
}

/// The vault.
pub struct VaultController {
    locked: RwLock<bool>,
    keyrings: Vec<Box<dyn Keyring>>,
    encryptor: Option<Arc<dyn StateEncryptor>>,
    lock_session: Option<LockSessionHook>,
    messenger: RestrictedMessenger,
}

impl VaultController {
    /// Construct the vault from the built-in keyring set plus the host's
    /// overrides.
    #[must_use]
    pub fn new(
        messenger: RestrictedMessenger,
        extra_keyring_builders: Vec<KeyringBuilder>,
        encryptor: Option<Arc<dyn StateEncryptor>>,
        lock_session: Option<LockSessionHook>,
    ) -> Arc<Self> {
        let mut builders = vec![KeyringBuilder::hd_key_tree()];
        builders.extend(extra_keyring_builders);

        let keyrings = builders
            .iter()
            .map(|builder| (builder.build)())
            .collect::<Vec<_>>();
        info!(keyrings = keyrings.len(), "Vault keyrings constructed");

        Arc::new(Self {
            locked: RwLock::new(true),
            keyrings,
            encryptor,
            lock_session,
            messenger,
        })
    }

    /// Whether the vault is locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        *self.locked.read()
    }

    /// Unlock the session.
    pub fn unlock(&self) {
        *self.locked.write() = false;
    }

    /// Lock the session, publish the event, and notify the host.
    ///
    /// # Errors
    ///
    /// Propagates a publish failure from the bus.
    pub fn lock(&self) -> Result<(), BusError> {
        {
            let mut locked = self.locked.write();
            if *locked {
                return Ok(());
            }
            *locked = true;
        }
        info!("Vault locked");
        self.messenger.publish(&ControllerEvent::VaultLocked)?;
        if let Some(hook) = &self.lock_session {
            hook();
        }
        Ok(())
    }

    /// Kinds of the keyrings the vault carries.
    #[must_use]
    pub fn keyring_kinds(&self) -> Vec<&'static str> {
        self.keyrings.iter().map(|keyring| keyring.kind()).collect()
    }

    fn plaintext_snapshot(&self) -> Value {
        json!({
            "locked": self.is_locked(),
            "keyrings": self.keyring_kinds(),
        })
    }
}

impl Controller for VaultController {
    fn name(&self) -> &'static str {
        "VaultController"
    }

    fn state(&self) -> Value {
        let snapshot = self.plaintext_snapshot();
        match &self.encryptor {
            Some(encryptor) => match encryptor.encrypt(&snapshot) {
                Ok(ciphertext) => json!({ "vault": ciphertext }),
                Err(err) => {
                    warn!(error = %err, "Vault snapshot encryption failed");
                    Value::Null
                }
            },
            None => snapshot,
        }
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{topics, Messenger, ScopeSpec};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn messenger(bus: &Arc<Messenger>) -> RestrictedMessenger {
        bus.restricted("VaultController", ScopeSpec::default())
    }

    #[test]
    fn lock_notifies_host_once() {
        let bus = Arc::new(Messenger::new());
        let lock_calls = Arc::new(AtomicUsize::new(0));

        let hook_calls = Arc::clone(&lock_calls);
        let vault = VaultController::new(
            messenger(&bus),
            Vec::new(),
            None,
            Some(Arc::new(move || {
                hook_calls.fetch_add(1, Ordering::SeqCst);
            })),
        );

        vault.unlock();
        vault.lock().expect("lock");
        vault.lock().expect("redundant lock");

        assert!(vault.is_locked());
        assert_eq!(lock_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lock_publishes_event() {
        let bus = Arc::new(Messenger::new());
        let published = Arc::new(AtomicUsize::new(0));

        let sink = Arc::clone(&published);
        bus.subscribe(
            topics::VAULT_LOCKED,
            Arc::new(move |_| {
                sink.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let vault = VaultController::new(messenger(&bus), Vec::new(), None, None);
        vault.unlock();
        vault.lock().expect("lock");

        assert_eq!(published.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn extra_keyring_builders_extend_the_builtin_set() {
        struct TestKeyring;
        impl Keyring for TestKeyring {
            fn kind(&self) -> &'static str {
                "Test Device"
            }
            fn accounts(&self) -> Vec<Address> {
                vec![Address::from("0xhw")]
            }
        }

        let bus = Arc::new(Messenger::new());
        let vault = VaultController::new(
            messenger(&bus),
            vec![KeyringBuilder {
                kind: "Test Device",
                build: Arc::new(|| Box::new(TestKeyring)),
            }],
            None,
            None,
        );

        assert_eq!(vault.keyring_kinds(), vec!["HD Key Tree", "Test Device"]);
    }

    #[test]
    fn snapshot_is_encrypted_when_an_encryptor_is_injected() {
        struct Rot13;
        impl StateEncryptor for Rot13 {
            fn encrypt(&self, plaintext: &Value) -> Result<String, VaultError> {
                Ok(format!("enc:{plaintext}"))
            }
        }

        let bus = Arc::new(Messenger::new());
        let vault = VaultController::new(messenger(&bus), Vec::new(), Some(Arc::new(Rot13)), None);

        let state = Controller::state(&*vault);
        let ciphertext = state["vault"].as_str().expect("ciphertext");
        assert!(ciphertext.starts_with("enc:"));
    }
}
