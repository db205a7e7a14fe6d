//! Wires C10 (`secret_store::Config`) into a C1 `Cryptographer`. This is the
//! one place in the workspace that needs both crates' key types at once.

use secret_envelope::{Cryptographer, RootKey, RootKeyring};
use secret_store::Config;

/// Builds a `Cryptographer` from `config`'s current and retired root keys.
pub fn cryptographer_from_config(config: &Config) -> Cryptographer {
    let current = RootKey::new(config.current_root_key.kid.clone(), *config.current_root_key.bytes());
    let mut keyring = RootKeyring::new(current);
    for retired in &config.retired_root_keys {
        keyring.add_retired(RootKey::new(retired.kid.clone(), *retired.bytes()));
    }
    Cryptographer::with_keyring(keyring)
}
