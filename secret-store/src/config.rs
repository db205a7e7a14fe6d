//! C10 — Config: root key material, key id, and database connection
//! settings. Never logs key bytes.

use std::fmt;

use zeroize::Zeroizing;

/// 32 raw root key bytes plus the key id they're installed under.
pub struct RootKeyConfig {
    pub kid: String,
    bytes: Zeroizing<[u8; 32]>,
}

impl RootKeyConfig {
    pub fn new(kid: impl Into<String>, bytes: [u8; 32]) -> Self {
        Self {
            kid: kid.into(),
            bytes: Zeroizing::new(bytes),
        }
    }

    pub fn bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl fmt::Debug for RootKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootKeyConfig").field("kid", &self.kid).finish_non_exhaustive()
    }
}

/// Environment inputs the core consumes (spec.md §6): root key, key id,
/// database URL. Constructed from explicit values; `from_env` is a
/// convenience constructor for local/dev embedding — it does not become the
/// only way to build a `Config`, since parsing environment variables
/// generally belongs to the out-of-scope bootstrap layer.
pub struct Config {
    pub current_root_key: RootKeyConfig,
    pub retired_root_keys: Vec<RootKeyConfig>,
    pub database_url: String,
}

impl Config {
    pub fn new(current_root_key: RootKeyConfig, database_url: impl Into<String>) -> Self {
        Self {
            current_root_key,
            retired_root_keys: Vec::new(),
            database_url: database_url.into(),
        }
    }

    pub fn with_retired_key(mut self, retired: RootKeyConfig) -> Self {
        self.retired_root_keys.push(retired);
        self
    }

    /// Reads `SECRET_CORE_ROOT_KEY_HEX`, `SECRET_CORE_ROOT_KEY_ID`, and
    /// `SECRET_CORE_DATABASE_URL`. Retired keys are not recoverable from
    /// the environment this way; install them via `with_retired_key`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let hex_key = std::env::var("SECRET_CORE_ROOT_KEY_HEX")
            .map_err(|_| ConfigError::Missing("SECRET_CORE_ROOT_KEY_HEX"))?;
        let kid = std::env::var("SECRET_CORE_ROOT_KEY_ID")
            .map_err(|_| ConfigError::Missing("SECRET_CORE_ROOT_KEY_ID"))?;
        let database_url = std::env::var("SECRET_CORE_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("SECRET_CORE_DATABASE_URL"))?;

        let bytes = hex::decode(&hex_key).map_err(|_| ConfigError::InvalidRootKey)?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| ConfigError::InvalidRootKey)?;

        Ok(Self::new(RootKeyConfig::new(kid, bytes), database_url))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("current_root_key", &self.current_root_key)
            .field("retired_root_key_count", &self.retired_root_keys.len())
            .field("database_url", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    InvalidRootKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "missing environment variable: {}", var),
            Self::InvalidRootKey => write!(f, "root key must be 32 bytes of hex"),
        }
    }
}

impl std::error::Error for ConfigError {}
