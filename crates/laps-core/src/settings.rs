//! Persisted rotation policy settings.
//!
//! A single YAML document at a well-known path holds operator overrides.
//! Resolution is three-tier: persisted override, then built-in default, then
//! absent. Absence is a valid outcome, never an error. The store is read once
//! per invocation and rewritten atomically after every mutation; unknown keys
//! round-trip untouched because the document is kept as an untyped map.

use crate::error::{LapsError, Result};
use crate::io;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Recognized keys
// ---------------------------------------------------------------------------

pub const ACCOUNT_NAME: &str = "account_name";
pub const PASSWORD_LENGTH: &str = "password_length";
pub const EXPIRATION_DAYS: &str = "expiration_days";
pub const REMOVE_KEYCHAIN: &str = "remove_keychain";
pub const COMPLEX_PASSWORD: &str = "complex_password";
pub const FORCE_ROTATION: &str = "force_rotation";

/// Expiration windows beyond a century are treated as misconfiguration and
/// fall back to the built-in default; this also keeps the expiration
/// arithmetic well inside chrono's representable range.
pub const MAX_EXPIRATION_DAYS: i64 = 36_500;

const RECOGNIZED_KEYS: &[&str] = &[
    ACCOUNT_NAME,
    PASSWORD_LENGTH,
    EXPIRATION_DAYS,
    REMOVE_KEYCHAIN,
    COMPLEX_PASSWORD,
    FORCE_ROTATION,
];

fn default_for(key: &str) -> Option<Value> {
    match key {
        ACCOUNT_NAME => Some(Value::from("admin")),
        PASSWORD_LENGTH => Some(Value::from(14u64)),
        EXPIRATION_DAYS => Some(Value::from(30u64)),
        REMOVE_KEYCHAIN => Some(Value::from(true)),
        COMPLEX_PASSWORD => Some(Value::from(true)),
        FORCE_ROTATION => Some(Value::from(false)),
        _ => None,
    }
}

fn defaults() -> BTreeMap<String, Value> {
    RECOGNIZED_KEYS
        .iter()
        .filter_map(|k| default_for(k).map(|v| (k.to_string(), v)))
        .collect()
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Settings {
    overrides: BTreeMap<String, Value>,
    path: PathBuf,
}

impl Settings {
    /// Load the settings store. Never fails: a missing or unparseable store
    /// self-heals to the full built-in default set, which is written back out
    /// so the next read finds a valid document.
    pub fn load(path: &Path) -> Self {
        let parsed = std::fs::read_to_string(path)
            .ok()
            .and_then(|data| serde_yaml::from_str::<BTreeMap<String, Value>>(&data).ok());

        match parsed {
            Some(overrides) => Self {
                overrides,
                path: path.to_path_buf(),
            },
            None => {
                tracing::warn!(
                    path = %path.display(),
                    "settings store missing or unreadable, restoring defaults"
                );
                let settings = Self {
                    overrides: defaults(),
                    path: path.to_path_buf(),
                };
                if let Err(e) = settings.save() {
                    tracing::warn!("could not write default settings: {e}");
                }
                settings
            }
        }
    }

    /// Resolve `key`: persisted override, else built-in default, else `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.overrides
            .get(key)
            .cloned()
            .or_else(|| default_for(key))
    }

    /// Insert `key` and immediately persist the whole document. On a write
    /// failure the in-memory value is kept (now out of sync with the store);
    /// callers decide whether that is fatal.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.overrides.insert(key.to_string(), value);
        self.save()
    }

    fn save(&self) -> Result<()> {
        let data = serde_yaml::to_string(&self.overrides).map_err(|e| {
            LapsError::Persistence {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;
        io::atomic_write(&self.path, data.as_bytes()).map_err(|e| LapsError::Persistence {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    // -----------------------------------------------------------------------
    // Typed accessors
    //
    // A type-mismatched or out-of-range override falls back to the built-in
    // default rather than erroring: resolution never fails.
    // -----------------------------------------------------------------------

    pub fn account_name(&self) -> String {
        self.get(ACCOUNT_NAME)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "admin".to_string())
    }

    pub fn password_length(&self) -> u32 {
        self.get(PASSWORD_LENGTH)
            .and_then(|v| v.as_u64())
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(14)
    }

    pub fn expiration_days(&self) -> i64 {
        self.get(EXPIRATION_DAYS)
            .and_then(|v| v.as_u64())
            .and_then(|n| i64::try_from(n).ok())
            .filter(|n| (0..=MAX_EXPIRATION_DAYS).contains(n))
            .unwrap_or(30)
    }

    pub fn remove_keychain(&self) -> bool {
        self.get(REMOVE_KEYCHAIN)
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }

    pub fn complex_password(&self) -> bool {
        self.get(COMPLEX_PASSWORD)
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }

    pub fn force_rotation(&self) -> bool {
        self.get(FORCE_ROTATION)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> PathBuf {
        dir.path().join("settings.yaml")
    }

    #[test]
    fn missing_store_self_heals_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir);
        let settings = Settings::load(&path);

        assert!(path.exists(), "defaults should have been written out");
        assert_eq!(settings.account_name(), "admin");
        assert_eq!(settings.password_length(), 14);
        assert_eq!(settings.expiration_days(), 30);
        assert!(settings.remove_keychain());
        assert!(settings.complex_password());
        assert!(!settings.force_rotation());
    }

    #[test]
    fn corrupt_store_self_heals_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir);
        std::fs::write(&path, ": not [ valid yaml").unwrap();

        let settings = Settings::load(&path);
        assert_eq!(settings.account_name(), "admin");

        // The healed document must parse on the next read.
        let reloaded = Settings::load(&path);
        assert_eq!(reloaded.password_length(), 14);
    }

    #[test]
    fn override_takes_precedence_over_default() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir);
        std::fs::write(&path, "account_name: svcadmin\npassword_length: 20\n").unwrap();

        let settings = Settings::load(&path);
        assert_eq!(settings.account_name(), "svcadmin");
        assert_eq!(settings.password_length(), 20);
        // Keys without overrides resolve to built-in defaults.
        assert_eq!(settings.expiration_days(), 30);
    }

    #[test]
    fn unrecognized_key_resolves_to_none() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(&store(&dir));
        assert!(settings.get("no_such_key").is_none());
    }

    #[test]
    fn set_persists_immediately() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir);
        let mut settings = Settings::load(&path);

        settings.set(FORCE_ROTATION, Value::from(true)).unwrap();
        assert!(settings.force_rotation());

        let reloaded = Settings::load(&path);
        assert!(reloaded.force_rotation());
    }

    #[test]
    fn set_preserves_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir);
        std::fs::write(&path, "custom_site_tag: hq-fleet\naccount_name: admin\n").unwrap();

        let mut settings = Settings::load(&path);
        settings.set(FORCE_ROTATION, Value::from(true)).unwrap();

        let reloaded = Settings::load(&path);
        assert_eq!(
            reloaded.get("custom_site_tag"),
            Some(Value::from("hq-fleet"))
        );
    }

    #[test]
    fn out_of_range_expiration_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir);
        std::fs::write(&path, "expiration_days: 999999999\n").unwrap();
        assert_eq!(Settings::load(&path).expiration_days(), 30);

        std::fs::write(&path, "expiration_days: -5\n").unwrap();
        assert_eq!(Settings::load(&path).expiration_days(), 30);
    }

    #[test]
    fn century_expiration_window_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir);
        std::fs::write(&path, &format!("expiration_days: {MAX_EXPIRATION_DAYS}\n")).unwrap();
        assert_eq!(Settings::load(&path).expiration_days(), MAX_EXPIRATION_DAYS);
    }

    #[test]
    fn oversized_password_length_falls_back_to_default() {
        // 2^32 + 3 would silently truncate to 3 under a plain cast.
        let dir = TempDir::new().unwrap();
        let path = store(&dir);
        std::fs::write(&path, "password_length: 4294967299\n").unwrap();
        assert_eq!(Settings::load(&path).password_length(), 14);
    }

    #[test]
    fn type_mismatched_override_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir);
        std::fs::write(&path, "password_length: fourteen\n").unwrap();

        let settings = Settings::load(&path);
        assert_eq!(settings.password_length(), 14);
    }
}
