//! Local-account gateway.

use crate::error::Result;
use std::path::PathBuf;

/// The local credential-change primitive plus the keychain location for an
/// account. The engine uses `keychain_path` only to test existence and
/// recursively delete after a rotation.
pub trait LocalAccountGateway {
    fn change_password(&mut self, account: &str, new_password: &str) -> Result<()>;

    fn keychain_path(&self, account: &str) -> PathBuf;
}
