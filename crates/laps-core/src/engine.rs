//! Rotation policy engine.
//!
//! One invocation is one pass through `CHECKING → {NOT_DUE, ROTATING} →
//! {DONE, FAILED}`. The engine owns the settings for the invocation and
//! borrows both gateways; "now" is captured once at construction so every
//! decision in the pass sees the same instant.

use crate::account::LocalAccountGateway;
use crate::directory::{DirectoryGateway, EXPIRATION_ATTRIBUTE, PASSWORD_ATTRIBUTE};
use crate::error::{LapsError, Result};
use crate::filetime;
use crate::password;
use crate::settings::{Settings, FORCE_ROTATION};
use chrono::{DateTime, Duration, Utc};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// Stored expiration is still in the future; nothing was touched.
    NotDue { expires: DateTime<Utc> },
    /// Password rotated everywhere; `expires` is the new expiration.
    Rotated { expires: DateTime<Utc> },
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct RotationEngine<'a, D: DirectoryGateway, L: LocalAccountGateway> {
    directory: &'a mut D,
    local: &'a mut L,
    settings: Settings,
    now: DateTime<Utc>,
}

impl<'a, D: DirectoryGateway, L: LocalAccountGateway> RotationEngine<'a, D, L> {
    pub fn new(
        directory: &'a mut D,
        local: &'a mut L,
        settings: Settings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            directory,
            local,
            settings,
            now,
        }
    }

    /// Run one check-and-rotate pass. At most one rotation happens per call.
    ///
    /// The rotation order is fixed: directory password write, local account
    /// change, expiration write, keychain removal, force-flag clear. There is
    /// no rollback — a failure after the directory write leaves directory and
    /// host out of sync until the next scheduled pass rotates again.
    pub fn run(mut self) -> Result<RotationOutcome> {
        let expires = self.stored_expiration();

        if expires >= self.now {
            tracing::info!(expires = %expires, "password not yet expired");
            return Ok(RotationOutcome::NotDue { expires });
        }

        tracing::info!(expired = %expires, "password expired, rotating");
        self.rotate()
    }

    /// CHECKING: resolve the stored expiration. A missing or unreadable
    /// attribute, an unparseable value, or a set force flag all collapse to
    /// the never-rotated sentinel, which predates any realistic "now" and so
    /// always triggers rotation.
    fn stored_expiration(&self) -> DateTime<Utc> {
        // Sentinel decode is infallible: the constant is pinned by tests.
        let sentinel = filetime::decode_ticks(filetime::NEVER_SET_TICKS)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        if self.settings.force_rotation() {
            tracing::info!("force_rotation set, forcing password change");
            return sentinel;
        }

        match self.directory.read_attribute(EXPIRATION_ATTRIBUTE) {
            Ok(Some(raw)) => match filetime::decode(&raw) {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!("stored expiration unreadable ({e}), treating as never rotated");
                    sentinel
                }
            },
            Ok(None) => {
                tracing::info!("no expiration on record, treating as never rotated");
                sentinel
            }
            Err(e) => {
                tracing::warn!("expiration read failed ({e}), treating as never rotated");
                sentinel
            }
        }
    }

    /// ROTATING: every step must succeed to reach DONE.
    fn rotate(&mut self) -> Result<RotationOutcome> {
        let account = self.settings.account_name();
        let new_password = password::generate(
            self.settings.password_length(),
            self.settings.complex_password(),
        )?;

        self.directory
            .write_attribute(PASSWORD_ATTRIBUTE, &new_password)
            .map_err(|e| LapsError::rotation_step("write directory password", e))?;

        self.local
            .change_password(&account, &new_password)
            .map_err(|e| LapsError::rotation_step("change local password", e))?;
        tracing::info!(%account, "local password changed");

        let expires = self.now + Duration::days(self.settings.expiration_days());
        self.directory
            .write_attribute(EXPIRATION_ATTRIBUTE, &filetime::encode(expires))
            .map_err(|e| LapsError::rotation_step("write expiration", e))?;

        if self.settings.remove_keychain() {
            self.remove_keychain(&account)?;
        }

        // The rotation itself is complete; a failed flag clear only means the
        // next pass may rotate again early.
        if let Err(e) = self.settings.set(FORCE_ROTATION, false.into()) {
            tracing::warn!("rotation succeeded but force_rotation clear did not persist: {e}");
        }

        tracing::info!(expires = %expires, "rotation complete");
        Ok(RotationOutcome::Rotated { expires })
    }

    /// Missing keychain directory is a no-op, not an error.
    fn remove_keychain(&self, account: &str) -> Result<()> {
        let path = self.local.keychain_path(account);
        if !path.exists() {
            return Ok(());
        }
        std::fs::remove_dir_all(&path)
            .map_err(|e| LapsError::rotation_step("remove keychain", e))?;
        tracing::info!(path = %path.display(), "keychain removed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
