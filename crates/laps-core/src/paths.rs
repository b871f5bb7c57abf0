use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Well-known locations
// ---------------------------------------------------------------------------

/// Settings store, relative to the filesystem root.
pub const SETTINGS_FILE: &str = "etc/laps/settings.yaml";

/// Per-user keychain directory, relative to the user's home.
pub const KEYCHAIN_DIR: &str = "Library/Keychains";

/// Home directory prefix for local accounts.
pub const USERS_DIR: &str = "Users";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `root` is `/` in production; tests point it at a tempdir.
pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

pub fn home_dir(root: &Path, account: &str) -> PathBuf {
    root.join(USERS_DIR).join(account)
}

pub fn keychain_dir(root: &Path, account: &str) -> PathBuf {
    home_dir(root, account).join(KEYCHAIN_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/");
        assert_eq!(
            settings_path(root),
            PathBuf::from("/etc/laps/settings.yaml")
        );
        assert_eq!(
            keychain_dir(root, "admin"),
            PathBuf::from("/Users/admin/Library/Keychains")
        );
    }
}
