//! Gateway implementations over the `dscl` command-line tool.
//!
//! `DsclDirectory` reads and writes attributes on the host's computer record
//! in the Active Directory node; `DsclLocalAccount` changes the local admin
//! password against the local node (`dscl .`). Both are thin subprocess
//! wrappers; all policy lives in `laps_core::engine`.

use crate::dsconfigad::AdBinding;
use laps_core::account::LocalAccountGateway;
use laps_core::directory::DirectoryGateway;
use laps_core::error::{LapsError, Result};
use laps_core::paths;
use std::path::{Path, PathBuf};
use std::process::Command;

fn run_dscl(args: &[&str]) -> Result<String> {
    let output = Command::new("dscl")
        .args(args)
        .output()
        .map_err(|e| LapsError::Command(format!("dscl: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LapsError::Command(format!(
            "dscl {} exited {}: {}",
            args.first().copied().unwrap_or_default(),
            output.status,
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ---------------------------------------------------------------------------
// DsclDirectory
// ---------------------------------------------------------------------------

pub struct DsclDirectory {
    node: String,
    record: String,
}

impl DsclDirectory {
    pub fn new(binding: &AdBinding) -> Self {
        Self {
            node: binding.node_path(),
            record: format!("/Computers/{}", binding.trust_account),
        }
    }
}

impl DirectoryGateway for DsclDirectory {
    fn read_attribute(&self, name: &str) -> Result<Option<String>> {
        match run_dscl(&[&self.node, "-read", &self.record, name]) {
            Ok(stdout) => Ok(parse_read_output(name, &stdout)),
            // dscl reports an unset attribute as "No such key" on stderr.
            Err(LapsError::Command(msg)) if msg.contains("No such key") => Ok(None),
            Err(LapsError::Command(msg)) => Err(LapsError::AttributeRead {
                attribute: name.to_string(),
                reason: msg,
            }),
            Err(e) => Err(e),
        }
    }

    fn write_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        run_dscl(&[&self.node, "-create", &self.record, name, value])?;
        Ok(())
    }
}

/// `dscl -read` prints `name: value` for single-line values, or the value on
/// its own indented line when it contains spaces.
fn parse_read_output(attribute: &str, stdout: &str) -> Option<String> {
    let mut lines = stdout.lines();
    while let Some(line) = lines.next() {
        let Some(rest) = line.strip_prefix(attribute) else {
            continue;
        };
        let Some(rest) = rest.strip_prefix(':') else {
            continue;
        };
        let inline = rest.trim();
        if !inline.is_empty() {
            return Some(inline.to_string());
        }
        return lines.next().map(|l| l.trim().to_string());
    }
    None
}

// ---------------------------------------------------------------------------
// DsclLocalAccount
// ---------------------------------------------------------------------------

pub struct DsclLocalAccount {
    root: PathBuf,
}

impl DsclLocalAccount {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl LocalAccountGateway for DsclLocalAccount {
    fn change_password(&mut self, account: &str, new_password: &str) -> Result<()> {
        let user_path = format!("/Users/{account}");
        run_dscl(&[".", "-passwd", &user_path, new_password])?;
        Ok(())
    }

    fn keychain_path(&self, account: &str) -> PathBuf {
        paths::keychain_dir(&self.root, account)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use laps_core::directory::EXPIRATION_ATTRIBUTE;

    #[test]
    fn parses_inline_attribute_value() {
        let out = format!("{EXPIRATION_ATTRIBUTE}: 133578912000000000\n");
        assert_eq!(
            parse_read_output(EXPIRATION_ATTRIBUTE, &out),
            Some("133578912000000000".to_string())
        );
    }

    #[test]
    fn parses_value_on_following_line() {
        let out = format!("{EXPIRATION_ATTRIBUTE}:\n 133578912000000000\n");
        assert_eq!(
            parse_read_output(EXPIRATION_ATTRIBUTE, &out),
            Some("133578912000000000".to_string())
        );
    }

    #[test]
    fn skips_unrelated_attributes() {
        let out = "RecordName: mac-lab-07$\nOtherAttr: junk\n";
        assert_eq!(parse_read_output(EXPIRATION_ATTRIBUTE, out), None);
    }

    #[test]
    fn attribute_name_prefix_must_match_exactly() {
        // "Foo" must not match a record line for "FooBar".
        let out = "FooBar: value\n";
        assert_eq!(parse_read_output("Foo", out), None);
    }

    #[test]
    fn keychain_path_is_under_account_home() {
        let local = DsclLocalAccount::new(Path::new("/"));
        assert_eq!(
            local.keychain_path("admin"),
            PathBuf::from("/Users/admin/Library/Keychains")
        );
    }
}
