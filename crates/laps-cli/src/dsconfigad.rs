//! Host domain-join discovery.
//!
//! `dsconfigad -show` reports the Active Directory binding this host was
//! joined with, including the machine trust account that keys the computer
//! record. No binding (or no `dsconfigad` at all) means the agent cannot do
//! anything useful, so both map to `DirectoryConnection`.

use laps_core::error::{LapsError, Result};
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdBinding {
    pub domain: String,
    pub trust_account: String,
}

impl AdBinding {
    /// Directory node the computer record lives under.
    pub fn node_path(&self) -> String {
        format!("/Active Directory/{}/All Domains", self.domain)
    }
}

pub fn discover() -> Result<AdBinding> {
    let output = Command::new("dsconfigad")
        .arg("-show")
        .output()
        .map_err(|e| LapsError::DirectoryConnection(format!("dsconfigad: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LapsError::DirectoryConnection(format!(
            "dsconfigad -show exited {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_show(&stdout).ok_or_else(|| {
        LapsError::DirectoryConnection("host is not bound to Active Directory".to_string())
    })
}

/// Pull the domain and trust account out of `dsconfigad -show` output.
/// Lines look like `Active Directory Domain          = example.com`.
fn parse_show(output: &str) -> Option<AdBinding> {
    let mut domain = None;
    let mut trust_account = None;
    for line in output.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "Active Directory Domain" => domain = Some(value.trim().to_string()),
            "Computer Account" => trust_account = Some(value.trim().to_string()),
            _ => {}
        }
    }
    Some(AdBinding {
        domain: domain?,
        trust_account: trust_account?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const BOUND: &str = "\
You are bound to Active Directory:
Active Directory Forest          = corp.example.com
Active Directory Domain          = corp.example.com
Computer Account                 = mac-lab-07$
";

    #[test]
    fn parses_bound_host() {
        let binding = parse_show(BOUND).unwrap();
        assert_eq!(binding.domain, "corp.example.com");
        assert_eq!(binding.trust_account, "mac-lab-07$");
        assert_eq!(
            binding.node_path(),
            "/Active Directory/corp.example.com/All Domains"
        );
    }

    #[test]
    fn unbound_host_yields_none() {
        assert!(parse_show("").is_none());
        assert!(parse_show("Not bound to any domain\n").is_none());
    }

    #[test]
    fn domain_without_computer_account_yields_none() {
        let partial = "Active Directory Domain = corp.example.com\n";
        assert!(parse_show(partial).is_none());
    }
}
