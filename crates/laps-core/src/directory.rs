//! Directory-side gateway.
//!
//! The directory holds the authoritative password and its expiration on the
//! machine's computer record, in the standard LAPS attribute pair. The engine
//! only ever touches these two attributes, always through this trait.

use crate::error::Result;

/// Attribute holding the current administrator password.
pub const PASSWORD_ATTRIBUTE: &str = "dsAttrTypeNative:ms-Mcs-AdmPwd";

/// Attribute holding the expiration, string-encoded directory ticks.
pub const EXPIRATION_ATTRIBUTE: &str = "dsAttrTypeNative:ms-Mcs-AdmPwdExpirationTime";

/// Read/write access to named attributes on the host's computer record.
/// Implementations are expected to have already resolved the directory node
/// and record; resolution failures surface before the engine runs.
pub trait DirectoryGateway {
    /// `Ok(None)` means the attribute is not set on the record.
    fn read_attribute(&self, name: &str) -> Result<Option<String>>;

    fn write_attribute(&mut self, name: &str, value: &str) -> Result<()>;
}
