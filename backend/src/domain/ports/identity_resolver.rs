//! Port for resolving a serial number to its hardware identities.

use async_trait::async_trait;

use crate::domain::{DeviceIdentities, SerialNumber};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity resolver adapters.
    pub enum IdentityResolverError {
        /// Directory connection could not be established.
        Connection { message: String } =>
            "identity resolver connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "identity resolver query failed: {message}",
    }
}

/// Port mapping a user-facing serial number to every identity provisioned
/// under it.
///
/// The primary identity is the one currently reporting; the remainder are
/// historic provisionings whose data still belongs to the device.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve `serial_number`, returning `None` for unknown devices.
    async fn resolve(
        &self,
        serial_number: &SerialNumber,
    ) -> Result<Option<DeviceIdentities>, IdentityResolverError>;
}

/// Fixture resolver that knows no devices.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityResolver;

#[async_trait]
impl IdentityResolver for FixtureIdentityResolver {
    async fn resolve(
        &self,
        _serial_number: &SerialNumber,
    ) -> Result<Option<DeviceIdentities>, IdentityResolverError> {
        Ok(None)
    }
}
