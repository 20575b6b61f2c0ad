//! Port answering whether a user owns a device identity.

use async_trait::async_trait;

use crate::domain::IdentityId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by ownership lookup adapters.
    pub enum OwnershipLookupError {
        /// Directory connection could not be established.
        Connection { message: String } =>
            "ownership lookup connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "ownership lookup query failed: {message}",
    }
}

/// Port for device ownership checks used by destructive operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OwnershipLookup: Send + Sync {
    /// Return whether `email` is the registered owner of `identity`.
    async fn is_owner(
        &self,
        identity: &IdentityId,
        email: &str,
    ) -> Result<bool, OwnershipLookupError>;
}

/// Fixture lookup that denies ownership to everyone.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOwnershipLookup;

#[async_trait]
impl OwnershipLookup for FixtureOwnershipLookup {
    async fn is_owner(
        &self,
        _identity: &IdentityId,
        _email: &str,
    ) -> Result<bool, OwnershipLookupError> {
        Ok(false)
    }
}
