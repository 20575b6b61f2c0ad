//! PostgreSQL-backed device directory.
//!
//! Implements both identity resolution and ownership lookup over the
//! `devices` table. Identities are ordered newest provisioning first, so the
//! primary identity is the one most recently provisioned.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    IdentityResolver, IdentityResolverError, OwnershipLookup, OwnershipLookupError,
};
use crate::domain::{DeviceIdentities, IdentityId, SerialNumber};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::devices;

/// Diesel-backed implementation of the device directory ports.
#[derive(Clone)]
pub struct DieselDeviceDirectory {
    pool: DbPool,
}

impl DieselDeviceDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn identities_from_rows(
    serial_number: &SerialNumber,
    rows: Vec<String>,
) -> Result<Option<DeviceIdentities>, IdentityResolverError> {
    if rows.is_empty() {
        return Ok(None);
    }
    let ordered = rows
        .into_iter()
        .map(IdentityId::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| IdentityResolverError::query(err.to_string()))?;
    DeviceIdentities::from_ordered(serial_number.clone(), ordered)
        .map(Some)
        .map_err(|err| IdentityResolverError::query(err.to_string()))
}

#[async_trait]
impl IdentityResolver for DieselDeviceDirectory {
    async fn resolve(
        &self,
        serial_number: &SerialNumber,
    ) -> Result<Option<DeviceIdentities>, IdentityResolverError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, IdentityResolverError::connection))?;

        let rows: Vec<String> = devices::table
            .filter(devices::serial_number.eq(serial_number.as_ref()))
            .order((devices::provisioned_at.desc(), devices::identity_id.asc()))
            .select(devices::identity_id)
            .load(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(
                    err,
                    "resolve device",
                    IdentityResolverError::query,
                    IdentityResolverError::connection,
                )
            })?;

        identities_from_rows(serial_number, rows)
    }
}

#[async_trait]
impl OwnershipLookup for DieselDeviceDirectory {
    async fn is_owner(
        &self,
        identity: &IdentityId,
        email: &str,
    ) -> Result<bool, OwnershipLookupError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, OwnershipLookupError::connection))?;

        let owner: Option<Option<String>> = devices::table
            .filter(devices::identity_id.eq(identity.as_ref()))
            .select(devices::owner_email)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| {
                map_diesel_error(
                    err,
                    "lookup device owner",
                    OwnershipLookupError::query,
                    OwnershipLookupError::connection,
                )
            })?;

        Ok(owner
            .flatten()
            .is_some_and(|owner| owner.trim().eq_ignore_ascii_case(email.trim())))
    }
}
