//! PostgreSQL-backed `LocationRepository` implementation using Diesel ORM.
//!
//! Batch deletes run in their own transaction so each batch is one commit.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{AsSelect, SqlTypeOf};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{LocationRepository, LocationRepositoryError, MAX_DELETE_BATCH};
use crate::domain::{
    IdentityId, JourneyId, LocationKey, LocationPoint, LocationSource, PartitionQuery,
    QueryFilter, ScanOrder,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::LocationRow;
use super::pool::{DbPool, PoolError};
use super::query_limit;
use super::schema::locations;

/// Diesel-backed implementation of the location repository port.
#[derive(Clone)]
pub struct DieselLocationRepository {
    pool: DbPool,
}

impl DieselLocationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> LocationRepositoryError {
    map_pool_error(error, LocationRepositoryError::connection)
}

fn diesel_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> LocationRepositoryError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            LocationRepositoryError::query,
            LocationRepositoryError::connection,
        )
    }
}

/// Convert a database row into a domain location point.
fn row_to_point(row: LocationRow) -> Result<LocationPoint, LocationRepositoryError> {
    let identity_id = IdentityId::new(row.identity_id)
        .map_err(|err| LocationRepositoryError::query(err.to_string()))?;
    let source = row
        .source
        .parse::<LocationSource>()
        .map_err(|err| LocationRepositoryError::query(err.to_string()))?;
    let jcount = row
        .jcount
        .map(u32::try_from)
        .transpose()
        .map_err(|_| LocationRepositoryError::query("negative journey sequence number"))?;

    Ok(LocationPoint {
        identity_id,
        timestamp: row.recorded_at,
        journey_id: row.journey_id.map(JourneyId::new),
        latitude: row.latitude,
        longitude: row.longitude,
        velocity: row.velocity,
        bearing: row.bearing,
        distance: row.distance,
        dop: row.dop,
        jcount,
        source,
    })
}

/// Group keys by identity so each partition is deleted with one statement.
fn group_keys(keys: &[LocationKey]) -> BTreeMap<&str, Vec<DateTime<Utc>>> {
    let mut grouped: BTreeMap<&str, Vec<DateTime<Utc>>> = BTreeMap::new();
    for key in keys {
        grouped
            .entry(key.identity_id.as_ref())
            .or_default()
            .push(key.timestamp);
    }
    grouped
}

type LocationScan<'a> = locations::BoxedQuery<'a, Pg, SqlTypeOf<AsSelect<LocationRow, Pg>>>;

/// Select one identity's fixes with the query's filters, order, and limit.
fn location_scan<'a>(identity: &'a IdentityId, query: &PartitionQuery) -> LocationScan<'a> {
    let mut statement = locations::table
        .filter(locations::identity_id.eq(identity.as_ref()))
        .select(LocationRow::as_select())
        .into_boxed();
    for filter in query.filters() {
        statement = match *filter {
            QueryFilter::Since(since) => statement.filter(locations::recorded_at.ge(since)),
            QueryFilter::TimeRange(start, end) => {
                statement.filter(locations::recorded_at.between(start, end))
            }
            QueryFilter::Source(source) => statement.filter(locations::source.eq(source.as_str())),
            QueryFilter::Status(_) => statement,
        };
    }
    statement = match query.order() {
        ScanOrder::Ascending => statement.order(locations::recorded_at.asc()),
        ScanOrder::Descending => statement.order(locations::recorded_at.desc()),
    };
    if let Some(limit) = query.limit() {
        statement = statement.limit(query_limit(limit));
    }
    statement
}

#[async_trait]
impl LocationRepository for DieselLocationRepository {
    async fn query(
        &self,
        identity: &IdentityId,
        query: &PartitionQuery,
    ) -> Result<Vec<LocationPoint>, LocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<LocationRow> = location_scan(identity, query)
            .load(&mut conn)
            .await
            .map_err(diesel_error("query locations"))?;
        rows.into_iter().map(row_to_point).collect()
    }

    async fn list_for_journey(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
    ) -> Result<Vec<LocationPoint>, LocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<LocationRow> = locations::table
            .filter(locations::identity_id.eq(identity.as_ref()))
            .filter(locations::journey_id.eq(journey_id.value()))
            .select(LocationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error("list journey locations"))?;
        rows.into_iter().map(row_to_point).collect()
    }

    async fn delete_batch(&self, keys: &[LocationKey]) -> Result<usize, LocationRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        if keys.len() > MAX_DELETE_BATCH {
            return Err(LocationRepositoryError::batch_too_large(keys.len()));
        }
        if keys.is_empty() {
            return Ok(0);
        }
        let grouped = group_keys(keys);
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let deleted = conn
            .transaction(|conn| {
                async move {
                    let mut deleted = 0;
                    for (identity, timestamps) in &grouped {
                        deleted += diesel::delete(
                            locations::table
                                .filter(locations::identity_id.eq(*identity))
                                .filter(locations::recorded_at.eq_any(timestamps.clone())),
                        )
                        .execute(conn)
                        .await?;
                    }
                    Ok::<_, diesel::result::Error>(deleted)
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error("delete location batch"))?;

        debug!(requested = keys.len(), deleted, "location batch committed");
        Ok(deleted)
    }
}
