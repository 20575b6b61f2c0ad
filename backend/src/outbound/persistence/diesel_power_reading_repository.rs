//! PostgreSQL-backed `PowerReadingRepository` implementation using Diesel ORM.
//!
//! Power readings share the telemetry table with other event types; scans
//! are restricted to the `power` event type and ordered by timestamp within
//! it, matching the `power#<timestamp>` key layout devices report.

use async_trait::async_trait;
use diesel::dsl::{AsSelect, SqlTypeOf};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PowerReadingRepository, PowerReadingRepositoryError};
use crate::domain::{IdentityId, PartitionQuery, PowerReading, QueryFilter, ScanOrder};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::PowerReadingRow;
use super::pool::DbPool;
use super::query_limit;
use super::schema::power_readings;

/// Telemetry event type holding charge-counter samples.
const POWER_EVENT_TYPE: &str = "power";

/// Diesel-backed implementation of the power reading repository port.
#[derive(Clone)]
pub struct DieselPowerReadingRepository {
    pool: DbPool,
}

impl DieselPowerReadingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_reading(row: PowerReadingRow) -> Result<PowerReading, PowerReadingRepositoryError> {
    let identity_id = IdentityId::new(row.identity_id)
        .map_err(|err| PowerReadingRepositoryError::query(err.to_string()))?;
    Ok(PowerReading {
        identity_id,
        timestamp: row.recorded_at,
        milliamp_hours: row.milliamp_hours,
        voltage: row.voltage,
        temperature: row.temperature,
    })
}

type PowerScan<'a> =
    power_readings::BoxedQuery<'a, Pg, SqlTypeOf<AsSelect<PowerReadingRow, Pg>>>;

/// Select one identity's `power` events with the query's window, order, and limit.
fn power_scan<'a>(identity: &'a IdentityId, query: &PartitionQuery) -> PowerScan<'a> {
    let mut statement = power_readings::table
        .filter(power_readings::identity_id.eq(identity.as_ref()))
        .filter(power_readings::event_type.eq(POWER_EVENT_TYPE))
        .select(PowerReadingRow::as_select())
        .into_boxed();
    for filter in query.filters() {
        statement = match *filter {
            QueryFilter::Since(since) => statement.filter(power_readings::recorded_at.ge(since)),
            QueryFilter::TimeRange(start, end) => {
                statement.filter(power_readings::recorded_at.between(start, end))
            }
            QueryFilter::Status(_) | QueryFilter::Source(_) => statement,
        };
    }
    statement = match query.order() {
        ScanOrder::Ascending => statement.order(power_readings::recorded_at.asc()),
        ScanOrder::Descending => statement.order(power_readings::recorded_at.desc()),
    };
    if let Some(limit) = query.limit() {
        statement = statement.limit(query_limit(limit));
    }
    statement
}

#[async_trait]
impl PowerReadingRepository for DieselPowerReadingRepository {
    async fn query(
        &self,
        identity: &IdentityId,
        query: &PartitionQuery,
    ) -> Result<Vec<PowerReading>, PowerReadingRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PowerReadingRepositoryError::connection))?;

        let rows: Vec<PowerReadingRow> = power_scan(identity, query)
            .load(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(
                    err,
                    "query power readings",
                    PowerReadingRepositoryError::query,
                    PowerReadingRepositoryError::connection,
                )
            })?;
        rows.into_iter().map(row_to_reading).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the power scan.

    use chrono::{DateTime, Utc};
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn scan_is_restricted_to_power_events() {
        let identity = IdentityId::new("id-1").expect("identity");
        let since = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("timestamp");
        let query = PartitionQuery::builder(crate::domain::Dataset::Telemetry)
            .filter(QueryFilter::Since(since))
            .order(ScanOrder::Descending)
            .limit(1)
            .build()
            .expect("valid query");

        let sql = diesel::debug_query::<Pg, _>(&power_scan(&identity, &query)).to_string();

        assert!(sql.contains(r#""power_readings"."event_type" = $2"#), "{sql}");
        assert!(sql.contains(r#""power_readings"."recorded_at" >= $3"#), "{sql}");
        assert!(sql.contains(r#"ORDER BY "power_readings"."recorded_at" DESC"#), "{sql}");
        assert!(sql.contains(r#""power""#), "{sql}");
    }

    #[rstest]
    fn row_conversion_rejects_blank_identity() {
        let row = PowerReadingRow {
            identity_id: "  ".to_owned(),
            recorded_at: DateTime::<Utc>::from_timestamp(0, 0).expect("timestamp"),
            milliamp_hours: Some(1.0),
            voltage: None,
            temperature: None,
        };

        let err = row_to_reading(row).expect_err("blank identity");
        assert!(matches!(err, PowerReadingRepositoryError::Query { .. }));
    }
}
