//! PostgreSQL-backed `JourneyRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::dsl::{AsSelect, SqlTypeOf};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{JourneyRepository, JourneyRepositoryError};
use crate::domain::{
    IdentityId, Journey, JourneyId, JourneyStatus, MatchedRoute, PartitionQuery, QueryFilter,
    RouteGeometry, ScanOrder,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{JourneyRow, MatchedRouteUpdate};
use super::pool::{DbPool, PoolError};
use super::query_limit;
use super::schema::journeys;

/// Diesel-backed implementation of the journey repository port.
#[derive(Clone)]
pub struct DieselJourneyRepository {
    pool: DbPool,
}

impl DieselJourneyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> JourneyRepositoryError {
    map_pool_error(error, JourneyRepositoryError::connection)
}

fn diesel_error(operation: &'static str) -> impl FnOnce(diesel::result::Error) -> JourneyRepositoryError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            JourneyRepositoryError::query,
            JourneyRepositoryError::connection,
        )
    }
}

fn decode_matched_route(
    route: Option<serde_json::Value>,
    confidence: Option<f64>,
    matched_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<Option<MatchedRoute>, JourneyRepositoryError> {
    let (Some(route), Some(confidence), Some(matched_at)) = (route, confidence, matched_at) else {
        return Ok(None);
    };
    let geometry: RouteGeometry = serde_json::from_value(route)
        .map_err(|err| JourneyRepositoryError::query(format!("decode matched route: {err}")))?;
    Ok(Some(MatchedRoute {
        geometry,
        confidence,
        matched_at,
    }))
}

/// Convert a database row into a domain journey.
fn row_to_journey(row: JourneyRow) -> Result<Journey, JourneyRepositoryError> {
    let JourneyRow {
        identity_id,
        journey_id,
        start_time,
        end_time,
        status,
        point_count,
        total_distance,
        matched_route,
        match_confidence,
        matched_at,
    } = row;

    let identity_id =
        IdentityId::new(identity_id).map_err(|err| JourneyRepositoryError::query(err.to_string()))?;
    let status = status
        .parse::<JourneyStatus>()
        .map_err(|err| JourneyRepositoryError::query(err.to_string()))?;
    let point_count = u32::try_from(point_count).map_err(|_| {
        JourneyRepositoryError::query(format!("negative point count {point_count}"))
    })?;

    Ok(Journey {
        identity_id,
        journey_id: JourneyId::new(journey_id),
        start_time,
        end_time,
        status,
        point_count,
        total_distance,
        matched_route: decode_matched_route(matched_route, match_confidence, matched_at)?,
    })
}

type JourneyScan<'a> = journeys::BoxedQuery<'a, Pg, SqlTypeOf<AsSelect<JourneyRow, Pg>>>;

/// Select one identity's journeys with the query's filters, order, and limit.
fn journey_scan<'a>(identity: &'a IdentityId, query: &PartitionQuery) -> JourneyScan<'a> {
    let mut statement = journeys::table
        .filter(journeys::identity_id.eq(identity.as_ref()))
        .select(JourneyRow::as_select())
        .into_boxed();
    for filter in query.filters() {
        statement = match *filter {
            QueryFilter::Status(status) => statement.filter(journeys::status.eq(status.as_str())),
            QueryFilter::Since(since) => statement.filter(journeys::start_time.ge(since)),
            QueryFilter::TimeRange(start, end) => {
                statement.filter(journeys::start_time.between(start, end))
            }
            QueryFilter::Source(_) => statement,
        };
    }
    statement = match query.order() {
        ScanOrder::Ascending => statement.order(journeys::journey_id.asc()),
        ScanOrder::Descending => statement.order(journeys::journey_id.desc()),
    };
    if let Some(limit) = query.limit() {
        statement = statement.limit(query_limit(limit));
    }
    statement
}

#[async_trait]
impl JourneyRepository for DieselJourneyRepository {
    async fn query(
        &self,
        identity: &IdentityId,
        query: &PartitionQuery,
    ) -> Result<Vec<Journey>, JourneyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<JourneyRow> = journey_scan(identity, query)
            .load(&mut conn)
            .await
            .map_err(diesel_error("query journeys"))?;
        debug!(identity = %identity, rows = rows.len(), "journey partition scanned");
        rows.into_iter().map(row_to_journey).collect()
    }

    async fn find(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
    ) -> Result<Option<Journey>, JourneyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = journeys::table
            .filter(journeys::identity_id.eq(identity.as_ref()))
            .filter(journeys::journey_id.eq(journey_id.value()))
            .select(JourneyRow::as_select())
            .first::<JourneyRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("find journey"))?;

        row.map(row_to_journey).transpose()
    }

    async fn save_matched_route(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
        route: &MatchedRoute,
    ) -> Result<bool, JourneyRepositoryError> {
        let geometry = serde_json::to_value(&route.geometry).map_err(|err| {
            JourneyRepositoryError::query(format!("serialise matched route: {err}"))
        })?;
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let updated = diesel::update(
            journeys::table
                .filter(journeys::identity_id.eq(identity.as_ref()))
                .filter(journeys::journey_id.eq(journey_id.value())),
        )
        .set(&MatchedRouteUpdate {
            matched_route: &geometry,
            match_confidence: route.confidence,
            matched_at: route.matched_at,
        })
        .execute(&mut conn)
        .await
        .map_err(diesel_error("save matched route"))?;

        Ok(updated > 0)
    }

    async fn delete(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
    ) -> Result<bool, JourneyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let deleted = diesel::delete(
            journeys::table
                .filter(journeys::identity_id.eq(identity.as_ref()))
                .filter(journeys::journey_id.eq(journey_id.value())),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error("delete journey"))?;

        Ok(deleted > 0)
    }
}
