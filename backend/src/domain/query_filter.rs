//! Typed partition-query construction.
//!
//! Optional filters are composed as [`QueryFilter`] variants before a query is
//! issued. Storage adapters match on every variant, so adding a filter is a
//! compile error until each dataset decides how to honour it.

use chrono::{DateTime, Utc};

use crate::domain::{JourneyStatus, LocationSource};

/// Named dataset addressed by a partition query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// Journey records.
    Journeys,
    /// Location points.
    Locations,
    /// Power-monitor readings.
    Telemetry,
}

impl Dataset {
    /// Label used in logs and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Journeys => "journeys",
            Self::Locations => "locations",
            Self::Telemetry => "telemetry",
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One optional predicate applied inside an identity partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryFilter {
    /// Journey status equals the value.
    Status(JourneyStatus),
    /// Record time is at or after the cutoff.
    Since(DateTime<Utc>),
    /// Record time falls within the inclusive range.
    TimeRange(DateTime<Utc>, DateTime<Utc>),
    /// Location fix came from the source.
    Source(LocationSource),
}

impl QueryFilter {
    /// Whether the filter is meaningful for `dataset`.
    pub const fn applies_to(&self, dataset: Dataset) -> bool {
        match self {
            Self::Status(_) => matches!(dataset, Dataset::Journeys),
            Self::Source(_) => matches!(dataset, Dataset::Locations),
            Self::Since(_) | Self::TimeRange(_, _) => true,
        }
    }
}

/// Direction of the ordered scan inside a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanOrder {
    /// Oldest first.
    #[default]
    Ascending,
    /// Newest first.
    Descending,
}

/// Errors raised while composing a partition query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PartitionQueryError {
    /// A filter was attached to a dataset that cannot honour it.
    #[error("filter {filter:?} does not apply to the {dataset} dataset")]
    InapplicableFilter {
        filter: QueryFilter,
        dataset: Dataset,
    },
    /// A time range ended before it started.
    #[error("time range ends before it starts")]
    InvertedRange,
}

/// Filters, ordering, and per-partition cap for one dataset query.
///
/// # Examples
/// ```
/// use backend::domain::{Dataset, JourneyStatus, PartitionQuery, QueryFilter, ScanOrder};
///
/// let query = PartitionQuery::builder(Dataset::Journeys)
///     .filter(QueryFilter::Status(JourneyStatus::Active))
///     .order(ScanOrder::Descending)
///     .limit(10)
///     .build()
///     .expect("status applies to journeys");
/// assert_eq!(query.limit(), Some(10));
/// assert_eq!(query.status(), Some(JourneyStatus::Active));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionQuery {
    dataset: Dataset,
    filters: Vec<QueryFilter>,
    order: ScanOrder,
    limit: Option<usize>,
}

impl PartitionQuery {
    /// Start composing a query for `dataset`.
    pub fn builder(dataset: Dataset) -> PartitionQueryBuilder {
        PartitionQueryBuilder {
            query: Self {
                dataset,
                filters: Vec::new(),
                order: ScanOrder::default(),
                limit: None,
            },
        }
    }

    /// Dataset this query targets.
    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    /// Filters in the order they were added.
    pub fn filters(&self) -> &[QueryFilter] {
        &self.filters
    }

    /// Scan direction.
    pub fn order(&self) -> ScanOrder {
        self.order
    }

    /// Per-partition result cap.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// The last status filter, if any.
    pub fn status(&self) -> Option<JourneyStatus> {
        self.filters.iter().rev().find_map(|filter| match filter {
            QueryFilter::Status(status) => Some(*status),
            _ => None,
        })
    }

    /// The last source filter, if any.
    pub fn source(&self) -> Option<LocationSource> {
        self.filters.iter().rev().find_map(|filter| match filter {
            QueryFilter::Source(source) => Some(*source),
            _ => None,
        })
    }
}

/// Builder returned by [`PartitionQuery::builder`].
#[derive(Debug, Clone)]
pub struct PartitionQueryBuilder {
    query: PartitionQuery,
}

impl PartitionQueryBuilder {
    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.query.filters.push(filter);
        self
    }

    /// Add a filter when `filter` is `Some`.
    #[must_use]
    pub fn filter_opt(self, filter: Option<QueryFilter>) -> Self {
        match filter {
            Some(value) => self.filter(value),
            None => self,
        }
    }

    /// Set the scan direction.
    #[must_use]
    pub fn order(mut self, order: ScanOrder) -> Self {
        self.query.order = order;
        self
    }

    /// Cap the number of records returned per partition.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Validate filters against the dataset and finish the query.
    pub fn build(self) -> Result<PartitionQuery, PartitionQueryError> {
        let dataset = self.query.dataset;
        for filter in &self.query.filters {
            if !filter.applies_to(dataset) {
                return Err(PartitionQueryError::InapplicableFilter {
                    filter: *filter,
                    dataset,
                });
            }
            if let QueryFilter::TimeRange(start, end) = filter {
                if end < start {
                    return Err(PartitionQueryError::InvertedRange);
                }
            }
        }
        Ok(self.query)
    }
}
