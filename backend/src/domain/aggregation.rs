//! Fan-out across device identities and merge into one global ordering.
//!
//! A serial number can own several identities, each with its own storage
//! partition. [`fan_out`] issues one partition query per identity
//! concurrently and fails as a whole if any single query fails; there is no
//! partial-result path. [`merge_sorted`] flattens the per-identity lists and
//! applies the global ordering and ceiling.

use std::cmp::Ordering;
use std::future::Future;

use futures_util::future::try_join_all;
use tracing::debug;

use crate::domain::{Dataset, IdentityId};

/// Per-identity results in the order the identities were supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct FanOutResults<T> {
    per_identity: Vec<(IdentityId, Vec<T>)>,
}

impl<T> FanOutResults<T> {
    /// Wrap already-collected per-identity lists.
    pub fn new(per_identity: Vec<(IdentityId, Vec<T>)>) -> Self {
        Self { per_identity }
    }

    /// Results for one identity, if it was queried.
    pub fn get(&self, identity: &IdentityId) -> Option<&[T]> {
        self.per_identity
            .iter()
            .find(|(candidate, _)| candidate == identity)
            .map(|(_, rows)| rows.as_slice())
    }

    /// Number of identities queried.
    pub fn identity_count(&self) -> usize {
        self.per_identity.len()
    }

    /// Total records across all identities.
    pub fn total_len(&self) -> usize {
        self.per_identity.iter().map(|(_, rows)| rows.len()).sum()
    }

    /// Flatten into one list, identity order first, then per-identity order.
    pub fn into_flat(self) -> Vec<T> {
        self.per_identity
            .into_iter()
            .flat_map(|(_, rows)| rows)
            .collect()
    }
}

/// Run `query` once per identity, concurrently, and collect every result.
///
/// The first failing query fails the whole operation; callers treat the
/// fan-out as a single atomic read.
///
/// # Examples
/// ```
/// use backend::domain::{Dataset, IdentityId, fan_out};
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let ids = vec![IdentityId::new("id-1").expect("id"), IdentityId::new("id-2").expect("id")];
/// let results = fan_out(Dataset::Journeys, &ids, |identity| async move {
///     Ok::<_, std::convert::Infallible>(vec![identity.to_string()])
/// })
/// .await
/// .expect("queries succeed");
/// assert_eq!(results.total_len(), 2);
/// # });
/// ```
pub async fn fan_out<T, E, F, Fut>(
    dataset: Dataset,
    identities: &[IdentityId],
    query: F,
) -> Result<FanOutResults<T>, E>
where
    F: Fn(IdentityId) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let pending = identities.iter().cloned().map(|identity| {
        let request = query(identity.clone());
        async move { request.await.map(|rows| (identity, rows)) }
    });
    let per_identity = try_join_all(pending).await?;
    let results = FanOutResults::new(per_identity);
    debug!(
        %dataset,
        identities = results.identity_count(),
        records = results.total_len(),
        "fan-out query completed"
    );
    Ok(results)
}

/// Global ordering direction for merged results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest key first.
    Ascending,
    /// Largest key first.
    Descending,
}

/// Flatten per-identity lists, sort by `key`, and keep at most `limit`.
///
/// The sort is stable: records with equal keys keep their identity order and
/// then their per-identity order.
///
/// # Examples
/// ```
/// use backend::domain::{FanOutResults, IdentityId, SortDirection, merge_sorted};
///
/// let a = IdentityId::new("a").expect("id");
/// let b = IdentityId::new("b").expect("id");
/// let results = FanOutResults::new(vec![(a, vec![3, 1]), (b, vec![4, 2])]);
/// let merged = merge_sorted(results, |value| *value, SortDirection::Descending, 3);
/// assert_eq!(merged, vec![4, 3, 2]);
/// ```
pub fn merge_sorted<T, K, F>(
    results: FanOutResults<T>,
    key: F,
    direction: SortDirection,
    limit: usize,
) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut merged = results.into_flat();
    merged.sort_by(|left, right| {
        let ordering: Ordering = key(left).cmp(&key(right));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    merged.truncate(limit);
    merged
}
