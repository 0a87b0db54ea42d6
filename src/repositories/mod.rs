use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::area::AreaKey;
use crate::models::restaurant::RestaurantRecord;

pub mod memory_repo;
pub mod postgres_repo;

/// Typed access to the persisted restaurant catalog.
///
/// Implementations enforce uniqueness over the natural key
/// (name, address, zipcode) with insert-if-absent semantics: an insert that
/// would collide is dropped, existing rows are never overwritten.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    /// Rows where `(zipcode = area.zipcode OR city = area.city)` and whose
    /// keyword equals `keyword` (or is null when `keyword` is `None`), in
    /// insertion order, truncated to `limit`.
    async fn find_by_area(
        &self,
        area: &AreaKey,
        keyword: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RestaurantRecord>, StoreError>;

    /// Inserts `record` unless its natural key is already stored.
    /// Returns whether a row was written.
    async fn upsert_if_absent(&self, record: &RestaurantRecord) -> Result<bool, StoreError>;

    /// Applies [`RestaurantStore::upsert_if_absent`] to every record as one
    /// atomic unit; either all inserts become visible or none do.
    async fn upsert_all_if_absent(
        &self,
        records: &[RestaurantRecord],
    ) -> Result<Vec<bool>, StoreError>;
}
