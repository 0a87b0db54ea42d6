use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::area::AreaKey;
use crate::models::restaurant::{NaturalKey, RestaurantRecord};
use crate::repositories::RestaurantStore;

#[derive(Default)]
struct Catalog {
    rows: Vec<RestaurantRecord>,
    keys: HashSet<NaturalKey>,
}

impl Catalog {
    fn insert_if_absent(&mut self, record: &RestaurantRecord) -> bool {
        if !self.keys.insert(record.natural_key()) {
            return false;
        }
        self.rows.push(record.clone());
        true
    }
}

/// In-process catalog with the same matching rules as the Postgres table.
///
/// Null area fields follow SQL comparison semantics and never match, so an
/// unresolved area finds nothing.
#[derive(Default)]
pub struct MemoryRestaurantStore {
    catalog: Mutex<Catalog>,
}

impl MemoryRestaurantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = RestaurantRecord>) -> Self {
        let store = Self::new();
        {
            let mut catalog = store.lock();
            for record in records {
                catalog.insert_if_absent(&record);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every stored row in insertion order.
    pub fn records(&self) -> Vec<RestaurantRecord> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Catalog> {
        self.catalog.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn matches_area(record: &RestaurantRecord, area: &AreaKey) -> bool {
    let zipcode_match = area.zipcode.is_some() && record.zipcode == area.zipcode;
    let city_match = area.city.is_some() && record.city == area.city;
    zipcode_match || city_match
}

#[async_trait]
impl RestaurantStore for MemoryRestaurantStore {
    async fn find_by_area(
        &self,
        area: &AreaKey,
        keyword: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RestaurantRecord>, StoreError> {
        let catalog = self.lock();
        let rows = catalog
            .rows
            .iter()
            .filter(|record| matches_area(record, area) && record.keyword.as_deref() == keyword)
            .take(limit)
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn upsert_if_absent(&self, record: &RestaurantRecord) -> Result<bool, StoreError> {
        Ok(self.lock().insert_if_absent(record))
    }

    async fn upsert_all_if_absent(
        &self,
        records: &[RestaurantRecord],
    ) -> Result<Vec<bool>, StoreError> {
        let mut catalog = self.lock();
        Ok(records
            .iter()
            .map(|record| catalog.insert_if_absent(record))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::restaurant::PriceLevel;

    fn record(name: &str, zipcode: Option<&str>, city: Option<&str>, keyword: Option<&str>) -> RestaurantRecord {
        RestaurantRecord {
            name: name.to_string(),
            address: format!("{} Main St", name),
            zipcode: zipcode.map(str::to_string),
            city: city.map(str::to_string),
            rating: Some(4.0),
            price_level: Some(PriceLevel::Level(2)),
            keyword: keyword.map(str::to_string),
        }
    }

    fn area(city: Option<&str>, zipcode: Option<&str>) -> AreaKey {
        AreaKey {
            city: city.map(str::to_string),
            zipcode: zipcode.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = MemoryRestaurantStore::new();
        let pizza = record("Slice", Some("12345"), Some("Town"), Some("pizza"));

        assert!(store.upsert_if_absent(&pizza).await.unwrap());
        assert!(!store.upsert_if_absent(&pizza).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_conflict_never_overwrites() {
        let store = MemoryRestaurantStore::new();
        let original = record("Slice", Some("12345"), Some("Town"), Some("pizza"));
        let mut changed = original.clone();
        changed.rating = Some(1.0);
        changed.price_level = Some(PriceLevel::Level(4));
        changed.keyword = None;

        store.upsert_if_absent(&original).await.unwrap();
        assert!(!store.upsert_if_absent(&changed).await.unwrap());
        assert_eq!(store.records(), vec![original]);
    }

    #[tokio::test]
    async fn test_batch_reports_per_record_inserts() {
        let store = MemoryRestaurantStore::new();
        let a = record("A", Some("1"), None, None);
        let b = record("Bb", Some("1"), None, None);
        store.upsert_if_absent(&a).await.unwrap();

        let inserted = store
            .upsert_all_if_absent(&[a.clone(), b.clone(), b.clone()])
            .await
            .unwrap();

        assert_eq!(inserted, vec![false, true, false]);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_keyword_filter_applies_to_city_match() {
        let store = MemoryRestaurantStore::with_records(vec![
            record("Pizza", Some("11111"), Some("Town"), Some("pizza")),
            record("Sushi", Some("22222"), Some("Town"), Some("sushi")),
            record("Diner", Some("11111"), Some("Town"), None),
        ]);

        let found = store
            .find_by_area(&area(Some("Town"), Some("11111")), Some("sushi"), 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Sushi");

        let unfiltered = store
            .find_by_area(&area(Some("Town"), Some("11111")), None, 10)
            .await
            .unwrap();
        assert_eq!(unfiltered.len(), 1);
        assert_eq!(unfiltered[0].name, "Diner");
    }

    #[tokio::test]
    async fn test_find_by_area_matches_zip_or_city_in_insertion_order() {
        let store = MemoryRestaurantStore::with_records(vec![
            record("First", Some("11111"), Some("Elsewhere"), None),
            record("Second", Some("99999"), Some("Town"), None),
            record("Third", Some("99999"), Some("Elsewhere"), None),
            record("Fourth", Some("11111"), Some("Town"), None),
        ]);

        let found = store
            .find_by_area(&area(Some("Town"), Some("11111")), None, 10)
            .await
            .unwrap();
        let names: Vec<_> = found.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Fourth"]);

        let truncated = store
            .find_by_area(&area(Some("Town"), Some("11111")), None, 2)
            .await
            .unwrap();
        assert_eq!(truncated.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_area_matches_nothing() {
        let store = MemoryRestaurantStore::with_records(vec![record("Nowhere", None, None, None)]);

        let found = store.find_by_area(&AreaKey::unknown(), None, 10).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_null_zipcode_is_part_of_identity() {
        let store = MemoryRestaurantStore::new();
        let a = record("Same", None, None, None);

        assert!(store.upsert_if_absent(&a).await.unwrap());
        assert!(!store.upsert_if_absent(&a).await.unwrap());
    }
}
