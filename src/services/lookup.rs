use std::collections::HashSet;
use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::error::LookupError;
use crate::models::area::AreaKey;
use crate::models::places::PlaceCandidate;
use crate::models::query::SearchQuery;
use crate::models::restaurant::{NaturalKey, RestaurantRecord, NO_ADDRESS, NO_NAME};
use crate::repositories::RestaurantStore;
use crate::services::area_resolver::AreaResolver;
use crate::services::nearby_search::NearbySearch;

/// Cache-aside restaurant lookup.
///
/// The local store is consulted first; the remote search is only paginated
/// when the store holds fewer than `limit` matching rows. New places are
/// deduplicated against the cached rows and against each other, then written
/// back in a single atomic batch.
pub struct RestaurantFinder {
    store: Arc<dyn RestaurantStore>,
    resolver: Arc<dyn AreaResolver>,
    search: NearbySearch,
}

impl RestaurantFinder {
    pub fn new(
        store: Arc<dyn RestaurantStore>,
        resolver: Arc<dyn AreaResolver>,
        search: NearbySearch,
    ) -> Self {
        Self {
            store,
            resolver,
            search,
        }
    }

    /// Cached rows first in retrieval order, then newly discovered places in
    /// provider order. Never longer than `query.limit`.
    pub async fn lookup(&self, query: &SearchQuery) -> Result<Vec<RestaurantRecord>, LookupError> {
        let limit = query.limit;
        let keyword = query.keyword.as_deref();

        let resolution = self
            .resolver
            .resolve(query.center)
            .await
            .map_err(|e| LookupError::remote("reverse geocode", e))?;
        if resolution.is_degraded() {
            warn!("Search area could not be resolved, the cache will not match: {:?}", resolution);
        }
        let area = resolution.area();

        let cached = self.store.find_by_area(&area, keyword, limit).await?;
        if limit > 0 && !cached.is_empty() {
            info!("Found {} restaurants in the database", cached.len());
        }
        if cached.len() >= limit {
            return Ok(cached);
        }

        let mut existing: HashSet<NaturalKey> = cached.iter().map(RestaurantRecord::natural_key).collect();
        info!("Fetching {} places from Places API...", limit - cached.len());

        let mut accepted: Vec<RestaurantRecord> = Vec::new();
        let mut candidates = self.search.candidates(query).take(limit);
        while cached.len() + accepted.len() < limit {
            let candidate = match candidates
                .try_next()
                .await
                .map_err(|e| LookupError::remote("nearby search", e))?
            {
                Some(candidate) => candidate,
                None => break,
            };

            let area = self.candidate_area(&candidate).await;
            let record = build_record(candidate, area, query.keyword.clone());
            if !existing.insert(record.natural_key()) {
                debug!("Skipping duplicate place {} at {}", record.name, record.address);
                continue;
            }
            accepted.push(record);
        }
        drop(candidates);

        let inserted = self.store.upsert_all_if_absent(&accepted).await?;
        let inserted = inserted.iter().filter(|written| **written).count();
        info!(
            "Stored {} new restaurants ({} already present)",
            inserted,
            accepted.len() - inserted
        );

        let mut restaurants = cached;
        restaurants.extend(accepted);
        Ok(restaurants)
    }

    /// The candidate's own area. Lookup failures degrade to an unknown area
    /// instead of aborting the batch.
    async fn candidate_area(&self, candidate: &PlaceCandidate) -> AreaKey {
        let Some(location) = candidate.location() else {
            warn!("Place {:?} has no location, storing without area", candidate.name);
            return AreaKey::unknown();
        };

        match self.resolver.resolve(location).await {
            Ok(resolution) => resolution.area(),
            Err(e) => {
                warn!("Failed to resolve area for place {:?} due to: {}", candidate.name, e);
                AreaKey::unknown()
            }
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn build_record(candidate: PlaceCandidate, area: AreaKey, keyword: Option<String>) -> RestaurantRecord {
    let name = present(candidate.name).unwrap_or_else(|| NO_NAME.to_string());
    let address = present(candidate.vicinity)
        .or_else(|| present(candidate.formatted_address))
        .unwrap_or_else(|| NO_ADDRESS.to_string());

    RestaurantRecord {
        name,
        address,
        zipcode: area.zipcode,
        city: area.city,
        rating: candidate.rating,
        price_level: candidate.price_level,
        keyword,
    }
}
