use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::clients::PlacesApi;
use crate::error::RemoteError;
use crate::helpers::retry::{with_retry, RetryPolicy};
use crate::models::area::{parse_formatted_address, AreaKey, Location};

/// Outcome of resolving a point to an area.
///
/// The two degraded variants both yield an unknown area but are kept apart
/// so callers and logs can tell them from a clean resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum AreaResolution {
    Resolved(AreaKey),
    NoCandidates,
    UnexpectedFormat(String),
}

impl AreaResolution {
    pub fn area(&self) -> AreaKey {
        match self {
            AreaResolution::Resolved(area) => area.clone(),
            _ => AreaKey::unknown(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, AreaResolution::Resolved(_))
    }
}

#[async_trait]
pub trait AreaResolver: Send + Sync {
    async fn resolve(&self, location: Location) -> Result<AreaResolution, RemoteError>;
}

/// Resolves areas by reverse geocoding and splitting the first candidate's
/// formatted address.
pub struct FormattedAddressResolver {
    places: Arc<dyn PlacesApi>,
    retry: RetryPolicy,
}

impl FormattedAddressResolver {
    pub fn new(places: Arc<dyn PlacesApi>, retry: RetryPolicy) -> Self {
        Self { places, retry }
    }
}

#[async_trait]
impl AreaResolver for FormattedAddressResolver {
    async fn resolve(&self, location: Location) -> Result<AreaResolution, RemoteError> {
        let candidates = with_retry(self.retry, "reverse geocode", || {
            self.places.reverse_geocode(location)
        })
        .await?;

        let formatted = match candidates.into_iter().next() {
            Some(candidate) => candidate.formatted_address.unwrap_or_default(),
            None => {
                warn!("Reverse geocode returned no candidates for {},{}", location.lat, location.lng);
                return Ok(AreaResolution::NoCandidates);
            }
        };

        match parse_formatted_address(&formatted) {
            Some(area) => Ok(AreaResolution::Resolved(area)),
            None => {
                warn!("Unexpected geocode format: {:?}", formatted);
                Ok(AreaResolution::UnexpectedFormat(formatted))
            }
        }
    }
}

/// Forward geocodes a free-text address to the location of its first match.
pub async fn locate(
    places: &dyn PlacesApi,
    retry: RetryPolicy,
    address: &str,
) -> Result<Option<Location>, RemoteError> {
    let candidates = with_retry(retry, "geocode", || places.geocode(address)).await?;
    Ok(candidates
        .into_iter()
        .find_map(|candidate| candidate.geometry.map(|geometry| geometry.location)))
}
