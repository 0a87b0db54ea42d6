use async_trait::async_trait;

use crate::error::RemoteError;
use crate::models::area::Location;
use crate::models::places::{GeocodeCandidate, PlacesPage};

pub mod genai;
pub mod google_maps;

pub const RESTAURANT_PLACE_TYPE: &str = "restaurant";

/// Geocoding and nearby-search operations of the maps provider.
#[async_trait]
pub trait PlacesApi: Send + Sync {
    /// Forward geocode of a free-text address. Empty when nothing matches.
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeCandidate>, RemoteError>;

    async fn reverse_geocode(&self, location: Location) -> Result<Vec<GeocodeCandidate>, RemoteError>;

    /// First page of places of `place_type` within `radius_meters` of `location`.
    async fn nearby_search(
        &self,
        location: Location,
        radius_meters: f64,
        place_type: &str,
        keyword: Option<&str>,
    ) -> Result<PlacesPage, RemoteError>;

    /// Follow-up page for a `next_page_token` returned by a previous page.
    async fn continue_page(&self, page_token: &str) -> Result<PlacesPage, RemoteError>;
}

/// A generative text provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_instruction: &str, content: &str) -> Result<String, RemoteError>;
}
