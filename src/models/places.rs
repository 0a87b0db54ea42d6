//! Wire types for the Google Maps geocoding and places endpoints.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};

use crate::models::area::Location;
use crate::models::restaurant::PriceLevel;

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Geometry {
    pub location: Location,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GeocodeCandidate {
    pub formatted_address: Option<String>,
    pub geometry: Option<Geometry>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeCandidate>,
    pub error_message: Option<String>,
}

/// One result of a nearby search, as returned by the provider.
#[serde_as]
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct PlaceCandidate {
    pub name: Option<String>,
    pub vicinity: Option<String>,
    pub formatted_address: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub price_level: Option<PriceLevel>,
    pub geometry: Option<Geometry>,
}

impl PlaceCandidate {
    pub fn location(&self) -> Option<Location> {
        self.geometry.as_ref().map(|g| g.location)
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct PlacesPage {
    #[serde(default)]
    pub results: Vec<PlaceCandidate>,
    pub next_page_token: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PlacesResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceCandidate>,
    pub next_page_token: Option<String>,
    pub error_message: Option<String>,
}

impl From<PlacesResponse> for PlacesPage {
    fn from(response: PlacesResponse) -> Self {
        Self {
            results: response.results,
            next_page_token: response.next_page_token,
        }
    }
}
