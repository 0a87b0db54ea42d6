//! Google Maps Platform adapter: geocoding and the legacy Places nearby search.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::clients::PlacesApi;
use crate::error::RemoteError;
use crate::models::area::Location;
use crate::models::places::{GeocodeCandidate, GeocodeResponse, PlacesPage, PlacesResponse};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const NEARBY_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

#[derive(Clone)]
pub struct GoogleMapsClient {
    client: reqwest::Client,
    api_key: String,
}

impl GoogleMapsClient {
    pub fn new(api_key: String) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, api_key })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let response = self
            .client
            .get(endpoint)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::Http {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("undecodable body from {}: {}", endpoint, e)))
    }

    async fn places(&self, params: &[(&str, String)], continuation: bool) -> Result<PlacesPage, RemoteError> {
        let response: PlacesResponse = self.get_json(NEARBY_SEARCH_URL, params).await?;
        check_status(&response.status, response.error_message.as_deref(), continuation)?;
        debug!(
            "Places page with {} results, more pages: {}",
            response.results.len(),
            response.next_page_token.is_some()
        );
        Ok(PlacesPage::from(response))
    }
}

/// Maps a provider status to success or a classified error.
///
/// `INVALID_REQUEST` on a continuation means the page token has not become
/// active yet, which resolves itself after a short wait.
fn check_status(status: &str, message: Option<&str>, continuation: bool) -> Result<(), RemoteError> {
    let retryable = match status {
        "OK" | "ZERO_RESULTS" => return Ok(()),
        "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR" => true,
        "INVALID_REQUEST" => continuation,
        _ => false,
    };

    Err(RemoteError::Status {
        status: status.to_string(),
        message: message.unwrap_or_default().to_string(),
        retryable,
    })
}

fn lat_lng(location: Location) -> String {
    format!("{},{}", location.lat, location.lng)
}

#[async_trait]
impl PlacesApi for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeCandidate>, RemoteError> {
        let response: GeocodeResponse = self
            .get_json(GEOCODE_URL, &[("address", address.to_string())])
            .await?;
        check_status(&response.status, response.error_message.as_deref(), false)?;
        Ok(response.results)
    }

    async fn reverse_geocode(&self, location: Location) -> Result<Vec<GeocodeCandidate>, RemoteError> {
        let response: GeocodeResponse = self
            .get_json(GEOCODE_URL, &[("latlng", lat_lng(location))])
            .await?;
        check_status(&response.status, response.error_message.as_deref(), false)?;
        Ok(response.results)
    }

    async fn nearby_search(
        &self,
        location: Location,
        radius_meters: f64,
        place_type: &str,
        keyword: Option<&str>,
    ) -> Result<PlacesPage, RemoteError> {
        let mut params = vec![
            ("location", lat_lng(location)),
            ("radius", (radius_meters as u64).to_string()),
            ("type", place_type.to_string()),
        ];
        if let Some(keyword) = keyword {
            params.push(("keyword", keyword.to_string()));
        }

        self.places(&params, false).await
    }

    async fn continue_page(&self, page_token: &str) -> Result<PlacesPage, RemoteError> {
        self.places(&[("pagetoken", page_token.to_string())], true).await
    }
}
