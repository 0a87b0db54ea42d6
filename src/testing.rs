//! In-crate doubles for the remote collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::clients::{PlacesApi, TextGenerator};
use crate::error::RemoteError;
use crate::models::area::Location;
use crate::models::places::{GeocodeCandidate, Geometry, PlaceCandidate, PlacesPage};

pub fn place(name: &str, vicinity: &str, location: Location) -> PlaceCandidate {
    PlaceCandidate {
        name: Some(name.to_string()),
        vicinity: Some(vicinity.to_string()),
        formatted_address: None,
        rating: Some(4.0),
        price_level: None,
        geometry: Some(Geometry { location }),
    }
}

fn candidate(address: &str, location: Location) -> GeocodeCandidate {
    GeocodeCandidate {
        formatted_address: Some(address.to_string()),
        geometry: Some(Geometry { location }),
    }
}

fn unavailable() -> RemoteError {
    RemoteError::Status {
        status: "REQUEST_DENIED".to_string(),
        message: "test double".to_string(),
        retryable: false,
    }
}

fn location_key(location: Location) -> (u64, u64) {
    (location.lat.to_bits(), location.lng.to_bits())
}

#[derive(Default)]
pub struct FakePlaces {
    default_address: Option<String>,
    addresses: HashMap<(u64, u64), String>,
    geocoded: HashMap<String, Location>,
    pages: Vec<Vec<PlaceCandidate>>,
    fail_reverse_geocode: bool,
    failing_locations: Vec<(u64, u64)>,
    fail_search: bool,
    pub reverse_geocode_calls: AtomicUsize,
    pub nearby_calls: AtomicUsize,
    pub continue_calls: AtomicUsize,
    page_fetches: Mutex<Vec<Instant>>,
}

impl FakePlaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address returned by reverse geocode for any point without its own entry.
    pub fn with_default_address(mut self, address: &str) -> Self {
        self.default_address = Some(address.to_string());
        self
    }

    pub fn with_address_at(mut self, location: Location, address: &str) -> Self {
        self.addresses.insert(location_key(location), address.to_string());
        self
    }

    pub fn with_geocode(mut self, query: &str, location: Location) -> Self {
        self.geocoded.insert(query.to_string(), location);
        self
    }

    /// Queues a result page; pages after the first are reached through
    /// continuation tokens.
    pub fn with_page(mut self, results: Vec<PlaceCandidate>) -> Self {
        self.pages.push(results);
        self
    }

    pub fn failing_reverse_geocode(mut self) -> Self {
        self.fail_reverse_geocode = true;
        self
    }

    pub fn failing_reverse_geocode_at(mut self, location: Location) -> Self {
        self.failing_locations.push(location_key(location));
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn remote_search_calls(&self) -> usize {
        self.nearby_calls.load(Ordering::SeqCst) + self.continue_calls.load(Ordering::SeqCst)
    }

    pub fn page_fetch_times(&self) -> Vec<Instant> {
        self.page_fetches.lock().unwrap().clone()
    }

    fn page(&self, index: usize) -> PlacesPage {
        self.page_fetches.lock().unwrap().push(Instant::now());
        let results = self.pages.get(index).cloned().unwrap_or_default();
        let next_page_token = if index + 1 < self.pages.len() {
            Some(format!("page-{}", index + 1))
        } else {
            None
        };
        PlacesPage { results, next_page_token }
    }
}

#[async_trait]
impl PlacesApi for FakePlaces {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeCandidate>, RemoteError> {
        Ok(self
            .geocoded
            .get(address)
            .map(|location| vec![candidate(address, *location)])
            .unwrap_or_default())
    }

    async fn reverse_geocode(&self, location: Location) -> Result<Vec<GeocodeCandidate>, RemoteError> {
        self.reverse_geocode_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reverse_geocode || self.failing_locations.contains(&location_key(location)) {
            return Err(unavailable());
        }
        let address = self
            .addresses
            .get(&location_key(location))
            .or(self.default_address.as_ref());
        Ok(address
            .map(|address| vec![candidate(address, location)])
            .unwrap_or_default())
    }

    async fn nearby_search(
        &self,
        _location: Location,
        _radius_meters: f64,
        _place_type: &str,
        _keyword: Option<&str>,
    ) -> Result<PlacesPage, RemoteError> {
        self.nearby_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(unavailable());
        }
        Ok(self.page(0))
    }

    async fn continue_page(&self, page_token: &str) -> Result<PlacesPage, RemoteError> {
        self.continue_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(unavailable());
        }
        let index = page_token
            .strip_prefix("page-")
            .and_then(|index| index.parse::<usize>().ok())
            .ok_or_else(|| RemoteError::InvalidResponse(format!("unknown token {}", page_token)))?;
        Ok(self.page(index))
    }
}

/// Echoes its input so tests can check which record a summary belongs to.
#[derive(Default)]
pub struct FakeGenerator {
    fail_on_call: Option<usize>,
    pub calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `call`-th request (zero based) with a terminal error.
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, _system_instruction: &str, content: &str) -> Result<String, RemoteError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_call == Some(call) {
            return Err(unavailable());
        }
        Ok(format!("About: {}", content))
    }
}
