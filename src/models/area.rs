use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Coarse (city, zipcode) pair used to partition the local cache.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct AreaKey {
    pub city: Option<String>,
    pub zipcode: Option<String>,
}

impl AreaKey {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.city.is_none() && self.zipcode.is_none()
    }
}

/// Splits a formatted address such as `638 Uptown Blvd #120, Cedar Hill, TX 75104, USA`
/// into an area key. The city is the third-from-last segment and the zipcode is
/// the trailing token of the second-from-last one.
///
/// Returns `None` when the address has fewer than three segments.
pub fn parse_formatted_address(formatted: &str) -> Option<AreaKey> {
    let parts: Vec<&str> = formatted.split(',').collect();
    if parts.len() < 3 {
        return None;
    }

    let city = parts[parts.len() - 3].trim();
    let zipcode = parts[parts.len() - 2]
        .trim()
        .split(' ')
        .last()
        .unwrap_or_default();

    Some(AreaKey {
        city: non_empty(city),
        zipcode: non_empty(zipcode),
    })
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
