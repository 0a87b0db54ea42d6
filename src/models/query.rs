use serde::{Deserialize, Serialize};

use crate::models::area::Location;

pub const METERS_PER_MILE: f64 = 1609.34;

/// A single "restaurants near here" request.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SearchQuery {
    pub center: Location,
    pub radius_meters: f64,
    pub keyword: Option<String>,
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(center: Location, radius_meters: f64, keyword: Option<String>, limit: usize) -> Self {
        Self {
            center,
            radius_meters,
            keyword: normalize_keyword(keyword.as_deref()),
            limit,
        }
    }

    pub fn radius_miles(&self) -> f64 {
        self.radius_meters / METERS_PER_MILE
    }
}

/// Trims and lowercases a food-type filter; blank input means unfiltered.
pub fn normalize_keyword(keyword: Option<&str>) -> Option<String> {
    keyword
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
}
