use std::fmt;

use serde::{Deserialize, Serialize};

pub const NO_NAME: &str = "No name available";
pub const NO_ADDRESS: &str = "No address available";
pub const NO_PRICE_LEVEL: &str = "No price level available";

/// A restaurant as persisted in the local catalog.
///
/// `keyword` records the search filter the row was discovered under and
/// partitions the cache; identity is the [`NaturalKey`] alone.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct RestaurantRecord {
    pub name: String,
    pub address: String,
    pub zipcode: Option<String>,
    pub city: Option<String>,
    pub rating: Option<f64>,
    pub price_level: Option<PriceLevel>,
    pub keyword: Option<String>,
}

impl RestaurantRecord {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            name: self.name.clone(),
            address: self.address.clone(),
            zipcode: self.zipcode.clone(),
        }
    }
}

/// (name, address, zipcode): the uniqueness constraint of the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub name: String,
    pub address: String,
    pub zipcode: Option<String>,
}

/// Price level as reported by the places provider.
///
/// The provider normally reports an integer 0-4, but older rows and odd
/// responses may carry free text which is kept verbatim.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum PriceLevel {
    Level(u8),
    Opaque(String),
}

impl PriceLevel {
    /// Parses the textual column representation back into a price level.
    pub fn from_stored(value: &str) -> Self {
        match value.trim().parse::<u8>() {
            Ok(level) => PriceLevel::Level(level),
            Err(_) => PriceLevel::Opaque(value.to_string()),
        }
    }

    pub fn to_stored(&self) -> String {
        match self {
            PriceLevel::Level(level) => level.to_string(),
            PriceLevel::Opaque(text) => text.clone(),
        }
    }

    /// `$` per level padded with `-` to five slots, e.g. `$$---`.
    pub fn render(&self) -> String {
        match self {
            PriceLevel::Level(level) => {
                let filled = usize::from(*level).min(5);
                format!("{}{}", "$".repeat(filled), "-".repeat(5 - filled))
            }
            PriceLevel::Opaque(text) => text.clone(),
        }
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
