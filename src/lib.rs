//! Cache-aside "restaurants near me" lookups backed by a local catalog and
//! the Google Places API, with generated summaries and a text report.

pub mod clients;
pub mod config;
pub mod error;
pub mod helpers;
pub mod models;
pub mod repositories;
pub mod services;

#[cfg(test)]
mod testing;
