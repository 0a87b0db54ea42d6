pub mod area;
pub mod places;
pub mod query;
pub mod restaurant;
