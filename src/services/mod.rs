pub mod area_resolver;
pub mod lookup;
pub mod nearby_search;
pub mod report;
pub mod summary;
