//! HTTP API handlers for w2p-api

pub mod extract;
pub mod geocode;
pub mod health;
pub mod ideas;
pub mod ingest;
pub mod itineraries;
pub mod plans;
mod validation;

pub use geocode::geocode_routes;
pub use health::health_routes;
pub use ideas::idea_routes;
pub use ingest::ingest_routes;
pub use itineraries::itinerary_routes;
pub use plans::plan_routes;
