//! External integrations used by the API handlers

pub mod geocoder;
pub mod link_preview;

pub use geocoder::{GeocodeError, GeocodeResult, Geocoder, MapboxGeocoder};
pub use link_preview::{HttpMetadataFetcher, IdeaDraft, LinkMetadata, MetadataFetcher};
