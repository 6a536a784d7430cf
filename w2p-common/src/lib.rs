//! # Wish2Plan Common Library
//!
//! Shared code for the Wish2Plan service including:
//! - Domain models (ideas, plans, plan items)
//! - Database initialization
//! - Configuration loading and root folder resolution
//! - Itinerary sequencing (nearest-neighbor visiting order)

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod sequencer;

pub use error::{Error, Result};
pub use sequencer::{sequence, Coordinate, LocatableItem};
