//! Itinerary sequencing
//!
//! Produces a visiting order over a set of plan candidates. Items with a
//! known position are chained with a greedy nearest-neighbor walk; items
//! without one are appended afterward in their original order.
//!
//! Distances are planar: latitude and longitude are treated as plain
//! Cartesian axes. For the handful of stops in a date plan this is close
//! enough and keeps the ordering predictable.
//!
//! # Ordering rules
//! - The walk starts at the first located item in input order
//! - Each hop goes to the strictly nearest remaining item
//! - Ties go to the item that appeared earliest in the input
//! - Unlocated items keep their relative input order at the end
//!
//! # Example
//! ```
//! use w2p_common::sequencer::{sequence, LocatableItem};
//!
//! let items = vec![
//!     LocatableItem::located("A", 0.0, 0.0),
//!     LocatableItem::located("B", 10.0, 10.0),
//!     LocatableItem::located("C", 1.0, 1.0),
//!     LocatableItem::unlocated("D"),
//! ];
//!
//! assert_eq!(sequence(items), vec!["A", "C", "B", "D"]);
//! ```

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a coordinate from independently optional parts
    ///
    /// Returns `None` unless both parts are present and finite. A lone
    /// latitude or longitude does not locate an item.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self::new(lat, lng)).filter(Self::is_valid),
            _ => None,
        }
    }

    /// Both components are real numbers (not NaN, not infinite)
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Straight-line distance in coordinate space
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        (dlat * dlat + dlng * dlng).sqrt()
    }
}

/// An identifier with an optional position
#[derive(Debug, Clone, PartialEq)]
pub struct LocatableItem<I> {
    pub id: I,
    pub coordinate: Option<Coordinate>,
}

impl<I> LocatableItem<I> {
    pub fn new(id: I, coordinate: Option<Coordinate>) -> Self {
        Self { id, coordinate }
    }

    pub fn located(id: I, lat: f64, lng: f64) -> Self {
        Self::new(id, Some(Coordinate::new(lat, lng)))
    }

    pub fn unlocated(id: I) -> Self {
        Self::new(id, None)
    }

    /// Build from nullable columns, as stored on an idea
    pub fn from_parts(id: I, lat: Option<f64>, lng: Option<f64>) -> Self {
        Self::new(id, Coordinate::from_parts(lat, lng))
    }

    /// Coordinate usable for distance computation, if any
    fn position(&self) -> Option<Coordinate> {
        self.coordinate.filter(Coordinate::is_valid)
    }
}

/// Order items for visiting
///
/// The result is always a permutation of the input identifiers. The
/// function is total: malformed coordinates demote an item to
/// "unlocated" instead of failing.
pub fn sequence<I>(items: impl IntoIterator<Item = LocatableItem<I>>) -> Vec<I> {
    let mut located: Vec<(I, Coordinate)> = Vec::new();
    let mut unlocated: Vec<I> = Vec::new();

    for item in items {
        match item.position() {
            Some(position) => located.push((item.id, position)),
            None => unlocated.push(item.id),
        }
    }

    let mut ordered = Vec::with_capacity(located.len() + unlocated.len());

    if located.len() > 1 {
        // Remaining pool keeps input order so the first strict minimum
        // is also the earliest one on ties.
        let mut pool = located;
        let (first_id, mut current) = pool.remove(0);
        ordered.push(first_id);

        while !pool.is_empty() {
            let mut nearest = 0;
            let mut nearest_distance = current.distance_to(&pool[0].1);

            for (index, (_, candidate)) in pool.iter().enumerate().skip(1) {
                let distance = current.distance_to(candidate);
                if distance < nearest_distance {
                    nearest = index;
                    nearest_distance = distance;
                }
            }

            let (id, position) = pool.remove(nearest);
            ordered.push(id);
            current = position;
        }
    } else {
        ordered.extend(located.into_iter().map(|(id, _)| id));
    }

    ordered.extend(unlocated);
    ordered
}

/// Total hop distance along an ordered path
pub fn route_length(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|hop| hop[0].distance_to(&hop[1])).sum()
}
