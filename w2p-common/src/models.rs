//! Domain models shared by the database layer and the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::sequencer::{Coordinate, LocatableItem};
use crate::Error;

/// Kind of idea
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    #[default]
    Date,
    Gift,
    Meal,
}

/// Lifecycle of an idea
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdeaStatus {
    #[default]
    Saved,
    Planned,
    Done,
}

/// Where an idea came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Source {
    Tiktok,
    Instagram,
    Other,
    Text,
}

/// Stored-text conversions for the enums above
macro_rules! text_enum {
    ($ty:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(Error::InvalidInput(format!("Unknown {}: {}", $label, other))),
                }
            }
        }
    };
}

text_enum!(Category, "category", { Date => "DATE", Gift => "GIFT", Meal => "MEAL" });
text_enum!(IdeaStatus, "status", { Saved => "SAVED", Planned => "PLANNED", Done => "DONE" });
text_enum!(Source, "source", {
    Tiktok => "TIKTOK",
    Instagram => "INSTAGRAM",
    Other => "OTHER",
    Text => "TEXT",
});

/// A saved idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub source: Source,
    pub category: Category,
    pub status: IdeaStatus,
    pub image_url: Option<String>,
    pub place_name: Option<String>,
    pub place_address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub raw_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Idea {
    /// Position of the attached place, when both parts are usable
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.lat, self.lng)
    }

    pub fn to_locatable(&self) -> LocatableItem<Uuid> {
        LocatableItem::new(self.id, self.coordinate())
    }
}

/// A scheduled group of ideas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub title: String,
    pub scheduled_for: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership of an idea in a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub idea_id: Uuid,
    pub sort_order: i64,
}

/// Plan item joined with its idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanItemWithIdea {
    #[serde(flatten)]
    pub item: PlanItem,
    pub idea: Idea,
}

/// Plan with its items in visiting order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDetail {
    #[serde(flatten)]
    pub plan: Plan,
    pub items: Vec<PlanItemWithIdea>,
}
