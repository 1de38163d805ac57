//! Court data: a numbered playing court within a session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a court.
pub type CourtId = Uuid;

/// Whether a court currently hosts an active game.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourtStatus {
    #[default]
    Available,
    Occupied,
}

/// A physical court. `number` is 1-based and fixed at session setup; courts
/// fill in ascending `number` order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub name: String,
    pub number: u32,
    pub status: CourtStatus,
}

impl Court {
    pub fn new(name: impl Into<String>, number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            number,
            status: CourtStatus::Available,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == CourtStatus::Available
    }
}
