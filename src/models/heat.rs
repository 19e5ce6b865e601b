//! Qualifying heats and their placements.

use crate::models::racer::RacerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a scored heat.
pub type HeatId = Uuid;

/// Lanes on the track; a heat never holds more racers than this.
pub const LANES: usize = 4;

/// One racer's finishing place in a heat (1 = first across the line).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatResult {
    pub racer_id: RacerId,
    pub placement: u32,
}

/// A scored qualifying heat.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Heat {
    pub id: HeatId,
    /// 1-based, in the order heats were scored.
    pub number: u32,
    pub results: Vec<HeatResult>,
}

impl Heat {
    pub fn new(number: u32, results: Vec<HeatResult>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            results,
        }
    }
}

/// Qualifying points for a placement: 1st 4, 2nd 3, 3rd 2, 4th 1.
pub fn placement_points(placement: u32) -> u32 {
    match placement {
        1..=4 => 5 - placement,
        _ => 0,
    }
}
