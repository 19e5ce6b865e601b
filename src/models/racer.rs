//! Racer, Participant, and Standing data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a racer (used in bracket slots and lookups).
pub type RacerId = Uuid;

/// A racer as the bracket sees it: identity plus seed (1 = top seed).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: RacerId,
    pub seed: u32,
}

/// A registered racer in a Grand Prix.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Racer {
    pub id: RacerId,
    pub first_name: String,
    pub last_name: String,
    pub club: Option<String>,
    /// Qualifying points accumulated over the heats.
    pub points: u32,
    pub heats_ran: u32,
    /// Bracket seed; `None` until the racer has been seeded.
    pub seed: Option<u32>,
}

impl Racer {
    /// Create a new racer. Points and heats start at zero, no seed.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            club: None,
            points: 0,
            heats_ran: 0,
            seed: None,
        }
    }

    pub fn with_club(mut self, club: impl Into<String>) -> Self {
        self.club = Some(club.into());
        self
    }

    /// "First L" display name, as shown on standings and heat sheets.
    pub fn display_name(&self) -> String {
        match self.last_name.chars().next() {
            Some(initial) => format!("{} {}", self.first_name, initial),
            None => self.first_name.clone(),
        }
    }

    /// Average points per heat run (0 if the racer has not run yet).
    pub fn average_points(&self) -> f64 {
        if self.heats_ran == 0 {
            0.0
        } else {
            f64::from(self.points) / f64::from(self.heats_ran)
        }
    }

    /// The racer as a bracket participant, if seeded.
    pub fn participant(&self) -> Option<Participant> {
        self.seed.map(|seed| Participant { id: self.id, seed })
    }

    /// Names are compared case-insensitively.
    pub(crate) fn is_named(&self, first_name: &str, last_name: &str) -> bool {
        self.first_name.eq_ignore_ascii_case(first_name.trim())
            && self.last_name.eq_ignore_ascii_case(last_name.trim())
    }
}

/// One row of the qualifying standings (for API / display).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub racer_id: RacerId,
    pub name: String,
    pub club: Option<String>,
    pub total_points: u32,
    pub heats_ran: u32,
    pub average_points: f64,
}

impl Standing {
    pub fn from_racer(r: &Racer) -> Self {
        Self {
            racer_id: r.id,
            name: r.display_name(),
            club: r.club.clone(),
            total_points: r.points,
            heats_ran: r.heats_ran,
            average_points: r.average_points(),
        }
    }
}
