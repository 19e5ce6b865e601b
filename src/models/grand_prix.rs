//! GrandPrix (the event) and BracketError.

use crate::models::bracket::{Bracket, MatchId};
use crate::models::heat::Heat;
use crate::models::racer::{Participant, Racer, RacerId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during Grand Prix and bracket operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// A bracket needs at least two participants.
    InsufficientParticipants { count: usize },
    /// The same racer was listed twice in the seeded participant list.
    DuplicateParticipant(RacerId),
    /// No match with this id in the bracket.
    MatchNotFound(MatchId),
    /// Winner/loser are not legal occupants of the match, or the match cannot take a result.
    InvalidResult { match_id: MatchId, reason: &'static str },
    /// The result already flowed into a match that has been raced since.
    DownstreamResolved { match_id: MatchId, downstream: MatchId },
    /// No bracket has been generated for this Grand Prix yet.
    BracketNotFound(GrandPrixId),
    /// Racer not found in the roster.
    RacerNotFound(RacerId),
    /// A racer with this name already exists (case-insensitive).
    DuplicateRacerName,
    /// A racer has no seed, so the bracket cannot be built.
    UnseededRacer(RacerId),
    /// Grand Prix is not in a phase that allows this action.
    InvalidState,
    /// Roster file could not be read.
    InvalidRoster(String),
    /// A required name (racer first/last name, event name) is empty.
    InvalidName,
    /// Heat results are inconsistent (duplicate racer or placement, too many racers).
    InvalidHeat(&'static str),
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::InsufficientParticipants { count } => {
                write!(f, "Need at least 2 racers to build a bracket (have {})", count)
            }
            BracketError::DuplicateParticipant(_) => write!(f, "A racer is seeded more than once"),
            BracketError::MatchNotFound(id) => write!(f, "Match {} not found", id),
            BracketError::InvalidResult { match_id, reason } => {
                write!(f, "Invalid result for match {}: {}", match_id, reason)
            }
            BracketError::DownstreamResolved { match_id, downstream } => write!(
                f,
                "Cannot change match {}: match {} has already been raced",
                match_id, downstream
            ),
            BracketError::BracketNotFound(_) => write!(f, "No bracket has been generated yet"),
            BracketError::RacerNotFound(_) => write!(f, "Racer not found"),
            BracketError::DuplicateRacerName => write!(f, "A racer with this name already exists"),
            BracketError::UnseededRacer(_) => write!(f, "Every racer needs a seed before the bracket is built"),
            BracketError::InvalidState => write!(f, "Invalid state for this action"),
            BracketError::InvalidRoster(msg) => write!(f, "Invalid roster: {}", msg),
            BracketError::InvalidName => write!(f, "Name is required"),
            BracketError::InvalidHeat(reason) => write!(f, "Invalid heat results: {}", reason),
        }
    }
}

impl std::error::Error for BracketError {}

/// Unique identifier for a Grand Prix.
pub type GrandPrixId = Uuid;

/// Current phase of the event, derived from the bracket.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrandPrixPhase {
    /// Registering racers and running qualifying heats; no bracket yet.
    #[default]
    Registration,
    /// Bracket generated, champion not decided.
    Bracket,
    /// Champion decided.
    Completed,
}

/// One Grand Prix event: roster, qualifying points, and its bracket.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GrandPrix {
    pub id: GrandPrixId,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub racers: Vec<Racer>,
    /// Scored qualifying heats, in scoring order.
    #[serde(default)]
    pub heats: Vec<Heat>,
    /// Current bracket; replaced wholesale when the event is re-seeded.
    pub bracket: Option<Bracket>,
}

impl GrandPrix {
    /// Create a new event with no racers, dated today.
    pub fn new(name: impl Into<String>) -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            location: None,
            date: created_at.date_naive(),
            created_at,
            racers: Vec::new(),
            heats: Vec::new(),
            bracket: None,
        }
    }

    pub fn phase(&self) -> GrandPrixPhase {
        match &self.bracket {
            None => GrandPrixPhase::Registration,
            Some(b) if b.is_complete() => GrandPrixPhase::Completed,
            Some(_) => GrandPrixPhase::Bracket,
        }
    }

    /// The current bracket, or `BracketNotFound`.
    pub fn bracket(&self) -> Result<&Bracket, BracketError> {
        self.bracket.as_ref().ok_or(BracketError::BracketNotFound(self.id))
    }

    pub fn bracket_mut(&mut self) -> Result<&mut Bracket, BracketError> {
        let id = self.id;
        self.bracket.as_mut().ok_or(BracketError::BracketNotFound(id))
    }

    pub fn get_racer(&self, id: RacerId) -> Option<&Racer> {
        self.racers.iter().find(|r| r.id == id)
    }

    pub fn get_racer_mut(&mut self, id: RacerId) -> Option<&mut Racer> {
        self.racers.iter_mut().find(|r| r.id == id)
    }

    /// Register a racer (Registration only). Names must be unique (case-insensitive).
    pub fn add_racer(
        &mut self,
        first_name: &str,
        last_name: &str,
        club: Option<&str>,
    ) -> Result<RacerId, BracketError> {
        if self.phase() != GrandPrixPhase::Registration {
            return Err(BracketError::InvalidState);
        }
        let (first, last) = (first_name.trim(), last_name.trim());
        if first.is_empty() || last.is_empty() {
            return Err(BracketError::InvalidName);
        }
        if self.racers.iter().any(|r| r.is_named(first, last)) {
            return Err(BracketError::DuplicateRacerName);
        }
        let mut racer = Racer::new(first, last);
        racer.club = club.map(str::trim).filter(|c| !c.is_empty()).map(String::from);
        let id = racer.id;
        self.racers.push(racer);
        Ok(id)
    }

    /// Remove a racer by id (Registration only).
    pub fn remove_racer(&mut self, racer_id: RacerId) -> Result<(), BracketError> {
        if self.phase() != GrandPrixPhase::Registration {
            return Err(BracketError::InvalidState);
        }
        let idx = self
            .racers
            .iter()
            .position(|r| r.id == racer_id)
            .ok_or(BracketError::RacerNotFound(racer_id))?;
        self.racers.remove(idx);
        Ok(())
    }

    /// Record a racer's qualifying totals as tallied by heat scoring (Registration only).
    pub fn set_racer_points(
        &mut self,
        racer_id: RacerId,
        points: u32,
        heats_ran: u32,
    ) -> Result<(), BracketError> {
        if self.phase() != GrandPrixPhase::Registration {
            return Err(BracketError::InvalidState);
        }
        let r = self
            .get_racer_mut(racer_id)
            .ok_or(BracketError::RacerNotFound(racer_id))?;
        r.points = points;
        r.heats_ran = heats_ran;
        Ok(())
    }

    /// Seed a racer by hand. Changing seeds supersedes any existing bracket.
    ///
    /// Seeds may be shared while they are being edited; racers with the same seed are
    /// placed in roster order when the bracket is built.
    pub fn set_racer_seed(&mut self, racer_id: RacerId, seed: u32) -> Result<(), BracketError> {
        if seed == 0 {
            return Err(BracketError::InvalidState);
        }
        let r = self
            .get_racer_mut(racer_id)
            .ok_or(BracketError::RacerNotFound(racer_id))?;
        r.seed = Some(seed);
        self.discard_bracket();
        Ok(())
    }

    /// Edit the event details. `None` leaves a field as it is; the name may not be blank.
    pub fn update_details(
        &mut self,
        name: Option<&str>,
        description: Option<String>,
        location: Option<String>,
        date: Option<NaiveDate>,
    ) -> Result<(), BracketError> {
        if let Some(name) = name {
            let name = name.trim();
            if name.is_empty() {
                return Err(BracketError::InvalidName);
            }
            self.name = name.to_string();
        }
        if description.is_some() {
            self.description = description;
        }
        if location.is_some() {
            self.location = location;
        }
        if let Some(date) = date {
            self.date = date;
        }
        Ok(())
    }

    /// Drop the current bracket (back to Registration).
    pub fn discard_bracket(&mut self) {
        if self.bracket.take().is_some() {
            log::info!("Discarded bracket for grand prix {}", self.id);
        }
    }

    /// Seeded participant list for bracket building. Every racer must have a seed.
    pub fn participants(&self) -> Result<Vec<Participant>, BracketError> {
        self.racers
            .iter()
            .map(|r| r.participant().ok_or(BracketError::UnseededRacer(r.id)))
            .collect()
    }
}
