//! Bracket aggregate: matches, rounds, finals, and the links between matches.
//!
//! Matches are stored in one arena keyed by [`MatchId`]. Rounds and finals hold ids, and
//! every advancement or drop pointer is a plain (match id, slot) pair, so the whole bracket
//! serializes as-is and reloads without any pointer fix-up.

use crate::models::grand_prix::BracketError;
use crate::models::racer::{Participant, RacerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Stable match key, e.g. `WB-R1-M1`, `LB-R3-M2`, `GF-M1`.
pub type MatchId = String;

/// Unique identifier for a generated bracket.
pub type BracketId = Uuid;

pub const CHAMPIONSHIP_ID: &str = "GF-M1";
pub const IF_NECESSARY_ID: &str = "GF-M2";
pub const THIRD_PLACE_ID: &str = "3P-M1";

/// Which side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum SlotPosition {
    A,
    B,
}

impl SlotPosition {
    pub fn other(self) -> Self {
        match self {
            SlotPosition::A => SlotPosition::B,
            SlotPosition::B => SlotPosition::A,
        }
    }

    /// Slot fed by the `index`-th match of the previous round (even → A, odd → B).
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            SlotPosition::A
        } else {
            SlotPosition::B
        }
    }
}

/// Contents of one side of a match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "racer", rename_all = "snake_case")]
pub enum Slot {
    /// Not decided yet.
    #[default]
    Pending,
    Racer(RacerId),
    /// No opponent will ever arrive.
    Bye,
}

impl Slot {
    pub fn racer(self) -> Option<RacerId> {
        match self {
            Slot::Racer(id) => Some(id),
            Slot::Pending | Slot::Bye => None,
        }
    }
}

/// Where a winner advances to, or a loser drops to.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct MatchLink {
    pub match_id: MatchId,
    pub slot: SlotPosition,
}

impl MatchLink {
    pub fn new(match_id: impl Into<MatchId>, slot: SlotPosition) -> Self {
        Self {
            match_id: match_id.into(),
            slot,
        }
    }
}

/// Stage of the bracket a match belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Winners,
    Losers,
    Finals,
}

/// A single head-to-head race in the bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: MatchId,
    pub stage: Stage,
    pub round: u32,
    pub slot_a: Slot,
    pub slot_b: Slot,
    /// None until resolved.
    pub winner: Option<RacerId>,
    /// None until resolved, and always None for a bye.
    pub loser: Option<RacerId>,
    pub advance_winner_to: Option<MatchLink>,
    /// Only on matches that feed the losers bracket (or third place).
    pub drop_loser_to: Option<MatchLink>,
}

impl BracketMatch {
    pub fn new(id: impl Into<MatchId>, stage: Stage, round: u32) -> Self {
        Self {
            id: id.into(),
            stage,
            round,
            slot_a: Slot::Pending,
            slot_b: Slot::Pending,
            winner: None,
            loser: None,
            advance_winner_to: None,
            drop_loser_to: None,
        }
    }

    pub fn slot(&self, position: SlotPosition) -> Slot {
        match position {
            SlotPosition::A => self.slot_a,
            SlotPosition::B => self.slot_b,
        }
    }

    pub fn slot_mut(&mut self, position: SlotPosition) -> &mut Slot {
        match position {
            SlotPosition::A => &mut self.slot_a,
            SlotPosition::B => &mut self.slot_b,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.winner.is_some()
    }

    /// A bye has only one possible occupant and is never raced.
    pub fn is_bye(&self) -> bool {
        self.slot_a == Slot::Bye || self.slot_b == Slot::Bye
    }

    /// Both sides hold a racer and no result is in yet.
    pub fn is_ready(&self) -> bool {
        !self.is_resolved() && self.slot_a.racer().is_some() && self.slot_b.racer().is_some()
    }

    /// Which side `racer` occupies, if any.
    pub fn position_of(&self, racer: RacerId) -> Option<SlotPosition> {
        if self.slot_a == Slot::Racer(racer) {
            Some(SlotPosition::A)
        } else if self.slot_b == Slot::Racer(racer) {
            Some(SlotPosition::B)
        } else {
            None
        }
    }

    /// Clear the result and put the bye occupant (if any) back through as winner.
    fn resolve_bye(&mut self) {
        self.loser = None;
        self.winner = match (self.slot_a, self.slot_b) {
            (Slot::Racer(id), Slot::Bye) | (Slot::Bye, Slot::Racer(id)) => Some(id),
            _ => None,
        };
    }
}

/// Ordered matches of one round of one stage. Round numbers are 1-based.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub round: u32,
    pub matches: Vec<MatchId>,
}

/// The three named finals matches.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Finals {
    pub championship: MatchId,
    pub if_necessary: MatchId,
    pub third_place: MatchId,
}

impl Default for Finals {
    fn default() -> Self {
        Self {
            championship: CHAMPIONSHIP_ID.to_string(),
            if_necessary: IF_NECESSARY_ID.to_string(),
            third_place: THIRD_PLACE_ID.to_string(),
        }
    }
}

/// Final standings read from the finals stage.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Placings {
    pub champion: Option<RacerId>,
    pub runner_up: Option<RacerId>,
    pub third_place: Option<RacerId>,
}

/// Double-elimination bracket: winners rounds, losers rounds, and finals.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bracket {
    pub id: BracketId,
    /// Participants sorted by seed (index 0 is the top seed).
    pub participants: Vec<Participant>,
    pub winners_rounds: Vec<Round>,
    pub losers_rounds: Vec<Round>,
    pub finals: Finals,
    /// Every match of the bracket, keyed by id.
    pub matches: HashMap<MatchId, BracketMatch>,
}

impl Bracket {
    /// Empty bracket holding only the finals matches. Third place is a bye: the
    /// losers-bracket final's loser takes it without racing again.
    pub fn new(participants: Vec<Participant>) -> Self {
        let finals = Finals::default();
        let mut matches = HashMap::new();
        let championship = BracketMatch::new(finals.championship.clone(), Stage::Finals, 1);
        let if_necessary = BracketMatch::new(finals.if_necessary.clone(), Stage::Finals, 2);
        let mut third_place = BracketMatch::new(finals.third_place.clone(), Stage::Finals, 1);
        third_place.slot_b = Slot::Bye;
        for m in [championship, if_necessary, third_place] {
            matches.insert(m.id.clone(), m);
        }
        Self {
            id: Uuid::new_v4(),
            participants,
            winners_rounds: Vec::new(),
            losers_rounds: Vec::new(),
            finals,
            matches,
        }
    }

    /// Add a match to the arena; returns its id.
    pub(crate) fn insert(&mut self, m: BracketMatch) -> MatchId {
        let id = m.id.clone();
        self.matches.insert(id.clone(), m);
        id
    }

    /// Look up a match. Ids are unique across winners, losers and finals, so one lookup
    /// covers all three stages.
    pub fn get_match(&self, id: &str) -> Option<&BracketMatch> {
        self.matches.get(id)
    }

    pub fn get_match_mut(&mut self, id: &str) -> Option<&mut BracketMatch> {
        self.matches.get_mut(id)
    }

    pub fn find_match(&self, id: &str) -> Result<&BracketMatch, BracketError> {
        self.get_match(id)
            .ok_or_else(|| BracketError::MatchNotFound(id.to_string()))
    }

    /// Matches of a round, in order.
    pub fn round_matches<'a>(&'a self, round: &'a Round) -> impl Iterator<Item = &'a BracketMatch> + 'a {
        round.matches.iter().filter_map(move |id| self.get_match(id))
    }

    pub fn championship(&self) -> Option<&BracketMatch> {
        self.get_match(&self.finals.championship)
    }

    pub fn if_necessary(&self) -> Option<&BracketMatch> {
        self.get_match(&self.finals.if_necessary)
    }

    pub fn third_place(&self) -> Option<&BracketMatch> {
        self.get_match(&self.finals.third_place)
    }

    /// Seed of a participant, if they are in this bracket.
    pub fn seed_of(&self, racer: RacerId) -> Option<u32> {
        self.participants.iter().find(|p| p.id == racer).map(|p| p.seed)
    }

    /// Matches waiting for a result (both racers known).
    pub fn ready_matches(&self) -> Vec<&BracketMatch> {
        self.winners_rounds
            .iter()
            .chain(self.losers_rounds.iter())
            .flat_map(|r| self.round_matches(r))
            .chain([self.championship(), self.if_necessary()].into_iter().flatten())
            .filter(|m| m.is_ready())
            .collect()
    }

    /// Champion, runner-up and third place, as far as they are decided.
    pub fn placings(&self) -> Placings {
        let third_place = self.third_place().and_then(|m| m.winner);
        let decider = match (self.championship(), self.if_necessary()) {
            (Some(gf), Some(reset)) if gf.winner.is_some() && gf.winner == gf.slot_b.racer() => {
                Some(reset)
            }
            (Some(gf), _) => Some(gf),
            (None, _) => None,
        };
        Placings {
            champion: decider.and_then(|m| m.winner),
            runner_up: decider.and_then(|m| m.loser),
            third_place,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.placings().champion.is_some()
    }

    /// Matches a link leads through: the target, then onward through any byes.
    /// Fails if a link points at a match that does not exist.
    pub(crate) fn follow_link(&self, link: &MatchLink) -> Result<Vec<&BracketMatch>, BracketError> {
        let mut path = Vec::new();
        let mut next = Some(link);
        while let Some(l) = next {
            let m = self.find_match(&l.match_id)?;
            path.push(m);
            if path.len() > self.matches.len() {
                break;
            }
            next = if m.is_bye() {
                m.advance_winner_to.as_ref()
            } else {
                None
            };
        }
        Ok(path)
    }

    /// First match along `link` that has been raced (byes are skipped over).
    pub(crate) fn played_downstream(&self, link: &MatchLink) -> Result<Option<MatchId>, BracketError> {
        Ok(self
            .follow_link(link)?
            .into_iter()
            .find(|m| !m.is_bye() && m.is_resolved())
            .map(|m| m.id.clone()))
    }

    /// Write `racer` (or pending, for `None`) into the slot `link` points at. A bye match
    /// resolves on the spot and hands its racer on to its own target.
    pub(crate) fn place_racer(&mut self, link: &MatchLink, racer: Option<RacerId>) {
        let mut next = Some(link.clone());
        let mut hops = 0;
        while let Some(l) = next.take() {
            hops += 1;
            if hops > self.matches.len() {
                break;
            }
            let Some(m) = self.matches.get_mut(&l.match_id) else {
                break;
            };
            *m.slot_mut(l.slot) = racer.map_or(Slot::Pending, Slot::Racer);
            if m.is_bye() {
                m.resolve_bye();
                next = m.advance_winner_to.clone();
            }
        }
    }

    /// Like `place_racer(link, None)`, but only if the slot still holds `racer`.
    pub(crate) fn remove_racer(&mut self, link: &MatchLink, racer: RacerId) {
        let holds = self
            .get_match(&link.match_id)
            .is_some_and(|m| m.slot(link.slot) == Slot::Racer(racer));
        if holds {
            self.place_racer(link, None);
        }
    }
}
