//! Data structures for the Grand Prix: racers, heats, bracket matches, and the event itself.

mod bracket;
mod grand_prix;
mod heat;
mod racer;

pub use bracket::{
    Bracket, BracketId, BracketMatch, Finals, MatchId, MatchLink, Placings, Round, Slot,
    SlotPosition, Stage, CHAMPIONSHIP_ID, IF_NECESSARY_ID, THIRD_PLACE_ID,
};
pub use grand_prix::{BracketError, GrandPrix, GrandPrixId, GrandPrixPhase};
pub use heat::{placement_points, Heat, HeatId, HeatResult, LANES};
pub use racer::{Participant, Racer, RacerId, Standing};
