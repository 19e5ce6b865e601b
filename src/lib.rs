//! Grand Prix racing tournament: double-elimination bracket engine with models and logic.

pub mod logic;
pub mod models;

pub use logic::{
    apply_result, build_bracket, bye_count, generate_bracket, import_racers_csv,
    losers_match_id, next_power_of_two, revert_result, score_heat, seed_from_standings,
    standard_seeding, standings, winners_match_id, TopologyStrategy,
};
pub use models::{
    placement_points, Bracket, BracketError, BracketMatch, GrandPrix, GrandPrixId,
    GrandPrixPhase, Heat, HeatResult, MatchId, MatchLink, Participant, Placings, Racer, RacerId,
    Round, Slot, SlotPosition, Stage, Standing,
};
