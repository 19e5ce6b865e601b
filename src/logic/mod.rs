//! Bracket business logic: heat scoring, seeding, topology, results, registration.

mod build;
mod heats;
mod losers;
mod registration;
mod results;
mod revert;
mod seeding;
mod winners;

pub use build::build_bracket;
pub use heats::score_heat;
pub use losers::{losers_match_id, Feed, FixedChart, TopologyStrategy, TWELVE_ENTRANTS};
pub use registration::{generate_bracket, import_racers_csv, seed_from_standings, standings};
pub use results::apply_result;
pub use revert::revert_result;
pub use seeding::{bye_count, next_power_of_two, standard_seeding};
pub use winners::winners_match_id;
