//! Bracket construction from a seeded participant list.

use crate::logic::losers::{build_losers_rounds, TopologyStrategy};
use crate::logic::winners::{advance_byes, build_winners_rounds};
use crate::models::{Bracket, BracketError, Participant};
use std::collections::HashSet;

/// Build a full double-elimination bracket: winners rounds, losers rounds, finals.
///
/// Participants are ordered by seed (ties keep their given order); seed position, not the
/// raw seed value, decides placement. Byes resolve at once and their racers already sit in
/// winners round 2.
pub fn build_bracket(participants: &[Participant]) -> Result<Bracket, BracketError> {
    if participants.len() < 2 {
        return Err(BracketError::InsufficientParticipants {
            count: participants.len(),
        });
    }
    let mut seen = HashSet::with_capacity(participants.len());
    if let Some(dup) = participants.iter().find(|p| !seen.insert(p.id)) {
        return Err(BracketError::DuplicateParticipant(dup.id));
    }

    let mut seeded = participants.to_vec();
    seeded.sort_by_key(|p| p.seed);

    let mut bracket = Bracket::new(seeded.clone());
    build_winners_rounds(&mut bracket, &seeded);
    build_losers_rounds(&mut bracket, TopologyStrategy::for_entrants(seeded.len()));
    advance_byes(&mut bracket);

    log::info!(
        "Generated bracket {} for {} racers ({} matches)",
        bracket.id,
        seeded.len(),
        bracket.matches.len()
    );
    Ok(bracket)
}
