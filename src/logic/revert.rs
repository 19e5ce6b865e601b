//! Undoing a race result.

use crate::models::{Bracket, BracketError, Slot};

/// Clear a match's result and take its winner and loser back out of the slots they were
/// moved into.
///
/// Reverting does not cascade. If a match the result flowed into has been raced since, the
/// revert is refused with `DownstreamResolved`; revert that match first. Byes along the way
/// are not raced and are cleared with it. Reverting an unresolved match does nothing.
/// Reverting the championship also clears the if-necessary match.
pub fn revert_result(bracket: &mut Bracket, match_id: &str) -> Result<(), BracketError> {
    let m = bracket.find_match(match_id)?;
    let Some(winner) = m.winner else {
        return Ok(());
    };
    if m.is_bye() {
        return Err(BracketError::InvalidResult {
            match_id: match_id.to_string(),
            reason: "a bye has no result to revert",
        });
    }
    let loser = m.loser;
    let advance = m.advance_winner_to.clone();
    let drop = m.drop_loser_to.clone();
    let is_championship = m.id == bracket.finals.championship;

    for link in advance.iter().chain(drop.iter()) {
        if let Some(downstream) = bracket.played_downstream(link)? {
            return Err(BracketError::DownstreamResolved {
                match_id: match_id.to_string(),
                downstream,
            });
        }
    }
    if is_championship {
        if let Some(reset) = bracket.if_necessary().filter(|m| m.is_resolved()) {
            return Err(BracketError::DownstreamResolved {
                match_id: match_id.to_string(),
                downstream: reset.id.clone(),
            });
        }
    }

    if let Some(m) = bracket.get_match_mut(match_id) {
        m.winner = None;
        m.loser = None;
    }
    if let Some(link) = &advance {
        bracket.remove_racer(link, winner);
    }
    if let (Some(link), Some(loser)) = (&drop, loser) {
        bracket.remove_racer(link, loser);
    }
    if is_championship {
        let id = bracket.finals.if_necessary.clone();
        if let Some(reset) = bracket.get_match_mut(&id) {
            reset.slot_a = Slot::Pending;
            reset.slot_b = Slot::Pending;
            reset.winner = None;
            reset.loser = None;
        }
    }

    log::info!("Match {}: result reverted", match_id);
    Ok(())
}
