//! Applying a race result to the bracket.

use crate::models::{Bracket, BracketError, BracketMatch, RacerId, Slot};

/// Record `winner` (and `loser`) for a match and move both racers on.
///
/// - The winner is written into the match's advance target, the loser into its drop target.
///   Stale values there are overwritten, so a result can be re-scored.
/// - Championship: if the losers-bracket champion (slot B) wins, the if-necessary match is
///   filled with both racers; if the winners-bracket champion wins it is cleared.
/// - `loser` may be omitted; it is then the other racer in the match.
///
/// Everything is checked before anything is written: on error the bracket is untouched.
pub fn apply_result(
    bracket: &mut Bracket,
    match_id: &str,
    winner: RacerId,
    loser: Option<RacerId>,
) -> Result<(), BracketError> {
    let m = bracket.find_match(match_id)?;
    let loser = validate_outcome(m, winner, loser)?;
    let previous = (m.winner, m.loser);
    let advance = m.advance_winner_to.clone();
    let drop = m.drop_loser_to.clone();
    let is_championship = m.id == bracket.finals.championship;
    let rescored = previous.0.is_some() && previous != (Some(winner), loser);

    for link in advance.iter().chain(drop.iter()) {
        let played = bracket.played_downstream(link)?;
        if let (true, Some(downstream)) = (rescored, played) {
            return Err(BracketError::DownstreamResolved {
                match_id: match_id.to_string(),
                downstream,
            });
        }
    }
    if is_championship && rescored {
        if let Some(reset) = bracket.if_necessary().filter(|m| m.is_resolved()) {
            return Err(BracketError::DownstreamResolved {
                match_id: match_id.to_string(),
                downstream: reset.id.clone(),
            });
        }
    }

    if let Some(m) = bracket.get_match_mut(match_id) {
        m.winner = Some(winner);
        m.loser = loser;
    }
    if let Some(link) = &advance {
        bracket.place_racer(link, Some(winner));
    }
    if let (Some(link), Some(loser)) = (&drop, loser) {
        bracket.place_racer(link, Some(loser));
    }
    if is_championship && previous.0 != Some(winner) {
        settle_if_necessary(bracket);
    }

    log::info!("Match {}: winner {}, loser {:?}", match_id, winner, loser);
    Ok(())
}

/// Check the result against the match's slots and work out the loser.
fn validate_outcome(
    m: &BracketMatch,
    winner: RacerId,
    loser: Option<RacerId>,
) -> Result<Option<RacerId>, BracketError> {
    let invalid = |reason| BracketError::InvalidResult {
        match_id: m.id.clone(),
        reason,
    };
    if m.slot_a == Slot::Pending || m.slot_b == Slot::Pending {
        return Err(invalid("match is still waiting for a racer"));
    }
    if loser == Some(winner) {
        return Err(invalid("winner and loser are the same racer"));
    }
    let position = m
        .position_of(winner)
        .ok_or_else(|| invalid("winner is not racing in this match"))?;
    match (m.slot(position.other()), loser) {
        (Slot::Racer(other), None) => Ok(Some(other)),
        (Slot::Racer(other), Some(l)) if l == other => Ok(Some(l)),
        (Slot::Bye, None) => Ok(None),
        _ => Err(invalid("loser is not racing in this match")),
    }
}

/// Fill or clear the if-necessary match from the championship result.
fn settle_if_necessary(bracket: &mut Bracket) {
    let Some(gf) = bracket.championship() else {
        return;
    };
    let reset = gf.winner.is_some() && gf.winner == gf.slot_b.racer();
    let (slot_a, slot_b) = if reset {
        (gf.slot_a, gf.slot_b)
    } else {
        (Slot::Pending, Slot::Pending)
    };
    let id = bracket.finals.if_necessary.clone();
    if let Some(m) = bracket.get_match_mut(&id) {
        m.slot_a = slot_a;
        m.slot_b = slot_b;
        m.winner = None;
        m.loser = None;
    }
    if reset {
        log::info!("Losers bracket champion won the championship; if-necessary match is on");
    }
}
