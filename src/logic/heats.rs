//! Scoring qualifying heats into racer points.

use crate::models::{placement_points, BracketError, GrandPrix, GrandPrixPhase, Heat, HeatResult, LANES};
use std::collections::HashSet;

/// Score one heat (Registration only): every racer gets the placement points and one more
/// heat run, and the heat is stored on the event.
///
/// Placements must be distinct and run from 1 to the number of racers in the heat. Nothing
/// is written unless every result checks out.
pub fn score_heat<'a>(grand_prix: &'a mut GrandPrix, results: &[HeatResult]) -> Result<&'a Heat, BracketError> {
    if grand_prix.phase() != GrandPrixPhase::Registration {
        return Err(BracketError::InvalidState);
    }
    validate_heat(grand_prix, results)?;

    for result in results {
        if let Some(racer) = grand_prix.get_racer_mut(result.racer_id) {
            racer.points += placement_points(result.placement);
            racer.heats_ran += 1;
        }
    }
    let heat = Heat::new(grand_prix.heats.len() as u32 + 1, results.to_vec());
    log::info!(
        "Scored heat {} of grand prix {} ({} racers)",
        heat.number,
        grand_prix.id,
        results.len()
    );
    grand_prix.heats.push(heat);
    grand_prix
        .heats
        .last()
        .ok_or(BracketError::InvalidState)
}

fn validate_heat(grand_prix: &GrandPrix, results: &[HeatResult]) -> Result<(), BracketError> {
    if results.is_empty() {
        return Err(BracketError::InvalidHeat("a heat needs at least one racer"));
    }
    if results.len() > LANES {
        return Err(BracketError::InvalidHeat("more racers than lanes"));
    }
    let mut racers = HashSet::new();
    let mut placements = HashSet::new();
    for result in results {
        if grand_prix.get_racer(result.racer_id).is_none() {
            return Err(BracketError::RacerNotFound(result.racer_id));
        }
        if !racers.insert(result.racer_id) {
            return Err(BracketError::InvalidHeat("racer listed twice"));
        }
        if result.placement == 0 || result.placement as usize > results.len() {
            return Err(BracketError::InvalidHeat("placement out of range"));
        }
        if !placements.insert(result.placement) {
            return Err(BracketError::InvalidHeat("placement given twice"));
        }
    }
    Ok(())
}
