//! Registration phase: roster import, qualifying standings, seeding, bracket generation.

use crate::logic::build::build_bracket;
use crate::models::{Bracket, BracketError, GrandPrix, GrandPrixPhase, Racer, Standing};
use serde::Deserialize;
use std::cmp::Ordering;
use std::io::Read;

/// One roster row. Headers follow the registration sheet (`firstName,lastName,club,points`);
/// snake_case headers are accepted too.
#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "firstName", alias = "first_name")]
    first_name: String,
    #[serde(rename = "lastName", alias = "last_name")]
    last_name: String,
    #[serde(default)]
    club: Option<String>,
    #[serde(default)]
    points: Option<u32>,
}

/// Import racers from CSV (Registration only). Returns how many were added.
///
/// All rows are read and checked first; one bad row or duplicate name adds nobody.
pub fn import_racers_csv<R: Read>(grand_prix: &mut GrandPrix, reader: R) -> Result<usize, BracketError> {
    if grand_prix.phase() != GrandPrixPhase::Registration {
        return Err(BracketError::InvalidState);
    }
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut incoming: Vec<Racer> = Vec::new();
    for (line, row) in csv_reader.deserialize::<RosterRow>().enumerate() {
        let row = row.map_err(|e| BracketError::InvalidRoster(format!("row {}: {}", line + 1, e)))?;
        if row.first_name.is_empty() || row.last_name.is_empty() {
            return Err(BracketError::InvalidRoster(format!("row {}: name is required", line + 1)));
        }
        let taken = grand_prix
            .racers
            .iter()
            .chain(incoming.iter())
            .any(|r| r.is_named(&row.first_name, &row.last_name));
        if taken {
            return Err(BracketError::DuplicateRacerName);
        }
        let mut racer = Racer::new(row.first_name, row.last_name);
        racer.club = row.club.filter(|c| !c.is_empty());
        racer.points = row.points.unwrap_or(0);
        incoming.push(racer);
    }
    let added = incoming.len();
    grand_prix.racers.append(&mut incoming);
    log::info!("Imported {} racers into grand prix {}", added, grand_prix.id);
    Ok(added)
}

/// Qualifying standings: total points descending, then average points descending, then name.
pub fn standings(grand_prix: &GrandPrix) -> Vec<Standing> {
    let mut rows: Vec<Standing> = grand_prix.racers.iter().map(Standing::from_racer).collect();
    rows.sort_by(compare_standings);
    rows
}

fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| b.average_points.total_cmp(&a.average_points))
        .then_with(|| a.name.cmp(&b.name))
}

/// Assign seeds 1..n in standings order. Re-seeding supersedes any existing bracket.
pub fn seed_from_standings(grand_prix: &mut GrandPrix) -> Result<(), BracketError> {
    if grand_prix.racers.is_empty() {
        return Err(BracketError::InsufficientParticipants { count: 0 });
    }
    let order = standings(grand_prix);
    for (i, row) in order.iter().enumerate() {
        if let Some(r) = grand_prix.get_racer_mut(row.racer_id) {
            r.seed = Some(i as u32 + 1);
        }
    }
    grand_prix.discard_bracket();
    Ok(())
}

/// Build the bracket from the current seeds and make it the event's bracket, replacing any
/// previous one in a single assignment.
pub fn generate_bracket(grand_prix: &mut GrandPrix) -> Result<&Bracket, BracketError> {
    let participants = grand_prix.participants()?;
    let bracket = build_bracket(&participants)?;
    Ok(&*grand_prix.bracket.insert(bracket))
}
