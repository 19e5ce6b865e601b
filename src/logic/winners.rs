//! Winners bracket topology: round-1 pairings from the seeding order, empty later rounds,
//! and the winner advancement links between them.

use crate::logic::seeding::{next_power_of_two, standard_seeding};
use crate::models::{Bracket, BracketMatch, MatchId, MatchLink, Participant, Round, Slot, SlotPosition, Stage};

/// Id of the `index`-th (0-based) match of winners round `round`.
pub fn winners_match_id(round: u32, index: usize) -> MatchId {
    format!("WB-R{}-M{}", round, index + 1)
}

/// Build the winners rounds into `bracket`. `seeded` is sorted by seed, top seed first.
///
/// 1. Round 1 pairs consecutive entries of the standard seeding order; a seed above `n` is a
///    bye and the match resolves at once for the racer who is there.
/// 2. Each later round has half as many matches (rounded up), all slots pending.
/// 3. Match `i` advances to match `i / 2` of the next round, slot A if `i` is even else B.
///    The final feeds the championship slot A.
pub(crate) fn build_winners_rounds(bracket: &mut Bracket, seeded: &[Participant]) {
    let n = seeded.len();
    let order = standard_seeding(next_power_of_two(n));
    let seat = |seed: u32| match seeded.get(seed as usize - 1) {
        Some(p) => Slot::Racer(p.id),
        None => Slot::Bye,
    };

    let first: Vec<MatchId> = order
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            let mut m = BracketMatch::new(winners_match_id(1, i), Stage::Winners, 1);
            m.slot_a = seat(pair[0]);
            m.slot_b = seat(pair[1]);
            if m.is_bye() {
                m.winner = m.slot_a.racer().or(m.slot_b.racer());
            }
            bracket.insert(m)
        })
        .collect();

    let mut rounds = vec![Round { round: 1, matches: first }];
    while let Some(prev) = rounds.last().filter(|r| r.matches.len() > 1) {
        let round = prev.round + 1;
        let count = prev.matches.len().div_ceil(2);
        let matches = (0..count)
            .map(|i| bracket.insert(BracketMatch::new(winners_match_id(round, i), Stage::Winners, round)))
            .collect();
        rounds.push(Round { round, matches });
    }

    for pair in rounds.windows(2) {
        for (i, id) in pair[0].matches.iter().enumerate() {
            let target = MatchLink::new(pair[1].matches[i / 2].clone(), SlotPosition::for_index(i));
            if let Some(m) = bracket.get_match_mut(id) {
                m.advance_winner_to = Some(target);
            }
        }
    }
    let championship = bracket.finals.championship.clone();
    if let Some(m) = rounds
        .last()
        .and_then(|r| r.matches.first())
        .and_then(|id| bracket.get_match_mut(id))
    {
        m.advance_winner_to = Some(MatchLink::new(championship, SlotPosition::A));
    }

    log::debug!(
        "Built winners bracket: {} racers, {} rounds",
        n,
        rounds.len()
    );
    bracket.winners_rounds = rounds;
}

/// Move round-1 bye winners into their round-2 slots.
pub(crate) fn advance_byes(bracket: &mut Bracket) {
    let byes: Vec<(MatchLink, Option<_>)> = bracket
        .winners_rounds
        .first()
        .map(|r| {
            bracket
                .round_matches(r)
                .filter(|m| m.is_bye())
                .filter_map(|m| m.advance_winner_to.clone().map(|link| (link, m.winner)))
                .collect()
        })
        .unwrap_or_default();
    for (link, winner) in byes {
        bracket.place_racer(&link, winner);
    }
}
