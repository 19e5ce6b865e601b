//! Losers bracket topology.
//!
//! A racer leaves the bracket after two losses. Losers of winners-bracket matches drop in
//! here, one winners round at a time, and either race each other or race the survivors of
//! the previous losers round. The layout comes from a [`TopologyStrategy`]: the general
//! derivation, or a fixed chart for entrant counts where the derivation does not match the
//! conventional printed chart.

use crate::logic::winners::winners_match_id;
use crate::models::{Bracket, BracketMatch, MatchId, MatchLink, Round, Slot, SlotPosition, Stage};

/// Id of the `index`-th (0-based) match of losers round `round`.
pub fn losers_match_id(round: u32, index: usize) -> MatchId {
    format!("LB-R{}-M{}", round, index + 1)
}

/// Where one side of a losers-bracket match comes from. Rounds are 1-based, indexes 0-based.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Feed {
    /// Loser of a winners-bracket match.
    WinnersLoser { round: u32, index: usize },
    /// Winner of an earlier losers-bracket match.
    LosersWinner { round: u32, index: usize },
}

impl Feed {
    fn source_id(self) -> MatchId {
        match self {
            Feed::WinnersLoser { round, index } => winners_match_id(round, index),
            Feed::LosersWinner { round, index } => losers_match_id(round, index),
        }
    }
}

const fn wl(round: u32, index: usize) -> Feed {
    Feed::WinnersLoser { round, index }
}

const fn lw(round: u32, index: usize) -> Feed {
    Feed::LosersWinner { round, index }
}

/// Hand-enumerated losers bracket for one entrant count.
#[derive(Debug, Eq, PartialEq)]
pub struct FixedChart {
    pub entrants: usize,
    /// Rounds of (slot A, slot B) feeds. The last round has a single match.
    pub rounds: &'static [&'static [(Feed, Feed)]],
}

/// Conventional 12-entrant chart. Winners round 1 has byes for seeds 1-4, so its four
/// losers meet the four winners round 2 losers first, crossed to avoid rematches.
pub static TWELVE_ENTRANTS: FixedChart = FixedChart {
    entrants: 12,
    rounds: &[
        &[
            (wl(2, 3), wl(1, 1)),
            (wl(2, 2), wl(1, 3)),
            (wl(2, 1), wl(1, 5)),
            (wl(2, 0), wl(1, 7)),
        ],
        &[(lw(1, 0), lw(1, 1)), (lw(1, 2), lw(1, 3))],
        &[(lw(2, 0), wl(3, 1)), (lw(2, 1), wl(3, 0))],
        &[(lw(3, 0), lw(3, 1))],
        &[(lw(4, 0), wl(4, 0))],
    ],
};

/// Only add a chart here after checking it against a reference bracket chart.
static FIXED_CHARTS: &[&FixedChart] = &[&TWELVE_ENTRANTS];

/// How the losers bracket is laid out for a given entrant count.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TopologyStrategy {
    Derived,
    Fixed(&'static FixedChart),
}

impl TopologyStrategy {
    pub fn for_entrants(n: usize) -> Self {
        FIXED_CHARTS
            .iter()
            .find(|c| c.entrants == n)
            .map_or(TopologyStrategy::Derived, |c| TopologyStrategy::Fixed(*c))
    }
}

/// Build the losers rounds into `bracket` (winners rounds must already exist) and wire the
/// losers final to the championship (winner) and third place (loser).
pub(crate) fn build_losers_rounds(bracket: &mut Bracket, strategy: TopologyStrategy) {
    let mut layout = LosersLayout {
        bracket,
        rounds: Vec::new(),
    };
    let champion = match strategy {
        TopologyStrategy::Derived => layout.derive(),
        TopologyStrategy::Fixed(chart) => layout.lay_out_chart(chart),
    };
    let LosersLayout { bracket, rounds } = layout;

    if let Some(feed) = champion {
        let championship = MatchLink::new(bracket.finals.championship.clone(), SlotPosition::B);
        let third_place = MatchLink::new(bracket.finals.third_place.clone(), SlotPosition::A);
        if let Some(m) = bracket.get_match_mut(&feed.source_id()) {
            m.advance_winner_to = Some(championship);
            m.drop_loser_to = Some(third_place);
        }
    }
    log::debug!("Built losers bracket: {} rounds ({:?})", rounds.len(), strategy);
    bracket.losers_rounds = rounds;
}

struct LosersLayout<'a> {
    bracket: &'a mut Bracket,
    rounds: Vec<Round>,
}

impl LosersLayout<'_> {
    /// General derivation. Returns the feed of the losers champion.
    fn derive(&mut self) -> Option<Feed> {
        let winners: Vec<(u32, Vec<bool>)> = self
            .bracket
            .winners_rounds
            .iter()
            .map(|r| (r.round, self.bracket.round_matches(r).map(|m| m.is_bye()).collect()))
            .collect();

        let mut survivors: Vec<Feed> = Vec::new();
        for (round, byes) in winners {
            let drop_ins: Vec<Feed> = byes
                .iter()
                .enumerate()
                .filter(|(_, bye)| !**bye)
                .map(|(i, _)| wl(round, i))
                .collect();
            if survivors.is_empty() {
                survivors = self.push_round(pair_up(drop_ins));
                continue;
            }
            while survivors.len() > drop_ins.len() {
                survivors = self.push_round(pair_up(survivors));
            }
            survivors = self.push_round(cross(survivors, drop_ins));
        }
        while survivors.len() > 1 {
            survivors = self.push_round(pair_up(survivors));
        }
        survivors.first().copied()
    }

    fn lay_out_chart(&mut self, chart: &FixedChart) -> Option<Feed> {
        let mut survivors = Vec::new();
        for round in chart.rounds {
            survivors = self.push_round(round.iter().map(|&(a, b)| (a, Some(b))).collect());
        }
        survivors.first().copied()
    }

    /// Add one losers round and wire its feeds. A missing side B is a bye.
    /// Returns the winners of the new round, in order.
    fn push_round(&mut self, pairs: Vec<(Feed, Option<Feed>)>) -> Vec<Feed> {
        if pairs.is_empty() {
            return Vec::new();
        }
        let round = self.rounds.len() as u32 + 1;
        let mut matches = Vec::with_capacity(pairs.len());
        for (i, (a, b)) in pairs.into_iter().enumerate() {
            let mut m = BracketMatch::new(losers_match_id(round, i), Stage::Losers, round);
            if b.is_none() {
                m.slot_b = Slot::Bye;
            }
            let id = self.bracket.insert(m);
            self.wire(a, MatchLink::new(id.clone(), SlotPosition::A));
            if let Some(b) = b {
                self.wire(b, MatchLink::new(id.clone(), SlotPosition::B));
            }
            matches.push(id);
        }
        let winners = (0..matches.len()).map(|i| lw(round, i)).collect();
        self.rounds.push(Round { round, matches });
        winners
    }

    fn wire(&mut self, feed: Feed, target: MatchLink) {
        let Some(source) = self.bracket.get_match_mut(&feed.source_id()) else {
            return;
        };
        match feed {
            Feed::WinnersLoser { .. } => source.drop_loser_to = Some(target),
            Feed::LosersWinner { .. } => source.advance_winner_to = Some(target),
        }
    }
}

/// Pair entries in order; an odd one out gets a bye.
fn pair_up(entries: Vec<Feed>) -> Vec<(Feed, Option<Feed>)> {
    entries
        .chunks(2)
        .map(|pair| (pair[0], pair.get(1).copied()))
        .collect()
}

/// Survivors race drop-ins taken in reverse order; extra drop-ins race each other.
fn cross(survivors: Vec<Feed>, mut drop_ins: Vec<Feed>) -> Vec<(Feed, Option<Feed>)> {
    drop_ins.reverse();
    let extra = drop_ins.split_off(survivors.len().min(drop_ins.len()));
    let mut pairs: Vec<_> = survivors
        .into_iter()
        .zip(drop_ins)
        .map(|(s, d)| (s, Some(d)))
        .collect();
    pairs.extend(pair_up(extra));
    pairs
}
