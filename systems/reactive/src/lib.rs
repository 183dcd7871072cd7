#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breach-driven fortification.
//!
//! Breach history is ranked by how often each exact cell was breached. Every
//! ranked cell gets one reinforcement: the first legal candidate offset
//! receives a turret and, unconditionally, a wall attempt on the same cell so
//! that something still covers the gap when the turret is unaffordable.

use std::collections::{BTreeMap, BTreeSet};

use lane_tactics_core::{BoardQuery, BreachEvent, Location, Oracle, Player, Turn, UnitKind};

/// Number of times a cell was breached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BreachRank {
    /// Breached cell.
    pub location: Location,
    /// Breaches reported at that exact cell.
    pub count: usize,
}

/// Ranks breached cells by frequency, most frequent first.
///
/// Cells breached equally often keep the order of their first breach.
#[must_use]
pub fn rank_breaches(history: &[BreachEvent]) -> Vec<BreachRank> {
    let mut index: BTreeMap<Location, usize> = BTreeMap::new();
    let mut ranking: Vec<BreachRank> = Vec::new();
    for event in history {
        match index.get(&event.location).copied() {
            Some(slot) => ranking[slot].count += 1,
            None => {
                let _ = index.insert(event.location, ranking.len());
                ranking.push(BreachRank {
                    location: event.location,
                    count: 1,
                });
            }
        }
    }
    ranking.sort_by(|a, b| b.count.cmp(&a.count));
    ranking
}

/// Candidate reinforcement cells for a breach, in the order they are tried.
///
/// The offsets are two rows inward, then two columns toward the centre and one
/// row inward, then two columns toward the centre on the same row. Offsets that
/// leave the arena are never produced.
#[must_use]
pub fn candidate_cells(breach: Location) -> Vec<Location> {
    let step = 2 * breach.toward_center();
    [(0, 2), (step, 1), (step, 0)]
        .into_iter()
        .filter_map(|(dx, dy)| breach.offset(dx, dy))
        .collect()
}

/// Reinforcement made for one ranked breach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReactivePlacement {
    /// Breach being answered.
    pub breach: Location,
    /// Cell that was reinforced.
    pub location: Location,
    /// Whether a turret was placed.
    pub turret_placed: bool,
    /// Whether the fallback wall was placed.
    pub wall_placed: bool,
}

/// Converts breach history into turret and wall placements.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReactiveDefenseBuilder;

impl ReactiveDefenseBuilder {
    /// Creates a builder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Reinforces every breached cell in rank order, skipping reserved cells.
    ///
    /// A candidate is used when a turret or wall was placed on it or one of
    /// this engine's structures already stands there.
    pub fn build<O: Oracle>(
        &self,
        turn: &mut Turn<'_, O>,
        history: &[BreachEvent],
        reserved: &BTreeSet<Location>,
    ) -> Vec<ReactivePlacement> {
        let mut placements = Vec::new();
        for rank in rank_breaches(history) {
            for candidate in candidate_cells(rank.location) {
                if reserved.contains(&candidate) {
                    continue;
                }
                let turret_placed = turn.spawn(UnitKind::Turret, &[candidate], 1) > 0;
                let wall_placed = turn.spawn(UnitKind::Wall, &[candidate], 1) > 0;
                let covered = turn
                    .occupancy(candidate)
                    .is_some_and(|occupant| occupant.owner == Player::Own);
                if turret_placed || wall_placed || covered {
                    tracing::debug!(
                        breach = %rank.location,
                        hits = rank.count,
                        %candidate,
                        turret_placed,
                        wall_placed,
                        "breach reinforced"
                    );
                    placements.push(ReactivePlacement {
                        breach: rank.location,
                        location: candidate,
                        turret_placed,
                        wall_placed,
                    });
                    break;
                }
            }
        }
        placements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: i32, y: i32) -> Location {
        Location::new(x, y).expect("cell inside the arena")
    }

    fn breach(x: i32, y: i32) -> BreachEvent {
        BreachEvent {
            location: at(x, y),
            turn: 0,
        }
    }

    #[test]
    fn frequency_ranking_is_stable_for_ties() {
        let history = [
            breach(20, 13),
            breach(3, 13),
            breach(7, 9),
            breach(3, 13),
            breach(3, 13),
            breach(7, 9),
            breach(24, 10),
        ];

        let ranking = rank_breaches(&history);

        assert_eq!(
            ranking,
            vec![
                BreachRank { location: at(3, 13), count: 3 },
                BreachRank { location: at(7, 9), count: 2 },
                BreachRank { location: at(20, 13), count: 1 },
                BreachRank { location: at(24, 10), count: 1 },
            ]
        );
    }

    #[test]
    fn candidates_step_toward_the_centre() {
        assert_eq!(
            candidate_cells(at(3, 13)),
            vec![at(3, 15), at(5, 14), at(5, 13)]
        );
        assert_eq!(
            candidate_cells(at(20, 13)),
            vec![at(20, 15), at(18, 14), at(18, 13)]
        );
    }

    #[test]
    fn candidates_outside_the_arena_are_never_produced() {
        assert_eq!(candidate_cells(at(0, 13)), vec![at(2, 14), at(2, 13)]);
        assert_eq!(candidate_cells(at(13, 0)), vec![at(13, 2), at(15, 1)]);
    }
}
