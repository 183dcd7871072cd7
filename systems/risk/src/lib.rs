#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Path risk scoring for lane and entry selection.
//!
//! Every score here is a pure function of the board's answers: the same
//! board yields the same lane, the same ordered ranking and the same chosen
//! entry. Ties always resolve to the candidate listed first.

mod hole;

use lane_tactics_core::{
    BoardQuery, Lane, Location, Player, StructureKind, UnitCatalog, UnitKind,
};

pub use hole::hole_check;

/// Number of opponent structures on each half of the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SideCounts {
    /// Structures in columns `0..=13`.
    pub left: usize,
    /// Structures in columns `14..=27`.
    pub right: usize,
}

/// Expected damage along one entry's path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntryScore {
    /// Deploy cell.
    pub location: Location,
    /// Damage the path is expected to absorb.
    pub damage: f64,
}

/// Damage balance of one entry for a single attacker archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArchetypeScore {
    /// Deploy cell.
    pub location: Location,
    /// Damage the path is expected to absorb.
    pub taken: f64,
    /// Damage the archetype can deal to opponent structures along the path.
    pub given: f64,
    /// `given - taken`; larger is better.
    pub net: f64,
}

/// Independent rankings for the fast and heavy attacker archetypes, best first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DualRanking {
    /// Ranking for scouts.
    pub fast: Vec<ArchetypeScore>,
    /// Ranking for demolishers.
    pub heavy: Vec<ArchetypeScore>,
}

/// Scores deploy cells by the damage their paths absorb and deal.
#[derive(Clone, Copy, Debug)]
pub struct RiskEvaluator<'c> {
    catalog: &'c UnitCatalog,
}

impl<'c> RiskEvaluator<'c> {
    /// Creates an evaluator backed by the unit table.
    #[must_use]
    pub const fn new(catalog: &'c UnitCatalog) -> Self {
        Self { catalog }
    }

    /// Counts opponent structures of every kind on each half.
    #[must_use]
    pub fn enemy_defense_split<Q: BoardQuery + ?Sized>(&self, board: &Q) -> SideCounts {
        let mut counts = SideCounts::default();
        for kind in StructureKind::ALL {
            for location in board.enemy_unit_locations(kind) {
                match location.lane() {
                    Lane::Left => counts.left += 1,
                    Lane::Right => counts.right += 1,
                }
            }
        }
        counts
    }

    /// Lane the assault corridor is built on.
    ///
    /// The corridor goes on the half where the opponent has more structures,
    /// because the lane geometry crosses the board and the wave lands on the
    /// opposite half. Equal counts choose the right lane.
    #[must_use]
    pub const fn choose_lane(counts: SideCounts) -> Lane {
        if counts.left > counts.right {
            Lane::Left
        } else {
            Lane::Right
        }
    }

    /// Lane chosen for the current board.
    #[must_use]
    pub fn offense_lane<Q: BoardQuery + ?Sized>(&self, board: &Q) -> Lane {
        let counts = self.enemy_defense_split(board);
        let lane = Self::choose_lane(counts);
        tracing::debug!(left = counts.left, right = counts.right, %lane, "offense lane");
        lane
    }

    /// Damage a mobile unit absorbs walking the path.
    #[must_use]
    pub fn damage_taken<Q: BoardQuery + ?Sized>(&self, board: &Q, path: &[Location]) -> f64 {
        let per_hit = self.catalog.stats(UnitKind::Turret).damage_to_mobile;
        path.iter()
            .map(|&cell| board.attackers_in_range(cell, Player::Own).len() as f64 * per_hit)
            .sum()
    }

    /// Damage an attacker archetype deals to opponent structures along the path.
    #[must_use]
    pub fn damage_given<Q: BoardQuery + ?Sized>(
        &self,
        board: &Q,
        path: &[Location],
        attacker: UnitKind,
    ) -> f64 {
        let stats = self.catalog.stats(attacker);
        path.iter()
            .map(|cell| {
                let targets = cell
                    .within_range(stats.attack_range)
                    .into_iter()
                    .filter(|target| !target.is_own_half())
                    .filter(|&target| {
                        board
                            .occupancy(target)
                            .is_some_and(|occupant| occupant.owner == Player::Opponent)
                    })
                    .count();
                targets as f64 * stats.damage_to_structure
            })
            .sum()
    }

    /// Candidate entries ordered by expected damage, safest first.
    ///
    /// Candidates whose path is empty (blocked deploy cells) are left out.
    #[must_use]
    pub fn rank_entries<Q: BoardQuery + ?Sized>(
        &self,
        board: &Q,
        candidates: &[Location],
    ) -> Vec<EntryScore> {
        let mut scores: Vec<EntryScore> = candidates
            .iter()
            .filter_map(|&location| {
                let path = board.path_to_exit(location);
                if path.is_empty() {
                    return None;
                }
                Some(EntryScore {
                    location,
                    damage: self.damage_taken(board, &path),
                })
            })
            .collect();
        scores.sort_by(|a, b| a.damage.total_cmp(&b.damage));
        scores
    }

    /// Safest entry, preferring the earliest candidate on ties.
    #[must_use]
    pub fn least_damage_entry<Q: BoardQuery + ?Sized>(
        &self,
        board: &Q,
        candidates: &[Location],
    ) -> Option<Location> {
        self.rank_entries(board, candidates)
            .first()
            .map(|score| score.location)
    }

    /// Ranks candidates separately for scouts and demolishers by net damage, best first.
    #[must_use]
    pub fn dual_rankings<Q: BoardQuery + ?Sized>(
        &self,
        board: &Q,
        candidates: &[Location],
    ) -> DualRanking {
        let mut ranking = DualRanking::default();
        for &location in candidates {
            let path = board.path_to_exit(location);
            if path.is_empty() {
                continue;
            }
            let taken = self.damage_taken(board, &path);
            for (attacker, scores) in [
                (UnitKind::Scout, &mut ranking.fast),
                (UnitKind::Demolisher, &mut ranking.heavy),
            ] {
                let given = self.damage_given(board, &path, attacker);
                scores.push(ArchetypeScore {
                    location,
                    taken,
                    given,
                    net: given - taken,
                });
            }
        }
        ranking.fast.sort_by(|a, b| b.net.total_cmp(&a.net));
        ranking.heavy.sort_by(|a, b| b.net.total_cmp(&a.net));
        ranking
    }
}
