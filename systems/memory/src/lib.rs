#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Owned cache of this engine's structures.
//!
//! Entries are created from confirmed placements and pruned against the
//! board at the start of every turn. Reads name the turn they are made for and
//! fail with [`StaleMemory`] unless the cache was reconciled during that turn.

use std::collections::BTreeMap;

use lane_tactics_core::{BoardQuery, Location, Player, StructureKind, TurnSummary};
use thiserror::Error;

/// Cached knowledge about one friendly structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructureRecord {
    /// Cell holding the structure.
    pub location: Location,
    /// Kind of structure.
    pub kind: StructureKind,
    /// Whether the structure has been upgraded.
    pub upgraded: bool,
}

/// Read attempted without reconciling for the current turn.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("board memory was last reconciled on turn {reconciled:?} but was read on turn {requested}")]
pub struct StaleMemory {
    /// Turn of the most recent reconciliation, if any.
    pub reconciled: Option<u32>,
    /// Turn the read was made for.
    pub requested: u32,
}

/// Changes made by one reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Records still matching the board.
    pub retained: usize,
    /// Cells whose records were dropped because the structure is gone or changed.
    pub dropped: Vec<Location>,
    /// Cells whose records were marked upgraded.
    pub upgraded: Vec<Location>,
}

/// Registry of friendly structures keyed by location.
#[derive(Clone, Debug, Default)]
pub struct BoardMemory {
    records: BTreeMap<Location, StructureRecord>,
    reconciled_turn: Option<u32>,
}

impl BoardMemory {
    /// Creates an empty memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares every record with the board and prunes those no longer backed by it.
    pub fn reconcile<Q: BoardQuery + ?Sized>(&mut self, board: &Q) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        self.records.retain(|&location, record| {
            let Some(occupant) = board.occupancy(location) else {
                report.dropped.push(location);
                return false;
            };
            if occupant.owner != Player::Own || occupant.kind != record.kind {
                report.dropped.push(location);
                return false;
            }
            if occupant.upgraded && !record.upgraded {
                record.upgraded = true;
                report.upgraded.push(location);
            }
            true
        });
        report.retained = self.records.len();
        let turn = board.turn_number();
        self.reconciled_turn = Some(turn);
        if !report.dropped.is_empty() {
            tracing::debug!(turn, dropped = report.dropped.len(), "memory pruned");
        }
        report
    }

    /// Adds the placements and upgrades a submitted turn confirmed.
    pub fn record(&mut self, summary: &TurnSummary) {
        for placement in &summary.placements {
            let _ = self.records.insert(
                placement.location,
                StructureRecord {
                    location: placement.location,
                    kind: placement.kind,
                    upgraded: false,
                },
            );
        }
        for location in &summary.upgrades {
            if let Some(record) = self.records.get_mut(location) {
                record.upgraded = true;
            }
        }
    }

    /// Turn of the most recent reconciliation.
    #[must_use]
    pub const fn reconciled_turn(&self) -> Option<u32> {
        self.reconciled_turn
    }

    fn ensure_fresh(&self, turn: u32) -> Result<(), StaleMemory> {
        if self.reconciled_turn == Some(turn) {
            Ok(())
        } else {
            let error = StaleMemory {
                reconciled: self.reconciled_turn,
                requested: turn,
            };
            tracing::warn!(%error, "stale memory read");
            Err(error)
        }
    }

    /// Every cached structure, ordered by location.
    pub fn structures(&self, turn: u32) -> Result<Vec<StructureRecord>, StaleMemory> {
        self.ensure_fresh(turn)?;
        Ok(self.records.values().copied().collect())
    }

    /// Cells holding cached structures of a kind, optionally filtered by upgrade state.
    pub fn locations(
        &self,
        turn: u32,
        kind: StructureKind,
        upgraded: Option<bool>,
    ) -> Result<Vec<Location>, StaleMemory> {
        self.ensure_fresh(turn)?;
        Ok(self
            .records
            .values()
            .filter(|record| record.kind == kind)
            .filter(|record| upgraded.map_or(true, |wanted| record.upgraded == wanted))
            .map(|record| record.location)
            .collect())
    }

    /// Number of cached structures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Reports whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_tactics_core::Placement;

    #[test]
    fn reads_before_any_reconciliation_are_stale() {
        let memory = BoardMemory::new();
        assert_eq!(
            memory.structures(0),
            Err(StaleMemory {
                reconciled: None,
                requested: 0
            })
        );
    }

    #[test]
    fn record_tracks_placements_and_upgrades() {
        let cell = Location::new(0, 13).expect("valid");
        let mut memory = BoardMemory::new();
        memory.record(&TurnSummary {
            placements: vec![Placement {
                location: cell,
                kind: StructureKind::Turret,
            }],
            upgrades: vec![cell],
            ..TurnSummary::default()
        });
        assert_eq!(memory.len(), 1);
        assert!(memory.records[&cell].upgraded);
    }
}
