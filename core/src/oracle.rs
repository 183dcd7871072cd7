//! Contract between the decision engine and the external board collaborator.
//!
//! The collaborator owns the board: placement legality, pathfinding, range
//! queries and combat resolution all live on its side. The engine observes
//! it through [`BoardQuery`] and mutates it only through [`Oracle`], and in
//! practice only through a [`crate::Turn`] wrapping an oracle.

use serde::{Deserialize, Serialize};

use crate::{Cost, Location, Occupant, Player, Quadrant, ResourceKind, StructureKind, UnitKind};

/// Read-only questions the engine may ask about the current board.
pub trait BoardQuery {
    /// Current balance of a currency for a player.
    fn resource(&self, kind: ResourceKind, player: Player) -> f64;

    /// Balance of a currency the player will hold `turns_ahead` turns from now,
    /// ignoring anything spent this turn.
    fn projected_resource(&self, kind: ResourceKind, turns_ahead: u32, player: Player) -> f64;

    /// Price of placing one unit of the provided kind.
    fn cost(&self, unit: UnitKind) -> Cost;

    /// Price of upgrading one structure of the provided kind.
    fn upgrade_cost(&self, unit: UnitKind) -> Cost;

    /// Structure standing on a cell, if any.
    fn occupancy(&self, location: Location) -> Option<Occupant>;

    /// Ordered cells a mobile unit deployed at `start` would walk.
    ///
    /// Returns an empty path when `start` is blocked.
    fn path_to_exit(&self, start: Location) -> Vec<Location>;

    /// Turrets hostile to `exposed` whose range covers `location`.
    ///
    /// `exposed` is the side whose units would stand on the cell.
    fn attackers_in_range(&self, location: Location, exposed: Player) -> Vec<Location>;

    /// Cells holding opponent structures of the provided kind.
    fn enemy_unit_locations(&self, kind: StructureKind) -> Vec<Location>;

    /// Cells along a deploy edge.
    fn edge_locations(&self, quadrant: Quadrant) -> Vec<Location> {
        quadrant.cells()
    }

    /// Turn currently being planned, starting from zero.
    fn turn_number(&self) -> u32;

    /// Remaining health of this engine's side.
    fn own_health(&self) -> f64;

    /// Remaining health of the opponent.
    fn opponent_health(&self) -> f64;
}

/// Board collaborator that also executes commands.
///
/// Every mutating call is optimistic: the return value reports how many units
/// were actually affected and callers must never assume success.
pub trait Oracle: BoardQuery {
    /// Places up to `max_count` units at each listed location and returns the number placed.
    fn spawn(&mut self, unit: UnitKind, locations: &[Location], max_count: u32) -> u32;

    /// Upgrades the structures at the listed locations and returns the number upgraded.
    fn upgrade(&mut self, locations: &[Location]) -> u32;

    /// Queues the structures at the listed locations for refunded removal.
    fn remove(&mut self, locations: &[Location]) -> u32;

    /// Lifts a structure off the board without refunding it.
    ///
    /// Used only by scoped probes that put the structure back before returning.
    fn lift_structure(&mut self, location: Location) -> Option<Occupant>;

    /// Puts a previously lifted structure back on its cell.
    fn restore_structure(&mut self, location: Location, occupant: Occupant);

    /// Ends command issuance for the current turn.
    fn submit(&mut self);
}

/// Command issued against the oracle, as recorded by turn summaries and journals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Place units of a kind at the listed cells.
    Spawn {
        /// Unit requested.
        unit: UnitKind,
        /// Target cells.
        locations: Vec<Location>,
        /// Maximum units per cell.
        max_count: u32,
    },
    /// Upgrade the structures at the listed cells.
    Upgrade {
        /// Target cells.
        locations: Vec<Location>,
    },
    /// Queue the structures at the listed cells for removal.
    Remove {
        /// Target cells.
        locations: Vec<Location>,
    },
    /// Terminate the turn.
    Submit,
}
