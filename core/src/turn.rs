//! Per-turn command surface.
//!
//! A [`Turn`] is the only handle engine code uses to mutate the board. It reads
//! both balances once when the turn begins and clamps every request so the
//! cumulative spend never exceeds that opening ledger, nor the oracle's live
//! balance re-read before each call. Submitting consumes the handle, so no
//! command can be issued after the turn ends.

use serde::{Deserialize, Serialize};

use crate::{Command, Cost, Location, Occupant, Oracle, Player, ResourceKind, StructureKind, UnitKind};

/// Absorbs floating point noise when dividing balances by costs.
const AFFORDABILITY_EPSILON: f64 = 1e-9;

macro_rules! delegate_board_query {
    ($target:ty) => {
        impl<O: Oracle> crate::BoardQuery for $target {
            fn resource(&self, kind: ResourceKind, player: Player) -> f64 {
                self.oracle.resource(kind, player)
            }

            fn projected_resource(&self, kind: ResourceKind, turns_ahead: u32, player: Player) -> f64 {
                self.oracle.projected_resource(kind, turns_ahead, player)
            }

            fn cost(&self, unit: UnitKind) -> Cost {
                self.oracle.cost(unit)
            }

            fn upgrade_cost(&self, unit: UnitKind) -> Cost {
                self.oracle.upgrade_cost(unit)
            }

            fn occupancy(&self, location: Location) -> Option<Occupant> {
                self.oracle.occupancy(location)
            }

            fn path_to_exit(&self, start: Location) -> Vec<Location> {
                self.oracle.path_to_exit(start)
            }

            fn attackers_in_range(&self, location: Location, exposed: Player) -> Vec<Location> {
                self.oracle.attackers_in_range(location, exposed)
            }

            fn enemy_unit_locations(&self, kind: StructureKind) -> Vec<Location> {
                self.oracle.enemy_unit_locations(kind)
            }

            fn edge_locations(&self, quadrant: crate::Quadrant) -> Vec<Location> {
                self.oracle.edge_locations(quadrant)
            }

            fn turn_number(&self) -> u32 {
                self.oracle.turn_number()
            }

            fn own_health(&self) -> f64 {
                self.oracle.own_health()
            }

            fn opponent_health(&self) -> f64 {
                self.oracle.opponent_health()
            }
        }
    };
}

/// Snapshot of both currencies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Structure points.
    pub structure: f64,
    /// Mobile points.
    pub mobile: f64,
}

impl Balance {
    /// Returns the amount held in the provided currency.
    #[must_use]
    pub const fn of(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Structure => self.structure,
            ResourceKind::Mobile => self.mobile,
        }
    }
}

/// Structure confirmed placed during a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Cell the structure occupies.
    pub location: Location,
    /// Kind of structure placed.
    pub kind: StructureKind,
}

/// Everything a turn did, returned once the turn is submitted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnSummary {
    /// Turn the summary describes.
    pub turn: u32,
    /// Balance read when the turn began.
    pub opening: Balance,
    /// Total spend the turn requested, per currency.
    pub spent: Cost,
    /// Structures the oracle confirmed placed.
    pub placements: Vec<Placement>,
    /// Cells whose structures the oracle confirmed upgraded.
    pub upgrades: Vec<Location>,
    /// Commands in issue order, ending with [`Command::Submit`].
    pub commands: Vec<Command>,
}

impl TurnSummary {
    /// Number of mobile-unit spawn commands issued during the turn.
    #[must_use]
    pub fn mobile_spawn_commands(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, Command::Spawn { unit, .. } if unit.is_mobile()))
            .count()
    }
}

/// Ledger-backed command handle for a single turn.
#[derive(Debug)]
pub struct Turn<'a, O: Oracle> {
    oracle: &'a mut O,
    turn_number: u32,
    opening: Balance,
    spent: Cost,
    placements: Vec<Placement>,
    upgrades: Vec<Location>,
    commands: Vec<Command>,
}

impl<'a, O: Oracle> Turn<'a, O> {
    /// Starts a turn, reading both balances from the oracle.
    pub fn begin(oracle: &'a mut O) -> Self {
        let opening = Balance {
            structure: oracle.resource(ResourceKind::Structure, Player::Own),
            mobile: oracle.resource(ResourceKind::Mobile, Player::Own),
        };
        let turn_number = oracle.turn_number();
        tracing::debug!(
            turn = turn_number,
            structure = opening.structure,
            mobile = opening.mobile,
            "turn opened"
        );
        Self {
            oracle,
            turn_number,
            opening,
            spent: Cost::default(),
            placements: Vec::new(),
            upgrades: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Turn being planned.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.turn_number
    }

    /// Balance read when the turn began.
    #[must_use]
    pub const fn opening(&self) -> Balance {
        self.opening
    }

    /// Spend requested so far.
    #[must_use]
    pub const fn spent(&self) -> Cost {
        self.spent
    }

    /// Structures confirmed placed so far this turn.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Amount of a currency the turn may still spend.
    #[must_use]
    pub fn remaining(&self, kind: ResourceKind) -> f64 {
        let ledger = self.opening.of(kind) - self.spent.of(kind);
        let live = self.oracle.resource(kind, Player::Own);
        ledger.min(live).max(0.0)
    }

    /// Number of units of a kind the turn can still pay for.
    #[must_use]
    pub fn affordable(&self, unit: UnitKind) -> u32 {
        let cost = self.oracle.cost(unit);
        self.units_within_budget(cost)
    }

    fn units_within_budget(&self, cost: Cost) -> u32 {
        [ResourceKind::Structure, ResourceKind::Mobile]
            .into_iter()
            .map(|kind| {
                let price = cost.of(kind);
                if price <= 0.0 {
                    u32::MAX
                } else {
                    let units = ((self.remaining(kind) + AFFORDABILITY_EPSILON) / price).floor();
                    if units >= f64::from(u32::MAX) {
                        u32::MAX
                    } else {
                        units as u32
                    }
                }
            })
            .min()
            .unwrap_or(0)
    }

    /// Places units at each location in order, returning the number placed.
    ///
    /// Each location receives at most `max_count` units and never more than the
    /// ledger still allows; issuance stops once nothing more is affordable.
    pub fn spawn(&mut self, unit: UnitKind, locations: &[Location], max_count: u32) -> u32 {
        let cost = self.oracle.cost(unit);
        let mut total = 0;
        for &location in locations {
            let allowance = self.units_within_budget(cost).min(max_count);
            if allowance == 0 {
                break;
            }
            let placed = self.oracle.spawn(unit, &[location], allowance);
            self.commands.push(Command::Spawn {
                unit,
                locations: vec![location],
                max_count: allowance,
            });
            self.spent = self.spent + cost.times(placed);
            total += placed;
            if placed > 0 {
                if let Some(kind) = unit.structure() {
                    self.placements.push(Placement { location, kind });
                }
            }
            tracing::debug!(%unit, %location, placed, "spawn");
        }
        total
    }

    /// Upgrades this engine's non-upgraded structures at the listed cells.
    pub fn upgrade(&mut self, locations: &[Location]) -> u32 {
        let mut total = 0;
        for &location in locations {
            let Some(occupant) = self.oracle.occupancy(location) else {
                continue;
            };
            if occupant.owner != Player::Own || occupant.upgraded {
                continue;
            }
            let cost = self.oracle.upgrade_cost(occupant.kind.into());
            if self.units_within_budget(cost) == 0 {
                continue;
            }
            let upgraded = self.oracle.upgrade(&[location]);
            self.commands.push(Command::Upgrade {
                locations: vec![location],
            });
            self.spent = self.spent + cost.times(upgraded);
            total += upgraded;
            if upgraded > 0 {
                self.upgrades.push(location);
            }
        }
        total
    }

    /// Queues the listed cells for refunded removal.
    pub fn remove(&mut self, locations: &[Location]) -> u32 {
        if locations.is_empty() {
            return 0;
        }
        let removed = self.oracle.remove(locations);
        self.commands.push(Command::Remove {
            locations: locations.to_vec(),
        });
        tracing::debug!(requested = locations.len(), removed, "removal queued");
        removed
    }

    /// Temporarily lifts this engine's structure at `location` for a reachability probe.
    ///
    /// The structure is put back when the returned guard is dropped.
    pub fn probe_gap(&mut self, location: Location) -> GapProbe<'_, O> {
        GapProbe::new(&mut *self.oracle, location)
    }

    /// Ends the turn and returns what it did.
    pub fn submit(self) -> TurnSummary {
        self.oracle.submit();
        let mut commands = self.commands;
        commands.push(Command::Submit);
        tracing::debug!(
            turn = self.turn_number,
            structure = self.spent.structure,
            mobile = self.spent.mobile,
            commands = commands.len(),
            "turn submitted"
        );
        TurnSummary {
            turn: self.turn_number,
            opening: self.opening,
            spent: self.spent,
            placements: self.placements,
            upgrades: self.upgrades,
            commands,
        }
    }
}

delegate_board_query!(Turn<'_, O>);

/// Scoped probe that holds a friendly structure off the board.
///
/// Creating the guard lifts the structure (if this engine owns one on the
/// cell); dropping it restores the structure, on every exit path.
#[derive(Debug)]
pub struct GapProbe<'t, O: Oracle> {
    oracle: &'t mut O,
    location: Location,
    lifted: Option<Occupant>,
}

impl<'t, O: Oracle> GapProbe<'t, O> {
    fn new(oracle: &'t mut O, location: Location) -> Self {
        let lifted = match oracle.occupancy(location) {
            Some(occupant) if occupant.owner == Player::Own => oracle.lift_structure(location),
            _ => None,
        };
        Self {
            oracle,
            location,
            lifted,
        }
    }

    /// Cell being probed.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Structure held off the board, if one was lifted.
    #[must_use]
    pub const fn lifted(&self) -> Option<Occupant> {
        self.lifted
    }
}

impl<O: Oracle> Drop for GapProbe<'_, O> {
    fn drop(&mut self) {
        if let Some(occupant) = self.lifted.take() {
            self.oracle.restore_structure(self.location, occupant);
        }
    }
}

delegate_board_query!(GapProbe<'_, O>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_reads_each_currency() {
        let balance = Balance {
            structure: 40.0,
            mobile: 5.0,
        };
        assert_eq!(balance.of(ResourceKind::Structure), 40.0);
        assert_eq!(balance.of(ResourceKind::Mobile), 5.0);
    }

    #[test]
    fn summary_counts_only_mobile_spawns() {
        let cell = Location::new(13, 0).expect("valid");
        let summary = TurnSummary {
            commands: vec![
                Command::Spawn {
                    unit: UnitKind::Turret,
                    locations: vec![cell],
                    max_count: 1,
                },
                Command::Spawn {
                    unit: UnitKind::Scout,
                    locations: vec![cell],
                    max_count: 3,
                },
                Command::Submit,
            ],
            ..TurnSummary::default()
        };
        assert_eq!(summary.mobile_spawn_commands(), 1);
    }
}
