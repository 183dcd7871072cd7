#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative reference board for the lane tactics engine.
//!
//! [`World`] implements the [`Oracle`] contract in memory: it enforces
//! placement legality, charges and refunds both currencies, answers path and
//! range queries and journals every command it receives. It never simulates
//! combat; health only changes when breach events are applied explicitly.

mod navigation;

use std::collections::{BTreeMap, BTreeSet};

use lane_tactics_core::{
    BoardQuery, Command, Cost, EventKind, EventRecord, Lane, Location, Occupant, Oracle, Player,
    Quadrant, ResourceKind, StructureKind, UnitCatalog, UnitKind,
};

/// Income, refund and starting values governing the board economy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Economy {
    /// Structure points each player gains when a turn advances.
    pub structure_income: f64,
    /// Mobile points each player gains when a turn advances.
    pub mobile_income: f64,
    /// Share of the amount paid for a structure refunded when it is removed.
    pub refund_rate: f64,
    /// Health each player starts with.
    pub starting_health: f64,
    /// Structure points each player starts with.
    pub starting_structure: f64,
    /// Mobile points each player starts with.
    pub starting_mobile: f64,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            structure_income: 5.0,
            mobile_income: 5.0,
            refund_rate: 0.75,
            starting_health: 30.0,
            starting_structure: 40.0,
            starting_mobile: 5.0,
        }
    }
}

/// Outcome of a command recorded in the journal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran and affected the reported number of units.
    Applied(u32),
    /// The command arrived after the turn was submitted and was ignored.
    Refused,
}

/// One command received by the board.
#[derive(Clone, Debug, PartialEq)]
pub struct JournalEntry {
    /// Turn during which the command arrived.
    pub turn: u32,
    /// The command itself.
    pub command: Command,
    /// What the board did with it.
    pub outcome: Outcome,
}

/// Mobile units deployed during the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MobileDeployment {
    /// Kind of unit deployed.
    pub unit: UnitKind,
    /// Deploy cell.
    pub location: Location,
    /// Number of units deployed on the cell.
    pub count: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Purse {
    structure: f64,
    mobile: f64,
}

impl Purse {
    fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Structure => self.structure,
            ResourceKind::Mobile => self.mobile,
        }
    }

    fn slot(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Structure => &mut self.structure,
            ResourceKind::Mobile => &mut self.mobile,
        }
    }

    fn can_pay(&self, cost: Cost) -> bool {
        self.structure + 1e-9 >= cost.structure && self.mobile + 1e-9 >= cost.mobile
    }

    fn pay(&mut self, cost: Cost) {
        self.structure -= cost.structure;
        self.mobile -= cost.mobile;
    }
}

/// In-memory board implementing the oracle contract.
#[derive(Clone, Debug)]
pub struct World {
    catalog: UnitCatalog,
    economy: Economy,
    structures: BTreeMap<Location, Occupant>,
    pending_removals: BTreeSet<Location>,
    deployments: Vec<MobileDeployment>,
    own: Purse,
    opponent: Purse,
    own_health: f64,
    opponent_health: f64,
    turn: u32,
    submitted: bool,
    journal: Vec<JournalEntry>,
}

impl World {
    /// Creates an empty board with the default economy.
    #[must_use]
    pub fn new(catalog: UnitCatalog) -> Self {
        Self::with_economy(catalog, Economy::default())
    }

    /// Creates an empty board with a custom economy.
    #[must_use]
    pub fn with_economy(catalog: UnitCatalog, economy: Economy) -> Self {
        let purse = Purse {
            structure: economy.starting_structure,
            mobile: economy.starting_mobile,
        };
        Self {
            catalog,
            economy,
            structures: BTreeMap::new(),
            pending_removals: BTreeSet::new(),
            deployments: Vec::new(),
            own: purse,
            opponent: purse,
            own_health: economy.starting_health,
            opponent_health: economy.starting_health,
            turn: 0,
            submitted: false,
            journal: Vec::new(),
        }
    }

    fn purse(&self, player: Player) -> &Purse {
        match player {
            Player::Own => &self.own,
            Player::Opponent => &self.opponent,
        }
    }

    fn purse_mut(&mut self, player: Player) -> &mut Purse {
        match player {
            Player::Own => &mut self.own,
            Player::Opponent => &mut self.opponent,
        }
    }

    /// Overrides a player's balance.
    pub fn set_resource(&mut self, player: Player, kind: ResourceKind, amount: f64) {
        *self.purse_mut(player).slot(kind) = amount;
    }

    /// Overrides a player's health.
    pub fn set_health(&mut self, player: Player, health: f64) {
        match player {
            Player::Own => self.own_health = health,
            Player::Opponent => self.opponent_health = health,
        }
    }

    /// Jumps to a turn number without applying income.
    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    /// Places a structure for free, ignoring whose half the cell is on.
    ///
    /// Returns `false` when the cell is already occupied.
    pub fn place(&mut self, player: Player, kind: StructureKind, location: Location) -> bool {
        self.place_with(Occupant::new(kind, player), location)
    }

    /// Places an upgraded structure for free.
    pub fn place_upgraded(&mut self, player: Player, kind: StructureKind, location: Location) -> bool {
        self.place_with(
            Occupant {
                kind,
                upgraded: true,
                owner: player,
            },
            location,
        )
    }

    fn place_with(&mut self, occupant: Occupant, location: Location) -> bool {
        if self.structures.contains_key(&location) {
            return false;
        }
        let _ = self.structures.insert(location, occupant);
        true
    }

    /// Structures owned by a player, ordered by location.
    #[must_use]
    pub fn structures(&self, player: Player) -> Vec<(Location, Occupant)> {
        self.structures
            .iter()
            .filter(|(_, occupant)| occupant.owner == player)
            .map(|(&location, &occupant)| (location, occupant))
            .collect()
    }

    /// Cells queued for removal when the turn advances.
    #[must_use]
    pub fn pending_removals(&self) -> Vec<Location> {
        self.pending_removals.iter().copied().collect()
    }

    /// Mobile units deployed during the current turn.
    #[must_use]
    pub fn deployments(&self) -> &[MobileDeployment] {
        &self.deployments
    }

    /// Every command received so far.
    #[must_use]
    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    /// Reports whether the current turn has been submitted.
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Applies breach events to health: each breach costs the breached side one point.
    pub fn apply_breaches(&mut self, records: &[EventRecord]) {
        for record in records.iter().filter(|record| record.kind == EventKind::Breach) {
            match record.owner {
                Player::Opponent => self.own_health -= 1.0,
                Player::Own => self.opponent_health -= 1.0,
            }
        }
    }

    /// Resolves the end of the turn: removals are refunded, income is paid and
    /// command issuance reopens.
    pub fn advance_turn(&mut self) {
        let removals = std::mem::take(&mut self.pending_removals);
        for location in removals {
            let Some(occupant) = self.structures.remove(&location) else {
                continue;
            };
            let refund = self.paid_for(occupant).structure * self.economy.refund_rate;
            self.purse_mut(occupant.owner).structure += refund;
        }
        for player in [Player::Own, Player::Opponent] {
            let economy = self.economy;
            let purse = self.purse_mut(player);
            purse.structure += economy.structure_income;
            purse.mobile += economy.mobile_income;
        }
        self.deployments.clear();
        self.submitted = false;
        self.turn += 1;
    }

    fn paid_for(&self, occupant: Occupant) -> Cost {
        let kind = UnitKind::from(occupant.kind);
        let base = self.catalog.cost(kind);
        if occupant.upgraded {
            base + self.catalog.upgrade_cost(kind)
        } else {
            base
        }
    }

    fn is_blocked(&self, location: Location) -> bool {
        self.structures.contains_key(&location)
    }

    fn record(&mut self, command: Command, outcome: Outcome) {
        self.journal.push(JournalEntry {
            turn: self.turn,
            command,
            outcome,
        });
    }

    fn refuse(&mut self, command: Command) -> u32 {
        tracing::warn!(turn = self.turn, ?command, "command after submit refused");
        self.record(command, Outcome::Refused);
        0
    }

    fn spawn_structure(&mut self, kind: StructureKind, location: Location) -> u32 {
        let cost = self.catalog.cost(kind.into());
        if !location.is_own_half() || self.is_blocked(location) || !self.own.can_pay(cost) {
            return 0;
        }
        self.own.pay(cost);
        let _ = self
            .structures
            .insert(location, Occupant::new(kind, Player::Own));
        1
    }

    fn spawn_mobile(&mut self, unit: UnitKind, location: Location, max_count: u32) -> u32 {
        let on_deploy_edge = Quadrant::BottomLeft.contains(location)
            || Quadrant::BottomRight.contains(location);
        if !on_deploy_edge || self.is_blocked(location) {
            return 0;
        }
        let cost = self.catalog.cost(unit);
        let mut count = 0;
        while count < max_count && self.own.can_pay(cost) {
            self.own.pay(cost);
            count += 1;
        }
        if count > 0 {
            self.deployments.push(MobileDeployment {
                unit,
                location,
                count,
            });
        }
        count
    }
}

impl BoardQuery for World {
    fn resource(&self, kind: ResourceKind, player: Player) -> f64 {
        self.purse(player).get(kind)
    }

    fn projected_resource(&self, kind: ResourceKind, turns_ahead: u32, player: Player) -> f64 {
        let income = match kind {
            ResourceKind::Structure => self.economy.structure_income,
            ResourceKind::Mobile => self.economy.mobile_income,
        };
        self.purse(player).get(kind) + income * f64::from(turns_ahead)
    }

    fn cost(&self, unit: UnitKind) -> Cost {
        self.catalog.cost(unit)
    }

    fn upgrade_cost(&self, unit: UnitKind) -> Cost {
        self.catalog.upgrade_cost(unit)
    }

    fn occupancy(&self, location: Location) -> Option<Occupant> {
        self.structures.get(&location).copied()
    }

    fn path_to_exit(&self, start: Location) -> Vec<Location> {
        let target = match start.edge() {
            Some(edge) => edge.opposite(),
            None if start.is_own_half() => start.lane().deploy_edge().opposite(),
            None => match start.lane() {
                Lane::Left => Quadrant::BottomRight,
                Lane::Right => Quadrant::BottomLeft,
            },
        };
        navigation::route(start, target, |cell| self.is_blocked(cell))
    }

    fn attackers_in_range(&self, location: Location, exposed: Player) -> Vec<Location> {
        let hostile = exposed.opponent();
        let turret = self.catalog.stats(UnitKind::Turret);
        self.structures
            .iter()
            .filter(|(_, occupant)| {
                occupant.owner == hostile && occupant.kind == StructureKind::Turret
            })
            .filter(|&(&cell, occupant)| cell.covers(location, turret.range(occupant.upgraded)))
            .map(|(&cell, _)| cell)
            .collect()
    }

    fn enemy_unit_locations(&self, kind: StructureKind) -> Vec<Location> {
        self.structures
            .iter()
            .filter(|(_, occupant)| occupant.owner == Player::Opponent && occupant.kind == kind)
            .map(|(&cell, _)| cell)
            .collect()
    }

    fn turn_number(&self) -> u32 {
        self.turn
    }

    fn own_health(&self) -> f64 {
        self.own_health
    }

    fn opponent_health(&self) -> f64 {
        self.opponent_health
    }
}

impl Oracle for World {
    fn spawn(&mut self, unit: UnitKind, locations: &[Location], max_count: u32) -> u32 {
        let command = Command::Spawn {
            unit,
            locations: locations.to_vec(),
            max_count,
        };
        if self.submitted {
            return self.refuse(command);
        }
        let mut placed = 0;
        for &location in locations {
            placed += match unit.structure() {
                Some(kind) => self.spawn_structure(kind, location),
                None => self.spawn_mobile(unit, location, max_count),
            };
        }
        self.record(command, Outcome::Applied(placed));
        placed
    }

    fn upgrade(&mut self, locations: &[Location]) -> u32 {
        let command = Command::Upgrade {
            locations: locations.to_vec(),
        };
        if self.submitted {
            return self.refuse(command);
        }
        let mut upgraded = 0;
        for location in locations {
            let Some(occupant) = self.structures.get(location).copied() else {
                continue;
            };
            if occupant.owner != Player::Own || occupant.upgraded {
                continue;
            }
            let cost = self.catalog.upgrade_cost(occupant.kind.into());
            if !self.own.can_pay(cost) {
                continue;
            }
            self.own.pay(cost);
            let _ = self.structures.insert(
                *location,
                Occupant {
                    upgraded: true,
                    ..occupant
                },
            );
            upgraded += 1;
        }
        self.record(command, Outcome::Applied(upgraded));
        upgraded
    }

    fn remove(&mut self, locations: &[Location]) -> u32 {
        let command = Command::Remove {
            locations: locations.to_vec(),
        };
        if self.submitted {
            return self.refuse(command);
        }
        let mut queued = 0;
        for &location in locations {
            let owned = self
                .structures
                .get(&location)
                .is_some_and(|occupant| occupant.owner == Player::Own);
            if owned && self.pending_removals.insert(location) {
                queued += 1;
            }
        }
        self.record(command, Outcome::Applied(queued));
        queued
    }

    fn lift_structure(&mut self, location: Location) -> Option<Occupant> {
        self.structures.remove(&location)
    }

    fn restore_structure(&mut self, location: Location, occupant: Occupant) {
        let _ = self.structures.insert(location, occupant);
    }

    fn submit(&mut self) {
        if self.submitted {
            let _ = self.refuse(Command::Submit);
            return;
        }
        self.submitted = true;
        self.record(Command::Submit, Outcome::Applied(0));
    }
}
