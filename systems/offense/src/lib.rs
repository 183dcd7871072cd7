#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Offense phase machine.
//!
//! The scheduler saves resources while [`Phase::Accumulating`], liquidates
//! expendable structures when it commits to a push, builds a support corridor
//! and launches a scout wave once mobile points allow, and reverts when the
//! push can no longer finish the match or the board turns dangerous. Phase
//! choices depend only on the board, the memory and the predictor; nothing is
//! random.

use std::collections::BTreeSet;

use lane_tactics_core::{
    BoardQuery, DangerTuning, Lane, Location, Oracle, Player, ResourceKind, Settings,
    StructureKind, Turn, UnitKind,
};
use lane_tactics_system_memory::BoardMemory;
use lane_tactics_system_predictor::AttackPredictor;
use lane_tactics_system_risk::RiskEvaluator;

/// Offense state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Saving resources; no corridor exists.
    #[default]
    Accumulating,
    /// Structures were liquidated; waiting for mobile points to fire.
    Committed,
    /// At least one wave has been launched down the corridor.
    Executing,
}

/// Phase change taken during a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Accumulating to Committed.
    Commit,
    /// Committed to Executing.
    Fire,
    /// Back to Accumulating because the push cannot finish the match.
    Abort,
    /// Back to Accumulating because the board turned dangerous.
    ForceCancel,
}

/// Whether the rest of the turn's planning should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
    /// Continue with defensive planning.
    Proceed,
    /// Stop planning and submit so liquidation refunds land.
    Yield,
}

/// Corridor the offense has reserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffensePlan {
    /// Lane the corridor runs along.
    pub lane: Lane,
    /// Cells the corridor occupies.
    pub corridor: BTreeSet<Location>,
    /// Whether other builders must keep off the corridor.
    pub reserved: bool,
}

/// Scout wave launched this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveLaunch {
    /// Lane the wave was sent down.
    pub lane: Lane,
    /// Deploy cell.
    pub entry: Location,
    /// Scouts launched.
    pub count: u32,
}

/// What the scheduler did during a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffenseOutcome {
    /// Whether defensive planning should follow.
    pub directive: Directive,
    /// Phase changes in the order they happened.
    pub transitions: Vec<Transition>,
    /// Whether the danger condition held and interceptors should be launched.
    pub intercept: bool,
    /// Wave launched this turn, if any.
    pub wave: Option<WaveLaunch>,
}

impl OffenseOutcome {
    fn proceed() -> Self {
        Self {
            directive: Directive::Proceed,
            transitions: Vec::new(),
            intercept: false,
            wave: None,
        }
    }
}

/// Reports whether the opponent's projected mobile points or this engine's
/// health loss cross a danger threshold.
#[must_use]
pub fn in_danger<Q: BoardQuery + ?Sized>(board: &Q, danger: &DangerTuning) -> bool {
    let opponent_mobile = board.projected_resource(ResourceKind::Mobile, 1, Player::Opponent);
    let deficit = danger.starting_health - board.own_health();
    opponent_mobile >= danger.opponent_mobile || deficit >= danger.health_deficit
}

/// Phase machine deciding when to build a corridor and launch waves.
#[derive(Clone, Debug, Default)]
pub struct OffenseScheduler {
    phase: Phase,
    plan: Option<OffensePlan>,
    locked_through: Option<u32>,
}

impl OffenseScheduler {
    /// Creates a scheduler in [`Phase::Accumulating`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Corridor plan in flight, if any.
    #[must_use]
    pub fn current_plan(&self) -> Option<&OffensePlan> {
        self.plan.as_ref()
    }

    /// Cells other builders must leave free.
    #[must_use]
    pub fn reserved_corridor(&self) -> BTreeSet<Location> {
        self.plan
            .as_ref()
            .filter(|plan| plan.reserved)
            .map(|plan| plan.corridor.clone())
            .unwrap_or_default()
    }

    /// Reports whether a corridor is being held open.
    #[must_use]
    pub fn corridor_active(&self) -> bool {
        self.phase != Phase::Accumulating
    }

    /// Runs the phase machine for one turn.
    pub fn schedule<O: Oracle>(
        &mut self,
        turn: &mut Turn<'_, O>,
        memory: &BoardMemory,
        predictor: &AttackPredictor,
        settings: &Settings,
    ) -> OffenseOutcome {
        let mut outcome = OffenseOutcome::proceed();

        if in_danger(&*turn, &settings.strategy.danger) {
            outcome.intercept = true;
            if self.phase != Phase::Accumulating {
                let lockout = settings.strategy.offense.lockout_turns;
                self.cancel(turn, Transition::ForceCancel, lockout, &mut outcome);
            }
            tracing::info!(turn = turn.number(), "danger: offense held, intercepting");
            return outcome;
        }

        match self.phase {
            Phase::Accumulating => {
                if self.ready_to_commit(turn, memory, predictor, settings) {
                    self.commit(turn, memory, settings, &mut outcome);
                }
            }
            Phase::Committed | Phase::Executing => {
                let mobile = turn.resource(ResourceKind::Mobile, Player::Own);
                if mobile > settings.strategy.offense.firing_threshold {
                    self.fire(turn, settings, &mut outcome);
                } else if self.phase == Phase::Executing {
                    self.top_up(turn);
                }
            }
        }
        outcome
    }

    fn ready_to_commit<O: Oracle>(
        &self,
        turn: &Turn<'_, O>,
        memory: &BoardMemory,
        predictor: &AttackPredictor,
        settings: &Settings,
    ) -> bool {
        let tuning = &settings.strategy.offense;
        let turn_number = turn.number();

        if self
            .locked_through
            .is_some_and(|locked| turn_number <= locked)
        {
            tracing::debug!(turn = turn_number, "commit locked out");
            return false;
        }

        let scout = turn.cost(UnitKind::Scout).mobile;
        let wave_cost = scout * f64::from(tuning.scout_wave_size);
        let mobile_next = turn.projected_resource(ResourceKind::Mobile, 1, Player::Own);
        if mobile_next <= wave_cost {
            return false;
        }

        let corridor_cost = turn.cost(UnitKind::Support).structure
            * f64::from(tuning.corridor_supports)
            + turn.cost(UnitKind::Wall).structure * f64::from(tuning.corridor_walls);
        let Some(obtainable) = obtainable_structure_points(turn, memory, settings) else {
            return false;
        };
        if obtainable <= corridor_cost {
            return false;
        }

        // A zero-length cycle has no cooldown window.
        let in_cooldown = turn_number
            .checked_rem(tuning.cycle_length)
            .is_some_and(|phase| phase < tuning.cooldown_window);
        if in_cooldown && turn.own_health() >= tuning.critical_health {
            return false;
        }

        let opponent_mobile = turn.resource(ResourceKind::Mobile, Player::Opponent);
        let expected_breaches = predictor.expected_breaches(opponent_mobile);
        if expected_breaches > tuning.safe_breach_ceiling {
            tracing::debug!(expected_breaches, "commit judged unsafe");
            return false;
        }
        true
    }

    fn commit<O: Oracle>(
        &mut self,
        turn: &mut Turn<'_, O>,
        memory: &BoardMemory,
        settings: &Settings,
        outcome: &mut OffenseOutcome,
    ) {
        let liquidated = liquidation_targets(turn.number(), memory).unwrap_or_default();
        let removed = turn.remove(&liquidated);

        let lane = RiskEvaluator::new(&settings.catalog).offense_lane(&*turn);
        self.plan = Some(plan_for(lane, settings));
        self.phase = Phase::Committed;
        outcome.transitions.push(Transition::Commit);
        outcome.directive = Directive::Yield;
        tracing::info!(turn = turn.number(), %lane, removed, "offense committed");
    }

    fn fire<O: Oracle>(
        &mut self,
        turn: &mut Turn<'_, O>,
        settings: &Settings,
        outcome: &mut OffenseOutcome,
    ) {
        let lane = match (&self.plan, self.phase) {
            (Some(plan), Phase::Executing) => plan.lane,
            _ => RiskEvaluator::new(&settings.catalog).offense_lane(&*turn),
        };
        let layout = settings.strategy.corridors.for_lane(lane);
        self.plan = Some(plan_for(lane, settings));

        let channel = Location::from_cells(&layout.channel);
        let supports = turn.spawn(UnitKind::Support, &channel, 1);
        let walls = turn.spawn(UnitKind::Wall, &channel, 1);

        let escorts = match layout.escort.and_then(|[x, y]| Location::new(x, y).ok()) {
            Some(escort) => turn.spawn(UnitKind::Interceptor, &[escort], 1),
            None => 0,
        };

        let launch = Location::from_cells(&layout.launch);
        let risk = RiskEvaluator::new(&settings.catalog);
        if let Some(entry) = risk.least_damage_entry(&*turn, &launch) {
            let count = turn.spawn(UnitKind::Scout, &[entry], u32::MAX);
            outcome.wave = Some(WaveLaunch { lane, entry, count });
            tracing::info!(
                turn = turn.number(),
                %lane,
                %entry,
                count,
                supports,
                walls,
                escorts,
                "wave launched"
            );
        } else {
            tracing::warn!(turn = turn.number(), %lane, "no open launch cell");
        }

        if self.phase == Phase::Committed {
            outcome.transitions.push(Transition::Fire);
        }
        self.phase = Phase::Executing;

        let tuning = &settings.strategy.offense;
        let projected = turn.projected_resource(ResourceKind::Mobile, 1, Player::Own);
        if projected < tuning.mobile_safety_floor && turn.opponent_health() > projected {
            self.cancel(turn, Transition::Abort, tuning.lockout_turns, outcome);
        }
    }

    fn top_up<O: Oracle>(&self, turn: &mut Turn<'_, O>) {
        let Some(plan) = &self.plan else {
            return;
        };
        let open: Vec<Location> = plan
            .corridor
            .iter()
            .copied()
            .filter(|&cell| turn.occupancy(cell).is_none())
            .collect();
        if open.is_empty() {
            return;
        }
        let supports = turn.spawn(UnitKind::Support, &open, 1);
        let walls = turn.spawn(UnitKind::Wall, &open, 1);
        tracing::debug!(supports, walls, "corridor topped up");
    }

    fn cancel<O: Oracle>(
        &mut self,
        turn: &mut Turn<'_, O>,
        transition: Transition,
        lockout: u32,
        outcome: &mut OffenseOutcome,
    ) {
        let mut refunded = 0;
        if let Some(plan) = self.plan.take() {
            let standing: Vec<Location> = plan
                .corridor
                .iter()
                .copied()
                .filter(|&cell| {
                    turn.occupancy(cell).is_some_and(|occupant| {
                        occupant.owner == Player::Own && !occupant.upgraded
                    })
                })
                .collect();
            refunded = turn.remove(&standing);
        }
        self.phase = Phase::Accumulating;
        self.locked_through = Some(turn.number() + lockout);
        outcome.transitions.push(transition);
        tracing::info!(turn = turn.number(), ?transition, refunded, "offense reverted");
    }
}

/// Structure points available now plus the estimated refund for every
/// expendable structure.
fn obtainable_structure_points<Q: BoardQuery + ?Sized>(
    board: &Q,
    memory: &BoardMemory,
    settings: &Settings,
) -> Option<f64> {
    let rate = settings.strategy.offense.liquidation_refund_rate;
    let mut obtainable = board.resource(ResourceKind::Structure, Player::Own);
    for kind in [StructureKind::Turret, StructureKind::Wall] {
        let cells = memory
            .locations(board.turn_number(), kind, Some(false))
            .ok()?;
        let price = board.cost(kind.into()).structure;
        obtainable += cells.len() as f64 * price * rate;
    }
    Some(obtainable)
}

fn liquidation_targets(
    turn_number: u32,
    memory: &BoardMemory,
) -> Option<Vec<Location>> {
    let mut cells = memory
        .locations(turn_number, StructureKind::Turret, Some(false))
        .ok()?;
    cells.extend(
        memory
            .locations(turn_number, StructureKind::Wall, Some(false))
            .ok()?,
    );
    Some(cells)
}

fn plan_for(lane: Lane, settings: &Settings) -> OffensePlan {
    let layout = settings.strategy.corridors.for_lane(lane);
    OffensePlan {
        lane,
        corridor: Location::from_cells(&layout.channel).into_iter().collect(),
        reserved: true,
    }
}
