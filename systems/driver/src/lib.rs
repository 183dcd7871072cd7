#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn orchestration.
//!
//! [`TurnDriver`] owns every piece of state that outlives a turn: the
//! structure memory, the predictor logs, the offense phase and the breach
//! history. Events may be ingested any number of times between turns; each
//! record is counted once, at face value. A turn then runs as a fixed
//! sequence: reconcile memory, fold pending events into the predictor, run
//! the offense scheduler, intercept if the board is dangerous, build reactive
//! defences and the skeleton unless the scheduler yielded, and submit.

use lane_tactics_core::{
    decode_frame, BoardQuery, BreachEvent, DamageEvent, EventKind, EventRecord, FrameError,
    Location, Oracle, Player, Quadrant, ResourceKind, Settings, Turn, TurnSummary,
};
use lane_tactics_system_fortification::{
    build_skeleton, intercept, InterceptLaunch, SkeletonReport,
};
use lane_tactics_system_memory::{BoardMemory, ReconcileReport};
use lane_tactics_system_offense::{
    Directive, OffenseScheduler, Phase, Transition, WaveLaunch,
};
use lane_tactics_system_predictor::AttackPredictor;
use lane_tactics_system_reactive::{rank_breaches, ReactiveDefenseBuilder, ReactivePlacement};
use lane_tactics_system_risk::{ArchetypeScore, RiskEvaluator};

/// Best entries per attacker archetype; informational only.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Advisory {
    /// Best scout entry.
    pub fast: Option<ArchetypeScore>,
    /// Best demolisher entry.
    pub heavy: Option<ArchetypeScore>,
}

/// Everything one planned turn did.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnReport {
    /// Turn that was planned.
    pub turn: u32,
    /// Memory reconciliation performed before planning.
    pub reconciled: ReconcileReport,
    /// Offense phase after planning.
    pub phase: Phase,
    /// Offense transitions taken.
    pub transitions: Vec<Transition>,
    /// Interceptors launched against danger.
    pub intercepts: Vec<InterceptLaunch>,
    /// Scout wave launched, if any.
    pub wave: Option<WaveLaunch>,
    /// Breach reinforcements.
    pub reactive: Vec<ReactivePlacement>,
    /// Skeleton pass counts; absent when planning yielded.
    pub skeleton: Option<SkeletonReport>,
    /// Advisory entry ranking.
    pub advisory: Advisory,
    /// Spend and commands submitted.
    pub summary: TurnSummary,
}

impl TurnReport {
    /// Reports whether interception fired this turn.
    #[must_use]
    pub fn intercepted(&self) -> bool {
        !self.intercepts.is_empty()
    }
}

/// Events received since the last turn, not yet folded into the predictor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct PendingObservations {
    breaches: u32,
    damage: f64,
    enemy_mobile: u32,
}

impl PendingObservations {
    fn is_empty(&self) -> bool {
        self.breaches == 0 && self.damage == 0.0 && self.enemy_mobile == 0
    }
}

/// Runs the planner one turn at a time.
#[derive(Debug)]
pub struct TurnDriver {
    settings: Settings,
    memory: BoardMemory,
    predictor: AttackPredictor,
    offense: OffenseScheduler,
    reactive: ReactiveDefenseBuilder,
    breaches: Vec<BreachEvent>,
    damages: Vec<DamageEvent>,
    scored: Vec<BreachEvent>,
    pending: PendingObservations,
    last_turn: Option<u32>,
    last_opponent_mobile: Option<f64>,
}

impl TurnDriver {
    /// Creates a driver for a fresh match.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            memory: BoardMemory::new(),
            predictor: AttackPredictor::new(),
            offense: OffenseScheduler::new(),
            reactive: ReactiveDefenseBuilder::new(),
            breaches: Vec::new(),
            damages: Vec::new(),
            scored: Vec::new(),
            pending: PendingObservations::default(),
            last_turn: None,
            last_opponent_mobile: None,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Structure memory.
    #[must_use]
    pub const fn memory(&self) -> &BoardMemory {
        &self.memory
    }

    /// Attack predictor.
    #[must_use]
    pub const fn predictor(&self) -> &AttackPredictor {
        &self.predictor
    }

    /// Offense scheduler.
    #[must_use]
    pub const fn offense(&self) -> &OffenseScheduler {
        &self.offense
    }

    /// Breaches of this engine's edge, oldest first.
    #[must_use]
    pub fn breach_history(&self) -> &[BreachEvent] {
        &self.breaches
    }

    /// Damage taken by this engine's units, oldest first.
    #[must_use]
    pub fn damage_history(&self) -> &[DamageEvent] {
        &self.damages
    }

    /// Breaches scored by this engine's own units.
    #[must_use]
    pub fn scored_breaches(&self) -> &[BreachEvent] {
        &self.scored
    }

    /// Accepts event records delivered after the last turn.
    pub fn ingest(&mut self, records: &[EventRecord]) {
        let turn = self.last_turn.unwrap_or(0);
        for record in records {
            match (record.kind, record.owner) {
                (EventKind::Breach, Player::Opponent) => {
                    self.breaches.push(BreachEvent {
                        location: record.location,
                        turn,
                    });
                    self.pending.breaches += 1;
                }
                (EventKind::Breach, Player::Own) => self.scored.push(BreachEvent {
                    location: record.location,
                    turn,
                }),
                (EventKind::Damage, Player::Own) => {
                    let amount = record.amount.unwrap_or(0.0);
                    self.damages.push(DamageEvent {
                        location: record.location,
                        amount,
                        turn,
                    });
                    self.pending.damage += amount;
                }
                (EventKind::Spawn, Player::Opponent)
                    if record.unit.is_some_and(|unit| unit.is_mobile()) =>
                {
                    self.pending.enemy_mobile += 1;
                }
                _ => {}
            }
        }
    }

    /// Decodes an action frame and ingests its events.
    ///
    /// Returns the number of records accepted.
    pub fn ingest_frame(&mut self, frame: &str) -> Result<usize, FrameError> {
        let decoded = decode_frame(frame)?;
        self.ingest(&decoded.records);
        Ok(decoded.records.len())
    }

    /// Plans and submits one turn.
    pub fn play_turn<O: Oracle>(&mut self, oracle: &mut O) -> TurnReport {
        let reconciled = self.memory.reconcile(&*oracle);
        self.flush_observations(&*oracle);

        let mut turn = Turn::begin(oracle);
        let outcome =
            self.offense
                .schedule(&mut turn, &self.memory, &self.predictor, &self.settings);

        let ranked: Vec<Location> = rank_breaches(&self.breaches)
            .into_iter()
            .map(|rank| rank.location)
            .collect();
        let intercepts = if outcome.intercept {
            intercept(&mut turn, &self.settings, &ranked)
        } else {
            Vec::new()
        };

        let (reactive, skeleton) = match outcome.directive {
            Directive::Proceed => {
                let reserved = self.offense.reserved_corridor();
                let reactive = self.reactive.build(&mut turn, &self.breaches, &reserved);
                let skeleton = build_skeleton(
                    &mut turn,
                    &self.settings,
                    self.offense.corridor_active(),
                    &reserved,
                );
                (reactive, Some(skeleton))
            }
            Directive::Yield => (Vec::new(), None),
        };

        let advisory = self.advise(&turn);
        let summary = turn.submit();
        self.memory.record(&summary);
        self.last_turn = Some(summary.turn);

        tracing::info!(
            turn = summary.turn,
            phase = ?self.offense.phase(),
            structure = summary.spent.structure,
            mobile = summary.spent.mobile,
            "turn planned"
        );
        TurnReport {
            turn: summary.turn,
            reconciled,
            phase: self.offense.phase(),
            transitions: outcome.transitions,
            intercepts,
            wave: outcome.wave,
            reactive,
            skeleton,
            advisory,
            summary,
        }
    }

    fn flush_observations<Q: BoardQuery + ?Sized>(&mut self, board: &Q) {
        let current = board.resource(ResourceKind::Mobile, Player::Opponent);
        let level = self.last_opponent_mobile.unwrap_or(current);
        let pending = std::mem::take(&mut self.pending);
        if !pending.is_empty() {
            if pending.breaches > 0 {
                self.predictor
                    .record_breaches(f64::from(pending.breaches), level);
            }
            if pending.damage > 0.0 {
                self.predictor.record_damage(pending.damage, level);
            }
            if pending.enemy_mobile > 0 {
                self.predictor
                    .record_enemy_mobile(f64::from(pending.enemy_mobile), level);
            }
            tracing::debug!(
                breaches = pending.breaches,
                damage = pending.damage,
                enemy_mobile = pending.enemy_mobile,
                level,
                "observations recorded"
            );
        }
        self.last_opponent_mobile = Some(current);
    }

    fn advise<Q: BoardQuery + ?Sized>(&self, board: &Q) -> Advisory {
        let candidates: Vec<Location> = [Quadrant::BottomLeft, Quadrant::BottomRight]
            .into_iter()
            .flat_map(|edge| board.edge_locations(edge))
            .filter(|&cell| board.occupancy(cell).is_none())
            .collect();
        let ranking = RiskEvaluator::new(&self.settings.catalog).dual_rankings(board, &candidates);
        Advisory {
            fast: ranking.fast.first().copied(),
            heavy: ranking.heavy.first().copied(),
        }
    }
}
