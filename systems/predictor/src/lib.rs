#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Nearest-neighbour attack predictor.
//!
//! Each turn in which the opponent hurt this engine appends one observation
//! pairing the damage magnitude with the opponent's mobile points at the
//! time. Queries average every observation taken within one point of the
//! requested level. Nothing is trained or cached; each query recomputes from
//! the raw log.

/// Width of the window either side of the queried resource level.
const RESOURCE_TOLERANCE: f64 = 1.0;

/// One turn's attack magnitude and the opponent resource level that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackObservation {
    /// Size of the attack: breaches, damage or unit count depending on the log.
    pub magnitude: f64,
    /// Opponent mobile points when the attack was launched.
    pub opponent_resource: f64,
}

impl AttackObservation {
    /// Creates an observation.
    #[must_use]
    pub const fn new(magnitude: f64, opponent_resource: f64) -> Self {
        Self {
            magnitude,
            opponent_resource,
        }
    }
}

/// Append-only sequence of observations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObservationLog {
    entries: Vec<AttackObservation>,
}

impl ObservationLog {
    /// Appends an observation.
    pub fn push(&mut self, observation: AttackObservation) {
        self.entries.push(observation);
    }

    /// Observations in arrival order.
    #[must_use]
    pub fn entries(&self) -> &[AttackObservation] {
        &self.entries
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean magnitude over observations within one point of `resource`, or zero.
    #[must_use]
    pub fn expected_near(&self, resource: f64) -> f64 {
        let (sum, count) = self
            .entries
            .iter()
            .filter(|entry| (entry.opponent_resource - resource).abs() <= RESOURCE_TOLERANCE)
            .fold((0.0, 0u32), |(sum, count), entry| {
                (sum + entry.magnitude, count + 1)
            });
        if count == 0 {
            0.0
        } else {
            sum / f64::from(count)
        }
    }
}

/// Three independent logs correlating opponent resources with attack outcomes.
#[derive(Clone, Debug, Default)]
pub struct AttackPredictor {
    breaches: ObservationLog,
    damage: ObservationLog,
    enemy_mobile: ObservationLog,
}

impl AttackPredictor {
    /// Creates a predictor with empty logs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a breach-count observation.
    pub fn record_breaches(&mut self, count: f64, opponent_resource: f64) {
        self.breaches
            .push(AttackObservation::new(count, opponent_resource));
        tracing::debug!(count, opponent_resource, "breach observation");
    }

    /// Appends a damage-total observation.
    pub fn record_damage(&mut self, amount: f64, opponent_resource: f64) {
        self.damage
            .push(AttackObservation::new(amount, opponent_resource));
        tracing::debug!(amount, opponent_resource, "damage observation");
    }

    /// Appends an enemy mobile-unit count observation.
    pub fn record_enemy_mobile(&mut self, count: f64, opponent_resource: f64) {
        self.enemy_mobile
            .push(AttackObservation::new(count, opponent_resource));
        tracing::debug!(count, opponent_resource, "enemy mobile observation");
    }

    /// Expected breach count when the opponent holds `resource` mobile points.
    #[must_use]
    pub fn expected_breaches(&self, resource: f64) -> f64 {
        self.breaches.expected_near(resource)
    }

    /// Expected damage when the opponent holds `resource` mobile points.
    #[must_use]
    pub fn expected_damage(&self, resource: f64) -> f64 {
        self.damage.expected_near(resource)
    }

    /// Expected enemy mobile-unit count when the opponent holds `resource` mobile points.
    #[must_use]
    pub fn expected_enemy_mobile(&self, resource: f64) -> f64 {
        self.enemy_mobile.expected_near(resource)
    }

    /// Breach observations.
    #[must_use]
    pub fn breach_log(&self) -> &ObservationLog {
        &self.breaches
    }

    /// Damage observations.
    #[must_use]
    pub fn damage_log(&self) -> &ObservationLog {
        &self.damage
    }

    /// Enemy mobile-unit observations.
    #[must_use]
    pub fn enemy_mobile_log(&self) -> &ObservationLog {
        &self.enemy_mobile
    }
}
