//! Strategy tuning and startup settings.
//!
//! Every threshold the engine consults lives in [`StrategyConfig`]. It is read
//! from TOML once, validated, bundled with the [`UnitCatalog`] into
//! [`Settings`] and then only ever shared by reference.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Lane, Location, UnitCatalog};

/// Raw cell list as written in configuration files.
pub type CellList = Vec<[i32; 2]>;

/// Failure to load or validate configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The strategy file is not valid TOML for the expected shape.
    #[error("strategy configuration is invalid: {0}")]
    Toml(#[from] toml::de::Error),
    /// The game configuration is not valid JSON for the expected shape.
    #[error("game configuration is invalid: {0}")]
    Json(#[from] serde_json::Error),
    /// A threshold is negative, zero where it must be positive, or otherwise unusable.
    #[error("threshold `{name}` is invalid: {reason}")]
    InvalidThreshold {
        /// Configuration key.
        name: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// A layout cell lies outside the arena.
    #[error("layout `{name}` lists cell [{x}, {y}] outside the arena")]
    OutOfBounds {
        /// Configuration key.
        name: &'static str,
        /// Rejected column.
        x: i32,
        /// Rejected row.
        y: i32,
    },
}

/// Offense scheduling thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffenseTuning {
    /// Scouts a wave must be able to afford before committing.
    pub scout_wave_size: u32,
    /// Supports the corridor needs.
    pub corridor_supports: u32,
    /// Walls the corridor needs.
    pub corridor_walls: u32,
    /// Mobile points that must be exceeded before a committed wave fires.
    pub firing_threshold: f64,
    /// Projected mobile points below which a fired offense is abandoned.
    pub mobile_safety_floor: f64,
    /// Length of the turn cycle the cooldown window repeats over.
    pub cycle_length: u32,
    /// Leading turns of every cycle in which commits are suppressed.
    pub cooldown_window: u32,
    /// Own health below which the cooldown window is ignored.
    pub critical_health: f64,
    /// Share of a structure's price the liquidation estimate assumes is refunded.
    pub liquidation_refund_rate: f64,
    /// Largest predicted breach count at which a commit is still considered safe.
    pub safe_breach_ceiling: f64,
    /// Turns after an abort during which no commit happens.
    pub lockout_turns: u32,
}

impl Default for OffenseTuning {
    fn default() -> Self {
        Self {
            scout_wave_size: 8,
            corridor_supports: 4,
            corridor_walls: 6,
            firing_threshold: 9.0,
            mobile_safety_floor: 10.0,
            cycle_length: 10,
            cooldown_window: 3,
            critical_health: 10.0,
            liquidation_refund_rate: 0.97,
            safe_breach_ceiling: 3.0,
            lockout_turns: 1,
        }
    }
}

/// Thresholds that force the engine onto the defensive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DangerTuning {
    /// Opponent projected mobile points at or above which the engine intercepts.
    pub opponent_mobile: f64,
    /// Health lost since the start of the match at or above which the engine intercepts.
    pub health_deficit: f64,
    /// Health each side starts the match with.
    pub starting_health: f64,
}

impl Default for DangerTuning {
    fn default() -> Self {
        Self {
            opponent_mobile: 15.0,
            health_deficit: 25.0,
            starting_health: 30.0,
        }
    }
}

/// Dimensions of the per-turn fortification skeleton.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonLayout {
    /// Corner turret cells.
    pub corners: CellList,
    /// Whether the corner turrets are upgraded.
    pub upgrade_corners: bool,
    /// Left arm of the V cluster, outermost first.
    pub v_left: CellList,
    /// Right arm of the V cluster, outermost first.
    pub v_right: CellList,
    /// Centre of the V cluster.
    pub v_middle: CellList,
    /// Cells trimmed from the inner end of each arm while a corridor is active.
    pub corridor_shrink: u32,
    /// Row of the central wall counted down from the midline.
    pub wall_depth: i32,
    /// Number of cells in the central wall.
    pub wall_width: i32,
}

impl Default for SkeletonLayout {
    fn default() -> Self {
        Self {
            corners: vec![[0, 13], [27, 13]],
            upgrade_corners: true,
            v_left: vec![[5, 12], [6, 11], [8, 10]],
            v_right: vec![[22, 12], [21, 11], [19, 10]],
            v_middle: vec![[12, 9], [15, 9]],
            corridor_shrink: 2,
            wall_depth: 3,
            wall_width: 14,
        }
    }
}

/// Geometry of one lane's assault corridor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneCorridor {
    /// Corridor cells from the deploy edge outward; supports fill the front, walls the rest.
    pub channel: CellList,
    /// Cell an escorting interceptor launches from.
    pub escort: Option<[i32; 2]>,
    /// Candidate deploy cells the wave may launch from.
    pub launch: CellList,
}

/// Corridor geometry for both lanes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorLayout {
    /// Corridor used when attacking down the left lane.
    pub left: LaneCorridor,
    /// Corridor used when attacking down the right lane.
    pub right: LaneCorridor,
}

impl CorridorLayout {
    /// Corridor for a lane.
    #[must_use]
    pub const fn for_lane(&self, lane: Lane) -> &LaneCorridor {
        match lane {
            Lane::Left => &self.left,
            Lane::Right => &self.right,
        }
    }
}

impl Default for CorridorLayout {
    fn default() -> Self {
        let left_channel: CellList = vec![
            [13, 1],
            [13, 2],
            [12, 3],
            [11, 4],
            [10, 5],
            [9, 6],
            [8, 7],
            [7, 8],
            [6, 9],
            [5, 10],
        ];
        let right_channel = left_channel.iter().map(|&cell| mirror(cell)).collect();
        Self {
            left: LaneCorridor {
                channel: left_channel,
                escort: Some([5, 8]),
                launch: vec![[12, 1], [11, 2], [10, 3]],
            },
            right: LaneCorridor {
                channel: right_channel,
                escort: Some(mirror([5, 8])),
                launch: vec![[15, 1], [16, 2], [17, 3]],
            },
        }
    }
}

/// Mirrors a cell across the vertical centre line.
const fn mirror([x, y]: [i32; 2]) -> [i32; 2] {
    [crate::ARENA_SIZE - 1 - x, y]
}

/// Emergency interception settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptionTuning {
    /// Interceptors launched per danger turn.
    pub interceptors: u32,
    /// Target cells used when no breach has been recorded yet.
    pub posts: CellList,
}

impl Default for InterceptionTuning {
    fn default() -> Self {
        Self {
            interceptors: 2,
            posts: vec![[4, 9], [23, 9]],
        }
    }
}

/// Every tuning constant the engine consults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Offense scheduling.
    pub offense: OffenseTuning,
    /// Danger detection.
    pub danger: DangerTuning,
    /// Fortification skeleton.
    pub skeleton: SkeletonLayout,
    /// Assault corridors.
    pub corridors: CorridorLayout,
    /// Interception.
    pub interception: InterceptionTuning,
}

impl StrategyConfig {
    /// Parses and validates a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects thresholds and layouts the engine cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let offense = &self.offense;
        if offense.cycle_length == 0 {
            return Err(ConfigError::InvalidThreshold {
                name: "offense.cycle_length",
                reason: "must be positive",
            });
        }
        if offense.cooldown_window > offense.cycle_length {
            return Err(ConfigError::InvalidThreshold {
                name: "offense.cooldown_window",
                reason: "must not exceed the cycle length",
            });
        }
        if !(0.0..=1.0).contains(&offense.liquidation_refund_rate) {
            return Err(ConfigError::InvalidThreshold {
                name: "offense.liquidation_refund_rate",
                reason: "must lie between 0 and 1",
            });
        }
        let non_negative = [
            ("offense.firing_threshold", offense.firing_threshold),
            ("offense.mobile_safety_floor", offense.mobile_safety_floor),
            ("offense.critical_health", offense.critical_health),
            ("offense.safe_breach_ceiling", offense.safe_breach_ceiling),
            ("danger.opponent_mobile", self.danger.opponent_mobile),
            ("danger.health_deficit", self.danger.health_deficit),
            ("danger.starting_health", self.danger.starting_health),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold {
                    name,
                    reason: "must be a finite, non-negative number",
                });
            }
        }
        if self.skeleton.wall_width < 0 || self.skeleton.wall_depth < 0 {
            return Err(ConfigError::InvalidThreshold {
                name: "skeleton.wall_width",
                reason: "wall dimensions must be non-negative",
            });
        }

        let skeleton = &self.skeleton;
        let corridors = &self.corridors;
        let layouts: [(&'static str, &[[i32; 2]]); 11] = [
            ("skeleton.corners", skeleton.corners.as_slice()),
            ("skeleton.v_left", skeleton.v_left.as_slice()),
            ("skeleton.v_right", skeleton.v_right.as_slice()),
            ("skeleton.v_middle", skeleton.v_middle.as_slice()),
            ("corridors.left.channel", corridors.left.channel.as_slice()),
            ("corridors.left.launch", corridors.left.launch.as_slice()),
            ("corridors.right.channel", corridors.right.channel.as_slice()),
            ("corridors.right.launch", corridors.right.launch.as_slice()),
            ("corridors.left.escort", corridors.left.escort.as_slice()),
            ("corridors.right.escort", corridors.right.escort.as_slice()),
            ("interception.posts", self.interception.posts.as_slice()),
        ];
        for (name, cells) in layouts {
            if let Some(&[x, y]) = cells.iter().find(|[x, y]| !Location::in_arena(*x, *y)) {
                return Err(ConfigError::OutOfBounds { name, x, y });
            }
        }
        Ok(())
    }
}

/// Configuration resolved once at startup and shared by reference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    /// Strategy tuning.
    pub strategy: StrategyConfig,
    /// Unit table.
    pub catalog: UnitCatalog,
}

impl Settings {
    /// Bundles a validated strategy with a unit table.
    #[must_use]
    pub const fn new(strategy: StrategyConfig, catalog: UnitCatalog) -> Self {
        Self { strategy, catalog }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(StrategyConfig::default().validate().is_ok());
    }

    #[test]
    fn right_corridor_mirrors_left() {
        let corridors = CorridorLayout::default();
        assert_eq!(corridors.right.channel.first(), Some(&[14, 1]));
        assert_eq!(corridors.right.channel.last(), Some(&[22, 10]));
        assert_eq!(corridors.right.escort, Some([22, 8]));
        assert_eq!(corridors.for_lane(Lane::Left).escort, Some([5, 8]));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = StrategyConfig::from_toml_str(
            r#"
            [offense]
            scout_wave_size = 10

            [skeleton]
            upgrade_corners = false
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.offense.scout_wave_size, 10);
        assert_eq!(config.offense.firing_threshold, 9.0);
        assert!(!config.skeleton.upgrade_corners);
        assert_eq!(config.skeleton.wall_width, 14);
    }

    #[test]
    fn rejects_cells_outside_the_arena() {
        let error = StrategyConfig::from_toml_str(
            r#"
            [interception]
            posts = [[0, 0]]
            "#,
        )
        .expect_err("corner cell is cut away");
        assert!(matches!(
            error,
            ConfigError::OutOfBounds {
                name: "interception.posts",
                x: 0,
                y: 0
            }
        ));
    }

    #[test]
    fn rejects_zero_cycle() {
        let error = StrategyConfig::from_toml_str("[offense]\ncycle_length = 0\n")
            .expect_err("cycle must be positive");
        assert!(matches!(error, ConfigError::InvalidThreshold { .. }));
    }
}
