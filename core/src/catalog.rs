//! Unit table resolved once at startup.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{ConfigError, Cost, UnitKind};

/// Static properties of one unit kind.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitStats {
    /// Two-letter code the game uses for the unit.
    pub shorthand: String,
    /// Price of placing one unit.
    pub cost: Cost,
    /// Price of upgrading a placed unit.
    pub upgrade_cost: Cost,
    /// Attack radius before upgrading.
    pub attack_range: f64,
    /// Attack radius after upgrading.
    pub upgraded_attack_range: f64,
    /// Damage dealt to mobile units per hit before upgrading.
    pub damage_to_mobile: f64,
    /// Damage dealt to mobile units per hit after upgrading.
    pub upgraded_damage_to_mobile: f64,
    /// Damage dealt to structures per hit.
    pub damage_to_structure: f64,
}

impl UnitStats {
    #[allow(clippy::too_many_arguments)]
    fn new(
        shorthand: &str,
        cost: Cost,
        upgrade_cost: Cost,
        attack_range: f64,
        upgraded_attack_range: f64,
        damage_to_mobile: f64,
        upgraded_damage_to_mobile: f64,
        damage_to_structure: f64,
    ) -> Self {
        Self {
            shorthand: shorthand.to_owned(),
            cost,
            upgrade_cost,
            attack_range,
            upgraded_attack_range,
            damage_to_mobile,
            upgraded_damage_to_mobile,
            damage_to_structure,
        }
    }

    /// Attack radius for the provided upgrade state.
    #[must_use]
    pub fn range(&self, upgraded: bool) -> f64 {
        if upgraded {
            self.upgraded_attack_range
        } else {
            self.attack_range
        }
    }

    /// Damage against mobile units for the provided upgrade state.
    #[must_use]
    pub fn mobile_damage(&self, upgraded: bool) -> f64 {
        if upgraded {
            self.upgraded_damage_to_mobile
        } else {
            self.damage_to_mobile
        }
    }
}

/// Unit table keyed by kind.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitCatalog {
    units: BTreeMap<UnitKind, UnitStats>,
}

impl UnitCatalog {
    /// Parses the `unitInformation` table of the game's JSON configuration.
    ///
    /// Entries are read in catalogue order; missing entries or fields keep the
    /// built-in values.
    pub fn from_game_config(json: &str) -> Result<Self, ConfigError> {
        let raw: RawGameConfig = serde_json::from_str(json)?;
        let mut catalog = Self::default();
        for (index, entry) in raw.unit_information.into_iter().enumerate() {
            let Some(kind) = UnitKind::from_index(index) else {
                tracing::warn!(index, "ignoring unit table entry past the known kinds");
                continue;
            };
            if let Some(stats) = catalog.units.get_mut(&kind) {
                entry.apply(stats);
            }
        }
        Ok(catalog)
    }

    /// Stats for a unit kind.
    #[must_use]
    pub fn stats(&self, kind: UnitKind) -> &UnitStats {
        // Every kind is inserted on construction and entries are never removed.
        &self.units[&kind]
    }

    /// Placement price of a unit kind.
    #[must_use]
    pub fn cost(&self, kind: UnitKind) -> Cost {
        self.stats(kind).cost
    }

    /// Upgrade price of a unit kind.
    #[must_use]
    pub fn upgrade_cost(&self, kind: UnitKind) -> Cost {
        self.stats(kind).upgrade_cost
    }
}

impl Default for UnitCatalog {
    fn default() -> Self {
        let sp = |amount| Cost::new(amount, 0.0);
        let mp = |amount| Cost::new(0.0, amount);
        let units = BTreeMap::from([
            (
                UnitKind::Wall,
                UnitStats::new("FF", sp(1.0), sp(1.0), 0.0, 0.0, 0.0, 0.0, 0.0),
            ),
            (
                UnitKind::Support,
                UnitStats::new("EF", sp(4.0), sp(4.0), 0.0, 0.0, 0.0, 0.0, 0.0),
            ),
            (
                UnitKind::Turret,
                UnitStats::new("DF", sp(2.0), sp(4.0), 2.5, 3.5, 5.0, 15.0, 0.0),
            ),
            (
                UnitKind::Scout,
                UnitStats::new("PI", mp(1.0), mp(0.0), 3.5, 3.5, 2.0, 2.0, 2.0),
            ),
            (
                UnitKind::Demolisher,
                UnitStats::new("EI", mp(3.0), mp(0.0), 4.5, 4.5, 8.0, 8.0, 8.0),
            ),
            (
                UnitKind::Interceptor,
                UnitStats::new("SI", mp(1.0), mp(0.0), 4.5, 4.5, 20.0, 20.0, 0.0),
            ),
        ]);
        Self { units }
    }
}

#[derive(Debug, Deserialize)]
struct RawGameConfig {
    #[serde(rename = "unitInformation", default)]
    unit_information: Vec<RawUnit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUnit {
    shorthand: Option<String>,
    cost1: Option<f64>,
    cost2: Option<f64>,
    attack_range: Option<f64>,
    attack_damage_walker: Option<f64>,
    attack_damage_tower: Option<f64>,
    upgrade: Option<RawUpgrade>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUpgrade {
    cost1: Option<f64>,
    cost2: Option<f64>,
    attack_range: Option<f64>,
    attack_damage_walker: Option<f64>,
}

impl RawUnit {
    fn apply(self, stats: &mut UnitStats) {
        if let Some(shorthand) = self.shorthand {
            stats.shorthand = shorthand;
        }
        if let Some(structure) = self.cost1 {
            stats.cost.structure = structure;
        }
        if let Some(mobile) = self.cost2 {
            stats.cost.mobile = mobile;
        }
        if let Some(range) = self.attack_range {
            stats.attack_range = range;
            stats.upgraded_attack_range = stats.upgraded_attack_range.max(range);
        }
        if let Some(damage) = self.attack_damage_walker {
            stats.damage_to_mobile = damage;
            stats.upgraded_damage_to_mobile = stats.upgraded_damage_to_mobile.max(damage);
        }
        if let Some(damage) = self.attack_damage_tower {
            stats.damage_to_structure = damage;
        }
        if let Some(upgrade) = self.upgrade {
            if let Some(structure) = upgrade.cost1 {
                stats.upgrade_cost.structure = structure;
            }
            if let Some(mobile) = upgrade.cost2 {
                stats.upgrade_cost.mobile = mobile;
            }
            if let Some(range) = upgrade.attack_range {
                stats.upgraded_attack_range = range;
            }
            if let Some(damage) = upgrade.attack_damage_walker {
                stats.upgraded_damage_to_mobile = damage;
            }
        }
    }
}
