//! Unit, resource and ownership vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies which side of the match an entity belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    /// The side this engine plays.
    Own,
    /// The adversary.
    Opponent,
}

impl Player {
    /// Returns the other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Own => Self::Opponent,
            Self::Opponent => Self::Own,
        }
    }
}

/// The two spendable currencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Structure points, spent on walls, supports and turrets.
    Structure,
    /// Mobile points, spent on scouts, demolishers and interceptors.
    Mobile,
}

/// Stationary unit kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StructureKind {
    /// Cheap blocker that shapes paths.
    Wall,
    /// Shields friendly mobile units passing nearby.
    Support,
    /// Fires at enemy mobile units within range.
    Turret,
}

impl StructureKind {
    /// Every structure kind in catalogue order.
    pub const ALL: [StructureKind; 3] = [Self::Wall, Self::Support, Self::Turret];
}

/// Every unit kind, in the order the game configuration lists them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Stationary wall.
    Wall,
    /// Stationary support.
    Support,
    /// Stationary turret.
    Turret,
    /// Fast, fragile mobile unit.
    Scout,
    /// Slow mobile unit that damages structures.
    Demolisher,
    /// Mobile unit that only attacks other mobile units.
    Interceptor,
}

impl UnitKind {
    /// Every unit kind in catalogue order.
    pub const ALL: [UnitKind; 6] = [
        Self::Wall,
        Self::Support,
        Self::Turret,
        Self::Scout,
        Self::Demolisher,
        Self::Interceptor,
    ];

    /// Returns the structure kind when the unit is stationary.
    #[must_use]
    pub const fn structure(self) -> Option<StructureKind> {
        match self {
            Self::Wall => Some(StructureKind::Wall),
            Self::Support => Some(StructureKind::Support),
            Self::Turret => Some(StructureKind::Turret),
            Self::Scout | Self::Demolisher | Self::Interceptor => None,
        }
    }

    /// Reports whether the unit walks across the arena.
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        self.structure().is_none()
    }

    /// Currency the unit is paid for with.
    #[must_use]
    pub const fn resource(self) -> ResourceKind {
        if self.is_mobile() {
            ResourceKind::Mobile
        } else {
            ResourceKind::Structure
        }
    }

    /// Position of the unit in the game configuration's unit table.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Wall => 0,
            Self::Support => 1,
            Self::Turret => 2,
            Self::Scout => 3,
            Self::Demolisher => 4,
            Self::Interceptor => 5,
        }
    }

    /// Resolves a unit table index back into a kind.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Wall),
            1 => Some(Self::Support),
            2 => Some(Self::Turret),
            3 => Some(Self::Scout),
            4 => Some(Self::Demolisher),
            5 => Some(Self::Interceptor),
            _ => None,
        }
    }
}

impl From<StructureKind> for UnitKind {
    fn from(kind: StructureKind) -> Self {
        match kind {
            StructureKind::Wall => Self::Wall,
            StructureKind::Support => Self::Support,
            StructureKind::Turret => Self::Turret,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Wall => "wall",
            Self::Support => "support",
            Self::Turret => "turret",
            Self::Scout => "scout",
            Self::Demolisher => "demolisher",
            Self::Interceptor => "interceptor",
        };
        f.write_str(label)
    }
}

/// Price of an action expressed in both currencies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    /// Structure points required.
    pub structure: f64,
    /// Mobile points required.
    pub mobile: f64,
}

impl Cost {
    /// Creates a cost from its two components.
    #[must_use]
    pub const fn new(structure: f64, mobile: f64) -> Self {
        Self { structure, mobile }
    }

    /// Returns the component denominated in the provided currency.
    #[must_use]
    pub const fn of(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Structure => self.structure,
            ResourceKind::Mobile => self.mobile,
        }
    }

    /// Multiplies both components by a unit count.
    #[must_use]
    pub fn times(self, count: u32) -> Self {
        let factor = f64::from(count);
        Self::new(self.structure * factor, self.mobile * factor)
    }
}

impl std::ops::Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.structure + rhs.structure, self.mobile + rhs.mobile)
    }
}

/// Structure standing on a cell as reported by the oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    /// Kind of structure.
    pub kind: StructureKind,
    /// Whether the structure has been upgraded.
    pub upgraded: bool,
    /// Side that owns the structure.
    pub owner: Player,
}

impl Occupant {
    /// Creates a fresh, non-upgraded occupant.
    #[must_use]
    pub const fn new(kind: StructureKind, owner: Player) -> Self {
        Self {
            kind,
            upgraded: false,
            owner,
        }
    }
}
