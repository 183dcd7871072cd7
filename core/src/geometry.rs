//! Diamond arena geometry.
//!
//! The arena is a 28 by 28 square with the corners cut away, leaving a
//! diamond. Rows `0..14` belong to this engine and rows `14..28` to the
//! opponent. Every [`Location`] is validated against that shape when it is
//! constructed, so no engine code can hand an out-of-bounds cell to the
//! oracle.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cells along each side of the square that bounds the arena.
pub const ARENA_SIZE: i32 = 28;

/// Number of rows owned by each player.
pub const HALF_ARENA: i32 = 14;

/// Largest column that still belongs to the left lane.
const LEFT_LANE_MAX_COLUMN: i32 = HALF_ARENA - 1;

/// Reported when a coordinate falls outside the diamond.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("cell [{x}, {y}] lies outside the arena")]
pub struct LocationError {
    /// Rejected column.
    pub x: i32,
    /// Rejected row.
    pub y: i32,
}

/// Cell inside the diamond arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "[i32; 2]", into = "[i32; 2]")]
pub struct Location {
    x: i32,
    y: i32,
}

impl Location {
    /// Creates a location, rejecting coordinates outside the diamond.
    pub fn new(x: i32, y: i32) -> Result<Self, LocationError> {
        if Self::in_arena(x, y) {
            Ok(Self { x, y })
        } else {
            Err(LocationError { x, y })
        }
    }

    /// Reports whether the coordinate lies inside the diamond.
    #[must_use]
    pub const fn in_arena(x: i32, y: i32) -> bool {
        if y < 0 || y >= ARENA_SIZE {
            return false;
        }
        if y < HALF_ARENA {
            x >= HALF_ARENA - 1 - y && x <= HALF_ARENA + y
        } else {
            x >= y - HALF_ARENA && x <= ARENA_SIZE + HALF_ARENA - 1 - y
        }
    }

    /// Converts raw `[x, y]` pairs, dropping and logging any that fall outside the arena.
    #[must_use]
    pub fn from_cells(cells: &[[i32; 2]]) -> Vec<Self> {
        cells
            .iter()
            .filter_map(|&[x, y]| match Self::new(x, y) {
                Ok(location) => Some(location),
                Err(error) => {
                    tracing::warn!(%error, "dropping candidate cell");
                    None
                }
            })
            .collect()
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the cell displaced by the provided offset, if it is still inside the arena.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Self::new(self.x + dx, self.y + dy).ok()
    }

    /// Reports whether the cell lies on this engine's half of the arena.
    #[must_use]
    pub const fn is_own_half(&self) -> bool {
        self.y < HALF_ARENA
    }

    /// Lane containing the cell.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        if self.x <= LEFT_LANE_MAX_COLUMN {
            Lane::Left
        } else {
            Lane::Right
        }
    }

    /// Column step that moves the cell toward the vertical centre line.
    #[must_use]
    pub const fn toward_center(&self) -> i32 {
        match self.lane() {
            Lane::Left => 1,
            Lane::Right => -1,
        }
    }

    /// Euclidean distance between two cells.
    #[must_use]
    pub fn distance(self, other: Location) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Reports whether `other` is inside an attack radius centred on this cell.
    ///
    /// A cell counts as covered when its centre lies within half a cell of the
    /// radius, matching how the game rounds attack ranges onto the grid.
    #[must_use]
    pub fn covers(self, other: Location, radius: f64) -> bool {
        self.distance(other) < radius + 0.51
    }

    /// Enumerates every arena cell covered by a radius centred on this cell.
    ///
    /// Cells are produced row by row, then column by column, so callers
    /// observe a deterministic order.
    #[must_use]
    pub fn within_range(self, radius: f64) -> Vec<Location> {
        let reach = radius.max(0.0).ceil() as i32 + 1;
        let mut cells = Vec::new();
        for y in (self.y - reach)..=(self.y + reach) {
            for x in (self.x - reach)..=(self.x + reach) {
                if let Ok(candidate) = Self::new(x, y) {
                    if self.covers(candidate, radius) {
                        cells.push(candidate);
                    }
                }
            }
        }
        cells
    }

    /// Deploy edge the cell sits on, if any.
    #[must_use]
    pub fn edge(&self) -> Option<Quadrant> {
        Quadrant::ALL
            .into_iter()
            .find(|quadrant| quadrant.contains(*self))
    }
}

impl TryFrom<[i32; 2]> for Location {
    type Error = LocationError;

    fn try_from([x, y]: [i32; 2]) -> Result<Self, Self::Error> {
        Self::new(x, y)
    }
}

impl From<Location> for [i32; 2] {
    fn from(location: Location) -> Self {
        [location.x, location.y]
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// One of the four diagonal edges of the diamond.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// Opponent edge running from the left corner to the top corner.
    TopLeft,
    /// Opponent edge running from the top corner to the right corner.
    TopRight,
    /// Friendly edge running from the left corner to the bottom corner.
    BottomLeft,
    /// Friendly edge running from the bottom corner to the right corner.
    BottomRight,
}

impl Quadrant {
    /// Every edge in a fixed order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Edge a unit deployed on this edge walks toward.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }

    /// Reports whether the cell lies on this edge.
    #[must_use]
    pub const fn contains(self, location: Location) -> bool {
        let (x, y) = (location.x, location.y);
        match self {
            Self::BottomLeft => y < HALF_ARENA && x + y == HALF_ARENA - 1,
            Self::BottomRight => y < HALF_ARENA && x - y == HALF_ARENA,
            Self::TopLeft => y >= HALF_ARENA && y - x == HALF_ARENA,
            Self::TopRight => y >= HALF_ARENA && x + y == ARENA_SIZE + HALF_ARENA - 1,
        }
    }

    /// Remaining rows-and-columns a cell must cover before it touches this edge.
    ///
    /// Zero means the cell is on the edge; larger values are further away.
    #[must_use]
    pub const fn gap(self, location: Location) -> i32 {
        let (x, y) = (location.x, location.y);
        match self {
            Self::BottomLeft => x + y - (HALF_ARENA - 1),
            Self::BottomRight => HALF_ARENA - (x - y),
            Self::TopLeft => HALF_ARENA - (y - x),
            Self::TopRight => ARENA_SIZE + HALF_ARENA - 1 - (x + y),
        }
    }

    /// Cells composing the edge, ordered from the outer corner inward.
    #[must_use]
    pub fn cells(self) -> Vec<Location> {
        (0..HALF_ARENA)
            .map(|step| match self {
                Self::BottomLeft => (step, HALF_ARENA - 1 - step),
                Self::BottomRight => (ARENA_SIZE - 1 - step, HALF_ARENA - 1 - step),
                Self::TopLeft => (step, HALF_ARENA + step),
                Self::TopRight => (ARENA_SIZE - 1 - step, HALF_ARENA + step),
            })
            .filter_map(|(x, y)| Location::new(x, y).ok())
            .collect()
    }
}

/// Left or right half of the symmetric board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    /// Columns `0..=13`.
    Left,
    /// Columns `14..=27`.
    Right,
}

impl Lane {
    /// Friendly deploy edge belonging to the lane.
    #[must_use]
    pub const fn deploy_edge(self) -> Quadrant {
        match self {
            Self::Left => Quadrant::BottomLeft,
            Self::Right => Quadrant::BottomRight,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diamond_corners_are_inside_and_cut_corners_are_not() {
        assert!(Location::new(13, 0).is_ok());
        assert!(Location::new(14, 0).is_ok());
        assert!(Location::new(0, 13).is_ok());
        assert!(Location::new(27, 14).is_ok());
        assert!(Location::new(13, 27).is_ok());

        assert!(Location::new(12, 0).is_err());
        assert!(Location::new(0, 12).is_err());
        assert!(Location::new(27, 13 + 15).is_err());
        assert!(Location::new(0, 15).is_err());
        assert!(Location::new(-1, 13).is_err());
    }

    #[test]
    fn every_edge_has_fourteen_cells_on_the_right_half() {
        for quadrant in Quadrant::ALL {
            let cells = quadrant.cells();
            assert_eq!(cells.len(), 14, "{quadrant:?} should span fourteen cells");
            assert!(cells.iter().all(|cell| quadrant.contains(*cell)));
            assert!(cells.iter().all(|cell| quadrant.gap(*cell) == 0));
        }
        assert!(Quadrant::BottomLeft
            .cells()
            .iter()
            .all(|cell| cell.is_own_half()));
        assert!(Quadrant::TopRight
            .cells()
            .iter()
            .all(|cell| !cell.is_own_half()));
    }

    #[test]
    fn opposite_edges_pair_up_diagonally() {
        assert_eq!(Quadrant::BottomLeft.opposite(), Quadrant::TopRight);
        assert_eq!(Quadrant::BottomRight.opposite(), Quadrant::TopLeft);
        assert_eq!(Quadrant::TopRight.opposite(), Quadrant::BottomLeft);
    }

    #[test]
    fn lanes_split_at_the_centre_column() {
        let left = Location::new(13, 5).expect("valid");
        let right = Location::new(14, 5).expect("valid");
        assert_eq!(left.lane(), Lane::Left);
        assert_eq!(right.lane(), Lane::Right);
        assert_eq!(left.toward_center(), 1);
        assert_eq!(right.toward_center(), -1);
    }

    #[test]
    fn range_enumeration_is_ordered_and_bounded() {
        let centre = Location::new(13, 13).expect("valid");
        let cells = centre.within_range(1.0);
        assert_eq!(cells.len(), 9, "radius one plus rounding covers the 3x3 block");
        let mut sorted = cells.clone();
        sorted.sort_by_key(|cell| (cell.y(), cell.x()));
        assert_eq!(cells, sorted);
    }

    #[test]
    fn from_cells_drops_out_of_bounds_pairs() {
        let cells = Location::from_cells(&[[13, 0], [0, 0], [5, 10]]);
        assert_eq!(
            cells,
            vec![
                Location::new(13, 0).expect("valid"),
                Location::new(5, 10).expect("valid"),
            ]
        );
    }

    #[test]
    fn location_deserializes_from_pair_and_rejects_outside_cells() {
        let parsed: Location = serde_json::from_str("[3, 10]").expect("inside");
        assert_eq!(parsed, Location::new(3, 10).expect("valid"));
        assert!(serde_json::from_str::<Location>("[0, 0]").is_err());
    }
}
