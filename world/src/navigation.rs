//! Breadth-first navigation over the diamond arena.

use std::collections::VecDeque;

use lane_tactics_core::{Location, Quadrant, ARENA_SIZE};

const UNREACHABLE: u16 = u16::MAX;

/// Dense distance grid seeded from a set of exit cells.
///
/// The field covers the bounding square of the arena in row-major order.
/// Cells outside the diamond, blocked cells and cells with no route to an exit
/// keep `u16::MAX`.
#[derive(Clone, Debug)]
pub(crate) struct NavigationField {
    distances: Vec<u16>,
}

impl NavigationField {
    /// Builds the field using a reverse breadth-first search from `exits`.
    pub(crate) fn build<F>(exits: &[Location], is_blocked: F) -> Self
    where
        F: Fn(Location) -> bool,
    {
        let mut distances = vec![UNREACHABLE; cell_count()];
        let mut queue = VecDeque::new();

        for &exit in exits {
            if is_blocked(exit) || distances[index(exit)] == 0 {
                continue;
            }
            distances[index(exit)] = 0;
            queue.push_back(exit);
        }

        while let Some(cell) = queue.pop_front() {
            let next_distance = distances[index(cell)].saturating_add(1);
            for neighbor in neighbors(cell) {
                if is_blocked(neighbor) || distances[index(neighbor)] <= next_distance {
                    continue;
                }
                distances[index(neighbor)] = next_distance;
                queue.push_back(neighbor);
            }
        }

        Self { distances }
    }

    /// Distance from the cell to the nearest exit, if one is reachable.
    pub(crate) fn distance(&self, cell: Location) -> Option<u16> {
        let distance = self.distances[index(cell)];
        (distance != UNREACHABLE).then_some(distance)
    }

    /// Walks downhill from `start` to an exit, preferring neighbors in a fixed order.
    fn descend(&self, start: Location) -> Vec<Location> {
        let Some(mut remaining) = self.distance(start) else {
            return Vec::new();
        };
        let mut path = vec![start];
        let mut current = start;
        while remaining > 0 {
            let Some(next) =
                neighbors(current).find(|&neighbor| self.distance(neighbor) == Some(remaining - 1))
            else {
                break;
            };
            path.push(next);
            current = next;
            remaining -= 1;
        }
        path
    }
}

/// Computes the route a mobile unit deployed at `start` would take toward `target`.
///
/// When the edge cannot be reached the route ends at the reachable cell that
/// lies closest to it. Blocked starts produce an empty route.
pub(crate) fn route<F>(start: Location, target: Quadrant, is_blocked: F) -> Vec<Location>
where
    F: Fn(Location) -> bool,
{
    if is_blocked(start) {
        return Vec::new();
    }

    let field = NavigationField::build(&target.cells(), &is_blocked);
    if field.distance(start).is_some() {
        return field.descend(start);
    }

    let fallback = closest_reachable(start, target, &is_blocked);
    NavigationField::build(&[fallback], &is_blocked).descend(start)
}

fn closest_reachable<F>(start: Location, target: Quadrant, is_blocked: F) -> Location
where
    F: Fn(Location) -> bool,
{
    let mut seen = vec![false; cell_count()];
    let mut queue = VecDeque::from([start]);
    seen[index(start)] = true;
    let mut best = start;

    while let Some(cell) = queue.pop_front() {
        if target.gap(cell) < target.gap(best) {
            best = cell;
        }
        for neighbor in neighbors(cell) {
            if is_blocked(neighbor) || seen[index(neighbor)] {
                continue;
            }
            seen[index(neighbor)] = true;
            queue.push_back(neighbor);
        }
    }

    best
}

fn neighbors(cell: Location) -> impl Iterator<Item = Location> {
    [(0, -1), (1, 0), (0, 1), (-1, 0)]
        .into_iter()
        .filter_map(move |(dx, dy)| cell.offset(dx, dy))
}

fn cell_count() -> usize {
    let side = ARENA_SIZE as usize;
    side * side
}

fn index(cell: Location) -> usize {
    // Locations are validated against the arena, so both coordinates are in 0..ARENA_SIZE.
    cell.y() as usize * ARENA_SIZE as usize + cell.x() as usize
}
