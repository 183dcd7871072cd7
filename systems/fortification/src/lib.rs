#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Baseline fortification and emergency interception.
//!
//! The skeleton is rebuilt every turn: placement calls on cells that already
//! hold a structure simply report zero and cost nothing, so topping up after
//! losses needs no bookkeeping.

use std::collections::BTreeSet;

use lane_tactics_core::{
    BoardQuery, Location, Oracle, Quadrant, Settings, Turn, UnitKind, HALF_ARENA,
};
use lane_tactics_system_risk::hole_check;

/// Counts produced by one skeleton pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkeletonReport {
    /// Corner turrets placed.
    pub corner_turrets: u32,
    /// V-cluster turrets placed.
    pub cluster_turrets: u32,
    /// Central walls placed.
    pub walls: u32,
    /// Corner turrets upgraded.
    pub upgrades: u32,
}

/// Cells of the central wall line.
///
/// The line sits `depth` rows below the midline and spans `width` columns
/// around the centre, the left half taking the extra cell of an odd width.
#[must_use]
pub fn central_wall_line(depth: i32, width: i32) -> Vec<Location> {
    if width <= 0 {
        return Vec::new();
    }
    let row = HALF_ARENA - 1 - depth;
    let first = HALF_ARENA - (width - width / 2);
    let last = HALF_ARENA - 1 + width / 2;
    (first..=last)
        .filter_map(|x| Location::new(x, row).ok())
        .collect()
}

/// V-cluster cells in placement order: middle first, then the arms pairwise.
///
/// While a corridor is active each arm loses `shrink` cells from its inner end.
#[must_use]
pub fn cluster_cells(settings: &Settings, corridor_active: bool) -> Vec<Location> {
    let skeleton = &settings.strategy.skeleton;
    let shrink = if corridor_active {
        skeleton.corridor_shrink as usize
    } else {
        0
    };
    let left = Location::from_cells(&skeleton.v_left);
    let right = Location::from_cells(&skeleton.v_right);
    let left = &left[..left.len().saturating_sub(shrink)];
    let right = &right[..right.len().saturating_sub(shrink)];

    let mut cells = Location::from_cells(&skeleton.v_middle);
    for index in 0..left.len().max(right.len()) {
        cells.extend(left.get(index));
        cells.extend(right.get(index));
    }
    cells
}

/// Places the per-turn skeleton: corner turrets, the V cluster, the central
/// wall line and finally the corner upgrades.
pub fn build_skeleton<O: Oracle>(
    turn: &mut Turn<'_, O>,
    settings: &Settings,
    corridor_active: bool,
    reserved: &BTreeSet<Location>,
) -> SkeletonReport {
    let skeleton = &settings.strategy.skeleton;
    let corners = Location::from_cells(&skeleton.corners);
    let mut report = SkeletonReport {
        corner_turrets: turn.spawn(UnitKind::Turret, &corners, 1),
        ..SkeletonReport::default()
    };

    let cluster: Vec<Location> = cluster_cells(settings, corridor_active)
        .into_iter()
        .filter(|cell| !reserved.contains(cell))
        .collect();
    report.cluster_turrets = turn.spawn(UnitKind::Turret, &cluster, 1);

    let walls: Vec<Location> = central_wall_line(skeleton.wall_depth, skeleton.wall_width)
        .into_iter()
        .filter(|cell| !reserved.contains(cell))
        .collect();
    report.walls = turn.spawn(UnitKind::Wall, &walls, 1);

    if skeleton.upgrade_corners {
        report.upgrades = turn.upgrade(&corners);
    }
    tracing::debug!(
        corners = report.corner_turrets,
        cluster = report.cluster_turrets,
        walls = report.walls,
        upgrades = report.upgrades,
        "skeleton topped up"
    );
    report
}

/// One interceptor launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterceptLaunch {
    /// Breach or post the interceptor is aimed at.
    pub target: Location,
    /// Deploy cell used.
    pub location: Location,
    /// Whether the diagonal fallback cell was used.
    pub fallback: bool,
    /// Interceptors placed.
    pub count: u32,
}

/// Launches interceptors at the highest ranked breach cells.
///
/// Targets are served round-robin; with no breach on record the configured
/// posts are used instead. Each interceptor deploys from the free edge cell
/// closest to its target when the hole check shows a route through it, and
/// otherwise from the next cell along the edge toward the bottom corner.
/// The deploy cell is always free, so the hole check lifts nothing here and
/// reduces to a reachability query from that cell.
pub fn intercept<O: Oracle>(
    turn: &mut Turn<'_, O>,
    settings: &Settings,
    ranked_breaches: &[Location],
) -> Vec<InterceptLaunch> {
    let tuning = &settings.strategy.interception;
    let targets = if ranked_breaches.is_empty() {
        Location::from_cells(&tuning.posts)
    } else {
        ranked_breaches.to_vec()
    };
    if targets.is_empty() {
        return Vec::new();
    }

    let mut launches = Vec::new();
    for index in 0..tuning.interceptors as usize {
        let target = targets[index % targets.len()];
        let edge = target.lane().deploy_edge();
        let Some(direct) = nearest_open_edge_cell(&*turn, edge, target) else {
            tracing::debug!(%target, "no open deploy cell for interceptor");
            continue;
        };
        let (location, fallback) = if hole_check(turn, direct) {
            (direct, false)
        } else {
            match diagonal_fallback(edge, direct) {
                Some(cell) => (cell, true),
                None => continue,
            }
        };
        let count = turn.spawn(UnitKind::Interceptor, &[location], 1);
        tracing::info!(%target, %location, fallback, count, "interceptor launched");
        launches.push(InterceptLaunch {
            target,
            location,
            fallback,
            count,
        });
    }
    launches
}

fn nearest_open_edge_cell<Q: BoardQuery + ?Sized>(
    board: &Q,
    edge: Quadrant,
    target: Location,
) -> Option<Location> {
    board
        .edge_locations(edge)
        .into_iter()
        .filter(|&cell| board.occupancy(cell).is_none())
        .min_by(|a, b| a.distance(target).total_cmp(&b.distance(target)))
}

/// Next cell along a deploy edge toward the bottom corner.
fn diagonal_fallback(edge: Quadrant, cell: Location) -> Option<Location> {
    let step = match edge {
        Quadrant::BottomLeft => 1,
        Quadrant::BottomRight => -1,
        Quadrant::TopLeft | Quadrant::TopRight => return None,
    };
    cell.offset(step, -1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: i32, y: i32) -> Location {
        Location::new(x, y).expect("cell inside the arena")
    }

    #[test]
    fn wall_line_is_centred_on_the_midline_columns() {
        let line = central_wall_line(3, 14);
        assert_eq!(line.len(), 14);
        assert_eq!(line.first(), Some(&at(7, 10)));
        assert_eq!(line.last(), Some(&at(20, 10)));

        assert_eq!(central_wall_line(0, 1), vec![at(13, 13)]);
        assert_eq!(central_wall_line(5, 2), vec![at(13, 8), at(14, 8)]);
        assert!(central_wall_line(3, 0).is_empty());
    }

    #[test]
    fn wall_line_is_clipped_to_the_arena() {
        let line = central_wall_line(12, 6);
        assert_eq!(line, vec![at(12, 1), at(13, 1), at(14, 1), at(15, 1)]);
    }

    #[test]
    fn cluster_interleaves_arms_and_shrinks_for_corridors() {
        let settings = Settings::default();
        assert_eq!(
            cluster_cells(&settings, false),
            vec![
                at(12, 9),
                at(15, 9),
                at(5, 12),
                at(22, 12),
                at(6, 11),
                at(21, 11),
                at(8, 10),
                at(19, 10),
            ]
        );
        assert_eq!(
            cluster_cells(&settings, true),
            vec![at(12, 9), at(15, 9), at(5, 12), at(22, 12)]
        );
    }

    #[test]
    fn fallback_walks_along_the_edge_toward_the_bottom_corner() {
        assert_eq!(
            diagonal_fallback(Quadrant::BottomLeft, at(4, 9)),
            Some(at(5, 8))
        );
        assert_eq!(
            diagonal_fallback(Quadrant::BottomRight, at(23, 9)),
            Some(at(22, 8))
        );
        assert_eq!(diagonal_fallback(Quadrant::BottomLeft, at(13, 0)), None);
    }
}
