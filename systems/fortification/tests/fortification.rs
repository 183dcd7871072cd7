use std::collections::BTreeSet;

use lane_tactics_core::{
    BoardQuery, Location, Oracle, Player, ResourceKind, Settings, StructureKind, Turn,
    UnitCatalog, UnitKind,
};
use lane_tactics_system_fortification::{build_skeleton, intercept, InterceptLaunch, SkeletonReport};
use lane_tactics_world::World;

fn at(x: i32, y: i32) -> Location {
    Location::new(x, y).expect("cell inside the arena")
}

#[test]
fn opening_skeleton_spends_the_full_structure_budget() {
    let settings = Settings::default();
    let mut world = World::new(UnitCatalog::default());
    let mut turn = Turn::begin(&mut world);

    let report = build_skeleton(&mut turn, &settings, false, &BTreeSet::new());
    let summary = turn.submit();

    assert_eq!(
        report,
        SkeletonReport {
            corner_turrets: 2,
            cluster_turrets: 8,
            walls: 12,
            upgrades: 2,
        }
    );
    assert_eq!(summary.spent.structure, 40.0);
    assert_eq!(summary.mobile_spawn_commands(), 0);
    let corners: Vec<bool> = [at(0, 13), at(27, 13)]
        .into_iter()
        .map(|cell| world.occupancy(cell).is_some_and(|occupant| occupant.upgraded))
        .collect();
    assert_eq!(corners, vec![true, true]);
}

#[test]
fn active_corridor_shrinks_the_cluster_and_keeps_reserved_cells_free() {
    let settings = Settings::default();
    let mut world = World::new(UnitCatalog::default());
    world.set_resource(Player::Own, ResourceKind::Structure, 100.0);
    let reserved: BTreeSet<Location> = [at(13, 10), at(14, 10)].into_iter().collect();
    let mut turn = Turn::begin(&mut world);

    let report = build_skeleton(&mut turn, &settings, true, &reserved);
    let _ = turn.submit();

    assert_eq!(report.cluster_turrets, 4);
    assert_eq!(report.walls, 12);
    assert!(reserved.iter().all(|&cell| world.occupancy(cell).is_none()));
    assert_eq!(
        world.occupancy(at(8, 10)).map(|occupant| occupant.kind),
        Some(StructureKind::Wall),
        "the trimmed arm cell is walled instead"
    );
}

#[test]
fn repeated_passes_only_fill_what_is_missing() {
    let settings = Settings::default();
    let mut world = World::new(UnitCatalog::default());
    world.set_resource(Player::Own, ResourceKind::Structure, 100.0);
    let mut turn = Turn::begin(&mut world);
    let _ = build_skeleton(&mut turn, &settings, false, &BTreeSet::new());
    let _ = turn.submit();
    world.advance_turn();

    let _ = world.lift_structure(at(12, 9));
    let mut turn = Turn::begin(&mut world);
    let report = build_skeleton(&mut turn, &settings, false, &BTreeSet::new());
    let summary = turn.submit();

    assert_eq!(
        report,
        SkeletonReport {
            corner_turrets: 0,
            cluster_turrets: 1,
            walls: 0,
            upgrades: 0,
        }
    );
    assert_eq!(summary.spent.structure, 2.0);
}

#[test]
fn interceptors_head_for_the_posts_without_breach_history() {
    let settings = Settings::default();
    let mut world = World::new(UnitCatalog::default());
    let mut turn = Turn::begin(&mut world);

    let launches = intercept(&mut turn, &settings, &[]);
    let _ = turn.submit();

    assert_eq!(
        launches,
        vec![
            InterceptLaunch {
                target: at(4, 9),
                location: at(4, 9),
                fallback: false,
                count: 1,
            },
            InterceptLaunch {
                target: at(23, 9),
                location: at(23, 9),
                fallback: false,
                count: 1,
            },
        ]
    );
    assert!(world
        .deployments()
        .iter()
        .all(|deployment| deployment.unit == UnitKind::Interceptor));
}

#[test]
fn interceptors_share_the_top_breach_round_robin() {
    let settings = Settings::default();
    let mut world = World::new(UnitCatalog::default());
    let mut turn = Turn::begin(&mut world);

    let launches = intercept(&mut turn, &settings, &[at(3, 13)]);
    let _ = turn.submit();

    let cells: Vec<Location> = launches.iter().map(|launch| launch.location).collect();
    assert_eq!(cells, vec![at(1, 12), at(1, 12)], "closest free left-edge cell");
}

#[test]
fn sealed_deploy_cell_falls_back_along_the_edge() {
    let settings = Settings::default();
    let mut world = World::new(UnitCatalog::default());
    for cell in [at(5, 9), at(4, 10)] {
        assert!(world.place(Player::Own, StructureKind::Wall, cell));
    }
    let mut turn = Turn::begin(&mut world);

    let launches = intercept(&mut turn, &settings, &[at(4, 9)]);
    let _ = turn.submit();

    assert_eq!(launches.len(), 2);
    assert!(launches.iter().all(|launch| launch.fallback));
    assert!(launches.iter().all(|launch| launch.location == at(5, 8)));
    assert_eq!(world.structures(Player::Own).len(), 2, "lifted structures are put back");
}
