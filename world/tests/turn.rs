use std::panic::{self, AssertUnwindSafe};

use lane_tactics_core::{
    BoardQuery, Command, Location, Occupant, Player, ResourceKind, StructureKind, Turn,
    UnitCatalog, UnitKind,
};
use lane_tactics_world::World;
use proptest::prelude::*;

fn at(x: i32, y: i32) -> Location {
    Location::new(x, y).expect("cell inside the arena")
}

fn world_with(structure: f64, mobile: f64) -> World {
    let mut world = World::new(UnitCatalog::default());
    world.set_resource(Player::Own, ResourceKind::Structure, structure);
    world.set_resource(Player::Own, ResourceKind::Mobile, mobile);
    world
}

#[test]
fn spawn_is_clamped_to_the_opening_balance() {
    let mut world = world_with(5.0, 0.0);
    let mut turn = Turn::begin(&mut world);

    let cells = [at(10, 10), at(11, 10), at(12, 10), at(13, 10)];
    let placed = turn.spawn(UnitKind::Turret, &cells, 1);

    assert_eq!(placed, 2, "five structure points only pay for two turrets");
    assert_eq!(turn.remaining(ResourceKind::Structure), 1.0);
    assert_eq!(turn.affordable(UnitKind::Wall), 1);
    let summary = turn.submit();
    assert_eq!(summary.placements.len(), 2);
    assert_eq!(summary.spent.structure, 4.0);
    assert_eq!(
        summary.commands.last(),
        Some(&Command::Submit),
        "submission terminates the command list"
    );
}

#[test]
fn mobile_spawns_split_the_allowance_across_cells() {
    let mut world = world_with(0.0, 5.0);
    let mut turn = Turn::begin(&mut world);

    let placed = turn.spawn(UnitKind::Scout, &[at(13, 0), at(14, 0)], 3);

    assert_eq!(placed, 5);
    assert_eq!(turn.affordable(UnitKind::Scout), 0);
    let summary = turn.submit();
    assert!(summary.placements.is_empty(), "mobile units are not placements");
    assert_eq!(summary.mobile_spawn_commands(), 2);
    assert_eq!(world.deployments().len(), 2);
}

#[test]
fn failed_placements_are_not_recorded_or_charged() {
    let mut world = world_with(10.0, 0.0);
    assert!(world.place(Player::Opponent, StructureKind::Wall, at(13, 5)));
    let mut turn = Turn::begin(&mut world);

    assert_eq!(turn.spawn(UnitKind::Turret, &[at(13, 5), at(13, 20)], 1), 0);

    let summary = turn.submit();
    assert!(summary.placements.is_empty());
    assert_eq!(summary.spent.structure, 0.0);
}

#[test]
fn upgrade_skips_foreign_and_upgraded_structures() {
    let mut world = world_with(20.0, 0.0);
    assert!(world.place(Player::Own, StructureKind::Turret, at(0, 13)));
    assert!(world.place_upgraded(Player::Own, StructureKind::Turret, at(27, 13)));
    assert!(world.place(Player::Opponent, StructureKind::Turret, at(13, 20)));
    let mut turn = Turn::begin(&mut world);

    let upgraded = turn.upgrade(&[at(0, 13), at(27, 13), at(13, 20), at(5, 10)]);

    assert_eq!(upgraded, 1);
    let summary = turn.submit();
    assert_eq!(summary.upgrades, vec![at(0, 13)]);
    assert_eq!(summary.spent.structure, 4.0);
    assert_eq!(summary.commands.len(), 2, "one upgrade call plus submit");
}

#[test]
fn empty_removal_issues_no_command() {
    let mut world = world_with(0.0, 0.0);
    let mut turn = Turn::begin(&mut world);
    assert_eq!(turn.remove(&[]), 0);
    assert_eq!(turn.submit().commands, vec![Command::Submit]);
}

#[test]
fn gap_probe_lifts_and_restores_friendly_structures() {
    let mut world = world_with(0.0, 0.0);
    let gap = at(13, 3);
    assert!(world.place(Player::Own, StructureKind::Wall, gap));
    let mut turn = Turn::begin(&mut world);

    {
        let probe = turn.probe_gap(gap);
        assert!(probe.lifted().is_some());
        assert!(probe.occupancy(gap).is_none(), "probe sees the gap open");
        assert!(!probe.path_to_exit(gap).is_empty());
    }

    assert_eq!(
        turn.occupancy(gap),
        Some(Occupant::new(StructureKind::Wall, Player::Own))
    );
    let _ = turn.submit();
}

#[test]
fn gap_probe_leaves_enemy_structures_alone() {
    let mut world = world_with(0.0, 0.0);
    let cell = at(13, 3);
    assert!(world.place(Player::Opponent, StructureKind::Wall, cell));
    let mut turn = Turn::begin(&mut world);

    let probe = turn.probe_gap(cell);
    assert!(probe.lifted().is_none());
    assert!(probe.occupancy(cell).is_some());
}

#[test]
fn gap_probe_restores_on_unwind() {
    let mut world = world_with(0.0, 0.0);
    let gap = at(13, 3);
    assert!(world.place_upgraded(Player::Own, StructureKind::Turret, gap));

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut turn = Turn::begin(&mut world);
        let probe = turn.probe_gap(gap);
        assert!(probe.occupancy(gap).is_none());
        panic!("planning aborted mid-probe");
    }));

    assert!(outcome.is_err());
    let restored = world.occupancy(gap).expect("structure restored");
    assert!(restored.upgraded, "restored structure keeps its upgrade");
    assert_eq!(restored.kind, StructureKind::Turret);
}

proptest! {
    #[test]
    fn requested_spend_never_exceeds_the_opening_balance(
        structure in 0.0f64..60.0,
        mobile in 0.0f64..20.0,
        requests in proptest::collection::vec((0usize..6, 0i32..28, 0i32..14, 1u32..6), 0..40),
    ) {
        let mut world = world_with(structure, mobile);
        let mut turn = Turn::begin(&mut world);
        for (unit_index, x, y, max_count) in requests {
            let Some(unit) = UnitKind::from_index(unit_index) else { continue };
            let Ok(location) = Location::new(x, y) else { continue };
            let _ = turn.spawn(unit, &[location], max_count);
            if unit_index % 2 == 0 {
                let _ = turn.upgrade(&[location]);
            }
        }
        let summary = turn.submit();
        prop_assert!(summary.spent.structure <= structure + 1e-6);
        prop_assert!(summary.spent.mobile <= mobile + 1e-6);
    }
}
