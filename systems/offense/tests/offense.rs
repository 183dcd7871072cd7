use std::collections::BTreeSet;

use lane_tactics_core::{
    Lane, Location, Player, ResourceKind, Settings, StructureKind, Turn, UnitKind,
};
use lane_tactics_system_memory::BoardMemory;
use lane_tactics_system_offense::{
    Directive, OffenseOutcome, OffenseScheduler, Phase, Transition,
};
use lane_tactics_system_predictor::AttackPredictor;
use lane_tactics_world::{Economy, World};
use proptest::prelude::*;

fn at(x: i32, y: i32) -> Location {
    Location::new(x, y).expect("cell inside the arena")
}

fn right_channel() -> BTreeSet<Location> {
    [
        at(14, 1),
        at(14, 2),
        at(15, 3),
        at(16, 4),
        at(17, 5),
        at(18, 6),
        at(19, 7),
        at(20, 8),
        at(21, 9),
        at(22, 10),
    ]
    .into_iter()
    .collect()
}

/// Board with five turrets and four walls this engine paid for and remembers.
fn fortified_world(economy: Economy) -> (World, BoardMemory) {
    let settings = Settings::default();
    let mut world = World::with_economy(settings.catalog, economy);
    let mut memory = BoardMemory::new();
    let _ = memory.reconcile(&world);
    let mut turn = Turn::begin(&mut world);
    let turrets = [at(5, 12), at(6, 11), at(8, 10), at(22, 12), at(21, 11)];
    let walls = [at(10, 10), at(11, 10), at(16, 10), at(17, 10)];
    assert_eq!(turn.spawn(UnitKind::Turret, &turrets, 1), 5);
    assert_eq!(turn.spawn(UnitKind::Wall, &walls, 1), 4);
    memory.record(&turn.submit());
    world.advance_turn();
    (world, memory)
}

fn play(
    scheduler: &mut OffenseScheduler,
    world: &mut World,
    memory: &mut BoardMemory,
    settings: &Settings,
) -> OffenseOutcome {
    let _ = memory.reconcile(&*world);
    let predictor = AttackPredictor::new();
    let mut turn = Turn::begin(world);
    let outcome = scheduler.schedule(&mut turn, memory, &predictor, settings);
    memory.record(&turn.submit());
    outcome
}

fn prime_for_commit(world: &mut World, turn: u32) {
    world.set_turn(turn);
    world.set_resource(Player::Own, ResourceKind::Structure, 10.0);
    world.set_resource(Player::Own, ResourceKind::Mobile, 5.0);
    world.set_resource(Player::Opponent, ResourceKind::Mobile, 0.0);
}

#[test]
fn commits_by_liquidating_expendable_structures() {
    let settings = Settings::default();
    let (mut world, mut memory) = fortified_world(Economy::default());
    prime_for_commit(&mut world, 3);
    let mut scheduler = OffenseScheduler::new();

    let outcome = play(&mut scheduler, &mut world, &mut memory, &settings);

    assert_eq!(outcome.transitions, vec![Transition::Commit]);
    assert_eq!(outcome.directive, Directive::Yield);
    assert!(!outcome.intercept);
    assert_eq!(scheduler.phase(), Phase::Committed);
    assert_eq!(world.pending_removals().len(), 9, "five turrets and four walls");
    assert_eq!(
        scheduler.current_plan().map(|plan| plan.lane),
        Some(Lane::Right),
        "no enemy structures, so the tie picks the right lane"
    );
    assert_eq!(scheduler.reserved_corridor(), right_channel());
    assert!(scheduler.corridor_active());
}

#[test]
fn cooldown_window_blocks_commit_unless_health_is_critical() {
    let settings = Settings::default();
    let (mut world, mut memory) = fortified_world(Economy::default());
    prime_for_commit(&mut world, 10);
    let mut scheduler = OffenseScheduler::new();

    let held = play(&mut scheduler, &mut world, &mut memory, &settings);
    assert!(held.transitions.is_empty());
    assert_eq!(held.directive, Directive::Proceed);
    assert_eq!(scheduler.phase(), Phase::Accumulating);

    world.advance_turn();
    prime_for_commit(&mut world, 11);
    world.set_health(Player::Own, 9.0);
    let forced = play(&mut scheduler, &mut world, &mut memory, &settings);
    assert_eq!(forced.transitions, vec![Transition::Commit]);
}

#[test]
fn zero_length_cycle_disables_the_cooldown() {
    let mut settings = Settings::default();
    settings.strategy.offense.cycle_length = 0;
    let (mut world, mut memory) = fortified_world(Economy::default());
    prime_for_commit(&mut world, 10);
    let mut scheduler = OffenseScheduler::new();

    let outcome = play(&mut scheduler, &mut world, &mut memory, &settings);

    assert_eq!(outcome.transitions, vec![Transition::Commit]);
    assert_eq!(scheduler.phase(), Phase::Committed);
}

#[test]
fn insufficient_liquidation_value_keeps_accumulating() {
    let settings = Settings::default();
    let (mut world, mut memory) = fortified_world(Economy::default());
    prime_for_commit(&mut world, 4);
    world.set_resource(Player::Own, ResourceKind::Structure, 2.0);
    let mut scheduler = OffenseScheduler::new();

    let outcome = play(&mut scheduler, &mut world, &mut memory, &settings);

    assert!(outcome.transitions.is_empty());
    assert!(world.pending_removals().is_empty());
}

#[test]
fn firing_builds_the_corridor_and_aborts_a_rush_that_cannot_finish() {
    let settings = Settings::default();
    let (mut world, mut memory) = fortified_world(Economy::default());
    prime_for_commit(&mut world, 3);
    let mut scheduler = OffenseScheduler::new();
    let _ = play(&mut scheduler, &mut world, &mut memory, &settings);

    world.advance_turn();
    world.set_resource(Player::Own, ResourceKind::Structure, 30.0);
    world.set_resource(Player::Own, ResourceKind::Mobile, 12.0);
    let outcome = play(&mut scheduler, &mut world, &mut memory, &settings);

    assert_eq!(outcome.transitions, vec![Transition::Fire, Transition::Abort]);
    let wave = outcome.wave.expect("a wave is launched");
    assert_eq!(wave.lane, Lane::Right);
    assert_eq!(wave.entry, at(15, 1));
    assert_eq!(wave.count, 11, "one mobile point went to the escort");
    let escorts: Vec<_> = world
        .deployments()
        .iter()
        .filter(|deployment| deployment.unit == UnitKind::Interceptor)
        .map(|deployment| deployment.location)
        .collect();
    assert_eq!(escorts, vec![at(22, 8)]);
    assert_eq!(
        world.pending_removals().len(),
        9,
        "seven supports and two walls are refunded on abort"
    );
    assert_eq!(scheduler.phase(), Phase::Accumulating);
    assert!(scheduler.reserved_corridor().is_empty());

    world.advance_turn();
    prime_for_commit(&mut world, 5);
    world.set_resource(Player::Own, ResourceKind::Structure, 30.0);
    let locked = play(&mut scheduler, &mut world, &mut memory, &settings);
    assert!(
        locked.transitions.is_empty(),
        "no commit on the turn right after an abort"
    );

    world.advance_turn();
    prime_for_commit(&mut world, 6);
    world.set_resource(Player::Own, ResourceKind::Structure, 30.0);
    let recommitted = play(&mut scheduler, &mut world, &mut memory, &settings);
    assert_eq!(recommitted.transitions, vec![Transition::Commit]);
}

#[test]
fn sustainable_rush_keeps_executing_until_danger_cancels_it() {
    let settings = Settings::default();
    let economy = Economy {
        mobile_income: 12.0,
        ..Economy::default()
    };
    let (mut world, mut memory) = fortified_world(economy);
    prime_for_commit(&mut world, 3);
    let mut scheduler = OffenseScheduler::new();
    let _ = play(&mut scheduler, &mut world, &mut memory, &settings);

    world.advance_turn();
    world.set_resource(Player::Own, ResourceKind::Structure, 30.0);
    world.set_resource(Player::Own, ResourceKind::Mobile, 12.0);
    world.set_resource(Player::Opponent, ResourceKind::Mobile, 0.0);
    let fired = play(&mut scheduler, &mut world, &mut memory, &settings);
    assert_eq!(fired.transitions, vec![Transition::Fire]);
    assert_eq!(scheduler.phase(), Phase::Executing);
    let corridor: BTreeSet<Location> = world
        .structures(Player::Own)
        .into_iter()
        .filter(|(_, occupant)| occupant.kind != StructureKind::Turret)
        .map(|(location, _)| location)
        .filter(|location| right_channel().contains(location))
        .collect();
    assert_eq!(corridor.len(), 9);

    world.advance_turn();
    world.set_resource(Player::Opponent, ResourceKind::Mobile, 20.0);
    let cancelled = play(&mut scheduler, &mut world, &mut memory, &settings);

    assert!(cancelled.intercept);
    assert_eq!(cancelled.transitions, vec![Transition::ForceCancel]);
    assert_eq!(scheduler.phase(), Phase::Accumulating);
    assert_eq!(world.pending_removals().len(), 9);
}

#[test]
fn danger_while_accumulating_only_requests_interception() {
    let settings = Settings::default();
    let (mut world, mut memory) = fortified_world(Economy::default());
    prime_for_commit(&mut world, 3);
    world.set_resource(Player::Opponent, ResourceKind::Mobile, 14.0);
    let mut scheduler = OffenseScheduler::new();

    let outcome = play(&mut scheduler, &mut world, &mut memory, &settings);

    assert!(outcome.intercept);
    assert!(outcome.transitions.is_empty());
    assert_eq!(outcome.directive, Directive::Proceed);
    assert!(world.pending_removals().is_empty());
}

proptest! {
    #[test]
    fn commits_are_separated_by_fire_or_cancel(
        turns in proptest::collection::vec(
            (0.0f64..40.0, 0.0f64..20.0, 0.0f64..20.0, 5.0f64..30.0),
            1..25,
        ),
    ) {
        let settings = Settings::default();
        let (mut world, mut memory) = fortified_world(Economy::default());
        let mut scheduler = OffenseScheduler::new();
        let mut committed = false;

        for (structure, mobile, opponent_mobile, health) in turns {
            world.set_resource(Player::Own, ResourceKind::Structure, structure);
            world.set_resource(Player::Own, ResourceKind::Mobile, mobile);
            world.set_resource(Player::Opponent, ResourceKind::Mobile, opponent_mobile);
            world.set_health(Player::Own, health);
            let outcome = play(&mut scheduler, &mut world, &mut memory, &settings);
            for transition in outcome.transitions {
                match transition {
                    Transition::Commit => {
                        prop_assert!(!committed, "second commit without an intervening fire");
                        committed = true;
                    }
                    Transition::Fire | Transition::ForceCancel => committed = false,
                    Transition::Abort => {}
                }
            }
            world.advance_turn();
        }
    }
}
