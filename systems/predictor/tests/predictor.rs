use lane_tactics_system_predictor::{AttackObservation, AttackPredictor, ObservationLog};
use proptest::prelude::*;

#[test]
fn averages_observations_within_one_point() {
    let mut predictor = AttackPredictor::new();
    predictor.record_breaches(5.0, 10.0);
    predictor.record_breaches(3.0, 9.0);
    predictor.record_breaches(8.0, 20.0);

    assert_eq!(predictor.expected_breaches(10.0), 4.0);
    assert_eq!(predictor.expected_breaches(20.0), 8.0);
    assert_eq!(predictor.expected_breaches(15.0), 0.0);
}

#[test]
fn empty_logs_predict_zero() {
    let predictor = AttackPredictor::new();
    assert_eq!(predictor.expected_breaches(10.0), 0.0);
    assert_eq!(predictor.expected_damage(10.0), 0.0);
    assert_eq!(predictor.expected_enemy_mobile(10.0), 0.0);
}

#[test]
fn logs_are_independent() {
    let mut predictor = AttackPredictor::new();
    predictor.record_damage(12.0, 6.0);
    predictor.record_enemy_mobile(7.0, 6.0);

    assert_eq!(predictor.expected_breaches(6.0), 0.0);
    assert_eq!(predictor.expected_damage(6.0), 12.0);
    assert_eq!(predictor.expected_enemy_mobile(6.0), 7.0);
    assert_eq!(predictor.damage_log().len(), 1);
    assert!(predictor.breach_log().is_empty());
}

proptest! {
    #[test]
    fn logs_only_grow_and_queries_do_not_mutate(
        samples in proptest::collection::vec((0.0f64..50.0, 0.0f64..30.0), 0..30),
        query in 0.0f64..30.0,
    ) {
        let mut log = ObservationLog::default();
        for (index, (magnitude, resource)) in samples.iter().enumerate() {
            log.push(AttackObservation::new(*magnitude, *resource));
            prop_assert_eq!(log.len(), index + 1);
        }
        let before = log.clone();
        let first = log.expected_near(query);
        let second = log.expected_near(query);
        prop_assert_eq!(first, second);
        prop_assert_eq!(log, before);
        prop_assert!((0.0..=50.0).contains(&first));
    }
}
