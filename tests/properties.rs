//! Property tests over arbitrary input sequences.

use proptest::prelude::*;
use trust_anchor::{
    AnchorConfig, Challenge, ControlInputs, Controller, SeededNoise, SensorInputs, TickInputs,
};

fn anchor(seed: u64) -> Controller<SeededNoise> {
    Controller::new(
        &AnchorConfig::default().with_rate_window(500),
        SeededNoise::new(seed),
    )
    .unwrap()
}

/// Arbitrary tick inputs; environmental excursions and control edges
/// are rare so that long stretches of normal operation occur.
fn tick_inputs() -> impl Strategy<Value = TickInputs> {
    (
        prop::bool::weighted(0.9),
        prop::bool::weighted(0.05),
        prop::bool::weighted(0.05),
        any::<bool>(),
        prop::bool::weighted(0.1),
        -90i8..=90,
        -60i16..=120,
        prop::bool::weighted(0.05),
        prop::option::weighted(0.1, any::<[u8; 16]>()),
    )
        .prop_map(
            |(enable, reset, security_lock, ready, excursion, temp, supply, tamper, challenge)| {
                let sensors = if excursion {
                    SensorInputs {
                        thermal: [temp; 4],
                        supply_offset_cv: supply,
                        tamper_mask: u32::from(tamper),
                    }
                } else {
                    SensorInputs::NOMINAL
                };
                TickInputs {
                    control: ControlInputs {
                        enable,
                        reset,
                        security_lock,
                    },
                    challenge: challenge.map(Challenge::from_bytes),
                    entropy_ready: ready,
                    sensors,
                }
            },
        )
}

fn without_reset() -> impl Strategy<Value = TickInputs> {
    tick_inputs().prop_map(|inputs| inputs.with_reset(false))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_healthy_implies_every_condition(
        seed in any::<u64>(),
        sequence in prop::collection::vec(tick_inputs(), 1..1500),
    ) {
        let mut ctrl = anchor(seed);
        for inputs in &sequence {
            let status = ctrl.tick(inputs);
            if status.healthy {
                prop_assert!(status.entropy_rate_kbps >= 512);
                prop_assert!(!status.tamper_detected);
                prop_assert!(!status.kill_switch_detected);
                prop_assert!(status.temperature_c <= 85);
                prop_assert!(status.voltage_centivolts >= 150);
            }
        }
    }

    #[test]
    fn prop_tamper_sticky_without_reset(
        seed in any::<u64>(),
        mask in 1u32..,
        sequence in prop::collection::vec(without_reset(), 1..300),
    ) {
        let mut ctrl = anchor(seed);
        let trip = TickInputs::running().with_sensors(SensorInputs::with_tamper_mask(mask));
        prop_assert!(ctrl.tick(&trip).tamper_detected);

        for inputs in &sequence {
            prop_assert!(ctrl.tick(inputs).tamper_detected);
        }
    }

    #[test]
    fn prop_kill_switch_sticky_without_reset(
        seed in any::<u64>(),
        sequence in prop::collection::vec(without_reset(), 1..300),
    ) {
        let mut ctrl = anchor(seed);
        prop_assert!(ctrl.tick(&TickInputs::running().with_security_lock(true)).kill_switch_detected);

        for inputs in &sequence {
            prop_assert!(ctrl.tick(inputs).kill_switch_detected);
        }
    }

    #[test]
    fn prop_self_destruct_is_irreversible(
        seed in any::<u64>(),
        sequence in prop::collection::vec(tick_inputs(), 1..300),
    ) {
        let mut ctrl = anchor(seed);
        ctrl.tick(&TickInputs::running().with_sensors(SensorInputs::with_tamper_mask(1)));
        let critical = TickInputs::running().with_sensors(SensorInputs::with_temperature_offset(90));
        prop_assert!(ctrl.tick(&critical).self_destruct_asserted);

        for inputs in &sequence {
            let status = ctrl.tick(inputs);
            prop_assert!(status.self_destruct_asserted);
            prop_assert!(!status.healthy);
            prop_assert_eq!(status.entropy_rate_kbps, 0);
            prop_assert!(!ctrl.entropy().valid);
            prop_assert!(!ctrl.response().valid);
            prop_assert!(ctrl.response().response.is_zero());
        }
    }

    #[test]
    fn prop_reset_clears_everything_else(
        seed in any::<u64>(),
        sequence in prop::collection::vec(tick_inputs(), 1..600),
        reset_tick in tick_inputs(),
    ) {
        let mut ctrl = anchor(seed);
        for inputs in &sequence {
            ctrl.tick(inputs);
        }
        let destructed = ctrl.status().self_destruct_asserted;

        let status = ctrl.tick(&reset_tick.with_reset(true));
        prop_assert!(!status.tamper_detected);
        prop_assert!(!status.kill_switch_detected);
        prop_assert_eq!(status.entropy_rate_kbps, 0);
        prop_assert_eq!(status.self_destruct_asserted, destructed);
        prop_assert!(ctrl.response().response.is_zero());
        prop_assert!(!ctrl.entropy_pending());
        prop_assert_eq!(ctrl.state().harvester().bit_count(), 0);
    }

    #[test]
    fn prop_valid_is_a_single_tick_pulse(
        seed in any::<u64>(),
        sequence in prop::collection::vec(tick_inputs(), 1..600),
    ) {
        let mut ctrl = anchor(seed);
        let mut previous = false;
        for inputs in &sequence {
            ctrl.tick(inputs);
            let valid = ctrl.response().valid;
            prop_assert!(!(valid && previous));
            previous = valid;
        }
    }

    #[test]
    fn prop_replay_is_deterministic(
        seed in any::<u64>(),
        sequence in prop::collection::vec(tick_inputs(), 1..400),
    ) {
        let mut a = anchor(seed);
        let mut b = anchor(seed);
        for inputs in &sequence {
            prop_assert_eq!(a.tick(inputs), b.tick(inputs));
            prop_assert_eq!(a.response(), b.response());
            prop_assert_eq!(a.entropy(), b.entropy());
        }
        prop_assert_eq!(a.commitment(), b.commitment());
    }
}
