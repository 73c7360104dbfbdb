use std::f64::consts::TAU;
use std::time::Duration;

use roleta_core::{
    define_angle, DropoutVariant, FairRng, Item, LocalRng, PacerMode, SeedSource, SelectionFormat,
    SpinPacer, WheelController, WheelSettings,
};

fn lots() -> Vec<Item> {
    vec![
        Item::new("1", "alpha", 500.0).with_color("#e74c3c"),
        Item::new("2", "beta", 250.0).with_color("#3498db"),
        Item::new("3", "gamma", 125.0).with_color("#2ecc71"),
        Item::new("4", "delta", 0.0).with_color("#f1c40f"),
    ]
}

#[test]
fn angles_partition_the_circle() {
    let angles = define_angle(&lots());
    assert_eq!(angles.len(), 4);
    let width: f64 = angles.iter().map(|a| a.end_angle - a.start_angle).sum();
    assert!((width - TAU).abs() < 1e-9);
    // Zero-amount lot still owns a wedge.
    assert!(angles[3].end_angle - angles[3].start_angle > 0.0);
}

#[tokio::test]
async fn classic_dropout_settles_on_one_survivor() {
    let mut controller = WheelController::new(
        lots(),
        WheelSettings {
            format: SelectionFormat::Dropout,
            dropout_variant: DropoutVariant::Classic,
            spin_time_secs: 1,
            ..WheelSettings::default()
        },
        SpinPacer::new(PacerMode::Immediate),
        SeedSource::Local(LocalRng::seeded(99)),
    );
    controller.set_removal_delay(Duration::ZERO);
    let rounds = controller.run_to_completion().await.unwrap();
    assert_eq!(rounds.len(), 3);
    let mut eliminated: Vec<_> = rounds.iter().map(|r| r.winner_id.clone()).collect();
    eliminated.sort();
    eliminated.dedup();
    assert_eq!(eliminated.len(), 3);
    assert_eq!(controller.items().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn removal_delay_gates_elimination_but_rounds_still_finish() {
    let mut controller = WheelController::new(
        lots(),
        WheelSettings {
            format: SelectionFormat::Dropout,
            dropout_variant: DropoutVariant::Classic,
            spin_time_secs: 1,
            ..WheelSettings::default()
        },
        SpinPacer::new(PacerMode::Realtime { fps: 30 }),
        SeedSource::Local(LocalRng::seeded(4)),
    );
    let rounds = controller.run_to_completion().await.unwrap();
    assert_eq!(rounds.len(), 3);
}

#[tokio::test]
async fn simulated_dropout_matches_classic_round_count() {
    let mut controller = WheelController::new(
        lots(),
        WheelSettings {
            format: SelectionFormat::Dropout,
            dropout_variant: DropoutVariant::Simulated,
            spin_time_secs: 1,
            ..WheelSettings::default()
        },
        SpinPacer::new(PacerMode::Immediate),
        SeedSource::Local(LocalRng::seeded(7)),
    );
    let rounds = controller.run_to_completion().await.unwrap();
    assert_eq!(rounds.len(), 3);
    assert!(rounds.last().unwrap().is_final_spin);
}

#[tokio::test]
async fn battle_royal_crowns_a_champion() {
    let mut controller = WheelController::new(
        lots(),
        WheelSettings {
            format: SelectionFormat::BattleRoyal,
            spin_time_secs: 1,
            ..WheelSettings::default()
        },
        SpinPacer::new(PacerMode::Immediate),
        SeedSource::Local(LocalRng::seeded(21)),
    );
    let rounds = controller.run_to_completion().await.unwrap();
    assert_eq!(rounds.len(), 3);
    assert_eq!(controller.items().len(), 1);
    assert_eq!(
        rounds.last().unwrap().winner_id,
        controller.items()[0].id
    );
}

#[test]
fn winner_distribution_smoke() {
    // Verifiable stream, one draw per nonce, tallied against the 500/250/125
    // wedge shares. Bounds are loose; this guards gross skew only.
    let items = vec![
        Item::new("1", "alpha", 500.0),
        Item::new("2", "beta", 250.0),
        Item::new("3", "gamma", 125.0),
    ];
    let angles = define_angle(&items);
    let mut wins = [0u32; 3];
    for nonce in 0..2000u64 {
        let rng = FairRng::new("server", "client", nonce);
        let seed = rng.current_seed();
        let sector = roleta_core::find_sector(&angles, seed * TAU).unwrap();
        let idx = sector.item.id.parse::<usize>().unwrap() - 1;
        wins[idx] += 1;
    }
    let share = |w: u32| w as f64 / 2000.0;
    assert!((share(wins[0]) - 500.0 / 875.0).abs() < 0.05);
    assert!((share(wins[1]) - 250.0 / 875.0).abs() < 0.05);
    assert!((share(wins[2]) - 125.0 / 875.0).abs() < 0.05);
}
