use std::time::Duration;

use roleta_core::{
    chance_table, DropoutVariant, Item, LocalRng, PacerMode, SeedSource, SelectionFormat,
    SpinPacer, WheelController, WheelSettings,
};

// End-to-end dropout run on a headless pacer.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let items = vec![
        Item::new("1", "alpha", 300.0).with_color("#e74c3c"),
        Item::new("2", "beta", 150.0).with_color("#3498db"),
        Item::new("3", "gamma", 75.0).with_color("#2ecc71"),
        Item::new("4", "delta", 25.0).with_color("#f1c40f"),
    ];

    for (name, chance) in chance_table(&items) {
        println!("{name:>8} {chance:>5.1}%");
    }

    let mut controller = WheelController::new(
        items,
        WheelSettings {
            format: SelectionFormat::Dropout,
            dropout_variant: DropoutVariant::Classic,
            spin_time_secs: 1,
            ..WheelSettings::default()
        },
        SpinPacer::new(PacerMode::Immediate),
        SeedSource::Local(LocalRng::from_entropy()),
    );
    controller.set_removal_delay(Duration::ZERO);

    let rounds = controller.run_to_completion().await.expect("items present");
    for (i, round) in rounds.iter().enumerate() {
        println!("round {}: eliminated {}", i + 1, round.winner_id);
    }
    let survivor = &controller.items()[0];
    println!("survivor: {} ({})", survivor.name, survivor.id);
}
