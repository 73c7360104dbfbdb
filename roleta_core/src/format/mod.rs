//! Per-format winner resolution: one closed set of strategies selected by
//! `(SelectionFormat, DropoutVariant)`. Engines are rebuilt fresh whenever
//! the format or the initial item list changes; round state never carries
//! across a rebuild.

mod battle_royal;
mod dropout;
mod normal;

pub use battle_royal::BattleRoyalFormat;
pub use dropout::{simulate_elimination_order, ClassicDropout, SimulatedDropout};
pub use normal::NormalFormat;

use std::time::Duration;

use roleta_shared::{DropoutVariant, SelectionFormat};

use crate::error::WheelError;
use crate::item::Item;

/// Delay before an eliminated wedge is removed, leaving room for the eaten
/// animation on the rendering side.
pub const DEFAULT_REMOVAL_DELAY: Duration = Duration::from_millis(750);

/// Outcome of one resolved round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    pub winner_id: String,
    /// Marks the terminal round of a multi-round format.
    pub is_final_spin: bool,
}

#[derive(Debug)]
pub enum FormatEngine {
    Normal(NormalFormat),
    DropoutClassic(ClassicDropout),
    DropoutSimulated(SimulatedDropout),
    BattleRoyal(BattleRoyalFormat),
}

impl FormatEngine {
    pub fn new(format: SelectionFormat, variant: DropoutVariant, items: Vec<Item>) -> Self {
        Self::with_removal_delay(format, variant, items, DEFAULT_REMOVAL_DELAY)
    }

    /// Same, with an explicit removal delay for headless simulations.
    pub fn with_removal_delay(
        format: SelectionFormat,
        variant: DropoutVariant,
        items: Vec<Item>,
        removal_delay: Duration,
    ) -> Self {
        match (format, variant) {
            (SelectionFormat::Normal, _) => Self::Normal(NormalFormat::new(items)),
            (SelectionFormat::Dropout, DropoutVariant::Classic) => {
                Self::DropoutClassic(ClassicDropout::new(items, removal_delay))
            }
            (SelectionFormat::Dropout, DropoutVariant::Simulated) => {
                Self::DropoutSimulated(SimulatedDropout::new(items))
            }
            (SelectionFormat::BattleRoyal, _) => Self::BattleRoyal(BattleRoyalFormat::new(items)),
        }
    }

    /// The wheel as this format wants it displayed right now.
    pub fn items(&self) -> Vec<Item> {
        match self {
            Self::Normal(f) => f.items(),
            Self::DropoutClassic(f) => f.items(),
            Self::DropoutSimulated(f) => f.items(),
            Self::BattleRoyal(f) => f.items(),
        }
    }

    /// Resolve the round's winner from one seed. Does not mutate the item
    /// set; all removal happens in `on_spin_end`.
    pub fn next_winner(&mut self, seed: f64) -> Result<RoundResult, WheelError> {
        match self {
            Self::Normal(f) => f.next_winner(seed),
            Self::DropoutClassic(f) => f.next_winner(seed),
            Self::DropoutSimulated(f) => f.next_winner(seed),
            Self::BattleRoyal(f) => f.next_winner(seed),
        }
    }

    /// Settle the round once the spin animation finished. Multi-round
    /// formats remove or advance items here, gated behind any visual delay.
    pub async fn on_spin_end(&mut self, winner_id: &str) {
        match self {
            Self::Normal(_) => {}
            Self::DropoutClassic(f) => f.on_spin_end(winner_id).await,
            Self::DropoutSimulated(f) => f.on_spin_end(winner_id),
            Self::BattleRoyal(f) => f.on_spin_end(winner_id),
        }
    }

    /// Format-owned spin distance, when the format predetermines the
    /// landing. `None` means the caller derives the distance from the seed.
    pub fn spin_distance(
        &self,
        winner_id: &str,
        seed: f64,
        duration: Duration,
        current_rotation: f64,
    ) -> Option<f64> {
        match self {
            Self::DropoutSimulated(f) => f.spin_distance(winner_id, seed, duration, current_rotation),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lots() -> Vec<Item> {
        vec![
            Item::new("1", "first", 300.0),
            Item::new("2", "second", 100.0),
            Item::new("3", "third", 50.0),
        ]
    }

    #[test]
    fn construction_is_idempotent() {
        let a = FormatEngine::new(SelectionFormat::Dropout, DropoutVariant::Classic, lots());
        let b = FormatEngine::new(SelectionFormat::Dropout, DropoutVariant::Classic, lots());
        assert_eq!(a.items(), b.items());
    }

    #[test]
    fn variant_selection_matches_configuration() {
        let engine = FormatEngine::new(SelectionFormat::Dropout, DropoutVariant::Simulated, lots());
        assert!(matches!(engine, FormatEngine::DropoutSimulated(_)));
        let engine = FormatEngine::new(SelectionFormat::Normal, DropoutVariant::Simulated, lots());
        assert!(matches!(engine, FormatEngine::Normal(_)));
        let engine = FormatEngine::new(SelectionFormat::BattleRoyal, DropoutVariant::Classic, lots());
        assert!(matches!(engine, FormatEngine::BattleRoyal(_)));
    }
}
