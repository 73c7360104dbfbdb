use std::f64::consts::TAU;

use crate::angle::{define_angle, find_sector};
use crate::error::WheelError;
use crate::format::RoundResult;
use crate::item::Item;

/// Single-shot format: one weighted draw over the full item set.
#[derive(Debug)]
pub struct NormalFormat {
    items: Vec<Item>,
}

impl NormalFormat {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> Vec<Item> {
        self.items.clone()
    }

    pub fn next_winner(&mut self, seed: f64) -> Result<RoundResult, WheelError> {
        let angles = define_angle(&self.items);
        let sector = find_sector(&angles, seed * TAU).ok_or(WheelError::EmptyItemSet)?;
        Ok(RoundResult {
            winner_id: sector.item.id.clone(),
            is_final_spin: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_picks_the_covering_sector() {
        // 300/100: item 1 owns [0, 0.75), item 2 owns [0.75, 1).
        let mut format = NormalFormat::new(vec![
            Item::new("1", "big", 300.0),
            Item::new("2", "small", 100.0),
        ]);
        assert_eq!(format.next_winner(0.0).unwrap().winner_id, "1");
        assert_eq!(format.next_winner(0.74).unwrap().winner_id, "1");
        assert_eq!(format.next_winner(0.76).unwrap().winner_id, "2");
    }

    #[test]
    fn every_round_is_final() {
        let mut format = NormalFormat::new(vec![Item::new("1", "only", 10.0)]);
        assert!(format.next_winner(0.5).unwrap().is_final_spin);
    }

    #[test]
    fn empty_set_is_guarded() {
        let mut format = NormalFormat::new(Vec::new());
        assert!(matches!(
            format.next_winner(0.5),
            Err(WheelError::EmptyItemSet)
        ));
    }
}
