use std::collections::VecDeque;
use std::f64::consts::TAU;

use tracing::debug;

use crate::angle::{define_angle, find_sector};
use crate::error::WheelError;
use crate::format::RoundResult;
use crate::item::Item;

/// Bracket format: sequential pairing into head-to-head duels, each duel a
/// two-item weighted draw over raw amounts. Winners advance, an odd item
/// gets a bye, until a single champion remains.
#[derive(Debug)]
pub struct BattleRoyalFormat {
    /// Current round's waiting queue; the front two fight next.
    queue: VecDeque<Item>,
    /// Winners advancing to the next round.
    advanced: Vec<Item>,
}

impl BattleRoyalFormat {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            queue: items.into(),
            advanced: Vec::new(),
        }
    }

    fn alive(&self) -> usize {
        self.queue.len() + self.advanced.len()
    }

    /// The wheel shows the current duel pair; after the bracket resolves it
    /// shows the champion alone.
    pub fn items(&self) -> Vec<Item> {
        match (self.queue.front(), self.queue.get(1)) {
            (Some(a), Some(b)) => vec![a.clone(), b.clone()],
            (Some(a), None) => vec![a.clone()],
            (None, _) => self.advanced.clone(),
        }
    }

    pub fn next_winner(&mut self, seed: f64) -> Result<RoundResult, WheelError> {
        if self.alive() <= 1 {
            return Err(WheelError::EmptyItemSet);
        }
        let (a, b) = match (self.queue.front(), self.queue.get(1)) {
            (Some(a), Some(b)) => (a.clone(), b.clone()),
            _ => return Err(WheelError::EmptyItemSet),
        };
        let angles = define_angle(&[a, b]);
        let sector = find_sector(&angles, seed * TAU).ok_or(WheelError::EmptyItemSet)?;
        Ok(RoundResult {
            winner_id: sector.item.id.clone(),
            is_final_spin: self.alive() == 2,
        })
    }

    /// Settle the duel: the winner advances, the loser is dropped. When
    /// fewer than two are left to fight, byes and winners seed the next
    /// bracket round.
    pub fn on_spin_end(&mut self, winner_id: &str) {
        let mut fighters = 0;
        while fighters < 2 {
            let Some(item) = self.queue.pop_front() else {
                break;
            };
            if item.id == winner_id {
                self.advanced.push(item);
            } else {
                debug!(eliminated = %item.id, "duel lost");
            }
            fighters += 1;
        }
        if self.queue.len() < 2 {
            self.advanced.extend(self.queue.drain(..));
            self.queue = std::mem::take(&mut self.advanced).into();
        }
    }
}
