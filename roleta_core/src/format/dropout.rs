//! Elimination formats: one item leaves the wheel per spin until a single
//! survivor remains.

use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::time::Duration;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::angle::{define_angle, distance_to_angle, find_sector};
use crate::error::WheelError;
use crate::format::RoundResult;
use crate::item::Item;

/// Inverted wedge share for the classic dropout wheel: richer lots get the
/// smaller wedge, so small contributors are the likelier removals. The
/// transformed sizes sum back to the original total.
fn reverse_size(size: f64, total: f64, len: usize) -> f64 {
    if len <= 1 {
        return size;
    }
    (total - size) / (len - 1) as f64
}

/// Classic ("runtime") dropout: every spin runs on a live inverted wheel,
/// the landed item is eaten, intervals are recomputed over the remainder.
#[derive(Debug)]
pub struct ClassicDropout {
    remaining: Vec<Item>,
    removal_delay: Duration,
}

impl ClassicDropout {
    pub fn new(items: Vec<Item>, removal_delay: Duration) -> Self {
        Self {
            remaining: items,
            removal_delay,
        }
    }

    /// The inverted view the wheel displays: working `amount` is the reverse
    /// size, `original_amount` keeps the raw bid for chance display.
    pub fn items(&self) -> Vec<Item> {
        let len = self.remaining.len();
        let total: f64 = self.remaining.iter().map(Item::weight).sum();
        self.remaining
            .iter()
            .map(|item| Item {
                amount: reverse_size(item.weight(), total, len),
                original_amount: Some(item.display_amount()),
                ..item.clone()
            })
            .collect()
    }

    pub fn next_winner(&mut self, seed: f64) -> Result<RoundResult, WheelError> {
        if self.remaining.len() <= 1 {
            return Err(WheelError::EmptyItemSet);
        }
        let angles = define_angle(&self.items());
        let sector = find_sector(&angles, seed * TAU).ok_or(WheelError::EmptyItemSet)?;
        Ok(RoundResult {
            winner_id: sector.item.id.clone(),
            is_final_spin: self.remaining.len() == 2,
        })
    }

    /// Removal is gated behind the eaten-animation delay; nothing mutates
    /// until the wait settles, so an abandoned round leaves the set intact.
    pub async fn on_spin_end(&mut self, winner_id: &str) {
        if !self.removal_delay.is_zero() {
            tokio::time::sleep(self.removal_delay).await;
        }
        self.remaining.retain(|item| item.id != winner_id);
        debug!(eliminated = winner_id, left = self.remaining.len(), "dropout round settled");
    }
}

/// Draw the full elimination order for a simulated dropout from one seed.
/// A ranking is sampled without replacement proportional to raw weight; the
/// first pick survives longest, so the elimination order is the ranking
/// reversed with the champion left out.
pub fn simulate_elimination_order(items: &[Item], seed: f64) -> Vec<String> {
    if items.len() < 2 {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(seed.to_bits());
    let mut pool: Vec<&Item> = items.iter().collect();
    let mut ranking = Vec::with_capacity(pool.len());
    while !pool.is_empty() {
        let weights: Vec<f64> = pool.iter().map(|item| item.weight()).collect();
        let dist = WeightedIndex::new(&weights).expect("floored weights are positive");
        let picked = pool.remove(dist.sample(&mut rng));
        ranking.push(picked.id.clone());
    }
    ranking.reverse();
    ranking.pop();
    ranking
}

/// Simulated ("new") dropout: the whole elimination sequence is fixed by the
/// first seed; each spin then plays out one predetermined removal, with the
/// spin distance overridden to land on it.
#[derive(Debug)]
pub struct SimulatedDropout {
    remaining: Vec<Item>,
    order: Option<VecDeque<String>>,
}

impl SimulatedDropout {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            remaining: items,
            order: None,
        }
    }

    pub fn items(&self) -> Vec<Item> {
        self.remaining.clone()
    }

    pub fn next_winner(&mut self, seed: f64) -> Result<RoundResult, WheelError> {
        if self.remaining.len() <= 1 {
            return Err(WheelError::EmptyItemSet);
        }
        let order = self
            .order
            .get_or_insert_with(|| simulate_elimination_order(&self.remaining, seed).into());
        let next = order.front().ok_or(WheelError::EmptyItemSet)?;
        Ok(RoundResult {
            winner_id: next.clone(),
            is_final_spin: self.remaining.len() == 2,
        })
    }

    pub fn on_spin_end(&mut self, winner_id: &str) {
        if let Some(order) = &mut self.order {
            if order.front().map(String::as_str) == Some(winner_id) {
                order.pop_front();
            }
        }
        self.remaining.retain(|item| item.id != winner_id);
    }

    /// Land on the predetermined item's sector midpoint; the seed only
    /// varies the number of full turns.
    pub fn spin_distance(
        &self,
        winner_id: &str,
        seed: f64,
        duration: Duration,
        current_rotation: f64,
    ) -> Option<f64> {
        let angles = define_angle(&self.remaining);
        let sector = angles.iter().find(|a| a.item.id == winner_id)?;
        let midpoint = 0.5 * (sector.start_angle + sector.end_angle);
        let extra_turns = (seed.rem_euclid(1.0) * 2.0).floor() * 360.0;
        Some(distance_to_angle(midpoint, duration, current_rotation) + extra_turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lots() -> Vec<Item> {
        vec![
            Item::new("1", "a", 400.0),
            Item::new("2", "b", 200.0),
            Item::new("3", "c", 100.0),
            Item::new("4", "d", 50.0),
        ]
    }

    #[test]
    fn reverse_sizes_preserve_the_total() {
        let dropout = ClassicDropout::new(lots(), Duration::ZERO);
        let raw_total: f64 = lots().iter().map(Item::weight).sum();
        let inverted_total: f64 = dropout.items().iter().map(|i| i.amount).sum();
        assert!((raw_total - inverted_total).abs() < 1e-9);
    }

    #[test]
    fn reverse_sizes_invert_the_ordering() {
        let dropout = ClassicDropout::new(lots(), Duration::ZERO);
        let view = dropout.items();
        // Largest bid gets the smallest wedge.
        assert!(view[0].amount < view[3].amount);
        assert_eq!(view[0].original_amount, Some(400.0));
    }

    #[tokio::test]
    async fn classic_runs_down_to_one_survivor() {
        let mut dropout = ClassicDropout::new(lots(), Duration::ZERO);
        let mut eliminated = Vec::new();
        for round in 0..3 {
            let result = dropout.next_winner(0.37).unwrap();
            assert_eq!(result.is_final_spin, round == 2);
            assert!(!eliminated.contains(&result.winner_id));
            dropout.on_spin_end(&result.winner_id).await;
            eliminated.push(result.winner_id);
        }
        assert_eq!(dropout.remaining.len(), 1);
        assert!(matches!(
            dropout.next_winner(0.5),
            Err(WheelError::EmptyItemSet)
        ));
    }

    #[test]
    fn simulated_order_is_a_permutation_minus_champion() {
        let items = lots();
        let order = simulate_elimination_order(&items, 0.123456);
        assert_eq!(order.len(), items.len() - 1);
        let mut unique = order.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), order.len());
    }

    #[test]
    fn simulated_order_is_fixed_by_the_seed() {
        let items = lots();
        assert_eq!(
            simulate_elimination_order(&items, 0.777),
            simulate_elimination_order(&items, 0.777)
        );
    }

    #[test]
    fn simulated_rounds_follow_the_precomputed_order() {
        let mut dropout = SimulatedDropout::new(lots());
        let expected = simulate_elimination_order(&lots(), 0.25);
        let mut seen = Vec::new();
        for round in 0..3 {
            // Later seeds must not reshuffle the precomputed order.
            let seed = if round == 0 { 0.25 } else { 0.9 };
            let result = dropout.next_winner(seed).unwrap();
            assert_eq!(result.is_final_spin, round == 2);
            dropout.on_spin_end(&result.winner_id);
            seen.push(result.winner_id);
        }
        assert_eq!(seen, expected);
        assert_eq!(dropout.remaining.len(), 1);
    }

    #[test]
    fn simulated_distance_lands_on_the_predetermined_item() {
        let mut dropout = SimulatedDropout::new(lots());
        let result = dropout.next_winner(0.42).unwrap();
        let distance = dropout
            .spin_distance(&result.winner_id, 0.42, Duration::from_secs(10), 0.0)
            .unwrap();
        let landed = crate::angle::wheel_angle(distance);
        let angles = define_angle(&dropout.items());
        let sector = find_sector(&angles, landed).unwrap();
        assert_eq!(sector.item.id, result.winner_id);
    }
}
