//! Angular layout of the wheel: weighted wedge intervals, pointer math and
//! the presentation-only split of dominating wedges.

use std::f64::consts::TAU;
use std::time::Duration;

use serde::Serialize;

use crate::item::Item;

/// The pointer sits a fixed 270 degrees from the wheel's zero mark.
pub const POINTER_OFFSET_DEG: f64 = 270.0;

/// An item plus its half-open angular interval `[start_angle, end_angle)`,
/// radians over `[0, 2π)`. Derived data; recompute whenever the item set
/// changes, never cache across mutations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemAngle {
    #[serde(flatten)]
    pub item: Item,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Partition the full circle into weighted wedges, preserving item order.
/// A single cumulative pass keeps the layout order-stable and the final end
/// angle at exactly 2π up to floating error. Inputs are not mutated.
pub fn define_angle(items: &[Item]) -> Vec<ItemAngle> {
    let total: f64 = items.iter().map(Item::weight).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut offset = 0.0;
    items
        .iter()
        .map(|item| {
            let start = offset;
            offset += TAU * item.weight() / total;
            ItemAngle {
                item: item.clone(),
                start_angle: start,
                end_angle: offset,
            }
        })
        .collect()
}

/// Displayed chance in percent, rounded to one decimal.
///
/// Uses raw amounts without the weight floor, so a zero-amount item shows
/// 0.0% while its wedge is still selectable. That discrepancy is the shipped
/// behavior; keep the two calculations apart.
pub fn chance_percent(amount: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    (amount / total * 1000.0).round() / 10.0
}

/// Display chances for a whole item set, raw-amount based.
pub fn chance_table(items: &[Item]) -> Vec<(String, f64)> {
    let total: f64 = items.iter().map(Item::display_amount).sum();
    items
        .iter()
        .map(|item| (item.name.clone(), chance_percent(item.display_amount(), total)))
        .collect()
}

/// Sector angle (radians, `[0, 2π)`) resting under the pointer for an
/// absolute wheel rotation in degrees. 360-degree periodic.
pub fn wheel_angle(rotate_deg: f64) -> f64 {
    (POINTER_OFFSET_DEG - rotate_deg).rem_euclid(360.0).to_radians()
}

/// The wedge containing `theta`. `theta` exactly at 2π maps to the last
/// wedge so the boundary never falls through.
pub fn find_sector(angles: &[ItemAngle], theta: f64) -> Option<&ItemAngle> {
    if angles.is_empty() {
        return None;
    }
    let theta = theta.rem_euclid(TAU);
    angles
        .iter()
        .find(|a| theta >= a.start_angle && theta < a.end_angle)
        .or_else(|| angles.last())
}

/// Rotation delta (degrees) that parks `target_rad` under the pointer:
/// whole turns scaled with the spin duration plus the landing offset from
/// the current rotation.
pub fn distance_to_angle(target_rad: f64, duration: Duration, current_rotation: f64) -> f64 {
    let target_deg = (POINTER_OFFSET_DEG - target_rad.to_degrees()).rem_euclid(360.0);
    let turns = duration.as_secs_f64().max(1.0).round();
    turns * 360.0 + (target_deg - current_rotation).rem_euclid(360.0)
}

/// A rendered wedge, possibly a fraction of one item's full share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub item_id: String,
    pub color: String,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Rendered layout honoring the optional split setting.
pub fn layout(items: &[Item], split: Option<f64>) -> Vec<Segment> {
    match split {
        Some(max_share) => split_segments(items, max_share),
        None => define_angle(items)
            .into_iter()
            .map(|a| Segment {
                item_id: a.item.id,
                color: a.item.color,
                start_angle: a.start_angle,
                end_angle: a.end_angle,
            })
            .collect(),
    }
}

/// Presentation-only split: wedges whose share exceeds `max_share` of the
/// circle are cut into equal sub-wedges and interleaved round-robin, so one
/// lot never renders as a single dominating block. Per-item total width is
/// preserved exactly; selection probability is untouched.
pub fn split_segments(items: &[Item], max_share: f64) -> Vec<Segment> {
    let total: f64 = items.iter().map(Item::weight).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let max_share = max_share.clamp(0.01, 1.0);

    // Per item: how many sub-wedges, each of what width.
    let mut plan: Vec<(usize, f64, usize)> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let share = item.weight() / total;
            let pieces = (share / max_share).ceil().max(1.0) as usize;
            (idx, TAU * share / pieces as f64, pieces)
        })
        .collect();

    let mut order = Vec::new();
    while plan.iter().any(|(_, _, left)| *left > 0) {
        for entry in plan.iter_mut() {
            if entry.2 > 0 {
                entry.2 -= 1;
                order.push((entry.0, entry.1));
            }
        }
    }

    let mut offset = 0.0;
    order
        .into_iter()
        .map(|(idx, width)| {
            let start = offset;
            offset += width;
            Segment {
                item_id: items[idx].id.clone(),
                color: items[idx].color.clone(),
                start_angle: start,
                end_angle: offset,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn items(amounts: &[f64]) -> Vec<Item> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| Item::new(format!("{}", i + 1), format!("lot {}", i + 1), a))
            .collect()
    }

    #[test]
    fn partition_is_exact_and_ordered() {
        let angles = define_angle(&items(&[120.0, 55.5, 300.0, 0.0, 12.0]));
        assert!((angles[0].start_angle - 0.0).abs() < EPS);
        for pair in angles.windows(2) {
            assert!((pair[0].end_angle - pair[1].start_angle).abs() < EPS);
        }
        assert!((angles.last().unwrap().end_angle - TAU).abs() < EPS);
        let widths: f64 = angles.iter().map(|a| a.end_angle - a.start_angle).sum();
        assert!((widths - TAU).abs() < EPS);
    }

    #[test]
    fn zero_amount_keeps_nonzero_wedge() {
        let angles = define_angle(&items(&[0.0, 500.0]));
        assert!(angles[0].end_angle - angles[0].start_angle > 0.0);
    }

    #[test]
    fn two_item_scenario() {
        let angles = define_angle(&items(&[300.0, 100.0]));
        assert!((angles[0].start_angle - 0.0).abs() < EPS);
        assert!((angles[0].end_angle - 1.5 * std::f64::consts::PI).abs() < EPS);
        assert!((angles[1].start_angle - 1.5 * std::f64::consts::PI).abs() < EPS);
        assert!((angles[1].end_angle - TAU).abs() < EPS);
    }

    #[test]
    fn wheel_angle_at_rest_points_up() {
        assert!((wheel_angle(0.0) - 1.5 * std::f64::consts::PI).abs() < EPS);
    }

    #[test]
    fn wheel_angle_is_periodic() {
        for rotate in [0.0, 17.3, 123.0, 359.9, 4000.5] {
            assert!((wheel_angle(rotate) - wheel_angle(rotate + 360.0)).abs() < EPS);
        }
    }

    #[test]
    fn sector_lookup_hits_boundaries() {
        let angles = define_angle(&items(&[1.0, 1.0]));
        assert_eq!(find_sector(&angles, 0.0).unwrap().item.id, "1");
        assert_eq!(find_sector(&angles, std::f64::consts::PI).unwrap().item.id, "2");
        assert_eq!(find_sector(&angles, TAU).unwrap().item.id, "1");
    }

    #[test]
    fn chance_display_ignores_weight_floor() {
        let set = items(&[0.0, 100.0]);
        let table = chance_table(&set);
        // Displayed 0%, yet the wedge above proves the item is selectable.
        assert_eq!(table[0].1, 0.0);
        assert_eq!(table[1].1, 100.0);
    }

    #[test]
    fn distance_lands_target_under_pointer() {
        let duration = Duration::from_secs(20);
        for (target, current) in [(0.3, 0.0), (4.1, 721.0), (6.2, 90.0)] {
            let distance = distance_to_angle(target, duration, current);
            assert!(distance >= 360.0);
            let landed = wheel_angle(current + distance);
            assert!((landed - target).abs() < 1e-6);
        }
    }

    #[test]
    fn split_preserves_per_item_width() {
        let set = items(&[700.0, 100.0, 100.0, 100.0]);
        let plain = define_angle(&set);
        let segs = split_segments(&set, 0.2);
        assert!(segs.len() > set.len());
        let total: f64 = segs.iter().map(|s| s.end_angle - s.start_angle).sum();
        assert!((total - TAU).abs() < EPS);
        for a in &plain {
            let width: f64 = segs
                .iter()
                .filter(|s| s.item_id == a.item.id)
                .map(|s| s.end_angle - s.start_angle)
                .sum();
            assert!((width - (a.end_angle - a.start_angle)).abs() < 1e-9);
        }
    }
}
