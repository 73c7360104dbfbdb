//! Browser bindings for the synchronous engine surface. Items come and go
//! as JSON; the host page owns rendering and animation playback.

use wasm_bindgen::prelude::*;

use roleta_core::Item;

fn parse_items(items_json: &str) -> Result<Vec<Item>, JsError> {
    serde_json::from_str(items_json).map_err(|e| JsError::new(&e.to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&e.to_string()))
}

/// Weighted wedge intervals for an item list, preserving input order.
#[wasm_bindgen]
pub fn define_angle(items_json: &str) -> Result<String, JsError> {
    let items = parse_items(items_json)?;
    to_json(&roleta_core::define_angle(&items))
}

/// Rendered wedge layout; `split` caps one wedge's share of the circle.
#[wasm_bindgen]
pub fn layout(items_json: &str, split: Option<f64>) -> Result<String, JsError> {
    let items = parse_items(items_json)?;
    to_json(&roleta_core::layout(&items, split))
}

/// Display chances in percent, raw-amount based.
#[wasm_bindgen]
pub fn chance_table(items_json: &str) -> Result<String, JsError> {
    let items = parse_items(items_json)?;
    to_json(&roleta_core::chance_table(&items))
}

/// Sector angle under the pointer for an absolute rotation in degrees.
#[wasm_bindgen]
pub fn wheel_angle(rotate_deg: f64) -> f64 {
    roleta_core::wheel_angle(rotate_deg)
}

/// Rotation delta that parks `target_rad` under the pointer.
#[wasm_bindgen]
pub fn spin_distance(target_rad: f64, duration_secs: f64, current_rotation: f64) -> f64 {
    roleta_core::distance_to_angle(
        target_rad,
        std::time::Duration::from_secs_f64(duration_secs.max(0.0)),
        current_rotation,
    )
}

/// Full elimination order for a simulated dropout, fixed by one seed.
#[wasm_bindgen]
pub fn simulate_elimination_order(items_json: &str, seed: f64) -> Result<String, JsError> {
    let items = parse_items(items_json)?;
    to_json(&roleta_core::simulate_elimination_order(&items, seed))
}

#[cfg(test)]
mod tests {
    #[test]
    fn json_round_trip_through_bindings() {
        let items = r##"[
            {"id":"1","name":"a","amount":300.0,"color":"#fff"},
            {"id":"2","name":"b","amount":100.0,"color":"#000"}
        ]"##;
        let angles = super::define_angle(items).ok().unwrap();
        assert!(angles.contains("start_angle"));
        let order = super::simulate_elimination_order(items, 0.5).ok().unwrap();
        let parsed: Vec<String> = serde_json::from_str(&order).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
