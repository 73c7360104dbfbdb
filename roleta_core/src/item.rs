use serde::{Deserialize, Serialize};

/// A lot on the wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    /// Working weight for the angle math. May be algorithm-transformed
    /// (dropout inversion); see `original_amount`.
    pub amount: f64,
    pub color: String,
    /// Raw bid when `amount` carries a transformed working weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_amount: Option<f64>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, amount: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            color: "#cccccc".into(),
            original_amount: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Raw bid for display purposes.
    pub fn display_amount(&self) -> f64 {
        self.original_amount.unwrap_or(self.amount)
    }

    /// Weight used for wedge sizing. Zero, negative and NaN amounts keep a
    /// floor of 1 so every item stays selectable.
    pub fn weight(&self) -> f64 {
        self.amount.max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_floor_covers_bad_amounts() {
        assert_eq!(Item::new("1", "a", 0.0).weight(), 1.0);
        assert_eq!(Item::new("1", "a", -3.0).weight(), 1.0);
        assert_eq!(Item::new("1", "a", f64::NAN).weight(), 1.0);
        assert_eq!(Item::new("1", "a", 0.4).weight(), 1.0);
        assert_eq!(Item::new("1", "a", 250.0).weight(), 250.0);
    }

    #[test]
    fn display_amount_prefers_original() {
        let mut item = Item::new("1", "a", 10.0);
        assert_eq!(item.display_amount(), 10.0);
        item.original_amount = Some(40.0);
        assert_eq!(item.display_amount(), 40.0);
    }
}
