use serde::{Deserialize, Serialize};

/// Priority, durability and quality of a schedulable item, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBudget")]
pub struct BudgetValue {
    priority: f32,    // Selection weight
    durability: f32,  // Decay resistance
    quality: f32,     // Long-term worth
}

impl BudgetValue {
    /// Creates a budget, clamping every component into [0, 1]
    pub fn new(priority: f32, durability: f32, quality: f32) -> Self {
        Self {
            priority: clamp_unit(priority),
            durability: clamp_unit(durability),
            quality: clamp_unit(quality),
        }
    }

    // Getters
    pub fn priority(&self) -> f32 { self.priority }
    pub fn durability(&self) -> f32 { self.durability }
    pub fn quality(&self) -> f32 { self.quality }

    /// Geometric mean of the three components
    pub fn summary(&self) -> f32 {
        (self.priority * self.durability * self.quality).cbrt()
    }

    /// Whether the summary reaches the given threshold
    pub fn above_threshold(&self, threshold: f32) -> bool {
        self.summary() >= threshold
    }

    /// Merges another budget into this one, keeping the larger of each component
    pub fn merge(&mut self, other: &BudgetValue) {
        self.priority = self.priority.max(other.priority);
        self.durability = self.durability.max(other.durability);
        self.quality = self.quality.max(other.quality);
    }
}

impl Default for BudgetValue {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.5)
    }
}

/// Wire shape of a budget before its components are clamped
#[derive(Deserialize)]
struct RawBudget {
    priority: f32,
    durability: f32,
    quality: f32,
}

impl From<RawBudget> for BudgetValue {
    fn from(raw: RawBudget) -> Self {
        Self::new(raw.priority, raw.durability, raw.quality)
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_creation_clamps() {
        let budget = BudgetValue::new(1.5, -0.2, 0.4);
        assert_eq!(budget.priority(), 1.0);
        assert_eq!(budget.durability(), 0.0);
        assert_eq!(budget.quality(), 0.4);
    }

    #[test]
    fn test_deserialized_budget_is_clamped() {
        let budget: BudgetValue =
            serde_json::from_str(r#"{"priority":5.0,"durability":-3.0,"quality":0.5}"#).unwrap();
        assert_eq!(budget, BudgetValue::new(1.0, 0.0, 0.5));

        let json = serde_json::to_string(&budget).unwrap();
        assert_eq!(serde_json::from_str::<BudgetValue>(&json).unwrap(), budget);
    }

    #[test]
    fn test_nan_component_becomes_zero() {
        let budget = BudgetValue::new(f32::NAN, 0.5, 0.5);
        assert_eq!(budget.priority(), 0.0);
    }

    #[test]
    fn test_summary_and_threshold() {
        let budget = BudgetValue::new(0.8, 0.8, 0.8);
        assert!((budget.summary() - 0.8).abs() < 1e-5);
        assert!(budget.above_threshold(0.5));
        assert!(!budget.above_threshold(0.9));
    }

    #[test]
    fn test_merge_keeps_maximum() {
        let mut budget = BudgetValue::new(0.2, 0.9, 0.1);
        budget.merge(&BudgetValue::new(0.6, 0.3, 0.1));
        assert_eq!(budget, BudgetValue::new(0.6, 0.9, 0.1));
    }
}
