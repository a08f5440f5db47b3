//! Per-dimension deltas between the positive and the negative opinion.

use serde::{Deserialize, Serialize};

use super::dimension::Dimension;

/// The directional difference between two profiles on one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDelta {
    pub dimension: Dimension,
    /// Dimension-scoped baseline both opinions deviate from.
    pub null_hypothesis: String,
    /// The positive opinion verbatim.
    pub positive_input: String,
    /// The negative opinion verbatim.
    pub negative_input: String,
    pub positive_description: String,
    pub negative_description: String,
    /// Narrative of how the positive side differs from the negative side.
    pub delta_analysis: String,
}

/// Exactly one [`DimensionDelta`] per dimension.
///
/// Serializes as an object keyed `ethos`, `logos`, `energeia`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deltas {
    pub ethos: DimensionDelta,
    pub logos: DimensionDelta,
    pub energeia: DimensionDelta,
}

impl Deltas {
    pub fn get(&self, dimension: Dimension) -> &DimensionDelta {
        match dimension {
            Dimension::Ethos => &self.ethos,
            Dimension::Logos => &self.logos,
            Dimension::Energeia => &self.energeia,
        }
    }

    /// Deltas in canonical dimension order.
    pub fn iter(&self) -> impl Iterator<Item = &DimensionDelta> {
        [&self.ethos, &self.logos, &self.energeia].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(dimension: Dimension) -> DimensionDelta {
        DimensionDelta {
            dimension,
            null_hypothesis: format!("{} baseline", dimension),
            positive_input: "Ban all plastic immediately".to_string(),
            negative_input: "Phase out plastic over 20 years".to_string(),
            positive_description: "urgent".to_string(),
            negative_description: "measured".to_string(),
            delta_analysis: format!("{} delta", dimension),
        }
    }

    fn deltas() -> Deltas {
        Deltas {
            ethos: delta(Dimension::Ethos),
            logos: delta(Dimension::Logos),
            energeia: delta(Dimension::Energeia),
        }
    }

    #[test]
    fn test_get_and_iter_follow_dimension() {
        let deltas = deltas();
        for dimension in Dimension::ALL {
            assert_eq!(deltas.get(dimension).dimension, dimension);
        }
        let order: Vec<_> = deltas.iter().map(|d| d.dimension).collect();
        assert_eq!(order, Dimension::ALL.to_vec());
    }

    #[test]
    fn test_serializes_with_exactly_three_keys() {
        let value = serde_json::to_value(deltas()).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["energeia", "ethos", "logos"]);
        assert_eq!(value["logos"]["delta_analysis"], "logos delta");
        assert_eq!(value["ethos"]["dimension"], "ethos");
    }
}
