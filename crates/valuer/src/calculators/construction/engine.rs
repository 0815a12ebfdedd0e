use serde::{Deserialize, Serialize};

use super::domain::YearBandBoundaries;
use super::resolver::ResolvedItem;

pub const DEFAULT_VERANDA_WEIGHT: f64 = 0.5;

/// Relative weight veranda floor area carries against main floor area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaWeights {
    pub veranda_weight: f64,
}

impl Default for AreaWeights {
    fn default() -> Self {
        Self {
            veranda_weight: DEFAULT_VERANDA_WEIGHT,
        }
    }
}

/// Tuning for one calculator deployment: year-band boundaries plus area
/// weighting. Constructed at the composition root and passed in; the engine
/// itself reads no configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculatorConfig {
    pub boundaries: YearBandBoundaries,
    pub weights: AreaWeights,
}

/// Aggregate resolved item rates into a cost-per-square-metre figure.
///
/// The summed rate is scaled by `(floor + w * veranda) / (floor + veranda)`,
/// so veranda area dilutes the rate at its configured weight. With both areas
/// zero the summed rate passes through unscaled; there is no division by zero
/// path. The result is clamped to be non-negative.
pub fn cost_per_square_metre(
    resolved: &[ResolvedItem],
    floor_area: f64,
    veranda_floor_area: f64,
    weights: &AreaWeights,
) -> f64 {
    let summed: f64 = resolved.iter().map(|item| item.rate).sum();

    let total_area = floor_area + veranda_floor_area;
    let scaled = if total_area > 0.0 {
        let weighted_area = floor_area + weights.veranda_weight * veranda_floor_area;
        summed * weighted_area / total_area
    } else {
        summed
    };

    scaled.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::construction::resolver::RateOrigin;

    fn resolved(rate: f64) -> ResolvedItem {
        ResolvedItem {
            element: "Foundation".to_string(),
            quality_of_finish: "standard".to_string(),
            rate,
            origin: RateOrigin::Override,
        }
    }

    #[test]
    fn zero_veranda_area_passes_the_sum_through() {
        let rate = cost_per_square_metre(&[resolved(200.0)], 100.0, 0.0, &AreaWeights::default());
        assert_eq!(rate, 200.0);
    }

    #[test]
    fn veranda_area_dilutes_at_the_configured_weight() {
        // 100m2 floor + 100m2 veranda at half weight: 200 * 150 / 200.
        let rate = cost_per_square_metre(&[resolved(200.0)], 100.0, 100.0, &AreaWeights::default());
        assert_eq!(rate, 150.0);
    }

    #[test]
    fn zero_areas_fall_back_to_the_summed_rate() {
        let rate = cost_per_square_metre(
            &[resolved(120.0), resolved(80.0)],
            0.0,
            0.0,
            &AreaWeights::default(),
        );
        assert_eq!(rate, 200.0);
    }

    #[test]
    fn item_order_does_not_change_the_result() {
        let forward = [resolved(25.0), resolved(100.0), resolved(75.0)];
        let backward = [resolved(75.0), resolved(100.0), resolved(25.0)];

        let weights = AreaWeights::default();
        assert_eq!(
            cost_per_square_metre(&forward, 240.0, 60.0, &weights),
            cost_per_square_metre(&backward, 240.0, 60.0, &weights),
        );
    }

    #[test]
    fn negative_aggregate_is_clamped_to_zero() {
        let rate = cost_per_square_metre(&[resolved(-50.0)], 100.0, 0.0, &AreaWeights::default());
        assert_eq!(rate, 0.0);
    }
}
