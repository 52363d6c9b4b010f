// src/domain.rs

use crate::error::DomainError;
use crate::scoring::LogTable;
use std::ops::Range;

/// How far a step may be from dividing 1 before we reject it.
const STEP_TOLERANCE: f64 = 1e-9;

/// The finite, ascending grid of forecasts a player may submit.
///
/// Always non-empty, strictly ascending, starting at 0 and ending at 1.
/// The logarithms needed by the log rule are computed once here and shared
/// by every evaluation in a round.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDomain {
    values: Vec<f64>,
    step: f64,
    logs: LogTable,
}

impl ForecastDomain {
    /// Uniform grid `0, step, 2·step, .., 1`. The step must divide 1.
    ///
    /// Point `i` is computed as `i / count` so the grid holds exactly the
    /// doubles the decimal literals would (`0.07`, not `7 × 0.01`).
    pub fn with_step(step: f64) -> Result<Self, DomainError> {
        if !step.is_finite() || step <= 0.0 || step > 1.0 {
            return Err(DomainError::InvalidStep { step });
        }
        let count = (1.0 / step).round();
        if (count * step - 1.0).abs() > STEP_TOLERANCE {
            return Err(DomainError::InvalidStep { step });
        }
        let count = count as usize;
        let values: Vec<f64> = (0..=count).map(|i| i as f64 / count as f64).collect();
        Ok(Self::build(values, step))
    }

    /// A grid from explicit points, checked for the same invariants.
    pub fn from_values(values: Vec<f64>) -> Result<Self, DomainError> {
        let (first, last) = match (values.first(), values.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(DomainError::Empty),
        };
        if let Some(position) = values.windows(2).position(|w| !(w[0] < w[1])) {
            return Err(DomainError::Unsorted { position: position + 1 });
        }
        if first != 0.0 || last != 1.0 {
            return Err(DomainError::MissingBounds { first, last });
        }
        let step = if values.len() > 1 {
            1.0 / (values.len() - 1) as f64
        } else {
            1.0
        };
        Ok(Self::build(values, step))
    }

    fn build(values: Vec<f64>, step: f64) -> Self {
        let logs = LogTable::new(&values);
        Self { values, step, logs }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    pub fn logs(&self) -> &LogTable {
        &self.logs
    }

    /// Index of the grid point closest to `value` (ties go to the higher point).
    pub fn nearest_index(&self, value: f64) -> usize {
        // partition_point gives the first point >= value.
        let upper = self.values.partition_point(|&v| v < value);
        if upper == 0 {
            return 0;
        }
        if upper == self.values.len() {
            return self.values.len() - 1;
        }
        let below = value - self.values[upper - 1];
        let above = self.values[upper] - value;
        if below < above { upper - 1 } else { upper }
    }

    pub fn nearest(&self, value: f64) -> f64 {
        self.values[self.nearest_index(value)]
    }

    /// Contiguous slice of indices within `radius` steps of the grid point
    /// nearest to `value`, clipped at both ends of the grid.
    pub fn neighborhood(&self, value: f64, radius: usize) -> Range<usize> {
        let center = self.nearest_index(value);
        let lo = center.saturating_sub(radius);
        let hi = center.saturating_add(radius).min(self.values.len() - 1);
        lo..hi + 1
    }

    pub fn full_range(&self) -> Range<usize> {
        0..self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_both_bounds_and_literal_values() {
        let d = ForecastDomain::with_step(0.01).unwrap();
        assert_eq!(d.len(), 101);
        assert_eq!(d.get(0), 0.0);
        assert_eq!(d.get(100), 1.0);
        assert_eq!(d.get(7), 0.07);
        assert_eq!(d.get(29), 0.29);
        assert!(d.values().windows(2).all(|w| w[0] < w[1]));

        let coarse = ForecastDomain::with_step(0.25).unwrap();
        assert_eq!(coarse.values(), &[0.0, 0.25, 0.5, 0.75, 1.0]);

        let single = ForecastDomain::with_step(1.0).unwrap();
        assert_eq!(single.values(), &[0.0, 1.0]);
    }

    #[test]
    fn rejects_steps_that_do_not_divide_one() {
        for step in [0.3, 0.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                ForecastDomain::with_step(step),
                Err(DomainError::InvalidStep { .. })
            ));
        }
    }

    #[test]
    fn explicit_values_are_validated() {
        assert_eq!(ForecastDomain::from_values(vec![]), Err(DomainError::Empty));
        assert_eq!(
            ForecastDomain::from_values(vec![0.0, 0.6, 0.4, 1.0]),
            Err(DomainError::Unsorted { position: 2 })
        );
        assert!(matches!(
            ForecastDomain::from_values(vec![0.1, 0.5, 1.0]),
            Err(DomainError::MissingBounds { .. })
        ));
        let d = ForecastDomain::from_values(vec![0.0, 0.5, 1.0]).unwrap();
        assert_eq!(d.step(), 0.5);
    }

    #[test]
    fn nearest_grid_point() {
        let d = ForecastDomain::with_step(0.1).unwrap();
        assert_eq!(d.nearest(0.434), 0.4);
        assert_eq!(d.nearest(0.671), 0.7);
        assert_eq!(d.nearest(-0.2), 0.0);
        assert_eq!(d.nearest(1.7), 1.0);
        assert_eq!(d.nearest(0.3), 0.3);
        assert_eq!(d.nearest_index(0.96), 10);
    }

    #[test]
    fn neighborhood_is_clipped() {
        let d = ForecastDomain::with_step(0.1).unwrap();
        assert_eq!(d.neighborhood(0.5, 2), 3..8);
        assert_eq!(d.neighborhood(0.04, 2), 0..3);
        assert_eq!(d.neighborhood(0.98, 3), 7..11);
        assert_eq!(d.neighborhood(0.52, 0), 5..6);
        assert_eq!(d.neighborhood(0.5, 50), d.full_range());
    }
}
