//! Height remapping curves.

use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};

/// Remaps a raw `[0, 1]` height sample before it is scaled by the maximum
/// height. Any `Fn(f64) -> f64` closure is a curve.
pub trait HeightCurve: Send + Sync {
    /// Remapped value for raw height `t`.
    fn evaluate(&self, t: f64) -> f64;
}

impl<F> HeightCurve for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, t: f64) -> f64 {
        self(t)
    }
}

/// A piecewise-linear curve through `(time, value)` keys, constant outside
/// the first and last key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKeys {
    keys: Vec<(f64, f64)>,
}

impl CurveKeys {
    /// Build a curve from keys sorted by time.
    ///
    /// # Errors
    ///
    /// [`TerrainError::Config`] if `keys` is empty, unsorted, or not finite.
    pub fn new(keys: Vec<(f64, f64)>) -> TerrainResult<Self> {
        let curve = Self { keys };
        curve.validate()?;
        Ok(curve)
    }

    /// The identity on `[0, 1]`.
    pub fn linear() -> Self {
        Self {
            keys: vec![(0.0, 0.0), (1.0, 1.0)],
        }
    }

    /// The curve keys.
    pub fn keys(&self) -> &[(f64, f64)] {
        &self.keys
    }

    /// Check the invariants [`CurveKeys::new`] enforces.
    pub fn validate(&self) -> TerrainResult<()> {
        if self.keys.is_empty() {
            return Err(TerrainError::Config("height curve has no keys".into()));
        }
        if self
            .keys
            .iter()
            .any(|&(t, v)| !(t.is_finite() && v.is_finite()))
        {
            return Err(TerrainError::Config(
                "height curve keys must be finite".into(),
            ));
        }
        if self.keys.windows(2).any(|w| w[1].0 < w[0].0) {
            return Err(TerrainError::Config(
                "height curve keys must be sorted by time".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CurveKeys {
    fn default() -> Self {
        Self::linear()
    }
}

impl HeightCurve for CurveKeys {
    fn evaluate(&self, t: f64) -> f64 {
        let Some(&(first_t, first_v)) = self.keys.first() else {
            return t;
        };
        if t <= first_t {
            return first_v;
        }
        for pair in self.keys.windows(2) {
            let ((t0, v0), (t1, v1)) = (pair[0], pair[1]);
            if t <= t1 {
                if t1 <= t0 {
                    return v1;
                }
                let w = (t - t0) / (t1 - t0);
                return v0 + (v1 - v0) * w;
            }
        }
        self.keys[self.keys.len() - 1].1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_linear_is_identity_in_range() {
        let curve = CurveKeys::linear();
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert!((curve.evaluate(t) - t).abs() < EPSILON);
        }
    }

    #[test]
    fn test_flattened_lowlands() {
        // Water stays flat below 0.3, then ramps up.
        let curve = CurveKeys::new(vec![(0.0, 0.0), (0.3, 0.0), (1.0, 1.0)]).unwrap();
        assert_eq!(curve.evaluate(0.1), 0.0);
        assert!((curve.evaluate(0.65) - 0.5).abs() < EPSILON);
        assert_eq!(curve.evaluate(2.0), 1.0);
    }

    #[test]
    fn test_closure_is_a_curve() {
        let square = |t: f64| t * t;
        assert!((square.evaluate(0.5) - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_invalid_keys_rejected() {
        assert!(CurveKeys::new(Vec::new()).is_err());
        assert!(CurveKeys::new(vec![(0.5, 0.0), (0.2, 1.0)]).is_err());
        assert!(CurveKeys::new(vec![(0.0, f64::INFINITY)]).is_err());
    }
}
