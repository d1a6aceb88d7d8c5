//! Layered-wave noise sampler.
//!
//! Composites several weighted octaves ("waves") of Perlin gradient noise into
//! one normalized value per sample. Every tile samples the same infinite noise
//! domain; only the offset differs, which is what keeps neighboring tiles
//! seamless.

use glam::DVec2;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};
use crate::field::ScalarField;

/// A single additive noise layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    /// Added to both sample coordinates; shifts the layer to a different part
    /// of the noise domain.
    pub seed: f64,
    /// Multiplier applied to the sample coordinates before the seed shift.
    pub frequency: f64,
    /// Weight of this layer in the normalized sum.
    pub amplitude: f64,
}

impl Wave {
    /// Construct a wave.
    pub const fn new(seed: f64, frequency: f64, amplitude: f64) -> Self {
        Self {
            seed,
            frequency,
            amplitude,
        }
    }
}

/// Coherent 2D noise remapped to `[0, 1]`.
///
/// The permutation table is fixed so that the world is defined purely by the
/// wave parameters. Perlin noise with quintic fade is C² continuous, so a
/// supersampled raster lines up with the base-resolution samples.
#[derive(Clone, Debug)]
pub struct CoherentNoise {
    perlin: Perlin,
}

impl CoherentNoise {
    /// Noise over the default permutation table.
    pub fn new() -> Self {
        Self {
            perlin: Perlin::new(Perlin::DEFAULT_SEED),
        }
    }

    /// Sample at `(x, y)`, returning a value in `[0, 1]`.
    #[inline]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let raw = self.perlin.get([x, y]);
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

impl Default for CoherentNoise {
    fn default() -> Self {
        Self::new()
    }
}

/// Samples a normalized weighted sum of [`Wave`]s.
///
/// Construction validates the wave set, so [`WaveField::sample`] never divides
/// by a zero amplitude sum.
#[derive(Clone, Debug)]
pub struct WaveField {
    noise: CoherentNoise,
    waves: Vec<Wave>,
    amplitude_sum: f64,
}

impl WaveField {
    /// Validate `waves` and build a sampler.
    ///
    /// # Errors
    ///
    /// [`TerrainError::Config`] if the set is empty, a parameter is not finite,
    /// or the amplitudes sum to zero.
    pub fn new(waves: Vec<Wave>) -> TerrainResult<Self> {
        let amplitude_sum = validate_waves(&waves)?;
        Ok(Self {
            noise: CoherentNoise::new(),
            waves,
            amplitude_sum,
        })
    }

    /// The waves this field composites.
    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    /// Sample the normalized wave sum at a point of the noise domain.
    pub fn sample(&self, sx: f64, sy: f64) -> f64 {
        let mut total = 0.0;
        for wave in &self.waves {
            let nx = sx * wave.frequency + wave.seed;
            let ny = sy * wave.frequency + wave.seed;
            total += wave.amplitude * self.noise.sample(nx, ny);
        }
        total / self.amplitude_sum
    }

    /// Generate a `(sample_size * resolution)²` field.
    ///
    /// Cell `(x, y)` samples `(x / scale / resolution + offset.y,
    /// y / scale / resolution + offset.x)`. The swap between the grid axes and
    /// the offset components matches [`crate::TileLayout`]: the offset's first
    /// component follows the tile's `x` index, and a grid's second index runs
    /// along world `x` (see [`crate::TileLayout::vertex_position`]).
    ///
    /// `resolution` only subdivides the sampling step; the same `scale` and
    /// `offset` address the same underlying field, so a supersampled texture
    /// raster agrees with the base-resolution vertex heights.
    ///
    /// # Errors
    ///
    /// [`TerrainError::Config`] if `scale` is not a positive finite number or
    /// `resolution` is zero.
    pub fn generate(
        &self,
        sample_size: usize,
        scale: f64,
        offset: DVec2,
        resolution: usize,
    ) -> TerrainResult<ScalarField> {
        validate_sampling(scale, resolution)?;
        let size = sample_size * resolution;
        let resolution = resolution as f64;

        let field = ScalarField::from_fn(size, size, |x, y| {
            let sx = x as f64 / scale / resolution + offset.y;
            let sy = y as f64 / scale / resolution + offset.x;
            self.sample(sx, sy)
        });

        tracing::trace!(size, waves = self.waves.len(), "generated wave field");
        Ok(field)
    }
}

/// One-shot convenience over [`WaveField::new`] and [`WaveField::generate`].
pub fn generate(
    sample_size: usize,
    scale: f64,
    waves: &[Wave],
    offset: DVec2,
    resolution: usize,
) -> TerrainResult<ScalarField> {
    WaveField::new(waves.to_vec())?.generate(sample_size, scale, offset, resolution)
}

fn validate_waves(waves: &[Wave]) -> TerrainResult<f64> {
    if waves.is_empty() {
        return Err(TerrainError::Config("wave set is empty".into()));
    }
    for (i, wave) in waves.iter().enumerate() {
        if !(wave.seed.is_finite() && wave.frequency.is_finite() && wave.amplitude.is_finite()) {
            return Err(TerrainError::Config(format!(
                "wave {i} has a non-finite parameter: {wave:?}"
            )));
        }
    }
    let amplitude_sum: f64 = waves.iter().map(|w| w.amplitude).sum();
    if amplitude_sum == 0.0 {
        return Err(TerrainError::Config("wave amplitudes sum to zero".into()));
    }
    Ok(amplitude_sum)
}

fn validate_sampling(scale: f64, resolution: usize) -> TerrainResult<()> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(TerrainError::Config(format!(
            "scale must be positive and finite, got {scale}"
        )));
    }
    if resolution == 0 {
        return Err(TerrainError::Config("resolution must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_wave() -> Vec<Wave> {
        vec![Wave::new(0.0, 1.0, 1.0)]
    }

    fn layered_waves() -> Vec<Wave> {
        vec![
            Wave::new(56.0, 0.05, 1.0),
            Wave::new(199.36, 0.1, 0.5),
            Wave::new(12.4, 0.4, 0.25),
        ]
    }

    #[test]
    fn test_scenario_four_by_four_in_unit_range() {
        let field = generate(4, 10.0, &single_wave(), DVec2::ZERO, 1).unwrap();
        assert_eq!(field.dimensions(), (4, 4));
        for (_, &v) in field.iter() {
            assert!((0.0..=1.0).contains(&v), "value {v} outside [0, 1]");
        }
    }

    #[test]
    fn test_offset_shifts_values_but_keeps_range() {
        let base = generate(4, 10.0, &single_wave(), DVec2::ZERO, 1).unwrap();
        let shifted = generate(4, 10.0, &single_wave(), DVec2::new(0.3, 0.0), 1).unwrap();
        assert_ne!(base, shifted, "offset must change the sampled window");
        for (_, &v) in shifted.iter() {
            assert!((0.0..=1.0).contains(&v), "value {v} outside [0, 1]");
        }
    }

    #[test]
    fn test_offset_axes_are_swapped() {
        let field = WaveField::new(layered_waves()).unwrap();
        let offset = DVec2::new(0.7, 2.1);
        let generated = field.generate(5, 8.0, offset, 1).unwrap();
        let x = 3;
        let y = 1;
        let expected = field.sample(x as f64 / 8.0 + offset.y, y as f64 / 8.0 + offset.x);
        assert_eq!(*generated.get(x, y), expected);
    }

    #[test]
    fn test_determinism_bit_identical() {
        let a = generate(16, 12.5, &layered_waves(), DVec2::new(3.0, 1.5), 2).unwrap();
        let b = generate(16, 12.5, &layered_waves(), DVec2::new(3.0, 1.5), 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalization_bound_with_non_negative_amplitudes() {
        let field = generate(32, 3.0, &layered_waves(), DVec2::new(-4.0, 9.0), 1).unwrap();
        let (lo, hi) = field.min_max().unwrap();
        assert!(lo >= 0.0 && hi <= 1.0, "range [{lo}, {hi}] escapes [0, 1]");
    }

    #[test]
    fn test_wave_order_is_irrelevant() {
        let mut reversed = layered_waves();
        reversed.reverse();
        let a = generate(8, 5.0, &layered_waves(), DVec2::ZERO, 1).unwrap();
        let b = generate(8, 5.0, &reversed, DVec2::ZERO, 1).unwrap();
        for ((_, va), (_, vb)) in a.iter().zip(b.iter()) {
            assert!((va - vb).abs() < 1e-12);
        }
    }

    #[test]
    fn test_resolution_aligns_with_base_samples() {
        let field = WaveField::new(layered_waves()).unwrap();
        let base = field.generate(8, 6.0, DVec2::new(1.0, 2.0), 1).unwrap();
        let fine = field.generate(8, 6.0, DVec2::new(1.0, 2.0), 4).unwrap();
        assert_eq!(fine.dimensions(), (32, 32));
        for x in 0..8 {
            for z in 0..8 {
                let coarse = *base.get(x, z);
                let supersampled = *fine.get(x * 4, z * 4);
                assert!(
                    (coarse - supersampled).abs() < 1e-9,
                    "mismatch at ({x}, {z}): {coarse} vs {supersampled}"
                );
            }
        }
    }

    #[test]
    fn test_empty_wave_set_rejected() {
        let result = generate(4, 10.0, &[], DVec2::ZERO, 1);
        assert!(matches!(result, Err(TerrainError::Config(_))));
    }

    #[test]
    fn test_zero_amplitudes_rejected() {
        let waves = [Wave::new(1.0, 1.0, 0.0), Wave::new(2.0, 2.0, 0.0)];
        let result = WaveField::new(waves.to_vec());
        assert!(matches!(result, Err(TerrainError::Config(_))));
    }

    #[test]
    fn test_non_finite_wave_rejected() {
        let result = WaveField::new(vec![Wave::new(f64::NAN, 1.0, 1.0)]);
        assert!(matches!(result, Err(TerrainError::Config(_))));
    }

    #[test]
    fn test_invalid_sampling_rejected() {
        let field = WaveField::new(single_wave()).unwrap();
        assert!(field.generate(4, 0.0, DVec2::ZERO, 1).is_err());
        assert!(field.generate(4, -2.0, DVec2::ZERO, 1).is_err());
        assert!(field.generate(4, 1.0, DVec2::ZERO, 0).is_err());
    }

    #[test]
    fn test_smooth_no_discontinuities() {
        let field = WaveField::new(layered_waves()).unwrap();
        let step = 0.01;
        for i in 0..5_000 {
            let x = i as f64 * step;
            let delta = (field.sample(x + step, 0.3) - field.sample(x, 0.3)).abs();
            assert!(delta < 0.05, "discontinuity at x={x}: delta={delta}");
        }
    }

    #[test]
    fn test_coherent_noise_lattice_points_are_mid_grey() {
        let noise = CoherentNoise::new();
        for (x, y) in [(0.0, 0.0), (3.0, 7.0), (-2.0, 5.0)] {
            assert!((noise.sample(x, y) - 0.5).abs() < 1e-9);
        }
    }
}
