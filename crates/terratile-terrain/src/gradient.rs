//! Colors and piecewise-linear color gradients for terrain bands.

use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};

/// A linear RGBA color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Fully transparent black, used for cells with no color.
    pub const CLEAR: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Construct from all four channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Construct an opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Construct an opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Linear blend: `w = 0.0` returns `self`, `w = 1.0` returns `other`.
    pub fn lerp(self, other: Self, w: f32) -> Self {
        Self {
            r: self.r * (1.0 - w) + other.r * w,
            g: self.g * (1.0 - w) + other.g * w,
            b: self.b * (1.0 - w) + other.b * w,
            a: self.a * (1.0 - w) + other.a * w,
        }
    }

    /// Quantize to 8-bit channels, clamping out-of-range values.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// A color stop of a [`ColorGradient`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientKey {
    /// Position of the stop in `[0, 1]`.
    pub time: f32,
    pub color: Rgba,
}

/// Color keys interpolated linearly, clamped to the first/last key outside
/// their span.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorGradient {
    keys: Vec<GradientKey>,
}

impl ColorGradient {
    /// Build a gradient from keys sorted by `time`.
    ///
    /// # Errors
    ///
    /// [`TerrainError::Config`] if `keys` is empty, unsorted, or a time lies
    /// outside `[0, 1]`.
    pub fn new(keys: Vec<GradientKey>) -> TerrainResult<Self> {
        let gradient = Self { keys };
        gradient.validate()?;
        Ok(gradient)
    }

    /// A gradient with a single color.
    pub fn solid(color: Rgba) -> Self {
        Self {
            keys: vec![GradientKey { time: 0.0, color }],
        }
    }

    /// A two-stop gradient from `start` at 0 to `end` at 1.
    pub fn linear(start: Rgba, end: Rgba) -> Self {
        Self {
            keys: vec![
                GradientKey {
                    time: 0.0,
                    color: start,
                },
                GradientKey {
                    time: 1.0,
                    color: end,
                },
            ],
        }
    }

    /// The color stops.
    pub fn keys(&self) -> &[GradientKey] {
        &self.keys
    }

    /// Check the invariants [`ColorGradient::new`] enforces. Deserialized
    /// gradients skip the constructor, so tables call this on load.
    pub fn validate(&self) -> TerrainResult<()> {
        if self.keys.is_empty() {
            return Err(TerrainError::Config("gradient has no color keys".into()));
        }
        for key in &self.keys {
            if !(0.0..=1.0).contains(&key.time) {
                return Err(TerrainError::Config(format!(
                    "gradient key time {} outside [0, 1]",
                    key.time
                )));
            }
        }
        if self.keys.windows(2).any(|w| w[1].time < w[0].time) {
            return Err(TerrainError::Config(
                "gradient keys must be sorted by time".into(),
            ));
        }
        Ok(())
    }

    /// Color at parameter `t`.
    pub fn evaluate(&self, t: f64) -> Rgba {
        let t = t as f32;
        let Some(first) = self.keys.first() else {
            return Rgba::CLEAR;
        };
        if t.is_nan() || t <= first.time {
            return first.color;
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.time {
                let span = b.time - a.time;
                if span <= 0.0 {
                    return b.color;
                }
                return a.color.lerp(b.color, (t - a.time) / span);
            }
        }
        self.keys[self.keys.len() - 1].color
    }
}
