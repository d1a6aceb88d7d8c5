//! Error taxonomy for field generation and classification.

/// Errors produced while validating generation parameters or combining fields.
///
/// All variants are local configuration failures. Generation is pure, so
/// retrying with the same input reproduces the same error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// Invalid generation parameters (empty or zero-weight wave set, bad scale, ...).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Two fields of unequal dimensions were combined.
    #[error("field shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        /// `(width, height)` of the first operand.
        left: (usize, usize),
        /// `(width, height)` of the second operand.
        right: (usize, usize),
    },

    /// A band whose lower and upper edge coincide, which would divide by zero
    /// during gradient interpolation.
    #[error("degenerate terrain band {band}: lower and upper threshold are both {threshold}")]
    DegenerateBand {
        /// Position of the band in its table.
        band: usize,
        /// The coinciding threshold value.
        threshold: f64,
    },

    /// Thresholds that decrease along the table.
    #[error("terrain thresholds must increase: band {band} has {threshold} after {previous}")]
    NonMonotonicThresholds {
        /// Position of the offending band.
        band: usize,
        /// Threshold of the offending band.
        threshold: f64,
        /// Threshold of the band before it.
        previous: f64,
    },

    /// A cell value that no band accepts.
    #[error("value {value} at ({x}, {z}) exceeds every terrain threshold")]
    UnclassifiedCell {
        /// Cell column.
        x: usize,
        /// Cell row.
        z: usize,
        /// The unclassifiable value.
        value: f64,
    },
}

/// Shorthand for results carrying a [`TerrainError`].
pub type TerrainResult<T> = Result<T, TerrainError>;
