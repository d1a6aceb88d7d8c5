//! Dense 2D grids used by every stage of tile generation.

use crate::error::{TerrainError, TerrainResult};

/// A dense 2D grid of values indexed by `(x, z)`.
///
/// Storage is `x`-major: cell `(x, z)` lives at `x * height + z`, the same
/// order the mesh vertex array uses, so [`Grid::as_slice`] can be handed to
/// vertex consumers without reordering.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// A grid of scalar samples (height, heat, moisture, ...).
pub type ScalarField = Grid<f64>;

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f(x, z)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for x in 0..width {
            for z in 0..height {
                data.push(f(x, z));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Same as [`Grid::from_fn`] but stops at the first error.
    pub fn try_from_fn<E>(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> Result<T, E>,
    ) -> Result<Self, E> {
        let mut data = Vec::with_capacity(width * height);
        for x in 0..width {
            for z in 0..height {
                data.push(f(x, z)?);
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Extent along `x`.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Extent along `z`.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for a zero-sized grid.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn index(&self, x: usize, z: usize) -> usize {
        assert!(
            x < self.width && z < self.height,
            "grid index ({x}, {z}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        x * self.height + z
    }

    /// Borrow the cell at `(x, z)`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `z >= height`.
    pub fn get(&self, x: usize, z: usize) -> &T {
        &self.data[self.index(x, z)]
    }

    /// Overwrite the cell at `(x, z)`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `z >= height`.
    pub fn set(&mut self, x: usize, z: usize, value: T) {
        let idx = self.index(x, z);
        self.data[idx] = value;
    }

    /// All cells in `x`-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consume the grid, returning its `x`-major storage.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Iterate `((x, z), &value)` in storage order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> + '_ {
        let height = self.height;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| ((i / height, i % height), v))
    }

    /// Fail with [`TerrainError::ShapeMismatch`] unless both grids have the same shape.
    pub fn ensure_same_shape<U>(&self, other: &Grid<U>) -> TerrainResult<()> {
        if self.dimensions() != other.dimensions() {
            return Err(TerrainError::ShapeMismatch {
                left: self.dimensions(),
                right: other.dimensions(),
            });
        }
        Ok(())
    }
}

impl ScalarField {
    /// Smallest and largest sample, or `None` for an empty field.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}
