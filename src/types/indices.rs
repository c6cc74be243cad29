//! Strongly-typed index newtypes.
//!
//! Keeps swarm positions apart from lattice coordinates.

use std::fmt;

/// Position of a particle in the mechanics swarm.
///
/// # Example
///
/// ```
/// use surface_linkage::types::ParticleIndex;
///
/// let p = ParticleIndex::new(42);
/// assert_eq!(p.get(), 42);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ParticleIndex(usize);

impl ParticleIndex {
    /// Create a new index.
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index value.
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Iterate over [0, n).
    pub fn iter(n: usize) -> impl ExactSizeIterator<Item = ParticleIndex> {
        (0..n).map(ParticleIndex)
    }
}

impl fmt::Display for ParticleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl From<usize> for ParticleIndex {
    #[inline]
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<ParticleIndex> for usize {
    #[inline]
    fn from(idx: ParticleIndex) -> usize {
        idx.0
    }
}

impl<T> std::ops::Index<ParticleIndex> for [T] {
    type Output = T;
    #[inline]
    fn index(&self, idx: ParticleIndex) -> &T {
        &self[idx.0]
    }
}

impl<T> std::ops::IndexMut<ParticleIndex> for [T] {
    #[inline]
    fn index_mut(&mut self, idx: ParticleIndex) -> &mut T {
        &mut self[idx.0]
    }
}

/// A node (column) of the elevation lattice.
///
/// ```
/// use surface_linkage::types::CellIndex;
///
/// let cell = CellIndex::new(3, 7);
/// assert_eq!(cell.linear(10), 37);
/// assert_eq!(CellIndex::from_linear(37, 10), cell);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellIndex {
    /// Row (y direction)
    pub row: usize,
    /// Column (x direction)
    pub col: usize,
}

impl CellIndex {
    /// Create a new cell index.
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major linear offset for a lattice with `cols` columns.
    #[inline]
    pub const fn linear(self, cols: usize) -> usize {
        self.row * cols + self.col
    }

    /// Inverse of [`CellIndex::linear`].
    #[inline]
    pub const fn from_linear(offset: usize, cols: usize) -> Self {
        Self {
            row: offset / cols,
            col: offset % cols,
        }
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C({}, {})", self.row, self.col)
    }
}
