//! Dataset shapes.
//!
//! A shape describes the extent of a multi-dimensional dataset. For series
//! data, dimension 0 is time and the remaining dimensions are per-sample
//! layout (channels, or pixels for image frames).

use smallvec::SmallVec;

use super::{Error, Result};

/// Shape of a multi-dimensional dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Size of each dimension. Empty means scalar (rank 0).
    dims: SmallVec<[usize; 4]>,
}

impl Shape {
    /// Create scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: SmallVec::new() }
    }

    /// Create 1D shape.
    pub fn d1(size: usize) -> Self {
        Self { dims: smallvec::smallvec![size] }
    }

    /// Create 2D shape.
    pub fn d2(rows: usize, cols: usize) -> Self {
        Self { dims: smallvec::smallvec![rows, cols] }
    }

    /// Create from a slice of sizes.
    pub fn from_slice(sizes: &[usize]) -> Self {
        Self { dims: SmallVec::from_slice(sizes) }
    }

    /// Get the rank (number of dimensions).
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Get the size of a specific dimension.
    pub fn size(&self, dim: usize) -> Option<usize> {
        self.dims.get(dim).copied()
    }

    /// Get all dimension sizes as a slice.
    pub fn sizes(&self) -> &[usize] {
        &self.dims
    }

    /// Get the total number of elements (product of all dimensions).
    ///
    /// `None` when the product overflows `usize`.
    pub fn num_elements(&self) -> Option<usize> {
        checked_product(&self.dims)
    }

    /// Total element count, rejecting shapes whose element count or
    /// per-sample length does not fit in `usize`.
    pub fn checked_len(&self) -> Result<usize> {
        match (self.num_elements(), self.sample_len()) {
            (Some(len), Some(_)) => Ok(len),
            _ => Err(Error::invalid(format!("shape {} overflows the element count", self))),
        }
    }

    /// Number of samples along the leading (time) dimension.
    ///
    /// A scalar counts as a single sample.
    pub fn num_samples(&self) -> usize {
        self.dims.first().copied().unwrap_or(1)
    }

    /// Number of elements in one sample: the product of the trailing dimensions.
    pub fn sample_len(&self) -> Option<usize> {
        self.dims.get(1..).map_or(Some(1), checked_product)
    }

    /// Check if this represents a scalar (rank 0).
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }
}

fn checked_product(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

impl From<usize> for Shape {
    fn from(size: usize) -> Self {
        Self::d1(size)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self::d2(rows, cols)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(v: Vec<usize>) -> Self {
        Self { dims: SmallVec::from_vec(v) }
    }
}

impl From<&[usize]> for Shape {
    fn from(v: &[usize]) -> Self {
        Self::from_slice(v)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, s) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", s)?;
        }
        if self.dims.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}
