//! Shape and stride utilities for strided tensors.
//!
//! Pure functions over dimension-size sequences. A rank-0 shape (`[]`) is a
//! scalar with one element and no strides. Zero-sized dimensions are rejected.

use ad_error::{ensure, Error, ErrorKind, Result};

/// Total number of elements described by `sizes`.
///
/// An empty size list is a scalar and has one element. Any zero-sized
/// dimension is a domain error; a product that does not fit in `usize` is a
/// shape error.
pub fn numel(sizes: &[usize]) -> Result<usize> {
    let mut count = 1usize;
    for (dim, &size) in sizes.iter().enumerate() {
        ensure!(
            size > 0,
            Domain,
            "numel",
            "dimension {dim} has size 0 (zero-sized dimensions are not supported)"
        );
        count = count.checked_mul(size).ok_or_else(|| {
            Error::new(
                ErrorKind::Shape,
                "numel",
                format!("element count of {sizes:?} overflows usize"),
            )
        })?;
    }
    Ok(count)
}

/// Compute row-major (C-contiguous) strides for `sizes`.
///
/// `[2, 3, 4]` -> `[12, 4, 1]`, `[]` -> `[]`.
pub fn contiguous_strides(sizes: &[usize]) -> Vec<usize> {
    let ndim = sizes.len();
    if ndim == 0 {
        return vec![];
    }

    let mut strides = vec![1usize; ndim];
    for i in (0..ndim - 1).rev() {
        strides[i] = strides[i + 1] * sizes[i + 1];
    }
    strides
}

/// True iff `strides` is exactly the row-major layout for `sizes`.
pub fn is_contiguous(sizes: &[usize], strides: &[usize]) -> bool {
    sizes.len() == strides.len() && contiguous_strides(sizes) == strides
}

/// Compute `offset + sum(indices[d] * strides[d])`.
///
/// A result that does not fit in `usize` is a range error.
pub fn linear_index(offset: usize, strides: &[usize], indices: &[usize]) -> Result<usize> {
    ensure!(
        strides.len() == indices.len(),
        Domain,
        "linear_index",
        "rank mismatch: {} strides, {} indices",
        strides.len(),
        indices.len()
    );
    strides
        .iter()
        .zip(indices.iter())
        .try_fold(offset, |acc, (s, i)| s.checked_mul(*i).and_then(|t| acc.checked_add(t)))
        .ok_or_else(|| {
            Error::new(
                ErrorKind::Range,
                "linear_index",
                format!("index {indices:?} with strides {strides:?} overflows usize"),
            )
        })
}
