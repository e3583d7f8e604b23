//! View operations and materialization.
//!
//! Views only rewrite offset/sizes/strides; element data is never copied.

use std::rc::Rc;

use ad_error::{ensure, Result};
use log::{debug, trace};

use crate::iter::next_index;
use crate::shape;
use crate::storage::Storage;
use crate::tensor::Tensor;

impl Tensor {
    /// View the same elements with a new shape.
    ///
    /// Only contiguous tensors can be reshaped; call
    /// [`contiguous`](Tensor::contiguous) first for transposed or sliced views.
    pub fn reshape(&self, new_sizes: &[usize]) -> Result<Tensor> {
        ensure!(
            self.is_contiguous(),
            Precondition,
            "reshape",
            "tensor with sizes {:?} and strides {:?} is not contiguous",
            self.sizes,
            self.strides
        );
        let new_numel = shape::numel(new_sizes)?;
        ensure!(
            new_numel == self.numel(),
            Shape,
            "reshape",
            "cannot reshape {:?} ({} elements) into {new_sizes:?} ({new_numel} elements)",
            self.sizes,
            self.numel()
        );

        trace!("reshape: {:?} -> {:?}", self.sizes, new_sizes);
        Tensor::from_parts(
            Rc::clone(&self.storage),
            self.offset,
            new_sizes.to_vec(),
            shape::contiguous_strides(new_sizes),
        )
    }

    /// Swap two dimensions (sizes and strides); the offset is unchanged.
    pub fn transpose(&self, dim0: usize, dim1: usize) -> Result<Tensor> {
        let ndim = self.ndim();
        ensure!(
            dim0 < ndim && dim1 < ndim,
            Range,
            "transpose",
            "dimensions ({dim0}, {dim1}) out of range for rank {ndim}"
        );

        let mut sizes = self.sizes.clone();
        let mut strides = self.strides.clone();
        sizes.swap(dim0, dim1);
        strides.swap(dim0, dim1);

        trace!("transpose({dim0}, {dim1}): {:?} -> {:?}", self.sizes, sizes);
        Tensor::from_parts(Rc::clone(&self.storage), self.offset, sizes, strides)
    }

    /// Narrow dimension `dim` to `length` elements starting at `start`.
    ///
    /// `start + length == sizes[dim]` is valid; anything past it is a range error.
    pub fn slice(&self, dim: usize, start: usize, length: usize) -> Result<Tensor> {
        ensure!(
            dim < self.ndim(),
            Range,
            "slice",
            "dimension {dim} out of range for rank {}",
            self.ndim()
        );
        let size = self.sizes[dim];
        ensure!(
            start.checked_add(length).is_some_and(|end| end <= size),
            Range,
            "slice",
            "range {start}..{start}+{length} out of bounds for dimension {dim} with size {size}"
        );

        let mut sizes = self.sizes.clone();
        sizes[dim] = length;
        let offset = self.offset + start * self.strides[dim];

        trace!("slice({dim}, {start}, {length}): offset {} -> {offset}", self.offset);
        Tensor::from_parts(Rc::clone(&self.storage), offset, sizes, self.strides.clone())
    }

    /// Return a row-major tensor with the same logical values.
    ///
    /// Already-contiguous tensors come back as an alias of the same storage.
    /// Otherwise a new buffer is allocated and filled in row-major order.
    pub fn contiguous(&self) -> Tensor {
        if self.is_contiguous() {
            return self.alias();
        }

        let numel = self.numel();
        debug!(
            "contiguous: materializing {:?} (strides {:?}) into {numel} elements",
            self.sizes, self.strides
        );
        let storage = Storage::new(numel);

        // Non-contiguous implies rank >= 1, so the odometer has a first dimension.
        let mut idx = vec![0usize; self.ndim()];
        for out in 0..numel {
            storage.set(out, self.storage.get(self.linear_unchecked(&idx)));
            if !next_index(&mut idx, &self.sizes) {
                break;
            }
        }

        Tensor {
            storage: Rc::new(storage),
            offset: 0,
            sizes: self.sizes.clone(),
            strides: shape::contiguous_strides(&self.sizes),
            requires_grad: false,
            grad: None,
            grad_fn: None,
        }
    }
}
