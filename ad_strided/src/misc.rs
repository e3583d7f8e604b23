//! Equality and debug formatting for [`Tensor`].

use std::fmt;

use crate::tensor::Tensor;

/// Tensors are equal when their sizes and row-major logical values match,
/// regardless of storage, offset or strides.
impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.sizes == other.sizes && self.to_vec() == other.to_vec()
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("sizes", &self.sizes)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .field("values", &self.to_vec())
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.is_some())
            .finish()
    }
}
