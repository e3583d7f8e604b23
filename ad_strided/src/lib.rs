//! # ad_strided - Strided tensor views over shared storage
//!
//! A [`Tensor`] is a lightweight view: a shared handle to a flat [`Storage`]
//! buffer plus an element offset, a size per dimension and a stride per
//! dimension. Reshape, transpose and slice produce new views over the same
//! buffer without copying, so a write through one view is visible through
//! every alias. [`Tensor::contiguous`] materializes a row-major copy when (and
//! only when) the layout requires it.
//!
//! ## Example
//!
//! ```
//! use ad_strided::Tensor;
//!
//! let a = Tensor::arange(6)?.reshape(&[2, 3])?; // [[0 1 2], [3 4 5]]
//! let b = a.transpose(0, 1)?;                     // shape [3, 2], no copy
//! assert!(a.shares_storage(&b));
//! assert!(!b.is_contiguous());
//!
//! b.set(&[2, 1], 50.0)?;
//! assert_eq!(a.at(&[1, 2])?, 50.0);              // visible through the alias
//!
//! let c = b.contiguous();                         // fresh row-major buffer
//! assert!(!c.shares_storage(&a));
//! assert_eq!(c.to_vec(), vec![0.0, 3.0, 1.0, 4.0, 2.0, 50.0]);
//! # Ok::<(), ad_strided::Error>(())
//! ```
//!
//! ## Threading
//!
//! Storage is `Rc`-shared and element writes go through `Cell`, so tensors are
//! neither `Send` nor `Sync`; every view of a buffer lives on one thread.
//!
//! ## Limits
//!
//! - Zero-sized dimensions are rejected (a domain error).
//! - Reshape requires a contiguous tensor.
//! - Tensor-level autograd is only a hook: see [`GradFn`].

pub mod autograd;
pub mod iter;
pub mod shape;
pub mod storage;
pub mod tensor;

mod misc;
mod view;

pub use ad_error::{Error, ErrorKind, Result};
pub use autograd::GradFn;
pub use iter::Indices;
pub use storage::Storage;
pub use tensor::Tensor;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::autograd::GradFn;
    pub use crate::shape::{contiguous_strides, is_contiguous, linear_index, numel};
    pub use crate::storage::Storage;
    pub use crate::tensor::Tensor;
    pub use ad_error::{Error, ErrorKind, Result};
}
