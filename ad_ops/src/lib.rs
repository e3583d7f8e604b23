//! # ad_ops - Forward kernels over strided tensors
//!
//! Elementwise [`add`], [`sub`], [`mul`] and [`relu`], plus 2-D [`matmul`].
//! Operands are read logically (row-major over their sizes), so transposed
//! and sliced views work without materializing them first. Every kernel
//! returns a freshly allocated contiguous tensor.
//!
//! These kernels do not record gradient functions on their results.
//!
//! ```
//! use ad_strided::Tensor;
//!
//! let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2])?;
//! let b = a.transpose(0, 1)?;
//! let c = ad_ops::matmul(&a, &b)?;
//! assert_eq!(c.to_vec(), vec![5.0, 11.0, 11.0, 25.0]);
//! # Ok::<(), ad_ops::Error>(())
//! ```

mod elementwise;
mod matmul;

pub use ad_error::{Error, ErrorKind, Result};
pub use elementwise::{add, mul, relu, sub};
pub use matmul::matmul;
