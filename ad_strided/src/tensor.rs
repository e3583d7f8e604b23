//! The strided tensor handle: factories, introspection and indexing.

use std::cell::Cell;
use std::rc::Rc;

use ad_error::{ensure, Error, ErrorKind, Result};

use crate::autograd::GradFn;
use crate::shape;
use crate::storage::Storage;

/// A view onto shared [`Storage`]: offset, sizes and strides.
///
/// Views produced by [`reshape`](Tensor::reshape), [`transpose`](Tensor::transpose)
/// and [`slice`](Tensor::slice) share storage with their source, so a write
/// through one is visible through the other. [`contiguous`](Tensor::contiguous)
/// copies only when the layout is not already row-major.
///
/// Invariants held by every constructed tensor:
/// - `sizes.len() == strides.len()`
/// - every size is > 0
/// - every addressable linear index lies inside the storage
pub struct Tensor {
    pub(crate) storage: Rc<Storage>,
    pub(crate) offset: usize,
    pub(crate) sizes: Vec<usize>,
    pub(crate) strides: Vec<usize>,
    pub(crate) requires_grad: bool,
    pub(crate) grad: Option<Box<Tensor>>,
    pub(crate) grad_fn: Option<Rc<dyn GradFn>>,
}

impl Tensor {
    /// Build a tensor over existing storage, validating the layout.
    pub(crate) fn from_parts(
        storage: Rc<Storage>,
        offset: usize,
        sizes: Vec<usize>,
        strides: Vec<usize>,
    ) -> Result<Self> {
        ensure!(
            sizes.len() == strides.len(),
            Shape,
            "tensor",
            "sizes/strides rank mismatch: {} vs {}",
            sizes.len(),
            strides.len()
        );
        shape::numel(&sizes)?;

        // Largest reachable linear index must stay inside the buffer.
        let last = sizes
            .iter()
            .zip(strides.iter())
            .try_fold(offset, |acc, (&size, &stride)| {
                (size - 1)
                    .checked_mul(stride)
                    .and_then(|span| acc.checked_add(span))
            })
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::Range,
                    "tensor",
                    format!("view with sizes {sizes:?} and strides {strides:?} overflows usize"),
                )
            })?;
        ensure!(
            last < storage.len(),
            Range,
            "tensor",
            "view reaches linear index {last} but storage holds {} elements",
            storage.len()
        );

        Ok(Tensor {
            storage,
            offset,
            sizes,
            strides,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Fresh contiguous tensor over newly allocated storage.
    fn allocate(sizes: &[usize], fill: f32) -> Result<Self> {
        let numel = shape::numel(sizes)?;
        Self::from_parts(
            Rc::new(Storage::filled(numel, fill)),
            0,
            sizes.to_vec(),
            shape::contiguous_strides(sizes),
        )
    }

    // === Factories ===

    /// Allocate a contiguous tensor with unspecified contents.
    ///
    /// The buffer is currently zero-filled, but callers must not rely on that;
    /// use [`zeros`](Tensor::zeros) when the values matter.
    pub fn empty(sizes: &[usize]) -> Result<Self> {
        Self::allocate(sizes, 0.0)
    }

    pub fn zeros(sizes: &[usize]) -> Result<Self> {
        Self::allocate(sizes, 0.0)
    }

    pub fn ones(sizes: &[usize]) -> Result<Self> {
        Self::allocate(sizes, 1.0)
    }

    /// Contiguous tensor with every element set to `value`.
    pub fn full(sizes: &[usize], value: f32) -> Result<Self> {
        Self::allocate(sizes, value)
    }

    /// Rank-0 tensor holding one value.
    pub fn scalar(value: f32) -> Self {
        Tensor {
            storage: Rc::new(Storage::from_vec(vec![value])),
            offset: 0,
            sizes: vec![],
            strides: vec![],
            requires_grad: false,
            grad: None,
            grad_fn: None,
        }
    }

    /// 1-D tensor `[0, 1, ..., n-1]`.
    ///
    /// Values are converted with `as f32`, which is exact only up to 2^24;
    /// beyond that neighbouring indices can round to the same value.
    ///
    /// ```
    /// use ad_strided::Tensor;
    ///
    /// let t = Tensor::arange(4)?;
    /// assert_eq!(t.to_vec(), vec![0.0, 1.0, 2.0, 3.0]);
    /// assert_eq!(16_777_217usize as f32, 16_777_216.0);
    /// # Ok::<(), ad_strided::Error>(())
    /// ```
    pub fn arange(n: usize) -> Result<Self> {
        let tensor = Self::empty(&[n])?;
        for (i, cell) in tensor.storage.cells().iter().enumerate() {
            cell.set(i as f32);
        }
        Ok(tensor)
    }

    /// Copy `values` (row-major) into a new contiguous tensor of shape `sizes`.
    pub fn from_vec(values: Vec<f32>, sizes: &[usize]) -> Result<Self> {
        let numel = shape::numel(sizes)?;
        ensure!(
            values.len() == numel,
            Shape,
            "from_vec",
            "data has {} elements but shape {sizes:?} needs {numel}",
            values.len()
        );
        Self::from_parts(
            Rc::new(Storage::from_vec(values)),
            0,
            sizes.to_vec(),
            shape::contiguous_strides(sizes),
        )
    }

    /// Contiguous zeros with the shape of `other`.
    pub fn zeros_like(other: &Tensor) -> Self {
        Self::like(other, 0.0)
    }

    /// Contiguous ones with the shape of `other`.
    pub fn ones_like(other: &Tensor) -> Self {
        Self::like(other, 1.0)
    }

    fn like(other: &Tensor, fill: f32) -> Self {
        Tensor {
            storage: Rc::new(Storage::filled(other.numel(), fill)),
            offset: 0,
            sizes: other.sizes.clone(),
            strides: shape::contiguous_strides(&other.sizes),
            requires_grad: false,
            grad: None,
            grad_fn: None,
        }
    }

    /// New handle onto the same storage and layout.
    ///
    /// Autograd metadata (flag, gradient, grad fn) is not carried over.
    pub fn alias(&self) -> Self {
        Tensor {
            storage: Rc::clone(&self.storage),
            offset: self.offset,
            sizes: self.sizes.clone(),
            strides: self.strides.clone(),
            requires_grad: false,
            grad: None,
            grad_fn: None,
        }
    }

    // === Introspection ===

    pub fn ndim(&self) -> usize {
        self.sizes.len()
    }

    pub fn numel(&self) -> usize {
        self.sizes.iter().product()
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_contiguous(&self) -> bool {
        shape::is_contiguous(&self.sizes, &self.strides)
    }

    /// Storage cells starting at this view's offset.
    ///
    /// Only meaningful as a flat row-major buffer when the view is contiguous.
    pub fn data(&self) -> &[Cell<f32>] {
        &self.storage.cells()[self.offset..]
    }

    /// The shared storage handle.
    pub fn storage_ptr(&self) -> &Rc<Storage> {
        &self.storage
    }

    /// True if both tensors view the same underlying buffer.
    pub fn shares_storage(&self, other: &Tensor) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    // === Indexing ===

    /// Validate `indices` and resolve them to a storage position.
    fn storage_index(&self, op: &'static str, indices: &[usize]) -> Result<usize> {
        ensure!(
            indices.len() == self.ndim(),
            Shape,
            op,
            "expected {} indices, got {}",
            self.ndim(),
            indices.len()
        );
        for (dim, (&idx, &size)) in indices.iter().zip(self.sizes.iter()).enumerate() {
            ensure!(
                idx < size,
                Range,
                op,
                "index {idx} out of range for dimension {dim} with size {size}"
            );
        }

        let linear = shape::linear_index(self.offset, &self.strides, indices)?;
        ensure!(
            linear < self.storage.len(),
            Range,
            op,
            "linear index {linear} outside storage of {} elements",
            self.storage.len()
        );
        Ok(linear)
    }

    /// Storage position for an index tuple already known to be in range.
    pub(crate) fn linear_unchecked(&self, indices: &[usize]) -> usize {
        self.offset
            + indices
                .iter()
                .zip(self.strides.iter())
                .map(|(i, s)| i * s)
                .sum::<usize>()
    }

    /// Read the element at `indices`.
    pub fn at(&self, indices: &[usize]) -> Result<f32> {
        let linear = self.storage_index("at", indices)?;
        Ok(self.storage.get(linear))
    }

    /// Cell of the element at `indices`.
    ///
    /// Writing through the cell is visible through every view of the storage.
    pub fn at_mut(&self, indices: &[usize]) -> Result<&Cell<f32>> {
        let linear = self.storage_index("at_mut", indices)?;
        Ok(&self.storage.cells()[linear])
    }

    /// Write `value` at `indices`.
    pub fn set(&self, indices: &[usize], value: f32) -> Result<()> {
        let linear = self.storage_index("set", indices)?;
        self.storage.set(linear, value);
        Ok(())
    }

    /// Set every element addressed by this view to `value`.
    ///
    /// Elements of the storage outside the view are untouched.
    pub fn fill(&self, value: f32) {
        for idx in self.indices() {
            self.storage.set(self.linear_unchecked(&idx), value);
        }
    }
}
