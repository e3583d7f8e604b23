//! Flat element buffer shared by every view of a tensor.

use std::cell::Cell;
use std::fmt;

/// A fixed-length buffer of `f32` elements.
///
/// Storage is shared between views through `Rc<Storage>`; elements are
/// individually mutable through `Cell`, so a write through one view is
/// observed by all others. Neither `Send` nor `Sync`: one thread owns a
/// storage and all of its views.
///
/// No bounds checking happens here beyond the slice indexing itself; callers
/// (the tensor layer) validate indices first.
pub struct Storage {
    data: Box<[Cell<f32>]>,
}

impl Storage {
    /// Allocate `len` zero-initialised elements.
    pub fn new(len: usize) -> Self {
        Self::filled(len, 0.0)
    }

    /// Allocate `len` elements set to `value`.
    pub fn filled(len: usize, value: f32) -> Self {
        Storage {
            data: (0..len).map(|_| Cell::new(value)).collect(),
        }
    }

    /// Build storage from owned values.
    pub fn from_vec(values: Vec<f32>) -> Self {
        Storage {
            data: values.into_iter().map(Cell::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read the element at `index`.
    pub fn get(&self, index: usize) -> f32 {
        self.data[index].get()
    }

    /// Write the element at `index`.
    pub fn set(&self, index: usize, value: f32) {
        self.data[index].set(value);
    }

    /// Set every element to `value`.
    pub fn fill(&self, value: f32) {
        for cell in self.data.iter() {
            cell.set(value);
        }
    }

    /// Raw element cells.
    pub fn cells(&self) -> &[Cell<f32>] {
        &self.data
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage").field("len", &self.len()).finish()
    }
}
