//! Row-major traversal of tensor index tuples.

use crate::tensor::Tensor;

/// Advance `idx` to the next row-major index tuple within `sizes`.
///
/// Works like an odometer: the last index increments and carries into
/// earlier dimensions on overflow. Returns `false` once the first dimension
/// overflows, leaving `idx` back at all zeros.
pub fn next_index(idx: &mut [usize], sizes: &[usize]) -> bool {
    for d in (0..sizes.len()).rev() {
        idx[d] += 1;
        if idx[d] < sizes[d] {
            return true;
        }
        idx[d] = 0;
    }
    false
}

/// Iterator over every index tuple of a shape, in row-major order.
///
/// A rank-0 shape yields exactly one empty tuple.
pub struct Indices<'a> {
    sizes: &'a [usize],
    current: Vec<usize>,
    done: bool,
}

impl<'a> Indices<'a> {
    pub fn new(sizes: &'a [usize]) -> Self {
        Indices {
            sizes,
            current: vec![0; sizes.len()],
            done: false,
        }
    }
}

impl Iterator for Indices<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.current.clone();
        self.done = !next_index(&mut self.current, self.sizes);
        Some(result)
    }
}

impl Tensor {
    /// Every valid index tuple of this tensor, in row-major order.
    pub fn indices(&self) -> Indices<'_> {
        Indices::new(&self.sizes)
    }

    /// Logical values in row-major order.
    pub fn to_vec(&self) -> Vec<f32> {
        self.indices()
            .map(|idx| self.storage.get(self.linear_unchecked(&idx)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_index_carries() {
        let sizes = [2, 3];
        let mut idx = vec![0, 2];
        assert!(next_index(&mut idx, &sizes));
        assert_eq!(idx, vec![1, 0]);

        let mut idx = vec![1, 2];
        assert!(!next_index(&mut idx, &sizes));
        assert_eq!(idx, vec![0, 0]);
    }

    #[test]
    fn test_indices_row_major() {
        let sizes = [2, 2, 2];
        let all: Vec<Vec<usize>> = Indices::new(&sizes).collect();
        assert_eq!(all.len(), 8);
        assert_eq!(all[0], vec![0, 0, 0]);
        assert_eq!(all[1], vec![0, 0, 1]);
        assert_eq!(all[2], vec![0, 1, 0]);
        assert_eq!(all[7], vec![1, 1, 1]);
    }

    #[test]
    fn test_indices_scalar() {
        let all: Vec<Vec<usize>> = Indices::new(&[]).collect();
        assert_eq!(all, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_to_vec_follows_view() {
        let t = Tensor::arange(6).unwrap().reshape(&[2, 3]).unwrap();
        assert_eq!(t.to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let tt = t.transpose(0, 1).unwrap();
        assert_eq!(tt.to_vec(), vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
    }
}
