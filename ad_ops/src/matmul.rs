//! Dense 2-D matrix multiplication.

use ad_error::{ensure, Result};
use ad_strided::Tensor;
use log::debug;

/// (M, K) @ (K, N) -> (M, N).
///
/// Both operands must be rank 2 (a precondition error otherwise) and the
/// inner dimensions must agree (a shape error otherwise).
pub fn matmul(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    ensure!(
        a.ndim() == 2,
        Precondition,
        "matmul",
        "left operand must be rank 2, got rank {}",
        a.ndim()
    );
    ensure!(
        b.ndim() == 2,
        Precondition,
        "matmul",
        "right operand must be rank 2, got rank {}",
        b.ndim()
    );

    let (m, k) = (a.sizes()[0], a.sizes()[1]);
    let (k2, n) = (b.sizes()[0], b.sizes()[1]);
    ensure!(
        k == k2,
        Shape,
        "matmul",
        "inner dimensions differ: {:?} @ {:?}",
        a.sizes(),
        b.sizes()
    );
    debug!("matmul: [{m}, {k}] @ [{k}, {n}]");

    // Row-major logical copies, valid for any strides.
    let lhs = a.to_vec();
    let rhs = b.to_vec();

    let mut out = vec![0.0f32; m * n];
    for i in 0..m {
        for l in 0..k {
            let x = lhs[i * k + l];
            let row = &rhs[l * n..(l + 1) * n];
            for (acc, &y) in out[i * n..(i + 1) * n].iter_mut().zip(row) {
                *acc += x * y;
            }
        }
    }
    Tensor::from_vec(out, &[m, n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_error::ErrorKind;
    use approx::assert_abs_diff_eq;

    fn naive(a: &Tensor, b: &Tensor) -> Vec<f32> {
        let (m, k, n) = (a.sizes()[0], a.sizes()[1], b.sizes()[1]);
        let mut out = Vec::with_capacity(m * n);
        for i in 0..m {
            for j in 0..n {
                let mut sum = 0.0;
                for l in 0..k {
                    sum += a.at(&[i, l]).unwrap() * b.at(&[l, j]).unwrap();
                }
                out.push(sum);
            }
        }
        out
    }

    #[test]
    fn test_matmul_2x3_3x2() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        let b = Tensor::from_vec(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], &[3, 2]).unwrap();
        let c = matmul(&a, &b).unwrap();

        assert_eq!(c.sizes(), &[2, 2]);
        assert!(c.is_contiguous());
        assert_eq!(c.to_vec(), vec![58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_matmul_identity() {
        let a = Tensor::arange(9).unwrap().reshape(&[3, 3]).unwrap();
        let eye = Tensor::zeros(&[3, 3]).unwrap();
        for i in 0..3 {
            eye.set(&[i, i], 1.0).unwrap();
        }
        assert_eq!(matmul(&a, &eye).unwrap(), a);
        assert_eq!(matmul(&eye, &a).unwrap(), a);
    }

    #[test]
    fn test_matmul_transposed_operands() {
        let a = Tensor::arange(6).unwrap().reshape(&[2, 3]).unwrap();
        let at = a.transpose(0, 1).unwrap();
        assert!(!at.is_contiguous());

        // a^T a is 3x3, a a^T is 2x2
        let ata = matmul(&at, &a).unwrap();
        let aat = matmul(&a, &at).unwrap();
        assert_eq!(ata.sizes(), &[3, 3]);
        assert_eq!(aat.to_vec(), vec![5.0, 14.0, 14.0, 50.0]);
        for (got, want) in ata.to_vec().iter().zip(naive(&at, &a)) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_matmul_sliced_operand() {
        let a = Tensor::arange(12).unwrap().reshape(&[3, 4]).unwrap();
        let cols = a.slice(1, 1, 2).unwrap(); // [3, 2], row stride 4
        let b = Tensor::ones(&[2, 1]).unwrap();
        let c = matmul(&cols, &b).unwrap();
        assert_eq!(c.to_vec(), vec![3.0, 11.0, 19.0]);
    }

    #[test]
    fn test_matmul_rank_precondition() {
        let v = Tensor::ones(&[3]).unwrap();
        let m = Tensor::ones(&[3, 3]).unwrap();
        let err = matmul(&v, &m).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(err.op(), "matmul");
        assert_eq!(matmul(&m, &v).unwrap_err().kind(), ErrorKind::Precondition);

        let cube = Tensor::ones(&[2, 2, 2]).unwrap();
        assert_eq!(matmul(&cube, &m).unwrap_err().kind(), ErrorKind::Precondition);
    }

    #[test]
    fn test_matmul_inner_dimension_mismatch() {
        let a = Tensor::ones(&[2, 3]).unwrap();
        let b = Tensor::ones(&[2, 3]).unwrap();
        assert_eq!(matmul(&a, &b).unwrap_err().kind(), ErrorKind::Shape);
    }
}
