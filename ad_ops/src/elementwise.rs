//! Same-shape elementwise kernels.

use ad_error::{ensure, Result};
use ad_strided::Tensor;
use log::trace;

/// Apply `op` to every pair of logically aligned elements.
fn binary_op<F>(name: &'static str, a: &Tensor, b: &Tensor, op: F) -> Result<Tensor>
where
    F: Fn(f32, f32) -> f32,
{
    ensure!(
        a.sizes() == b.sizes(),
        Shape,
        name,
        "operand sizes differ: {:?} vs {:?}",
        a.sizes(),
        b.sizes()
    );
    trace!("{name}: sizes {:?}", a.sizes());

    let data: Vec<f32> = a
        .to_vec()
        .into_iter()
        .zip(b.to_vec())
        .map(|(x, y)| op(x, y))
        .collect();
    Tensor::from_vec(data, a.sizes())
}

fn unary_op<F>(x: &Tensor, op: F) -> Result<Tensor>
where
    F: Fn(f32) -> f32,
{
    let data: Vec<f32> = x.to_vec().into_iter().map(op).collect();
    Tensor::from_vec(data, x.sizes())
}

pub fn add(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    binary_op("add", a, b, |x, y| x + y)
}

pub fn sub(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    binary_op("sub", a, b, |x, y| x - y)
}

/// Elementwise (Hadamard) product.
pub fn mul(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    binary_op("mul", a, b, |x, y| x * y)
}

/// max(0, x) per element.
pub fn relu(x: &Tensor) -> Result<Tensor> {
    unary_op(x, |v| v.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_error::ErrorKind;

    fn t(values: &[f32], sizes: &[usize]) -> Tensor {
        Tensor::from_vec(values.to_vec(), sizes).unwrap()
    }

    #[test]
    fn test_add_sub_mul() {
        let a = t(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let b = t(&[10.0, 20.0, 30.0, 40.0], &[2, 2]);

        assert_eq!(add(&a, &b).unwrap().to_vec(), vec![11.0, 22.0, 33.0, 44.0]);
        assert_eq!(sub(&b, &a).unwrap().to_vec(), vec![9.0, 18.0, 27.0, 36.0]);
        assert_eq!(mul(&a, &b).unwrap().to_vec(), vec![10.0, 40.0, 90.0, 160.0]);
    }

    #[test]
    fn test_result_is_fresh_and_contiguous() {
        let a = t(&[1.0, 2.0], &[2]);
        let c = add(&a, &a).unwrap();
        assert!(c.is_contiguous());
        assert!(!c.shares_storage(&a));
        assert_eq!(c.sizes(), &[2]);
        // Inputs untouched.
        assert_eq!(a.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_relu() {
        let x = t(&[-1.0, 0.0, 2.5, -0.5], &[4]);
        assert_eq!(relu(&x).unwrap().to_vec(), vec![0.0, 0.0, 2.5, 0.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = t(&[1.0; 6], &[2, 3]);
        let b = t(&[1.0; 6], &[3, 2]);
        for result in [add(&a, &b), sub(&a, &b), mul(&a, &b)] {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::Shape);
        }
        assert_eq!(add(&a, &b).unwrap_err().op(), "add");
    }

    #[test]
    fn test_non_contiguous_operands() {
        // a^T + a^T read through strides, not storage order.
        let a = t(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let at = a.transpose(0, 1).unwrap();
        let c = add(&at, &at).unwrap();
        assert_eq!(c.sizes(), &[3, 2]);
        assert_eq!(c.to_vec(), vec![2.0, 8.0, 4.0, 10.0, 6.0, 12.0]);

        let col = a.slice(1, 1, 2).unwrap();
        let r = relu(&sub(&col, &t(&[3.0, 3.0, 3.0, 3.0], &[2, 2])).unwrap()).unwrap();
        assert_eq!(r.to_vec(), vec![0.0, 0.0, 2.0, 3.0]);
    }

    #[test]
    fn test_scalar_tensors() {
        let c = mul(&Tensor::scalar(3.0), &Tensor::scalar(-2.0)).unwrap();
        assert_eq!(c.ndim(), 0);
        assert_eq!(c.at(&[]).unwrap(), -6.0);
    }
}
