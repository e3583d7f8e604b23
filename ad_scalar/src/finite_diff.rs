//! Numerical gradient checks for graph-building functions.
//!
//! A function under test takes one input node per coordinate and returns the
//! output node. [`graph_grad`] differentiates it with the backward pass,
//! [`finite_diff_grad`] with central differences, so the two can be compared.

use ad_error::Result;

use crate::node::Value;

/// Gradient of `f` at `point` via reverse-mode autodiff.
pub fn graph_grad<F>(f: F, point: &[f64]) -> Result<Vec<f64>>
where
    F: Fn(&[Value]) -> Result<Value>,
{
    let inputs: Vec<Value> = point.iter().map(|&v| Value::new(v)).collect();
    let output = f(&inputs)?;
    output.backward();
    Ok(inputs.iter().map(Value::grad).collect())
}

/// Gradient of `f` at `point` via central differences with step `eps`.
///
/// `(f(x + eps*e_i) - f(x - eps*e_i)) / (2*eps)` for each coordinate `i`.
pub fn finite_diff_grad<F>(f: F, point: &[f64], eps: f64) -> Result<Vec<f64>>
where
    F: Fn(&[Value]) -> Result<Value>,
{
    let eval = |at: &[f64]| -> Result<f64> {
        let inputs: Vec<Value> = at.iter().map(|&v| Value::new(v)).collect();
        Ok(f(&inputs)?.value())
    };

    let mut perturbed = point.to_vec();
    let mut grads = Vec::with_capacity(point.len());
    for i in 0..point.len() {
        perturbed[i] = point[i] + eps;
        let f_plus = eval(&perturbed)?;
        perturbed[i] = point[i] - eps;
        let f_minus = eval(&perturbed)?;
        perturbed[i] = point[i];

        grads.push((f_plus - f_minus) / (2.0 * eps));
    }
    Ok(grads)
}

/// Largest absolute coordinate difference between two gradients.
pub fn max_grad_error(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "gradient length mismatch");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
