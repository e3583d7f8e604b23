//! Integration tests for the scalar backward pass.
//!
//! Composed expressions are checked against closed-form derivatives and
//! against central finite differences at random points.

use ad_scalar::{finite_diff_grad, graph_grad, log, max_grad_error, ErrorKind, Result, Value};
use approx::assert_abs_diff_eq;
use rand::Rng;

// ============================================================================
// Closed-form checks
// ============================================================================

#[test]
fn test_polynomial_value_and_grad() {
    let x = Value::new(3.0);
    let y = &x * &x;
    let z = &y + &x;
    z.backward();

    assert_abs_diff_eq!(z.value(), 12.0, epsilon = 1e-12);
    assert_abs_diff_eq!(x.grad(), 7.0, epsilon = 1e-12);
    // Intermediate node holds dz/dy.
    assert_abs_diff_eq!(y.grad(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_diamond_accumulates_both_paths() {
    let x = Value::new(10.0);
    let b = &x * &Value::new(2.0);
    let c = &x * &Value::new(3.0);
    let l = &b + &c;
    l.backward();

    assert_abs_diff_eq!(x.grad(), 5.0, epsilon = 1e-12);
}

#[test]
fn test_log_of_square() {
    let x = Value::new(4.0);
    let f = log(&(&x * &x)).unwrap();
    f.backward();

    assert_abs_diff_eq!(f.value(), 16.0_f64.ln(), epsilon = 1e-12);
    assert_abs_diff_eq!(x.grad(), 0.5, epsilon = 1e-12);
}

#[test]
fn test_softplus_like() {
    // f = log(1 + exp(x)), df/dx = sigmoid(x)
    let x = Value::new(0.7);
    let f = (Value::constant(1.0) + x.exp()).log().unwrap();
    f.backward();

    let sigmoid = 1.0 / (1.0 + (-0.7_f64).exp());
    assert_abs_diff_eq!(x.grad(), sigmoid, epsilon = 1e-12);
}

#[test]
fn test_wide_fan_out() {
    // x feeds 50 products; every product is summed.
    let x = Value::new(2.0);
    let mut total = Value::constant(0.0);
    for k in 1..=50 {
        total = &total + &(&x * &Value::constant(k as f64));
    }
    total.backward();

    assert_abs_diff_eq!(x.grad(), (1..=50).sum::<i32>() as f64, epsilon = 1e-9);
    assert_eq!(total.topological_order().len(), 1 + 1 + 50 * 3);
}

#[test]
fn test_zero_grad_graph_allows_rerun() {
    let x = Value::new(1.5);
    let y = (&x * &x).exp();
    y.backward();
    let first = x.grad();

    y.backward();
    assert_abs_diff_eq!(x.grad(), 2.0 * first, epsilon = 1e-12);

    y.zero_grad_graph();
    y.backward();
    assert_abs_diff_eq!(x.grad(), first, epsilon = 1e-12);
}

#[test]
fn test_log_domain_error_aborts_construction() {
    let x = Value::new(1.0);
    let zero = &x - &x;
    let err = zero.log().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);
    assert!(err.to_string().contains("log"));
}

// ============================================================================
// Randomized finite-difference checks
// ============================================================================

fn mixed_expression(v: &[Value]) -> Result<Value> {
    let (x, y) = (&v[0], &v[1]);
    // exp(x) * log(y) + relu(x*y) / (y + 2) - x
    let lhs = x.exp() * y.log()?;
    let rhs = (x * y).relu() / (y + &Value::constant(2.0));
    Ok(lhs + rhs - x)
}

#[test]
fn test_random_points_match_finite_differences() {
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let x: f64 = rng.gen_range(-2.0..2.0);
        let y: f64 = rng.gen_range(0.5..3.0);
        // Keep away from the relu kink at x*y = 0.
        if (x * y).abs() < 1e-3 {
            continue;
        }

        let exact = graph_grad(mixed_expression, &[x, y]).unwrap();
        let numeric = finite_diff_grad(mixed_expression, &[x, y], 1e-6).unwrap();
        let err = max_grad_error(&exact, &numeric);
        assert!(
            err < 1e-5,
            "mismatch at ({x}, {y}): autodiff={exact:?}, fd={numeric:?}"
        );
    }
}
