//! CLI demo for the strided tensor and scalar autodiff crates.
//!
//! Walks through zero-copy views, materialization, the elementwise and matmul
//! kernels, and scalar backward passes validated against finite differences.
//! Set `RUST_LOG=debug` (or `trace`) to see the library logging.

use std::process::ExitCode;

use ad_error::Result;
use ad_scalar::{finite_diff_grad, graph_grad, max_grad_error, Value};
use ad_strided::Tensor;
use log::{error, info};

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("demo aborted: {err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<bool> {
    tensor_demo()?;
    ops_demo()?;
    scalar_demo()
}

fn tensor_demo() -> Result<()> {
    println!("=== Strided Tensor Views ===\n");

    let a = Tensor::arange(12)?.reshape(&[3, 4])?;
    println!("a = arange(12).reshape([3, 4])");
    println!("  sizes {:?}, strides {:?}", a.sizes(), a.strides());

    let t = a.transpose(0, 1)?;
    println!("t = a.transpose(0, 1)");
    println!(
        "  sizes {:?}, strides {:?}, contiguous: {}",
        t.sizes(),
        t.strides(),
        t.is_contiguous()
    );

    let s = t.slice(0, 1, 2)?;
    println!("s = t.slice(0, 1, 2)");
    println!(
        "  sizes {:?}, strides {:?}, offset {}",
        s.sizes(),
        s.strides(),
        s.offset()
    );
    println!("  values {:?}", s.to_vec());

    s.set(&[0, 0], 100.0)?;
    println!("s[0, 0] = 100  ->  a[0, 1] = {}", a.at(&[0, 1])?);
    println!("  a, t and s share storage: {}", a.shares_storage(&s) && t.shares_storage(&s));

    match t.reshape(&[12]) {
        Ok(_) => println!("t.reshape([12]) unexpectedly succeeded"),
        Err(err) => println!("t.reshape([12]) -> {err}"),
    }

    let c = t.contiguous();
    let flat = c.reshape(&[12])?;
    println!("t.contiguous().reshape([12])");
    println!("  values {:?}", flat.to_vec());
    println!("  shares storage with a: {}\n", c.shares_storage(&a));
    Ok(())
}

fn ops_demo() -> Result<()> {
    println!("=== Tensor Ops ===\n");

    let a = Tensor::from_vec(vec![1.0, -2.0, 3.0, -4.0, 5.0, -6.0], &[2, 3])?;
    let b = Tensor::ones(&[2, 3])?;
    println!("a = {:?}", a.to_vec());
    println!("relu(a)      = {:?}", ad_ops::relu(&a)?.to_vec());
    println!("a + 1        = {:?}", ad_ops::add(&a, &b)?.to_vec());
    println!("a * a        = {:?}", ad_ops::mul(&a, &a)?.to_vec());

    let gram = ad_ops::matmul(&a, &a.transpose(0, 1)?)?;
    println!("a @ a^T      = {:?} (sizes {:?})", gram.to_vec(), gram.sizes());

    if let Err(err) = ad_ops::matmul(&a, &b) {
        println!("a @ b        -> {err}");
    }
    println!();
    Ok(())
}

/// z = exp(x) * log(y) + relu(x*y) / (y + 2)
fn expression(v: &[Value]) -> Result<Value> {
    let (x, y) = (&v[0], &v[1]);
    Ok(x.exp() * y.log()? + (x * y).relu() / (y + &Value::constant(2.0)))
}

fn scalar_demo() -> Result<bool> {
    println!("=== Scalar Reverse-Mode Autodiff ===\n");

    println!("1. z = x*x + x");
    let x = Value::new(3.0);
    let z = &(&x * &x) + &x;
    z.backward();
    println!("   At x = 3.0: z = {} (expected 12), dz/dx = {} (expected 7)\n", z.value(), x.grad());

    println!("2. Diamond: L = x*2 + x*3");
    let x = Value::new(10.0);
    let l = &x * &Value::constant(2.0) + &x * &Value::constant(3.0);
    l.backward();
    println!("   At x = 10.0: L = {}, dL/dx = {} (expected 5)\n", l.value(), x.grad());

    println!("3. f = log(x*x)");
    let x = Value::new(4.0);
    let f = (&x * &x).log()?;
    f.backward();
    println!("   At x = 4.0: f = {:.10}, df/dx = {} (expected 0.5)\n", f.value(), x.grad());

    println!("4. z = exp(x) * log(y) + relu(x*y) / (y + 2)");
    let point = [0.5, 2.0];
    let exact = graph_grad(expression, &point)?;
    let numeric = finite_diff_grad(expression, &point, 1e-7)?;
    println!("   At x = {}, y = {}:", point[0], point[1]);
    println!("   autodiff: dz/dx = {:.10}, dz/dy = {:.10}", exact[0], exact[1]);
    println!("   fd:       dz/dx = {:.10}, dz/dy = {:.10}", numeric[0], numeric[1]);

    let max_err = max_grad_error(&exact, &numeric);
    let tolerance = 1e-5;
    info!("gradient check: max error {max_err:.2e}, tolerance {tolerance:.2e}");
    if max_err < tolerance {
        println!("\nPASS: Max error ({max_err:.2e}) < tolerance ({tolerance:.2e})");
        Ok(true)
    } else {
        println!("\nFAIL: Max error ({max_err:.2e}) >= tolerance ({tolerance:.2e})");
        Ok(false)
    }
}
