//! # ad_scalar - Scalar reverse-mode automatic differentiation
//!
//! Every arithmetic operation on a [`Value`] computes its forward result
//! immediately and records the operands it came from. Calling
//! [`Value::backward`] on the final node (conventionally the loss) walks the
//! graph in reverse topological order and accumulates d(output)/d(node) into
//! every node's gradient.
//!
//! ## Quick Start
//!
//! ```
//! use ad_scalar::Value;
//!
//! let x = Value::new(3.0);
//! let y = &x * &x;  // x^2
//! let z = &y + &x;  // x^2 + x
//!
//! z.backward();
//! assert_eq!(z.value(), 12.0);
//! assert_eq!(x.grad(), 7.0); // 2x + 1
//! ```
//!
//! ## Supported Operations
//!
//! | Op | Forward | Local derivative |
//! |----|---------|------------------|
//! | `a + b` | a+b | 1, 1 |
//! | `a - b` | a-b | 1, -1 |
//! | `a * b` | a*b | b, a |
//! | `a / b` | a/b | 1/b, -a/b² |
//! | `-a` | -a | -1 |
//! | [`Value::relu`] | max(0, x) | 1 if x > 0 else 0 |
//! | [`Value::exp`] | eˣ | eˣ |
//! | [`Value::log`] | ln x (x > 0, else a domain error) | 1/x |
//!
//! ## Accumulation
//!
//! Gradients live in the nodes and only ever grow during backward. Running
//! `backward` twice on the same graph doubles the gradients of the inputs;
//! call [`Value::zero_grad_graph`] between passes.
//!
//! ## Graph Nodes
//!
//! Node storage is internal; the graph is only reachable through [`Value`]
//! handles and [`Value::parents`].
//!
//! ```compile_fail
//! use ad_scalar::Node;
//! ```

mod backward;
mod finite_diff;
mod node;

pub use ad_error::{Error, ErrorKind, Result};
pub use backward::topological_order;
pub use finite_diff::{finite_diff_grad, graph_grad, max_grad_error};
pub use node::{add, div, exp, log, mul, relu, sub, NodeId, Op, Value};
