//! Core data structures for the scalar computation graph.
//!
//! A graph is built from [`Value`] handles: reference-counted pointers to
//! nodes. Every arithmetic operation creates a new node holding the forward
//! result, the operand handles it was computed from, and an [`Op`] tag that
//! selects its backward rule. Forward value, parents and op never change after
//! construction; only the accumulated gradient does.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use ad_error::{ensure, Result};

/// Global counter for unique node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_node_id() -> u64 {
    NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Unique identifier for a node in the computation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u64);

/// The operation that produced a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Input value; receives gradient.
    Leaf,
    /// Constant; never receives gradient.
    Const,
    /// parents[0] + parents[1]
    Add,
    /// parents[0] - parents[1]
    Sub,
    /// parents[0] * parents[1]
    Mul,
    /// parents[0] / parents[1]
    Div,
    /// -parents[0]
    Neg,
    /// max(0, parents[0])
    Relu,
    /// exp(parents[0])
    Exp,
    /// ln(parents[0]), parents[0] > 0
    Log,
}

/// A node: forward value, accumulated gradient and the operands it came from.
pub(crate) struct Node {
    id: NodeId,
    op: Op,
    value: f64,
    grad: Cell<f64>,
    parents: Vec<Value>,
}

impl Drop for Node {
    // Unlink parents iteratively so dropping a long chain cannot overflow the stack.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.parents);
        while let Some(parent) = pending.pop() {
            if let Ok(mut node) = Rc::try_unwrap(parent.0) {
                pending.append(&mut node.parents);
            }
        }
    }
}

/// Handle to a node of the scalar graph.
///
/// Cloning is O(1) and shares the node; the same value may feed many
/// operations, which makes the graph a DAG rather than a tree. Not `Send`:
/// a graph and its gradients belong to one thread.
#[derive(Clone)]
pub struct Value(pub(crate) Rc<Node>);

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("id", &self.0.id)
            .field("op", &self.0.op)
            .field("value", &self.0.value)
            .field("grad", &self.0.grad.get())
            .field("parents", &self.0.parents.iter().map(|p| p.id()).collect::<Vec<_>>())
            .finish()
    }
}

impl Value {
    fn new_node(op: Op, value: f64, parents: Vec<Value>) -> Self {
        Value(Rc::new(Node {
            id: NodeId(next_node_id()),
            op,
            value,
            grad: Cell::new(0.0),
            parents,
        }))
    }

    /// Create an input node with gradient 0.
    pub fn new(value: f64) -> Self {
        Self::new_node(Op::Leaf, value, vec![])
    }

    /// Create a constant node. Backward rules never write into a constant.
    pub fn constant(value: f64) -> Self {
        Self::new_node(Op::Const, value, vec![])
    }

    // === Accessors ===

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn op(&self) -> Op {
        self.0.op
    }

    /// Forward value.
    pub fn value(&self) -> f64 {
        self.0.value
    }

    /// Accumulated gradient d(output)/d(self) from the last backward pass(es).
    pub fn grad(&self) -> f64 {
        self.0.grad.get()
    }

    pub fn parents(&self) -> &[Value] {
        &self.0.parents
    }

    /// True for nodes without a backward rule (inputs and constants).
    pub fn is_leaf(&self) -> bool {
        matches!(self.0.op, Op::Leaf | Op::Const)
    }

    /// Reset this node's gradient to 0.
    pub fn zero_grad(&self) {
        self.0.grad.set(0.0);
    }

    pub(crate) fn set_grad(&self, grad: f64) {
        self.0.grad.set(grad);
    }

    /// Add `delta` into the accumulated gradient (ignored for constants).
    pub(crate) fn accumulate(&self, delta: f64) {
        if self.0.op != Op::Const {
            self.0.grad.set(self.0.grad.get() + delta);
        }
    }

    /// True if both handles point at the same node.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // === Unary operations ===

    /// max(0, self)
    pub fn relu(&self) -> Value {
        Value::new_node(Op::Relu, self.value().max(0.0), vec![self.clone()])
    }

    /// e^self
    pub fn exp(&self) -> Value {
        Value::new_node(Op::Exp, self.value().exp(), vec![self.clone()])
    }

    /// ln(self); a domain error unless self > 0.
    pub fn log(&self) -> Result<Value> {
        let x = self.value();
        ensure!(x > 0.0, Domain, "log", "argument must be > 0, got {x}");
        Ok(Value::new_node(Op::Log, x.ln(), vec![self.clone()]))
    }

    fn binary(op: Op, value: f64, a: &Value, b: &Value) -> Value {
        Value::new_node(op, value, vec![a.clone(), b.clone()])
    }

    pub(crate) fn negate(a: &Value) -> Value {
        Value::new_node(Op::Neg, -a.value(), vec![a.clone()])
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::new(value)
    }
}

// === Free-function forms ===

pub fn add(a: &Value, b: &Value) -> Value {
    Value::binary(Op::Add, a.value() + b.value(), a, b)
}

pub fn sub(a: &Value, b: &Value) -> Value {
    Value::binary(Op::Sub, a.value() - b.value(), a, b)
}

pub fn mul(a: &Value, b: &Value) -> Value {
    Value::binary(Op::Mul, a.value() * b.value(), a, b)
}

/// a / b. Division by zero follows IEEE semantics (inf/NaN), it is not checked.
pub fn div(a: &Value, b: &Value) -> Value {
    Value::binary(Op::Div, a.value() / b.value(), a, b)
}

pub fn relu(x: &Value) -> Value {
    x.relu()
}

pub fn exp(x: &Value) -> Value {
    x.exp()
}

pub fn log(x: &Value) -> Result<Value> {
    x.log()
}

// === Operator overloads ===

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident) => {
        impl std::ops::$trait<&Value> for &Value {
            type Output = Value;

            fn $method(self, rhs: &Value) -> Value {
                $method(self, rhs)
            }
        }

        impl std::ops::$trait<Value> for &Value {
            type Output = Value;

            fn $method(self, rhs: Value) -> Value {
                $method(self, &rhs)
            }
        }

        impl std::ops::$trait<&Value> for Value {
            type Output = Value;

            fn $method(self, rhs: &Value) -> Value {
                $method(&self, rhs)
            }
        }

        impl std::ops::$trait<Value> for Value {
            type Output = Value;

            fn $method(self, rhs: Value) -> Value {
                $method(&self, &rhs)
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);
impl_binary_op!(Mul, mul);
impl_binary_op!(Div, div);

impl std::ops::Neg for &Value {
    type Output = Value;

    fn neg(self) -> Value {
        Value::negate(self)
    }
}

impl std::ops::Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        Value::negate(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_error::ErrorKind;

    #[test]
    fn test_forward_values() {
        let x = Value::new(2.0);
        let y = Value::new(4.0);

        assert_eq!((&x + &y).value(), 6.0);
        assert_eq!((&x - &y).value(), -2.0);
        assert_eq!((&x * &y).value(), 8.0);
        assert_eq!((&x / &y).value(), 0.5);
        assert_eq!((-&x).value(), -2.0);
        assert_eq!(Value::new(-3.0).relu().value(), 0.0);
        assert_eq!(x.relu().value(), 2.0);
        assert!((x.exp().value() - 2.0_f64.exp()).abs() < 1e-12);
        assert!((y.log().unwrap().value() - 4.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_operator_forms_agree() {
        let a = Value::new(3.0);
        let b = Value::new(5.0);
        let forms = [
            &a * &b,
            a.clone() * &b,
            &a * b.clone(),
            a.clone() * b.clone(),
            mul(&a, &b),
        ];
        for v in &forms {
            assert_eq!(v.value(), 15.0);
            assert_eq!(v.op(), Op::Mul);
            assert!(v.parents()[0].ptr_eq(&a));
            assert!(v.parents()[1].ptr_eq(&b));
        }
    }

    #[test]
    fn test_log_domain() {
        for x in [0.0, -1.0, f64::NAN] {
            let err = Value::new(x).log().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Domain);
            assert_eq!(err.op(), "log");
        }
    }

    #[test]
    fn test_new_node_state() {
        let x = Value::new(1.5);
        assert!(x.is_leaf());
        assert_eq!(x.grad(), 0.0);
        assert!(x.parents().is_empty());

        let y = x.exp();
        assert!(!y.is_leaf());
        assert_eq!(y.parents().len(), 1);
        assert_ne!(x.id(), y.id());
    }

    #[test]
    fn test_constant_ignores_accumulation() {
        let c = Value::constant(2.0);
        c.accumulate(5.0);
        assert_eq!(c.grad(), 0.0);

        let x = Value::new(2.0);
        x.accumulate(5.0);
        x.accumulate(1.0);
        assert_eq!(x.grad(), 6.0);
        x.zero_grad();
        assert_eq!(x.grad(), 0.0);
    }

    #[test]
    fn test_drop_long_chain() {
        let mut v = Value::new(0.0);
        for _ in 0..200_000 {
            v = &v + &Value::constant(1.0);
        }
        assert_eq!(v.value(), 200_000.0);
        drop(v);
    }
}
