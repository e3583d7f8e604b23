//! Reverse-mode automatic differentiation over the scalar graph.
//!
//! The backward pass:
//! 1. Builds a topological ordering of nodes reachable from the output
//!    (iterative post-order DFS, memoized by node id)
//! 2. Seeds the output gradient with 1.0
//! 3. Walks the ordering in reverse, letting each node push its gradient
//!    into its parents via the chain rule
//!
//! Gradients accumulate in the nodes. A second backward pass over the same
//! graph adds on top of the first unless [`Value::zero_grad_graph`] is called
//! in between.

use std::collections::HashSet;

use log::debug;

use crate::node::{NodeId, Op, Value};

/// Post-order of every node reachable from `root`: each node appears after
/// all of its parents, and `root` is last.
///
/// Uses an explicit stack so graph depth is not limited by the call stack.
pub fn topological_order(root: &Value) -> Vec<Value> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut order = Vec::new();
    // (node, parents_pushed)
    let mut stack: Vec<(Value, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        if !visited.insert(node.id()) {
            continue;
        }

        stack.push((node.clone(), true));
        // Reverse so the first parent is explored first.
        for parent in node.parents().iter().rev() {
            if !visited.contains(&parent.id()) {
                stack.push((parent.clone(), false));
            }
        }
    }

    order
}

/// Push `node`'s accumulated gradient into its parents.
fn propagate(node: &Value) {
    let g = node.grad();
    let parents = node.parents();

    match node.op() {
        Op::Leaf | Op::Const => {}

        Op::Add => {
            // d(a+b)/da = 1, d(a+b)/db = 1
            parents[0].accumulate(g);
            parents[1].accumulate(g);
        }

        Op::Sub => {
            // d(a-b)/da = 1, d(a-b)/db = -1
            parents[0].accumulate(g);
            parents[1].accumulate(-g);
        }

        Op::Mul => {
            // d(ab)/da = b, d(ab)/db = a
            let (a, b) = (parents[0].value(), parents[1].value());
            parents[0].accumulate(b * g);
            parents[1].accumulate(a * g);
        }

        Op::Div => {
            // d(a/b)/da = 1/b, d(a/b)/db = -a/b^2
            let (a, b) = (parents[0].value(), parents[1].value());
            parents[0].accumulate(g / b);
            parents[1].accumulate(-a / (b * b) * g);
        }

        Op::Neg => parents[0].accumulate(-g),

        Op::Relu => {
            let mask = if parents[0].value() > 0.0 { 1.0 } else { 0.0 };
            parents[0].accumulate(mask * g);
        }

        Op::Exp => {
            // d(e^x)/dx = e^x, which is this node's own value
            parents[0].accumulate(node.value() * g);
        }

        Op::Log => parents[0].accumulate(g / parents[0].value()),
    }
}

impl Value {
    /// Run the backward pass with `self` as the output.
    ///
    /// Afterwards every reachable node's [`grad`](Value::grad) holds
    /// d(self)/d(node), added to whatever it held before.
    pub fn backward(&self) {
        let order = topological_order(self);
        debug!("backward: {} nodes reachable from {:?}", order.len(), self.id());

        self.set_grad(1.0);
        for node in order.iter().rev() {
            propagate(node);
        }
    }

    /// Reset the gradient of every node reachable from `self` to 0.
    pub fn zero_grad_graph(&self) {
        for node in topological_order(self) {
            node.zero_grad();
        }
    }

    /// Nodes reachable from `self` in dependency order (`self` last).
    pub fn topological_order(&self) -> Vec<Value> {
        topological_order(self)
    }
}
