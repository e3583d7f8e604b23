//! Gradient metadata carried by a tensor.
//!
//! No tensor operation records a graph yet: [`GradFn`] is the hook a caller
//! attaches by hand with [`Tensor::set_grad_fn`], and [`Tensor::backward`]
//! only seeds the gradient of a single-element tensor and runs that hook.

use std::rc::Rc;

use ad_error::{ensure, Error, ErrorKind, Result};
use log::debug;

use crate::tensor::Tensor;

/// Backward rule attached to a tensor produced by some operation.
pub trait GradFn {
    /// Propagate `grad_output` (dL/d(output)) to the operation's inputs.
    fn backward(&self, grad_output: &Tensor) -> Result<()>;

    /// Short name used in logs.
    fn name(&self) -> &'static str {
        "GradFn"
    }
}

impl Tensor {
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    pub fn set_requires_grad(&mut self, requires_grad: bool) {
        self.requires_grad = requires_grad;
    }

    pub fn has_grad(&self) -> bool {
        self.grad.is_some()
    }

    /// The accumulated gradient; a state error if none was allocated.
    pub fn grad(&self) -> Result<&Tensor> {
        self.grad.as_deref().ok_or_else(|| {
            Error::new(ErrorKind::State, "grad", "no gradient has been allocated")
        })
    }

    pub fn grad_mut(&mut self) -> Result<&mut Tensor> {
        self.grad.as_deref_mut().ok_or_else(|| {
            Error::new(ErrorKind::State, "grad_mut", "no gradient has been allocated")
        })
    }

    /// Fill an existing gradient with zeros. Does nothing if none is allocated.
    pub fn zero_grad(&mut self) {
        if let Some(grad) = &self.grad {
            grad.fill(0.0);
        }
    }

    /// Add `incoming` into the gradient, allocating zeros on first use.
    pub fn accumulate_grad(&mut self, incoming: &Tensor) -> Result<()> {
        ensure!(
            incoming.sizes() == self.sizes(),
            Shape,
            "accumulate_grad",
            "gradient of shape {:?} does not match tensor shape {:?}",
            incoming.sizes(),
            self.sizes()
        );

        if self.grad.is_none() {
            self.grad = Some(Box::new(Tensor::zeros_like(self)));
        }
        if let Some(grad) = &self.grad {
            ensure!(
                grad.sizes() == self.sizes(),
                State,
                "accumulate_grad",
                "stored gradient has shape {:?}, expected {:?}",
                grad.sizes(),
                self.sizes()
            );
            for idx in incoming.indices() {
                let dst = grad.linear_unchecked(&idx);
                let add = incoming.storage.get(incoming.linear_unchecked(&idx));
                grad.storage.set(dst, grad.storage.get(dst) + add);
            }
        }
        Ok(())
    }

    pub fn grad_fn(&self) -> Option<&Rc<dyn GradFn>> {
        self.grad_fn.as_ref()
    }

    pub fn set_grad_fn(&mut self, grad_fn: Rc<dyn GradFn>) {
        self.grad_fn = Some(grad_fn);
    }

    /// Start a backward pass from this tensor as the loss.
    ///
    /// Only single-element tensors are supported. The gradient is set to 1
    /// (allocated if needed) and the attached [`GradFn`], if any, is invoked
    /// with it. Calling this twice runs the hook twice; any accumulation the
    /// hook performs is not reset in between.
    pub fn backward(&mut self) -> Result<()> {
        ensure!(
            self.numel() == 1,
            Precondition,
            "backward",
            "backward is only supported for single-element tensors, got shape {:?}",
            self.sizes
        );

        if self.grad.is_none() {
            self.grad = Some(Box::new(Tensor::zeros_like(self)));
        }
        if let Some(grad) = &self.grad {
            grad.fill(1.0);
        }

        if let (Some(grad_fn), Some(grad)) = (&self.grad_fn, &self.grad) {
            debug!("backward: invoking {}", grad_fn.name());
            grad_fn.backward(grad)?;
        }
        Ok(())
    }
}
