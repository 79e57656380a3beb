//! A dense layer: a fixed-width slab of nodes sharing one activation.

use rand::Rng;

use crate::activation::Activation;
use crate::node::{Init, Node};
use crate::scalar::Float;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct Layer<F: Float> {
    nodes: Vec<Node<F>>,
    num_inputs: usize,
    activation: Activation,
}

impl<F: Float> Layer<F> {
    /// Creates a layer of `num_nodes` nodes, each with `num_inputs` weights.
    pub fn new<R: Rng + ?Sized>(
        num_inputs: usize,
        num_nodes: usize,
        activation: Activation,
        init: Init<F>,
        rng: &mut R,
    ) -> Result<Self> {
        if num_inputs == 0 || num_nodes == 0 {
            return Err(Error::InvalidConfig(format!(
                "layer needs at least one input and one node, got {num_inputs} inputs and {num_nodes} nodes"
            )));
        }

        let nodes = (0..num_nodes)
            .map(|_| Node::new(num_inputs, init, rng))
            .collect();

        Ok(Self {
            nodes,
            num_inputs,
            activation,
        })
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.num_inputs
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[inline]
    pub fn nodes(&self) -> &[Node<F>] {
        &self.nodes
    }

    #[inline]
    pub fn nodes_mut(&mut self) -> &mut [Node<F>] {
        &mut self.nodes
    }

    /// Forward pass for a single sample: each node's pre-activation is cached
    /// on the node and the activation applied on top.
    ///
    /// Shape contract: `input.len() == self.in_dim()`.
    pub fn forward(&mut self, input: &[F]) -> Vec<F> {
        debug_assert_eq!(input.len(), self.num_inputs);

        let mut output = Vec::with_capacity(self.nodes.len());
        for node in &mut self.nodes {
            let pre = node.forward(input);
            output.push(self.activation.forward(pre));
        }
        output
    }

    /// Backward pass that accumulates parameter gradients in each node and
    /// returns the downstream gradient (`dE/d(input)`).
    ///
    /// `upstream_grad` is `dE/d(output)` for this layer; the cached
    /// pre-activations from the matching forward call supply the activation
    /// derivative.
    pub fn accumulate(&mut self, input_activations: &[F], upstream_grad: &[F]) -> Vec<F> {
        debug_assert_eq!(input_activations.len(), self.num_inputs);
        debug_assert_eq!(upstream_grad.len(), self.nodes.len());

        let mut downstream = vec![F::zero(); self.num_inputs];
        for (node, &d_out) in self.nodes.iter_mut().zip(upstream_grad) {
            let signal = d_out * self.activation.grad(node.last_pre_activation());
            node.accumulate(input_activations, signal);
            for (d, &w) in downstream.iter_mut().zip(node.weights()) {
                *d += signal * w;
            }
        }
        downstream
    }

    /// Backward pass with immediate per-sample weight updates.
    ///
    /// The downstream gradient is computed from the pre-update weights, then
    /// each node steps by `-lr * signal * input`.
    pub fn update(
        &mut self,
        input_activations: &[F],
        upstream_grad: &[F],
        learning_rate: F,
    ) -> Vec<F> {
        debug_assert_eq!(input_activations.len(), self.num_inputs);
        debug_assert_eq!(upstream_grad.len(), self.nodes.len());

        let mut downstream = vec![F::zero(); self.num_inputs];
        for (node, &d_out) in self.nodes.iter_mut().zip(upstream_grad) {
            let signal = d_out * self.activation.grad(node.last_pre_activation());
            for (d, &w) in downstream.iter_mut().zip(node.weights()) {
                *d += signal * w;
            }
            node.update_direct(input_activations, -signal, learning_rate);
        }
        downstream
    }

    /// Sum over nodes of the squared batch-averaged accumulated gradients.
    pub fn grad_sumsq(&self, inv_batch: F) -> F {
        self.nodes.iter().map(|n| n.grad_sumsq(inv_batch)).sum()
    }

    /// Scales every accumulated gradient (global norm clipping).
    pub fn scale_grads(&mut self, clip_coef: F) {
        for node in &mut self.nodes {
            node.scale_grads(clip_coef);
        }
    }

    /// Zeroes all gradient accumulators before a batch.
    pub fn init_accumulators(&mut self) {
        self.clear_accumulators();
    }

    /// Zeroes all gradient accumulators.
    pub fn clear_accumulators(&mut self) {
        for node in &mut self.nodes {
            node.clear_accumulator();
        }
    }

    /// Applies each node's accumulated RMSProp step.
    pub fn apply_step(&mut self, learning_rate: F, inv_batch: F) {
        for node in &mut self.nodes {
            node.apply_step(learning_rate, inv_batch);
        }
    }

    /// Zeroes the RMSProp running averages of every node.
    pub fn reset_optimiser(&mut self) {
        for node in &mut self.nodes {
            node.reset_optimiser();
        }
    }

    /// Replaces non-finite parameters with zero; returns whether any node was
    /// affected.
    pub fn sanitise(&mut self) -> bool {
        let mut had_corruption = false;
        for node in &mut self.nodes {
            had_corruption |= node.sanitise();
        }
        had_corruption
    }

    /// Redraws every weight uniformly in `[-scale, scale]`.
    pub fn randomise<R: Rng + ?Sized>(&mut self, scale: F, rng: &mut R) {
        for node in &mut self.nodes {
            node.randomise(scale, rng);
        }
    }

    /// Redraws every weight with the Xavier/Glorot uniform limit for this
    /// layer's shape: `sqrt(6 / (fan_in + fan_out))`.
    pub fn init_xavier<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let fan = (self.num_inputs + self.nodes.len()) as f64;
        let limit = (crate::scalar::cast::<F>(6.0) / crate::scalar::cast::<F>(fan)).sqrt();
        self.randomise(limit, rng);
    }

    /// Adds sum-of-three-uniforms exploration noise to every weight.
    pub fn perturb<R: Rng + ?Sized>(&mut self, speed: F, rng: &mut R) {
        for node in &mut self.nodes {
            node.perturb(speed, rng);
        }
    }

    /// Moves this layer's weights towards another layer's by an exponential
    /// moving average with factor `alpha`.
    ///
    /// Shape contract: `other` has the same dimensions.
    pub fn smooth_update(&mut self, other: &Layer<F>, alpha: F) {
        debug_assert_eq!(self.nodes.len(), other.nodes.len());

        for (node, incoming) in self.nodes.iter_mut().zip(&other.nodes) {
            node.smooth_update(incoming.weights(), alpha);
        }
    }

    /// Copies out the per-node weight vectors.
    pub fn get_weights(&self) -> Vec<Vec<F>> {
        self.nodes.iter().map(|n| n.weights().to_vec()).collect()
    }

    /// Replaces the per-node weight vectors.
    ///
    /// Shape contract: one vector of `in_dim` weights per node.
    pub fn set_weights(&mut self, weights: &[Vec<F>]) {
        debug_assert_eq!(weights.len(), self.nodes.len());

        for (node, row) in self.nodes.iter_mut().zip(weights) {
            node.set_weights(row);
        }
    }
}
