//! Single neuron: weights, bias, optimiser state and gradient accumulator.
//!
//! The node is the only place the RMSProp-style numeric policy lives: the
//! gradient clip, the squared-average ceiling, the epsilon floor and the
//! effective-rate cap all sit in `apply_step`.

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::scalar::{cast, Float};

/// Weight initialisation strategy.
///
/// Xavier/Glorot re-initialisation is a layer-level operation
/// ([`crate::Layer::init_xavier`]) because its limits depend on the layer
/// shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init<F> {
    /// Fill every weight with the given constant.
    Constant(F),
    /// Draw every weight uniformly in `[-1, 1]`.
    Uniform,
}

const RMSPROP_DECAY: f64 = 0.9;
const RMSPROP_BLEND: f64 = 0.1;
const RMSPROP_EPSILON: f64 = 1e-6;
/// Ceiling on the squared-gradient running average.
const MAX_SQUARED_GRAD_AVG: f64 = 1e6;
/// Ceiling on the effective per-parameter learning rate.
const MAX_ADJUSTED_LR: f64 = 1.0;
/// Per-parameter gradient clip applied before the RMSProp update.
const GRADIENT_CLIP: f64 = 10.0;

/// A single neuron of a dense layer.
#[derive(Debug, Clone)]
pub struct Node<F: Float> {
    weights: Vec<F>,
    bias: F,
    squared_grad_avg: Vec<F>,
    bias_squared_grad_avg: F,
    grad_accum: Vec<F>,
    bias_grad_accum: F,
    last_pre_activation: F,
}

impl<F: Float> Node<F> {
    /// Creates a node with `num_inputs` weights, zero bias and zeroed
    /// optimiser state.
    pub fn new<R: Rng + ?Sized>(num_inputs: usize, init: Init<F>, rng: &mut R) -> Self {
        let weights = match init {
            Init::Constant(value) => vec![value; num_inputs],
            Init::Uniform => {
                let dist = Uniform::new_inclusive(-F::one(), F::one());
                (0..num_inputs).map(|_| dist.sample(rng)).collect()
            }
        };

        Self {
            weights,
            bias: F::zero(),
            squared_grad_avg: vec![F::zero(); num_inputs],
            bias_squared_grad_avg: F::zero(),
            grad_accum: vec![F::zero(); num_inputs],
            bias_grad_accum: F::zero(),
            last_pre_activation: F::zero(),
        }
    }

    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn weights(&self) -> &[F] {
        &self.weights
    }

    #[inline]
    pub fn bias(&self) -> F {
        self.bias
    }

    /// Replaces the weight vector.
    ///
    /// Shape contract: `weights.len() == self.num_inputs()`.
    #[inline]
    pub fn set_weights(&mut self, weights: &[F]) {
        debug_assert_eq!(weights.len(), self.weights.len());
        self.weights.copy_from_slice(weights);
    }

    /// Pre-activation cached by the most recent [`Node::forward`] call.
    #[inline]
    pub fn last_pre_activation(&self) -> F {
        self.last_pre_activation
    }

    /// Computes `w . input + bias`, caches it and returns it.
    ///
    /// The enclosing layer applies the activation.
    ///
    /// Shape contract: `input.len() == self.num_inputs()`.
    #[inline]
    pub fn forward(&mut self, input: &[F]) -> F {
        debug_assert_eq!(input.len(), self.weights.len());

        let mut sum = self.bias;
        for (&w, &x) in self.weights.iter().zip(input) {
            sum = w.mul_add(x, sum);
        }
        self.last_pre_activation = sum;
        sum
    }

    /// Accumulates the gradient contribution of one sample.
    ///
    /// `signal` is `dE/d(pre_activation)`; contributions add up across calls
    /// within the same batch.
    #[inline]
    pub fn accumulate(&mut self, input: &[F], signal: F) {
        debug_assert_eq!(input.len(), self.weights.len());

        for (g, &x) in self.grad_accum.iter_mut().zip(input) {
            *g += x * signal;
        }
        self.bias_grad_accum += signal;
    }

    /// Applies the accumulated gradient as one RMSProp step and resets the
    /// accumulator.
    ///
    /// Per parameter: clip the averaged gradient to `±10`, update the decayed
    /// squared-gradient average (ceiling `1e6`), derive the effective rate
    /// `lr / (sqrt(avg) + 1e-6)` capped at `1.0`, and step against the
    /// gradient.
    pub fn apply_step(&mut self, learning_rate: F, inv_batch: F) {
        let clip = cast::<F>(GRADIENT_CLIP);
        let decay = cast::<F>(RMSPROP_DECAY);
        let blend = cast::<F>(RMSPROP_BLEND);
        let epsilon = cast::<F>(RMSPROP_EPSILON);
        let max_avg = cast::<F>(MAX_SQUARED_GRAD_AVG);
        let max_lr = cast::<F>(MAX_ADJUSTED_LR);

        for i in 0..self.weights.len() {
            let gradient = (self.grad_accum[i] * inv_batch).min(clip).max(-clip);

            self.squared_grad_avg[i] =
                (decay * self.squared_grad_avg[i] + blend * gradient * gradient).min(max_avg);

            let adjusted_lr =
                (learning_rate / (self.squared_grad_avg[i].sqrt() + epsilon)).min(max_lr);

            self.weights[i] = self.weights[i] - adjusted_lr * gradient;
            self.grad_accum[i] = F::zero();
        }

        let bias_gradient = (self.bias_grad_accum * inv_batch).min(clip).max(-clip);
        self.bias_squared_grad_avg = (decay * self.bias_squared_grad_avg
            + blend * bias_gradient * bias_gradient)
            .min(max_avg);
        let bias_lr =
            (learning_rate / (self.bias_squared_grad_avg.sqrt() + epsilon)).min(max_lr);
        self.bias = self.bias - bias_lr * bias_gradient;
        self.bias_grad_accum = F::zero();
    }

    /// Immediate per-sample weight update: `w += lr * input * signal`.
    ///
    /// Used by the per-sample training mode, which passes the negated error
    /// signal so the step descends.
    #[inline]
    pub fn update_direct(&mut self, input: &[F], signal: F, learning_rate: F) {
        debug_assert_eq!(input.len(), self.weights.len());

        for (w, &x) in self.weights.iter_mut().zip(input) {
            *w += x * learning_rate * signal;
        }
    }

    /// Sum of squared, batch-averaged accumulated gradients.
    #[inline]
    pub fn grad_sumsq(&self, inv_batch: F) -> F {
        let mut sumsq = F::zero();
        for &g in &self.grad_accum {
            let scaled = g * inv_batch;
            sumsq = scaled.mul_add(scaled, sumsq);
        }
        sumsq
    }

    /// Scales every accumulated gradient in place (global norm clipping).
    #[inline]
    pub fn scale_grads(&mut self, clip_coef: F) {
        for g in &mut self.grad_accum {
            *g *= clip_coef;
        }
        self.bias_grad_accum *= clip_coef;
    }

    /// Zeroes the gradient accumulator.
    #[inline]
    pub fn clear_accumulator(&mut self) {
        for g in &mut self.grad_accum {
            *g = F::zero();
        }
        self.bias_grad_accum = F::zero();
    }

    /// Redraws every weight uniformly in `[-scale, scale]`. The bias is left
    /// untouched.
    pub fn randomise<R: Rng + ?Sized>(&mut self, scale: F, rng: &mut R) {
        let dist = Uniform::new_inclusive(-scale, scale);
        for w in &mut self.weights {
            *w = dist.sample(rng);
        }
    }

    /// Adds exploration noise to every weight: the sum of three independent
    /// uniform draws in `[-1, 1]`, multiplied by `3 * speed`.
    pub fn perturb<R: Rng + ?Sized>(&mut self, speed: F, rng: &mut R) {
        let dist = Uniform::new_inclusive(-F::one(), F::one());
        let three = cast::<F>(3.0);
        for w in &mut self.weights {
            let accum = dist.sample(rng) + dist.sample(rng) + dist.sample(rng);
            *w += three * accum * speed;
        }
    }

    /// Exponential moving average towards another node's weights:
    /// `w = (1 - alpha) * w + alpha * other`.
    #[inline]
    pub fn smooth_update(&mut self, incoming: &[F], alpha: F) {
        debug_assert_eq!(incoming.len(), self.weights.len());

        let alpha_inv = F::one() - alpha;
        for (w, &other) in self.weights.iter_mut().zip(incoming) {
            *w = alpha_inv * *w + alpha * other;
        }
    }

    /// Zeroes the RMSProp running averages.
    pub fn reset_optimiser(&mut self) {
        for avg in &mut self.squared_grad_avg {
            *avg = F::zero();
        }
        self.bias_squared_grad_avg = F::zero();
    }

    /// Replaces any non-finite weight or running average with zero.
    ///
    /// A corrupted weight also resets its own squared-gradient average so the
    /// optimiser does not immediately re-diverge. Returns whether anything was
    /// replaced.
    pub fn sanitise(&mut self) -> bool {
        let mut had_corruption = false;
        for i in 0..self.weights.len() {
            if !self.weights[i].is_finite() {
                self.weights[i] = F::zero();
                self.squared_grad_avg[i] = F::zero();
                had_corruption = true;
            } else if !self.squared_grad_avg[i].is_finite() {
                self.squared_grad_avg[i] = F::zero();
                had_corruption = true;
            }
        }
        if !self.bias.is_finite() {
            self.bias = F::zero();
            self.bias_squared_grad_avg = F::zero();
            had_corruption = true;
        } else if !self.bias_squared_grad_avg.is_finite() {
            self.bias_squared_grad_avg = F::zero();
            had_corruption = true;
        }
        had_corruption
    }

    #[cfg(test)]
    pub(crate) fn weights_mut(&mut self) -> &mut [F] {
        &mut self.weights
    }

    #[cfg(test)]
    pub(crate) fn squared_grad_avg(&self) -> &[F] {
        &self.squared_grad_avg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn node(weights: &[f32], bias: f32) -> Node<f32> {
        let mut rng = StdRng::seed_from_u64(0);
        let mut n = Node::new(weights.len(), Init::Constant(0.0), &mut rng);
        n.set_weights(weights);
        n.bias = bias;
        n
    }

    #[test]
    fn forward_caches_pre_activation() {
        let mut n = node(&[0.5, -1.0], 0.25);
        let out = n.forward(&[2.0, 1.0]);
        assert!((out - 0.25).abs() < 1e-6);
        assert_eq!(n.last_pre_activation(), out);
    }

    #[test]
    fn accumulate_is_additive_and_zero_signal_is_idempotent() {
        let mut n = node(&[0.0, 0.0], 0.0);
        n.accumulate(&[1.0, 2.0], 0.5);
        n.accumulate(&[1.0, 2.0], 0.5);
        n.accumulate(&[1.0, 2.0], 0.0);
        assert_eq!(n.grad_accum, vec![1.0, 2.0]);
        assert_eq!(n.bias_grad_accum, 1.0);
    }

    #[test]
    fn apply_step_matches_rmsprop_by_hand() {
        let mut n = node(&[0.0], 0.0);
        n.accumulate(&[1.0], 2.0);
        n.apply_step(0.1, 1.0);

        // g = 2, avg = 0.1 * 4 = 0.4, eta = 0.1 / (sqrt(0.4) + 1e-6)
        let eta = 0.1 / (0.4_f32.sqrt() + 1e-6);
        assert!((n.weights()[0] - (-eta * 2.0)).abs() < 1e-6);
        assert_eq!(n.grad_accum, vec![0.0]);
        assert_eq!(n.bias_grad_accum, 0.0);
    }

    #[test]
    fn apply_step_clips_extreme_gradients() {
        let mut n = node(&[0.0], 0.0);
        n.accumulate(&[1.0], 100.0);
        n.apply_step(1.0, 1.0);

        // Gradient clipped to 10 before squaring.
        let eta = (1.0 / (10.0_f32.sqrt() + 1e-6)).min(1.0);
        assert!((n.weights()[0] - (-eta * 10.0)).abs() < 1e-4);
    }

    #[test]
    fn apply_step_caps_effective_learning_rate() {
        let mut n = node(&[0.0], 0.0);
        n.accumulate(&[1.0], 1e-4);
        n.apply_step(1.0, 1.0);

        // sqrt(avg) is tiny, so the raw adjusted rate explodes; the cap keeps
        // the step at exactly lr_max * g.
        assert!((n.weights()[0] - (-1e-4)).abs() < 1e-8);
    }

    #[test]
    fn update_direct_moves_along_signal() {
        let mut n = node(&[1.0, 1.0], 0.0);
        n.update_direct(&[0.5, -0.5], 2.0, 0.1);
        assert!((n.weights()[0] - 1.1).abs() < 1e-6);
        assert!((n.weights()[1] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn uniform_init_stays_in_range_and_bias_is_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        let n: Node<f32> = Node::new(64, Init::Uniform, &mut rng);
        assert!(n.weights().iter().all(|w| (-1.0..=1.0).contains(w)));
        assert_eq!(n.bias(), 0.0);
    }

    #[test]
    fn perturb_changes_weights_within_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut n = node(&[0.0; 8], 0.0);
        n.perturb(0.1, &mut rng);
        // Each delta is 3 * speed * sum of three U[-1,1] draws.
        assert!(n.weights().iter().any(|&w| w != 0.0));
        assert!(n.weights().iter().all(|w| w.abs() <= 0.9 + 1e-6));
    }

    #[test]
    fn smooth_update_blends() {
        let mut n = node(&[1.0, 0.0], 0.0);
        n.smooth_update(&[0.0, 1.0], 0.25);
        assert!((n.weights()[0] - 0.75).abs() < 1e-6);
        assert!((n.weights()[1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn sanitise_zeroes_only_the_corrupt_entries() {
        let mut n = node(&[1.0, f32::NAN, 2.0], 0.0);
        n.squared_grad_avg[1] = 0.5;
        assert!(n.sanitise());
        assert_eq!(n.weights(), &[1.0, 0.0, 2.0]);
        assert_eq!(n.squared_grad_avg(), &[0.0, 0.0, 0.0]);

        // A clean node reports no corruption.
        assert!(!n.sanitise());
    }
}
