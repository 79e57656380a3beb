//! Multi-layer perceptron core.
//!
//! The network is an ordered sequence of dense layers. Forward passes cache
//! per-node pre-activations (so `forward` takes `&mut self`); backward passes
//! walk the layers in reverse, either updating weights immediately
//! (per-sample [`Mlp::train`]) or accumulating gradients for an RMSProp step
//! (mini-batch [`Mlp::train_batch`]).
//!
//! Shape mismatches at the public API surface return
//! [`Error::ShapeMismatch`]; the per-layer hot path relies on the widths
//! validated here.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::activation::Activation;
use crate::layer::Layer;
use crate::loss::{softmax, Loss};
use crate::node::Init;
use crate::scalar::{cast, Float};
use crate::{Error, Result};

/// Full weight snapshot: layer -> node -> weight.
pub type MlpWeights<F> = Vec<Vec<Vec<F>>>;

/// Training progress observer: receives `(iteration, epoch_loss)`.
///
/// Called every iteration by [`Mlp::train_batch`], and every 32nd iteration
/// plus once at the end by [`Mlp::train`]. A non-finite loss is reported like
/// any other; training is not aborted.
pub type ProgressFn<F> = Box<dyn FnMut(usize, F) + Send>;

/// A feed-forward multi-layer perceptron composed of dense layers.
pub struct Mlp<F: Float> {
    layers: Vec<Layer<F>>,
    num_inputs: usize,
    num_outputs: usize,
    loss: Loss,
    rng: StdRng,
    progress_callback: Option<ProgressFn<F>>,
}

impl<F: Float> Mlp<F> {
    /// Builds a network from adjacent layer sizes.
    ///
    /// `layer_sizes` includes the input and output widths, so it needs at
    /// least two entries; `activations` holds one entry per created layer
    /// (`layer_sizes.len() - 1`).
    pub fn new(
        layer_sizes: &[usize],
        activations: &[Activation],
        loss: Loss,
        init: Init<F>,
    ) -> Result<Self> {
        Self::build(layer_sizes, activations, loss, init, StdRng::from_entropy())
    }

    /// Like [`Mlp::new`] but with a deterministic RNG seed, for tests and
    /// reproducible experiments.
    pub fn new_with_seed(
        layer_sizes: &[usize],
        activations: &[Activation],
        loss: Loss,
        init: Init<F>,
        seed: u64,
    ) -> Result<Self> {
        Self::build(
            layer_sizes,
            activations,
            loss,
            init,
            StdRng::seed_from_u64(seed),
        )
    }

    fn build(
        layer_sizes: &[usize],
        activations: &[Activation],
        loss: Loss,
        init: Init<F>,
        mut rng: StdRng,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "a network needs an input width and an output width, got {} size(s)",
                layer_sizes.len()
            )));
        }
        if let Some(position) = layer_sizes.iter().position(|&size| size == 0) {
            return Err(Error::InvalidConfig(format!(
                "layer_sizes[{position}] is zero; every width must be at least 1"
            )));
        }
        if activations.len() != layer_sizes.len() - 1 {
            return Err(Error::InvalidConfig(format!(
                "{} layer(s) to build but {} activation(s) given",
                layer_sizes.len() - 1,
                activations.len()
            )));
        }

        let mut layers = Vec::with_capacity(layer_sizes.len() - 1);
        for (i, &activation) in activations.iter().enumerate() {
            layers.push(Layer::new(
                layer_sizes[i],
                layer_sizes[i + 1],
                activation,
                init,
                &mut rng,
            )?);
        }

        Ok(Self {
            layers,
            num_inputs: layer_sizes[0],
            num_outputs: *layer_sizes.last().expect("checked above"),
            loss,
            rng,
            progress_callback: None,
        })
    }

    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    #[inline]
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn num_hidden_layers(&self) -> usize {
        self.layers.len() - 1
    }

    #[inline]
    pub fn loss(&self) -> Loss {
        self.loss
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&Layer<F>> {
        self.layers.get(idx)
    }

    /// Installs a training progress observer.
    pub fn set_progress_callback(&mut self, callback: ProgressFn<F>) {
        self.progress_callback = Some(callback);
    }

    pub fn clear_progress_callback(&mut self) {
        self.progress_callback = None;
    }

    /// Forward pass for a single sample.
    ///
    /// When `for_inference` is true and the network was built with
    /// [`Loss::CategoricalCrossEntropy`] and has more than one output, the
    /// raw logits are replaced by their softmax.
    pub fn forward(&mut self, input: &[F], for_inference: bool) -> Result<Vec<F>> {
        self.check_input_width(input)?;
        Ok(self.forward_unchecked(input, None, for_inference))
    }

    /// Forward pass that also records each layer's *input* vector into
    /// `activations` (one entry per layer), as needed by the backward passes.
    pub fn forward_captured(
        &mut self,
        input: &[F],
        activations: &mut Vec<Vec<F>>,
        for_inference: bool,
    ) -> Result<Vec<F>> {
        self.check_input_width(input)?;
        activations.clear();
        Ok(self.forward_unchecked(input, Some(activations), for_inference))
    }

    fn check_input_width(&self, input: &[F]) -> Result<()> {
        if input.len() != self.num_inputs {
            return Err(Error::ShapeMismatch(format!(
                "input len {} does not match network input width {}",
                input.len(),
                self.num_inputs
            )));
        }
        Ok(())
    }

    fn forward_unchecked(
        &mut self,
        input: &[F],
        mut activations: Option<&mut Vec<Vec<F>>>,
        for_inference: bool,
    ) -> Vec<F> {
        let mut current = input.to_vec();
        for layer in &mut self.layers {
            if let Some(acts) = activations.as_mut() {
                acts.push(current.clone());
            }
            current = layer.forward(&current);
        }

        if for_inference && self.loss == Loss::CategoricalCrossEntropy && self.num_outputs > 1 {
            softmax(&mut current);
        }
        current
    }

    /// Per-sample training: every sample triggers an immediate weight update.
    ///
    /// Each iteration sweeps the whole set in order, accumulating the
    /// per-sample losses (each already scaled by `1 / n_samples`); the
    /// progress callback fires on every 32nd iteration and once at the end,
    /// and training stops early once the epoch loss drops below `min_cost`.
    ///
    /// Returns the final epoch loss.
    pub fn train(
        &mut self,
        features: &[Vec<F>],
        labels: &[Vec<F>],
        learning_rate: F,
        max_iterations: usize,
        min_cost: F,
    ) -> Result<F> {
        self.check_training_set(features, labels)?;

        let sample_scale = F::one() / cast::<F>(features.len() as f64);
        let mut activations: Vec<Vec<F>> = Vec::with_capacity(self.layers.len());
        let mut out_grad = vec![F::zero(); self.num_outputs];

        let mut epoch_loss = F::zero();
        let mut iter = 0;
        while iter < max_iterations {
            epoch_loss = F::zero();

            for (feature, label) in features.iter().zip(labels) {
                activations.clear();
                let output = self.forward_unchecked(feature, Some(&mut activations), false);
                let loss = self
                    .loss
                    .backward(label, &output, &mut out_grad, sample_scale);
                epoch_loss += loss;

                let mut grad = out_grad.clone();
                for (i, layer) in self.layers.iter_mut().enumerate().rev() {
                    grad = layer.update(&activations[i], &grad, learning_rate);
                }
            }

            epoch_loss *= sample_scale;

            if iter & 0x1F == 0 {
                if let Some(callback) = self.progress_callback.as_mut() {
                    callback(iter, epoch_loss);
                }
            }
            if epoch_loss < min_cost {
                break;
            }
            iter += 1;
        }

        if let Some(callback) = self.progress_callback.as_mut() {
            callback(iter, epoch_loss);
        }
        Ok(epoch_loss)
    }

    /// Mini-batch training with gradient accumulation, global-norm clipping
    /// and per-parameter RMSProp steps.
    ///
    /// Each iteration shuffles the sample order, partitions it into batches
    /// of `batch_size` (the last batch may be shorter), and for every batch:
    /// accumulates gradients with per-output scale `1.0`, clips the global
    /// gradient norm at `5.0`, then applies one averaged step. The progress
    /// callback fires every iteration.
    ///
    /// Returns the final epoch loss (mean of per-batch mean losses).
    pub fn train_batch(
        &mut self,
        features: &[Vec<F>],
        labels: &[Vec<F>],
        learning_rate: F,
        max_iterations: usize,
        batch_size: usize,
        min_cost: F,
    ) -> Result<F> {
        self.check_training_set(features, labels)?;
        if batch_size == 0 {
            return Err(Error::InvalidConfig(
                "cannot partition samples into batches of size 0".to_owned(),
            ));
        }

        let n_samples = features.len();
        let n_batches = n_samples.div_ceil(batch_size);
        let max_grad_norm = cast::<F>(5.0);

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut activations: Vec<Vec<F>> = Vec::with_capacity(self.layers.len());
        let mut out_grad = vec![F::zero(); self.num_outputs];

        let mut epoch_loss = F::zero();
        for iter in 0..max_iterations {
            epoch_loss = F::zero();
            indices.shuffle(&mut self.rng);

            let mut sample_idx = 0;
            for _ in 0..n_batches {
                let current_batch = batch_size.min(n_samples - sample_idx);
                let inv_batch = F::one() / cast::<F>(current_batch as f64);

                for layer in &mut self.layers {
                    layer.init_accumulators();
                }

                let mut batch_loss = F::zero();
                for _ in 0..current_batch {
                    let idx = indices[sample_idx];
                    sample_idx += 1;

                    activations.clear();
                    let output =
                        self.forward_unchecked(&features[idx], Some(&mut activations), false);
                    batch_loss +=
                        self.loss
                            .backward(&labels[idx], &output, &mut out_grad, F::one());

                    let mut grad = out_grad.clone();
                    for (i, layer) in self.layers.iter_mut().enumerate().rev() {
                        grad = layer.accumulate(&activations[i], &grad);
                    }
                }

                let grad_sumsq: F = self
                    .layers
                    .iter()
                    .map(|layer| layer.grad_sumsq(inv_batch))
                    .sum();
                let grad_norm = grad_sumsq.sqrt();
                if grad_norm > max_grad_norm {
                    let clip_coef = max_grad_norm / grad_norm;
                    for layer in &mut self.layers {
                        layer.scale_grads(clip_coef);
                    }
                }

                for layer in &mut self.layers {
                    layer.apply_step(learning_rate, inv_batch);
                }

                epoch_loss += batch_loss * inv_batch;
            }

            epoch_loss /= cast::<F>(n_batches as f64);

            if let Some(callback) = self.progress_callback.as_mut() {
                callback(iter, epoch_loss);
            }
            if epoch_loss < min_cost {
                break;
            }
        }

        Ok(epoch_loss)
    }

    /// Backpropagates a caller-supplied output gradient with immediate
    /// weight updates.
    ///
    /// Runs a (training-mode) forward pass for `input`, then walks the layers
    /// in reverse applying `-lr * signal * input` steps. Useful when the loss
    /// lives outside the network.
    pub fn apply_gradient(&mut self, input: &[F], out_grad: &[F], learning_rate: F) -> Result<()> {
        self.check_input_width(input)?;
        if out_grad.len() != self.num_outputs {
            return Err(Error::ShapeMismatch(format!(
                "gradient len {} does not match network output width {}",
                out_grad.len(),
                self.num_outputs
            )));
        }

        let mut activations: Vec<Vec<F>> = Vec::with_capacity(self.layers.len());
        let _ = self.forward_unchecked(input, Some(&mut activations), false);

        let mut grad = out_grad.to_vec();
        for (i, layer) in self.layers.iter_mut().enumerate().rev() {
            grad = layer.update(&activations[i], &grad, learning_rate);
        }
        Ok(())
    }

    fn check_training_set(&self, features: &[Vec<F>], labels: &[Vec<F>]) -> Result<()> {
        if features.is_empty() || labels.is_empty() {
            return Err(Error::EmptyInput("training set is empty".to_owned()));
        }
        if features.len() != labels.len() {
            return Err(Error::ShapeMismatch(format!(
                "feature count {} does not match label count {}",
                features.len(),
                labels.len()
            )));
        }
        for (i, feature) in features.iter().enumerate() {
            if feature.len() != self.num_inputs {
                return Err(Error::ShapeMismatch(format!(
                    "feature {i} has width {}, expected {}",
                    feature.len(),
                    self.num_inputs
                )));
            }
        }
        for (i, label) in labels.iter().enumerate() {
            if label.len() != self.num_outputs {
                return Err(Error::ShapeMismatch(format!(
                    "label {i} has width {}, expected {}",
                    label.len(),
                    self.num_outputs
                )));
            }
        }
        Ok(())
    }

    /// Copies out the full three-level weight structure.
    pub fn get_weights(&self) -> MlpWeights<F> {
        self.layers.iter().map(|l| l.get_weights()).collect()
    }

    /// Restores a weight structure previously produced by
    /// [`Mlp::get_weights`].
    pub fn set_weights(&mut self, weights: &MlpWeights<F>) -> Result<()> {
        if weights.len() != self.layers.len() {
            return Err(Error::ShapeMismatch(format!(
                "weight snapshot has {} layers, network has {}",
                weights.len(),
                self.layers.len()
            )));
        }
        for (i, (layer, layer_weights)) in self.layers.iter().zip(weights).enumerate() {
            if layer_weights.len() != layer.out_dim() {
                return Err(Error::ShapeMismatch(format!(
                    "layer {i} snapshot has {} nodes, layer has {}",
                    layer_weights.len(),
                    layer.out_dim()
                )));
            }
            for (k, node_weights) in layer_weights.iter().enumerate() {
                if node_weights.len() != layer.in_dim() {
                    return Err(Error::ShapeMismatch(format!(
                        "layer {i} node {k} snapshot has {} weights, layer input width is {}",
                        node_weights.len(),
                        layer.in_dim()
                    )));
                }
            }
        }

        for (layer, layer_weights) in self.layers.iter_mut().zip(weights) {
            layer.set_weights(layer_weights);
        }
        Ok(())
    }

    /// Redraws every weight uniformly in `[-scale, scale]`. Biases are left
    /// untouched.
    pub fn randomise_weights(&mut self, scale: F) {
        for layer in &mut self.layers {
            layer.randomise(scale, &mut self.rng);
        }
    }

    /// Redraws every weight with per-layer Xavier/Glorot limits.
    pub fn init_xavier(&mut self) {
        for layer in &mut self.layers {
            layer.init_xavier(&mut self.rng);
        }
    }

    /// Adds exploration noise to every weight (see [`crate::Node::perturb`]).
    pub fn perturb_weights(&mut self, speed: F) {
        for layer in &mut self.layers {
            layer.perturb(speed, &mut self.rng);
        }
    }

    /// Moves this network's weights towards another network's by an
    /// exponential moving average with factor `alpha`.
    ///
    /// Both networks must share the same architecture.
    pub fn smooth_update(&mut self, other: &Mlp<F>, alpha: F) {
        debug_assert_eq!(self.layers.len(), other.layers.len());

        for (layer, incoming) in self.layers.iter_mut().zip(&other.layers) {
            layer.smooth_update(incoming, alpha);
        }
    }

    /// Replaces any non-finite weight or optimiser average with zero across
    /// the whole network; returns whether anything was replaced.
    pub fn sanitise(&mut self) -> bool {
        let mut had_corruption = false;
        for layer in &mut self.layers {
            had_corruption |= layer.sanitise();
        }
        had_corruption
    }

    /// Zeroes every RMSProp running average.
    pub fn reset_optimiser(&mut self) {
        for layer in &mut self.layers {
            layer.reset_optimiser();
        }
    }

    #[cfg(test)]
    pub(crate) fn layers_mut(&mut self) -> &mut [Layer<F>] {
        &mut self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_mlp(seed: u64) -> Mlp<f32> {
        Mlp::new_with_seed(
            &[2, 4, 2],
            &[Activation::Tanh, Activation::Linear],
            Loss::Mse,
            Init::Uniform,
            seed,
        )
        .unwrap()
    }

    #[test]
    fn construction_validates_shapes() {
        let acts = [Activation::Tanh];
        assert!(matches!(
            Mlp::<f32>::new_with_seed(&[2], &[], Loss::Mse, Init::Uniform, 0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Mlp::<f32>::new_with_seed(&[2, 0], &acts, Loss::Mse, Init::Uniform, 0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Mlp::<f32>::new_with_seed(&[2, 3, 1], &acts, Loss::Mse, Init::Uniform, 0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn forward_rejects_wrong_input_width() {
        let mut mlp = small_mlp(0);
        assert!(matches!(
            mlp.forward(&[0.1], true),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn forward_output_width_matches_network() {
        let mut mlp = small_mlp(0);
        let out = mlp.forward(&[0.1, 0.9], true).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn forward_captures_one_activation_vector_per_layer() {
        let mut mlp = small_mlp(0);
        let mut acts = Vec::new();
        let _ = mlp.forward_captured(&[0.1, 0.9], &mut acts, false).unwrap();
        assert_eq!(acts.len(), 2);
        assert_eq!(acts[0], vec![0.1, 0.9]);
        assert_eq!(acts[1].len(), 4);
    }

    #[test]
    fn softmax_applies_only_for_inference_with_cross_entropy_multi_output() {
        let acts = [Activation::Tanh, Activation::Linear];
        let mut ce: Mlp<f32> = Mlp::new_with_seed(
            &[2, 4, 3],
            &acts,
            Loss::CategoricalCrossEntropy,
            Init::Uniform,
            1,
        )
        .unwrap();

        let probs = ce.forward(&[0.2, 0.8], true).unwrap();
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);

        // Training-mode passes return the raw logits.
        let logits = ce.forward(&[0.2, 0.8], false).unwrap();
        assert_ne!(probs, logits);

        // Single-output cross-entropy networks skip the softmax: the
        // inference pass returns the same value as the training pass.
        let mut single: Mlp<f32> = Mlp::new_with_seed(
            &[2, 4, 1],
            &acts,
            Loss::CategoricalCrossEntropy,
            Init::Uniform,
            1,
        )
        .unwrap();
        assert_eq!(
            single.forward(&[0.2, 0.8], true).unwrap(),
            single.forward(&[0.2, 0.8], false).unwrap()
        );

        // MSE networks never get softmax.
        let mut mse = small_mlp(1);
        assert_eq!(
            mse.forward(&[0.2, 0.8], true).unwrap(),
            mse.forward(&[0.2, 0.8], false).unwrap()
        );
    }

    #[test]
    fn weight_round_trip_preserves_forward() {
        let mut mlp = small_mlp(3);
        let before = mlp.forward(&[0.3, 0.6], true).unwrap();
        let snapshot = mlp.get_weights();
        mlp.set_weights(&snapshot).unwrap();
        let after = mlp.forward(&[0.3, 0.6], true).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn set_weights_rejects_wrong_shape() {
        let mut mlp = small_mlp(3);
        let mut snapshot = mlp.get_weights();
        snapshot[0].pop();
        assert!(matches!(
            mlp.set_weights(&snapshot),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn train_rejects_empty_and_mismatched_sets() {
        let mut mlp = small_mlp(0);
        assert!(matches!(
            mlp.train(&[], &[], 0.1, 10, 1e-6),
            Err(Error::EmptyInput(_))
        ));
        let features = vec![vec![0.1_f32, 0.2]];
        let labels = vec![vec![0.5_f32]];
        assert!(matches!(
            mlp.train(&features, &labels, 0.1, 10, 1e-6),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn train_reduces_loss_on_a_small_mapping() {
        let mut mlp = small_mlp(7);
        let features = vec![
            vec![0.0_f32, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
        ];
        let labels = vec![
            vec![0.0_f32, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
        ];

        let initial = mlp.train(&features, &labels, 0.5, 1, 0.0).unwrap();
        let final_loss = mlp.train(&features, &labels, 0.5, 500, 1e-4).unwrap();
        assert!(final_loss < initial, "{final_loss} vs {initial}");
    }

    #[test]
    fn train_batch_reduces_loss_and_reports_every_iteration() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mut mlp = small_mlp(11);
        let features = vec![
            vec![0.1_f32, 0.1],
            vec![0.9, 0.9],
            vec![0.1, 0.9],
            vec![0.9, 0.1],
        ];
        let labels = vec![
            vec![0.1_f32, 0.9],
            vec![0.9, 0.1],
            vec![0.5, 0.5],
            vec![0.5, 0.5],
        ];

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_cb = Arc::clone(&calls);
        mlp.set_progress_callback(Box::new(move |_, _| {
            calls_in_cb.fetch_add(1, Ordering::Relaxed);
        }));

        let initial = mlp
            .train_batch(&features, &labels, 0.05, 1, 2, 0.0)
            .unwrap();
        let final_loss = mlp
            .train_batch(&features, &labels, 0.05, 200, 2, 1e-5)
            .unwrap();
        assert!(final_loss < initial, "{final_loss} vs {initial}");
        // One callback per completed iteration.
        assert!(calls.load(Ordering::Relaxed) >= 2);
    }

    #[test]
    fn train_batch_rejects_zero_batch() {
        let mut mlp = small_mlp(0);
        let features = vec![vec![0.1_f32, 0.2]];
        let labels = vec![vec![0.5_f32, 0.5]];
        assert!(matches!(
            mlp.train_batch(&features, &labels, 0.1, 10, 0, 1e-6),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn per_sample_callback_fires_on_32nd_iterations_and_final() {
        use std::sync::{Arc, Mutex};

        let mut mlp = small_mlp(5);
        let iters: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&iters);
        mlp.set_progress_callback(Box::new(move |i, _| sink.lock().unwrap().push(i)));

        let features = vec![vec![0.5_f32, 0.5]];
        let labels = vec![vec![0.5_f32, 0.5]];
        // min_cost 0 so all 64 iterations run.
        let _ = mlp.train(&features, &labels, 0.01, 64, 0.0).unwrap();

        let seen = iters.lock().unwrap();
        assert_eq!(&seen[..2], &[0, 32]);
        assert_eq!(*seen.last().unwrap(), 64);
    }

    #[test]
    fn apply_gradient_moves_the_output() {
        let mut mlp = small_mlp(13);
        let input = [0.4_f32, 0.6];
        let before = mlp.forward(&input, false).unwrap();

        // Push output 0 downward.
        for _ in 0..50 {
            mlp.apply_gradient(&input, &[1.0, 0.0], 0.1).unwrap();
        }
        let after = mlp.forward(&input, false).unwrap();
        assert!(after[0] < before[0]);
    }

    #[test]
    fn init_xavier_redraws_within_layer_limits() {
        let mut mlp = small_mlp(2);
        let before = mlp.get_weights();
        mlp.init_xavier();
        let after = mlp.get_weights();
        assert_ne!(before, after);
        // First layer: fan_in 2, fan_out 4, limit = sqrt(6 / 6) = 1.
        assert!(after[0].iter().flatten().all(|w| w.abs() <= 1.0));
    }

    #[test]
    fn smooth_update_with_alpha_one_copies_other_network() {
        let mut a = small_mlp(1);
        let b = small_mlp(2);
        a.smooth_update(&b, 1.0);
        assert_eq!(a.get_weights(), b.get_weights());
    }

    #[test]
    fn sanitise_reports_and_fixes_corruption() {
        let mut mlp = small_mlp(0);
        assert!(!mlp.sanitise());
        mlp.layers_mut()[0].nodes_mut()[0].weights_mut()[0] = f32::INFINITY;
        assert!(mlp.sanitise());
        assert!(mlp.get_weights()[0][0][0] == 0.0);
    }
}
