//! Interactive machine-learning facade.
//!
//! `Iml` composes one [`Mlp`] and one [`Dataset`] behind a control-rate API:
//! an outer loop pushes normalised inputs, calls [`Iml::process`] and reads
//! normalised outputs, while the user teaches the mapping by demonstration
//! through the two-step [`Iml::save_example`] protocol and the
//! training-on-mode-exit transition.
//!
//! The facade is single-threaded and non-suspending; callers that split
//! control-rate and orchestration work across threads serialise access
//! themselves (a mutex around the instance is sufficient).

use crate::activation::Activation;
use crate::dataset::Dataset;
use crate::loss::Loss;
use crate::mlp::{Mlp, MlpWeights};
use crate::node::Init;
use crate::scalar::{cast, Float};
use crate::{Error, Result};

/// Operating mode of the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The network drives the outputs; training events are ignored.
    Inference,
    /// The user is collecting examples and exploring weights.
    Training,
}

/// Construction parameters for [`Iml`].
#[derive(Debug, Clone)]
pub struct ImlConfig<F: Float> {
    /// Hidden layer widths, input to output.
    pub hidden_layers: Vec<usize>,
    /// Iteration budget for the training run on each Training -> Inference
    /// transition.
    pub max_iterations: usize,
    pub learning_rate: F,
    /// Early-stopping threshold on the epoch loss.
    pub convergence_threshold: F,
}

impl<F: Float> Default for ImlConfig<F> {
    fn default() -> Self {
        Self {
            hidden_layers: vec![10, 10, 14],
            max_iterations: 1000,
            learning_rate: F::one(),
            convergence_threshold: cast(1e-5),
        }
    }
}

/// Log sink for the human-oriented protocol events.
pub type LogFn = Box<dyn Fn(&str) + Send>;

/// The interactive parameter-mapping engine.
pub struct Iml<F: Float> {
    n_inputs: usize,
    n_outputs: usize,
    max_iterations: usize,
    learning_rate: F,
    convergence_threshold: F,

    mode: Mode,
    input_dirty: bool,
    /// Gate on [`Iml::process`]; the save protocol closes it while the user
    /// positions the desired output.
    perform_inference: bool,

    input_state: Vec<F>,
    output_state: Vec<F>,

    dataset: Dataset<F>,
    mlp: Mlp<F>,
    stored_weights: Option<MlpWeights<F>>,
    weights_were_perturbed: bool,

    log_fn: Option<LogFn>,
}

impl<F: Float> Iml<F> {
    /// Creates an engine with the default configuration.
    pub fn new(n_inputs: usize, n_outputs: usize) -> Result<Self> {
        Self::with_config(n_inputs, n_outputs, ImlConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    pub fn with_config(n_inputs: usize, n_outputs: usize, config: ImlConfig<F>) -> Result<Self> {
        let layer_sizes = Self::layer_sizes(n_inputs, n_outputs, &config)?;
        let activations = Self::activations(&config);
        let mlp = Mlp::new(&layer_sizes, &activations, Loss::Mse, Init::Uniform)?;
        Ok(Self::assemble(n_inputs, n_outputs, config, mlp, Dataset::new()))
    }

    /// Like [`Iml::with_config`] but fully deterministic, for tests and
    /// reproducible sessions.
    pub fn with_config_seeded(
        n_inputs: usize,
        n_outputs: usize,
        config: ImlConfig<F>,
        seed: u64,
    ) -> Result<Self> {
        let layer_sizes = Self::layer_sizes(n_inputs, n_outputs, &config)?;
        let activations = Self::activations(&config);
        let mlp = Mlp::new_with_seed(&layer_sizes, &activations, Loss::Mse, Init::Uniform, seed)?;
        let dataset = Dataset::with_seed(seed.wrapping_add(1));
        Ok(Self::assemble(n_inputs, n_outputs, config, mlp, dataset))
    }

    fn layer_sizes(
        n_inputs: usize,
        n_outputs: usize,
        config: &ImlConfig<F>,
    ) -> Result<Vec<usize>> {
        if n_inputs == 0 || n_outputs == 0 {
            return Err(Error::InvalidConfig(
                "input and output counts must be > 0".to_owned(),
            ));
        }

        // One bias unit rides along with the inputs.
        let mut sizes = Vec::with_capacity(config.hidden_layers.len() + 2);
        sizes.push(n_inputs + 1);
        sizes.extend_from_slice(&config.hidden_layers);
        sizes.push(n_outputs);
        Ok(sizes)
    }

    fn activations(config: &ImlConfig<F>) -> Vec<Activation> {
        let mut activations = vec![Activation::ReLU; config.hidden_layers.len()];
        activations.push(Activation::Sigmoid);
        activations
    }

    fn assemble(
        n_inputs: usize,
        n_outputs: usize,
        config: ImlConfig<F>,
        mlp: Mlp<F>,
        dataset: Dataset<F>,
    ) -> Self {
        Self {
            n_inputs,
            n_outputs,
            max_iterations: config.max_iterations,
            learning_rate: config.learning_rate,
            convergence_threshold: config.convergence_threshold,
            mode: Mode::Inference,
            input_dirty: false,
            perform_inference: true,
            input_state: vec![cast(0.5); n_inputs],
            output_state: vec![F::zero(); n_outputs],
            dataset,
            mlp,
            stored_weights: None,
            weights_were_perturbed: false,
            log_fn: None,
        }
    }

    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.n_inputs
    }

    #[inline]
    pub fn num_outputs(&self) -> usize {
        self.n_outputs
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether [`Iml::process`] currently runs inference; `false` while the
    /// save protocol is waiting for the desired output position.
    #[inline]
    pub fn inference_enabled(&self) -> bool {
        self.perform_inference
    }

    /// Current input vector; every element is in `[0, 1]`.
    #[inline]
    pub fn input_state(&self) -> &[F] {
        &self.input_state
    }

    /// Current output vector; every element is in `[0, 1]`.
    #[inline]
    pub fn get_outputs(&self) -> &[F] {
        &self.output_state
    }

    #[inline]
    pub fn dataset(&self) -> &Dataset<F> {
        &self.dataset
    }

    /// Mutable dataset access for replay-memory configuration
    /// (capacity, forget mode).
    #[inline]
    pub fn dataset_mut(&mut self) -> &mut Dataset<F> {
        &mut self.dataset
    }

    #[inline]
    pub fn mlp(&self) -> &Mlp<F> {
        &self.mlp
    }

    #[inline]
    pub fn mlp_mut(&mut self) -> &mut Mlp<F> {
        &mut self.mlp
    }

    /// Installs the log sink for protocol events.
    pub fn set_logger(&mut self, log_fn: LogFn) {
        self.log_fn = Some(log_fn);
    }

    fn log(&self, msg: &str) {
        if let Some(log_fn) = &self.log_fn {
            log_fn(msg);
        }
    }

    /// Stores one input value, clamped to `[0, 1]`. Out-of-range indices are
    /// ignored.
    pub fn set_input(&mut self, index: usize, value: F) {
        if index >= self.n_inputs {
            return;
        }
        self.input_state[index] = clamp_unit(value);
        self.input_dirty = true;
    }

    /// Bulk form of [`Iml::set_input`]; extra values are ignored.
    pub fn set_inputs(&mut self, values: &[F]) {
        for (index, &value) in values.iter().take(self.n_inputs).enumerate() {
            self.set_input(index, value);
        }
    }

    /// Stores one output value, clamped to `[0, 1]`. Out-of-range indices are
    /// ignored. Used by external UIs and by the save protocol while inference
    /// is gated off.
    pub fn set_output(&mut self, index: usize, value: F) {
        if index >= self.n_outputs {
            return;
        }
        self.output_state[index] = clamp_unit(value);
    }

    /// Bulk form of [`Iml::set_output`]; extra values are ignored.
    pub fn set_outputs(&mut self, values: &[F]) {
        for (index, &value) in values.iter().take(self.n_outputs).enumerate() {
            self.set_output(index, value);
        }
    }

    /// Runs one inference pass when the inputs changed and inference is not
    /// gated off; otherwise does nothing.
    pub fn process(&mut self) {
        if !self.perform_inference || !self.input_dirty {
            return;
        }
        self.run_inference();
        self.input_dirty = false;
    }

    fn run_inference(&mut self) {
        let mut input = Vec::with_capacity(self.n_inputs + 1);
        input.extend_from_slice(&self.input_state);
        input.push(F::one());

        match self.mlp.forward(&input, true) {
            Ok(output) => self.output_state = output,
            // Unreachable for a well-formed instance; surfaced instead of
            // panicking at control rate.
            Err(err) => self.log(&format!("inference failed: {err}")),
        }
    }

    /// Appends one training pair programmatically, bypassing the interactive
    /// protocol.
    pub fn add_example(&mut self, feature: &[F], label: &[F]) -> Result<()> {
        if feature.len() != self.n_inputs {
            return Err(Error::ShapeMismatch(format!(
                "feature width {} does not match input count {}",
                feature.len(),
                self.n_inputs
            )));
        }
        if label.len() != self.n_outputs {
            return Err(Error::ShapeMismatch(format!(
                "label width {} does not match output count {}",
                label.len(),
                self.n_outputs
            )));
        }
        self.dataset.add(feature.to_vec(), label.to_vec())
    }

    /// Interactive two-step example capture.
    ///
    /// First call: freezes inference so the output vector is free for the
    /// user to position via [`Iml::set_output`]. Second call: commits the
    /// `(input, output)` pair to the dataset, re-enables inference and runs
    /// one pass so the displayed outputs reflect the network again.
    pub fn save_example(&mut self) {
        if self.perform_inference {
            self.perform_inference = false;
            self.log("Move to desired output position...");
            return;
        }

        let result = self
            .dataset
            .add(self.input_state.clone(), self.output_state.clone());
        self.perform_inference = true;

        match result {
            Ok(()) => {
                self.run_inference();
                self.log("Example saved.");
            }
            Err(err) => self.log(&format!("Could not save example: {err}")),
        }
    }

    /// Empties the dataset. Only honoured in Training mode; the save-protocol
    /// state is unaffected.
    pub fn clear_dataset(&mut self) {
        if self.mode == Mode::Training {
            self.dataset.clear();
            self.log("Dataset cleared.");
        }
    }

    /// Draws fresh uniform weights for exploration, snapshotting the current
    /// ones first. Only honoured in Training mode.
    ///
    /// The snapshot is restored before the next training run, so a
    /// randomisation the user does not commit to (by adding examples and
    /// training on the new surface) cannot contaminate the trained mapping.
    pub fn randomise_weights(&mut self) {
        if self.mode != Mode::Training {
            return;
        }
        self.stored_weights = Some(self.mlp.get_weights());
        self.mlp.randomise_weights(F::one());
        self.weights_were_perturbed = true;
        self.run_inference();
        self.log("Weights randomised.");
    }

    /// Nudges every weight with exploration noise of the given magnitude.
    ///
    /// Unlike [`Iml::randomise_weights`] this takes no snapshot: a
    /// perturbation is either kept by the user or re-randomised fresh.
    pub fn perturb_weights(&mut self, speed: F) {
        self.mlp.perturb_weights(speed);
        self.run_inference();
        self.log("Weights perturbed.");
    }

    /// Switches modes. A Training -> Inference transition trains the network
    /// on the collected dataset before the switch completes; all other
    /// transitions only change the flag.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == Mode::Inference && self.mode == Mode::Training {
            self.train();
        }
        self.mode = mode;
    }

    fn train(&mut self) {
        // An uncommitted exploration must not contaminate training.
        if self.weights_were_perturbed {
            if let Some(weights) = self.stored_weights.take() {
                if let Err(err) = self.mlp.set_weights(&weights) {
                    self.log(&format!("could not restore weights: {err}"));
                }
            }
            self.weights_were_perturbed = false;
        }

        let features = self.dataset.features(true);
        let labels = self.dataset.labels().to_vec();
        if features.is_empty() || labels.is_empty() {
            self.log("Empty dataset, skipping training.");
            return;
        }

        self.log("Training...");
        if let Err(err) = self.mlp.train(
            &features,
            &labels,
            self.learning_rate,
            self.max_iterations,
            self.convergence_threshold,
        ) {
            self.log(&format!("training failed: {err}"));
            return;
        }

        self.run_inference();
        self.log("Training complete.");
    }
}

#[inline]
fn clamp_unit<F: Float>(value: F) -> F {
    value.max(F::zero()).min(F::one())
}
