//! Interactive parameter-mapping engine.
//!
//! A small feed-forward network (MLP) learns, online, a mapping from a vector
//! of normalised inputs (joystick axes, audio features) to a vector of
//! normalised outputs driving an external process (a synthesiser, an effects
//! chain, a lighting rig). The user teaches the mapping by demonstration:
//! position the inputs, position the desired outputs, commit the pair, and
//! train on mode exit.
//!
//! Conventions:
//! - The scalar type is generic over [`Float`] (`f32` or `f64`).
//! - Everything at the [`Iml`] boundary is in `[0, 1]`; values are clamped on
//!   ingress. Network internals run on unclamped reals.
//! - Configuration/data validation at the API boundary returns [`Result`];
//!   per-node hot paths treat shape mismatches as programmer error.
//! - The core never blocks, spawns, or performs I/O; timing and threading
//!   belong to the caller.

pub mod activation;
pub mod dataset;
pub mod error;
pub mod iml;
pub mod layer;
pub mod loss;
pub mod mlp;
pub mod node;
pub mod scalar;

pub use activation::Activation;
pub use dataset::{Dataset, ForgetMode, DEFAULT_MAX_EXAMPLES};
pub use error::{Error, Result};
pub use iml::{Iml, ImlConfig, LogFn, Mode};
pub use layer::Layer;
pub use loss::Loss;
pub use mlp::{Mlp, MlpWeights, ProgressFn};
pub use node::{Init, Node};
pub use scalar::Float;
