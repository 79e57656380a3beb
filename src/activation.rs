//! Activation functions.
//!
//! A node computes a pre-activation value `z = w . x + b` and caches it; the
//! layer applies the activation element-wise on top. Derivatives here are
//! taken with respect to the *pre-activation* `z`, matching the cached value
//! used during backprop.
//!
//! The set is closed: resolving an activation happens at construction time by
//! picking a variant, so there is no runtime registry to miss.

use crate::scalar::{cast, Float};

/// Leak slope applied on the non-positive side of [`Activation::ReLU`].
const RELU_LEAK: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Element-wise activation function.
pub enum Activation {
    Sigmoid,
    Tanh,
    Linear,
    /// Leaky rectifier: `x` for positive inputs, `0.01 * x` otherwise.
    ReLU,
    /// `clip((x + 3) / 6, 0, 1)`.
    HardSigmoid,
    /// `clip(x, -1, 1)`.
    HardTanh,
    /// `x * hardsigmoid(x)` on `[-3, 3]`, `0` below, identity above.
    HardSwish,
}

impl Activation {
    /// Applies the activation to a pre-activation value.
    #[inline]
    pub fn forward<F: Float>(self, x: F) -> F {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => x.tanh(),
            Activation::Linear => x,
            Activation::ReLU => {
                if x > F::zero() {
                    x
                } else {
                    cast::<F>(RELU_LEAK) * x
                }
            }
            Activation::HardSigmoid => {
                let three = cast::<F>(3.0);
                if x <= -three {
                    F::zero()
                } else if x >= three {
                    F::one()
                } else {
                    (x + three) / cast::<F>(6.0)
                }
            }
            Activation::HardTanh => {
                if x <= -F::one() {
                    -F::one()
                } else if x >= F::one() {
                    F::one()
                } else {
                    x
                }
            }
            Activation::HardSwish => {
                let three = cast::<F>(3.0);
                if x <= -three {
                    F::zero()
                } else if x >= three {
                    x
                } else {
                    x * (x + three) / cast::<F>(6.0)
                }
            }
        }
    }

    /// Derivative of the activation with respect to the pre-activation `x`.
    ///
    /// Piecewise functions use their closed-form derivative on each linear
    /// region; at the kinks the outer branch wins for the hard functions and
    /// the leak branch wins for `ReLU`.
    #[inline]
    pub fn grad<F: Float>(self, x: F) -> F {
        match self {
            Activation::Sigmoid => {
                let s = sigmoid(x);
                s * (F::one() - s)
            }
            Activation::Tanh => {
                let t = x.tanh();
                F::one() - t * t
            }
            Activation::Linear => F::one(),
            Activation::ReLU => {
                if x > F::zero() {
                    F::one()
                } else {
                    cast::<F>(RELU_LEAK)
                }
            }
            Activation::HardSigmoid => {
                let three = cast::<F>(3.0);
                if x > -three && x < three {
                    F::one() / cast::<F>(6.0)
                } else {
                    F::zero()
                }
            }
            Activation::HardTanh => {
                if x > -F::one() && x < F::one() {
                    F::one()
                } else {
                    F::zero()
                }
            }
            Activation::HardSwish => {
                let three = cast::<F>(3.0);
                if x <= -three {
                    F::zero()
                } else if x >= three {
                    F::one()
                } else {
                    (cast::<F>(2.0) * x + three) / cast::<F>(6.0)
                }
            }
        }
    }
}

#[inline]
fn sigmoid<F: Float>(x: F) -> F {
    // Numerically stable sigmoid.
    if x >= F::zero() {
        let z = (-x).exp();
        F::one() / (F::one() + z)
    } else {
        let z = x.exp();
        z / (F::one() + z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_basic_values() {
        let y0: f32 = Activation::Sigmoid.forward(0.0);
        assert!((y0 - 0.5).abs() < 1e-6);

        let y_pos: f32 = Activation::Sigmoid.forward(10.0);
        let y_neg: f32 = Activation::Sigmoid.forward(-10.0);
        assert!(y_pos > 0.999);
        assert!(y_neg < 0.001);

        // grad(0) = 0.25
        let g0: f32 = Activation::Sigmoid.grad(0.0);
        assert!((g0 - 0.25).abs() < 1e-6);
    }

    #[test]
    fn relu_is_leaky() {
        assert_eq!(Activation::ReLU.forward(-2.0_f32), -0.02);
        assert_eq!(Activation::ReLU.forward(3.0_f32), 3.0);
        assert_eq!(Activation::ReLU.grad(3.0_f32), 1.0);
        assert_eq!(Activation::ReLU.grad(-3.0_f32), 0.01);
        // The leak branch also covers the kink itself.
        assert_eq!(Activation::ReLU.grad(0.0_f32), 0.01);
    }

    #[test]
    fn hard_sigmoid_regions() {
        assert_eq!(Activation::HardSigmoid.forward(-4.0_f32), 0.0);
        assert_eq!(Activation::HardSigmoid.forward(4.0_f32), 1.0);
        let mid: f32 = Activation::HardSigmoid.forward(0.0);
        assert!((mid - 0.5).abs() < 1e-6);

        assert_eq!(Activation::HardSigmoid.grad(0.0_f32), 1.0 / 6.0);
        assert_eq!(Activation::HardSigmoid.grad(3.0_f32), 0.0);
        assert_eq!(Activation::HardSigmoid.grad(-3.0_f32), 0.0);
    }

    #[test]
    fn hard_tanh_clips() {
        assert_eq!(Activation::HardTanh.forward(-2.0_f32), -1.0);
        assert_eq!(Activation::HardTanh.forward(2.0_f32), 1.0);
        assert_eq!(Activation::HardTanh.forward(0.25_f32), 0.25);
        assert_eq!(Activation::HardTanh.grad(0.25_f32), 1.0);
        assert_eq!(Activation::HardTanh.grad(1.0_f32), 0.0);
    }

    #[test]
    fn hard_swish_matches_x_times_hard_sigmoid_inside() {
        for &x in &[-2.5_f32, -1.0, 0.0, 0.5, 2.9] {
            let expected = x * Activation::HardSigmoid.forward(x);
            let got = Activation::HardSwish.forward(x);
            assert!((expected - got).abs() < 1e-6, "x={x}");
        }
        assert_eq!(Activation::HardSwish.forward(-3.5_f32), 0.0);
        assert_eq!(Activation::HardSwish.forward(3.5_f32), 3.5);
        assert_eq!(Activation::HardSwish.grad(3.5_f32), 1.0);
        assert_eq!(Activation::HardSwish.grad(-3.5_f32), 0.0);
    }

    #[test]
    fn works_for_both_scalar_widths() {
        let g32: f32 = Activation::Tanh.grad(0.3);
        let g64: f64 = Activation::Tanh.grad(0.3);
        assert!((f64::from(g32) - g64).abs() < 1e-6);
    }
}
