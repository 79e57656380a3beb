//! Loss functions.
//!
//! Each loss takes the expected and actual output vectors, writes the
//! per-output gradient `dE/d(actual)` into a caller-provided buffer and
//! returns the scalar loss. `sample_scale` folds the per-sample averaging of
//! the training loop into both the loss and the gradient, so callers pass
//! `1 / n_samples` for full-set sweeps and `1.0` when batch averaging happens
//! later at apply time.

use crate::scalar::{cast, Float};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Supported loss functions.
pub enum Loss {
    /// Mean squared error over the output vector.
    Mse,
    /// Categorical cross-entropy with implicit softmax.
    ///
    /// Expects raw logits as `actual` and a one-hot `expected` vector; during
    /// inference the network applies [`softmax`] on top so callers see
    /// probabilities.
    CategoricalCrossEntropy,
}

impl Loss {
    /// Computes the loss and writes the gradient w.r.t. `actual` into
    /// `out_grad`.
    ///
    /// Shape contract (checked with `debug_assert!`; the training APIs
    /// validate widths before entering the hot loop):
    /// - `expected.len() == actual.len() == out_grad.len()`
    #[inline]
    pub fn backward<F: Float>(
        self,
        expected: &[F],
        actual: &[F],
        out_grad: &mut [F],
        sample_scale: F,
    ) -> F {
        match self {
            Loss::Mse => mse_backward(expected, actual, out_grad, sample_scale),
            Loss::CategoricalCrossEntropy => {
                cross_entropy_backward(expected, actual, out_grad, sample_scale)
            }
        }
    }
}

/// MSE loss + gradient.
///
/// - loss: `sample_scale * mean((expected - actual)^2)`
/// - gradient: `-2/n * (expected - actual) * sample_scale`
#[inline]
pub fn mse_backward<F: Float>(
    expected: &[F],
    actual: &[F],
    out_grad: &mut [F],
    sample_scale: F,
) -> F {
    debug_assert_eq!(expected.len(), actual.len());
    debug_assert_eq!(actual.len(), out_grad.len());

    if actual.is_empty() {
        return F::zero();
    }

    let inv_n = F::one() / cast::<F>(actual.len() as f64);
    let mut accum = F::zero();
    for j in 0..actual.len() {
        let diff = expected[j] - actual[j];
        accum += diff * diff * inv_n;
        out_grad[j] = -cast::<F>(2.0) * inv_n * diff * sample_scale;
    }
    accum * sample_scale
}

/// Categorical cross-entropy loss + gradient over raw logits.
///
/// The target class is the first index with `expected > 0.5`. When no such
/// index exists (the target is not one-hot) the loss is zero but the softmax
/// gradient is still produced, pulling all logits towards the given soft
/// targets.
#[inline]
pub fn cross_entropy_backward<F: Float>(
    expected: &[F],
    actual: &[F],
    out_grad: &mut [F],
    sample_scale: F,
) -> F {
    debug_assert_eq!(expected.len(), actual.len());
    debug_assert_eq!(actual.len(), out_grad.len());
    debug_assert!(!actual.is_empty());

    // Log-sum-exp with max subtraction for numerical stability.
    let mut max_logit = actual[0];
    for &x in &actual[1..] {
        if x > max_logit {
            max_logit = x;
        }
    }
    let mut sum_exp = F::zero();
    for &x in actual {
        sum_exp += (x - max_logit).exp();
    }
    let log_sum_exp = max_logit + sum_exp.ln();

    let half = cast::<F>(0.5);
    let mut loss = F::zero();
    for (j, &t) in expected.iter().enumerate() {
        if t > half {
            loss = -actual[j] + log_sum_exp;
            break;
        }
    }

    for j in 0..actual.len() {
        let softmax_j = (actual[j] - max_logit).exp() / sum_exp;
        out_grad[j] = (softmax_j - expected[j]) * sample_scale;
    }

    loss * sample_scale
}

/// In-place, max-subtracted softmax.
///
/// Used by inference post-processing when the network was built with
/// [`Loss::CategoricalCrossEntropy`].
#[inline]
pub fn softmax<F: Float>(values: &mut [F]) {
    if values.is_empty() {
        return;
    }
    let mut max_v = values[0];
    for &v in &values[1..] {
        if v > max_v {
            max_v = v;
        }
    }
    let mut total = F::zero();
    for v in values.iter_mut() {
        *v = (*v - max_v).exp();
        total += *v;
    }
    for v in values.iter_mut() {
        *v /= total;
    }
}

/// Index of the largest element; the predicted class for classification use.
#[inline]
pub fn argmax<F: Float>(values: &[F]) -> usize {
    let mut best = 0;
    for i in 1..values.len() {
        if values[i] > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mse_is_zero_when_equal() {
        let expected = [0.3_f32, 0.7, 0.5];
        let actual = expected;
        let mut grad = [1.0_f32; 3];
        let loss = mse_backward(&expected, &actual, &mut grad, 1.0);
        assert_eq!(loss, 0.0);
        assert_eq!(grad, [0.0; 3]);
    }

    #[test]
    fn mse_backward_matches_expected_gradient() {
        let expected = [2.0_f32, 1.0];
        let actual = [1.0_f32, 3.0];
        let mut grad = [0.0_f32; 2];
        let loss = mse_backward(&expected, &actual, &mut grad, 1.0);

        // mean((1)^2, (-2)^2) = 2.5
        assert!((loss - 2.5).abs() < 1e-6);
        // -2/2 * diff
        assert!((grad[0] - (-1.0)).abs() < 1e-6);
        assert!((grad[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn mse_applies_sample_scale_to_loss_and_gradient() {
        let expected = [1.0_f32];
        let actual = [0.0_f32];
        let mut grad = [0.0_f32];
        let loss = mse_backward(&expected, &actual, &mut grad, 0.25);
        assert!((loss - 0.25).abs() < 1e-6);
        assert!((grad[0] - (-0.5)).abs() < 1e-6);
    }

    #[test]
    fn cross_entropy_prefers_correct_class() {
        let target = [1.0_f32, 0.0, 0.0];
        let mut grad = [0.0_f32; 3];
        let loss_good = cross_entropy_backward(&target, &[5.0, 0.0, -1.0], &mut grad, 1.0);
        let loss_bad = cross_entropy_backward(&target, &[-1.0, 0.0, 5.0], &mut grad, 1.0);
        assert!(loss_good < loss_bad);
    }

    #[test]
    fn cross_entropy_gradient_is_softmax_minus_target() {
        let target = [0.0_f32, 1.0];
        let logits = [0.0_f32, 0.0];
        let mut grad = [0.0_f32; 2];
        cross_entropy_backward(&target, &logits, &mut grad, 1.0);
        assert!((grad[0] - 0.5).abs() < 1e-6);
        assert!((grad[1] - (-0.5)).abs() < 1e-6);
    }

    #[test]
    fn cross_entropy_is_stable_for_large_logits() {
        let target = [1.0_f32, 0.0];
        let logits = [1000.0_f32, -1000.0];
        let mut grad = [0.0_f32; 2];
        let loss = cross_entropy_backward(&target, &logits, &mut grad, 1.0);
        assert!(loss.is_finite());
        assert!(loss < 1e-3);
    }

    #[test]
    fn cross_entropy_without_one_hot_target_has_zero_loss() {
        // No expected value exceeds 0.5: the loss defaults to zero while the
        // gradient still pulls towards the soft targets.
        let target = [0.4_f32, 0.4];
        let logits = [2.0_f32, -2.0];
        let mut grad = [0.0_f32; 2];
        let loss = cross_entropy_backward(&target, &logits, &mut grad, 1.0);
        assert_eq!(loss, 0.0);
        assert!(grad[0] > 0.0);
        assert!(grad[1] < 0.0);
    }

    #[test]
    fn softmax_normalises() {
        let mut v = [1.0_f32, 2.0, 3.0];
        softmax(&mut v);
        let total: f32 = v.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(v[2] > v[1] && v[1] > v[0]);
    }

    #[test]
    fn argmax_picks_first_largest() {
        assert_eq!(argmax(&[0.1_f32, 0.9, 0.3]), 1);
        assert_eq!(argmax(&[0.5_f32, 0.5]), 0);
    }
}
