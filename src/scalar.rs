//! Scalar type parameter for the whole engine.
//!
//! Every vector in the crate is a dense `Vec<F>` where `F: Float`. The trait
//! gets implemented automatically for all types that satisfy its dependent
//! traits, which in practice means `f32` and `f64`.

use rand::distributions::uniform::SampleUniform;

/// Numeric types the engine can run on.
pub trait Float:
    num_traits::Float
    + num_traits::NumAssignOps
    + num_traits::NumCast
    + SampleUniform
    + std::iter::Sum
    + std::fmt::Debug
    + Send
    + Sync
    + 'static
{
}

impl<T> Float for T where
    T: num_traits::Float
        + num_traits::NumAssignOps
        + num_traits::NumCast
        + SampleUniform
        + std::iter::Sum
        + std::fmt::Debug
        + Send
        + Sync
        + 'static
{
}

/// Converts a literal constant into the scalar type.
///
/// Every constant in this crate (decay factors, clip thresholds) fits in an
/// `f32`, so the cast cannot fail for any type implementing [`Float`].
#[inline]
pub(crate) fn cast<F: Float>(v: f64) -> F {
    num_traits::cast(v).expect("constant must be representable in the scalar type")
}
