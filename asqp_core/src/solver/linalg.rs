//! Linear algebra

use num_traits::Float;
use faer::traits::RealField;

/// Linear algebra trait.
///
/// Dense vector operations used by [`crate::solver::Solver`].
/// Sparse matrix operations are provided by [`crate::SpMatRef`].
pub trait LinAlg
{
    /// Floating point data type used as scalars.
    /// It is also a `faer` real field so that the sparse QR factorization can take it.
    type F: Float + RealField;

    /// Copy from a vector to another vector.
    ///
    /// * `x` is a slice to copy.
    /// * `y` is a slice being copied to.
    ///   `x` and `y` shall have the same length.
    fn copy(x: &[Self::F], y: &mut [Self::F]);

    /// Calculate \\(\alpha x\\).
    ///
    /// * `alpha` is a scalar \\(\alpha\\).
    /// * `x` is a vector \\(x\\) before entry, \\(\alpha x\\) on exit.
    fn scale(alpha: Self::F, x: &mut [Self::F]);

    /// Calculate \\(\alpha x + y\\).
    ///
    /// * `alpha` is a scalar \\(\alpha\\).
    /// * `x` is a vector \\(x\\).
    /// * `y` is a vector \\(y\\) before entry, \\(\alpha x + y\\) on exit.
    ///   `x` and `y` shall have the same length.
    fn add(alpha: Self::F, x: &[Self::F], y: &mut [Self::F]);

    /// Calculate \\(x^T y\\).
    ///
    /// Returns the calculated inner product.
    /// * `x` is a vector \\(x\\).
    /// * `y` is a vector \\(y\\).
    ///   `x` and `y` shall have the same length.
    fn inner_prod(x: &[Self::F], y: &[Self::F]) -> Self::F;
}
