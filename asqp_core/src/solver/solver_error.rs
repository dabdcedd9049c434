/// Solver errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverError
{
    /// Problem data shapes disagree, or a bound pair is inconsistent.
    DimensionMismatch,
    /// Modified KKT matrix is singular for the current active set.
    StructuralSingularity {
        /// Column of the KKT matrix where the factorization broke down.
        index: usize,
    },
    /// Step length of the ratio test out of \[0, 1\].
    InvariantViolation {
        /// Entry (variables first, then constraints) that produced `tau`.
        index: usize,
        /// Offending step length.
        tau: f64,
    },

    /// Shortage of work slice length.
    WorkShortage,
    /// Invalid [`crate::solver::SolverParam`].
    InvalidParam,
}

impl core::fmt::Display for SolverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            SolverError::DimensionMismatch =>
                write!(f, "DimensionMismatch: inconsistent problem dimensions or bounds"),
            SolverError::StructuralSingularity { index } =>
                write!(f, "StructuralSingularity: singular KKT matrix at column {}", index),
            SolverError::InvariantViolation { index, tau } =>
                write!(f, "InvariantViolation: step length {} out of [0, 1] at entry {}", tau, index),
            SolverError::WorkShortage =>
                write!(f, "WorkShortage: shortage of work slice length"),
            SolverError::InvalidParam =>
                write!(f, "InvalidParam: invalid SolverParam"),
        }
    }
}

//

impl std::error::Error for SolverError {}
