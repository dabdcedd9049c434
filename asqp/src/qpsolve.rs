use num_traits::{Float, Zero};
use core::fmt::{Debug, LowerExp};
use asqp_core::solver::{Solver, SolverError, QpStart, Workspace, LinAlg};
use asqp_core::KktSymbolic;
use crate::{ProbQP, QpGuess, QpSolution};

//

/// Solver of [`ProbQP`] behind a common interface.
pub trait QpSolve<F: Float>
{
    /// Name of the solver.
    fn name(&self) -> &str;

    /// Solves a QP.
    ///
    /// Returns `Ok` with [`QpSolution`], or `Err` with [`SolverError`] type.
    /// * `prob` is the QP.
    /// * `guess` is the initial guess.
    fn solve(&self, prob: &ProbQP<F>, guess: &QpGuess<F>) -> Result<QpSolution<F>, SolverError>;
}

//

/// Active-set QP solver bound to a problem structure.
///
/// The KKT structure is analyzed once by [`ActiveSetQp::new`]
/// and reused by every solve of problems of the same sparsity patterns.
pub struct ActiveSetQp<L: LinAlg>
{
    solver: Solver<L>,
    symb: KktSymbolic,
}

impl<L: LinAlg> ActiveSetQp<L>
where L::F: Float + Debug + LowerExp
{
    /// Creates an instance.
    ///
    /// Returns [`ActiveSetQp`] instance, or [`SolverError`] if the structure of `prob` cannot be analyzed.
    /// * `solver` is a [`Solver`] with its parameters set.
    /// * `prob` is a QP whose patterns are analyzed.
    pub fn new(solver: Solver<L>, prob: &ProbQP<L::F>) -> Result<Self, SolverError>
    {
        let symb = KktSymbolic::new(prob.h_pattern(), prob.a_pattern())?;

        Ok(ActiveSetQp {
            solver,
            symb,
        })
    }

    /// Creates a [`Workspace`] for [`ActiveSetQp::solve_with`].
    pub fn workspace(&self) -> Workspace<L::F>
    {
        Workspace::new(&self.symb)
    }

    /// Solves a QP in a given workspace.
    ///
    /// Same as [`QpSolve::solve`] but the memory is given by `ws`,
    /// so that repeated solves do not allocate it again.
    pub fn solve_with(&self, prob: &ProbQP<L::F>, guess: &QpGuess<L::F>, ws: &mut Workspace<L::F>)
    -> Result<QpSolution<L::F>, SolverError>
    {
        let (n, m) = prob.dim();
        let f0 = L::F::zero();
        let zeros = |len: usize| vec![f0; len];

        let x0 = guess.x0.clone().unwrap_or_else(|| zeros(n));
        let lam_x0 = guess.lam_x0.clone().unwrap_or_else(|| zeros(n));
        let lam_a0 = guess.lam_a0.clone().unwrap_or_else(|| zeros(m));

        let start = QpStart {
            x0: &x0,
            lam_x0: &lam_x0,
            lam_a0: &lam_a0,
        };

        let rslt = self.solver.solve(&self.symb, prob.data(), start, ws)?;

        Ok(rslt.into())
    }
}

impl<L: LinAlg> QpSolve<L::F> for ActiveSetQp<L>
where L::F: Float + Debug + LowerExp
{
    fn name(&self) -> &str
    {
        "as"
    }

    fn solve(&self, prob: &ProbQP<L::F>, guess: &QpGuess<L::F>) -> Result<QpSolution<L::F>, SolverError>
    {
        let mut ws = self.workspace();

        self.solve_with(prob, guess, &mut ws)
    }
}
