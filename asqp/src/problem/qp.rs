use num_traits::Float;
use core::fmt::Debug;
use faer::traits::RealField;
use sprs::CsMat;
use asqp_core::solver::{SolverError, SolveStatus, Status, QpData, QpResult, check_bounds};
use asqp_core::{SpPattern, SpMatRef};

//

// nonzeros of `mat` into a compressed sparse column pattern and values, from either storage
fn split_csc<F: Float + Default>(mat: &CsMat<F>) -> Result<(SpPattern, Vec<F>), SolverError>
{
    let csc = mat.to_csc();
    let (nrow, ncol) = csc.shape();
    let (colptr, row, val) = csc.into_raw_storage();

    let pat = SpPattern::new(nrow, ncol, colptr, row)?;
    Ok((pat, val))
}

fn or_fill<F: Float>(vec: Option<Vec<F>>, len: usize, fill: F) -> Vec<F>
{
    vec.unwrap_or_else(|| vec![fill; len])
}

//

/// Quadratic program
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// The problem is
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & {1 \over 2} x^T H x + g^T x \\\\
/// {\rm subject \ to} & l_x \preceq x \preceq u_x \\\\
/// & l_a \preceq A x \preceq u_a,
/// \end{array}
/// \\]
/// where
/// * variables \\( x \in \mathbb{R}^n \\)
/// * \\( H \in \mathcal{S}\_{+}^n \\), \\( g \in \mathbb{R}^n \\)
/// * \\( A \in \mathbb{R}^{m \times n} \\)
/// * \\( l_x, u_x \in (\mathbb{R} \cup \\{\pm\infty\\})^n \\), \\( l_a, u_a \in (\mathbb{R} \cup \\{\pm\infty\\})^m \\).
///
/// An equality is expressed by a bound pair \\( l = u \\).
/// Positive semidefiniteness of \\(H\\) is assumed and not verified.
#[derive(Debug, Clone)]
pub struct ProbQP<F: Float>
{
    sym_h: SpPattern,
    h_val: Vec<F>,
    vec_g: Vec<F>,
    mat_a: SpPattern,
    a_val: Vec<F>,
    vec_lbx: Vec<F>,
    vec_ubx: Vec<F>,
    vec_lba: Vec<F>,
    vec_uba: Vec<F>,
}

impl<F: Float + RealField + Debug> ProbQP<F>
{
    /// Creates a QP with given data.
    ///
    /// Returns a [`ProbQP`] instance, or [`SolverError::DimensionMismatch`] if the data are inconsistent.
    /// * `sym_h` is \\(H\\), symmetric with both triangles stored, CSC or CSR.
    /// * `vec_g` is \\(g\\).
    /// * `mat_a` is \\(A\\), CSC or CSR. `None` means no constraint (\\(m = 0\\)).
    /// * `vec_lbx` is \\(l_x\\). `None` means \\(-\infty\\).
    /// * `vec_ubx` is \\(u_x\\). `None` means \\(+\infty\\).
    /// * `vec_lba` is \\(l_a\\). `None` means \\(-\infty\\).
    /// * `vec_uba` is \\(u_a\\). `None` means \\(+\infty\\).
    pub fn new(
        sym_h: &CsMat<F>, vec_g: Vec<F>,
        mat_a: Option<&CsMat<F>>,
        vec_lbx: Option<Vec<F>>, vec_ubx: Option<Vec<F>>,
        vec_lba: Option<Vec<F>>, vec_uba: Option<Vec<F>>,
    ) -> Result<Self, SolverError>
    where F: Default
    {
        let (sym_h, h_val) = split_csc(sym_h)?;
        let (hr, n) = sym_h.size();
        if hr != n || vec_g.len() != n {
            log::error!("Size mismatch: sym_h{:?}, vec_g {}", sym_h.size(), vec_g.len());
            return Err(SolverError::DimensionMismatch);
        }
        Self::check_sym(&sym_h, &h_val)?;

        let (mat_a, a_val) = match mat_a {
            Some(mat_a) => split_csc(mat_a)?,
            None => (SpPattern::empty(0, n), Vec::new()),
        };
        let (m, ac) = mat_a.size();
        if ac != n {
            log::error!("Size mismatch: sym_h{:?}, mat_a{:?}", sym_h.size(), mat_a.size());
            return Err(SolverError::DimensionMismatch);
        }

        let inf = F::infinity();
        let vec_lbx = or_fill(vec_lbx, n, -inf);
        let vec_ubx = or_fill(vec_ubx, n, inf);
        let vec_lba = or_fill(vec_lba, m, -inf);
        let vec_uba = or_fill(vec_uba, m, inf);

        if vec_lbx.len() != n || vec_ubx.len() != n || vec_lba.len() != m || vec_uba.len() != m {
            log::error!("Size mismatch: lbx {}, ubx {} for n {}, lba {}, uba {} for m {}",
                vec_lbx.len(), vec_ubx.len(), n, vec_lba.len(), vec_uba.len(), m);
            return Err(SolverError::DimensionMismatch);
        }
        check_bounds("x", &vec_lbx, &vec_ubx)?;
        check_bounds("a", &vec_lba, &vec_uba)?;

        Ok(ProbQP {
            sym_h, h_val,
            vec_g,
            mat_a, a_val,
            vec_lbx, vec_ubx,
            vec_lba, vec_uba,
        })
    }

    fn check_sym(sym_h: &SpPattern, h_val: &[F]) -> Result<(), SolverError>
    {
        let (_, n) = sym_h.size();

        for c in 0.. n {
            for p in sym_h.col(c) {
                let r = sym_h.row()[p];
                let sym = sym_h.find(c, r).map(|q| h_val[q]);
                if sym != Some(h_val[p]) {
                    log::error!("sym_h not symmetric at ({}, {})", r, c);
                    return Err(SolverError::DimensionMismatch);
                }
            }
        }

        Ok(())
    }

    /// Problem dimensions.
    ///
    /// Returns a tuple of a number of variables \\(n\\) and a number of constraints \\(m\\).
    pub fn dim(&self) -> (usize, usize)
    {
        (self.sym_h.size().1, self.mat_a.size().0)
    }

    pub fn h_pattern(&self) -> &SpPattern
    {
        &self.sym_h
    }

    pub fn a_pattern(&self) -> &SpPattern
    {
        &self.mat_a
    }

    /// Borrows the problem as [`QpData`] for [`asqp_core::solver::Solver`].
    pub fn data(&self) -> QpData<'_, F>
    {
        QpData {
            h: SpMatRef::new(&self.sym_h, &self.h_val),
            g: &self.vec_g,
            a: SpMatRef::new(&self.mat_a, &self.a_val),
            lbx: &self.vec_lbx,
            ubx: &self.vec_ubx,
            lba: &self.vec_lba,
            uba: &self.vec_uba,
        }
    }
}

//

/// Initial guess of [`crate::QpSolve::solve`].
///
/// `None` means zeros.
#[derive(Debug, Clone, Default)]
pub struct QpGuess<F>
{
    pub x0: Option<Vec<F>>,
    pub lam_x0: Option<Vec<F>>,
    pub lam_a0: Option<Vec<F>>,
}

impl<F: Float> QpGuess<F>
{
    /// Creates a guess of all zeros.
    pub fn new() -> Self
    {
        QpGuess {
            x0: None,
            lam_x0: None,
            lam_a0: None,
        }
    }

    /// Creates a guess from a previous solution to warm-start.
    pub fn from_solution(sol: &QpSolution<F>) -> Self
    {
        QpGuess {
            x0: Some(sol.x.clone()),
            lam_x0: Some(sol.lam_x.clone()),
            lam_a0: Some(sol.lam_a.clone()),
        }
    }
}

/// Solution of [`crate::QpSolve::solve`].
#[derive(Debug, Clone, PartialEq)]
pub struct QpSolution<F>
{
    /// Optimal \\(x\\).
    pub x: Vec<F>,
    /// Objective value.
    pub cost: F,
    /// Multipliers of the variable bounds.
    pub lam_x: Vec<F>,
    /// Multipliers of the constraint bounds.
    pub lam_a: Vec<F>,
    /// Active set of the variables.
    pub status_x: Vec<Status>,
    /// Active set of the constraints.
    pub status_a: Vec<Status>,
    /// Number of iterations done.
    pub iter: usize,
    pub status: SolveStatus,
}

impl<'w, F: Float> From<QpResult<'w, F>> for QpSolution<F>
{
    fn from(rslt: QpResult<'w, F>) -> Self
    {
        QpSolution {
            x: rslt.x.to_vec(),
            cost: rslt.cost,
            lam_x: rslt.lam_x.to_vec(),
            lam_a: rslt.lam_a.to_vec(),
            status_x: rslt.status_x.to_vec(),
            status_a: rslt.status_a.to_vec(),
            iter: rslt.iter,
            status: rslt.status,
        }
    }
}
