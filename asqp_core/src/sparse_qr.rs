use num_traits::{Float, One, Zero};
use faer::dyn_stack::{MemBuffer, MemStack, StackReq};
use faer::sparse::linalg::SupernodalThreshold;
use faer::sparse::linalg::qr::{factorize_symbolic_qr, QrSymbolicParams, SymbolicQr};
use faer::traits::RealField;
use faer::{Conj, MatMut, Par, Spec};
use crate::solver::SolverError;
use crate::{SpPattern, SpMatRef};

//

/// Symbolic sparse QR factorization
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Householder QR \\(K P_c = Q R\\) of a square matrix \\(K\\) by `faer`.
/// The structure (COLAMD column ordering \\(P_c\\), elimination tree and fill of the simplicial factors)
/// is analyzed once by [`QrSymbolic::new`];
/// [`QrSymbolic::factorize_solve`] then factorizes any matrix of the same pattern
/// and solves with it, in the memory of a [`QrWork`].
#[derive(Debug)]
pub struct QrSymbolic
{
    symb: SymbolicQr<usize>,
}

impl QrSymbolic
{
    /// Analyzes the structure of a square matrix.
    ///
    /// Returns [`QrSymbolic`] instance,
    /// or [`SolverError::DimensionMismatch`] if the pattern is not square.
    /// * `pat` is a square sparsity pattern.
    pub fn new(pat: &SpPattern) -> Result<Self, SolverError>
    {
        let (nrow, n) = pat.size();
        if nrow != n {
            log::error!("QR of non-square {}x{} pattern", nrow, n);
            return Err(SolverError::DimensionMismatch);
        }

        // the diagonal of R is read back from the simplicial layout
        let params = QrSymbolicParams {
            supernodal_flop_ratio_threshold: SupernodalThreshold::FORCE_SIMPLICIAL,
            ..Default::default()
        };

        let symb = factorize_symbolic_qr(pat.as_faer(), params).map_err(|e| {
            log::error!("symbolic QR failed: {:?}", e);
            SolverError::WorkShortage
        })?;

        Ok(QrSymbolic {
            symb
        })
    }

    /// Size of the factorized square matrix.
    pub fn size(&self) -> usize
    {
        self.symb.ncols()
    }

    /// Number of nonzeros of \\(R\\) and of the Householder vectors.
    pub fn nnz(&self) -> usize
    {
        self.symb.len_val() - self.size()
    }

    fn stack_req<F: RealField>(&self) -> StackReq
    {
        StackReq::any_of(&[
            self.symb.factorize_numeric_qr_scratch::<F>(Par::Seq, Spec::default()),
            self.symb.solve_in_place_scratch::<F>(1, Par::Seq),
        ])
    }

    /// Factorizes a matrix and solves \\(K z = b\\).
    ///
    /// Returns `Ok` on success,
    /// or [`SolverError::StructuralSingularity`] with the column of `mat` whose \\(|R_{kk}|\\) is
    /// at most `eps_zero` relative to the largest \\(|R_{jj}|\\) (at least one).
    /// * `mat` is a matrix of the analyzed pattern.
    /// * `b` is \\(b\\) before entry, \\(z\\) on exit. It is unspecified on error.
    /// * `work` is a [`QrWork`] created by [`QrWork::new`] with `self`.
    /// * `eps_zero` is a tolerance of singularity.
    pub fn factorize_solve<F: Float + RealField>(&self, mat: SpMatRef<'_, F>, b: &mut [F], work: &mut QrWork<F>, eps_zero: F) -> Result<(), SolverError>
    {
        let n = self.size();
        assert_eq!(mat.size(), (n, n));
        assert_eq!(b.len(), n);
        assert!(work.fits(self));

        let stack = MemStack::new(&mut work.mem);
        let qr = self.symb.factorize_numeric_qr(&mut work.idx, &mut work.val, mat.as_faer(), Par::Seq, stack, Spec::default());
        qr.solve_in_place_with_conj(Conj::No, MatMut::from_column_major_slice_mut(b, n, 1), Par::Seq, stack);

        // column pointers of R lead the indices, values of R lead the values; each diagonal is last in its column
        let r_ptr = &work.idx[.. n + 1];
        let r_diag = |j: usize| work.val[r_ptr[j + 1] - 1].abs();

        let r_max = (0.. n).map(r_diag).fold(F::zero(), F::max);
        let tol = eps_zero * r_max.max(F::one());

        if let Some(j) = (0.. n).find(|&j| !(r_diag(j) > tol)) {
            let (colperm, _) = self.symb.col_perm().arrays();
            let c = colperm[j];
            log::error!("numerically singular at column {}: |R_kk| {:?}", c, r_diag(j).to_f64());
            return Err(SolverError::StructuralSingularity { index: c });
        }

        Ok(())
    }
}

//

/// Memory of [`QrSymbolic::factorize_solve`]: the numeric factors and a `faer` stack.
pub struct QrWork<F>
{
    idx: Vec<usize>,
    val: Vec<F>,
    req: StackReq,
    mem: MemBuffer,
}

impl<F: Float + RealField> QrWork<F>
{
    /// Creates an instance.
    ///
    /// Returns [`QrWork`] instance for `symb`.
    pub fn new(symb: &QrSymbolic) -> Self
    {
        let req = symb.stack_req::<F>();

        QrWork {
            idx: vec![0; symb.symb.len_idx()],
            val: vec![F::zero(); symb.symb.len_val()],
            req,
            mem: MemBuffer::new(req),
        }
    }

    /// Checks if this was created for `symb` or an identical structure.
    pub fn fits(&self, symb: &QrSymbolic) -> bool
    {
        self.idx.len() == symb.symb.len_idx()
        && self.val.len() == symb.symb.len_val()
        && self.req == symb.stack_req::<F>()
    }
}
