//! Primal-dual active-set QP solver

use num_traits::{Float, One, Zero};
use core::fmt::{Debug, Display, LowerExp};
use super::{LinAlg, SolverError, Status, StatusDisplay, Workspace, Blocking, RatioTest, Segment};
use super::{seed_active_set, ratio_test};
use crate::{KktSymbolic, QrWork, SpMatRef, splitm, splitm_mut};

//

/// Solver parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParam<F: Float>
{
    /// Max iteration number. Shall be positive.
    pub max_iter: usize,
    /// Tolerance of small positive value to detect a singular KKT matrix.
    pub eps_zero: F,
    /// Output details of each iteration (iterate, active set, residual, step and blocking decision)
    /// at debug level instead of trace level.
    pub verbose: bool,
    /// Period of iterations to output progress log at debug level; other iterations at trace level.
    pub log_period: usize,
}

impl<F: Float> Default for SolverParam<F>
{
    fn default() -> Self
    {
        SolverParam {
            max_iter: 1000,
            eps_zero: F::from(1e-12).unwrap_or_else(F::epsilon),
            verbose: false,
            log_period: 1,
        }
    }
}

//

/// Numeric data of a QP.
#[derive(Debug, Clone, Copy)]
pub struct QpData<'a, F>
{
    /// \\(H\\), symmetric with both triangles stored.
    pub h: SpMatRef<'a, F>,
    /// \\(g\\).
    pub g: &'a [F],
    /// \\(A\\).
    pub a: SpMatRef<'a, F>,
    /// Lower bounds of \\(x\\), `-inf` if unbounded.
    pub lbx: &'a [F],
    /// Upper bounds of \\(x\\), `inf` if unbounded.
    pub ubx: &'a [F],
    /// Lower bounds of \\(Ax\\), `-inf` if unbounded.
    pub lba: &'a [F],
    /// Upper bounds of \\(Ax\\), `inf` if unbounded.
    pub uba: &'a [F],
}

/// Initial guess of a solve.
#[derive(Debug, Clone, Copy)]
pub struct QpStart<'a, F>
{
    pub x0: &'a [F],
    pub lam_x0: &'a [F],
    pub lam_a0: &'a [F],
}

/// Termination status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus
{
    /// A full step kept every bound and multiplier sign.
    Converged,
    /// Max iteration number reached; the last iterate is reported.
    IterationLimit,
}

/// Result of [`Solver::solve`], borrowing the [`Workspace`].
#[derive(Debug)]
pub struct QpResult<'w, F>
{
    pub x: &'w [F],
    pub lam_x: &'w [F],
    pub lam_a: &'w [F],
    /// Active set of the variables.
    pub status_x: &'w [Status],
    /// Active set of the constraints.
    pub status_a: &'w [Status],
    /// Objective value.
    pub cost: F,
    /// Number of iterations done.
    pub iter: usize,
    pub status: SolveStatus,
}

//

/// Primal-dual active-set QP solver
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// The solver targets the following convex QP:
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & {1 \over 2} x^T H x + g^T x \\\\
/// {\rm subject \ to} & l_x \preceq x \preceq u_x \\\\
/// & l_a \preceq A x \preceq u_a,
/// \end{array}
/// \\]
/// where
/// * variables \\( x \in \mathbb{R}^n \\)
/// * \\( H \in \mathcal{S}\_{+}^n \\)
/// * \\( A \in \mathbb{R}^{m \times n} \\)
/// * \\( l_x = u_x \\) or \\( l_a = u_a \\) for an equality.
///
/// Each iteration solves a KKT system modified by the current active set,
/// with the sparse QR factorization analyzed by [`KktSymbolic`],
/// and takes the largest step that keeps the bounds and the multiplier signs.
/// The solution gives the multipliers \\(\lambda_x\\) and \\(\lambda_a\\) as well:
/// non-positive at a lower bound, non-negative at an upper bound, zero if inactive.
pub struct Solver<L: LinAlg>
{
    /// solver parameters.
    pub par: SolverParam<L::F>,
}

impl<L: LinAlg> Solver<L>
{
    /// Creates an instance.
    ///
    /// Returns [`Solver`] instance.
    pub fn new() -> Self
    {
        Solver {
            par: SolverParam::default(),
        }
    }

    /// Changes solver parameters.
    ///
    /// Returns [`Solver`] with its parameters changed.
    /// * `f` is a function to change parameters given by its argument.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut SolverParam<L::F>)
    {
        f(&mut self.par);
        self
    }
}

impl<L: LinAlg> Solver<L>
where L::F: Float + Debug + LowerExp
{
    /// Starts to solve a QP.
    ///
    /// Returns `Ok` with [`QpResult`] borrowing `ws`,
    /// or `Err` with [`SolverError`] type.
    /// * `symb` is the KKT structure, built from the patterns of `prob`.
    /// * `prob` is the numeric data of the QP.
    /// * `start` is the initial guess.
    /// * `ws` is a [`Workspace`] created for `symb`. [`Solver::solve`] does not rely on dynamic heap allocation.
    pub fn solve<'w>(&self,
        symb: &KktSymbolic, prob: QpData<'_, L::F>, start: QpStart<'_, L::F>,
        ws: &'w mut Workspace<L::F>
    ) -> Result<QpResult<'w, L::F>, SolverError>
    {
        self.check(symb, &prob, &start)?;

        if !ws.fits(symb) {
            log::error!("Workspace not created for the KKT structure of n {}, m {}", symb.dim().0, symb.dim().1);
            return Err(SolverError::WorkShortage);
        }

        log::debug!("{:?}", self.par);

        let core = SolverCore::<L> {
            par: &self.par,
            symb,
            prob,
        };

        let (work, status, qr_work) = ws.split();
        let rslt = core.solve(start, work, status, qr_work);

        let (n, m) = symb.dim();
        let work: &'w [L::F] = work;
        let status: &'w [Status] = status;
        splitm!(work, (sol_x; n), (sol_lam_x; n), (sol_lam_a; m));
        splitm!(status, (sol_status_x; n), (sol_status_a; m));

        rslt.map(|(cost, iter, st)| QpResult {
            x: sol_x,
            lam_x: sol_lam_x,
            lam_a: sol_lam_a,
            status_x: sol_status_x,
            status_a: sol_status_a,
            cost,
            iter,
            status: st,
        })
    }

    fn check(&self, symb: &KktSymbolic, prob: &QpData<'_, L::F>, start: &QpStart<'_, L::F>) -> Result<(), SolverError>
    {
        if self.par.max_iter == 0 {
            log::error!("max_iter must be positive");
            return Err(SolverError::InvalidParam);
        }

        let (n, m) = symb.dim();

        if prob.h.pattern() != symb.h_pattern() || prob.a.pattern() != symb.a_pattern() {
            log::error!("Pattern mismatch: h{:?}, a{:?} for n {}, m {}", prob.h.size(), prob.a.size(), n, m);
            return Err(SolverError::DimensionMismatch);
        }

        let lens_x = [prob.g.len(), prob.lbx.len(), prob.ubx.len(), start.x0.len(), start.lam_x0.len()];
        let lens_a = [prob.lba.len(), prob.uba.len(), start.lam_a0.len()];
        if lens_x.iter().any(|&l| l != n) || lens_a.iter().any(|&l| l != m) {
            log::error!("Size mismatch: {:?} for n {}, {:?} for m {}", lens_x, n, lens_a, m);
            return Err(SolverError::DimensionMismatch);
        }

        check_bounds("x", prob.lbx, prob.ubx)?;
        check_bounds("a", prob.lba, prob.uba)?;

        let guess = [("x0", start.x0), ("lam_x0", start.lam_x0), ("lam_a0", start.lam_a0)];
        for (name, v) in guess {
            if let Some(i) = v.iter().position(|e| !e.is_finite()) {
                log::error!("Non-finite guess: {}[{}] {:?}", name, i, v[i]);
                return Err(SolverError::DimensionMismatch);
            }
        }

        Ok(())
    }
}

/// Checks bound pairs.
///
/// Returns [`SolverError::DimensionMismatch`] if `lb[i] > ub[i]`, either is NaN,
/// or an equality `lb[i] == ub[i]` is infinite.
/// * `name` is a name of the bounds for logging.
/// * `lb` and `ub` are the bounds.
pub fn check_bounds<F: Float + Debug>(name: &str, lb: &[F], ub: &[F]) -> Result<(), SolverError>
{
    if lb.len() != ub.len() {
        log::error!("Size mismatch: lb{} {}, ub{} {}", name, lb.len(), name, ub.len());
        return Err(SolverError::DimensionMismatch);
    }

    for (i, (&l, &u)) in lb.iter().zip(ub).enumerate() {
        if !(l <= u) || (l == u && !l.is_finite()) {
            log::error!("Bound mismatch: lb{}[{}] {:?}, ub{}[{}] {:?}", name, i, l, name, i, u);
            return Err(SolverError::DimensionMismatch);
        }
    }

    Ok(())
}

//

/// Name of an entry, variables first, then constraints.
struct Entry(usize, usize);

impl Display for Entry
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result
    {
        let Entry(k, n) = *self;

        if k < n {
            write!(f, "x[{}]", k)
        }
        else {
            write!(f, "a[{}]", k - n)
        }
    }
}

struct SolverCore<'a, L: LinAlg>
{
    par: &'a SolverParam<L::F>,
    symb: &'a KktSymbolic,
    prob: QpData<'a, L::F>,
}

impl<'a, L: LinAlg> SolverCore<'a, L>
where L::F: Float + Debug + LowerExp
{
    fn solve(&self, start: QpStart<'_, L::F>, work: &mut [L::F], status: &mut [Status], qr_work: &mut QrWork<L::F>)
    -> Result<(L::F, usize, SolveStatus), SolverError>
    {
        log::info!("----- Initializing");
        let (n, m) = self.symb.dim();
        let lv = if self.par.verbose {log::Level::Debug} else {log::Level::Trace};

        let f0 = L::F::zero();
        let f1 = L::F::one();

        splitm_mut!(work,
            (x; n),
            (lam_x; n),
            (lam_a; m),
            (g_eval; m),
            (kkt; self.symb.kkt_pattern().nnz()),
            (kktd; self.symb.kktd_pattern().nnz()),
            (kktdt; self.symb.kktd_pattern().nnz()),
            (step; n + m),
            (dlam_x; n),
            (dg; m),
            (grad; n),
            (tau_rec; n + m)
        );
        let (status_x, status_a) = status.split_at_mut(n);
        let status_a = &mut status_a[.. m];

        // Initialize iterate and active set
        L::copy(start.x0, x);
        L::copy(start.lam_x0, lam_x);
        L::copy(start.lam_a0, lam_a);
        self.prob.a.op(f1, x, f0, g_eval);
        seed_active_set(self.prob.lbx, self.prob.ubx, x, lam_x, status_x);
        seed_active_set(self.prob.lba, self.prob.uba, g_eval, lam_a, status_a);

        log::log!(lv, "lbx {:?}", self.prob.lbx);
        log::log!(lv, "ubx {:?}", self.prob.ubx);
        log::log!(lv, "lba {:?}", self.prob.lba);
        log::log!(lv, "uba {:?}", self.prob.uba);

        self.symb.assemble(self.prob.h.values(), self.prob.a.values(), kkt);
        let mut cost = self.cost(x);

        // Iteration
        log::info!("----- Started");
        for i in 0.. self.par.max_iter {
            let log_trig = self.par.log_period > 0 && i % self.par.log_period == 0;

            log::log!(lv, "{}: x {:?}", i, x);
            log::log!(lv, "{}: lam_x {:?}", i, lam_x);
            log::log!(lv, "{}: lam_a {:?}", i, lam_a);
            log::log!(lv, "{}: active set x {}, a {}", i, StatusDisplay(status_x), StatusDisplay(status_a));

            // Modified KKT matrix
            self.symb.apply_active_set(kkt, status_x, status_a, kktd);

            // Newton step
            self.calc_residual(x, g_eval, lam_a, status_x, status_a, grad, step);
            log::log!(lv, "{}: residual {:?}", i, step);
            L::scale(-f1, step);
            self.symb.solve_trans(kktd, kktdt, step, qr_work, self.par.eps_zero)?;
            if let Some(k) = step.iter().position(|e| !e.is_finite()) {
                log::error!("Non-finite step at {}", Entry(k, n));
                return Err(SolverError::StructuralSingularity { index: k });
            }

            splitm!(step, (dx; n), (dlam_a; m));
            self.calc_step(dx, dlam_a, grad, lam_x, status_x, dlam_x, dg);
            log::log!(lv, "{}: dx {:?}", i, dx);
            log::log!(lv, "{}: dlam_x {:?}", i, dlam_x);
            log::log!(lv, "{}: dlam_a {:?}", i, dlam_a);

            // Ratio test
            let rt = ratio_test(
                &Segment {
                    lb: self.prob.lbx, ub: self.prob.ubx,
                    val: x, dval: dx,
                    lam: lam_x, dlam: dlam_x,
                    status: status_x,
                },
                &Segment {
                    lb: self.prob.lba, ub: self.prob.uba,
                    val: g_eval, dval: dg,
                    lam: lam_a, dlam: dlam_a,
                    status: status_a,
                },
                tau_rec
            )?;
            self.log_block(lv, i, &rt, tau_rec);

            // Update iterate and active set
            L::add(rt.tau, dx, x);
            L::add(rt.tau, dlam_x, lam_x);
            L::add(rt.tau, dlam_a, lam_a);
            if let Some((k, kind)) = rt.block {
                if k < n {
                    Self::flip(kind, k, self.prob.lbx, self.prob.ubx, Some(&mut *x), lam_x, status_x);
                }
                else {
                    Self::flip(kind, k - n, self.prob.lba, self.prob.uba, None, lam_a, status_a);
                }
            }
            Self::settle(self.prob.lbx, self.prob.ubx, lam_x, status_x);
            Self::settle(self.prob.lba, self.prob.uba, lam_a, status_a);

            self.prob.a.op(f1, x, f0, g_eval);
            cost = self.cost(x);

            let term_conv = rt.block.is_none();

            if log_trig || term_conv {
                log::debug!("{}: cost {:.3e} tau {:.3e}", i, cost, rt.tau);
            }
            else {
                log::trace!("{}: cost {:.3e} tau {:.3e}", i, cost, rt.tau);
            }

            if term_conv {
                log::trace!("{}: x {:?}", i, x);
                log::info!("----- Converged");

                return Ok((cost, i + 1, SolveStatus::Converged));
            }
        }

        log::warn!("----- IterationLimit");

        Ok((cost, self.par.max_iter, SolveStatus::IterationLimit))
    }

    fn cost(&self, x: &[L::F]) -> L::F
    {
        let f1 = L::F::one();
        let half = (f1 + f1).recip();

        half * self.prob.h.bilin(x, x) + L::inner_prod(self.prob.g, x)
    }

    // grad is Hx + g + A^T lam_a, res the residual of the modified KKT system
    fn calc_residual(&self,
        x: &[L::F], g_eval: &[L::F], lam_a: &[L::F],
        status_x: &[Status], status_a: &[Status],
        grad: &mut [L::F], res: &mut [L::F])
    {
        let (n, m) = self.symb.dim();
        let f0 = L::F::zero();
        let f1 = L::F::one();

        L::copy(self.prob.g, grad);
        self.prob.h.op(f1, x, f1, grad);
        self.prob.a.trans_op(f1, lam_a, f1, grad);

        splitm_mut!(res, (res_x; n), (res_a; m));

        for i in 0.. n {
            res_x[i] = match status_x[i].bound(self.prob.lbx[i], self.prob.ubx[i]) {
                Some(b) => x[i] - b,
                None => grad[i],
            };
        }
        for j in 0.. m {
            res_a[j] = match status_a[j].bound(self.prob.lba[j], self.prob.uba[j]) {
                Some(b) => g_eval[j] - b,
                None => f0,
            };
        }
    }

    // multipliers of the active variables move to their values at the Newton point
    fn calc_step(&self,
        dx: &[L::F], dlam_a: &[L::F], grad: &[L::F], lam_x: &[L::F], status_x: &[Status],
        dlam_x: &mut [L::F], dg: &mut [L::F])
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();

        self.prob.a.op(f1, dx, f0, dg);

        self.prob.h.op(-f1, dx, f0, dlam_x);
        self.prob.a.trans_op(-f1, dlam_a, f1, dlam_x);

        for (i, d) in dlam_x.iter_mut().enumerate() {
            *d = if status_x[i].is_active() {
                *d - grad[i] - lam_x[i]
            }
            else {
                f0
            };
        }
    }

    fn log_block(&self, lv: log::Level, i: usize, rt: &RatioTest<L::F>, tau_rec: &[L::F])
    {
        if !log::log_enabled!(lv) {
            return;
        }

        let (n, _) = self.symb.dim();

        for (k, t) in tau_rec.iter().enumerate() {
            if *t == rt.tau {
                log::log!(lv, "{}: affected {}", i, Entry(k, n));
            }
        }

        match rt.block {
            None =>
                log::log!(lv, "{}: full step", i),
            Some((k, Blocking::Removed)) =>
                log::log!(lv, "{}: bound removed for {}, tau {:.3e}", i, Entry(k, n), rt.tau),
            Some((k, Blocking::Lower)) =>
                log::log!(lv, "{}: lower bound added for {}, tau {:.3e}", i, Entry(k, n), rt.tau),
            Some((k, Blocking::Upper)) =>
                log::log!(lv, "{}: upper bound added for {}, tau {:.3e}", i, Entry(k, n), rt.tau),
        }
    }

    // a newly active variable snaps onto its bound; a removed multiplier becomes zero
    fn flip(kind: Blocking, k: usize, lb: &[L::F], ub: &[L::F], val: Option<&mut [L::F]>, lam: &mut [L::F], status: &mut [Status])
    {
        status[k] = match kind {
            Blocking::Lower => Status::Lower,
            Blocking::Upper => Status::Upper,
            Blocking::Removed => Status::Inactive,
        };

        if let (Some(val), Some(b)) = (val, status[k].bound(lb[k], ub[k])) {
            val[k] = b;
        }
        lam[k] = status[k].clip(lam[k]);
    }

    // equalities follow the sign of their multipliers
    fn settle(lb: &[L::F], ub: &[L::F], lam: &mut [L::F], status: &mut [Status])
    {
        let f0 = L::F::zero();

        for i in 0.. status.len() {
            if status[i].is_active() && lb[i] == ub[i] {
                if lam[i] > f0 {
                    status[i] = Status::Upper;
                }
                else if lam[i] < f0 {
                    status[i] = Status::Lower;
                }
            }
            lam[i] = status[i].clip(lam[i]);
        }
    }
}
