/*!
A primal-dual active-set solver core for convex quadratic programs.

<script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>

[`solver::Solver`] targets the following convex QP:
\\[
\begin{array}{ll}
{\rm minimize} & {1 \over 2} x^T H x + g^T x \\\\
{\rm subject \ to} & l_x \preceq x \preceq u_x \\\\
& l_a \preceq A x \preceq u_a.
\end{array}
\\]

The algorithm keeps a working set of active bounds,
refactors the KKT system modified by the working set at each iteration
with a sparse QR factorization whose structure is analyzed once ([`KktSymbolic`]),
and takes the largest step that keeps every bound and multiplier sign (a ratio test).

This crate is the core with no dependency on a matrix front end:
sparse matrices are borrowed as [`SpMatRef`] and dense vectors as slices,
and every buffer of a solve lives in a [`solver::Workspace`].
See `asqp` for problems built from `sprs` matrices.

```
use asqp_core::prelude::*;
use asqp_core::{SpPattern, SpMatRef, KktSymbolic};

type La = FloatGeneric<f64>;

// minimize x0^2 + x1^2 - 2 x0 - 2 x1 subject to x0 + x1 = 1
let h = SpPattern::diag(2);
let a = SpPattern::new(1, 2, vec![0, 1, 2], vec![0, 0]).unwrap();
let symb = KktSymbolic::new(&h, &a).unwrap();

let inf = f64::INFINITY;
let prob = QpData {
    h: SpMatRef::new(&h, &[2., 2.]),
    g: &[-2., -2.],
    a: SpMatRef::new(&a, &[1., 1.]),
    lbx: &[-inf, -inf],
    ubx: &[inf, inf],
    lba: &[1.],
    uba: &[1.],
};
let start = QpStart {
    x0: &[0., 0.],
    lam_x0: &[0., 0.],
    lam_a0: &[0.],
};

let mut ws = Workspace::new(&symb);
let rslt = Solver::<La>::new().solve(&symb, prob, start, &mut ws).unwrap();

assert_eq!(rslt.status, SolveStatus::Converged);
assert!((rslt.x[0] - 0.5).abs() < 1e-9);
assert!((rslt.x[1] - 0.5).abs() < 1e-9);
```
*/

pub mod solver;

//

mod floatgeneric;

pub use floatgeneric::*;

//

mod spmat;

pub use spmat::*;

//

mod sparse_qr;

pub use sparse_qr::*;

//

mod kkt;

pub use kkt::*;

//

/// Prelude
pub mod prelude
{
    pub use crate::solver::{Solver, SolverParam, SolverError, SolveStatus, QpData, QpStart, QpResult, Workspace, Status, LinAlg};
    pub use crate::FloatGeneric;
}
