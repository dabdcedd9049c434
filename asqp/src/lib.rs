/*!
Convex quadratic programs with `sprs` matrices, solved by the active-set solver of [`asqp_core`].

<script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>

# General usage

1. A problem you want to solve is assumed to be expressed
   as the bound-constrained QP of [`ProbQP`].
1. Choose an [`asqp_core::solver::LinAlg`] implementation to use:
   [`prelude::FloatGeneric`] is `num::Float`-generic and pure Rust.
1. Construct your problem with [`sprs::CsMat`] matrices, CSC or CSR.
1. Create a [`prelude::Solver`] instance and optionally set its parameters.
1. Bind the solver to the problem structure by [`ActiveSetQp::new`]
   and invoke [`QpSolve::solve`] with an initial guess to get a resulted solution.
   A solution can warm-start a next solve of a similar problem by [`QpGuess::from_solution`].

# Examples

A simple QP problem:
\\[
\begin{array}{ll}
{\rm minimize} & {x_0^2 + x_1^2 \over 2} \\\\
{\rm subject \ to} & x_0 + x_1 = 1
\end{array}
\\]

The optimal solution is \\((0.5, 0.5)\\) with the multiplier \\(-0.5\\) of the equality.

```
use float_eq::assert_float_eq;
use sprs::{CsMat, TriMat};
use asqp::prelude::*;
use asqp::*;

//env_logger::init(); // Use any logger crate as `asqp` uses `log` crate.

type La = FloatGeneric<f64>;
type ASolver = Solver<La>;

let n = 2; // x0, x1
let m = 1;

let sym_h = CsMat::<f64>::eye(n);
let vec_g = vec![0.; n];

let mut tri_a = TriMat::new((m, n));
tri_a.add_triplet(0, 0, 1.);
tri_a.add_triplet(0, 1, 1.);
let mat_a: CsMat<f64> = tri_a.to_csc();

let prob = ProbQP::new(&sym_h, vec_g, Some(&mat_a), None, None, Some(vec![1.]), Some(vec![1.])).unwrap();

let s = ASolver::new().par(|p| {
   p.max_iter = 100;
});
let qp = ActiveSetQp::new(s, &prob).unwrap();
let rslt = qp.solve(&prob, &QpGuess::new()).unwrap();

assert_eq!(rslt.status, SolveStatus::Converged);
assert_float_eq!(rslt.x, vec![0.5, 0.5], abs_all <= 1e-9);
assert_float_eq!(rslt.lam_a, vec![-0.5], abs_all <= 1e-9);
```

## Other examples

You can find other tests of the problems under `tests/`.
*/

mod problem;

pub use problem::*;

//

mod qpsolve;

pub use qpsolve::*;

//

/// Prelude
pub mod prelude
{
   pub use asqp_core::solver::{Solver, SolverError, SolverParam, SolveStatus, Status};
   pub use asqp_core::FloatGeneric;
   pub use crate::QpSolve;
}
