//! Active-set QP solver and its traits

mod splitm;
mod linalg;
mod solver_error;
mod active_set;
mod workspace;
mod solver;

pub use linalg::*;
pub use solver_error::*;
pub use active_set::*;
pub use ratio_test::*;
pub use workspace::*;
pub use solver::*;
