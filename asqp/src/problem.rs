mod qp;

pub use qp::*;
