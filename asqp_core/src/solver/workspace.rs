//! Memory of a solve

use num_traits::{Float, Zero};
use faer::traits::RealField;
use super::Status;
use crate::{KktSymbolic, QrWork};

pub(crate) fn query_worklen(symb: &KktSymbolic) -> usize
{
    let (n, m) = symb.dim();

    let len_result =
        n +                       // x
        n +                       // lam_x
        m;                        // lam_a

    let len_iteration =
        m +                       // g_eval
        symb.kkt_pattern().nnz() +
        symb.kktd_pattern().nnz() +
        symb.kktd_pattern().nnz() + // kktdt
        n + m +                   // step
        n +                       // dlam_x
        m +                       // dg
        n +                       // grad
        n + m;                    // tau_rec

    len_result + len_iteration
}

pub(crate) fn query_statuslen(symb: &KktSymbolic) -> usize
{
    let (n, m) = symb.dim();

    n + m
}

/// Memory of one in-flight solve.
///
/// Sized once from a [`KktSymbolic`] and reused across solves of the same structure.
/// A solve borrows it exclusively.
pub struct Workspace<F>
{
    work: Vec<F>,
    status: Vec<Status>,
    qr: QrWork<F>,
}

impl<F: Float + RealField> Workspace<F>
{
    /// Creates an instance.
    ///
    /// Returns [`Workspace`] instance for `symb`.
    pub fn new(symb: &KktSymbolic) -> Self
    {
        Workspace {
            work: vec![F::zero(); query_worklen(symb)],
            status: vec![Status::Inactive; query_statuslen(symb)],
            qr: QrWork::new(symb.qr()),
        }
    }

    /// Checks if this was created for `symb` or an identical structure.
    pub fn fits(&self, symb: &KktSymbolic) -> bool
    {
        self.work.len() == query_worklen(symb)
        && self.status.len() == query_statuslen(symb)
        && self.qr.fits(symb.qr())
    }

    pub(crate) fn split(&mut self) -> (&mut [F], &mut [Status], &mut QrWork<F>)
    {
        (&mut self.work, &mut self.status, &mut self.qr)
    }
}
