use num_traits::{Float, One, Zero};
use faer::traits::RealField;
use crate::solver::{SolverError, Status};
use crate::{SpPattern, SpMatRef, QrSymbolic, QrWork};

//

/// KKT system structure of a QP
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Built once per pair of patterns of \\(H\\) (\\(n \times n\\)) and \\(A\\) (\\(m \times n\\)),
/// and shared read-only by any number of solves.
/// The KKT matrix is
/// \\[
/// K = \begin{bmatrix} H & A^T \\\\ A & 0 \end{bmatrix},
/// \\]
/// and its diagonal-padded variant \\(K_d\\) keeps room for the columns replaced by the active set.
/// The sparse QR is analyzed on \\(K_d^T\\), whose factorization solves the Newton system.
#[derive(Debug)]
pub struct KktSymbolic
{
    n: usize,
    m: usize,
    h: SpPattern,
    a: SpPattern,
    kkt: SpPattern,
    kktd: SpPattern,
    h_map: Vec<usize>,
    a_map: Vec<usize>,
    at_map: Vec<usize>,
    kktd_map: Vec<usize>,
    kktd_diag: Vec<usize>,
    kktdt: SpPattern,
    kktdt_map: Vec<usize>,
    qr: QrSymbolic,
}

impl KktSymbolic
{
    /// Analyzes the KKT structure.
    ///
    /// Returns [`KktSymbolic`] instance.
    /// * `h` is a pattern of \\(H\\), both triangles stored.
    /// * `a` is a pattern of \\(A\\).
    pub fn new(h: &SpPattern, a: &SpPattern) -> Result<Self, SolverError>
    {
        let (hr, n) = h.size();
        let (m, ac) = a.size();
        if hr != n || ac != n {
            log::error!("H of {}x{} and A of {}x{}", hr, n, m, ac);
            return Err(SolverError::DimensionMismatch);
        }

        let (at, at_perm) = a.transpose();
        let mut at_src = vec![0; a.nnz()];
        for (p, &q) in at_perm.iter().enumerate() {
            at_src[q] = p;
        }

        let mut colptr = Vec::with_capacity(n + m + 1);
        let mut row = Vec::with_capacity(h.nnz() + 2 * a.nnz());
        let mut h_map = vec![0; h.nnz()];
        let mut a_map = vec![0; a.nnz()];
        let mut at_map = vec![0; a.nnz()];

        colptr.push(0);
        for c in 0.. n {
            for p in h.col(c) {
                h_map[p] = row.len();
                row.push(h.row()[p]);
            }
            for p in a.col(c) {
                a_map[p] = row.len();
                row.push(n + a.row()[p]);
            }
            colptr.push(row.len());
        }
        for j in 0.. m {
            for q in at.col(j) {
                at_map[at_src[q]] = row.len();
                row.push(at.row()[q]);
            }
            colptr.push(row.len());
        }

        let kkt = SpPattern::new(n + m, n + m, colptr, row)?;
        let (kktd, kktd_map) = kkt.add_diag();

        let mut kktd_diag = Vec::with_capacity(n + m);
        for c in 0.. n + m {
            let d = kktd.find(c, c).ok_or(SolverError::StructuralSingularity { index: c })?;
            kktd_diag.push(d);
        }

        let (kktdt, kktdt_map) = kktd.transpose();
        let qr = QrSymbolic::new(&kktdt)?;

        log::info!("number of variables:   {}", n);
        log::info!("number of constraints: {}", m);
        log::debug!("nonzeros of KKT: {}, padded: {}, QR factors: {}", kkt.nnz(), kktd.nnz(), qr.nnz());

        Ok(KktSymbolic {
            n, m,
            h: h.clone(),
            a: a.clone(),
            kkt, kktd,
            h_map, a_map, at_map,
            kktd_map, kktd_diag,
            kktdt, kktdt_map,
            qr,
        })
    }

    /// Problem dimensions.
    ///
    /// Returns a tuple of a number of variables and a number of constraints.
    pub fn dim(&self) -> (usize, usize)
    {
        (self.n, self.m)
    }

    pub fn h_pattern(&self) -> &SpPattern
    {
        &self.h
    }

    pub fn a_pattern(&self) -> &SpPattern
    {
        &self.a
    }

    pub fn kkt_pattern(&self) -> &SpPattern
    {
        &self.kkt
    }

    pub fn kktd_pattern(&self) -> &SpPattern
    {
        &self.kktd
    }

    pub fn qr(&self) -> &QrSymbolic
    {
        &self.qr
    }

    /// Assembles \\(K\\) from the values of \\(H\\) and \\(A\\).
    ///
    /// * `h_val` is a slice of nonzeros of \\(H\\).
    /// * `a_val` is a slice of nonzeros of \\(A\\).
    /// * `kkt` is a slice of nonzeros of \\(K\\) on exit.
    pub fn assemble<F: Float + RealField>(&self, h_val: &[F], a_val: &[F], kkt: &mut [F])
    {
        assert_eq!(h_val.len(), self.h.nnz());
        assert_eq!(a_val.len(), self.a.nnz());
        assert_eq!(kkt.len(), self.kkt.nnz());

        for e in kkt.iter_mut() {
            *e = F::zero();
        }
        for (&q, &v) in self.h_map.iter().zip(h_val) {
            kkt[q] = kkt[q] + v;
        }
        for (&q, &v) in self.a_map.iter().zip(a_val) {
            kkt[q] = kkt[q] + v;
        }
        for (&q, &v) in self.at_map.iter().zip(a_val) {
            kkt[q] = kkt[q] + v;
        }
    }

    /// Projects \\(K\\) into \\(K_d\\) and modifies the columns of the active set.
    ///
    /// A column of an active variable becomes a unit column,
    /// a column of an inactive constraint becomes a negated unit column,
    /// and the other columns are copied from \\(K\\).
    /// * `kkt` is a slice of nonzeros of \\(K\\).
    /// * `status_x` is a slice of [`Status`] of the variables.
    /// * `status_a` is a slice of [`Status`] of the constraints.
    /// * `kktd` is a slice of nonzeros of \\(K_d\\) on exit.
    pub fn apply_active_set<F: Float + RealField>(&self, kkt: &[F], status_x: &[Status], status_a: &[Status], kktd: &mut [F])
    {
        assert_eq!(kkt.len(), self.kkt.nnz());
        assert_eq!(status_x.len(), self.n);
        assert_eq!(status_a.len(), self.m);
        assert_eq!(kktd.len(), self.kktd.nnz());

        let f0 = F::zero();
        let f1 = F::one();

        for e in kktd.iter_mut() {
            *e = f0;
        }
        for (&d, &v) in self.kktd_map.iter().zip(kkt) {
            kktd[d] = v;
        }

        for (c, st) in status_x.iter().enumerate() {
            if st.is_active() {
                self.set_unit_col(c, f1, kktd);
            }
        }
        for (j, st) in status_a.iter().enumerate() {
            if !st.is_active() {
                self.set_unit_col(self.n + j, -f1, kktd);
            }
        }
    }

    fn set_unit_col<F: Float + RealField>(&self, c: usize, diag: F, kktd: &mut [F])
    {
        for p in self.kktd.col(c) {
            kktd[p] = F::zero();
        }
        kktd[self.kktd_diag[c]] = diag;
    }

    /// Factorizes \\(K_d\\) and solves \\(K_d^T z = b\\).
    ///
    /// Returns `Ok` on success, or [`SolverError::StructuralSingularity`] with the singular row of \\(K_d\\).
    /// * `kktd` is a slice of nonzeros of \\(K_d\\).
    /// * `kktdt` is a work slice of the same length, the nonzeros of \\(K_d^T\\) on exit.
    /// * `b` is \\(b\\) before entry, \\(z\\) on exit.
    /// * `work` is a [`QrWork`] of [`KktSymbolic::qr`].
    /// * `eps_zero` is a tolerance of singularity.
    pub fn solve_trans<F: Float + RealField>(&self, kktd: &[F], kktdt: &mut [F], b: &mut [F], work: &mut QrWork<F>, eps_zero: F)
    -> Result<(), SolverError>
    {
        assert_eq!(kktd.len(), self.kktd.nnz());
        assert_eq!(kktdt.len(), self.kktdt.nnz());

        for (&q, &v) in self.kktdt_map.iter().zip(kktd) {
            kktdt[q] = v;
        }

        self.qr.factorize_solve(SpMatRef::new(&self.kktdt, kktdt), b, work, eps_zero)
    }
}

//

#[test]
fn test_kkt_assemble()
{
    use float_eq::assert_float_eq;

    // H = [2 1; 1 0], A = [3 4]
    let h = SpPattern::new(2, 2, vec![0, 2, 3], vec![0, 1, 0]).unwrap();
    let a = SpPattern::new(1, 2, vec![0, 1, 2], vec![0, 0]).unwrap();
    let symb = KktSymbolic::new(&h, &a).unwrap();

    assert_eq!(symb.dim(), (2, 1));
    assert_eq!(symb.kkt_pattern().size(), (3, 3));
    assert_eq!(symb.kktd_pattern().size(), (3, 3));

    let mut kkt = vec![0.; symb.kkt_pattern().nnz()];
    symb.assemble(&[2., 1., 1.], &[3., 4.], &mut kkt);

    let mut y = [0.; 3];
    SpMatRef::new(symb.kkt_pattern(), &kkt).op(1., &[1., 10., 100.], 0., &mut y);
    assert_float_eq!(y, [312., 401., 43.], abs_all <= 1e-12);

    let mut kktd = vec![f64::NAN; symb.kktd_pattern().nnz()];
    symb.apply_active_set(&kkt, &[Status::Inactive, Status::Upper], &[Status::Inactive], &mut kktd);

    SpMatRef::new(symb.kktd_pattern(), &kktd).op(1., &[1., 10., 100.], 0., &mut y);
    assert_float_eq!(y, [2., 11., -97.], abs_all <= 1e-12);
}

#[test]
fn test_kkt_solve_trans()
{
    use float_eq::assert_float_eq;

    // H = [2 1; 1 0], A = [3 4]
    let h = SpPattern::new(2, 2, vec![0, 2, 3], vec![0, 1, 0]).unwrap();
    let a = SpPattern::new(1, 2, vec![0, 1, 2], vec![0, 0]).unwrap();
    let symb = KktSymbolic::new(&h, &a).unwrap();

    let mut kkt = vec![0.; symb.kkt_pattern().nnz()];
    let mut kktd = vec![0.; symb.kktd_pattern().nnz()];
    let mut kktdt = vec![0.; symb.kktd_pattern().nnz()];
    let mut work = QrWork::new(symb.qr());
    symb.assemble(&[2., 1., 1.], &[3., 4.], &mut kkt);

    let b = [1., -2., 3.];
    for status_a in [Status::Inactive, Status::Upper] {
        symb.apply_active_set(&kkt, &[Status::Inactive, Status::Inactive], &[status_a], &mut kktd);

        let mut z = b;
        symb.solve_trans(&kktd, &mut kktdt, &mut z, &mut work, 1e-12).unwrap();

        let mut ktz = [0.; 3];
        SpMatRef::new(symb.kktd_pattern(), &kktd).trans_op(1., &z, 0., &mut ktz);
        assert_float_eq!(ktz, b, abs_all <= 1e-9);
    }

    // no curvature along x1 and no active bound
    let h0 = SpPattern::new(2, 2, vec![0, 1, 1], vec![0]).unwrap();
    let symb = KktSymbolic::new(&h0, &SpPattern::empty(0, 2)).unwrap();
    let mut kkt = vec![0.; symb.kkt_pattern().nnz()];
    let mut kktd = vec![0.; symb.kktd_pattern().nnz()];
    let mut kktdt = vec![0.; symb.kktd_pattern().nnz()];
    let mut work = QrWork::new(symb.qr());
    symb.assemble(&[1.], &[], &mut kkt);
    symb.apply_active_set(&kkt, &[Status::Inactive, Status::Inactive], &[], &mut kktd);

    let mut z = [1., 1.];
    let rslt = symb.solve_trans(&kktd, &mut kktdt, &mut z, &mut work, 1e-12);
    assert_eq!(rslt, Err(SolverError::StructuralSingularity { index: 1 }));
}
