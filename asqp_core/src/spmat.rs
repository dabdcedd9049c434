use num_traits::{Float, Zero};
use core::ops::Range;
use faer::sparse::{SymbolicSparseColMat, SymbolicSparseColMatRef, SparseColMatRef};
use faer::sparse::linalg::matmul::{sparse_dense_matmul, dense_sparse_matmul};
use faer::traits::RealField;
use faer::{Accum, MatMut, MatRef, Par};
use crate::solver::SolverError;

//

/// Sparsity pattern in compressed sparse column form.
///
/// A checked `faer` symbolic matrix: row indices are strictly increasing within each column.
#[derive(Debug, Clone)]
pub struct SpPattern
{
    symb: SymbolicSparseColMat<usize>,
}

impl SpPattern
{
    /// Creates a pattern from compressed sparse column arrays.
    ///
    /// Returns [`SpPattern`] instance, or [`SolverError::DimensionMismatch`] if the arrays are inconsistent.
    /// * `nrow` is a number of rows.
    /// * `ncol` is a number of columns.
    /// * `colptr` is an array of `ncol + 1` offsets into `row`, starting with zero.
    /// * `row` is an array of row indices, strictly increasing within each column.
    pub fn new(nrow: usize, ncol: usize, colptr: Vec<usize>, row: Vec<usize>) -> Result<Self, SolverError>
    {
        if colptr.len() != ncol + 1 || colptr[0] != 0 || colptr[ncol] != row.len() {
            log::error!("colptr of length {} inconsistent with {} columns and {} nonzeros", colptr.len(), ncol, row.len());
            return Err(SolverError::DimensionMismatch);
        }

        if let Some(c) = (0.. ncol).find(|&c| colptr[c] > colptr[c + 1]) {
            log::error!("colptr decreasing at column {}", c);
            return Err(SolverError::DimensionMismatch);
        }

        for c in 0.. ncol {
            let rows = &row[colptr[c].. colptr[c + 1]];
            for (i, &r) in rows.iter().enumerate() {
                if r >= nrow || (i > 0 && rows[i - 1] >= r) {
                    log::error!("row index {} invalid at column {}", r, c);
                    return Err(SolverError::DimensionMismatch);
                }
            }
        }

        Ok(Self::from_sorted(nrow, ncol, colptr, row))
    }

    // arrays already known to be consistent
    fn from_sorted(nrow: usize, ncol: usize, colptr: Vec<usize>, row: Vec<usize>) -> Self
    {
        SpPattern {
            symb: SymbolicSparseColMat::new_checked(nrow, ncol, colptr, None, row),
        }
    }

    /// Creates an empty pattern.
    ///
    /// Returns [`SpPattern`] instance without nonzeros.
    pub fn empty(nrow: usize, ncol: usize) -> Self
    {
        Self::from_sorted(nrow, ncol, vec![0; ncol + 1], Vec::new())
    }

    /// Creates a square diagonal pattern.
    pub fn diag(n: usize) -> Self
    {
        Self::from_sorted(n, n, (0..= n).collect(), (0.. n).collect())
    }

    /// Size of the pattern.
    ///
    /// Returns a tuple of a number of rows and a number of columns.
    pub fn size(&self) -> (usize, usize)
    {
        (self.symb.nrows(), self.symb.ncols())
    }

    /// Number of structural nonzeros.
    pub fn nnz(&self) -> usize
    {
        self.symb.row_idx().len()
    }

    pub fn colptr(&self) -> &[usize]
    {
        self.symb.col_ptr()
    }

    pub fn row(&self) -> &[usize]
    {
        self.symb.row_idx()
    }

    /// Borrows as a `faer` symbolic matrix.
    pub fn as_faer(&self) -> SymbolicSparseColMatRef<'_, usize>
    {
        self.symb.as_ref()
    }

    /// Range of nonzero slots of a column.
    ///
    /// * `c` is a column index.
    pub fn col(&self, c: usize) -> Range<usize>
    {
        self.symb.col_range(c)
    }

    /// Finds the slot of an entry.
    ///
    /// Returns the slot index, or `None` if the entry is structurally zero.
    /// * `r` is a row index.
    /// * `c` is a column index.
    pub fn find(&self, r: usize, c: usize) -> Option<usize>
    {
        let rng = self.col(c);
        let lo = rng.start;
        self.row()[rng].binary_search(&r).ok().map(|i| lo + i)
    }

    /// Transposes the pattern.
    ///
    /// Returns a tuple of the transposed pattern and a slot map:
    /// nonzero `p` of `self` is located at slot `map[p]` of the transposed pattern.
    pub fn transpose(&self) -> (SpPattern, Vec<usize>)
    {
        let (nrow, ncol) = self.size();

        let mut colptr = vec![0; nrow + 1];
        for &r in self.row() {
            colptr[r + 1] += 1;
        }
        for r in 0.. nrow {
            colptr[r + 1] += colptr[r];
        }

        let mut next = colptr[.. nrow].to_vec();
        let mut row = vec![0; self.nnz()];
        let mut map = vec![0; self.nnz()];

        for c in 0.. ncol {
            for p in self.col(c) {
                let r = self.row()[p];
                let q = next[r];
                next[r] += 1;
                row[q] = c;
                map[p] = q;
            }
        }

        (Self::from_sorted(ncol, nrow, colptr, row), map)
    }

    /// Adds the full diagonal to a square pattern.
    ///
    /// Returns a tuple of the padded pattern and a slot map:
    /// nonzero `p` of `self` is located at slot `map[p]` of the padded pattern.
    pub fn add_diag(&self) -> (SpPattern, Vec<usize>)
    {
        let (nrow, n) = self.size();
        assert_eq!(nrow, n);

        let mut colptr = Vec::with_capacity(n + 1);
        let mut row = Vec::with_capacity(self.nnz() + n);
        let mut map = vec![0; self.nnz()];

        colptr.push(0);
        for c in 0.. n {
            let mut has_diag = false;
            for p in self.col(c) {
                let r = self.row()[p];
                if !has_diag && r > c {
                    row.push(c);
                    has_diag = true;
                }
                if r == c {
                    has_diag = true;
                }
                map[p] = row.len();
                row.push(r);
            }
            if !has_diag {
                row.push(c);
            }
            colptr.push(row.len());
        }

        (Self::from_sorted(n, n, colptr, row), map)
    }
}

impl PartialEq for SpPattern
{
    fn eq(&self, other: &Self) -> bool
    {
        self.size() == other.size() && self.colptr() == other.colptr() && self.row() == other.row()
    }
}

impl Eq for SpPattern {}

//

/// Sparse matrix which borrows a [`SpPattern`] and a slice of its nonzero values.
#[derive(Debug, Clone, Copy)]
pub struct SpMatRef<'a, F>
{
    pat: &'a SpPattern,
    val: &'a [F],
}

impl<'a, F: Float + RealField> SpMatRef<'a, F>
{
    /// Creates an instance
    ///
    /// Returns [`SpMatRef`] instance.
    /// * `pat` is a sparsity pattern.
    /// * `val` is a slice of nonzero values, ordered as the slots of `pat`.
    pub fn new(pat: &'a SpPattern, val: &'a [F]) -> Self
    {
        assert_eq!(pat.nnz(), val.len());

        SpMatRef {
            pat, val
        }
    }

    pub fn size(&self) -> (usize, usize)
    {
        self.pat.size()
    }

    pub fn pattern(&self) -> &'a SpPattern
    {
        self.pat
    }

    pub fn values(&self) -> &'a [F]
    {
        self.val
    }

    /// Borrows as a `faer` sparse matrix.
    pub fn as_faer(&self) -> SparseColMatRef<'a, usize, F>
    {
        SparseColMatRef::new(self.pat.as_faer(), self.val)
    }

    fn scale_y(beta: F, y: &mut [F])
    {
        if beta == F::zero() {
            for v in y {
                *v = F::zero();
            }
        }
        else {
            for v in y {
                *v = beta * *v;
            }
        }
    }

    /// Calculate \\(\alpha K x + \beta y\\).
    ///
    /// * `alpha` is a scalar \\(\alpha\\).
    /// * `x` is a vector \\(x\\) of length of the number of columns.
    /// * `beta` is a scalar \\(\beta\\).
    /// * `y` is a vector \\(y\\) of length of the number of rows before entry,
    ///   \\(\alpha K x + \beta y\\) on exit.
    pub fn op(&self, alpha: F, x: &[F], beta: F, y: &mut [F])
    {
        let (nrow, ncol) = self.size();
        assert_eq!(x.len(), ncol);
        assert_eq!(y.len(), nrow);

        Self::scale_y(beta, y);

        sparse_dense_matmul(
            MatMut::from_column_major_slice_mut(y, nrow, 1),
            Accum::Add,
            self.as_faer(),
            MatRef::from_column_major_slice(x, ncol, 1),
            alpha,
            Par::Seq,
        );
    }

    /// Calculate \\(\alpha K^T x + \beta y\\).
    ///
    /// * `alpha` is a scalar \\(\alpha\\).
    /// * `x` is a vector \\(x\\) of length of the number of rows.
    /// * `beta` is a scalar \\(\beta\\).
    /// * `y` is a vector \\(y\\) of length of the number of columns before entry,
    ///   \\(\alpha K^T x + \beta y\\) on exit.
    pub fn trans_op(&self, alpha: F, x: &[F], beta: F, y: &mut [F])
    {
        let (nrow, ncol) = self.size();
        assert_eq!(x.len(), nrow);
        assert_eq!(y.len(), ncol);

        Self::scale_y(beta, y);

        // as a row vector, y^T += alpha x^T K
        dense_sparse_matmul(
            MatMut::from_row_major_slice_mut(y, 1, ncol),
            Accum::Add,
            MatRef::from_row_major_slice(x, 1, nrow),
            self.as_faer(),
            alpha,
            Par::Seq,
        );
    }

    /// Calculate \\(x^T K y\\).
    ///
    /// Returns the calculated bilinear form.
    pub fn bilin(&self, x: &[F], y: &[F]) -> F
    {
        let (nrow, ncol) = self.size();
        assert_eq!(x.len(), nrow);
        assert_eq!(y.len(), ncol);

        let mut sum = F::zero();
        for c in 0.. ncol {
            let mut s = F::zero();
            for p in self.pat.col(c) {
                s = s + self.val[p] * x[self.pat.row()[p]];
            }
            sum = sum + s * y[c];
        }
        sum
    }
}

//

#[test]
fn test_spmat_transpose()
{
    // [1 . 2]
    // [. 3 .]
    let pat = SpPattern::new(2, 3, vec![0, 1, 2, 3], vec![0, 1, 0]).unwrap();
    let (t, map) = pat.transpose();

    assert_eq!(t.size(), (3, 2));
    assert_eq!(t.colptr(), &[0, 2, 3]);
    assert_eq!(t.row(), &[0, 2, 1]);
    assert_eq!(map, vec![0, 2, 1]);
}

#[test]
fn test_spmat_add_diag()
{
    // [. 1 .]
    // [2 . .]
    // [3 . 4]
    let pat = SpPattern::new(3, 3, vec![0, 2, 3, 4], vec![1, 2, 0, 2]).unwrap();
    let (d, map) = pat.add_diag();

    assert_eq!(d.colptr(), &[0, 3, 5, 6]);
    assert_eq!(d.row(), &[0, 1, 2, 0, 1, 2]);
    assert_eq!(map, vec![1, 2, 3, 5]);
    for c in 0.. 3 {
        assert!(d.find(c, c).is_some());
    }
}

#[test]
fn test_spmat_op()
{
    use float_eq::assert_float_eq;

    // [1 . 2]
    // [. 3 .]
    let pat = SpPattern::new(2, 3, vec![0, 1, 2, 3], vec![0, 1, 0]).unwrap();
    let val = [1., 3., 2.];
    let mat = SpMatRef::new(&pat, &val);

    let mut y = [1., 1.];
    mat.op(2., &[1., 2., 3.], 1., &mut y);
    assert_float_eq!(y, [15., 13.], abs_all <= 1e-12);

    let mut z = [f64::NAN; 3];
    mat.trans_op(1., &[1., -1.], 0., &mut z);
    assert_float_eq!(z, [1., -3., 2.], abs_all <= 1e-12);

    assert_float_eq!(mat.bilin(&[1., -1.], &[1., 2., 3.]), 1., abs <= 1e-12);
}

#[test]
fn test_spmat_invalid()
{
    assert_eq!(SpPattern::new(2, 2, vec![0, 1], vec![0]), Err(SolverError::DimensionMismatch));
    assert_eq!(SpPattern::new(2, 1, vec![0, 2], vec![1, 0]), Err(SolverError::DimensionMismatch));
    assert_eq!(SpPattern::new(2, 1, vec![0, 1], vec![2]), Err(SolverError::DimensionMismatch));
}
