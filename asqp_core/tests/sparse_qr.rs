use float_eq::assert_float_eq;
use asqp_core::solver::SolverError;
use asqp_core::{SpPattern, SpMatRef, QrSymbolic, QrWork};

//

// row-major dense to pattern and nonzeros
fn from_dense(n: usize, dense: &[f64]) -> (SpPattern, Vec<f64>)
{
    let mut colptr = vec![0];
    let mut row = Vec::new();
    let mut val = Vec::new();

    for c in 0.. n {
        for r in 0.. n {
            let v = dense[r * n + c];
            if v != 0. {
                row.push(r);
                val.push(v);
            }
        }
        colptr.push(row.len());
    }

    (SpPattern::new(n, n, colptr, row).unwrap(), val)
}

fn factorize_solve(pat: &SpPattern, val: &[f64], b: &[f64])
{
    let n = pat.size().0;
    let mat = SpMatRef::new(pat, val);

    let qr = QrSymbolic::new(pat).unwrap();
    let mut work = QrWork::new(&qr);

    let mut z = b.to_vec();
    qr.factorize_solve(mat, &mut z, &mut work, 1e-12).unwrap();
    let mut kz = vec![0.; n];
    mat.op(1., &z, 0., &mut kz);
    assert_float_eq!(kz, b.to_vec(), abs_all <= 1e-9);
}

#[test]
fn test_qr_zero_diag()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (pat, val) = from_dense(4, &[
        4., 0., 1., 0.,
        0., 3., 0., 2.,
        1., 0., 0., 5.,
        0., 2., 0., 1.,
    ]);
    let b = [1., -2., 3., 0.5];

    factorize_solve(&pat, &val, &b);
}

#[test]
fn test_qr_kkt_like()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // [H A^T; A -I] with a unit column
    let (pat, val) = from_dense(5, &[
        2., 1., 0., 1., 0.,
        1., 3., 0., 1., 1.,
        0., 0., 1., 0., 2.,
        1., 1., 0.,-1., 0.,
        0., 1., 0., 0., 0.,
    ]);
    let b = [0.5, 1., -1., 2., -3.];

    factorize_solve(&pat, &val, &b);
}

#[test]
fn test_qr_larger()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 30;
    let mut dense = vec![0.; n * n];
    for i in 0.. n {
        // permuted diagonal keeps it nonsingular
        dense[i * n + (i * 7) % n] = 3. + (i % 4) as f64;
        dense[((i * 11 + 3) % n) * n + i] += 0.5;
        dense[i * n + (i * 13 + 5) % n] -= 0.25;
    }
    let (pat, val) = from_dense(n, &dense);
    let b: Vec<f64> = (0.. n).map(|i| ((i * 5) % 7) as f64 - 3.).collect();

    factorize_solve(&pat, &val, &b);
}

#[test]
fn test_qr_refactorize()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (pat, val1) = from_dense(3, &[
        2., 1., 0.,
        1., 2., 1.,
        0., 1., 2.,
    ]);
    let val2: Vec<f64> = val1.iter().map(|v| -3. * v).collect();
    let b = [1., 2., 3.];

    let qr = QrSymbolic::new(&pat).unwrap();
    let mut work = QrWork::<f64>::new(&qr);
    assert!(work.fits(&qr));

    // the same memory serves every numeric factorization of the pattern
    for val in [&val1, &val2] {
        let mat = SpMatRef::new(&pat, val);
        let mut z = b.to_vec();
        qr.factorize_solve(mat, &mut z, &mut work, 1e-12).unwrap();

        let mut kz = vec![0.; 3];
        mat.op(1., &z, 0., &mut kz);
        assert_float_eq!(kz, b.to_vec(), abs_all <= 1e-9);
    }

    let other = QrSymbolic::new(&SpPattern::diag(2)).unwrap();
    assert!(!work.fits(&other));
}

#[test]
fn test_qr_numeric_singular()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (pat, val) = from_dense(2, &[
        1., 2.,
        2., 4.,
    ]);
    let qr = QrSymbolic::new(&pat).unwrap();
    let mut work = QrWork::new(&qr);

    let mut z = [1., 1.];
    let rslt = qr.factorize_solve(SpMatRef::new(&pat, &val), &mut z, &mut work, 1e-12);
    assert!(matches!(rslt, Err(SolverError::StructuralSingularity { .. })));
}

#[test]
fn test_qr_structural_singular()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // empty column
    let pat = SpPattern::new(2, 2, vec![0, 2, 2], vec![0, 1]).unwrap();
    let qr = QrSymbolic::new(&pat).unwrap();
    let mut work = QrWork::new(&qr);
    let mut z = [1., 1.];
    let rslt = qr.factorize_solve(SpMatRef::new(&pat, &[1., 1.]), &mut z, &mut work, 1e-12);
    assert_eq!(rslt, Err(SolverError::StructuralSingularity { index: 1 }));

    // two columns on a single row
    let pat = SpPattern::new(2, 2, vec![0, 1, 2], vec![0, 0]).unwrap();
    let qr = QrSymbolic::new(&pat).unwrap();
    let mut work = QrWork::new(&qr);
    let mut z = [1., 1.];
    let rslt = qr.factorize_solve(SpMatRef::new(&pat, &[1., 2.]), &mut z, &mut work, 1e-12);
    assert!(matches!(rslt, Err(SolverError::StructuralSingularity { .. })));

    let pat = SpPattern::new(2, 3, vec![0, 1, 2, 2], vec![0, 1]).unwrap();
    assert_eq!(QrSymbolic::new(&pat).err(), Some(SolverError::DimensionMismatch));
}
