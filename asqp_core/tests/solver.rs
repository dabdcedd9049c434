use float_eq::assert_float_eq;
use asqp_core::prelude::*;
use asqp_core::{SpPattern, SpMatRef, KktSymbolic, QrWork};

type La = FloatGeneric<f64>;
type ASolver = Solver<La>;

const INF: f64 = f64::INFINITY;

//

#[test]
fn test_solver_box()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 4;

    // (1/2)|x - c|^2 on [0, 1]^4
    let h = SpPattern::diag(n);
    let a = SpPattern::empty(0, n);
    let symb = KktSymbolic::new(&h, &a).unwrap();

    let prob = QpData {
        h: SpMatRef::new(&h, &[1.; 4]),
        g: &[1., -0.5, -2., -0.3],
        a: SpMatRef::new(&a, &[]),
        lbx: &[0.; 4],
        ubx: &[1.; 4],
        lba: &[],
        uba: &[],
    };
    let start = QpStart {
        x0: &[0.; 4],
        lam_x0: &[0.; 4],
        lam_a0: &[],
    };

    let s = ASolver::new().par(|p| {
        p.verbose = true;
    });
    let mut ws = Workspace::new(&symb);
    let rslt = s.solve(&symb, prob, start, &mut ws).unwrap();
    println!("{:?}", rslt);

    assert_eq!(rslt.status, SolveStatus::Converged);
    assert_eq!(rslt.iter, 3);
    assert_float_eq!(rslt.x, [0., 0.5, 1., 0.3].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(rslt.lam_x, [-1., 0., 1., 0.].as_ref(), abs_all <= 1e-9);
    assert_eq!(rslt.status_x, &[Status::Lower, Status::Inactive, Status::Upper, Status::Inactive]);
    assert_float_eq!(rslt.cost, -1.67, abs <= 1e-9);
}

#[test]
fn test_solver_halfspace()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // (1/2)|x|^2 - 2 x0 - 2 x1 subject to x0 + x1 <= 1
    let h = SpPattern::diag(2);
    let a = SpPattern::new(1, 2, vec![0, 1, 2], vec![0, 0]).unwrap();
    let symb = KktSymbolic::new(&h, &a).unwrap();

    let prob = QpData {
        h: SpMatRef::new(&h, &[1., 1.]),
        g: &[-2., -2.],
        a: SpMatRef::new(&a, &[1., 1.]),
        lbx: &[-INF, -INF],
        ubx: &[INF, INF],
        lba: &[-INF],
        uba: &[1.],
    };
    let start = QpStart {
        x0: &[0., 0.],
        lam_x0: &[0., 0.],
        lam_a0: &[0.],
    };

    let mut ws = Workspace::new(&symb);
    let rslt = ASolver::new().solve(&symb, prob, start, &mut ws).unwrap();
    println!("{:?}", rslt);

    assert_eq!(rslt.status, SolveStatus::Converged);
    assert_eq!(rslt.iter, 2);
    assert_float_eq!(rslt.x, [0.5, 0.5].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(rslt.lam_a, [1.5].as_ref(), abs_all <= 1e-9);
    assert_eq!(rslt.status_a, &[Status::Upper]);
    assert_float_eq!(rslt.cost, -1.75, abs <= 1e-9);
}

#[test]
fn test_solver_removal()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // (1/2) x^2 - x / 2 on [0, 1], starting from a wrong guess of the active set
    let h = SpPattern::diag(1);
    let a = SpPattern::empty(0, 1);
    let symb = KktSymbolic::new(&h, &a).unwrap();

    let prob = QpData {
        h: SpMatRef::new(&h, &[1.]),
        g: &[-0.5],
        a: SpMatRef::new(&a, &[]),
        lbx: &[0.],
        ubx: &[1.],
        lba: &[],
        uba: &[],
    };
    let start = QpStart {
        x0: &[0.],
        lam_x0: &[-1.],
        lam_a0: &[],
    };

    let mut ws = Workspace::new(&symb);
    let rslt = ASolver::new().solve(&symb, prob, start, &mut ws).unwrap();

    assert_eq!(rslt.status, SolveStatus::Converged);
    assert_eq!(rslt.iter, 2);
    assert_float_eq!(rslt.x, [0.5].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(rslt.lam_x, [0.].as_ref(), abs_all <= 1e-9);
    assert_eq!(rslt.status_x, &[Status::Inactive]);
}

#[test]
fn test_solver_iteration_limit()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let h = SpPattern::diag(4);
    let a = SpPattern::empty(0, 4);
    let symb = KktSymbolic::new(&h, &a).unwrap();

    let prob = QpData {
        h: SpMatRef::new(&h, &[1.; 4]),
        g: &[1., -0.5, -2., -0.3],
        a: SpMatRef::new(&a, &[]),
        lbx: &[0.; 4],
        ubx: &[1.; 4],
        lba: &[],
        uba: &[],
    };
    let start = QpStart {
        x0: &[0.; 4],
        lam_x0: &[0.; 4],
        lam_a0: &[],
    };

    let s = ASolver::new().par(|p| {
        p.max_iter = 2;
    });
    let mut ws = Workspace::new(&symb);
    let rslt = s.solve(&symb, prob, start, &mut ws).unwrap();

    assert_eq!(rslt.status, SolveStatus::IterationLimit);
    assert_eq!(rslt.iter, 2);
    // x2 reached its upper bound at the half step
    assert_float_eq!(rslt.x, [0., 0.25, 1., 0.15].as_ref(), abs_all <= 1e-9);
}

#[test]
fn test_solver_errors()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let h = SpPattern::diag(2);
    let a = SpPattern::empty(0, 2);
    let symb = KktSymbolic::new(&h, &a).unwrap();

    let prob = QpData {
        h: SpMatRef::new(&h, &[1., 1.]),
        g: &[0., 0.],
        a: SpMatRef::new(&a, &[]),
        lbx: &[0., 0.],
        ubx: &[1., 1.],
        lba: &[],
        uba: &[],
    };
    let start = QpStart {
        x0: &[0., 0.],
        lam_x0: &[0., 0.],
        lam_a0: &[],
    };

    let mut ws = Workspace::new(&symb);

    let s = ASolver::new().par(|p| {
        p.max_iter = 0;
    });
    assert_eq!(s.solve(&symb, prob, start, &mut ws).err(), Some(SolverError::InvalidParam));

    // a workspace of another structure
    let s = ASolver::new();
    let h1 = SpPattern::diag(1);
    let symb1 = KktSymbolic::new(&h1, &SpPattern::empty(0, 1)).unwrap();
    let mut ws1 = Workspace::new(&symb1);
    assert_eq!(s.solve(&symb, prob, start, &mut ws1).err(), Some(SolverError::WorkShortage));

    let bad = QpData {
        lbx: &[0., 2.],
        ..prob
    };
    assert_eq!(s.solve(&symb, bad, start, &mut ws).err(), Some(SolverError::DimensionMismatch));

    let bad = QpData {
        lbx: &[0., INF],
        ubx: &[1., INF],
        ..prob
    };
    assert_eq!(s.solve(&symb, bad, start, &mut ws).err(), Some(SolverError::DimensionMismatch));

    let bad = QpData {
        g: &[0.],
        ..prob
    };
    assert_eq!(s.solve(&symb, bad, start, &mut ws).err(), Some(SolverError::DimensionMismatch));

    let h3 = SpPattern::diag(3);
    let bad = QpData {
        h: SpMatRef::new(&h3, &[1., 1., 1.]),
        ..prob
    };
    assert_eq!(s.solve(&symb, bad, start, &mut ws).err(), Some(SolverError::DimensionMismatch));

    // non-finite guesses are rejected before seeding the active set
    let bad = QpStart {
        x0: &[0., f64::NAN],
        ..start
    };
    assert_eq!(s.solve(&symb, prob, bad, &mut ws).err(), Some(SolverError::DimensionMismatch));

    let bad = QpStart {
        lam_x0: &[-INF, 0.],
        ..start
    };
    assert_eq!(s.solve(&symb, prob, bad, &mut ws).err(), Some(SolverError::DimensionMismatch));

    // the workspace stays usable after rejected calls
    let rslt = s.solve(&symb, prob, start, &mut ws).unwrap();
    assert_eq!(rslt.status, SolveStatus::Converged);
}

#[test]
fn test_solver_singular()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // no curvature and no active bound
    let h = SpPattern::diag(1);
    let a = SpPattern::empty(0, 1);
    let symb = KktSymbolic::new(&h, &a).unwrap();

    let prob = QpData {
        h: SpMatRef::new(&h, &[0.]),
        g: &[1.],
        a: SpMatRef::new(&a, &[]),
        lbx: &[-1.],
        ubx: &[1.],
        lba: &[],
        uba: &[],
    };
    let start = QpStart {
        x0: &[0.],
        lam_x0: &[0.],
        lam_a0: &[],
    };

    let mut ws = Workspace::new(&symb);
    let rslt = ASolver::new().solve(&symb, prob, start, &mut ws);
    assert_eq!(rslt.err(), Some(SolverError::StructuralSingularity { index: 0 }));
}

#[test]
fn test_solver_equality_kept()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // (1/2)|x|^2 + 3 x1 subject to x0 + x1 = 1, x >= 0
    let h = SpPattern::diag(2);
    let a = SpPattern::new(1, 2, vec![0, 1, 2], vec![0, 0]).unwrap();
    let symb = KktSymbolic::new(&h, &a).unwrap();

    let prob = QpData {
        h: SpMatRef::new(&h, &[1., 1.]),
        g: &[0., 3.],
        a: SpMatRef::new(&a, &[1., 1.]),
        lbx: &[0., 0.],
        ubx: &[INF, INF],
        lba: &[1.],
        uba: &[1.],
    };
    let start = QpStart {
        x0: &[0.5, 0.5],
        lam_x0: &[0., 0.],
        lam_a0: &[0.],
    };

    let mut ws = Workspace::new(&symb);
    let rslt = ASolver::new().solve(&symb, prob, start, &mut ws).unwrap();
    let iters = rslt.iter;

    assert_eq!(rslt.status, SolveStatus::Converged);
    assert_eq!(iters, 2);
    assert_float_eq!(rslt.x, [1., 0.].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(rslt.lam_a, [-1.].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(rslt.lam_x, [0., -2.].as_ref(), abs_all <= 1e-9);

    // stopping after each iteration shows the equality active and satisfied all along
    for k in 1..= iters {
        let s = ASolver::new().par(|p| {
            p.max_iter = k;
        });
        let rslt = s.solve(&symb, prob, start, &mut ws).unwrap();

        assert_eq!(rslt.iter, k);
        assert!(rslt.status_a[0].is_active());
        assert_float_eq!(rslt.x[0] + rslt.x[1], 1., abs <= 1e-9);
    }
}

#[test]
fn test_kkt_every_active_set()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 3;
    let h = SpPattern::new(n, n, vec![0, 2, 4, 5], vec![0, 1, 0, 1, 2]).unwrap();
    let h_val = [2., 1., 1., 2., 1.];
    let a = SpPattern::empty(0, n);
    let symb = KktSymbolic::new(&h, &a).unwrap();

    assert_eq!(symb.kktd_pattern().size(), (n, n));

    let mut kkt = vec![0.; symb.kkt_pattern().nnz()];
    let mut kktd = vec![0.; symb.kktd_pattern().nnz()];
    let mut kktdt = vec![0.; symb.kktd_pattern().nnz()];
    let mut work = QrWork::new(symb.qr());
    symb.assemble(&h_val, &[], &mut kkt);

    let sts = [Status::Inactive, Status::Lower, Status::Upper];
    for code in 0.. 27 {
        let status_x = [sts[code % 3], sts[(code / 3) % 3], sts[code / 9]];
        symb.apply_active_set(&kkt, &status_x, &[], &mut kktd);
        let mut z = [1., 2., 3.];
        assert!(symb.solve_trans(&kktd, &mut kktdt, &mut z, &mut work, 1e-12).is_ok());
    }
}

#[test]
fn test_kkt_every_active_set_constrained()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // H = [2 1; 1 2], A = [1 1; 1 -1]
    let (n, m) = (2, 2);
    let h = SpPattern::new(n, n, vec![0, 2, 4], vec![0, 1, 0, 1]).unwrap();
    let a = SpPattern::new(m, n, vec![0, 2, 4], vec![0, 1, 0, 1]).unwrap();
    let symb = KktSymbolic::new(&h, &a).unwrap();

    let mut kkt = vec![0.; symb.kkt_pattern().nnz()];
    let mut kktd = vec![0.; symb.kktd_pattern().nnz()];
    let mut kktdt = vec![0.; symb.kktd_pattern().nnz()];
    let mut work = QrWork::new(symb.qr());
    symb.assemble(&[2., 1., 1., 2.], &[1., 1., 1., -1.], &mut kkt);

    let b = [1., -1., 0.5, 2.];
    let sts = [Status::Inactive, Status::Lower, Status::Upper];
    for code in 0.. 81 {
        let status_x = [sts[code % 3], sts[(code / 3) % 3]];
        let status_a = [sts[(code / 9) % 3], sts[code / 27]];
        symb.apply_active_set(&kkt, &status_x, &status_a, &mut kktd);

        let mut z = b;
        let rslt = symb.solve_trans(&kktd, &mut kktdt, &mut z, &mut work, 1e-12);

        // any two rows of A are independent, so it is nonsingular
        // unless the active constraints outnumber the free variables
        let free = status_x.iter().filter(|st| !st.is_active()).count();
        let active = status_a.iter().filter(|st| st.is_active()).count();
        if active <= free {
            assert!(rslt.is_ok(), "{:?} {:?}", status_x, status_a);

            let mut ktz = [0.; 4];
            SpMatRef::new(symb.kktd_pattern(), &kktd).trans_op(1., &z, 0., &mut ktz);
            assert_float_eq!(ktz, b, abs_all <= 1e-9);
        }
        else {
            assert!(matches!(rslt, Err(SolverError::StructuralSingularity { .. })), "{:?} {:?}", status_x, status_a);
        }
    }
}
