use asqp::prelude::*;
use asqp::*;
use asqp_core::solver::LinAlg;

use sprs::{CsMat, TriMat};

use rand::prelude::*;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use std::str::FromStr;
use std::time::Instant;


fn bench<L: LinAlg<F=f64>>(sz: usize) -> anyhow::Result<()> {
    let n = sz;
    let m = sz / 2;

    let mut rng = Xoshiro256StarStar::seed_from_u64(0);

    //----- construct QP

    // diagonally dominant, so positive definite
    let mut tri_h = TriMat::new((n, n));
    for i in 0.. n {
        tri_h.add_triplet(i, i, 4. + rng.gen::<f64>());
        if i + 1 < n {
            let v = rng.gen::<f64>() - 0.5;
            tri_h.add_triplet(i, i + 1, v);
            tri_h.add_triplet(i + 1, i, v);
        }
    }
    let sym_h: CsMat<f64> = tri_h.to_csc();

    let vec_g = (0.. n).map(|_| 10. * (rng.gen::<f64>() - 0.5)).collect();

    let mut tri_a = TriMat::new((m, n));
    for r in 0.. m {
        for _ in 0.. 3 {
            tri_a.add_triplet(r, rng.gen_range(0.. n), rng.gen::<f64>() - 0.5);
        }
    }
    let mat_a: CsMat<f64> = tri_a.to_csc();

    // zero is feasible
    let vec_lbx = vec![-1.; n];
    let vec_ubx = vec![1.; n];
    let vec_lba = (0.. m).map(|_| -rng.gen::<f64>()).collect();
    let vec_uba = (0.. m).map(|_| rng.gen::<f64>()).collect();

    let prob = ProbQP::new(&sym_h, vec_g, Some(&mat_a),
        Some(vec_lbx), Some(vec_ubx), Some(vec_lba), Some(vec_uba))?;

    //----- solve QP

    let s = Solver::<L>::new()
            .par(|p| {
                p.max_iter = 10 * (n + m);
                p.log_period = 10;
            });
    let qp = ActiveSetQp::new(s, &prob)?;
    let mut ws = qp.workspace();

    let time = Instant::now();
    let rslt = qp.solve_with(&prob, &QpGuess::new(), &mut ws)?;
    println!("cold: {:?} iter {} cost {:.6e} in {:?}", rslt.status, rslt.iter, rslt.cost, time.elapsed());

    let time = Instant::now();
    let rslt = qp.solve_with(&prob, &QpGuess::from_solution(&rslt), &mut ws)?;
    println!("warm: {:?} iter {} cost {:.6e} in {:?}", rslt.status, rslt.iter, rslt.cost, time.elapsed());

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut sz = 100;

    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 {
        if let Ok(a) = usize::from_str(&args[1]) {
            sz = a; // sz can be specified by 1st argument
        }
    }

    bench::<FloatGeneric<f64>>(sz)
}
