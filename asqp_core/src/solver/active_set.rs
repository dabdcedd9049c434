//! Active-set state

use num_traits::Float;

/// Active-set status of a variable or a constraint.
///
/// The sign of a multiplier matches its status:
/// non-positive for [`Status::Lower`], non-negative for [`Status::Upper`], zero for [`Status::Inactive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status
{
    /// Not held at a bound.
    #[default]
    Inactive,
    /// Held at the lower bound.
    Lower,
    /// Held at the upper bound.
    Upper,
}

impl Status
{
    pub fn is_active(&self) -> bool
    {
        *self != Status::Inactive
    }

    /// Bound on the active side.
    ///
    /// Returns `lb` for [`Status::Lower`], `ub` for [`Status::Upper`], `None` for [`Status::Inactive`].
    pub fn bound<F: Float>(&self, lb: F, ub: F) -> Option<F>
    {
        match self {
            Status::Inactive => None,
            Status::Lower => Some(lb),
            Status::Upper => Some(ub),
        }
    }

    /// Clips a multiplier to the sign of this status.
    pub fn clip<F: Float>(&self, lam: F) -> F
    {
        let f0 = F::zero();

        match self {
            Status::Inactive => f0,
            Status::Lower => lam.min(f0),
            Status::Upper => lam.max(f0),
        }
    }

    fn symbol(&self) -> char
    {
        match self {
            Status::Inactive => '.',
            Status::Lower => 'L',
            Status::Upper => 'U',
        }
    }

    /// Seeds a status from bounds, a current value and an initial multiplier.
    ///
    /// * `lb` and `ub` are the bounds, `lb == ub` for an equality.
    /// * `val` is the current value of the variable or the constraint.
    /// * `lam` is the initial multiplier.
    pub fn seed<F: Float>(lb: F, ub: F, val: F, lam: F) -> Status
    {
        let f0 = F::zero();

        if lb == ub {
            if lam > f0 {Status::Upper} else {Status::Lower}
        }
        else if val < lb {
            Status::Lower
        }
        else if val > ub {
            Status::Upper
        }
        else if lam < f0 && lb.is_finite() {
            Status::Lower
        }
        else if lam > f0 && ub.is_finite() {
            Status::Upper
        }
        else {
            Status::Inactive
        }
    }
}

/// Seeds the statuses of a segment and clips its multipliers.
///
/// * `lb` and `ub` are the bounds.
/// * `val` is the current values.
/// * `lam` is the initial multipliers before entry, clipped to the seeded signs on exit.
/// * `status` is the seeded statuses on exit.
pub fn seed_active_set<F: Float>(lb: &[F], ub: &[F], val: &[F], lam: &mut [F], status: &mut [Status])
{
    assert_eq!(lb.len(), status.len());
    assert_eq!(ub.len(), status.len());
    assert_eq!(val.len(), status.len());
    assert_eq!(lam.len(), status.len());

    for i in 0.. status.len() {
        status[i] = Status::seed(lb[i], ub[i], val[i], lam[i]);
        lam[i] = status[i].clip(lam[i]);
    }
}

/// Compact display of statuses, one character each.
pub struct StatusDisplay<'a>(pub &'a [Status]);

impl<'a> core::fmt::Display for StatusDisplay<'a>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result
    {
        write!(f, "[")?;
        for st in self.0 {
            write!(f, "{}", st.symbol())?;
        }
        write!(f, "]")
    }
}

//

#[test]
fn test_status_seed()
{
    let inf = f64::INFINITY;

    assert_eq!(Status::seed(1., 1., 0., 0.), Status::Lower);
    assert_eq!(Status::seed(1., 1., 0., 2.), Status::Upper);
    assert_eq!(Status::seed(0., 1., 0.5, 0.), Status::Inactive);
    assert_eq!(Status::seed(0., 1., 0.5, -1.), Status::Lower);
    assert_eq!(Status::seed(-inf, 1., 0.5, -1.), Status::Inactive);
    assert_eq!(Status::seed(0., inf, 0.5, 1.), Status::Inactive);
    assert_eq!(Status::seed(0., 1., -0.5, 1.), Status::Lower);
    assert_eq!(Status::seed(0., 1., 1.5, 0.), Status::Upper);
}

#[test]
fn test_seed_active_set()
{
    let lb = [0., 0., -1.];
    let ub = [1., 1., -1.];
    let val = [0.5, 0., 0.];
    let mut lam = [3., -2., 0.5];
    let mut status = [Status::Inactive; 3];

    seed_active_set(&lb, &ub, &val, &mut lam, &mut status);

    assert_eq!(status, [Status::Upper, Status::Lower, Status::Upper]);
    assert_eq!(lam, [3., -2., 0.5]);
    assert_eq!(format!("{}", StatusDisplay(&status)), "[ULU]");

    let mut lam = [0., 0., 0.];
    seed_active_set(&lb, &ub, &val, &mut lam, &mut status);
    assert_eq!(status, [Status::Inactive, Status::Inactive, Status::Lower]);
}

#[test]
fn test_status_clip()
{
    assert_eq!(Status::Lower.clip(1.), 0.);
    assert_eq!(Status::Lower.clip(-1.), -1.);
    assert_eq!(Status::Upper.clip(-1.), 0.);
    assert_eq!(Status::Inactive.clip(5.), 0.);
    assert_eq!(Status::Lower.bound(-1., 2.), Some(-1.));
    assert_eq!(Status::Inactive.bound(-1., 2.), None);
}
