use super::{scalar_field, tensor_field, ChristoffelSymbols, Field, FieldEntry};
use crate::{
    config::Config,
    coords::DIM,
    error::Result,
    expr::Expr,
    manifold::Manifold,
    symmetry::{Representation, Symmetry},
    tensor::{all_indices, unflatten, Scalar, Tensor},
};
use bitvec::prelude::*;
use std::rc::Rc;
use tracing::{debug, warn};

/// `R^ρ_{σμν} = ∂_μ Γ^ρ_{νσ} - ∂_ν Γ^ρ_{μσ} + Γ^ρ_{μλ} Γ^λ_{νσ} - Γ^ρ_{νλ} Γ^λ_{μσ}`
///
/// Computed in its mixed form by default. With [`Config::reduced_riemann`],
/// only the 21 algebraically independent covariant components go through
/// the formula, and the others are filled by symmetry.
#[derive(Debug)]
pub struct RiemannTensor {
    tensor: Tensor<4>,
    christoffel: Rc<ChristoffelSymbols>,
}

tensor_field!(RiemannTensor, 4);

impl RiemannTensor {
    fn formula(&self, r: usize, s: usize, m: usize, n: usize) -> Result<Expr> {
        if m == n {
            return Ok(Expr::zero());
        }
        let g = &self.christoffel;
        let mut terms = vec![
            g.mixed_diff(r, n, s, m)?,
            -g.mixed_diff(r, m, s, n)?,
        ];
        for l in 0..DIM {
            let (a, b) = (g.mixed(&[r, m, l])?, g.mixed(&[l, n, s])?);
            if !a.is_zero() && !b.is_zero() {
                terms.push(a * b);
            }
            let (c, d) = (g.mixed(&[r, n, l])?, g.mixed(&[l, m, s])?);
            if !c.is_zero() && !d.is_zero() {
                terms.push(-(c * d));
            }
        }
        Expr::sum(terms).simplify()
    }

    /// The covariant components from the independent ones: `ρ < σ`, `μ < ν`
    /// and `(ρ, σ) <= (μ, ν)`, lowering the formula's mixed values
    fn compute_reduced(&self) -> Result<usize> {
        let t = &self.tensor;
        t.set_origin(Representation::Covariant);
        let metric = t.metric();
        let pairs: Vec<(usize, usize)> = (0..DIM)
            .flat_map(|a| (a + 1..DIM).map(move |b| (a, b)))
            .collect();
        let mut written = 0;
        let mut independent = 0;
        for (p, &(r, s)) in pairs.iter().enumerate() {
            for &(m, n) in &pairs[p..] {
                let mut terms = Vec::new();
                for l in 0..DIM {
                    let g = metric.co(r, l);
                    if g.is_zero() {
                        continue;
                    }
                    let mixed = match t.peek(Representation::Mixed, &[l, s, m, n]) {
                        Some(v) => v.clone(),
                        None => {
                            let v = self.formula(l, s, m, n)?;
                            t.set(Representation::Mixed, &[l, s, m, n], v.clone())?;
                            v
                        }
                    };
                    if !mixed.is_zero() {
                        terms.push(g * mixed);
                    }
                }
                let v = Expr::sum(terms).simplify()?;
                written += t.set(Representation::Covariant, &[r, s, m, n], v)?;
                independent += 1;
            }
        }
        debug!(independent, "independent riemann components computed");
        // What symmetries could not reach must vanish by antisymmetry, and
        // is checked to be so before being written as zero
        let mut reached = bitvec![0; DIM.pow(4)];
        for (flat, idx) in all_indices::<4>().enumerate() {
            reached.set(flat, t.is_known(Representation::Covariant, &idx));
        }
        let mut zeros = 0;
        for flat in reached.iter_zeros() {
            let idx: [usize; 4] = unflatten(flat);
            let [r, s, m, n] = idx;
            let v = if r == s || m == n {
                zeros += 1;
                Expr::zero()
            } else {
                self.lowered(r, s, m, n)?
            };
            written += t.set(Representation::Covariant, &idx, v)?;
        }
        if zeros > 0 {
            warn!(components = zeros, "riemann components vanishing by antisymmetry filled with zero");
        }
        Ok(written)
    }

    /// `R_{ρσμν} = g_{ρλ} R^λ_{σμν}` through the formula
    fn lowered(&self, r: usize, s: usize, m: usize, n: usize) -> Result<Expr> {
        let metric = self.tensor.metric();
        let mut terms = Vec::new();
        for l in 0..DIM {
            let g = metric.co(r, l);
            if !g.is_zero() {
                terms.push(g * self.formula(l, s, m, n)?);
            }
        }
        Expr::sum(terms).simplify()
    }
}

impl Field for RiemannTensor {
    const NAME: &'static str = "riemann";

    fn dependencies(_: &Config) -> Vec<FieldEntry> {
        vec![FieldEntry::of::<ChristoffelSymbols>()]
    }

    fn instantiate(manifold: &Manifold) -> Result<Self> {
        Ok(RiemannTensor {
            tensor: Tensor::new(Self::NAME, manifold.metric_rc(), Symmetry::RiemannLike),
            christoffel: manifold.dependency::<ChristoffelSymbols>()?,
        })
    }

    fn compute(&self, _: &Manifold, config: &Config) -> Result<usize> {
        if config.reduced_riemann {
            self.compute_reduced()
        } else {
            self.tensor
                .fill(Representation::Mixed, |&[r, s, m, n]| self.formula(r, s, m, n))
        }
    }
}

/// `K = R^{ρσμν} R_{ρσμν}`
#[derive(Debug)]
pub struct KretschmannScalar {
    scalar: Scalar,
    riemann: Rc<RiemannTensor>,
}

scalar_field!(KretschmannScalar);

impl Field for KretschmannScalar {
    const NAME: &'static str = "kretschmann";

    fn dependencies(_: &Config) -> Vec<FieldEntry> {
        vec![FieldEntry::of::<RiemannTensor>()]
    }

    fn instantiate(manifold: &Manifold) -> Result<Self> {
        Ok(KretschmannScalar {
            scalar: Scalar::new(Self::NAME),
            riemann: manifold.dependency::<RiemannTensor>()?,
        })
    }

    fn compute(&self, _: &Manifold, _: &Config) -> Result<usize> {
        self.scalar.get_or_compute(|| {
            let mut terms = Vec::new();
            for idx in all_indices::<4>() {
                let co = self.riemann.tensor.co(&idx)?;
                if !co.is_zero() {
                    terms.push(self.riemann.tensor.contra(&idx)? * co);
                }
            }
            Expr::sum(terms).simplify()
        })?;
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expr::{stats, sym},
        fields::AnyField,
        metric::MetricTensor,
        units::UnitSystem,
    };
    use rstest::*;

    fn manifold(metric: MetricTensor, config: Config) -> Manifold {
        Manifold::new(metric, UnitSystem::natural_ncc(), config)
    }

    fn same(a: Expr, b: &Expr) -> bool {
        (a - b).simplify().unwrap().is_zero()
    }

    #[rstest]
    #[case::cartesian(MetricTensor::minkowski_txyz(&UnitSystem::natural_ncc()).unwrap())]
    #[case::spherical(MetricTensor::minkowski_trtp(&UnitSystem::natural_ncc()).unwrap())]
    #[case::cylindrical(MetricTensor::minkowski_trtz(&UnitSystem::natural_ncc()).unwrap())]
    fn flat_space(#[case] metric: MetricTensor) {
        let m = manifold(metric, Config::default());
        let riemann = m.define::<RiemannTensor>().unwrap();
        for idx in all_indices::<4>() {
            assert!(riemann.mixed(&idx).unwrap().is_zero(), "R{idx:?}");
        }
    }

    #[test]
    fn mirrors_are_filled() {
        let m = manifold(
            MetricTensor::schwarzschild(&UnitSystem::natural_ncc()).unwrap(),
            Config::default(),
        );
        let riemann = m.define::<RiemannTensor>().unwrap();
        assert_eq!(riemann.known(Representation::Mixed), 256);
        let a = riemann.mixed(&[1, 0, 1, 0]).unwrap();
        let b = riemann.mixed(&[1, 0, 0, 1]).unwrap();
        assert!(same(a.clone() + b, &Expr::zero()));
        assert!(!a.is_zero());
        // Covariant pair exchange
        let c = riemann.co(&[0, 1, 0, 1]).unwrap();
        assert!(same(c, &riemann.co(&[1, 0, 1, 0]).unwrap()));
    }

    #[test]
    fn reduced_mode_agrees() {
        let full = manifold(
            MetricTensor::schwarzschild(&UnitSystem::natural_ncc()).unwrap(),
            Config::default(),
        );
        let reduced = manifold(
            MetricTensor::schwarzschild(&UnitSystem::natural_ncc()).unwrap(),
            Config::default().with_reduced_riemann(true),
        );
        let rf = full.define::<RiemannTensor>().unwrap();
        let rr = reduced.define::<RiemannTensor>().unwrap();
        assert_eq!(rr.origin(), Some(Representation::Covariant));
        assert_eq!(rr.known(Representation::Covariant), 256);
        for idx in all_indices::<4>() {
            assert!(same(rf.co(&idx).unwrap(), &rr.co(&idx).unwrap()), "R{idx:?}");
            assert!(same(rf.mixed(&idx).unwrap(), &rr.mixed(&idx).unwrap()), "R{idx:?}");
        }
    }

    #[test]
    fn reduced_mode_does_less_work() {
        let work = |config: Config| {
            let m = manifold(MetricTensor::schwarzschild(&UnitSystem::natural_ncc()).unwrap(), config);
            m.define::<ChristoffelSymbols>().unwrap();
            let before = stats::snapshot();
            m.define::<RiemannTensor>().unwrap();
            stats::snapshot().since(&before)
        };
        let full = work(Config::default());
        let reduced = work(Config::default().with_reduced_riemann(true));
        assert!(reduced.simplify < full.simplify, "{reduced:?} vs {full:?}");
        assert!(reduced.differentiate < full.differentiate, "{reduced:?} vs {full:?}");
    }

    #[test]
    fn two_sphere_curvature() {
        // A sphere of radius a, with trivial time and z directions
        let coords = crate::coords::CoordinateSystem::new(["t", "theta", "phi", "z"]).unwrap();
        let th = coords.x(1);
        let a = sym("a");
        let g = MetricTensor::new(
            Rc::new(coords),
            crate::expr::Matrix4::diagonal([
                Expr::one(),
                -a.pow(2),
                -(a.pow(2) * th.sin().pow(2)),
                Expr::integer(-1),
            ]),
            crate::metric::Indexing::Covariant,
        )
        .unwrap();
        let m = manifold(g, Config::default());
        let riemann = m.define::<RiemannTensor>().unwrap();
        // R^θ_{φθφ} = sin²θ
        assert!(same(riemann.mixed(&[1, 2, 1, 2]).unwrap(), &th.sin().pow(2)));
        let k = m.define::<KretschmannScalar>().unwrap();
        assert!(same(k.get().unwrap(), &(4 * a.pow(-4))));
    }

    #[test]
    fn schwarzschild_kretschmann() {
        let m = manifold(
            MetricTensor::schwarzschild(&UnitSystem::natural_ncc()).unwrap(),
            Config::default(),
        );
        let k = m.define::<KretschmannScalar>().unwrap();
        let expected = 48 * sym("M").pow(2) / sym("r").pow(6);
        assert!(same(k.get().unwrap(), &expected));
    }
}
