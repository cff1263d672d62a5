use super::{tensor_field, Field, FieldEntry, RicciTensor, RiemannTensor};
use crate::{
    config::Config,
    error::Result,
    expr::Expr,
    manifold::Manifold,
    symmetry::{Representation, Symmetry},
    tensor::Tensor,
};
use std::rc::Rc;

/// The trace-free part of the Riemann tensor:
///
/// ```text
/// C_{ρσμν} = R_{ρσμν}
///          + ½ (R_{ρν} g_{σμ} - R_{ρμ} g_{σν} + R_{σμ} g_{ρν} - R_{σν} g_{ρμ})
///          + ⅙ R (g_{ρμ} g_{σν} - g_{ρν} g_{σμ})
/// ```
#[derive(Debug)]
pub struct WeylTensor {
    tensor: Tensor<4>,
    riemann: Rc<RiemannTensor>,
    ricci: Rc<RicciTensor>,
}

tensor_field!(WeylTensor, 4);

impl WeylTensor {
    fn formula(&self, scalar: &Expr, r: usize, s: usize, m: usize, n: usize) -> Result<Expr> {
        if r == s || m == n {
            return Ok(Expr::zero());
        }
        let g = self.tensor.metric();
        let ricci = |a: usize, b: usize| self.ricci.co(&[a, b]);
        let mut terms = vec![self.riemann.co(&[r, s, m, n])?];
        let half = [
            (ricci(r, n)?, g.co(s, m)),
            (-ricci(r, m)?, g.co(s, n)),
            (ricci(s, m)?, g.co(r, n)),
            (-ricci(s, n)?, g.co(r, m)),
        ];
        for (ric, metric) in half {
            if !ric.is_zero() && !metric.is_zero() {
                terms.push(ric * metric / 2);
            }
        }
        if !scalar.is_zero() {
            let gg = g.co(r, m) * g.co(s, n) - g.co(r, n) * g.co(s, m);
            terms.push(scalar * gg / 6);
        }
        Expr::sum(terms).simplify()
    }
}

impl Field for WeylTensor {
    const NAME: &'static str = "weyl";

    fn dependencies(_: &Config) -> Vec<FieldEntry> {
        // The Ricci tensor may not go through the Riemann tensor, which is
        // needed here regardless
        vec![FieldEntry::of::<RiemannTensor>(), FieldEntry::of::<RicciTensor>()]
    }

    fn instantiate(manifold: &Manifold) -> Result<Self> {
        Ok(WeylTensor {
            tensor: Tensor::new(Self::NAME, manifold.metric_rc(), Symmetry::RiemannLike),
            riemann: manifold.dependency()?,
            ricci: manifold.dependency()?,
        })
    }

    fn compute(&self, _: &Manifold, _: &Config) -> Result<usize> {
        let scalar = self.ricci.scalar()?;
        self.tensor.fill(Representation::Covariant, |&[r, s, m, n]| {
            self.formula(&scalar, r, s, m, n)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::RicciPath,
        fields::AnyField,
        metric::MetricTensor,
        tensor::all_indices,
        units::UnitSystem,
    };
    use rstest::*;

    fn same(a: &Expr, b: &Expr) -> bool {
        (a - b).simplify().unwrap().is_zero()
    }

    #[rstest]
    #[case::from_riemann(RicciPath::FromRiemann)]
    #[case::from_christoffel(RicciPath::FromChristoffel)]
    fn equals_riemann_in_vacuum(#[case] path: RicciPath) {
        let m = Manifold::new(
            MetricTensor::schwarzschild(&UnitSystem::natural_ncc()).unwrap(),
            UnitSystem::natural_ncc(),
            Config::default().with_ricci_path(path),
        );
        let weyl = m.define::<WeylTensor>().unwrap();
        let riemann = m.of::<RiemannTensor>().unwrap();
        for idx in all_indices::<4>() {
            assert!(same(&weyl.co(&idx).unwrap(), &riemann.co(&idx).unwrap()), "C{idx:?}");
        }
        // Not trivially so
        assert!(!weyl.co(&[0, 1, 0, 1]).unwrap().is_zero());
    }

    #[test]
    fn flat_space() {
        let units = UnitSystem::natural_ncc();
        let m = Manifold::new(MetricTensor::minkowski_trtp(&units).unwrap(), units, Config::default());
        let weyl = m.define::<WeylTensor>().unwrap();
        for idx in all_indices::<4>() {
            assert!(weyl.co(&idx).unwrap().is_zero(), "C{idx:?}");
        }
    }

    #[test]
    fn conformally_flat() {
        // de Sitter space has constant curvature: no Weyl part
        let units = UnitSystem::natural();
        let m = Manifold::new(MetricTensor::de_sitter(&units).unwrap(), units, Config::default());
        let weyl = m.define::<WeylTensor>().unwrap();
        assert_eq!(weyl.origin(), Some(Representation::Covariant));
        for idx in all_indices::<4>() {
            assert!(weyl.co(&idx).unwrap().is_zero(), "C{idx:?}");
        }
        assert!(weyl.mixed(&[1, 2, 1, 2]).unwrap().is_zero());
    }
}
