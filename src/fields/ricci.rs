use super::{scalar_field, tensor_field, ChristoffelSymbols, Field, FieldEntry, RiemannTensor};
use crate::{
    config::{Config, RicciPath},
    coords::DIM,
    error::Result,
    expr::Expr,
    manifold::Manifold,
    symmetry::{Representation, Symmetry},
    tensor::{Scalar, Tensor},
};
use std::{cell::OnceCell, rc::Rc};

/// What the Ricci tensor is computed from
#[derive(Debug)]
pub enum RicciSource {
    /// `R_{μν} = R^λ_{μλν}`
    FromRiemann(Rc<RiemannTensor>),
    /// The same contraction, written with the Christoffel symbols directly
    FromChristoffel(Rc<ChristoffelSymbols>),
}

/// `R_{μν}`, symmetric
#[derive(Debug)]
pub struct RicciTensor {
    tensor: Tensor<2>,
    source: RicciSource,
    scalar: OnceCell<Expr>,
}

tensor_field!(RicciTensor, 2);

impl RicciTensor {
    pub fn source(&self) -> &RicciSource {
        &self.source
    }

    /// The Ricci scalar `R = g^{μν} R_{μν}`, computed once
    pub fn scalar(&self) -> Result<Expr> {
        crate::tensor::memo(&self.scalar, || self.tensor.trace()).cloned()
    }

    fn formula(&self, s: usize, n: usize) -> Result<Expr> {
        match &self.source {
            RicciSource::FromRiemann(riemann) => {
                let terms = (0..DIM)
                    .map(|l| riemann.mixed(&[l, s, l, n]))
                    .collect::<Result<Vec<_>>>()?;
                Expr::sum(terms).simplify()
            }
            RicciSource::FromChristoffel(g) => {
                let mut terms = Vec::new();
                for a in 0..DIM {
                    terms.push(g.mixed_diff(a, n, s, a)?);
                    terms.push(-g.mixed_diff(a, a, s, n)?);
                    for l in 0..DIM {
                        let (p, q) = (g.mixed(&[a, a, l])?, g.mixed(&[l, n, s])?);
                        if !p.is_zero() && !q.is_zero() {
                            terms.push(p * q);
                        }
                        let (p, q) = (g.mixed(&[a, n, l])?, g.mixed(&[l, a, s])?);
                        if !p.is_zero() && !q.is_zero() {
                            terms.push(-(p * q));
                        }
                    }
                }
                Expr::sum(terms).simplify()
            }
        }
    }
}

impl Field for RicciTensor {
    const NAME: &'static str = "ricci tensor";

    fn dependencies(config: &Config) -> Vec<FieldEntry> {
        match config.ricci_path {
            RicciPath::FromRiemann => vec![FieldEntry::of::<RiemannTensor>()],
            RicciPath::FromChristoffel => vec![FieldEntry::of::<ChristoffelSymbols>()],
        }
    }

    fn instantiate(manifold: &Manifold) -> Result<Self> {
        let source = match manifold.config().ricci_path {
            RicciPath::FromRiemann => RicciSource::FromRiemann(manifold.dependency()?),
            RicciPath::FromChristoffel => RicciSource::FromChristoffel(manifold.dependency()?),
        };
        Ok(RicciTensor {
            tensor: Tensor::new(Self::NAME, manifold.metric_rc(), Symmetry::Symmetric),
            source,
            scalar: OnceCell::new(),
        })
    }

    fn compute(&self, _: &Manifold, _: &Config) -> Result<usize> {
        self.tensor
            .fill(Representation::Covariant, |&[s, n]| self.formula(s, n))
    }
}

/// The Ricci scalar `R`, as a field of its own
#[derive(Debug)]
pub struct RicciScalar {
    scalar: Scalar,
    ricci: Rc<RicciTensor>,
}

scalar_field!(RicciScalar);

impl Field for RicciScalar {
    const NAME: &'static str = "ricci scalar";

    fn dependencies(_: &Config) -> Vec<FieldEntry> {
        vec![FieldEntry::of::<RicciTensor>()]
    }

    fn instantiate(manifold: &Manifold) -> Result<Self> {
        Ok(RicciScalar {
            scalar: Scalar::new(Self::NAME),
            ricci: manifold.dependency()?,
        })
    }

    fn compute(&self, _: &Manifold, _: &Config) -> Result<usize> {
        self.scalar.get_or_compute(|| self.ricci.scalar())?;
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expr::sym,
        fields::AnyField,
        metric::MetricTensor,
        tensor::all_indices,
        units::UnitSystem,
    };

    fn manifold(metric: MetricTensor, path: RicciPath) -> Manifold {
        Manifold::new(
            metric,
            UnitSystem::natural_ncc(),
            Config::default().with_ricci_path(path),
        )
    }

    fn same(a: &Expr, b: &Expr) -> bool {
        (a - b).simplify().unwrap().is_zero()
    }

    #[test]
    fn flat_ricci_scalar() {
        let m = manifold(
            MetricTensor::minkowski_txyz(&UnitSystem::natural_ncc()).unwrap(),
            RicciPath::FromRiemann,
        );
        assert!(m.define::<RicciScalar>().unwrap().get().unwrap().is_zero());
    }

    #[test]
    fn paths_agree() {
        let from_riemann = manifold(MetricTensor::spherically_symmetric().unwrap(), RicciPath::FromRiemann);
        let from_christoffel =
            manifold(MetricTensor::spherically_symmetric().unwrap(), RicciPath::FromChristoffel);
        let a = from_riemann.define::<RicciTensor>().unwrap();
        let b = from_christoffel.define::<RicciTensor>().unwrap();
        assert!(matches!(a.source(), RicciSource::FromRiemann(_)));
        assert!(matches!(b.source(), RicciSource::FromChristoffel(_)));
        for [i, j] in all_indices::<2>() {
            assert!(same(&a.co(&[i, j]).unwrap(), &b.co(&[i, j]).unwrap()), "R_{i}{j}");
        }
        assert!(same(&a.scalar().unwrap(), &b.scalar().unwrap()));
        // The generic metric is not Ricci-flat
        assert!(!a.co(&[0, 0]).unwrap().is_zero());
    }

    #[test]
    fn symmetric_mirror_is_free() {
        let m = manifold(MetricTensor::spherically_symmetric().unwrap(), RicciPath::FromRiemann);
        let ricci = m.define::<RicciTensor>().unwrap();
        let before = crate::expr::stats::snapshot();
        for [i, j] in all_indices::<2>() {
            assert_eq!(ricci.co(&[i, j]).unwrap(), ricci.co(&[j, i]).unwrap());
        }
        assert_eq!(crate::expr::stats::snapshot().since(&before).total(), 0);
        assert_eq!(m.computations("ricci tensor"), 1);
    }

    #[test]
    fn constant_curvature_space() {
        // de Sitter, as a vacuum solution with a cosmological constant:
        // R_{μν} = Λ g_{μν}
        let m = manifold(MetricTensor::de_sitter(&UnitSystem::natural()).unwrap(), RicciPath::FromRiemann);
        let ricci = m.define::<RicciTensor>().unwrap();
        let lambda = sym("Lambda");
        for [i, j] in all_indices::<2>() {
            let expected = &lambda * m.metric().co(i, j);
            assert!(same(&ricci.co(&[i, j]).unwrap(), &expected), "R_{i}{j}");
        }
        assert!(same(&ricci.trace().unwrap(), &(4 * lambda)));
    }
}
