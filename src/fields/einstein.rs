use super::{scalar_field, tensor_field, Field, FieldEntry, RicciTensor};
use crate::{
    config::Config,
    error::Result,
    expr::Expr,
    manifold::Manifold,
    symmetry::{Representation, Symmetry},
    tensor::{Scalar, Tensor},
};
use std::rc::Rc;

/// The cosmological constant `Λ` of the manifold's units, zero if they have
/// none
#[derive(Debug)]
pub struct CosmologicalConstant {
    scalar: Scalar,
}

scalar_field!(CosmologicalConstant);

impl Field for CosmologicalConstant {
    const NAME: &'static str = "cosmological";

    fn dependencies(_: &Config) -> Vec<FieldEntry> {
        vec![]
    }

    fn instantiate(_: &Manifold) -> Result<Self> {
        Ok(CosmologicalConstant {
            scalar: Scalar::new(Self::NAME),
        })
    }

    fn compute(&self, manifold: &Manifold, _: &Config) -> Result<usize> {
        self.scalar
            .get_or_compute(|| Ok(manifold.units().lambda.clone()))?;
        Ok(1)
    }
}

/// `G_{μν} = R_{μν} - ½ R g_{μν}`
#[derive(Debug)]
pub struct EinsteinTensor {
    tensor: Tensor<2>,
    ricci: Rc<RicciTensor>,
}

tensor_field!(EinsteinTensor, 2);

impl Field for EinsteinTensor {
    const NAME: &'static str = "einstein";

    fn dependencies(_: &Config) -> Vec<FieldEntry> {
        vec![FieldEntry::of::<RicciTensor>()]
    }

    fn instantiate(manifold: &Manifold) -> Result<Self> {
        Ok(EinsteinTensor {
            tensor: Tensor::new(Self::NAME, manifold.metric_rc(), Symmetry::Symmetric),
            ricci: manifold.dependency()?,
        })
    }

    fn compute(&self, manifold: &Manifold, _: &Config) -> Result<usize> {
        let scalar = self.ricci.scalar()?;
        let g = manifold.metric();
        self.tensor.fill(Representation::Covariant, |&[m, n]| {
            (self.ricci.co(&[m, n])? - &scalar * g.co(m, n) / 2).simplify()
        })
    }
}

/// `P_{μν} = ½ (R_{μν} - R g_{μν} / 6)`
#[derive(Debug)]
pub struct SchoutenTensor {
    tensor: Tensor<2>,
    ricci: Rc<RicciTensor>,
}

tensor_field!(SchoutenTensor, 2);

impl Field for SchoutenTensor {
    const NAME: &'static str = "schouten";

    fn dependencies(_: &Config) -> Vec<FieldEntry> {
        vec![FieldEntry::of::<RicciTensor>()]
    }

    fn instantiate(manifold: &Manifold) -> Result<Self> {
        Ok(SchoutenTensor {
            tensor: Tensor::new(Self::NAME, manifold.metric_rc(), Symmetry::Symmetric),
            ricci: manifold.dependency()?,
        })
    }

    fn compute(&self, manifold: &Manifold, _: &Config) -> Result<usize> {
        let scalar = self.ricci.scalar()?;
        let g = manifold.metric();
        self.tensor.fill(Representation::Covariant, |&[m, n]| {
            ((self.ricci.co(&[m, n])? - &scalar * g.co(m, n) / 6) / 2).simplify()
        })
    }
}

/// `T_{μν} = (G_{μν} + Λ g_{μν}) / κ`
#[derive(Debug)]
pub struct StressEnergyMomentumTensor {
    tensor: Tensor<2>,
    einstein: Rc<EinsteinTensor>,
    cosmological: Rc<CosmologicalConstant>,
}

tensor_field!(StressEnergyMomentumTensor, 2);

impl Field for StressEnergyMomentumTensor {
    const NAME: &'static str = "stress energy momentum";

    fn dependencies(_: &Config) -> Vec<FieldEntry> {
        vec![
            FieldEntry::of::<CosmologicalConstant>(),
            FieldEntry::of::<EinsteinTensor>(),
        ]
    }

    fn instantiate(manifold: &Manifold) -> Result<Self> {
        Ok(StressEnergyMomentumTensor {
            tensor: Tensor::new(Self::NAME, manifold.metric_rc(), Symmetry::Symmetric),
            einstein: manifold.dependency()?,
            cosmological: manifold.dependency()?,
        })
    }

    fn compute(&self, manifold: &Manifold, _: &Config) -> Result<usize> {
        let lambda = self.cosmological.get()?;
        let kappa = manifold.units().kappa();
        let g = manifold.metric();
        self.tensor.fill(Representation::Covariant, |&[m, n]| {
            ((self.einstein.co(&[m, n])? + &lambda * g.co(m, n)) / &kappa).simplify()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expr::{stats, sym},
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
    #[case::si(UnitSystem::si_ncc())]
    #[case::natural(UnitSystem::natural_ncc())]
    fn schwarzschild_vacuum(#[case] units: UnitSystem) {
        let m = Manifold::new(
            MetricTensor::schwarzschild(&units).unwrap(),
            units,
            Config::default(),
        );
        let einstein = m.define::<EinsteinTensor>().unwrap();
        for [i, j] in all_indices::<2>() {
            assert!(einstein.co(&[i, j]).unwrap().is_zero(), "G_{i}{j}");
        }
    }

    #[test]
    fn schwarzschild_vacuum_reduced() {
        let units = UnitSystem::si_ncc();
        let m = Manifold::new(
            MetricTensor::schwarzschild(&units).unwrap(),
            units,
            Config::default().with_reduced_riemann(true),
        );
        let einstein = m.define::<EinsteinTensor>().unwrap();
        for [i, j] in all_indices::<2>() {
            assert!(einstein.co(&[i, j]).unwrap().is_zero(), "G_{i}{j}");
        }
    }

    #[test]
    fn de_sitter_is_proportional_to_the_metric() {
        let units = UnitSystem::natural();
        let m = Manifold::new(MetricTensor::de_sitter(&units).unwrap(), units, Config::default());
        let einstein = m.define::<EinsteinTensor>().unwrap();
        let lambda = sym("Lambda");
        for [i, j] in all_indices::<2>() {
            let expected = -(&lambda * m.metric().co(i, j));
            assert!(same(&einstein.co(&[i, j]).unwrap(), &expected), "G_{i}{j}");
        }
        // The mixed components form -Λ times the identity
        assert!(same(&einstein.mixed(&[2, 2]).unwrap(), &-lambda));
    }

    #[test]
    fn de_sitter_is_a_vacuum() {
        let units = UnitSystem::natural();
        let m = Manifold::new(MetricTensor::de_sitter(&units).unwrap(), units, Config::default());
        let sem = m.define::<StressEnergyMomentumTensor>().unwrap();
        for [i, j] in all_indices::<2>() {
            assert!(sem.co(&[i, j]).unwrap().is_zero(), "T_{i}{j}");
        }
    }

    #[test]
    fn stress_energy_with_cosmological_constant() {
        let units = UnitSystem::si();
        let m = Manifold::new(
            MetricTensor::schwarzschild(&units).unwrap(),
            units.clone(),
            Config::default(),
        );
        let sem = m.define::<StressEnergyMomentumTensor>().unwrap();
        for [i, j] in all_indices::<2>() {
            let expected = sym("Lambda") * m.metric().co(i, j) / units.kappa();
            assert!(same(&sem.co(&[i, j]).unwrap(), &expected), "T_{i}{j}");
        }
        assert_eq!(m.state("cosmological"), crate::manifold::FieldState::Computed);
    }

    #[test]
    fn schouten_trace() {
        // P = g^{μν} P_{μν} = R / 6 in four dimensions
        let units = UnitSystem::natural();
        let m = Manifold::new(MetricTensor::de_sitter(&units).unwrap(), units, Config::default());
        let schouten = m.define::<SchoutenTensor>().unwrap();
        let ricci = m.of::<RicciTensor>().unwrap();
        assert!(same(&schouten.trace().unwrap(), &(ricci.scalar().unwrap() / 6)));
    }

    #[test]
    fn einstein_mirror_is_free() {
        let units = UnitSystem::natural_ncc();
        let m = Manifold::new(MetricTensor::spherically_symmetric().unwrap(), units, Config::default());
        let einstein = m.define::<EinsteinTensor>().unwrap();
        let before = stats::snapshot();
        for [i, j] in all_indices::<2>() {
            assert_eq!(einstein.co(&[i, j]).unwrap(), einstein.co(&[j, i]).unwrap());
        }
        assert_eq!(stats::snapshot().since(&before).total(), 0);
    }
}
