use super::{AnyField, ChristoffelSymbols, Field, FieldEntry};
use crate::{
    config::Config,
    coords::DIM,
    error::Result,
    expr::Expr,
    manifold::Manifold,
    symmetry::{Representation, Symmetry},
    tensor::Tensor,
};
use std::rc::Rc;

/// The acceleration of a free-falling particle, in terms of its velocity
/// symbols ([`CoordinateSystem::v`](crate::coords::CoordinateSystem::v) and
/// [`CoordinateSystem::w`](crate::coords::CoordinateSystem::w)):
///
/// - proper, `d²x^i/dτ² = -Γ^i_{μν} w^μ w^ν`
/// - coordinate, `d²x^i/dt² = -Γ^i_{μν} v^μ v^ν + Γ^0_{μν} v^μ v^ν v^i`
///
/// As a field, it stands for its proper vector.
#[derive(Debug)]
pub struct GeodesicAccelerationVectors {
    proper: Tensor<1>,
    coordinate: Tensor<1>,
    christoffel: Rc<ChristoffelSymbols>,
}

impl GeodesicAccelerationVectors {
    pub fn proper(&self) -> &Tensor<1> {
        &self.proper
    }

    pub fn coordinate(&self) -> &Tensor<1> {
        &self.coordinate
    }

    /// `Σ Γ^i_{μν} u^μ u^ν`
    fn quadratic(&self, i: usize, u: impl Fn(usize) -> Expr) -> Result<Expr> {
        let mut terms = Vec::new();
        for m in 0..DIM {
            for n in 0..DIM {
                let gamma = self.christoffel.mixed(&[i, m, n])?;
                if !gamma.is_zero() {
                    terms.push(gamma * u(m) * u(n));
                }
            }
        }
        Ok(Expr::sum(terms))
    }
}

impl AnyField for GeodesicAccelerationVectors {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn rank(&self) -> usize {
        1
    }

    fn component(&self, repr: Representation, idx: &[usize]) -> Result<Expr> {
        self.proper.get(repr, idx)
    }
}

impl Field for GeodesicAccelerationVectors {
    const NAME: &'static str = "geodesic acceleration";

    fn dependencies(_: &Config) -> Vec<FieldEntry> {
        vec![FieldEntry::of::<ChristoffelSymbols>()]
    }

    fn instantiate(manifold: &Manifold) -> Result<Self> {
        Ok(GeodesicAccelerationVectors {
            proper: Tensor::new("geodesic acceleration (proper)", manifold.metric_rc(), Symmetry::None),
            coordinate: Tensor::new(
                "geodesic acceleration (coordinate)",
                manifold.metric_rc(),
                Symmetry::None,
            ),
            christoffel: manifold.dependency()?,
        })
    }

    fn compute(&self, manifold: &Manifold, _: &Config) -> Result<usize> {
        let coords = manifold.metric().coords();
        let proper = self.proper.fill(Representation::Contravariant, |&[i]| {
            (-self.quadratic(i, |m| coords.w(m))?).simplify()
        })?;
        let time = self.quadratic(0, |m| coords.v(m))?;
        let coordinate = self.coordinate.fill(Representation::Contravariant, |&[i]| {
            let space = self.quadratic(i, |m| coords.v(m))?;
            (&time * coords.v(i) - space).simplify()
        })?;
        Ok(proper + coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, expr::sym, metric::MetricTensor, units::UnitSystem};

    fn same(a: &Expr, b: &Expr) -> bool {
        (a - b).simplify().unwrap().is_zero()
    }

    #[test]
    fn flat_spherical_centripetal() {
        let units = UnitSystem::natural_ncc();
        let m = Manifold::new(MetricTensor::minkowski_trtp(&units).unwrap(), units, Config::default());
        let a = m.define::<GeodesicAccelerationVectors>().unwrap();
        let (r, th) = (sym("r"), sym("theta"));
        // d²r/dτ² = r (w^θ)² + r sin²θ (w^φ)²
        let expected = &r * sym("w_theta").pow(2) + &r * th.sin().pow(2) * sym("w_phi").pow(2);
        assert!(same(&a.proper().contra(&[1]).unwrap(), &expected));
        assert!(a.proper().contra(&[0]).unwrap().is_zero());
        // Same form with coordinate velocities, the time Christoffels vanishing
        let expected = &r * sym("v_theta").pow(2) + &r * th.sin().pow(2) * sym("v_phi").pow(2);
        assert!(same(&a.coordinate().contra(&[1]).unwrap(), &expected));
        assert_eq!(m.computations("geodesic acceleration"), 1);
    }

    #[test]
    fn newtonian_limit() {
        let units = UnitSystem::natural_ncc();
        let m = Manifold::new(MetricTensor::schwarzschild(&units).unwrap(), units, Config::default());
        let a = m.define::<GeodesicAccelerationVectors>().unwrap();
        // At rest, d²r/dt² = -M/r² (1 - 2M/r)
        let radial = ["v_r", "v_theta", "v_phi"]
            .iter()
            .fold(a.coordinate().contra(&[1]).unwrap(), |e, v| {
                e.substitute(&crate::expr::Symbol::new(v), &Expr::zero())
            });
        let (mass, r) = (sym("M"), sym("r"));
        let expected = -(&mass / r.pow(2)) * (1 - 2 * &mass / &r);
        assert!(same(&radial, &expected));
        // The time component of the coordinate acceleration is always zero
        assert!(a.coordinate().contra(&[0]).unwrap().is_zero());
    }

    #[test]
    fn field_view_is_the_proper_vector() {
        let units = UnitSystem::natural_ncc();
        let m = Manifold::new(MetricTensor::minkowski_trtp(&units).unwrap(), units, Config::default());
        let field = m.define_name("geodesic acceleration").unwrap();
        let a = m.of::<GeodesicAccelerationVectors>().unwrap();
        assert_eq!(field.rank(), 1);
        assert_eq!(field.contra(&[2]).unwrap(), a.proper().contra(&[2]).unwrap());
        assert!(field.co(&[0, 0]).is_err());
    }

    #[test]
    fn vectors_are_told_apart() {
        let units = UnitSystem::natural_ncc();
        let m = Manifold::new(MetricTensor::minkowski_trtp(&units).unwrap(), units, Config::default());
        let a = m.instantiate::<GeodesicAccelerationVectors>().unwrap();
        assert_eq!(a.proper().name(), "geodesic acceleration (proper)");
        assert_eq!(
            a.coordinate().contra(&[0]),
            Err(Error::UncomputedSource {
                field: "geodesic acceleration (coordinate)",
                representation: Representation::Contravariant,
                indices: vec![0],
            })
        );
    }
}
