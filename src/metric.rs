//! The metric tensor, and a few well-known metrics

use crate::{
    coords::{CoordinateSystem, DIM},
    error::{Error, Result},
    expr::{function, Expr, Matrix4},
    tensor::memo,
    units::UnitSystem,
};
use std::{cell::OnceCell, rc::Rc};
use tracing::debug;

/// Which representation the components given to [`MetricTensor::new`] are in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indexing {
    Covariant,
    Contravariant,
}

/// The metric of a 4-dimensional spacetime, in both its covariant and
/// contravariant forms. Immutable once built
#[derive(Debug)]
pub struct MetricTensor {
    coords: Rc<CoordinateSystem>,
    dd: Matrix4,
    uu: Matrix4,
    det_dd: Expr,
    det_uu: Expr,
    /// `∂_k g_{ij}` at `(i * DIM + j) * DIM + k`
    dd_diff: Vec<OnceCell<Expr>>,
}

impl MetricTensor {
    /// Builds the metric from one representation, inverting it to get the
    /// other one. Fails with [`Error::AsymmetricMetric`] if the matrix is
    /// not symmetric, and with [`Error::SingularMetric`] if it is not
    /// invertible
    pub fn new(
        coords: Rc<CoordinateSystem>,
        components: Matrix4,
        indexing: Indexing,
    ) -> Result<Self> {
        let given = components.simplify()?;
        if let Some((row, col)) = given.first_asymmetry()? {
            return Err(Error::AsymmetricMetric { row, col });
        }
        let inverted = given.inverse()?;
        let (dd, uu) = match indexing {
            Indexing::Covariant => (given, inverted),
            Indexing::Contravariant => (inverted, given),
        };
        let det_dd = dd.determinant()?;
        let det_uu = det_dd.pow(-1).simplify()?;
        debug!(coordinates = %coords, ?indexing, "metric tensor built");
        Ok(MetricTensor {
            coords,
            dd,
            uu,
            det_dd,
            det_uu,
            dd_diff: (0..DIM.pow(3)).map(|_| OnceCell::new()).collect(),
        })
    }

    pub fn coords(&self) -> &CoordinateSystem {
        &self.coords
    }

    /// `g_{ij}`
    ///
    /// # Panics
    ///
    /// If `i` or `j` is not below [`DIM`]. Field components, which are
    /// indexed at runtime, check their indices instead
    pub fn co(&self, i: usize, j: usize) -> &Expr {
        self.dd.get(i, j)
    }

    /// `g^{ij}`
    ///
    /// # Panics
    ///
    /// If `i` or `j` is not below [`DIM`]
    pub fn contra(&self, i: usize, j: usize) -> &Expr {
        self.uu.get(i, j)
    }

    /// `g^i_j`, which is always the Kronecker delta
    pub fn mixed(&self, i: usize, j: usize) -> Expr {
        if i == j {
            Expr::one()
        } else {
            Expr::zero()
        }
    }

    pub fn co_matrix(&self) -> &Matrix4 {
        &self.dd
    }

    pub fn contra_matrix(&self) -> &Matrix4 {
        &self.uu
    }

    /// Determinant of the covariant components
    pub fn det_co(&self) -> &Expr {
        &self.det_dd
    }

    /// Determinant of the contravariant components
    pub fn det_contra(&self) -> &Expr {
        &self.det_uu
    }

    /// `∂_k g_{ij}`, simplified. Computed once per unordered `(i, j)` pair
    pub fn co_diff(&self, i: usize, j: usize, k: usize) -> Result<&Expr> {
        let (i, j) = (i.min(j), i.max(j));
        memo(&self.dd_diff[(i * DIM + j) * DIM + k], || {
            self.dd
                .get(i, j)
                .differentiate(self.coords.coordinate(k))
                .simplify()
        })
    }

    /// Trace `g^{ij} T_{ij}` of a covariant rank-2 quantity
    pub fn trace_co(&self, t: impl Fn(usize, usize) -> Result<Expr>) -> Result<Expr> {
        let mut terms = Vec::new();
        for i in 0..DIM {
            for j in 0..DIM {
                let g = self.contra(i, j);
                if !g.is_zero() {
                    terms.push(g * t(i, j)?);
                }
            }
        }
        Expr::sum(terms).simplify()
    }

    // # PRESETS //

    /// Flat spacetime in Cartesian coordinates
    pub fn minkowski_txyz(units: &UnitSystem) -> Result<Self> {
        Self::new(
            Rc::new(CoordinateSystem::txyz()),
            Matrix4::diagonal([
                units.c.pow(2),
                Expr::integer(-1),
                Expr::integer(-1),
                Expr::integer(-1),
            ]),
            Indexing::Covariant,
        )
    }

    /// Flat spacetime in spherical coordinates
    pub fn minkowski_trtp(units: &UnitSystem) -> Result<Self> {
        let coords = CoordinateSystem::trtp();
        let (r, th) = (coords.x(1), coords.x(2));
        Self::new(
            Rc::new(coords),
            Matrix4::diagonal([
                units.c.pow(2),
                Expr::integer(-1),
                -r.pow(2),
                -(r.pow(2) * th.sin().pow(2)),
            ]),
            Indexing::Covariant,
        )
    }

    /// Flat spacetime in cylindrical coordinates
    pub fn minkowski_trtz(units: &UnitSystem) -> Result<Self> {
        let coords = CoordinateSystem::trtz();
        let r = coords.x(1);
        Self::new(
            Rc::new(coords),
            Matrix4::diagonal([
                units.c.pow(2),
                Expr::integer(-1),
                -r.pow(2),
                Expr::integer(-1),
            ]),
            Indexing::Covariant,
        )
    }

    /// Outside of a spherical mass `M`, in Schwarzschild coordinates
    pub fn schwarzschild(units: &UnitSystem) -> Result<Self> {
        let coords = CoordinateSystem::trtp();
        let (r, th) = (coords.x(1), coords.x(2));
        let m = crate::expr::sym("M");
        let f = 1 - 2 * &units.g * m / (&r * units.c.pow(2));
        Self::new(
            Rc::new(coords),
            Matrix4::diagonal([
                &f * units.c.pow(2),
                -f.pow(-1),
                -r.pow(2),
                -(r.pow(2) * th.sin().pow(2)),
            ]),
            Indexing::Covariant,
        )
    }

    /// The general static, spherically symmetric metric
    /// `f(r) dt² - dr²/g(r) - r² dΩ²`, with `f` and `g` undefined functions
    pub fn spherically_symmetric() -> Result<Self> {
        let coords = CoordinateSystem::trtp();
        let (r, th) = (coords.x(1), coords.x(2));
        let f = function("f", vec![r.clone()]);
        let g = function("g", vec![r.clone()]);
        Self::new(
            Rc::new(coords),
            Matrix4::diagonal([f, -g.pow(-1), -r.pow(2), -(r.pow(2) * th.sin().pow(2))]),
            Indexing::Covariant,
        )
    }

    /// Static patch of de Sitter space, of cosmological constant `Lambda`:
    /// `f = 1 + Λ r² / 3`, the vacuum solution of the field equations
    /// `T_{μν} = (G_{μν} + Λ g_{μν}) / κ` with this signature. `Λ` is then
    /// negative for an expanding universe
    pub fn de_sitter(units: &UnitSystem) -> Result<Self> {
        let coords = CoordinateSystem::trtp();
        let (r, th) = (coords.x(1), coords.x(2));
        let lambda = crate::expr::sym("Lambda");
        let f = 1 + lambda * r.pow(2) / 3;
        Self::new(
            Rc::new(coords),
            Matrix4::diagonal([
                &f * units.c.pow(2),
                -f.pow(-1),
                -r.pow(2),
                -(r.pow(2) * th.sin().pow(2)),
            ]),
            Indexing::Covariant,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::sym;
    use rstest::*;

    fn assert_inverse(g: &MetricTensor) {
        let delta = g.contra_matrix().mul(g.co_matrix()).simplify().unwrap();
        for i in 0..DIM {
            for j in 0..DIM {
                assert_eq!(delta[(i, j)], g.mixed(i, j), "g^i_j at ({i}, {j})");
            }
        }
        assert!(g.contra_matrix().is_symmetric().unwrap());
    }

    #[rstest]
    #[case::minkowski_txyz(MetricTensor::minkowski_txyz(&UnitSystem::si_ncc()))]
    #[case::minkowski_trtp(MetricTensor::minkowski_trtp(&UnitSystem::si_ncc()))]
    #[case::minkowski_trtz(MetricTensor::minkowski_trtz(&UnitSystem::natural_ncc()))]
    #[case::schwarzschild(MetricTensor::schwarzschild(&UnitSystem::si_ncc()))]
    #[case::spherically_symmetric(MetricTensor::spherically_symmetric())]
    #[case::de_sitter(MetricTensor::de_sitter(&UnitSystem::natural()))]
    fn metric_consistency(#[case] g: Result<MetricTensor>) {
        assert_inverse(&g.unwrap());
    }

    #[test]
    fn from_contravariant() {
        let coords = Rc::new(CoordinateSystem::txyz());
        let uu = Matrix4::diagonal([sym("a"), Expr::integer(-1), Expr::integer(-1), Expr::integer(-1)]);
        let g = MetricTensor::new(coords, uu, Indexing::Contravariant).unwrap();
        assert_eq!(*g.co(0, 0), sym("a").pow(-1));
        assert_eq!(*g.contra(0, 0), sym("a"));
        assert_inverse(&g);
    }

    #[test]
    fn determinants() {
        let g = MetricTensor::minkowski_txyz(&UnitSystem::natural_ncc()).unwrap();
        assert_eq!(*g.det_co(), Expr::integer(-1));
        assert_eq!(*g.det_contra(), Expr::integer(-1));
    }

    #[test]
    fn singular_metric() {
        let coords = Rc::new(CoordinateSystem::txyz());
        let m = Matrix4::diagonal([Expr::one(), Expr::integer(-1), Expr::zero(), Expr::integer(-1)]);
        assert_eq!(
            MetricTensor::new(coords, m, Indexing::Covariant).unwrap_err(),
            Error::SingularMetric
        );
    }

    #[test]
    fn asymmetric_metric() {
        let coords = Rc::new(CoordinateSystem::txyz());
        let x = sym("x");
        let m = Matrix4::from_fn(|i, j| match (i, j) {
            (0, 0) => Expr::one(),
            (0, 1) => x.clone(),
            _ if i == j => Expr::integer(-1),
            _ => Expr::zero(),
        });
        assert_eq!(
            MetricTensor::new(coords, m, Indexing::Covariant).unwrap_err(),
            Error::AsymmetricMetric { row: 0, col: 1 }
        );
    }

    #[test]
    fn off_diagonal_derivatives() {
        let coords = Rc::new(CoordinateSystem::txyz());
        let x = sym("x");
        let m = Matrix4::from_fn(|i, j| match (i, j) {
            (0, 0) => Expr::one(),
            (0, 1) | (1, 0) => x.clone(),
            _ if i == j => Expr::integer(-1),
            _ => Expr::zero(),
        });
        let g = MetricTensor::new(coords, m, Indexing::Covariant).unwrap();
        assert_eq!(*g.co_diff(1, 0, 1).unwrap(), Expr::one());
        assert!(g.co_diff(1, 0, 0).unwrap().is_zero());
        assert_inverse(&g);
    }

    #[test]
    #[should_panic]
    fn components_past_the_dimension() {
        let g = MetricTensor::minkowski_txyz(&UnitSystem::natural_ncc()).unwrap();
        g.co(DIM, 0);
    }

    #[test]
    fn derivatives_are_memoized() {
        let g = MetricTensor::minkowski_trtp(&UnitSystem::natural_ncc()).unwrap();
        let d = g.co_diff(2, 2, 1).unwrap().clone();
        assert_eq!(d, (-2 * sym("r")).simplify().unwrap());
        let before = crate::expr::stats::snapshot();
        assert_eq!(*g.co_diff(2, 2, 1).unwrap(), d);
        assert_eq!(crate::expr::stats::snapshot().since(&before).total(), 0);
    }
}
