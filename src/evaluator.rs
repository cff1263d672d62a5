//! Numeric evaluation of field components at a spacetime point

use crate::{
    coords::{CoordinateSystem, DIM},
    error::{Error, Result},
    expr::{Expr, Symbol},
    manifold::Manifold,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Substitutes values for the coordinates, the physical constants and any
/// other parameter of an expression, then reduces it to a number
#[derive(Debug, Clone)]
pub struct Evaluator {
    coords: CoordinateSystem,
    constants: BTreeMap<Symbol, f64>,
}

impl Evaluator {
    /// An evaluator knowing the SI values of `c`, `G` and `h`, and `pi`
    pub fn new(coords: &CoordinateSystem) -> Self {
        let constants = [
            ("c", 299_792_458.0),
            ("G", 6.6743e-11),
            ("h", 6.62607015e-34),
            ("pi", std::f64::consts::PI),
        ];
        Evaluator {
            coords: coords.clone(),
            constants: constants
                .into_iter()
                .map(|(name, value)| (Symbol::new(name), value))
                .collect(),
        }
    }

    /// Add or replace a known constant
    pub fn with_constant(mut self, name: &str, value: f64) -> Self {
        self.constants.insert(Symbol::new(name), value);
        self
    }

    pub fn constants(&self) -> &BTreeMap<Symbol, f64> {
        &self.constants
    }

    /// Replace the coordinates with the components of `point`, then the
    /// named `params`, then the remaining known constants, and simplify.
    /// `params` take precedence over both the point and the constants.
    /// Each pass only sees the symbols the previous ones left or brought
    /// in, so a point component may be written in terms of a parameter,
    /// and either in terms of the constants
    pub fn parameterize(
        &self,
        expr: &Expr,
        point: &[Expr; DIM],
        params: &[(&str, Expr)],
    ) -> Result<Expr> {
        let params: BTreeMap<Symbol, Expr> = params
            .iter()
            .map(|(name, v)| (Symbol::new(name), v.clone()))
            .collect();
        let coordinates: BTreeMap<Symbol, Expr> = self
            .coords
            .coordinates()
            .iter()
            .zip(point)
            .filter(|(s, _)| !params.contains_key(*s))
            .map(|(s, v)| (s.clone(), v.clone()))
            .collect();
        let constants = self
            .constants
            .iter()
            .filter(|(s, _)| !params.contains_key(*s))
            .map(|(s, v)| Ok((s.clone(), Expr::from_f64(*v)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        debug!(
            params = params.len(),
            constants = constants.len(),
            "parameterizing expression"
        );
        let mut e = expr.clone();
        for values in [&coordinates, &params, &constants] {
            e = e.substitute_all(values);
        }
        e.simplify()
    }

    /// [`Self::parameterize`], then reduce to a float. Fails with
    /// [`Error::Underdetermination`] if some symbols were given no value
    pub fn evaluate_with(
        &self,
        expr: &Expr,
        point: &[Expr; DIM],
        params: &[(&str, Expr)],
    ) -> Result<f64> {
        let value = self
            .parameterize(expr, point, params)?
            .try_to_number()
            .map_err(|symbols| Error::Underdetermination { symbols })?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::NotANumber { value })
        }
    }

    /// [`Self::evaluate_with`] numbers for the point and the parameters
    pub fn evaluate(&self, expr: &Expr, point: &[f64; DIM], params: &[(&str, f64)]) -> Result<f64> {
        let point: [Expr; DIM] = array_init::try_array_init(|i| Expr::from_f64(point[i]))?;
        let params = params
            .iter()
            .map(|(name, v)| Ok((*name, Expr::from_f64(*v)?)))
            .collect::<Result<Vec<_>>>()?;
        self.evaluate_with(expr, &point, &params)
    }
}

impl Manifold {
    /// Evaluate an expression, typically a component of one of the fields,
    /// with an [`Evaluator`] for the coordinates of this manifold's metric
    pub fn evaluate(&self, expr: &Expr, point: &[f64; DIM], params: &[(&str, f64)]) -> Result<f64> {
        Evaluator::new(self.metric().coords()).evaluate(expr, point, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        expr::sym,
        fields::{AnyField, StressEnergyMomentumTensor},
        metric::MetricTensor,
        units::UnitSystem,
    };
    use rstest::*;

    #[fixture]
    fn schwarzschild() -> Manifold {
        let units = UnitSystem::si();
        Manifold::new(
            MetricTensor::schwarzschild(&units).unwrap(),
            units,
            Config::default(),
        )
    }

    const POINT: [f64; DIM] = [0.0, 10_000.0, 1.0, 0.5];

    #[rstest]
    fn deterministic(schwarzschild: Manifold) {
        let sem = schwarzschild.define::<StressEnergyMomentumTensor>().unwrap();
        let t00 = sem.co(&[0, 0]).unwrap();
        let params = [("M", 2e30), ("Lambda", 1.1e-52)];
        let a = schwarzschild.evaluate(&t00, &POINT, &params).unwrap();
        let b = schwarzschild.evaluate(&t00, &POINT, &params).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
        // T_00 = Λ g_00 / κ
        let c = 299_792_458.0_f64;
        let g00 = (1.0 - 2.0 * 6.6743e-11 * 2e30 / (1e4 * c * c)) * c * c;
        let kappa = 8.0 * std::f64::consts::PI * 6.6743e-11 / c.powi(4);
        let expected = 1.1e-52 * g00 / kappa;
        assert!(((a - expected) / expected).abs() < 1e-9, "{a} != {expected}");
    }

    #[rstest]
    fn missing_mass(schwarzschild: Manifold) {
        let sem = schwarzschild.define::<StressEnergyMomentumTensor>().unwrap();
        let t00 = sem.co(&[0, 0]).unwrap();
        assert_eq!(
            schwarzschild.evaluate(&t00, &POINT, &[("Lambda", 1.1e-52)]),
            Err(Error::Underdetermination {
                symbols: vec!["M".to_string()]
            })
        );
    }

    #[test]
    fn params_override_point_and_constants() {
        let ev = Evaluator::new(&CoordinateSystem::trtp());
        let e = sym("r") * sym("c");
        assert_eq!(ev.evaluate(&e, &[0.0, 2.0, 0.0, 0.0], &[]), Ok(2.0 * 299_792_458.0));
        assert_eq!(
            ev.evaluate(&e, &[0.0, 2.0, 0.0, 0.0], &[("r", 3.0), ("c", 1.0)]),
            Ok(3.0)
        );
    }

    #[test]
    fn symbolic_result_of_parameterize() {
        let ev = Evaluator::new(&CoordinateSystem::trtp()).with_constant("M", 1.0);
        let e = sym("M") / sym("r") + sym("a");
        let point = [0, 4, 0, 0].map(Expr::integer);
        let p = ev.parameterize(&e, &point, &[]).unwrap();
        assert_eq!(p, (Expr::rational(1, 4) + sym("a")).simplify().unwrap());
        assert_eq!(
            ev.evaluate(&e, &[0.0, 4.0, 0.0, 0.0], &[]),
            Err(Error::Underdetermination {
                symbols: vec!["a".to_string()]
            })
        );
    }

    #[test]
    fn division_by_zero_at_the_origin() {
        let ev = Evaluator::new(&CoordinateSystem::trtp());
        let e = sym("r").pow(-1);
        assert_eq!(ev.evaluate(&e, &[0.0; DIM], &[]), Err(Error::DivisionByZero));
    }

    #[test]
    fn symbolic_point() {
        let ev = Evaluator::new(&CoordinateSystem::trtp());
        let (mass, r) = (sym("M"), sym("r"));
        let mut point = [0, 0, 1, 0].map(Expr::integer);
        point[1] = 2 * &mass;
        // Only the mass is left once the radius is replaced
        assert_eq!(
            ev.evaluate_with(&(&r * 3), &point, &[]),
            Err(Error::Underdetermination {
                symbols: vec!["M".to_string()]
            })
        );
        assert_eq!(ev.evaluate_with(&(&r * 3), &point, &[("M", Expr::rational(1, 2))]), Ok(3.0));
        // On the horizon of the natural metric, g_11 has no finite value
        let g = MetricTensor::schwarzschild(&UnitSystem::natural_ncc()).unwrap();
        assert_eq!(ev.parameterize(g.co(0, 0), &point, &[]), Ok(Expr::zero()));
        assert_eq!(ev.parameterize(g.co(1, 1), &point, &[]), Err(Error::DivisionByZero));
    }

    #[test]
    fn point_in_terms_of_the_constants() {
        let ev = Evaluator::new(&CoordinateSystem::trtp());
        let c = 299_792_458.0_f64;
        // The Schwarzschild radius of a solar mass, in SI units
        let mut point = [0, 0, 1, 0].map(Expr::integer);
        point[1] = 2 * sym("G") * sym("M") / sym("c").pow(2);
        let r = ev
            .evaluate_with(&sym("r"), &point, &[("M", Expr::from_f64(2e30).unwrap())])
            .unwrap();
        let expected = 2.0 * 6.6743e-11 * 2e30 / (c * c);
        assert!(((r - expected) / expected).abs() < 1e-12, "{r} != {expected}");
    }
}
