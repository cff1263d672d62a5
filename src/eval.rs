//! How to reduce an expression to a floating-point number, once every symbol
//! in it has been given a value

use crate::expr::{Expr, ExprNode as N, Function};
use num_rational::BigRational;
use num_traits::ToPrimitive;
use std::collections::BTreeSet;

impl Expr {
    /// The value of a closed expression. Fails with the sorted names of
    /// the free symbols, and of the undefined functions, that prevent the
    /// evaluation
    pub fn try_to_number(&self) -> Result<f64, Vec<String>> {
        let mut missing = BTreeSet::new();
        let value = self.eval_f64(&mut missing);
        if missing.is_empty() {
            Ok(value)
        } else {
            Err(missing.into_iter().collect())
        }
    }

    /// Keeps going after the first free symbol, so as to report all of them
    fn eval_f64(&self, missing: &mut BTreeSet<String>) -> f64 {
        match self.node() {
            N::Number(q) => rational_to_f64(q),
            N::Symbol(s) => {
                missing.insert(s.name().to_string());
                f64::NAN
            }
            N::Sum(ts) => ts.iter().map(|t| t.eval_f64(missing)).sum(),
            N::Product(fs) => fs.iter().map(|f| f.eval_f64(missing)).product(),
            N::Power(b, n) => {
                let b = b.eval_f64(missing);
                match i32::try_from(*n) {
                    Ok(n) => b.powi(n),
                    Err(_) => b.powf(*n as f64),
                }
            }
            N::Apply(f, args) => {
                let args: Vec<f64> = args.iter().map(|a| a.eval_f64(missing)).collect();
                match (f, args.as_slice()) {
                    (Function::Sin, [x]) => x.sin(),
                    (Function::Cos, [x]) => x.cos(),
                    (Function::Exp, [x]) => x.exp(),
                    (Function::Ln, [x]) => x.ln(),
                    (Function::Sqrt, [x]) => x.sqrt(),
                    (other, _) => {
                        missing.insert(other.name().to_string());
                        f64::NAN
                    }
                }
            }
        }
    }
}

/// Numerators and denominators too large for an `f64` are scaled down
/// together before dividing
fn rational_to_f64(q: &BigRational) -> f64 {
    if let Some(x) = q.to_f64().filter(|x| x.is_finite()) {
        return x;
    }
    let (n, d) = (q.numer(), q.denom());
    let shift = n.bits().max(d.bits()).saturating_sub(1000);
    match ((n >> shift).to_f64(), (d >> shift).to_f64()) {
        (Some(n), Some(d)) => n / d,
        _ => f64::NAN,
    }
}
