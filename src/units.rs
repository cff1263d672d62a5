//! Choice of units: which physical constants are normalized to 1, and whether
//! a cosmological constant enters the field equations

use crate::expr::{sym, Expr};

/// The physical constants, as expressions: either the number 1 when
/// normalized, or a free symbol (`c`, `G`, `h`, `Lambda`) that numeric
/// evaluation later replaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSystem {
    /// Speed of light
    pub c: Expr,
    /// Gravitational constant
    pub g: Expr,
    /// Planck constant
    pub h: Expr,
    /// Cosmological constant, zero when disabled
    pub lambda: Expr,
}

impl UnitSystem {
    pub fn new(norm_c: bool, norm_g: bool, norm_h: bool, cosmological_constant: bool) -> Self {
        let constant = |normalized: bool, name: &str| {
            if normalized {
                Expr::one()
            } else {
                sym(name)
            }
        };
        UnitSystem {
            c: constant(norm_c, "c"),
            g: constant(norm_g, "G"),
            h: constant(norm_h, "h"),
            lambda: if cosmological_constant {
                sym("Lambda")
            } else {
                Expr::zero()
            },
        }
    }

    /// SI units, with a cosmological constant
    pub fn si() -> Self {
        Self::new(false, false, false, true)
    }

    /// SI units, no cosmological constant
    pub fn si_ncc() -> Self {
        Self::new(false, false, false, false)
    }

    /// `c = G = h = 1`, with a cosmological constant
    pub fn natural() -> Self {
        Self::new(true, true, true, true)
    }

    /// `c = G = h = 1`, no cosmological constant
    pub fn natural_ncc() -> Self {
        Self::new(true, true, true, false)
    }

    /// The Einstein gravitational coupling `κ = 8πG/c⁴`
    pub fn kappa(&self) -> Expr {
        8 * sym("pi") * &self.g / self.c.pow(4)
    }

    pub fn has_cosmological_constant(&self) -> bool {
        !self.lambda.is_zero()
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::si_ncc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_macros::*;

    simple_eqs! {
        natural_kappa: UnitSystem::natural().kappa() => 8 * sym("pi"),
        ncc_has_no_lambda: UnitSystem::si_ncc().lambda => Expr::zero(),
        si_lambda: UnitSystem::si().has_cosmological_constant() => true,
        natural_c: UnitSystem::natural_ncc().c => Expr::one()
    }
}
