//! Coordinate systems: the four coordinate symbols a metric is written in

use crate::{
    error::{Error, Result},
    expr::{Expr, Symbol},
};
use std::collections::BTreeSet;

/// Number of spacetime dimensions
pub const DIM: usize = 4;

/// Four distinct coordinates `x^0..x^3`, `x^0` being time, along with the
/// symbols of the coordinate velocities `v^i = dx^i/dt` and of the proper
/// velocities `w^i = dx^i/dτ`. Named `v_<coordinate>` and `w_<coordinate>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateSystem {
    x: [Symbol; DIM],
    v: [Symbol; DIM],
    w: [Symbol; DIM],
}

impl CoordinateSystem {
    pub fn new(names: [&str; DIM]) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for n in names {
            if !seen.insert(n) {
                return Err(Error::DuplicateCoordinate {
                    name: n.to_string(),
                });
            }
        }
        Ok(Self::from_distinct(names))
    }

    /// Cartesian coordinates `(t, x, y, z)`
    pub fn txyz() -> Self {
        Self::from_distinct(["t", "x", "y", "z"])
    }

    /// Spherical coordinates `(t, r, theta, phi)`
    pub fn trtp() -> Self {
        Self::from_distinct(["t", "r", "theta", "phi"])
    }

    /// Cylindrical coordinates `(t, r, theta, z)`
    pub fn trtz() -> Self {
        Self::from_distinct(["t", "r", "theta", "z"])
    }

    fn from_distinct(names: [&str; DIM]) -> Self {
        CoordinateSystem {
            x: names.map(Symbol::new),
            v: names.map(|n| Symbol::new(&format!("v_{n}"))),
            w: names.map(|n| Symbol::new(&format!("w_{n}"))),
        }
    }

    /// The `i`-th coordinate symbol
    pub fn coordinate(&self, i: usize) -> &Symbol {
        &self.x[i]
    }

    pub fn coordinates(&self) -> &[Symbol; DIM] {
        &self.x
    }

    /// `x^i` as an expression
    ///
    /// # Panics
    ///
    /// If `i` is not below [`DIM`], as do [`Self::v`] and [`Self::w`]
    pub fn x(&self, i: usize) -> Expr {
        Expr::symbol(&self.x[i])
    }

    /// The coordinate velocity `dx^i/dt` as an expression. `v^0` is
    /// identically 1
    pub fn v(&self, i: usize) -> Expr {
        match i {
            0 => Expr::one(),
            _ => Expr::symbol(&self.v[i]),
        }
    }

    /// The proper velocity `dx^i/dτ` as an expression
    pub fn w(&self, i: usize) -> Expr {
        Expr::symbol(&self.w[i])
    }

    /// The position of a coordinate, by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.x.iter().position(|s| s.name() == name)
    }
}

impl std::fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = &self.x;
        write!(f, "({a}, {b}, {c}, {d})")
    }
}
