//! The symbolic scalar expressions tensor components are made of
//!
//! Expressions are exact: numbers are arbitrary-precision rationals, and
//! `pi` or the physical constants are plain symbols until numeric evaluation.

mod base_types;
mod canonical;
mod diff;
mod display;
#[allow(clippy::module_inception)]
mod expr;
mod matrix;
pub mod stats;
mod subst;

pub use base_types::{ExprNode, Function, Symbol};
pub use expr::{function, sym, Expr};
pub use matrix::Matrix4;
