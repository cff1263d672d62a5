//! The errors raised by the expression engine and by the tensor machinery
//! built on top of it

use crate::symmetry::Representation;
use thiserror::Error;

/// Everything that can go wrong while building or querying fields
///
/// `IndexArity`, `IndexOutOfRange`, `UncomputedSource` and `DependencyCycle`
/// always denote a programming error in the caller or in a field definition.
/// `UndefinedField` and `Underdetermination` are the two errors interactive
/// callers are expected to recover from (by defining the field, or by
/// supplying more parameters).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A component was requested with the wrong number of indices
    #[error("{field} has rank {expected} but was indexed with {got} indices")]
    IndexArity {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    /// An index is not a valid coordinate number
    #[error("index {index} of {field} is out of range (dimension is {dim})")]
    IndexOutOfRange {
        field: &'static str,
        index: usize,
        dim: usize,
    },

    /// A representation was requested before the one it is derived from was
    /// computed
    #[error("cannot derive {field} {representation} component {indices:?}: source component is not computed")]
    UncomputedSource {
        field: &'static str,
        representation: Representation,
        indices: Vec<usize>,
    },

    /// The supplied metric matrix has an identically vanishing determinant
    #[error("metric is singular: its determinant is identically zero")]
    SingularMetric,

    /// The supplied metric matrix differs from its transpose
    #[error("metric is not symmetric: components ({row}, {col}) and ({col}, {row}) differ")]
    AsymmetricMetric { row: usize, col: usize },

    /// `Manifold::of` was called on a field that was never defined while
    /// auto-definition is disabled, or on a name no field answers to
    #[error("field \"{name}\" is not defined on this manifold")]
    UndefinedField { name: String },

    /// Numeric evaluation left some symbols unresolved
    #[error("cannot evaluate numerically, free symbols remain: {}", symbols.join(", "))]
    Underdetermination { symbols: Vec<String> },

    /// Two coordinates of a coordinate system share a name
    #[error("coordinate \"{name}\" appears more than once")]
    DuplicateCoordinate { name: String },

    /// A field (transitively) depends on itself
    #[error("field \"{name}\" depends on itself")]
    DependencyCycle { name: &'static str },

    /// Division by an expression that simplifies to zero
    #[error("division by zero")]
    DivisionByZero,

    /// A floating-point value (NaN or infinite) has no exact rational form
    #[error("{value} cannot be turned into an exact number")]
    NotANumber { value: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
