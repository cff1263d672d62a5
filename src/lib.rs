/*!
# Symbolic tensor calculus for general relativity

Compute the curvature and field-equation tensors of an arbitrary
four-dimensional metric, exactly: Christoffel symbols, the Riemann, Ricci,
Einstein, Weyl and Schouten tensors, and the stress-energy-momentum tensor
the Einstein field equations relate them to.

A computation starts from a [`MetricTensor`], written in some
[`CoordinateSystem`] with the [`expr`] expressions of this crate. The metric
goes into a [`Manifold`], which is then asked for the fields of interest:

```
use relativist::{fields::EinsteinTensor, Config, Manifold, MetricTensor, UnitSystem};

let units = UnitSystem::natural_ncc();
let spacetime = Manifold::new(
    MetricTensor::schwarzschild(&units)?,
    units,
    Config::default(),
);
// Christoffel, Riemann and Ricci get defined along the way
let einstein = spacetime.define::<EinsteinTensor>()?;
assert!(einstein.co(&[0, 0])?.is_zero());
# Ok::<(), relativist::Error>(())
```

Fields are lazy in two ways:

- A field is only built when asked for, directly or as a dependency of
  another one. Each field type exists at most once on a given manifold.
- Each field computes a single representation of its components (its
  covariant, contravariant or mixed form). Any component of the two
  others is derived on first access, by contracting with the metric, and
  cached. Writing a component also writes, for free, every component the
  symmetries of the tensor relate it to.

All the values are exact until they are explicitly given numbers with an
[`Evaluator`] (feature `eval`, enabled by default). The metric signature is
`(+, -, -, -)`, and the Ricci tensor is the contraction `R_{μν} = R^λ_{μλν}`.

Logging is done with [`tracing`]. The crate installs no subscriber.
*/

pub mod config;
pub mod coords;
pub mod error;
pub mod expr;
pub mod fields;
pub mod manifold;
pub mod metric;
pub mod symmetry;
pub mod tensor;
pub mod units;

#[cfg(feature = "eval")]
mod eval;
#[cfg(feature = "eval")]
pub mod evaluator;

pub use config::{Config, RicciPath};
pub use coords::{CoordinateSystem, DIM};
pub use error::{Error, Result};
pub use expr::{sym, Expr};
#[cfg(feature = "eval")]
pub use evaluator::Evaluator;
pub use fields::{AnyField, Field};
pub use manifold::{FieldState, Manifold};
pub use metric::{Indexing, MetricTensor};
pub use symmetry::{Representation, Symmetry};
pub use tensor::{Scalar, Tensor};
pub use units::UnitSystem;
