//! The fields that can be defined on a [`Manifold`], and how the manifold
//! builds them
//!
//! Each field type names the fields it needs ([`Field::dependencies`]), grabs
//! them from the manifold when it is instantiated, and fills its components
//! in [`Field::compute`]. The manifold does the ordering: dependencies are
//! always computed before the fields that need them.

mod christoffel;
mod einstein;
mod geodesic;
mod ricci;
mod riemann;
mod weyl;

pub use christoffel::ChristoffelSymbols;
pub use einstein::{CosmologicalConstant, EinsteinTensor, SchoutenTensor, StressEnergyMomentumTensor};
pub use geodesic::GeodesicAccelerationVectors;
pub use ricci::{RicciScalar, RicciSource, RicciTensor};
pub use riemann::{KretschmannScalar, RiemannTensor};
pub use weyl::WeylTensor;

use crate::{
    config::Config,
    error::{Error, Result},
    expr::Expr,
    manifold::Manifold,
    symmetry::Representation,
};
use std::{any::Any, fmt::Debug, rc::Rc, sync::OnceLock};

/// What any field exposes, whatever its type and rank. Object-safe, so
/// fields looked up by name can be used through `Rc<dyn AnyField>`
pub trait AnyField: Debug {
    fn name(&self) -> &'static str;

    /// 0 for scalars
    fn rank(&self) -> usize;

    /// A component in some representation. Scalars take no index
    fn component(&self, repr: Representation, idx: &[usize]) -> Result<Expr>;

    fn co(&self, idx: &[usize]) -> Result<Expr> {
        self.component(Representation::Covariant, idx)
    }

    fn contra(&self, idx: &[usize]) -> Result<Expr> {
        self.component(Representation::Contravariant, idx)
    }

    fn mixed(&self, idx: &[usize]) -> Result<Expr> {
        self.component(Representation::Mixed, idx)
    }

    /// `Σ g^{μν} T_{μν}`, for rank-2 fields only
    fn trace(&self) -> Result<Expr> {
        Err(Error::IndexArity {
            field: self.name(),
            expected: 2,
            got: self.rank(),
        })
    }
}

/// A type of field
pub trait Field: AnyField + Sized + 'static {
    /// The name the field is registered and looked up with
    const NAME: &'static str;

    /// The fields that must be computed before this one can be instantiated
    fn dependencies(config: &Config) -> Vec<FieldEntry>;

    /// Create the field with all its components unknown. Its dependencies
    /// are already defined on `manifold`
    fn instantiate(manifold: &Manifold) -> Result<Self>;

    /// Fill the components. Returns how many were written
    fn compute(&self, manifold: &Manifold, config: &Config) -> Result<usize>;
}

/// A type of field, erased, as stored in the catalog and in the manifold
#[derive(Clone, Copy)]
pub struct FieldEntry {
    pub name: &'static str,
    pub(crate) dependencies: fn(&Config) -> Vec<FieldEntry>,
    pub(crate) instantiate: fn(&Manifold) -> Result<Instance>,
    pub(crate) compute: fn(&dyn Any, &Manifold, &Config) -> Result<usize>,
}

/// The same field, once as itself (for downcasting), once as a field
pub(crate) type Instance = (Rc<dyn Any>, Rc<dyn AnyField>);

impl FieldEntry {
    pub fn of<T: Field>() -> Self {
        FieldEntry {
            name: T::NAME,
            dependencies: T::dependencies,
            instantiate: instantiate_as::<T>,
            compute: compute_as::<T>,
        }
    }
}

impl Debug for FieldEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FieldEntry").field(&self.name).finish()
    }
}

fn instantiate_as<T: Field>(manifold: &Manifold) -> Result<Instance> {
    let field = Rc::new(T::instantiate(manifold)?);
    let any: Rc<dyn Any> = field.clone();
    Ok((any, field))
}

fn compute_as<T: Field>(field: &dyn Any, manifold: &Manifold, config: &Config) -> Result<usize> {
    match field.downcast_ref::<T>() {
        Some(f) => f.compute(manifold, config),
        None => Err(Error::UndefinedField {
            name: T::NAME.to_string(),
        }),
    }
}

/// Every field type, in dependency order
pub fn catalog() -> &'static [FieldEntry] {
    static CATALOG: OnceLock<Vec<FieldEntry>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        vec![
            FieldEntry::of::<CosmologicalConstant>(),
            FieldEntry::of::<ChristoffelSymbols>(),
            FieldEntry::of::<RiemannTensor>(),
            FieldEntry::of::<RicciTensor>(),
            FieldEntry::of::<RicciScalar>(),
            FieldEntry::of::<EinsteinTensor>(),
            FieldEntry::of::<SchoutenTensor>(),
            FieldEntry::of::<WeylTensor>(),
            FieldEntry::of::<StressEnergyMomentumTensor>(),
            FieldEntry::of::<KretschmannScalar>(),
            FieldEntry::of::<GeodesicAccelerationVectors>(),
        ]
    })
}

/// The field type registered under a name. Case and surrounding blanks are
/// ignored
pub fn lookup(name: &str) -> Option<FieldEntry> {
    let name = name.trim().to_lowercase();
    catalog().iter().find(|e| e.name == name).copied()
}

/// Fields meant to be defined together
#[derive(Debug, Clone, Copy)]
pub struct FieldPackage {
    pub name: &'static str,
    pub fields: fn() -> Vec<FieldEntry>,
}

/// Everything needed to write down `G_{μν} + Λ g_{μν} = κ T_{μν}`
pub const EINSTEIN_FIELD_EQUATIONS: FieldPackage = FieldPackage {
    name: "einstein field equations",
    fields: einstein_field_equations,
};

fn einstein_field_equations() -> Vec<FieldEntry> {
    vec![
        FieldEntry::of::<CosmologicalConstant>(),
        FieldEntry::of::<ChristoffelSymbols>(),
        FieldEntry::of::<RiemannTensor>(),
        FieldEntry::of::<RicciTensor>(),
        FieldEntry::of::<RicciScalar>(),
        FieldEntry::of::<EinsteinTensor>(),
        FieldEntry::of::<StressEnergyMomentumTensor>(),
    ]
}

/// Implements [`AnyField`] and `Deref` to the underlying storage for a
/// field made of a `tensor: Tensor<$rank>`
macro_rules! tensor_field {
    ($ty:ident, $rank:tt) => {
        impl std::ops::Deref for $ty {
            type Target = $crate::tensor::Tensor<$rank>;
            fn deref(&self) -> &Self::Target {
                &self.tensor
            }
        }

        impl $crate::fields::AnyField for $ty {
            fn name(&self) -> &'static str {
                <Self as $crate::fields::Field>::NAME
            }
            fn rank(&self) -> usize {
                $rank
            }
            fn component(
                &self,
                repr: $crate::symmetry::Representation,
                idx: &[usize],
            ) -> $crate::error::Result<$crate::expr::Expr> {
                self.tensor.get(repr, idx)
            }
            tensor_field!(@trace $rank);
        }
    };
    (@trace 2) => {
        fn trace(&self) -> $crate::error::Result<$crate::expr::Expr> {
            self.tensor.trace()
        }
    };
    (@trace $rank:tt) => {};
}

/// Implements [`AnyField`] and `Deref` for a field made of a
/// `scalar: Scalar`
macro_rules! scalar_field {
    ($ty:ident) => {
        impl std::ops::Deref for $ty {
            type Target = $crate::tensor::Scalar;
            fn deref(&self) -> &Self::Target {
                &self.scalar
            }
        }

        impl $crate::fields::AnyField for $ty {
            fn name(&self) -> &'static str {
                <Self as $crate::fields::Field>::NAME
            }
            fn rank(&self) -> usize {
                0
            }
            fn component(
                &self,
                _repr: $crate::symmetry::Representation,
                idx: &[usize],
            ) -> $crate::error::Result<$crate::expr::Expr> {
                match idx.len() {
                    0 => self.scalar.get(),
                    got => Err($crate::error::Error::IndexArity {
                        field: self.name(),
                        expected: 0,
                        got,
                    }),
                }
            }
        }
    };
}

pub(crate) use {scalar_field, tensor_field};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_macros::*;

    simple_eqs! {
        lookup_trims_and_lowercases: lookup("  Ricci Scalar ").map(|e| e.name) => Some("ricci scalar"),
        lookup_unknown: lookup("torsion").map(|e| e.name) => None,
        catalog_size: catalog().len() => 11
    }

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<_> = catalog().iter().map(|e| e.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), catalog().len());
    }

    #[test]
    fn package_fields_are_all_in_the_catalog() {
        for e in (EINSTEIN_FIELD_EQUATIONS.fields)() {
            assert!(lookup(e.name).is_some(), "{} is not in the catalog", e.name);
        }
    }
}
