//! The registry of the fields defined on a spacetime

use crate::{
    config::Config,
    error::{Error, Result},
    fields::{self, AnyField, Field, FieldEntry, FieldPackage},
    metric::MetricTensor,
    units::UnitSystem,
};
use std::{
    any::Any,
    cell::RefCell,
    collections::BTreeMap,
    rc::Rc,
};
use tracing::{debug, info};

/// Where a field is in its life on a manifold. A field only moves forward:
/// `Undefined → Instantiated → Computed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldState {
    Undefined,
    /// Created, with its dependencies computed, but not itself computed
    Instantiated,
    Computed,
}

struct Slot {
    entry: FieldEntry,
    any: Rc<dyn Any>,
    field: Rc<dyn AnyField>,
    state: FieldState,
    computations: usize,
}

/// A spacetime: a metric, units, and the single instance of each field
/// defined on it so far
///
/// Fields are never removed nor recomputed. All the methods take `&self`:
/// defining a field only adds to the manifold. A manifold is not meant to be
/// shared between threads while fields are being defined.
pub struct Manifold {
    metric: Rc<MetricTensor>,
    units: UnitSystem,
    config: Config,
    fields: RefCell<BTreeMap<&'static str, Slot>>,
    /// Fields being defined, innermost last
    resolving: RefCell<Vec<&'static str>>,
}

impl std::fmt::Debug for Manifold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = self.fields.borrow();
        f.debug_struct("Manifold")
            .field("coordinates", &self.metric.coords().to_string())
            .field("units", &self.units)
            .field("config", &self.config)
            .field(
                "fields",
                &fields.iter().map(|(n, s)| (*n, s.state)).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Manifold {
    pub fn new(metric: MetricTensor, units: UnitSystem, config: Config) -> Self {
        Manifold {
            metric: Rc::new(metric),
            units,
            config,
            fields: RefCell::new(BTreeMap::new()),
            resolving: RefCell::new(Vec::new()),
        }
    }

    pub fn metric(&self) -> &MetricTensor {
        &self.metric
    }

    pub(crate) fn metric_rc(&self) -> Rc<MetricTensor> {
        Rc::clone(&self.metric)
    }

    pub fn units(&self) -> &UnitSystem {
        &self.units
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self, name: &str) -> FieldState {
        self.fields
            .borrow()
            .get(name)
            .map_or(FieldState::Undefined, |s| s.state)
    }

    /// How many times a field was computed. 0 or 1
    pub fn computations(&self, name: &str) -> usize {
        self.fields.borrow().get(name).map_or(0, |s| s.computations)
    }

    /// Names of the defined fields, with their state
    pub fn fields(&self) -> Vec<(&'static str, FieldState)> {
        self.fields
            .borrow()
            .iter()
            .map(|(n, s)| (*n, s.state))
            .collect()
    }

    /// Make sure `T` and all its dependencies exist and are computed, and
    /// return `T`. Does nothing more when called again
    pub fn define<T: Field>(&self) -> Result<Rc<T>> {
        self.define_entry(&FieldEntry::of::<T>())?;
        self.existing::<T>()
    }

    /// Like [`Manifold::define`], for a field looked up by name
    pub fn define_name(&self, name: &str) -> Result<Rc<dyn AnyField>> {
        let entry = fields::lookup(name).ok_or_else(|| Error::UndefinedField {
            name: name.to_string(),
        })?;
        self.define_entry(&entry)
    }

    /// Define every field of a package, in order
    pub fn define_package(&self, package: &FieldPackage) -> Result<()> {
        debug!(package = package.name, "defining package");
        for entry in (package.fields)() {
            self.define_entry(&entry)?;
        }
        Ok(())
    }

    /// Create `T` (computing its dependencies) without computing `T` itself
    pub fn instantiate<T: Field>(&self) -> Result<Rc<T>> {
        self.instantiate_entry(&FieldEntry::of::<T>())?;
        self.existing::<T>()
    }

    /// The instance of `T`. If `T` is not defined yet, defines it when
    /// [`Config::autodefine`] is set, else fails with
    /// [`Error::UndefinedField`]. An instantiated field is computed first
    /// when [`Config::autocompute`] is set
    pub fn of<T: Field>(&self) -> Result<Rc<T>> {
        self.of_entry(&FieldEntry::of::<T>())?;
        self.existing::<T>()
    }

    /// Like [`Manifold::of`], for a field looked up by name
    pub fn of_name(&self, name: &str) -> Result<Rc<dyn AnyField>> {
        let entry = fields::lookup(name).ok_or_else(|| Error::UndefinedField {
            name: name.to_string(),
        })?;
        self.of_entry(&entry)
    }

    /// A dependency of the field being instantiated, which the manifold
    /// defined beforehand
    pub(crate) fn dependency<T: Field>(&self) -> Result<Rc<T>> {
        self.existing::<T>()
    }

    fn existing<T: Field>(&self) -> Result<Rc<T>> {
        let any = self
            .fields
            .borrow()
            .get(T::NAME)
            .map(|s| Rc::clone(&s.any))
            .ok_or(Error::UndefinedField {
                name: T::NAME.to_string(),
            })?;
        any.downcast::<T>().map_err(|_| Error::UndefinedField {
            name: T::NAME.to_string(),
        })
    }

    fn of_entry(&self, entry: &FieldEntry) -> Result<Rc<dyn AnyField>> {
        match self.state(entry.name) {
            FieldState::Computed => self.slot_field(entry.name),
            FieldState::Instantiated if self.config.autocompute => self.define_entry(entry),
            FieldState::Instantiated => self.slot_field(entry.name),
            FieldState::Undefined if self.config.autodefine => self.define_entry(entry),
            FieldState::Undefined => Err(Error::UndefinedField {
                name: entry.name.to_string(),
            }),
        }
    }

    fn slot_field(&self, name: &'static str) -> Result<Rc<dyn AnyField>> {
        self.fields
            .borrow()
            .get(name)
            .map(|s| Rc::clone(&s.field))
            .ok_or(Error::UndefinedField {
                name: name.to_string(),
            })
    }

    fn define_entry(&self, entry: &FieldEntry) -> Result<Rc<dyn AnyField>> {
        self.instantiate_entry(entry)?;
        let (any, field) = {
            let fields = self.fields.borrow();
            match fields.get(entry.name) {
                Some(s) if s.state == FieldState::Computed => return Ok(Rc::clone(&s.field)),
                Some(s) => (Rc::clone(&s.any), Rc::clone(&s.field)),
                None => {
                    return Err(Error::UndefinedField {
                        name: entry.name.to_string(),
                    })
                }
            }
        };
        // No borrow of the registry is held while computing: fields read
        // their dependencies from it
        let written = self.resolve(entry.name, || {
            (entry.compute)(any.as_ref(), self, &self.config)
        })?;
        if let Some(s) = self.fields.borrow_mut().get_mut(entry.name) {
            s.state = FieldState::Computed;
            s.computations += 1;
        }
        info!(field = entry.name, components = written, "field computed");
        Ok(field)
    }

    fn instantiate_entry(&self, entry: &FieldEntry) -> Result<()> {
        if self.state(entry.name) != FieldState::Undefined {
            return Ok(());
        }
        let instance = self.resolve(entry.name, || {
            for dep in (entry.dependencies)(&self.config) {
                self.define_entry(&dep)?;
            }
            (entry.instantiate)(self)
        })?;
        let (any, field) = instance;
        self.fields.borrow_mut().entry(entry.name).or_insert(Slot {
            entry: *entry,
            any,
            field,
            state: FieldState::Instantiated,
            computations: 0,
        });
        debug!(field = entry.name, "field instantiated");
        Ok(())
    }

    /// Run `f` with `name` marked as being resolved, failing if it already
    /// was
    fn resolve<R>(&self, name: &'static str, f: impl FnOnce() -> Result<R>) -> Result<R> {
        if self.resolving.borrow().contains(&name) {
            return Err(Error::DependencyCycle { name });
        }
        self.resolving.borrow_mut().push(name);
        let res = f();
        self.resolving.borrow_mut().pop();
        res
    }

    /// The entries of the defined fields, in definition order of their names
    pub fn entries(&self) -> Vec<FieldEntry> {
        self.fields.borrow().values().map(|s| s.entry).collect()
    }
}
