//! Generic storage for the components of a tensor field, in its three index
//! placements, with lazy index raising and lowering
//!
//! A [`Tensor`] starts with every component unknown. A field fills one
//! representation (its _origin_) through its formulas; every other component
//! is derived on first access by contracting the origin components with the
//! metric, then cached. A cached component is never overwritten, and writing
//! one also writes every component its [`Symmetry`] relates to it.

use crate::{
    coords::DIM,
    error::{Error, Result},
    expr::Expr,
    metric::MetricTensor,
    symmetry::{Representation, Symmetry},
};
use array_init::array_init;
use std::{
    cell::{Cell, OnceCell},
    rc::Rc,
};
use tracing::trace;

/// Get the value of a cell, computing and storing it first if needed
pub(crate) fn memo<'a>(
    cell: &'a OnceCell<Expr>,
    compute: impl FnOnce() -> Result<Expr>,
) -> Result<&'a Expr> {
    if let Some(v) = cell.get() {
        return Ok(v);
    }
    let v = compute()?;
    Ok(cell.get_or_init(|| v))
}

/// Every index tuple of a rank-`R` tensor, in lexicographic order
pub fn all_indices<const R: usize>() -> impl Iterator<Item = [usize; R]> {
    (0..DIM.pow(R as u32)).map(unflatten::<R>)
}

/// The index tuple at some position of the lexicographic order
pub fn unflatten<const R: usize>(flat: usize) -> [usize; R] {
    array_init(|p| (flat / DIM.pow((R - 1 - p) as u32)) % DIM)
}

fn flat_index(idx: &[usize]) -> usize {
    idx.iter().fold(0, |acc, i| acc * DIM + i)
}

fn slot(repr: Representation) -> usize {
    match repr {
        Representation::Covariant => 0,
        Representation::Contravariant => 1,
        Representation::Mixed => 2,
    }
}

/// The components of a rank-`RANK` tensor field
#[derive(Debug)]
pub struct Tensor<const RANK: usize> {
    name: &'static str,
    metric: Rc<MetricTensor>,
    symmetry: Symmetry,
    origin: Cell<Option<Representation>>,
    /// One flat cache per representation, `DIM^RANK` cells each
    cells: [Vec<OnceCell<Expr>>; 3],
}

impl<const RANK: usize> Tensor<RANK> {
    pub fn new(name: &'static str, metric: Rc<MetricTensor>, symmetry: Symmetry) -> Self {
        Tensor {
            name,
            metric,
            symmetry,
            origin: Cell::new(None),
            cells: array_init(|_| (0..DIM.pow(RANK as u32)).map(|_| OnceCell::new()).collect()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rank(&self) -> usize {
        RANK
    }

    pub fn metric(&self) -> &MetricTensor {
        &self.metric
    }

    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    /// The representation all the others are derived from, once some
    /// component has been written
    pub fn origin(&self) -> Option<Representation> {
        self.origin.get()
    }

    fn check(&self, idx: &[usize]) -> Result<[usize; RANK]> {
        let arr: [usize; RANK] = idx.try_into().map_err(|_| Error::IndexArity {
            field: self.name,
            expected: RANK,
            got: idx.len(),
        })?;
        match arr.iter().find(|i| **i >= DIM) {
            Some(i) => Err(Error::IndexOutOfRange {
                field: self.name,
                index: *i,
                dim: DIM,
            }),
            None => Ok(arr),
        }
    }

    /// Covariant component `T_{i1..iN}`
    pub fn co(&self, idx: &[usize]) -> Result<Expr> {
        self.get(Representation::Covariant, idx)
    }

    /// Contravariant component `T^{i1..iN}`
    pub fn contra(&self, idx: &[usize]) -> Result<Expr> {
        self.get(Representation::Contravariant, idx)
    }

    /// Mixed component `T^{i1}_{i2..iN}`
    pub fn mixed(&self, idx: &[usize]) -> Result<Expr> {
        self.get(Representation::Mixed, idx)
    }

    /// A component in any representation, derived from the origin
    /// representation if it was not known yet
    pub fn get(&self, repr: Representation, idx: &[usize]) -> Result<Expr> {
        let idx = self.check(idx)?;
        if let Some(v) = self.peek(repr, &idx) {
            return Ok(v.clone());
        }
        let v = self.derive(repr, &idx)?;
        self.store(repr, &idx, v.clone())?;
        Ok(v)
    }

    /// A component, only if already known
    pub fn peek(&self, repr: Representation, idx: &[usize; RANK]) -> Option<&Expr> {
        self.cells[slot(repr)][flat_index(idx)].get()
    }

    pub fn is_known(&self, repr: Representation, idx: &[usize; RANK]) -> bool {
        self.peek(repr, idx).is_some()
    }

    /// How many components of a representation are known
    pub fn known(&self, repr: Representation) -> usize {
        self.cells[slot(repr)].iter().filter(|c| c.get().is_some()).count()
    }

    /// Make `repr` the origin, unless there is one already
    pub fn set_origin(&self, repr: Representation) {
        if self.origin.get().is_none() {
            self.origin.set(Some(repr));
        }
    }

    /// Write a (simplified) component and all its mirrors, making `repr` the
    /// origin if there was none. Components already known are left as they
    /// are. Returns how many cells were written
    pub fn set(&self, repr: Representation, idx: &[usize; RANK], value: Expr) -> Result<usize> {
        self.set_origin(repr);
        self.store(repr, idx, value)
    }

    fn store(&self, repr: Representation, idx: &[usize; RANK], value: Expr) -> Result<usize> {
        let cells = &self.cells[slot(repr)];
        let mut written = 0;
        let mut opposite = None;
        for m in self.symmetry.mirrors(repr, idx) {
            let cell = &cells[flat_index(&m.indices)];
            if cell.get().is_some() {
                continue;
            }
            let v = if m.negated {
                match &opposite {
                    Some(o) => Expr::clone(o),
                    None => {
                        let o = value.negated()?;
                        opposite = Some(o.clone());
                        o
                    }
                }
            } else {
                value.clone()
            };
            if cell.set(v).is_ok() {
                written += 1;
            }
        }
        Ok(written)
    }

    /// Compute every unknown component of `repr` with `f`, in lexicographic
    /// index order, skipping those a symmetry already filled. Returns how
    /// many cells were written
    pub fn fill(
        &self,
        repr: Representation,
        mut f: impl FnMut(&[usize; RANK]) -> Result<Expr>,
    ) -> Result<usize> {
        let mut written = 0;
        for idx in all_indices::<RANK>() {
            if !self.is_known(repr, &idx) {
                let v = f(&idx)?;
                written += self.set(repr, &idx, v)?;
            }
        }
        Ok(written)
    }

    /// Contract the origin components with the metric on every index whose
    /// placement differs
    fn derive(&self, repr: Representation, idx: &[usize; RANK]) -> Result<Expr> {
        let uncomputed = |representation| Error::UncomputedSource {
            field: self.name,
            representation,
            indices: idx.to_vec(),
        };
        let origin = self.origin.get().ok_or_else(|| uncomputed(repr))?;
        // Per position, the source indices to sum over and the metric factor
        // going with each of them
        let choices: Vec<Vec<(usize, Option<&Expr>)>> = (0..RANK)
            .map(|p| match (repr.is_upper(p), origin.is_upper(p)) {
                (a, b) if a == b => vec![(idx[p], None)],
                (true, _) => (0..DIM)
                    .map(|s| (s, self.metric.contra(idx[p], s)))
                    .filter(|(_, g)| !g.is_zero())
                    .map(|(s, g)| (s, Some(g)))
                    .collect(),
                (false, _) => (0..DIM)
                    .map(|s| (s, self.metric.co(idx[p], s)))
                    .filter(|(_, g)| !g.is_zero())
                    .map(|(s, g)| (s, Some(g)))
                    .collect(),
            })
            .collect();
        let mut terms = Vec::new();
        let mut pick = [0usize; RANK];
        'odometer: loop {
            let src: [usize; RANK] = array_init(|p| choices[p][pick[p]].0);
            let value = self
                .peek(origin, &src)
                .ok_or_else(|| Error::UncomputedSource {
                    field: self.name,
                    representation: origin,
                    indices: src.to_vec(),
                })?;
            if !value.is_zero() {
                let factors = (0..RANK).filter_map(|p| choices[p][pick[p]].1.cloned());
                terms.push(Expr::product(factors.chain(std::iter::once(value.clone()))));
            }
            for p in (0..RANK).rev() {
                pick[p] += 1;
                if pick[p] < choices[p].len() {
                    continue 'odometer;
                }
                pick[p] = 0;
            }
            break;
        }
        trace!(field = self.name, %repr, ?idx, terms = terms.len(), "component derived");
        Expr::sum(terms).simplify()
    }
}

impl Tensor<2> {
    /// `Σ g^{μν} T_{μν}`
    pub fn trace(&self) -> Result<Expr> {
        self.metric.trace_co(|i, j| self.co(&[i, j]))
    }
}

/// A scalar field: a single expression, computed once
#[derive(Debug)]
pub struct Scalar {
    name: &'static str,
    value: OnceCell<Expr>,
}

impl Scalar {
    pub fn new(name: &'static str) -> Self {
        Scalar {
            name,
            value: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self) -> Result<Expr> {
        self.value.get().cloned().ok_or(Error::UncomputedSource {
            field: self.name,
            representation: Representation::Covariant,
            indices: vec![],
        })
    }

    pub fn is_known(&self) -> bool {
        self.value.get().is_some()
    }

    /// Compute the value with `f` unless known already
    pub fn get_or_compute(&self, f: impl FnOnce() -> Result<Expr>) -> Result<Expr> {
        memo(&self.value, f).cloned()
    }
}
