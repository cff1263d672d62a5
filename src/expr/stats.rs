//! Per-thread counters of the costly engine operations. Callers use them to
//! check that cached components are not recomputed

use std::cell::Cell;

thread_local! {
    static SIMPLIFY: Cell<u64> = const { Cell::new(0) };
    static DIFFERENTIATE: Cell<u64> = const { Cell::new(0) };
}

/// How many simplifications and differentiations ran on this thread so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    pub simplify: u64,
    pub differentiate: u64,
}

impl EngineStats {
    /// Operations run between `earlier` and `self`
    pub fn since(&self, earlier: &EngineStats) -> EngineStats {
        EngineStats {
            simplify: self.simplify - earlier.simplify,
            differentiate: self.differentiate - earlier.differentiate,
        }
    }

    pub fn total(&self) -> u64 {
        self.simplify + self.differentiate
    }
}

pub fn snapshot() -> EngineStats {
    EngineStats {
        simplify: SIMPLIFY.with(Cell::get),
        differentiate: DIFFERENTIATE.with(Cell::get),
    }
}

pub(crate) fn count_simplify() {
    SIMPLIFY.with(|c| c.set(c.get() + 1));
}

pub(crate) fn count_differentiate() {
    DIFFERENTIATE.with(|c| c.set(c.get() + 1));
}
