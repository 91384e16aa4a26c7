//! The "PrecoSAT" driver: non-incremental only, every incremental
//! capability bit zeroed. Every `sat()` call re-solves the whole
//! clause database from scratch; assumptions, melt, failed,
//! inconsistent, and changed are all unsupported.

use crate::errors::SatManagerError;
use crate::sat::backend::{BackendStats, Capabilities, Lit, SatBackend, SolveResult};
use crate::sat::splr_common::SplrCore;

pub struct PrecosatDriver {
    core: SplrCore,
    verbosity: i32,
}

impl PrecosatDriver {
    pub fn new() -> Self {
        PrecosatDriver {
            core: SplrCore::new(),
            verbosity: 0,
        }
    }
}

impl Default for PrecosatDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SatBackend for PrecosatDriver {
    fn name(&self) -> &'static str {
        "precosat"
    }

    fn init(&mut self, _incremental: bool) {}

    fn add(&mut self, lit: Lit) {
        self.core.add(lit);
    }

    fn inc_max_var(&mut self) -> Result<Lit, SatManagerError> {
        self.core.inc_max_var()
    }

    fn sat(&mut self, _limit: Option<u64>) -> SolveResult {
        self.core.solve(&[])
    }

    fn deref(&mut self, lit: Lit) -> i8 {
        self.core.deref(lit)
    }

    fn fixed(&mut self, _lit: Lit) -> i8 {
        0
    }

    fn reset(&mut self) {
        self.core.reset();
    }

    fn enable_verbosity(&mut self, level: i32) {
        self.verbosity = level;
    }

    fn variables(&self) -> u64 {
        self.core.variables()
    }

    fn stats(&self) -> BackendStats {
        self.core.stats()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }
}
