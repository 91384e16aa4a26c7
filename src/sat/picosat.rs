//! The "PicoSAT" driver: both modes. Incremental
//! mode is honored by replaying the accumulated clause database into a
//! fresh solver on every call (see `splr_common.rs`); from the caller's
//! side this still satisfies assumptions/failed/inconsistent.

use crate::errors::SatManagerError;
use crate::sat::backend::{BackendStats, Capabilities, Lit, SatBackend, SolveResult};
use crate::sat::splr_common::SplrCore;

pub struct PicosatDriver {
    core: SplrCore,
    verbosity: i32,
    incremental: bool,
    last_active_assumptions: Vec<Lit>,
}

impl PicosatDriver {
    pub fn new() -> Self {
        PicosatDriver {
            core: SplrCore::new(),
            verbosity: 0,
            incremental: false,
            last_active_assumptions: Vec::new(),
        }
    }
}

impl Default for PicosatDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SatBackend for PicosatDriver {
    fn name(&self) -> &'static str {
        "picosat"
    }

    fn init(&mut self, incremental: bool) {
        self.incremental = incremental;
    }

    fn add(&mut self, lit: Lit) {
        self.core.add(lit);
    }

    fn inc_max_var(&mut self) -> Result<Lit, SatManagerError> {
        self.core.inc_max_var()
    }

    fn sat(&mut self, _limit: Option<u64>) -> SolveResult {
        let active = self.core.take_assumptions();
        self.last_active_assumptions = active.clone();
        self.core.solve(&active)
    }

    fn deref(&mut self, lit: Lit) -> i8 {
        self.core.deref(lit)
    }

    fn fixed(&mut self, _lit: Lit) -> i8 {
        0
    }

    fn reset(&mut self) {
        self.core.reset();
        self.last_active_assumptions.clear();
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
        Capabilities {
            incremental: self.incremental,
            assume: self.incremental,
            melt: false,
            failed: self.incremental,
            inconsistent: self.incremental,
            changed: true,
        }
    }

    fn assume(&mut self, lit: Lit) -> Result<(), SatManagerError> {
        if !self.incremental {
            return Err(SatManagerError::UnsupportedCapability("assume"));
        }
        self.core.assume(lit);
        Ok(())
    }

    fn failed(&mut self, lit: Lit) -> Result<bool, SatManagerError> {
        if !self.incremental {
            return Err(SatManagerError::UnsupportedCapability("failed"));
        }
        if self.core.last_result() != SolveResult::Unsat || !self.last_active_assumptions.contains(&lit) {
            return Ok(false);
        }
        if self.inconsistent()? {
            return Ok(true);
        }
        let remaining: Vec<Lit> = self
            .last_active_assumptions
            .iter()
            .copied()
            .filter(|&a| a != lit)
            .collect();
        Ok(self.core.probe(&remaining) != SolveResult::Unsat)
    }

    fn inconsistent(&mut self) -> Result<bool, SatManagerError> {
        if !self.incremental {
            return Err(SatManagerError::UnsupportedCapability("inconsistent"));
        }
        if self.core.last_result() != SolveResult::Unsat {
            return Ok(false);
        }
        if self.last_active_assumptions.is_empty() {
            return Ok(true);
        }
        Ok(self.core.probe(&[]) == SolveResult::Unsat)
    }

    fn changed(&mut self) -> Result<bool, SatManagerError> {
        Ok(true)
    }
}
