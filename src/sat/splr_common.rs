//! Shared plumbing for the two drivers (`picosat`, `precosat`) backed by
//! the pure-Rust `splr` crate, a CDCL solver in the Glucose/MiniSat
//! lineage. `splr::Solver` is built once from a complete clause set and
//! has no API for adding clauses to an already-running search, so these
//! drivers behave incrementally from the *caller's* point of view by
//! replaying the accumulated clause database into a fresh solver on every
//! `sat()` call — the "no persistent incremental state" class of backend
//! this crate's PicoSAT/PrecoSAT pair describes. See DESIGN.md.

use std::collections::HashSet;

use crate::errors::SatManagerError;
use crate::sat::backend::{BackendStats, Lit, SolveResult};

pub(crate) struct SplrCore {
    num_vars: i64,
    clauses: Vec<Vec<i32>>,
    cur_clause: Vec<i32>,
    assumptions: Vec<Lit>,
    model: HashSet<i32>,
    last_result: SolveResult,
}

impl SplrCore {
    pub(crate) fn new() -> Self {
        SplrCore {
            num_vars: 0,
            clauses: Vec::new(),
            cur_clause: Vec::new(),
            assumptions: Vec::new(),
            model: HashSet::new(),
            last_result: SolveResult::Unknown,
        }
    }

    pub(crate) fn inc_max_var(&mut self) -> Result<Lit, SatManagerError> {
        self.num_vars += 1;
        if self.num_vars > i32::MAX as i64 {
            return Err(SatManagerError::VariableOverflow);
        }
        Ok(self.num_vars as Lit)
    }

    pub(crate) fn add(&mut self, lit: Lit) {
        if lit == 0 {
            self.clauses.push(std::mem::take(&mut self.cur_clause));
        } else {
            self.cur_clause.push(lit);
        }
    }

    pub(crate) fn assume(&mut self, lit: Lit) {
        self.assumptions.push(lit);
    }

    pub(crate) fn take_assumptions(&mut self) -> Vec<Lit> {
        std::mem::take(&mut self.assumptions)
    }

    pub(crate) fn solve(&mut self, active_assumptions: &[Lit]) -> SolveResult {
        if self.num_vars == 0 {
            // No variables registered yet: the empty formula is trivially
            // satisfiable.
            self.last_result = SolveResult::Sat;
            self.model.clear();
            return self.last_result;
        }
        let mut cnf = self.clauses.clone();
        for &a in active_assumptions {
            cnf.push(vec![a]);
        }
        let result = splr::Solver::try_from((self.num_vars as usize, cnf))
            .ok()
            .and_then(|mut solver| solver.solve().ok());
        self.last_result = match result {
            Some(splr::Certificate::SAT(model)) => {
                self.model = model.into_iter().collect();
                SolveResult::Sat
            }
            Some(splr::Certificate::UNSAT) => {
                self.model.clear();
                SolveResult::Unsat
            }
            None => {
                self.model.clear();
                SolveResult::Unknown
            }
        };
        self.last_result
    }

    /// Solves the accumulated clause database under `assumps` in a fresh
    /// solver instance, without touching `model`/`last_result`. Used to
    /// test a candidate assumption subset's satisfiability when answering
    /// `failed`/`inconsistent`.
    pub(crate) fn probe(&self, assumps: &[Lit]) -> SolveResult {
        if self.num_vars == 0 {
            return SolveResult::Sat;
        }
        let mut cnf = self.clauses.clone();
        for &a in assumps {
            cnf.push(vec![a]);
        }
        let result = splr::Solver::try_from((self.num_vars as usize, cnf))
            .ok()
            .and_then(|mut solver| solver.solve().ok());
        match result {
            Some(splr::Certificate::SAT(_)) => SolveResult::Sat,
            Some(splr::Certificate::UNSAT) => SolveResult::Unsat,
            None => SolveResult::Unknown,
        }
    }

    pub(crate) fn deref(&self, lit: Lit) -> i8 {
        if self.model.contains(&lit) {
            1
        } else if self.model.contains(&-lit) {
            -1
        } else {
            0
        }
    }

    pub(crate) fn reset(&mut self) {
        self.num_vars = 0;
        self.clauses.clear();
        self.cur_clause.clear();
        self.assumptions.clear();
        self.model.clear();
        self.last_result = SolveResult::Unknown;
    }

    pub(crate) fn variables(&self) -> u64 {
        self.num_vars.max(0) as u64
    }

    pub(crate) fn stats(&self) -> BackendStats {
        BackendStats {
            vars: self.variables(),
            clauses: self.clauses.len() as u64,
            conflicts: 0,
            propagations: 0,
        }
    }

    pub(crate) fn last_result(&self) -> SolveResult {
        self.last_result
    }
}
