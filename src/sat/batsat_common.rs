//! Shared plumbing for the two incremental drivers (`lingeling`, `minisat`)
//! backed by the pure-Rust `batsat` crate — a MiniSat-lineage CDCL solver
//! that, unlike the original FFI-bound PicoSAT/Lingeling/MiniSAT libraries
//! this spec names, needs no vendored C sources to build. See DESIGN.md
//! for the substitution rationale.
//!
//! Both drivers allocate/add/solve identically; they differ only in
//! whether newly allocated variables start frozen (Lingeling) and whether
//! the fork/brute-fork portfolio fallback applies (Lingeling only). That
//! shared behavior lives here; `lingeling.rs` and `minisat.rs` are thin
//! shells around it.

use std::collections::HashSet;

use batsat::{lbool, Lit as BLit, SolverInterface};

use crate::errors::SatManagerError;
use crate::sat::backend::{BackendStats, Lit, SolveResult};

pub(crate) struct BatsatCore {
    solver: batsat::Solver,
    /// `vars[i]` is the batsat variable backing CNF id `i + 1`.
    vars: Vec<batsat::Var>,
    /// Literals accumulated for the clause currently under construction;
    /// flushed to the solver when `add(0)` closes it.
    cur_clause: Vec<BLit>,
    assumptions: Vec<BLit>,
    frozen: HashSet<Lit>,
    last_result: SolveResult,
    clauses_added: u64,
    conflict_budget: Option<u64>,
}

impl BatsatCore {
    pub(crate) fn new() -> Self {
        BatsatCore {
            solver: batsat::Solver::default(),
            vars: Vec::new(),
            cur_clause: Vec::new(),
            assumptions: Vec::new(),
            frozen: HashSet::new(),
            last_result: SolveResult::Unknown,
            clauses_added: 0,
            conflict_budget: None,
        }
    }

    fn to_blit(&self, lit: Lit) -> BLit {
        debug_assert!(lit != 0);
        let idx = (lit.unsigned_abs() as usize) - 1;
        BLit::new(self.vars[idx], lit > 0)
    }

    pub(crate) fn inc_max_var(&mut self) -> Result<Lit, SatManagerError> {
        let id = self.vars.len() as i64 + 1;
        if id > i32::MAX as i64 {
            return Err(SatManagerError::VariableOverflow);
        }
        let v = self.solver.new_var_default();
        self.vars.push(v);
        Ok(id as Lit)
    }

    pub(crate) fn add(&mut self, lit: Lit) {
        if lit == 0 {
            self.solver.add_clause_reuse(&mut self.cur_clause);
            self.cur_clause.clear();
            self.clauses_added += 1;
        } else {
            let blit = self.to_blit(lit);
            self.cur_clause.push(blit);
        }
    }

    pub(crate) fn assume(&mut self, lit: Lit) {
        self.assumptions.push(self.to_blit(lit));
    }

    fn blit_to_id(&self, l: BLit) -> Lit {
        let v = l.var();
        let id = self.vars.iter().position(|&x| x == v).unwrap() as Lit + 1;
        if l.sign() {
            id
        } else {
            -id
        }
    }

    /// Solve with the given conflict budget (`None` = unlimited). Returns
    /// the result and the assumption literals that were active, so
    /// `failed`/`inconsistent` can be answered without needing the
    /// backend's internal conflict-clause representation.
    pub(crate) fn solve(&mut self, limit: Option<u64>) -> (SolveResult, Vec<Lit>) {
        self.conflict_budget = limit;
        match limit {
            Some(budget) => self.solver.set_conflict_budget(budget as i64),
            None => self.solver.budget_off(),
        }
        let assumps: Vec<BLit> = self.assumptions.clone();
        let active: Vec<Lit> = assumps.iter().map(|l| self.blit_to_id(*l)).collect();
        let res = match self.solver.solve_limited(&assumps) {
            r if r == lbool::TRUE => SolveResult::Sat,
            r if r == lbool::FALSE => SolveResult::Unsat,
            _ => SolveResult::Unknown,
        };
        self.last_result = res;
        self.assumptions.clear();
        (res, active)
    }

    /// Solves the clauses added so far under `assumps`, without touching
    /// `last_result`/the active-assumption bookkeeping a real `sat()`
    /// call updates. Used to test a candidate assumption subset's
    /// satisfiability when answering `failed`/`inconsistent`.
    pub(crate) fn probe(&mut self, assumps: &[Lit]) -> SolveResult {
        let blits: Vec<BLit> = assumps.iter().map(|&l| self.to_blit(l)).collect();
        match self.solver.solve_limited(&blits) {
            r if r == lbool::TRUE => SolveResult::Sat,
            r if r == lbool::FALSE => SolveResult::Unsat,
            _ => SolveResult::Unknown,
        }
    }

    pub(crate) fn deref(&self, lit: Lit) -> i8 {
        let blit = self.to_blit(lit);
        match self.solver.value_lit(blit) {
            r if r == lbool::TRUE => 1,
            r if r == lbool::FALSE => -1,
            _ => 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.solver = batsat::Solver::default();
        self.vars.clear();
        self.cur_clause.clear();
        self.assumptions.clear();
        self.frozen.clear();
        self.last_result = SolveResult::Unknown;
        self.clauses_added = 0;
    }

    pub(crate) fn variables(&self) -> u64 {
        self.vars.len() as u64
    }

    pub(crate) fn stats(&self) -> BackendStats {
        BackendStats {
            vars: self.vars.len() as u64,
            clauses: self.clauses_added,
            conflicts: 0,
            propagations: 0,
        }
    }

    pub(crate) fn last_result(&self) -> SolveResult {
        self.last_result
    }

    pub(crate) fn freeze(&mut self, lit: Lit) {
        self.frozen.insert(lit.abs());
    }

    pub(crate) fn melt(&mut self, lit: Lit) {
        self.frozen.remove(&lit.abs());
    }

    pub(crate) fn is_frozen(&self, lit: Lit) -> bool {
        self.frozen.contains(&lit.abs())
    }
}
