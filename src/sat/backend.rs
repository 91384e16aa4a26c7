//! The SAT Backend Driver contract.
//!
//! A driver is a capability record plus an opaque solver state: a fixed
//! set of mandatory operations every backend must provide, and a set of
//! optional incremental operations a backend may decline. Rust has no
//! native "optional trait method" — we model presence with `capabilities()`
//! and give every optional method a default that returns
//! `SatManagerError::UnsupportedCapability`, so a driver only needs to
//! override the ones it actually implements.

use crate::errors::SatManagerError;

/// A CNF literal: a non-zero signed integer, magnitude is a variable id,
/// sign is polarity. `0` terminates a clause.
pub type Lit = i32;

/// Result of a bounded `sat()` call. The numeric values mirror the
/// IPASIR/DIMACS convention the original backends return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    Sat = 10,
    Unsat = 20,
    Unknown = 0,
}

/// Backend-reported counters, surfaced through the mandatory `stats` cap.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendStats {
    pub vars: u64,
    pub clauses: u64,
    pub conflicts: u64,
    pub propagations: u64,
}

/// Which optional incremental operations a driver actually implements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub incremental: bool,
    pub assume: bool,
    pub melt: bool,
    pub failed: bool,
    pub inconsistent: bool,
    pub changed: bool,
}

/// The mandatory + optional capability set a SAT backend exposes to the
/// [`crate::sat::manager::SatManager`] façade.
pub trait SatBackend {
    /// Backend label, e.g. `"lingeling"`, `"minisat"`.
    fn name(&self) -> &'static str;

    /// Construct the underlying solver. `incremental` requests incremental
    /// mode; the driver must reflect whether it actually honored that
    /// request in [`SatBackend::capabilities`] afterwards.
    fn init(&mut self, incremental: bool);

    /// Append a literal to the clause under construction; `lit == 0`
    /// closes the clause.
    fn add(&mut self, lit: Lit);

    /// Allocate a fresh CNF variable id. `Err` on overflow.
    fn inc_max_var(&mut self) -> Result<Lit, SatManagerError>;

    /// Solve under the clauses (and, if incremental, assumptions) added so
    /// far. `limit` is a conflict budget; `None` means unlimited.
    fn sat(&mut self, limit: Option<u64>) -> SolveResult;

    /// Value of `lit` in the last model; `0` means "don't care".
    fn deref(&mut self, lit: Lit) -> i8;

    /// Value of `lit` forced at the top level by unit propagation;
    /// `0` means not forced. Treated as mandatory: backends without real
    /// top-level propagation simply return `0` for every literal.
    fn fixed(&mut self, lit: Lit) -> i8;

    /// Tear down the solver; the driver becomes re-initializable.
    fn reset(&mut self);

    /// Redirect backend trace/debug output. There is no file I/O in this
    /// crate's scope; drivers log the request instead of opening a
    /// stream.
    fn set_output(&mut self, description: &str) {
        log::debug!(target: "bmcsat::sat", "{}: set_output({description})", self.name());
    }

    fn set_prefix(&mut self, prefix: &str) {
        log::debug!(target: "bmcsat::sat", "{}: set_prefix({prefix:?})", self.name());
    }

    fn enable_verbosity(&mut self, level: i32);

    /// Total distinct CNF variables ever allocated (`>=` every id handed
    /// out so far).
    fn variables(&self) -> u64;

    fn stats(&self) -> BackendStats;

    fn capabilities(&self) -> Capabilities;

    /// Assume `lit` true for the next `sat()` call only. Incremental-only.
    fn assume(&mut self, _lit: Lit) -> Result<(), SatManagerError> {
        Err(SatManagerError::UnsupportedCapability("assume"))
    }

    /// Release a variable id back to the backend. The default is a no-op:
    /// absence of melt means freezes are cheap and melting is a no-op.
    fn melt(&mut self, _lit: Lit) -> Result<(), SatManagerError> {
        Ok(())
    }

    /// Whether `lit` participated in the unsat core of the last
    /// assumption-driven `sat()` call.
    fn failed(&mut self, _lit: Lit) -> Result<bool, SatManagerError> {
        Err(SatManagerError::UnsupportedCapability("failed"))
    }

    /// Whether the current assumption set is inconsistent with the
    /// clause database independent of any single literal.
    fn inconsistent(&mut self) -> Result<bool, SatManagerError> {
        Err(SatManagerError::UnsupportedCapability("inconsistent"))
    }

    /// Backend-defined "has something changed since last solve" signal;
    /// the core never consults its meaning.
    fn changed(&mut self) -> Result<bool, SatManagerError> {
        Err(SatManagerError::UnsupportedCapability("changed"))
    }

    /// Parses and applies a driver-specific `key=value,...` option
    /// string. Called once against a throwaway instance to validate
    /// before any real solver is touched, and again against the real
    /// backend at `init()` time. The default rejects every string; only
    /// drivers with a real notion of tunable knobs override this.
    fn apply_opt_str(&mut self, _opt_str: &str) -> Result<(), SatManagerError> {
        Err(SatManagerError::UnsupportedCapability("opt_str"))
    }
}
