//! The SAT Manager: a solver-agnostic façade over the pluggable
//! [`SatBackend`] drivers. Owns variable accounting, the incremental
//! contract, and the `true_lit` top-level constant.

use crate::errors::{ConfigError, SatManagerError};
use crate::sat::backend::{BackendStats, Capabilities, Lit, SatBackend, SolveResult};
use crate::sat::lingeling::LingelingDriver;
use crate::sat::minisat::MinisatDriver;
use crate::sat::picosat::PicosatDriver;
use crate::sat::precosat::PrecosatDriver;

/// Backend selection (`enable_<backend>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Lingeling,
    Minisat,
    Picosat,
    Precosat,
}

impl BackendKind {
    fn label(self) -> &'static str {
        match self {
            BackendKind::Lingeling => "lingeling",
            BackendKind::Minisat => "minisat",
            BackendKind::Picosat => "picosat",
            BackendKind::Precosat => "precosat",
        }
    }

    fn build(self) -> Box<dyn SatBackend> {
        match self {
            BackendKind::Lingeling => Box::new(LingelingDriver::new()),
            BackendKind::Minisat => Box::new(MinisatDriver::new()),
            BackendKind::Picosat => Box::new(PicosatDriver::new()),
            BackendKind::Precosat => Box::new(PrecosatDriver::new()),
        }
    }

    /// Default backend: Lingeling-style if compiled in, else PicoSAT-style;
    /// otherwise the build is invalid.
    fn default_choice() -> Self {
        if cfg!(feature = "lingeling") {
            BackendKind::Lingeling
        } else if cfg!(feature = "picosat") {
            BackendKind::Picosat
        } else if cfg!(feature = "minisat") {
            BackendKind::Minisat
        } else if cfg!(feature = "precosat") {
            BackendKind::Precosat
        } else {
            panic!("[btorsat] BackendKind::default_choice: no SAT backend feature enabled");
        }
    }
}

fn abort(function: &str, message: &str) -> ! {
    log::error!(target: "bmcsat::sat", "[btorsat] {function}: {message}");
    panic!("[btorsat] {function}: {message}");
}

/// Converts a backend-reported option failure into the `ConfigError` the
/// manager's own public API promises. Only `ConfigError`-wrapping
/// variants are expected back from a driver's `apply_opt_str`; anything
/// else is a driver bug surfaced as a malformed string rather than
/// silently swallowed.
fn opt_err(opt_str: &str, e: SatManagerError) -> ConfigError {
    match e {
        SatManagerError::Config(c) => c,
        _ => ConfigError::MalformedOptionString(opt_str.to_string()),
    }
}

pub struct SatManager {
    verbosity: i32,
    name: &'static str,
    opt_str: Option<String>,
    max_var: Lit,
    clauses: u64,
    sat_calls: u64,
    true_lit: Lit,
    initialized: bool,
    inc_needed: bool,
    inc_provided: bool,
    backend: Box<dyn SatBackend>,
}

impl SatManager {
    /// Selects the default backend (Lingeling-style if present, else
    /// PicoSAT-style). Pre-solver configuration only.
    pub fn new() -> Self {
        let kind = BackendKind::default_choice();
        SatManager {
            verbosity: 0,
            name: kind.label(),
            opt_str: None,
            max_var: 0,
            clauses: 0,
            sat_calls: 0,
            true_lit: 0,
            initialized: false,
            inc_needed: false,
            inc_provided: false,
            backend: kind.build(),
        }
    }

    pub fn enable_backend(
        &mut self,
        kind: BackendKind,
        opt_str: Option<&str>,
    ) -> Result<(), ConfigError> {
        if self.initialized {
            return Err(ConfigError::AlreadyInitialized);
        }
        if let (BackendKind::Lingeling, Some(opt)) = (kind, opt_str) {
            // Probe a throwaway solver instance so a malformed `opt_str` is
            // reported before the real backend is touched; the probe is
            // discarded and the real backend only sees these options at
            // `init()`.
            let mut probe = BackendKind::Lingeling.build();
            probe.apply_opt_str(opt).map_err(|e| opt_err(opt, e))?;
        }
        self.backend = kind.build();
        self.name = kind.label();
        self.opt_str = opt_str.map(String::from);
        Ok(())
    }

    pub fn set_verbosity(&mut self, level: i32) {
        assert!((-1..=3).contains(&level), "verbosity out of range [-1,3]");
        self.verbosity = level;
        if self.initialized {
            self.backend.enable_verbosity(level);
        }
    }

    pub fn verbosity(&self) -> i32 {
        self.verbosity
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn max_var(&self) -> Lit {
        self.max_var
    }

    pub fn clauses(&self) -> u64 {
        self.clauses
    }

    pub fn sat_calls(&self) -> u64 {
        self.sat_calls
    }

    pub fn true_lit(&self) -> Lit {
        self.true_lit
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn capabilities(&self) -> Capabilities {
        self.backend.capabilities()
    }

    /// Constructs the backend solver; allocates `true_lit` and emits the
    /// unit clause `[true_lit, 0]`.
    pub fn init(&mut self, incremental: bool) {
        assert!(!self.initialized, "SatManager::init called twice without reset");
        self.backend.init(incremental);
        self.backend.enable_verbosity(self.verbosity);
        if let Some(opt) = self.opt_str.clone() {
            self.backend
                .apply_opt_str(&opt)
                .unwrap_or_else(|e| abort("init", &e.to_string()));
        }
        self.initialized = true;
        self.inc_needed = incremental;
        self.inc_provided = self.backend.capabilities().incremental;
        if incremental && !self.inc_provided {
            self.inc_needed = false;
        }
        self.true_lit = self
            .next_cnf_id()
            .unwrap_or_else(|e| abort("init", &e.to_string()));
        self.add(self.true_lit);
        self.add(0);
        log::debug!(
            target: "bmcsat::sat",
            "{} initialized (incremental={incremental}, inc_provided={})",
            self.name, self.inc_provided
        );
    }

    /// Allocates a positive CNF id. Fatal on overflow.
    pub fn next_cnf_id(&mut self) -> Result<Lit, SatManagerError> {
        let id = self.backend.inc_max_var()?;
        if id <= 0 {
            return Err(SatManagerError::VariableOverflow);
        }
        self.max_var = self.max_var.max(id);
        Ok(id)
    }

    /// Releases a variable id back to the backend, except `true_lit`,
    /// which must never be melted.
    pub fn release_cnf_id(&mut self, lit: Lit) {
        assert!(
            lit.abs() != self.true_lit,
            "true_lit must never be melted"
        );
        if self.backend.capabilities().melt {
            if let Err(e) = self.backend.melt(lit) {
                abort("release_cnf_id", &e.to_string());
            }
        }
    }

    /// Appends a literal to the clause under construction; `lit == 0`
    /// closes the clause.
    pub fn add(&mut self, lit: Lit) {
        assert!(
            lit.unsigned_abs() as i64 <= self.max_var as i64,
            "literal {lit} exceeds max_var {}",
            self.max_var
        );
        assert!(
            self.sat_calls == 0 || self.inc_provided,
            "clauses may not be added after a non-incremental solve"
        );
        self.backend.add(lit);
        if lit == 0 {
            self.clauses += 1;
        }
    }

    pub fn assume(&mut self, lit: Lit) {
        assert!(self.inc_provided, "assume() requires an incremental backend");
        if let Err(e) = self.backend.assume(lit) {
            abort("assume", &e.to_string());
        }
    }

    pub fn failed(&mut self, lit: Lit) -> bool {
        assert!(self.inc_provided, "failed() requires an incremental backend");
        self.backend
            .failed(lit)
            .unwrap_or_else(|e| abort("failed", &e.to_string()))
    }

    pub fn inconsistent(&mut self) -> bool {
        assert!(
            self.inc_provided,
            "inconsistent() requires an incremental backend"
        );
        self.backend
            .inconsistent()
            .unwrap_or_else(|e| abort("inconsistent", &e.to_string()))
    }

    pub fn changed(&mut self) -> bool {
        assert!(self.inc_provided, "changed() requires an incremental backend");
        self.backend
            .changed()
            .unwrap_or_else(|e| abort("changed", &e.to_string()))
    }

    /// `limit` is a conflict budget; `None` means unlimited.
    pub fn sat(&mut self, limit: Option<u64>) -> SolveResult {
        assert!(self.initialized, "sat() called before init()");
        self.sat_calls += 1;
        log::debug!(
            target: "bmcsat::sat",
            "{}: sat() call #{} (limit={limit:?})",
            self.name, self.sat_calls
        );
        self.backend.sat(limit)
    }

    pub fn deref(&mut self, lit: Lit) -> i8 {
        self.backend.deref(lit)
    }

    pub fn fixed(&mut self, lit: Lit) -> i8 {
        self.backend.fixed(lit)
    }

    pub fn stats(&self) -> BackendStats {
        self.backend.stats()
    }

    /// Destroys the solver; the manager becomes re-initializable.
    pub fn reset(&mut self) {
        self.backend.reset();
        self.initialized = false;
        self.inc_needed = false;
        self.inc_provided = false;
        self.true_lit = 0;
        self.max_var = 0;
        self.clauses = 0;
        self.sat_calls = 0;
    }
}

impl Default for SatManager {
    fn default() -> Self {
        Self::new()
    }
}
