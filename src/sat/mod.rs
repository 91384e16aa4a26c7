//! The SAT Manager and its pluggable backend drivers.

pub mod backend;
pub mod manager;

#[cfg(any(feature = "lingeling", feature = "minisat"))]
mod batsat_common;
#[cfg(any(feature = "picosat", feature = "precosat"))]
mod splr_common;

#[cfg(feature = "lingeling")]
pub mod lingeling;
#[cfg(feature = "minisat")]
pub mod minisat;
#[cfg(feature = "picosat")]
pub mod picosat;
#[cfg(feature = "precosat")]
pub mod precosat;

pub use backend::{BackendStats, Capabilities, Lit, SatBackend, SolveResult};
pub use manager::{BackendKind, SatManager};

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_manager() -> SatManager {
        let mut sm = SatManager::new();
        sm.init(true);
        sm
    }

    #[test]
    fn unit_conflict_is_unsat() {
        let mut sm = fresh_manager();
        let a = sm.next_cnf_id().unwrap();
        sm.add(a);
        sm.add(0);
        sm.add(-a);
        sm.add(0);
        assert_eq!(sm.sat(None), SolveResult::Unsat);
    }

    #[test]
    fn variables_tracks_allocations() {
        let mut sm = fresh_manager();
        let before = sm.max_var();
        for _ in 0..5 {
            sm.next_cnf_id().unwrap();
        }
        assert!(sm.max_var() >= before + 5);
        assert_eq!(sm.max_var(), sm.stats().vars as Lit);
    }

    #[test]
    fn assume_then_unsat_implies_failed_or_inconsistent() {
        let mut sm = fresh_manager();
        if !sm.capabilities().incremental {
            return;
        }
        let a = sm.next_cnf_id().unwrap();
        sm.add(-a);
        sm.add(0);
        sm.assume(a);
        assert_eq!(sm.sat(None), SolveResult::Unsat);
        assert!(sm.failed(a) || sm.inconsistent());
    }

    #[test]
    #[should_panic]
    fn melting_true_lit_panics() {
        let mut sm = fresh_manager();
        let t = sm.true_lit();
        sm.release_cnf_id(t);
    }

    #[test]
    fn reset_allows_reinitialization() {
        let mut sm = fresh_manager();
        sm.next_cnf_id().unwrap();
        sm.reset();
        assert!(!sm.is_initialized());
        sm.init(false);
        assert!(sm.is_initialized());
    }
}
