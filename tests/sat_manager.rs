//! Black-box SAT Manager properties, exercised as an external caller
//! (not `#[cfg(test)]` code inside the module) would see them: variable
//! accounting, the incremental assume/failed contract, and the
//! `true_lit` unit clause baked in at `init()`.

use bmcsat::{BackendKind, SatManager, SolveResult};

fn fresh() -> SatManager {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut sm = SatManager::new();
    sm.init(true);
    sm
}

#[test]
fn true_lit_is_asserted_at_init() {
    let mut sm = fresh();
    let t = sm.true_lit();
    assert!(t > 0);
    assert_eq!(sm.sat(None), SolveResult::Sat);
    assert_eq!(sm.deref(t), 1);
}

#[test]
fn a_two_clause_contradiction_is_unsat() {
    let mut sm = fresh();
    let a = sm.next_cnf_id().unwrap();
    let b = sm.next_cnf_id().unwrap();
    sm.add(a);
    sm.add(b);
    sm.add(0);
    sm.add(-a);
    sm.add(0);
    sm.add(-b);
    sm.add(0);
    assert_eq!(sm.sat(None), SolveResult::Unsat);
}

#[test]
fn max_var_only_grows() {
    let mut sm = fresh();
    let start = sm.max_var();
    let mut last = start;
    for _ in 0..10 {
        let v = sm.next_cnf_id().unwrap();
        assert!(v > last);
        last = v;
    }
    assert!(sm.max_var() >= start + 10);
}

#[test]
fn assume_restricted_to_one_solve_and_reports_failed_or_inconsistent() {
    let mut sm = fresh();
    if !sm.capabilities().incremental {
        return;
    }
    let a = sm.next_cnf_id().unwrap();
    sm.add(-a);
    sm.add(0);
    sm.assume(a);
    assert_eq!(sm.sat(None), SolveResult::Unsat);
    assert!(sm.failed(a) || sm.inconsistent());

    // Assumptions don't persist: without re-asserting one, the next
    // solve is unconstrained and must be SAT again.
    assert_eq!(sm.sat(None), SolveResult::Sat);
}

#[test]
fn failed_distinguishes_the_assumption_that_actually_conflicts() {
    let mut sm = fresh();
    if !sm.capabilities().incremental {
        return;
    }
    // `a` is forced false by a clause; `b` is unconstrained. Assuming
    // both true is unsat only because of `a`, not `b`.
    let a = sm.next_cnf_id().unwrap();
    let b = sm.next_cnf_id().unwrap();
    sm.add(-a);
    sm.add(0);
    sm.assume(a);
    sm.assume(b);
    assert_eq!(sm.sat(None), SolveResult::Unsat);
    assert!(sm.failed(a));
    assert!(!sm.failed(b));
    assert!(!sm.inconsistent());
}

#[test]
fn fixed_is_zero_when_unforced() {
    let mut sm = fresh();
    let a = sm.next_cnf_id().unwrap();
    assert_eq!(sm.fixed(a), 0);
}

#[test]
fn reset_then_reinit_starts_a_clean_instance() {
    let mut sm = fresh();
    sm.next_cnf_id().unwrap();
    assert!(sm.max_var() > 0);
    sm.reset();
    assert!(!sm.is_initialized());
    sm.init(false);
    assert!(sm.is_initialized());
    assert!(sm.true_lit() > 0);
}

#[test]
#[should_panic]
fn true_lit_can_never_be_melted() {
    let mut sm = fresh();
    let t = sm.true_lit();
    sm.release_cnf_id(t);
}

#[cfg(feature = "lingeling")]
#[test]
fn lingeling_backend_selects_and_solves() {
    let mut sm = SatManager::new();
    sm.enable_backend(BackendKind::Lingeling, None).unwrap();
    sm.init(true);
    let a = sm.next_cnf_id().unwrap();
    sm.add(a);
    sm.add(0);
    assert_eq!(sm.sat(None), SolveResult::Sat);
    assert_eq!(sm.deref(a), 1);
}

#[cfg(feature = "lingeling")]
#[test]
fn lingeling_rejects_malformed_opt_str() {
    let mut sm = SatManager::new();
    assert!(sm.enable_backend(BackendKind::Lingeling, Some("not-a-pair")).is_err());
    assert!(sm.enable_backend(BackendKind::Lingeling, Some("bogus=1")).is_err());
    assert!(sm.enable_backend(BackendKind::Lingeling, Some("verbose=2")).is_ok());
}

#[test]
fn enable_backend_after_init_is_rejected() {
    let mut sm = fresh();
    assert!(sm.enable_backend(BackendKind::Minisat, None).is_err());
}
