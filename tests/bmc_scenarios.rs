//! End-to-end BMC scenarios over the bit-blasting circuit, matching the
//! literal scenarios a complete implementation of this kind of checker
//! is expected to handle: counter overflow, unreachability (plain and
//! constraint-induced), multi-property runs without early stopping,
//! free initial states, and witness reconstruction across an
//! unregistered combinational node.

use std::cell::RefCell;
use std::rc::Rc;

use bmcsat::{BmcEngine, BmcOpt, BvCircuit, EngineState};

/// Initializes `env_logger` once per test binary, so `RUST_LOG=debug`
/// surfaces frame-build and SAT-dispatch logging when a scenario is run
/// with `--nocapture`.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn counter(engine: &mut BmcEngine<BvCircuit>, width: u32, name: &str) -> (<BvCircuit as bmcsat::Circuit>::Node, <BvCircuit as bmcsat::Circuit>::Node) {
    let latch = engine.latch(width, Some(name));
    let zero: String = std::iter::repeat('0').take(width as usize).collect();
    let init = engine.model().constant(&zero);
    engine.init(latch, init);
    let mut one_bits = vec!['0'; width as usize];
    *one_bits.last_mut().unwrap() = '1';
    let one = engine.model().constant(&one_bits.into_iter().collect::<String>());
    let next = engine.model().add(latch, one);
    engine.next(latch, next);
    (latch, next)
}

#[test]
fn s1_two_bit_counter_overflows_at_k3() {
    init_logging();
    let mut engine: BmcEngine<BvCircuit> = BmcEngine::new();
    let (c, _next) = counter(&mut engine, 2, "c");
    let three = engine.model().constant("11");
    let is_max = engine.model().eq(c, three);
    engine.bad(is_max);

    engine.set_opt(BmcOpt::StopFirst, 1).unwrap();
    engine.set_opt(BmcOpt::TraceGen, 1).unwrap();
    let k = engine.bmc(0, 5);
    assert_eq!(k, 3);
    assert_eq!(engine.state(), EngineState::Sat);

    assert_eq!(engine.assignment(c, 0), "00");
    assert_eq!(engine.assignment(c, 1), "01");
    assert_eq!(engine.assignment(c, 2), "10");
    assert_eq!(engine.assignment(c, 3), "11");
}

#[test]
fn s2_unreachable_bad_is_unsat() {
    init_logging();
    let mut engine: BmcEngine<BvCircuit> = BmcEngine::new();
    let _x = engine.input(1, Some("x"));
    let zero = engine.model().constant("0");
    engine.bad(zero);

    let k = engine.bmc(0, 10);
    assert_eq!(k, -1);
    assert_eq!(engine.state(), EngineState::Unsat);
}

#[test]
fn s3_two_properties_without_stop_first() {
    init_logging();
    let mut engine: BmcEngine<BvCircuit> = BmcEngine::new();
    let (a, _) = counter(&mut engine, 2, "a");
    let two = engine.model().constant("10");
    let bad_a = engine.model().eq(a, two);
    engine.bad(bad_a);

    let (b, _) = counter(&mut engine, 3, "b");
    let four = engine.model().constant("100");
    let bad_b = engine.model().eq(b, four);
    engine.bad(bad_b);

    engine.set_opt(BmcOpt::StopFirst, 0).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    let log_cb = log.clone();
    engine.set_reached_at_bound_callback(move |idx, k| log_cb.borrow_mut().push((idx, k)));

    let k = engine.bmc(0, 4);
    assert_eq!(k, 4);
    assert_eq!(engine.reached_bad_at_bound(0), 2);
    assert_eq!(engine.reached_bad_at_bound(1), 4);
    assert_eq!(*log.borrow(), vec![(0, 2), (1, 4)]);
}

#[test]
fn s4_constraint_induced_unreachability() {
    init_logging();
    let mut engine: BmcEngine<BvCircuit> = BmcEngine::new();
    let (c, _) = counter(&mut engine, 2, "c");
    let three = engine.model().constant("11");
    let is_max = engine.model().eq(c, three);
    engine.bad(is_max);
    let not_max = engine.model().not(is_max);
    engine.constraint(not_max);

    let k = engine.bmc(0, 5);
    assert_eq!(k, -1);
}

#[test]
fn s5_free_initial_satisfied_at_k0() {
    init_logging();
    let mut engine: BmcEngine<BvCircuit> = BmcEngine::new();
    let s = engine.latch(1, Some("s"));
    engine.next(s, s);
    engine.bad(s);

    let k = engine.bmc(0, 0);
    assert_eq!(k, 0);
}

#[test]
fn s6_witness_across_combinational_node() {
    init_logging();
    let mut engine: BmcEngine<BvCircuit> = BmcEngine::new();
    let (a, _) = counter(&mut engine, 2, "a");
    let three = engine.model().constant("11");
    let bad_a = engine.model().eq(a, three);
    engine.bad(bad_a);

    let (b, _) = counter(&mut engine, 2, "b");
    let y = engine.model().xor(a, b);

    engine.set_opt(BmcOpt::TraceGen, 1).unwrap();
    let k = engine.bmc(0, 5);
    assert_eq!(k, 3);

    let a2 = engine.assignment(a, 2);
    let b2 = engine.assignment(b, 2);
    let y2 = engine.assignment(y, 2);
    let expected: String = a2
        .chars()
        .zip(b2.chars())
        .map(|(x, y)| if x == y { '0' } else { '1' })
        .collect();
    assert_eq!(y2, expected);
}

#[test]
fn rerunning_bmc_never_rebuilds_already_built_frames() {
    init_logging();
    // `bmc()` resumes from `k = |frames|`: a second call over the same
    // [mink, maxk] range has no new frame to build and no unreached
    // property left to recheck, so it falls straight through to UNSAT.
    let mut engine: BmcEngine<BvCircuit> = BmcEngine::new();
    let (c, _) = counter(&mut engine, 2, "c");
    let three = engine.model().constant("11");
    let is_max = engine.model().eq(c, three);
    engine.bad(is_max);
    engine.set_opt(BmcOpt::StopFirst, 1).unwrap();

    let k1 = engine.bmc(0, 3);
    assert_eq!(k1, 3);
    let k2 = engine.bmc(0, 3);
    assert_eq!(k2, -1);

    // Extending maxk resumes frame-building from where it left off.
    let k3 = engine.bmc(0, 6);
    assert_eq!(k3, -1);
}

#[test]
fn mink_greater_than_maxk_yields_no_frames() {
    init_logging();
    let mut engine: BmcEngine<BvCircuit> = BmcEngine::new();
    let _x = engine.input(1, Some("x"));
    let k = engine.bmc(5, 2);
    assert_eq!(k, -1);
}
