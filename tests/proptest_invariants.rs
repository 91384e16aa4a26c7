//! Property-based invariants over the bit-blasting circuit and the SAT
//! Manager, run against small random inputs rather than a fixed example
//! grid.

use proptest::prelude::*;

use bmcsat::{BvCircuit, Circuit, SatManager, SolveResult};

fn bits(value: u32, width: u32) -> String {
    (0..width)
        .rev()
        .map(|i| if (value >> i) & 1 == 1 { '1' } else { '0' })
        .collect()
}

proptest! {
    /// Bit-blasted addition wraps the same way native modular arithmetic
    /// does, for every width/operand pair a test can afford to try.
    #[test]
    fn add_matches_wrapping_arithmetic(width in 1u32..=6, a in 0u32..64, b in 0u32..64) {
        let a = a % (1 << width);
        let b = b % (1 << width);
        let mut c = BvCircuit::new();
        let na = c.constant(&bits(a, width));
        let nb = c.constant(&bits(b, width));
        let sum = c.add(na, nb);
        // Force `sum` into the CNF before solving: `bv_assignment` only
        // reads a node's last-model literals, so the node must already
        // be part of what `sat()` just solved, not encoded afterward.
        let tautology = c.eq(sum, sum);
        c.assert_node(tautology);
        prop_assert_eq!(c.sat(None), SolveResult::Sat);
        let expected = bits((a + b) % (1 << width), width);
        prop_assert_eq!(c.bv_assignment(sum), expected);
    }

    /// `eq` is reflexive: any node compared against a copy of itself is
    /// always true.
    #[test]
    fn eq_is_reflexive(width in 1u32..=6, v in 0u32..64) {
        let v = v % (1 << width);
        let mut c = BvCircuit::new();
        let n = c.constant(&bits(v, width));
        let same = c.eq(n, n);
        c.assert_node(same);
        prop_assert_eq!(c.sat(None), SolveResult::Sat);
    }

    /// `a xor a` is always the all-zero bit vector, for a free variable
    /// of any width.
    #[test]
    fn xor_self_is_always_zero(width in 1u32..=6) {
        let mut c = BvCircuit::new();
        let v = c.var(width, None);
        let z = c.xor(v, v);
        let zero = c.constant(&"0".repeat(width as usize));
        let claim = c.eq(z, zero);
        let not_claim = c.not(claim);
        c.assert_node(not_claim);
        prop_assert_eq!(c.sat(None), SolveResult::Unsat);
    }

    /// `ult` agrees with plain integer comparison.
    #[test]
    fn ult_matches_integer_less_than(width in 1u32..=6, a in 0u32..64, b in 0u32..64) {
        let a = a % (1 << width);
        let b = b % (1 << width);
        let mut c = BvCircuit::new();
        let na = c.constant(&bits(a, width));
        let nb = c.constant(&bits(b, width));
        let lt = c.ult(na, nb);
        c.assert_node(lt);
        let expected = if a < b { SolveResult::Sat } else { SolveResult::Unsat };
        prop_assert_eq!(c.sat(None), expected);
    }

    /// Every CNF id the manager allocates strictly increases `max_var`,
    /// regardless of how many are requested.
    #[test]
    fn cnf_ids_monotonically_increase(n in 1usize..200) {
        let mut sm = SatManager::new();
        sm.init(true);
        let mut last = sm.max_var();
        for _ in 0..n {
            let id = sm.next_cnf_id().unwrap();
            prop_assert!(id > last);
            last = id;
        }
    }
}
