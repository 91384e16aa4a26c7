//! Gate-level Tseitin encoders shared by `circuit::bitblast`. Each
//! function allocates the minimum number of fresh CNF variables needed
//! to define its output bit in terms of its input literals and adds the
//! defining clauses to the given `SatManager`. Negation is free (it just
//! flips the literal's sign) so there is no `not` encoder here.

use crate::sat::{Lit, SatManager};

/// `z <-> (a AND b)`.
pub fn and_gate(sm: &mut SatManager, a: Lit, b: Lit) -> Lit {
    let z = sm.next_cnf_id().expect("variable overflow");
    sm.add(-z);
    sm.add(a);
    sm.add(0);
    sm.add(-z);
    sm.add(b);
    sm.add(0);
    sm.add(z);
    sm.add(-a);
    sm.add(-b);
    sm.add(0);
    z
}

/// `z <-> (a OR b)`, built as `NOT(NOT a AND NOT b)`.
pub fn or_gate(sm: &mut SatManager, a: Lit, b: Lit) -> Lit {
    -and_gate(sm, -a, -b)
}

/// `z <-> (a XOR b)`.
pub fn xor_gate(sm: &mut SatManager, a: Lit, b: Lit) -> Lit {
    let z = sm.next_cnf_id().expect("variable overflow");
    sm.add(-z);
    sm.add(a);
    sm.add(b);
    sm.add(0);
    sm.add(-z);
    sm.add(-a);
    sm.add(-b);
    sm.add(0);
    sm.add(z);
    sm.add(-a);
    sm.add(b);
    sm.add(0);
    sm.add(z);
    sm.add(a);
    sm.add(-b);
    sm.add(0);
    z
}

/// `z <-> (c AND t) OR (!c AND e)`.
pub fn ite_gate(sm: &mut SatManager, c: Lit, t: Lit, e: Lit) -> Lit {
    let then_arm = and_gate(sm, c, t);
    let else_arm = and_gate(sm, -c, e);
    or_gate(sm, then_arm, else_arm)
}

/// Full adder: returns `(sum, carry_out)` for `a + b + carry_in`.
pub fn full_adder(sm: &mut SatManager, a: Lit, b: Lit, carry_in: Lit) -> (Lit, Lit) {
    let ab_xor = xor_gate(sm, a, b);
    let sum = xor_gate(sm, ab_xor, carry_in);
    let carry_and_ab = and_gate(sm, a, b);
    let carry_and_cin = and_gate(sm, ab_xor, carry_in);
    let carry_out = or_gate(sm, carry_and_ab, carry_and_cin);
    (sum, carry_out)
}

/// Reduction-AND over `lits` (empty ⇒ `true_lit`).
pub fn reduce_and(sm: &mut SatManager, lits: &[Lit]) -> Lit {
    match lits.split_first() {
        None => sm.true_lit(),
        Some((first, rest)) => rest.iter().fold(*first, |acc, &l| and_gate(sm, acc, l)),
    }
}

/// `z <-> ((!lt_hi) AND eq_hi AND a_lo < b_lo) OR lt_hi`: one step of an
/// MSB-to-LSB unsigned comparator fold. `(lt, eq)` carries "strictly
/// less so far" / "equal so far" from the higher bits already folded.
pub fn ult_step(sm: &mut SatManager, lt_hi: Lit, eq_hi: Lit, a: Lit, b: Lit) -> (Lit, Lit) {
    let bit_lt = and_gate(sm, -a, b);
    let bit_eq = -xor_gate(sm, a, b);
    let eq_and_bit_lt = and_gate(sm, eq_hi, bit_lt);
    let lt = or_gate(sm, lt_hi, eq_and_bit_lt);
    let eq = and_gate(sm, eq_hi, bit_eq);
    (lt, eq)
}
