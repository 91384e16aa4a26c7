//! A minimal concrete `Circuit`: Tseitin bit-blasting straight into a
//! [`SatManager`]. The BMC core treats the SMT/bit-vector engine as an
//! out-of-scope external collaborator; this is the one implementation
//! this crate ships so the engine has something real to drive end to
//! end.
//!
//! Nodes live in a `petgraph` DAG (grounded on the node-graph pattern in
//! `other_examples/746a5c76_chinmaydd-libsmt.rs__src-backends-smtlib2.rs.rs`);
//! bit-level encoding is lazy and memoized per node, so a node shared by
//! many frames is bit-blasted once.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Directed;

use crate::circuit::model::{Circuit, Op};
use crate::circuit::tseitin::{and_gate, full_adder, or_gate, reduce_and, ult_step, xor_gate};
use crate::sat::{Lit, SatManager, SolveResult};

type Idx = NodeIndex<u32>;

struct BvNode {
    width: u32,
    symbol: Option<String>,
    op: Op<Idx>,
    refcount: u32,
}

/// A Tseitin bit-blasting `Circuit` backed by one [`SatManager`].
pub struct BvCircuit {
    graph: StableGraph<BvNode, (), Directed, u32>,
    sat: SatManager,
    sat_initialized: bool,
    encoding: HashMap<Idx, Vec<Lit>>,
}

impl BvCircuit {
    pub fn new() -> Self {
        BvCircuit {
            graph: StableGraph::default(),
            sat: SatManager::new(),
            sat_initialized: false,
            encoding: HashMap::new(),
        }
    }

    /// The underlying SAT manager, for callers that need raw stats or
    /// dump access.
    pub fn sat_manager(&self) -> &SatManager {
        &self.sat
    }

    fn ensure_sat_init(&mut self) {
        if !self.sat_initialized {
            self.sat.init(true);
            self.sat_initialized = true;
        }
    }

    fn push_node(&mut self, width: u32, symbol: Option<String>, op: Op<Idx>, children: &[Idx]) -> Idx {
        let idx = self.graph.add_node(BvNode {
            width,
            symbol,
            op,
            refcount: 1,
        });
        for &c in children {
            self.graph.add_edge(idx, c, ());
        }
        idx
    }

    fn node(&self, idx: Idx) -> &BvNode {
        self.graph
            .node_weight(idx)
            .expect("circuit node used after release")
    }

    fn children_of(&self, idx: Idx) -> Vec<Idx> {
        match &self.node(idx).op {
            Op::Var | Op::Const(_) => Vec::new(),
            Op::Not(a) => vec![*a],
            Op::And(a, b) | Op::Or(a, b) | Op::Xor(a, b) | Op::Add(a, b) | Op::Eq(a, b) | Op::Ult(a, b) => {
                vec![*a, *b]
            }
            Op::Ite(c, t, e) => vec![*c, *t, *e],
            Op::Conjunction(xs) => xs.clone(),
        }
    }

    /// Bit-blasts `root` and every not-yet-encoded ancestor it needs,
    /// non-recursively so deep adder chains don't blow the call stack.
    /// Returns MSB-first CNF literals for `root`.
    fn encode(&mut self, root: Idx) -> Vec<Lit> {
        self.ensure_sat_init();
        if let Some(lits) = self.encoding.get(&root) {
            return lits.clone();
        }
        let mut stack = vec![(root, false)];
        while let Some((node, children_ready)) = stack.pop() {
            if self.encoding.contains_key(&node) {
                continue;
            }
            let children = self.children_of(node);
            if !children_ready {
                let missing: Vec<Idx> = children
                    .iter()
                    .copied()
                    .filter(|c| !self.encoding.contains_key(c))
                    .collect();
                if missing.is_empty() {
                    let lits = self.build_node(node, &children);
                    self.encoding.insert(node, lits);
                } else {
                    stack.push((node, true));
                    stack.extend(missing.into_iter().map(|c| (c, false)));
                }
            } else {
                let lits = self.build_node(node, &children);
                self.encoding.insert(node, lits);
            }
        }
        self.encoding[&root].clone()
    }

    fn child_lits(&self, child: Idx) -> Vec<Lit> {
        self.encoding
            .get(&child)
            .expect("child not yet encoded")
            .clone()
    }

    fn build_node(&mut self, node: Idx, children: &[Idx]) -> Vec<Lit> {
        let width = self.node(node).width as usize;
        match self.node(node).op.clone() {
            Op::Var => (0..width)
                .map(|_| self.sat.next_cnf_id().expect("variable overflow"))
                .collect(),
            Op::Const(bits) => {
                let t = self.sat.true_lit();
                bits.iter().map(|&b| if b { t } else { -t }).collect()
            }
            Op::Not(_) => self.child_lits(children[0]).into_iter().map(|l| -l).collect(),
            Op::And(..) => {
                let a = self.child_lits(children[0]);
                let b = self.child_lits(children[1]);
                a.iter().zip(&b).map(|(&x, &y)| and_gate(&mut self.sat, x, y)).collect()
            }
            Op::Or(..) => {
                let a = self.child_lits(children[0]);
                let b = self.child_lits(children[1]);
                a.iter().zip(&b).map(|(&x, &y)| or_gate(&mut self.sat, x, y)).collect()
            }
            Op::Xor(..) => {
                let a = self.child_lits(children[0]);
                let b = self.child_lits(children[1]);
                a.iter().zip(&b).map(|(&x, &y)| xor_gate(&mut self.sat, x, y)).collect()
            }
            Op::Add(..) => {
                let a = self.child_lits(children[0]);
                let b = self.child_lits(children[1]);
                let mut sums = vec![0; width];
                let mut carry = -self.sat.true_lit();
                for i in (0..width).rev() {
                    let (sum, carry_out) = full_adder(&mut self.sat, a[i], b[i], carry);
                    sums[i] = sum;
                    carry = carry_out;
                }
                sums
            }
            Op::Eq(..) => {
                let a = self.child_lits(children[0]);
                let b = self.child_lits(children[1]);
                let bitwise_eq: Vec<Lit> = a
                    .iter()
                    .zip(&b)
                    .map(|(&x, &y)| -xor_gate(&mut self.sat, x, y))
                    .collect();
                vec![reduce_and(&mut self.sat, &bitwise_eq)]
            }
            Op::Ult(..) => {
                let a = self.child_lits(children[0]);
                let b = self.child_lits(children[1]);
                let mut lt = -self.sat.true_lit();
                let mut eq = self.sat.true_lit();
                for i in 0..a.len() {
                    let (next_lt, next_eq) = ult_step(&mut self.sat, lt, eq, a[i], b[i]);
                    lt = next_lt;
                    eq = next_eq;
                }
                vec![lt]
            }
            Op::Ite(..) => {
                let c = self.child_lits(children[0])[0];
                let t = self.child_lits(children[1]);
                let e = self.child_lits(children[2]);
                t.iter()
                    .zip(&e)
                    .map(|(&tb, &eb)| crate::circuit::tseitin::ite_gate(&mut self.sat, c, tb, eb))
                    .collect()
            }
            Op::Conjunction(xs) => {
                let bits: Vec<Lit> = xs.iter().map(|&x| self.child_lits(x)[0]).collect();
                vec![reduce_and(&mut self.sat, &bits)]
            }
        }
    }
}

impl Default for BvCircuit {
    fn default() -> Self {
        Self::new()
    }
}

impl Circuit for BvCircuit {
    type Node = Idx;

    fn var(&mut self, width: u32, symbol: Option<&str>) -> Idx {
        self.push_node(width, symbol.map(String::from), Op::Var, &[])
    }

    fn constant(&mut self, bits: &str) -> Idx {
        let bools: Vec<bool> = bits
            .chars()
            .map(|c| match c {
                '0' => false,
                '1' => true,
                _ => panic!("constant bit string must be over {{0,1}}, got {bits:?}"),
            })
            .collect();
        let width = bools.len() as u32;
        self.push_node(width, None, Op::Const(bools), &[])
    }

    fn width(&self, node: Idx) -> u32 {
        self.node(node).width
    }

    fn symbol(&self, node: Idx) -> Option<&str> {
        self.node(node).symbol.as_deref()
    }

    fn copy_node(&mut self, node: Idx) -> Idx {
        self.graph
            .node_weight_mut(node)
            .expect("circuit node used after release")
            .refcount += 1;
        node
    }

    fn release(&mut self, node: Idx) {
        let Some(n) = self.graph.node_weight_mut(node) else {
            return;
        };
        if n.refcount <= 1 {
            self.graph.remove_node(node);
            self.encoding.remove(&node);
        } else {
            n.refcount -= 1;
        }
    }

    fn not(&mut self, node: Idx) -> Idx {
        let width = self.width(node);
        self.push_node(width, None, Op::Not(node), &[node])
    }

    fn and(&mut self, a: Idx, b: Idx) -> Idx {
        debug_assert_eq!(self.width(a), self.width(b));
        let width = self.width(a);
        self.push_node(width, None, Op::And(a, b), &[a, b])
    }

    fn or(&mut self, a: Idx, b: Idx) -> Idx {
        debug_assert_eq!(self.width(a), self.width(b));
        let width = self.width(a);
        self.push_node(width, None, Op::Or(a, b), &[a, b])
    }

    fn xor(&mut self, a: Idx, b: Idx) -> Idx {
        debug_assert_eq!(self.width(a), self.width(b));
        let width = self.width(a);
        self.push_node(width, None, Op::Xor(a, b), &[a, b])
    }

    fn add(&mut self, a: Idx, b: Idx) -> Idx {
        debug_assert_eq!(self.width(a), self.width(b));
        let width = self.width(a);
        self.push_node(width, None, Op::Add(a, b), &[a, b])
    }

    fn eq(&mut self, a: Idx, b: Idx) -> Idx {
        debug_assert_eq!(self.width(a), self.width(b));
        self.push_node(1, None, Op::Eq(a, b), &[a, b])
    }

    fn ult(&mut self, a: Idx, b: Idx) -> Idx {
        debug_assert_eq!(self.width(a), self.width(b));
        self.push_node(1, None, Op::Ult(a, b), &[a, b])
    }

    fn ite(&mut self, c: Idx, t: Idx, e: Idx) -> Idx {
        debug_assert_eq!(self.width(c), 1);
        debug_assert_eq!(self.width(t), self.width(e));
        let width = self.width(t);
        self.push_node(width, None, Op::Ite(c, t, e), &[c, t, e])
    }

    fn conjunction(&mut self, nodes: &[Idx]) -> Idx {
        self.push_node(1, None, Op::Conjunction(nodes.to_vec()), nodes)
    }

    fn assert_node(&mut self, node: Idx) {
        debug_assert_eq!(self.width(node), 1);
        let lits = self.encode(node);
        self.sat.add(lits[0]);
        self.sat.add(0);
    }

    fn assume_node(&mut self, node: Idx) {
        debug_assert_eq!(self.width(node), 1);
        let lits = self.encode(node);
        self.sat.assume(lits[0]);
    }

    fn sat(&mut self, limit: Option<u64>) -> SolveResult {
        self.ensure_sat_init();
        self.sat.sat(limit)
    }

    fn bv_assignment(&mut self, node: Idx) -> String {
        let lits = self.encode(node);
        lits.iter()
            .map(|&l| match self.sat.deref(l) {
                1 => '1',
                -1 => '0',
                _ => 'x',
            })
            .collect()
    }

    fn is_leaf(&self, node: Idx) -> bool {
        matches!(self.node(node).op, Op::Var | Op::Const(_))
    }

    fn op(&self, node: Idx) -> Op<Idx> {
        self.node(node).op.clone()
    }

    fn rebuild(&mut self, node: Idx, new_children: &[Idx]) -> Idx {
        match self.op(node) {
            Op::Var | Op::Const(_) => node,
            Op::Not(_) => self.not(new_children[0]),
            Op::And(..) => self.and(new_children[0], new_children[1]),
            Op::Or(..) => self.or(new_children[0], new_children[1]),
            Op::Xor(..) => self.xor(new_children[0], new_children[1]),
            Op::Add(..) => self.add(new_children[0], new_children[1]),
            Op::Eq(..) => self.eq(new_children[0], new_children[1]),
            Op::Ult(..) => self.ult(new_children[0], new_children[1]),
            Op::Ite(..) => self.ite(new_children[0], new_children[1], new_children[2]),
            Op::Conjunction(_) => self.conjunction(new_children),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_bit_add_wraps() {
        let mut c = BvCircuit::new();
        let one = c.constant("01");
        let three = c.constant("11");
        let sum = c.add(one, three);
        let zero = c.constant("00");
        let is_zero = c.eq(sum, zero);
        c.assert_node(is_zero);
        assert_eq!(c.sat(None), SolveResult::Sat);
        assert_eq!(c.bv_assignment(sum), "00");
    }

    #[test]
    fn xor_self_is_zero() {
        let mut c = BvCircuit::new();
        let v = c.var(4, Some("v"));
        let z = c.xor(v, v);
        let zero = c.constant("0000");
        let ne = c.eq(z, zero);
        c.assert_node(ne);
        assert_eq!(c.sat(None), SolveResult::Sat);
    }

    #[test]
    fn conjunction_of_conflicting_constraints_is_unsat() {
        let mut c = BvCircuit::new();
        let v = c.var(1, None);
        let zero = c.constant("0");
        let one = c.constant("1");
        let is_zero = c.eq(v, zero);
        let is_one = c.eq(v, one);
        let both = c.conjunction(&[is_zero, is_one]);
        c.assert_node(both);
        assert_eq!(c.sat(None), SolveResult::Unsat);
    }
}
