//! The Witness Reconstructor: produces a bit-string assignment for any
//! model-circuit node at any time ≤ the last reached bound.
//!
//! Rather than re-encoding an arbitrary node into the forward solver's
//! CNF (which would need a fresh `sat()` call just to read one value),
//! this evaluates the node structurally from already-known bits: the
//! forward solver's model for each already-asserted leaf, folded
//! upward through the DAG by plain boolean/bit-vector arithmetic. That
//! is the substitute-with-mapper walk applied to a concrete-bits domain
//! instead of a node domain — same non-recursive worklist shape, cached
//! the same two levels deep.

use std::collections::HashMap;

use crate::bmc::engine::{BmcEngine, EngineState};
use crate::bmc::options::BmcOpt;
use crate::circuit::model::{Circuit, Op};
use crate::circuit::subst::children_of;

fn bits_to_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

fn normalize_assignment(raw: &str) -> Vec<bool> {
    raw.chars().map(|c| c == '1').collect()
}

fn bitvec_add(a: &[bool], b: &[bool]) -> Vec<bool> {
    let n = a.len();
    let mut out = vec![false; n];
    let mut carry = false;
    for i in (0..n).rev() {
        out[i] = a[i] ^ b[i] ^ carry;
        carry = (a[i] && b[i]) || (carry && (a[i] ^ b[i]));
    }
    out
}

fn bitvec_ult(a: &[bool], b: &[bool]) -> bool {
    for i in 0..a.len() {
        if a[i] != b[i] {
            return !a[i] && b[i];
        }
    }
    false
}

fn eval_op<N: Copy>(op: &Op<N>, children: &[N], values: &HashMap<N, Vec<bool>>) -> Vec<bool>
where
    N: Eq + std::hash::Hash + std::fmt::Debug,
{
    let get = |n: N| values.get(&n).expect("child evaluated before its parent").clone();
    match op {
        Op::Var => panic!("unassigned leaf reached during witness evaluation"),
        Op::Const(bits) => bits.clone(),
        Op::Not(_) => get(children[0]).iter().map(|b| !b).collect(),
        Op::And(..) => {
            let (a, b) = (get(children[0]), get(children[1]));
            a.iter().zip(&b).map(|(&x, &y)| x && y).collect()
        }
        Op::Or(..) => {
            let (a, b) = (get(children[0]), get(children[1]));
            a.iter().zip(&b).map(|(&x, &y)| x || y).collect()
        }
        Op::Xor(..) => {
            let (a, b) = (get(children[0]), get(children[1]));
            a.iter().zip(&b).map(|(&x, &y)| x ^ y).collect()
        }
        Op::Add(..) => bitvec_add(&get(children[0]), &get(children[1])),
        Op::Eq(..) => vec![get(children[0]) == get(children[1])],
        Op::Ult(..) => vec![bitvec_ult(&get(children[0]), &get(children[1]))],
        Op::Ite(..) => {
            if get(children[0])[0] {
                get(children[1])
            } else {
                get(children[2])
            }
        }
        Op::Conjunction(_) => vec![children.iter().all(|&c| get(c)[0])],
    }
}

/// Evaluates `root` to concrete bits. `known` seeds leaf values ahead of
/// the walk (and is mutated with every freshly computed node, including
/// intermediate ones, to serve as a cache across calls); `leaf` is
/// invoked, at most once per unknown `Var` leaf, to resolve it.
fn eval<C: Circuit>(
    circuit: &mut C,
    known: &mut HashMap<C::Node, Vec<bool>>,
    mut leaf: impl FnMut(&mut C, C::Node) -> Vec<bool>,
    root: C::Node,
) -> Vec<bool> {
    if let Some(v) = known.get(&root) {
        return v.clone();
    }
    let mut stack = vec![(root, false)];
    while let Some((node, children_ready)) = stack.pop() {
        if known.contains_key(&node) {
            continue;
        }
        match circuit.op(node) {
            Op::Const(bits) => {
                known.insert(node, bits);
                continue;
            }
            Op::Var => {
                let bits = leaf(circuit, node);
                known.insert(node, bits);
                continue;
            }
            _ => {}
        }
        let children = children_of(circuit, node);
        if !children_ready {
            let missing: Vec<_> = children.iter().copied().filter(|c| !known.contains_key(c)).collect();
            if missing.is_empty() {
                let op = circuit.op(node);
                let out = eval_op(&op, &children, known);
                known.insert(node, out);
            } else {
                stack.push((node, true));
                stack.extend(missing.into_iter().map(|c| (c, false)));
            }
        } else {
            let op = circuit.op(node);
            let out = eval_op(&op, &children, known);
            known.insert(node, out);
        }
    }
    known[&root].clone()
}

impl<C: Circuit + Default> BmcEngine<C> {
    /// Requires `state == SAT` and `TRACE_GEN` on.
    pub fn assignment(&mut self, node: C::Node, time: usize) -> String {
        assert_eq!(self.state, EngineState::Sat, "assignment() requires SAT state");
        assert_ne!(self.get_opt(BmcOpt::TraceGen), 0, "assignment() requires TRACE_GEN");
        assert!(time < self.frames.len(), "time {time} has no built frame");

        if let Some(&id) = self.input_ids.get(&node) {
            let forward_node = self.frames[time].inputs[id];
            let forward = self.forward.as_mut().expect("forward circuit exists");
            return bits_to_string(&normalize_assignment(&forward.bv_assignment(forward_node)));
        }

        if let Some(bits) = self.frames[time].model2const.borrow().get(&node) {
            return bits_to_string(bits);
        }

        // Resolve every registered input/latch leaf the model circuit might
        // reference, each via the two-level cache (§4.6 rationale).
        let mut model_known: HashMap<C::Node, Vec<bool>> = HashMap::new();
        for input in &self.inputs {
            let forward_node = self.frames[time].inputs[input.id];
            let forward = self.forward.as_mut().expect("forward circuit exists");
            let bits = normalize_assignment(&forward.bv_assignment(forward_node));
            model_known.insert(input.node, bits);
        }
        for latch in &self.latches {
            let forward_node = self.frames[time].latches[latch.id];
            let bits = self.forward_const_bits(forward_node);
            model_known.insert(latch.node, bits);
        }

        let bits = eval(
            &mut self.model,
            &mut model_known,
            |_circuit, n| panic!("unregistered model leaf {n:?} reachable from assignment() node"),
            node,
        );

        self.frames[time].model2const.borrow_mut().extend(model_known);
        bits_to_string(&bits)
    }

    /// Reduces a forward-circuit node to concrete bits using only
    /// forward-circuit leaves' current SAT-model values, caching in
    /// `forward2const` (the engine-level half of the two-level cache).
    fn forward_const_bits(&mut self, node: C::Node) -> Vec<bool> {
        if let Some(bits) = self.forward2const.get(&node) {
            return bits.clone();
        }
        let forward2const = &mut self.forward2const;
        let forward = self.forward.as_mut().expect("forward circuit exists");
        let bits = eval(
            forward,
            forward2const,
            |circuit, leaf| normalize_assignment(&circuit.bv_assignment(leaf)),
            node,
        );
        bits
    }
}
