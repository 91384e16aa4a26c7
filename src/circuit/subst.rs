//! The Node Substitution Map: a non-recursive DAG walker that clones a circuit fragment while
//! redirecting some of its nodes to replacements. Used by the Frame
//! Builder to thread latch values and inputs into a fresh unrolling
//! step, and by the Witness Reconstructor to fold a node down to the
//! constant its CNF literals evaluate to under the last model.
//!
//! Two entry points share one walk:
//! - [`substitute`] takes a pre-populated replacement map ("basic
//!   substitute").
//! - [`substitute_with_mapper`] asks a callback for each node's
//!   replacement, and may replace an interior node (not just a leaf),
//!   cutting the walk off below it ("extended substitute with mapper").
//!
//! Either way a node reachable from `root` through more than one path is
//! visited and rebuilt exactly once: the walk is a worklist of
//! `(node, phase)` pairs rather than a recursive function, so circuits
//! too deep to recurse over don't overflow the stack.

use std::collections::HashMap;

use crate::circuit::model::{Circuit, Op};

enum Phase {
    Visit,
    Rebuild,
}

pub(crate) fn children_of<C: Circuit>(circuit: &C, node: C::Node) -> Vec<C::Node> {
    match circuit.op(node) {
        Op::Var | Op::Const(_) => Vec::new(),
        Op::Not(a) => vec![a],
        Op::And(a, b) | Op::Or(a, b) | Op::Xor(a, b) | Op::Add(a, b) | Op::Eq(a, b) | Op::Ult(a, b) => {
            vec![a, b]
        }
        Op::Ite(c, t, e) => vec![c, t, e],
        Op::Conjunction(xs) => xs,
    }
}

/// Clones `root` into a fresh node tree, redirecting any node present in
/// `map` to its image; nodes not in `map` are rebuilt from substituted
/// children (leaves are passed through via `copy_node`).
pub fn substitute<C: Circuit>(
    circuit: &mut C,
    map: &HashMap<C::Node, C::Node>,
    root: C::Node,
) -> C::Node {
    substitute_with_mapper(circuit, root, |_circuit, node| map.get(&node).copied())
}

/// Like [`substitute`], but the replacement for any node — leaf or
/// interior — comes from `mapper`. Returning `Some` cuts the walk off
/// below that node without visiting its children.
pub fn substitute_with_mapper<C: Circuit>(
    circuit: &mut C,
    root: C::Node,
    mut mapper: impl FnMut(&mut C, C::Node) -> Option<C::Node>,
) -> C::Node {
    let mut built: HashMap<C::Node, C::Node> = HashMap::new();
    let mut stack = vec![(root, Phase::Visit)];

    while let Some((node, phase)) = stack.pop() {
        if built.contains_key(&node) {
            continue;
        }
        match phase {
            Phase::Visit => {
                if let Some(replacement) = mapper(circuit, node) {
                    built.insert(node, replacement);
                    continue;
                }
                if circuit.is_leaf(node) {
                    built.insert(node, circuit.copy_node(node));
                    continue;
                }
                let children = children_of(circuit, node);
                stack.push((node, Phase::Rebuild));
                for child in children {
                    if !built.contains_key(&child) {
                        stack.push((child, Phase::Visit));
                    }
                }
            }
            Phase::Rebuild => {
                let children = children_of(circuit, node);
                let new_children: Vec<C::Node> = children
                    .iter()
                    .map(|c| *built.get(c).expect("child must be built before its parent is rebuilt"))
                    .collect();
                let rebuilt = circuit.rebuild(node, &new_children);
                built.insert(node, rebuilt);
            }
        }
    }

    built[&root]
}

/// Clones `root`, read from the *source* circuit, into the *target*
/// circuit, redirecting every node present in `map` to its image there.
/// Unmapped constants are re-synthesized from their bits in the target
/// circuit; an unmapped variable is a caller error — the Frame Builder
/// must pre-populate `map` with every input/latch leaf before calling
/// this.
///
/// This is the cross-circuit counterpart of [`substitute`]: source and
/// target are different circuits (model vs. forward), so there is no
/// single `&mut self` to rebuild through — each interior node is
/// recreated directly via the target's own constructors.
pub fn substitute_across<S: Circuit, T: Circuit>(
    src: &S,
    tgt: &mut T,
    map: &HashMap<S::Node, T::Node>,
    root: S::Node,
) -> T::Node {
    let mut built: HashMap<S::Node, T::Node> = HashMap::new();
    let mut stack = vec![(root, Phase::Visit)];

    while let Some((node, phase)) = stack.pop() {
        if built.contains_key(&node) {
            continue;
        }
        match phase {
            Phase::Visit => {
                if let Some(&target) = map.get(&node) {
                    built.insert(node, target);
                    continue;
                }
                if src.is_leaf(node) {
                    let rebuilt = match src.op(node) {
                        Op::Const(bits) => {
                            let s: String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
                            tgt.constant(&s)
                        }
                        Op::Var => panic!(
                            "unmapped model-circuit variable in cross-circuit substitution: {node:?}"
                        ),
                        _ => unreachable!("is_leaf implies Var or Const"),
                    };
                    built.insert(node, rebuilt);
                    continue;
                }
                let children = children_of(src, node);
                stack.push((node, Phase::Rebuild));
                for child in children {
                    if !built.contains_key(&child) {
                        stack.push((child, Phase::Visit));
                    }
                }
            }
            Phase::Rebuild => {
                let rebuilt = match src.op(node) {
                    Op::Var | Op::Const(_) => unreachable!("leaves are resolved in Visit"),
                    Op::Not(a) => tgt.not(built[&a]),
                    Op::And(a, b) => tgt.and(built[&a], built[&b]),
                    Op::Or(a, b) => tgt.or(built[&a], built[&b]),
                    Op::Xor(a, b) => tgt.xor(built[&a], built[&b]),
                    Op::Add(a, b) => tgt.add(built[&a], built[&b]),
                    Op::Eq(a, b) => tgt.eq(built[&a], built[&b]),
                    Op::Ult(a, b) => tgt.ult(built[&a], built[&b]),
                    Op::Ite(c, t, e) => tgt.ite(built[&c], built[&t], built[&e]),
                    Op::Conjunction(xs) => {
                        let ys: Vec<T::Node> = xs.iter().map(|x| built[x]).collect();
                        tgt.conjunction(&ys)
                    }
                };
                built.insert(node, rebuilt);
            }
        }
    }

    built[&root]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::bitblast::BvCircuit;
    use crate::sat::SolveResult;

    #[test]
    fn basic_substitute_redirects_a_leaf() {
        let mut c = BvCircuit::new();
        let a = c.var(4, Some("a"));
        let b = c.var(4, Some("b"));
        let expr = c.xor(a, a);

        let mut map = HashMap::new();
        map.insert(a, b);
        let substituted = substitute(&mut c, &map, expr);

        let zero = c.constant("0000");
        let claim = c.eq(substituted, zero);
        let not_claim = c.not(claim);
        c.assert_node(not_claim);
        assert_eq!(c.sat(None), SolveResult::Sat);
    }

    #[test]
    fn shared_subterm_is_rebuilt_once() {
        let mut c = BvCircuit::new();
        let a = c.var(2, Some("a"));
        let shared = c.xor(a, a);
        let top = c.and(shared, shared);

        let mut calls = 0usize;
        let replaced = substitute_with_mapper(&mut c, top, |circuit, node| {
            if circuit.is_leaf(node) {
                calls += 1;
                Some(circuit.copy_node(node))
            } else {
                None
            }
        });
        assert_eq!(calls, 1);
        assert_eq!(c.width(replaced), 2);
    }

    #[test]
    fn mapper_can_cut_off_an_interior_node() {
        let mut c = BvCircuit::new();
        let a = c.var(4, Some("a"));
        let b = c.var(4, Some("b"));
        let expr = c.add(a, b);
        let replacement = c.constant("0011");

        let folded = substitute_with_mapper(&mut c, expr, |_circuit, node| {
            if node == expr {
                Some(replacement)
            } else {
                None
            }
        });
        assert_eq!(folded, replacement);
    }

    #[test]
    fn cross_circuit_substitute_clones_into_a_different_circuit() {
        let mut model = BvCircuit::new();
        let a = model.var(2, Some("a"));
        let one = model.constant("01");
        let expr = model.add(a, one);

        let mut forward = BvCircuit::new();
        let a_at_t = forward.var(2, Some("a@0"));
        let mut map = HashMap::new();
        map.insert(a, a_at_t);

        let cloned = substitute_across(&model, &mut forward, &map, expr);
        assert_eq!(forward.width(cloned), 2);

        let zero = forward.constant("11");
        let is_max = forward.eq(a_at_t, zero);
        forward.assert_node(is_max);
        let wrapped = forward.constant("00");
        let claim = forward.eq(cloned, wrapped);
        forward.assert_node(claim);
        assert_eq!(forward.sat(None), SolveResult::Sat);
    }
}
