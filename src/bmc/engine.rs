//! The BMC Engine: drives frames `[mink..maxk]`, invokes SAT through
//! the forward circuit, records first-reached bounds, and fires
//! callbacks.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::bmc::options::{BmcOpt, Options};
use crate::circuit::model::{Circuit, Op};
use crate::sat::SolveResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    None,
    Sat,
    Unsat,
}

pub(crate) struct BmcInput<N> {
    pub id: usize,
    pub node: N,
}

pub(crate) struct BmcLatch<N> {
    pub id: usize,
    pub node: N,
    pub init: Option<N>,
    pub next: Option<N>,
}

/// One unrolled time step. `model2const` is the per-frame half of the
/// two-level witness cache; it maps a model-circuit node reachable at
/// this frame's time to its already computed concrete bits.
pub(crate) struct BmcFrame<N> {
    pub inputs: Vec<N>,
    pub latches: Vec<N>,
    pub next: Vec<Option<N>>,
    pub bad: Vec<Option<N>>,
    pub model2const: RefCell<HashMap<N, Vec<bool>>>,
}

type ReachedCallback = Box<dyn FnMut(usize, i64)>;
type StartingCallback = Box<dyn FnMut(i64)>;

/// The bounded model checker core. Generic over the `Circuit`
/// implementation; owns two separate instances of it — a *model*
/// circuit the caller authors into, and a *forward* circuit lazily
/// created on the first frame.
pub struct BmcEngine<C: Circuit + Default> {
    pub(crate) model: C,
    pub(crate) forward: Option<C>,
    pub(crate) inputs: Vec<BmcInput<C::Node>>,
    pub(crate) input_ids: HashMap<C::Node, usize>,
    pub(crate) latches: Vec<BmcLatch<C::Node>>,
    pub(crate) latch_ids: HashMap<C::Node, usize>,
    pub(crate) bad: Vec<C::Node>,
    pub(crate) constraints: Vec<C::Node>,
    pub(crate) reached: Vec<i64>,
    pub(crate) num_reached: usize,
    pub(crate) frames: Vec<BmcFrame<C::Node>>,
    pub(crate) state: EngineState,
    pub(crate) options: Options,
    /// `forward2const`: the engine-level half of the witness cache
    /// (§4.6), keyed by forward-circuit node. Cleared at the start of
    /// every `bmc()` call.
    pub(crate) forward2const: HashMap<C::Node, Vec<bool>>,
    reached_at_bound_cb: Option<ReachedCallback>,
    starting_bound_cb: Option<StartingCallback>,
}

fn const_bits<C: Circuit>(circuit: &C, node: C::Node) -> Vec<bool> {
    match circuit.op(node) {
        Op::Const(bits) => bits,
        _ => panic!("expected a constant node: {node:?}"),
    }
}

pub(crate) fn const_bits_string<C: Circuit>(circuit: &C, node: C::Node) -> String {
    const_bits(circuit, node)
        .iter()
        .map(|&b| if b { '1' } else { '0' })
        .collect()
}

impl<C: Circuit + Default> BmcEngine<C> {
    pub fn new() -> Self {
        BmcEngine {
            model: C::default(),
            forward: None,
            inputs: Vec::new(),
            input_ids: HashMap::new(),
            latches: Vec::new(),
            latch_ids: HashMap::new(),
            bad: Vec::new(),
            constraints: Vec::new(),
            reached: Vec::new(),
            num_reached: 0,
            frames: Vec::new(),
            state: EngineState::None,
            options: Options::from_env(),
            forward2const: HashMap::new(),
            reached_at_bound_cb: None,
            starting_bound_cb: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The model circuit the caller builds input/latch/bad/constraint
    /// expressions into directly via the `Circuit` interface.
    pub fn model(&mut self) -> &mut C {
        &mut self.model
    }

    // ---- option introspection ----

    pub fn set_opt(&mut self, opt: BmcOpt, val: u32) -> Result<(), crate::errors::ConfigError> {
        if opt == BmcOpt::TraceGen {
            assert!(
                self.frames.is_empty(),
                "TRACE_GEN may only be toggled before any frame is built"
            );
        }
        self.options.set(opt, val)
    }

    pub fn get_opt(&self, opt: BmcOpt) -> u32 {
        self.options.get(opt)
    }

    pub fn is_valid_opt(&self, opt: BmcOpt, val: u32) -> bool {
        self.options.is_valid(opt, val)
    }

    pub fn get_opt_min(&self, opt: BmcOpt) -> u32 {
        opt.meta().min
    }

    pub fn get_opt_max(&self, opt: BmcOpt) -> u32 {
        opt.meta().max
    }

    pub fn get_opt_dflt(&self, opt: BmcOpt) -> u32 {
        opt.meta().default
    }

    pub fn get_opt_lng(&self, opt: BmcOpt) -> &'static str {
        opt.meta().long
    }

    pub fn get_opt_shrt(&self, opt: BmcOpt) -> &'static str {
        opt.meta().short
    }

    pub fn get_opt_desc(&self, opt: BmcOpt) -> &'static str {
        opt.meta().desc
    }

    // ---- callbacks ----

    pub fn set_reached_at_bound_callback(&mut self, cb: impl FnMut(usize, i64) + 'static) {
        self.reached_at_bound_cb = Some(Box::new(cb));
    }

    pub fn set_starting_bound_callback(&mut self, cb: impl FnMut(i64) + 'static) {
        self.starting_bound_cb = Some(Box::new(cb));
    }

    // ---- registration (only legal before any frame is built) ----

    pub fn input(&mut self, width: u32, name: Option<&str>) -> C::Node {
        assert!(self.frames.is_empty(), "input() after frames built");
        assert!(width >= 1, "input width must be >= 1");
        let node = self.model.var(width, name);
        let id = self.inputs.len();
        self.inputs.push(BmcInput { id, node });
        self.input_ids.insert(node, id);
        node
    }

    pub fn latch(&mut self, width: u32, name: Option<&str>) -> C::Node {
        assert!(self.frames.is_empty(), "latch() after frames built");
        assert!(width >= 1, "latch width must be >= 1");
        let node = self.model.var(width, name);
        let id = self.latches.len();
        self.latches.push(BmcLatch {
            id,
            node,
            init: None,
            next: None,
        });
        self.latch_ids.insert(node, id);
        node
    }

    fn latch_index(&self, node: C::Node) -> usize {
        *self
            .latch_ids
            .get(&node)
            .expect("node is not a registered latch")
    }

    pub fn init(&mut self, node: C::Node, init: C::Node) {
        assert!(self.frames.is_empty(), "init() after frames built");
        let idx = self.latch_index(node);
        assert!(self.latches[idx].init.is_none(), "init() already set for this latch");
        assert_eq!(self.model.width(node), self.model.width(init), "init width mismatch");
        assert!(
            matches!(self.model.op(init), Op::Const(_)),
            "init node must be a constant"
        );
        let retained = self.model.copy_node(init);
        self.latches[idx].init = Some(retained);
    }

    pub fn next(&mut self, node: C::Node, next: C::Node) {
        assert!(self.frames.is_empty(), "next() after frames built");
        let idx = self.latch_index(node);
        assert!(self.latches[idx].next.is_none(), "next() already set for this latch");
        assert_eq!(self.model.width(node), self.model.width(next), "next width mismatch");
        let retained = self.model.copy_node(next);
        self.latches[idx].next = Some(retained);
    }

    pub fn bad(&mut self, node: C::Node) -> usize {
        assert!(self.frames.is_empty(), "bad() after frames built");
        assert_eq!(self.model.width(node), 1, "bad property must be width 1");
        let idx = self.bad.len();
        self.bad.push(self.model.copy_node(node));
        self.reached.push(-1);
        idx
    }

    pub fn constraint(&mut self, node: C::Node) -> usize {
        assert!(self.frames.is_empty(), "constraint() after frames built");
        assert_eq!(self.model.width(node), 1, "constraint must be width 1");
        let idx = self.constraints.len();
        self.constraints.push(self.model.copy_node(node));
        idx
    }

    // ---- running BMC ----

    pub fn bmc(&mut self, mink: i64, maxk: i64) -> i64 {
        self.forward2const.clear();
        for frame in &self.frames {
            frame.model2const.borrow_mut().clear();
        }
        self.state = EngineState::None;

        if mink > maxk {
            self.state = EngineState::Unsat;
            return -1;
        }

        let mut k = self.frames.len() as i64;
        while k <= maxk {
            if let Some(cb) = &mut self.starting_bound_cb {
                cb(k);
            }
            self.build_frame(k as usize);
            if k >= mink {
                let satisfied = self.check_last_forward_frame(k as usize);
                if satisfied > 0 {
                    let stop_first = self.options.get(BmcOpt::StopFirst) != 0;
                    if stop_first || self.num_reached == self.bad.len() || k == maxk {
                        return k;
                    }
                }
            }
            k += 1;
        }
        self.state = EngineState::Unsat;
        -1
    }

    pub(crate) fn check_last_forward_frame(&mut self, k: usize) -> usize {
        let mut satisfied = 0;
        for i in 0..self.bad.len() {
            let Some(bad_node) = self.frames[k].bad[i] else {
                continue;
            };
            let forward = self.forward.as_mut().expect("forward circuit exists after build_frame");
            forward.assume_node(bad_node);
            match forward.sat(None) {
                SolveResult::Sat => {
                    self.state = EngineState::Sat;
                    satisfied += 1;
                    if self.reached[i] < 0 {
                        self.reached[i] = k as i64;
                        self.num_reached += 1;
                        if let Some(cb) = &mut self.reached_at_bound_cb {
                            cb(i, k as i64);
                        }
                    }
                }
                SolveResult::Unsat => {
                    self.state = EngineState::Unsat;
                }
                SolveResult::Unknown => {
                    panic!("forward solver returned UNKNOWN; the engine asserts SAT or UNSAT")
                }
            }
        }
        satisfied
    }

    pub fn reached_bad_at_bound(&self, i: usize) -> i64 {
        assert_eq!(
            self.options.get(BmcOpt::StopFirst),
            0,
            "reached_bad_at_bound() requires STOP_FIRST=0"
        );
        assert_ne!(self.state, EngineState::None, "bmc() has not been run yet");
        self.reached[i]
    }

    pub fn dump(&self, w: &mut dyn std::io::Write) -> std::io::Result<()> {
        writeln!(w, "; bmc engine dump ({} inputs, {} latches, {} bad, {} constraints)",
            self.inputs.len(), self.latches.len(), self.bad.len(), self.constraints.len())?;
        for input in &self.inputs {
            writeln!(w, "input {} width={}", input.id, self.model.width(input.node))?;
        }
        for latch in &self.latches {
            writeln!(
                w,
                "latch {} width={} init={} next={}",
                latch.id,
                self.model.width(latch.node),
                latch.init.is_some(),
                latch.next.is_some()
            )?;
        }
        for (i, _) in self.bad.iter().enumerate() {
            writeln!(w, "bad {i} reached={}", self.reached[i])?;
        }
        Ok(())
    }

    pub fn delete(self) {}
}

impl<C: Circuit + Default> Default for BmcEngine<C> {
    fn default() -> Self {
        Self::new()
    }
}
