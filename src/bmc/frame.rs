//! The Frame Builder: builds one `BMCFrame(t)` in the fixed order
//! Inputs → Latches → Map → Next → Constraints → Bad.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::bmc::engine::{const_bits_string, BmcEngine, BmcFrame};
use crate::circuit::model::Circuit;
use crate::circuit::subst::substitute_across;

impl<C: Circuit + Default> BmcEngine<C> {
    /// Builds frame `t` if it doesn't already exist. A no-op when `t`
    /// was already built by a prior `bmc()` call (frames are monotone).
    pub(crate) fn build_frame(&mut self, t: usize) {
        if t < self.frames.len() {
            return;
        }
        debug_assert_eq!(t, self.frames.len(), "frames must be built in order");

        if self.forward.is_none() {
            self.forward = Some(C::default());
        }
        let forward = self.forward.as_mut().expect("forward circuit just created");

        // 1. Inputs: a fresh forward-circuit variable per registered input.
        let mut frame_inputs = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let width = self.model.width(input.node);
            let sym = self.model.symbol(input.node).map(|s| format!("{s}@{t}"));
            frame_inputs.push(forward.var(width, sym.as_deref()));
        }

        // 2. Latches.
        let mut frame_latches = Vec::with_capacity(self.latches.len());
        for (i, latch) in self.latches.iter().enumerate() {
            let width = self.model.width(latch.node);
            let value = if t == 0 {
                if let Some(init) = latch.init {
                    let bits = const_bits_string(&self.model, init);
                    forward.constant(&bits)
                } else {
                    let sym = self.model.symbol(latch.node).map(|s| format!("{s}@{t}"));
                    forward.var(width, sym.as_deref())
                }
            } else if latch.next.is_some() {
                let prev = self.frames[t - 1].next[i]
                    .expect("frame.next[i] is set whenever latch[i].next is set");
                forward.copy_node(prev)
            } else {
                let sym = self.model.symbol(latch.node).map(|s| format!("{s}@{t}"));
                forward.var(width, sym.as_deref())
            };
            frame_latches.push(value);
        }

        // 3. Map: model-circuit input/latch node -> this frame's forward node.
        let mut map: HashMap<C::Node, C::Node> = HashMap::new();
        for (i, input) in self.inputs.iter().enumerate() {
            map.insert(input.node, frame_inputs[i]);
        }
        for (i, latch) in self.latches.iter().enumerate() {
            map.insert(latch.node, frame_latches[i]);
        }

        // 4. Next.
        let mut frame_next = Vec::with_capacity(self.latches.len());
        for latch in &self.latches {
            let next_image = latch
                .next
                .map(|n| substitute_across(&self.model, forward, &map, n));
            frame_next.push(next_image);
        }

        // 5. Constraints: substitute, conjoin, assert unconditionally.
        let constraint_images: Vec<C::Node> = self
            .constraints
            .iter()
            .map(|&c| substitute_across(&self.model, forward, &map, c))
            .collect();
        let conjoined = forward.conjunction(&constraint_images);
        forward.assert_node(conjoined);

        // 6. Bad: null for any property already reached at an earlier bound.
        let mut frame_bad = Vec::with_capacity(self.bad.len());
        for (i, &bad_node) in self.bad.iter().enumerate() {
            if self.reached[i] >= 0 {
                frame_bad.push(None);
            } else {
                frame_bad.push(Some(substitute_across(&self.model, forward, &map, bad_node)));
            }
        }

        self.frames.push(BmcFrame {
            inputs: frame_inputs,
            latches: frame_latches,
            next: frame_next,
            bad: frame_bad,
            model2const: RefCell::new(HashMap::new()),
        });
    }
}
