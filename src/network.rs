//! `NetworkBuilder`: the seam between a synthesized [`Chain`] and
//! whatever logic-network data structure a host application already
//! uses (spec.md §2 "NetworkBuilder (seam) — interface only"). This
//! crate defines the trait and nothing else; it owns no concrete graph
//! type, matching spec.md §9's design note that host network types stay
//! out of the core and graph cycles are the caller's problem, not this
//! crate's.
use crate::chain::Chain;

/// A destination a synthesized [`Chain`] can be replayed into. Callers
/// implement this over their own node-graph type; this crate never
/// constructs one itself.
pub trait NetworkBuilder {
    /// Opaque handle to a node in the host network.
    type Node: Copy;

    /// The constant-false node, created once.
    fn constant_false(&mut self) -> Self::Node;

    /// A handle to primary input `v` (0-indexed); called once per input
    /// before any `majority` call references it.
    fn primary_input(&mut self, v: usize) -> Self::Node;

    /// Create a 3-input majority node over `(a, b, c)`.
    fn majority(&mut self, a: Self::Node, b: Self::Node, c: Self::Node) -> Self::Node;

    /// The complement of `node`, created lazily (an implementation over
    /// a network with first-class complemented edges may just flip a
    /// bit rather than allocate).
    fn complement(&mut self, node: Self::Node) -> Self::Node;

    /// Mark `node` as output `h`.
    fn mark_output(&mut self, h: usize, node: Self::Node);
}

/// Replay `chain` into `builder`, in topological (construction) order:
/// the constant line, then every primary input, then every step in the
/// order it was synthesized, then the output wiring.
pub fn replay_into<B: NetworkBuilder>(chain: &Chain, builder: &mut B) {
    let mut nodes: Vec<B::Node> = Vec::with_capacity(chain.num_vars() + 1 + chain.num_steps());
    nodes.push(builder.constant_false());
    for v in 0..chain.num_vars() {
        nodes.push(builder.primary_input(v));
    }
    for step_idx in 0..chain.num_steps() {
        let ((u, v, w), op) = step_fanins(chain, step_idx);
        let a = polarized_node(&nodes, builder, u, op == 1);
        let b = polarized_node(&nodes, builder, v, op == 2);
        let c = polarized_node(&nodes, builder, w, op == 3);
        nodes.push(builder.majority(a, b, c));
    }
    for h in 0..chain.num_outputs() {
        let lit = chain
            .output_literal(h)
            .expect("every output must be wired before replay_into");
        let idx = lit >> 1;
        let pol = lit & 1 == 1;
        let node = if pol {
            builder.complement(nodes[idx])
        } else {
            nodes[idx]
        };
        builder.mark_output(h, node);
    }
}

fn polarized_node<B: NetworkBuilder>(
    nodes: &[B::Node],
    builder: &mut B,
    line: usize,
    negate: bool,
) -> B::Node {
    let node = nodes[line];
    if negate {
        builder.complement(node)
    } else {
        node
    }
}

/// `((u, v, w), op)` for step `step_idx`; `Chain` doesn't expose its
/// `Step` fields publicly, so this reconstructs them from the one public
/// surface it does expose, [`Chain::to_expression`]'s sibling accessors.
fn step_fanins(chain: &Chain, step_idx: usize) -> ((usize, usize, usize), u8) {
    chain
        .step_at(step_idx)
        .expect("step_idx must be < chain.num_steps()")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truth_table::TruthTable;

    #[derive(Default)]
    struct VecNetwork {
        values: Vec<TruthTable>,
        num_vars: usize,
        outputs: Vec<Option<usize>>,
    }

    impl NetworkBuilder for VecNetwork {
        type Node = usize;

        fn constant_false(&mut self) -> usize {
            self.values.push(TruthTable::zero(self.num_vars));
            self.values.len() - 1
        }

        fn primary_input(&mut self, v: usize) -> usize {
            self.values.push(TruthTable::projection(self.num_vars, v));
            self.values.len() - 1
        }

        fn majority(&mut self, a: usize, b: usize, c: usize) -> usize {
            let m = TruthTable::majority3(&self.values[a], &self.values[b], &self.values[c])
                .unwrap();
            self.values.push(m);
            self.values.len() - 1
        }

        fn complement(&mut self, node: usize) -> usize {
            let inv = self.values[node].invert();
            self.values.push(inv);
            self.values.len() - 1
        }

        fn mark_output(&mut self, h: usize, node: usize) {
            if self.outputs.len() <= h {
                self.outputs.resize(h + 1, None);
            }
            self.outputs[h] = Some(node);
        }
    }

    #[test]
    fn replay_reproduces_the_same_function_as_simulate() {
        let mut chain = crate::chain::Chain::new(3, 1);
        chain.push_step(0, 1, 2, 0);
        chain.push_step(0, 3, 4, 0);
        chain.set_output(0, (chain.step_line(1) << 1) | 0);

        let mut net = VecNetwork {
            num_vars: 3,
            ..Default::default()
        };
        replay_into(&chain, &mut net);
        let replayed = &net.values[net.outputs[0].unwrap()];
        let simulated = &chain.simulate()[0];
        assert_eq!(replayed, simulated);
    }
}
