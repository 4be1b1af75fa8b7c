//! `Chain`: the flat, indexable straight-line program a synthesis run
//! produces, addressed by indices into a `Vec` rather than pointers —
//! unlike the host network types this core deliberately stays out of,
//! the chain never exposes cyclic or shared-mutable graph structure.
use crate::spec::Specification;
use crate::truth_table::TruthTable;
use std::fmt;

/// One synthesized majority step. `fanins` are strictly ordered
/// `u <= v <= w`; `0` denotes the constant-false line, `1..=num_vars`
/// the primary inputs, and `num_vars+1..` earlier steps, all addressed by
/// the same "global line number" the selection catalogue uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Step {
    /// 0: `<abc>`, 1: `<!a b c>`, 2: `<a !b c>`, 3: `<a b !c>`; polarity
    /// is applied to the fan-in at that position of the sorted triple.
    pub op: u8,
    pub fanins: [usize; 3],
}

impl Step {
    pub fn new(u: usize, v: usize, w: usize, op: u8) -> Self {
        debug_assert!(u <= v && v <= w, "fanins must be sorted u <= v <= w");
        debug_assert!(op < 4, "only 4 non-equivalent polarity patterns exist");
        Step {
            op,
            fanins: [u, v, w],
        }
    }
}

/// A straight-line program of 3-input majority steps plus output wiring.
#[derive(Clone, Debug)]
pub struct Chain {
    num_vars: usize,
    steps: Vec<Step>,
    /// `outputs[h] = (global_line_index << 1) | polarity`, one per output
    /// of the specification (trivial outputs included, wired straight to
    /// a PI or the constant line with no step of their own).
    outputs: Vec<Option<usize>>,
}

impl Chain {
    pub fn new(num_vars: usize, num_outputs: usize) -> Self {
        Chain {
            num_vars,
            steps: Vec::new(),
            outputs: vec![None; num_outputs],
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Global line number of the constant-false input.
    pub fn const_line() -> usize {
        0
    }

    /// Global line number of primary input `v` (0-indexed).
    pub fn pi_line(&self, v: usize) -> usize {
        debug_assert!(v < self.num_vars);
        v + 1
    }

    /// Global line number of step `i` (0-indexed among synthesized steps).
    pub fn step_line(&self, i: usize) -> usize {
        self.num_vars + 1 + i
    }

    /// Append step `i`; `i` must equal the chain's current length (steps
    /// are appended in order) and every fan-in must be less than the
    /// step's own global line number.
    pub fn push_step(&mut self, u: usize, v: usize, w: usize, op: u8) {
        let line = self.step_line(self.steps.len());
        debug_assert!(u < line && v < line && w < line, "fan-in must precede its step");
        self.steps.push(Step::new(u, v, w, op));
    }

    /// Wire output `h` to `literal = (global_line_index << 1) | polarity`.
    /// In approximate mode with projection, `global_line_index` may name
    /// a primary input (`pi_index + 1`) rather than a step.
    pub fn set_output(&mut self, h: usize, literal: usize) {
        self.outputs[h] = Some(literal);
    }

    pub fn output_literal(&self, h: usize) -> Option<usize> {
        self.outputs[h]
    }

    /// Step `i`'s `((u, v, w), op)`, for callers (e.g. [`crate::network`])
    /// that need to walk the chain's structure directly instead of
    /// through [`Chain::simulate`]/[`Chain::to_expression`].
    pub fn step_at(&self, i: usize) -> Option<((usize, usize, usize), u8)> {
        self.steps
            .get(i)
            .map(|s| ((s.fanins[0], s.fanins[1], s.fanins[2]), s.op))
    }

    /// Topologically evaluate the chain, returning the realized function
    /// for every output (trivial outputs included), with each output's
    /// stored polarity bit already applied — so `satisfies` can compare
    /// directly against the specification's target functions.
    pub fn simulate(&self) -> Vec<TruthTable> {
        let n = self.num_vars;
        let mut lines: Vec<TruthTable> = Vec::with_capacity(n + 1 + self.steps.len());
        lines.push(TruthTable::zero(n));
        for v in 0..n {
            lines.push(TruthTable::projection(n, v));
        }
        for step in &self.steps {
            let [u, v, w] = step.fanins;
            let (a, b, c) = (&lines[u], &lines[v], &lines[w]);
            let pa = if step.op == 1 { a.invert() } else { a.clone() };
            let pb = if step.op == 2 { b.invert() } else { b.clone() };
            let pc = if step.op == 3 { c.invert() } else { c.clone() };
            let sim = TruthTable::majority3(&pa, &pb, &pc)
                .expect("chain fan-ins are constructed over the same num_vars");
            lines.push(sim);
        }
        self.outputs
            .iter()
            .map(|lit| {
                let lit = lit.expect("every output must be wired before simulate()");
                let idx = lit >> 1;
                let pol = lit & 1 == 1;
                if pol {
                    lines[idx].invert()
                } else {
                    lines[idx].clone()
                }
            })
            .collect()
    }

    /// `true` iff every output's realized function equals the
    /// specification's target function.
    pub fn satisfies(&self, spec: &Specification) -> bool {
        if self.num_vars != spec.num_vars() || self.outputs.len() != spec.num_outputs() {
            return false;
        }
        let realized = self.simulate();
        realized
            .iter()
            .zip(spec.functions().iter())
            .all(|(r, f)| r == f)
    }

    /// Gate count and combinational depth, so callers can compare
    /// candidate chains without re-simulating.
    pub fn cost(&self) -> (usize, usize) {
        let depth = self.depth_of_line(self.num_vars + self.steps.len());
        (self.steps.len(), depth)
    }

    fn depth_of_line(&self, line: usize) -> usize {
        if line <= self.num_vars {
            return 0;
        }
        let step = &self.steps[line - self.num_vars - 1];
        1 + step
            .fanins
            .iter()
            .map(|&f| self.depth_of_line(f))
            .max()
            .unwrap_or(0)
    }

    fn fanin_label(&self, line: usize, negate: bool) -> String {
        let body = if line == 0 {
            "0".to_string()
        } else if line <= self.num_vars {
            ((b'a' + (line - 1) as u8) as char).to_string()
        } else {
            self.step_expression(line - self.num_vars - 1)
        };
        if negate {
            format!("!{}", body)
        } else {
            body
        }
    }

    fn step_expression(&self, i: usize) -> String {
        let step = &self.steps[i];
        let [u, v, w] = step.fanins;
        let (nu, nv, nw) = match step.op {
            1 => (true, false, false),
            2 => (false, true, false),
            3 => (false, false, true),
            _ => (false, false, false),
        };
        format!(
            "<{}{}{}>",
            self.fanin_label(u, nu),
            self.fanin_label(v, nv),
            self.fanin_label(w, nw)
        )
    }

    /// Prefix-form expression for output `h`, e.g. `<0ab>` or `!<a<0bc>>`.
    pub fn to_expression(&self, h: usize) -> String {
        let lit = self
            .outputs[h]
            .unwrap_or_else(|| panic!("output {} is not wired", h));
        let idx = lit >> 1;
        let pol = lit & 1 == 1;
        let body = if idx == 0 {
            "0".to_string()
        } else if idx <= self.num_vars {
            ((b'a' + (idx - 1) as u8) as char).to_string()
        } else {
            self.step_expression(idx - self.num_vars - 1)
        };
        if pol {
            format!("!{}", body)
        } else {
            body
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(
                f,
                "{}-{}-{}{}{}",
                i + 1,
                step.op,
                step.fanins[0],
                step.fanins[1],
                step.fanins[2]
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesisOptions;

    #[test]
    fn two_step_and_chain_realizes_0x80() {
        // 3-input AND via two majority-with-constant-0 steps:
        // step0 = maj(0, a, b) = a & b; step1 = maj(0, step0, c) = ab & c.
        let mut chain = Chain::new(3, 1);
        chain.push_step(0, 1, 2, 0); // maj(0, a, b) = a & b
        chain.push_step(0, 3, 4, 0); // maj(0, ab, c) = ab & c
        chain.set_output(0, (chain.step_line(1) << 1) | 0);
        let sim = chain.simulate();
        assert_eq!(sim[0], TruthTable::from_value(3, 0x80));
    }

    #[test]
    fn satisfies_checks_width_and_value() {
        let mut chain = Chain::new(3, 1);
        chain.push_step(0, 1, 2, 0);
        chain.push_step(0, 3, 4, 0);
        chain.set_output(0, (chain.step_line(1) << 1) | 0);
        let f = TruthTable::from_value(3, 0x80);
        let spec = Specification::new(
            3,
            vec![f],
            vec![false],
            vec![false],
            SynthesisOptions::default(),
        )
        .unwrap();
        assert!(chain.satisfies(&spec));
    }

    #[test]
    fn to_expression_round_trips_through_simulate() {
        let mut chain = Chain::new(3, 1);
        chain.push_step(0, 1, 2, 1); // maj(0, !a, b) = !a & b
        chain.set_output(0, (chain.step_line(0) << 1) | 1); // inverted output
        let expr = chain.to_expression(0);
        assert_eq!(expr, "!<0!ab>");
        // The expression names exactly the steps/polarities `simulate`
        // already evaluated; there is nothing further to parse back for
        // a chain with no sub-chain reuse beyond what `simulate` covers.
        let sim = chain.simulate();
        let raw_and = TruthTable::majority3(
            &TruthTable::zero(3),
            &TruthTable::projection(3, 0).invert(),
            &TruthTable::projection(3, 1),
        )
        .unwrap();
        assert_eq!(sim[0], raw_and.invert());
    }

    #[test]
    fn cost_reports_gate_count_and_depth() {
        let mut chain = Chain::new(3, 1);
        chain.push_step(0, 1, 2, 0);
        chain.push_step(0, 3, 4, 0);
        chain.set_output(0, (chain.step_line(1) << 1) | 0);
        assert_eq!(chain.cost(), (2, 2));
    }
}
