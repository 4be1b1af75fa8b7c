//! `M3igEncoder`: translates a [`Specification`] plus a candidate step
//! count (and, optionally, a [`Fence`]) into CNF clauses over a
//! [`SatSolverIF`] backend, and decodes a satisfying assignment back into
//! a [`Chain`].
//!
//! Every candidate line is either a known constant at encode time (the
//! constant-0 line or a primary input, whose bit at minterm `t` is just
//! `(row >> v) & 1`, no SAT variable involved) or a previous step,
//! carried by a simulation variable — see the `LineValue` case split
//! below. Folding the constant case away keeps each clause family's
//! guard short instead of re-deriving it from cofactors every time.
mod layout;

pub mod approx;

use crate::chain::Chain;
use crate::fence::Fence;
use crate::sat::{neg_lit, pos_lit, Lit, SatSolverIF};
use crate::selection::SelectionCatalogue;
use crate::spec::Specification;
use crate::truth_table::TruthTable;
use layout::VarLayout;

/// The value a chain line holds at minterm `t`: either known at encode
/// time (the constant-0 line, or a primary input, whose bit is just
/// `(row >> v) & 1` for `row = t + 1`), or carried by a simulation
/// variable belonging to an earlier step.
#[derive(Clone, Copy, Debug)]
enum LineValue {
    Const(bool),
    Var(usize),
}

/// `value`, polarity-adjusted: `Ok(b)` if it resolved to a known
/// constant, `Err(lit)` if it is still carried by a SAT literal.
fn polarize(value: LineValue, negate: bool) -> Result<bool, Lit> {
    match value {
        LineValue::Const(b) => Ok(b ^ negate),
        LineValue::Var(v) => Err(if negate { neg_lit(v) } else { pos_lit(v) }),
    }
}

/// `(a & b) | (a & c) | (b & c)`.
fn majority_of(bits: [bool; 3]) -> bool {
    (bits[0] && bits[1]) || (bits[0] && bits[2]) || (bits[1] && bits[2])
}

/// Emit the guarded Tseitin clauses for `guard -> (y <-> maj(terms))` by
/// enumerating every combination of the still-unresolved terms: each
/// combination fixes the majority value, so the guarded implication
/// collapses to exactly one clause per combination.
fn emit_guarded_maj_eq(
    solver: &mut dyn SatSolverIF,
    guard: &[Lit],
    y: usize,
    terms: [Result<bool, Lit>; 3],
) {
    let var_positions: Vec<usize> = (0..3).filter(|&k| terms[k].is_err()).collect();
    let nvars = var_positions.len();
    for mask in 0..(1u32 << nvars) {
        let mut bits = [false; 3];
        let mut combo_lits: Vec<Lit> = Vec::new();
        for (k, term) in terms.iter().enumerate() {
            match term {
                Ok(b) => bits[k] = *b,
                Err(lit) => {
                    let pos = var_positions.iter().position(|&p| p == k).unwrap();
                    let assigned_true = (mask >> pos) & 1 == 1;
                    bits[k] = assigned_true;
                    combo_lits.push(if assigned_true { -lit } else { *lit });
                }
            }
        }
        let r = majority_of(bits);
        let mut clause: Vec<Lit> = guard.iter().map(|g| -g).collect();
        clause.extend(combo_lits);
        clause.push(if r { pos_lit(y) } else { neg_lit(y) });
        solver.add_clause(&clause);
    }
}

pub struct M3igEncoder<'s> {
    spec: &'s Specification,
    catalogue: SelectionCatalogue,
    layout: VarLayout,
    fence: Option<Fence>,
    /// Minterms (`t` in `0..tt_size`) whose consistency/output clauses
    /// have already been emitted. Under CEGAR this grows one at a time;
    /// outside CEGAR it is filled completely up front.
    activated: Vec<bool>,
    /// Whether [`M3igEncoder::emit_output_fixing_for_minterm`] emits the
    /// hard "wiring implies exact target match" clause. `true` (the
    /// default) for every exact-mode driver. [`approx::ApproxEncoder`]
    /// turns this off on its wrapped encoder: its own error-indicator and
    /// cardinality-bound clauses (`emit_error_accounting`) are the only
    /// thing constraining output values once it's in charge, so this
    /// encoder's hard fixing would otherwise force zero error regardless
    /// of `ApproxOptions::error_distance`.
    exact_output_fixing: bool,
}

impl<'s> M3igEncoder<'s> {
    pub fn new(spec: &'s Specification, num_steps: usize) -> Self {
        let catalogue = SelectionCatalogue::new(num_steps, spec.num_vars());
        let allow_projection = spec
            .options
            .approx
            .as_ref()
            .map_or(false, |a| a.allow_projection);
        let layout = VarLayout::new(
            &catalogue,
            num_steps,
            spec.tt_size(),
            spec.nontriv_indices(),
            allow_projection,
        );
        let tt_size = spec.tt_size();
        M3igEncoder {
            spec,
            catalogue,
            layout,
            fence: None,
            activated: vec![false; tt_size],
            exact_output_fixing: true,
        }
    }

    /// Turn off the hard wiring-implies-exact-match clause, leaving
    /// output-value constraints entirely to whatever wraps this encoder.
    /// Only [`approx::ApproxEncoder`] calls this.
    pub(crate) fn set_exact_output_fixing(&mut self, on: bool) {
        self.exact_output_fixing = on;
    }

    pub fn with_fence(spec: &'s Specification, fence: Fence) -> Self {
        let mut enc = M3igEncoder::new(spec, fence.step_count());
        enc.fence = Some(fence);
        enc
    }

    pub fn num_steps(&self) -> usize {
        self.catalogue.num_steps()
    }

    pub fn total_vars(&self) -> usize {
        self.layout.total_vars()
    }

    pub fn spec(&self) -> &Specification {
        self.spec
    }

    /// Exposed for [`approx::ApproxEncoder`], which shares this encoder's
    /// variable numbering and needs to reference wiring/simulation
    /// variables directly when building its error-accounting clauses.
    pub(crate) fn wiring_var_for(&self, h_idx: usize, candidate: usize) -> usize {
        self.layout.wiring_var(h_idx, candidate)
    }

    pub(crate) fn sim_var_for(&self, step: usize, t: usize) -> usize {
        self.layout.sim_var(step, t)
    }

    fn line_value(&self, line: usize, t: usize) -> LineValue {
        let n = self.spec.num_vars();
        if line == 0 {
            LineValue::Const(false)
        } else if line <= n {
            let v = line - 1;
            let row = t + 1;
            LineValue::Const((row >> v) & 1 == 1)
        } else {
            LineValue::Var(self.layout.sim_var(line - n - 1, t))
        }
    }

    // ---- structural clauses (emitted once, independent of any minterm) ----

    /// Fan-in, wiring cardinality, symmetry-breaking and (if set) fence
    /// clauses. Call once per solver instance, before any
    /// [`M3igEncoder::activate_minterm`].
    pub fn emit_structural_clauses(&self, solver: &mut dyn SatSolverIF) {
        self.emit_selection_clauses(solver);
        self.emit_operator_onehot(solver);
        self.emit_wiring_onehot(solver);
        self.emit_last_step_feeds_output_clause(solver);
        if let Some(fence) = &self.fence {
            self.emit_fence_clauses(fence, solver);
        }
        if self.spec.options.alonce {
            self.emit_alonce_clauses(solver);
        }
        if self.spec.options.colex {
            self.emit_colex_clauses(solver);
        }
        if self.spec.options.lex_func {
            self.emit_lex_func_clauses(solver);
        }
        if self.spec.options.symvar {
            self.emit_symvar_clauses(solver);
        }
    }

    fn emit_selection_clauses(&self, solver: &mut dyn SatSolverIF) {
        for i in 0..self.catalogue.num_steps() {
            let range = self.catalogue.step_range(i);
            let lits: Vec<Lit> = range
                .clone()
                .map(|idx| pos_lit(self.layout.sel_var(idx)))
                .collect();
            solver.add_clause(&lits);
            for a in range.clone() {
                for b in (a + 1)..range.end {
                    solver.add_clause(&[
                        neg_lit(self.layout.sel_var(a)),
                        neg_lit(self.layout.sel_var(b)),
                    ]);
                }
            }
        }
    }

    /// Exactly one operator variable true per step, over the one-hot
    /// `operator[4 · num_steps]` block (spec.md §4.4.1, §4.4.8).
    fn emit_operator_onehot(&self, solver: &mut dyn SatSolverIF) {
        for i in 0..self.catalogue.num_steps() {
            let lits: Vec<Lit> = (0..layout::NUM_OPERATORS)
                .map(|k| pos_lit(self.layout.op_var(i, k)))
                .collect();
            solver.add_clause(&lits);
            for a in 0..layout::NUM_OPERATORS {
                for b in (a + 1)..layout::NUM_OPERATORS {
                    solver.add_clause(&[
                        neg_lit(self.layout.op_var(i, a)),
                        neg_lit(self.layout.op_var(i, b)),
                    ]);
                }
            }
        }
    }

    /// Exactly one wiring candidate per non-trivial output; trivial
    /// outputs never get a wiring variable at all, see
    /// [`M3igEncoder::decode_trivial_wiring`].
    fn emit_wiring_onehot(&self, solver: &mut dyn SatSolverIF) {
        let per_output = self.layout.candidates_per_output();
        for h_idx in 0..self.layout.nontriv.len() {
            let lits: Vec<Lit> = (0..per_output)
                .map(|c| pos_lit(self.layout.wiring_var(h_idx, c)))
                .collect();
            solver.add_clause(&lits);
            for a in 0..per_output {
                for b in (a + 1)..per_output {
                    solver.add_clause(&[
                        neg_lit(self.layout.wiring_var(h_idx, a)),
                        neg_lit(self.layout.wiring_var(h_idx, b)),
                    ]);
                }
            }
        }
    }

    /// Forbid any selection whose fan-ins reach outside the step's own
    /// fence level: a step at level `L` may only read lines introduced
    /// strictly before `L`.
    fn emit_fence_clauses(&self, fence: &Fence, solver: &mut dyn SatSolverIF) {
        let dist = fence.level_dist(self.spec.num_vars());
        for i in 0..self.catalogue.num_steps() {
            let level = fence.level_of_step(self.spec.num_vars(), i);
            let bound = dist[level - 1];
            for idx in self.catalogue.step_range(i) {
                let sel = self.catalogue.lookup(idx);
                if sel.l >= bound {
                    solver.add_clause(&[neg_lit(self.layout.sel_var(idx))]);
                }
            }
        }
    }

    /// The last synthesized step must drive at least one non-trivial
    /// output: without this, the solver could stash the answer in an
    /// earlier step and leave the last one dead, which `alonce` alone
    /// doesn't forbid since it only constrains steps *other than* the
    /// last.
    fn emit_last_step_feeds_output_clause(&self, solver: &mut dyn SatSolverIF) {
        let num_steps = self.catalogue.num_steps();
        if num_steps == 0 || self.layout.nontriv.is_empty() {
            return;
        }
        let last = num_steps - 1;
        let lits: Vec<Lit> = (0..self.layout.nontriv.len())
            .map(|h_idx| pos_lit(self.layout.wiring_var(h_idx, last)))
            .collect();
        solver.add_clause(&lits);
    }

    /// Every step but the last must be read by a later step or an output
    /// ("alonce" symmetry breaking).
    fn emit_alonce_clauses(&self, solver: &mut dyn SatSolverIF) {
        let num_steps = self.catalogue.num_steps();
        for i in 0..num_steps.saturating_sub(1) {
            let line = self.spec.num_vars() + 1 + i;
            let mut lits = Vec::new();
            for i2 in (i + 1)..num_steps {
                for idx in self.catalogue.step_range(i2) {
                    let sel = self.catalogue.lookup(idx);
                    if sel.j == line || sel.k == line || sel.l == line {
                        lits.push(pos_lit(self.layout.sel_var(idx)));
                    }
                }
            }
            for h_idx in 0..self.layout.nontriv.len() {
                lits.push(pos_lit(self.layout.wiring_var(h_idx, i)));
            }
            if !lits.is_empty() {
                solver.add_clause(&lits);
            }
        }
    }

    /// Forbid step `i+1` from choosing a catalogue index that precedes
    /// step `i`'s, keeping the selection sequence non-decreasing under
    /// the catalogue's own (already lexicographic) enumeration order
    /// ("colex" symmetry breaking).
    fn emit_colex_clauses(&self, solver: &mut dyn SatSolverIF) {
        for i in 0..self.catalogue.num_steps().saturating_sub(1) {
            for a in self.catalogue.step_range(i) {
                let sel_a = self.catalogue.lookup(a);
                for b in self.catalogue.step_range(i + 1) {
                    let sel_b = self.catalogue.lookup(b);
                    if (sel_b.l, sel_b.k, sel_b.j) < (sel_a.l, sel_a.k, sel_a.j) {
                        solver.add_clause(&[
                            neg_lit(self.layout.sel_var(a)),
                            neg_lit(self.layout.sel_var(b)),
                        ]);
                    }
                }
            }
        }
    }

    /// When two adjacent steps could pick the identical fan-in triple,
    /// forbid the later one from using a strictly smaller operator id
    /// ("lex_func" symmetry breaking).
    fn emit_lex_func_clauses(&self, solver: &mut dyn SatSolverIF) {
        for i in 0..self.catalogue.num_steps().saturating_sub(1) {
            let shared = self.catalogue.count(i).min(self.catalogue.count(i + 1));
            for local in 0..shared {
                let a = self.catalogue.step_offset(i) + local;
                let b = self.catalogue.step_offset(i + 1) + local;
                for opa in 0u8..4 {
                    for opb in 0u8..4 {
                        if opa <= opb {
                            continue;
                        }
                        let clause = [
                            neg_lit(self.layout.sel_var(a)),
                            neg_lit(self.layout.sel_var(b)),
                            neg_lit(self.layout.op_var(i, opa)),
                            neg_lit(self.layout.op_var(i + 1, opb)),
                        ];
                        solver.add_clause(&clause);
                    }
                }
            }
        }
    }

    /// For every pair of primary inputs every target function is
    /// symmetric in, forbid the very first step from reading the
    /// higher-numbered input without also reading the lower-numbered one
    /// ("symvar" symmetry breaking; scope limited to the first step —
    /// see DESIGN.md).
    fn emit_symvar_clauses(&self, solver: &mut dyn SatSolverIF) {
        if self.catalogue.num_steps() == 0 {
            return;
        }
        let pairs = self.spec.npn_symmetric_pairs();
        if pairs.is_empty() {
            return;
        }
        for idx in self.catalogue.step_range(0) {
            let sel = self.catalogue.lookup(idx);
            let lines = [sel.j, sel.k, sel.l];
            for &(p, q) in &pairs {
                let (pl, ql) = (p + 1, q + 1);
                if lines.contains(&ql) && !lines.contains(&pl) {
                    solver.add_clause(&[neg_lit(self.layout.sel_var(idx))]);
                }
            }
        }
    }

    // ---- per-minterm clauses (the CEGAR unit of work) ----

    pub fn is_activated(&self, t: usize) -> bool {
        self.activated[t]
    }

    /// Emit every clause touching minterm `t`: the guarded
    /// selection/operator -> simulation-value consistency family for
    /// each step, and the wiring -> target-bit family for each
    /// non-trivial output. Idempotent.
    pub fn activate_minterm(&mut self, t: usize, solver: &mut dyn SatSolverIF) {
        if self.activated[t] {
            return;
        }
        self.activated[t] = true;
        for i in 0..self.catalogue.num_steps() {
            self.emit_consistency_for_step(i, t, solver);
        }
        self.emit_output_fixing_for_minterm(t, solver);
    }

    /// Emit consistency clauses for every minterm at once (the
    /// non-CEGAR, "eager" path).
    pub fn activate_all_minterms(&mut self, solver: &mut dyn SatSolverIF) {
        for t in 0..self.spec.tt_size() {
            self.activate_minterm(t, solver);
        }
    }

    fn emit_consistency_for_step(&self, i: usize, t: usize, solver: &mut dyn SatSolverIF) {
        let y = self.layout.sim_var(i, t);
        for idx in self.catalogue.step_range(i) {
            let sel = self.catalogue.lookup(idx);
            let (lv_j, lv_k, lv_l) = (
                self.line_value(sel.j, t),
                self.line_value(sel.k, t),
                self.line_value(sel.l, t),
            );
            for op in 0u8..layout::NUM_OPERATORS {
                let guard = vec![
                    pos_lit(self.layout.sel_var(idx)),
                    pos_lit(self.layout.op_var(i, op)),
                ];
                let terms = [
                    polarize(lv_j, op == 1),
                    polarize(lv_k, op == 2),
                    polarize(lv_l, op == 3),
                ];
                emit_guarded_maj_eq(solver, &guard, y, terms);
            }
        }
    }

    /// Hard "wiring implies exact target match" clauses. Skipped entirely
    /// when [`M3igEncoder::exact_output_fixing`] is off (i.e. this
    /// encoder is wrapped by [`approx::ApproxEncoder`]): that wrapper
    /// installs its own error-indicator and cardinality-bound clauses
    /// over the same wiring/simulation variables instead, see
    /// `approx::ApproxEncoder::emit_error_accounting`.
    fn emit_output_fixing_for_minterm(&self, t: usize, solver: &mut dyn SatSolverIF) {
        if !self.exact_output_fixing {
            return;
        }
        let num_steps = self.catalogue.num_steps();
        for (h_idx, &h) in self.layout.nontriv.clone().iter().enumerate() {
            let target = self.spec.spec_bit(h, t);
            for i in 0..num_steps {
                let w = self.layout.wiring_var(h_idx, i);
                let sim = self.layout.sim_var(i, t);
                solver.add_clause(&[neg_lit(w), if target { pos_lit(sim) } else { neg_lit(sim) }]);
            }
            if self.layout.allow_projection {
                for v in 0..self.spec.num_vars() {
                    let w = self.layout.wiring_var(h_idx, num_steps + v);
                    if let LineValue::Const(b) = self.line_value(v + 1, t) {
                        if b != target {
                            solver.add_clause(&[neg_lit(w)]);
                        }
                    }
                }
            }
        }
    }

    // ---- decoding a satisfying assignment back into a Chain ----

    pub fn decode_chain(&self, solver: &dyn SatSolverIF) -> Chain {
        let num_vars = self.spec.num_vars();
        let mut chain = Chain::new(num_vars, self.spec.num_outputs());
        for i in 0..self.catalogue.num_steps() {
            let idx = self
                .catalogue
                .step_range(i)
                .find(|&idx| solver.value(self.layout.sel_var(idx)))
                .expect("exactly one selection variable must be true per step in a Sat model");
            let sel = self.catalogue.lookup(idx);
            let op = (0..layout::NUM_OPERATORS)
                .find(|&k| solver.value(self.layout.op_var(i, k)))
                .expect("exactly one operator variable must be true per step in a Sat model");
            chain.push_step(sel.j, sel.k, sel.l, op);
        }
        for h in 0..self.spec.num_outputs() {
            if self.spec.is_trivial_output(h) {
                chain.set_output(h, self.decode_trivial_wiring(h));
            } else {
                let h_idx = self
                    .layout
                    .nontriv
                    .iter()
                    .position(|&x| x == h)
                    .expect("non-trivial output must appear in the layout's nontriv list");
                let candidate = (0..self.layout.candidates_per_output())
                    .find(|&c| solver.value(self.layout.wiring_var(h_idx, c)))
                    .expect("exactly one wiring variable must be true per output in a Sat model");
                let line = if candidate < self.catalogue.num_steps() {
                    chain.step_line(candidate)
                } else {
                    (candidate - self.catalogue.num_steps()) + 1
                };
                let pol = self.spec.out_inv(h) as usize;
                chain.set_output(h, (line << 1) | pol);
            }
        }
        chain
    }

    /// For a trivial output, find the constant or primary-input line
    /// (with whichever polarity matches) that realizes it directly, with
    /// no SAT variable or solver involvement.
    fn decode_trivial_wiring(&self, h: usize) -> usize {
        let f = &self.spec.functions()[h];
        let n = self.spec.num_vars();
        if f.count_ones() == 0 {
            return 0; // constant line, positive polarity
        }
        if f.count_ones() == f.size() {
            return 1; // constant line, negative polarity
        }
        for v in 0..n {
            let proj = TruthTable::projection(n, v);
            if *f == proj {
                return ((v + 1) << 1) | 0;
            }
            if *f == proj.invert() {
                return ((v + 1) << 1) | 1;
            }
        }
        unreachable!("Specification::is_trivial_output guarantees a constant or projection match")
    }
}

/// The first minterm at which `chain`'s realized outputs disagree with
/// `spec`'s non-trivial target functions, or `None` if it already
/// satisfies every one. Trivial outputs are never re-checked here:
/// they're wired directly by construction.
pub fn counterexample(spec: &Specification, chain: &Chain) -> Option<usize> {
    let realized = chain.simulate();
    for h in spec.nontriv_indices() {
        let f = &spec.functions()[h];
        for t in 0..spec.tt_size() {
            if realized[h].bit(t + 1) != f.bit(t + 1) {
                return Some(t);
            }
        }
    }
    None
}
