//! Variable numbering for one [`super::M3igEncoder`] instance. Kept as
//! its own small module because the same contiguous-block scheme is
//! read by both the core encoder and `encoder::approx`.
use crate::selection::SelectionCatalogue;

/// Contiguous variable blocks, in allocation order:
/// selection vars, then one one-hot operator variable per `(step, k)` for
/// `k` in `0..4` (spec.md §4.4.1's literal `operator[4 · num_steps]`
/// block), then one simulation var per `(step, minterm)`, then one
/// wiring var per `(output, candidate line)` — candidate lines are every
/// synthesized step, plus every primary input when `allow_projection` is
/// set.
#[derive(Clone, Debug)]
pub struct VarLayout {
    pub num_vars: usize,
    pub num_steps: usize,
    pub tt_size: usize,
    pub nontriv: Vec<usize>,
    pub allow_projection: bool,
    sel_base: usize,
    op_base: usize,
    sim_base: usize,
    wiring_base: usize,
    candidates_per_output: usize,
    total: usize,
}

/// Non-equivalent polarity patterns a step's operator variable may
/// select, spec.md §4.4.8: `⟨abc⟩`, `⟨¬a b c⟩`, `⟨a ¬b c⟩`, `⟨a b ¬c⟩`.
pub const NUM_OPERATORS: u8 = 4;

impl VarLayout {
    pub fn new(
        catalogue: &SelectionCatalogue,
        num_steps: usize,
        tt_size: usize,
        nontriv: Vec<usize>,
        allow_projection: bool,
    ) -> Self {
        let sel_base = 0;
        let op_base = sel_base + catalogue.total();
        let sim_base = op_base + NUM_OPERATORS as usize * num_steps;
        let wiring_base = sim_base + num_steps * tt_size;
        let candidates_per_output = num_steps + if allow_projection { catalogue.num_vars() } else { 0 };
        let total = wiring_base + nontriv.len() * candidates_per_output;
        VarLayout {
            num_vars: catalogue.num_vars(),
            num_steps,
            tt_size,
            nontriv,
            allow_projection,
            sel_base,
            op_base,
            sim_base,
            wiring_base,
            candidates_per_output,
            total,
        }
    }

    pub fn total_vars(&self) -> usize {
        self.total
    }

    pub fn sel_var(&self, catalogue_idx: usize) -> usize {
        self.sel_base + catalogue_idx
    }

    /// The one-hot operator variable asserting step `step`'s operator is
    /// exactly `k` (`k` in `0..NUM_OPERATORS`).
    pub fn op_var(&self, step: usize, k: u8) -> usize {
        debug_assert!(k < NUM_OPERATORS);
        self.op_base + NUM_OPERATORS as usize * step + k as usize
    }

    pub fn sim_var(&self, step: usize, t: usize) -> usize {
        self.sim_base + step * self.tt_size + t
    }

    /// The wiring variable for output slot `h_idx` (index into
    /// [`VarLayout::nontriv`]) choosing candidate `i`: `i < num_steps`
    /// means "wired to step `i`"; `i >= num_steps` means "wired directly
    /// to primary input `i - num_steps`" (only allocated when
    /// `allow_projection` is set).
    pub fn wiring_var(&self, h_idx: usize, candidate: usize) -> usize {
        self.wiring_base + h_idx * self.candidates_per_output + candidate
    }

    pub fn candidates_per_output(&self) -> usize {
        self.candidates_per_output
    }
}
