//! Synthesis knobs: a plain `Default`-able data struct, not a CLI surface
//! (this core exposes none).

/// Symmetry-breaking and search-shape options.
#[derive(Clone, Debug)]
pub struct SynthesisOptions {
    /// Enforce every step is used at least once by a later step or an
    /// output (§4.4.5).
    pub alonce: bool,
    /// Enforce co-lexicographic order on successive steps' fan-ins (§4.4.5).
    pub colex: bool,
    /// When two successive steps share fan-ins, enforce lexicographic
    /// order on the operator id (§4.4.5).
    pub lex_func: bool,
    /// Forbid step patterns that are permutations of earlier choices for
    /// variable pairs under which every target function is symmetric
    /// (§4.4.5).
    pub symvar: bool,
    /// SAT conflict budget per `solve` call; `0` means unlimited.
    pub conflict_limit: usize,
    /// Lower bound on the step count the driver starts searching from.
    pub initial_steps: usize,
    /// Upper bound on the step count the driver will grow to before
    /// giving up (design value: 20).
    pub step_cap: usize,
    /// 0-3; gates how much synthesis trace the driver prints.
    pub verbosity: u8,
    /// Use the CEGAR clause-emission path (§4.4.6) instead of emitting
    /// all truth-table clauses up front.
    pub use_cegar: bool,
    /// Cap on CEGAR counterexample iterations per step count before
    /// escalating to a larger step count (design value: 10).
    pub cegar_iteration_cap: usize,
    /// Restrict the search to fences (level profiles) rather than a flat
    /// step count (§4.4.7).
    pub use_fence: bool,
    /// Drive the search with the parallel CEGAR+fence worker pool (§4.8).
    /// Implies `use_cegar` and `use_fence`.
    pub use_parallel: bool,
    /// Conflict budget each parallel worker uses per attempt (design
    /// value: 10).
    pub parallel_conflict_limit: usize,
    /// Approximate-computing knobs; `None` means exact synthesis.
    pub approx: Option<ApproxOptions>,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        SynthesisOptions {
            alonce: true,
            colex: true,
            lex_func: true,
            symvar: false,
            conflict_limit: 0,
            initial_steps: 1,
            step_cap: 20,
            verbosity: 0,
            use_cegar: false,
            cegar_iteration_cap: 10,
            use_fence: false,
            use_parallel: false,
            parallel_conflict_limit: 10,
            approx: None,
        }
    }
}

/// How a trivial, projected output picks up a `pi_out` variable.
///
/// There are two defensible readings of when `pi_out`/`pi_sim` variables
/// should exist (see DESIGN.md for the reasoning); both are implemented
/// and the caller picks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProjectionInterlock {
    /// Only allocate `pi_out`/`pi_sim` variables when `allow_projection`
    /// is set, regardless of how many trivial outputs exist.
    ProjectionFlagOnly,
    /// Also allocate them whenever the specification has at least one
    /// trivial output, even if `allow_projection` is unset for the
    /// non-trivial ones.
    AlsoOnTrivialOutputs,
}

/// Approximate-computing encoder options.
#[derive(Clone, Debug)]
pub struct ApproxOptions {
    /// Maximum allowed per-minterm `|exact - approx|` in the combined
    /// output value.
    pub error_distance: usize,
    /// Below this step count, fall back to exact output fixing even
    /// though approximate mode is enabled. An explicit, documented knob
    /// rather than a hidden threshold (see DESIGN.md).
    pub min_nodes: usize,
    /// Allow a non-trivial output to be wired directly to a primary
    /// input instead of a synthesized step.
    pub allow_projection: bool,
    /// Resolves the `allow_projection`/`num_triv` interlock ambiguity.
    pub projection_interlock: ProjectionInterlock,
}

impl Default for ApproxOptions {
    fn default() -> Self {
        ApproxOptions {
            error_distance: 0,
            min_nodes: 0,
            allow_projection: false,
            projection_interlock: ProjectionInterlock::ProjectionFlagOnly,
        }
    }
}
