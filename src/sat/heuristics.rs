//! Decision-variable heuristics, the one axis [`super::Engine`] is generic
//! over: a VSIDS-style activity order for the primary `CdclSolver`, and a
//! cheap static order for the short-lived `BitParallelSolver` worker
//! instances (spec.md §4.2, §4.8 "workers favor throughput over per-call
//! solve quality").

/// How an [`Engine`](super::Engine) picks its next decision variable, and
/// how it reacts to conflicts. Distinct engine instantiations ([`super::CdclSolver`],
/// [`super::BitParallelSolver`]) plug in a different implementation here
/// and share every other piece of the solving loop.
pub trait DecisionHeuristic {
    fn new(num_vars: usize) -> Self;

    /// Reward variable `v` for appearing in a just-learned clause.
    fn bump(&mut self, v: usize);

    /// Periodic activity decay, called once per learned clause.
    fn decay(&mut self);

    /// The next unassigned variable to branch on, or `None` if every
    /// variable already has a value.
    fn pick(&mut self, assignment: &[Option<bool>]) -> Option<usize>;
}

/// Exponential variable-state independent decaying sum, grounded on
/// splr's `src/assign/evsids.rs` `reward_at_analysis` (itself the
/// MiniSat/Glucose VSIDS scheme): conflict-clause literals get their
/// activity bumped by a growing increment, and the increment itself
/// grows geometrically instead of rescaling every variable's activity
/// on every decay, mirroring that file's `SCALE`/`SCALE_MAX`
/// (1e-100/1e100) rescale-on-threshold scheme.
#[derive(Clone, Debug)]
pub struct VsidsHeuristic {
    activity: Vec<f64>,
    inc: f64,
    decay_factor: f64,
}

const ACTIVITY_RESCALE_THRESHOLD: f64 = 1e100;

impl DecisionHeuristic for VsidsHeuristic {
    fn new(num_vars: usize) -> Self {
        VsidsHeuristic {
            activity: vec![0.0; num_vars],
            inc: 1.0,
            decay_factor: 0.95,
        }
    }

    fn bump(&mut self, v: usize) {
        self.activity[v] += self.inc;
        if self.activity[v] > ACTIVITY_RESCALE_THRESHOLD {
            for a in self.activity.iter_mut() {
                *a *= 1e-100;
            }
            self.inc *= 1e-100;
        }
    }

    fn decay(&mut self) {
        self.inc /= self.decay_factor;
    }

    fn pick(&mut self, assignment: &[Option<bool>]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (v, a) in self.activity.iter().enumerate() {
            if assignment[v].is_some() {
                continue;
            }
            if best.map_or(true, |(_, ba)| *a > ba) {
                best = Some((v, *a));
            }
        }
        best.map(|(v, _)| v)
    }
}

/// Fixed increasing variable order, no activity bookkeeping. Cheap to
/// construct and reset, which matters for a worker that gets handed a
/// fresh encoding every fence (spec.md §4.8).
#[derive(Clone, Debug)]
pub struct StaticOrderHeuristic {
    num_vars: usize,
}

impl DecisionHeuristic for StaticOrderHeuristic {
    fn new(num_vars: usize) -> Self {
        StaticOrderHeuristic { num_vars }
    }

    fn bump(&mut self, _v: usize) {}

    fn decay(&mut self) {}

    fn pick(&mut self, assignment: &[Option<bool>]) -> Option<usize> {
        (0..self.num_vars).find(|&v| assignment[v].is_none())
    }
}
