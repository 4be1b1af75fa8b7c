//! `SynthesisDriver`: turns a [`Specification`] into a [`Chain`] by
//! growing the step count (and, in fence mode, the fence) until the
//! encoder finds one or the configured cap is hit.
//!
//! Trace output is a verbosity-gated `println!`, never a global logger —
//! this core exposes no CLI for an operator to watch.
use crate::chain::Chain;
use crate::encoder::approx::ApproxEncoder;
use crate::encoder::{self, M3igEncoder};
use crate::error::{SynthResult, SynthesisError};
use crate::fence::FenceEnumerator;
use crate::sat::{CdclSolver, SatSolverIF, SolveResult};
use crate::spec::Specification;
use crate::truth_table::TruthTable;

macro_rules! trace {
    ($verbosity:expr, $level:expr, $($arg:tt)*) => {
        if $verbosity >= $level {
            println!($($arg)*);
        }
    };
}

/// The driver's internal state machine: `Encode` builds a
/// fresh solver for the current step count/fence, `Solve` runs it,
/// `CegarSolve` loops `Solve` with counterexample-driven clause growth,
/// `Grow` advances to the next step count or fence, and `Done` holds the
/// final result.
enum DriverState {
    Encode { step_count: usize },
    Solve { step_count: usize },
    CegarSolve { step_count: usize },
    Grow { step_count: usize },
    Done(SynthResult<Chain>),
}

pub struct SynthesisDriver<'s> {
    spec: &'s Specification,
}

impl<'s> SynthesisDriver<'s> {
    pub fn new(spec: &'s Specification) -> Self {
        SynthesisDriver { spec }
    }

    /// Run the driver to completion under whichever of the five modes
    /// the options select: plain, CEGAR, fence, CEGAR+fence, or parallel
    /// CEGAR+fence.
    pub fn synthesize(&self) -> SynthResult<Chain> {
        if self.spec.num_triv() == self.spec.num_outputs() {
            return self.trivial_chain();
        }
        let opts = &self.spec.options;
        if opts.approx.is_some() {
            // Approximate mode composes with plain step-count growth only;
            // fence/CEGAR/parallel combinations are out of scope here (see
            // DESIGN.md).
            return self.synthesize_approx();
        }
        if opts.use_parallel {
            return crate::parallel::synthesize_parallel(self.spec);
        }
        if opts.use_fence {
            return self.synthesize_with_fence();
        }
        self.synthesize_flat()
    }

    /// Grow the step count under [`ApproxEncoder`]'s bounded-error output
    /// fixing, falling back to the exact encoder's output fixing below
    /// `min_nodes` (see DESIGN.md for the reasoning).
    fn synthesize_approx(&self) -> SynthResult<Chain> {
        let approx = self
            .spec
            .options
            .approx
            .clone()
            .expect("synthesize_approx is only called when options.approx is Some");
        let verbosity = self.spec.options.verbosity;
        let mut step_count = self.spec.options.initial_steps;
        loop {
            if step_count > self.spec.options.step_cap {
                return Err(SynthesisError::Unsynthesizable {
                    step_cap: self.spec.options.step_cap,
                });
            }
            trace!(verbosity, 1, "# approx encoding at {} steps", step_count);
            let mut base = M3igEncoder::new(self.spec, step_count);
            if step_count < approx.min_nodes {
                let mut solver = CdclSolver::new(base.total_vars());
                base.emit_structural_clauses(&mut solver);
                base.activate_all_minterms(&mut solver);
                match solver.solve(self.spec.options.conflict_limit) {
                    SolveResult::Sat => return self.verify(base.decode_chain(&solver)),
                    SolveResult::Unsat => {
                        step_count += 1;
                        continue;
                    }
                    SolveResult::Timeout => {
                        return Err(SynthesisError::Timeout { step_count })
                    }
                }
            }
            let mut approx_enc = ApproxEncoder::new(&mut base);
            let mut solver = CdclSolver::new(approx_enc.total_vars());
            approx_enc.emit_structural_clauses(&mut solver);
            approx_enc.activate_all_minterms(&mut solver);
            match solver.solve(self.spec.options.conflict_limit) {
                SolveResult::Sat => {
                    trace!(verbosity, 1, "# approx sat at {} steps", step_count);
                    return Ok(approx_enc.decode_chain(&solver));
                }
                SolveResult::Unsat => step_count += 1,
                SolveResult::Timeout => return Err(SynthesisError::Timeout { step_count }),
            }
        }
    }

    /// When every output is trivial (a constant or a bare primary input),
    /// wire each output directly to the constant line or the matching PI
    /// and return a zero-step chain without ever constructing an encoder
    /// or solver.
    fn trivial_chain(&self) -> SynthResult<Chain> {
        let mut chain = Chain::new(self.spec.num_vars(), self.spec.num_outputs());
        for h in 0..self.spec.num_outputs() {
            let lit = Self::trivial_literal(&self.spec.functions()[h], self.spec.num_vars())
                .ok_or_else(|| {
                    SynthesisError::SpecificationInvalid(format!(
                        "output {} is marked trivial but is neither constant nor a bare primary input",
                        h
                    ))
                })?;
            chain.set_output(h, lit);
        }
        self.verify(chain)
    }

    /// `(global_line << 1) | polarity` for a function that is exactly a
    /// constant or a (possibly inverted) single primary input, or `None`
    /// if it is neither.
    fn trivial_literal(f: &TruthTable, num_vars: usize) -> Option<usize> {
        let ones = f.count_ones();
        if ones == 0 {
            return Some(Chain::const_line() << 1);
        }
        if ones == f.size() {
            return Some((Chain::const_line() << 1) | 1);
        }
        for v in 0..num_vars {
            let proj = TruthTable::projection(num_vars, v);
            if *f == proj {
                return Some((v + 1) << 1);
            }
            if *f == proj.invert() {
                return Some(((v + 1) << 1) | 1);
            }
        }
        None
    }

    /// Plain and CEGAR modes: grow a flat step count from
    /// `options.initial_steps` to `options.step_cap`.
    fn synthesize_flat(&self) -> SynthResult<Chain> {
        let verbosity = self.spec.options.verbosity;
        let mut state = DriverState::Encode {
            step_count: self.spec.options.initial_steps,
        };
        loop {
            state = match state {
                DriverState::Encode { step_count } => {
                    trace!(verbosity, 1, "# encoding at {} steps", step_count);
                    if step_count > self.spec.options.step_cap {
                        DriverState::Done(Err(SynthesisError::Unsynthesizable {
                            step_cap: self.spec.options.step_cap,
                        }))
                    } else if self.spec.options.use_cegar {
                        DriverState::CegarSolve { step_count }
                    } else {
                        DriverState::Solve { step_count }
                    }
                }
                DriverState::Solve { step_count } => {
                    let mut encoder = M3igEncoder::new(self.spec, step_count);
                    let mut solver = CdclSolver::new(encoder.total_vars());
                    encoder.emit_structural_clauses(&mut solver);
                    encoder.activate_all_minterms(&mut solver);
                    match solver.solve(self.spec.options.conflict_limit) {
                        SolveResult::Sat => {
                            let chain = encoder.decode_chain(&solver);
                            trace!(verbosity, 1, "# sat at {} steps", step_count);
                            DriverState::Done(self.verify(chain))
                        }
                        SolveResult::Unsat => DriverState::Grow { step_count },
                        SolveResult::Timeout => {
                            DriverState::Done(Err(SynthesisError::Timeout { step_count }))
                        }
                    }
                }
                DriverState::CegarSolve { step_count } => {
                    DriverState::Done(self.run_cegar(step_count, None))
                }
                DriverState::Grow { step_count } => {
                    trace!(verbosity, 1, "# unsat at {} steps, growing", step_count);
                    DriverState::Encode {
                        step_count: step_count + 1,
                    }
                }
                DriverState::Done(result) => return result,
            };
        }
    }

    /// Fence and CEGAR+fence modes: walk fences in increasing step-count
    /// order instead of a flat count.
    fn synthesize_with_fence(&self) -> SynthResult<Chain> {
        let verbosity = self.spec.options.verbosity;
        let enumerator = FenceEnumerator::new(self.spec.num_nontriv(), 3);
        let mut iterations = 0usize;
        for fence in enumerator.stream(self.spec.options.initial_steps) {
            if fence.step_count() > self.spec.options.step_cap {
                break;
            }
            iterations += 1;
            trace!(
                verbosity,
                1,
                "# trying fence with {} steps ({} levels)",
                fence.step_count(),
                fence.nr_levels()
            );
            let result = if self.spec.options.use_cegar {
                self.run_cegar(fence.step_count(), Some(fence.clone()))
            } else {
                let mut encoder = M3igEncoder::with_fence(self.spec, fence.clone());
                let mut solver = CdclSolver::new(encoder.total_vars());
                encoder.emit_structural_clauses(&mut solver);
                encoder.activate_all_minterms(&mut solver);
                match solver.solve(self.spec.options.conflict_limit) {
                    SolveResult::Sat => self.verify(encoder.decode_chain(&solver)),
                    SolveResult::Unsat => continue,
                    SolveResult::Timeout => {
                        Err(SynthesisError::Timeout {
                            step_count: fence.step_count(),
                        })
                    }
                }
            };
            match result {
                Ok(chain) => return Ok(chain),
                Err(SynthesisError::Unsynthesizable { .. }) => continue,
                Err(other) => return Err(other),
            }
        }
        let _ = iterations;
        Err(SynthesisError::Unsynthesizable {
            step_cap: self.spec.options.step_cap,
        })
    }

    /// Counterexample-guided clause growth at a fixed step count: start
    /// with one minterm activated, repeatedly
    /// solve and activate the first disagreeing minterm, up to
    /// `options.cegar_iteration_cap` rounds before giving up on this step
    /// count (the caller grows and retries).
    fn run_cegar(
        &self,
        step_count: usize,
        fence: Option<crate::fence::Fence>,
    ) -> SynthResult<Chain> {
        let verbosity = self.spec.options.verbosity;
        let mut encoder = match fence {
            Some(f) => M3igEncoder::with_fence(self.spec, f),
            None => M3igEncoder::new(self.spec, step_count),
        };
        let mut solver = CdclSolver::new(encoder.total_vars());
        encoder.emit_structural_clauses(&mut solver);
        encoder.activate_minterm(0, &mut solver);
        for round in 0..self.spec.options.cegar_iteration_cap.max(self.spec.tt_size()) {
            match solver.solve(self.spec.options.conflict_limit) {
                SolveResult::Sat => {
                    let candidate = encoder.decode_chain(&solver);
                    match encoder::counterexample(self.spec, &candidate) {
                        None => {
                            trace!(
                                verbosity,
                                1,
                                "# cegar converged at {} steps after {} rounds",
                                step_count,
                                round + 1
                            );
                            return self.verify(candidate);
                        }
                        Some(t) => {
                            trace!(verbosity, 2, "# cegar counterexample at minterm {}", t);
                            encoder.activate_minterm(t, &mut solver);
                        }
                    }
                }
                SolveResult::Unsat => {
                    return Err(SynthesisError::Unsynthesizable {
                        step_cap: step_count,
                    })
                }
                SolveResult::Timeout => {
                    return Err(SynthesisError::Timeout { step_count });
                }
            }
        }
        Err(SynthesisError::Unsynthesizable {
            step_cap: step_count,
        })
    }

    fn verify(&self, chain: Chain) -> SynthResult<Chain> {
        if chain.satisfies(self.spec) {
            Ok(chain)
        } else {
            Err(SynthesisError::ChainVerificationFailure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesisOptions;
    use crate::truth_table::TruthTable;

    #[test]
    fn plain_mode_synthesizes_and_of_3() {
        let f = TruthTable::from_value(3, 0x80);
        let mut options = SynthesisOptions::default();
        options.step_cap = 5;
        let spec = Specification::from_truth_tables(3, vec![f], options).unwrap();
        let chain = SynthesisDriver::new(&spec).synthesize().unwrap();
        assert!(chain.satisfies(&spec));
    }

    #[test]
    fn cegar_mode_synthesizes_xor_of_3() {
        let f = TruthTable::from_value(3, 0x96);
        let mut options = SynthesisOptions::default();
        options.use_cegar = true;
        options.step_cap = 5;
        let spec = Specification::from_truth_tables(3, vec![f], options).unwrap();
        let chain = SynthesisDriver::new(&spec).synthesize().unwrap();
        assert!(chain.satisfies(&spec));
    }

    #[test]
    fn fence_mode_synthesizes_and_of_3() {
        let f = TruthTable::from_value(3, 0x80);
        let mut options = SynthesisOptions::default();
        options.use_fence = true;
        options.step_cap = 5;
        let spec = Specification::from_truth_tables(3, vec![f], options).unwrap();
        let chain = SynthesisDriver::new(&spec).synthesize().unwrap();
        assert!(chain.satisfies(&spec));
    }

    #[test]
    fn all_trivial_outputs_skip_the_solver_entirely() {
        // output 0 is constant 0, output 1 is bare PI `b` (var index 1).
        let const0 = TruthTable::zero(3);
        let bare_b = TruthTable::projection(3, 1);
        let spec = Specification::new(
            3,
            vec![const0, bare_b],
            vec![false, false],
            vec![true, true],
            SynthesisOptions::default(),
        )
        .unwrap();
        let chain = SynthesisDriver::new(&spec).synthesize().unwrap();
        assert_eq!(chain.num_steps(), 0);
        assert!(chain.satisfies(&spec));
    }

    #[test]
    fn approx_mode_is_reachable_through_the_driver() {
        use crate::config::ApproxOptions;
        let f = TruthTable::from_value(3, 0x96); // XOR(a,b,c)
        let mut options = SynthesisOptions::default();
        options.step_cap = 3;
        options.approx = Some(ApproxOptions {
            error_distance: 2,
            min_nodes: 0,
            allow_projection: false,
            projection_interlock: crate::config::ProjectionInterlock::ProjectionFlagOnly,
        });
        let spec = Specification::from_truth_tables(3, vec![f], options).unwrap();
        let chain = SynthesisDriver::new(&spec).synthesize().unwrap();
        let realized = &chain.simulate()[0];
        let f = &spec.functions()[0];
        let mismatches = (0..spec.tt_size())
            .filter(|&t| realized.bit(t + 1) != f.bit(t + 1))
            .count();
        assert!(mismatches <= 2);
    }

    #[test]
    fn unreachable_step_cap_reports_unsynthesizable() {
        let f = TruthTable::from_value(3, 0x96); // XOR(a,b,c) needs 3 steps
        let mut options = SynthesisOptions::default();
        options.step_cap = 1;
        let spec = Specification::from_truth_tables(3, vec![f], options).unwrap();
        let err = SynthesisDriver::new(&spec).synthesize().unwrap_err();
        assert!(matches!(err, SynthesisError::Unsynthesizable { step_cap: 1 }));
    }
}
