//! Parallel CEGAR+fence driver (spec.md §4.8, §5): one producer thread
//! streams fences in increasing step-count order onto a bounded
//! crossbeam channel, and a pool of worker threads each pull a fence,
//! run a short-conflict-budget CEGAR attempt against their own
//! [`BitParallelSolver`], and race to publish the first chain found.
//!
//! Grounded on the concurrency suggestion in spec.md §9 ("crossbeam
//! channel or lock-free deque") and on the other pack repos that already
//! depend on `crossbeam` for bounded MPMC work distribution (this crate
//! carries `crossbeam-channel` for exactly this). `std::thread::scope`
//! gives every worker borrowed access to `spec` without an `Arc`, the
//! same "treat the specification as shared read-only state" contract
//! spec.md §5 describes.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;

use crate::chain::Chain;
use crate::encoder::{self, M3igEncoder};
use crate::error::{SynthResult, SynthesisError};
use crate::fence::{Fence, FenceEnumerator};
use crate::sat::{BitParallelSolver, SatSolverIF, SolveResult};
use crate::spec::Specification;

pub fn synthesize_parallel(spec: &Specification) -> SynthResult<Chain> {
    let num_workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .clamp(1, 8);
    let (tx, rx) = crossbeam_channel::bounded::<Fence>(num_workers * 2);
    let found = AtomicBool::new(false);
    let outcome: Mutex<Option<SynthResult<Chain>>> = Mutex::new(None);

    thread::scope(|scope| {
        scope.spawn(|| {
            let enumerator = FenceEnumerator::new(spec.num_nontriv(), 3);
            for fence in enumerator.stream(spec.options.initial_steps) {
                if found.load(Ordering::SeqCst) || fence.step_count() > spec.options.step_cap {
                    break;
                }
                if tx.send(fence).is_err() {
                    break;
                }
            }
            // tx is dropped here as the closure ends, closing the
            // channel so idle workers' `recv` calls return `Err`.
        });

        for _ in 0..num_workers {
            let rx = rx.clone();
            let found = &found;
            let outcome = &outcome;
            scope.spawn(move || {
                while let Ok(fence) = rx.recv() {
                    if found.load(Ordering::SeqCst) {
                        break;
                    }
                    match try_fence(spec, fence) {
                        Ok(chain) => {
                            found.store(true, Ordering::SeqCst);
                            let mut guard = outcome.lock().unwrap();
                            if guard.is_none() {
                                *guard = Some(Ok(chain));
                            }
                            break;
                        }
                        Err(SynthesisError::Unsynthesizable { .. })
                        | Err(SynthesisError::Timeout { .. }) => continue,
                        Err(other) => {
                            let mut guard = outcome.lock().unwrap();
                            if guard.is_none() {
                                *guard = Some(Err(other));
                            }
                        }
                    }
                }
            });
        }
    });

    outcome.into_inner().unwrap().unwrap_or(Err(SynthesisError::Unsynthesizable {
        step_cap: spec.options.step_cap,
    }))
}

/// One worker's CEGAR attempt at a single fence, bounded by
/// `options.parallel_conflict_limit` per `solve` call (spec.md §4.8:
/// workers favor throughput over per-call solve quality) and
/// `options.cegar_iteration_cap` rounds.
fn try_fence(spec: &Specification, fence: Fence) -> SynthResult<Chain> {
    let step_count = fence.step_count();
    let mut encoder = M3igEncoder::with_fence(spec, fence);
    let mut solver = BitParallelSolver::new(encoder.total_vars());
    encoder.emit_structural_clauses(&mut solver);
    encoder.activate_minterm(0, &mut solver);
    for _ in 0..spec.options.cegar_iteration_cap.max(spec.tt_size()) {
        match solver.solve(spec.options.parallel_conflict_limit) {
            SolveResult::Sat => {
                let candidate = encoder.decode_chain(&solver);
                match encoder::counterexample(spec, &candidate) {
                    None => {
                        return if candidate.satisfies(spec) {
                            Ok(candidate)
                        } else {
                            Err(SynthesisError::ChainVerificationFailure)
                        };
                    }
                    Some(t) => encoder.activate_minterm(t, &mut solver),
                }
            }
            SolveResult::Unsat => {
                return Err(SynthesisError::Unsynthesizable { step_cap: step_count })
            }
            SolveResult::Timeout => return Err(SynthesisError::Timeout { step_count }),
        }
    }
    Err(SynthesisError::Unsynthesizable { step_cap: step_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesisOptions;
    use crate::truth_table::TruthTable;

    #[test]
    fn parallel_driver_synthesizes_and_of_3() {
        let f = TruthTable::from_value(3, 0x80);
        let mut options = SynthesisOptions::default();
        options.use_parallel = true;
        options.step_cap = 5;
        let spec = Specification::from_truth_tables(3, vec![f], options).unwrap();
        let chain = synthesize_parallel(&spec).unwrap();
        assert!(chain.satisfies(&spec));
    }
}
