/*!
# m3ig-synth

Exact (and bounded-approximate) SAT-based synthesis of size-optimal
combinational circuits built entirely from 3-input majority gates with
free input inversion (a "M3IG" / majority-inverter graph, the gate
library MIG-based and approximate-computing logic synthesis tools
target). Given one or more target Boolean functions as truth tables,
a [`driver::SynthesisDriver`] searches for the smallest straight-line
[`chain::Chain`] of majority steps that realizes them exactly, or,
with [`config::ApproxOptions`], within a bounded total output error.

## Usage

```no_run
use m3ig_synth::config::SynthesisOptions;
use m3ig_synth::driver::SynthesisDriver;
use m3ig_synth::spec::Specification;
use m3ig_synth::truth_table::TruthTable;

let and3 = TruthTable::from_value(3, 0x80);
let mut options = SynthesisOptions::default();
options.step_cap = 6;
let spec = Specification::from_truth_tables(3, vec![and3], options).unwrap();
let chain = SynthesisDriver::new(&spec).synthesize().unwrap();
assert!(chain.satisfies(&spec));
```

## Search strategy

The encoder (`encoder`) builds a CNF over per-step gate-selection,
operation, and per-minterm simulation variables (Tseitin-style, see
`encoder::emit_guarded_maj_eq`), optionally restricted to a level-bounded
"fence" (`fence`) and optionally grown counterexample-by-counterexample
(CEGAR) instead of activating every minterm eagerly, trading a larger
number of small solves for a smaller one-shot encoding. A CDCL SAT
engine (`sat`) with either a VSIDS or static decision heuristic backs
both the flat single-threaded driver and a `parallel` multi-worker
fence sweep.
*/
/// Error types shared by every fallible operation in this crate.
pub mod error;

/// Wire-format-independent Boolean function representation.
pub mod truth_table;

/// Synthesis run configuration: search strategy, caps, and the
/// approximate-computing relaxation.
pub mod config;

/// The target: one or more truth tables plus their trivial/projection
/// shortcuts and output polarities.
pub mod spec;

/// The catalogue of `(l, k, j)` candidate fan-in triples a step may
/// select from, and the symmetry-breaking order over it.
pub mod selection;

/// Level-profile ("fence") enumeration for depth-bounded search.
pub mod fence;

/// The synthesized result: a flat, indexable straight-line program of
/// majority steps plus output wiring.
pub mod chain;

/// A small CDCL SAT engine: CNF clauses, unit propagation, first-UIP
/// conflict analysis, and pluggable decision heuristics.
pub mod sat;

/// Translates a [`spec::Specification`] into CNF over a [`sat::SatSolverIF`]
/// and decodes a satisfying assignment back into a [`chain::Chain`].
pub mod encoder;

/// Grows step count (and, in fence mode, the fence) until the encoder
/// finds a chain or the configured cap is exhausted.
pub mod driver;

/// Multi-worker CEGAR+fence search racing independent SAT engines.
pub mod parallel;

/// The seam between a synthesized [`chain::Chain`] and a host
/// application's own logic-network data structure.
pub mod network;

/// Optional DIMACS CNF export of an encoding, for handing off to an
/// external solver or offline debugging.
pub mod cnf_dump;
