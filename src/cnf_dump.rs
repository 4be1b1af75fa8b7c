//! Optional DIMACS CNF writer, gated off by default: the encoder builds
//! clauses straight into a [`crate::sat::SatSolverIF`] and never needs
//! this, but it's useful for handing an encoding to an external solver
//! or for offline debugging.
use std::io::{self, Write};

use crate::sat::Lit;

/// Write `clauses` (each a slice of DIMACS literals) as a DIMACS CNF
/// file with the `p cnf <vars> <clauses>` header.
pub fn write_dimacs<W: Write>(
    mut out: W,
    num_vars: usize,
    clauses: &[Vec<Lit>],
) -> io::Result<()> {
    writeln!(out, "p cnf {} {}", num_vars, clauses.len())?;
    for clause in clauses {
        for lit in clause {
            write!(out, "{} ", lit)?;
        }
        writeln!(out, "0")?;
    }
    Ok(())
}

/// A [`crate::sat::SatSolverIF`] that records every clause it's handed
/// instead of solving anything, so the encoder can be pointed at it to
/// capture a CNF dump without touching the real solver backend.
#[derive(Default)]
pub struct CnfRecorder {
    num_vars: usize,
    clauses: Vec<Vec<Lit>>,
}

impl CnfRecorder {
    pub fn new() -> Self {
        CnfRecorder::default()
    }

    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    pub fn write_to<W: Write>(&self, out: W) -> io::Result<()> {
        write_dimacs(out, self.num_vars, &self.clauses)
    }
}

impl crate::sat::SatSolverIF for CnfRecorder {
    fn reset_with_vars(&mut self, num_vars: usize) {
        self.num_vars = num_vars;
        self.clauses.clear();
    }

    fn add_clause(&mut self, lits: &[Lit]) -> bool {
        self.clauses.push(lits.to_vec());
        true
    }

    fn solve(&mut self, _conflict_limit: usize) -> crate::sat::SolveResult {
        crate::sat::SolveResult::Timeout
    }

    fn value(&self, _v: usize) -> bool {
        false
    }

    fn num_vars(&self) -> usize {
        self.num_vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesisOptions;
    use crate::encoder::M3igEncoder;
    use crate::sat::SatSolverIF;
    use crate::spec::Specification;
    use crate::truth_table::TruthTable;

    #[test]
    fn recorder_captures_every_emitted_clause() {
        let f = TruthTable::from_value(3, 0x80);
        let spec =
            Specification::from_truth_tables(3, vec![f], SynthesisOptions::default()).unwrap();
        let mut encoder = M3igEncoder::new(&spec, 2);
        let mut recorder = CnfRecorder::new();
        recorder.reset_with_vars(encoder.total_vars());
        encoder.emit_structural_clauses(&mut recorder);
        encoder.activate_all_minterms(&mut recorder);
        assert!(!recorder.clauses().is_empty());
        let mut buf = Vec::new();
        recorder.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("p cnf"));
        assert_eq!(
            text.lines().count(),
            recorder.clauses().len() + 1
        );
    }
}
