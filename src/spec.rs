//! `Specification`: the read-only problem description a synthesis run is
//! built from.
use crate::config::SynthesisOptions;
use crate::error::{SynthResult, SynthesisError};
use crate::truth_table::TruthTable;

/// A synthesis problem: target functions plus the flags controlling how
/// the encoder and driver search for a chain that realizes them.
///
/// Constructed once by the caller and treated as read-only by the core;
/// safe to share across threads without locking, since nothing here is
/// ever mutated after construction.
#[derive(Clone, Debug)]
pub struct Specification {
    num_vars: usize,
    functions: Vec<TruthTable>,
    out_inv_mask: Vec<bool>,
    triv_flag_mask: Vec<bool>,
    pub options: SynthesisOptions,
}

impl Specification {
    /// Build a specification from target functions and explicit
    /// polarity/triviality masks.
    ///
    /// # Errors
    ///
    /// `SpecificationInvalid` if `num_vars < 3`, any function's width
    /// doesn't match `num_vars`, the mask lengths don't match
    /// `functions.len()`, or a function marked non-trivial is actually a
    /// constant.
    pub fn new(
        num_vars: usize,
        functions: Vec<TruthTable>,
        out_inv_mask: Vec<bool>,
        triv_flag_mask: Vec<bool>,
        options: SynthesisOptions,
    ) -> SynthResult<Self> {
        if num_vars < 3 {
            return Err(SynthesisError::SpecificationInvalid(format!(
                "num_vars must be >= 3, got {}",
                num_vars
            )));
        }
        if out_inv_mask.len() != functions.len() || triv_flag_mask.len() != functions.len() {
            return Err(SynthesisError::SpecificationInvalid(
                "mask length must match the number of output functions".to_string(),
            ));
        }
        for f in &functions {
            if f.num_vars() != num_vars {
                return Err(SynthesisError::SpecificationInvalid(format!(
                    "function has {} variables, specification has {}",
                    f.num_vars(),
                    num_vars
                )));
            }
        }
        for (h, f) in functions.iter().enumerate() {
            let is_constant = f.count_ones() == 0 || f.count_ones() == f.size();
            if is_constant && !triv_flag_mask[h] {
                return Err(SynthesisError::SpecificationInvalid(format!(
                    "output {} is constant but not marked trivial",
                    h
                )));
            }
        }
        Ok(Specification {
            num_vars,
            functions,
            out_inv_mask,
            triv_flag_mask,
            options,
        })
    }

    /// Build a specification where the caller supplies only the target
    /// functions; triviality (constant, or equal to a single-variable
    /// projection) and output polarity are both detected automatically.
    ///
    /// Polarity is derived as `functions[h].bit(0)`: every normalized
    /// chain's base lines (the constant line and every primary input)
    /// have row 0 equal to `false`, and majority-with-at-most-one-
    /// inverted-fan-in preserves row 0 through every synthesized step, so
    /// a chain can only ever realize a function whose row 0 matches its
    /// output's polarity bit. Callers needing an explicit polarity mask
    /// should use [`Specification::new`].
    pub fn from_truth_tables(
        num_vars: usize,
        functions: Vec<TruthTable>,
        options: SynthesisOptions,
    ) -> SynthResult<Self> {
        let triv_flag_mask = functions
            .iter()
            .map(|f| Self::is_trivial(f))
            .collect::<Vec<_>>();
        let out_inv_mask = functions.iter().map(|f| f.bit(0)).collect::<Vec<_>>();
        Specification::new(num_vars, functions, out_inv_mask, triv_flag_mask, options)
    }

    fn is_trivial(f: &TruthTable) -> bool {
        let ones = f.count_ones();
        if ones == 0 || ones == f.size() {
            return true;
        }
        (0..f.num_vars()).any(|v| *f == TruthTable::projection(f.num_vars(), v))
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Number of minterms after normalization: row 0 (all primary inputs
    /// zero) is excluded, since every normalized chain fixes it to the
    /// constant line.
    pub fn tt_size(&self) -> usize {
        (1usize << self.num_vars) - 1
    }

    pub fn num_outputs(&self) -> usize {
        self.functions.len()
    }

    pub fn functions(&self) -> &[TruthTable] {
        &self.functions
    }

    pub fn out_inv(&self, h: usize) -> bool {
        self.out_inv_mask[h]
    }

    pub fn is_trivial_output(&self, h: usize) -> bool {
        self.triv_flag_mask[h]
    }

    pub fn num_nontriv(&self) -> usize {
        self.triv_flag_mask.iter().filter(|t| !**t).count()
    }

    pub fn num_triv(&self) -> usize {
        self.triv_flag_mask.iter().filter(|t| **t).count()
    }

    /// Indices of the non-trivial outputs, in their original order; this
    /// is the order `OutputWiringVar`'s `h` index ranges over.
    pub fn nontriv_indices(&self) -> Vec<usize> {
        (0..self.functions.len())
            .filter(|h| !self.triv_flag_mask[*h])
            .collect()
    }

    /// Bit `t` (`t` in `[0, tt_size)`, corresponding to minterm `t + 1`)
    /// of non-trivial output `h`'s target function, with output inversion
    /// applied.
    pub fn spec_bit(&self, h: usize, t: usize) -> bool {
        self.functions[h].bit(t + 1) ^ self.out_inv_mask[h]
    }

    /// All variable pairs `(p, q)` such that swapping `p` and `q` in every
    /// target function leaves it fixed; the precomputation the `symvar`
    /// symmetry-breaking option consumes, computed once rather than asked
    /// of the caller.
    pub fn npn_symmetric_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for p in 0..self.num_vars {
            for q in (p + 1)..self.num_vars {
                if self.functions.iter().all(|f| Self::is_symmetric_in(f, p, q)) {
                    pairs.push((p, q));
                }
            }
        }
        pairs
    }

    fn is_symmetric_in(f: &TruthTable, p: usize, q: usize) -> bool {
        for t in 0..f.size() {
            let bp = (t >> p) & 1;
            let bq = (t >> q) & 1;
            if bp == bq {
                continue;
            }
            let swapped = (t & !(1 << p) & !(1 << q)) | (bq << p) | (bp << q);
            if f.bit(t) != f.bit(swapped) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> SynthesisOptions {
        SynthesisOptions::default()
    }

    #[test]
    fn rejects_too_few_variables() {
        let f = TruthTable::from_value(2, 0b0110);
        let err = Specification::new(2, vec![f], vec![false], vec![false], opts());
        assert!(err.is_err());
    }

    #[test]
    fn rejects_unmarked_constant_output() {
        let f = TruthTable::zero(3);
        let err = Specification::new(3, vec![f], vec![false], vec![false], opts());
        assert!(matches!(
            err,
            Err(SynthesisError::SpecificationInvalid(_))
        ));
    }

    #[test]
    fn accepts_marked_constant_output() {
        let f = TruthTable::zero(3);
        let spec = Specification::new(3, vec![f], vec![false], vec![true], opts()).unwrap();
        assert_eq!(spec.num_triv(), 1);
        assert_eq!(spec.num_nontriv(), 0);
    }

    #[test]
    fn maj5_is_symmetric_in_every_pair() {
        // MAJ_5 = 0xFFFE8008, symmetric in all variable pairs.
        let f = TruthTable::from_bits(5, &{
            let mut v = vec![false; 32];
            let bits = 0xFFFE_8008u32;
            for (t, slot) in v.iter_mut().enumerate() {
                *slot = (bits >> t) & 1 == 1;
            }
            v
        });
        let spec = Specification::from_truth_tables(5, vec![f], opts()).unwrap();
        assert_eq!(spec.npn_symmetric_pairs().len(), 10); // C(5,2)
    }

    #[test]
    fn from_truth_tables_detects_projection() {
        // tt for "just variable 1": bit t equals (t >> 1) & 1.
        let bits: Vec<bool> = (0..8).map(|t| (t >> 1) & 1 == 1).collect();
        let f = TruthTable::from_bits(3, &bits);
        let spec = Specification::from_truth_tables(3, vec![f], opts()).unwrap();
        assert_eq!(spec.num_triv(), 1);
    }
}
