//! `SelectionCatalogue`: the bijection between selection-variable indices
//! and the `(step, j, k, l)` fan-in triples they mean.
//!
//! For step `i`, enumerates all 3-combinations of `{0, ..., num_vars + i}`
//! (`num_vars + i + 1` candidate lines: the constant-0 line, the
//! `num_vars` primary inputs, and the `i` preceding steps) and numbers
//! them consecutively, grouped by step.

/// One structural choice: step `i` reads fan-ins `j < k < l`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Selection {
    pub step: usize,
    pub j: usize,
    pub k: usize,
    pub l: usize,
}

/// Enumerates every valid `(i, j, k, l)` for `(num_steps, num_vars)` and
/// numbers them consecutively starting from 0, grouped by `i`, so that
/// the variables belonging to one step form a contiguous range.
#[derive(Clone, Debug)]
pub struct SelectionCatalogue {
    num_vars: usize,
    /// `offsets[i]` is the first catalogue index belonging to step `i`;
    /// `offsets[num_steps]` is the total count.
    offsets: Vec<usize>,
    entries: Vec<Selection>,
}

impl SelectionCatalogue {
    pub fn new(num_steps: usize, num_vars: usize) -> Self {
        let mut offsets = Vec::with_capacity(num_steps + 1);
        let mut entries = Vec::new();
        offsets.push(0);
        for i in 0..num_steps {
            let total_lines = num_vars + 1 + i; // lines 0..=num_vars+i
            for l in 0..total_lines {
                for k in 0..l {
                    for j in 0..k {
                        entries.push(Selection { step: i, j, k, l });
                    }
                }
            }
            offsets.push(entries.len());
        }
        SelectionCatalogue {
            num_vars,
            offsets,
            entries,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_steps(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn total(&self) -> usize {
        *self.offsets.last().unwrap()
    }

    /// Number of selection choices for step `i`.
    pub fn count(&self, i: usize) -> usize {
        self.offsets[i + 1] - self.offsets[i]
    }

    /// Catalogue-wide index of step `i`'s first selection variable.
    pub fn step_offset(&self, i: usize) -> usize {
        self.offsets[i]
    }

    /// The contiguous range of catalogue indices belonging to step `i`.
    pub fn step_range(&self, i: usize) -> std::ops::Range<usize> {
        self.offsets[i]..self.offsets[i + 1]
    }

    /// Catalogue index of the selection `(i, j, k, l)`, or `None` if it
    /// isn't a valid triple for step `i`.
    pub fn index(&self, i: usize, j: usize, k: usize, l: usize) -> Option<usize> {
        self.step_range(i)
            .find(|&idx| {
                let e = &self.entries[idx];
                e.j == j && e.k == k && e.l == l
            })
    }

    /// The `(step, j, k, l)` meaning of catalogue index `idx`.
    pub fn lookup(&self, idx: usize) -> Selection {
        self.entries[idx]
    }

    pub fn entries(&self) -> &[Selection] {
        &self.entries
    }
}

fn binom3(n: usize) -> usize {
    if n < 3 {
        0
    } else {
        n * (n - 1) * (n - 2) / 6
    }
}

/// `C(num_vars + i + 1, 3)`, the closed form for `count(i)`.
pub fn expected_count(num_vars: usize, i: usize) -> usize {
    binom3(num_vars + i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_match_closed_form() {
        let cat = SelectionCatalogue::new(4, 3);
        for i in 0..4 {
            assert_eq!(cat.count(i), expected_count(3, i));
        }
    }

    #[test]
    fn ranges_are_contiguous_and_disjoint() {
        let cat = SelectionCatalogue::new(3, 3);
        let mut prev_end = 0;
        for i in 0..3 {
            let r = cat.step_range(i);
            assert_eq!(r.start, prev_end);
            prev_end = r.end;
        }
        assert_eq!(prev_end, cat.total());
    }

    #[test]
    fn index_and_lookup_round_trip() {
        let cat = SelectionCatalogue::new(2, 3);
        for idx in 0..cat.total() {
            let sel = cat.lookup(idx);
            assert_eq!(cat.index(sel.step, sel.j, sel.k, sel.l), Some(idx));
        }
    }

    #[test]
    fn first_step_never_reads_an_earlier_step() {
        let cat = SelectionCatalogue::new(1, 3);
        for sel in cat.entries() {
            assert!(sel.l <= 3); // only constant 0 and the 3 PIs exist yet
        }
    }
}
