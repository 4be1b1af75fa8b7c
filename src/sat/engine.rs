//! `Engine<H>`: the shared CDCL core both solver backends are built
//! from — trail/decision-level bookkeeping, first-UIP clause-learning
//! analysis, non-chronological backjump, all on top of a plain
//! fixed-point scan over the clause database rather than a
//! watched-literal, heap-scheduled propagation loop. This crate's
//! instances stay small (synthesis encodings over a few thousand
//! variables, not SAT-competition benchmarks), so the simpler O(clauses)
//! propagation pass is the right trade against the bookkeeping a full
//! two-watched-literal scheme would add.
use super::heuristics::DecisionHeuristic;
use super::{Lit, SatSolverIF, SolveResult};

#[derive(Clone, Debug)]
struct Clause {
    lits: Vec<Lit>,
}

/// A CDCL SAT engine parameterized by its decision heuristic. See
/// [`super::CdclSolver`] (VSIDS) and [`super::BitParallelSolver`] (static
/// order) for the two instantiations the rest of the crate uses.
#[derive(Clone, Debug)]
pub struct Engine<H: DecisionHeuristic> {
    num_vars: usize,
    clauses: Vec<Clause>,
    assignment: Vec<Option<bool>>,
    level: Vec<i32>,
    reason: Vec<Option<usize>>,
    trail: Vec<Lit>,
    trail_lim: Vec<usize>,
    decision_level: usize,
    ok: bool,
    heuristic: H,
}

impl<H: DecisionHeuristic> Engine<H> {
    pub fn new(num_vars: usize) -> Self {
        let mut engine = Engine {
            num_vars: 0,
            clauses: Vec::new(),
            assignment: Vec::new(),
            level: Vec::new(),
            reason: Vec::new(),
            trail: Vec::new(),
            trail_lim: Vec::new(),
            decision_level: 0,
            ok: true,
            heuristic: H::new(0),
        };
        engine.reset_with_vars(num_vars);
        engine
    }

    fn value_of_lit(&self, l: Lit) -> Option<bool> {
        let v = super::var_of(l);
        self.assignment[v].map(|val| val == super::is_pos(l))
    }

    fn enqueue(&mut self, lit: Lit, reason: Option<usize>) {
        let v = super::var_of(lit);
        self.assignment[v] = Some(super::is_pos(lit));
        self.level[v] = self.decision_level as i32;
        self.reason[v] = reason;
        self.trail.push(lit);
    }

    fn cancel_until(&mut self, target_level: usize) {
        if self.decision_level <= target_level {
            return;
        }
        let lim = self.trail_lim[target_level];
        for i in lim..self.trail.len() {
            let v = super::var_of(self.trail[i]);
            self.assignment[v] = None;
            self.reason[v] = None;
            self.level[v] = -1;
        }
        self.trail.truncate(lim);
        self.trail_lim.truncate(target_level);
        self.decision_level = target_level;
    }

    fn store_clause(&mut self, lits: Vec<Lit>) -> usize {
        let idx = self.clauses.len();
        self.clauses.push(Clause { lits });
        idx
    }

    /// Fixed-point unit propagation: repeatedly scan every clause, assign
    /// any clause's single remaining unassigned literal, until either a
    /// full pass makes no progress (returns `None`) or a clause is found
    /// fully falsified (returns that clause's index).
    fn propagate(&mut self) -> Option<usize> {
        loop {
            let mut progressed = false;
            for ci in 0..self.clauses.len() {
                let mut satisfied = false;
                let mut unassigned_count = 0;
                let mut unassigned_lit = 0 as Lit;
                for &l in &self.clauses[ci].lits {
                    match self.value_of_lit(l) {
                        Some(true) => {
                            satisfied = true;
                            break;
                        }
                        Some(false) => {}
                        None => {
                            unassigned_count += 1;
                            unassigned_lit = l;
                        }
                    }
                }
                if satisfied {
                    continue;
                }
                if unassigned_count == 0 {
                    return Some(ci);
                }
                if unassigned_count == 1 {
                    self.enqueue(unassigned_lit, Some(ci));
                    progressed = true;
                }
            }
            if !progressed {
                return None;
            }
        }
    }

    /// First-UIP conflict analysis: walk the trail backward from the
    /// conflicting clause, resolving away every
    /// literal assigned at the current decision level until exactly one
    /// remains, which becomes the asserting literal of the learned clause.
    fn analyze(&mut self, conflicting: usize) -> (Vec<Lit>, usize) {
        let mut seen = vec![false; self.num_vars];
        let mut out_learnt: Vec<Lit> = vec![0];
        let mut path_count = 0i32;
        let mut p: Option<Lit> = None;
        let mut index = self.trail.len();
        let mut confl = conflicting;
        loop {
            let lits = self.clauses[confl].lits.clone();
            for &q in &lits {
                if Some(q) == p {
                    continue;
                }
                let v = super::var_of(q);
                if !seen[v] && self.level[v] > 0 {
                    seen[v] = true;
                    self.heuristic.bump(v);
                    if self.level[v] as usize >= self.decision_level {
                        path_count += 1;
                    } else {
                        out_learnt.push(q);
                    }
                }
            }
            loop {
                index -= 1;
                if seen[super::var_of(self.trail[index])] {
                    break;
                }
            }
            let pl = self.trail[index];
            seen[super::var_of(pl)] = false;
            p = Some(pl);
            path_count -= 1;
            if path_count <= 0 {
                break;
            }
            confl = self.reason[super::var_of(pl)]
                .expect("every trail literal with a remaining path must be an implication");
        }
        out_learnt[0] = -p.expect("conflict analysis always identifies an asserting literal");
        let btlevel = out_learnt[1..]
            .iter()
            .map(|&l| self.level[super::var_of(l)] as usize)
            .max()
            .unwrap_or(0);
        (out_learnt, btlevel)
    }

    fn add_learnt_and_assert(&mut self, learnt: Vec<Lit>) {
        let asserted = learnt[0];
        if learnt.len() == 1 {
            self.cancel_until(0);
            let ci = self.store_clause(learnt);
            self.enqueue(asserted, Some(ci));
        } else {
            let ci = self.store_clause(learnt);
            self.enqueue(asserted, Some(ci));
        }
    }
}

impl<H: DecisionHeuristic> SatSolverIF for Engine<H> {
    fn reset_with_vars(&mut self, num_vars: usize) {
        self.num_vars = num_vars;
        self.clauses.clear();
        self.assignment = vec![None; num_vars];
        self.level = vec![-1; num_vars];
        self.reason = vec![None; num_vars];
        self.trail.clear();
        self.trail_lim.clear();
        self.decision_level = 0;
        self.ok = true;
        self.heuristic = H::new(num_vars);
    }

    fn add_clause(&mut self, lits: &[Lit]) -> bool {
        if !self.ok {
            return false;
        }
        if self.decision_level > 0 {
            self.cancel_until(0);
        }
        let mut lits: Vec<Lit> = lits.to_vec();
        lits.sort_unstable_by_key(|l| l.unsigned_abs());
        lits.dedup();
        for w in lits.windows(2) {
            if w[0] == -w[1] {
                return true; // tautology, trivially satisfied
            }
        }
        let mut out = Vec::with_capacity(lits.len());
        for &l in &lits {
            match self.value_of_lit(l) {
                Some(true) => return true,
                Some(false) => {}
                None => out.push(l),
            }
        }
        if out.is_empty() {
            self.ok = false;
            return false;
        }
        if out.len() == 1 {
            let unit = out[0];
            let ci = self.store_clause(out);
            self.enqueue(unit, Some(ci));
            if self.propagate().is_some() {
                self.ok = false;
                return false;
            }
            return true;
        }
        self.store_clause(out);
        true
    }

    fn solve(&mut self, conflict_limit: usize) -> SolveResult {
        if !self.ok {
            return SolveResult::Unsat;
        }
        let mut conflicts = 0usize;
        loop {
            match self.propagate() {
                Some(confl) => {
                    if self.decision_level == 0 {
                        self.ok = false;
                        return SolveResult::Unsat;
                    }
                    conflicts += 1;
                    if conflict_limit != 0 && conflicts > conflict_limit {
                        self.cancel_until(0);
                        return SolveResult::Timeout;
                    }
                    let (learnt, btlevel) = self.analyze(confl);
                    self.cancel_until(btlevel);
                    self.add_learnt_and_assert(learnt);
                    self.heuristic.decay();
                }
                None => match self.heuristic.pick(&self.assignment) {
                    None => return SolveResult::Sat,
                    Some(v) => {
                        self.decision_level += 1;
                        self.trail_lim.push(self.trail.len());
                        self.enqueue(super::pos_lit(v), None);
                    }
                },
            }
        }
    }

    fn value(&self, v: usize) -> bool {
        self.assignment[v].unwrap_or(false)
    }

    fn num_vars(&self) -> usize {
        self.num_vars
    }
}

#[cfg(test)]
mod tests {
    use super::super::{neg_lit, pos_lit, CdclSolver};
    use super::*;

    #[test]
    fn reset_clears_prior_clauses() {
        let mut s = CdclSolver::new(1);
        assert!(s.add_clause(&[pos_lit(0)]));
        assert!(!s.add_clause(&[neg_lit(0)]));
        s.reset_with_vars(1);
        assert!(s.add_clause(&[neg_lit(0)]));
        assert_eq!(s.solve(0), SolveResult::Sat);
        assert!(!s.value(0));
    }

    #[test]
    fn unit_propagation_resolves_a_chain_of_implications() {
        let mut s = CdclSolver::new(3);
        assert!(s.add_clause(&[pos_lit(0)]));
        assert!(s.add_clause(&[neg_lit(0), pos_lit(1)]));
        assert!(s.add_clause(&[neg_lit(1), pos_lit(2)]));
        assert_eq!(s.solve(0), SolveResult::Sat);
        assert!(s.value(0) && s.value(1) && s.value(2));
    }
}
