//! Deterministic finite automata and minimization.
//!
//! A `Dfa` is an arena of states, each carrying an accept flag and its
//! outgoing transitions as ascending, pairwise disjoint byte ranges. The
//! transition function is partial: a byte not covered by any range is a
//! rejection. Two minimization algorithms are provided behind an explicit
//! selector, partition refinement (Hopcroft) and double reversal
//! (Brzozowski).

use crate::nfa::Nfa;
use crate::range::CharRange;
use crate::state::{StateId, StateSet};
use crate::subset_construction::subset_construction;
use std::collections::VecDeque;
use tracing::debug;

/// Minimization algorithm selector. Always an explicit call parameter; the
/// engine keeps no global configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Minimization {
    /// Partition refinement over atomic ranges.
    #[default]
    Hopcroft,
    /// Reverse, determinize, reverse, determinize.
    Brzozowski,
}

#[derive(Debug, Clone)]
struct DfaState {
    accept: bool,
    /// Sorted by `lo`; ranges never overlap.
    trans: Vec<(CharRange, StateId)>,
}

/// A deterministic finite automaton over byte-range labels.
#[derive(Debug, Clone)]
pub struct Dfa {
    states: Vec<DfaState>,
    start: StateId,
}

impl Dfa {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            start: 0,
        }
    }

    pub fn add_state(&mut self, accept: bool) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(DfaState {
            accept,
            trans: Vec::new(),
        });
        id
    }

    pub fn set_start(&mut self, state: StateId) {
        self.start = state;
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.states[state as usize].accept
    }

    pub fn set_accepting(&mut self, state: StateId, accept: bool) {
        self.states[state as usize].accept = accept;
    }

    /// Insert a transition, keeping the range list sorted.
    pub fn add_transition(&mut self, source: StateId, range: CharRange, destination: StateId) {
        let trans = &mut self.states[source as usize].trans;
        let at = trans.partition_point(|(r, _)| r.lo < range.lo);
        debug_assert!(trans.iter().all(|(r, _)| !r.overlaps(&range)));
        trans.insert(at, (range, destination));
    }

    pub fn transitions(&self, state: StateId) -> &[(CharRange, StateId)] {
        &self.states[state as usize].trans
    }

    /// The target reached from `state` on byte `b`, if any.
    pub fn target(&self, state: StateId, b: u8) -> Option<StateId> {
        let trans = &self.states[state as usize].trans;
        let at = trans.partition_point(|(r, _)| r.hi < b);
        match trans.get(at) {
            Some((r, t)) if r.contains(b) => Some(*t),
            _ => None,
        }
    }

    pub fn accepting_states(&self) -> StateSet {
        let mut set = StateSet::with_capacity(self.states.len());
        for (i, s) in self.states.iter().enumerate() {
            if s.accept {
                set.insert(i as StateId);
            }
        }
        set
    }

    /// Whether no accepting state is reachable from the start.
    pub fn is_empty_language(&self) -> bool {
        if self.states.is_empty() {
            return true;
        }
        let mut visited = StateSet::with_capacity(self.states.len());
        let mut queue = VecDeque::new();
        queue.push_back(self.start);
        while let Some(state) = queue.pop_front() {
            if visited.contains(state) {
                continue;
            }
            visited.insert(state);
            if self.is_accepting(state) {
                return false;
            }
            for &(_, t) in self.transitions(state) {
                if !visited.contains(t) {
                    queue.push_back(t);
                }
            }
        }
        true
    }

    fn reachable_states(&self) -> StateSet {
        let mut reachable = StateSet::with_capacity(self.states.len());
        let mut queue = VecDeque::new();
        queue.push_back(self.start);
        while let Some(state) = queue.pop_front() {
            if reachable.contains(state) {
                continue;
            }
            reachable.insert(state);
            for &(_, t) in self.transitions(state) {
                if !reachable.contains(t) {
                    queue.push_back(t);
                }
            }
        }
        reachable
    }

    /// States from which some accepting state is reachable.
    fn co_reachable_states(&self) -> StateSet {
        let mut predecessors: Vec<Vec<StateId>> = vec![Vec::new(); self.states.len()];
        for s in 0..self.states.len() as StateId {
            for &(_, t) in self.transitions(s) {
                predecessors[t as usize].push(s);
            }
        }
        let mut co = StateSet::with_capacity(self.states.len());
        let mut queue: VecDeque<StateId> = self.accepting_states().iter().collect();
        while let Some(state) = queue.pop_front() {
            if co.contains(state) {
                continue;
            }
            co.insert(state);
            for &p in &predecessors[state as usize] {
                if !co.contains(p) {
                    queue.push_back(p);
                }
            }
        }
        co
    }

    /// Drop unreachable and dead states.
    ///
    /// The start state is always kept, so the empty language trims to a
    /// single non-accepting state with no transitions. Dead-state removal is
    /// a precondition of partition refinement on partial automata: a state
    /// stepping into an explicit dead state must end up indistinguishable
    /// from one with no transition at all.
    pub fn trim(&self) -> Dfa {
        if self.states.is_empty() {
            let mut out = Dfa::new();
            let s = out.add_state(false);
            out.set_start(s);
            return out;
        }
        let reachable = self.reachable_states();
        let mut keep = reachable.intersection(&self.co_reachable_states());
        keep.insert(self.start);

        let mut remap: Vec<Option<StateId>> = vec![None; self.states.len()];
        let mut out = Dfa::new();
        for s in keep.iter() {
            remap[s as usize] = Some(out.add_state(self.is_accepting(s)));
        }
        for s in keep.iter() {
            let new_s = remap[s as usize].expect("kept state was remapped");
            for &(r, t) in self.transitions(s) {
                if let Some(new_t) = remap[t as usize] {
                    out.add_transition(new_s, r, new_t);
                }
            }
        }
        out.set_start(remap[self.start as usize].expect("start state is always kept"));
        out.merge_adjacent();
        out
    }

    /// Merge directly adjacent ranges with the same target, restoring the
    /// canonical non-adjacent form after transitions were dropped or copied.
    fn merge_adjacent(&mut self) {
        for state in &mut self.states {
            let mut merged: Vec<(CharRange, StateId)> = Vec::with_capacity(state.trans.len());
            for &(r, t) in &state.trans {
                match merged.last_mut() {
                    Some((prev, pt)) if *pt == t && prev.hi as u16 + 1 == r.lo as u16 => {
                        prev.hi = r.hi;
                    }
                    _ => merged.push((r, t)),
                }
            }
            state.trans = merged;
        }
    }

    /// Make the transition function total by routing every uncovered range to
    /// a fresh reject sink.
    pub fn totalize(&self) -> Dfa {
        let mut out = self.clone();
        let mut sink: Option<StateId> = None;
        for s in 0..out.states.len() as StateId {
            let covered: Vec<CharRange> = out.transitions(s).iter().map(|&(r, _)| r).collect();
            let missing = crate::range::complement(&covered);
            if missing.is_empty() {
                continue;
            }
            let sink_id = *sink.get_or_insert_with(|| {
                let id = out.add_state(false);
                out.add_transition(id, CharRange::full(), id);
                id
            });
            for r in missing {
                out.add_transition(s, r, sink_id);
            }
        }
        out
    }

    /// Minimize with the selected algorithm. Both algorithms yield the
    /// canonical minimal partial DFA for the language.
    pub fn minimized(&self, algorithm: Minimization) -> Dfa {
        match algorithm {
            Minimization::Hopcroft => self.minimized_hopcroft(),
            Minimization::Brzozowski => self.minimized_brzozowski(),
        }
    }

    fn minimized_brzozowski(&self) -> Dfa {
        let mid = subset_construction(Nfa::reverse_of(self));
        let out = subset_construction(Nfa::reverse_of(&mid));
        // The double determinization already merges equivalent states; the
        // trim restores the canonical single-state form for the empty
        // language and drops subsets that cannot reach acceptance.
        out.trim()
    }

    fn minimized_hopcroft(&self) -> Dfa {
        let trimmed = self.trim();
        let accepting = trimmed.accepting_states();
        if accepting.is_empty() {
            return trimmed;
        }

        let alphabet = atomic_alphabet(&[&trimmed]);
        let n = trimmed.num_states();

        // Reverse transition index per atomic symbol.
        let mut reverse: Vec<Vec<Vec<StateId>>> = vec![vec![Vec::new(); n]; alphabet.len()];
        for s in 0..n as StateId {
            for &(r, t) in trimmed.transitions(s) {
                for (sym, a) in alphabet.iter().enumerate() {
                    if r.lo <= a.lo && a.hi <= r.hi {
                        reverse[sym][t as usize].push(s);
                    }
                }
            }
        }

        // Initial partition: accepting vs non-accepting.
        let all: StateSet = (0..n as StateId).collect();
        let non_accepting = all.difference(&accepting);
        let mut partitions: Vec<StateSet> = Vec::new();
        partitions.push(accepting);
        if !non_accepting.is_empty() {
            partitions.push(non_accepting);
        }

        let mut worklist: VecDeque<(usize, usize)> = VecDeque::new();
        for idx in 0..partitions.len() {
            for sym in 0..alphabet.len() {
                worklist.push_back((idx, sym));
            }
        }

        while let Some((splitter_idx, sym)) = worklist.pop_front() {
            let mut predecessors = StateSet::with_capacity(n);
            for t in partitions[splitter_idx].iter() {
                for &s in &reverse[sym][t as usize] {
                    predecessors.insert(s);
                }
            }
            if predecessors.is_empty() {
                continue;
            }

            let mut splits = Vec::new();
            for (idx, partition) in partitions.iter().enumerate() {
                let inside = partition.intersection(&predecessors);
                let outside = partition.difference(&predecessors);
                if !inside.is_empty() && !outside.is_empty() {
                    // Keep the larger half in place, enqueue the smaller.
                    let (keep, add) = if inside.len() <= outside.len() {
                        (outside, inside)
                    } else {
                        (inside, outside)
                    };
                    splits.push((idx, keep, add));
                }
            }
            for (idx, keep, add) in splits {
                let new_idx = partitions.len();
                partitions[idx] = keep;
                partitions.push(add);
                for s in 0..alphabet.len() {
                    worklist.push_back((new_idx, s));
                }
            }
        }

        debug!(
            states = n,
            blocks = partitions.len(),
            "partition refinement stabilized"
        );
        trimmed.build_from_partitions(&partitions)
    }

    /// Collapse each partition block into a single state.
    fn build_from_partitions(&self, partitions: &[StateSet]) -> Dfa {
        let mut block_of: Vec<StateId> = vec![0; self.states.len()];
        for (idx, partition) in partitions.iter().enumerate() {
            for s in partition.iter() {
                block_of[s as usize] = idx as StateId;
            }
        }

        let mut out = Dfa::new();
        for partition in partitions {
            let representative = partition
                .iter()
                .next()
                .expect("refinement never produces an empty block");
            out.add_state(self.is_accepting(representative));
        }
        out.set_start(block_of[self.start as usize]);
        for (idx, partition) in partitions.iter().enumerate() {
            let representative = partition.iter().next().expect("blocks are non-empty");
            for &(r, t) in self.transitions(representative) {
                out.add_transition(idx as StateId, r, block_of[t as usize]);
            }
        }
        out.merge_adjacent();
        out
    }
}

impl Default for Dfa {
    fn default() -> Self {
        Self::new()
    }
}

/// Cut all ranges appearing in `dfas` into atomic sub-ranges: within one
/// atomic range, every transition of every given automaton behaves uniformly.
pub fn atomic_alphabet(dfas: &[&Dfa]) -> Vec<CharRange> {
    let mut cuts: Vec<u16> = Vec::new();
    for dfa in dfas {
        for s in 0..dfa.num_states() as StateId {
            for &(r, _) in dfa.transitions(s) {
                cuts.push(r.lo as u16);
                cuts.push(r.hi as u16 + 1);
            }
        }
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut alphabet = Vec::new();
    for window in cuts.windows(2) {
        let (lo, hi) = (window[0] as u8, (window[1] - 1) as u8);
        let covered = dfas.iter().any(|dfa| {
            (0..dfa.num_states() as StateId)
                .any(|s| dfa.transitions(s).iter().any(|(r, _)| r.contains(lo)))
        });
        if covered {
            alphabet.push(CharRange::new(lo, hi));
        }
    }
    alphabet
}
