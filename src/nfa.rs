//! Nondeterministic finite automata with epsilon transitions.
//!
//! The NFA keeps a start-state *set* rather than a single start state; the
//! Thompson construction uses a singleton, while the reversal used by
//! Brzozowski minimization starts from every accepting state at once.

use crate::dfa::Dfa;
use crate::parser::Ast;
use crate::range::CharRange;
use crate::state::{StateId, StateSet};

#[derive(Debug, Clone, Default)]
struct NfaState {
    /// Labelled transitions, one entry per range.
    trans: Vec<(CharRange, StateId)>,
    /// Epsilon transitions.
    eps: Vec<StateId>,
}

/// An epsilon-NFA over byte-range labels.
#[derive(Debug, Clone)]
pub struct Nfa {
    states: Vec<NfaState>,
    start_states: StateSet,
    final_states: StateSet,
    /// Cached epsilon closures, one per state; invalidated on mutation.
    closures: Option<Vec<StateSet>>,
}

impl Nfa {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            start_states: StateSet::with_capacity(16),
            final_states: StateSet::with_capacity(16),
            closures: None,
        }
    }

    pub fn add_state(&mut self) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(NfaState::default());
        self.closures = None;
        id
    }

    pub fn add_transition(&mut self, source: StateId, range: CharRange, destination: StateId) {
        self.states[source as usize].trans.push((range, destination));
    }

    pub fn add_epsilon(&mut self, source: StateId, destination: StateId) {
        self.states[source as usize].eps.push(destination);
        self.closures = None;
    }

    pub fn add_start_state(&mut self, state: StateId) {
        self.start_states.insert(state);
    }

    pub fn add_final_state(&mut self, state: StateId) {
        self.final_states.insert(state);
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn start_states(&self) -> &StateSet {
        &self.start_states
    }

    pub fn final_states(&self) -> &StateSet {
        &self.final_states
    }

    pub fn transitions_from(&self, state: StateId) -> &[(CharRange, StateId)] {
        &self.states[state as usize].trans
    }

    /// Compute and cache the epsilon closure of every state.
    pub fn compute_epsilon_closures(&mut self) {
        if self.closures.is_some() {
            return;
        }
        let mut closures = Vec::with_capacity(self.states.len());
        for state in 0..self.states.len() as StateId {
            closures.push(self.epsilon_closure_single(state));
        }
        self.closures = Some(closures);
    }

    fn epsilon_closure_single(&self, state: StateId) -> StateSet {
        let mut closure = StateSet::with_capacity(self.states.len());
        let mut stack = vec![state];
        while let Some(s) = stack.pop() {
            if closure.contains(s) {
                continue;
            }
            closure.insert(s);
            for &dest in &self.states[s as usize].eps {
                if !closure.contains(dest) {
                    stack.push(dest);
                }
            }
        }
        closure
    }

    /// Epsilon closure of a set of states, from the cache when available.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::with_capacity(self.states.len());
        if let Some(cached) = &self.closures {
            for state in states.iter() {
                closure.union_with(&cached[state as usize]);
            }
        } else {
            let mut stack: Vec<StateId> = states.iter().collect();
            while let Some(s) = stack.pop() {
                if closure.contains(s) {
                    continue;
                }
                closure.insert(s);
                for &dest in &self.states[s as usize].eps {
                    if !closure.contains(dest) {
                        stack.push(dest);
                    }
                }
            }
        }
        closure
    }

    /// Build an NFA for `ast` via the Thompson construction.
    pub fn thompson(ast: &Ast) -> Nfa {
        let mut nfa = Nfa::new();
        let frag = nfa.build(ast);
        nfa.add_start_state(frag.entry);
        nfa.add_final_state(frag.exit);
        nfa
    }

    fn build(&mut self, ast: &Ast) -> Frag {
        match ast {
            Ast::Empty => {
                // Two states, no path between them.
                let entry = self.add_state();
                let exit = self.add_state();
                Frag { entry, exit }
            }
            Ast::Epsilon => {
                let entry = self.add_state();
                let exit = self.add_state();
                self.add_epsilon(entry, exit);
                Frag { entry, exit }
            }
            Ast::Class(ranges) => {
                let entry = self.add_state();
                let exit = self.add_state();
                for &r in ranges {
                    self.add_transition(entry, r, exit);
                }
                Frag { entry, exit }
            }
            Ast::Concat(lhs, rhs) => {
                let a = self.build(lhs);
                let b = self.build(rhs);
                self.add_epsilon(a.exit, b.entry);
                Frag {
                    entry: a.entry,
                    exit: b.exit,
                }
            }
            Ast::Alt(lhs, rhs) => {
                let entry = self.add_state();
                let a = self.build(lhs);
                let b = self.build(rhs);
                let exit = self.add_state();
                self.add_epsilon(entry, a.entry);
                self.add_epsilon(entry, b.entry);
                self.add_epsilon(a.exit, exit);
                self.add_epsilon(b.exit, exit);
                Frag { entry, exit }
            }
            Ast::Repeat { inner, min, max } => self.build_repeat(inner, *min, *max),
        }
    }

    /// `min` required copies, then either `max - min` optional copies or one
    /// starred copy for an unbounded repetition.
    fn build_repeat(&mut self, inner: &Ast, min: u32, max: Option<u32>) -> Frag {
        let mut frag: Option<Frag> = None;
        for _ in 0..min {
            let next = self.build(inner);
            frag = Some(self.chain(frag, next));
        }
        match max {
            None => {
                let starred = self.starred(inner);
                Some(self.chain(frag, starred))
            }
            Some(max) => {
                for _ in min..max {
                    let opt = self.optional(inner);
                    frag = Some(self.chain(frag, opt));
                }
                frag
            }
        }
        .unwrap_or_else(|| self.build(&Ast::Epsilon))
    }

    fn chain(&mut self, lhs: Option<Frag>, rhs: Frag) -> Frag {
        match lhs {
            Some(lhs) => {
                self.add_epsilon(lhs.exit, rhs.entry);
                Frag {
                    entry: lhs.entry,
                    exit: rhs.exit,
                }
            }
            None => rhs,
        }
    }

    fn starred(&mut self, inner: &Ast) -> Frag {
        let entry = self.add_state();
        let f = self.build(inner);
        let exit = self.add_state();
        self.add_epsilon(entry, f.entry);
        self.add_epsilon(entry, exit);
        self.add_epsilon(f.exit, f.entry);
        self.add_epsilon(f.exit, exit);
        Frag { entry, exit }
    }

    fn optional(&mut self, inner: &Ast) -> Frag {
        let entry = self.add_state();
        let f = self.build(inner);
        let exit = self.add_state();
        self.add_epsilon(entry, f.entry);
        self.add_epsilon(entry, exit);
        self.add_epsilon(f.exit, exit);
        Frag { entry, exit }
    }

    /// Copy a DFA into this NFA. Returns the embedded start state and the
    /// embedded accepting states.
    pub fn embed_dfa(&mut self, dfa: &Dfa) -> (StateId, Vec<StateId>) {
        let offset = self.states.len() as StateId;
        let mut accepting = Vec::new();
        for s in 0..dfa.num_states() as StateId {
            let id = self.add_state();
            if dfa.is_accepting(s) {
                accepting.push(id);
            }
            for &(r, t) in dfa.transitions(s) {
                // Targets are in the same copy, so the offset applies to both.
                self.states[id as usize].trans.push((r, t + offset));
            }
        }
        (dfa.start() + offset, accepting)
    }

    /// The reversal of a DFA: every edge flipped, accepting states become the
    /// start set, the old start becomes the only accepting state.
    pub fn reverse_of(dfa: &Dfa) -> Nfa {
        let mut nfa = Nfa::new();
        for _ in 0..dfa.num_states() {
            nfa.add_state();
        }
        for s in 0..dfa.num_states() as StateId {
            for &(r, t) in dfa.transitions(s) {
                nfa.add_transition(t, r, s);
            }
            if dfa.is_accepting(s) {
                nfa.add_start_state(s);
            }
        }
        if dfa.num_states() > 0 {
            nfa.add_final_state(dfa.start());
        }
        nfa
    }
}

impl Default for Nfa {
    fn default() -> Self {
        Self::new()
    }
}

/// A sub-automaton under construction with one entry and one exit.
#[derive(Debug, Clone, Copy)]
struct Frag {
    entry: StateId,
    exit: StateId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_epsilon_closure_chain() {
        let mut nfa = Nfa::new();
        let a = nfa.add_state();
        let b = nfa.add_state();
        let c = nfa.add_state();
        nfa.add_epsilon(a, b);
        nfa.add_epsilon(b, c);

        let closure = nfa.epsilon_closure(&StateSet::singleton(a, 3));
        assert_eq!(closure.to_vec(), vec![a, b, c]);

        // The cached path must agree with the on-the-fly path.
        nfa.compute_epsilon_closures();
        let cached = nfa.epsilon_closure(&StateSet::singleton(a, 3));
        assert_eq!(cached.to_vec(), vec![a, b, c]);
    }

    #[test]
    fn test_thompson_literal() {
        let nfa = Nfa::thompson(&parse("a").unwrap());
        assert_eq!(nfa.num_states(), 2);
        let start = nfa.start_states().to_vec();
        assert_eq!(start.len(), 1);
        let trans = nfa.transitions_from(start[0]);
        assert_eq!(trans.len(), 1);
        assert_eq!(trans[0].0, CharRange::single(b'a'));
        assert!(nfa.final_states().contains(trans[0].1));
    }

    #[test]
    fn test_thompson_repeat_expands_copies() {
        // a{2,3} needs two required copies plus one optional copy.
        let two = Nfa::thompson(&parse("a{2}").unwrap());
        let three = Nfa::thompson(&parse("a{2,3}").unwrap());
        assert!(three.num_states() > two.num_states());
    }

    #[test]
    fn test_reverse_of_flips_edges() {
        let mut dfa = Dfa::new();
        let s0 = dfa.add_state(false);
        let s1 = dfa.add_state(true);
        dfa.set_start(s0);
        dfa.add_transition(s0, CharRange::single(b'a'), s1);

        let rev = Nfa::reverse_of(&dfa);
        assert_eq!(rev.start_states().to_vec(), vec![s1]);
        assert!(rev.final_states().contains(s0));
        assert_eq!(rev.transitions_from(s1), &[(CharRange::single(b'a'), s0)]);
        assert!(rev.transitions_from(s0).is_empty());
    }
}
