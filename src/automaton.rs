//! The public automaton type and the regular-language algebra.
//!
//! An `Automaton` always holds a canonical automaton: a minimized partial DFA
//! whose states are all reachable and co-accessible (with the start state
//! kept even when dead, so the empty language is a single rejecting state).
//! Algebra operations never mutate their operands; each one builds a fresh
//! canonical automaton. The only in-place operation is [`Automaton::minimize`],
//! which preserves identity and language.

use crate::dfa::{atomic_alphabet, Dfa, Minimization};
use crate::error::Error;
use crate::nfa::Nfa;
use crate::parser;
use crate::range::CharRange;
use crate::regexp;
use crate::state::StateId;
use crate::subset_construction::subset_construction;
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::fmt;

/// The three basic automata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basic {
    /// Accepts no string at all.
    Empty,
    /// Accepts exactly the empty string.
    Epsilon,
    /// Accepts every string.
    Total,
}

/// A finite automaton denoting a regular language over bytes.
#[derive(Debug, Clone)]
pub struct Automaton {
    dfa: Dfa,
}

impl Automaton {
    /// Compile a regular expression.
    pub fn compile(pattern: &str) -> Result<Automaton, Error> {
        let ast = parser::parse(pattern)?;
        Ok(Self::canonical(subset_construction(Nfa::thompson(&ast))))
    }

    /// One of the three canonical basic automata.
    pub fn make_basic(kind: Basic) -> Automaton {
        let mut dfa = Dfa::new();
        let s = dfa.add_state(!matches!(kind, Basic::Empty));
        dfa.set_start(s);
        if matches!(kind, Basic::Total) {
            dfa.add_transition(s, CharRange::full(), s);
        }
        Automaton { dfa }
    }

    fn canonical(dfa: Dfa) -> Automaton {
        Automaton {
            dfa: dfa.minimized(Minimization::Hopcroft),
        }
    }

    /// Re-minimize in place with the selected algorithm. The language and the
    /// automaton's identity are preserved.
    pub fn minimize(&mut self, algorithm: Minimization) -> &mut Automaton {
        self.dfa = self.dfa.minimized(algorithm);
        self
    }

    pub fn num_states(&self) -> usize {
        self.dfa.num_states()
    }

    /// Accepts strings accepted by `self` or `other`.
    pub fn union(&self, other: &Automaton) -> Automaton {
        Self::canonical(product(&self.dfa, &other.dfa, |a, b| a || b))
    }

    /// Accepts strings accepted by both `self` and `other`.
    pub fn intersect(&self, other: &Automaton) -> Automaton {
        Self::canonical(product(&self.dfa, &other.dfa, |a, b| a && b))
    }

    /// Accepts strings accepted by `self` but not by `other`.
    pub fn minus(&self, other: &Automaton) -> Automaton {
        Self::canonical(product(&self.dfa, &other.dfa, |a, b| a && !b))
    }

    /// Accepts any string of `self` followed by any string of `other`.
    pub fn concat(&self, other: &Automaton) -> Automaton {
        let mut nfa = Nfa::new();
        let (left_start, left_accepting) = nfa.embed_dfa(&self.dfa);
        let (right_start, right_accepting) = nfa.embed_dfa(&other.dfa);
        nfa.add_start_state(left_start);
        for s in left_accepting {
            nfa.add_epsilon(s, right_start);
        }
        for s in right_accepting {
            nfa.add_final_state(s);
        }
        Self::canonical(subset_construction(nfa))
    }

    /// Accepts exactly the strings `self` rejects.
    pub fn complement(&self) -> Automaton {
        let mut total = self.dfa.totalize();
        for s in 0..total.num_states() as StateId {
            total.set_accepting(s, !total.is_accepting(s));
        }
        Self::canonical(total)
    }

    /// Between `min` and `max` repetitions of `self`; `max = None` is
    /// unbounded. Fails with [`Error::InvalidIteration`] if a finite `max` is
    /// below `min`.
    pub fn iter(&self, min: u32, max: Option<u32>) -> Result<Automaton, Error> {
        if let Some(mx) = max {
            if mx < min {
                return Err(Error::InvalidIteration { min, max: mx });
            }
        }
        Ok(self.iterate(min, max))
    }

    /// Zero or more repetitions, `iter(0, None)`.
    pub fn star(&self) -> Automaton {
        self.iterate(0, None)
    }

    /// One or more repetitions, `iter(1, None)`.
    pub fn plus(&self) -> Automaton {
        self.iterate(1, None)
    }

    /// Zero or one repetition, `iter(0, Some(1))`.
    pub fn maybe(&self) -> Automaton {
        self.iterate(0, Some(1))
    }

    /// `min` chained copies, then optional copies up to `max` or one starred
    /// copy when unbounded. Bounds are already validated.
    fn iterate(&self, min: u32, max: Option<u32>) -> Automaton {
        let mut nfa = Nfa::new();
        let entry = nfa.add_state();
        nfa.add_start_state(entry);

        // Exits after exactly `min` copies; epsilon-chained copy by copy.
        let mut exits: Vec<StateId> = vec![entry];
        for _ in 0..min {
            let (start, accepting) = nfa.embed_dfa(&self.dfa);
            for &e in &exits {
                nfa.add_epsilon(e, start);
            }
            exits = accepting;
        }

        match max {
            None => {
                let (start, accepting) = nfa.embed_dfa(&self.dfa);
                for &e in &exits {
                    nfa.add_epsilon(e, start);
                    nfa.add_final_state(e);
                }
                for &a in &accepting {
                    // Loop back for further repetitions.
                    nfa.add_epsilon(a, start);
                    nfa.add_final_state(a);
                }
            }
            Some(max) => {
                for &e in &exits {
                    nfa.add_final_state(e);
                }
                for _ in min..max {
                    let (start, accepting) = nfa.embed_dfa(&self.dfa);
                    for &e in &exits {
                        nfa.add_epsilon(e, start);
                    }
                    exits = accepting;
                    for &e in &exits {
                        nfa.add_final_state(e);
                    }
                }
            }
        }
        Self::canonical(subset_construction(nfa))
    }

    /// Whether `self` and `other` accept the same language.
    pub fn equals(&self, other: &Automaton) -> bool {
        product(&self.dfa, &other.dfa, |a, b| a != b).is_empty_language()
    }

    /// Whether `self` accepts every string `other` accepts.
    pub fn contains(&self, other: &Automaton) -> bool {
        product(&other.dfa, &self.dfa, |a, b| a && !b).is_empty_language()
    }

    /// Whether `self` is language-equivalent to `make_basic(kind)`.
    ///
    /// A structural check on the canonical shape is tried first; it can never
    /// produce a false positive because the canonical forms of the three
    /// basic languages are exactly those shapes. The semantic fallback keeps
    /// the answer correct for any automaton.
    pub fn is_basic(&self, kind: Basic) -> bool {
        if self.is_structurally_basic(kind) {
            return true;
        }
        self.equals(&Self::make_basic(kind))
    }

    fn is_structurally_basic(&self, kind: Basic) -> bool {
        if self.dfa.num_states() != 1 {
            return false;
        }
        let start = self.dfa.start();
        let accept = self.dfa.is_accepting(start);
        let trans = self.dfa.transitions(start);
        match kind {
            Basic::Empty => !accept && trans.is_empty(),
            Basic::Epsilon => accept && trans.is_empty(),
            Basic::Total => accept && trans == &[(CharRange::full(), start)],
        }
    }

    /// Whether the language is empty.
    pub fn is_empty(&self) -> bool {
        self.is_basic(Basic::Empty)
    }

    /// Whether the language is exactly the empty string.
    pub fn is_epsilon(&self) -> bool {
        self.is_basic(Basic::Epsilon)
    }

    /// Whether the language contains every string.
    pub fn is_total(&self) -> bool {
        self.is_basic(Basic::Total)
    }

    /// A regular expression for this automaton's language. Only semantic
    /// equivalence is guaranteed: `compile(a.to_regex())` equals `a`, but two
    /// equal automata may synthesize different strings.
    pub fn to_regex(&self) -> String {
        regexp::synthesize(&self.dfa)
    }

    /// A shortest accepted word, or `None` for the empty language. Within
    /// each range the smallest printable byte is preferred.
    pub fn example(&self) -> Option<String> {
        let dfa = &self.dfa;
        let n = dfa.num_states();
        let start = dfa.start();
        if dfa.is_accepting(start) {
            return Some(String::new());
        }

        let mut parent: Vec<Option<(StateId, u8)>> = vec![None; n];
        let mut visited = vec![false; n];
        visited[start as usize] = true;
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(s) = queue.pop_front() {
            for &(r, t) in dfa.transitions(s) {
                if visited[t as usize] {
                    continue;
                }
                visited[t as usize] = true;
                parent[t as usize] = Some((s, pick_byte(r)));
                if dfa.is_accepting(t) {
                    let mut bytes = Vec::new();
                    let mut cur = t;
                    while let Some((prev, b)) = parent[cur as usize] {
                        bytes.push(b);
                        cur = prev;
                    }
                    bytes.reverse();
                    return Some(match String::from_utf8(bytes) {
                        Ok(word) => word,
                        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
                    });
                }
                queue.push_back(t);
            }
        }
        None
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_regex())
    }
}

fn pick_byte(r: CharRange) -> u8 {
    let lo = r.lo.max(b'!');
    if lo <= r.hi.min(b'~') {
        lo
    } else {
        r.lo
    }
}

/// Pair-product construction over the combined atomic alphabet.
///
/// Missing transitions are modelled as an implicit sink coordinate (`None`);
/// the all-sink pair is never expanded, which is sound for any predicate that
/// rejects the (false, false) pair, as union, intersection, difference and
/// symmetric difference all do.
fn product(a: &Dfa, b: &Dfa, accept: fn(bool, bool) -> bool) -> Dfa {
    type Pair = (Option<StateId>, Option<StateId>);
    debug_assert!(!accept(false, false));

    let alphabet = atomic_alphabet(&[a, b]);
    let pair_accepts = |(pa, pb): Pair| {
        accept(
            pa.is_some_and(|s| a.is_accepting(s)),
            pb.is_some_and(|s| b.is_accepting(s)),
        )
    };

    let mut out = Dfa::new();
    let mut mapping: IndexMap<Pair, StateId> = IndexMap::new();
    let initial: Pair = (Some(a.start()), Some(b.start()));
    let start = out.add_state(pair_accepts(initial));
    out.set_start(start);
    mapping.insert(initial, start);

    let mut worklist: Vec<(StateId, Pair)> = vec![(start, initial)];
    while let Some((source, (pa, pb))) = worklist.pop() {
        for &sym in &alphabet {
            let ta = pa.and_then(|s| a.target(s, sym.lo));
            let tb = pb.and_then(|s| b.target(s, sym.lo));
            if ta.is_none() && tb.is_none() {
                continue;
            }
            let pair = (ta, tb);
            let destination = match mapping.get(&pair) {
                Some(&existing) => existing,
                None => {
                    let id = out.add_state(pair_accepts(pair));
                    mapping.insert(pair, id);
                    worklist.push((id, pair));
                    id
                }
            };
            out.add_transition(source, sym, destination);
        }
    }
    out
}
