//! Subset (powerset) construction: epsilon-NFA to DFA.

use crate::dfa::Dfa;
use crate::nfa::Nfa;
use crate::range::CharRange;
use crate::state::{StateId, StateSet};
use indexmap::IndexMap;
use tracing::debug;

/// Determinize an epsilon-NFA.
///
/// Each DFA state is the epsilon closure of a set of NFA states; reached
/// subsets are memoized (keyed on the sorted state vector) so every subset is
/// expanded once, which bounds the construction by the number of distinct
/// reachable subsets.
pub fn subset_construction(mut nfa: Nfa) -> Dfa {
    nfa.compute_epsilon_closures();

    let mut dfa = Dfa::new();
    let initial = nfa.epsilon_closure(nfa.start_states());
    if initial.is_empty() {
        // No start states at all; the canonical reject-everything automaton.
        let s = dfa.add_state(false);
        dfa.set_start(s);
        return dfa;
    }

    let mut mapping: IndexMap<Vec<StateId>, StateId> = IndexMap::new();
    let start = dfa.add_state(initial.intersects(nfa.final_states()));
    dfa.set_start(start);
    mapping.insert(initial.to_vec(), start);

    let mut worklist: Vec<(StateId, StateSet)> = vec![(start, initial)];
    while let Some((source, subset)) = worklist.pop() {
        for (range, targets) in partition_moves(&nfa, &subset) {
            let key = targets.to_vec();
            let destination = match mapping.get(&key) {
                Some(&existing) => existing,
                None => {
                    let id = dfa.add_state(targets.intersects(nfa.final_states()));
                    mapping.insert(key, id);
                    worklist.push((id, targets));
                    id
                }
            };
            dfa.add_transition(source, range, destination);
        }
    }

    debug!(
        nfa_states = nfa.num_states(),
        dfa_states = dfa.num_states(),
        "subset construction finished"
    );
    dfa
}

/// Group the outgoing transitions of an (epsilon-closed) subset by character
/// range.
///
/// Overlapping labels are cut at every range boundary so each returned
/// sub-range routes to the full union of epsilon closures of its targets;
/// adjacent sub-ranges with identical target sets are merged back. The result
/// is ascending and pairwise disjoint.
fn partition_moves(nfa: &Nfa, subset: &StateSet) -> Vec<(CharRange, StateSet)> {
    let mut edges: Vec<(CharRange, StateId)> = Vec::new();
    for state in subset.iter() {
        edges.extend_from_slice(nfa.transitions_from(state));
    }
    if edges.is_empty() {
        return Vec::new();
    }

    // Cut points: the low end of every range and one past its high end.
    let mut cuts: Vec<u16> = Vec::with_capacity(edges.len() * 2);
    for (r, _) in &edges {
        cuts.push(r.lo as u16);
        cuts.push(r.hi as u16 + 1);
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut moves: Vec<(CharRange, StateSet)> = Vec::new();
    for window in cuts.windows(2) {
        let (lo, hi) = (window[0], window[1] - 1);
        // Within an atomic interval every edge either covers it fully or not
        // at all.
        let mut targets = StateSet::with_capacity(nfa.num_states());
        for (r, destination) in &edges {
            if r.lo as u16 <= lo && hi <= r.hi as u16 {
                targets.insert(*destination);
            }
        }
        if targets.is_empty() {
            continue;
        }
        let targets = nfa.epsilon_closure(&targets);
        if let Some((prev_range, prev_targets)) = moves.last_mut() {
            if prev_range.hi as u16 + 1 == lo && *prev_targets == targets {
                prev_range.hi = hi as u8;
                continue;
            }
        }
        moves.push((CharRange::new(lo as u8, hi as u8), targets));
    }
    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_ranges_are_split() {
        // 0 -[a-m]-> 1, 0 -[h-z]-> 2: the overlap [h-m] must route to {1,2}.
        let mut nfa = Nfa::new();
        let s0 = nfa.add_state();
        let s1 = nfa.add_state();
        let s2 = nfa.add_state();
        nfa.add_transition(s0, CharRange::new(b'a', b'm'), s1);
        nfa.add_transition(s0, CharRange::new(b'h', b'z'), s2);
        nfa.add_start_state(s0);
        nfa.add_final_state(s1);

        let subset = StateSet::singleton(s0, 3);
        let moves = partition_moves(&nfa, &subset);
        assert_eq!(moves.len(), 3);
        assert_eq!(moves[0].0, CharRange::new(b'a', b'g'));
        assert_eq!(moves[0].1.to_vec(), vec![s1]);
        assert_eq!(moves[1].0, CharRange::new(b'h', b'm'));
        assert_eq!(moves[1].1.to_vec(), vec![s1, s2]);
        assert_eq!(moves[2].0, CharRange::new(b'n', b'z'));
        assert_eq!(moves[2].1.to_vec(), vec![s2]);
    }

    #[test]
    fn test_identical_targets_are_remerged() {
        // Two adjacent ranges to the same state collapse into one move.
        let mut nfa = Nfa::new();
        let s0 = nfa.add_state();
        let s1 = nfa.add_state();
        nfa.add_transition(s0, CharRange::new(b'a', b'f'), s1);
        nfa.add_transition(s0, CharRange::new(b'g', b'k'), s1);
        nfa.add_start_state(s0);
        nfa.add_final_state(s1);

        let moves = partition_moves(&nfa, &StateSet::singleton(s0, 2));
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].0, CharRange::new(b'a', b'k'));
    }

    #[test]
    fn test_epsilon_closure_in_targets() {
        // 0 -a-> 1 -eps-> 2(final): the DFA must accept "a".
        let mut nfa = Nfa::new();
        let s0 = nfa.add_state();
        let s1 = nfa.add_state();
        let s2 = nfa.add_state();
        nfa.add_transition(s0, CharRange::single(b'a'), s1);
        nfa.add_epsilon(s1, s2);
        nfa.add_start_state(s0);
        nfa.add_final_state(s2);

        let dfa = subset_construction(nfa);
        assert_eq!(dfa.num_states(), 2);
        let t = dfa.target(dfa.start(), b'a').unwrap();
        assert!(dfa.is_accepting(t));
    }

    #[test]
    fn test_no_start_states() {
        let dfa = subset_construction(Nfa::new());
        assert_eq!(dfa.num_states(), 1);
        assert!(!dfa.is_accepting(dfa.start()));
        assert!(dfa.is_empty_language());
    }
}
