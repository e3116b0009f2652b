//! Regex synthesis by state elimination.
//!
//! The DFA is turned into a generalized NFA whose edges carry regex terms;
//! states are eliminated one by one, replacing every path through an
//! eliminated state with `prefix · loop* · suffix` and merging parallel edges
//! by alternation, until a single init-to-final edge holds the answer. Terms
//! are kept small by simplifying smart constructors; only semantic
//! equivalence with the input automaton is guaranteed.

use crate::dfa::Dfa;
use crate::range::{self, CharRange};
use crate::state::StateId;
use std::collections::BTreeMap;

/// A regex term over the synthesis algebra.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rexp {
    Empty,
    Epsilon,
    /// Normalized, non-empty range set.
    Class(Vec<CharRange>),
    Concat(Vec<Rexp>),
    Alt(Vec<Rexp>),
    Star(Box<Rexp>),
}

/// `a | b` with the usual identities applied.
fn alt(a: Rexp, b: Rexp) -> Rexp {
    let mut terms: Vec<Rexp> = Vec::new();
    let mut ranges: Vec<CharRange> = Vec::new();
    for term in flatten_alt(a).into_iter().chain(flatten_alt(b)) {
        match term {
            Rexp::Empty => {}
            Rexp::Class(r) => ranges.extend(r),
            other => {
                if !terms.contains(&other) {
                    terms.push(other);
                }
            }
        }
    }
    if !ranges.is_empty() {
        range::normalize(&mut ranges);
        terms.insert(0, Rexp::Class(ranges));
    }
    // `() | x*` is just `x*`.
    if terms.contains(&Rexp::Epsilon) && terms.iter().any(|t| matches!(t, Rexp::Star(_))) {
        terms.retain(|t| *t != Rexp::Epsilon);
    }
    match terms.len() {
        0 => Rexp::Empty,
        1 => terms.pop().expect("one term"),
        _ => Rexp::Alt(terms),
    }
}

fn flatten_alt(r: Rexp) -> Vec<Rexp> {
    match r {
        Rexp::Alt(terms) => terms,
        other => vec![other],
    }
}

/// `a · b`; the empty language annihilates, epsilon is the identity.
fn cat(a: Rexp, b: Rexp) -> Rexp {
    match (a, b) {
        (Rexp::Empty, _) | (_, Rexp::Empty) => Rexp::Empty,
        (Rexp::Epsilon, x) | (x, Rexp::Epsilon) => x,
        (a, b) => {
            let mut terms = match a {
                Rexp::Concat(t) => t,
                other => vec![other],
            };
            match b {
                Rexp::Concat(t) => terms.extend(t),
                other => terms.push(other),
            }
            Rexp::Concat(terms)
        }
    }
}

fn star(r: Rexp) -> Rexp {
    match r {
        Rexp::Empty | Rexp::Epsilon => Rexp::Epsilon,
        s @ Rexp::Star(_) => s,
        other => Rexp::Star(Box::new(other)),
    }
}

/// Synthesize a regex string for the DFA's language.
pub fn synthesize(dfa: &Dfa) -> String {
    let n = dfa.num_states();
    let init = n;
    let fin = n + 1;

    let mut edges: BTreeMap<(usize, usize), Rexp> = BTreeMap::new();
    for s in 0..n as StateId {
        for &(r, t) in dfa.transitions(s) {
            add_edge(&mut edges, s as usize, t as usize, Rexp::Class(vec![r]));
        }
        if dfa.is_accepting(s) {
            add_edge(&mut edges, s as usize, fin, Rexp::Epsilon);
        }
    }
    add_edge(&mut edges, init, dfa.start() as usize, Rexp::Epsilon);

    for s in 0..n {
        let self_loop = edges.remove(&(s, s)).map(star).unwrap_or(Rexp::Epsilon);
        let incoming: Vec<usize> = edges
            .keys()
            .filter(|&&(i, j)| j == s && i != s)
            .map(|&(i, _)| i)
            .collect();
        let outgoing: Vec<usize> = edges
            .keys()
            .filter(|&&(i, j)| i == s && j != s)
            .map(|&(_, j)| j)
            .collect();
        let ins: Vec<(usize, Rexp)> = incoming
            .into_iter()
            .map(|i| (i, edges.remove(&(i, s)).expect("edge key just seen")))
            .collect();
        let outs: Vec<(usize, Rexp)> = outgoing
            .into_iter()
            .map(|j| (j, edges.remove(&(s, j)).expect("edge key just seen")))
            .collect();
        for (i, rin) in &ins {
            for (j, rout) in &outs {
                let through = cat(cat(rin.clone(), self_loop.clone()), rout.clone());
                add_edge(&mut edges, *i, *j, through);
            }
        }
    }

    let result = edges.remove(&(init, fin)).unwrap_or(Rexp::Empty);
    let mut out = String::new();
    render(&result, 0, &mut out);
    out
}

fn add_edge(edges: &mut BTreeMap<(usize, usize), Rexp>, i: usize, j: usize, r: Rexp) {
    if r == Rexp::Empty {
        return;
    }
    match edges.remove(&(i, j)) {
        Some(existing) => {
            edges.insert((i, j), alt(existing, r));
        }
        None => {
            edges.insert((i, j), r);
        }
    }
}

/// Precedence levels: alternation 0, concatenation 1, atoms 2.
fn precedence(r: &Rexp) -> u8 {
    match r {
        Rexp::Alt(_) => 0,
        Rexp::Concat(_) => 1,
        _ => 2,
    }
}

fn render(r: &Rexp, min_prec: u8, out: &mut String) {
    if precedence(r) < min_prec {
        out.push('(');
        render(r, 0, out);
        out.push(')');
        return;
    }
    match r {
        Rexp::Empty => out.push_str("[]"),
        Rexp::Epsilon => out.push_str("()"),
        Rexp::Class(ranges) => render_class(ranges, out),
        Rexp::Concat(terms) => {
            for t in terms {
                render(t, 2, out);
            }
        }
        Rexp::Alt(terms) => {
            for (i, t) in terms.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                render(t, 1, out);
            }
        }
        Rexp::Star(inner) => {
            render(inner, 2, out);
            out.push('*');
        }
    }
}

fn render_class(ranges: &[CharRange], out: &mut String) {
    if let [single] = ranges {
        if single.is_full() {
            out.push('.');
            return;
        }
        if single.lo == single.hi {
            push_literal(single.lo, out);
            return;
        }
    }
    // Prefer the negated form when it lists fewer ranges.
    let complement = range::complement(ranges);
    let (negated, items) = if !complement.is_empty() && complement.len() < ranges.len() {
        (true, complement.as_slice())
    } else {
        (false, ranges)
    };
    out.push('[');
    if negated {
        out.push('^');
    }
    for r in items {
        push_class_byte(r.lo, out);
        if r.lo != r.hi {
            out.push('-');
            push_class_byte(r.hi, out);
        }
    }
    out.push(']');
}

fn push_literal(b: u8, out: &mut String) {
    match b {
        b'\n' => out.push_str("\\n"),
        b'\t' => out.push_str("\\t"),
        b'\r' => out.push_str("\\r"),
        b'|' | b'*' | b'+' | b'?' | b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'.' | b'\\'
        | b'^' | b'$' => {
            out.push('\\');
            out.push(b as char);
        }
        0x20..=0x7e => out.push(b as char),
        _ => push_hex(b, out),
    }
}

fn push_class_byte(b: u8, out: &mut String) {
    match b {
        b'\n' => out.push_str("\\n"),
        b'\t' => out.push_str("\\t"),
        b'\r' => out.push_str("\\r"),
        b'\\' | b']' | b'^' | b'-' => {
            out.push('\\');
            out.push(b as char);
        }
        0x20..=0x7e => out.push(b as char),
        _ => push_hex(b, out),
    }
}

fn push_hex(b: u8, out: &mut String) {
    out.push_str(&format!("\\x{b:02x}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Automaton, Basic};

    fn roundtrip(pattern: &str) {
        let a = Automaton::compile(pattern).unwrap();
        let rx = a.to_regex();
        let back = Automaton::compile(&rx).unwrap();
        assert!(back.equals(&a), "{pattern:?} synthesized as {rx:?}");
    }

    #[test]
    fn test_roundtrip() {
        for pattern in [
            "a",
            "abc",
            "a|b",
            "(a|b)*abb",
            "a{2,4}",
            "[a-fx]",
            "[^a-z]",
            "a+b?c*",
            "(ab|cd)+e",
            "\\n[\\x00-\\x1f]",
        ] {
            roundtrip(pattern);
        }
    }

    #[test]
    fn test_basic_automata_render() {
        assert_eq!(Automaton::make_basic(Basic::Empty).to_regex(), "[]");
        assert_eq!(Automaton::make_basic(Basic::Epsilon).to_regex(), "()");
        assert_eq!(Automaton::make_basic(Basic::Total).to_regex(), ".*");
    }

    #[test]
    fn test_single_literal_chain_renders_plainly() {
        let a = Automaton::compile("abc").unwrap();
        assert_eq!(a.to_regex(), "abc");
    }

    #[test]
    fn test_simplification() {
        assert_eq!(alt(Rexp::Empty, Rexp::Epsilon), Rexp::Epsilon);
        assert_eq!(cat(Rexp::Empty, Rexp::Epsilon), Rexp::Empty);
        assert_eq!(cat(Rexp::Epsilon, Rexp::Epsilon), Rexp::Epsilon);
        assert_eq!(star(Rexp::Empty), Rexp::Epsilon);
        assert_eq!(star(star(Rexp::Class(vec![CharRange::single(b'a')]))), {
            star(Rexp::Class(vec![CharRange::single(b'a')]))
        });
        // Parallel classes merge into one.
        assert_eq!(
            alt(
                Rexp::Class(vec![CharRange::single(b'a')]),
                Rexp::Class(vec![CharRange::single(b'b')])
            ),
            Rexp::Class(vec![CharRange::new(b'a', b'b')])
        );
    }

    #[test]
    fn test_class_rendering() {
        let mut out = String::new();
        render_class(&[CharRange::new(b'a', b'c'), CharRange::single(b'x')], &mut out);
        assert_eq!(out, "[a-cx]");

        // Negated form is chosen when it is shorter.
        let wide = range::complement(&[CharRange::single(b'q')]);
        let mut out = String::new();
        render_class(&wide, &mut out);
        assert_eq!(out, "[^q]");
    }
}
