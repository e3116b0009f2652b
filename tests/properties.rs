//! Algebraic properties of the automaton operations, checked over generated
//! regular expressions.

use proptest::prelude::*;
use refa::{compile, make_basic, Automaton, Basic, Minimization};

/// Patterns built from a small alphabet so products stay interesting; every
/// composite is parenthesized to keep the intended structure.
fn pattern() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("a".to_owned()),
        Just("b".to_owned()),
        Just("c".to_owned()),
        Just("[ab]".to_owned()),
        Just("()".to_owned()),
    ];
    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a})({b})")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a})|({b})")),
            inner.clone().prop_map(|a| format!("({a})*")),
            inner.clone().prop_map(|a| format!("({a})?")),
            (inner, 0u32..3, 0u32..3).prop_map(|(a, m, extra)| {
                format!("({a}){{{m},{}}}", m + extra)
            }),
        ]
    })
}

fn automaton() -> impl Strategy<Value = Automaton> {
    pattern().prop_map(|p| compile(&p).expect("generated patterns are well-formed"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_complement_involution(a in automaton()) {
        prop_assert!(a.complement().complement().equals(&a));
    }

    #[test]
    fn prop_union_commutative(a in automaton(), b in automaton()) {
        prop_assert!(a.union(&b).equals(&b.union(&a)));
    }

    #[test]
    fn prop_union_associative(a in automaton(), b in automaton(), c in automaton()) {
        prop_assert!(a.union(&b).union(&c).equals(&a.union(&b.union(&c))));
    }

    #[test]
    fn prop_intersect_commutative(a in automaton(), b in automaton()) {
        prop_assert!(a.intersect(&b).equals(&b.intersect(&a)));
    }

    #[test]
    fn prop_minus_self_empty(a in automaton()) {
        prop_assert!(a.minus(&a).is_empty());
    }

    #[test]
    fn prop_union_contains_operands(a in automaton(), b in automaton()) {
        let u = a.union(&b);
        prop_assert!(u.contains(&a));
        prop_assert!(u.contains(&b));
        prop_assert!(a.contains(&a.intersect(&b)));
    }

    #[test]
    fn prop_mutual_containment_is_equality(a in automaton(), b in automaton()) {
        prop_assert_eq!(a.contains(&b) && b.contains(&a), a.equals(&b));
    }

    #[test]
    fn prop_de_morgan(a in automaton(), b in automaton()) {
        let lhs = a.union(&b).complement();
        let rhs = a.complement().intersect(&b.complement());
        prop_assert!(lhs.equals(&rhs));
    }

    #[test]
    fn prop_minimizers_agree(a in automaton()) {
        let mut h = a.clone();
        let mut b = a.clone();
        h.minimize(Minimization::Hopcroft);
        b.minimize(Minimization::Brzozowski);
        prop_assert!(h.equals(&b));
        prop_assert_eq!(h.num_states(), b.num_states());
    }

    #[test]
    fn prop_regex_roundtrip(a in automaton()) {
        let rx = a.to_regex();
        let back = compile(&rx);
        prop_assert!(back.is_ok(), "synthesized pattern failed to parse: {:?}", rx);
        prop_assert!(back.unwrap().equals(&a), "round-trip changed the language: {:?}", rx);
    }

    #[test]
    fn prop_example_word_is_accepted(a in automaton()) {
        match a.example() {
            None => prop_assert!(a.is_empty()),
            Some(word) => {
                let literal: String = word
                    .bytes()
                    .map(|b| format!("\\x{b:02x}"))
                    .collect();
                prop_assert!(a.contains(&compile(&literal).unwrap()));
            }
        }
    }

    #[test]
    fn prop_star_absorbs_iteration(a in automaton()) {
        let star = a.star();
        prop_assert!(star.concat(&star).equals(&star));
        prop_assert!(star.contains(&make_basic(Basic::Epsilon)));
        prop_assert!(star.contains(&a));
    }

    #[test]
    fn prop_iter_bounds_partition(a in automaton(), n in 1u32..3) {
        // {0,n} followed by one more copy covers {1,n+1}.
        let upto = a.iter(0, Some(n)).unwrap();
        let shifted = upto.concat(&a);
        prop_assert!(shifted.equals(&a.iter(1, Some(n + 1)).unwrap()));
    }
}

#[test]
fn iter_invalid_bounds() {
    let a = compile("ab").unwrap();
    for n in 1u32..4 {
        assert!(a.iter(n, Some(n - 1)).is_err());
    }
    assert!(a.iter(0, Some(0)).unwrap().is_epsilon());
}

#[test]
fn basic_automata_table() {
    let kinds = [Basic::Empty, Basic::Epsilon, Basic::Total];
    for &kind in &kinds {
        let a = make_basic(kind);
        for &other in &kinds {
            assert_eq!(a.is_basic(other), kind == other);
        }
    }
}
