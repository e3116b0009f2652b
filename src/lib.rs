//! Finite-automaton engine for regular-language algebra.
//!
//! Compiles regular expressions into minimal DFAs and computes closed-form
//! operations over them: union, intersection, difference, concatenation,
//! complement and bounded iteration, plus language equivalence/containment
//! tests and regex synthesis from an automaton. Transitions are labelled with
//! compressed byte ranges, so automata over the full 256-symbol alphabet stay
//! small.
//!
//! ```
//! use refa::{compile, Automaton, Basic};
//!
//! let a = compile("a").unwrap();
//! let b = compile("b").unwrap();
//! assert!(a.concat(&b).equals(&compile("ab").unwrap()));
//!
//! let any = compile("(a|b)*").unwrap();
//! assert!(any.contains(&compile("abaabbab").unwrap()));
//!
//! let none = Automaton::make_basic(Basic::Empty);
//! assert!(none.complement().is_total());
//! ```
//!
//! Automata are immutable values; every operation allocates a fresh result.
//! The one exception is [`Automaton::minimize`], which rebuilds the automaton
//! in place with an explicitly selected algorithm ([`Minimization`]).

mod automaton;
mod dfa;
mod error;
mod nfa;
mod parser;
mod range;
mod regexp;
mod state;
mod subset_construction;

pub use automaton::{Automaton, Basic};
pub use dfa::Minimization;
pub use error::Error;
pub use range::CharRange;

/// Compile a regular expression into an automaton.
///
/// Shorthand for [`Automaton::compile`].
pub fn compile(pattern: &str) -> Result<Automaton, Error> {
    Automaton::compile(pattern)
}

/// Construct one of the three basic automata.
///
/// Shorthand for [`Automaton::make_basic`].
pub fn make_basic(kind: Basic) -> Automaton {
    Automaton::make_basic(kind)
}
