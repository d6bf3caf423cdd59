#![allow(clippy::many_single_char_names)]

//! Finite automata over alphabets of terminal symbols. Nondeterminism and
//! epsilon-moves are first-class: the transition relation maps each
//! `(state, symbol-or-epsilon)` pair to a *set* of destinations, and a DFA is
//! simply an [`Automaton`] for which [`Automaton::is_deterministic`] holds.
//!
//! An automaton is built either by direct specification
//! ([`Automaton::from_parts`]) or from a right-linear grammar
//! ([`Automaton::from_right_linear`]); it can then be simulated
//! ([`Automaton::accepts`]), determinized by subset construction
//! ([`Automaton::determinize`], which returns a fresh automaton and never
//! mutates its input), or converted back into a right-linear grammar
//! ([`Automaton::to_regular_grammar`], deterministic automata only).

mod automaton;
mod builder;
mod extract;
mod subset;

pub use automaton::Automaton;

use std::{error::Error, fmt};

/// StIdx is a wrapper for a 32-bit state index.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StIdx(u32);

impl From<usize> for StIdx {
    fn from(v: usize) -> Self {
        if v > u32::MAX as usize {
            panic!("Overflow");
        }
        StIdx(v as u32)
    }
}

impl From<StIdx> for usize {
    fn from(st: StIdx) -> Self {
        st.0 as usize
    }
}

/// The various different possible automaton errors.
#[derive(Debug, PartialEq, Eq)]
pub enum AutomatonErrorKind {
    /// A deterministic-only operation was invoked on an automaton that fails
    /// `is_deterministic`.
    NotDeterministic,
    /// A grammar alternative doesn't fit the right-linear shape. Contains the
    /// offending non-terminal's name.
    NotRightLinear(String),
    /// A transition, start state or accepting state names a state not in the
    /// state set.
    UnknownState(String),
    /// A transition is keyed by a symbol not in the alphabet, or the alphabet
    /// itself contains the empty symbol.
    UnknownSymbol(String),
    /// A state and an alphabet symbol share a name, so no grammar can be
    /// extracted with disjoint symbol sets.
    StateSymbolClash(String),
}

/// Any error from automaton construction or conversion returns an instance of
/// this struct.
#[derive(Debug, PartialEq, Eq)]
pub struct AutomatonError {
    pub kind: AutomatonErrorKind,
}

impl Error for AutomatonError {}

impl fmt::Display for AutomatonError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            AutomatonErrorKind::NotDeterministic => {
                write!(f, "Automaton is not deterministic")
            }
            AutomatonErrorKind::NotRightLinear(n) => {
                write!(f, "Alternative of '{}' is not right-linear", n)
            }
            AutomatonErrorKind::UnknownState(n) => write!(f, "Unknown state '{}'", n),
            AutomatonErrorKind::UnknownSymbol(n) => write!(f, "Unknown symbol '{}'", n),
            AutomatonErrorKind::StateSymbolClash(n) => {
                write!(f, "'{}' names both a state and an alphabet symbol", n)
            }
        }
    }
}
