#![allow(clippy::many_single_char_names)]
#![allow(clippy::new_without_default)]

//! A library for manipulating formal grammars. The data model is deliberately
//! narrow: a grammar is a set of non-terminals, a disjoint set of terminals, a
//! mapping from each non-terminal to its alternatives, and a start symbol.
//! That is enough to express context-free and regular grammars, which is all
//! the transformations in this crate operate on.
//!
//! Terminology:
//!
//!   * A *non-terminal* is a symbol that must be expanded by some production.
//!   * A *terminal* is an atomic symbol of the generated language.
//!   * An *alternative* is one right-hand side of a non-terminal's
//!     productions: an ordered sequence of symbols. The empty sequence is
//!     epsilon.
//!
//! flgrammar makes the following guarantees about grammars:
//!
//!   * Non-terminals are numbered from `0` to `nonterms_len() - 1` (inclusive),
//!     in definition order.
//!   * Terminals are numbered from `0` to `terms_len() - 1` (inclusive), in
//!     first-reference order.
//!   * Whether a symbol is a terminal or a non-terminal is decided by which
//!     index space it lives in, never by naming convention.
//!   * The order of a non-terminal's alternatives is stable across parsing,
//!     transformation, and pretty printing.
//!
//! The main entry points are [`Grammar::new`] (text format),
//! [`Grammar::to_cnf`](struct.Grammar.html#method.to_cnf) and [`classify`].

mod classify;
mod cnf;
mod grammar;
mod idxnewtype;
mod parser;

pub use classify::{classify, ChomskyLevel};
pub use cnf::{CnfConversion, CnfError, CnfErrorKind};
pub use grammar::Grammar;
pub use parser::{GrammarError, GrammarErrorKind};

pub use crate::idxnewtype::{NIdx, TIdx};

/// A symbol within an alternative: either a non-terminal or a terminal. The
/// two index spaces are disjoint, so this enum is the single point where
/// "terminal or not?" is decided.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Symbol {
    Nonterm(NIdx),
    Term(TIdx),
}

impl Symbol {
    pub fn is_term(&self) -> bool {
        matches!(self, Symbol::Term(_))
    }
}
