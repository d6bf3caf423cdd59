use std::fmt;

use crate::{Grammar, Symbol};

/// Where a grammar sits in the Chomsky hierarchy. Variants are ordered by
/// containment: every Regular grammar is ContextFree, and so on down to
/// Unrestricted.
///
/// Note that [`classify`] is a structural approximation: because this crate's
/// data model only expresses productions with a single non-terminal on the
/// left, it reports `Regular` or `ContextFree`; the `ContextSensitive` and
/// `Unrestricted` levels exist for reporting and ordering. Treat the result
/// as a diagnostic, not a proof.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum ChomskyLevel {
    Unrestricted,
    ContextSensitive,
    ContextFree,
    Regular,
}

impl fmt::Display for ChomskyLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ChomskyLevel::Unrestricted => "Type 0 (unrestricted)",
            ChomskyLevel::ContextSensitive => "Type 1 (context-sensitive)",
            ChomskyLevel::ContextFree => "Type 2 (context-free)",
            ChomskyLevel::Regular => "Type 3 (regular)",
        };
        write!(f, "{}", s)
    }
}

/// Classify `grm`'s position in the Chomsky hierarchy by the shape of its
/// alternatives: `Regular` iff every alternative is epsilon, a single
/// terminal, or a terminal followed by a non-terminal (the right-linear
/// shape); `ContextFree` otherwise.
pub fn classify(grm: &Grammar) -> ChomskyLevel {
    for nidx in grm.iter_nidxs() {
        for alt in grm.alts(nidx) {
            match alt[..] {
                [] | [Symbol::Term(_)] | [Symbol::Term(_), Symbol::Nonterm(_)] => (),
                _ => return ChomskyLevel::ContextFree,
            }
        }
    }
    ChomskyLevel::Regular
}
