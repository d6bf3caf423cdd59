use crate::{parser, GrammarError, GrammarErrorKind, NIdx, Symbol, TIdx};

/// Representation of a grammar. See the [top-level documentation](../index.html)
/// for the guarantees this struct makes about symbol numbering and ordering.
///
/// A `Grammar` is immutable from the outside: transformations such as
/// [`to_cnf`](#method.to_cnf) return a fresh grammar and leave the input
/// untouched.
#[derive(Clone, Debug)]
pub struct Grammar {
    /// Non-terminal names, in definition order. Indexed by `NIdx`.
    pub(crate) nonterm_names: Vec<String>,
    /// Terminal names, in first-reference order. Indexed by `TIdx`.
    pub(crate) term_names: Vec<String>,
    /// A mapping from `NIdx` -> alternatives. An empty alternative is epsilon.
    /// A non-terminal with no alternatives derives nothing at all.
    pub(crate) alts: Vec<Vec<Vec<Symbol>>>,
    /// The start symbol.
    pub(crate) start: NIdx,
}

impl Grammar {
    /// Parse `s` in the line-based text format (`LHS -> alt1 | alt2`, one
    /// production per line; see [`the module docs`](../index.html)). Every
    /// left-hand side is a non-terminal; every other symbol is a terminal.
    /// The first left-hand side becomes the start symbol.
    pub fn new(s: &str) -> Result<Grammar, GrammarError> {
        let rules = parser::parse_rules(s)?;
        let nonterm_names: Vec<String> = rules.keys().cloned().collect();
        let mut term_names: Vec<String> = Vec::new();
        let mut alts = Vec::with_capacity(nonterm_names.len());
        for ralts in rules.values() {
            let mut nalts = Vec::with_capacity(ralts.len());
            for alt in ralts {
                let mut syms = Vec::with_capacity(alt.len());
                for name in alt {
                    match nonterm_names.iter().position(|x| x == name) {
                        Some(i) => syms.push(Symbol::Nonterm(NIdx::from(i))),
                        None => {
                            let tidx = match term_names.iter().position(|x| x == name) {
                                Some(i) => TIdx::from(i),
                                None => {
                                    term_names.push(name.clone());
                                    TIdx::from(term_names.len() - 1)
                                }
                            };
                            syms.push(Symbol::Term(tidx));
                        }
                    }
                }
                nalts.push(syms);
            }
            alts.push(nalts);
        }
        Ok(Grammar {
            nonterm_names,
            term_names,
            alts,
            start: NIdx(0),
        })
    }

    /// Construct a grammar from explicit parts: the non-terminal set, the
    /// terminal set, a list of `(LHS, alternatives)` pairs (symbols given by
    /// name; repeated left-hand sides merge), and the start symbol. Every
    /// symbol referenced must be a member of one of the two (disjoint) sets.
    pub fn from_parts(
        nonterms: &[&str],
        terms: &[&str],
        rules: &[(&str, Vec<Vec<&str>>)],
        start: &str,
    ) -> Result<Grammar, GrammarError> {
        for t in terms {
            if nonterms.contains(t) {
                return Err(GrammarError {
                    kind: GrammarErrorKind::DuplicateSymbol(t.to_string()),
                    line: None,
                });
            }
        }
        let start = match nonterms.iter().position(|x| x == &start) {
            Some(i) => NIdx::from(i),
            None => {
                return Err(GrammarError {
                    kind: GrammarErrorKind::InvalidStartSymbol(start.to_string()),
                    line: None,
                })
            }
        };
        let mut alts: Vec<Vec<Vec<Symbol>>> = vec![Vec::new(); nonterms.len()];
        for (lhs, ralts) in rules {
            let nidx = match nonterms.iter().position(|x| x == lhs) {
                Some(i) => i,
                None => {
                    return Err(GrammarError {
                        kind: GrammarErrorKind::UndefinedSymbol(lhs.to_string()),
                        line: None,
                    })
                }
            };
            for alt in ralts {
                let mut syms = Vec::with_capacity(alt.len());
                for name in alt {
                    if let Some(i) = nonterms.iter().position(|x| x == name) {
                        syms.push(Symbol::Nonterm(NIdx::from(i)));
                    } else if let Some(i) = terms.iter().position(|x| x == name) {
                        syms.push(Symbol::Term(TIdx::from(i)));
                    } else {
                        return Err(GrammarError {
                            kind: GrammarErrorKind::UndefinedSymbol(name.to_string()),
                            line: None,
                        });
                    }
                }
                alts[nidx].push(syms);
            }
        }
        Ok(Grammar {
            nonterm_names: nonterms.iter().map(|x| x.to_string()).collect(),
            term_names: terms.iter().map(|x| x.to_string()).collect(),
            alts,
            start,
        })
    }

    /// How many non-terminals does this grammar have?
    pub fn nonterms_len(&self) -> NIdx {
        NIdx::from(self.nonterm_names.len())
    }

    /// How many terminals does this grammar have?
    pub fn terms_len(&self) -> TIdx {
        TIdx::from(self.term_names.len())
    }

    /// Return an iterator which produces (in order from `0..nonterms_len()`)
    /// all this grammar's valid `NIdx`s.
    pub fn iter_nidxs(&self) -> impl Iterator<Item = NIdx> {
        (0..self.nonterm_names.len()).map(NIdx::from)
    }

    /// Return the name of non-terminal `nidx`. Panics if `nidx` doesn't exist.
    pub fn nonterm_name(&self, nidx: NIdx) -> &str {
        &self.nonterm_names[usize::from(nidx)]
    }

    /// Return the name of terminal `tidx`. Panics if `tidx` doesn't exist.
    pub fn term_name(&self, tidx: TIdx) -> &str {
        &self.term_names[usize::from(tidx)]
    }

    /// Return the index of the non-terminal named `n`, or `None` if it
    /// doesn't exist.
    pub fn nonterm_idx(&self, n: &str) -> Option<NIdx> {
        self.nonterm_names.iter().position(|x| x == n).map(NIdx::from)
    }

    /// Return the index of the terminal named `n`, or `None` if it doesn't
    /// exist.
    pub fn term_idx(&self, n: &str) -> Option<TIdx> {
        self.term_names.iter().position(|x| x == n).map(TIdx::from)
    }

    /// Return the alternatives of non-terminal `nidx`, in stable order.
    /// Panics if `nidx` doesn't exist.
    pub fn alts(&self, nidx: NIdx) -> &[Vec<Symbol>] {
        &self.alts[usize::from(nidx)]
    }

    /// Return this grammar's start symbol.
    pub fn start(&self) -> NIdx {
        self.start
    }

    /// Return the name of `sym`.
    pub fn sym_name(&self, sym: Symbol) -> &str {
        match sym {
            Symbol::Nonterm(nidx) => self.nonterm_name(nidx),
            Symbol::Term(tidx) => self.term_name(tidx),
        }
    }

    /// Pretty print this grammar in the text format it is parsed from, one
    /// non-terminal per line, alternatives in stable order. Non-terminals
    /// with no alternatives are omitted.
    pub fn pp(&self) -> String {
        let mut o = String::new();
        for nidx in self.iter_nidxs() {
            let alts = self.alts(nidx);
            if alts.is_empty() {
                continue;
            }
            o.push_str(self.nonterm_name(nidx));
            o.push_str(" ->");
            for (i, alt) in alts.iter().enumerate() {
                if i > 0 {
                    o.push_str(" |");
                }
                for sym in alt {
                    o.push(' ');
                    o.push_str(self.sym_name(*sym));
                }
            }
            o.push('\n');
        }
        o
    }
}
