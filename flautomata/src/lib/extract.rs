use flgrammar::Grammar;

use crate::{Automaton, AutomatonError, AutomatonErrorKind};

impl Automaton {
    /// Convert a deterministic automaton's transition relation back into a
    /// right-linear grammar: state names become non-terminals, the alphabet
    /// becomes the terminal set, and each transition `(s, a) -> d` emits the
    /// alternative `a d` under `s`. When `d` is accepting, the terminal-only
    /// alternative `a` is also emitted so derivations can terminate there;
    /// when the start state itself is accepting, the start symbol gets an
    /// epsilon alternative so empty-string acceptance survives the
    /// conversion.
    ///
    /// Fails with `NotDeterministic` unless `is_deterministic` holds, and
    /// with `StateSymbolClash` if a state shares its name with an alphabet
    /// symbol (the grammar's symbol sets must be disjoint).
    pub fn to_regular_grammar(&self) -> Result<Grammar, AutomatonError> {
        if !self.is_deterministic() {
            return Err(AutomatonError {
                kind: AutomatonErrorKind::NotDeterministic,
            });
        }
        for n in &self.state_names {
            if self.alphabet.contains(n) {
                return Err(AutomatonError {
                    kind: AutomatonErrorKind::StateSymbolClash(n.clone()),
                });
            }
        }
        let nonterms: Vec<&str> = self.state_names.iter().map(|x| x.as_str()).collect();
        let terms: Vec<&str> = self.alphabet.iter().map(|x| x.as_str()).collect();
        let mut rules: Vec<(&str, Vec<Vec<&str>>)> = Vec::with_capacity(nonterms.len());
        for stidx in self.iter_stidxs() {
            let mut alts = Vec::new();
            for tidx in self.iter_tidxs() {
                for &d in self.edge(stidx, Some(tidx)) {
                    let a = self.alphabet_name(tidx);
                    alts.push(vec![a, self.state_name(d)]);
                    if self.is_accepting(d) {
                        alts.push(vec![a]);
                    }
                }
            }
            if stidx == self.start && self.is_accepting(stidx) {
                alts.push(vec![]);
            }
            rules.push((self.state_name(stidx), alts));
        }
        // Every name comes from this automaton's own (disjoint, just checked)
        // tables, so construction cannot fail.
        Ok(Grammar::from_parts(
            &nonterms,
            &terms,
            &rules,
            self.state_name(self.start),
        )
        .unwrap())
    }
}

#[cfg(test)]
mod test {
    use flgrammar::{classify, ChomskyLevel};

    use crate::automaton::example_nfa;
    use crate::{Automaton, AutomatonErrorKind};

    #[test]
    fn test_requires_deterministic() {
        let err = example_nfa().to_regular_grammar().unwrap_err();
        assert_eq!(err.kind, AutomatonErrorKind::NotDeterministic);
    }

    #[test]
    fn test_extracted_grammar_is_regular() {
        let grm = example_nfa().determinize().to_regular_grammar().unwrap();
        assert_eq!(classify(&grm), ChomskyLevel::Regular);
        assert_eq!(grm.nonterm_name(grm.start()), "{q0}");
    }

    #[test]
    fn test_accepting_destination_terminates_derivation() {
        let dfa = Automaton::from_parts(
            &["q0", "q1"],
            &["a"],
            &[("q0", "a", "q1")],
            "q0",
            &["q1"],
        )
        .unwrap();
        let grm = dfa.to_regular_grammar().unwrap();
        let q0 = grm.nonterm_idx("q0").unwrap();
        let alts: Vec<Vec<&str>> = grm
            .alts(q0)
            .iter()
            .map(|alt| alt.iter().map(|s| grm.sym_name(*s)).collect())
            .collect();
        assert_eq!(alts, vec![vec!["a", "q1"], vec!["a"]]);
    }

    #[test]
    fn test_round_trip_preserves_language() {
        let nfa = example_nfa();
        let back = Automaton::from_right_linear(
            &nfa.determinize().to_regular_grammar().unwrap(),
        )
        .unwrap();
        for s in [
            "", "a", "b", "ab", "ac", "ba", "bb", "aab", "abb", "acb", "bbb", "aacb",
        ] {
            assert_eq!(nfa.accepts_str(s), back.accepts_str(s), "on input {:?}", s);
        }
    }

    #[test]
    fn test_round_trip_preserves_empty_string() {
        // a*: the start state is accepting, so the start rule needs an
        // epsilon alternative for the round trip to keep the empty string.
        let dfa = Automaton::from_parts(&["q0"], &["a"], &[("q0", "a", "q0")], "q0", &["q0"])
            .unwrap();
        let grm = dfa.to_regular_grammar().unwrap();
        let back = Automaton::from_right_linear(&grm).unwrap();
        for s in ["", "a", "aa", "aaa"] {
            assert!(back.accepts_str(s));
        }
        assert!(!back.accepts_str("b"));
    }

    #[test]
    fn test_state_symbol_clash() {
        let dfa = Automaton::from_parts(&["a", "q1"], &["a"], &[("a", "a", "q1")], "a", &["q1"])
            .unwrap();
        let err = dfa.to_regular_grammar().unwrap_err();
        assert_eq!(err.kind, AutomatonErrorKind::StateSymbolClash("a".to_string()));
    }
}
