use fnv::FnvHashMap;
use vob::Vob;

use flgrammar::TIdx;

use crate::{AutomatonError, AutomatonErrorKind, StIdx};

/// A finite automaton: a set of states, an alphabet of terminal symbols
/// (epsilon is never an alphabet member; epsilon-moves are keyed separately),
/// a set-valued transition relation, one start state and a set of accepting
/// states.
#[derive(Clone, Debug)]
pub struct Automaton {
    /// State names, indexed by `StIdx`.
    pub(crate) state_names: Vec<String>,
    /// Alphabet symbol names, indexed by `TIdx`.
    pub(crate) alphabet: Vec<String>,
    /// For each state, a map from symbol (`None` = epsilon) to a sorted,
    /// deduplicated set of destination states.
    pub(crate) edges: Vec<FnvHashMap<Option<TIdx>, Vec<StIdx>>>,
    pub(crate) start: StIdx,
    /// Accepting states, one bit per state.
    pub(crate) accepting: Vob,
}

impl Automaton {
    /// Construct an automaton from an explicit specification: state names,
    /// alphabet, a transition table of `(source, symbol, destination)` triples
    /// (an empty symbol is an epsilon-move), the start state and the
    /// accepting states, all by name.
    pub fn from_parts(
        states: &[&str],
        alphabet: &[&str],
        transitions: &[(&str, &str, &str)],
        start: &str,
        accepting: &[&str],
    ) -> Result<Automaton, AutomatonError> {
        if alphabet.contains(&"") {
            return Err(AutomatonError {
                kind: AutomatonErrorKind::UnknownSymbol(String::new()),
            });
        }
        let state_idx = |n: &str| -> Result<StIdx, AutomatonError> {
            match states.iter().position(|x| *x == n) {
                Some(i) => Ok(StIdx::from(i)),
                None => Err(AutomatonError {
                    kind: AutomatonErrorKind::UnknownState(n.to_string()),
                }),
            }
        };
        let mut edges: Vec<FnvHashMap<Option<TIdx>, Vec<StIdx>>> =
            vec![FnvHashMap::default(); states.len()];
        for (src, sym, dst) in transitions {
            let src = state_idx(src)?;
            let dst = state_idx(dst)?;
            let sym = if sym.is_empty() {
                None
            } else {
                match alphabet.iter().position(|x| x == sym) {
                    Some(i) => Some(TIdx::from(i)),
                    None => {
                        return Err(AutomatonError {
                            kind: AutomatonErrorKind::UnknownSymbol(sym.to_string()),
                        })
                    }
                }
            };
            edges[usize::from(src)].entry(sym).or_default().push(dst);
        }
        for e in &mut edges {
            for dsts in e.values_mut() {
                dsts.sort_unstable();
                dsts.dedup();
            }
        }
        let mut accepting_vob = Vob::from_elem(false, states.len());
        for n in accepting {
            accepting_vob.set(usize::from(state_idx(n)?), true);
        }
        Ok(Automaton {
            state_names: states.iter().map(|x| x.to_string()).collect(),
            alphabet: alphabet.iter().map(|x| x.to_string()).collect(),
            edges,
            start: state_idx(start)?,
            accepting: accepting_vob,
        })
    }

    /// How many states does this automaton have?
    pub fn states_len(&self) -> usize {
        self.state_names.len()
    }

    /// Return an iterator which produces (in order from `0..states_len()`)
    /// all this automaton's valid `StIdx`s.
    pub fn iter_stidxs(&self) -> impl Iterator<Item = StIdx> {
        (0..self.state_names.len()).map(StIdx::from)
    }

    /// Return the name of state `stidx`. Panics if `stidx` doesn't exist.
    pub fn state_name(&self, stidx: StIdx) -> &str {
        &self.state_names[usize::from(stidx)]
    }

    /// Return the index of the state named `n`, or `None` if it doesn't
    /// exist.
    pub fn state_idx(&self, n: &str) -> Option<StIdx> {
        self.state_names.iter().position(|x| x == n).map(StIdx::from)
    }

    /// Return this automaton's alphabet, in index order.
    pub fn iter_tidxs(&self) -> impl Iterator<Item = TIdx> {
        (0..self.alphabet.len()).map(TIdx::from)
    }

    /// Return the name of alphabet symbol `tidx`. Panics if `tidx` doesn't
    /// exist.
    pub fn alphabet_name(&self, tidx: TIdx) -> &str {
        &self.alphabet[usize::from(tidx)]
    }

    /// Return the index of the alphabet symbol named `n`, or `None` if it
    /// doesn't exist.
    pub fn alphabet_idx(&self, n: &str) -> Option<TIdx> {
        self.alphabet.iter().position(|x| x == n).map(TIdx::from)
    }

    /// Return this automaton's start state.
    pub fn start_state(&self) -> StIdx {
        self.start
    }

    /// Is `stidx` an accepting state? Panics if `stidx` doesn't exist.
    pub fn is_accepting(&self, stidx: StIdx) -> bool {
        self.accepting[usize::from(stidx)]
    }

    /// Return the destinations of `stidx` on `sym` (`None` = epsilon), sorted
    /// and deduplicated; empty if there is no such transition.
    pub fn edge(&self, stidx: StIdx, sym: Option<TIdx>) -> &[StIdx] {
        self.edges[usize::from(stidx)]
            .get(&sym)
            .map(|x| x.as_slice())
            .unwrap_or(&[])
    }

    /// Return the set of states reachable from `states` along epsilon-moves
    /// alone (including `states` themselves), sorted and deduplicated. The
    /// expansion tracks visited states, so epsilon-cycles terminate.
    pub fn epsilon_closure(&self, states: &[StIdx]) -> Vec<StIdx> {
        let mut seen = Vob::from_elem(false, self.state_names.len());
        let mut queue = Vec::with_capacity(states.len());
        for &st in states {
            if !seen[usize::from(st)] {
                seen.set(usize::from(st), true);
                queue.push(st);
            }
        }
        while let Some(st) = queue.pop() {
            for &d in self.edge(st, None) {
                if !seen[usize::from(d)] {
                    seen.set(usize::from(d), true);
                    queue.push(d);
                }
            }
        }
        seen.iter_set_bits(..).map(StIdx::from).collect()
    }

    /// Simulate this automaton on `input`, a sequence of alphabet symbols:
    /// true iff some run over the input ends in an accepting state. Works
    /// identically for NFAs and DFAs; the empty input is accepted iff the
    /// start state's epsilon-closure intersects the accepting set; a symbol
    /// outside the alphabet rejects.
    pub fn accepts<'a>(&self, input: impl IntoIterator<Item = &'a str>) -> bool {
        let mut current = self.epsilon_closure(&[self.start]);
        for sym in input {
            let tidx = match self.alphabet_idx(sym) {
                Some(t) => t,
                None => return false,
            };
            let mut next = Vec::new();
            for &st in &current {
                next.extend_from_slice(self.edge(st, Some(tidx)));
            }
            current = self.epsilon_closure(&next);
            if current.is_empty() {
                return false;
            }
        }
        current.iter().any(|&st| self.accepting[usize::from(st)])
    }

    /// Convenience for alphabets of single-character symbols: simulate on
    /// each character of `input` in turn.
    pub fn accepts_str(&self, input: &str) -> bool {
        let syms = input.chars().map(String::from).collect::<Vec<_>>();
        self.accepts(syms.iter().map(|x| x.as_str()))
    }

    /// Is this automaton deterministic: no epsilon-moves, and at most one
    /// destination per `(state, alphabet symbol)` pair?
    pub fn is_deterministic(&self) -> bool {
        for e in &self.edges {
            for (sym, dsts) in e {
                if sym.is_none() && !dsts.is_empty() {
                    return false;
                }
                if dsts.len() > 1 {
                    return false;
                }
            }
        }
        true
    }

    /// Pretty print this automaton's transition relation as a `String`, one
    /// `source --(symbol)--> destination` line per transition, states in
    /// index order, epsilon-moves (printed as `ε`) before alphabet symbols in
    /// index order.
    pub fn pp_transitions(&self) -> String {
        let mut o = String::new();
        for stidx in self.iter_stidxs() {
            for &d in self.edge(stidx, None) {
                o.push_str(&format!(
                    "{} --(ε)--> {}\n",
                    self.state_name(stidx),
                    self.state_name(d)
                ));
            }
            for tidx in self.iter_tidxs() {
                for &d in self.edge(stidx, Some(tidx)) {
                    o.push_str(&format!(
                        "{} --({})--> {}\n",
                        self.state_name(stidx),
                        self.alphabet_name(tidx),
                        self.state_name(d)
                    ));
                }
            }
        }
        o
    }
}

// An NFA shared by the tests in this crate: nondeterministic on 'a' from q0,
// accepting exactly the strings with a path q0 ->* q3.
#[cfg(test)]
pub(crate) fn example_nfa() -> Automaton {
    Automaton::from_parts(
        &["q0", "q1", "q2", "q3"],
        &["a", "b", "c"],
        &[
            ("q0", "a", "q0"),
            ("q0", "a", "q1"),
            ("q0", "b", "q2"),
            ("q1", "a", "q1"),
            ("q1", "b", "q3"),
            ("q1", "c", "q2"),
            ("q2", "b", "q3"),
        ],
        "q0",
        &["q3"],
    )
    .unwrap()
}

#[cfg(test)]
mod test {
    use super::{example_nfa, Automaton};
    use crate::AutomatonErrorKind;

    #[test]
    fn test_from_parts_unknown_state() {
        let err = Automaton::from_parts(&["q0"], &["a"], &[("q0", "a", "q9")], "q0", &[])
            .unwrap_err();
        assert_eq!(err.kind, AutomatonErrorKind::UnknownState("q9".to_string()));
    }

    #[test]
    fn test_from_parts_unknown_symbol() {
        let err = Automaton::from_parts(&["q0"], &["a"], &[("q0", "x", "q0")], "q0", &[])
            .unwrap_err();
        assert_eq!(err.kind, AutomatonErrorKind::UnknownSymbol("x".to_string()));
    }

    #[test]
    fn test_from_parts_epsilon_not_in_alphabet() {
        let err = Automaton::from_parts(&["q0"], &["a", ""], &[], "q0", &[]).unwrap_err();
        assert_eq!(err.kind, AutomatonErrorKind::UnknownSymbol(String::new()));
    }

    #[test]
    fn test_nondeterminism_detected() {
        let nfa = example_nfa();
        assert!(!nfa.is_deterministic());
    }

    #[test]
    fn test_epsilon_move_is_nondeterministic() {
        let fa = Automaton::from_parts(
            &["q0", "q1"],
            &["a"],
            &[("q0", "", "q1")],
            "q0",
            &["q1"],
        )
        .unwrap();
        assert!(!fa.is_deterministic());
    }

    #[test]
    fn test_accepts_nfa() {
        let nfa = example_nfa();
        assert!(nfa.accepts_str("ab"));
        assert!(nfa.accepts_str("aab"));
        assert!(nfa.accepts_str("bb"));
        assert!(!nfa.accepts_str("ac"));
        assert!(!nfa.accepts_str("a"));
        assert!(!nfa.accepts_str(""));
        // A symbol outside the alphabet rejects.
        assert!(!nfa.accepts_str("axb"));
    }

    #[test]
    fn test_epsilon_closure_cycle_terminates() {
        let fa = Automaton::from_parts(
            &["q0", "q1", "q2"],
            &["a"],
            &[("q0", "", "q1"), ("q1", "", "q0"), ("q1", "", "q2")],
            "q0",
            &["q2"],
        )
        .unwrap();
        let closure = fa.epsilon_closure(&[fa.state_idx("q0").unwrap()]);
        assert_eq!(closure.len(), 3);
        // Empty input is accepted through the closure alone.
        assert!(fa.accepts_str(""));
    }

    #[test]
    fn test_duplicate_transitions_dedup() {
        let fa = Automaton::from_parts(
            &["q0", "q1"],
            &["a"],
            &[("q0", "a", "q1"), ("q0", "a", "q1")],
            "q0",
            &["q1"],
        )
        .unwrap();
        assert_eq!(
            fa.edge(
                fa.state_idx("q0").unwrap(),
                Some(fa.alphabet_idx("a").unwrap())
            )
            .len(),
            1
        );
        assert!(fa.is_deterministic());
    }

    #[test]
    fn test_pp_transitions() {
        let nfa = example_nfa();
        let pp = nfa.pp_transitions();
        assert!(pp.contains("q0 --(a)--> q0\n"));
        assert!(pp.contains("q0 --(a)--> q1\n"));
        assert!(pp.contains("q2 --(b)--> q3\n"));
        // Deterministic rendering: two calls agree.
        assert_eq!(pp, nfa.pp_transitions());
    }
}
