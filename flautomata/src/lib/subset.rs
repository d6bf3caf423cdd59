use std::collections::VecDeque;

use fnv::FnvHashMap;
use vob::Vob;

use flgrammar::TIdx;

use crate::{Automaton, StIdx};

impl Automaton {
    /// Determinize this automaton by subset construction, returning a fresh
    /// DFA; `self` is never mutated. Each DFA state is the sorted,
    /// deduplicated set of source states reachable together, and that set is
    /// the state's identity: determinizing the same automaton twice produces
    /// identical states, in identical order. A composite state is accepting
    /// iff it contains an accepting source state. Composite states are named
    /// `{q0,q1}` after their members.
    pub fn determinize(&self) -> Automaton {
        let start_set = self.epsilon_closure(&[self.start]);
        let mut sets: Vec<Vec<StIdx>> = vec![start_set.clone()];
        let mut seen: FnvHashMap<Vec<StIdx>, StIdx> = FnvHashMap::default();
        seen.insert(start_set, StIdx::from(0));
        let mut edges: Vec<FnvHashMap<Option<TIdx>, Vec<StIdx>>> =
            vec![FnvHashMap::default()];
        let mut queue = VecDeque::new();
        queue.push_back(StIdx::from(0));
        while let Some(didx) = queue.pop_front() {
            for tidx in self.iter_tidxs() {
                let mut succ = Vec::new();
                for i in 0..sets[usize::from(didx)].len() {
                    let st = sets[usize::from(didx)][i];
                    succ.extend_from_slice(self.edge(st, Some(tidx)));
                }
                // The closure is sorted and deduplicated: the canonical key.
                let closure = self.epsilon_closure(&succ);
                if closure.is_empty() {
                    continue;
                }
                let dst = match seen.get(&closure) {
                    Some(&dst) => dst,
                    None => {
                        let dst = StIdx::from(sets.len());
                        sets.push(closure.clone());
                        edges.push(FnvHashMap::default());
                        seen.insert(closure, dst);
                        queue.push_back(dst);
                        dst
                    }
                };
                edges[usize::from(didx)].insert(Some(tidx), vec![dst]);
            }
        }

        let mut accepting = Vob::from_elem(false, sets.len());
        let state_names = sets
            .iter()
            .enumerate()
            .map(|(i, set)| {
                if set.iter().any(|&st| self.accepting[usize::from(st)]) {
                    accepting.set(i, true);
                }
                let mut name = String::from("{");
                for (j, &st) in set.iter().enumerate() {
                    if j > 0 {
                        name.push(',');
                    }
                    name.push_str(self.state_name(st));
                }
                name.push('}');
                name
            })
            .collect();
        Automaton {
            state_names,
            alphabet: self.alphabet.clone(),
            edges,
            start: StIdx::from(0),
            accepting,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::automaton::example_nfa;
    use crate::Automaton;

    #[test]
    fn test_determinize_example() {
        let nfa = example_nfa();
        let dfa = nfa.determinize();
        assert!(dfa.is_deterministic());
        assert!(dfa.accepts_str("ab"));
        assert!(!dfa.accepts_str("ac"));
        assert_eq!(dfa.state_name(dfa.start_state()), "{q0}");
        assert!(dfa.state_idx("{q0,q1}").is_some());
    }

    #[test]
    fn test_determinization_preserves_language() {
        let nfa = example_nfa();
        let dfa = nfa.determinize();
        for s in [
            "", "a", "b", "c", "ab", "ac", "ba", "bb", "aab", "aaab", "acb", "abb", "bbb",
            "aacb",
        ] {
            assert_eq!(nfa.accepts_str(s), dfa.accepts_str(s), "on input {:?}", s);
        }
    }

    #[test]
    fn test_determinize_idempotent() {
        let dfa = example_nfa().determinize();
        let dfa2 = dfa.determinize();
        assert!(dfa2.is_deterministic());
        for s in ["", "a", "ab", "ac", "bb", "aab", "abb"] {
            assert_eq!(dfa.accepts_str(s), dfa2.accepts_str(s), "on input {:?}", s);
        }
    }

    #[test]
    fn test_composite_identity_is_reproducible() {
        let nfa = example_nfa();
        let a = nfa.determinize();
        let b = nfa.determinize();
        assert_eq!(a.state_names, b.state_names);
        assert_eq!(a.pp_transitions(), b.pp_transitions());
    }

    #[test]
    fn test_determinize_epsilon_moves() {
        // a* b, with the a-loop reached through an epsilon-move.
        let nfa = Automaton::from_parts(
            &["q0", "q1", "q2"],
            &["a", "b"],
            &[
                ("q0", "", "q1"),
                ("q1", "a", "q1"),
                ("q1", "b", "q2"),
            ],
            "q0",
            &["q2"],
        )
        .unwrap();
        assert!(!nfa.is_deterministic());
        let dfa = nfa.determinize();
        assert!(dfa.is_deterministic());
        for s in ["b", "ab", "aab", "", "a", "ba"] {
            assert_eq!(nfa.accepts_str(s), dfa.accepts_str(s), "on input {:?}", s);
        }
        assert_eq!(dfa.state_name(dfa.start_state()), "{q0,q1}");
    }
}
