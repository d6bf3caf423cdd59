use fnv::FnvHashMap;
use vob::Vob;

use flgrammar::{Grammar, Symbol, TIdx};

use crate::{Automaton, AutomatonError, AutomatonErrorKind, StIdx};

const SINK_STATE: &str = "FINAL";

impl Automaton {
    /// Build an NFA from a right-linear grammar: each non-terminal becomes a
    /// state, plus one synthetic accepting sink with no outgoing transitions.
    /// A single-terminal alternative moves to the sink on that terminal; a
    /// terminal-and-non-terminal alternative (either order) moves to the
    /// non-terminal's state on the terminal; an epsilon alternative becomes
    /// an epsilon-move to the sink, so a start symbol that derives epsilon
    /// yields an automaton accepting the empty string.
    ///
    /// The grammar must already be right-linear: any other alternative shape
    /// is a contract violation and fails with `NotRightLinear`. This builder
    /// never normalizes on the caller's behalf.
    pub fn from_right_linear(grm: &Grammar) -> Result<Automaton, AutomatonError> {
        let mut state_names: Vec<String> = grm
            .iter_nidxs()
            .map(|nidx| grm.nonterm_name(nidx).to_string())
            .collect();
        // Generate a guaranteed unique sink name. We simply keep making the
        // string longer until we've hit something unique (at the very worst,
        // this will require looping for as many times as there are
        // non-terminals).
        let mut sink_name = SINK_STATE.to_string();
        while grm.nonterm_idx(&sink_name).is_some() {
            sink_name += SINK_STATE;
        }
        let sink = StIdx::from(state_names.len());
        state_names.push(sink_name);

        let mut edges: Vec<FnvHashMap<Option<TIdx>, Vec<StIdx>>> =
            vec![FnvHashMap::default(); state_names.len()];
        for nidx in grm.iter_nidxs() {
            let src = usize::from(nidx);
            for alt in grm.alts(nidx) {
                let (sym, dst) = match alt[..] {
                    [] => (None, sink),
                    [Symbol::Term(t)] => (Some(t), sink),
                    [Symbol::Term(t), Symbol::Nonterm(n)]
                    | [Symbol::Nonterm(n), Symbol::Term(t)] => {
                        (Some(t), StIdx::from(usize::from(n)))
                    }
                    _ => {
                        return Err(AutomatonError {
                            kind: AutomatonErrorKind::NotRightLinear(
                                grm.nonterm_name(nidx).to_string(),
                            ),
                        })
                    }
                };
                edges[src].entry(sym).or_default().push(dst);
            }
        }
        for e in &mut edges {
            for dsts in e.values_mut() {
                dsts.sort_unstable();
                dsts.dedup();
            }
        }

        let mut accepting = Vob::from_elem(false, state_names.len());
        accepting.set(usize::from(sink), true);
        Ok(Automaton {
            state_names,
            alphabet: (0..usize::from(grm.terms_len()))
                .map(|i| grm.term_name(TIdx::from(i)).to_string())
                .collect(),
            edges,
            start: StIdx::from(usize::from(grm.start())),
            accepting,
        })
    }
}
