use std::{collections::VecDeque, error::Error, fmt};

use vob::Vob;

use crate::{Grammar, NIdx, Symbol, TIdx};

/// The various different possible Chomsky-Normal-Form conversion errors.
#[derive(Debug, PartialEq, Eq)]
pub enum CnfErrorKind {
    /// Unit elimination cannot reach a fixpoint: a cyclic chain of unit
    /// productions with no terminal escape. Contains the name of a
    /// non-terminal on the chain.
    NonTerminatingElimination(String),
}

/// Any error from CNF conversion returns an instance of this struct.
#[derive(Debug, PartialEq, Eq)]
pub struct CnfError {
    pub kind: CnfErrorKind,
}

impl Error for CnfError {}

impl fmt::Display for CnfError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            CnfErrorKind::NonTerminatingElimination(n) => write!(
                f,
                "Unit productions of '{}' form a cycle with no terminal escape",
                n
            ),
        }
    }
}

/// The result of a successful CNF conversion.
#[derive(Debug)]
pub struct CnfConversion {
    pub grammar: Grammar,
    /// True if the input's start symbol could derive epsilon. CNF cannot
    /// express the empty string, so in that case the converted grammar's
    /// language is the input's minus the empty string; callers should report
    /// this rather than ignore it.
    pub lost_empty_string: bool,
}

impl Grammar {
    /// Convert this grammar to Chomsky Normal Form: on success every
    /// alternative in the returned grammar is either a single terminal or
    /// exactly two non-terminals, and every unreachable or non-productive
    /// non-terminal has been pruned. The passes run in order: epsilon
    /// elimination, unit elimination, reachability pruning, productivity
    /// pruning, binarization.
    ///
    /// The conversion operates on a working copy: on error `self` is left
    /// untouched and no partially-transformed grammar escapes.
    pub fn to_cnf(&self) -> Result<CnfConversion, CnfError> {
        let mut grm = self.clone();
        let lost_empty_string = eliminate_epsilon(&mut grm);
        eliminate_units(&mut grm)?;
        prune_unreachable(&mut grm);
        prune_nonproductive(&mut grm);
        binarize(&mut grm);
        debug_assert!(is_cnf(&grm));
        Ok(CnfConversion {
            grammar: grm,
            lost_empty_string,
        })
    }
}

/// Compute the set of nullable non-terminals: those able to derive epsilon,
/// directly or through other nullable non-terminals. A fixpoint bounded by
/// the number of non-terminals, since each round must newly mark at least one.
fn nullable_set(grm: &Grammar) -> Vob {
    let mut nullable = Vob::from_elem(false, usize::from(grm.nonterms_len()));
    loop {
        let mut changed = false;
        for nidx in grm.iter_nidxs() {
            if nullable[usize::from(nidx)] {
                continue;
            }
            for alt in grm.alts(nidx) {
                if alt
                    .iter()
                    .all(|sym| matches!(sym, Symbol::Nonterm(n) if nullable[usize::from(*n)]))
                {
                    nullable.set(usize::from(nidx), true);
                    changed = true;
                    break;
                }
            }
        }
        if !changed {
            return nullable;
        }
    }
}

/// Remove all epsilon alternatives. Every alternative is expanded with one
/// variant per subset of its nullable occurrences (covering every way an
/// epsilon alternative could have applied), then empty alternatives are
/// dropped. Returns true if the start symbol was nullable, i.e. the empty
/// string has been lost from the language.
fn eliminate_epsilon(grm: &mut Grammar) -> bool {
    let nullable = nullable_set(grm);
    for i in 0..grm.alts.len() {
        let old = std::mem::take(&mut grm.alts[i]);
        let mut new_alts: Vec<Vec<Symbol>> = Vec::with_capacity(old.len());
        for alt in old {
            // Expand: for each nullable occurrence, double the variants into
            // kept/dropped, keeping the fully-kept variant first.
            let mut variants: Vec<Vec<Symbol>> = vec![Vec::with_capacity(alt.len())];
            for &sym in &alt {
                let is_nullable =
                    matches!(sym, Symbol::Nonterm(n) if nullable[usize::from(n)]);
                if is_nullable {
                    let mut next = Vec::with_capacity(variants.len() * 2);
                    for v in variants {
                        let mut kept = v.clone();
                        kept.push(sym);
                        next.push(kept);
                        next.push(v);
                    }
                    variants = next;
                } else {
                    for v in &mut variants {
                        v.push(sym);
                    }
                }
            }
            for v in variants {
                if !v.is_empty() && !new_alts.contains(&v) {
                    new_alts.push(v);
                }
            }
        }
        grm.alts[i] = new_alts;
    }
    nullable[usize::from(grm.start)]
}

/// Remove all unit alternatives (a single non-terminal) by splicing in the
/// non-unit alternatives of each non-terminal's unit closure. The closure
/// walk is bounded by a visited bitset, so unit cycles cannot loop; a closure
/// that contains unit edges but contributes no non-unit alternative is a
/// cyclic unit chain with no terminal escape and fails fast.
fn eliminate_units(grm: &mut Grammar) -> Result<(), CnfError> {
    let nt_len = usize::from(grm.nonterms_len());
    let mut new_table: Vec<Vec<Vec<Symbol>>> = Vec::with_capacity(nt_len);
    for nidx in grm.iter_nidxs() {
        let mut visited = Vob::from_elem(false, nt_len);
        visited.set(usize::from(nidx), true);
        let mut queue = VecDeque::new();
        queue.push_back(nidx);
        let mut new_alts: Vec<Vec<Symbol>> = Vec::new();
        let mut saw_unit = false;
        while let Some(cur) = queue.pop_front() {
            for alt in grm.alts(cur) {
                if let [Symbol::Nonterm(tgt)] = alt[..] {
                    saw_unit = true;
                    if !visited[usize::from(tgt)] {
                        visited.set(usize::from(tgt), true);
                        queue.push_back(tgt);
                    }
                } else if !new_alts.contains(alt) {
                    new_alts.push(alt.clone());
                }
            }
        }
        if saw_unit && new_alts.is_empty() {
            return Err(CnfError {
                kind: CnfErrorKind::NonTerminatingElimination(
                    grm.nonterm_name(nidx).to_string(),
                ),
            });
        }
        new_table.push(new_alts);
    }
    grm.alts = new_table;
    Ok(())
}

/// Delete every non-terminal not reachable from the start symbol by forward
/// traversal over alternatives.
fn prune_unreachable(grm: &mut Grammar) {
    let nt_len = usize::from(grm.nonterms_len());
    let mut reachable = Vob::from_elem(false, nt_len);
    reachable.set(usize::from(grm.start), true);
    let mut queue = vec![grm.start];
    while let Some(nidx) = queue.pop() {
        for alt in grm.alts(nidx) {
            for sym in alt {
                if let Symbol::Nonterm(n) = sym {
                    if !reachable[usize::from(*n)] {
                        reachable.set(usize::from(*n), true);
                        queue.push(*n);
                    }
                }
            }
        }
    }
    retain_nonterms(grm, &reachable);
}

/// Delete every non-productive non-terminal: one unable to derive any string
/// of terminals. The fixpoint starts from the terminals (trivially
/// productive) and marks a non-terminal once one of its alternatives consists
/// solely of known-productive symbols. The start symbol is never pruned; if
/// it is non-productive it is left with no alternatives (the empty language).
fn prune_nonproductive(grm: &mut Grammar) {
    let nt_len = usize::from(grm.nonterms_len());
    let mut productive = Vob::from_elem(false, nt_len);
    loop {
        let mut changed = false;
        for nidx in grm.iter_nidxs() {
            if productive[usize::from(nidx)] {
                continue;
            }
            for alt in grm.alts(nidx) {
                if alt.iter().all(|sym| match sym {
                    Symbol::Term(_) => true,
                    Symbol::Nonterm(n) => productive[usize::from(*n)],
                }) {
                    productive.set(usize::from(nidx), true);
                    changed = true;
                    break;
                }
            }
        }
        if !changed {
            break;
        }
    }
    productive.set(usize::from(grm.start), true);
    retain_nonterms(grm, &productive);
}

/// Rebuild the grammar keeping only the non-terminals whose bit is set in
/// `keep`. Alternatives mentioning a pruned non-terminal are dropped, and the
/// terminal table is re-interned so only still-referenced terminals remain.
fn retain_nonterms(grm: &mut Grammar, keep: &Vob) {
    let mut nt_map: Vec<Option<NIdx>> = vec![None; grm.nonterm_names.len()];
    let mut nonterm_names = Vec::new();
    for (i, name) in grm.nonterm_names.iter().enumerate() {
        if keep[i] {
            nt_map[i] = Some(NIdx::from(nonterm_names.len()));
            nonterm_names.push(name.clone());
        }
    }
    let mut t_map: Vec<Option<TIdx>> = vec![None; grm.term_names.len()];
    let mut term_names = Vec::new();
    let mut alts = Vec::with_capacity(nonterm_names.len());
    for (i, old_alts) in grm.alts.iter().enumerate() {
        if !keep[i] {
            continue;
        }
        let mut new_alts = Vec::with_capacity(old_alts.len());
        for alt in old_alts {
            if alt
                .iter()
                .any(|sym| matches!(sym, Symbol::Nonterm(n) if !keep[usize::from(*n)]))
            {
                continue;
            }
            let mut syms = Vec::with_capacity(alt.len());
            for sym in alt {
                match sym {
                    Symbol::Nonterm(n) => {
                        syms.push(Symbol::Nonterm(nt_map[usize::from(*n)].unwrap()))
                    }
                    Symbol::Term(t) => {
                        let tidx = match t_map[usize::from(*t)] {
                            Some(tidx) => tidx,
                            None => {
                                let tidx = TIdx::from(term_names.len());
                                term_names.push(grm.term_names[usize::from(*t)].clone());
                                t_map[usize::from(*t)] = Some(tidx);
                                tidx
                            }
                        };
                        syms.push(Symbol::Term(tidx));
                    }
                }
            }
            new_alts.push(syms);
        }
        alts.push(new_alts);
    }
    grm.start = nt_map[usize::from(grm.start)].unwrap();
    grm.nonterm_names = nonterm_names;
    grm.term_names = term_names;
    grm.alts = alts;
}

/// Mint a fresh non-terminal. Names come from a monotonically increasing
/// counter scoped to one conversion, skipping anything already interned, so
/// they can never collide with a user symbol.
fn fresh_nonterm(grm: &mut Grammar, counter: &mut usize) -> NIdx {
    loop {
        let name = format!("@{}", counter);
        *counter += 1;
        if grm.nonterm_idx(&name).is_none() && grm.term_idx(&name).is_none() {
            let nidx = NIdx::from(grm.nonterm_names.len());
            grm.nonterm_names.push(name);
            grm.alts.push(Vec::new());
            return nidx;
        }
    }
}

/// Replace every alternative longer than two symbols with a chain of fresh
/// non-terminals, preserving left-to-right order, then promote terminals
/// inside length-two alternatives to fresh single-production non-terminals
/// (one per terminal). Afterwards every alternative is a single terminal or
/// two non-terminals.
fn binarize(grm: &mut Grammar) {
    let mut counter = 0;
    // Chain long alternatives. Fresh non-terminals are appended to the table,
    // so the loop re-reads the length and chains their tails in turn.
    let mut i = 0;
    while i < grm.alts.len() {
        let old = std::mem::take(&mut grm.alts[i]);
        let mut new_alts = Vec::with_capacity(old.len());
        for mut alt in old {
            if alt.len() > 2 {
                let rest = alt.split_off(1);
                let f = fresh_nonterm(grm, &mut counter);
                grm.alts[usize::from(f)].push(rest);
                alt.push(Symbol::Nonterm(f));
            }
            new_alts.push(alt);
        }
        grm.alts[i] = new_alts;
        i += 1;
    }
    // Promote terminals out of length-two alternatives. Fresh promotion
    // rules are single terminals, so they need no revisiting.
    let mut promoted: Vec<Option<NIdx>> = vec![None; grm.term_names.len()];
    for i in 0..grm.alts.len() {
        for j in 0..grm.alts[i].len() {
            if grm.alts[i][j].len() != 2 {
                continue;
            }
            for k in 0..2 {
                if let Symbol::Term(t) = grm.alts[i][j][k] {
                    let p = match promoted[usize::from(t)] {
                        Some(p) => p,
                        None => {
                            let f = fresh_nonterm(grm, &mut counter);
                            grm.alts[usize::from(f)].push(vec![Symbol::Term(t)]);
                            promoted[usize::from(t)] = Some(f);
                            f
                        }
                    };
                    grm.alts[i][j][k] = Symbol::Nonterm(p);
                }
            }
        }
    }
}

/// Does every alternative satisfy the CNF invariant (a single terminal, or
/// exactly two non-terminals)?
fn is_cnf(grm: &Grammar) -> bool {
    grm.iter_nidxs().all(|nidx| {
        grm.alts(nidx).iter().all(|alt| {
            matches!(
                alt[..],
                [Symbol::Term(_)] | [Symbol::Nonterm(_), Symbol::Nonterm(_)]
            )
        })
    })
}

#[cfg(test)]
mod test {
    use super::{eliminate_epsilon, eliminate_units, is_cnf, CnfErrorKind};
    use crate::Grammar;

    fn has_alt(grm: &Grammar, lhs: &str, alt: &[&str]) -> bool {
        let nidx = grm.nonterm_idx(lhs).unwrap();
        grm.alts(nidx)
            .iter()
            .any(|a| a.iter().map(|s| grm.sym_name(*s)).collect::<Vec<_>>() == alt)
    }

    #[test]
    fn test_epsilon_expansion() {
        // With A nullable, `B -> aA b` gains a variant with A removed.
        let mut grm = Grammar::new("B -> aA b\nA -> a |").unwrap();
        let lost = eliminate_epsilon(&mut grm);
        assert!(!lost);
        assert!(has_alt(&grm, "B", &["a", "A", "b"]));
        assert!(has_alt(&grm, "B", &["a", "b"]));
        assert!(has_alt(&grm, "A", &["a"]));
        assert_eq!(grm.alts(grm.nonterm_idx("A").unwrap()).len(), 1);
    }

    #[test]
    fn test_epsilon_multiple_occurrences() {
        // Two nullable occurrences expand into all four subsets, minus any
        // empty result.
        let mut grm = Grammar::new("S -> AbA\nA -> a |").unwrap();
        eliminate_epsilon(&mut grm);
        assert!(has_alt(&grm, "S", &["A", "b", "A"]));
        assert!(has_alt(&grm, "S", &["A", "b"]));
        assert!(has_alt(&grm, "S", &["b", "A"]));
        assert!(has_alt(&grm, "S", &["b"]));
        assert_eq!(grm.alts(grm.nonterm_idx("S").unwrap()).len(), 4);
    }

    #[test]
    fn test_epsilon_indirectly_nullable() {
        // S is nullable only through A; the loss is reported, not dropped
        // silently.
        let mut grm = Grammar::new("S -> A\nA -> a |").unwrap();
        assert!(eliminate_epsilon(&mut grm));
    }

    #[test]
    fn test_unit_splice() {
        let mut grm = Grammar::new("S -> A | a\nA -> S | b").unwrap();
        eliminate_units(&mut grm).unwrap();
        assert!(has_alt(&grm, "S", &["a"]));
        assert!(has_alt(&grm, "S", &["b"]));
        assert_eq!(grm.alts(grm.nonterm_idx("S").unwrap()).len(), 2);
    }

    #[test]
    fn test_unit_cycle_no_escape() {
        let grm = Grammar::new("S -> A\nA -> B\nB -> A").unwrap();
        let err = grm.to_cnf().unwrap_err();
        assert_eq!(
            err.kind,
            CnfErrorKind::NonTerminatingElimination("S".to_string())
        );
        // Failure leaves the input untouched.
        assert_eq!(grm.pp(), "S -> A\nA -> B\nB -> A\n");
    }

    #[test]
    fn test_to_cnf_full() {
        // From the original exercise: C is unreachable and must go; A's
        // epsilon alternative must be expanded away; long alternatives must
        // be binarized.
        let grm = Grammar::new(
            "S -> aB | bA\nA -> B | b | aD | AS | bAAB | \nB -> b | bS\nC -> AB\nD -> BB",
        )
        .unwrap();
        let conv = grm.to_cnf().unwrap();
        let cnf = conv.grammar;
        assert!(!conv.lost_empty_string);
        assert!(is_cnf(&cnf));
        assert!(cnf.nonterm_idx("C").is_none());
        assert!(cnf.nonterm_idx("D").is_some());
        for nidx in cnf.iter_nidxs() {
            assert!(!cnf.alts(nidx).is_empty());
        }
    }

    #[test]
    fn test_to_cnf_lost_empty_string() {
        let grm = Grammar::new("S -> a | ").unwrap();
        let conv = grm.to_cnf().unwrap();
        assert!(conv.lost_empty_string);
        assert_eq!(conv.grammar.pp(), "S -> a\n");
    }

    #[test]
    fn test_to_cnf_binarization_chains() {
        let grm = Grammar::new("S -> abc").unwrap();
        let conv = grm.to_cnf().unwrap();
        let cnf = conv.grammar;
        assert!(is_cnf(&cnf));
        // One chain link plus one promoted non-terminal per distinct terminal.
        assert!(usize::from(cnf.nonterms_len()) > 1);
    }

    #[test]
    fn test_to_cnf_preserves_cnf_input() {
        let grm = Grammar::new("S -> AB | a\nA -> a\nB -> b").unwrap();
        let conv = grm.to_cnf().unwrap();
        assert_eq!(conv.grammar.pp(), grm.pp());
    }

    #[test]
    fn test_fresh_names_avoid_collisions() {
        // A user symbol already named like a generated one must be skipped.
        let grm = Grammar::new("S -> abc | a @0\n@0 -> a").unwrap();
        let conv = grm.to_cnf().unwrap();
        let cnf = conv.grammar;
        assert!(is_cnf(&cnf));
        // All non-terminal names are still unique.
        let mut names: Vec<&str> = cnf
            .iter_nidxs()
            .map(|nidx| cnf.nonterm_name(nidx))
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), usize::from(cnf.nonterms_len()));
    }
}
