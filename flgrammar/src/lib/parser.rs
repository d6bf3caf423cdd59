use std::{error::Error, fmt};

use indexmap::IndexMap;

/// The various different possible grammar errors.
#[derive(Debug, PartialEq, Eq)]
pub enum GrammarErrorKind {
    /// A production line has no `->` separator.
    MissingArrow,
    /// A production line has nothing to the left of `->`.
    MissingLhs,
    /// The left-hand side of a production is not a single symbol.
    IllegalLhs,
    /// The input contains no productions at all.
    NoRules,
    /// A symbol was referenced that is neither a non-terminal nor a terminal.
    UndefinedSymbol(String),
    /// The designated start symbol is not a non-terminal.
    InvalidStartSymbol(String),
    /// A name appears in both the non-terminal and the terminal set.
    DuplicateSymbol(String),
}

/// Any error from grammar parsing or validation returns an instance of this
/// struct.
#[derive(Debug, PartialEq, Eq)]
pub struct GrammarError {
    pub kind: GrammarErrorKind,
    /// The 1-based line the error occurred on, if it arose from parsing text.
    pub line: Option<usize>,
}

impl Error for GrammarError {}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} at line {}", self.kind, line),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl fmt::Display for GrammarErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarErrorKind::MissingArrow => write!(f, "Missing '->'"),
            GrammarErrorKind::MissingLhs => write!(f, "Missing left-hand side"),
            GrammarErrorKind::IllegalLhs => {
                write!(f, "Left-hand side must be a single symbol")
            }
            GrammarErrorKind::NoRules => write!(f, "Grammar has no productions"),
            GrammarErrorKind::UndefinedSymbol(n) => write!(f, "Undefined symbol '{}'", n),
            GrammarErrorKind::InvalidStartSymbol(n) => {
                write!(f, "Start symbol '{}' is not a non-terminal", n)
            }
            GrammarErrorKind::DuplicateSymbol(n) => {
                write!(f, "'{}' is both a non-terminal and a terminal", n)
            }
        }
    }
}

/// Parse the line-based text format, one production per line:
///
/// ```text
///   LHS -> alt1 | alt2 | ...
/// ```
///
/// An empty alternative (including one left by a trailing `|`) is epsilon.
/// Within an alternative, symbols are separated by whitespace; a
/// whitespace-free chunk that is not itself a rule name is split into
/// single-character symbols, so `aA b` reads as `a A b`. Repeated left-hand
/// sides merge their alternatives. Returns the rules in definition order; the
/// first left-hand side is the start symbol.
pub(crate) fn parse_rules(s: &str) -> Result<IndexMap<String, Vec<Vec<String>>>, GrammarError> {
    // First pass: collect the left-hand sides, since the concatenation
    // convention needs to know every rule name before right-hand sides can be
    // split into symbols.
    let mut lines = Vec::new();
    for (i, l) in s.lines().enumerate() {
        let line = i + 1;
        if l.trim().is_empty() {
            continue;
        }
        let (lhs, rhs) = match l.split_once("->") {
            Some(x) => x,
            None => {
                return Err(GrammarError {
                    kind: GrammarErrorKind::MissingArrow,
                    line: Some(line),
                })
            }
        };
        let lhs = lhs.trim();
        if lhs.is_empty() {
            return Err(GrammarError {
                kind: GrammarErrorKind::MissingLhs,
                line: Some(line),
            });
        }
        if lhs.split_whitespace().count() > 1 {
            return Err(GrammarError {
                kind: GrammarErrorKind::IllegalLhs,
                line: Some(line),
            });
        }
        lines.push((lhs, rhs));
    }
    if lines.is_empty() {
        return Err(GrammarError {
            kind: GrammarErrorKind::NoRules,
            line: None,
        });
    }

    let mut rules: IndexMap<String, Vec<Vec<String>>> = IndexMap::new();
    for (lhs, _) in &lines {
        rules.entry(lhs.to_string()).or_default();
    }

    for (lhs, rhs) in &lines {
        let mut alts = Vec::new();
        for alt in rhs.split('|') {
            let mut syms = Vec::new();
            for chunk in alt.split_whitespace() {
                if rules.contains_key(chunk) {
                    syms.push(chunk.to_string());
                } else {
                    for c in chunk.chars() {
                        syms.push(c.to_string());
                    }
                }
            }
            alts.push(syms);
        }
        rules[*lhs].extend(alts);
    }
    Ok(rules)
}

#[cfg(test)]
mod test {
    use super::{parse_rules, GrammarErrorKind};

    #[test]
    fn test_basic_rules() {
        let rules = parse_rules("S -> aB | bA\nA -> a | b\nB -> b").unwrap();
        assert_eq!(
            rules.keys().collect::<Vec<_>>(),
            vec!["S", "A", "B"]
        );
        assert_eq!(rules["S"], vec![vec!["a", "B"], vec!["b", "A"]]);
        assert_eq!(rules["A"], vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_concatenation_splits_chars() {
        // "aA b" is three symbols; a multi-character rule name stays whole.
        let rules = parse_rules("B -> aA b\nA -> a\nXY -> a XY").unwrap();
        assert_eq!(rules["B"], vec![vec!["a", "A", "b"]]);
        assert_eq!(rules["XY"], vec![vec!["a", "XY"]]);
    }

    #[test]
    fn test_chunk_containing_rule_name_still_splits() {
        // Only a chunk that is exactly a rule name stays whole; a rule name
        // embedded in a longer chunk is not recognized.
        let rules = parse_rules("FINAL -> aFINAL | a").unwrap();
        assert_eq!(
            rules["FINAL"][0],
            vec!["a", "F", "I", "N", "A", "L"]
        );
    }

    #[test]
    fn test_trailing_bar_is_epsilon() {
        let rules = parse_rules("A -> b | ").unwrap();
        assert_eq!(rules["A"], vec![vec!["b".to_string()], vec![]]);
    }

    #[test]
    fn test_duplicate_lhs_merges() {
        let rules = parse_rules("S -> a\nS -> b").unwrap();
        assert_eq!(rules["S"], vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_missing_arrow() {
        let err = parse_rules("S -> a\nA = b").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::MissingArrow);
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_missing_lhs() {
        let err = parse_rules(" -> a").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::MissingLhs);
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn test_illegal_lhs() {
        let err = parse_rules("S A -> a").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::IllegalLhs);
    }

    #[test]
    fn test_no_rules() {
        let err = parse_rules("\n  \n").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::NoRules);
        assert_eq!(err.line, None);
    }
}
