//! Classification of a raw XPath value into a typed assertion outcome, and
//! the type-specific equality rules against an expected literal.

use crate::error::CheckError;
use std::fmt;
use xmlcheck_xpath::{DataSourceNode, NodeType, XPathValue};

/// The typed outcome of one query evaluation. Exactly one variant holds;
/// immutable once produced and owned by the caller.
#[derive(Debug, Clone)]
pub enum QueryOutcome<N> {
    Boolean(bool),
    Numeric(f64),
    String(String),
    /// One or more matched elements. Never empty: a zero-match selection is
    /// `Empty` instead.
    NodeSet(Vec<N>),
    /// Document was present but the selection matched nothing.
    Empty,
}

/// Maps a raw engine value onto the outcome taxonomy.
///
/// Node sequences collapse to strings where the caller almost certainly
/// wanted a scalar: all-text and all-attribute selections concatenate in
/// document order, and a single element wrapping a single text node yields
/// that text.
pub fn classify<'a, N>(
    raw: XPathValue<N>,
    document_present: bool,
    query: &str,
) -> Result<QueryOutcome<N>, CheckError>
where
    N: DataSourceNode<'a> + 'a,
{
    match raw {
        XPathValue::Boolean(b) => Ok(QueryOutcome::Boolean(b)),
        XPathValue::Number(n) => Ok(QueryOutcome::Numeric(n)),
        XPathValue::String(s) => Ok(QueryOutcome::String(s)),
        XPathValue::NodeSet(mut nodes) => {
            if !document_present {
                // A node-set verdict over "no data" is meaningless; Empty is
                // reserved for a present document with zero matches.
                return Err(CheckError::NoDataAvailable {
                    query: query.to_string(),
                });
            }
            if nodes.is_empty() {
                return Ok(QueryOutcome::Empty);
            }
            nodes.sort();

            if nodes.iter().all(|n| n.node_type() == NodeType::Text) {
                let text: String = nodes.iter().map(|n| n.string_value()).collect();
                return Ok(QueryOutcome::String(text));
            }
            if nodes.iter().all(|n| n.node_type() == NodeType::Attribute) {
                let text: String = nodes.iter().map(|n| n.string_value()).collect();
                return Ok(QueryOutcome::String(text));
            }

            let elements: Vec<N> = nodes
                .iter()
                .copied()
                .filter(|n| n.node_type() == NodeType::Element)
                .collect();
            if elements.is_empty() {
                // Only comments, processing instructions or a mix with no
                // covered branch.
                return Err(CheckError::UnsupportedResultShape {
                    query: query.to_string(),
                });
            }
            if let [element] = elements.as_slice() {
                let children: Vec<N> = element.children().collect();
                if let [child] = children.as_slice() {
                    if child.node_type() == NodeType::Text {
                        return Ok(QueryOutcome::String(child.string_value()));
                    }
                }
            }
            Ok(QueryOutcome::NodeSet(elements))
        }
    }
}

impl<N> QueryOutcome<N> {
    /// Type-appropriate equality against an expected literal. Total: no
    /// variant fails.
    ///
    /// A `NodeSet` is not independently comparable; callers must reduce it
    /// (select a sub-field) before comparing. Calling this on a `NodeSet` is
    /// a caller contract violation and always answers `false`.
    pub fn equals_expected(&self, expected: &str) -> bool {
        match self {
            QueryOutcome::Boolean(value) => {
                (*value && (expected == "1" || expected.eq_ignore_ascii_case("true")))
                    || (!*value && (expected == "0" || expected.eq_ignore_ascii_case("false")))
            }
            // Exact equality on purpose: callers supply canonical literals.
            QueryOutcome::Numeric(value) => expected
                .trim()
                .parse::<f64>()
                .is_ok_and(|parsed| parsed == *value),
            QueryOutcome::String(value) => value == expected,
            // An absent match can never satisfy an expectation, not even "".
            QueryOutcome::Empty => false,
            QueryOutcome::NodeSet(_) => {
                log::debug!("direct equality on a node-set outcome always fails");
                false
            }
        }
    }
}

impl<N> fmt::Display for QueryOutcome<N> {
    /// Canonical rendering for failure diagnostics. The node-set form is
    /// diagnostic-only and not load-bearing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Boolean(true) => write!(f, "1"),
            QueryOutcome::Boolean(false) => write!(f, "0"),
            QueryOutcome::Numeric(n) => write!(f, "{}", n),
            QueryOutcome::String(s) => write!(f, "{}", s),
            QueryOutcome::Empty => Ok(()),
            QueryOutcome::NodeSet(nodes) => write!(f, "[node-set of {} elements]", nodes.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Outcome = QueryOutcome<()>;

    #[test]
    fn boolean_equality_accepts_both_spellings() {
        let t: Outcome = QueryOutcome::Boolean(true);
        assert!(t.equals_expected("true"));
        assert!(t.equals_expected("TRUE"));
        assert!(t.equals_expected("1"));
        assert!(!t.equals_expected("0"));
        assert!(!t.equals_expected("yes"));

        let f: Outcome = QueryOutcome::Boolean(false);
        assert!(f.equals_expected("false"));
        assert!(f.equals_expected("False"));
        assert!(f.equals_expected("0"));
        assert!(!f.equals_expected("1"));
    }

    #[test]
    fn numeric_equality_is_exact() {
        let n: Outcome = QueryOutcome::Numeric(3.0);
        assert!(n.equals_expected("3"));
        assert!(n.equals_expected("3.0"));
        assert!(!n.equals_expected("3.0001"));
        assert!(!n.equals_expected("three"));

        let n: Outcome = QueryOutcome::Numeric(3.5);
        assert!(n.equals_expected("3.5"));
    }

    #[test]
    fn string_equality_is_case_sensitive() {
        let s: Outcome = QueryOutcome::String("Foo".to_string());
        assert!(s.equals_expected("Foo"));
        assert!(!s.equals_expected("foo"));
        assert!(!s.equals_expected(""));
    }

    #[test]
    fn empty_never_matches() {
        let e: Outcome = QueryOutcome::Empty;
        assert!(!e.equals_expected(""));
        assert!(!e.equals_expected("anything"));
    }

    #[test]
    fn node_set_comparison_always_fails() {
        let ns: QueryOutcome<u8> = QueryOutcome::NodeSet(vec![1, 2]);
        assert!(!ns.equals_expected("1"));
        assert_eq!(ns.to_string(), "[node-set of 2 elements]");
    }

    #[test]
    fn display_forms() {
        assert_eq!(Outcome::Boolean(true).to_string(), "1");
        assert_eq!(Outcome::Boolean(false).to_string(), "0");
        assert_eq!(Outcome::Numeric(42.5).to_string(), "42.5");
        assert_eq!(Outcome::String("P-1001".to_string()).to_string(), "P-1001");
        assert_eq!(Outcome::Empty.to_string(), "");
    }
}
