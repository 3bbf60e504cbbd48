//! Assertion-evaluation engine for XML test harnesses.
//!
//! Given an XML document returned by a remote system, a query expression with
//! optional dynamic `x:Name()` tokens, and a per-evaluation [`TestContext`],
//! this crate substitutes the tokens, evaluates the query and classifies the
//! result into a typed [`QueryOutcome`] that can be compared against an
//! expected literal with type-appropriate equality rules.
//!
//! ```
//! use xmlcheck::{TestContext, UtcFormatter, XmlDocument, evaluate_and_compare};
//!
//! let doc = XmlDocument::parse("<Item><item_number>P-1001</item_number></Item>").unwrap();
//! let ctx = TestContext::capture("ACME", "U-42", &UtcFormatter);
//! let ok = evaluate_and_compare("/Item/item_number", Some(&doc), &ctx, "P-1001").unwrap();
//! assert!(ok);
//! ```

pub mod context;
pub mod document;
pub mod error;
pub mod outcome;
pub mod tokens;

pub use context::{TestContext, TimeFormatter, UtcFormatter, new_id};
pub use document::{XmlDocument, XmlNode};
pub use error::CheckError;
pub use outcome::QueryOutcome;
pub use tokens::substitute;

use xmlcheck_xpath::{EvaluationContext, parse_expression};

/// Placeholder root used when no document has been retrieved yet. Scalar
/// queries still evaluate; node-matching queries fail with `NoDataAvailable`.
const EMPTY_DOCUMENT: &str = "<_NoData/>";

/// Substitutes tokens in `raw_query`, evaluates it against `document` and
/// classifies the result. `document` is `None` when no data has been
/// retrieved yet; that is a first-class condition, not an error, unless the
/// query needs node output.
pub fn evaluate<'d>(
    raw_query: &str,
    document: Option<&'d XmlDocument<'d>>,
    ctx: &TestContext,
) -> Result<QueryOutcome<XmlNode<'d, 'd>>, CheckError> {
    let query = tokens::substitute(raw_query, ctx);
    let expr = parse_expression(&query)?;

    match document {
        Some(doc) => {
            let root = doc.root_node();
            let e_ctx = EvaluationContext::new(root, root, 1, 1);
            let raw = xmlcheck_xpath::evaluate(&expr, &e_ctx)?;
            let outcome = outcome::classify(raw, true, raw_query)?;
            log::debug!("'{}' classified as {:?}", raw_query, outcome);
            Ok(outcome)
        }
        None => {
            let placeholder = XmlDocument::parse(EMPTY_DOCUMENT)?;
            let root = placeholder.root_node();
            let e_ctx = EvaluationContext::new(root, root, 1, 1);
            let raw = xmlcheck_xpath::evaluate(&expr, &e_ctx)?;
            // Only scalar outcomes can escape the placeholder's lifetime;
            // classify already rejected every node-set shape.
            match outcome::classify(raw, false, raw_query)? {
                QueryOutcome::Boolean(b) => Ok(QueryOutcome::Boolean(b)),
                QueryOutcome::Numeric(n) => Ok(QueryOutcome::Numeric(n)),
                QueryOutcome::String(s) => Ok(QueryOutcome::String(s)),
                QueryOutcome::Empty | QueryOutcome::NodeSet(_) => {
                    Err(CheckError::NoDataAvailable {
                        query: raw_query.to_string(),
                    })
                }
            }
        }
    }
}

/// The single entry point a test runner needs: evaluate `raw_query` and
/// compare the outcome against `expected`.
pub fn evaluate_and_compare(
    raw_query: &str,
    document: Option<&XmlDocument<'_>>,
    ctx: &TestContext,
    expected: &str,
) -> Result<bool, CheckError> {
    let outcome = evaluate(raw_query, document, ctx)?;
    let matched = outcome.equals_expected(expected);
    if !matched {
        log::debug!(
            "assertion mismatch for '{}': expected '{}', got '{}'",
            raw_query,
            expected,
            outcome
        );
    }
    Ok(matched)
}
