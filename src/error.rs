use thiserror::Error;
use xmlcheck_xpath::XPathError;

#[derive(Error, Debug)]
pub enum CheckError {
    /// A node-matching query was evaluated with no document present. This is
    /// never coerced to an Empty outcome: Empty means "document present,
    /// zero matches".
    #[error("cannot match a node query when no data is available (query: '{query}')")]
    NoDataAvailable { query: String },

    /// The engine returned a node sequence this crate cannot classify, e.g.
    /// a selection of only comments or processing instructions.
    #[error("query result shape cannot be classified (query: '{query}')")]
    UnsupportedResultShape { query: String },

    #[error("XPath error: {0}")]
    Query(#[from] XPathError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),
}
