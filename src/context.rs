//! Per-evaluation runtime context: tenant, session principal, captured time
//! and the per-evaluation fixed identifier.

use chrono::{DateTime, Utc};

/// Formats a timestamp the way the remote system expects it (locale and
/// timezone rules are opaque to this crate and supplied by the connection
/// layer).
pub trait TimeFormatter {
    fn format(&self, instant: DateTime<Utc>) -> String;
}

/// Default formatter: ISO-8601 seconds precision, UTC.
pub struct UtcFormatter;

impl TimeFormatter for UtcFormatter {
    fn format(&self, instant: DateTime<Utc>) -> String {
        instant.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// Immutable snapshot of the facts a single evaluation needs. Constructed
/// right before an evaluation and discarded after it; never shared between
/// evaluations, so every evaluation sees its own instant and fixed id.
#[derive(Debug, Clone)]
pub struct TestContext {
    pub database: String,
    pub user_id: String,
    /// The current instant, formatted eagerly at construction. Every token
    /// reference within one evaluation resolves to this same text.
    pub now_text: String,
    /// Generated eagerly at construction; every `FixedNewId` reference within
    /// one evaluation resolves to this same value.
    pub fixed_id: String,
}

impl TestContext {
    pub fn capture(
        database: impl Into<String>,
        user_id: impl Into<String>,
        formatter: &dyn TimeFormatter,
    ) -> Self {
        Self {
            database: database.into(),
            user_id: user_id.into(),
            now_text: formatter.format(Utc::now()),
            fixed_id: new_id(),
        }
    }
}

/// A fresh 128-bit identifier as 32 uppercase hex characters, no separators.
/// Guaranteed free of quote delimiters, so it can be spliced into a query as
/// a string literal.
pub fn new_id() -> String {
    format!("{:032X}", rand::random::<u128>())
}
