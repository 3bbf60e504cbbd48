//! Substitution of dynamic `x:Name()` tokens in a raw query string.
//!
//! Tokens are recognized with a small `nom` scanner over the fixed grammar
//! (the `x` namespace, an identifier, an empty argument list) rather than a
//! regex, so malformed call sites simply fail to match and pass through
//! verbatim. Tokens with arguments are outside the grammar and are left
//! untouched; callers must not rely on them.

use crate::context::{TestContext, new_id};
use nom::{
    IResult, Parser,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::char,
    combinator::recognize,
    sequence::{delimited, pair},
};

/// Rewrites every well-formed dynamic token in `raw` to a quoted literal.
/// This is a pure text pass; it runs before the query ever reaches the XPath
/// parser, and it does not care about quoting context inside the query.
pub fn substitute(raw: &str, ctx: &TestContext) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while !rest.is_empty() {
        if let Ok((remainder, ident)) = dynamic_token(rest) {
            out.push_str(&resolve(ident, ctx));
            rest = remainder;
        } else {
            let mut chars = rest.chars();
            // The scanner failed at this position, emit one char and retry.
            out.push(chars.next().unwrap_or_default());
            rest = chars.as_str();
        }
    }
    log::debug!("substituted query: {}", out);
    out
}

/// `x:Identifier()`: the empty parens are part of the grammar, so
/// `x:Something(arg)` does not match.
fn dynamic_token(input: &str) -> IResult<&str, &str> {
    delimited(tag("x:"), identifier, pair(char('('), char(')'))).parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

/// Maps a token identifier to its quoted literal. Unknown identifiers
/// degrade to the empty literal instead of failing the evaluation.
fn resolve(ident: &str, ctx: &TestContext) -> String {
    let value = match ident {
        "Database" => ctx.database.clone(),
        "UserId" => ctx.user_id.clone(),
        "Now" => ctx.now_text.clone(),
        "FixedNewId" => ctx.fixed_id.clone(),
        "NewId" => new_id(),
        _ => String::new(),
    };
    format!("'{}'", value)
}
