//! XPath 1.0 binary operator semantics, including the existential comparison
//! rules for node-sets.

use crate::ast::BinaryOperator;
use crate::datasource::DataSourceNode;
use crate::engine::XPathValue;
use crate::error::XPathError;
use std::cmp::Ordering;

pub fn evaluate<'a, N>(
    op: BinaryOperator,
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match op {
        BinaryOperator::Or => Ok(XPathValue::Boolean(left.to_bool() || right.to_bool())),
        BinaryOperator::And => Ok(XPathValue::Boolean(left.to_bool() && right.to_bool())),
        BinaryOperator::Equals => Ok(XPathValue::Boolean(equality(&left, &right, false))),
        BinaryOperator::NotEquals => Ok(XPathValue::Boolean(equality(&left, &right, true))),
        BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => {
            Ok(XPathValue::Boolean(relational(op, &left, &right)))
        }
        BinaryOperator::Plus => Ok(XPathValue::Number(left.to_number() + right.to_number())),
        BinaryOperator::Minus => Ok(XPathValue::Number(left.to_number() - right.to_number())),
        BinaryOperator::Multiply => Ok(XPathValue::Number(left.to_number() * right.to_number())),
        BinaryOperator::Divide => Ok(XPathValue::Number(left.to_number() / right.to_number())),
        BinaryOperator::Modulo => Ok(XPathValue::Number(left.to_number() % right.to_number())),
        BinaryOperator::Union => union(left, right),
    }
}

/// `=` and `!=`. For node-sets the comparison is existential: true if any
/// member pairing satisfies it.
fn equality<'a, N>(left: &XPathValue<N>, right: &XPathValue<N>, negate: bool) -> bool
where
    N: DataSourceNode<'a> + 'a,
{
    match (left, right) {
        (XPathValue::NodeSet(a), XPathValue::NodeSet(b)) => a.iter().any(|x| {
            let xs = x.string_value();
            b.iter().any(|y| (xs == y.string_value()) != negate)
        }),
        (XPathValue::NodeSet(nodes), XPathValue::Number(n))
        | (XPathValue::Number(n), XPathValue::NodeSet(nodes)) => nodes
            .iter()
            .any(|node| (node_number(node) == *n) != negate),
        (XPathValue::NodeSet(nodes), XPathValue::String(s))
        | (XPathValue::String(s), XPathValue::NodeSet(nodes)) => {
            nodes.iter().any(|node| (node.string_value() == *s) != negate)
        }
        (XPathValue::NodeSet(nodes), XPathValue::Boolean(b))
        | (XPathValue::Boolean(b), XPathValue::NodeSet(nodes)) => {
            (!nodes.is_empty() == *b) != negate
        }
        // No node-sets involved: booleans dominate, then numbers, then strings.
        (XPathValue::Boolean(_), _) | (_, XPathValue::Boolean(_)) => {
            (left.to_bool() == right.to_bool()) != negate
        }
        (XPathValue::Number(_), _) | (_, XPathValue::Number(_)) => {
            (left.to_number() == right.to_number()) != negate
        }
        _ => (left.to_string() == right.to_string()) != negate,
    }
}

/// `<`, `<=`, `>`, `>=`. Both sides coerce to numbers; for node-sets the
/// comparison is existential over member string values read as numbers.
fn relational<'a, N>(op: BinaryOperator, left: &XPathValue<N>, right: &XPathValue<N>) -> bool
where
    N: DataSourceNode<'a> + 'a,
{
    match (left, right) {
        (XPathValue::NodeSet(a), XPathValue::NodeSet(b)) => a
            .iter()
            .any(|x| b.iter().any(|y| ordered(op, node_number(x), node_number(y)))),
        (XPathValue::NodeSet(nodes), other) => {
            let rhs = other.to_number();
            nodes.iter().any(|node| ordered(op, node_number(node), rhs))
        }
        (other, XPathValue::NodeSet(nodes)) => {
            let lhs = other.to_number();
            nodes.iter().any(|node| ordered(op, lhs, node_number(node)))
        }
        _ => ordered(op, left.to_number(), right.to_number()),
    }
}

fn ordered(op: BinaryOperator, a: f64, b: f64) -> bool {
    let Some(ord) = a.partial_cmp(&b) else {
        // NaN compares false against everything.
        return false;
    };
    match op {
        BinaryOperator::LessThan => ord == Ordering::Less,
        BinaryOperator::LessThanOrEqual => ord != Ordering::Greater,
        BinaryOperator::GreaterThan => ord == Ordering::Greater,
        BinaryOperator::GreaterThanOrEqual => ord != Ordering::Less,
        _ => unreachable!("non-relational operator in relational comparison"),
    }
}

fn node_number<'a, N: DataSourceNode<'a>>(node: &N) -> f64 {
    node.string_value().trim().parse().unwrap_or(f64::NAN)
}

/// `|`: merge two node-sets, deduplicated, in document order.
fn union<'a, N>(left: XPathValue<N>, right: XPathValue<N>) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match (left, right) {
        (XPathValue::NodeSet(mut a), XPathValue::NodeSet(b)) => {
            a.extend(b);
            a.sort();
            a.dedup();
            Ok(XPathValue::NodeSet(a))
        }
        _ => Err(XPathError::Type(
            "operands of '|' must both be node-sets".to_string(),
        )),
    }
}
