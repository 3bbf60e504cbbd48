//! Evaluation of a parsed XPath AST against a generic `DataSourceNode` tree.

use super::ast::{Axis, Expression, LocationPath, NodeTest, Step, UnaryOperator};
use super::{axes, functions, operators};
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XPathError;
use std::fmt;

/// The four result types of the XPath 1.0 value space.
#[derive(Debug, Clone)]
pub enum XPathValue<N> {
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, N: DataSourceNode<'a>> XPathValue<N> {
    /// Boolean coercion per XPath 1.0 `boolean()`.
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    /// Numeric coercion per XPath 1.0 `number()`. Unparseable text is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::String(s) => s.trim().parse().unwrap_or(f64::NAN),
            XPathValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            XPathValue::NodeSet(nodes) => {
                let s = nodes.first().map(|n| n.string_value()).unwrap_or_default();
                s.trim().parse().unwrap_or(f64::NAN)
            }
        }
    }
}

impl<'a, N: DataSourceNode<'a>> fmt::Display for XPathValue<N> {
    /// String coercion per XPath 1.0 `string()`: a node-set renders as the
    /// string value of its first node.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => write!(
                f,
                "{}",
                nodes.first().map(|n| n.string_value()).unwrap_or_default()
            ),
            XPathValue::String(s) => write!(f, "{}", s),
            XPathValue::Number(n) => write!(f, "{}", n),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Per-evaluation state. Positions are 1-based as in the XPath spec.
pub struct EvaluationContext<N> {
    pub context_node: N,
    pub root_node: N,
    pub context_position: usize,
    pub context_size: usize,
}

impl<N: Copy> EvaluationContext<N> {
    pub fn new(context_node: N, root_node: N, position: usize, size: usize) -> Self {
        Self {
            context_node,
            root_node,
            context_position: position,
            context_size: size,
        }
    }

    /// A fresh context rooted at the same document but focused on `node`.
    fn focused(&self, node: N, position: usize, size: usize) -> Self {
        Self::new(node, self.root_node, position, size)
    }
}

/// Evaluates an expression to a concrete `XPathValue`.
pub fn evaluate<'a, N>(
    expr: &Expression,
    ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::LocationPath(path) => {
            Ok(XPathValue::NodeSet(evaluate_location_path(path, ctx)?))
        }
        Expression::FunctionCall { name, args } => {
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(evaluate(arg, ctx)?);
            }
            functions::call(name, evaluated, ctx)
        }
        Expression::BinaryOp { left, op, right } => {
            let left = evaluate(left, ctx)?;
            let right = evaluate(right, ctx)?;
            operators::evaluate(*op, left, right)
        }
        Expression::UnaryOp { op, expr } => {
            let value = evaluate(expr, ctx)?;
            match op {
                UnaryOperator::Minus => Ok(XPathValue::Number(-value.to_number())),
            }
        }
    }
}

fn evaluate_location_path<'a, N>(
    path: &LocationPath,
    ctx: &EvaluationContext<N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut current: Vec<N> = if let Some(start) = &path.start_point {
        match evaluate(start, ctx)? {
            XPathValue::NodeSet(nodes) => nodes,
            // A non-node start expression yields an empty path.
            _ => return Ok(vec![]),
        }
    } else if path.is_absolute {
        vec![ctx.root_node]
    } else {
        vec![ctx.context_node]
    };

    for step in &path.steps {
        current = evaluate_step(step, &current, ctx)?;
    }
    Ok(current)
}

/// Axis collection, node test filtering, then predicate filtering.
fn evaluate_step<'a, N>(
    step: &Step,
    context_nodes: &[N],
    ctx: &EvaluationContext<N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let collected = axes::collect(step.axis, context_nodes);
    let tested: Vec<N> = collected
        .into_iter()
        .filter(|node| matches_node_test(*node, &step.node_test, step.axis))
        .collect();
    apply_predicates(&tested, &step.predicates, ctx)
}

fn matches_node_test<'a, N>(node: N, test: &NodeTest, axis: Axis) -> bool
where
    N: DataSourceNode<'a> + 'a,
{
    match test {
        NodeTest::Name(name) => node.name().is_some_and(|q| q.local_part == name),
        NodeTest::Wildcard => match axis {
            Axis::Attribute => node.node_type() == NodeType::Attribute,
            _ => node.node_type() == NodeType::Element,
        },
        NodeTest::Text => node.node_type() == NodeType::Text,
        NodeTest::Comment => node.node_type() == NodeType::Comment,
        NodeTest::ProcessingInstruction => {
            node.node_type() == NodeType::ProcessingInstruction
        }
        NodeTest::AnyNode => true,
    }
}

fn apply_predicates<'a, N>(
    nodes: &[N],
    predicates: &[Expression],
    ctx: &EvaluationContext<N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut current = nodes.to_vec();
    for predicate in predicates {
        let size = current.len();
        let mut kept = Vec::new();
        for (i, node) in current.iter().enumerate() {
            let node_ctx = ctx.focused(*node, i + 1, size);
            let result = evaluate(predicate, &node_ctx)?;
            // A bare number predicate selects by position.
            let keep = match result {
                XPathValue::Number(n) => n as usize == i + 1,
                other => other.to_bool(),
            };
            if keep {
                kept.push(*node);
            }
        }
        current = kept;
    }
    Ok(current)
}
