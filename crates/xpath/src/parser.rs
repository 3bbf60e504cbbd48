//! A `nom`-based parser for the XPath 1.0 expression language.
//!
//! Queries are routinely embedded in XML test definitions, so the relational
//! operators also accept their entity-escaped forms (`&lt;`, `&gt;=`, ...).

use super::ast::*;
use crate::error::XPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, opt, peek, recognize},
    multi::{many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
};

/// Parses a complete expression, failing if any input is left over.
pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    match expression(input.trim()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(XPathError::Parse(
            input.to_string(),
            format!("trailing input: '{}'", rem),
        )),
        Err(e) => Err(XPathError::Parse(input.to_string(), e.to_string())),
    }
}

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

/// Folds a left-associative chain of `sub op sub op sub ...` into nested
/// `BinaryOp` nodes.
fn binary_chain<'a, F, G>(
    sub_expr: F,
    op: G,
) -> impl FnMut(&'a str) -> IResult<&'a str, Expression>
where
    F: Parser<&'a str, Output = Expression, Error = nom::error::Error<&'a str>> + Clone,
    G: Parser<&'a str, Output = BinaryOperator, Error = nom::error::Error<&'a str>> + Clone,
{
    move |input: &str| {
        let (input, mut left) = sub_expr.clone().parse(input)?;
        let (input, rest) = many0(pair(ws(op.clone()), sub_expr.clone())).parse(input)?;
        for (op, right) in rest {
            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok((input, left))
    }
}

// --- Precedence chain, loosest binding first ---

fn expression(input: &str) -> IResult<&str, Expression> {
    binary_chain(and_expr, or_op)(input)
}

fn or_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(tag("or"), |_| BinaryOperator::Or).parse(input)
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(equality_expr, and_op)(input)
}

fn and_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(tag("and"), |_| BinaryOperator::And).parse(input)
}

fn equality_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(relational_expr, equality_op)(input)
}

fn equality_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(tag("="), |_| BinaryOperator::Equals),
        map(tag("!="), |_| BinaryOperator::NotEquals),
    ))
    .parse(input)
}

fn relational_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(alt((tag("<="), tag("&lt;="))), |_| {
            BinaryOperator::LessThanOrEqual
        }),
        map(alt((tag(">="), tag("&gt;="))), |_| {
            BinaryOperator::GreaterThanOrEqual
        }),
        map(alt((tag("<"), tag("&lt;"))), |_| BinaryOperator::LessThan),
        map(alt((tag(">"), tag("&gt;"))), |_| BinaryOperator::GreaterThan),
    ))
    .parse(input)
}

fn relational_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(additive_expr, relational_op)(input)
}

fn additive_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(multiplicative_expr, additive_op)(input)
}

fn additive_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(char('+'), |_| BinaryOperator::Plus),
        map(char('-'), |_| BinaryOperator::Minus),
    ))
    .parse(input)
}

fn multiplicative_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(unary_expr, multiplicative_op)(input)
}

fn multiplicative_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(char('*'), |_| BinaryOperator::Multiply),
        map(tag("div"), |_| BinaryOperator::Divide),
        map(tag("mod"), |_| BinaryOperator::Modulo),
    ))
    .parse(input)
}

fn unary_expr(input: &str) -> IResult<&str, Expression> {
    let (i, neg) = opt(ws(char('-'))).parse(input)?;
    let (i, expr) = union_expr(i)?;
    if neg.is_some() {
        Ok((
            i,
            Expression::UnaryOp {
                op: UnaryOperator::Minus,
                expr: Box::new(expr),
            },
        ))
    } else {
        Ok((i, expr))
    }
}

fn union_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(path_expr, union_op)(input)
}

fn union_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(char('|'), |_| BinaryOperator::Union).parse(input)
}

/// Handles the ambiguity between location paths and primary expressions that
/// may be continued by a path (e.g. `string(foo)/bar`).
fn path_expr(input: &str) -> IResult<&str, Expression> {
    // Primary expressions must win first: `count()` parses as a function
    // call, not as a step named `count` followed by stray parens.
    let (i, start) =
        alt((primary_expr, map(location_path, Expression::LocationPath))).parse(input)?;

    let (i, continuation) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(i)?;
    if continuation.is_empty() {
        return Ok((i, start));
    }

    let (start_point, is_absolute, mut steps) = match start {
        Expression::LocationPath(lp) => (lp.start_point, lp.is_absolute, lp.steps),
        other => (Some(Box::new(other)), false, vec![]),
    };
    append_steps(&mut steps, continuation);

    Ok((
        i,
        Expression::LocationPath(LocationPath {
            start_point,
            is_absolute,
            steps,
        }),
    ))
}

/// Expands `//` separators into the implied `descendant-or-self::node()` step.
fn append_steps(steps: &mut Vec<Step>, parsed: Vec<(&str, Step)>) {
    for (sep, next) in parsed {
        if sep == "//" {
            steps.push(descendant_or_self_step());
        }
        steps.push(next);
    }
}

fn descendant_or_self_step() -> Step {
    Step {
        axis: Axis::DescendantOrSelf,
        node_test: NodeTest::AnyNode,
        predicates: vec![],
    }
}

fn primary_expr(input: &str) -> IResult<&str, Expression> {
    ws(alt((
        map(double, Expression::Number),
        map(string_literal, Expression::Literal),
        function_call,
        delimited(ws(char('(')), expression, ws(char(')'))),
    )))
    .parse(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn nc_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
    ))
    .parse(input)
}

fn q_name(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(nc_name, opt(pair(tag(":"), nc_name)))),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn node_type_test(input: &str) -> IResult<&str, NodeTest> {
    map(
        terminated(
            alt((
                tag("text"),
                tag("node"),
                tag("comment"),
                tag("processing-instruction"),
            )),
            pair(ws(char('(')), ws(char(')'))),
        ),
        |kind: &str| match kind {
            "text" => NodeTest::Text,
            "comment" => NodeTest::Comment,
            "processing-instruction" => NodeTest::ProcessingInstruction,
            _ => NodeTest::AnyNode,
        },
    )
    .parse(input)
}

fn node_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        map(tag("*"), |_| NodeTest::Wildcard),
        node_type_test,
        map(q_name, NodeTest::Name),
    ))
    .parse(input)
}

fn axis(input: &str) -> IResult<&str, Axis> {
    map(
        pair(
            alt((
                tag("child"),
                tag("descendant-or-self"),
                tag("descendant"),
                tag("attribute"),
                tag("parent"),
                tag("ancestor"),
                tag("self"),
                tag("following-sibling"),
                tag("preceding-sibling"),
                tag("following"),
                tag("preceding"),
            )),
            tag("::"),
        ),
        |(name, _)| match name {
            "descendant-or-self" => Axis::DescendantOrSelf,
            "descendant" => Axis::Descendant,
            "attribute" => Axis::Attribute,
            "parent" => Axis::Parent,
            "ancestor" => Axis::Ancestor,
            "self" => Axis::SelfAxis,
            "following-sibling" => Axis::FollowingSibling,
            "preceding-sibling" => Axis::PrecedingSibling,
            "following" => Axis::Following,
            "preceding" => Axis::Preceding,
            _ => Axis::Child,
        },
    )
    .parse(input)
}

fn predicate(input: &str) -> IResult<&str, Expression> {
    delimited(ws(char('[')), expression, ws(char(']'))).parse(input)
}

fn step(input: &str) -> IResult<&str, Step> {
    let (i, (axis, node_test)) = alt((
        // Abbreviations: `..` is parent::node(), `.` is self::node().
        map(tag(".."), |_| (Axis::Parent, NodeTest::AnyNode)),
        map(tag("."), |_| (Axis::SelfAxis, NodeTest::AnyNode)),
        map(preceded(char('@'), node_test), |nt| (Axis::Attribute, nt)),
        map(pair(opt(axis), node_test), |(ax, nt)| {
            (ax.unwrap_or(Axis::Child), nt)
        }),
    ))
    .parse(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    Ok((
        i,
        Step {
            axis,
            node_test,
            predicates,
        },
    ))
}

fn location_path(input: &str) -> IResult<&str, LocationPath> {
    let (i, (is_absolute, mut steps)) =
        if let Ok((rem, _)) = tag::<&str, &str, nom::error::Error<&str>>("//")(input) {
            let (rem, first) = step(rem)?;
            (rem, (true, vec![descendant_or_self_step(), first]))
        } else if let Ok((rem, _)) = tag::<&str, &str, nom::error::Error<&str>>("/")(input) {
            match step(rem) {
                Ok((rem, first)) => (rem, (true, vec![first])),
                // A path that is just "/" selects the root.
                Err(_) => (rem, (true, vec![])),
            }
        } else {
            let (rem, first) = step(input)?;
            (rem, (false, vec![first]))
        };

    let (i, rest) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(i)?;
    append_steps(&mut steps, rest);

    Ok((
        i,
        LocationPath {
            start_point: None,
            is_absolute,
            steps,
        },
    ))
}

fn function_call(input: &str) -> IResult<&str, Expression> {
    // A function call is a QName followed by '('. The lookahead prevents a
    // bare step name from being parsed as a function.
    let (i, name) = q_name(input)?;
    let (i, _) = peek(ws(char('('))).parse(i)?;

    // Node-type tests are handled by the step parser, not here.
    if matches!(
        name.as_str(),
        "text" | "node" | "comment" | "processing-instruction"
    ) {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }

    let (i, _) = multispace0(i)?;
    let (i, args) = delimited(
        char('('),
        separated_list0(ws(char(',')), expression),
        char(')'),
    )
    .parse(i)?;

    Ok((i, Expression::FunctionCall { name, args }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_step(name: &str) -> Step {
        Step {
            axis: Axis::Child,
            node_test: NodeTest::Name(name.to_string()),
            predicates: vec![],
        }
    }

    fn path(steps: Vec<Step>) -> Expression {
        Expression::LocationPath(LocationPath {
            start_point: None,
            is_absolute: false,
            steps,
        })
    }

    #[test]
    fn simple_relative_path() {
        let expr = parse_expression("Result/Item").unwrap();
        assert_eq!(expr, path(vec![name_step("Result"), name_step("Item")]));
    }

    #[test]
    fn absolute_and_descendant_paths() {
        let expr = parse_expression("//Item").unwrap();
        assert_eq!(
            expr,
            Expression::LocationPath(LocationPath {
                start_point: None,
                is_absolute: true,
                steps: vec![descendant_or_self_step(), name_step("Item")],
            })
        );

        let expr = parse_expression("/Result").unwrap();
        assert_eq!(
            expr,
            Expression::LocationPath(LocationPath {
                start_point: None,
                is_absolute: true,
                steps: vec![name_step("Result")],
            })
        );
    }

    #[test]
    fn attribute_abbreviation() {
        let expr = parse_expression("Item[@type = 'Part']").unwrap();
        let Expression::LocationPath(lp) = expr else {
            panic!("expected location path");
        };
        assert_eq!(lp.steps.len(), 1);
        let Expression::BinaryOp { left, op, right } = &lp.steps[0].predicates[0] else {
            panic!("expected comparison predicate");
        };
        assert_eq!(*op, BinaryOperator::Equals);
        let Expression::LocationPath(attr_path) = left.as_ref() else {
            panic!("expected attribute path");
        };
        assert_eq!(attr_path.steps[0].axis, Axis::Attribute);
        assert_eq!(**right, Expression::Literal("Part".to_string()));
    }

    #[test]
    fn numeric_and_positional_predicates() {
        let expr = parse_expression("Item[2]").unwrap();
        let Expression::LocationPath(lp) = expr else {
            panic!("expected location path");
        };
        assert_eq!(lp.steps[0].predicates, vec![Expression::Number(2.0)]);

        let expr = parse_expression("Item[position()=2]").unwrap();
        let Expression::LocationPath(lp) = expr else {
            panic!("expected location path");
        };
        assert!(matches!(
            lp.steps[0].predicates[0],
            Expression::BinaryOp { .. }
        ));
    }

    #[test]
    fn node_type_tests() {
        let expr = parse_expression("Item/text()").unwrap();
        let Expression::LocationPath(lp) = expr else {
            panic!("expected location path");
        };
        assert_eq!(lp.steps[1].node_test, NodeTest::Text);

        let expr = parse_expression("comment()").unwrap();
        let Expression::LocationPath(lp) = expr else {
            panic!("expected location path");
        };
        assert_eq!(lp.steps[0].node_test, NodeTest::Comment);
    }

    #[test]
    fn dot_abbreviations() {
        let expr = parse_expression(".").unwrap();
        let Expression::LocationPath(lp) = expr else {
            panic!("expected location path");
        };
        assert_eq!(lp.steps[0].axis, Axis::SelfAxis);
        assert_eq!(lp.steps[0].node_test, NodeTest::AnyNode);

        let expr = parse_expression("../Item").unwrap();
        let Expression::LocationPath(lp) = expr else {
            panic!("expected location path");
        };
        assert_eq!(lp.steps[0].axis, Axis::Parent);
        assert_eq!(lp.steps[1].node_test, NodeTest::Name("Item".to_string()));
    }

    #[test]
    fn explicit_axes() {
        let expr = parse_expression("following-sibling::Item").unwrap();
        let Expression::LocationPath(lp) = expr else {
            panic!("expected location path");
        };
        assert_eq!(lp.steps[0].axis, Axis::FollowingSibling);

        let expr = parse_expression("ancestor::*").unwrap();
        let Expression::LocationPath(lp) = expr else {
            panic!("expected location path");
        };
        assert_eq!(lp.steps[0].axis, Axis::Ancestor);
        assert_eq!(lp.steps[0].node_test, NodeTest::Wildcard);
    }

    #[test]
    fn operator_precedence() {
        let expr = parse_expression("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expression::BinaryOp {
                left: Box::new(Expression::Number(1.0)),
                op: BinaryOperator::Plus,
                right: Box::new(Expression::BinaryOp {
                    left: Box::new(Expression::Number(2.0)),
                    op: BinaryOperator::Multiply,
                    right: Box::new(Expression::Number(3.0)),
                }),
            }
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse_expression("a = 'x' or b = 'y' and c = 'z'").unwrap();
        let Expression::BinaryOp { op, right, .. } = expr else {
            panic!("expected binary op");
        };
        assert_eq!(op, BinaryOperator::Or);
        assert!(matches!(
            *right,
            Expression::BinaryOp {
                op: BinaryOperator::And,
                ..
            }
        ));
    }

    #[test]
    fn unary_minus() {
        let expr = parse_expression("-5").unwrap();
        assert_eq!(
            expr,
            Expression::UnaryOp {
                op: UnaryOperator::Minus,
                expr: Box::new(Expression::Number(5.0)),
            }
        );
    }

    #[test]
    fn entity_escaped_relational_operators() {
        let expr = parse_expression("cost &lt; 100").unwrap();
        let Expression::BinaryOp { op, .. } = expr else {
            panic!("expected binary op");
        };
        assert_eq!(op, BinaryOperator::LessThan);

        let expr = parse_expression("cost &gt;= 10").unwrap();
        let Expression::BinaryOp { op, .. } = expr else {
            panic!("expected binary op");
        };
        assert_eq!(op, BinaryOperator::GreaterThanOrEqual);
    }

    #[test]
    fn function_call_with_path_continuation() {
        let expr = parse_expression("count(//Item)").unwrap();
        let Expression::FunctionCall { name, args } = expr else {
            panic!("expected function call");
        };
        assert_eq!(name, "count");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn string_literals_both_quote_styles() {
        assert_eq!(
            parse_expression("'hello'").unwrap(),
            Expression::Literal("hello".to_string())
        );
        assert_eq!(
            parse_expression("\"world\"").unwrap(),
            Expression::Literal("world".to_string())
        );
    }

    #[test]
    fn trailing_input_is_rejected() {
        assert!(parse_expression("Item)").is_err());
    }
}
