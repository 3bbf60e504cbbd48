//! The XPath 1.0 core function library.

use crate::datasource::DataSourceNode;
use crate::engine::{EvaluationContext, XPathValue};
use crate::error::XPathError;

/// Dispatches a function call by name.
pub fn call<'a, N>(
    name: &str,
    args: Vec<XPathValue<N>>,
    ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match name {
        // Node-set
        "count" => count(name, args),
        "sum" => sum(name, args),
        "position" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Number(ctx.context_position as f64))
        }
        "last" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Number(ctx.context_size as f64))
        }
        "name" => node_name(name, args, ctx, false),
        "local-name" => node_name(name, args, ctx, true),

        // String
        "string" => {
            arity(name, &args, 0, 1)?;
            Ok(XPathValue::String(match args.into_iter().next() {
                Some(v) => v.to_string(),
                None => ctx.context_node.string_value(),
            }))
        }
        "concat" => concat(name, args),
        "starts-with" => {
            let [a, b] = two_strings(name, args)?;
            Ok(XPathValue::Boolean(a.starts_with(&b)))
        }
        "contains" => {
            let [a, b] = two_strings(name, args)?;
            Ok(XPathValue::Boolean(a.contains(&b)))
        }
        "substring-before" => {
            let [a, b] = two_strings(name, args)?;
            let result = a.find(&b).map(|i| a[..i].to_string()).unwrap_or_default();
            Ok(XPathValue::String(result))
        }
        "substring-after" => {
            let [a, b] = two_strings(name, args)?;
            let result = a
                .find(&b)
                .map(|i| a[i + b.len()..].to_string())
                .unwrap_or_default();
            Ok(XPathValue::String(result))
        }
        "substring" => substring(name, args),
        "string-length" => {
            arity(name, &args, 0, 1)?;
            let s = match args.into_iter().next() {
                Some(v) => v.to_string(),
                None => ctx.context_node.string_value(),
            };
            Ok(XPathValue::Number(s.chars().count() as f64))
        }
        "normalize-space" => {
            arity(name, &args, 0, 1)?;
            let s = match args.into_iter().next() {
                Some(v) => v.to_string(),
                None => ctx.context_node.string_value(),
            };
            Ok(XPathValue::String(
                s.split_whitespace().collect::<Vec<_>>().join(" "),
            ))
        }
        "translate" => translate(name, args),

        // Boolean
        "boolean" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Boolean(args[0].to_bool()))
        }
        "not" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Boolean(!args[0].to_bool()))
        }
        "true" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Boolean(true))
        }
        "false" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Boolean(false))
        }

        // Number
        "number" => {
            arity(name, &args, 0, 1)?;
            let n = match args.into_iter().next() {
                Some(v) => v.to_number(),
                None => {
                    let s = ctx.context_node.string_value();
                    s.trim().parse().unwrap_or(f64::NAN)
                }
            };
            Ok(XPathValue::Number(n))
        }
        "floor" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Number(args[0].to_number().floor()))
        }
        "ceiling" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Number(args[0].to_number().ceil()))
        }
        "round" => {
            arity(name, &args, 1, 1)?;
            // XPath rounds halves towards positive infinity.
            Ok(XPathValue::Number((args[0].to_number() + 0.5).floor()))
        }

        _ => Err(XPathError::Function {
            function: name.to_string(),
            message: "unknown XPath function".to_string(),
        }),
    }
}

fn arity<N>(
    name: &str,
    args: &[XPathValue<N>],
    min: usize,
    max: usize,
) -> Result<(), XPathError> {
    if args.len() < min || args.len() > max {
        return Err(XPathError::Function {
            function: name.to_string(),
            message: format!(
                "expected {} argument(s), got {}",
                if min == max {
                    min.to_string()
                } else {
                    format!("{}..{}", min, max)
                },
                args.len()
            ),
        });
    }
    Ok(())
}

fn two_strings<'a, N>(name: &str, args: Vec<XPathValue<N>>) -> Result<[String; 2], XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    arity(name, &args, 2, 2)?;
    let mut it = args.into_iter();
    let a = it.next().map(|v| v.to_string()).unwrap_or_default();
    let b = it.next().map(|v| v.to_string()).unwrap_or_default();
    Ok([a, b])
}

fn take_node_set<'a, N>(name: &str, value: XPathValue<N>) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match value {
        XPathValue::NodeSet(nodes) => Ok(nodes),
        other => Err(XPathError::Function {
            function: name.to_string(),
            message: format!("expected a node-set argument, got {:?}", other),
        }),
    }
}

fn count<'a, N>(name: &str, args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    arity(name, &args, 1, 1)?;
    let nodes = take_node_set(name, args.into_iter().next().unwrap())?;
    Ok(XPathValue::Number(nodes.len() as f64))
}

fn sum<'a, N>(name: &str, args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    arity(name, &args, 1, 1)?;
    let nodes = take_node_set(name, args.into_iter().next().unwrap())?;
    let total = nodes
        .iter()
        .map(|n| n.string_value().trim().parse().unwrap_or(f64::NAN))
        .sum();
    Ok(XPathValue::Number(total))
}

fn concat<'a, N>(name: &str, args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    if args.len() < 2 {
        return Err(XPathError::Function {
            function: name.to_string(),
            message: format!("expected at least 2 arguments, got {}", args.len()),
        });
    }
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.to_string());
    }
    Ok(XPathValue::String(out))
}

fn substring<'a, N>(name: &str, args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    arity(name, &args, 2, 3)?;
    let mut it = args.into_iter();
    let s = it.next().unwrap().to_string();
    // Positions are 1-based and round per the XPath rules; a NaN bound
    // selects nothing.
    let start = (it.next().unwrap().to_number() + 0.5).floor();
    let end = match it.next() {
        Some(len) => start + (len.to_number() + 0.5).floor(),
        None => f64::INFINITY,
    };
    if start.is_nan() || end.is_nan() {
        return Ok(XPathValue::String(String::new()));
    }
    let out: String = s
        .chars()
        .enumerate()
        .filter(|(i, _)| {
            let position = (i + 1) as f64;
            position >= start && position < end
        })
        .map(|(_, c)| c)
        .collect();
    Ok(XPathValue::String(out))
}

fn translate<'a, N>(name: &str, args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    arity(name, &args, 3, 3)?;
    let mut it = args.into_iter();
    let s = it.next().unwrap().to_string();
    let from: Vec<char> = it.next().unwrap().to_string().chars().collect();
    let to: Vec<char> = it.next().unwrap().to_string().chars().collect();
    let out: String = s
        .chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(i) => to.get(i).copied(),
            None => Some(c),
        })
        .collect();
    Ok(XPathValue::String(out))
}

fn node_name<'a, N>(
    name: &str,
    args: Vec<XPathValue<N>>,
    ctx: &EvaluationContext<N>,
    local_only: bool,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    arity(name, &args, 0, 1)?;
    let node = match args.into_iter().next() {
        Some(value) => take_node_set(name, value)?.into_iter().next(),
        None => Some(ctx.context_node),
    };
    let text = node
        .and_then(|n| n.name())
        .map(|q| {
            if local_only {
                q.local_part.to_string()
            } else {
                match q.prefix {
                    Some(p) => format!("{}:{}", p, q.local_part),
                    None => q.local_part.to_string(),
                }
            }
        })
        .unwrap_or_default();
    Ok(XPathValue::String(text))
}
