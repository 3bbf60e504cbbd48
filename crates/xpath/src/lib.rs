pub mod ast;
pub mod axes;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, Step};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use engine::{EvaluationContext, XPathValue, evaluate};
pub use error::XPathError;
pub use parser::parse_expression;

// Mock tree utilities, re-exported so downstream crates can integration-test
// against a known document shape.
pub use datasource::mock;
