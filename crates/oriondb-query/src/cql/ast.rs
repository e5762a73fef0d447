//! CQL's parsed representation: a tagged variant, not a visitor-dispatched
//! class hierarchy.

use crate::cql::lexer::CmpOp;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Num(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Comparison {
        field: String,
        op: CmpOp,
        value: Value,
    },
}
