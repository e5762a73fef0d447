//! CQL: a small query language that compiles to the same game-id
//! resolution the fluent [`crate::builder::QueryBuilder`] uses.

pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod parser;

pub use ast::{Expr, Value};
pub use compiler::{compile, count, execute, matching_game_ids, CompiledQuery};
pub use lexer::{CmpOp, Token};
