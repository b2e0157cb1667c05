//! Sandboxed expression language
//!
//! Custom conditions and custom logic combinators are authored as strings
//! in a small fixed-grammar language: boolean algebra, comparisons,
//! arithmetic, identifiers resolved through a caller-supplied scope, and
//! an allow-listed function set. There is no way to reach the host
//! environment from an expression; unknown identifiers and functions are
//! evaluation errors.

pub mod ast;
pub mod eval;
pub mod parser;

pub use ast::{BinOp, Expr, UnaryOp};
pub use eval::{call_builtin, evaluate, EvalScope};
pub use parser::{parse, ParseError};
