//! Expression AST nodes

use crate::types::Value;
use serde::{Deserialize, Serialize};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    // Comparison operators
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,

    // Arithmetic operators
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Sub,
    /// Multiplication (*)
    Mul,
    /// Division (/)
    Div,
    /// Modulo (%)
    Mod,

    // Logical operators
    /// Logical AND (&&)
    And,
    /// Logical OR (||)
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical NOT (!)
    Not,
    /// Arithmetic negation (-)
    Negate,
}

/// Expression AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal value
    Literal(Value),

    /// Identifier path (e.g., actual, meta.amount)
    Ident(Vec<String>),

    /// Array literal
    Array(Vec<Expr>),

    /// Binary operation
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },

    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Allow-listed function call
    Call { name: String, args: Vec<Expr> },

    /// Ternary conditional (condition ? true_expr : false_expr)
    Ternary {
        condition: Box<Expr>,
        true_expr: Box<Expr>,
        false_expr: Box<Expr>,
    },
}

impl Expr {
    /// Create a literal expression
    pub fn literal(value: Value) -> Self {
        Expr::Literal(value)
    }

    /// Create an identifier expression
    pub fn ident(path: Vec<String>) -> Self {
        Expr::Ident(path)
    }

    /// Create a binary expression
    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Create a function call expression
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_expression() {
        // actual > 18
        let expr = Expr::binary(
            Expr::ident(vec!["actual".to_string()]),
            BinOp::Gt,
            Expr::literal(Value::Number(18.0)),
        );

        match expr {
            Expr::Binary { left, op, right } => {
                assert_eq!(op, BinOp::Gt);
                assert_eq!(*left, Expr::Ident(vec!["actual".to_string()]));
                assert_eq!(*right, Expr::Literal(Value::Number(18.0)));
            }
            _ => panic!("Expected Binary expression"),
        }
    }

    #[test]
    fn test_call_expression() {
        let expr = Expr::call(
            "is_number",
            vec![Expr::ident(vec!["actual".to_string()])],
        );

        match expr {
            Expr::Call { name, args } => {
                assert_eq!(name, "is_number");
                assert_eq!(args.len(), 1);
            }
            _ => panic!("Expected Call expression"),
        }
    }

    #[test]
    fn test_expression_clone() {
        let expr = Expr::binary(
            Expr::literal(Value::Number(5.0)),
            BinOp::Add,
            Expr::literal(Value::Number(3.0)),
        );
        assert_eq!(expr.clone(), expr);
    }
}
