//! Sandboxed expression evaluation
//!
//! Evaluation walks the AST with a caller-supplied `EvalScope` resolving
//! identifiers and function calls. The shared builtin set lives here;
//! scopes layer their own functions (e.g., the combinator's `all`/`any`)
//! on top and fall back to `call_builtin`.

use super::ast::{BinOp, Expr, UnaryOp};
use crate::error::{CoreError, Result};
use crate::types::Value;

/// Resolution environment for expression evaluation
pub trait EvalScope {
    /// Resolve an identifier path to a value
    fn lookup(&self, path: &[String]) -> Option<Value>;

    /// Invoke an allow-listed function
    fn call(&self, name: &str, args: &[Value]) -> Result<Value>;
}

/// Evaluate an expression within a scope
pub fn evaluate(expr: &Expr, scope: &dyn EvalScope) -> Result<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),

        Expr::Ident(path) => scope
            .lookup(path)
            .ok_or_else(|| CoreError::UnknownIdentifier(path.join("."))),

        Expr::Array(items) => {
            let values: Result<Vec<Value>> =
                items.iter().map(|item| evaluate(item, scope)).collect();
            Ok(Value::Array(values?))
        }

        Expr::Unary { op, operand } => {
            let value = evaluate(operand, scope)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                UnaryOp::Negate => {
                    let n = value.as_number().ok_or_else(|| {
                        CoreError::TypeError(format!("Cannot negate {}", value.type_name()))
                    })?;
                    Ok(Value::Number(-n))
                }
            }
        }

        Expr::Binary { left, op, right } => {
            // Logical operators short-circuit
            if *op == BinOp::And {
                let lhs = evaluate(left, scope)?;
                if !lhs.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let rhs = evaluate(right, scope)?;
                return Ok(Value::Bool(rhs.is_truthy()));
            }
            if *op == BinOp::Or {
                let lhs = evaluate(left, scope)?;
                if lhs.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let rhs = evaluate(right, scope)?;
                return Ok(Value::Bool(rhs.is_truthy()));
            }

            let lhs = evaluate(left, scope)?;
            let rhs = evaluate(right, scope)?;
            execute_binary(&lhs, *op, &rhs)
        }

        Expr::Call { name, args } => {
            let values: Result<Vec<Value>> =
                args.iter().map(|arg| evaluate(arg, scope)).collect();
            scope.call(name, &values?)
        }

        Expr::Ternary {
            condition,
            true_expr,
            false_expr,
        } => {
            let cond = evaluate(condition, scope)?;
            if cond.is_truthy() {
                evaluate(true_expr, scope)
            } else {
                evaluate(false_expr, scope)
            }
        }
    }
}

fn execute_binary(left: &Value, op: BinOp, right: &Value) -> Result<Value> {
    match op {
        BinOp::Eq => Ok(Value::Bool(left.coercive_eq(right))),
        BinOp::Ne => Ok(Value::Bool(!left.coercive_eq(right))),

        BinOp::Gt | BinOp::Ge | BinOp::Lt | BinOp::Le => {
            let (l, r) = numeric_pair(left, right, op)?;
            let result = match op {
                BinOp::Gt => l > r,
                BinOp::Ge => l >= r,
                BinOp::Lt => l < r,
                BinOp::Le => l <= r,
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }

        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
            let (l, r) = numeric_pair(left, right, op)?;
            let result = match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => {
                    if r == 0.0 {
                        return Err(CoreError::InvalidOperation(
                            "Division by zero".to_string(),
                        ));
                    }
                    l / r
                }
                BinOp::Mod => l % r,
                _ => unreachable!(),
            };
            Ok(Value::Number(result))
        }

        BinOp::And | BinOp::Or => unreachable!("handled with short-circuit above"),
    }
}

fn numeric_pair(left: &Value, right: &Value, op: BinOp) -> Result<(f64, f64)> {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(CoreError::TypeError(format!(
            "Cannot apply {:?} to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Shared builtin functions available to every expression scope
pub fn call_builtin(name: &str, args: &[Value]) -> Result<Value> {
    let arg = |i: usize| -> Result<&Value> {
        args.get(i).ok_or_else(|| {
            CoreError::InvalidOperation(format!("{}: missing argument {}", name, i + 1))
        })
    };

    match name {
        "is_number" => Ok(Value::Bool(matches!(arg(0)?, Value::Number(_)))),
        "is_string" => Ok(Value::Bool(matches!(arg(0)?, Value::String(_)))),
        "is_array" => Ok(Value::Bool(matches!(arg(0)?, Value::Array(_)))),
        "is_object" => Ok(Value::Bool(matches!(arg(0)?, Value::Object(_)))),
        "is_empty" => Ok(Value::Bool(arg(0)?.is_empty())),

        "to_number" => {
            let value = arg(0)?;
            value.as_number().map(Value::Number).ok_or_else(|| {
                CoreError::TypeError(format!("to_number: cannot coerce {}", value.type_name()))
            })
        }
        "to_string" => Ok(Value::String(arg(0)?.as_display_string())),

        "len" => match arg(0)? {
            Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
            Value::Array(a) => Ok(Value::Number(a.len() as f64)),
            Value::Object(o) => Ok(Value::Number(o.len() as f64)),
            other => Err(CoreError::TypeError(format!(
                "len: not a collection: {}",
                other.type_name()
            ))),
        },

        "abs" | "round" | "floor" | "ceil" => {
            let value = arg(0)?;
            let n = value.as_number().ok_or_else(|| {
                CoreError::TypeError(format!("{}: not a number: {}", name, value.type_name()))
            })?;
            let result = match name {
                "abs" => n.abs(),
                "round" => n.round(),
                "floor" => n.floor(),
                "ceil" => n.ceil(),
                _ => unreachable!(),
            };
            Ok(Value::Number(result))
        }

        "min" | "max" => {
            let mut best: Option<f64> = None;
            for value in args {
                let n = value.as_number().ok_or_else(|| {
                    CoreError::TypeError(format!(
                        "{}: not a number: {}",
                        name,
                        value.type_name()
                    ))
                })?;
                best = Some(match best {
                    None => n,
                    Some(b) if name == "min" => b.min(n),
                    Some(b) => b.max(n),
                });
            }
            match best {
                Some(n) => Ok(Value::Number(n)),
                None => Err(CoreError::InvalidOperation(format!(
                    "{}: requires at least one argument",
                    name
                ))),
            }
        }

        _ => Err(CoreError::UnknownFunction(name.to_string())),
    }
}
