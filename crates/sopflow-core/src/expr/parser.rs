//! Expression string parser
//!
//! Parses expression strings like:
//! - `actual > 1000 && is_number(actual)`
//! - `all("c1", "c2") || weight("c3") >= 2`
//! - `to_number(actual) == expected ? 1 : 0`
//!
//! The grammar is fixed; there is no escape hatch into host code.

use super::ast::{BinOp, Expr, UnaryOp};
use crate::types::Value;

/// Parse error
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub expression: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse '{}': {}", self.expression, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse an expression string into an AST
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input).map_err(|message| ParseError {
        message,
        expression: input.to_string(),
    })?;

    let mut parser = Parser {
        tokens,
        pos: 0,
        input,
    };
    let expr = parser.expression().map_err(|message| ParseError {
        message,
        expression: input.to_string(),
    })?;

    if parser.pos < parser.tokens.len() {
        return Err(ParseError {
            message: format!("Unexpected token: {:?}", parser.tokens[parser.pos]),
            expression: input.to_string(),
        });
    }

    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Symbol(&'static str),
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Two-character symbols first to avoid partial matches
        if i + 1 < chars.len() {
            let pair: String = chars[i..i + 2].iter().collect();
            let symbol = match pair.as_str() {
                "&&" => Some("&&"),
                "||" => Some("||"),
                "==" => Some("=="),
                "!=" => Some("!="),
                ">=" => Some(">="),
                "<=" => Some("<="),
                _ => None,
            };
            if let Some(s) = symbol {
                tokens.push(Token::Symbol(s));
                i += 2;
                continue;
            }
        }

        let symbol = match c {
            '(' => Some("("),
            ')' => Some(")"),
            '[' => Some("["),
            ']' => Some("]"),
            ',' => Some(","),
            '?' => Some("?"),
            ':' => Some(":"),
            '!' => Some("!"),
            '>' => Some(">"),
            '<' => Some("<"),
            '+' => Some("+"),
            '-' => Some("-"),
            '*' => Some("*"),
            '/' => Some("/"),
            '%' => Some("%"),
            _ => None,
        };
        if let Some(s) = symbol {
            tokens.push(Token::Symbol(s));
            i += 1;
            continue;
        }

        // Quoted string
        if c == '"' || c == '\'' {
            let quote = c;
            let mut s = String::new();
            i += 1;
            while i < chars.len() && chars[i] != quote {
                s.push(chars[i]);
                i += 1;
            }
            if i >= chars.len() {
                return Err("Unterminated string literal".to_string());
            }
            i += 1; // closing quote
            tokens.push(Token::Str(s));
            continue;
        }

        // Number
        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let num = text
                .parse::<f64>()
                .map_err(|_| format!("Invalid number: {}", text))?;
            tokens.push(Token::Number(num));
            continue;
        }

        // Identifier (dotted paths handled at parse level via '.')
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.')
            {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            tokens.push(Token::Ident(text));
            continue;
        }

        return Err(format!("Unexpected character: '{}'", c));
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    #[allow(dead_code)]
    input: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if matches!(self.peek(), Some(Token::Symbol(s)) if *s == symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<(), String> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(format!("Expected '{}'", symbol))
        }
    }

    /// expr := ternary
    fn expression(&mut self) -> Result<Expr, String> {
        self.ternary()
    }

    /// ternary := or ("?" expr ":" expr)?
    fn ternary(&mut self) -> Result<Expr, String> {
        let condition = self.or()?;
        if self.eat_symbol("?") {
            let true_expr = self.expression()?;
            self.expect_symbol(":")?;
            let false_expr = self.expression()?;
            return Ok(Expr::Ternary {
                condition: Box::new(condition),
                true_expr: Box::new(true_expr),
                false_expr: Box::new(false_expr),
            });
        }
        Ok(condition)
    }

    /// or := and ("||" and)*
    fn or(&mut self) -> Result<Expr, String> {
        let mut left = self.and()?;
        while self.eat_symbol("||") {
            let right = self.and()?;
            left = Expr::binary(left, BinOp::Or, right);
        }
        Ok(left)
    }

    /// and := not ("&&" not)*
    fn and(&mut self) -> Result<Expr, String> {
        let mut left = self.not()?;
        while self.eat_symbol("&&") {
            let right = self.not()?;
            left = Expr::binary(left, BinOp::And, right);
        }
        Ok(left)
    }

    /// not := "!" not | cmp
    fn not(&mut self) -> Result<Expr, String> {
        if self.eat_symbol("!") {
            let operand = self.not()?;
            return Ok(Expr::unary(UnaryOp::Not, operand));
        }
        self.comparison()
    }

    /// cmp := sum (op sum)?
    fn comparison(&mut self) -> Result<Expr, String> {
        let left = self.sum()?;
        let op = match self.peek() {
            Some(Token::Symbol("==")) => Some(BinOp::Eq),
            Some(Token::Symbol("!=")) => Some(BinOp::Ne),
            Some(Token::Symbol(">=")) => Some(BinOp::Ge),
            Some(Token::Symbol("<=")) => Some(BinOp::Le),
            Some(Token::Symbol(">")) => Some(BinOp::Gt),
            Some(Token::Symbol("<")) => Some(BinOp::Lt),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let right = self.sum()?;
            return Ok(Expr::binary(left, op, right));
        }
        Ok(left)
    }

    /// sum := term (("+"|"-") term)*
    fn sum(&mut self) -> Result<Expr, String> {
        let mut left = self.term()?;
        loop {
            if self.eat_symbol("+") {
                let right = self.term()?;
                left = Expr::binary(left, BinOp::Add, right);
            } else if self.eat_symbol("-") {
                let right = self.term()?;
                left = Expr::binary(left, BinOp::Sub, right);
            } else {
                return Ok(left);
            }
        }
    }

    /// term := unary (("*"|"/"|"%") unary)*
    fn term(&mut self) -> Result<Expr, String> {
        let mut left = self.unary()?;
        loop {
            if self.eat_symbol("*") {
                let right = self.unary()?;
                left = Expr::binary(left, BinOp::Mul, right);
            } else if self.eat_symbol("/") {
                let right = self.unary()?;
                left = Expr::binary(left, BinOp::Div, right);
            } else if self.eat_symbol("%") {
                let right = self.unary()?;
                left = Expr::binary(left, BinOp::Mod, right);
            } else {
                return Ok(left);
            }
        }
    }

    /// unary := "-" unary | primary
    fn unary(&mut self) -> Result<Expr, String> {
        if self.eat_symbol("-") {
            let operand = self.unary()?;
            return Ok(Expr::unary(UnaryOp::Negate, operand));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(Expr::literal(Value::Number(n)))
            }
            Some(Token::Str(s)) => {
                self.pos += 1;
                Ok(Expr::literal(Value::String(s)))
            }
            Some(Token::Ident(name)) => {
                self.pos += 1;
                match name.as_str() {
                    "true" => return Ok(Expr::literal(Value::Bool(true))),
                    "false" => return Ok(Expr::literal(Value::Bool(false))),
                    "null" => return Ok(Expr::literal(Value::Null)),
                    _ => {}
                }

                // Function call
                if self.eat_symbol("(") {
                    if name.contains('.') {
                        return Err(format!("Invalid function name: {}", name));
                    }
                    let mut args = Vec::new();
                    if !self.eat_symbol(")") {
                        loop {
                            args.push(self.expression()?);
                            if self.eat_symbol(")") {
                                break;
                            }
                            self.expect_symbol(",")?;
                        }
                    }
                    return Ok(Expr::call(name, args));
                }

                let path = name.split('.').map(|s| s.to_string()).collect();
                Ok(Expr::ident(path))
            }
            Some(Token::Symbol("(")) => {
                self.pos += 1;
                let expr = self.expression()?;
                self.expect_symbol(")")?;
                Ok(expr)
            }
            Some(Token::Symbol("[")) => {
                self.pos += 1;
                let mut items = Vec::new();
                if !self.eat_symbol("]") {
                    loop {
                        items.push(self.expression()?);
                        if self.eat_symbol("]") {
                            break;
                        }
                        self.expect_symbol(",")?;
                    }
                }
                Ok(Expr::Array(items))
            }
            Some(other) => Err(format!("Unexpected token: {:?}", other)),
            None => Err("Unexpected end of expression".to_string()),
        }
    }
}
