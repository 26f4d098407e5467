//! 计算器工具
//!
//! 受限算术求值：先做字符白名单检查，再走专用递归下降解析器
//! （数字字面量、四则运算、一元负号、括号，标准优先级）。
//! 解析器之外没有任何求值路径 —— 不存在可被注入的通用表达式引擎。

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::Tool;

const ALLOWED_CHARS: &str = "0123456789+-*/.() \t";

/// Calculator 工具：表达式字符串进，数值文本出
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression with + - * / and parentheses. Args: {\"expression\": \"2 * (3 + 4)\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Arithmetic expression, digits and + - * / . ( ) only"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let expression = args
            .get("expression")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim();
        if expression.is_empty() {
            return Err("Missing 'expression' argument".to_string());
        }
        let value = evaluate(expression)?;
        Ok(value.to_string())
    }
}

/// 求值入口：白名单检查 + 解析 + 完整消费输入
pub fn evaluate(expression: &str) -> Result<f64, String> {
    if let Some(bad) = expression.chars().find(|c| !ALLOWED_CHARS.contains(*c)) {
        return Err(format!("Invalid character in expression: '{}'", bad));
    }
    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err("Unexpected trailing input".to_string());
    }
    if !value.is_finite() {
        return Err("Result is not a finite number".to_string());
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n: f64 = literal
                    .parse()
                    .map_err(|_| format!("Invalid number: '{}'", literal))?;
                tokens.push(Token::Num(n));
            }
            other => return Err(format!("Invalid character in expression: '{}'", other)),
        }
    }
    if tokens.is_empty() {
        return Err("Empty expression".to_string());
    }
    Ok(tokens)
}

/// 递归下降解析器：expr := term (('+'|'-') term)*，term := factor (('*'|'/') factor)*，
/// factor := number | '-' factor | '(' expr ')'
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.peek();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.next();
                    value += self.term()?;
                }
                Token::Minus => {
                    self.next();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.next();
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.next();
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err("Division by zero".to_string());
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, String> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err("Missing closing parenthesis".to_string()),
                }
            }
            Some(t) => Err(format!("Unexpected token: {:?}", t)),
            None => Err("Unexpected end of expression".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_addition() {
        let out = CalculatorTool
            .execute(serde_json::json!({"expression": "2+2"}))
            .await
            .unwrap();
        assert_eq!(out, "4");
    }

    #[tokio::test]
    async fn test_shell_injection_is_rejected() {
        let err = CalculatorTool
            .execute(serde_json::json!({"expression": "2+2; rm -rf"}))
            .await
            .unwrap_err();
        assert!(err.contains("Invalid character"), "got: {err}");
    }

    #[test]
    fn test_precedence_and_parentheses() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("15 * 23 + 7").unwrap(), 352.0);
        assert_eq!(evaluate("10 / 4").unwrap(), 2.5);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(evaluate("-3 + 5").unwrap(), 2.0);
        assert_eq!(evaluate("2 * -4").unwrap(), -8.0);
        assert_eq!(evaluate("-(1 + 2)").unwrap(), -3.0);
    }

    #[test]
    fn test_division_by_zero() {
        let err = evaluate("1 / 0").unwrap_err();
        assert!(err.contains("Division by zero"));
        assert!(evaluate("1 / (2 - 2)").is_err());
    }

    #[test]
    fn test_malformed_expressions() {
        assert!(evaluate("").is_err());
        assert!(evaluate("2 +").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("1 2").is_err());
        assert!(evaluate("1..5 + 1").is_err());
    }

    #[test]
    fn test_integer_results_render_without_decimal_point() {
        // f64 Display：4.0 -> "4"，2.5 -> "2.5"
        assert_eq!(evaluate("2+2").unwrap().to_string(), "4");
        assert_eq!(evaluate("5/2").unwrap().to_string(), "2.5");
    }
}
