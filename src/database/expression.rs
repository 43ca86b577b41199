//! Arithmetic evaluation for range token expressions.
//!
//! Grammar:
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/' | '%') factor)*
//! factor     := ('+' | '-') factor | number | '(' expression ')'
//! ```
//!
//! Symbolic names are substituted before evaluation, so any identifier left
//! in the input is an error.
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub(crate) enum ExpressionError {
    #[error("Unexpected character '{0}' at {1}")]
    UnexpectedCharacter(char, usize),

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
}

/// Evaluates an arithmetic expression over floating point numbers.
pub(crate) fn evaluate(expression: &str) -> Result<f64, ExpressionError> {
    let mut parser = Parser { chars: expression.char_indices().collect(), position: 0 };
    let value = parser.expression()?;
    parser.skip_whitespace();
    match parser.peek() {
        Some((index, char)) => Err(ExpressionError::UnexpectedCharacter(char, index)),
        None => Ok(value),
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.position).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|(_, char)| char.is_whitespace()) {
            self.position += 1;
        }
    }

    /// Consumes the next non-blank character if it is one of `operators`.
    fn operator(&mut self, operators: &[char]) -> Option<char> {
        self.skip_whitespace();
        let (_, char) = self.peek()?;
        if operators.contains(&char) {
            self.position += 1;
            Some(char)
        } else {
            None
        }
    }

    fn expression(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.term()?;
        while let Some(operator) = self.operator(&['+', '-']) {
            let right = self.term()?;
            value = if operator == '+' { value + right } else { value - right };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.factor()?;
        while let Some(operator) = self.operator(&['*', '/', '%']) {
            let right = self.factor()?;
            value = match operator {
                '*' => value * right,
                '/' => value / right,
                _ => value % right,
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ExpressionError> {
        if let Some(sign) = self.operator(&['+', '-']) {
            let value = self.factor()?;
            return Ok(if sign == '-' { -value } else { value });
        }
        self.skip_whitespace();
        match self.peek() {
            Some((_, '(')) => {
                self.position += 1;
                let value = self.expression()?;
                match self.operator(&[')']) {
                    Some(_) => Ok(value),
                    None => match self.peek() {
                        Some((index, char)) => {
                            Err(ExpressionError::UnexpectedCharacter(char, index))
                        }
                        None => Err(ExpressionError::UnexpectedEnd),
                    },
                }
            }
            Some((_, char)) if char.is_ascii_digit() || char == '.' => self.number(),
            Some((index, char)) => Err(ExpressionError::UnexpectedCharacter(char, index)),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, ExpressionError> {
        let mut literal = String::new();
        while let Some((_, char)) = self.peek() {
            if char.is_ascii_digit() || char == '.' {
                literal.push(char);
                self.position += 1;
            } else {
                break;
            }
        }
        literal
            .parse::<f64>()
            .map_err(|_| ExpressionError::InvalidNumber(literal))
    }
}
