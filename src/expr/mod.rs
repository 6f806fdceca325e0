/// Expression language for record-level filters and axis formulas.
///
/// ```text
///  "time_ms / iterations"
///        │
///        ▼
///   ┌──────────┐
///   │  lexer    │  &str → Vec<Spanned>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  parser   │  tokens → Expr (checked once per series)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  eval     │  Expr × &Record → Value
///   └──────────┘
/// ```
///
/// Field names are the only free variables. Evaluation borrows the record
/// immutably and keeps no state between calls.

pub mod eval;
pub mod lexer;
pub mod parser;

use std::str::FromStr;

use thiserror::Error;

use crate::data::model::Record;

pub use eval::Value;
pub use parser::Expr;

/// Why an expression could not be parsed or evaluated against a record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("expression is empty")]
    Empty,
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unterminated string starting at {0}")]
    UnterminatedString(usize),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected {found} at {pos}")]
    UnexpectedToken { found: String, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("{name}() takes {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("cannot apply '{op}' to {operand}")]
    UnaryTypeMismatch {
        op: &'static str,
        operand: &'static str,
    },
    #[error("'{op}' produced a non-finite result")]
    NonFinite { op: &'static str },
    #[error("expected a number, got {0}")]
    NotNumeric(&'static str),
    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),
}

impl ExprError {
    /// Errors raised before any record is looked at.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            ExprError::Empty
                | ExprError::UnexpectedChar { .. }
                | ExprError::UnterminatedString(_)
                | ExprError::InvalidNumber(_)
                | ExprError::UnexpectedToken { .. }
                | ExprError::UnexpectedEnd
                | ExprError::UnknownFunction(_)
                | ExprError::Arity { .. }
                | ExprError::TooDeep(_)
        )
    }
}

/// A parsed expression, ready to be evaluated against any number of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Expr,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let tokens = lexer::tokenize(source)?;
        let root = parser::parse(&tokens)?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn evaluate(&self, record: &Record) -> Result<Value, ExprError> {
        eval::eval(&self.root, record)
    }

    /// Evaluate and coerce the result to a finite number.
    pub fn evaluate_number(&self, record: &Record) -> Result<f64, ExprError> {
        self.evaluate(record)?.to_number()
    }

    /// Evaluate and read the result as a filter decision.
    pub fn matches(&self, record: &Record) -> Result<bool, ExprError> {
        Ok(self.evaluate(record)?.is_truthy())
    }
}

impl FromStr for Expression {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse and evaluate `source` against a single record.
///
/// An empty string is not special here; it fails with [`ExprError::Empty`].
pub fn evaluate(record: &Record, source: &str) -> Result<Value, ExprError> {
    Expression::parse(source)?.evaluate(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FieldValue;

    #[test]
    fn test_one_shot_evaluate() {
        let rec = Record::from([("a", FieldValue::Integer(6)), ("b", FieldValue::Integer(3))]);
        assert_eq!(evaluate(&rec, "a / b"), Ok(Value::Number(2.0)));
        assert_eq!(evaluate(&rec, ""), Err(ExprError::Empty));
    }

    #[test]
    fn test_bindings_do_not_leak_between_records() {
        let expr: Expression = "a".parse().unwrap();
        let with_a = Record::from([("a", FieldValue::Integer(1))]);
        let without_a = Record::from([("b", FieldValue::Integer(1))]);
        assert_eq!(expr.evaluate(&with_a), Ok(Value::Number(1.0)));
        assert_eq!(
            expr.evaluate(&without_a),
            Err(ExprError::UnknownField("a".into()))
        );
    }

    #[test]
    fn test_syntax_classification() {
        assert!(Expression::parse("a +").unwrap_err().is_syntax());
        assert!(!ExprError::UnknownField("a".into()).is_syntax());
    }
}
