use std::fmt;

use crate::data::model::{FieldValue, Record};

use super::parser::{BinaryOp, Builtin, Expr, UnaryOp};
use super::ExprError;

// ---------------------------------------------------------------------------
// Value – result of evaluating an expression
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
        }
    }

    /// `false`, `null`, `0`, `NaN` and `""` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Null => false,
        }
    }

    /// Coerce to a finite `f64`.
    ///
    /// Strings are read like a lenient float parse: the longest numeric prefix
    /// wins, so `"12.5ms"` becomes `12.5`. Booleans and null are rejected.
    pub fn to_number(&self) -> Result<f64, ExprError> {
        let n = match self {
            Value::Number(n) => *n,
            Value::Text(s) => parse_float_prefix(s).ok_or(ExprError::NotNumeric("string"))?,
            other => return Err(ExprError::NotNumeric(other.kind())),
        };
        if n.is_finite() {
            Ok(n)
        } else {
            Err(ExprError::NotNumeric("non-finite number"))
        }
    }
}

impl From<&FieldValue> for Value {
    fn from(field: &FieldValue) -> Self {
        match field {
            FieldValue::String(s) => Value::Text(s.clone()),
            FieldValue::Integer(i) => Value::Number(*i as f64),
            FieldValue::Float(f) => Value::Number(*f),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Null => Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "null"),
        }
    }
}

fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    // Walk back from the longest candidate; inputs are short field values.
    s.char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .rev()
        .find_map(|end| s[..end].parse::<f64>().ok())
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Evaluate `expr` with the record's fields as the only free variables.
pub fn eval(expr: &Expr, record: &Record) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Field(name) => record
            .get(name)
            .map(Value::from)
            .ok_or_else(|| ExprError::UnknownField(name.clone())),
        Expr::Unary { op, operand } => {
            let value = eval(operand, record)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                UnaryOp::Neg => match value {
                    Value::Number(n) => Ok(Value::Number(-n)),
                    other => Err(ExprError::UnaryTypeMismatch {
                        op: "-",
                        operand: other.kind(),
                    }),
                },
            }
        }
        Expr::Binary { left, op, right } => match op {
            BinaryOp::And => {
                if !eval(left, record)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(eval(right, record)?.is_truthy()))
            }
            BinaryOp::Or => {
                if eval(left, record)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(eval(right, record)?.is_truthy()))
            }
            _ => {
                let l = eval(left, record)?;
                let r = eval(right, record)?;
                binary(*op, l, r)
            }
        },
        Expr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            if eval(condition, record)?.is_truthy() {
                eval(then_branch, record)
            } else {
                eval(else_branch, record)
            }
        }
        Expr::Call { function, args } => {
            let mut nums = Vec::with_capacity(args.len());
            for arg in args {
                match eval(arg, record)? {
                    Value::Number(n) => nums.push(n),
                    other => {
                        return Err(ExprError::UnaryTypeMismatch {
                            op: function.name(),
                            operand: other.kind(),
                        })
                    }
                }
            }
            call(*function, &nums)
        }
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, ExprError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(loosely_equal(&left, &right))),
        BinaryOp::Ne => Ok(Value::Bool(!loosely_equal(&left, &right))),
        // Already-evaluated operands; `eval` short-circuits before getting here.
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => compare(op, left, right),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            arithmetic(op, left, right)
        }
    }
}

fn compare(op: BinaryOp, left: Value, right: Value) -> Result<Value, ExprError> {
    let ordering = match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => {
            return Err(ExprError::TypeMismatch {
                op: op.symbol(),
                left: left.kind(),
                right: right.kind(),
            })
        }
    };
    // NaN compares false either way.
    let Some(ordering) = ordering else {
        return Ok(Value::Bool(false));
    };
    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    };
    Ok(Value::Bool(result))
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> Result<Value, ExprError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            let result = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            };
            finite(result, op.symbol()).map(Value::Number)
        }
        (Value::Text(a), Value::Text(b)) if op == BinaryOp::Add => Ok(Value::Text(a + &b)),
        (l, r) => Err(ExprError::TypeMismatch {
            op: op.symbol(),
            left: l.kind(),
            right: r.kind(),
        }),
    }
}

fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

fn call(function: Builtin, args: &[f64]) -> Result<Value, ExprError> {
    let result = match (function, args) {
        (Builtin::Abs, [x]) => x.abs(),
        (Builtin::Sqrt, [x]) => x.sqrt(),
        (Builtin::Ln, [x]) => x.ln(),
        (Builtin::Log10, [x]) => x.log10(),
        (Builtin::Exp, [x]) => x.exp(),
        (Builtin::Floor, [x]) => x.floor(),
        (Builtin::Ceil, [x]) => x.ceil(),
        (Builtin::Round, [x]) => x.round(),
        (Builtin::Min, [a, b]) => a.min(*b),
        (Builtin::Max, [a, b]) => a.max(*b),
        (Builtin::Pow, [a, b]) => a.powf(*b),
        _ => {
            return Err(ExprError::Arity {
                name: function.name().to_string(),
                expected: function.arity(),
                found: args.len(),
            })
        }
    };
    finite(result, function.name()).map(Value::Number)
}

fn finite(n: f64, op: &'static str) -> Result<f64, ExprError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(ExprError::NonFinite { op })
    }
}
