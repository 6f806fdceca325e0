use super::eval::Value;
use super::lexer::{Spanned, Token};
use super::ExprError;

// ---------------------------------------------------------------------------
// AST
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Field(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Call {
        function: Builtin,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne => 3,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
        }
    }

    fn from_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::OrOr => BinaryOp::Or,
            Token::AndAnd => BinaryOp::And,
            Token::EqualEqual => BinaryOp::Eq,
            Token::BangEqual => BinaryOp::Ne,
            Token::Less => BinaryOp::Lt,
            Token::LessEqual => BinaryOp::Le,
            Token::Greater => BinaryOp::Gt,
            Token::GreaterEqual => BinaryOp::Ge,
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
            Token::Asterisk => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
            Token::Percent => BinaryOp::Rem,
            _ => return None,
        })
    }
}

/// Numeric functions callable from expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Abs,
    Sqrt,
    Ln,
    Log10,
    Exp,
    Floor,
    Ceil,
    Round,
    Min,
    Max,
    Pow,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "abs" => Builtin::Abs,
            "sqrt" => Builtin::Sqrt,
            "ln" => Builtin::Ln,
            "log10" => Builtin::Log10,
            "exp" => Builtin::Exp,
            "floor" => Builtin::Floor,
            "ceil" => Builtin::Ceil,
            "round" => Builtin::Round,
            "min" => Builtin::Min,
            "max" => Builtin::Max,
            "pow" => Builtin::Pow,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Abs => "abs",
            Builtin::Sqrt => "sqrt",
            Builtin::Ln => "ln",
            Builtin::Log10 => "log10",
            Builtin::Exp => "exp",
            Builtin::Floor => "floor",
            Builtin::Ceil => "ceil",
            Builtin::Round => "round",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Pow => "pow",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Builtin::Min | Builtin::Max | Builtin::Pow => 2,
            _ => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Parser: precedence climbing over the token stream
// ---------------------------------------------------------------------------

/// Deepest nesting accepted, both in parser recursion and in AST height.
/// Evaluating and dropping an `Expr` recurse once per level.
pub const MAX_DEPTH: usize = 256;

/// A parsed subtree and its height.
type Node = (Expr, usize);

pub fn parse(tokens: &[Spanned]) -> Result<Expr, ExprError> {
    if matches!(tokens.first().map(|s| &s.token), Some(Token::Eof) | None) {
        return Err(ExprError::Empty);
    }
    let mut current = 0;
    let (expr, _) = parse_conditional(tokens, &mut current, 0)?;
    match tokens.get(current) {
        Some(Spanned {
            token: Token::Eof, ..
        }) => Ok(expr),
        Some(other) => Err(unexpected(other)),
        None => Err(ExprError::UnexpectedEnd),
    }
}

fn descend(depth: usize) -> Result<usize, ExprError> {
    if depth >= MAX_DEPTH {
        return Err(ExprError::TooDeep(MAX_DEPTH));
    }
    Ok(depth + 1)
}

/// Wrap `expr` as a node one level above its tallest child.
fn node(expr: Expr, child_height: usize) -> Result<Node, ExprError> {
    let height = descend(child_height)?;
    Ok((expr, height))
}

fn parse_conditional(tokens: &[Spanned], current: &mut usize, depth: usize) -> Result<Node, ExprError> {
    let depth = descend(depth)?;
    let (condition, h_cond) = parse_binary_op(tokens, current, 1, depth)?;
    if !matches!(peek(tokens, *current), Some(Token::Question)) {
        return Ok((condition, h_cond));
    }
    *current += 1;
    let (then_branch, h_then) = parse_conditional(tokens, current, depth)?;
    expect(tokens, current, &Token::Colon)?;
    let (else_branch, h_else) = parse_conditional(tokens, current, depth)?;
    node(
        Expr::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        },
        h_cond.max(h_then).max(h_else),
    )
}

fn parse_binary_op(
    tokens: &[Spanned],
    current: &mut usize,
    precedence: u8,
    depth: usize,
) -> Result<Node, ExprError> {
    let (mut left, mut height) = parse_unary(tokens, current, depth)?;

    while let Some(op) = peek(tokens, *current).and_then(BinaryOp::from_token) {
        let op_prec = op.precedence();
        if op_prec < precedence {
            break;
        }
        *current += 1;
        let (right, h_right) = parse_binary_op(tokens, current, op_prec + 1, depth)?;
        (left, height) = node(
            Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            height.max(h_right),
        )?;
    }

    Ok((left, height))
}

fn parse_unary(tokens: &[Spanned], current: &mut usize, depth: usize) -> Result<Node, ExprError> {
    let op = match peek(tokens, *current) {
        Some(Token::Minus) => UnaryOp::Neg,
        Some(Token::Bang) => UnaryOp::Not,
        _ => return parse_primary(tokens, current, depth),
    };
    *current += 1;
    let (operand, height) = parse_unary(tokens, current, descend(depth)?)?;
    node(
        Expr::Unary {
            op,
            operand: Box::new(operand),
        },
        height,
    )
}

fn parse_primary(tokens: &[Spanned], current: &mut usize, depth: usize) -> Result<Node, ExprError> {
    let spanned = tokens.get(*current).ok_or(ExprError::UnexpectedEnd)?;
    let expr = match &spanned.token {
        Token::Number(value) => Expr::Literal(Value::Number(*value)),
        Token::Str(text) => Expr::Literal(Value::Text(text.clone())),
        Token::True => Expr::Literal(Value::Bool(true)),
        Token::False => Expr::Literal(Value::Bool(false)),
        Token::Null => Expr::Literal(Value::Null),
        Token::Identifier(name) => {
            *current += 1;
            if let Some(Token::LeftParen) = peek(tokens, *current) {
                return parse_function_call(tokens, current, name, depth);
            }
            return Ok((Expr::Field(name.clone()), 1));
        }
        Token::LeftParen => {
            *current += 1;
            let inner = parse_conditional(tokens, current, depth)?;
            expect(tokens, current, &Token::RightParen)?;
            return Ok(inner);
        }
        Token::Eof => return Err(ExprError::UnexpectedEnd),
        _ => return Err(unexpected(spanned)),
    };
    *current += 1;
    Ok((expr, 1))
}

fn parse_function_call(
    tokens: &[Spanned],
    current: &mut usize,
    name: &str,
    depth: usize,
) -> Result<Node, ExprError> {
    let function = Builtin::lookup(name).ok_or_else(|| ExprError::UnknownFunction(name.to_string()))?;
    // skip '('
    *current += 1;

    let mut args = Vec::new();
    let mut height = 0;
    if !matches!(peek(tokens, *current), Some(Token::RightParen)) {
        loop {
            let (arg, h_arg) = parse_conditional(tokens, current, depth)?;
            args.push(arg);
            height = height.max(h_arg);
            if matches!(peek(tokens, *current), Some(Token::Comma)) {
                *current += 1;
            } else {
                break;
            }
        }
    }
    expect(tokens, current, &Token::RightParen)?;

    if args.len() != function.arity() {
        return Err(ExprError::Arity {
            name: function.name().to_string(),
            expected: function.arity(),
            found: args.len(),
        });
    }
    node(Expr::Call { function, args }, height)
}

fn peek(tokens: &[Spanned], current: usize) -> Option<&Token> {
    tokens.get(current).map(|s| &s.token)
}

fn expect(tokens: &[Spanned], current: &mut usize, expected: &Token) -> Result<(), ExprError> {
    match tokens.get(*current) {
        Some(spanned) if &spanned.token == expected => {
            *current += 1;
            Ok(())
        }
        Some(Spanned {
            token: Token::Eof, ..
        })
        | None => Err(ExprError::UnexpectedEnd),
        Some(other) => Err(unexpected(other)),
    }
}

fn unexpected(spanned: &Spanned) -> ExprError {
    ExprError::UnexpectedToken {
        found: spanned.token.describe(),
        pos: spanned.pos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::lexer::tokenize;

    fn parse_str(input: &str) -> Result<Expr, ExprError> {
        parse(&tokenize(input)?)
    }

    fn field(name: &str) -> Box<Expr> {
        Box::new(Expr::Field(name.into()))
    }

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Literal(Value::Number(n)))
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse_str("a + b * 2").unwrap(),
            Expr::Binary {
                left: field("a"),
                op: BinaryOp::Add,
                right: Box::new(Expr::Binary {
                    left: field("b"),
                    op: BinaryOp::Mul,
                    right: num(2.0),
                }),
            }
        );
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        assert_eq!(
            parse_str("a - b - c").unwrap(),
            Expr::Binary {
                left: Box::new(Expr::Binary {
                    left: field("a"),
                    op: BinaryOp::Sub,
                    right: field("b"),
                }),
                op: BinaryOp::Sub,
                right: field("c"),
            }
        );
    }

    #[test]
    fn test_comparison_below_logic() {
        let expr = parse_str("a > 1 && b == 'x'").unwrap();
        match expr {
            Expr::Binary { op, .. } => assert_eq!(op, BinaryOp::And),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_ternary_and_parentheses() {
        let expr = parse_str("(a > 1) ? a : -a").unwrap();
        assert!(matches!(expr, Expr::Conditional { .. }));
    }

    #[test]
    fn test_function_calls_check_name_and_arity() {
        assert!(matches!(
            parse_str("max(a, b)").unwrap(),
            Expr::Call {
                function: Builtin::Max,
                ..
            }
        ));
        assert_eq!(
            parse_str("frobnicate(a)"),
            Err(ExprError::UnknownFunction("frobnicate".into()))
        );
        assert_eq!(
            parse_str("sqrt(a, b)"),
            Err(ExprError::Arity {
                name: "sqrt".into(),
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(parse_str(""), Err(ExprError::Empty));
        assert_eq!(parse_str("   "), Err(ExprError::Empty));
        assert_eq!(parse_str("a +"), Err(ExprError::UnexpectedEnd));
        assert_eq!(parse_str("(a"), Err(ExprError::UnexpectedEnd));
        assert!(matches!(
            parse_str("a b"),
            Err(ExprError::UnexpectedToken { pos: 2, .. })
        ));
    }

    #[test]
    fn test_nesting_is_bounded() {
        let deep_parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(parse_str(&deep_parens), Err(ExprError::TooDeep(MAX_DEPTH)));

        let deep_negation = format!("{}1", "-".repeat(100_000));
        assert_eq!(parse_str(&deep_negation), Err(ExprError::TooDeep(MAX_DEPTH)));

        // A flat chain still builds one tree level per operator.
        let long_chain = vec!["1"; 100_000].join(" + ");
        assert_eq!(parse_str(&long_chain), Err(ExprError::TooDeep(MAX_DEPTH)));

        let ternaries = format!("{}0", "1 ? 0 : ".repeat(100_000));
        assert_eq!(parse_str(&ternaries), Err(ExprError::TooDeep(MAX_DEPTH)));

        // Ordinary nesting is untouched.
        let fine = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(parse_str(&fine), Ok(Expr::Literal(Value::Number(1.0))));
        assert!(parse_str(&vec!["a"; 100].join(" * ")).is_ok());
    }
}
