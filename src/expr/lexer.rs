use super::ExprError;

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Identifier(String),
    True,
    False,
    Null,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AndAnd,
    OrOr,
    Bang,
    Question,
    Colon,
    LeftParen,
    RightParen,
    Comma,
    Eof,
}

impl Token {
    /// Short human-readable form used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {n}"),
            Token::Str(s) => format!("string '{s}'"),
            Token::Identifier(name) => format!("identifier '{name}'"),
            Token::True => "'true'".into(),
            Token::False => "'false'".into(),
            Token::Null => "'null'".into(),
            Token::Plus => "'+'".into(),
            Token::Minus => "'-'".into(),
            Token::Asterisk => "'*'".into(),
            Token::Slash => "'/'".into(),
            Token::Percent => "'%'".into(),
            Token::EqualEqual => "'=='".into(),
            Token::BangEqual => "'!='".into(),
            Token::Less => "'<'".into(),
            Token::LessEqual => "'<='".into(),
            Token::Greater => "'>'".into(),
            Token::GreaterEqual => "'>='".into(),
            Token::AndAnd => "'&&'".into(),
            Token::OrOr => "'||'".into(),
            Token::Bang => "'!'".into(),
            Token::Question => "'?'".into(),
            Token::Colon => "':'".into(),
            Token::LeftParen => "'('".into(),
            Token::RightParen => "')'".into(),
            Token::Comma => "','".into(),
            Token::Eof => "end of expression".into(),
        }
    }
}

/// A token together with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

pub fn tokenize(input: &str) -> Result<Vec<Spanned>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        let token = match ch {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
                continue;
            }
            '+' => single(&mut chars, Token::Plus),
            '-' => single(&mut chars, Token::Minus),
            '*' => single(&mut chars, Token::Asterisk),
            '/' => single(&mut chars, Token::Slash),
            '%' => single(&mut chars, Token::Percent),
            '?' => single(&mut chars, Token::Question),
            ':' => single(&mut chars, Token::Colon),
            '(' => single(&mut chars, Token::LeftParen),
            ')' => single(&mut chars, Token::RightParen),
            ',' => single(&mut chars, Token::Comma),
            '=' => {
                chars.next();
                if !next_is(&mut chars, '=') {
                    // Plain assignment has no meaning here: records are read-only.
                    return Err(ExprError::UnexpectedChar { ch: '=', pos });
                }
                next_is(&mut chars, '=');
                Token::EqualEqual
            }
            '!' => {
                chars.next();
                if next_is(&mut chars, '=') {
                    next_is(&mut chars, '=');
                    Token::BangEqual
                } else {
                    Token::Bang
                }
            }
            '<' => {
                chars.next();
                if next_is(&mut chars, '=') {
                    Token::LessEqual
                } else {
                    Token::Less
                }
            }
            '>' => {
                chars.next();
                if next_is(&mut chars, '=') {
                    Token::GreaterEqual
                } else {
                    Token::Greater
                }
            }
            '&' | '|' => {
                chars.next();
                if !next_is(&mut chars, ch) {
                    return Err(ExprError::UnexpectedChar { ch, pos });
                }
                if ch == '&' {
                    Token::AndAnd
                } else {
                    Token::OrOr
                }
            }
            '\'' | '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    if c == ch {
                        closed = true;
                        break;
                    }
                    if c == '\\' {
                        match chars.next() {
                            Some((_, 'n')) => text.push('\n'),
                            Some((_, 't')) => text.push('\t'),
                            Some((_, other)) => text.push(other),
                            None => break,
                        }
                    } else {
                        text.push(c);
                    }
                }
                if !closed {
                    return Err(ExprError::UnterminatedString(pos));
                }
                Token::Str(text)
            }
            '0'..='9' | '.' => {
                let mut number = String::new();
                let mut prev = ' ';
                while let Some(&(_, c)) = chars.peek() {
                    let exponent_sign = (c == '+' || c == '-') && (prev == 'e' || prev == 'E');
                    if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || exponent_sign {
                        number.push(c);
                        prev = c;
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = number
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber(number.clone()))?;
                Token::Number(value)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut identifier = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        identifier.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match identifier.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    "and" => Token::AndAnd,
                    "or" => Token::OrOr,
                    "not" => Token::Bang,
                    _ => Token::Identifier(identifier),
                }
            }
            other => return Err(ExprError::UnexpectedChar { ch: other, pos }),
        };
        tokens.push(Spanned { token, pos });
    }

    tokens.push(Spanned {
        token: Token::Eof,
        pos: input.len(),
    });
    Ok(tokens)
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn single(chars: &mut Chars<'_>, token: Token) -> Token {
    chars.next();
    token
}

/// Consume the next character if it equals `expected`.
fn next_is(chars: &mut Chars<'_>, expected: char) -> bool {
    if chars.peek().map(|&(_, c)| c) == Some(expected) {
        chars.next();
        true
    } else {
        false
    }
}
