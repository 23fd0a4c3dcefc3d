//! Tokenizer for query program text.

use crate::error::CompileError;

/// A lexical token with its byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token kind and payload
    pub kind: Tok,
    /// Byte offset of the first character
    pub pos: usize,
}

/// Token kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `.name`
    Field(String),
    /// `$name`
    Var(String),
    /// identifier or keyword
    Ident(String),
    /// string literal, escapes resolved
    Str(String),
    /// integer literal
    Int(i64),
    /// non-integer literal
    Float(f64),
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `|`
    Pipe,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `?`
    Question,
    /// `//`
    Alt,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// end of input
    Eof,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split program text into tokens, ending with [`Tok::Eof`].
pub fn tokenize(src: &str) -> Result<Vec<Token>, CompileError> {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Comments run to end of line
        if c == '#' {
            while i < chars.len() && chars[i].1 != '\n' {
                i += 1;
            }
            continue;
        }

        let peek = chars.get(i + 1).map(|&(_, c)| c);

        let (kind, width) = match c {
            '.' if peek == Some('.') => (Tok::DotDot, 2),
            '.' if peek.map_or(false, is_ident_start) => {
                let (name, len) = read_ident(&chars, i + 1);
                (Tok::Field(name), len + 1)
            }
            '.' => (Tok::Dot, 1),
            '$' if peek.map_or(false, is_ident_start) => {
                let (name, len) = read_ident(&chars, i + 1);
                (Tok::Var(name), len + 1)
            }
            '"' => {
                let (s, len) = read_string(&chars, i)?;
                (Tok::Str(s), len)
            }
            c if c.is_ascii_digit() => read_number(&chars, i)?,
            c if is_ident_start(c) => {
                let (name, len) = read_ident(&chars, i);
                (Tok::Ident(name), len)
            }
            '[' => (Tok::LBracket, 1),
            ']' => (Tok::RBracket, 1),
            '(' => (Tok::LParen, 1),
            ')' => (Tok::RParen, 1),
            '{' => (Tok::LBrace, 1),
            '}' => (Tok::RBrace, 1),
            '|' => (Tok::Pipe, 1),
            ',' => (Tok::Comma, 1),
            ':' => (Tok::Colon, 1),
            ';' => (Tok::Semicolon, 1),
            '?' => (Tok::Question, 1),
            '/' if peek == Some('/') => (Tok::Alt, 2),
            '=' if peek == Some('=') => (Tok::Eq, 2),
            '!' if peek == Some('=') => (Tok::Ne, 2),
            '<' if peek == Some('=') => (Tok::Le, 2),
            '>' if peek == Some('=') => (Tok::Ge, 2),
            '<' => (Tok::Lt, 1),
            '>' => (Tok::Gt, 1),
            '+' => (Tok::Plus, 1),
            '-' => (Tok::Minus, 1),
            '*' => (Tok::Star, 1),
            '/' => (Tok::Slash, 1),
            '%' => (Tok::Percent, 1),
            other => {
                return Err(CompileError::at(
                    pos,
                    format!("unexpected character '{}'", other),
                ))
            }
        };

        tokens.push(Token { kind, pos });
        i += width;
    }

    tokens.push(Token {
        kind: Tok::Eof,
        pos: src.len(),
    });
    Ok(tokens)
}

fn read_ident(chars: &[(usize, char)], start: usize) -> (String, usize) {
    let name: String = chars[start..]
        .iter()
        .map(|&(_, c)| c)
        .take_while(|&c| is_ident_char(c))
        .collect();
    let len = name.chars().count();
    (name, len)
}

fn read_number(chars: &[(usize, char)], start: usize) -> Result<(Tok, usize), CompileError> {
    let mut end = start;
    let mut is_float = false;

    while end < chars.len() && chars[end].1.is_ascii_digit() {
        end += 1;
    }
    if end < chars.len()
        && chars[end].1 == '.'
        && chars.get(end + 1).map_or(false, |&(_, c)| c.is_ascii_digit())
    {
        is_float = true;
        end += 1;
        while end < chars.len() && chars[end].1.is_ascii_digit() {
            end += 1;
        }
    }
    if end < chars.len() && matches!(chars[end].1, 'e' | 'E') {
        let mut exp = end + 1;
        if exp < chars.len() && matches!(chars[exp].1, '+' | '-') {
            exp += 1;
        }
        if exp < chars.len() && chars[exp].1.is_ascii_digit() {
            is_float = true;
            end = exp;
            while end < chars.len() && chars[end].1.is_ascii_digit() {
                end += 1;
            }
        }
    }

    let text: String = chars[start..end].iter().map(|&(_, c)| c).collect();
    let pos = chars[start].0;
    let tok = if is_float {
        text.parse::<f64>()
            .map(Tok::Float)
            .map_err(|_| CompileError::at(pos, format!("invalid number literal '{}'", text)))?
    } else {
        match text.parse::<i64>() {
            Ok(i) => Tok::Int(i),
            // Too wide for an exact integer: keep the double, as jq does
            Err(_) => text
                .parse::<f64>()
                .map(Tok::Float)
                .map_err(|_| CompileError::at(pos, format!("invalid number literal '{}'", text)))?,
        }
    };
    Ok((tok, end - start))
}

fn read_string(chars: &[(usize, char)], start: usize) -> Result<(String, usize), CompileError> {
    let open = chars[start].0;
    let mut out = String::new();
    let mut i = start + 1;

    loop {
        let Some(&(pos, c)) = chars.get(i) else {
            return Err(CompileError::at(open, "unterminated string literal"));
        };
        i += 1;
        match c {
            '"' => break,
            '\\' => {
                let Some(&(_, esc)) = chars.get(i) else {
                    return Err(CompileError::at(open, "unterminated string literal"));
                };
                i += 1;
                match esc {
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    '/' => out.push('/'),
                    'b' => out.push('\u{8}'),
                    'f' => out.push('\u{c}'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'u' => {
                        let hex: String = chars.iter().skip(i).take(4).map(|&(_, c)| c).collect();
                        let code = u32::from_str_radix(&hex, 16)
                            .ok()
                            .filter(|_| hex.len() == 4)
                            .ok_or_else(|| CompileError::at(pos, "invalid \\u escape"))?;
                        i += 4;
                        out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                    other => {
                        return Err(CompileError::at(
                            pos,
                            format!("invalid escape '\\{}'", other),
                        ))
                    }
                }
            }
            c => out.push(c),
        }
    }

    Ok((out, i - start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Tok> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_identity_and_iterate() {
        assert_eq!(kinds("."), vec![Tok::Dot, Tok::Eof]);
        assert_eq!(
            kinds(".[]"),
            vec![Tok::Dot, Tok::LBracket, Tok::RBracket, Tok::Eof]
        );
    }

    #[test]
    fn test_field_and_recurse() {
        assert_eq!(
            kinds(".foo.bar .."),
            vec![
                Tok::Field("foo".into()),
                Tok::Field("bar".into()),
                Tok::DotDot,
                Tok::Eof
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("42"), vec![Tok::Int(42), Tok::Eof]);
        assert_eq!(kinds("1.5"), vec![Tok::Float(1.5), Tok::Eof]);
        assert_eq!(kinds("2e3"), vec![Tok::Float(2000.0), Tok::Eof]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\né""#),
            vec![Tok::Str("a\"b\né".into()), Tok::Eof]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("== != <= >= // < >"),
            vec![
                Tok::Eq,
                Tok::Ne,
                Tok::Le,
                Tok::Ge,
                Tok::Alt,
                Tok::Lt,
                Tok::Gt,
                Tok::Eof
            ]
        );
    }

    #[test]
    fn test_variable() {
        assert_eq!(kinds("$name"), vec![Tok::Var("name".into()), Tok::Eof]);
    }

    #[test]
    fn test_comment_skipped() {
        assert_eq!(kinds(". # identity\n"), vec![Tok::Dot, Tok::Eof]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("\"abc").unwrap_err();
        assert_eq!(err.position, Some(0));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize(". & .").unwrap_err();
        assert_eq!(err.position, Some(2));
        assert!(err.message.contains('&'));
    }
}
