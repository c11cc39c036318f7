//! # Program Parser
//!
//! Turns whitespace-delimited program text into a flat list of items.
//!
//! | Token | Example | Result |
//! |-------|---------|--------|
//! | opcode | `OP_ADD`, `op_add` | `Item::Op` |
//! | integer | `-12`, `0x1f` | `Value::Int` |
//! | hash / pubkey / signature / keypair | `h0x…`, `k0x…`, `s0x…`, `p0x…` | typed bytes |
//! | string | `"a b"`, `'x'` | `Value::Str` (escapes `\\` and `\"` only) |
//! | list | `[1 "a" [2]]` | `Value::List` |
//! | comment | `// …` | skipped to end of line |
//!
//! Parsing is all-or-nothing: a program either parses completely or is
//! rejected before any instruction runs.

use super::{Opcode, Value};
use crate::errors::VmError;
use shared_crypto::{Hash, Keypair, Pubkey, Signature};

/// One program item. The program counter indexes these, starting at 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Op(Opcode),
    Push(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Word(String),
    Str(String),
    Open,
    Close,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    line: usize,
    /// 1-based column offset in the line.
    column: usize,
}

/// Scanner over the whole program text.
///
/// Rules:
/// - `//` starts a comment outside strings
/// - `[` and `]` are tokens on their own
/// - a string must be followed by whitespace, `]`, or the end of input
fn tokenize(text: &str) -> Result<Vec<Token>, VmError> {
    let mut out = Vec::with_capacity(text.len() / 4);
    let mut chars = text.chars().peekable();
    let (mut line, mut column) = (1usize, 0usize);

    // Advance one char, tracking position.
    macro_rules! bump {
        () => {{
            let c = chars.next();
            if c == Some('\n') {
                line += 1;
                column = 0;
            } else if c.is_some() {
                column += 1;
            }
            c
        }};
    }

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            bump!();
            continue;
        }

        let (start_line, start_col) = (line, column + 1);
        match c {
            '[' | ']' => {
                bump!();
                out.push(Token {
                    kind: if c == '[' { TokenKind::Open } else { TokenKind::Close },
                    line: start_line,
                    column: start_col,
                });
            }

            '"' | '\'' => {
                let quote = c;
                bump!();
                let mut s = String::new();
                loop {
                    match bump!() {
                        None => {
                            return Err(VmError::parse(
                                start_line,
                                start_col,
                                "unterminated string literal",
                            ))
                        }
                        Some('\\') => match bump!() {
                            Some(e @ ('\\' | '"')) => s.push(e),
                            _ => {
                                return Err(VmError::parse(
                                    line,
                                    column,
                                    "only \\\\ and \\\" escapes are allowed",
                                ))
                            }
                        },
                        Some(ch) if ch == quote => break,
                        Some(ch) => s.push(ch),
                    }
                }
                if let Some(&next) = chars.peek() {
                    if !next.is_whitespace() && next != ']' {
                        return Err(VmError::parse(
                            line,
                            column,
                            "unescaped closing quote inside string",
                        ));
                    }
                }
                out.push(Token {
                    kind: TokenKind::Str(s),
                    line: start_line,
                    column: start_col,
                });
            }

            '/' if text_starts_comment(&chars) => {
                while let Some(&ch) = chars.peek() {
                    if ch == '\n' {
                        break;
                    }
                    bump!();
                }
            }

            _ => {
                let mut word = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_whitespace() || ch == '[' || ch == ']' || ch == '"' || ch == '\'' {
                        break;
                    }
                    if ch == '/' && text_starts_comment(&chars) {
                        break;
                    }
                    word.push(ch);
                    bump!();
                }
                out.push(Token {
                    kind: TokenKind::Word(word),
                    line: start_line,
                    column: start_col,
                });
            }
        }
    }

    Ok(out)
}

fn text_starts_comment(chars: &std::iter::Peekable<std::str::Chars<'_>>) -> bool {
    let mut ahead = chars.clone();
    ahead.next() == Some('/') && ahead.next() == Some('/')
}

/// Parse a full program.
pub fn parse_program(text: &str) -> Result<Vec<Item>, VmError> {
    let tokens = tokenize(text)?;
    let mut pos = 0;
    let items = parse_items(&tokens, &mut pos, None)?;
    Ok(items)
}

/// Parse a params fragment: literals only.
pub fn parse_values(text: &str) -> Result<Vec<Value>, VmError> {
    parse_program(text)?
        .into_iter()
        .map(|item| match item {
            Item::Push(value) => Ok(value),
            Item::Op(op) => Err(VmError::OpcodeInParams(op)),
        })
        .collect()
}

/// Parse until the end of input, or the `]` matching `open` if given.
fn parse_items(tokens: &[Token], pos: &mut usize, open: Option<&Token>) -> Result<Vec<Item>, VmError> {
    let mut items = Vec::new();
    while let Some(token) = tokens.get(*pos) {
        *pos += 1;
        match &token.kind {
            TokenKind::Open => {
                let inner = parse_items(tokens, pos, Some(token))?;
                let values = inner
                    .into_iter()
                    .map(|item| match item {
                        Item::Push(value) => Ok(value),
                        Item::Op(op) => Err(VmError::parse(
                            token.line,
                            token.column,
                            format!("opcode {op} inside list literal"),
                        )),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                items.push(Item::Push(Value::List(values)));
            }
            TokenKind::Close => {
                return match open {
                    Some(_) => Ok(items),
                    None => Err(VmError::parse(token.line, token.column, "unmatched ']'")),
                };
            }
            TokenKind::Str(s) => items.push(Item::Push(Value::Str(s.clone()))),
            TokenKind::Word(word) => items.push(parse_word(word, token)?),
        }
    }
    match open {
        Some(token) => Err(VmError::parse(token.line, token.column, "unclosed '['")),
        None => Ok(items),
    }
}

fn parse_word(word: &str, token: &Token) -> Result<Item, VmError> {
    let err = |message: String| VmError::parse(token.line, token.column, message);

    if word.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("OP_")) {
        return Opcode::from_name(word)
            .map(Item::Op)
            .ok_or_else(|| err(format!("unknown opcode {word}")));
    }

    if let Some((prefix, payload)) = word.split_at_checked(3) {
        let bytes_err = |e: shared_crypto::CryptoError| err(format!("{word}: {e}"));
        let value = match prefix {
            "h0x" => Some(Value::Hash(Hash::from_hex(payload).map_err(bytes_err)?)),
            "k0x" => Some(Value::Pubkey(Pubkey::from_hex(payload).map_err(bytes_err)?)),
            "s0x" => Some(Value::Signature(Signature::from_hex(payload).map_err(bytes_err)?)),
            "p0x" => Some(Value::Keypair(Keypair::from_hex(payload).map_err(bytes_err)?)),
            _ => None,
        };
        if let Some(value) = value {
            return Ok(Item::Push(value));
        }
    }

    parse_int(word)
        .map(|v| Item::Push(Value::Int(v)))
        .ok_or_else(|| err(format!("invalid token {word}")))
}

/// Signed decimal or `0x` hex.
fn parse_int(word: &str) -> Option<i64> {
    let (negative, digits) = match word.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, word.strip_prefix('+').unwrap_or(word)),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) if !hex.starts_with(['+', '-']) => i128::from_str_radix(hex, 16).ok()?,
        Some(_) => return None,
        None => digits.parse::<i128>().ok()?,
    };
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::sha256;

    #[test]
    fn test_parse_mixed_program() {
        let items = parse_program("1 -2 0x10 op_add // trailing\n OP_RET").unwrap();
        assert_eq!(
            items,
            vec![
                Item::Push(Value::Int(1)),
                Item::Push(Value::Int(-2)),
                Item::Push(Value::Int(16)),
                Item::Op(Opcode::Add),
                Item::Op(Opcode::Ret),
            ]
        );
    }

    #[test]
    fn test_parse_strings() {
        let items = parse_values(r#""a b" 'c\"d' "x\\y" ''"#).unwrap();
        assert_eq!(
            items,
            vec![
                Value::Str("a b".into()),
                Value::Str("c\"d".into()),
                Value::Str("x\\y".into()),
                Value::Str(String::new()),
            ]
        );
    }

    #[test]
    fn test_string_errors() {
        assert!(parse_program(r#""open"#).is_err());
        assert!(parse_program(r#""bad\n""#).is_err());
        assert!(parse_program(r#""ab"cd""#).is_err());
        assert!(parse_program(r#"'it's'"#).is_err());
    }

    #[test]
    fn test_parse_nested_lists() {
        let items = parse_values("[] [1 [\"a\"]] 3").unwrap();
        assert_eq!(
            items,
            vec![
                Value::List(vec![]),
                Value::List(vec![Value::Int(1), Value::List(vec![Value::Str("a".into())])]),
                Value::Int(3),
            ]
        );
        assert!(parse_program("[1 2").is_err());
        assert!(parse_program("1 ]").is_err());
        assert!(parse_program("[OP_ADD]").is_err());
    }

    #[test]
    fn test_parse_typed_bytes() {
        let h = sha256(b"x");
        let items = parse_values(&format!("h0x{}", h.to_hex())).unwrap();
        assert_eq!(items, vec![Value::Hash(h)]);

        let err = parse_values("h0xabcd").unwrap_err();
        assert!(matches!(err, VmError::Parse { .. }));
        assert!(parse_values(&format!("k0x{}", "00".repeat(31))).is_err());
    }

    #[test]
    fn test_params_reject_opcodes() {
        assert_eq!(
            parse_values("1 OP_KILL"),
            Err(VmError::OpcodeInParams(Opcode::Kill))
        );
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(parse_program("OP_FOO").is_err());
        assert!(parse_program("12abc").is_err());
        assert!(parse_program("--1").is_err());
        assert!(parse_program("99999999999999999999").is_err());
    }

    #[test]
    fn test_error_positions() {
        let err = parse_program("1 2\n  bogus").unwrap_err();
        assert_eq!(
            err,
            VmError::Parse {
                line: 2,
                column: 3,
                message: "invalid token bogus".into()
            }
        );
    }

    #[test]
    fn test_display_roundtrip() {
        let values = vec![
            Value::Int(-7),
            Value::Str("q\"uote".into()),
            Value::List(vec![Value::Int(1), Value::Hash(sha256(b"a"))]),
        ];
        let text: Vec<String> = values.iter().map(ToString::to_string).collect();
        assert_eq!(parse_values(&text.join(" ")).unwrap(), values);
    }
}
