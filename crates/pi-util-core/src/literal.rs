//! Parser for Python-style literal mappings such as `~/.gyp/include.gypi`.
//!
//! Supports the subset gyp include files use: dicts, lists, tuples, quoted
//! strings (with adjacent-literal concatenation), numbers, `True`, `False`,
//! `None`, `#` comments and trailing commas. The result is a
//! `serde_json::Value` so callers can navigate it with the usual accessors.

use serde_json::{Map, Number, Value};

use crate::error::{PiUtilError, Result};

/// Parse a complete literal document.
pub fn parse_literal(source: &str) -> Result<Value> {
    let mut parser = Parser { src: source, pos: 0 };
    let value = parser.value()?;
    parser.skip_trivia();
    if parser.pos < source.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> PiUtilError {
        PiUtilError::LiteralParse {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn expect(&mut self, want: char) -> Result<()> {
        self.skip_trivia();
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(self.error(format!("expected '{want}', found '{c}'"))),
            None => Err(self.error(format!("expected '{want}', found end of input"))),
        }
    }

    fn value(&mut self) -> Result<Value> {
        self.skip_trivia();
        match self.peek() {
            Some('{') => self.dict(),
            Some('[') => self.sequence('[', ']').map(|(items, _)| Value::Array(items)),
            Some('(') => self.parenthesized(),
            Some('\'') | Some('"') => self.strings(),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.word(),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn dict(&mut self) -> Result<Value> {
        self.expect('{')?;
        let mut map = Map::new();

        loop {
            self.skip_trivia();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }

            let key = match self.value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => (if b { "True" } else { "False" }).to_string(),
                _ => return Err(self.error("dict keys must be strings or numbers")),
            };
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);

            self.skip_trivia();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                _ => return Err(self.error("expected ',' or '}' in dict")),
            }
        }
    }

    /// Items up to `close`, plus whether any separating comma was seen.
    fn sequence(&mut self, open: char, close: char) -> Result<(Vec<Value>, bool)> {
        self.expect(open)?;
        let mut items = Vec::new();
        let mut comma = false;

        loop {
            self.skip_trivia();
            if self.peek() == Some(close) {
                self.bump();
                return Ok((items, comma));
            }
            items.push(self.value()?);

            self.skip_trivia();
            match self.bump() {
                Some(',') => comma = true,
                Some(c) if c == close => return Ok((items, comma)),
                _ => return Err(self.error(format!("expected ',' or '{close}'"))),
            }
        }
    }

    /// `(x)` is just `x`; `()`, `(x,)` and `(x, y)` are tuples.
    fn parenthesized(&mut self) -> Result<Value> {
        let (items, comma) = self.sequence('(', ')')?;
        if items.len() == 1 && !comma {
            Ok(items.into_iter().next().unwrap_or(Value::Null))
        } else {
            Ok(Value::Array(items))
        }
    }

    fn strings(&mut self) -> Result<Value> {
        let mut out = self.string()?;
        loop {
            self.skip_trivia();
            match self.peek() {
                Some('\'') | Some('"') => out.push_str(&self.string()?),
                _ => return Ok(Value::String(out)),
            }
        }
    }

    fn string(&mut self) -> Result<String> {
        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        let mut out = String::new();

        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some('\\') => out.push('\\'),
                    Some('\'') => out.push('\''),
                    Some('"') => out.push('"'),
                    Some('\n') => {}
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Result<Value> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_') {
                // exponent signs only directly after 'e'
                if matches!(c, '-' | '+') && self.pos != start {
                    let prev = self.src[..self.pos].chars().last();
                    if !matches!(prev, Some('e') | Some('E')) {
                        break;
                    }
                }
                self.bump();
            } else {
                break;
            }
        }

        let text: String = self.src[start..self.pos].chars().filter(|c| *c != '_').collect();
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Value::Number(i.into()));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| PiUtilError::LiteralParse {
                offset: start,
                message: format!("invalid number '{text}'"),
            })
    }

    fn word(&mut self) -> Result<Value> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }

        let src = self.src;
        match &src[start..self.pos] {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            // string prefixes: r'..', u'..'
            "r" | "u" | "R" | "U" if matches!(self.peek(), Some('\'') | Some('"')) => {
                self.strings()
            }
            other => Err(PiUtilError::LiteralParse {
                offset: start,
                message: format!("unknown name '{other}'"),
            }),
        }
    }
}
