//! Embedded list fields
//!
//! `genres` and `production_companies` hold Python literals rather than
//! JSON:
//!
//! ```text
//! [{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': "Children's"}]
//! ```
//!
//! Strings are single-quoted unless they contain an apostrophe, escapes
//! follow Python rules (`\'`, `\xNN`, ...) and `None`/`True`/`False` may
//! appear. [`python_literal_to_json`] rewrites the literal into JSON so it
//! can be decoded with serde into typed [`EmbeddedEntity`] records.

use crate::models::EmbeddedEntity;
use movies_common::{EtlError, Result};
use serde_json::Value;
use std::iter::Peekable;
use std::str::Chars;

/// Decoded embedded list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityList {
    pub entities: Vec<EmbeddedEntity>,
    /// Elements without a usable integer `id` and string `name`
    pub rejected: usize,
}

/// Decode an embedded list field into entities
///
/// A blank field is an empty list. The field as a whole is an error only
/// when it is not a list; individual bad elements are counted in
/// [`EntityList::rejected`].
pub fn parse_entity_list(raw: &str) -> Result<EntityList> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(EntityList::default());
    }

    let json = python_literal_to_json(trimmed)?;
    let values: Vec<Value> = serde_json::from_str(&json)
        .map_err(|e| EtlError::embedded(format!("expected a list of objects: {e}")))?;

    let mut list = EntityList::default();
    for value in values {
        match serde_json::from_value::<EmbeddedEntity>(value) {
            Ok(entity) => list.entities.push(entity),
            Err(_) => list.rejected += 1,
        }
    }

    Ok(list)
}

/// Rewrite a Python literal (lists, dicts, strings, numbers, `None`,
/// `True`, `False`) as JSON text
pub fn python_literal_to_json(input: &str) -> Result<String> {
    let mut out = String::with_capacity(input.len() + 16);
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => read_string(c, &mut chars, &mut out)?,
            // exponent or suffix of a number literal
            c if c.is_ascii_alphabetic() && out.ends_with(|p: char| p.is_ascii_digit() || p == '.') => {
                out.push(c)
            },
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !(next.is_ascii_alphanumeric() || next == '_') {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                match word.as_str() {
                    "None" => out.push_str("null"),
                    "True" => out.push_str("true"),
                    "False" => out.push_str("false"),
                    _ => {
                        return Err(EtlError::embedded(format!("unexpected identifier `{word}`")))
                    },
                }
            },
            c => out.push(c),
        }
    }

    Ok(out)
}

/// Copy one quoted string to `out` as a JSON string; the opening quote has
/// already been consumed
fn read_string(quote: char, chars: &mut Peekable<Chars<'_>>, out: &mut String) -> Result<()> {
    out.push('"');

    loop {
        let c = chars
            .next()
            .ok_or_else(|| EtlError::embedded("unterminated string"))?;

        match c {
            c if c == quote => break,
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| EtlError::embedded("dangling escape"))?;
                match escaped {
                    // line continuation
                    '\n' => {},
                    '\'' | '"' | '\\' => push_json_char(escaped, out),
                    'a' => out.push_str("\\u0007"),
                    'b' => out.push_str("\\b"),
                    'f' => out.push_str("\\f"),
                    'n' => out.push_str("\\n"),
                    'r' => out.push_str("\\r"),
                    't' => out.push_str("\\t"),
                    'v' => out.push_str("\\u000b"),
                    'x' => push_code_point(read_hex(chars, 2, 'x')?, out)?,
                    'u' => push_code_point(read_hex(chars, 4, 'u')?, out)?,
                    'U' => push_code_point(read_hex(chars, 8, 'U')?, out)?,
                    '0'..='7' => {
                        let mut value = escaped.to_digit(8).unwrap_or(0);
                        for _ in 0..2 {
                            match chars.peek().and_then(|c| c.to_digit(8)) {
                                Some(digit) => {
                                    value = value * 8 + digit;
                                    chars.next();
                                },
                                None => break,
                            }
                        }
                        push_code_point(value, out)?;
                    },
                    // unrecognized escapes keep their backslash
                    other => {
                        out.push_str("\\\\");
                        push_json_char(other, out);
                    },
                }
            },
            c => push_json_char(c, out),
        }
    }

    out.push('"');
    Ok(())
}

/// Read exactly `len` hex digits following `\<escape>`
fn read_hex(chars: &mut Peekable<Chars<'_>>, len: usize, escape: char) -> Result<u32> {
    let hex: String = chars.by_ref().take(len).collect();
    if hex.len() != len || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
        return Err(EtlError::embedded(format!("bad \\{escape} escape: \\{escape}{hex}")));
    }
    u32::from_str_radix(&hex, 16).map_err(|e| EtlError::embedded(e.to_string()))
}

fn push_code_point(value: u32, out: &mut String) -> Result<()> {
    let c = char::from_u32(value)
        .ok_or_else(|| EtlError::embedded(format!("invalid code point U+{value:04X}")))?;
    push_json_char(c, out);
    Ok(())
}

fn push_json_char(c: char, out: &mut String) {
    if c == '"' || c == '\\' {
        out.push('\\');
        out.push(c);
    } else if c.is_control() {
        out.push_str(&format!("\\u{:04x}", c as u32));
    } else {
        out.push(c);
    }
}
