//! Built-in scalar literals: `<integer>`, `<unsigned>`, `<data>`,
//! `<boolean>`, `<true/>` and `<false/>`.

use crate::tree::path;
use crate::value::Value;
use base64::Engine;

/// Tags that turn their parent element into a typed scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralTag {
    Integer,
    Unsigned,
    Data,
    Boolean,
    True,
    False,
}

impl LiteralTag {
    /// Recognize a literal tag name, ignoring case
    pub fn from_tag(tag: &str) -> Option<Self> {
        const TAGS: [(&str, LiteralTag); 6] = [
            ("integer", LiteralTag::Integer),
            ("unsigned", LiteralTag::Unsigned),
            ("data", LiteralTag::Data),
            ("boolean", LiteralTag::Boolean),
            ("true", LiteralTag::True),
            ("false", LiteralTag::False),
        ];
        TAGS.iter()
            .find(|(name, _)| path::names_match(name, tag))
            .map(|(_, literal)| *literal)
    }
}

/// A parsed literal; `hex` records that the source text used a `0x` prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub value: Value,
    pub hex: bool,
}

impl Literal {
    fn plain(value: Value) -> Self {
        Self { value, hex: false }
    }

    /// Render for ingestion logs, keeping hex literals in hex
    pub fn display(&self) -> String {
        match (&self.value, self.hex) {
            (Value::Integer(i), true) => format!("0x{:016X}", i),
            (Value::Unsigned(u), true) => format!("0x{:016X}", u),
            (value, _) => value.to_string(),
        }
    }
}

/// Interpret the text of a literal element.
///
/// Returns `None` when nothing should be stored: a missing text for the
/// text-bearing tags, undecodable base64, or base64 that decodes to nothing.
pub fn parse_literal(tag: LiteralTag, text: Option<&str>) -> Option<Literal> {
    match tag {
        LiteralTag::True => Some(Literal::plain(Value::Boolean(true))),
        LiteralTag::False => Some(Literal::plain(Value::Boolean(false))),
        LiteralTag::Integer => text.map(|t| {
            let (value, hex) = parse_integer(t);
            Literal {
                value: Value::Integer(value),
                hex,
            }
        }),
        LiteralTag::Unsigned => text.map(|t| {
            let (value, hex) = parse_unsigned(t);
            Literal {
                value: Value::Unsigned(value),
                hex,
            }
        }),
        LiteralTag::Boolean => text.map(|t| Literal::plain(Value::Boolean(parse_boolean(t)))),
        LiteralTag::Data => text
            .and_then(decode_data)
            .map(|data| Literal::plain(Value::Data(data))),
    }
}

/// Signed literal: optional `-`, then a hex (`0x`) or decimal magnitude.
/// The magnitude wraps into the signed range.
pub fn parse_integer(text: &str) -> (i64, bool) {
    let text = text.trim();
    let (negative, magnitude_text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (magnitude, hex) = parse_unsigned(magnitude_text);
    let value = magnitude as i64;
    (if negative { value.wrapping_neg() } else { value }, hex)
}

/// Unsigned literal: a hex (`0x`) or decimal magnitude
pub fn parse_unsigned(text: &str) -> (u64, bool) {
    let text = text.trim();
    match hex_digits(text) {
        Some(digits) => (leading_number(digits, 16), true),
        None => (leading_number(text, 10), false),
    }
}

/// Boolean literal: text starting with `t`/`T`, or any nonzero number
pub fn parse_boolean(text: &str) -> bool {
    let text = text.trim();
    if text.starts_with(['t', 'T']) {
        return true;
    }
    if let Some(digits) = hex_digits(text) {
        if leading_number(digits, 16) != 0 {
            return true;
        }
    }
    leading_number(text, 10) != 0
}

/// Base64 payload with embedded whitespace removed; empty results are dropped
pub fn decode_data(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .ok()
        .filter(|data| !data.is_empty())
}

fn hex_digits(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

/// Value of the leading run of digits; parsing stops at the first other
/// character and saturates on overflow.
fn leading_number(text: &str, radix: u32) -> u64 {
    let mut value: u64 = 0;
    for digit in text
        .trim_start_matches([' ', '\t'])
        .chars()
        .map_while(|c| c.to_digit(radix))
    {
        value = match value
            .checked_mul(u64::from(radix))
            .and_then(|v| v.checked_add(u64::from(digit)))
        {
            Some(v) => v,
            None => return u64::MAX,
        };
    }
    value
}
