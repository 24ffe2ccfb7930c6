//! Configuration path syntax: segment splitting, case-insensitive name
//! comparison, joining, and printf-style template rendering.

use crate::error::{Result, StoreError};
use std::cmp::Ordering;

/// Separator between path segments
pub const DELIMITER: char = '\\';

/// Case-insensitive equality of two segment names
pub fn names_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Case-insensitive ordering of two segment names
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Non-empty segments of a path, in order
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(DELIMITER).filter(|segment| !segment.is_empty())
}

/// Whether a path addresses the root (`None`, empty, or delimiters only)
pub fn is_root(path: Option<&str>) -> bool {
    path.map_or(true, |p| segments(p).next().is_none())
}

/// Normalize a path for display and comparison: one leading delimiter,
/// no repeated or trailing delimiters.
pub fn normalize_path_string(path: &str) -> String {
    let mut result = String::with_capacity(path.len() + 1);
    for segment in segments(path) {
        result.push(DELIMITER);
        result.push_str(segment);
    }
    if result.is_empty() {
        result.push(DELIMITER);
    }
    result
}

/// Append a segment (which may itself contain delimiters) to a parent path
pub fn join(parent: &str, segment: &str) -> String {
    let parent = parent.trim_end_matches(DELIMITER);
    let segment = segment.trim_start_matches(DELIMITER);
    format!("{}{}{}", parent, DELIMITER, segment)
}

/// An argument substituted into a path template by [`render`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathArg {
    Unsigned(u64),
    Integer(i64),
    Text(String),
}

impl From<u64> for PathArg {
    fn from(v: u64) -> Self {
        PathArg::Unsigned(v)
    }
}

impl From<u32> for PathArg {
    fn from(v: u32) -> Self {
        PathArg::Unsigned(v.into())
    }
}

impl From<usize> for PathArg {
    fn from(v: usize) -> Self {
        PathArg::Unsigned(v as u64)
    }
}

impl From<i64> for PathArg {
    fn from(v: i64) -> Self {
        PathArg::Integer(v)
    }
}

impl From<i32> for PathArg {
    fn from(v: i32) -> Self {
        PathArg::Integer(v.into())
    }
}

impl From<&str> for PathArg {
    fn from(v: &str) -> Self {
        PathArg::Text(v.to_string())
    }
}

impl From<String> for PathArg {
    fn from(v: String) -> Self {
        PathArg::Text(v)
    }
}

/// Render a path template such as `\Memory\Module\%u\Type`.
///
/// Supported conversions: `%u`, `%d`, `%i` (decimal), `%x`, `%X` (hex), `%s`
/// (any argument as text) and `%%`. A zero-padded width (`%02X`) is accepted
/// for numeric conversions. Arguments are consumed positionally; a missing or
/// unused argument is an error.
pub fn render(template: &str, args: &[PathArg]) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 8);
    let mut args_iter = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let zero_pad = chars.next_if_eq(&'0').is_some();
        let mut width = 0usize;
        while let Some(d) = chars.peek().and_then(|d| d.to_digit(10)) {
            width = width * 10 + d as usize;
            chars.next();
        }

        let conversion = chars.next().ok_or_else(|| {
            StoreError::InvalidArgument(format!("Dangling '%' in path template: {}", template))
        })?;
        if conversion == '%' {
            out.push('%');
            continue;
        }

        let arg = args_iter.next().ok_or_else(|| {
            StoreError::InvalidArgument(format!(
                "Path template {} needs more than {} argument(s)",
                template,
                args.len()
            ))
        })?;

        let rendered = match (conversion, arg) {
            ('u' | 'd' | 'i', PathArg::Unsigned(v)) => v.to_string(),
            ('u' | 'd' | 'i', PathArg::Integer(v)) => v.to_string(),
            ('x', PathArg::Unsigned(v)) => format!("{:x}", v),
            ('x', PathArg::Integer(v)) => format!("{:x}", v),
            ('X', PathArg::Unsigned(v)) => format!("{:X}", v),
            ('X', PathArg::Integer(v)) => format!("{:X}", v),
            ('s', PathArg::Text(v)) => v.clone(),
            ('s', PathArg::Unsigned(v)) => v.to_string(),
            ('s', PathArg::Integer(v)) => v.to_string(),
            (other, arg) => {
                return Err(StoreError::InvalidArgument(format!(
                    "Conversion '%{}' cannot render {:?} in path template {}",
                    other, arg, template
                )))
            }
        };

        let pad = if zero_pad { '0' } else { ' ' };
        for _ in rendered.chars().count()..width {
            out.push(pad);
        }
        out.push_str(&rendered);
    }

    if args_iter.next().is_some() {
        return Err(StoreError::InvalidArgument(format!(
            "Path template {} has fewer conversions than the {} argument(s) supplied",
            template,
            args.len()
        )));
    }

    Ok(out)
}
