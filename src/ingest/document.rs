//! Document decoding: raw configuration bytes to XML text to a parsed tree

use crate::error::{Result, StoreError};

/// Decode configuration bytes into text.
///
/// UTF-16 is recognized by its byte order mark, or without one by a leading
/// `<` in either byte order. A UTF-8 byte order mark is stripped. Anything
/// else must be UTF-8.
pub fn decode_text(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(StoreError::InvalidArgument(
            "Configuration document is empty".to_string(),
        ));
    }

    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => decode_utf8(rest),
        [b'<', 0x00, ..] => decode_utf16(bytes, u16::from_le_bytes),
        [0x00, b'<', ..] => decode_utf16(bytes, u16::from_be_bytes),
        _ => decode_utf8(bytes),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(StoreError::Encoding(format!(
            "UTF-16 document has odd length {}",
            bytes.len()
        )));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16(&units)
        .map_err(|e| StoreError::Encoding(format!("Invalid UTF-16 document: {}", e)))?;
    // A trailing NUL terminator is common in firmware-produced files
    Ok(text.trim_end_matches('\0').to_string())
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| StoreError::Encoding(format!("Invalid UTF-8 document: {}", e)))?;
    Ok(text.trim_end_matches('\0').to_string())
}

/// Parse XML text into a document tree
pub fn parse_xml(text: &str) -> Result<roxmltree::Document<'_>> {
    Ok(roxmltree::Document::parse(text)?)
}
