use eyre::{eyre, Result};
use std::{fmt::Write, ops::Range};

/// Decodes a hex string into a vector of bytes
///
/// ```
/// use brokkr_common::utils::strings::decode_hex;
///
/// let hex = "deadbeef";
/// let result = decode_hex(hex).expect("should decode hex");
/// assert_eq!(result, vec![0xde, 0xad, 0xbe, 0xef]);
/// ```
pub fn decode_hex(mut s: &str) -> Result<Vec<u8>> {
    // normalize
    s = s.trim_start_matches("0x").trim();

    if s.is_empty() {
        return Ok(vec![]);
    }

    if s.len() % 2 != 0 {
        return Err(eyre!("odd-length hex string: {}", s));
    }

    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16))
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| eyre!("invalid hex string: {}", s))
}

/// Encodes a slice of bytes into a hex string
///
/// ```
/// use brokkr_common::utils::strings::encode_hex;
///
/// let bytes = vec![0xde, 0xad, 0xbe, 0xef];
/// let result = encode_hex(&bytes);
/// assert_eq!(result, "deadbeef");
/// ```
pub fn encode_hex(s: &[u8]) -> String {
    s.iter().fold(String::new(), |mut acc, b| {
        write!(acc, "{b:02x}").expect("unable to write");
        acc
    })
}

/// Finds the first balanced delimiter pair in a string, returning the range of
/// the enclosed content (delimiters excluded)
///
/// ```
/// use brokkr_common::utils::strings::find_balanced_encapsulator;
///
/// let s = "outer(inner(nested),tail)";
/// let range = find_balanced_encapsulator(s, ('(', ')')).expect("should find balanced pair");
/// assert_eq!(&s[range], "inner(nested),tail");
/// ```
pub fn find_balanced_encapsulator(s: &str, encap: (char, char)) -> Result<Range<usize>> {
    let mut open = 0;
    let mut close = 0;
    let mut start = 0;
    let mut end = 0;
    for (i, c) in s.chars().enumerate() {
        if c == encap.0 {
            if open == 0 {
                start = i;
            }
            open += 1;
        } else if c == encap.1 {
            close += 1;
        }
        if open == close && open > 0 {
            end = i;
            break;
        }
    }

    if !(open == close && end > start && open > 0) {
        return Err(eyre!("string '{}' doesn't contain balanced '{}{}'", s, encap.0, encap.1));
    }

    Ok(start + 1..end)
}

/// Splits a comma-separated list at the top nesting level only, so commas
/// inside parentheses or brackets do not split
///
/// ```
/// use brokkr_common::utils::strings::split_top_level;
///
/// let parts = split_top_level("uint256,(bool,string)[],address", ',');
/// assert_eq!(parts, vec!["uint256", "(bool,string)[]", "address"]);
/// ```
pub fn split_top_level(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut last = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&s[last..i]);
                last = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[last..]);
    parts
}
