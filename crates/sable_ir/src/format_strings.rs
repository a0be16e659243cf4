//! Parsing of trace format strings such as `"x is {:#x}, y is {}"`.

use sable_common::FormatPreference;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One step of a parsed format string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatStep {
    /// Literal text, with `{{` and `}}` already unescaped.
    Text(String),
    /// Placeholder for the next operand.
    Substitution(FormatPreference),
}

/// Errors from [`parse_format_string`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A `{...}` placeholder with an unknown specifier.
    #[error("invalid or unsupported format specifier \"{specifier}\" in format string \"{format}\"")]
    UnsupportedSpecifier {
        /// The full placeholder text, braces included.
        specifier: String,
        /// The format string being parsed.
        format: String,
    },
    /// A `{` with no matching `}`.
    #[error("'{{' at position {position} has no matching '}}' in format string \"{format}\"")]
    UnmatchedOpenBrace {
        /// Byte offset of the brace.
        position: usize,
        /// The format string being parsed.
        format: String,
    },
    /// A `}` that does not close a placeholder and is not escaped.
    #[error("unmatched '}}' at position {position} in format string \"{format}\"")]
    UnmatchedCloseBrace {
        /// Byte offset of the brace.
        position: usize,
        /// The format string being parsed.
        format: String,
    },
}

const SPECIFIERS: &[(&str, FormatPreference)] = &[
    ("{}", FormatPreference::Default),
    ("{:d}", FormatPreference::Decimal),
    ("{:x}", FormatPreference::PlainHex),
    ("{:#x}", FormatPreference::Hex),
    ("{:b}", FormatPreference::PlainBinary),
    ("{:#b}", FormatPreference::Binary),
];

/// Parses a format string into text and substitution steps.
///
/// Adjacent text is coalesced into a single [`FormatStep::Text`].
pub fn parse_format_string(format: &str) -> Result<Vec<FormatStep>, FormatError> {
    let mut steps = Vec::new();
    let mut text = String::new();
    let bytes = format.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let rest = &format[i..];
        if rest.starts_with("{{") {
            text.push('{');
            i += 2;
            continue;
        }
        if rest.starts_with("}}") {
            text.push('}');
            i += 2;
            continue;
        }
        match bytes[i] {
            b'{' => {
                let close = rest.find('}').ok_or_else(|| FormatError::UnmatchedOpenBrace {
                    position: i,
                    format: format.to_string(),
                })?;
                let specifier = &rest[..=close];
                let pref = SPECIFIERS
                    .iter()
                    .find(|(s, _)| *s == specifier)
                    .map(|(_, p)| *p)
                    .ok_or_else(|| FormatError::UnsupportedSpecifier {
                        specifier: specifier.to_string(),
                        format: format.to_string(),
                    })?;
                if !text.is_empty() {
                    steps.push(FormatStep::Text(std::mem::take(&mut text)));
                }
                steps.push(FormatStep::Substitution(pref));
                i += specifier.len();
            }
            b'}' => {
                return Err(FormatError::UnmatchedCloseBrace {
                    position: i,
                    format: format.to_string(),
                });
            }
            _ => {
                let next = rest
                    .find(['{', '}'])
                    .unwrap_or(rest.len());
                text.push_str(&rest[..next]);
                i += next;
            }
        }
    }
    if !text.is_empty() {
        steps.push(FormatStep::Text(text));
    }
    Ok(steps)
}

/// Number of operands a parsed format consumes.
pub fn operands_expected_by_format(steps: &[FormatStep]) -> usize {
    steps
        .iter()
        .filter(|s| matches!(s, FormatStep::Substitution(_)))
        .count()
}

/// Renders parsed steps as a Verilog `$display` format string body (without
/// the surrounding quotes).
pub fn to_verilog_format(steps: &[FormatStep]) -> String {
    let mut out = String::new();
    for step in steps {
        match step {
            FormatStep::Text(text) => {
                for c in text.chars() {
                    match c {
                        '%' => out.push_str("%%"),
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        other => out.push(other),
                    }
                }
            }
            FormatStep::Substitution(pref) => out.push_str(match pref {
                FormatPreference::Default | FormatPreference::Decimal => "%d",
                FormatPreference::PlainHex => "%h",
                FormatPreference::Hex => "0x%h",
                FormatPreference::PlainBinary => "%b",
                FormatPreference::Binary => "0b%b",
            }),
        }
    }
    out
}
