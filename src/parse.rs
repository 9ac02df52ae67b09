//! Parsers for the tag tool's line-oriented output.
//!
//! Malformed lines never fail a batch. The tool mixes blank and diagnostic
//! lines into its output, so the batch helpers are plain filters that drop
//! whatever does not fit and keep the rest in emission order.

use crate::model::TagRecord;

/// Parse `symbol line path signature...`.
///
/// The signature is everything after the whitespace following the path and
/// may be empty, but that whitespace itself is required.
pub fn parse_tag_line(line: &str) -> Option<TagRecord> {
    let (symbol, rest) = take_field(line)?;
    let (line_number, rest) = take_field(rest)?;
    let (path, rest) = take_field(rest)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let line_number: u32 = line_number.parse().ok()?;
    if line_number == 0 {
        return None;
    }
    Some(TagRecord {
        symbol: symbol.to_string(),
        line_number,
        path: path.to_string(),
        signature: rest.trim_start().to_string(),
    })
}

/// First whitespace-delimited token of `line`.
pub fn parse_symbol_only_line(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

pub fn parse_tag_lines(text: &str) -> impl Iterator<Item = TagRecord> + '_ {
    text.lines().filter_map(parse_tag_line)
}

pub fn parse_symbol_lines(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.lines().filter_map(parse_symbol_only_line)
}

/// Split off the leading run of non-whitespace, skipping whitespace before it.
fn take_field(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    if end == 0 {
        return None;
    }
    Some(input.split_at(end))
}
