//! Single-pass scanner for the flat single-brace grammar.
//!
//! Regions are never nested, so the scanner walks the template once,
//! left to right, without backtracking. Quote awareness matters only
//! inside a region: filter arguments may carry `}`, `|`, `,` or `:`
//! when quoted.

use crate::error::{Error, Result};
use crate::flat::filters::FilterInvocation;

const OPT_MARKER: &str = ":opt=";

/// One parsed piece of a flat template.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Text outside braces, passed through byte-for-byte.
    Literal(String),
    /// `{name|filter(args)}`
    Token(TokenRef),
    /// `{:opt=PRE:name:opt=SUF:}` - either side of the wrapping may be
    /// absent. Nesting is not supported.
    Optional { prefix: String, token: TokenRef, suffix: String },
}

/// A token reference with its filter chain and source offset.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRef {
    pub name: String,
    pub filters: Vec<FilterInvocation>,
    /// Byte offset of the region's opening brace, for error reports.
    pub offset: usize,
}

/// Parses a flat template into segments.
pub fn parse(template: &str) -> Result<Vec<Segment>> {
    let bytes = template.as_bytes();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'{' {
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            let end = find_region_end(template, pos)?;
            let inner = &template[pos + 1..end];
            segments.push(parse_region(inner, pos)?);
            pos = end + 1;
        } else {
            // stray '}' outside a region is literal text
            let ch = template[pos..].chars().next().unwrap_or('\0');
            literal.push(ch);
            pos += ch.len_utf8();
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Finds the closing brace of the region opened at `start`, skipping
/// quoted stretches so filter arguments may contain `}`.
///
/// Quotes only delimit filter arguments, i.e. inside parentheses after
/// a `|`. In optional-segment prefix/suffix text an apostrophe or
/// double quote is an ordinary literal character.
fn find_region_end(template: &str, start: usize) -> Result<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut in_filter = false;
    let mut depth = 0usize;
    for (idx, ch) in template[start + 1..].char_indices() {
        let abs = start + 1 + idx;
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(q) => match ch {
                '\\' => escaped = true,
                c if c == q => quote = None,
                _ => {}
            },
            None => match ch {
                '\'' | '"' if in_filter && depth > 0 => quote = Some(ch),
                '|' => in_filter = true,
                '(' if in_filter => depth += 1,
                ')' if depth > 0 => depth -= 1,
                '}' => return Ok(abs),
                '{' => return Err(malformed(template, start)),
                _ => {}
            },
        }
    }
    Err(malformed(template, start))
}

fn malformed(template: &str, offset: usize) -> Error {
    let snippet: String = template[offset..].chars().take(32).collect();
    Error::MalformedTokenSyntax { snippet, offset }
}

/// Parses the text between a region's braces.
fn parse_region(inner: &str, offset: usize) -> Result<Segment> {
    if inner.trim().is_empty() {
        return Err(Error::MalformedTokenSyntax {
            snippet: format!("{{{inner}}}"),
            offset,
        });
    }

    let mut rest = inner;
    let mut prefix: Option<String> = None;
    let mut suffix: Option<String> = None;

    // leading ':opt=PRE:' wrapper; the prefix text cannot contain ':'
    if let Some(after) = rest.strip_prefix(OPT_MARKER) {
        match after.find(':') {
            Some(colon) => {
                prefix = Some(after[..colon].to_string());
                rest = &after[colon + 1..];
            }
            None => {
                return Err(Error::MalformedTokenSyntax {
                    snippet: format!("{{{inner}}}"),
                    offset,
                });
            }
        }
    }

    // trailing ':opt=SUF:' wrapper; token names and unquoted filter text
    // never contain ':', so the first unquoted colon begins the wrapper
    if let Some(colon) = find_unquoted(rest, ':') {
        let tail = &rest[colon..];
        let valid = tail.starts_with(OPT_MARKER)
            && tail.ends_with(':')
            && tail.len() > OPT_MARKER.len()
            && !tail[OPT_MARKER.len()..tail.len() - 1].contains(':');
        if !valid {
            return Err(Error::MalformedTokenSyntax {
                snippet: format!("{{{inner}}}"),
                offset,
            });
        }
        suffix = Some(tail[OPT_MARKER.len()..tail.len() - 1].to_string());
        rest = &rest[..colon];
    }

    let token = parse_token_and_filters(rest, inner, offset)?;

    if prefix.is_some() || suffix.is_some() {
        Ok(Segment::Optional {
            prefix: prefix.unwrap_or_default(),
            token,
            suffix: suffix.unwrap_or_default(),
        })
    } else {
        Ok(Segment::Token(token))
    }
}

/// Parses `name|filter1|filter2(args)` into a [`TokenRef`].
fn parse_token_and_filters(text: &str, inner: &str, offset: usize) -> Result<TokenRef> {
    let parts = split_unquoted(text, '|');
    let name = parts.first().map(|p| p.trim()).unwrap_or_default();
    if name.is_empty() || !is_valid_token_name(name) {
        return Err(Error::MalformedTokenSyntax {
            snippet: format!("{{{inner}}}"),
            offset,
        });
    }

    let mut filters = Vec::new();
    for part in &parts[1..] {
        filters.push(parse_filter(part.trim(), inner, offset)?);
    }

    Ok(TokenRef { name: name.to_string(), filters, offset })
}

/// Token names are lowercase word characters.
fn is_valid_token_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Parses one `name` or `name(arg, arg)` filter step.
fn parse_filter(part: &str, inner: &str, offset: usize) -> Result<FilterInvocation> {
    let malformed = || Error::MalformedTokenSyntax {
        snippet: format!("{{{inner}}}"),
        offset,
    };

    match part.find('(') {
        None => {
            if part.is_empty() {
                return Err(malformed());
            }
            Ok(FilterInvocation { name: part.to_string(), args: Vec::new() })
        }
        Some(open) => {
            if !part.ends_with(')') {
                return Err(malformed());
            }
            let name = part[..open].trim();
            if name.is_empty() {
                return Err(malformed());
            }
            let args_str = &part[open + 1..part.len() - 1];
            let mut args = Vec::new();
            if !args_str.trim().is_empty() {
                for raw in split_unquoted(args_str, ',') {
                    args.push(parse_argument(raw.trim()).ok_or_else(malformed)?);
                }
            }
            Ok(FilterInvocation { name: name.to_string(), args })
        }
    }
}

/// Decodes one filter argument: a quoted literal (single or double
/// quotes, backslash escapes) or a bare word/number.
fn parse_argument(raw: &str) -> Option<String> {
    let mut chars = raw.chars();
    match chars.next() {
        Some(q @ ('\'' | '"')) => {
            let mut out = String::new();
            let mut escaped = false;
            let mut closed = false;
            for ch in chars {
                if closed {
                    // text after the closing quote is malformed
                    return None;
                }
                if escaped {
                    out.push(ch);
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    closed = true;
                } else {
                    out.push(ch);
                }
            }
            if closed { Some(out) } else { None }
        }
        Some(_) => Some(raw.to_string()),
        None => None,
    }
}

/// Splits on a delimiter, ignoring delimiters inside quoted stretches.
fn split_unquoted(text: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(q) => match ch {
                '\\' => escaped = true,
                c if c == q => quote = None,
                _ => {}
            },
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                c if c == delim => {
                    parts.push(&text[start..idx]);
                    start = idx + ch.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Returns the byte index of the first unquoted occurrence of `needle`.
fn find_unquoted(text: &str, needle: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(q) => match ch {
                '\\' => escaped = true,
                c if c == q => quote = None,
                _ => {}
            },
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                c if c == needle => return Some(idx),
                _ => {}
            },
        }
    }
    None
}
