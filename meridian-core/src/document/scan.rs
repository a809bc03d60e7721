//! Attribute scanning inside raw block bodies
//!
//! A depth-tracking scanner for targeted reads and rewrites of top-level
//! attributes. Strings (including `${...}` interpolation) and comments
//! are respected so nested content never confuses the depth count.
//! Rewrites stay at the text level: addresses occur both as structured
//! attributes and inside interpolated strings, and only a text rewrite
//! reaches both.

use std::ops::Range;

/// A top-level attribute of a block body: its name and the byte range of
/// its value expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub name: String,
    pub value: Range<usize>,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Advance past a quoted string starting at `start` (the opening quote).
fn skip_string(src: &str, start: usize) -> usize {
    let b = src.as_bytes();
    let mut i = start + 1;
    while i < src.len() {
        match b[i] {
            b'\\' => i += 2,
            b'$' if i + 1 < src.len() && b[i + 1] == b'{' => i = skip_interp(src, i + 2),
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    src.len()
}

/// Advance past an interpolation body; `i` points just after `${`.
fn skip_interp(src: &str, mut i: usize) -> usize {
    let b = src.as_bytes();
    let mut depth = 1usize;
    while i < src.len() {
        match b[i] {
            b'"' => i = skip_string(src, i),
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }
    src.len()
}

fn at_comment(src: &str, i: usize) -> bool {
    let b = src.as_bytes();
    b[i] == b'#' || (b[i] == b'/' && i + 1 < src.len() && b[i + 1] == b'/')
}

/// Advance to the start of the next line.
fn next_line(src: &str, mut i: usize) -> usize {
    let b = src.as_bytes();
    while i < src.len() && b[i] != b'\n' {
        i += 1;
    }
    (i + 1).min(src.len())
}

/// Consume a balanced expression starting at `start`; the expression ends
/// at the first newline (or comment) reached at depth zero. Returns the
/// end of the last non-whitespace byte.
fn consume_expr(src: &str, start: usize) -> usize {
    let b = src.as_bytes();
    let mut depth = 0i32;
    let mut i = start;
    let mut end = start;
    while i < src.len() {
        match b[i] {
            b'"' => {
                i = skip_string(src, i);
                end = i;
            }
            b'{' | b'[' | b'(' => {
                depth += 1;
                i += 1;
                end = i;
            }
            b'}' | b']' | b')' => {
                depth -= 1;
                i += 1;
                end = i;
            }
            b'\n' if depth <= 0 => return end,
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            _ if at_comment(src, i) && depth <= 0 => return end,
            _ if at_comment(src, i) => i = next_line(src, i),
            _ => {
                i += 1;
                end = i;
            }
        }
    }
    end
}

/// All top-level attributes (`name = expr`) of a block body. Nested
/// blocks are skipped whole; their attributes are not reported.
pub fn top_level_attrs(body: &str) -> Vec<Attr> {
    let b = body.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let mut j = i;
        while j < body.len() && (b[j] == b' ' || b[j] == b'\t' || b[j] == b'\r') {
            j += 1;
        }
        if j >= body.len() {
            break;
        }
        if b[j] == b'\n' {
            i = j + 1;
            continue;
        }
        if at_comment(body, j) {
            i = next_line(body, j);
            continue;
        }
        let ident_start = j;
        while j < body.len() && is_ident_byte(b[j]) {
            j += 1;
        }
        let ident_end = j;
        while j < body.len() && (b[j] == b' ' || b[j] == b'\t') {
            j += 1;
        }
        if ident_end > ident_start && j < body.len() && b[j] == b'=' {
            j += 1;
            while j < body.len() && (b[j] == b' ' || b[j] == b'\t') {
                j += 1;
            }
            let value_end = consume_expr(body, j);
            out.push(Attr {
                name: body[ident_start..ident_end].to_string(),
                value: j..value_end,
            });
            i = next_line(body, value_end);
        } else {
            // not an attribute line: a nested block header or stray text;
            // consume it whole so inner attributes stay invisible
            i = next_line(body, consume_expr(body, j));
        }
    }
    out
}

/// The raw value text of a top-level attribute.
pub fn attr_value<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    top_level_attrs(body)
        .into_iter()
        .find(|a| a.name == name)
        .map(|a| &body[a.value])
}

/// Rewrite the value of a top-level attribute, returning the new body.
/// `None` when the attribute is absent.
pub fn replace_attr_value(body: &str, name: &str, new_value: &str) -> Option<String> {
    let attr = top_level_attrs(body).into_iter().find(|a| a.name == name)?;
    let mut out = String::with_capacity(body.len());
    out.push_str(&body[..attr.value.start]);
    out.push_str(new_value);
    out.push_str(&body[attr.value.end..]);
    Some(out)
}

/// The inner byte range of the first top-level nested block named `name`
/// (the span between its braces).
pub fn nested_block_inner(body: &str, name: &str) -> Option<Range<usize>> {
    let b = body.as_bytes();
    let mut i = 0;
    while i < body.len() {
        let mut j = i;
        while j < body.len() && (b[j] == b' ' || b[j] == b'\t' || b[j] == b'\r') {
            j += 1;
        }
        if j >= body.len() {
            break;
        }
        if b[j] == b'\n' {
            i = j + 1;
            continue;
        }
        if at_comment(body, j) {
            i = next_line(body, j);
            continue;
        }
        let ident_start = j;
        while j < body.len() && is_ident_byte(b[j]) {
            j += 1;
        }
        let ident_end = j;
        while j < body.len() && (b[j] == b' ' || b[j] == b'\t') {
            j += 1;
        }
        let is_header = ident_end > ident_start && j < body.len() && b[j] == b'{';
        if is_header && &body[ident_start..ident_end] == name {
            let open = j;
            let close = matching_brace(body, open)?;
            return Some(open + 1..close);
        }
        i = next_line(body, consume_expr(body, j));
    }
    None
}

/// Index of the brace matching the one at `open`.
fn matching_brace(src: &str, open: usize) -> Option<usize> {
    let b = src.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < src.len() {
        match b[i] {
            b'"' => {
                i = skip_string(src, i);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ if at_comment(src, i) => {
                i = next_line(src, i);
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Strip surrounding quotes from a literal string value; `None` when the
/// value is not a plain quoted literal (a reference, number, or template
/// containing interpolation).
pub fn unquote(value: &str) -> Option<String> {
    let inner = value.strip_prefix('"')?.strip_suffix('"')?;
    if inner.contains("${") {
        return None;
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '"' {
            return None; // interior quote: not a single literal
        }
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "  type = \"Microsoft.Network/virtualNetworks@2023-04-01\"\n  name = var.resource_name\n  body = {\n    properties = {\n      name = \"inner\"\n    }\n  }\n  location = \"westeurope\"";

    #[test]
    fn finds_top_level_attrs_only() {
        let names: Vec<_> = top_level_attrs(BODY).into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["type", "name", "body", "location"]);
    }

    #[test]
    fn nested_name_is_invisible() {
        assert_eq!(attr_value(BODY, "name"), Some("var.resource_name"));
        assert_eq!(attr_value(BODY, "location"), Some("\"westeurope\""));
    }

    #[test]
    fn replace_rewrites_only_the_value() {
        let out = replace_attr_value(BODY, "location", "var.location").unwrap();
        assert!(out.contains("location = var.location"));
        assert!(out.contains("name = \"inner\""));
    }

    #[test]
    fn multiline_value_is_one_attr() {
        let attrs = top_level_attrs(BODY);
        let body_attr = attrs.iter().find(|a| a.name == "body").unwrap();
        assert!(BODY[body_attr.value.clone()].contains("properties"));
        assert!(BODY[body_attr.value.clone()].ends_with('}'));
    }

    #[test]
    fn nested_block_header_is_skipped() {
        let body = "  required_providers {\n    azapi = {\n      source = \"Azure/azapi\"\n    }\n  }";
        assert!(top_level_attrs(body).is_empty());
        let inner = nested_block_inner(body, "required_providers").unwrap();
        assert!(body[inner].contains("azapi"));
    }

    #[test]
    fn strings_with_braces_do_not_confuse_depth() {
        let body = "  a = \"${azapi_resource.x.id}/sub{}\"\n  b = 2";
        let names: Vec<_> = top_level_attrs(body).into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn unquote_literals() {
        assert_eq!(unquote("\"westeurope\"").as_deref(), Some("westeurope"));
        assert_eq!(unquote("var.location"), None);
        assert_eq!(unquote("\"${var.location}\""), None);
    }

    #[test]
    fn trailing_comment_ends_expr() {
        let body = "  a = \"x\" # note\n  b = 1";
        assert_eq!(attr_value(body, "a"), Some("\"x\""));
    }
}
