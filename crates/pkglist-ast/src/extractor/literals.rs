use anyhow::{anyhow, bail, Result};

/// Decode the source text of a Python string literal, e.g. `'six'`, `"""a\nb"""` or `r"x\y"`.
///
/// f-strings and byte strings are rejected.
pub(super) fn decode_string_literal(text: &str) -> Result<String> {
    let quote_start = text
        .find(['\'', '"'])
        .ok_or_else(|| anyhow!("not a string literal: {text}"))?;
    let prefix = text[..quote_start].to_ascii_lowercase();
    if prefix.contains('f') {
        bail!("f-strings are not supported: {text}");
    }
    if prefix.contains('b') {
        bail!("byte strings are not supported: {text}");
    }

    let body = &text[quote_start..];
    let quote = if body.starts_with("\"\"\"") || body.starts_with("'''") {
        &body[..3]
    } else {
        &body[..1]
    };
    let inner = body
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
        .ok_or_else(|| anyhow!("unterminated string literal: {text}"))?;

    if prefix.contains('r') {
        Ok(inner.to_string())
    } else {
        Ok(unescape(inner))
    }
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            // line continuation
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
