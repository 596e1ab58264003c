//! Rendering-safe tokens for identifiers.
//!
//! Graph visualizations need node ids drawn from a small alphabet. The mapping
//! here is pure and injective, so two distinct identifiers never share a node:
//! ASCII alphanumerics are kept, `_` is doubled, and every other byte of the
//! UTF-8 encoding becomes `_` followed by two lowercase hex digits.

use crate::graph::Iri;

/// Maps an identifier to its rendering token.
#[must_use]
pub fn render_token(iri: &Iri) -> String {
    sanitize(iri.as_str())
}

/// [`render_token`] for arbitrary text.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let mut token = String::with_capacity(text.len() * 2);
    for byte in text.bytes() {
        match byte {
            b'_' => token.push_str("__"),
            b if b.is_ascii_alphanumeric() => token.push(char::from(b)),
            b => token.push_str(&format!("_{b:02x}")),
        }
    }
    token
}

/// Short human-readable name of an identifier: the part after the last `#`
/// or `/`, or the whole identifier if that part is empty.
#[must_use]
pub fn display_name(iri: &Iri) -> &str {
    let text = iri.as_str();
    match text.rfind(|c: char| c == '#' || c == '/') {
        Some(at) if at + 1 < text.len() => &text[at + 1..],
        _ => text,
    }
}
