//! N-Triples serializer.
//!
//! Produces one triple per line with absolute IRIs, in the graph's
//! deterministic iteration order.

use crate::graph::{encode_iri, Graph, Literal, Term, Triple};

/// Serializes `graph` to an N-Triples string.
#[must_use]
pub fn to_ntriples(graph: &Graph) -> String {
    let mut out = String::with_capacity(graph.len() * 96);
    for t in graph {
        triple(&mut out, t);
    }
    out
}

fn triple(out: &mut String, t: &Triple) {
    out.push_str(&term(&t.subject));
    out.push(' ');
    out.push_str(&iriref(t.predicate.as_str()));
    out.push(' ');
    out.push_str(&term(&t.object));
    out.push_str(" .\n");
}

pub(crate) fn term(term: &Term) -> String {
    match term {
        Term::Iri(iri) => iriref(iri.as_str()),
        Term::Blank(label) => format!("_:{label}"),
        Term::Literal(lit) => literal(lit, iriref),
    }
}

/// `<iri>`, with characters that are illegal in an `IRIREF` percent-encoded.
pub(crate) fn iriref(iri: &str) -> String {
    format!("<{}>", encode_iri(iri))
}

/// Writes a literal, rendering its datatype with `datatype`.
pub(crate) fn literal(lit: &Literal, datatype: impl Fn(&str) -> String) -> String {
    let quoted = format!("\"{}\"", escape(&lit.lexical));
    match (&lit.language, &lit.datatype) {
        (Some(lang), _) => format!("{quoted}@{lang}"),
        (None, Some(dt)) => format!("{quoted}^^{}", datatype(dt.as_str())),
        (None, None) => quoted,
    }
}

pub(crate) fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}
