//! JSON-LD 1.1 serializer.
//!
//! Produces a single document with an `@context` built from the standard
//! vocabularies and the graph's namespace bindings, and an `@graph` array with
//! one node per subject. `rdf:type` is folded into `@type`.

use serde_json::{json, Map, Value};

use super::PrefixMap;
use crate::graph::{Graph, Literal, Term, Triple};
use crate::model::iris::RDF_TYPE;

/// Serializes `graph` to a JSON-LD `Value`.
///
/// The returned value can be pretty-printed with [`serde_json::to_string_pretty`].
#[must_use]
pub fn to_json_ld(graph: &Graph) -> Value {
    let prefixes = PrefixMap::for_graph(graph);
    json!({
        "@context": build_context(&prefixes),
        "@graph": build_graph(graph, &prefixes)
    })
}

fn build_context(prefixes: &PrefixMap) -> Value {
    let mut ctx = Map::new();
    for (prefix, authority) in prefixes.iter() {
        ctx.insert(prefix.to_owned(), json!(authority));
    }
    Value::Object(ctx)
}

fn build_graph(graph: &Graph, prefixes: &PrefixMap) -> Value {
    let triples: Vec<&Triple> = graph.iter().collect();
    let nodes: Vec<Value> = triples
        .chunk_by(|a, b| a.subject == b.subject)
        .map(|block| node_to_json(block, prefixes))
        .collect();
    Value::Array(nodes)
}

fn node_to_json(block: &[&Triple], prefixes: &PrefixMap) -> Value {
    let mut node = Map::new();
    if let Some(first) = block.first() {
        node.insert("@id".to_owned(), json!(first.subject.to_string()));
    }

    for t in block {
        let (key, value) = if t.predicate.as_str() == RDF_TYPE {
            let type_ = match &t.object {
                Term::Iri(iri) => compact(prefixes, iri.as_str()),
                other => other.to_string(),
            };
            ("@type".to_owned(), json!(type_))
        } else {
            (
                compact(prefixes, t.predicate.as_str()),
                object_to_json(&t.object, prefixes),
            )
        };

        // Repeated predicates are promoted to arrays rather than overwritten.
        if let Some(existing) = node.get_mut(&key) {
            let prev = std::mem::replace(existing, Value::Null);
            *existing = match prev {
                Value::Array(mut arr) => {
                    arr.push(value);
                    Value::Array(arr)
                }
                other => json!([other, value]),
            };
        } else {
            node.insert(key, value);
        }
    }
    Value::Object(node)
}

fn object_to_json(term: &Term, prefixes: &PrefixMap) -> Value {
    match term {
        Term::Iri(iri) => json!({ "@id": iri.as_str() }),
        Term::Blank(label) => json!({ "@id": format!("_:{label}") }),
        Term::Literal(lit) => literal_to_json(lit, prefixes),
    }
}

fn literal_to_json(lit: &Literal, prefixes: &PrefixMap) -> Value {
    match (&lit.language, &lit.datatype) {
        (Some(lang), _) => json!({ "@value": lit.lexical, "@language": lang }),
        (None, Some(dt)) => json!({ "@value": lit.lexical, "@type": compact(prefixes, dt.as_str()) }),
        (None, None) => json!(lit.lexical),
    }
}

fn compact(prefixes: &PrefixMap, iri: &str) -> String {
    prefixes.compact(iri).unwrap_or_else(|| iri.to_owned())
}
