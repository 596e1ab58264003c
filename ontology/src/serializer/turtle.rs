//! Turtle 1.1 serializer.
//!
//! Writes `@prefix` lines for the standard vocabularies and every graph
//! binding, then one block per subject with predicates grouped by `;` and
//! repeated objects by `,`.

use super::ntriples;
use super::PrefixMap;
use crate::graph::{Graph, Iri, Term, Triple};
use crate::model::iris::RDF_TYPE;

/// Serializes `graph` to a Turtle string.
#[must_use]
pub fn to_turtle(graph: &Graph) -> String {
    let prefixes = PrefixMap::for_graph(graph);
    let mut out = String::with_capacity(graph.len() * 64 + 1024);

    for (prefix, authority) in prefixes.iter() {
        out.push_str(&format!("@prefix {prefix}: <{authority}> .\n"));
    }
    out.push('\n');

    let triples: Vec<&Triple> = graph.iter().collect();
    for block in triples.chunk_by(|a, b| a.subject == b.subject) {
        write_block(&mut out, &prefixes, block);
    }
    out
}

fn write_block(out: &mut String, prefixes: &PrefixMap, block: &[&Triple]) {
    let Some(first) = block.first() else {
        return;
    };
    out.push_str(&term(prefixes, &first.subject));

    let mut predicates: Vec<&[&Triple]> = block.chunk_by(|a, b| a.predicate == b.predicate).collect();
    predicates.sort_by_key(|group| group[0].predicate.as_str() != RDF_TYPE);
    for (i, group) in predicates.iter().enumerate() {
        let predicate = &group[0].predicate;
        let objects: Vec<String> = group.iter().map(|t| term(prefixes, &t.object)).collect();
        out.push_str("\n    ");
        out.push_str(&predicate_name(prefixes, predicate));
        out.push(' ');
        out.push_str(&objects.join(" , "));
        out.push_str(if i + 1 == predicates.len() { " .\n\n" } else { " ;" });
    }
}

fn predicate_name(prefixes: &PrefixMap, predicate: &Iri) -> String {
    if predicate.as_str() == RDF_TYPE {
        "a".to_owned()
    } else {
        iri(prefixes, predicate.as_str())
    }
}

fn term(prefixes: &PrefixMap, term: &Term) -> String {
    match term {
        Term::Iri(value) => iri(prefixes, value.as_str()),
        Term::Blank(label) => format!("_:{label}"),
        Term::Literal(lit) => ntriples::literal(lit, |dt| iri(prefixes, dt)),
    }
}

fn iri(prefixes: &PrefixMap, value: &str) -> String {
    prefixes.compact(value).unwrap_or_else(|| ntriples::iriref(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Literal;
    use crate::model::iris::{OWL_CLASS, RDFS_LABEL, RDFS_SUBCLASS_OF, SKOS_ALT_LABEL, XSD_FLOAT};

    fn sample() -> Graph {
        let mut graph = Graph::new();
        graph.bind("TestOntology", "http://example.com/ontology#");
        let cell = Iri::new("http://example.com/ontology#Cell");
        let module = Iri::new("http://example.com/ontology#Module");
        graph.add(&cell, RDF_TYPE, Iri::new(OWL_CLASS));
        graph.add(&cell, RDFS_LABEL, Term::literal("Cell"));
        graph.add(&cell, SKOS_ALT_LABEL, Term::literal("PV cell"));
        graph.add(&cell, SKOS_ALT_LABEL, Term::literal("solar cell"));
        graph.add(&cell, RDFS_SUBCLASS_OF, &module);
        graph.add(
            &cell,
            "http://example.com/ontology#ratio.max",
            Term::Literal(Literal {
                lexical: "0.2".into(),
                datatype: Some(Iri::new(XSD_FLOAT)),
                language: None,
            }),
        );
        graph.add(&module, RDF_TYPE, Iri::new(OWL_CLASS));
        graph
    }

    #[test]
    fn declares_standard_and_graph_prefixes() {
        let turtle = to_turtle(&sample());
        assert!(turtle.contains("@prefix owl: <http://www.w3.org/2002/07/owl#> ."));
        assert!(turtle.contains("@prefix TestOntology: <http://example.com/ontology#> ."));
    }

    #[test]
    fn groups_by_subject_and_predicate() {
        let turtle = to_turtle(&sample());
        assert!(turtle.contains("TestOntology:Cell\n    a owl:Class ;"));
        assert!(turtle.contains("skos:altLabel \"PV cell\" , \"solar cell\" ."));
        assert!(turtle.contains("rdfs:subClassOf TestOntology:Module"));
        assert!(turtle.contains("TestOntology:Module\n    a owl:Class .\n"));
    }

    #[test]
    fn unsafe_locals_are_written_absolute() {
        let turtle = to_turtle(&sample());
        assert!(turtle.contains("<http://example.com/ontology#ratio.max> \"0.2\"^^xsd:float"));
    }

    #[test]
    fn output_reparses_to_the_same_triples() {
        let graph = sample();
        let parsed = crate::enrich::parse_turtle("inline.ttl", &to_turtle(&graph)).expect("valid turtle");
        assert_eq!(parsed.iter().collect::<Vec<_>>(), graph.iter().collect::<Vec<_>>());
    }
}
