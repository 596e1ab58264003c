//! Graphviz DOT rendering of the class hierarchy.
//!
//! Classes become boxes, `rdfs:subClassOf` edges point from child to parent,
//! and object properties are drawn from every domain to every range. Node ids
//! come from [`render_token`], never from the identifiers directly.

use std::collections::BTreeSet;

use crate::graph::{Graph, Iri, Term};
use crate::model::iris::*;
use crate::render::{display_name, render_token};

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DotOptions {
    /// Also draw data properties as edges to their literal types.
    pub include_value_types: bool,
}

/// Renders `graph` as a DOT digraph.
#[must_use]
pub fn to_dot(graph: &Graph, options: &DotOptions) -> String {
    let mut out = String::from("digraph ontology {\n    rankdir=BT;\n    node [shape=box];\n");

    let classes = typed(graph, OWL_CLASS);
    for &class in &classes {
        node(&mut out, graph, class, "box");
    }

    // Parents outside the graph still get a node.
    let mut external = BTreeSet::new();
    for &class in &classes {
        for parent in iris(graph.objects(class, RDFS_SUBCLASS_OF)) {
            if !classes.contains(&parent) {
                external.insert(parent);
            }
        }
    }
    for parent in external {
        node(&mut out, graph, parent, "ellipse");
    }

    for &class in &classes {
        for parent in iris(graph.objects(class, RDFS_SUBCLASS_OF)) {
            edge(&mut out, class, parent, "subClassOf", "empty");
        }
    }

    for property in typed(graph, OWL_OBJECT_PROPERTY) {
        let label = label(graph, property);
        for domain in iris(graph.objects(property, RDFS_DOMAIN)) {
            for range in iris(graph.objects(property, RDFS_RANGE)) {
                edge(&mut out, domain, range, &label, "normal");
            }
        }
    }

    if options.include_value_types {
        let mut literal_types = BTreeSet::new();
        let mut edges = Vec::new();
        for property in typed(graph, OWL_DATATYPE_PROPERTY) {
            let label = label(graph, property);
            for domain in iris(graph.objects(property, RDFS_DOMAIN)) {
                for range in iris(graph.objects(property, RDFS_RANGE)) {
                    literal_types.insert(range);
                    edges.push((domain, range, label.clone()));
                }
            }
        }
        for literal_type in literal_types {
            out.push_str(&format!(
                "    \"{}\" [label=\"{}\", shape=plaintext];\n",
                render_token(literal_type),
                escape(display_name(literal_type))
            ));
        }
        for (domain, range, label) in edges {
            edge(&mut out, domain, range, &label, "odot");
        }
    }

    out.push_str("}\n");
    out
}

fn typed<'g>(graph: &'g Graph, class: &str) -> Vec<&'g Iri> {
    graph.subjects_with(RDF_TYPE, &Term::Iri(Iri::from(class)))
}

fn iris<'g>(terms: impl Iterator<Item = &'g Term>) -> impl Iterator<Item = &'g Iri> {
    terms.filter_map(Term::as_iri)
}

fn label(graph: &Graph, iri: &Iri) -> String {
    graph
        .objects(iri, RDFS_LABEL)
        .find_map(Term::as_literal)
        .unwrap_or_else(|| display_name(iri))
        .to_owned()
}

fn node(out: &mut String, graph: &Graph, iri: &Iri, shape: &str) {
    out.push_str(&format!(
        "    \"{}\" [label=\"{}\", shape={shape}];\n",
        render_token(iri),
        escape(&label(graph, iri))
    ));
}

fn edge(out: &mut String, from: &Iri, to: &Iri, label: &str, arrowhead: &str) {
    out.push_str(&format!(
        "    \"{}\" -> \"{}\" [label=\"{}\", arrowhead={arrowhead}];\n",
        render_token(from),
        render_token(to),
        escape(label)
    ));
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
