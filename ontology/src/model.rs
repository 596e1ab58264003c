//! Core ontology model types.
//!
//! These types describe what the builders produce besides triples: the
//! ontology header, the resolved entity table, the bound relationship
//! definitions and the relationship index consumed by instance population.

use std::collections::BTreeMap;

use crate::graph::Iri;

/// Header of one ontology sheet group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyInfo {
    /// Ontology name, also registered as a namespace prefix.
    pub name: String,
    /// Base authority for every local identifier.
    pub base_iri: String,
    /// Version string.
    pub version: String,
    /// Author names, already split and trimmed.
    pub authors: Vec<String>,
    /// Free-text description.
    pub description: String,
}

impl OntologyInfo {
    /// Identifier of this ontology's root declaration (`<base>Ontology`).
    #[must_use]
    pub fn root_iri(&self) -> Iri {
        Iri::join(&self.base_iri, "Ontology")
    }
}

/// An OWL class parsed from one variable-definition row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Resolved identifier.
    pub iri: Iri,
    /// Display name (`rdfs:label`).
    pub name: String,
    /// `fullName` of the parent entity, if declared.
    pub parent: Option<String>,
    /// `skos:definition`, if given.
    pub definition: Option<String>,
    /// `skos:altLabel` values; empty means the empty marker is emitted.
    pub alt_names: Vec<String>,
    /// Unit reference in `namespace:localName` form, if given.
    pub unit: Option<String>,
    /// The row's `fullName`, the key every other table refers to.
    pub full_name: String,
}

/// Whether a relationship links two entities or an entity and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// `owl:ObjectProperty`.
    Object,
    /// `owl:DatatypeProperty`.
    Datatype,
}

impl PropertyKind {
    /// The OWL class used in the `rdf:type` declaration.
    #[must_use]
    pub fn owl_type(self) -> &'static str {
        match self {
            PropertyKind::Object => iris::OWL_OBJECT_PROPERTY,
            PropertyKind::Datatype => iris::OWL_DATATYPE_PROPERTY,
        }
    }
}

/// A bound object or data property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDefinition {
    /// Resolved identifier.
    pub iri: Iri,
    /// Display name.
    pub name: String,
    /// Object or datatype property.
    pub kind: PropertyKind,
    /// `fullName` of every domain entity, in declaration order.
    pub domains: Vec<String>,
    /// Range entity `fullName`s, or literal type names for data properties.
    pub ranges: Vec<String>,
    /// `skos:definition`, if given.
    pub definition: Option<String>,
    /// `skos:altLabel` values.
    pub alt_names: Vec<String>,
    /// Namespace prefix from `Belongs to Ontology`, if set.
    pub namespace: Option<String>,
}

/// Outgoing relationships per domain entity, in declaration order.
///
/// Keys are domain `fullName`s; values are `(range fullName, relationship)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipIndex {
    edges: BTreeMap<String, Vec<(String, Iri)>>,
}

impl RelationshipIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an edge. An identical edge under the same domain is kept once.
    pub fn record(&mut self, domain: &str, range: &str, relationship: &Iri) {
        let edges = self.edges.entry(domain.to_owned()).or_default();
        if !edges
            .iter()
            .any(|(r, rel)| r == range && rel == relationship)
        {
            edges.push((range.to_owned(), relationship.clone()));
        }
    }

    /// Outgoing edges of `domain`, empty if it has none.
    #[must_use]
    pub fn outgoing(&self, domain: &str) -> &[(String, Iri)] {
        self.edges.get(domain).map_or(&[][..], Vec::as_slice)
    }

    /// Iterates over every domain and its edges.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[(String, Iri)])> {
        self.edges.iter().map(|(d, e)| (d.as_str(), e.as_slice()))
    }

    /// Number of domains with at least one edge.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if no edge has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Standard IRI constants used by the builders, merger and serializers.
pub mod iris {
    /// OWL namespace.
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
    /// RDF namespace.
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// RDFS namespace.
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    /// XSD namespace.
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    /// SKOS namespace.
    pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";
    /// Dublin Core terms namespace.
    pub const DCTERMS: &str = "http://purl.org/dc/terms/";
    /// Platform MaterialDigital core namespace.
    pub const PMD: &str = "https://w3id.org/pmd/co/";

    /// `rdf:type`.
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `rdf:langString`.
    pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
    /// `rdfs:label`.
    pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    /// `rdfs:subClassOf`.
    pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
    /// `rdfs:domain`.
    pub const RDFS_DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
    /// `rdfs:range`.
    pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";
    /// `owl:Ontology`.
    pub const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
    /// `owl:Class`.
    pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
    /// `owl:ObjectProperty`.
    pub const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
    /// `owl:DatatypeProperty`.
    pub const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";
    /// `owl:versionInfo`.
    pub const OWL_VERSION_INFO: &str = "http://www.w3.org/2002/07/owl#versionInfo";
    /// `skos:altLabel`.
    pub const SKOS_ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";
    /// `skos:definition`.
    pub const SKOS_DEFINITION: &str = "http://www.w3.org/2004/02/skos/core#definition";
    /// `dcterms:title`.
    pub const DCTERMS_TITLE: &str = "http://purl.org/dc/terms/title";
    /// `dcterms:creator`.
    pub const DCTERMS_CREATOR: &str = "http://purl.org/dc/terms/creator";
    /// `dcterms:description`.
    pub const DCTERMS_DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    /// `dcterms:hasVersion`.
    pub const DCTERMS_HAS_VERSION: &str = "http://purl.org/dc/terms/hasVersion";
    /// `pmd:unit`.
    pub const PMD_UNIT: &str = "https://w3id.org/pmd/co/unit";

    // XSD datatypes
    /// `xsd:string`.
    pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    /// `xsd:integer`.
    pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    /// `xsd:date`.
    pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
    /// `xsd:dateTime`.
    pub const XSD_DATETIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    /// `xsd:float`.
    pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
    /// `xsd:boolean`.
    pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// Prefixes every serialized document declares, in output order.
    pub const STANDARD_PREFIXES: &[(&str, &str)] = &[
        ("dcterms", DCTERMS),
        ("owl", OWL),
        ("pmd", PMD),
        ("rdf", RDF),
        ("rdfs", RDFS),
        ("skos", SKOS),
        ("xsd", XSD),
    ];
}
