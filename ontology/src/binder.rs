//! Relationship binder: object and data properties.
//!
//! Each relationship row is bound to the entity table built by
//! [`HierarchyBuilder`](crate::HierarchyBuilder). The first row that produces
//! a given property identifier declares it (type, label, definition,
//! alternate names); later rows with the same identifier only add
//! `rdfs:domain` / `rdfs:range` bindings. Every identifier, domain and range
//! of a row is resolved before any of its triples is added.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::BuildError;
use crate::graph::{Graph, Iri, Term};
use crate::hierarchy::{non_empty, split_names, EntityTable};
use crate::model::iris::*;
use crate::model::{OntologyInfo, PropertyKind, RelationshipDefinition, RelationshipIndex};
use crate::namespace::NamespaceRegistry;
use crate::sheets::{RelationshipRow, ValueTypeRow};

/// Literal type names accepted in the value-type `Range` column.
pub const LITERAL_TYPES: &[(&str, &str)] = &[
    ("xsd:integer", XSD_INTEGER),
    ("xsd:string", XSD_STRING),
    ("xsd:date", XSD_DATE),
    ("xsd:dateTime", XSD_DATETIME),
    ("xsd:float", XSD_FLOAT),
    ("xsd:boolean", XSD_BOOLEAN),
];

/// Looks up the datatype IRI for a literal type name such as `xsd:integer`.
#[must_use]
pub fn literal_type(name: &str) -> Option<&'static str> {
    let name = name.trim();
    LITERAL_TYPES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, iri)| *iri)
}

/// Everything the binder produced besides triples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    /// Declared properties, in first-seen order.
    pub definitions: Vec<RelationshipDefinition>,
    /// Outgoing object-property edges per domain entity.
    pub index: RelationshipIndex,
}

impl Bindings {
    /// Looks up a declared property by identifier.
    #[must_use]
    pub fn definition(&self, iri: &Iri) -> Option<&RelationshipDefinition> {
        self.definitions.iter().find(|d| &d.iri == iri)
    }
}

/// Column values shared by both relationship tables.
struct PropertyRow<'r> {
    kind: PropertyKind,
    name: &'r str,
    belongs_to: &'r str,
    domain: &'r str,
    range: &'r str,
    definition: &'r str,
    alt_names: &'r str,
}

/// Binds relationship rows to entity identifiers.
#[derive(Debug)]
pub struct RelationshipBinder<'a> {
    registry: &'a NamespaceRegistry,
    info: &'a OntologyInfo,
    entities: &'a EntityTable,
    declared: HashMap<Iri, usize>,
    bindings: Bindings,
}

impl<'a> RelationshipBinder<'a> {
    /// Creates a binder over a resolved entity table.
    #[must_use]
    pub fn new(registry: &'a NamespaceRegistry, info: &'a OntologyInfo, entities: &'a EntityTable) -> Self {
        Self {
            registry,
            info,
            entities,
            declared: HashMap::new(),
            bindings: Bindings::default(),
        }
    }

    /// Binds every object property, then every data property.
    ///
    /// # Errors
    ///
    /// Stops at the first row that fails, see [`Self::bind_object_property`]
    /// and [`Self::bind_data_property`].
    pub fn bind(
        mut self,
        relationships: &[RelationshipRow],
        value_types: &[ValueTypeRow],
        mut graph: Graph,
    ) -> Result<(Graph, Bindings), BuildError> {
        let mut bound = 0usize;
        for row in relationships {
            bound += usize::from(self.bind_object_property(row, &mut graph)?);
        }
        for row in value_types {
            bound += usize::from(self.bind_data_property(row, &mut graph)?);
        }
        info!(
            ontology = %self.info.name,
            rows = bound,
            properties = self.bindings.definitions.len(),
            "bound relationships"
        );
        Ok((graph, self.bindings))
    }

    /// Binds one object-property row. Returns `false` if the row was skipped
    /// because its domain or range is empty.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownNamespace`] for an unregistered
    /// `Belongs to Ontology` prefix and [`BuildError::UnknownEntity`] when the
    /// domain or range is not a known entity.
    pub fn bind_object_property(&mut self, row: &RelationshipRow, graph: &mut Graph) -> Result<bool, BuildError> {
        self.bind_row(
            &PropertyRow {
                kind: PropertyKind::Object,
                name: &row.name,
                belongs_to: &row.belongs_to,
                domain: &row.domain,
                range: &row.range,
                definition: &row.definition,
                alt_names: &row.alt_names,
            },
            graph,
        )
    }

    /// Binds one data-property row. Returns `false` if the row was skipped
    /// because its domain or range is empty.
    ///
    /// # Errors
    ///
    /// As [`Self::bind_object_property`], plus
    /// [`BuildError::UnknownLiteralType`] when the range is not in
    /// [`LITERAL_TYPES`].
    pub fn bind_data_property(&mut self, row: &ValueTypeRow, graph: &mut Graph) -> Result<bool, BuildError> {
        self.bind_row(
            &PropertyRow {
                kind: PropertyKind::Datatype,
                name: &row.name,
                belongs_to: &row.belongs_to,
                domain: &row.domain,
                range: &row.range,
                definition: row.definition_text(),
                alt_names: &row.alt_names,
            },
            graph,
        )
    }

    /// Consumes the binder, returning the declared properties and the index.
    #[must_use]
    pub fn finish(self) -> Bindings {
        self.bindings
    }

    fn bind_row(&mut self, row: &PropertyRow<'_>, graph: &mut Graph) -> Result<bool, BuildError> {
        let (name, domain, range) = (row.name.trim(), row.domain.trim(), row.range.trim());
        if domain.is_empty() || range.is_empty() {
            debug!(property = name, "skipping relationship without domain or range");
            return Ok(false);
        }

        let iri = match row.belongs_to.trim() {
            "" => Iri::join(&self.info.base_iri, name),
            prefix => self.registry.qualify(prefix, name)?,
        };
        let domain_iri = self.entity_iri(name, domain)?;
        let range_term: Term = match row.kind {
            PropertyKind::Object => self.entity_iri(name, range)?.into(),
            PropertyKind::Datatype => literal_type(range)
                .map(|dt| Term::Iri(Iri::from(dt)))
                .ok_or_else(|| BuildError::UnknownLiteralType {
                    property: name.to_owned(),
                    range: range.to_owned(),
                })?,
        };

        match self.declared.get(&iri) {
            Some(&i) => {
                let definition = &mut self.bindings.definitions[i];
                push_unique(&mut definition.domains, domain);
                push_unique(&mut definition.ranges, range);
            }
            None => {
                let definition = RelationshipDefinition {
                    iri: iri.clone(),
                    name: name.to_owned(),
                    kind: row.kind,
                    domains: vec![domain.to_owned()],
                    ranges: vec![range.to_owned()],
                    definition: non_empty(row.definition),
                    alt_names: split_names(row.alt_names),
                    namespace: non_empty(row.belongs_to),
                };
                declare(&definition, graph);
                self.declared.insert(iri.clone(), self.bindings.definitions.len());
                self.bindings.definitions.push(definition);
            }
        }

        graph.add(&iri, RDFS_DOMAIN, domain_iri);
        graph.add(&iri, RDFS_RANGE, range_term);
        if row.kind == PropertyKind::Object {
            self.bindings.index.record(domain, range, &iri);
        }

        debug!(property = %iri, domain, range, "bound relationship");
        Ok(true)
    }

    fn entity_iri(&self, property: &str, full_name: &str) -> Result<Iri, BuildError> {
        self.entities
            .iri(full_name)
            .cloned()
            .ok_or_else(|| BuildError::UnknownEntity {
                property: property.to_owned(),
                entity: full_name.to_owned(),
            })
    }
}

fn declare(definition: &RelationshipDefinition, graph: &mut Graph) {
    let subject = &definition.iri;
    graph.add(subject, RDF_TYPE, Iri::from(definition.kind.owl_type()));
    graph.add(subject, RDFS_LABEL, Term::literal(&definition.name));
    if let Some(text) = &definition.definition {
        graph.add(subject, SKOS_DEFINITION, Term::literal(text));
    }
    for alt in &definition.alt_names {
        graph.add(subject, SKOS_ALT_LABEL, Term::literal(alt));
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_owned());
    }
}
