//! Entity hierarchy builder.
//!
//! Runs in two passes over the variable-definition rows:
//!
//! 1. **Identifier pass** — every row with a `fullName` gets one [`Iri`] and
//!    one pending [`Entity`].
//! 2. **Resolution pass** — each pending entity is emitted together with its
//!    still-pending ancestor chain, topmost ancestor first, so a parent's
//!    `owl:Class` declaration always precedes the child's `rdfs:subClassOf`
//!    edge. An entity leaves the pending set exactly once.
//!
//! Ancestor chains are walked with an explicit path instead of recursion; a
//! parent that is already on the path is a cycle.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::error::BuildError;
use crate::graph::{Graph, Iri, Term};
use crate::model::iris::*;
use crate::model::{Entity, OntologyInfo};
use crate::namespace::NamespaceRegistry;
use crate::sheets::EntityRow;

/// Resolved entities keyed by `fullName`, in first-seen row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTable {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
    order: Vec<String>,
}

impl EntityTable {
    /// Looks up an entity by `fullName`.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&Entity> {
        self.index.get(full_name).map(|&i| &self.entities[i])
    }

    /// Identifier of the entity named `full_name`.
    #[must_use]
    pub fn iri(&self, full_name: &str) -> Option<&Iri> {
        self.get(full_name).map(|e| &e.iri)
    }

    /// Returns true if `full_name` is a known entity.
    #[must_use]
    pub fn contains(&self, full_name: &str) -> bool {
        self.index.contains_key(full_name)
    }

    /// Iterates over the entities in first-seen row order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// `fullName`s in the order the resolution pass emitted them.
    #[must_use]
    pub fn resolution_order(&self) -> &[String] {
        &self.order
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn upsert(&mut self, entity: Entity) {
        match self.index.get(&entity.full_name) {
            Some(&i) => {
                debug!(entity = %entity.full_name, "repeated entity row replaces earlier metadata");
                self.entities[i] = entity;
            }
            None => {
                self.index.insert(entity.full_name.clone(), self.entities.len());
                self.entities.push(entity);
            }
        }
    }
}

/// Builds `owl:Class` declarations and the subclass forest.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyBuilder<'a> {
    registry: &'a NamespaceRegistry,
    info: &'a OntologyInfo,
}

impl<'a> HierarchyBuilder<'a> {
    /// Creates a builder resolving identifiers through `registry`.
    #[must_use]
    pub fn new(registry: &'a NamespaceRegistry, info: &'a OntologyInfo) -> Self {
        Self { registry, info }
    }

    /// Runs both passes over `rows`, adding the class triples to `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownNamespace`] for an unregistered owning or
    /// unit namespace, [`BuildError::MalformedUnitReference`] for a unit cell
    /// without exactly one `:`, and [`BuildError::CyclicHierarchy`] when
    /// parent references loop.
    pub fn build(&self, rows: &[EntityRow], mut graph: Graph) -> Result<(Graph, EntityTable), BuildError> {
        let mut table = EntityTable::default();
        for row in rows {
            if let Some(entity) = self.identify(row)? {
                table.upsert(entity);
            }
        }

        let mut pending: HashSet<&str> = table.entities.iter().map(|e| e.full_name.as_str()).collect();
        let mut order = Vec::with_capacity(table.len());

        for entity in &table.entities {
            if !pending.contains(entity.full_name.as_str()) {
                continue;
            }
            for name in self.pending_chain(entity, &table, &pending)?.into_iter().rev() {
                if let Some(current) = table.get(name) {
                    self.emit(current, &table, &mut graph)?;
                }
                pending.remove(name);
                order.push(name.to_owned());
            }
        }

        info!(
            ontology = %self.info.name,
            entities = table.len(),
            "resolved class hierarchy"
        );
        table.order = order;
        Ok((graph, table))
    }

    /// Computes the identifier and metadata of one row.
    fn identify(&self, row: &EntityRow) -> Result<Option<Entity>, BuildError> {
        let full_name = row.full_name.trim();
        if full_name.is_empty() {
            return Ok(None);
        }

        let iri = if row.belongs_to.trim().is_empty() {
            Iri::join(&self.info.base_iri, self.local_name(full_name))
        } else {
            let local = full_name.split_once(':').map_or(full_name, |(_, l)| l);
            self.registry.qualify(row.belongs_to.trim(), local)?
        };

        Ok(Some(Entity {
            iri,
            name: row.name.trim().to_owned(),
            parent: non_empty(&row.parent),
            definition: non_empty(&row.definition),
            alt_names: split_names(&row.alt_names),
            unit: non_empty(&row.unit),
            full_name: full_name.to_owned(),
        }))
    }

    /// `entity` followed by each still-pending ancestor, nearest first.
    fn pending_chain<'t>(
        &self,
        entity: &'t Entity,
        table: &'t EntityTable,
        pending: &HashSet<&str>,
    ) -> Result<Vec<&'t str>, BuildError> {
        let mut path = vec![entity.full_name.as_str()];
        let mut cursor = entity;
        while let Some(parent) = cursor.parent.as_deref() {
            if !pending.contains(parent) {
                break;
            }
            let Some(next) = table.get(parent) else {
                break;
            };
            if let Some(start) = path.iter().position(|&n| n == parent) {
                let mut chain: Vec<String> = path[start..].iter().map(|&n| n.to_owned()).collect();
                chain.push(parent.to_owned());
                return Err(BuildError::CyclicHierarchy { chain });
            }
            path.push(next.full_name.as_str());
            cursor = next;
        }
        Ok(path)
    }

    fn emit(&self, entity: &Entity, table: &EntityTable, graph: &mut Graph) -> Result<(), BuildError> {
        let unit = entity
            .unit
            .as_deref()
            .map(|unit| self.unit_iri(entity, unit))
            .transpose()?;
        let parent = entity
            .parent
            .as_deref()
            .map(|p| table.iri(p).cloned().map_or_else(|| self.term_iri(p), Ok))
            .transpose()?;

        let subject = &entity.iri;
        graph.add(subject, RDF_TYPE, Iri::from(OWL_CLASS));
        graph.add(subject, RDFS_LABEL, Term::literal(&entity.name));
        if let Some(unit) = unit {
            graph.add(subject, PMD_UNIT, unit);
        }
        if entity.alt_names.is_empty() {
            graph.add(subject, SKOS_ALT_LABEL, Term::literal(""));
        }
        for alt in &entity.alt_names {
            graph.add(subject, SKOS_ALT_LABEL, Term::literal(alt));
        }
        if let Some(definition) = &entity.definition {
            graph.add(subject, SKOS_DEFINITION, Term::literal(definition));
        }
        if let Some(parent) = parent {
            graph.add(subject, RDFS_SUBCLASS_OF, parent);
        }

        debug!(entity = %entity.full_name, iri = %entity.iri, "declared class");
        Ok(())
    }

    fn unit_iri(&self, entity: &Entity, unit: &str) -> Result<Iri, BuildError> {
        let malformed = || BuildError::MalformedUnitReference {
            entity: entity.full_name.clone(),
            unit: unit.to_owned(),
        };
        let (namespace, local) = unit.split_once(':').ok_or_else(malformed)?;
        if namespace.is_empty() || local.is_empty() || local.contains(':') {
            return Err(malformed());
        }
        Ok(self.registry.qualify(namespace, local)?)
    }

    /// Identifier for a parent that is not in the entity table.
    fn term_iri(&self, name: &str) -> Result<Iri, BuildError> {
        if let Some((prefix, local)) = name.split_once(':') {
            if self.registry.contains(prefix) {
                return Ok(self.registry.qualify(prefix, local)?);
            }
        }
        Ok(Iri::join(&self.info.base_iri, self.local_name(name)))
    }

    /// Strips a `prefix:` qualifier naming this ontology.
    fn local_name<'n>(&self, full_name: &'n str) -> &'n str {
        match full_name.split_once(':') {
            Some((prefix, local)) if prefix.eq_ignore_ascii_case(&self.info.name) => local,
            _ => full_name,
        }
    }
}

/// Splits a comma-separated cell into trimmed, non-empty names.
pub(crate) fn split_names(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
        .collect()
}

pub(crate) fn non_empty(cell: &str) -> Option<String> {
    let cell = cell.trim();
    (!cell.is_empty()).then(|| cell.to_owned())
}
