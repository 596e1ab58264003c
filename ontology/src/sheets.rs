//! Sheet tables: the five CSV files that define one ontology group.
//!
//! A group is a set of files sharing a name prefix, e.g.
//! `PVModule- OntologyInfo.csv`, `PVModule- NameSpace.csv`, ... . Apart from
//! `OntologyInfo`, each table has a header row followed by a guidance row that
//! is never data.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::model::OntologyInfo;

/// The five tables of a sheet group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// Ontology header (name, base, version, authors, description).
    OntologyInfo,
    /// Namespace prefixes.
    Namespace,
    /// Entities (`VariableDefinitions`).
    Variables,
    /// Object properties (`RelationshipDefinitions`).
    Relationships,
    /// Data properties (`ValueTypeDefinitions`).
    ValueTypes,
}

impl Table {
    /// Every table, in load order.
    pub const ALL: [Table; 5] = [
        Table::OntologyInfo,
        Table::Namespace,
        Table::Variables,
        Table::Relationships,
        Table::ValueTypes,
    ];

    /// File-name suffix following the group prefix.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Table::OntologyInfo => "- OntologyInfo.csv",
            Table::Namespace => "- NameSpace.csv",
            Table::Variables => "- VariableDefinitions.csv",
            Table::Relationships => "- RelationshipDefinitions.csv",
            Table::ValueTypes => "- ValueTypeDefinitions.csv",
        }
    }

    /// Path of this table for `group` inside `folder`.
    #[must_use]
    pub fn path(self, folder: &Path, group: &str) -> PathBuf {
        folder.join(format!("{group}{}", self.suffix()))
    }
}

/// Errors raised while reading sheet tables.
#[derive(Debug, Error)]
pub enum SheetError {
    /// A required table file does not exist.
    #[error("sheet group `{group}` is missing its {table:?} table ({})", .path.display())]
    MissingTable {
        /// Group prefix.
        group: String,
        /// Which table.
        table: Table,
        /// Expected location.
        path: PathBuf,
    },

    /// The file could not be opened or read.
    #[error("failed to read {}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid CSV or a row does not fit the table's columns.
    #[error("malformed CSV in {}", .path.display())]
    Csv {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },

    /// The ontology header has fewer than five `label,value` rows.
    #[error("OntologyInfo table {} has {rows} usable rows, expected 5", .path.display())]
    MalformedOntologyInfo {
        /// File that failed.
        path: PathBuf,
        /// Number of rows found.
        rows: usize,
    },

    /// The sheet folder could not be listed.
    #[error("failed to list sheet folder")]
    Walk(#[from] walkdir::Error),
}

/// One row of the namespace table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NamespaceRow {
    /// Short prefix.
    #[serde(rename = "Prefix Name")]
    pub prefix: String,
    /// Base authority.
    #[serde(rename = "Ontology URL")]
    pub url: String,
    /// Reference ontology location used for enrichment; empty if untracked.
    #[serde(rename = "Ontology Info", default)]
    pub info: String,
}

/// One row of the variable-definitions (entity) table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntityRow {
    /// Display name.
    #[serde(rename = "Variable Name", default)]
    pub name: String,
    /// Owning namespace prefix; empty means the ontology itself.
    #[serde(rename = "Belongs to Ontology", default)]
    pub belongs_to: String,
    /// Parent entity `fullName`.
    #[serde(rename = "Parent Variable", default)]
    pub parent: String,
    /// Definition text.
    #[serde(rename = "Definition of Variable", default)]
    pub definition: String,
    /// Comma-separated alternate names.
    #[serde(rename = "Alternative Name(s)", default)]
    pub alt_names: String,
    /// Unit in `namespace:localName` form.
    #[serde(rename = "Unit", default)]
    pub unit: String,
    /// Key other tables refer to.
    #[serde(rename = "fullName", default)]
    pub full_name: String,
}

/// One row of the relationship-definitions (object property) table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RelationshipRow {
    /// Property name.
    #[serde(rename = "Relationship Name", default)]
    pub name: String,
    /// Owning namespace prefix; empty means the ontology itself.
    #[serde(rename = "Belongs to Ontology", default)]
    pub belongs_to: String,
    /// Domain entity `fullName`.
    #[serde(rename = "Domain", default)]
    pub domain: String,
    /// Range entity `fullName`.
    #[serde(rename = "Range", default)]
    pub range: String,
    /// Definition text.
    #[serde(rename = "Definition", default)]
    pub definition: String,
    /// Comma-separated alternate names.
    #[serde(rename = "Alternative Name(s)", default)]
    pub alt_names: String,
    /// Row key.
    #[serde(rename = "fullName", default)]
    pub full_name: String,
}

/// One row of the value-type-definitions (data property) table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ValueTypeRow {
    /// Property name.
    #[serde(rename = "ValueType Name", default)]
    pub name: String,
    /// Owning namespace prefix; empty means the ontology itself.
    #[serde(rename = "Belongs to Ontology", default)]
    pub belongs_to: String,
    /// Domain entity `fullName`.
    #[serde(rename = "Domain", default)]
    pub domain: String,
    /// Literal type name, e.g. `xsd:integer`.
    #[serde(rename = "Range", default)]
    pub range: String,
    /// Definition text from the `Definition of Property` column.
    #[serde(rename = "Definition of Property", default)]
    pub definition: String,
    /// Definition text from a plain `Definition` column, used when
    /// `Definition of Property` is empty or absent.
    #[serde(rename = "Definition", default)]
    pub fallback_definition: String,
    /// Comma-separated alternate names.
    #[serde(rename = "Alternative Name(s)", default)]
    pub alt_names: String,
    /// Row key.
    #[serde(rename = "fullName", default)]
    pub full_name: String,
}

impl ValueTypeRow {
    /// The definition to emit: `Definition of Property`, else `Definition`.
    #[must_use]
    pub fn definition_text(&self) -> &str {
        if self.definition.trim().is_empty() {
            &self.fallback_definition
        } else {
            &self.definition
        }
    }
}

/// All five tables of one sheet group, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTables {
    /// Ontology header.
    pub info: OntologyInfo,
    /// Namespace rows.
    pub namespaces: Vec<NamespaceRow>,
    /// Entity rows.
    pub entities: Vec<EntityRow>,
    /// Object property rows.
    pub relationships: Vec<RelationshipRow>,
    /// Data property rows.
    pub value_types: Vec<ValueTypeRow>,
}

impl SheetTables {
    /// Loads the five tables of `group` from `folder`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError`] if a table is missing, unreadable or malformed.
    pub fn load(folder: &Path, group: &str) -> Result<Self, SheetError> {
        for table in Table::ALL {
            let path = table.path(folder, group);
            if !path.is_file() {
                return Err(SheetError::MissingTable {
                    group: group.to_owned(),
                    table,
                    path,
                });
            }
        }

        let info_path = Table::OntologyInfo.path(folder, group);
        let info = parse_ontology_info(open(&info_path)?, &info_path)?;
        let namespaces = read_table(&Table::Namespace.path(folder, group))?;
        let entities = read_table(&Table::Variables.path(folder, group))?;
        let relationships = read_table(&Table::Relationships.path(folder, group))?;
        let value_types = read_table(&Table::ValueTypes.path(folder, group))?;

        debug!(
            group,
            namespaces = namespaces.len(),
            entities = entities.len(),
            relationships = relationships.len(),
            value_types = value_types.len(),
            "loaded sheet tables"
        );

        Ok(Self {
            info,
            namespaces,
            entities,
            relationships,
            value_types,
        })
    }
}

/// Lists the sheet groups in `folder`, sorted and deduplicated.
///
/// Only regular files directly inside `folder` whose names end with one of
/// the five table suffixes are considered.
///
/// # Errors
///
/// Returns [`SheetError::Walk`] if the folder cannot be listed.
pub fn discover_groups(folder: &Path) -> Result<Vec<String>, SheetError> {
    let mut groups = BTreeSet::new();
    for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if let Some(group) = Table::ALL
            .iter()
            .find_map(|table| name.strip_suffix(table.suffix()))
        {
            groups.insert(group.to_owned());
        }
    }
    Ok(groups.into_iter().collect())
}

/// Parses the header-less `label,value` OntologyInfo table.
///
/// # Errors
///
/// Returns [`SheetError`] on CSV errors or when fewer than five rows exist.
pub fn parse_ontology_info<R: Read>(reader: R, path: &Path) -> Result<OntologyInfo, SheetError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut values = Vec::with_capacity(5);
    for record in csv.records() {
        let record = record.map_err(|source| SheetError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        values.push(record.get(1).unwrap_or_default().to_owned());
    }
    if values.len() < 5 {
        return Err(SheetError::MalformedOntologyInfo {
            path: path.to_path_buf(),
            rows: values.len(),
        });
    }

    let authors = values[3]
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_owned)
        .collect();

    Ok(OntologyInfo {
        name: values[0].clone(),
        base_iri: values[1].clone(),
        version: values[2].clone(),
        authors,
        description: values[4].clone(),
    })
}

/// Parses a headed table, skipping the guidance row after the header.
///
/// # Errors
///
/// Returns [`SheetError::Csv`] if a row cannot be decoded.
pub fn parse_rows<T, R>(reader: R, path: &Path) -> Result<Vec<T>, SheetError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv.deserialize()
        .skip(1)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| SheetError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SheetError> {
    parse_rows(open(path)?, path)
}

fn open(path: &Path) -> Result<File, SheetError> {
    File::open(path).map_err(|source| SheetError::Io {
        path: path.to_path_buf(),
        source,
    })
}
