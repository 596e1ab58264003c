//! Shared plumbing for the `fairsheet-*` binaries: logging setup and
//! artifact output.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fairsheet_ontology::serializer::{dot, jsonld, ntriples, turtle};
use fairsheet_ontology::{DotOptions, Graph, RelationshipIndex};
use serde_json::{json, Map, Value};
use tracing::info;

/// Installs the `fmt` subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Writes `<stem>.ttl`, `<stem>.nt`, `<stem>.jsonld` and `<stem>.dot` into
/// `out`, creating the directory if needed. Returns the written paths.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file cannot be
/// written.
pub fn write_artifacts(graph: &Graph, out: &Path, stem: &str, options: &DotOptions) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory: {}", out.display()))?;

    let json_str = serde_json::to_string_pretty(&jsonld::to_json_ld(graph))
        .context("Failed to serialize ontology to JSON-LD")?;

    let artifacts = [
        ("ttl", turtle::to_turtle(graph)),
        ("nt", ntriples::to_ntriples(graph)),
        ("jsonld", json_str),
        ("dot", dot::to_dot(graph, options)),
    ];

    let mut written = Vec::with_capacity(artifacts.len());
    for (extension, contents) in artifacts {
        let path = out.join(format!("{stem}.{extension}"));
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote artifact");
        written.push(path);
    }
    Ok(written)
}

/// File stem for `title`: ASCII alphanumerics, `-`, `_` and `.` are kept and
/// everything else becomes `_`. Leading dots are dropped so the stem can
/// neither escape the output directory nor hide the file. Falls back to
/// `merged_ontology` when nothing is left.
#[must_use]
pub fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_start_matches('.');
    if stem.is_empty() {
        "merged_ontology".to_owned()
    } else {
        stem.to_owned()
    }
}

/// File stem for a merged ontology written next to the per-group artifacts
/// of `groups`. A title that would reuse a group's stem gets a `-merged`
/// suffix.
#[must_use]
pub fn merged_stem(title: &str, groups: &[String]) -> String {
    let stem = file_stem(title);
    if groups.iter().any(|group| group.eq_ignore_ascii_case(&stem)) {
        format!("{stem}-merged")
    } else {
        stem
    }
}

/// JSON form of a relationship index:
/// `{ domain: [{ "range": .., "relationship": .. }, ..], .. }`.
#[must_use]
pub fn index_to_json(index: &RelationshipIndex) -> Value {
    let mut map = Map::new();
    for (domain, edges) in index.iter() {
        let edges: Vec<Value> = edges
            .iter()
            .map(|(range, relationship)| json!({ "range": range, "relationship": relationship.as_str() }))
            .collect();
        map.insert(domain.to_owned(), Value::Array(edges));
    }
    Value::Object(map)
}

/// Writes [`index_to_json`] to `<out>/<stem>.relationships.json`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_index(index: &RelationshipIndex, out: &Path, stem: &str) -> Result<PathBuf> {
    let path = out.join(format!("{stem}.relationships.json"));
    let json_str = serde_json::to_string_pretty(&index_to_json(index))
        .context("Failed to serialize relationship index")?;
    fs::write(&path, json_str).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairsheet_ontology::{Iri, Term};

    #[test]
    fn writes_all_four_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut graph = Graph::new();
        graph.add(
            &Iri::new("http://x.org/a#Cell"),
            "http://www.w3.org/2000/01/rdf-schema#label",
            Term::literal("Cell"),
        );
        let out = dir.path().join("public");
        let written = write_artifacts(&graph, &out, "pv", &DotOptions::default()).expect("writable");
        assert_eq!(written.len(), 4);
        for path in written {
            assert!(path.is_file(), "missing {}", path.display());
        }
        let nt = fs::read_to_string(out.join("pv.nt")).expect("nt written");
        assert!(nt.contains("\"Cell\""));
    }

    #[test]
    fn stems_stay_inside_the_output_directory() {
        assert_eq!(file_stem("solar"), "solar");
        assert_eq!(file_stem("../etc/passwd"), "_etc_passwd");
        assert_eq!(file_stem("PV modules v1.0"), "PV_modules_v1.0");
        assert_eq!(file_stem("  "), "merged_ontology");
        assert_eq!(file_stem(".."), "merged_ontology");
    }

    #[test]
    fn merged_stem_avoids_group_names() {
        let groups = vec!["PVModule".to_owned(), "Inverter".to_owned()];
        assert_eq!(merged_stem("PVModule", &groups), "PVModule-merged");
        assert_eq!(merged_stem("inverter", &groups), "inverter-merged");
        assert_eq!(merged_stem("solar", &groups), "solar");
    }

    #[test]
    fn index_json_keeps_declaration_order() {
        let mut index = RelationshipIndex::new();
        index.record("Module", "Cell", &Iri::new("http://x.org/a#hasCell"));
        index.record("Module", "Frame", &Iri::new("http://x.org/a#hasFrame"));
        let value = index_to_json(&index);
        assert_eq!(value["Module"][0]["range"], json!("Cell"));
        assert_eq!(value["Module"][1]["relationship"], json!("http://x.org/a#hasFrame"));
    }
}
