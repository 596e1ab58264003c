//! Error types shared by the builders.
//!
//! Every variant here aborts the build of the current sheet group. The two
//! recoverable conditions (an unloadable reference ontology and an identifier
//! collision during merge) are diagnostics, see [`crate::enrich`] and
//! [`crate::merge`].

use thiserror::Error;

/// A prefix lookup against the [`NamespaceRegistry`](crate::NamespaceRegistry) failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown namespace prefix `{prefix}`")]
pub struct NamespaceError {
    /// The prefix as it was looked up (before normalization).
    pub prefix: String,
}

/// Fatal errors raised while building one ontology graph.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A row referenced a namespace prefix that was never registered.
    #[error(transparent)]
    UnknownNamespace(#[from] NamespaceError),

    /// A unit cell was not of the form `namespace:localName`.
    #[error("unit reference `{unit}` of entity `{entity}` is not of the form `namespace:localName`")]
    MalformedUnitReference {
        /// Entity `fullName`.
        entity: String,
        /// Offending cell value.
        unit: String,
    },

    /// A data property range is not in the literal-type table.
    #[error("value type `{property}` has unknown literal range `{range}`")]
    UnknownLiteralType {
        /// Property name.
        property: String,
        /// Offending range cell.
        range: String,
    },

    /// A relationship domain or range does not name a known entity.
    #[error("relationship `{property}` refers to unknown entity `{entity}`")]
    UnknownEntity {
        /// Property name.
        property: String,
        /// The missing entity `fullName`.
        entity: String,
    },

    /// Parent references form a cycle.
    #[error("cyclic class hierarchy: {}", .chain.join(" -> "))]
    CyclicHierarchy {
        /// Entity `fullName`s along the cycle, starting and ending at the same entity.
        chain: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_chain() {
        let err = BuildError::CyclicHierarchy {
            chain: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "cyclic class hierarchy: A -> B -> A");
    }

    #[test]
    fn namespace_error_converts() {
        let err: BuildError = NamespaceError {
            prefix: "pmdco".into(),
        }
        .into();
        assert!(matches!(err, BuildError::UnknownNamespace(_)));
        assert_eq!(err.to_string(), "unknown namespace prefix `pmdco`");
    }
}
