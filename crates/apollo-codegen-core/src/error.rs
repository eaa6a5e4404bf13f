//! Errors that abort a normalization run

use std::fmt;

/// Error returned by the normalizer.
///
/// Any error is fatal to the current run: no partial intermediate representation
/// is ever returned alongside it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// A type reference names a type that is not declared in the schema.
    ///
    /// Validated schemas never produce this.
    #[error("type `{name}` does not resolve to exactly one declared type")]
    AmbiguousType { name: String },

    #[error("invalid selection of field `{parent_type}.{field}` of type `{field_type}`: {reason}")]
    InvalidSelection {
        parent_type: String,
        field: String,
        field_type: String,
        reason: InvalidSelectionReason,
    },

    /// A fragment spread names a fragment that the aggregated document does not define.
    #[error("fragment `{name}` is spread but never defined")]
    UnresolvedFragment { name: String },
}

/// Why a field selection does not match the leaf-ness of its type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidSelectionReason {
    /// Scalar and enum fields must not have a sub-selection
    SubselectionOnLeaf,
    /// Object, interface and union fields must have a sub-selection
    MissingSubselection,
}

impl fmt::Display for InvalidSelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubselectionOnLeaf => f.write_str("leaf types must not have a selection set"),
            Self::MissingSubselection => {
                f.write_str("composite types must have a non-empty selection set")
            }
        }
    }
}
