use thiserror::Error;

use crate::vocabulary::{PropertyType, Vocabulary};

/// Inconsistency between a label and the static vocabulary tables.
///
/// Front ends only offer labels drawn from the same tables, so any of these
/// indicates a defect in the caller rather than bad user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    #[error("invalid {vocabulary} token: {value:?}")]
    InvalidVocabularyToken {
        vocabulary: Vocabulary,
        value: String,
    },

    #[error("subtype {subtype:?} is not valid for property type {property_type}")]
    SubtypeMismatch {
        subtype: String,
        property_type: PropertyType,
    },
}
