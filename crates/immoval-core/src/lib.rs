//! Core of the valuation client: vocabulary, input normalisation, outcome interpretation.
//!
//! Nothing here performs I/O. Transport lives in `immoval-client`, the postcode
//! table in `immoval-geo`.

mod error;
pub mod interpret;
pub mod normalize;
pub mod outcome;
pub mod property;
pub mod vocabulary;

pub use error::VocabularyError;
pub use interpret::{Summary, format_price, interpret};
pub use normalize::{FieldViolation, Normalization, RequiredField, normalize};
pub use outcome::{ApiOutcome, SchemaViolation};
pub use property::{FeatureFlags, NormalizedPropertyRequest, RawPropertyInput};
pub use vocabulary::{Feature, PropertyType, Vocabulary, subtypes_for, to_display, to_token};
