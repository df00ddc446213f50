//! Fake value generation for anonymized columns.
//!
//! Generators are addressed by method name and receive positional JSON
//! parameters taken verbatim from the configuration file.

pub mod errors;
pub mod faker;
pub mod generator;

pub use errors::GenerationError;
pub use faker::{FakerGenerator, LocaleKey, SUPPORTED_METHODS, canonical_method};
pub use generator::ValueGenerator;
