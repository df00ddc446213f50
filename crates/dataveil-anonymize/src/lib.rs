//! Anonymization engine.
//!
//! Given a loaded configuration, a live database and a value generator, an
//! [`Anonymizer`] deletes, updates or inserts rows of one entity at a time.

pub mod actions;
pub mod cast;
pub mod engine;
pub mod resolver;
pub mod row;
pub mod statement;

pub use actions::{Action, ActionSet};
pub use engine::Anonymizer;
pub use resolver::resolve;
pub use row::{GeneratedRow, check_columns, generate_row};
