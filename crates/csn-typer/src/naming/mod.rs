//! Identifier handling and English noun inflection.

pub mod identifiers;
pub mod inflect;

pub use identifiers::{is_valid_identifier, property_name, quote_string, sanitize_identifier};
pub use inflect::{plural4, singular4, Inflection, PLURAL_SUFFIX};
