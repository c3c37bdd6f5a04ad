//! Builds an XML Schema for UI markup out of the class hierarchy in a set of declaration files.
//!
//! [`extractor::ClassExtractor`] turns a bound [`tns_typings::Program`] into a [`lang::Tree`] of
//! classes; [`writer::SchemaWriter`] writes the tree as XSD, declaring a validator for every
//! property type on the way.

pub mod error;
pub mod extractor;
pub mod filters;
pub mod known;
pub mod lang;
pub mod naming;
pub mod resolver;
pub mod validators;
pub mod writer;
pub mod xml;

pub use error::Error;
pub use extractor::ClassExtractor;
pub use filters::{ActionBarFilter, ClassFilter, ViewExtendersFilter};
pub use lang::{Class, Property, Tree, Type};
pub use validators::ValidatorRegistry;
pub use writer::{SchemaWriter, SCHEMA_ROOT_ATTRIBUTES, SCHEMA_ROOT_NAME};
