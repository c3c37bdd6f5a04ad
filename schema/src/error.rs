use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("a class with the fully qualified name of '{0}' already exists in the tree")]
    DuplicateClass(String),
    #[error("type '{0}' has multiple class or interface declarations; the resolver needs a special case for it")]
    AmbiguousDeclaration(String),
    #[error("no validator for type {0}")]
    UnmappedType(String),
    #[error("restriction to be written is missing")]
    MissingRestriction,
    #[error("failed to write the schema document")]
    Xml(#[from] std::io::Error),
}
