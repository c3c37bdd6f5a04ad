// TODO: `export =` and `export { a as b }` re-exports are skipped, so names imported through
// them do not resolve.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod program;

pub use ast::{
    DeclarationKind, HeritageClause, HeritageToken, Keyword, Member, MemberKind, SourceFile,
    TypeDeclaration, TypeKind, TypeNode,
};
pub use error::ParseError;
pub use lexer::Span;
pub use parser::parse_source_file;
pub use program::{Declaration, Program, ScopeId, SourceText, Symbol, TypeChecker};
