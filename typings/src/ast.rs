//! Syntax tree for the subset of declaration files the schema extractor cares about.
//!
//! Everything else is parsed as an opaque, balanced region and dropped.

use crate::lexer::Span;

#[derive(Clone, Debug)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
    pub statements: Vec<Statement>,
    /// Whether the file has a top-level `import` or `export`, making it an external module.
    pub is_module: bool,
}

#[derive(Clone, Debug)]
pub enum Statement {
    Import(ImportDeclaration),
    Module(ModuleDeclaration),
    Declaration(TypeDeclaration),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportDeclaration {
    pub module: String,
    pub bindings: Vec<ImportBinding>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import * as local from "m"` and `import local = require("m")`
    Namespace(String),
    /// `import local from "m"`
    Default(String),
    /// `import { imported as local } from "m"`
    Named { imported: String, local: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleName {
    /// `declare module "name"`
    Ambient(String),
    /// `namespace a.b` or `declare module a.b`
    Namespace(Vec<String>),
    /// `declare global`
    Global,
}

#[derive(Clone, Debug)]
pub struct ModuleDeclaration {
    pub name: ModuleName,
    pub body: Vec<Statement>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclarationKind {
    Class,
    Interface,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeritageToken {
    Extends,
    Implements,
}

#[derive(Clone, Debug)]
pub struct HeritageClause {
    pub token: HeritageToken,
    pub types: Vec<TypeNode>,
}

/// A `class` or `interface` declaration.
#[derive(Clone, Debug)]
pub struct TypeDeclaration {
    pub kind: DeclarationKind,
    pub name: String,
    pub type_parameters: Vec<String>,
    pub heritage_clauses: Vec<HeritageClause>,
    pub members: Vec<Member>,
    pub span: Span,
    /// Comments and whitespace ahead of the declaration's first token, modifiers included.
    pub leading_trivia: Span,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub is_static: bool,
    pub is_private: bool,
    pub is_protected: bool,
    pub is_readonly: bool,
    pub is_abstract: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Method,
    GetAccessor,
    SetAccessor,
    Constructor,
    IndexSignature,
    CallSignature,
}

#[derive(Clone, Debug)]
pub struct Member {
    pub kind: MemberKind,
    pub name: Option<String>,
    pub modifiers: Modifiers,
    pub optional: bool,
    /// The declared type, or return type for methods and signatures.
    pub type_annotation: Option<TypeNode>,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Any,
    BigInt,
    Boolean,
    Never,
    Null,
    Number,
    Object,
    String,
    Symbol,
    This,
    Undefined,
    Unknown,
    Void,
}

impl Keyword {
    pub fn from_text(text: &str) -> Option<Self> {
        let keyword = match text {
            "any" => Self::Any,
            "bigint" => Self::BigInt,
            "boolean" => Self::Boolean,
            "never" => Self::Never,
            "null" => Self::Null,
            "number" => Self::Number,
            "object" => Self::Object,
            "string" => Self::String,
            "symbol" => Self::Symbol,
            "this" => Self::This,
            "undefined" => Self::Undefined,
            "unknown" => Self::Unknown,
            "void" => Self::Void,
            _ => return None,
        };
        Some(keyword)
    }
}

#[derive(Clone, Debug)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum TypeKind {
    Keyword(Keyword),
    Reference {
        name: Vec<String>,
        arguments: Vec<TypeNode>,
    },
    Array(Box<TypeNode>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Parenthesized(Box<TypeNode>),
    IndexedAccess(Box<TypeNode>, Box<TypeNode>),
    Conditional,
    Function,
    ObjectLiteral,
    Tuple,
    Literal,
    Query(Vec<String>),
    Operator(Box<TypeNode>),
    Import,
}

impl TypeNode {
    /// The qualified name of a type reference, if this is one.
    pub fn reference_name(&self) -> Option<&[String]> {
        match &self.kind {
            TypeKind::Reference { name, .. } => Some(name),
            _ => None,
        }
    }
}
