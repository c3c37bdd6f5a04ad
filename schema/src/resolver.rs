use tns_typings::{Declaration, Keyword, Program, TypeChecker, TypeKind, TypeNode};

use crate::error::Error;
use crate::lang::Type;

/// Maps declared type nodes to schema [`Type`]s through the type checker.
#[derive(Copy, Clone)]
pub struct TypeResolver<'a> {
    program: &'a Program,
    checker: TypeChecker<'a>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            checker: program.type_checker(),
        }
    }

    pub fn full_name_of(&self, declaration: &Declaration) -> &'a str {
        self.checker
            .fully_qualified_name(self.checker.symbol_of(declaration))
    }

    /// The class or interface declaration `node` refers to, as seen from `owner`.
    ///
    /// A symbol with several declarations is only accepted when the first one is the built-in
    /// `Date`, in which case the second one wins.
    pub fn resolve_declaration(
        &self,
        owner: &Declaration,
        node: &TypeNode,
    ) -> Result<Option<&'a Declaration>, Error> {
        let Some(symbol) = self.checker.resolve_symbol(owner.scope, node) else {
            return Ok(None);
        };
        let declarations: Vec<&'a Declaration> = self.checker.declarations(symbol).collect();
        match declarations.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(*single)),
            [first, second, ..] if first.name() == "Date" => Ok(Some(*second)),
            _ => Err(Error::AmbiguousDeclaration(
                self.checker.fully_qualified_name(symbol).to_owned(),
            )),
        }
    }

    /// Resolves the declared type of a member of `owner`.
    pub fn resolve_type(&self, owner: &Declaration, node: &TypeNode) -> Result<Type, Error> {
        if let Some(declaration) = self.resolve_declaration(owner, node)? {
            return Ok(Type::new(self.full_name_of(declaration)));
        }
        match &node.kind {
            TypeKind::Keyword(Keyword::String) => Ok(Type::new("string")),
            TypeKind::Keyword(Keyword::Number) => Ok(Type::new("number")),
            TypeKind::Keyword(Keyword::Boolean) => Ok(Type::new("boolean")),
            TypeKind::Reference { name, .. } if name.len() > 1 => {
                Ok(Type::new(name[..name.len() - 1].join(".")))
            }
            _ => Ok(Type::new(
                self.program.source_text(owner.file, node.span).trim(),
            )),
        }
    }
}
