use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use tns_typings::{Declaration, DeclarationKind, HeritageToken, MemberKind, Program};
use tracing::{debug, trace};

use crate::error::Error;
use crate::filters::{apply_filters, ClassFilter};
use crate::known;
use crate::lang::{Class, Property, Tree, Type};
use crate::resolver::TypeResolver;

const IGNORED_PROPERTY_NAMES: [&str; 6] = [
    "parent",
    "ios",
    "android",
    "isLayoutValid",
    "visualState",
    "isLoaded",
];

const IGNORED_PROPERTY_TYPES: [&str; 5] = [
    known::DEPENDENCY_PROPERTY,
    known::VIEW,
    "any",
    known::IMAGE_SOURCE,
    known::FRAME,
];

lazy_static! {
    static ref EVENT_PROPERTY: Regex = Regex::new("^(.+)Event$").unwrap();
}

/// Applies the property policy: drops platform handles, internals and types that cannot be
/// expressed as attributes, and turns `tapEvent` into `tap`.
pub fn adjust_property(property: Property) -> Option<Property> {
    if IGNORED_PROPERTY_NAMES.contains(&property.name.as_str()) || property.name.starts_with('_')
    {
        return None;
    }
    if let Some(captures) = EVENT_PROPERTY.captures(&property.name) {
        return Some(Property::new(&captures[1], property.type_));
    }
    match property.type_.full_name() {
        Some(full_name) if IGNORED_PROPERTY_TYPES.contains(&full_name) => None,
        _ => Some(property),
    }
}

/// Builds the class model out of a bound [`Program`].
pub struct ClassExtractor<'a> {
    program: &'a Program,
    resolver: TypeResolver<'a>,
    output_files: Option<HashSet<String>>,
}

impl<'a> ClassExtractor<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            resolver: TypeResolver::new(program),
            output_files: None,
        }
    }

    /// Restricts the extracted classes to those declared in `files`. Declarations in other
    /// files still serve as base classes and property types.
    pub fn with_output_files(mut self, files: impl IntoIterator<Item = String>) -> Self {
        self.output_files = Some(files.into_iter().collect());
        self
    }

    pub fn extract_classes(&self) -> Result<Vec<Class>, Error> {
        let mut classes = Vec::new();
        for declaration in self.program.declarations() {
            if declaration.kind() != DeclarationKind::Class || !self.is_output(declaration) {
                continue;
            }
            let class = self.extract_class(declaration)?;
            debug!(
                class = %class.full_name,
                bases = class.base_class_names.len(),
                properties = class.properties.len(),
                "extracted class"
            );
            classes.push(class);
        }
        Ok(classes)
    }

    pub fn build_tree(&self, filters: &[Box<dyn ClassFilter>]) -> Result<Tree, Error> {
        let mut tree = Tree::new();
        for class in apply_filters(self.extract_classes()?, filters) {
            tree.add_class(class)?;
        }
        Ok(tree)
    }

    fn is_output(&self, declaration: &Declaration) -> bool {
        match &self.output_files {
            Some(files) => files.contains(self.program.file_path(declaration.file)),
            None => true,
        }
    }

    fn extract_class(&self, declaration: &Declaration) -> Result<Class, Error> {
        let comments = self
            .program
            .source_text(declaration.file, declaration.node.leading_trivia)
            .trim();
        Ok(Class::new(
            declaration.name(),
            self.resolver.full_name_of(declaration),
            comments,
            self.base_class_names(declaration)?,
            self.properties(declaration)?,
        ))
    }

    fn base_class_names(&self, declaration: &Declaration) -> Result<Vec<Type>, Error> {
        let mut bases = Vec::new();
        let mut visited = HashSet::from([declaration.id]);
        let mut current = declaration;
        while let Some(base) = self.base_class(current)? {
            if !visited.insert(base.id) {
                debug!(class = declaration.name(), "inheritance cycle");
                break;
            }
            bases.push(Type::new(self.resolver.full_name_of(base)));
            current = base;
        }
        Ok(bases)
    }

    /// Only the first heritage clause counts, and only when it is an `extends` clause.
    fn base_class(&self, declaration: &Declaration) -> Result<Option<&'a Declaration>, Error> {
        match declaration.node.heritage_clauses.first() {
            Some(clause) if clause.token == HeritageToken::Extends => match clause.types.first() {
                Some(node) => self.resolver.resolve_declaration(declaration, node),
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn properties(&self, declaration: &Declaration) -> Result<Vec<Property>, Error> {
        let mut properties = Vec::new();
        for member in &declaration.node.members {
            if member.kind != MemberKind::Property || member.modifiers.is_static {
                continue;
            }
            let Some(name) = &member.name else {
                continue;
            };
            let type_ = match &member.type_annotation {
                Some(node) => self.resolver.resolve_type(declaration, node)?,
                None => Type::new("any"),
            };
            match adjust_property(Property::new(name.clone(), type_)) {
                Some(property) => properties.push(property),
                None => trace!(class = declaration.name(), property = %name, "dropped property"),
            }
        }
        Ok(properties)
    }
}
