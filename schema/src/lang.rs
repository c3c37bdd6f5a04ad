use std::collections::HashSet;

use crate::error::Error;
use crate::naming::{convert, KebabCase, PascalCase};

/// A type as the schema sees it, identified by the fully-qualified name the type checker
/// reports (`"ui/core/view".View`, `number`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Type {
    full_name: Option<String>,
    name: Option<String>,
}

impl Type {
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let name = simple_name(&full_name);
        Self {
            full_name: Some(full_name),
            name: Some(name),
        }
    }

    /// A type whose name could not be determined.
    pub fn unnamed() -> Self {
        Self {
            full_name: None,
            name: None,
        }
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    /// The last dot-separated segment of the full name, after dropping one trailing dot.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

fn simple_name(full_name: &str) -> String {
    if full_name == "." {
        return ".".to_owned();
    }
    let trimmed = full_name.strip_suffix('.').unwrap_or(full_name);
    match trimmed.rfind('.') {
        Some(dot) => trimmed[dot + 1..].to_owned(),
        None => trimmed.to_owned(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub type_: Type,
}

impl Property {
    pub fn new(name: impl Into<String>, type_: Type) -> Self {
        Self {
            name: name.into(),
            type_,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub full_name: String,
    /// Comment text directly preceding the declaration, trimmed.
    pub class_comments: String,
    /// Ancestors, nearest first.
    pub base_class_names: Vec<Type>,
    pub properties: Vec<Property>,
}

impl Class {
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        class_comments: impl Into<String>,
        base_class_names: Vec<Type>,
        properties: Vec<Property>,
    ) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            class_comments: class_comments.into(),
            base_class_names,
            properties,
        }
    }

    /// `ListView` becomes `list-view`.
    pub fn kebab_name(&self) -> String {
        convert::<PascalCase, KebabCase>(&self.name)
    }

    pub fn extends(&self, full_name: &str) -> bool {
        self.base_class_names
            .iter()
            .any(|base| base.full_name() == Some(full_name))
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|property| property.name == name)
    }
}

/// The classes that make it into the schema, in insertion order.
#[derive(Debug, Default)]
pub struct Tree {
    classes: Vec<Class>,
    full_names: HashSet<String>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: Class) -> Result<(), Error> {
        if !self.full_names.insert(class.full_name.clone()) {
            return Err(Error::DuplicateClass(class.full_name));
        }
        self.classes.push(class);
        Ok(())
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }
}
