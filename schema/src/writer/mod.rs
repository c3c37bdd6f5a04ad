//! Schema emission: turns a class [`Tree`] and the validators it needs into an XSD document.

mod class;
mod common;
mod special_case;
mod validator;

use tracing::debug;

pub use class::{attribute_group_name, ClassWriter};
pub use common::{EmitContext, LAYOUT_COMPONENTS, UI_COMPONENTS};
pub use special_case::{ItemKind, SpecialCase, SpecialCaseWriter};
pub use validator::{RestrictionWriter, ValidatorWriter};

use crate::error::Error;
use crate::known;
use crate::lang::{Class, Tree};
use crate::validators::ValidatorRegistry;
use crate::xml::XmlWriter;

pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
pub const TNS_NAMESPACE: &str = "http://www.nativescript.org/tns.xsd";

pub const SCHEMA_ROOT_NAME: &str = "xs:schema";

pub const SCHEMA_ROOT_ATTRIBUTES: [(&str, &str); 6] = [
    ("id", "tns"),
    ("xmlns:xs", XS_NAMESPACE),
    ("targetNamespace", TNS_NAMESPACE),
    ("xmlns", TNS_NAMESPACE),
    ("elementFormDefault", "qualified"),
    ("attributeFormDefault", "unqualified"),
];

/// Abstract bases that never appear as markup elements.
const EXCLUDED_COMPONENTS: [&str; 6] = [
    "View",
    "CustomLayoutView",
    "EditableTextBase",
    "LayoutBase",
    "Layout",
    "TextBase",
];

pub struct SchemaWriter {
    version: Option<String>,
}

impl SchemaWriter {
    pub fn new(version: Option<String>) -> Self {
        Self { version }
    }

    /// Writes the whole document. Validators are collected into `registry` while the classes
    /// are written and declared after them.
    pub fn write(
        &self,
        root_name: &str,
        tree: &Tree,
        root_attributes: &[(&str, &str)],
        registry: &mut ValidatorRegistry,
    ) -> Result<String, Error> {
        let mut writer = XmlWriter::new();
        writer.start_document()?;
        writer.start_element(root_name)?;
        for (name, value) in root_attributes {
            writer.write_attribute(name, value)?;
        }
        if let Some(version) = &self.version {
            writer.write_comment(&format!(" UI markup schema for version {version} "))?;
        }

        let mut context = EmitContext::new(registry, tree);
        for class in tree.classes() {
            ClassWriter::new(class).write(&mut writer, &mut context)?;
        }
        for validator in registry.registered_validators() {
            ValidatorWriter::new(validator).write(&mut writer)?;
        }

        let ui_components = ui_component_classes(tree.classes());
        let layout_components = layout_component_classes(tree.classes());
        debug!(
            classes = tree.classes().len(),
            validators = registry.registered_validators().len(),
            ui_components = ui_components.len(),
            layout_components = layout_components.len(),
            "writing schema"
        );
        write_component_group(&mut writer, UI_COMPONENTS, &ui_components)?;
        write_component_group(&mut writer, LAYOUT_COMPONENTS, &layout_components)?;

        writer.end_document()?;
        Ok(writer.to_string())
    }
}

/// Classes usable as markup elements.
pub fn ui_component_classes(classes: &[Class]) -> Vec<&Class> {
    classes
        .iter()
        .filter(|class| !EXCLUDED_COMPONENTS.contains(&class.name.as_str()))
        .collect()
}

/// Markup elements that are layouts.
pub fn layout_component_classes(classes: &[Class]) -> Vec<&Class> {
    ui_component_classes(classes)
        .into_iter()
        .filter(|class| class.extends(known::LAYOUT) || class.extends(known::LAYOUT_BASE))
        .collect()
}

fn write_component_group(
    writer: &mut XmlWriter,
    name: &str,
    classes: &[&Class],
) -> Result<(), Error> {
    writer.start_element("xs:group")?;
    writer.write_attribute("name", name)?;
    writer.start_element("xs:choice")?;
    for class in classes {
        class::write_element(writer, &class.name, &class.name)?;
        let kebab_name = class.kebab_name();
        if kebab_name != class.name {
            class::write_element(writer, &kebab_name, &class.name)?;
        }
    }
    writer.end_element()?;
    writer.end_element()?;
    Ok(())
}

/// A writer inside an `xs:schema` element, so fragments parse with the `xs` prefix bound.
#[cfg(test)]
pub(crate) fn fragment_writer() -> XmlWriter {
    let mut writer = XmlWriter::new();
    writer.start_element(SCHEMA_ROOT_NAME).unwrap();
    writer.write_attribute("xmlns:xs", XS_NAMESPACE).unwrap();
    writer
}

#[cfg(test)]
mod tests {
    use roxmltree::Document;

    use super::*;
    use crate::lang::{Property, Type};

    fn class(name: &str, full_name: &str, bases: &[&str], properties: &[(&str, &str)]) -> Class {
        Class::new(
            name,
            full_name,
            "",
            bases.iter().map(|b| Type::new(*b)).collect(),
            properties
                .iter()
                .map(|(n, t)| Property::new(*n, Type::new(*t)))
                .collect(),
        )
    }

    fn write(tree: &Tree, version: Option<&str>) -> String {
        let mut registry = ValidatorRegistry::new();
        SchemaWriter::new(version.map(str::to_owned))
            .write(SCHEMA_ROOT_NAME, tree, &SCHEMA_ROOT_ATTRIBUTES, &mut registry)
            .unwrap()
    }

    #[test]
    fn excludes_abstract_bases_from_components() {
        let classes: Vec<Class> = [
            "GoodClass",
            "View",
            "CustomLayoutView",
            "EditableTextBase",
            "LayoutBase",
            "Layout",
            "TextBase",
        ]
        .iter()
        .map(|name| class(name, &format!("FullName{name}"), &[], &[]))
        .collect();

        let components = ui_component_classes(&classes);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, "GoodClass");
    }

    #[test]
    fn layout_components() {
        let classes = vec![
            class("LayoutBase", known::LAYOUT_BASE, &[known::VIEW], &[]),
            class(
                "StackLayout",
                r#""ui/layouts/stack-layout".StackLayout"#,
                &[known::LAYOUT_BASE, known::VIEW],
                &[],
            ),
            class("DockLayout", r#""ui/layouts/dock-layout".DockLayout"#, &[known::LAYOUT], &[]),
            class("Label", r#""ui/label".Label"#, &[known::VIEW], &[]),
        ];
        let names: Vec<&str> = layout_component_classes(&classes)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["StackLayout", "DockLayout"]);
    }

    #[test]
    fn empty_tree() {
        let xml = write(&Tree::new(), None);
        let document = Document::parse(&xml).unwrap();
        let root = document.root_element();

        assert_eq!(root.tag_name().name(), "schema");
        assert_eq!(root.tag_name().namespace(), Some(XS_NAMESPACE));
        assert_eq!(root.attribute("id"), Some("tns"));
        assert_eq!(root.attribute("targetNamespace"), Some(TNS_NAMESPACE));
        assert_eq!(root.attribute("elementFormDefault"), Some("qualified"));
        assert_eq!(root.attribute("attributeFormDefault"), Some("unqualified"));

        let children: Vec<(&str, &str)> = root
            .children()
            .filter(|n| n.is_element())
            .map(|n| (n.tag_name().name(), n.attribute("name").unwrap()))
            .collect();
        assert_eq!(
            children,
            vec![
                ("simpleType", "BindingValidator"),
                ("group", "UIComponents"),
                ("group", "LayoutComponents"),
            ]
        );
    }

    #[test]
    fn document_order() {
        let mut tree = Tree::new();
        tree.add_class(class(
            "View",
            known::VIEW,
            &[],
            &[("width", "number")],
        ))
        .unwrap();
        tree.add_class(class(
            "TextField",
            r#""ui/text-field".TextField"#,
            &[known::VIEW],
            &[("hint", "string"), ("color", known::COLOR)],
        ))
        .unwrap();

        let xml = write(&tree, Some("1.5.0"));
        assert!(xml.contains("<!-- UI markup schema for version 1.5.0 -->"));
        let document = Document::parse(&xml).unwrap();
        let children: Vec<(&str, &str)> = document
            .root_element()
            .children()
            .filter(|n| n.is_element())
            .map(|n| (n.tag_name().name(), n.attribute("name").unwrap()))
            .collect();
        assert_eq!(
            children,
            vec![
                ("attributeGroup", "viewAttributes"),
                ("complexType", "View"),
                ("element", "View"),
                ("element", "view"),
                ("attributeGroup", "textFieldAttributes"),
                ("complexType", "TextField"),
                ("element", "TextField"),
                ("element", "text-field"),
                ("simpleType", "BindingValidator"),
                ("simpleType", "NumberValidator"),
                ("simpleType", "StringValidator"),
                ("simpleType", "HexColorValidator"),
                ("simpleType", "ColorValidator"),
                ("group", "UIComponents"),
                ("group", "LayoutComponents"),
            ]
        );

        let ui_components: Vec<&str> = document
            .descendants()
            .find(|n| n.attribute("name") == Some("UIComponents"))
            .unwrap()
            .descendants()
            .filter(|n| n.tag_name().name() == "element")
            .map(|n| n.attribute("name").unwrap())
            .collect();
        assert_eq!(ui_components, vec!["TextField", "text-field"]);
    }

    #[test]
    fn unmapped_type_aborts() {
        let mut tree = Tree::new();
        tree.add_class(class("Odd", "Odd", &[], &[("x", "Whatever")]))
            .unwrap();
        let mut registry = ValidatorRegistry::new();
        let result = SchemaWriter::new(None).write(
            SCHEMA_ROOT_NAME,
            &tree,
            &SCHEMA_ROOT_ATTRIBUTES,
            &mut registry,
        );
        assert!(matches!(result, Err(Error::UnmappedType(ref name)) if name == "Whatever"));
    }

    #[test]
    fn version_with_double_hyphen_fails() {
        let mut registry = ValidatorRegistry::new();
        let result = SchemaWriter::new(Some("1.0--rc".to_owned())).write(
            SCHEMA_ROOT_NAME,
            &Tree::new(),
            &SCHEMA_ROOT_ATTRIBUTES,
            &mut registry,
        );
        assert!(matches!(result, Err(Error::Xml(_))));
    }
}
