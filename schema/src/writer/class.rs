use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

use super::common::{
    write_attribute_declaration, write_attribute_group_ref, write_group_choice, EmitContext,
    UI_COMPONENTS,
};
use super::special_case::SpecialCaseWriter;
use crate::error::Error;
use crate::known;
use crate::lang::{Class, Property, Type};
use crate::naming::lower_first;
use crate::xml::XmlWriter;

/// Types written as a plain complex type instead of an extension.
const ROOT_TYPES: [&str; 2] = [known::VIEW, known::BINDABLE];

lazy_static! {
    /// Properties a class declares that are better described by its own attribute group.
    static ref OVERRIDDEN_PROPERTIES: HashMap<&'static str, &'static [&'static str]> =
        HashMap::from([
            (known::BORDER, &["borderColor", "borderWidth"][..]),
            (
                known::LAYOUT,
                &["paddingBottom", "paddingTop", "paddingLeft", "paddingRight"][..],
            ),
        ]);

    /// Attributes the UI markup accepts without a matching declared property.
    static ref SYNTHETIC_PROPERTIES: HashMap<&'static str, &'static [(&'static str, &'static str)]> =
        HashMap::from([
            (
                "View",
                &[
                    ("row", "number"),
                    ("col", "number"),
                    ("rowSpan", "number"),
                    ("colSpan", "number"),
                    ("left", "number"),
                    ("top", "number"),
                    ("dock", "string"),
                ][..],
            ),
            ("GridLayout", &[("rows", "string"), ("columns", "string")][..]),
            ("Image", &[("src", "string")][..]),
            ("ListView", &[("items", "string")][..]),
        ]);
}

/// Maximum number of children a container type holds.
fn container_occurs(full_name: &str) -> Option<&'static str> {
    match full_name {
        known::CONTENT_VIEW => Some("1"),
        known::LAYOUT | known::LAYOUT_BASE | known::CUSTOM_LAYOUT_VIEW => Some("unbounded"),
        _ => None,
    }
}

pub fn attribute_group_name(class_name: &str) -> String {
    format!("{}Attributes", lower_first(class_name))
}

/// Writes the attribute group, complex type and element declarations of one class.
pub struct ClassWriter<'a> {
    class: &'a Class,
    special_case_writer: Option<SpecialCaseWriter<'a>>,
}

impl<'a> ClassWriter<'a> {
    pub fn new(class: &'a Class) -> Self {
        Self {
            class,
            special_case_writer: SpecialCaseWriter::for_class(class),
        }
    }

    /// The extracted properties followed by the synthetic ones the class does not declare.
    pub fn properties(&self) -> Vec<Property> {
        let mut properties = self.class.properties.clone();
        if let Some(synthetic) = SYNTHETIC_PROPERTIES.get(self.class.name.as_str()) {
            for (name, type_name) in synthetic.iter() {
                if !self.class.has_property(name) {
                    properties.push(Property::new(*name, Type::new(*type_name)));
                }
            }
        }
        properties
    }

    pub fn write(&self, writer: &mut XmlWriter, context: &mut EmitContext) -> Result<(), Error> {
        self.write_attribute_group(writer, context)?;
        self.write_complex_type(writer, context)?;
        self.write_elements(writer)?;
        Ok(())
    }

    fn is_root(&self) -> bool {
        ROOT_TYPES.contains(&self.class.full_name.as_str())
            || self.class.base_class_names.is_empty()
    }

    /// `maxOccurs` of the child choice this class introduces, if any. A container nested in a
    /// container of the same cardinality already inherits its content model.
    fn children(&self) -> Option<&'static str> {
        if self.replaces_base() {
            return Some("1");
        }
        let occurs = container_occurs(&self.class.full_name)?;
        match self.inherited_occurs() {
            Some(inherited) if inherited == occurs => None,
            _ => Some(occurs),
        }
    }

    fn replaces_base(&self) -> bool {
        self.special_case_writer
            .as_ref()
            .is_some_and(|special| special.replaces_base())
    }

    /// Child cardinality of the nearest container among the bases.
    fn inherited_occurs(&self) -> Option<&'static str> {
        self.class
            .base_class_names
            .iter()
            .filter_map(Type::full_name)
            .find_map(container_occurs)
    }

    /// Bases between the class and `View` when the class extends `View` directly, so that its
    /// own content model replaces an inherited one of different cardinality.
    fn skipped_bases(&self) -> Option<&[Type]> {
        let narrows = match (container_occurs(&self.class.full_name), self.inherited_occurs()) {
            (Some(own), Some(inherited)) => own != inherited,
            _ => false,
        };
        if !narrows && !self.replaces_base() {
            return None;
        }
        let bases = &self.class.base_class_names;
        let view = bases
            .iter()
            .position(|base| base.full_name() == Some(known::VIEW))
            .unwrap_or(bases.len());
        (view > 0).then(|| &bases[..view])
    }

    fn write_attribute_group(
        &self,
        writer: &mut XmlWriter,
        context: &mut EmitContext,
    ) -> Result<(), Error> {
        let overridden = OVERRIDDEN_PROPERTIES
            .get(self.class.full_name.as_str())
            .copied()
            .unwrap_or_default();
        let mut written = HashSet::new();

        writer.start_element("xs:attributeGroup")?;
        writer.write_attribute("name", &attribute_group_name(&self.class.name))?;
        for property in self.properties() {
            if overridden.contains(&property.name.as_str()) || !written.insert(property.name.clone())
            {
                continue;
            }
            let validator = context.validator_name(&property.type_)?;
            write_attribute_declaration(writer, &property.name, &validator)?;
        }
        writer.end_element()?;
        Ok(())
    }

    fn write_complex_type(
        &self,
        writer: &mut XmlWriter,
        context: &mut EmitContext,
    ) -> Result<(), Error> {
        writer.start_element("xs:complexType")?;
        writer.write_attribute("name", &self.class.name)?;

        if self.is_root() {
            self.write_content(writer, context)?;
            write_attribute_group_ref(writer, &attribute_group_name(&self.class.name))?;
        } else {
            writer.start_element("xs:complexContent")?;
            writer.start_element("xs:extension")?;
            let skipped = self.skipped_bases();
            let base = match skipped {
                Some(_) => "View",
                None => self.class.base_class_names[0].name().unwrap_or_default(),
            };
            writer.write_attribute("base", base)?;

            self.write_content(writer, context)?;
            for skipped in skipped.unwrap_or_default().iter().rev() {
                let name = skipped.name().unwrap_or_default();
                write_attribute_group_ref(writer, &attribute_group_name(name))?;
            }
            write_attribute_group_ref(writer, &attribute_group_name(&self.class.name))?;
            writer.end_element()?;
            writer.end_element()?;
        }

        writer.end_element()?;
        Ok(())
    }

    fn write_content(
        &self,
        writer: &mut XmlWriter,
        context: &mut EmitContext,
    ) -> Result<(), Error> {
        let children = self.children();
        let special = self.special_case_writer.as_ref();
        if children.is_none() && special.is_none() {
            return Ok(());
        }

        writer.start_element("xs:sequence")?;
        if let Some(special) = special.filter(|s| s.precedes_children()) {
            special.write(writer, context)?;
        }
        if let Some(max) = children {
            write_group_choice(writer, UI_COMPONENTS, Some(("0", max)))?;
        }
        if let Some(special) = special.filter(|s| !s.precedes_children()) {
            special.write(writer, context)?;
        }
        writer.end_element()?;
        Ok(())
    }

    fn write_elements(&self, writer: &mut XmlWriter) -> Result<(), Error> {
        write_element(writer, &self.class.name, &self.class.name)?;
        let kebab_name = self.class.kebab_name();
        if kebab_name != self.class.name {
            write_element(writer, &kebab_name, &self.class.name)?;
        }
        Ok(())
    }
}

pub(super) fn write_element(
    writer: &mut XmlWriter,
    name: &str,
    type_name: &str,
) -> Result<(), Error> {
    writer.start_element("xs:element")?;
    writer.write_attribute("name", name)?;
    writer.write_attribute("type", type_name)?;
    writer.end_element()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use roxmltree::{Document, Node};

    use super::*;
    use crate::lang::Tree;
    use crate::validators::ValidatorRegistry;
    use crate::writer::fragment_writer;

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

    fn write(class: &Class, tree: &Tree) -> String {
        let mut registry = ValidatorRegistry::new();
        let mut context = EmitContext::new(&mut registry, tree);
        let mut writer = fragment_writer();
        ClassWriter::new(class)
            .write(&mut writer, &mut context)
            .unwrap();
        writer.end_document().unwrap();
        writer.to_string()
    }

    fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Node<'a, 'input> {
        node.children()
            .find(|n| n.tag_name().name() == tag)
            .unwrap_or_else(|| panic!("no {tag} in {}", node.tag_name().name()))
    }

    fn elements<'a, 'input>(document: &'a Document<'input>, tag: &str) -> Vec<Node<'a, 'input>> {
        document
            .root_element()
            .children()
            .filter(|n| n.tag_name().name() == tag)
            .collect()
    }

    #[test]
    fn attribute_group_names() {
        assert_eq!(attribute_group_name("Slider"), "sliderAttributes");
        assert_eq!(attribute_group_name("View"), "viewAttributes");
    }

    #[test]
    fn synthetic_properties() {
        let view = class("View", known::VIEW, &[], &[("row", "number")]);
        let names: Vec<String> = ClassWriter::new(&view)
            .properties()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["row", "col", "rowSpan", "colSpan", "left", "top", "dock"]);

        let grid = class("GridLayout", r#""ui/layouts/grid-layout".GridLayout"#, &[], &[]);
        let properties = ClassWriter::new(&grid).properties();
        assert_eq!(
            properties,
            vec![
                Property::new("rows", Type::new("string")),
                Property::new("columns", Type::new("string"))
            ]
        );

        let label = class("Label", r#""ui/label".Label"#, &[], &[("text", "string")]);
        assert_eq!(ClassWriter::new(&label).properties().len(), 1);
    }

    #[test]
    fn extends_direct_base() {
        let slider = class(
            "Slider",
            r#""ui/slider".Slider"#,
            &[known::VIEW],
            &[("value", "number"), ("minValue", "number")],
        );
        let xml = write(&slider, &Tree::new());
        let document = Document::parse(&xml).unwrap();

        let group = elements(&document, "attributeGroup")[0];
        assert_eq!(group.attribute("name"), Some("sliderAttributes"));
        let attributes: Vec<(&str, &str)> = group
            .children()
            .filter(|n| n.is_element())
            .map(|n| (n.attribute("name").unwrap(), n.attribute("type").unwrap()))
            .collect();
        assert_eq!(
            attributes,
            vec![("value", "NumberValidator"), ("minValue", "NumberValidator")]
        );

        let complex_type = elements(&document, "complexType")[0];
        let extension = child(child(complex_type, "complexContent"), "extension");
        assert_eq!(extension.attribute("base"), Some("View"));
        assert_eq!(
            child(extension, "attributeGroup").attribute("ref"),
            Some("sliderAttributes")
        );

        let declared: Vec<&str> = elements(&document, "element")
            .iter()
            .map(|n| n.attribute("name").unwrap())
            .collect();
        assert_eq!(declared, vec!["Slider", "slider"]);
    }

    #[test]
    fn root_type_has_no_extension() {
        let view = class("View", known::VIEW, &[r#""ui/core/proxy".ProxyObject"#], &[]);
        let xml = write(&view, &Tree::new());
        let document = Document::parse(&xml).unwrap();

        let complex_type = elements(&document, "complexType")[0];
        assert!(complex_type
            .children()
            .all(|n| n.tag_name().name() != "complexContent"));
        assert_eq!(
            child(complex_type, "attributeGroup").attribute("ref"),
            Some("viewAttributes")
        );
        assert_eq!(elements(&document, "element").len(), 2);
    }

    #[test]
    fn skips_overridden_and_repeated_properties() {
        let border = class(
            "Border",
            known::BORDER,
            &["ContentView", known::VIEW],
            &[
                ("borderColor", r#""color".Color"#),
                ("borderWidth", "number"),
                ("cornerRadius", "number"),
                ("cornerRadius", "number"),
            ],
        );
        let xml = write(&border, &Tree::new());
        let document = Document::parse(&xml).unwrap();
        let names: Vec<&str> = elements(&document, "attributeGroup")[0]
            .children()
            .filter_map(|n| n.attribute("name"))
            .collect();
        assert_eq!(names, vec!["cornerRadius"]);
    }

    #[test]
    fn single_name_element() {
        let xml = write(&class("Label", "Label", &["View"], &[]), &Tree::new());
        let document = Document::parse(&xml).unwrap();
        let declared: Vec<&str> = elements(&document, "element")
            .iter()
            .map(|n| n.attribute("name").unwrap())
            .collect();
        assert_eq!(declared, vec!["Label", "label"]);

        let xml = write(&class("label", "label", &["View"], &[]), &Tree::new());
        let document = Document::parse(&xml).unwrap();
        assert_eq!(elements(&document, "element").len(), 1);
    }

    #[test]
    fn containers_accept_children_once() {
        let layout_base = class(
            "LayoutBase",
            known::LAYOUT_BASE,
            &[known::CUSTOM_LAYOUT_VIEW, known::VIEW],
            &[],
        );
        let xml = write(&layout_base, &Tree::new());
        assert!(!xml.contains("xs:choice"));

        let custom = class("CustomLayoutView", known::CUSTOM_LAYOUT_VIEW, &[known::VIEW], &[]);
        let xml = write(&custom, &Tree::new());
        let document = Document::parse(&xml).unwrap();
        let extension = child(
            child(elements(&document, "complexType")[0], "complexContent"),
            "extension",
        );
        let choice = child(child(extension, "sequence"), "choice");
        assert_eq!(choice.attribute("minOccurs"), Some("0"));
        assert_eq!(choice.attribute("maxOccurs"), Some("unbounded"));
        assert_eq!(child(choice, "group").attribute("ref"), Some("UIComponents"));
        assert_eq!(child(choice, "any").attribute("namespace"), Some("##other"));

        let content_view = class("ContentView", known::CONTENT_VIEW, &[known::VIEW], &[]);
        let xml = write(&content_view, &Tree::new());
        assert!(xml.contains(r#"<xs:choice minOccurs="0" maxOccurs="1">"#));
    }

    #[test]
    fn page_replaces_content_view_base() {
        let page = class(
            "Page",
            r#""ui/page".Page"#,
            &[known::CONTENT_VIEW, known::VIEW],
            &[("title", "string")],
        );
        let mut tree = Tree::new();
        tree.add_class(class("ActionBar", known::ACTION_BAR, &[known::VIEW], &[]))
            .unwrap();
        let xml = write(&page, &tree);
        let document = Document::parse(&xml).unwrap();

        let extension = child(
            child(elements(&document, "complexType")[0], "complexContent"),
            "extension",
        );
        assert_eq!(extension.attribute("base"), Some("View"));
        let sequence: Vec<&str> = child(extension, "sequence")
            .children()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().name())
            .collect();
        assert_eq!(sequence, vec!["element", "choice"]);
        let action_bar = child(child(extension, "sequence"), "element");
        assert_eq!(action_bar.attribute("name"), Some("Page.actionBar"));
        assert!(xml.contains(r#"<xs:element name="ActionBar" type="ActionBar"/>"#));

        let groups: Vec<&str> = extension
            .children()
            .filter(|n| n.tag_name().name() == "attributeGroup")
            .map(|n| n.attribute("ref").unwrap())
            .collect();
        assert_eq!(groups, vec!["contentViewAttributes", "pageAttributes"]);
    }

    fn attribute_group_refs<'a>(extension: Node<'a, '_>) -> Vec<&'a str> {
        extension
            .children()
            .filter(|n| n.tag_name().name() == "attributeGroup")
            .map(|n| n.attribute("ref").unwrap())
            .collect()
    }

    #[test]
    fn single_child_container_under_layout_extends_view() {
        let content_view = class(
            "ContentView",
            known::CONTENT_VIEW,
            &[known::CUSTOM_LAYOUT_VIEW, known::VIEW],
            &[],
        );
        let xml = write(&content_view, &Tree::new());
        let document = Document::parse(&xml).unwrap();
        let extension = child(
            child(elements(&document, "complexType")[0], "complexContent"),
            "extension",
        );
        assert_eq!(extension.attribute("base"), Some("View"));
        let choice = child(child(extension, "sequence"), "choice");
        assert_eq!(choice.attribute("maxOccurs"), Some("1"));
        assert_eq!(
            attribute_group_refs(extension),
            vec!["customLayoutViewAttributes", "contentViewAttributes"]
        );

        let border = class(
            "Border",
            known::BORDER,
            &[known::CONTENT_VIEW, known::CUSTOM_LAYOUT_VIEW, known::VIEW],
            &[],
        );
        let xml = write(&border, &Tree::new());
        let document = Document::parse(&xml).unwrap();
        let extension = child(
            child(elements(&document, "complexType")[0], "complexContent"),
            "extension",
        );
        assert_eq!(extension.attribute("base"), Some("ContentView"));
        assert!(!xml.contains("xs:choice"));

        let page = class(
            "Page",
            r#""ui/page".Page"#,
            &[known::CONTENT_VIEW, known::CUSTOM_LAYOUT_VIEW, known::VIEW],
            &[],
        );
        let xml = write(&page, &Tree::new());
        let document = Document::parse(&xml).unwrap();
        let extension = child(
            child(elements(&document, "complexType")[0], "complexContent"),
            "extension",
        );
        assert_eq!(extension.attribute("base"), Some("View"));
        assert_eq!(
            attribute_group_refs(extension),
            vec!["customLayoutViewAttributes", "contentViewAttributes", "pageAttributes"]
        );
    }

    #[test]
    fn page_directly_under_view_keeps_its_base() {
        let page = class("Page", r#""ui/page".Page"#, &[known::VIEW], &[]);
        let xml = write(&page, &Tree::new());
        let document = Document::parse(&xml).unwrap();
        let extension = child(
            child(elements(&document, "complexType")[0], "complexContent"),
            "extension",
        );
        assert_eq!(extension.attribute("base"), Some("View"));
        assert_eq!(attribute_group_refs(extension), vec!["pageAttributes"]);
    }

    #[test]
    fn list_view_template_follows_attributes() {
        let list_view = class(
            "ListView",
            r#""ui/list-view".ListView"#,
            &[known::VIEW],
            &[("itemTemplate", "string")],
        );
        let xml = write(&list_view, &Tree::new());
        let document = Document::parse(&xml).unwrap();

        let names: Vec<&str> = elements(&document, "attributeGroup")[0]
            .children()
            .filter_map(|n| n.attribute("name"))
            .collect();
        assert_eq!(names, vec!["itemTemplate", "items"]);
        let extension = child(
            child(elements(&document, "complexType")[0], "complexContent"),
            "extension",
        );
        let template = child(child(extension, "sequence"), "element");
        assert_eq!(template.attribute("name"), Some("ListView.itemTemplate"));
        assert_eq!(template.attribute("minOccurs"), Some("0"));
    }

    #[test]
    fn unmapped_property_type_fails() {
        let odd = class("Odd", "Odd", &[known::VIEW], &[("thing", "Whatever")]);
        let mut registry = ValidatorRegistry::new();
        let tree = Tree::new();
        let mut context = EmitContext::new(&mut registry, &tree);
        let mut writer = fragment_writer();
        let error = ClassWriter::new(&odd)
            .write(&mut writer, &mut context)
            .unwrap_err();
        assert!(matches!(error, Error::UnmappedType(_)));
    }
}
