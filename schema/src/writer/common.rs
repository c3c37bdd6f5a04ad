use std::collections::HashSet;
use std::io;

use crate::error::Error;
use crate::lang::{Tree, Type};
use crate::validators::ValidatorRegistry;
use crate::xml::XmlWriter;

pub const UI_COMPONENTS: &str = "UIComponents";
pub const LAYOUT_COMPONENTS: &str = "LayoutComponents";

pub struct EmitContext<'a> {
    pub(super) registry: &'a mut ValidatorRegistry,
    class_names: HashSet<String>,
}

impl<'a> EmitContext<'a> {
    pub fn new(registry: &'a mut ValidatorRegistry, tree: &Tree) -> Self {
        Self {
            registry,
            class_names: tree.classes().iter().map(|c| c.name.clone()).collect(),
        }
    }

    /// Whether the schema declares a complex type called `name`.
    pub fn has_class(&self, name: &str) -> bool {
        self.class_names.contains(name)
    }

    pub fn validator_name(&mut self, type_: &Type) -> Result<String, Error> {
        Ok(self.registry.get_validator(type_)?.name())
    }
}

/// `xs:choice` of a member of `group` or any element from a foreign namespace.
pub(super) fn write_group_choice(
    writer: &mut XmlWriter,
    group: &str,
    occurs: Option<(&str, &str)>,
) -> io::Result<()> {
    writer.start_element("xs:choice")?;
    if let Some((min, max)) = occurs {
        writer.write_attribute("minOccurs", min)?;
        writer.write_attribute("maxOccurs", max)?;
    }
    writer.start_element("xs:group")?;
    writer.write_attribute("ref", group)?;
    writer.end_element()?;
    writer.start_element("xs:any")?;
    writer.write_attribute("namespace", "##other")?;
    writer.write_attribute("processContents", "lax")?;
    writer.end_element()?;
    writer.end_element()
}

/// An element typed by a schema class; when the class did not make it into the schema the
/// element accepts any attributes instead.
pub(super) fn write_class_element(
    writer: &mut XmlWriter,
    context: &EmitContext,
    name: &str,
    class_name: &str,
    repeated: bool,
) -> io::Result<()> {
    writer.start_element("xs:element")?;
    writer.write_attribute("name", name)?;
    if repeated {
        writer.write_attribute("minOccurs", "0")?;
        writer.write_attribute("maxOccurs", "unbounded")?;
    }
    if context.has_class(class_name) {
        writer.write_attribute("type", class_name)?;
    } else {
        writer.start_element("xs:complexType")?;
        writer.start_element("xs:anyAttribute")?;
        writer.write_attribute("processContents", "lax")?;
        writer.end_element()?;
        writer.end_element()?;
    }
    writer.end_element()
}

pub(super) fn write_attribute_declaration(
    writer: &mut XmlWriter,
    name: &str,
    type_name: &str,
) -> io::Result<()> {
    writer.start_element("xs:attribute")?;
    writer.write_attribute("name", name)?;
    writer.write_attribute("type", type_name)?;
    writer.end_element()
}

pub(super) fn write_attribute_group_ref(writer: &mut XmlWriter, name: &str) -> io::Result<()> {
    writer.start_element("xs:attributeGroup")?;
    writer.write_attribute("ref", name)?;
    writer.end_element()
}
