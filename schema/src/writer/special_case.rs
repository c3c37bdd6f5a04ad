use std::collections::HashMap;

use lazy_static::lazy_static;

use super::common::{
    write_attribute_declaration, write_class_element, write_group_choice, EmitContext,
    LAYOUT_COMPONENTS, UI_COMPONENTS,
};
use crate::error::Error;
use crate::lang::{Class, Type};
use crate::xml::XmlWriter;

/// Hard-coded children of an items collection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemKind {
    TabViewItem,
    SegmentedBarItem,
}

/// Child elements a class accepts beyond its attributes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpecialCase {
    /// `<Name>.itemTemplate` and/or `<Name>.itemsLayout`.
    Templates {
        item_template: bool,
        items_layout: bool,
    },
    Items(ItemKind),
    /// `Page.actionBar` ahead of the page content.
    ActionBar,
    ActionItems,
}

lazy_static! {
    static ref SPECIAL_CASES: HashMap<&'static str, SpecialCase> = HashMap::from([
        ("TabView", SpecialCase::Items(ItemKind::TabViewItem)),
        ("SegmentedBar", SpecialCase::Items(ItemKind::SegmentedBarItem)),
        ("Page", SpecialCase::ActionBar),
        ("ActionBar", SpecialCase::ActionItems),
    ]);
}

impl SpecialCase {
    pub fn for_class(class: &Class) -> Option<Self> {
        if let Some(case) = SPECIAL_CASES.get(class.name.as_str()) {
            return Some(*case);
        }
        let item_template = class.has_property("itemTemplate");
        let items_layout = class.has_property("itemsLayout");
        (item_template || items_layout).then_some(Self::Templates {
            item_template,
            items_layout,
        })
    }
}

pub struct SpecialCaseWriter<'a> {
    class: &'a Class,
    case: SpecialCase,
}

impl<'a> SpecialCaseWriter<'a> {
    pub fn for_class(class: &'a Class) -> Option<Self> {
        SpecialCase::for_class(class).map(|case| Self { class, case })
    }

    /// Name of the (first) element this case adds.
    pub fn element_name(&self) -> String {
        let suffix = match self.case {
            SpecialCase::Templates {
                item_template: true,
                ..
            } => "itemTemplate",
            SpecialCase::Templates { .. } => "itemsLayout",
            SpecialCase::Items(_) => "items",
            SpecialCase::ActionBar => "actionBar",
            SpecialCase::ActionItems => "actionItems",
        };
        format!("{}.{}", self.class.name, suffix)
    }

    /// The page re-parents itself onto the plain view so its content model replaces the one
    /// it would inherit.
    pub fn replaces_base(&self) -> bool {
        self.case == SpecialCase::ActionBar
    }

    pub fn precedes_children(&self) -> bool {
        self.case == SpecialCase::ActionBar
    }

    pub fn write(&self, writer: &mut XmlWriter, context: &mut EmitContext) -> Result<(), Error> {
        match self.case {
            SpecialCase::Templates {
                item_template,
                items_layout,
            } => {
                if item_template {
                    self.write_single_child(writer, "itemTemplate", UI_COMPONENTS)?;
                }
                if items_layout {
                    self.write_single_child(writer, "itemsLayout", LAYOUT_COMPONENTS)?;
                }
            }
            SpecialCase::Items(kind) => {
                self.start_wrapper(writer, &self.element_name())?;
                write_item(writer, context, kind)?;
                end_wrapper(writer)?;
            }
            SpecialCase::ActionBar => {
                self.start_wrapper(writer, &self.element_name())?;
                write_class_element(writer, context, "ActionBar", "ActionBar", false)?;
                end_wrapper(writer)?;
            }
            SpecialCase::ActionItems => {
                self.start_wrapper(writer, &self.element_name())?;
                write_class_element(writer, context, "ActionItem", "ActionItem", true)?;
                end_wrapper(writer)?;
            }
        }
        Ok(())
    }

    fn write_single_child(
        &self,
        writer: &mut XmlWriter,
        suffix: &str,
        group: &str,
    ) -> Result<(), Error> {
        writer.start_element("xs:element")?;
        writer.write_attribute("name", &format!("{}.{}", self.class.name, suffix))?;
        writer.write_attribute("minOccurs", "0")?;
        writer.start_element("xs:complexType")?;
        write_group_choice(writer, group, None)?;
        writer.end_element()?;
        writer.end_element()?;
        Ok(())
    }

    /// Opens `<xs:element name=..><xs:complexType><xs:sequence>`.
    fn start_wrapper(&self, writer: &mut XmlWriter, name: &str) -> Result<(), Error> {
        writer.start_element("xs:element")?;
        writer.write_attribute("name", name)?;
        writer.write_attribute("minOccurs", "0")?;
        writer.start_element("xs:complexType")?;
        writer.start_element("xs:sequence")?;
        Ok(())
    }
}

fn end_wrapper(writer: &mut XmlWriter) -> Result<(), Error> {
    writer.end_element()?;
    writer.end_element()?;
    writer.end_element()?;
    Ok(())
}

fn write_item(
    writer: &mut XmlWriter,
    context: &mut EmitContext,
    kind: ItemKind,
) -> Result<(), Error> {
    let string_validator = context.validator_name(&Type::new("string"))?;
    let (name, attributes): (&str, &[&str]) = match kind {
        ItemKind::TabViewItem => ("TabViewItem", &["title", "iconSource"]),
        ItemKind::SegmentedBarItem => ("SegmentedBarItem", &["title"]),
    };

    writer.start_element("xs:element")?;
    writer.write_attribute("name", name)?;
    writer.write_attribute("minOccurs", "0")?;
    writer.write_attribute("maxOccurs", "unbounded")?;
    writer.start_element("xs:complexType")?;
    if kind == ItemKind::TabViewItem {
        writer.start_element("xs:sequence")?;
        writer.start_element("xs:element")?;
        writer.write_attribute("name", &format!("{name}.view"))?;
        writer.write_attribute("minOccurs", "0")?;
        writer.start_element("xs:complexType")?;
        write_group_choice(writer, UI_COMPONENTS, None)?;
        writer.end_element()?;
        writer.end_element()?;
        writer.end_element()?;
    }
    for attribute in attributes {
        write_attribute_declaration(writer, attribute, &string_validator)?;
    }
    writer.end_element()?;
    writer.end_element()?;
    Ok(())
}
