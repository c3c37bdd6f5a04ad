use crate::error::Error;
use crate::validators::{Restriction, Validator};
use crate::xml::XmlWriter;

/// Writes a validator as a named `xs:simpleType`.
pub struct ValidatorWriter<'a> {
    validator: &'a Validator,
}

impl<'a> ValidatorWriter<'a> {
    pub fn new(validator: &'a Validator) -> Self {
        Self { validator }
    }

    pub fn write(&self, writer: &mut XmlWriter) -> Result<(), Error> {
        writer.start_element("xs:simpleType")?;
        writer.write_attribute("name", &self.validator.name())?;

        match &self.validator.union_member_types {
            Some(members) if !members.is_empty() => {
                writer.start_element("xs:union")?;
                writer.write_attribute("memberTypes", &members.join(" "))?;
                writer.start_element("xs:simpleType")?;
                if let Some(restriction) = &self.validator.restriction {
                    RestrictionWriter::new(Some(restriction)).write(writer)?;
                }
                writer.end_element()?;
                writer.end_element()?;
            }
            _ => {
                if let Some(restriction) = &self.validator.restriction {
                    RestrictionWriter::new(Some(restriction)).write(writer)?;
                }
            }
        }

        writer.end_element()?;
        Ok(())
    }
}

pub struct RestrictionWriter<'a> {
    restriction: Option<&'a Restriction>,
}

impl<'a> RestrictionWriter<'a> {
    pub fn new(restriction: Option<&'a Restriction>) -> Self {
        Self { restriction }
    }

    pub fn write(&self, writer: &mut XmlWriter) -> Result<(), Error> {
        let restriction = self.restriction.ok_or(Error::MissingRestriction)?;

        writer.start_element("xs:restriction")?;
        if let Some(base) = &restriction.base {
            writer.write_attribute("base", base)?;
        }
        if let Some(pattern) = &restriction.pattern {
            write_facet(writer, "xs:pattern", pattern)?;
        }
        if let Some(white_space) = &restriction.white_space {
            write_facet(writer, "xs:whiteSpace", white_space)?;
        }
        for value in restriction.enum_values.iter().flatten() {
            write_facet(writer, "xs:enumeration", value)?;
        }
        writer.end_element()?;
        Ok(())
    }
}

fn write_facet(writer: &mut XmlWriter, facet: &str, value: &str) -> Result<(), Error> {
    writer.start_element(facet)?;
    writer.write_attribute("value", value)?;
    writer.end_element()?;
    Ok(())
}
