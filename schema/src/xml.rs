use std::fmt;
use std::io;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// A streaming, indenting XML writer.
///
/// The start tag of the most recently opened element stays pending until content follows, so
/// attributes can still be added and an element closed right away is written as an empty tag.
pub struct XmlWriter {
    writer: Writer<Vec<u8>>,
    pending: Option<BytesStart<'static>>,
    open: Vec<String>,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 4),
            pending: None,
            open: Vec::new(),
        }
    }

    pub fn start_document(&mut self) -> io::Result<()> {
        self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    pub fn start_element(&mut self, name: &str) -> io::Result<()> {
        self.flush_pending()?;
        self.pending = Some(BytesStart::new(name.to_owned()));
        self.open.push(name.to_owned());
        Ok(())
    }

    /// Adds an attribute to the element just started.
    pub fn write_attribute(&mut self, name: &str, value: &str) -> io::Result<()> {
        match &mut self.pending {
            Some(start) => {
                start.push_attribute((name, value));
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("attribute {name:?} written outside of a start tag"),
            )),
        }
    }

    /// Fails on text containing `--`, which cannot appear inside a comment.
    pub fn write_comment(&mut self, text: &str) -> io::Result<()> {
        if text.contains("--") {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("comment text {text:?} contains \"--\""),
            ));
        }
        self.flush_pending()?;
        self.emit(Event::Comment(BytesText::from_escaped(text)))
    }

    pub fn end_element(&mut self) -> io::Result<()> {
        let Some(name) = self.open.pop() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no element left to close",
            ));
        };
        match self.pending.take() {
            Some(start) => self.emit(Event::Empty(start)),
            None => self.emit(Event::End(BytesEnd::new(name))),
        }
    }

    /// Closes every element still open.
    pub fn end_document(&mut self) -> io::Result<()> {
        while !self.open.is_empty() {
            self.end_element()?;
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> io::Result<()> {
        match self.pending.take() {
            Some(start) => self.emit(Event::Start(start)),
            None => Ok(()),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> io::Result<()> {
        self.writer.write_event(event).map_err(io::Error::other)
    }
}

impl fmt::Display for XmlWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.writer.get_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_nested_elements() {
        let mut writer = XmlWriter::new();
        writer.start_document().unwrap();
        writer.start_element("root").unwrap();
        writer.write_attribute("id", "tns").unwrap();
        writer.write_comment(" generated ").unwrap();
        writer.start_element("child").unwrap();
        writer.write_attribute("name", "a<b").unwrap();
        writer.end_element().unwrap();
        writer.start_element("other").unwrap();
        writer.start_element("leaf").unwrap();
        writer.end_document().unwrap();

        let xml = writer.to_string();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<child name="a&lt;b"/>"#));
        assert!(xml.contains("<!-- generated -->"));
        assert!(xml.contains("\n    <child"));

        let document = roxmltree::Document::parse(&xml).unwrap();
        let root = document.root_element();
        assert_eq!(root.tag_name().name(), "root");
        assert_eq!(root.attribute("id"), Some("tns"));
        let names: Vec<&str> = root
            .children()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().name())
            .collect();
        assert_eq!(names, vec!["child", "other"]);
        let other = root.last_element_child().unwrap();
        assert_eq!(other.children().filter(|n| n.is_element()).count(), 1);
    }

    #[test]
    fn rejects_stray_attributes_and_ends() {
        let mut writer = XmlWriter::new();
        assert!(writer.write_attribute("a", "b").is_err());
        assert!(writer.end_element().is_err());

        writer.start_element("a").unwrap();
        writer.start_element("b").unwrap();
        assert!(writer.write_attribute("x", "1").is_ok());
        writer.start_element("c").unwrap();
        writer.end_element().unwrap();
        assert!(writer.write_attribute("y", "2").is_err());
    }

    #[test]
    fn rejects_double_hyphen_in_comments() {
        let mut writer = XmlWriter::new();
        writer.start_element("root").unwrap();
        let error = writer.write_comment(" version 1.0--rc ").unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
        writer.write_comment(" version 1.0-rc ").unwrap();
        writer.end_document().unwrap();
        roxmltree::Document::parse(&writer.to_string()).unwrap();
    }
}
