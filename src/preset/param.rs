//! Generic preset parameters

use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::Cursor;

use super::error::KppError;

/// Capability shared by everything that serializes to a preset XML element.
///
/// Implemented by [`Param`], [`super::Resource`] and
/// [`super::BrushDefinition`]; the collection types are declared over this
/// capability rather than over a concrete base.
pub trait XmlParam {
    /// Element tag.
    fn tag(&self) -> &str;

    /// Element attributes in serialization order.
    fn attributes(&self) -> Cow<'_, IndexMap<String, String>>;

    /// Element text content.
    fn value(&self) -> Cow<'_, str>;

    /// Write the element through the given XML writer.
    fn write_element(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> Result<(), KppError> {
        let mut elem = BytesStart::new(self.tag());
        let attributes = self.attributes();
        for (key, value) in attributes.iter() {
            elem.push_attribute((key.as_str(), value.as_str()));
        }

        let value = self.value();
        if value.is_empty() {
            writer.write_event(Event::Empty(elem))?;
        } else {
            writer.write_event(Event::Start(elem))?;
            writer.write_event(Event::Text(BytesText::new(&value)))?;
            writer.write_event(Event::End(BytesEnd::new(self.tag())))?;
        }
        Ok(())
    }
}

/// A single named parameter within a preset document.
///
/// One XML element: a tag (default `param`), string attributes in
/// insertion order, and a text value. No validation happens at this layer;
/// the schema-restricted variants wrap the same keyed-attribute shape.
#[derive(Debug, Clone)]
pub struct Param {
    tag: String,
    attributes: IndexMap<String, String>,
    value: String,
}

impl Default for Param {
    fn default() -> Self {
        Self::new()
    }
}

impl Param {
    pub fn new() -> Self {
        Self {
            tag: "param".to_string(),
            attributes: IndexMap::new(),
            value: String::new(),
        }
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    /// Value of the given attribute, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Set an attribute. Overwriting keeps the key's original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

impl XmlParam for Param {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attributes(&self) -> Cow<'_, IndexMap<String, String>> {
        Cow::Borrowed(&self.attributes)
    }

    fn value(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_insertion_order_is_preserved() {
        let mut param = Param::new();
        param.set("name", "spacing");
        param.set("type", "string");
        param.set("version", "2");

        let attrs = param.attributes();
        let keys: Vec<&str> = attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "type", "version"]);
        drop(attrs);

        // overwriting must not move the key
        param.set("type", "internal");
        let attrs = param.attributes();
        let keys: Vec<&str> = attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "type", "version"]);
        assert_eq!(param.get("type"), Some("internal"));
    }

    #[test]
    fn test_write_element_escapes_text() {
        let mut param = Param::new();
        param.set("name", "brush_definition");
        param.set_value("<Brush spacing=\"0.1\"/>");

        let mut writer = Writer::new(Cursor::new(Vec::new()));
        param.write_element(&mut writer).unwrap();
        let xml = String::from_utf8(writer.into_inner().into_inner()).unwrap();

        assert!(xml.starts_with("<param name=\"brush_definition\">"));
        assert!(xml.contains("&lt;Brush"));
        assert!(xml.ends_with("</param>"));
    }

    #[test]
    fn test_write_element_empty_value() {
        let mut param = Param::new();
        param.set("name", "requiredBrushFile");

        let mut writer = Writer::new(Cursor::new(Vec::new()));
        param.write_element(&mut writer).unwrap();
        let xml = String::from_utf8(writer.into_inner().into_inner()).unwrap();

        assert_eq!(xml, "<param name=\"requiredBrushFile\"/>");
    }
}
