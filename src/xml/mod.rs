//! Minimal XML document model
//!
//! Preset parsing goes through this neutral intermediate before any
//! variant-specific construction happens: an element tree carrying tags,
//! attributes in document order, text content and children. Namespaces and
//! DTDs are out of scope; the preset format uses neither.

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::preset::error::KppError;

/// One element of a parsed document.
#[derive(Debug, Clone)]
pub struct XmlElement {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        for child in &self.children {
            child.collect_into(&mut out);
        }
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a XmlElement>) {
        out.push(self);
        for child in &self.children {
            child.collect_into(out);
        }
    }
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement, KppError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut attributes = IndexMap::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.to_string();
        attributes.insert(key, value);
    }
    Ok(XmlElement {
        tag,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut Vec<XmlElement>,
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), KppError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(KppError::Xml(
            "document has more than one root element".to_string(),
        ));
    }
    Ok(())
}

/// Parse a document into its element tree.
pub fn parse(xml: &str) -> Result<XmlElement, KppError> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => stack.push(element_from_start(e)?),
            Ok(Event::Empty(ref e)) => {
                let element = element_from_start(e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| KppError::Xml("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(ref e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&e.unescape()?);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(KppError::Xml(format!("XML parse error: {}", e))),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(KppError::Xml("document has unclosed elements".to_string()));
    }
    root.ok_or_else(|| KppError::Xml("document has no root element".to_string()))
}
