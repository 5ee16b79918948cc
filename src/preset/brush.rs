//! Brush definition parameters
//!
//! The `brush_definition` parameter embeds the innermost encoding layer: a
//! `<Brush key="value" .../>` attribute string stored as the element's text
//! content. Values never contain spaces or embedded quotes; that is a
//! format constraint, not a general escaping scheme.

use indexmap::IndexMap;
use std::borrow::Cow;

use super::constants::{BRUSH_DEFINITION_KEYS, BRUSH_DEFINITION_NAME};
use super::error::KppError;
use super::param::XmlParam;

/// The fixed attribute record describing how a brush tip is applied.
///
/// Fields are opaque strings keyed by [`BRUSH_DEFINITION_KEYS`]; their
/// meaning belongs to the paint engine, not to this codec. The element's
/// `name` attribute is always pinned to `brush_definition`, and the element
/// value is computed from field state rather than stored.
#[derive(Debug, Clone)]
pub struct BrushDefinition {
    tag: String,
    attributes: IndexMap<String, String>,
    fields: IndexMap<String, String>,
}

impl Default for BrushDefinition {
    fn default() -> Self {
        Self::new()
    }
}

impl BrushDefinition {
    pub fn new() -> Self {
        let mut attributes = IndexMap::new();
        attributes.insert("name".to_string(), BRUSH_DEFINITION_NAME.to_string());
        Self {
            tag: "param".to_string(),
            attributes,
            fields: IndexMap::new(),
        }
    }

    fn check_key(key: &str) -> Result<(), KppError> {
        if BRUSH_DEFINITION_KEYS.iter().any(|k| *k == key) {
            Ok(())
        } else {
            Err(KppError::UnsupportedKey {
                context: "brush definition",
                key: key.to_string(),
            })
        }
    }

    /// Value of the given definition field. Unset fields read as `None`
    /// and serialize as the literal string `"None"`.
    pub fn get(&self, key: &str) -> Result<Option<&str>, KppError> {
        Self::check_key(key)?;
        Ok(self.fields.get(key).map(String::as_str))
    }

    /// Set a definition field. Keys outside the schema are rejected.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), KppError> {
        Self::check_key(key)?;
        self.fields.insert(key.to_string(), value.into());
        Ok(())
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    /// Value of an XML element attribute, if set.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Set an XML element attribute. `name` stays pinned to
    /// `brush_definition` regardless of the given value.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key == "name" {
            self.attributes.insert(key, BRUSH_DEFINITION_NAME.to_string());
        } else {
            self.attributes.insert(key, value.into());
        }
    }

    /// Parse a serialized `<Brush .../>` definition string.
    ///
    /// Every schema key must be present in the source text; parsing fails
    /// naming the first absent key. Unknown keys are ignored.
    pub fn from_definition_string(text: &str) -> Result<Self, KppError> {
        let body = text.trim();
        let body = body.strip_prefix("<Brush").unwrap_or(body);
        let body = body.strip_suffix("/>").unwrap_or(body);

        let mut tokens: IndexMap<&str, String> = IndexMap::new();
        for token in body.split(' ') {
            if token.is_empty() {
                continue;
            }
            let (key, value) = token
                .split_once('=')
                .ok_or_else(|| KppError::InvalidDefinition(token.to_string()))?;
            tokens.insert(key, value.replace('"', ""));
        }

        let mut brush = Self::new();
        for key in BRUSH_DEFINITION_KEYS {
            let value = tokens
                .get(key)
                .ok_or_else(|| KppError::MissingDefinitionKey(key.to_string()))?;
            brush.fields.insert(key.to_string(), value.clone());
        }
        Ok(brush)
    }

    /// Serialize the definition: every schema key in table order,
    /// substituting `None` for unset fields.
    pub fn definition_string(&self) -> String {
        let attributes: Vec<String> = BRUSH_DEFINITION_KEYS
            .iter()
            .map(|key| {
                let value = self.fields.get(*key).map(String::as_str).unwrap_or("None");
                format!("{}=\"{}\"", key, value)
            })
            .collect();
        format!("<Brush {}/>", attributes.join(" "))
    }
}

impl XmlParam for BrushDefinition {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attributes(&self) -> Cow<'_, IndexMap<String, String>> {
        Cow::Borrowed(&self.attributes)
    }

    fn value(&self) -> Cow<'_, str> {
        Cow::Owned(self.definition_string())
    }
}
