//! Preset documents
//!
//! The root aggregate of the format, and the pipelines between its three
//! encoding layers: container bytes, the preset XML document, and the
//! brush definition string nested inside one parameter. Parsing first
//! builds the neutral [`XmlElement`] tree, then constructs the right
//! parameter variant for each child in one explicit dispatch step.

use image::RgbaImage;
use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::container::MetaImage;
use crate::xml::{self, XmlElement};

use super::brush::BrushDefinition;
use super::constants::{
    BRUSH_DEFINITION_NAME, KPP_ACCEPTED_ROOT_KEYS, KPP_EXTENSION, PRESET_TEXT_KEY, PRESET_VERSION,
    VERSION_TEXT_KEY,
};
use super::error::KppError;
use super::param::{Param, XmlParam};
use super::params::{ParamSet, PresetParam};
use super::resource::Resource;

/// A brush preset document.
///
/// Root-level attributes are restricted to [`KPP_ACCEPTED_ROOT_KEYS`]; the
/// document owns exactly one resource slot (a known limitation of the
/// format) and an ordered parameter collection. The preview image doubles
/// as the on-disk container when saving.
#[derive(Debug, Clone)]
pub struct Preset {
    root: IndexMap<String, String>,
    pub resource: Resource,
    pub parameters: ParamSet,
    pub preview: Option<RgbaImage>,
    pub filename: String,
}

impl Preset {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            root: IndexMap::new(),
            resource: Resource::new(),
            parameters: ParamSet::new(),
            preview: None,
            filename: filename.into(),
        }
    }

    fn check_root_key(key: &str) -> Result<(), KppError> {
        if KPP_ACCEPTED_ROOT_KEYS.iter().any(|k| *k == key) {
            Ok(())
        } else {
            Err(KppError::UnsupportedKey {
                context: "preset root",
                key: key.to_string(),
            })
        }
    }

    /// Value of the given root-level attribute, if set.
    pub fn get(&self, key: &str) -> Result<Option<&str>, KppError> {
        Self::check_root_key(key)?;
        Ok(self.root.get(key).map(String::as_str))
    }

    /// Set a root-level attribute. Keys outside the accepted set are
    /// rejected, on parsed input just as on caller input.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), KppError> {
        Self::check_root_key(key)?;
        self.root.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Document version written to the container's `version` field.
    pub fn version(&self) -> &'static str {
        PRESET_VERSION
    }

    /// The serialized document, as stored in the container's `preset`
    /// field.
    pub fn preset_xml(&self) -> Result<String, KppError> {
        self.to_xml()
    }

    /// Serialize the document to XML text.
    ///
    /// Root attributes in insertion order, then the synthetic `resources`
    /// wrapper holding the resource element, then every parameter in
    /// collection order. No declaration, no pretty-printing.
    pub fn to_xml(&self) -> Result<String, KppError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        let mut root = BytesStart::new("Preset");
        for (key, value) in &self.root {
            root.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Start(root))?;

        writer.write_event(Event::Start(BytesStart::new("resources")))?;
        self.resource.write_element(&mut writer)?;
        writer.write_event(Event::End(BytesEnd::new("resources")))?;

        for param in &self.parameters {
            param.write_element(&mut writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("Preset")))?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| KppError::Xml(e.to_string()))
    }

    /// Parse a document from XML text.
    pub fn from_xml(text: &str) -> Result<Self, KppError> {
        let root = xml::parse(text)?;
        let mut preset = Preset::new(root.attributes.get("name").cloned().unwrap_or_default());

        for (key, value) in &root.attributes {
            preset.set(key, value.clone())?;
        }

        for child in &root.children {
            if child.tag == "resources" {
                preset.hydrate_resource(child)?;
                continue;
            }
            preset.parameters.push(Self::dispatch_param(child)?);
        }

        Ok(preset)
    }

    /// Copy the single resource element out of a `resources` wrapper.
    ///
    /// Only one resource per preset is supported; extra elements are
    /// dropped, never silently reshuffled into the document.
    fn hydrate_resource(&mut self, wrapper: &XmlElement) -> Result<(), KppError> {
        let descendants = wrapper.descendants();
        let Some(element) = descendants.first() else {
            return Ok(());
        };
        if descendants.len() > 1 {
            tracing::warn!(
                "[KPP] Preset carries {} resource elements, keeping only the first",
                descendants.len()
            );
        }

        self.resource.set_tag(element.tag.clone());
        self.resource.set_value(element.text.clone())?;
        for (key, value) in &element.attributes {
            self.resource.set(key, value.clone())?;
        }
        Ok(())
    }

    /// Construct the right parameter variant for one child element.
    fn dispatch_param(element: &XmlElement) -> Result<PresetParam, KppError> {
        if element.attributes.get("name").map(String::as_str) == Some(BRUSH_DEFINITION_NAME) {
            let mut brush = BrushDefinition::from_definition_string(&element.text)?;
            brush.set_tag(element.tag.clone());
            for (key, value) in &element.attributes {
                brush.set_attribute(key.clone(), value.clone());
            }
            Ok(PresetParam::Brush(brush))
        } else {
            let mut param = Param::new();
            param.set_tag(element.tag.clone());
            param.set_value(element.text.clone());
            for (key, value) in &element.attributes {
                param.set(key.clone(), value.clone());
            }
            Ok(PresetParam::Param(param))
        }
    }

    /// Parse a document from container bytes.
    ///
    /// The container's raster payload is kept as the document preview, so
    /// a freshly loaded preset can be saved again as-is.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KppError> {
        let container = MetaImage::from_bytes(bytes)?;
        let text = container
            .text(PRESET_TEXT_KEY)
            .ok_or_else(|| KppError::MissingTextField(PRESET_TEXT_KEY.to_string()))?;

        let mut preset = Self::from_xml(text)?;
        preset.preview = Some(container.into_image());

        tracing::info!(
            "[KPP] Parsed preset {:?}: {} parameters, resource bound: {}",
            preset.filename,
            preset.parameters.len(),
            preset.resource.is_bound()
        );
        Ok(preset)
    }

    /// Load a preset from a container file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KppError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(KppError::FileNotFound(path.to_path_buf()));
        }
        tracing::info!("[KPP] Loading preset: {:?}", path);
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Save the preset into a directory, returning the final `.kpp` path.
    ///
    /// The document is embedded into the preview container's `preset` and
    /// `version` fields, written as `<dir>/<filename>.png`, then renamed
    /// over any stale `<dir>/<filename>.kpp`. The remove-then-rename pair
    /// is not atomic; a crash in between can leave neither file present.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf, KppError> {
        let dir = dir.as_ref();
        let Some(preview) = &self.preview else {
            return Err(KppError::MissingPreview);
        };
        if self.filename.is_empty() {
            return Err(KppError::EmptyFilename);
        }
        if !dir.exists() {
            return Err(KppError::DirectoryNotFound(dir.to_path_buf()));
        }

        let png_path = dir.join(format!("{}.png", self.filename));
        let kpp_path = dir.join(format!("{}.{}", self.filename, KPP_EXTENSION));

        let mut container = MetaImage::new(preview.clone());
        container.set_text(PRESET_TEXT_KEY, self.to_xml()?);
        container.set_text(VERSION_TEXT_KEY, self.version());
        fs::write(&png_path, container.to_bytes()?)?;

        if kpp_path.exists() {
            fs::remove_file(&kpp_path)?;
        }
        fs::rename(&png_path, &kpp_path)?;

        tracing::info!("[KPP] Saved preset to {:?}", kpp_path);
        Ok(kpp_path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::preset::constants::BRUSH_DEFINITION_KEYS;

    fn full_definition() -> String {
        let pairs: Vec<String> = BRUSH_DEFINITION_KEYS
            .iter()
            .map(|key| format!("{}=\"1\"", key))
            .collect();
        format!("<Brush {}/>", pairs.join(" "))
    }

    #[test]
    fn test_root_keys_are_restricted() {
        let mut preset = Preset::new("wet_circle");
        preset.set("paintopid", "paintbrush").unwrap();
        preset.set("embedded_resources", "1").unwrap();
        preset.set("name", "wet_circle").unwrap();

        assert!(matches!(
            preset.set("flow", "0.5"),
            Err(KppError::UnsupportedKey { context: "preset root", .. })
        ));
        assert_eq!(preset.get("paintopid").unwrap(), Some("paintbrush"));
    }

    #[test]
    fn test_to_xml_shape() {
        let mut preset = Preset::new("wet_circle");
        preset.set("name", "wet_circle").unwrap();
        preset.resource.set("filename", "tip.png").unwrap();
        preset.resource.set_value("QUJD").unwrap();

        let mut param = Param::new();
        param.set("name", "FlowValue");
        param.set_value("0.5");
        preset.parameters.push(param);

        let xml = preset.to_xml().unwrap();
        assert_eq!(
            xml,
            "<Preset name=\"wet_circle\">\
             <resources><resource filename=\"tip.png\">QUJD</resource></resources>\
             <param name=\"FlowValue\">0.5</param>\
             </Preset>"
        );
    }

    #[test]
    fn test_from_xml_rejects_unknown_root_keys() {
        assert!(matches!(
            Preset::from_xml("<Preset name=\"a\" flow=\"1\"/>"),
            Err(KppError::UnsupportedKey { .. })
        ));
    }

    #[test]
    fn test_from_xml_takes_filename_from_name() {
        let preset = Preset::from_xml("<Preset name=\"wet_circle\"/>").unwrap();
        assert_eq!(preset.filename, "wet_circle");

        let nameless = Preset::from_xml("<Preset paintopid=\"paintbrush\"/>").unwrap();
        assert_eq!(nameless.filename, "");
    }

    #[test]
    fn test_from_xml_dispatches_brush_definition() {
        let xml = format!(
            "<Preset name=\"a\">\
             <param name=\"brush_definition\" type=\"string\">{}</param>\
             <param name=\"FlowValue\">0.5</param>\
             </Preset>",
            full_definition()
                .replace('<', "&lt;")
                .replace('>', "&gt;")
                .replace('"', "&quot;")
        );
        let preset = Preset::from_xml(&xml).unwrap();

        let brush = preset
            .parameters
            .get("brush_definition")
            .and_then(PresetParam::as_brush)
            .unwrap();
        assert_eq!(brush.get("spacing").unwrap(), Some("1"));
        assert_eq!(brush.attribute("type"), Some("string"));

        let flow = preset.parameters.get("FlowValue").unwrap();
        assert!(flow.as_param().is_some());
        assert_eq!(flow.value(), "0.5");
    }

    #[test]
    fn test_nameless_param_stays_generic() {
        let preset = Preset::from_xml("<Preset name=\"a\"><param type=\"string\">x</param></Preset>")
            .unwrap();
        assert_eq!(preset.parameters.len(), 1);
        let param = preset.parameters.iter().next().unwrap();
        assert!(param.as_param().is_some());
        assert_eq!(param.name(), None);
    }

    #[test]
    fn test_extra_resources_are_collapsed() {
        let preset = Preset::from_xml(
            "<Preset name=\"a\"><resources>\
             <resource filename=\"first.png\">QQ==</resource>\
             <resource filename=\"second.png\">Qg==</resource>\
             </resources></Preset>",
        )
        .unwrap();

        assert_eq!(preset.resource.get("filename").unwrap(), Some("first.png"));
        assert_eq!(preset.resource.value(), "QQ==");
    }

    #[test]
    fn test_empty_resources_wrapper_is_tolerated() {
        let preset = Preset::from_xml("<Preset name=\"a\"><resources/></Preset>").unwrap();
        assert_eq!(preset.resource.get("filename").unwrap(), None);
        assert_eq!(preset.resource.value(), "");
    }

    #[test]
    fn test_from_xml_rejects_unknown_resource_keys() {
        assert!(matches!(
            Preset::from_xml(
                "<Preset name=\"a\"><resources>\
                 <resource checksum=\"abc\"/>\
                 </resources></Preset>"
            ),
            Err(KppError::UnsupportedKey { context: "resource", .. })
        ));
    }
}
