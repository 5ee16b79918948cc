//! Embedded preset resources
//!
//! A resource is the binary payload a preset depends on (typically the
//! brush tip image) plus the four-field signature identifying it. Binding
//! a resource to a file on disk derives every signature field from the
//! file's actual bytes, so the signature cannot drift from the content it
//! describes; after binding the resource is immutable.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::ImageFormat;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::constants::{RESOURCE_SIGNATURE_KEYS, RESOURCE_TYPE_BRUSHES};
use super::error::KppError;
use super::param::XmlParam;

/// The four-field identity of an embedded resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSignature {
    pub filename: String,
    pub name: String,
    pub md5sum: String,
    #[serde(rename = "type")]
    pub resource_type: String,
}

impl ResourceSignature {
    fn get(&self, key: &str) -> Option<&str> {
        match key {
            "filename" => Some(&self.filename),
            "name" => Some(&self.name),
            "md5sum" => Some(&self.md5sum),
            "type" => Some(&self.resource_type),
            _ => None,
        }
    }

    fn to_attributes(&self) -> IndexMap<String, String> {
        let mut attributes = IndexMap::new();
        attributes.insert("filename".to_string(), self.filename.clone());
        attributes.insert("name".to_string(), self.name.clone());
        attributes.insert("md5sum".to_string(), self.md5sum.clone());
        attributes.insert("type".to_string(), self.resource_type.clone());
        attributes
    }
}

#[derive(Debug, Clone)]
enum ResourceState {
    /// Freely mutable within the signature schema. Documents hydrated from
    /// XML stay in this state.
    Unbound {
        attributes: IndexMap<String, String>,
        value: String,
    },
    /// Locked to a file on disk; the signature and payload are derived
    /// from its content and never change again.
    Bound {
        file: PathBuf,
        signature: ResourceSignature,
        payload: String,
    },
}

/// An embedded resource within a preset document.
///
/// Serializes to the single element inside the `<resources>` wrapper, with
/// the payload as base64 text content.
#[derive(Debug, Clone)]
pub struct Resource {
    tag: String,
    state: ResourceState,
}

impl Default for Resource {
    fn default() -> Self {
        Self::new()
    }
}

impl Resource {
    pub fn new() -> Self {
        Self {
            tag: "resource".to_string(),
            state: ResourceState::Unbound {
                attributes: IndexMap::new(),
                value: String::new(),
            },
        }
    }

    fn check_key(key: &str) -> Result<(), KppError> {
        if RESOURCE_SIGNATURE_KEYS.iter().any(|k| *k == key) {
            Ok(())
        } else {
            Err(KppError::UnsupportedKey {
                context: "resource",
                key: key.to_string(),
            })
        }
    }

    /// Value of the given signature attribute, if set. Keys outside the
    /// signature schema are rejected.
    pub fn get(&self, key: &str) -> Result<Option<&str>, KppError> {
        Self::check_key(key)?;
        Ok(match &self.state {
            ResourceState::Unbound { attributes, .. } => attributes.get(key).map(String::as_str),
            ResourceState::Bound { signature, .. } => signature.get(key),
        })
    }

    /// Set a signature attribute. Fails on a bound resource and on keys
    /// outside the signature schema.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), KppError> {
        match &mut self.state {
            ResourceState::Bound { .. } => Err(KppError::BoundResource),
            ResourceState::Unbound { attributes, .. } => {
                Self::check_key(key)?;
                attributes.insert(key.to_string(), value.into());
                Ok(())
            }
        }
    }

    /// The payload encoded as base64 text.
    pub fn value(&self) -> &str {
        match &self.state {
            ResourceState::Unbound { value, .. } => value,
            ResourceState::Bound { payload, .. } => payload,
        }
    }

    /// Replace the payload text. Fails on a bound resource.
    pub fn set_value(&mut self, value: impl Into<String>) -> Result<(), KppError> {
        match &mut self.state {
            ResourceState::Bound { .. } => Err(KppError::BoundResource),
            ResourceState::Unbound { value: slot, .. } => {
                *slot = value.into();
                Ok(())
            }
        }
    }

    /// The payload decoded back to raw bytes.
    pub fn payload_bytes(&self) -> Result<Vec<u8>, KppError> {
        Ok(BASE64.decode(self.value())?)
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, ResourceState::Bound { .. })
    }

    /// The file this resource was bound to, if any.
    pub fn file(&self) -> Option<&Path> {
        match &self.state {
            ResourceState::Unbound { .. } => None,
            ResourceState::Bound { file, .. } => Some(file),
        }
    }

    /// The derived signature of a bound resource.
    pub fn signature(&self) -> Option<&ResourceSignature> {
        match &self.state {
            ResourceState::Unbound { .. } => None,
            ResourceState::Bound { signature, .. } => Some(signature),
        }
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    /// Bind this resource to a file on disk.
    ///
    /// Loads the file, re-encodes it canonically as PNG, and derives the
    /// full signature from the re-encoded bytes: `filename` is the file's
    /// base name, `name` the base name without extension, `md5sum` the hex
    /// digest of the payload, `type` the `brushes` constant. The payload
    /// itself is stored as base64 text. Binding happens at most once.
    pub fn bind_file(&mut self, path: impl AsRef<Path>) -> Result<(), KppError> {
        let path = path.as_ref();
        if self.is_bound() {
            return Err(KppError::BoundResource);
        }
        if !path.exists() {
            return Err(KppError::FileNotFound(path.to_path_buf()));
        }

        let image = image::open(path)?;
        let mut encoded = Cursor::new(Vec::new());
        image.write_to(&mut encoded, ImageFormat::Png)?;
        let encoded = encoded.into_inner();

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let md5sum = hex::encode(md5::compute(&encoded).0);
        // base64 output is pure ASCII, so the payload survives the XML text
        // layer byte for byte
        let payload = BASE64.encode(&encoded);

        tracing::debug!(
            "[KPP] Bound resource {:?}: {} payload bytes, md5 {}",
            filename,
            encoded.len(),
            md5sum
        );

        self.state = ResourceState::Bound {
            file: path.to_path_buf(),
            signature: ResourceSignature {
                filename,
                name,
                md5sum,
                resource_type: RESOURCE_TYPE_BRUSHES.to_string(),
            },
            payload,
        };
        Ok(())
    }
}

impl XmlParam for Resource {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attributes(&self) -> Cow<'_, IndexMap<String, String>> {
        match &self.state {
            ResourceState::Unbound { attributes, .. } => Cow::Borrowed(attributes),
            ResourceState::Bound { signature, .. } => Cow::Owned(signature.to_attributes()),
        }
    }

    fn value(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.value())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_tip_image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let tip = RgbaImage::from_pixel(8, 8, Rgba([30, 30, 30, 255]));
        tip.save(&path).unwrap();
        path
    }

    #[test]
    fn test_unbound_set_and_get() {
        let mut resource = Resource::new();
        resource.set("filename", "tip.png").unwrap();
        assert_eq!(resource.get("filename").unwrap(), Some("tip.png"));
        assert_eq!(resource.get("md5sum").unwrap(), None);
    }

    #[test]
    fn test_schema_violations_are_rejected() {
        let mut resource = Resource::new();
        assert!(matches!(
            resource.set("checksum", "abc"),
            Err(KppError::UnsupportedKey { context: "resource", .. })
        ));
        assert!(resource.get("checksum").is_err());
    }

    #[test]
    fn test_bind_file_derives_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tip_image(dir.path(), "round_tip.png");

        let mut resource = Resource::new();
        resource.bind_file(&path).unwrap();

        assert!(resource.is_bound());
        assert_eq!(resource.file(), Some(path.as_path()));
        assert_eq!(resource.get("filename").unwrap(), Some("round_tip.png"));
        assert_eq!(resource.get("name").unwrap(), Some("round_tip"));
        assert_eq!(resource.get("type").unwrap(), Some("brushes"));

        // the signature must describe the canonical (PNG re-encoded) bytes
        let mut canonical = Cursor::new(Vec::new());
        image::open(&path)
            .unwrap()
            .write_to(&mut canonical, ImageFormat::Png)
            .unwrap();
        let canonical = canonical.into_inner();
        assert_eq!(
            resource.get("md5sum").unwrap(),
            Some(hex::encode(md5::compute(&canonical).0).as_str())
        );
        assert_eq!(resource.value(), BASE64.encode(&canonical));
        assert_eq!(resource.payload_bytes().unwrap(), canonical);
    }

    #[test]
    fn test_bound_resource_is_immutable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tip_image(dir.path(), "tip.png");

        let mut resource = Resource::new();
        resource.bind_file(&path).unwrap();
        let value_before = resource.value().to_string();

        assert!(matches!(
            resource.set("filename", "other.png"),
            Err(KppError::BoundResource)
        ));
        // even invalid keys report the immutability violation first
        assert!(matches!(
            resource.set("checksum", "abc"),
            Err(KppError::BoundResource)
        ));
        assert!(matches!(
            resource.set_value("payload"),
            Err(KppError::BoundResource)
        ));
        assert!(matches!(
            resource.bind_file(&path),
            Err(KppError::BoundResource)
        ));

        assert_eq!(resource.value(), value_before);
        assert_eq!(resource.get("filename").unwrap(), Some("tip.png"));
    }

    #[test]
    fn test_bind_missing_file() {
        let mut resource = Resource::new();
        assert!(matches!(
            resource.bind_file("/nonexistent/tip.png"),
            Err(KppError::FileNotFound(_))
        ));
        assert!(!resource.is_bound());
    }

    #[test]
    fn test_bound_attributes_follow_signature_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tip_image(dir.path(), "tip.png");

        let mut resource = Resource::new();
        resource.bind_file(&path).unwrap();

        let attributes = resource.attributes();
        let keys: Vec<&str> = attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["filename", "name", "md5sum", "type"]);
    }
}
