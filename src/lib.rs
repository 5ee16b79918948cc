//! kpp - Read and write Krita brush preset (.kpp) files
//!
//! A .kpp file is byte-for-byte a PNG image: the brush thumbnail doubles as
//! the container, and the preset description rides in the image's text
//! metadata. The `preset` field holds an XML document describing the brush;
//! one parameter of that document embeds a third encoding layer, the
//! `<Brush .../>` definition string.
//!
//! # Example
//!
//! ```ignore
//! use kpp::Preset;
//!
//! let mut preset = Preset::new("MyBrush");
//! preset.set("paintopid", "paintbrush")?;
//! preset.resource.bind_file("brush_tip.png")?;
//! preset.preview = Some(thumbnail);
//!
//! let path = preset.save("/home/user/.local/share/krita/paintoppresets")?;
//! ```

pub mod container;
pub mod preset;
pub mod xml;

pub use container::MetaImage;
pub use preset::{
    BrushDefinition, KppError, Param, ParamSet, Preset, PresetParam, Resource, ResourceSignature,
    XmlParam,
};
