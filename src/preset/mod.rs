//! Krita brush preset (.kpp) documents
//!
//! This module models the preset document and moves it between its three
//! encoding layers:
//!
//! - the PNG container, whose `preset` text field carries the document
//! - the preset XML: a `Preset` root, one `<resources>` wrapper, and an
//!   ordered run of `<param>` elements
//! - the `<Brush .../>` definition string embedded as the text of the
//!   `brush_definition` parameter
//!
//! # Example
//!
//! ```ignore
//! use kpp::preset::Preset;
//!
//! let preset = Preset::from_file("wet_circle.kpp")?;
//! for param in &preset.parameters {
//!     println!("{:?} = {}", param.name(), param.value());
//! }
//! ```

pub mod constants;
pub mod error;

mod brush;
mod document;
mod param;
mod params;
mod resource;

pub use brush::BrushDefinition;
pub use document::Preset;
pub use error::KppError;
pub use param::{Param, XmlParam};
pub use params::{ParamSet, PresetParam};
pub use resource::{Resource, ResourceSignature};
