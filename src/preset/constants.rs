//! Preset format constants
//!
//! The fixed key tables of the .kpp format. Serialization iterates these
//! tables in declaration order, so the order here is part of the format.

/// Attribute keys accepted on the root `Preset` element.
pub const KPP_ACCEPTED_ROOT_KEYS: [&str; 3] = ["paintopid", "embedded_resources", "name"];

/// Attribute keys making up a resource signature.
pub const RESOURCE_SIGNATURE_KEYS: [&str; 4] = ["filename", "name", "md5sum", "type"];

/// Keys of a brush definition string, in serialization order.
pub const BRUSH_DEFINITION_KEYS: [&str; 16] = [
    "autoSpacingCoeff",
    "useAutoSpacing",
    "angle",
    "md5sum",
    "filename",
    "AdjustmentMidPoint",
    "BrightnessAdjustment",
    "ColorAsMask",
    "ContrastAdjustment",
    "BrushVersion",
    "spacing",
    "AdjustmentVersion",
    "type",
    "scale",
    "AutoAdjustMidPoint",
    "brushApplication",
];

/// Forced `name` attribute of a brush definition parameter.
pub const BRUSH_DEFINITION_NAME: &str = "brush_definition";

/// Resource `type` recorded when binding a brush tip file.
pub const RESOURCE_TYPE_BRUSHES: &str = "brushes";

/// Document version stored in the container's `version` text field.
pub const PRESET_VERSION: &str = "5.0";

/// Container text field holding the serialized preset document.
pub const PRESET_TEXT_KEY: &str = "preset";

/// Container text field holding the document version.
pub const VERSION_TEXT_KEY: &str = "version";

/// Extension of the final preset artifact.
pub const KPP_EXTENSION: &str = "kpp";
