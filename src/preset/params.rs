//! Parameter collections

use indexmap::IndexMap;
use std::borrow::Cow;

use super::brush::BrushDefinition;
use super::param::{Param, XmlParam};

/// A member of a preset's parameter collection: either a generic parameter
/// or the specialized brush definition.
///
/// Construction of the right variant happens once, at parse time, by
/// dispatching on the `name` attribute of the neutral XML intermediate.
#[derive(Debug, Clone)]
pub enum PresetParam {
    Param(Param),
    Brush(BrushDefinition),
}

impl PresetParam {
    /// Value of the `name` attribute, when present.
    pub fn name(&self) -> Option<&str> {
        match self {
            PresetParam::Param(param) => param.get("name"),
            PresetParam::Brush(brush) => brush.attribute("name"),
        }
    }

    pub fn as_param(&self) -> Option<&Param> {
        match self {
            PresetParam::Param(param) => Some(param),
            PresetParam::Brush(_) => None,
        }
    }

    pub fn as_param_mut(&mut self) -> Option<&mut Param> {
        match self {
            PresetParam::Param(param) => Some(param),
            PresetParam::Brush(_) => None,
        }
    }

    pub fn as_brush(&self) -> Option<&BrushDefinition> {
        match self {
            PresetParam::Param(_) => None,
            PresetParam::Brush(brush) => Some(brush),
        }
    }

    pub fn as_brush_mut(&mut self) -> Option<&mut BrushDefinition> {
        match self {
            PresetParam::Param(_) => None,
            PresetParam::Brush(brush) => Some(brush),
        }
    }

    fn overwrite_value(&mut self, value: &str) {
        match self {
            PresetParam::Param(param) => param.set_value(value),
            PresetParam::Brush(_) => {
                // a brush definition's value is computed from field state
                tracing::debug!("[KPP] Ignoring value assignment on a brush definition");
            }
        }
    }
}

impl From<Param> for PresetParam {
    fn from(param: Param) -> Self {
        PresetParam::Param(param)
    }
}

impl From<BrushDefinition> for PresetParam {
    fn from(brush: BrushDefinition) -> Self {
        PresetParam::Brush(brush)
    }
}

impl XmlParam for PresetParam {
    fn tag(&self) -> &str {
        match self {
            PresetParam::Param(param) => param.tag(),
            PresetParam::Brush(brush) => brush.tag(),
        }
    }

    fn attributes(&self) -> Cow<'_, IndexMap<String, String>> {
        match self {
            PresetParam::Param(param) => param.attributes(),
            PresetParam::Brush(brush) => brush.attributes(),
        }
    }

    fn value(&self) -> Cow<'_, str> {
        match self {
            PresetParam::Param(param) => param.value(),
            PresetParam::Brush(brush) => brush.value(),
        }
    }
}

/// An ordered collection of preset parameters with name-keyed access.
///
/// Only types converting into [`PresetParam`] can be appended, which makes
/// the membership rule a compile-time guarantee.
#[derive(Debug, Clone, Default)]
pub struct ParamSet {
    params: Vec<PresetParam>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// First parameter whose `name` attribute equals `name`. Parameters
    /// without a `name` attribute are skipped.
    pub fn get(&self, name: &str) -> Option<&PresetParam> {
        self.params.iter().find(|param| param.name() == Some(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PresetParam> {
        self.params
            .iter_mut()
            .find(|param| param.name() == Some(name))
    }

    /// Overwrite the value of every parameter whose `name` attribute equals
    /// `name`. Attributes are left untouched; brush definitions are skipped
    /// since their value is computed.
    pub fn set_value(&mut self, name: &str, value: &str) {
        for param in &mut self.params {
            if param.name() == Some(name) {
                param.overwrite_value(value);
            }
        }
    }

    pub fn push(&mut self, param: impl Into<PresetParam>) {
        self.params.push(param.into());
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn clear(&mut self) {
        self.params.clear();
    }

    /// Parameters in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, PresetParam> {
        self.params.iter()
    }
}

impl<'a> IntoIterator for &'a ParamSet {
    type Item = &'a PresetParam;
    type IntoIter = std::slice::Iter<'a, PresetParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
