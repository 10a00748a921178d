//! Part templates, produced units, and the part catalog.

use crate::id::PartTypeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The fixed identity and nominal weight a line stamps onto every unit it
/// produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartTemplate {
    pub type_id: PartTypeId,
    pub name: String,
    /// Nominal weight; produced units vary around it by the line's weight error.
    pub base_weight: f64,
}

impl PartTemplate {
    pub fn new(type_id: PartTypeId, name: impl Into<String>, base_weight: f64) -> Self {
        Self {
            type_id,
            name: name.into(),
            base_weight,
        }
    }
}

/// One physical unit. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    type_id: PartTypeId,
    name: String,
    weight: f64,
    defective: bool,
}

impl Part {
    pub fn new(type_id: PartTypeId, name: impl Into<String>, weight: f64, defective: bool) -> Self {
        Self {
            type_id,
            name: name.into(),
            weight,
            defective,
        }
    }

    /// Stamp a unit from a template.
    pub fn from_template(template: &PartTemplate, weight: f64, defective: bool) -> Self {
        Self::new(template.type_id, template.name.clone(), weight, defective)
    }

    pub fn type_id(&self) -> PartTypeId {
        self.type_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_defective(&self) -> bool {
        self.defective
    }
}

/// Lookup of part templates by type id.
///
/// When several lines produce the same part type the first template
/// registered is kept.
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    templates: HashMap<PartTypeId, PartTemplate>,
}

impl PartCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template. Returns `false` if the type id was already known
    /// (the existing template is left untouched).
    pub fn register(&mut self, template: &PartTemplate) -> bool {
        if self.templates.contains_key(&template.type_id) {
            return false;
        }
        self.templates.insert(template.type_id, template.clone());
        true
    }

    pub fn get(&self, type_id: PartTypeId) -> Option<&PartTemplate> {
        self.templates.get(&type_id)
    }

    pub fn contains(&self, type_id: PartTypeId) -> bool {
        self.templates.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
