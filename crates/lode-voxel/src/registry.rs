//! Node-definition registry: maps compact [`ContentId`] values to the
//! capability record the generation core consumes.
//!
//! The registry is built once during world bootstrap and is read-only
//! afterwards. Air is always id 0; the IGNORE sentinel is never a real id
//! and resolves to a built-in inert definition, so lookups on world data
//! can never panic.

use std::collections::HashMap;

use thiserror::Error;

use crate::cell::{ContentId, IGNORE};

/// Capability record for one node kind.
#[derive(Clone, Debug)]
pub struct NodeDef {
    /// Registered name, used for reverse lookup during schematic save.
    pub name: String,
    /// Whether the node supports standing on it; the ground-level scans key
    /// off this.
    pub walkable: bool,
    /// Whether diffuse light passes through.
    pub light_propagates: bool,
    /// Whether a vertical sunlight ray passes through undiminished.
    pub sunlight_propagates: bool,
    /// Whether the node takes part in liquid transitions.
    pub liquid: bool,
    /// Emitted light level (low nibble; 0 = none).
    pub light_source: u8,
}

/// Errors that can occur during node registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A node with the same name has already been registered.
    #[error("duplicate node name: {0}")]
    DuplicateName(String),
    /// Every id below the IGNORE sentinel has been consumed.
    #[error("node registry is full")]
    RegistryFull,
}

/// Maps [`ContentId`] to [`NodeDef`] with O(1) lookup by id and by name.
pub struct NodeRegistry {
    /// Dense array where `index == ContentId.0`.
    defs: Vec<NodeDef>,
    name_to_id: HashMap<String, ContentId>,
    /// Fallback definition for IGNORE and any unregistered id.
    ignore_def: NodeDef,
}

impl NodeRegistry {
    /// Creates a registry with air pre-registered as id 0.
    pub fn new() -> Self {
        let air = NodeDef {
            name: "air".to_string(),
            walkable: false,
            light_propagates: true,
            sunlight_propagates: true,
            liquid: false,
            light_source: 0,
        };
        let ignore_def = NodeDef {
            name: "ignore".to_string(),
            walkable: false,
            light_propagates: false,
            sunlight_propagates: false,
            liquid: false,
            light_source: 0,
        };

        let mut name_to_id = HashMap::new();
        name_to_id.insert("air".to_string(), ContentId(0));

        Self {
            defs: vec![air],
            name_to_id,
            ignore_def,
        }
    }

    /// Registers a node and returns its assigned id. Ids are sequential
    /// starting from 1 (0 is air).
    pub fn register(&mut self, def: NodeDef) -> Result<ContentId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.defs.len() >= IGNORE.0 as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = ContentId(self.defs.len() as u16);
        self.name_to_id.insert(def.name.clone(), id);
        self.defs.push(def);
        Ok(id)
    }

    /// Id for a registered name, or IGNORE when unknown.
    pub fn get_id(&self, name: &str) -> ContentId {
        self.name_to_id.get(name).copied().unwrap_or(IGNORE)
    }

    /// Definition for an id. Unregistered ids (including IGNORE) resolve to
    /// an inert definition that blocks light and is not walkable.
    pub fn get(&self, id: ContentId) -> &NodeDef {
        self.defs.get(id.0 as usize).unwrap_or(&self.ignore_def)
    }

    /// Number of registered nodes, air included.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.len() <= 1
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
