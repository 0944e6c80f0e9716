use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use log::warn;

use crate::automation::{AutomationHandle, Param};

/// Stable identifier of a placed sphere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sphere-{}", self.0)
    }
}

/// Opaque reference to the renderer's object for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

#[derive(Debug)]
pub struct EntityRecord {
    pub id: EntityId,
    pub handle: VisualHandle,
    pub selected: bool,
    /// Last emissive intensity written to the renderer.
    pub emissive: f32,
    /// Last vertical offset written to the renderer.
    pub elevation: f32,
    automations: HashMap<Param, AutomationHandle>,
}

impl EntityRecord {
    fn new(id: EntityId, handle: VisualHandle, emissive: f32) -> Self {
        Self {
            id,
            handle,
            selected: false,
            emissive,
            elevation: 0.0,
            automations: HashMap::new(),
        }
    }

    pub fn automation(&self, param: Param) -> Option<AutomationHandle> {
        self.automations.get(&param).copied()
    }

    pub fn track(&mut self, handle: AutomationHandle) {
        self.automations.insert(handle.slot.param, handle);
    }
}

/// Placed entities keyed by identifier. Lives on the control thread only.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityId, EntityRecord>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a placed entity. Registering an identifier twice replaces the
    /// earlier record.
    pub fn register(&mut self, id: EntityId, handle: VisualHandle, emissive: f32) -> &mut EntityRecord {
        match self.entities.entry(id) {
            Entry::Occupied(mut entry) => {
                warn!("{id} registered twice, replacing its record");
                entry.insert(EntityRecord::new(id, handle, emissive));
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(EntityRecord::new(id, handle, emissive)),
        }
    }

    pub fn lookup(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(&id)
    }

    pub fn lookup_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }
}
