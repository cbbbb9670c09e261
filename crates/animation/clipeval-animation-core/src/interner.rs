//! Property-name interner.
//!
//! Maps destination property names to dense `PropertyId`s so sinks can key
//! updates by integer. The interner is an explicit object shared by handle
//! (typically `Arc<PropertyInterner>`); there is no process-wide instance.

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::ids::PropertyId;

#[derive(Debug, Default)]
struct Tables {
    ids: HashMap<String, PropertyId>,
    names: Vec<String>,
}

#[derive(Debug, Default)]
pub struct PropertyInterner {
    tables: RwLock<Tables>,
}

impl PropertyInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, allocating one on first use.
    pub fn intern(&self, name: &str) -> PropertyId {
        if let Some(id) = self.lookup(name) {
            return id;
        }
        let mut tables = self.tables.write();
        // Another writer may have inserted between the read and write lock.
        if let Some(id) = tables.ids.get(name) {
            return *id;
        }
        let id = PropertyId(tables.names.len() as u32);
        debug_assert_eq!(tables.ids.len(), tables.names.len());
        tables.ids.insert(name.to_string(), id);
        tables.names.push(name.to_string());
        id
    }

    /// Id for an already interned name.
    pub fn lookup(&self, name: &str) -> Option<PropertyId> {
        self.tables.read().ids.get(name).copied()
    }

    /// Name for an id, or `None` if the id was never allocated here.
    pub fn resolve(&self, id: PropertyId) -> Option<String> {
        self.tables.read().names.get(id.0 as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.tables.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
