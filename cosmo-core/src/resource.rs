//! Ephemeral resource handles.
//!
//! Media previews and downloads need short-lived object URLs. The registry
//! hands out [`ObjectHandle`]s that are not `Clone`: whoever holds one is
//! its only owner, and releasing it consumes it.

use std::collections::HashMap;
use uuid::Uuid;

/// An owned reference to a live ephemeral resource.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an acquired handle must be released through its registry"]
pub struct ObjectHandle {
    id: Uuid,
}

impl ObjectHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// URL form used by previews and downloads.
    pub fn url(&self) -> String {
        format!("blob:cosmo/{}", self.id)
    }
}

/// What a live handle points at.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub label: String,
    pub size: u64,
}

/// Tracks every live handle.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    live: HashMap<Uuid, ResourceEntry>,
    acquired_total: u64,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new handle for a resource.
    pub fn acquire(&mut self, label: impl Into<String>, size: u64) -> ObjectHandle {
        let id = Uuid::new_v4();
        let label = label.into();
        tracing::debug!(%id, %label, size, "acquired object handle");
        self.live.insert(id, ResourceEntry { label, size });
        self.acquired_total += 1;
        ObjectHandle { id }
    }

    /// Release a handle. Returns `false` if the registry did not know it.
    pub fn release(&mut self, handle: ObjectHandle) -> bool {
        match self.live.remove(&handle.id) {
            Some(entry) => {
                tracing::debug!(id = %handle.id, label = %entry.label, "released object handle");
                true
            }
            None => {
                tracing::warn!(id = %handle.id, "released unknown object handle");
                false
            }
        }
    }

    pub fn is_live(&self, handle: &ObjectHandle) -> bool {
        self.live.contains_key(&handle.id)
    }

    pub fn entry(&self, handle: &ObjectHandle) -> Option<&ResourceEntry> {
        self.live.get(&handle.id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of handles ever acquired from this registry.
    pub fn acquired_total(&self) -> u64 {
        self.acquired_total
    }
}
