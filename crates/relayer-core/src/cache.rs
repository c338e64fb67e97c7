//! Object reference cache.
//!
//! Keeps the latest `(version, digest, owner)` seen for each object touched by
//! our own executions, so later transactions can reference objects without a
//! ledger lookup. Scoped to a [`Relayer`](crate::Relayer) instance and shared
//! through an `Arc`.
//!
//! # Example
//!
//! ```
//! use move_core_types::account_address::AccountAddress;
//! use sui_relayer_core::cache::ObjectCache;
//! use sui_relayer_core::ptb::ObjectInput;
//!
//! let cache = ObjectCache::new();
//! let id = AccountAddress::new([7; 32]);
//! assert!(matches!(cache.get_or_bare(id, true), ObjectInput::Bare { mutable: true, .. }));
//! ```

use std::collections::HashMap;

use move_core_types::account_address::AccountAddress;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sui_relayer_types::encoding;
use tracing::trace;

use crate::ptb::ObjectInput;

/// Object ownership as reported in transaction object changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    AddressOwner(#[serde(with = "encoding::address_hex")] AccountAddress),
    ObjectOwner(#[serde(with = "encoding::address_hex")] AccountAddress),
    Shared { initial_shared_version: u64 },
    Immutable,
    ConsensusAddressOwner {
        start_version: u64,
        #[serde(with = "encoding::address_hex")]
        owner: AccountAddress,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectChangeKind {
    Published,
    Transferred,
    Mutated,
    Deleted,
    Wrapped,
    Created,
}

/// One entry of a transaction's object changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChange {
    #[serde(rename = "type")]
    pub kind: ObjectChangeKind,
    #[serde(with = "encoding::address_hex")]
    pub object_id: AccountAddress,
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
}

/// Latest known reference to an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCacheEntry {
    #[serde(with = "encoding::address_hex")]
    pub object_id: AccountAddress,
    pub version: u64,
    pub digest: String,
    pub object_type: Option<String>,
    pub owner: Option<Owner>,
}

impl ObjectCacheEntry {
    fn from_change(change: &ObjectChange) -> Option<Self> {
        Some(Self {
            object_id: change.object_id,
            version: change.version,
            digest: change.digest.clone()?,
            object_type: change.object_type.clone(),
            owner: change.owner.clone(),
        })
    }
}

/// Thread-safe object reference cache. Unbounded; lives as long as its relayer.
#[derive(Debug, Default)]
pub struct ObjectCache {
    entries: RwLock<HashMap<AccountAddress, ObjectCacheEntry>>,
}

impl ObjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &AccountAddress) -> Option<ObjectCacheEntry> {
        self.entries.read().get(id).cloned()
    }

    /// Cached reference if known, otherwise a bare id for the ledger to resolve.
    pub fn get_or_bare(&self, id: AccountAddress, mutable: bool) -> ObjectInput {
        match self.get(&id) {
            Some(entry) => ObjectInput::Known { entry, mutable },
            None => ObjectInput::Bare { id, mutable },
        }
    }

    /// Apply the object changes of an executed transaction.
    pub fn update(&self, changes: &[ObjectChange]) {
        let mut entries = self.entries.write();
        for change in changes {
            match change.kind {
                ObjectChangeKind::Published => continue,
                ObjectChangeKind::Deleted | ObjectChangeKind::Wrapped => {
                    entries.remove(&change.object_id);
                }
                ObjectChangeKind::Created
                | ObjectChangeKind::Mutated
                | ObjectChangeKind::Transferred => match ObjectCacheEntry::from_change(change) {
                    Some(entry) => {
                        trace!(object_id = %change.object_id, version = entry.version, "cached object");
                        entries.insert(change.object_id, entry);
                    }
                    None => {
                        entries.remove(&change.object_id);
                    }
                },
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
