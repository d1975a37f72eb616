//! In-memory relay.
//!
//! Holds events in a `Vec` and applies filters the way a relay would. Used
//! by tests and for working against a fixed event set.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use crate::draft::new_identifier;
use crate::error::CalResult;
use crate::event::{RawEvent, UnsignedEvent};
use crate::relay::{Filter, RelayClient};

/// The lock is only held for a single push or a filter pass. A writer that
/// panicked cannot leave the `Vec` half-updated, so a poisoned lock is
/// read through rather than reported.
#[derive(Debug)]
pub struct MemoryRelay {
    pubkey: String,
    events: RwLock<Vec<RawEvent>>,
}

impl MemoryRelay {
    /// `pubkey` is stamped on everything published through this relay.
    pub fn new(pubkey: impl Into<String>) -> Self {
        MemoryRelay {
            pubkey: pubkey.into(),
            events: RwLock::new(Vec::new()),
        }
    }

    pub fn with_events(pubkey: impl Into<String>, events: Vec<RawEvent>) -> Self {
        MemoryRelay {
            pubkey: pubkey.into(),
            events: RwLock::new(events),
        }
    }

    pub fn insert(&self, event: RawEvent) {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Newest first per filter, each filter capped at its own limit, then
    /// the union without duplicates.
    pub fn matching(&self, filters: &[Filter]) -> Vec<RawEvent> {
        let events = self.read();
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for filter in filters {
            let mut matched: Vec<&RawEvent> = events.iter().filter(|e| filter.matches(e)).collect();
            matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
            if let Some(limit) = filter.limit {
                matched.truncate(limit);
            }

            for event in matched {
                if seen.insert(event.id.clone()) {
                    result.push(event.clone());
                }
            }
        }

        result
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<RawEvent>> {
        self.events.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RelayClient for MemoryRelay {
    async fn query(&self, filters: &[Filter]) -> CalResult<Vec<RawEvent>> {
        Ok(self.matching(filters))
    }

    /// Stamps an id, this relay's pubkey and the current time. Nothing is
    /// signed.
    async fn publish(&self, event: &UnsignedEvent) -> CalResult<RawEvent> {
        let raw = RawEvent {
            id: new_identifier(),
            pubkey: self.pubkey.clone(),
            kind: event.kind,
            created_at: chrono::Utc::now().timestamp(),
            content: event.content.clone(),
            tags: event.tags.clone(),
            sig: String::new(),
        };
        self.insert(raw.clone());
        Ok(raw)
    }
}
