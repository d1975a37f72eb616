//! The boundary to whatever actually talks to Nostr relays.
//!
//! Signing, relay connections and retries all live behind `RelayClient`.
//! This crate only asks it for events matching filters and hands it
//! unsigned events to publish.

mod cancel;
pub mod memory;
pub mod protocol;
pub mod provider;

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::CalResult;
use crate::event::{RawEvent, UnsignedEvent};

pub use cancel::{Cancellation, Canceller, bounded};
pub use memory::MemoryRelay;
pub use provider::RelayProvider;

/// Query and publish operations a relay client provides.
///
/// Multiple filters passed to one `query` are OR'd.
pub trait RelayClient: Send + Sync {
    fn query(&self, filters: &[Filter]) -> impl Future<Output = CalResult<Vec<RawEvent>>> + Send;

    /// Sign, submit, and return the event as the relay accepted it.
    fn publish(&self, event: &UnsignedEvent) -> impl Future<Output = CalResult<RawEvent>> + Send;
}

/// A NIP-01 subscription filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Tag filters keyed `#<name>`, e.g. `#t`.
    #[serde(flatten)]
    pub tags: BTreeMap<String, Vec<String>>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = u16>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn authors<S: Into<String>>(mut self, authors: impl IntoIterator<Item = S>) -> Self {
        self.authors = Some(authors.into_iter().map(Into::into).collect());
        self
    }

    pub fn since(mut self, since: i64) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: i64) -> Self {
        self.until = Some(until);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Match events carrying a `name` tag with any of `values`.
    pub fn tag<S: Into<String>>(mut self, name: &str, values: impl IntoIterator<Item = S>) -> Self {
        self.tags
            .insert(format!("#{name}"), values.into_iter().map(Into::into).collect());
        self
    }

    /// Relay-side semantics of this filter, ignoring `limit`.
    pub fn matches(&self, event: &RawEvent) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(&event.kind) {
            return false;
        }
        if let Some(ref ids) = self.ids
            && !ids.contains(&event.id)
        {
            return false;
        }
        if let Some(ref authors) = self.authors
            && !authors.contains(&event.pubkey)
        {
            return false;
        }
        if self.since.is_some_and(|since| event.created_at < since) {
            return false;
        }
        if self.until.is_some_and(|until| event.created_at > until) {
            return false;
        }

        self.tags.iter().all(|(key, values)| {
            let name = key.strip_prefix('#').unwrap_or(key);
            event.tags.iter().any(|tag| {
                tag.name() == Some(name) && tag.value().is_some_and(|v| values.iter().any(|x| x == v))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Tag;

    fn raw(id: &str, kind: u16, created_at: i64, tags: Vec<Tag>) -> RawEvent {
        RawEvent {
            id: id.into(),
            pubkey: "pub1".into(),
            kind,
            created_at,
            content: String::new(),
            tags,
            sig: String::new(),
        }
    }

    #[test]
    fn test_filter_json_shape() {
        let filter = Filter::new().kinds([31922, 31923]).tag("t", ["music"]).limit(20).until(99);
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            serde_json::json!({"kinds": [31922, 31923], "#t": ["music"], "limit": 20, "until": 99})
        );

        let parsed: Filter = serde_json::from_value(serde_json::json!({"kinds": [31925], "#a": ["x"]})).unwrap();
        assert_eq!(parsed, Filter::new().kinds([31925]).tag("a", ["x"]));
    }

    #[test]
    fn test_filter_matches() {
        let event = raw("e1", 31923, 100, vec![Tag::new(["t", "music"]), Tag::new(["d", "abc"])]);

        assert!(Filter::new().matches(&event));
        assert!(Filter::new().kinds([31923]).tag("t", ["art", "music"]).matches(&event));
        assert!(!Filter::new().kinds([31922]).matches(&event));
        assert!(!Filter::new().tag("t", ["art"]).matches(&event));
        assert!(!Filter::new().until(99).matches(&event));
        assert!(Filter::new().until(100).since(100).matches(&event));
        assert!(!Filter::new().authors(["pub2"]).matches(&event));
        assert!(Filter::new().ids(["e1"]).matches(&event));
    }
}
