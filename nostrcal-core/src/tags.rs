//! Tag lookups and typed tag records.

use serde::{Deserialize, Serialize};

use crate::event::Tag;

/// Primary value of the first tag named `key`.
pub fn first_value<'a>(tags: &'a [Tag], key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.name() == Some(key))
        .and_then(Tag::value)
}

/// Primary values of every tag named `key`, in order.
pub fn all_values<'a>(tags: &'a [Tag], key: &str) -> Vec<&'a str> {
    tags.iter()
        .filter(|tag| tag.name() == Some(key))
        .filter_map(Tag::value)
        .collect()
}

/// Whether any tag is named `key`, regardless of its value.
pub fn has_tag(tags: &[Tag], key: &str) -> bool {
    tags.iter().any(|tag| tag.name() == Some(key))
}

/// An event participant, from `["p", pubkey, relay?, role?]`.
///
/// An empty relay or role has no wire form distinct from an absent one, so
/// the builders and `from_tag` store it as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub pubkey: String,
    pub relay_url: Option<String>,
    pub role: Option<String>,
}

impl Participant {
    pub fn new(pubkey: impl Into<String>) -> Self {
        Participant {
            pubkey: pubkey.into(),
            relay_url: None,
            role: None,
        }
    }

    pub fn with_relay(mut self, relay_url: impl Into<String>) -> Self {
        self.relay_url = Some(relay_url.into());
        self.normalized()
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self.normalized()
    }

    /// Empty relay and role become `None`.
    pub fn normalized(mut self) -> Self {
        self.relay_url = self.relay_url.filter(|r| !r.is_empty());
        self.role = self.role.filter(|r| !r.is_empty());
        self
    }

    /// Read a `p` tag. Empty relay/role positions count as absent.
    pub fn from_tag(tag: &Tag) -> Option<Self> {
        if tag.name() != Some("p") {
            return None;
        }
        let present = |s: &str| (!s.is_empty()).then(|| s.to_string());

        Some(Participant {
            pubkey: tag.value()?.to_string(),
            relay_url: tag.get(2).and_then(present),
            role: tag.get(3).and_then(present),
        })
    }

    /// Positional layout: a role without a relay keeps an empty relay slot.
    pub fn to_tag(&self) -> Tag {
        let mut parts = vec!["p".to_string(), self.pubkey.clone()];
        match (&self.relay_url, &self.role) {
            (Some(relay), Some(role)) => {
                parts.push(relay.clone());
                parts.push(role.clone());
            }
            (Some(relay), None) => parts.push(relay.clone()),
            (None, Some(role)) => {
                parts.push(String::new());
                parts.push(role.clone());
            }
            (None, None) => {}
        }
        Tag(parts)
    }
}
