//! Addressable event coordinates (`kind:pubkey:identifier`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::event::Tag;

/// Reference to a replaceable event by author and `d` identifier rather
/// than by id, so it keeps pointing at the latest version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub kind: u16,
    pub pubkey: String,
    pub identifier: String,
    /// Relay hint, the third element of an `a` tag.
    pub relay: Option<String>,
}

impl Coordinate {
    pub fn new(kind: u16, pubkey: impl Into<String>, identifier: impl Into<String>) -> Self {
        Coordinate {
            kind,
            pubkey: pubkey.into(),
            identifier: identifier.into(),
            relay: None,
        }
    }

    /// An empty hint is no hint, the same as `from_tag` reads it.
    pub fn with_relay(mut self, relay: impl Into<String>) -> Self {
        self.relay = Some(relay.into()).filter(|r: &String| !r.is_empty());
        self
    }

    /// Read an `a` tag: `["a", "kind:pubkey:identifier", relay?]`.
    pub fn from_tag(tag: &Tag) -> Option<Self> {
        if tag.name() != Some("a") {
            return None;
        }
        let mut coordinate: Coordinate = tag.value()?.parse().ok()?;
        coordinate.relay = tag.get(2).filter(|r| !r.is_empty()).map(str::to_string);
        Some(coordinate)
    }

    pub fn to_tag(&self) -> Tag {
        let mut parts = vec!["a".to_string(), self.to_string()];
        if let Some(relay) = &self.relay {
            parts.push(relay.clone());
        }
        Tag(parts)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.pubkey, self.identifier)
    }
}

impl FromStr for Coordinate {
    type Err = String;

    /// The identifier is everything after the second colon, so it may
    /// itself contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(kind), Some(pubkey), Some(identifier)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected kind:pubkey:identifier, got '{s}'"));
        };

        let kind = kind
            .parse::<u16>()
            .map_err(|_| format!("invalid kind '{kind}' in coordinate '{s}'"))?;
        if pubkey.is_empty() {
            return Err(format!("missing pubkey in coordinate '{s}'"));
        }

        Ok(Coordinate::new(kind, pubkey, identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let coordinate: Coordinate = "31923:pub1:ev1".parse().unwrap();
        assert_eq!(coordinate.kind, 31923);
        assert_eq!(coordinate.pubkey, "pub1");
        assert_eq!(coordinate.identifier, "ev1");
        assert_eq!(coordinate.to_string(), "31923:pub1:ev1");
    }

    #[test]
    fn test_identifier_may_contain_colons() {
        let coordinate: Coordinate = "31922:pub1:2025:summer".parse().unwrap();
        assert_eq!(coordinate.identifier, "2025:summer");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("31923:pub1".parse::<Coordinate>().is_err());
        assert!("abc:pub1:ev1".parse::<Coordinate>().is_err());
        assert!("31923::ev1".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_tag_with_relay_hint() {
        let tag = Tag::new(["a", "31923:pub1:ev1", "wss://relay.example"]);
        let coordinate = Coordinate::from_tag(&tag).unwrap();
        assert_eq!(coordinate.relay.as_deref(), Some("wss://relay.example"));
        assert_eq!(coordinate.to_tag(), tag);
    }

    #[test]
    fn test_empty_relay_hint_round_trips() {
        let coordinate = Coordinate::new(31923, "pub1", "ev1").with_relay("");
        assert_eq!(coordinate.relay, None);
        assert_eq!(Coordinate::from_tag(&coordinate.to_tag()), Some(coordinate));
    }
}
