//! JSON protocol spoken between nostrcal and relay provider binaries over
//! stdin/stdout.
//!
//! A provider (e.g. `nostrcal-relay-nak`) owns the keys and relay
//! connections. nostrcal writes one `Request` line and reads one `Response`.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{RawEvent, UnsignedEvent};
use crate::relay::Filter;

pub trait RelayCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Query,
    Publish,
}

/// Request sent from nostrcal to the provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from the provider back to nostrcal.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

/// Fetch events matching any of `filters`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Query {
    /// Provider-specific settings from the `relay_params` config table.
    #[serde(flatten)]
    pub relay_config: serde_json::Map<String, serde_json::Value>,
    pub filters: Vec<Filter>,
}

impl RelayCommand for Query {
    type Response = Vec<RawEvent>;
    fn command() -> Command {
        Command::Query
    }
}

/// Sign and publish an event; the provider returns it as accepted.
#[derive(Debug, Serialize, Deserialize)]
pub struct Publish {
    #[serde(flatten)]
    pub relay_config: serde_json::Map<String, serde_json::Value>,
    pub event: UnsignedEvent,
}

impl RelayCommand for Publish {
    type Response = RawEvent;
    fn command() -> Command {
        Command::Publish
    }
}
