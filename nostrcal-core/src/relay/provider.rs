//! Relay provider subprocess.
//!
//! Talks to an external provider binary (`nostrcal-relay-<name>`) using JSON
//! over stdin/stdout. Any executable that speaks the protocol in
//! `relay::protocol` can be a provider.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;

use crate::error::{CalResult, CalendarError};
use crate::event::{RawEvent, UnsignedEvent};
use crate::relay::protocol::{Command, Publish, Query, RelayCommand, Request, Response};
use crate::relay::{Filter, RelayClient};

#[derive(Clone, Debug)]
pub struct RelayProvider {
    name: String,
    params: serde_json::Map<String, serde_json::Value>,
}

impl RelayProvider {
    pub fn new(name: &str, params: &HashMap<String, toml::Value>) -> Self {
        let params = params
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect();

        RelayProvider {
            name: name.to_string(),
            params,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn binary_path(&self) -> CalResult<std::path::PathBuf> {
        let binary_name = format!("nostrcal-relay-{}", self.name);
        which::which(&binary_name).map_err(|_| CalendarError::RelayNotInstalled(binary_name))
    }

    /// Call a typed relay command and return the result.
    ///
    /// No deadline here: callers wrap this with `relay::bounded`. The child
    /// is killed if the returned future is dropped.
    pub async fn call<C: RelayCommand>(&self, cmd: C) -> CalResult<C::Response> {
        self.call_raw(C::command(), cmd).await
    }

    async fn call_raw<P: Serialize, R: DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> CalResult<R> {
        let params =
            serde_json::to_value(params).map_err(|e| CalendarError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| CalendarError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        tracing::debug!(provider = %self.name, ?command, "Calling relay provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CalendarError::Relay(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CalendarError::Relay("Provider stdin unavailable".into()))?;
        stdin.write_all(format!("{request_json}\n").as_bytes()).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            tracing::warn!(
                provider = %self.name,
                code = output.status.code().unwrap_or(-1),
                "Relay provider exited with failure"
            );
            return Err(CalendarError::Relay(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(CalendarError::Relay("Provider returned no response".into()));
        }

        let response: Response<R> = serde_json::from_str(&response_str)
            .map_err(|e| CalendarError::Relay(format!("Failed to parse response: {}", e)))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } if command == Command::Publish => {
                Err(CalendarError::PublishRejected(error))
            }
            Response::Error { error } => Err(CalendarError::Relay(error)),
        }
    }
}

impl RelayClient for RelayProvider {
    async fn query(&self, filters: &[Filter]) -> CalResult<Vec<RawEvent>> {
        self.call(Query {
            relay_config: self.params.clone(),
            filters: filters.to_vec(),
        })
        .await
    }

    async fn publish(&self, event: &UnsignedEvent) -> CalResult<RawEvent> {
        self.call(Publish {
            relay_config: self.params.clone(),
            event: event.clone(),
        })
        .await
    }
}
