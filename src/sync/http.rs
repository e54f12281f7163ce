// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Replica backed by a JSON document database reachable over HTTP.
//!
//! Each family owns one document at `{databaseUrl}/families/{CODE}.json`.
//! Reads are `GET` (a `null` body means the document does not exist) and
//! writes are whole-document `PUT`. Change notifications come from a polling
//! task that emits an event whenever the fetched body differs from the last
//! one it emitted.

use super::channel::{
    Connector, FamilyCode, ReplicaEvent, Subscription, SyncChannel, SyncError,
};
use crate::models::RemoteDocument;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const UA: &str = concat!(
    "famledger/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/famledger)"
);

const MIN_POLL_MS: u64 = 250;

fn default_poll_ms() -> u64 {
    3000
}

fn default_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    pub database_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_poll_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RemoteConfig {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, SyncError> {
        let cfg: RemoteConfig = serde_json::from_value(value.clone())
            .map_err(|e| SyncError::InvalidConfig(e.to_string()))?;
        let url = cfg.database_url.trim();
        if url.is_empty() {
            return Err(SyncError::InvalidConfig("databaseUrl is empty".into()));
        }
        reqwest::Url::parse(url)
            .map_err(|e| SyncError::InvalidConfig(format!("databaseUrl '{}': {}", url, e)))?;
        Ok(cfg)
    }

    pub fn document_url(&self, family: &FamilyCode) -> String {
        format!(
            "{}/families/{}.json",
            self.database_url.trim().trim_end_matches('/'),
            family
        )
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_MS))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn connect(&self, config: &serde_json::Value) -> Result<Arc<dyn SyncChannel>, SyncError> {
        let cfg = RemoteConfig::from_value(config)?;
        Ok(Arc::new(HttpReplica::new(cfg)?))
    }
}

pub struct HttpReplica {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpReplica {
    pub fn new(config: RemoteConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(UA)
            .build()
            .map_err(transport)?;
        Ok(HttpReplica { client, config })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// One-shot read of the family document.
    pub async fn fetch(&self, family: &FamilyCode) -> Result<Option<RemoteDocument>, SyncError> {
        let body = fetch_body(
            &self.client,
            &self.config.document_url(family),
            self.config.auth_token.as_deref(),
        )
        .await?;
        decode_document(&body)
    }
}

fn transport(err: reqwest::Error) -> SyncError {
    SyncError::Transport(err.to_string())
}

fn with_auth(req: reqwest::RequestBuilder, auth: Option<&str>) -> reqwest::RequestBuilder {
    match auth {
        Some(token) => req.query(&[("auth", token)]),
        None => req,
    }
}

async fn fetch_body(
    client: &reqwest::Client,
    url: &str,
    auth: Option<&str>,
) -> Result<String, SyncError> {
    let resp = with_auth(client.get(url), auth)
        .send()
        .await
        .map_err(transport)?
        .error_for_status()
        .map_err(transport)?;
    resp.text().await.map_err(transport)
}

pub fn decode_document(body: &str) -> Result<Option<RemoteDocument>, SyncError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| SyncError::Decode(e.to_string()))
}

impl SyncChannel for HttpReplica {
    fn subscribe(&self, family: &FamilyCode) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = self.client.clone();
        let url = self.config.document_url(family);
        let auth = self.config.auth_token.clone();
        let period = self.config.poll_interval();
        let code = family.clone();

        let poller = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut last: Option<String> = None;
            loop {
                ticker.tick().await;
                let body = match fetch_body(&client, &url, auth.as_deref()).await {
                    Ok(body) => body,
                    Err(err) => {
                        tracing::warn!(family = %code, error = %err, "poll failed");
                        let _ = tx.send(ReplicaEvent::Error(err.to_string()));
                        break;
                    }
                };
                if last.as_deref() == Some(body.as_str()) {
                    continue;
                }
                let event = match decode_document(&body) {
                    Ok(doc) => ReplicaEvent::Snapshot(doc),
                    Err(err) => ReplicaEvent::Error(err.to_string()),
                };
                let fatal = matches!(event, ReplicaEvent::Error(_));
                last = Some(body);
                if tx.send(event).is_err() || fatal {
                    break;
                }
            }
        });

        Subscription::new(rx).with_teardown(move || poller.abort())
    }

    fn replace(
        &self,
        family: &FamilyCode,
        document: RemoteDocument,
    ) -> BoxFuture<'static, Result<(), SyncError>> {
        let client = self.client.clone();
        let url = self.config.document_url(family);
        let auth = self.config.auth_token.clone();
        async move {
            with_auth(client.put(&url), auth.as_deref())
                .json(&document)
                .send()
                .await
                .map_err(transport)?
                .error_for_status()
                .map_err(transport)?;
            Ok(())
        }
        .boxed()
    }
}
