//! Tree store backed by the Realtime Database REST and streaming APIs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, StatusCode, Url};
use reqwest_eventsource::{retry, Event, EventSource, RequestBuilderExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use sn_core::ports::{StoreError, TreeStorePort, TreeSubscription};
use sn_core::tree::{normalize, TreePath, TreeValue};

use super::auth::FirebaseAnonymousAuth;
use super::stream::{StreamCache, StreamEvent};

const ETAG_REQUEST_HEADER: &str = "X-Firebase-ETag";

/// First pause before reopening a dropped stream; doubles up to the maximum.
const RECONNECT_DELAY: Duration = Duration::from_millis(250);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

fn unavailable(e: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn rejected_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST
    )
}

fn present(value: TreeValue) -> Option<TreeValue> {
    match normalize(value) {
        TreeValue::Null => None,
        value => Some(value),
    }
}

/// Why one streaming connection stopped.
enum StreamEnd {
    /// Network failure or the server closed the body; reconnect after a pause.
    Dropped(String),
    /// The credential expired; reconnect with a refreshed token.
    AuthRevoked,
    /// Security rules no longer allow reading the location.
    Cancelled(String),
    /// The subscription was dropped.
    Unsubscribed,
}

#[derive(Clone)]
pub struct FirebaseTreeStore {
    client: reqwest::Client,
    database_url: Url,
    auth: Arc<FirebaseAnonymousAuth>,
}

impl FirebaseTreeStore {
    pub fn new(
        client: reqwest::Client,
        database_url: &str,
        auth: Arc<FirebaseAnonymousAuth>,
    ) -> anyhow::Result<Self> {
        let database_url = Url::parse(database_url)
            .map_err(|e| anyhow::anyhow!("invalid database url {database_url:?}: {e}"))?;
        if database_url.cannot_be_a_base() {
            anyhow::bail!("database url {database_url} cannot carry a path");
        }
        Ok(Self {
            client,
            database_url,
            auth,
        })
    }

    /// `{database}/{segments...}.json?auth=<token>`; segments are
    /// percent-encoded individually.
    async fn url_for(&self, path: &TreePath) -> Result<Url, StoreError> {
        let mut url = self.database_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| unavailable("database url cannot carry a path"))?;
            segments.pop_if_empty();
            match path.segments().split_last() {
                None => {
                    segments.push(".json");
                }
                Some((last, parents)) => {
                    segments.extend(parents);
                    segments.push(&format!("{last}.json"));
                }
            }
        }
        let token = self.auth.id_token().await.map_err(unavailable)?;
        if let Some(token) = token {
            url.query_pairs_mut().append_pair("auth", &token);
        }
        Ok(url)
    }

    async fn check(
        response: reqwest::Response,
        operation: &'static str,
        path: &TreePath,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if rejected_status(status) {
            Err(StoreError::Rejected {
                operation,
                path: path.to_string(),
                reason: format!("HTTP {status}: {body}"),
            })
        } else {
            Err(StoreError::Unavailable(format!(
                "{operation} {path}: HTTP {status}: {body}"
            )))
        }
    }

    /// Open a streaming connection to `path` and wait until the server
    /// accepted it.
    ///
    /// Reconnection is driven by [`Self::follow`] so that each attempt
    /// carries a current token; the event source itself never retries.
    async fn connect(&self, path: &TreePath) -> Result<EventSource, StoreError> {
        let url = self.url_for(path).await?;
        let mut source = self
            .client
            .get(url)
            .eventsource()
            .map_err(|e| unavailable(format!("cannot stream {path}: {e}")))?;
        source.set_retry_policy(Box::new(retry::Never));

        match source.next().await {
            Some(Ok(Event::Open)) => Ok(source),
            Some(Ok(Event::Message(message))) => Err(unavailable(format!(
                "stream {path} sent {:?} before opening",
                message.event
            ))),
            Some(Err(reqwest_eventsource::Error::InvalidStatusCode(status, response))) => {
                let body = response.text().await.unwrap_or_default();
                if rejected_status(status) {
                    Err(StoreError::Rejected {
                        operation: "subscribe",
                        path: path.to_string(),
                        reason: format!("HTTP {status}: {body}"),
                    })
                } else {
                    Err(unavailable(format!("subscribe {path}: HTTP {status}: {body}")))
                }
            }
            Some(Err(e)) => Err(unavailable(format!("subscribe {path}: {e}"))),
            None => Err(StoreError::SubscriptionClosed(path.to_string())),
        }
    }

    /// Forward snapshots from `source` until the connection ends.
    async fn relay(
        path: &TreePath,
        source: &mut EventSource,
        cache: &mut StreamCache,
        sender: &mpsc::UnboundedSender<Option<TreeValue>>,
    ) -> StreamEnd {
        while let Some(item) = source.next().await {
            let message = match item {
                Ok(Event::Open) => continue,
                Ok(Event::Message(message)) => message,
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(e) => return StreamEnd::Dropped(e.to_string()),
            };
            let event = match StreamEvent::parse(&message.event, &message.data) {
                Ok(event) => event,
                Err(e) => {
                    warn!(path = %path, error = %e, "skipping malformed stream event");
                    continue;
                }
            };
            match event {
                StreamEvent::AuthRevoked => return StreamEnd::AuthRevoked,
                StreamEvent::Cancel(reason) => return StreamEnd::Cancelled(reason),
                event => {
                    if let Some(snapshot) = cache.apply(event) {
                        if sender.send(snapshot).is_err() {
                            return StreamEnd::Unsubscribed;
                        }
                    }
                }
            }
        }
        StreamEnd::Dropped("server closed the stream".to_string())
    }

    /// Keep one subscription alive across dropped connections and token
    /// expiry. The cache carries over, so a reconnect only reports what
    /// changed in between.
    async fn follow(
        self,
        path: TreePath,
        mut source: EventSource,
        sender: mpsc::UnboundedSender<Option<TreeValue>>,
    ) {
        let mut cache = StreamCache::default();
        let mut delay = RECONNECT_DELAY;

        loop {
            let reason = match Self::relay(&path, &mut source, &mut cache, &sender).await {
                StreamEnd::Unsubscribed => break,
                StreamEnd::Cancelled(reason) => {
                    warn!(path = %path, %reason, "event stream cancelled by server");
                    break;
                }
                StreamEnd::AuthRevoked => {
                    info!(path = %path, "stream credential revoked, refreshing token");
                    self.auth.expire_token().await;
                    "credential revoked".to_string()
                }
                StreamEnd::Dropped(reason) => reason,
            };
            source.close();
            warn!(path = %path, %reason, ?delay, "event stream interrupted, reconnecting");
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(MAX_RECONNECT_DELAY);

            source = loop {
                if sender.is_closed() {
                    return;
                }
                match self.connect(&path).await {
                    Ok(source) => break source,
                    Err(e @ StoreError::Rejected { .. }) => {
                        warn!(path = %path, error = %e, "stream no longer permitted");
                        return;
                    }
                    Err(e) => {
                        warn!(path = %path, error = %e, ?delay, "reconnect failed");
                        tokio::time::sleep(delay).await;
                        delay = (delay * 2).min(MAX_RECONNECT_DELAY);
                    }
                }
            };
            debug!(path = %path, "event stream reopened");
            delay = RECONNECT_DELAY;
        }
        source.close();
    }

    async fn decode_body(response: reqwest::Response, path: &TreePath) -> Result<TreeValue, StoreError> {
        response.json::<TreeValue>().await.map_err(|e| StoreError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl TreeStorePort for FirebaseTreeStore {
    async fn read(&self, path: &TreePath) -> Result<Option<TreeValue>, StoreError> {
        let url = self.url_for(path).await?;
        let response = self.client.get(url).send().await.map_err(unavailable)?;
        let response = Self::check(response, "read", path).await?;
        Ok(present(Self::decode_body(response, path).await?))
    }

    async fn write(&self, path: &TreePath, value: TreeValue) -> Result<(), StoreError> {
        debug!(path = %path, delete = value.is_null(), "firebase write");
        let mut url = self.url_for(path).await?;
        url.query_pairs_mut().append_pair("print", "silent");
        let request = if value.is_null() {
            self.client.delete(url)
        } else {
            self.client.put(url).json(&value)
        };
        let response = request.send().await.map_err(unavailable)?;
        Self::check(response, "write", path).await?;
        Ok(())
    }

    async fn compare_and_set(
        &self,
        path: &TreePath,
        expected: Option<TreeValue>,
        value: TreeValue,
    ) -> Result<bool, StoreError> {
        let url = self.url_for(path).await?;
        let response = self
            .client
            .get(url.clone())
            .header(ETAG_REQUEST_HEADER, "true")
            .send()
            .await
            .map_err(unavailable)?;
        let response = Self::check(response, "compare_and_set", path).await?;
        let etag = response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| unavailable(format!("no ETag returned for {path}")))?;
        let current = present(Self::decode_body(response, path).await?);
        let expected = expected.and_then(present);
        if current != expected {
            debug!(path = %path, "firebase compare_and_set precondition failed");
            return Ok(false);
        }

        let response = self
            .client
            .put(url)
            .header(header::IF_MATCH, etag)
            .json(&value)
            .send()
            .await
            .map_err(unavailable)?;
        if response.status() == StatusCode::PRECONDITION_FAILED {
            debug!(path = %path, "firebase compare_and_set lost the race");
            return Ok(false);
        }
        Self::check(response, "compare_and_set", path).await?;
        Ok(true)
    }

    async fn subscribe(&self, path: &TreePath) -> Result<TreeSubscription, StoreError> {
        let source = self.connect(path).await?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.clone().follow(path.clone(), source, sender));

        let abort = task.abort_handle();
        Ok(TreeSubscription::new(path.clone(), receiver, move || {
            abort.abort()
        }))
    }
}
