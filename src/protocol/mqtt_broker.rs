// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT broker connection.
//!
//! [`MqttBroker`] owns the `rumqttc` client. Its event loop runs on a
//! separate task that never waits on the dispatcher: incoming messages are
//! pushed into an unbounded inbound queue, so a burst of requests is never
//! dropped and never stalls the network.
//!
//! # Examples
//!
//! ```no_run
//! use ambientika_relay::protocol::{MqttBroker, OutboundMessage, Publisher};
//! use std::time::Duration;
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> ambientika_relay::Result<()> {
//! let (tx, mut rx) = mpsc::unbounded_channel();
//!
//! let broker = MqttBroker::builder()
//!     .host("192.168.1.50")
//!     .port(1883)
//!     .credentials("user", "password")
//!     .publish_timeout(Duration::from_secs(5))
//!     .build(tx)
//!     .await?;
//!
//! broker.subscribe("ambientika/#").await?;
//! broker
//!     .publish(OutboundMessage::new("ir/send", "0x9669 0xD728 2", false))
//!     .await?;
//! broker.flush().await?;
//!
//! while let Some(request) = rx.recv().await {
//!     println!("{}: {}", request.topic, request.payload);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::sync::{mpsc, oneshot, watch};

use crate::dispatcher::InboundRequest;
use crate::error::ProtocolError;
use crate::protocol::{OutboundMessage, Publisher};

/// Returns `{prefix}-` followed by six random hex digits.
///
/// Brokers disconnect the older of two clients sharing an id, so every
/// process start gets a fresh one.
#[must_use]
pub fn random_client_id(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &id[..6])
}

/// Configuration for an MQTT broker connection.
#[derive(Debug, Clone)]
pub struct MqttBrokerConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    client_id: Option<String>,
    keep_alive: Duration,
    connection_timeout: Duration,
    publish_timeout: Option<Duration>,
}

impl Default for MqttBrokerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 1883,
            credentials: None,
            client_id: None,
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            publish_timeout: None,
        }
    }
}

/// A connection to an MQTT broker.
///
/// `MqttBroker` is cheaply cloneable (via `Arc`).
#[derive(Clone)]
pub struct MqttBroker {
    inner: Arc<MqttBrokerInner>,
}

struct MqttBrokerInner {
    /// The MQTT async client for publishing.
    client: AsyncClient,
    /// Configuration used for this connection.
    config: MqttBrokerConfig,
    /// Connection status.
    connected: AtomicBool,
    /// Number of publishes handed to the client.
    published: AtomicU64,
    /// Number of publishes the event loop has written out.
    written: watch::Receiver<u64>,
}

impl MqttBroker {
    /// Creates a new builder for configuring an MQTT broker connection.
    #[must_use]
    pub fn builder() -> MqttBrokerBuilder {
        MqttBrokerBuilder::default()
    }

    /// Returns whether the broker is currently connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Returns the host address of the broker.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.inner.config.host
    }

    /// Returns the port of the broker.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.inner.config.port
    }

    /// Subscribes to a topic filter.
    ///
    /// # Errors
    ///
    /// Returns error if the MQTT subscription fails.
    pub async fn subscribe(&self, filter: &str) -> Result<(), ProtocolError> {
        self.bounded(self.inner.client.subscribe(filter, QoS::AtLeastOnce))
            .await?
            .map_err(ProtocolError::Mqtt)?;
        tracing::info!(topic = %filter, "Subscribed");
        Ok(())
    }

    /// Disconnects from the broker.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect operation fails.
    pub async fn disconnect(&self) -> Result<(), ProtocolError> {
        tracing::info!(
            host = %self.inner.config.host,
            port = %self.inner.config.port,
            "Disconnecting from MQTT broker"
        );

        self.inner
            .client
            .disconnect()
            .await
            .map_err(ProtocolError::Mqtt)?;

        self.inner.connected.store(false, Ordering::Release);
        Ok(())
    }

    /// Runs `fut` under the configured publish timeout, if any.
    async fn bounded<F: Future>(&self, fut: F) -> Result<F::Output, ProtocolError> {
        match self.inner.config.publish_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                // Safe: configured timeouts never exceed u64::MAX milliseconds
                #[allow(clippy::cast_possible_truncation)]
                let ms = limit.as_millis() as u64;
                ProtocolError::Timeout(ms)
            }),
            None => Ok(fut.await),
        }
    }
}

impl Publisher for MqttBroker {
    async fn publish(&self, message: OutboundMessage) -> Result<(), ProtocolError> {
        tracing::debug!(
            topic = %message.topic,
            payload = %message.payload,
            retain = message.retain,
            "Publishing MQTT message"
        );

        self.bounded(self.inner.client.publish(
            message.topic,
            QoS::AtLeastOnce,
            message.retain,
            message.payload.into_bytes(),
        ))
        .await?
        .map_err(ProtocolError::Mqtt)?;

        self.inner.published.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    async fn flush(&self) -> Result<(), ProtocolError> {
        let target = self.inner.published.load(Ordering::Acquire);
        let mut written = self.inner.written.clone();

        self.bounded(async move { written.wait_for(|n| *n >= target).await.map(|_| ()) })
            .await?
            .map_err(|_| ProtocolError::ChannelClosed("MQTT event loop".to_string()))
    }
}

impl std::fmt::Debug for MqttBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttBroker")
            .field("host", &self.inner.config.host)
            .field("port", &self.inner.config.port)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Builder for creating an MQTT broker connection.
///
/// # Examples
///
/// ```no_run
/// use ambientika_relay::protocol::MqttBroker;
/// use std::time::Duration;
/// use tokio::sync::mpsc;
///
/// # async fn example() -> ambientika_relay::Result<()> {
/// let (tx, _rx) = mpsc::unbounded_channel();
/// let broker = MqttBroker::builder()
///     .host("192.168.1.50")
///     .port(1883)
///     .client_id("ambientika-1a2b3c")
///     .keep_alive(Duration::from_secs(60))
///     .connection_timeout(Duration::from_secs(5))
///     .build(tx)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MqttBrokerBuilder {
    config: MqttBrokerConfig,
}

impl MqttBrokerBuilder {
    /// Sets the broker host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the client id (default: `ambientika-relay-` plus a random suffix).
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.config.client_id = Some(id.into());
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.config.keep_alive = duration;
        self
    }

    /// Sets the connection timeout (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, duration: Duration) -> Self {
        self.config.connection_timeout = duration;
        self
    }

    /// Bounds every publish, subscribe and flush (default: unbounded).
    #[must_use]
    pub fn publish_timeout(mut self, duration: Duration) -> Self {
        self.config.publish_timeout = Some(duration);
        self
    }

    /// Builds and connects to the MQTT broker.
    ///
    /// Every message received afterwards is sent to `inbound`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Host is not set
    /// - Connection fails
    /// - Connection times out
    pub async fn build(
        self,
        inbound: mpsc::UnboundedSender<InboundRequest>,
    ) -> Result<MqttBroker, ProtocolError> {
        if self.config.host.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "MQTT broker host is required".to_string(),
            ));
        }

        let client_id = self
            .config
            .client_id
            .clone()
            .unwrap_or_else(|| random_client_id("ambientika-relay"));

        let mut mqtt_options = MqttOptions::new(&client_id, &self.config.host, self.config.port);
        mqtt_options.set_keep_alive(self.config.keep_alive);
        mqtt_options.set_clean_session(true);

        if let Some((ref username, ref password)) = self.config.credentials {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);
        let (written_tx, written_rx) = watch::channel(0_u64);

        let inner = MqttBrokerInner {
            client,
            config: self.config.clone(),
            connected: AtomicBool::new(false),
            published: AtomicU64::new(0),
            written: written_rx,
        };

        let broker = MqttBroker {
            inner: Arc::new(inner),
        };

        // Clone for event loop
        let broker_clone = broker.clone();

        // Channel to signal when ConnAck is received
        let (connack_tx, connack_rx) = oneshot::channel();

        tokio::spawn(async move {
            let events = EventHandler {
                broker: broker_clone,
                inbound,
                written: written_tx,
                connack: Some(connack_tx),
            };
            events.run(event_loop).await;
        });

        let timeout = self.config.connection_timeout;
        match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(())) => {
                tracing::info!(
                    host = %self.config.host,
                    port = %self.config.port,
                    client_id = %client_id,
                    "Connected to MQTT broker"
                );
            }
            Ok(Err(_)) => {
                return Err(ProtocolError::ConnectionFailed(
                    "MQTT event loop terminated unexpectedly".to_string(),
                ));
            }
            Err(_) => {
                return Err(ProtocolError::ConnectionFailed(format!(
                    "MQTT connection timeout after {}s",
                    timeout.as_secs()
                )));
            }
        }

        Ok(broker)
    }
}

/// State owned by the event loop task.
struct EventHandler {
    broker: MqttBroker,
    inbound: mpsc::UnboundedSender<InboundRequest>,
    written: watch::Sender<u64>,
    connack: Option<oneshot::Sender<()>>,
}

impl EventHandler {
    async fn run(mut self, mut event_loop: EventLoop) {
        use rumqttc::{Event, Outgoing, Packet};

        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                    tracing::debug!(?connack, "MQTT broker connected");
                    self.broker.inner.connected.store(true, Ordering::Release);
                    if let Some(tx) = self.connack.take() {
                        let _ = tx.send(());
                    }
                }
                Ok(Event::Incoming(Packet::SubAck(suback))) => {
                    tracing::debug!(?suback, "MQTT subscription acknowledged");
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let Ok(payload) = String::from_utf8(publish.payload.to_vec()) else {
                        tracing::debug!(topic = %publish.topic, "Ignoring non UTF-8 payload");
                        continue;
                    };
                    tracing::debug!(
                        topic = %publish.topic,
                        payload = %payload,
                        "MQTT message received"
                    );
                    if !enqueue(&self.inbound, InboundRequest::new(publish.topic, payload)) {
                        tracing::debug!("Inbound queue closed, stopping event loop");
                        break;
                    }
                }
                Ok(Event::Outgoing(Outgoing::Publish(_))) => {
                    self.written.send_modify(|n| *n += 1);
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    tracing::info!("MQTT broker disconnected");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "MQTT broker event loop error");
                    break;
                }
            }
        }

        self.broker.inner.connected.store(false, Ordering::Release);
    }
}

/// Queues a request for the dispatcher.
///
/// Returns `false` once the dispatcher has gone away.
fn enqueue(inbound: &mpsc::UnboundedSender<InboundRequest>, request: InboundRequest) -> bool {
    inbound.send(request).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_default_values() {
        let builder = MqttBrokerBuilder::default();
        assert_eq!(builder.config.port, 1883);
        assert!(builder.config.host.is_empty());
        assert!(builder.config.credentials.is_none());
        assert!(builder.config.client_id.is_none());
        assert_eq!(builder.config.keep_alive, Duration::from_secs(30));
        assert_eq!(builder.config.connection_timeout, Duration::from_secs(10));
        assert_eq!(builder.config.publish_timeout, None);
    }

    #[test]
    fn builder_chain() {
        let builder = MqttBrokerBuilder::default()
            .host("192.168.1.50")
            .port(8883)
            .credentials("admin", "secret")
            .client_id("vent-abc123")
            .keep_alive(Duration::from_secs(45))
            .connection_timeout(Duration::from_secs(15))
            .publish_timeout(Duration::from_secs(2));

        assert_eq!(builder.config.host, "192.168.1.50");
        assert_eq!(builder.config.port, 8883);
        assert_eq!(
            builder.config.credentials,
            Some(("admin".to_string(), "secret".to_string()))
        );
        assert_eq!(builder.config.client_id.as_deref(), Some("vent-abc123"));
        assert_eq!(builder.config.keep_alive, Duration::from_secs(45));
        assert_eq!(builder.config.connection_timeout, Duration::from_secs(15));
        assert_eq!(builder.config.publish_timeout, Some(Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn builder_missing_host_fails() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = MqttBrokerBuilder::default().build(tx).await;
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    #[test]
    fn random_client_ids_differ() {
        let a = random_client_id("vent");
        let b = random_client_id("vent");
        assert!(a.starts_with("vent-"));
        assert_eq!(a.len(), "vent-".len() + 6);
        assert_ne!(a, b);
    }

    /// A broker whose event loop is never polled, so nothing is ever written.
    fn stalled_broker(
        capacity: usize,
        publish_timeout: Duration,
    ) -> (MqttBroker, EventLoop, watch::Sender<u64>) {
        let options = MqttOptions::new("vent-test", "127.0.0.1", 1883);
        let (client, event_loop) = AsyncClient::new(options, capacity);
        let (written_tx, written_rx) = watch::channel(0_u64);
        let config = MqttBrokerConfig {
            host: "127.0.0.1".to_string(),
            publish_timeout: Some(publish_timeout),
            ..MqttBrokerConfig::default()
        };
        let broker = MqttBroker {
            inner: Arc::new(MqttBrokerInner {
                client,
                config,
                connected: AtomicBool::new(true),
                published: AtomicU64::new(0),
                written: written_rx,
            }),
        };
        (broker, event_loop, written_tx)
    }

    #[test]
    fn enqueue_keeps_every_request_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        for i in 0..200 {
            assert!(enqueue(&tx, InboundRequest::new("vent/level/set", i.to_string())));
        }

        let delivered: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|r| r.payload)
            .collect();
        let expected: Vec<String> = (0..200).map(|i: i32| i.to_string()).collect();
        assert_eq!(delivered, expected);
    }

    #[test]
    fn enqueue_reports_closed_queue() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        assert!(!enqueue(&tx, InboundRequest::new("vent/mode/set", "Auto")));
    }

    #[tokio::test(start_paused = true)]
    async fn flush_times_out_when_nothing_is_written() {
        let (broker, _event_loop, _written) = stalled_broker(10, Duration::from_millis(200));

        broker
            .publish(OutboundMessage::new("ir", "0x9669 0xD728 2", false))
            .await
            .unwrap();
        let err = broker.flush().await.unwrap_err();

        assert!(matches!(err, ProtocolError::Timeout(200)));
    }

    #[tokio::test(start_paused = true)]
    async fn publish_times_out_when_client_queue_is_full() {
        let (broker, _event_loop, _written) = stalled_broker(1, Duration::from_millis(300));

        broker
            .publish(OutboundMessage::new("ir", "0x9669 0xD728 2", false))
            .await
            .unwrap();
        let err = broker
            .publish(OutboundMessage::new("ir", "0x9669 0xD52A 2", false))
            .await
            .unwrap_err();

        assert!(matches!(err, ProtocolError::Timeout(300)));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_transport_ends_dispatcher() {
        use crate::dispatcher::Dispatcher;
        use crate::error::Error;
        use crate::protocol::Topics;
        use crate::sequencer::{Sequencer, SequencerConfig};

        let (broker, _event_loop, _written) = stalled_broker(10, Duration::from_millis(200));
        let sequencer = Sequencer::new(
            broker,
            Topics::new("vent", "ir"),
            SequencerConfig::default(),
        );
        let mut dispatcher = Dispatcher::new(sequencer);

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(InboundRequest::new("vent/mode/set", "Auto")).unwrap();

        let err = dispatcher.run(rx).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::Timeout(200))));
        assert_eq!(dispatcher.sequencer().state().mode(), None);
    }
}
