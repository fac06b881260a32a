use crate::config::SimulatorConfig;
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS, Transport,
};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Fatal at startup: the publisher never enters the tick loop without a
/// connected sink.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("transport error while connecting: {0}")]
    Connection(#[from] rumqttc::ConnectionError),
    #[error("broker refused the connection: {0:?}")]
    Refused(ConnectReturnCode),
    #[error("timed out waiting for broker acknowledgement")]
    Timeout,
}

/// Non-fatal: reported per message, the tick carries on.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish request not accepted: {0}")]
    Client(#[from] rumqttc::ClientError),
    #[error("sink rejected message on {topic}")]
    Rejected { topic: String },
}

/// The publisher's only view of the transport. Publishes are
/// fire-and-forget: a returned `Ok` means the message was handed to the
/// transport, not that it was delivered.
pub trait TelemetrySink {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;

    /// Best-effort shutdown notification to the broker.
    fn disconnect(&mut self);
}

/// MQTT sink backed by rumqttc. The event loop runs in a background task
/// the simulation core never touches; delivery, keep-alive and reconnect
/// concerns stay there.
pub struct MqttSink {
    client: AsyncClient,
    poll_task: JoinHandle<()>,
}

impl MqttSink {
    /// Establish the broker session and wait for its acknowledgement.
    /// Only returns once the broker has accepted the connection, so a
    /// startup failure surfaces here rather than on the first publish.
    pub async fn connect(config: &SimulatorConfig) -> Result<Self, ConnectError> {
        let mut options = MqttOptions::new(&config.client_id, &config.broker, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_s));
        options.set_clean_session(true);

        if config.tls {
            options.set_transport(Transport::tls_with_default_config());
        }
        if let Some((username, password)) = config.credentials() {
            options.set_credentials(username, password);
        }

        let (client, mut event_loop) = AsyncClient::new(options, EVENT_CHANNEL_CAPACITY);

        let code = tokio::time::timeout(CONNECT_TIMEOUT, wait_for_connack(&mut event_loop))
            .await
            .map_err(|_| ConnectError::Timeout)??;

        if code != ConnectReturnCode::Success {
            return Err(ConnectError::Refused(code));
        }

        info!("connected to mqtt broker {}:{}", config.broker, config.port);

        // The event loop must keep polling for the session to stay alive;
        // it also drives reconnects after transient transport errors.
        let poll_task = tokio::spawn(async move {
            loop {
                if let Err(e) = event_loop.poll().await {
                    warn!("mqtt transport error: {}", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        });

        Ok(Self { client, poll_task })
    }
}

impl TelemetrySink for MqttSink {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)?;
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Err(e) = self.client.try_disconnect() {
            warn!("mqtt disconnect failed: {}", e);
        }
        self.poll_task.abort();
    }
}

async fn wait_for_connack(event_loop: &mut EventLoop) -> Result<ConnectReturnCode, ConnectError> {
    loop {
        if let Event::Incoming(Packet::ConnAck(ack)) = event_loop.poll().await? {
            return Ok(ack.code);
        }
    }
}
