//! Broker client capability and its Kafka implementation.
//!
//! The emission engine only needs two things from a broker: create a topic and
//! send one message. [`BrokerClient`] captures that contract so the provisioner
//! and the emission loop can run against [`KafkaClient`] in production and
//! against in-memory clients in tests.

use crate::error::{AdminError, ProducerError, SendError};
use crate::topic::TopicSpec;
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication, TopicResult};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::RDKafkaErrorCode;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;
use std::time::Duration;
use tracing::{debug, warn};

const PAYLOAD_PREFIX: &str = "Hello, Kafka! Message ";

/// Property keys (or key prefixes) that only a producer understands. They are
/// left out of the admin client's configuration.
const PRODUCER_ONLY_PROPERTIES: &[&str] = &[
    "acks",
    "request.required.acks",
    "enable.idempotence",
    "enable.gapless.guarantee",
    "transactional.id",
    "transaction.timeout.ms",
    "message.timeout.ms",
    "delivery.timeout.ms",
    "request.timeout.ms",
    "linger.ms",
    "queue.buffering.",
    "batch.",
    "compression.",
    "retries",
    "message.send.max.retries",
    "retry.backoff.",
    "partitioner",
    "sticky.partitioning.linger.ms",
];

fn is_producer_only(key: &str) -> bool {
    PRODUCER_ONLY_PROPERTIES.iter().any(|p| {
        if p.ends_with('.') {
            key.starts_with(p)
        } else {
            key == *p
        }
    })
}

/// Render the payload for a logical sequence number.
pub fn sequence_payload(sequence: u64) -> String {
    format!("{PAYLOAD_PREFIX}{sequence}")
}

/// Recover the sequence number from a payload built by [`sequence_payload`].
pub fn parse_sequence(payload: &[u8]) -> Option<u64> {
    std::str::from_utf8(payload)
        .ok()?
        .strip_prefix(PAYLOAD_PREFIX)?
        .parse()
        .ok()
}

/// A single message handed to the broker client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: Vec<u8>,
    /// Explicit target partition. `None` defers to the client's partitioner.
    pub partition: Option<i32>,
}

impl Message {
    /// Build the message carrying sequence number `sequence`.
    pub fn sequenced(topic: &str, sequence: u64, partition: Option<i32>) -> Self {
        Self {
            topic: topic.to_string(),
            payload: sequence_payload(sequence).into_bytes(),
            partition,
        }
    }

    /// Payload as text, for log lines.
    pub fn payload_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Where the broker stored an acknowledged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub partition: i32,
    pub offset: i64,
}

/// Successful create-topic response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicCreated {
    pub name: String,
    /// Result-level error reported alongside an otherwise successful response.
    pub result_error: Option<String>,
}

/// Minimal broker capability consumed by the provisioner and emission loop.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Create `spec` on the cluster.
    async fn create_topic(&self, spec: &TopicSpec) -> Result<TopicCreated, AdminError>;

    /// Send one message and wait for the broker acknowledgement.
    ///
    /// Implementations do not need to enforce the per-send deadline; the
    /// emission loop wraps every call in its own timeout.
    async fn send(&self, message: &Message) -> Result<Delivery, SendError>;
}

/// Connection settings for [`KafkaClient`].
#[derive(Debug, Clone)]
pub struct KafkaClientConfig {
    /// Comma-separated bootstrap servers
    pub brokers: String,
    /// Extra client properties applied verbatim after the defaults
    /// (e.g. `security.protocol`, `sasl.mechanism`).
    pub properties: Vec<(String, String)>,
    /// Upper bound librdkafka keeps a message queued before failing it.
    pub message_timeout: Duration,
    /// Broker-side timeout for create-topic requests.
    pub admin_timeout: Duration,
}

impl KafkaClientConfig {
    pub fn new(brokers: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            properties: Vec::new(),
            message_timeout: Duration::from_secs(5),
            admin_timeout: Duration::from_secs(10),
        }
    }

    fn base(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config.set("bootstrap.servers", &self.brokers);
        config
    }

    fn apply_properties(&self, config: &mut ClientConfig, producer: bool) {
        for (key, value) in &self.properties {
            if producer || !is_producer_only(key) {
                config.set(key, value);
            }
        }
    }

    /// Producer settings.
    ///
    /// Only the partition leader has to acknowledge a write and idempotent
    /// writes are off, so sends keep flowing (and failing visibly) while
    /// individual brokers are taken down.
    pub fn producer_config(&self) -> ClientConfig {
        let mut config = self.base();
        config
            .set("acks", "1")
            .set("enable.idempotence", "false")
            .set("allow.auto.create.topics", "true")
            .set(
                "message.timeout.ms",
                self.message_timeout.as_millis().to_string(),
            );
        self.apply_properties(&mut config, true);
        config
    }

    /// Admin settings: bootstrap servers plus every extra property that is
    /// not producer-specific (security, SASL, client id and so on).
    pub fn admin_config(&self) -> ClientConfig {
        let mut config = self.base();
        self.apply_properties(&mut config, false);
        config
    }
}

/// Turn the per-topic results of a create-topics request into the outcome for
/// `topic`.
///
/// "Already exists" is reported as [`AdminError::AlreadyExists`]. Any other
/// per-topic error code rides along as a result-level error on an otherwise
/// successful response; only request-level failures become
/// [`AdminError::Other`], and those are handled by the caller.
pub fn topic_creation_outcome(
    topic: &str,
    results: Vec<TopicResult>,
) -> Result<TopicCreated, AdminError> {
    let result = results.into_iter().find(|r| match r {
        Ok(name) => name == topic,
        Err((name, _)) => name == topic,
    });

    match result {
        Some(Ok(name)) => Ok(TopicCreated {
            name,
            result_error: None,
        }),
        Some(Err((name, RDKafkaErrorCode::TopicAlreadyExists))) => {
            Err(AdminError::AlreadyExists(name))
        }
        Some(Err((name, code))) => Ok(TopicCreated {
            name,
            result_error: Some(code.to_string()),
        }),
        None => Ok(TopicCreated {
            name: topic.to_string(),
            result_error: Some("broker returned no per-topic result".to_string()),
        }),
    }
}

/// [`BrokerClient`] backed by rdkafka.
///
/// Both underlying clients are created once and released when this value is
/// dropped. Dropping also flushes whatever the producer still has queued,
/// bounded by the configured message timeout.
pub struct KafkaClient {
    producer: FutureProducer,
    admin: AdminClient<DefaultClientContext>,
    config: KafkaClientConfig,
}

impl KafkaClient {
    pub fn new(config: KafkaClientConfig) -> Result<Self, ProducerError> {
        let producer: FutureProducer = config.producer_config().create()?;
        let admin: AdminClient<DefaultClientContext> = config.admin_config().create()?;

        debug!("Created Kafka clients for brokers {}", config.brokers);

        Ok(Self {
            producer,
            admin,
            config,
        })
    }
}

impl Drop for KafkaClient {
    fn drop(&mut self) {
        if let Err(e) = self.producer.flush(self.config.message_timeout) {
            warn!("Failed to flush Kafka producer on shutdown: {e}");
        }
    }
}

#[async_trait]
impl BrokerClient for KafkaClient {
    async fn create_topic(&self, spec: &TopicSpec) -> Result<TopicCreated, AdminError> {
        let new_topic = NewTopic::new(
            &spec.name,
            spec.partitions,
            TopicReplication::Fixed(spec.replication_factor),
        );
        let opts = AdminOptions::new().operation_timeout(Some(self.config.admin_timeout));

        let results = self
            .admin
            .create_topics(&[new_topic], &opts)
            .await
            .map_err(|e| AdminError::Other(format!("create topics request failed: {e}")))?;

        topic_creation_outcome(&spec.name, results)
    }

    async fn send(&self, message: &Message) -> Result<Delivery, SendError> {
        let mut record =
            FutureRecord::<(), [u8]>::to(&message.topic).payload(message.payload.as_slice());
        if let Some(partition) = message.partition {
            record = record.partition(partition);
        }

        let (partition, offset) = self
            .producer
            .send(record, self.config.message_timeout)
            .await
            .map_err(|(err, _)| SendError::Broker(err))?;

        Ok(Delivery { partition, offset })
    }
}
