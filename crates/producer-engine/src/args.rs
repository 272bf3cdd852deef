//! CLI argument definitions for the producer.

use crate::client::KafkaClientConfig;
use crate::emitter::{EmitConfig, DEFAULT_MESSAGE_COUNT, DEFAULT_SEND_TIMEOUT};
use crate::error::ProducerError;
use crate::pacing::Pacing;
use crate::topic::{TopicSpec, DEFAULT_PARTITIONS, DEFAULT_REPLICATION_FACTOR};
use crate::weights::PartitionWeights;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Producer arguments.
#[derive(Args, Clone, Debug)]
pub struct ProducerArgs {
    /// Kafka brokers (comma-separated, e.g., "localhost:9092")
    #[arg(long, env = "KAFKA_BROKERS", default_value = "kafka-cluster-kafka-bootstrap:9092")]
    pub brokers: String,

    /// Kafka topic to produce messages to
    #[arg(long, env = "PRODUCER_TOPIC", default_value = "test-topic")]
    pub topic: String,

    /// Number of messages to produce
    #[arg(long, default_value_t = DEFAULT_MESSAGE_COUNT)]
    pub messages: u64,

    /// Delay in milliseconds between each message
    #[arg(long, default_value = "0")]
    pub delay: u64,

    /// Random delay between 0 and this many milliseconds (0 disables, overrides --delay)
    #[arg(long, default_value = "0")]
    pub random_delay: u64,

    /// First message number to start from
    #[arg(long, default_value = "0")]
    pub start_from: u64,

    /// Steer messages to partitions with the built-in skewed weight table
    /// instead of the client's partitioner
    #[arg(long)]
    pub weighted: bool,

    /// Partition count used when creating the topic
    #[arg(long, default_value_t = DEFAULT_PARTITIONS)]
    pub partitions: i32,

    /// Replication factor used when creating the topic
    #[arg(long, default_value_t = DEFAULT_REPLICATION_FACTOR)]
    pub replication_factor: i32,

    /// Deadline for each individual send, in milliseconds
    #[arg(long, default_value_t = DEFAULT_SEND_TIMEOUT.as_millis() as u64)]
    pub send_timeout_ms: u64,

    /// How long the client may keep a message queued before failing it, in milliseconds
    #[arg(long, default_value = "5000")]
    pub message_timeout_ms: u64,

    /// Random seed for reproducible partition draws and delays (default: OS entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Extra Kafka client property, repeatable (e.g. sasl.mechanism=PLAIN)
    #[arg(long = "producer-property", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub producer_properties: Vec<(String, String)>,

    /// Dry-run mode: validate and log the configuration without contacting the brokers
    #[arg(long)]
    pub dry_run: bool,
}

impl ProducerArgs {
    pub fn topic_spec(&self) -> Result<TopicSpec, ProducerError> {
        TopicSpec::new(&self.topic, self.partitions, self.replication_factor)
    }

    pub fn emit_config(&self) -> Result<EmitConfig, ProducerError> {
        let mut config = EmitConfig::new(&self.topic, self.messages)
            .with_start_from(self.start_from)
            .with_pacing(Pacing::from_millis(self.delay, self.random_delay))
            .with_send_timeout(Duration::from_millis(self.send_timeout_ms));
        if self.weighted {
            config = config.with_weighting(PartitionWeights::default());
        }
        config.validate()?;
        Ok(config)
    }

    pub fn client_config(&self) -> KafkaClientConfig {
        let mut config = KafkaClientConfig::new(&self.brokers);
        config.properties = self.producer_properties.clone();
        config.message_timeout = Duration::from_millis(self.message_timeout_ms);
        config
    }

    /// Entropy for partition draws and random delays.
    pub fn entropy(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Parse a `key=value` client property.
pub fn parse_property(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty property key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
