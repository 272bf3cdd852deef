//! Message emission engine for the demo producer.
//!
//! This crate provisions a Kafka topic and then sends a fixed number of
//! sequenced messages to it, optionally skewing them across partitions with a
//! static weight table and pacing the sends with a fixed or random delay. It
//! exists to exercise brokers (partition skew, broker loss, throughput under
//! delay), not to carry real traffic.
//!
//! # Architecture
//!
//! ```text
//!   ProducerArgs (CLI)
//!          │
//!          ▼
//!   ┌──────────────┐    create_topic    ┌─────────────────┐
//!   │ ensure_topic │ ─────────────────▶ │                 │
//!   └──────┬───────┘                    │  BrokerClient   │
//!          │                            │  (KafkaClient)  │
//!          ▼                            │                 │
//!   ┌──────────────┐    send + deadline │                 │
//!   │   Emitter    │ ─────────────────▶ │                 │
//!   │              │                    └─────────────────┘
//!   │ - weights    │
//!   │ - pacing     │
//!   └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use demo_producer_engine::{
//!     run_producer, EmitConfig, KafkaClient, KafkaClientConfig, PartitionWeights, TopicSpec,
//! };
//! use rand::SeedableRng;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = KafkaClient::new(KafkaClientConfig::new("localhost:9092"))?;
//!     let spec = TopicSpec::new("test-topic", 12, 3)?;
//!     let config = EmitConfig::new("test-topic", 1000).with_weighting(PartitionWeights::default());
//!
//!     let summary = run_producer(&client, &spec, config, rand::rngs::StdRng::seed_from_u64(42)).await?;
//!     println!("{} delivered", summary.metrics.delivered);
//!     Ok(())
//! }
//! ```

pub mod args;
pub mod client;
pub mod emitter;
pub mod error;
pub mod pacing;
pub mod random;
pub mod run;
pub mod topic;
pub mod weights;

// Re-exports for convenience
pub use args::ProducerArgs;
pub use client::{BrokerClient, Delivery, KafkaClient, KafkaClientConfig, Message, TopicCreated};
pub use emitter::{EmitConfig, EmitMetrics, Emitter, DEFAULT_SEND_TIMEOUT};
pub use error::{AdminError, ProducerError, SendError};
pub use pacing::Pacing;
pub use random::RandomSource;
pub use run::{run_producer, RunSummary};
pub use topic::{ensure_topic, ProvisionResult, TopicSpec};
pub use weights::{PartitionWeights, WeightBand, DEFAULT_WEIGHTS};
