//! Sequential send loop.
//!
//! The [`Emitter`] sends exactly `count` messages, one at a time. Each send is
//! bounded by its own deadline; a failed or timed out send is logged and
//! counted, and the loop moves on to the next sequence number. After every
//! send the configured [`Pacing`] is applied on the same task, so send-to-send
//! intervals are the configured delay plus send latency.

use crate::client::{BrokerClient, Delivery, Message};
use crate::error::{ProducerError, SendError};
use crate::pacing::Pacing;
use crate::random::RandomSource;
use crate::weights::PartitionWeights;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Default per-send deadline.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Default number of messages per run.
pub const DEFAULT_MESSAGE_COUNT: u64 = 1000;

/// Settings for one emission run.
#[derive(Debug, Clone)]
pub struct EmitConfig {
    pub topic: String,
    /// Number of messages to send.
    pub count: u64,
    /// Sequence number of the first message.
    pub start_from: u64,
    pub pacing: Pacing,
    /// Weight table for explicit partition assignment. `None` leaves the
    /// choice to the client's partitioner.
    pub weighting: Option<PartitionWeights>,
    pub send_timeout: Duration,
}

impl EmitConfig {
    pub fn new(topic: impl Into<String>, count: u64) -> Self {
        Self {
            topic: topic.into(),
            count,
            start_from: 0,
            pacing: Pacing::default(),
            weighting: None,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_start_from(mut self, start_from: u64) -> Self {
        self.start_from = start_from;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_weighting(mut self, weighting: PartitionWeights) -> Self {
        self.weighting = Some(weighting);
        self
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Sequence number carried by the last message, `None` for an empty run.
    pub fn last_sequence(&self) -> Option<u64> {
        self.count
            .checked_sub(1)
            .and_then(|n| self.start_from.checked_add(n))
    }

    /// Reject settings the loop cannot honor: a zero send deadline, or a
    /// sequence range that runs past `u64::MAX`.
    pub fn validate(&self) -> Result<(), ProducerError> {
        if self.send_timeout.is_zero() {
            return Err(ProducerError::Config(
                "send timeout must be greater than 0".to_string(),
            ));
        }
        if self.count > 0 && self.last_sequence().is_none() {
            return Err(ProducerError::Config(format!(
                "{} messages starting at sequence {} overflow the sequence range",
                self.count, self.start_from
            )));
        }
        Ok(())
    }
}

/// Counters collected over a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitMetrics {
    /// Sends attempted, always equal to the configured count after a run.
    pub attempted: u64,
    /// Sends acknowledged by the broker.
    pub delivered: u64,
    /// Sends that failed for any reason, including timeouts.
    pub failed: u64,
    /// Subset of `failed` that hit the per-send deadline.
    pub timed_out: u64,
    pub total_duration: Duration,
}

impl EmitMetrics {
    /// Calculate attempted sends per second.
    pub fn messages_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.attempted as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Drives the send loop against a [`BrokerClient`].
pub struct Emitter<'a, C: BrokerClient + ?Sized, R: RandomSource> {
    client: &'a C,
    config: EmitConfig,
    entropy: R,
}

impl<'a, C: BrokerClient + ?Sized, R: RandomSource> Emitter<'a, C, R> {
    pub fn new(client: &'a C, config: EmitConfig, entropy: R) -> Self {
        Self {
            client,
            config,
            entropy,
        }
    }

    pub fn entropy(&self) -> &R {
        &self.entropy
    }

    /// Send all messages and return the run's counters.
    ///
    /// Send failures never end the run early.
    pub async fn run(&mut self) -> EmitMetrics {
        let start_time = Instant::now();
        let mut metrics = EmitMetrics::default();

        info!(
            "Producing {} messages to topic '{}' starting at sequence {} ({} partitioning)",
            self.config.count,
            self.config.topic,
            self.config.start_from,
            if self.config.weighting.is_some() {
                "weighted"
            } else {
                "client"
            }
        );

        for offset in 0..self.config.count {
            let sequence = self.config.start_from.saturating_add(offset);
            let partition = match &self.config.weighting {
                Some(weights) => Some(weights.choose(&mut self.entropy)),
                None => None,
            };
            let message = Message::sequenced(&self.config.topic, sequence, partition);

            match self.send_with_deadline(&message).await {
                Ok(delivery) => {
                    metrics.delivered += 1;
                    info!(
                        "produced message to topic {} partition {} offset {}: {}",
                        message.topic,
                        delivery.partition,
                        delivery.offset,
                        message.payload_str()
                    );
                }
                Err(err) => {
                    metrics.failed += 1;
                    if err.is_timeout() {
                        metrics.timed_out += 1;
                    }
                    error!("failed to produce message {}: {}", sequence, err);
                }
            }
            metrics.attempted += 1;

            if let Some(pause) = self.config.pacing.pause(&mut self.entropy).await {
                debug!("Paused {:?} after message {}", pause, sequence);
            }
        }

        metrics.total_duration = start_time.elapsed();

        info!(
            "Finished producing messages: {} delivered, {} failed ({} timed out) in {:?} ({:.2} msg/sec)",
            metrics.delivered,
            metrics.failed,
            metrics.timed_out,
            metrics.total_duration,
            metrics.messages_per_second()
        );

        metrics
    }

    /// Send one message under the per-send deadline. The deadline is created
    /// right before the send and dropped together with the send future.
    async fn send_with_deadline(&self, message: &Message) -> Result<Delivery, SendError> {
        let deadline = self.config.send_timeout;
        match tokio::time::timeout(deadline, self.client.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(SendError::Timeout(deadline)),
        }
    }
}
