//! Error types for the producer engine.

use std::time::Duration;
use thiserror::Error;

/// Errors that stop a run before or outside the emission loop.
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// Topic creation rejected for a reason other than "already exists"
    #[error("Topic creation error: {0}")]
    TopicCreation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors returned by the broker admin capability when creating a topic.
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Topic '{0}' already exists")]
    AlreadyExists(String),

    #[error("{0}")]
    Other(String),
}

/// Errors for a single send. These never abort the emission loop.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("send did not complete within {0:?}")]
    Timeout(Duration),

    #[error("broker error: {0}")]
    Broker(#[from] rdkafka::error::KafkaError),
}

impl SendError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SendError::Timeout(_))
    }
}
