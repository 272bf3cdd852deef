//! Idempotent topic provisioning.

use crate::client::BrokerClient;
use crate::error::{AdminError, ProducerError};
use tracing::{info, warn};

/// Default shape of the load-test topic.
pub const DEFAULT_PARTITIONS: i32 = 12;
pub const DEFAULT_REPLICATION_FACTOR: i32 = 3;

/// Name and shape of the topic to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub name: String,
    pub partitions: i32,
    pub replication_factor: i32,
}

impl TopicSpec {
    pub fn new(
        name: impl Into<String>,
        partitions: i32,
        replication_factor: i32,
    ) -> Result<Self, ProducerError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ProducerError::Config("topic name must not be empty".into()));
        }
        if partitions < 1 {
            return Err(ProducerError::Config(format!(
                "partition count must be at least 1, got {partitions}"
            )));
        }
        if replication_factor < 1 {
            return Err(ProducerError::Config(format!(
                "replication factor must be at least 1, got {replication_factor}"
            )));
        }
        Ok(Self {
            name,
            partitions,
            replication_factor,
        })
    }
}

/// Outcome of [`ensure_topic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionResult {
    /// `true` only when this call created the topic.
    pub created: bool,
}

/// Make sure `spec` exists on the cluster.
///
/// "Already exists" counts as success and an existing topic is never
/// reshaped. Any other rejection is returned as
/// [`ProducerError::TopicCreation`] and should end the run.
pub async fn ensure_topic<C>(client: &C, spec: &TopicSpec) -> Result<ProvisionResult, ProducerError>
where
    C: BrokerClient + ?Sized,
{
    match client.create_topic(spec).await {
        Ok(created) => match created.result_error {
            None => {
                info!(
                    "Created topic {} ({} partitions, replication factor {})",
                    created.name, spec.partitions, spec.replication_factor
                );
                Ok(ProvisionResult { created: true })
            }
            Some(err) => {
                warn!("Failed to create topic {}: {}", created.name, err);
                Ok(ProvisionResult { created: false })
            }
        },
        Err(AdminError::AlreadyExists(name)) => {
            info!("Topic {} already exists", name);
            Ok(ProvisionResult { created: false })
        }
        Err(AdminError::Other(err)) => Err(ProducerError::TopicCreation(format!(
            "failed to create topic {}: {err}",
            spec.name
        ))),
    }
}
