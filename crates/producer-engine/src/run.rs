//! Provision-then-emit runner.

use crate::client::BrokerClient;
use crate::emitter::{EmitConfig, EmitMetrics, Emitter};
use crate::error::ProducerError;
use crate::random::RandomSource;
use crate::topic::{ensure_topic, ProvisionResult, TopicSpec};

/// What a completed run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub provision: ProvisionResult,
    pub metrics: EmitMetrics,
}

/// Provision `spec`, then send every message described by `config`.
///
/// Configuration problems and provisioning failures are returned before any
/// message is sent. Once the loop starts the run always completes.
pub async fn run_producer<C, R>(
    client: &C,
    spec: &TopicSpec,
    config: EmitConfig,
    entropy: R,
) -> Result<RunSummary, ProducerError>
where
    C: BrokerClient + ?Sized,
    R: RandomSource,
{
    if config.topic != spec.name {
        return Err(ProducerError::Config(format!(
            "emit topic '{}' does not match provisioned topic '{}'",
            config.topic, spec.name
        )));
    }
    config.validate()?;
    if let Some(weights) = &config.weighting {
        weights.check_fits(spec.partitions)?;
    }

    let provision = ensure_topic(client, spec).await?;
    let metrics = Emitter::new(client, config, entropy).run().await;

    Ok(RunSummary { provision, metrics })
}
