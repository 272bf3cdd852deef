//! Command-line interface for demo-producer
//!
//! # Usage Examples
//!
//! ```bash
//! # 1000 messages, client-side partitioning, no pause
//! demo-producer --brokers localhost:9092 --topic test-topic
//!
//! # Skewed partitions, random pause of up to 50ms between sends
//! demo-producer --weighted --random-delay 50 --messages 10000
//!
//! # Continue a previous run's numbering with a fixed 100ms pause
//! demo-producer --start-from 1000 --delay 100
//!
//! # SASL credentials passed straight to the Kafka client
//! demo-producer \
//!   --producer-property security.protocol=SASL_PLAINTEXT \
//!   --producer-property sasl.mechanism=PLAIN \
//!   --producer-property sasl.username=admin \
//!   --producer-property sasl.password=admin-secret
//! ```

use anyhow::Context;
use clap::Parser;
use demo_producer_engine::{run_producer, KafkaClient, ProducerArgs};

#[derive(Parser)]
#[command(name = "demo-producer")]
#[command(about = "Synthetic Kafka load generator with weighted partition skew")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    args: ProducerArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let args = cli.args;

    let spec = args.topic_spec().context("Invalid topic configuration")?;
    let config = args.emit_config().context("Invalid producer configuration")?;
    if let Some(weights) = &config.weighting {
        weights
            .check_fits(spec.partitions)
            .context("Invalid partition weighting")?;
    }

    if args.dry_run {
        tracing::info!("[DRY-RUN] Brokers: {}", args.brokers);
        tracing::info!(
            "[DRY-RUN] Topic {} ({} partitions, replication factor {})",
            spec.name,
            spec.partitions,
            spec.replication_factor
        );
        tracing::info!(
            "[DRY-RUN] Would produce {} messages starting at {} (weighted={}, pacing={:?}, send timeout={:?})",
            config.count,
            config.start_from,
            config.weighting.is_some(),
            config.pacing,
            config.send_timeout
        );
        tracing::info!(
            "[DRY-RUN] {} extra client properties",
            args.producer_properties.len()
        );
        return Ok(());
    }

    let client =
        KafkaClient::new(args.client_config()).context("Failed to create Kafka client")?;

    let summary = run_producer(&client, &spec, config, args.entropy())
        .await
        .context("Producer run failed")?;

    tracing::debug!(
        "Run complete: topic created={}, {}/{} messages delivered",
        summary.provision.created,
        summary.metrics.delivered,
        summary.metrics.attempted
    );

    Ok(())
}
