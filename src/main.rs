use anyhow::Context;
use fact_pipeline::config::{LogFormat, LoggingConfig, MetricsConfig};
use fact_pipeline::metrics::METRICS;
use fact_pipeline::{init_pipeline, CommitOutcome, Config};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn emit_metrics(config: &MetricsConfig) {
    let exported = METRICS.export_prometheus();
    if config.print_on_exit {
        print!("{}", exported);
    } else {
        debug!("Run metrics:\n{}", exported);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let pipeline = init_pipeline(&config).context("Failed to initialize pipeline")?;
    info!("Available tools: {:?}", pipeline.tools.list());

    let result = pipeline.controller.run().await;
    emit_metrics(&config.metrics);
    let report = result.context("Fact pipeline run failed")?;

    match report.outcome {
        CommitOutcome::Committed => println!("new fact added: {}", report.fact),
        CommitOutcome::Rejected => println!("fact rejected: {}", report.fact),
    }
    if let Some(fallback) = &report.fallback {
        println!("known fact: {}", fallback);
    }

    let known: Vec<String> = pipeline
        .store
        .snapshot()
        .into_iter()
        .map(|f| f.into_inner())
        .collect();
    println!("known facts are: {:?}", known);

    Ok(())
}
