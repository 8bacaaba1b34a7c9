// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ambientika-relay` daemon.

use std::path::PathBuf;

use ambientika_relay::config::{self, Config};
use ambientika_relay::discovery;
use ambientika_relay::protocol::{MqttBroker, random_client_id};
use ambientika_relay::{Dispatcher, Sequencer};
use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Relays MQTT mode and level requests to an Ambientika unit over IR.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path of the configuration file.
    #[arg(short, long, default_value = config::DEFAULT_PATH)]
    config: PathBuf,

    /// Maximum log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value_t = Level::INFO)]
    log_level: Level,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .init();

    let config = Config::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    tracing::info!(
        name = %config.general.name,
        topic = %config.mqtt.topic,
        ir_topic = %config.mqtt.ir_topic,
        "Daemon is starting"
    );

    let result = run(config).await;
    if let Err(e) = &result {
        tracing::error!("Fatal error: {e:#}");
    }
    tracing::info!("Daemon is exiting");
    result
}

async fn run(config: Config) -> anyhow::Result<()> {
    let topics = config.topics();
    let (tx, rx) = mpsc::unbounded_channel();

    let mut builder = MqttBroker::builder()
        .host(config.mqtt.host.as_str())
        .port(config.mqtt.port)
        .client_id(random_client_id(&config.general.name.to_lowercase()))
        .keep_alive(config.keep_alive());
    if let Some((username, password)) = config.credentials() {
        builder = builder.credentials(username, password);
    }
    if let Some(limit) = config.publish_timeout() {
        builder = builder.publish_timeout(limit);
    }

    let broker = builder.build(tx).await.with_context(|| {
        format!(
            "failed to connect to {}:{}",
            config.mqtt.host, config.mqtt.port
        )
    })?;

    broker.subscribe(&topics.subscription()).await?;

    if let Some(identity) = config.discovery_config() {
        discovery::announce(&broker, &identity, &topics).await?;
    }

    let sequencer = Sequencer::new(broker.clone(), topics, config.sequencer_config());
    let mut dispatcher = Dispatcher::new(sequencer);

    let outcome = tokio::select! {
        result = dispatcher.run(rx) => result.map_err(anyhow::Error::from),
        signal = shutdown_signal() => {
            tracing::info!(signal, "Received shutdown signal");
            Ok(())
        }
    };

    if let Err(e) = broker.disconnect().await {
        tracing::debug!(error = %e, "Disconnect failed");
    }
    outcome
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let Ok(mut term) = signal(SignalKind::terminate()) else {
        let _ = tokio::signal::ctrl_c().await;
        return "SIGINT";
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = term.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "SIGINT"
}
