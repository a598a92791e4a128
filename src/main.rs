use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dialogflow_teams::{Config, MessageBatch, MessageConverter, TeamsConverter};

const DEFAULT_CONFIG: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the converted batch
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dialogflow_teams=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let config_arg = args.next();
    let input_arg = args.next();

    let config = load_config(config_arg.as_deref())?;
    info!(
        "Target platform: {}, malformed messages: {}",
        config.converter.target_platform, config.converter.on_malformed
    );

    let raw = read_input(input_arg.as_deref()).await?;
    let batch: MessageBatch =
        serde_json::from_str(&raw).context("Input is not a Dialogflow message batch")?;
    let messages = batch.into_messages();
    info!("Read {} fulfillment messages", messages.len());

    let converter = TeamsConverter::from_config(&config.converter);
    let converted = converter
        .convert(None, &messages)
        .await
        .context("Failed to convert message batch")?;
    info!("Writing {} Teams messages", converted.len());

    let mut output =
        serde_json::to_string_pretty(&converted).context("Failed to serialize Teams messages")?;
    output.push('\n');

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(output.as_bytes())
        .await
        .context("Failed to write output")?;
    stdout.flush().await.context("Failed to flush output")?;

    Ok(())
}

/// An explicit path must exist; the default one is optional.
fn load_config(arg: Option<&str>) -> Result<Config> {
    match arg {
        Some(path) => {
            let path = PathBuf::from(path);
            info!("Loading configuration from: {}", path.display());
            Config::load(&path)
        }
        None => {
            let path = Path::new(DEFAULT_CONFIG);
            if path.exists() {
                info!("Loading configuration from: {}", path.display());
                Config::load(path)
            } else {
                info!("No {} found, using defaults", DEFAULT_CONFIG);
                Ok(Config::default())
            }
        }
    }
}

async fn read_input(arg: Option<&str>) -> Result<String> {
    match arg {
        None | Some("-") => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read messages from stdin")?;
            Ok(buf)
        }
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read messages from {}", path)),
    }
}
