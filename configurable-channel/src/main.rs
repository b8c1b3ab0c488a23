/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod config;

use crate::config::{Config, ScopeConfig};
use async_trait::async_trait;
use clap::Parser;
use live_channel::{Channel, ChannelEvent, ChannelEventKind, ChannelListener};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command()]
struct ChannelArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

/// Logs channel activity and reports the terminal event back to `main`.
struct LoggingListener {
    terminal: UnboundedSender<ChannelEvent>,
}

#[async_trait]
impl ChannelListener for LoggingListener {
    async fn on_event(&self, event: ChannelEvent) {
        match &event {
            ChannelEvent::Opened => info!("channel opened"),
            ChannelEvent::NewItems(batch) => {
                info!(item_count = batch.len(), "received new items")
            }
            ChannelEvent::Closed => {
                info!("channel closed");
                let _ = self.terminal.send(event);
            }
            ChannelEvent::Error(err) => {
                error!(err = %err, "channel gave up");
                let _ = self.terminal.send(event);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    info!("Started configurable-channel");

    let args = ChannelArgs::parse();
    let config = Config::from_file(&args.config)?;

    let channel = Channel::websocket(config.channel);
    let (terminal_tx, mut terminal_rx) = unbounded_channel();
    let listener: Arc<dyn ChannelListener> = Arc::new(LoggingListener {
        terminal: terminal_tx,
    });
    for kind in ChannelEventKind::ALL {
        channel.register_listener(kind, listener.clone()).await;
    }

    // Announced by the first open.
    match config.scope {
        ScopeConfig::Listen => channel.listen().await,
        ScopeConfig::BoundingBox { bounds } => channel.initialize_bounding_box(&bounds).await?,
    }

    channel.connect().await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            channel.close().await;
        }
        event = terminal_rx.recv() => {
            if let Some(ChannelEvent::Error(err)) = event {
                warn!(endpoint = channel.endpoint(), "exiting after terminal error");
                return Err(err.into());
            }
        }
    }

    info!("configurable-channel shutting down");
    Ok(())
}
