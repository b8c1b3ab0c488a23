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

use async_trait::async_trait;
use live_channel::{Channel, ChannelEvent, ChannelEventKind, ChannelListener};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Forwards every event it sees into an [`EventLog`].
pub struct RecordingListener {
    tx: UnboundedSender<ChannelEvent>,
}

impl RecordingListener {
    pub fn new() -> (Arc<Self>, EventLog) {
        let (tx, rx) = unbounded_channel();
        (Arc::new(Self { tx }), EventLog { rx })
    }

    /// Registers a fresh recorder for every event kind of `channel`.
    pub async fn attach(channel: &Channel) -> EventLog {
        let (listener, log) = Self::new();
        let listener: Arc<dyn ChannelListener> = listener;
        for kind in ChannelEventKind::ALL {
            channel.register_listener(kind, listener.clone()).await;
        }
        log
    }
}

#[async_trait]
impl ChannelListener for RecordingListener {
    async fn on_event(&self, event: ChannelEvent) {
        debug!(event_kind = event.kind().as_str(), "recording listener got event");
        let _ = self.tx.send(event);
    }
}

pub struct EventLog {
    rx: UnboundedReceiver<ChannelEvent>,
}

impl EventLog {
    /// Next event, or `None` if nothing arrives `within`.
    pub async fn next_event(&mut self, within: Duration) -> Option<ChannelEvent> {
        tokio::time::timeout(within, self.rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Skips events of other kinds until one of `kind` arrives, or `within` elapses.
    pub async fn next_of_kind(
        &mut self,
        kind: ChannelEventKind,
        within: Duration,
    ) -> Option<ChannelEvent> {
        let wait = async {
            while let Some(event) = self.rx.recv().await {
                if event.kind() == kind {
                    return Some(event);
                }
            }
            None
        };
        tokio::time::timeout(within, wait).await.ok().flatten()
    }

    /// Events already delivered and not yet consumed.
    pub fn drain(&mut self) -> Vec<ChannelEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}
