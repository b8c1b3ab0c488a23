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

//! Ordered delivery of channel events to registered listeners.
//!
//! Events are queued by the connection manager while it holds the channel lock and are
//! delivered from a separate task, so listeners may call back into the channel.

use crate::data_plane::listener_registry::{ChannelEvent, ListenerRegistry};
use crate::observability::events;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

const COMPONENT: &str = "event_dispatcher";

#[derive(Clone)]
pub(crate) struct EventSender {
    tx: UnboundedSender<ChannelEvent>,
}

impl EventSender {
    pub(crate) fn emit(&self, event: ChannelEvent) {
        // Only fails once the dispatcher is gone, at which point nobody is listening.
        let _ = self.tx.send(event);
    }
}

pub(crate) fn spawn_event_dispatcher(
    channel_id: String,
    registry: Arc<ListenerRegistry>,
) -> (EventSender, JoinHandle<()>) {
    let (tx, rx) = unbounded_channel();
    let handle = tokio::spawn(dispatch_loop(channel_id, registry, rx));
    (EventSender { tx }, handle)
}

async fn dispatch_loop(
    channel_id: String,
    registry: Arc<ListenerRegistry>,
    mut rx: UnboundedReceiver<ChannelEvent>,
) {
    while let Some(event) = rx.recv().await {
        let kind = event.kind();
        let listeners = registry.listeners_for(kind).await;
        trace!(
            component = COMPONENT,
            channel_id = channel_id.as_str(),
            event_kind = kind.as_str(),
            listener_count = listeners.len(),
            "dispatching channel event"
        );
        for listener in listeners {
            listener.on_event(event.clone()).await;
        }
    }

    debug!(
        event = events::DISPATCHER_STOPPED,
        component = COMPONENT,
        channel_id = channel_id.as_str(),
        "event dispatcher stopped"
    );
}

#[cfg(test)]
mod tests {
    use super::spawn_event_dispatcher;
    use crate::data_plane::listener_registry::{
        ChannelEvent, ChannelEventKind, ChannelListener, ListenerRegistry,
    };
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct CollectingListener {
        seen: Mutex<Vec<ChannelEvent>>,
    }

    #[async_trait]
    impl ChannelListener for CollectingListener {
        async fn on_event(&self, event: ChannelEvent) {
            self.seen.lock().await.push(event);
        }
    }

    #[tokio::test]
    async fn events_reach_listeners_of_their_kind_in_order() {
        let registry = Arc::new(ListenerRegistry::new());
        let collector = Arc::new(CollectingListener::default());
        let listener: Arc<dyn ChannelListener> = collector.clone();
        registry
            .register(ChannelEventKind::Opened, listener.clone())
            .await;
        registry.register(ChannelEventKind::Closed, listener).await;

        let (sender, handle) = spawn_event_dispatcher("test".to_string(), registry);
        sender.emit(ChannelEvent::Opened);
        sender.emit(ChannelEvent::Error(crate::ConnectionError::new("ws://x", 0)));
        sender.emit(ChannelEvent::Opened);
        sender.emit(ChannelEvent::Closed);
        drop(sender);

        handle.await.expect("dispatcher ends once senders are gone");

        assert_eq!(
            *collector.seen.lock().await,
            vec![
                ChannelEvent::Opened,
                ChannelEvent::Opened,
                ChannelEvent::Closed
            ]
        );
    }
}
