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

use crate::config::ChannelConfig;
use crate::control_plane::connection_manager::ConnectionManager;
use crate::control_plane::connection_state::ConnectionState;
use crate::data_plane::event_dispatcher::spawn_event_dispatcher;
use crate::data_plane::listener_registry::{ChannelEventKind, ChannelListener, ListenerRegistry};
use crate::error::ChannelError;
use crate::observability::events;
use crate::session::subscription_session::SubscriptionScope;
use crate::transport::TransportConnector;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

const COMPONENT: &str = "channel";

/// A resilient subscription to one real-time data channel.
///
/// The channel reconnects on its own after transport loss, within the retry budget of its
/// [`ChannelConfig`], and re-announces its scope after every successful open. Outcomes are
/// reported through [`ChannelListener`]s registered per [`ChannelEventKind`].
///
/// Must be created inside a tokio runtime. Dropping a channel that was not closed stops it
/// from reconnecting and closes its transport in the background without emitting `closed`;
/// call [`Channel::close`] for an orderly shutdown.
pub struct Channel {
    channel_id: String,
    endpoint: String,
    manager: ConnectionManager,
    registry: Arc<ListenerRegistry>,
}

impl Channel {
    pub fn new(config: ChannelConfig, connector: Arc<dyn TransportConnector>) -> Self {
        let channel_id = Uuid::new_v4().to_string();
        let endpoint = config.endpoint.clone();
        let registry = Arc::new(ListenerRegistry::new());
        let (events, _dispatcher) = spawn_event_dispatcher(channel_id.clone(), registry.clone());

        info!(
            component = COMPONENT,
            channel_id = channel_id.as_str(),
            endpoint = endpoint.as_str(),
            channel_type = config.channel_type.as_str(),
            max_retries = config.max_retries,
            retry_interval_ms = config.retry_interval_ms,
            "channel created"
        );

        let manager = ConnectionManager::new(channel_id.clone(), config, connector, events);
        Self {
            channel_id,
            endpoint,
            manager,
            registry,
        }
    }

    /// Channel over the bundled WebSocket transport.
    #[cfg(feature = "websocket")]
    pub fn websocket(config: ChannelConfig) -> Self {
        Self::new(
            config,
            Arc::new(crate::transport::websocket::WebSocketConnector::new()),
        )
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Starts connecting and clears a previous [`abort`](Channel::abort).
    ///
    /// Returns immediately; the outcome arrives as an `opened` or `error` event. Calling it
    /// while connecting, open or reconnecting does nothing. A channel that already reached a
    /// terminal state cannot be reused and reports [`ChannelError::Terminated`].
    pub async fn connect(&self) -> Result<(), ChannelError> {
        self.manager.connect().await
    }

    pub fn is_opened(&self) -> bool {
        self.manager.is_opened()
    }

    /// Client-initiated terminal shutdown. Emits `closed` once and never reconnects.
    pub async fn close(&self) {
        self.manager.close().await
    }

    /// Forbids further reconnects. The current handle stays up; the next retry check fails
    /// and the channel ends with an `error` event.
    pub fn abort(&self) {
        self.manager.abort()
    }

    /// Subscribes without a bounding box. Idempotent.
    pub async fn listen(&self) {
        self.manager.listen().await
    }

    /// Subscribes to `[west, south, east, north]`.
    ///
    /// Only the first call has an effect; later calls are ignored without validating their
    /// input.
    pub async fn initialize_bounding_box(&self, bounds: &[f64]) -> Result<(), ChannelError> {
        self.manager.initialize_bounding_box(bounds).await
    }

    /// Replaces the content filter and announces it right away when open. `Value::Null`
    /// clears it.
    pub async fn change_filter(&self, filter: Value) {
        self.manager.change_filter(filter).await
    }

    /// Returns `false` when this listener is already registered for `kind`.
    pub async fn register_listener(
        &self,
        kind: ChannelEventKind,
        listener: Arc<dyn ChannelListener>,
    ) -> bool {
        let registered = self.registry.register(kind, listener).await;
        debug!(
            event = events::LISTENER_REGISTERED,
            component = COMPONENT,
            channel_id = self.channel_id.as_str(),
            event_kind = kind.as_str(),
            registered,
            "listener registration"
        );
        registered
    }

    /// Returns `false` when this listener was not registered for `kind`.
    pub async fn unregister_listener(
        &self,
        kind: ChannelEventKind,
        listener: &Arc<dyn ChannelListener>,
    ) -> bool {
        let removed = self.registry.unregister(kind, listener).await;
        debug!(
            event = events::LISTENER_UNREGISTERED,
            component = COMPONENT,
            channel_id = self.channel_id.as_str(),
            event_kind = kind.as_str(),
            removed,
            "listener removal"
        );
        removed
    }

    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.manager.watch_state()
    }

    /// Reconnect attempts since the last successful open.
    pub async fn retries_done(&self) -> u32 {
        self.manager.retries_done().await
    }

    pub async fn scope(&self) -> SubscriptionScope {
        self.manager.scope().await
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        if !self.manager.state().is_terminal() {
            self.manager.discard();
        }
    }
}
