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

//! # live-channel
//!
//! `live-channel` keeps one subscription to a real-time data channel alive over an
//! unreliable transport. It reconnects within a retry budget, re-announces its scope
//! (unscoped listen or bounding box, plus the current filter) after every open, and
//! reports `opened`, `closed`, `error` and `new_items` events to registered listeners.
//!
//! Typical usage is API-first and remains centered on [`Channel`] and [`ChannelConfig`].
//! The transport is injected as an `Arc<dyn TransportConnector>`; the `websocket` feature
//! (on by default) provides [`transport::websocket::WebSocketConnector`].
//!
//! ## Retry budget
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use live_channel::transport::{TransportConnector, TransportError, TransportHandle};
//! use live_channel::{Channel, ChannelConfig, ChannelEvent, ChannelEventKind, ChannelListener};
//! use tokio::sync::mpsc;
//!
//! # struct Unreachable;
//! #
//! # #[async_trait]
//! # impl TransportConnector for Unreachable {
//! #     async fn open(&self, endpoint: &str) -> Result<Arc<dyn TransportHandle>, TransportError> {
//! #         Err(TransportError::Unreachable(endpoint.to_string()))
//! #     }
//! # }
//! #
//! struct Forward(mpsc::UnboundedSender<ChannelEvent>);
//!
//! #[async_trait]
//! impl ChannelListener for Forward {
//!     async fn on_event(&self, event: ChannelEvent) {
//!         let _ = self.0.send(event);
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let config = ChannelConfig::new("ws://localhost:9/socket", "station")
//!     .with_max_retries(2)
//!     .with_retry_interval_ms(10);
//! let channel = Channel::new(config, Arc::new(Unreachable));
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! channel
//!     .register_listener(ChannelEventKind::Error, Arc::new(Forward(tx)))
//!     .await;
//! channel.connect().await.unwrap();
//!
//! let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
//!     .await
//!     .unwrap()
//!     .unwrap();
//! match event {
//!     ChannelEvent::Error(err) => assert_eq!(err.retries, 2),
//!     other => panic!("unexpected event {other:?}"),
//! }
//! assert!(!channel.is_opened());
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: outward `Channel` surface and listener registration
//! - Control plane: connection state machine, retry policy, generation bookkeeping
//! - Session: subscription scope and the envelope that replays it
//! - Data plane: envelope/batch codec, listener registry, ordered event dispatch
//! - Transport: connector/handle seam and the WebSocket implementation
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events and does not unconditionally initialize a global
//! subscriber. Binaries and tests are responsible for one-time
//! `tracing_subscriber` initialization at process boundaries.

mod channel;
pub use channel::Channel;

mod config;
pub use config::{ChannelConfig, ConfigError, DEFAULT_RETRY_INTERVAL_MS, INFINITE_RETRIES};

mod control_plane;
pub use control_plane::connection_state::ConnectionState;

mod data_plane;
pub use data_plane::codec::{CodecError, ControlEnvelope, ControlEvent, ItemBatch, MessageCodec};
pub use data_plane::listener_registry::{ChannelEvent, ChannelEventKind, ChannelListener};

mod error;
pub use error::{ChannelError, ConnectionError};

#[doc(hidden)]
pub mod observability;

mod session;
pub use session::bounding_box::{BoundingBox, BoundingBoxError};
pub use session::subscription_session::SubscriptionScope;

pub mod transport;
