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

//! In-memory stand-in for a channel server and the transport that reaches it.
//!
//! A [`MockServer`] answers every control envelope with its item fixture, narrowed by the
//! envelope's `filter` (each filter key must equal the same key under a record's `data`).

use async_trait::async_trait;
use live_channel::transport::{
    TransportConnector, TransportError, TransportHandle, TransportSignal,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::debug;

enum ServerFrame {
    Message(String),
    Close,
}

struct ServerState {
    endpoint: String,
    items: Value,
    received: Mutex<Vec<Value>>,
    connections: Mutex<Vec<Weak<MockHandle>>>,
    accepted: AtomicUsize,
    close_after: Mutex<Option<Duration>>,
}

impl ServerState {
    fn reply_for(&self, envelope: &Value) -> Value {
        let Some(filter) = envelope.get("filter").and_then(Value::as_object) else {
            return self.items.clone();
        };
        let Some(records) = self.items.as_array() else {
            return self.items.clone();
        };

        let matching = records
            .iter()
            .filter(|record| {
                filter
                    .iter()
                    .all(|(key, expected)| record.pointer(&format!("/data/{key}")) == Some(expected))
            })
            .cloned()
            .collect();
        Value::Array(matching)
    }
}

#[derive(Clone)]
pub struct MockServer {
    state: Arc<ServerState>,
}

impl MockServer {
    pub fn new(endpoint: &str, items: Value) -> Self {
        Self {
            state: Arc::new(ServerState {
                endpoint: endpoint.to_string(),
                items,
                received: Mutex::new(Vec::new()),
                connections: Mutex::new(Vec::new()),
                accepted: AtomicUsize::new(0),
                close_after: Mutex::new(None),
            }),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.state.endpoint
    }

    /// Every envelope received so far, across all connections, in arrival order.
    pub async fn received(&self) -> Vec<Value> {
        self.state.received.lock().await.clone()
    }

    /// The `event` field of every envelope received so far.
    pub async fn received_events(&self) -> Vec<String> {
        self.received()
            .await
            .iter()
            .filter_map(|envelope| envelope.get("event").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }

    pub fn connections_accepted(&self) -> usize {
        self.state.accepted.load(Ordering::SeqCst)
    }

    /// Connections accepted and not yet closed by either side.
    pub async fn open_connections(&self) -> usize {
        self.state
            .connections
            .lock()
            .await
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|connection| connection.open.load(Ordering::SeqCst))
            .count()
    }

    /// Makes the server drop every connection it accepts from now on, `delay` after accepting.
    pub async fn close_each_connection_after(&self, delay: Duration) {
        *self.state.close_after.lock().await = Some(delay);
    }

    /// Server-side close of every live connection.
    pub async fn close_connections(&self) {
        let connections: Vec<_> = self.state.connections.lock().await.drain(..).collect();
        for connection in connections.iter().filter_map(Weak::upgrade) {
            connection.close_from_server();
        }
    }

    async fn accept(&self) -> Arc<MockHandle> {
        let handle = Arc::new(MockHandle::new(self.state.clone()));
        let connection_number = self.state.accepted.fetch_add(1, Ordering::SeqCst) + 1;

        let mut connections = self.state.connections.lock().await;
        connections.retain(|connection| connection.strong_count() > 0);
        connections.push(Arc::downgrade(&handle));
        drop(connections);

        debug!(
            endpoint = self.state.endpoint.as_str(),
            connection_number, "mock server accepted connection"
        );

        if let Some(delay) = *self.state.close_after.lock().await {
            let connection = Arc::downgrade(&handle);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(connection) = connection.upgrade() {
                    connection.close_from_server();
                }
            });
        }

        handle
    }
}

pub struct MockHandle {
    server: Arc<ServerState>,
    tx: UnboundedSender<ServerFrame>,
    rx: Mutex<UnboundedReceiver<ServerFrame>>,
    open: AtomicBool,
}

impl MockHandle {
    fn new(server: Arc<ServerState>) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            server,
            tx,
            rx: Mutex::new(rx),
            open: AtomicBool::new(true),
        }
    }

    fn close_from_server(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            debug!(
                endpoint = self.server.endpoint.as_str(),
                "mock server closing connection"
            );
            let _ = self.tx.send(ServerFrame::Close);
        }
    }
}

#[async_trait]
impl TransportHandle for MockHandle {
    async fn send(&self, payload: String) -> Result<(), TransportError> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        let envelope: Value = serde_json::from_str(&payload)
            .map_err(|err| TransportError::Send(err.to_string()))?;

        let reply = self.server.reply_for(&envelope);
        self.server.received.lock().await.push(envelope);
        self.tx
            .send(ServerFrame::Message(reply.to_string()))
            .map_err(|_| TransportError::Closed)
    }

    async fn recv(&self) -> TransportSignal {
        if !self.open.load(Ordering::SeqCst) {
            return TransportSignal::Closed(None);
        }
        let mut rx = self.rx.lock().await;
        match rx.recv().await {
            Some(ServerFrame::Message(payload)) if self.open.load(Ordering::SeqCst) => {
                TransportSignal::Message(payload)
            }
            _ => {
                self.open.store(false, Ordering::SeqCst);
                TransportSignal::Closed(None)
            }
        }
    }

    async fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            let _ = self.tx.send(ServerFrame::Close);
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Routes endpoints to registered [`MockServer`]s; any other endpoint is unreachable.
#[derive(Clone, Default)]
pub struct MockConnector {
    servers: Arc<Mutex<HashMap<String, MockServer>>>,
    attempts: Arc<AtomicUsize>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_server(server: &MockServer) -> Self {
        let connector = Self::new();
        connector.register(server).await;
        connector
    }

    pub async fn register(&self, server: &MockServer) {
        self.servers
            .lock()
            .await
            .insert(server.endpoint().to_string(), server.clone());
    }

    /// Makes `endpoint` unreachable again; live connections are left alone.
    pub async fn unregister(&self, endpoint: &str) {
        self.servers.lock().await.remove(endpoint);
    }

    /// Open calls seen so far, failed ones included.
    pub fn open_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportConnector for MockConnector {
    async fn open(&self, endpoint: &str) -> Result<Arc<dyn TransportHandle>, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let server = self.servers.lock().await.get(endpoint).cloned();
        match server {
            Some(server) => {
                let handle: Arc<dyn TransportHandle> = server.accept().await;
                Ok(handle)
            }
            None => Err(TransportError::Unreachable(endpoint.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MockConnector, MockServer};
    use crate::fixtures::{station_items, STATION_ENDPOINT, UNRESOLVABLE_ENDPOINT};
    use live_channel::transport::{
        TransportConnector, TransportError, TransportHandle, TransportSignal,
    };
    use serde_json::{json, Value};

    #[tokio::test]
    async fn unregistered_endpoint_is_unreachable() {
        let connector = MockConnector::new();

        let result = connector.open(UNRESOLVABLE_ENDPOINT).await;

        assert!(matches!(result, Err(TransportError::Unreachable(_))));
        assert_eq!(connector.open_attempts(), 1);
    }

    #[tokio::test]
    async fn unregistered_server_stops_accepting() {
        let server = MockServer::new(STATION_ENDPOINT, station_items());
        let connector = MockConnector::with_server(&server).await;
        let handle = connector.open(STATION_ENDPOINT).await.expect("open");

        connector.unregister(STATION_ENDPOINT).await;

        assert!(matches!(
            connector.open(STATION_ENDPOINT).await,
            Err(TransportError::Unreachable(_))
        ));
        assert_eq!(server.open_connections().await, 1);
        handle.close().await;
        assert_eq!(server.open_connections().await, 0);
    }

    #[tokio::test]
    async fn reply_is_narrowed_by_filter() {
        let server = MockServer::new(STATION_ENDPOINT, station_items());
        let connector = MockConnector::with_server(&server).await;
        let handle = connector.open(STATION_ENDPOINT).await.expect("open");

        handle
            .send(json!({ "event": "ready", "filter": { "linked_item": 48 } }).to_string())
            .await
            .expect("send");

        let TransportSignal::Message(payload) = handle.recv().await else {
            panic!("expected a reply");
        };
        let reply: Value = serde_json::from_str(&payload).expect("json reply");
        assert_eq!(reply.as_array().map(Vec::len), Some(1));
        assert_eq!(server.received_events().await, vec!["ready".to_string()]);
    }

    #[tokio::test]
    async fn server_close_is_observed_by_client() {
        let server = MockServer::new(STATION_ENDPOINT, station_items());
        let connector = MockConnector::with_server(&server).await;
        let handle = connector.open(STATION_ENDPOINT).await.expect("open");

        server.close_connections().await;

        assert!(matches!(handle.recv().await, TransportSignal::Closed(None)));
        assert!(!handle.is_open());
        assert!(handle.send("{}".to_string()).await.is_err());
    }
}
