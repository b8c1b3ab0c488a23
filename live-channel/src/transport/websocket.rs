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

//! WebSocket transport backed by `tokio-tungstenite`.

use crate::observability::events;
use crate::transport::{TransportConnector, TransportError, TransportHandle, TransportSignal};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{self, protocol::Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

const COMPONENT: &str = "websocket_transport";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens one WebSocket connection per attempt.
///
/// Text frames are payloads. Binary frames are accepted when they hold UTF-8.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransportConnector for WebSocketConnector {
    async fn open(&self, endpoint: &str) -> Result<Arc<dyn TransportHandle>, TransportError> {
        let (ws, _response) = connect_async(endpoint).await.map_err(|err| match err {
            tungstenite::Error::Io(io_err) => {
                TransportError::Unreachable(format!("{endpoint}: {io_err}"))
            }
            other => TransportError::Handshake(other.to_string()),
        })?;

        debug!(
            event = events::TRANSPORT_OPEN_OK,
            component = COMPONENT,
            endpoint,
            "websocket connected"
        );

        let (sink, stream) = ws.split();
        Ok(Arc::new(WebSocketHandle {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
            open: AtomicBool::new(true),
        }))
    }
}

struct WebSocketHandle {
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
    open: AtomicBool,
}

impl WebSocketHandle {
    fn mark_closed(&self) {
        self.open.store(false, Ordering::Release);
    }
}

#[async_trait]
impl TransportHandle for WebSocketHandle {
    async fn send(&self, payload: String) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        self.sink
            .lock()
            .await
            .send(Message::Text(payload))
            .await
            .map_err(|err| TransportError::Send(err.to_string()))
    }

    async fn recv(&self) -> TransportSignal {
        if !self.is_open() {
            return TransportSignal::Closed(None);
        }

        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return TransportSignal::Message(text),
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data) {
                    Ok(text) => return TransportSignal::Message(text),
                    Err(err) => {
                        warn!(
                            event = events::TRANSPORT_DROP_NON_UTF8,
                            component = COMPONENT,
                            err = %err,
                            "dropping binary frame that is not utf-8"
                        );
                    }
                },
                Some(Ok(Message::Ping(data))) => {
                    let _ = self.sink.lock().await.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(
                        event = events::TRANSPORT_CLOSED_BY_PEER,
                        component = COMPONENT,
                        frame = ?frame,
                        "peer closed websocket"
                    );
                    self.mark_closed();
                    return TransportSignal::Closed(None);
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    self.mark_closed();
                    return TransportSignal::Closed(Some(TransportError::Receive(
                        err.to_string(),
                    )));
                }
                None => {
                    self.mark_closed();
                    return TransportSignal::Closed(None);
                }
            }
        }
    }

    async fn close(&self) {
        if !self.open.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Err(err) = self.sink.lock().await.close().await {
            debug!(
                event = events::TRANSPORT_CLOSE_FAILED,
                component = COMPONENT,
                err = %err,
                "websocket close handshake failed"
            );
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::WebSocketConnector;
    use crate::transport::{TransportConnector, TransportError, TransportSignal};
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::protocol::Message;

    #[tokio::test]
    async fn unreachable_endpoint_fails_to_open() {
        // Bind then drop so the port is known to be closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let result = WebSocketConnector::new()
            .open(&format!("ws://{addr}/socket"))
            .await;

        assert!(matches!(result, Err(TransportError::Unreachable(_))));
    }

    #[tokio::test]
    async fn text_frames_round_trip_and_server_close_is_signalled() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(tcp).await.expect("handshake");
            let first = ws.next().await.expect("frame").expect("ok frame");
            assert_eq!(first, Message::Text("{\"event\":\"ready\"}".to_string()));
            ws.send(Message::Text("[1,2,3]".to_string()))
                .await
                .expect("reply");
            ws.close(None).await.expect("close");
        });

        let handle = WebSocketConnector::new()
            .open(&format!("ws://{addr}/socket"))
            .await
            .expect("open");
        assert!(handle.is_open());

        handle
            .send("{\"event\":\"ready\"}".to_string())
            .await
            .expect("send");

        match handle.recv().await {
            TransportSignal::Message(text) => assert_eq!(text, "[1,2,3]"),
            other => panic!("expected message, got {other:?}"),
        }
        assert!(matches!(handle.recv().await, TransportSignal::Closed(_)));
        assert!(!handle.is_open());
        assert!(matches!(handle.recv().await, TransportSignal::Closed(None)));

        server.await.expect("server task");
    }
}
