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

//! Transport seam.
//!
//! A [`Channel`][crate::Channel] never names a concrete transport. It is handed a
//! [`TransportConnector`] at construction and asks it for a fresh [`TransportHandle`] on
//! every (re)connect attempt. A successful [`TransportConnector::open`] is the "opened"
//! signal; a failed one is treated exactly like a close or error signal.

use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[cfg(feature = "websocket")]
pub mod websocket;

/// Signals a live handle delivers, in arrival order.
#[derive(Debug)]
pub enum TransportSignal {
    Message(String),
    /// Server close, network error, or local close. Carries the cause when there is one.
    Closed(Option<TransportError>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransportError {
    Unreachable(String),
    Handshake(String),
    Send(String),
    Receive(String),
    Closed,
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Unreachable(endpoint) => write!(f, "endpoint unreachable: {endpoint}"),
            TransportError::Handshake(reason) => write!(f, "handshake failed: {reason}"),
            TransportError::Send(reason) => write!(f, "send failed: {reason}"),
            TransportError::Receive(reason) => write!(f, "receive failed: {reason}"),
            TransportError::Closed => write!(f, "transport is closed"),
        }
    }
}

impl Error for TransportError {}

/// One open duplex connection.
#[async_trait]
pub trait TransportHandle: Send + Sync {
    async fn send(&self, payload: String) -> Result<(), TransportError>;

    /// Waits for the next signal. Once `Closed` has been returned, every later call
    /// returns `Closed` again.
    async fn recv(&self) -> TransportSignal;

    /// Closes the connection; a no-op on an already closed handle.
    async fn close(&self);

    fn is_open(&self) -> bool;
}

/// Factory capability for [`TransportHandle`]s.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    async fn open(&self, endpoint: &str) -> Result<Arc<dyn TransportHandle>, TransportError>;
}
