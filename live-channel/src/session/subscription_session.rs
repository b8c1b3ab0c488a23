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

//! Channel scope bookkeeping and the envelopes that announce it.
//!
//! The session performs no I/O. Every operation returns the envelope the connection
//! manager has to put on the wire, if any.

use crate::config::ChannelConfig;
use crate::data_plane::codec::{ControlEnvelope, ControlEvent};
use crate::session::bounding_box::{BoundingBox, BoundingBoxError};
use serde_json::Value;

/// Snapshot of what the channel currently subscribes to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubscriptionScope {
    pub bounding_box: Option<BoundingBox>,
    pub filter: Option<Value>,
    pub listening: bool,
}

pub(crate) struct SubscriptionSession {
    channel_type: String,
    stream: Option<String>,
    scope: SubscriptionScope,
}

impl SubscriptionSession {
    pub(crate) fn new(config: &ChannelConfig) -> Self {
        Self {
            channel_type: config.channel_type.clone(),
            stream: config.stream.clone(),
            scope: SubscriptionScope {
                bounding_box: None,
                filter: config.filter.clone(),
                listening: false,
            },
        }
    }

    pub(crate) fn scope(&self) -> &SubscriptionScope {
        &self.scope
    }

    pub(crate) fn is_listening(&self) -> bool {
        self.scope.listening
    }

    /// Unscoped subscription. Returns `None` when already listening.
    pub(crate) fn listen(&mut self) -> Option<ControlEnvelope> {
        if self.scope.listening {
            return None;
        }
        self.scope.listening = true;
        Some(self.envelope(ControlEvent::Ready))
    }

    /// Fixes the spatial scope on first use; later calls are no-ops and skip validation.
    pub(crate) fn initialize_bounding_box(
        &mut self,
        bounds: &[f64],
    ) -> Result<Option<ControlEnvelope>, BoundingBoxError> {
        if self.scope.bounding_box.is_some() {
            return Ok(None);
        }
        self.scope.bounding_box = Some(BoundingBox::try_from_bounds(bounds)?);
        self.scope.listening = true;
        Ok(Some(self.envelope(ControlEvent::BoundingBoxInitialized)))
    }

    /// `Value::Null` clears the filter.
    pub(crate) fn change_filter(&mut self, filter: Value) -> ControlEnvelope {
        self.scope.filter = match filter {
            Value::Null => None,
            filter => Some(filter),
        };
        self.envelope(ControlEvent::FilterChanged)
    }

    /// Envelope that re-establishes the scope on a fresh connection.
    pub(crate) fn on_reconnect(&self) -> Option<ControlEnvelope> {
        if !self.scope.listening {
            return None;
        }
        if self.scope.bounding_box.is_some() {
            return Some(self.envelope(ControlEvent::BoundingBoxInitialized));
        }
        Some(self.envelope(ControlEvent::Ready))
    }

    pub(crate) fn stop_listening(&mut self) {
        self.scope.listening = false;
    }

    fn envelope(&self, event: ControlEvent) -> ControlEnvelope {
        ControlEnvelope {
            event,
            channel_type: self.channel_type.clone(),
            stream: self.stream.clone(),
            bounding_box: self.scope.bounding_box,
            filter: self.scope.filter.clone(),
        }
    }
}
