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

//! Wire format for outbound control envelopes and inbound item batches.

use crate::session::bounding_box::BoundingBox;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Control action announced to the server.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlEvent {
    Ready,
    BoundingBoxInitialized,
    FilterChanged,
}

impl ControlEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlEvent::Ready => "ready",
            ControlEvent::BoundingBoxInitialized => "bounding_box_initialized",
            ControlEvent::FilterChanged => "filter_changed",
        }
    }
}

/// One outbound control message. Unset scope fields go out as `null`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ControlEnvelope {
    pub event: ControlEvent,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub stream: Option<String>,
    pub bounding_box: Option<BoundingBox>,
    pub filter: Option<Value>,
}

/// Records carried by a single inbound transport message, passed through untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemBatch(Value);

impl ItemBatch {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Records of the batch; a payload that is not an array counts as one record.
    pub fn records(&self) -> &[Value] {
        match &self.0 {
            Value::Array(records) => records,
            other => std::slice::from_ref(other),
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

#[derive(Debug)]
pub enum CodecError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Encode(err) => write!(f, "unable to encode control envelope: {err}"),
            CodecError::Decode(err) => write!(f, "unable to decode item batch: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CodecError::Encode(err) | CodecError::Decode(err) => Some(err),
        }
    }
}

/// JSON codec; one transport message is one envelope or one batch, no framing.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessageCodec;

impl MessageCodec {
    pub fn encode(&self, envelope: &ControlEnvelope) -> Result<String, CodecError> {
        serde_json::to_string(envelope).map_err(CodecError::Encode)
    }

    pub fn decode(&self, payload: &str) -> Result<ItemBatch, CodecError> {
        serde_json::from_str(payload)
            .map(ItemBatch::new)
            .map_err(CodecError::Decode)
    }
}
