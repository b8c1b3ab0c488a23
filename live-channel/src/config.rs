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

//! Per-channel configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

/// Retry budget value meaning "retry forever".
pub const INFINITE_RETRIES: u32 = 0;

/// Delay between reconnect attempts when none is configured.
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 1000;

fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL_MS
}

/// Immutable settings a [`Channel`][crate::Channel] is bound to for its whole lifetime.
///
/// ```
/// use live_channel::ChannelConfig;
///
/// let config = ChannelConfig::new("ws://localhost/socket", "station")
///     .with_stream("north")
///     .with_max_retries(2)
///     .with_retry_interval_ms(50);
///
/// assert_eq!(config.max_retries, 2);
/// assert_eq!(config.retry_interval().as_millis(), 50);
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    pub endpoint: String,
    pub channel_type: String,
    #[serde(default)]
    pub stream: Option<String>,
    #[serde(default)]
    pub filter: Option<Value>,
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

impl ChannelConfig {
    pub fn new(endpoint: &str, channel_type: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            channel_type: channel_type.to_string(),
            stream: None,
            filter: None,
            max_retries: INFINITE_RETRIES,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }

    pub fn with_stream(mut self, stream: &str) -> Self {
        self.stream = Some(stream.to_string());
        self
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_interval_ms(mut self, retry_interval_ms: u64) -> Self {
        self.retry_interval_ms = retry_interval_ms;
        self
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigError> {
        json5::from_str(contents).map_err(ConfigError::Parse)
    }

    pub fn from_json5_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json5_str(&contents)
    }
}

/// Failures while loading a [`ChannelConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(json5::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "unable to read channel config: {err}"),
            ConfigError::Parse(err) => write!(f, "unable to parse channel config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}
