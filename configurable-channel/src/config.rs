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

use live_channel::{ChannelConfig, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) channel: ChannelConfig,
    #[serde(default)]
    pub(crate) scope: ScopeConfig,
}

/// What to subscribe to once the channel is up.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ScopeConfig {
    #[default]
    Listen,
    BoundingBox {
        bounds: Vec<f64>,
    },
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        json5::from_str(&contents).map_err(ConfigError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ScopeConfig};

    #[test]
    fn scope_defaults_to_listen() {
        let config: Config = json5::from_str(
            r#"{
                channel: { endpoint: "ws://localhost/socket", channel_type: "station" },
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.scope, ScopeConfig::Listen);
        assert_eq!(config.channel.max_retries, 0);
    }

    #[test]
    fn bounding_box_scope_is_parsed() {
        let config: Config = json5::from_str(
            r#"{
                channel: { endpoint: "ws://localhost/socket", channel_type: "station" },
                scope: { mode: "bounding_box", bounds: [3.78, 43.55, 4.04, 43.65] },
            }"#,
        )
        .expect("valid config");

        assert_eq!(
            config.scope,
            ScopeConfig::BoundingBox {
                bounds: vec![3.78, 43.55, 4.04, 43.65]
            }
        );
    }

    #[test]
    fn bundled_default_config_parses() {
        let config = Config::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/DEFAULT_CONFIG.json5"))
            .expect("bundled config parses");

        assert_eq!(config.channel.channel_type, "station");
        assert!(matches!(config.scope, ScopeConfig::BoundingBox { .. }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<Config, _> = json5::from_str(
            r#"{
                channel: { endpoint: "ws://x", channel_type: "station" },
                extra: true,
            }"#,
        );

        assert!(result.is_err());
    }
}
