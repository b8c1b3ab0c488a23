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

use crate::control_plane::connection_state::ConnectionState;
use crate::session::bounding_box::BoundingBoxError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Terminal failure reported through the `error` event once reconnecting stops.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectionError {
    pub endpoint: String,
    pub retries: u32,
}

impl ConnectionError {
    pub fn new(endpoint: &str, retries: u32) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            retries,
        }
    }
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unable to connect to {} after {} retries",
            self.endpoint, self.retries
        )
    }
}

impl Error for ConnectionError {}

/// Failures returned directly from [`Channel`][crate::Channel] calls.
#[derive(Debug, PartialEq)]
pub enum ChannelError {
    InvalidBoundingBox(BoundingBoxError),
    Terminated(ConnectionState),
}

impl Display for ChannelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelError::InvalidBoundingBox(err) => write!(f, "invalid bounding box: {err}"),
            ChannelError::Terminated(state) => {
                write!(f, "channel already reached terminal state `{state}`")
            }
        }
    }
}

impl Error for ChannelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChannelError::InvalidBoundingBox(err) => Some(err),
            ChannelError::Terminated(_) => None,
        }
    }
}

impl From<BoundingBoxError> for ChannelError {
    fn from(err: BoundingBoxError) -> Self {
        ChannelError::InvalidBoundingBox(err)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelError, ConnectionError};
    use crate::control_plane::connection_state::ConnectionState;
    use crate::session::bounding_box::BoundingBoxError;
    use std::error::Error;

    #[test]
    fn connection_error_names_endpoint_and_retries() {
        let error = ConnectionError::new("ws://localhost/socket", 2);

        assert_eq!(
            error.to_string(),
            "unable to connect to ws://localhost/socket after 2 retries"
        );
    }

    #[test]
    fn invalid_bounding_box_exposes_source() {
        let error = ChannelError::from(BoundingBoxError::WrongArity(3));

        assert!(error.to_string().contains("invalid bounding box"));
        assert!(error.source().is_some());
    }

    #[test]
    fn terminated_display_is_stable() {
        let error = ChannelError::Terminated(ConnectionState::Closed);

        assert_eq!(error.to_string(), "channel already reached terminal state `closed`");
        assert!(error.source().is_none());
    }
}
