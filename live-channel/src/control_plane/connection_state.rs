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

use std::fmt::{Display, Formatter};

/// Lifecycle of a channel.
///
/// `Closed`, `Errored` and `Aborted` are terminal. `Closed` follows a client-initiated
/// [`close`][crate::Channel::close]; `Errored` follows an exhausted retry budget; `Aborted`
/// follows a reconnect that was refused because [`abort`][crate::Channel::abort] was requested.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Reconnecting,
    Closed,
    Aborted,
    Errored,
}

impl ConnectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConnectionState::Closed | ConnectionState::Aborted | ConnectionState::Errored
        )
    }

    /// States in which the channel owns a handle or a pending reconnect.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Open | ConnectionState::Reconnecting
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Closed => "closed",
            ConnectionState::Aborted => "aborted",
            ConnectionState::Errored => "errored",
        }
    }
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionState;

    #[test]
    fn terminal_and_active_states_are_disjoint() {
        let all = [
            ConnectionState::Idle,
            ConnectionState::Connecting,
            ConnectionState::Open,
            ConnectionState::Reconnecting,
            ConnectionState::Closed,
            ConnectionState::Aborted,
            ConnectionState::Errored,
        ];

        for state in all {
            assert!(!(state.is_terminal() && state.is_active()), "{state}");
        }
        assert!(!ConnectionState::Idle.is_terminal());
        assert!(!ConnectionState::Idle.is_active());
    }
}
