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

//! Shared helpers for exercising `live-channel` without a network: an in-memory server and
//! connector, a recording listener, station fixtures, and one-time log setup.

mod fixtures;
pub use fixtures::{
    station_items, STATION_BOUNDING_BOX, STATION_ENDPOINT, STATION_STREAM, STATION_TYPE,
    UNRESOLVABLE_ENDPOINT,
};

mod logging;
pub use logging::init_logging;

mod mock_transport;
pub use mock_transport::{MockConnector, MockHandle, MockServer};

mod recording_listener;
pub use recording_listener::{EventLog, RecordingListener};
