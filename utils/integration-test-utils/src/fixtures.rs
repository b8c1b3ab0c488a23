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

use serde_json::{json, Value};

pub const STATION_TYPE: &str = "station";
pub const STATION_STREAM: &str = "montpellier";
pub const STATION_ENDPOINT: &str = "ws://localhost/socket";
/// Never registered with any [`MockConnector`][crate::MockConnector]; every open fails.
pub const UNRESOLVABLE_ENDPOINT: &str = "ws://unresolvable.invalid/socket";

pub const STATION_BOUNDING_BOX: [f64; 4] = [3.78, 43.55, 4.04, 43.65];

/// Three stations; two share `linked_item` 34, one has 48.
pub fn station_items() -> Value {
    json!([
        {
            "geojson": { "coordinates": [3.97, 43.58] },
            "data": { "linked_item": 34 }
        },
        {
            "geojson": { "coordinates": [4.02, 43.63] },
            "data": { "linked_item": 48 }
        },
        {
            "geojson": { "coordinates": [3.88, 43.55] },
            "data": { "linked_item": 34 }
        }
    ])
}
